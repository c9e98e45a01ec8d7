// Numeric coercion of raw cells
//
// A cell that cannot be read as a finite number coerces to `None`, which the
// renderer draws as a gap. Records are never dropped.

use crate::data::CellValue;
use nom::{
    branch::alt,
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map_res, opt, recognize},
    number::complete::double,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

/// Leading float, ignoring whatever follows it
fn float_prefix(input: &str) -> IResult<&str, f64> {
    preceded(multispace0, double)(input)
}

/// Leading signed decimal without an exponent.
///
/// `double` cuts on a dangling exponent (`"7eggs"`, `"5e"`), so this is the
/// fallback that keeps the mantissa.
fn decimal_prefix(input: &str) -> IResult<&str, f64> {
    preceded(multispace0, decimal)(input)
}

fn decimal(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
        ))),
        str::parse::<f64>,
    )(input)
}

/// The whole input must be a float, surrounding whitespace allowed
fn float_exact(input: &str) -> IResult<&str, f64> {
    all_consuming(delimited(multispace0, double, multispace0))(input)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Strip one trailing `%`, then read the leading float.
///
/// `"45%"` -> `Some(45.0)`, `"12abc"` -> `Some(12.0)`, `"abc"` -> `None`.
pub fn coerce_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let body = trimmed.strip_suffix('%').unwrap_or(trimmed);
    float_prefix(body)
        .or_else(|_| decimal_prefix(body))
        .ok()
        .and_then(|(_, v)| finite(v))
}

/// Whole-string float parse with no `%` handling. Empty input is missing.
pub fn coerce_strict_numeric(raw: &str) -> Option<f64> {
    float_exact(raw).ok().and_then(|(_, v)| finite(v))
}

/// Coerce a typed cell. JSON numbers pass through; text goes through `parse`.
pub fn coerce_cell(cell: &CellValue, parse: fn(&str) -> Option<f64>) -> Option<f64> {
    match cell {
        CellValue::Number(n) => finite(*n),
        CellValue::Text(s) => parse(s),
        CellValue::Bool(_) | CellValue::Null => None,
    }
}
