use anyhow::{bail, Context, Result};
use chartdrop::client::UploadClient;
use chartdrop::config::{Cli, Command, PlotArgs};
use chartdrop::render::PlottersRenderer;
use chartdrop::{server, RenderOutcome, Session};
use clap::Parser;
use env_logger::Env;
use log::info;
use std::fs;
use std::io::{self, Write};

fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => actix_web::rt::System::new()
            .block_on(server::run(args))
            .context("Upload server failed"),
        Command::Plot(args) => plot(args),
    }
}

/// Fetch -> parse -> resolve -> render, writing the chart to a file or stdout
fn plot(args: PlotArgs) -> Result<()> {
    let (content, mimetype) = match &args.server {
        Some(url) => {
            let client = UploadClient::new(url, &args.field);
            let stored = client
                .upload(&args.file)
                .context("Error uploading file")?;
            let content = client
                .fetch(&stored.filename)
                .context("Error fetching uploaded file")?;
            (content, stored.mimetype)
        }
        None => {
            let content = fs::read_to_string(&args.file)
                .with_context(|| format!("Failed to read {}", args.file.display()))?;
            let mimetype = mime_guess::from_path(&args.file)
                .first_or_octet_stream()
                .essence_str()
                .to_string();
            (content, mimetype)
        }
    };

    let renderer = PlottersRenderer::new(args.render_options());
    let mut session = Session::new(renderer, args.adapter_options());

    let columns = session
        .load(&content, &mimetype)
        .context("Error processing file")?;

    if args.columns {
        println!("{}", serde_json::to_string_pretty(columns)?);
        return Ok(());
    }

    session.set_chart_type(args.chart);
    session.select_columns(args.x_column.as_deref(), args.y_column.as_deref())?;

    match session.render().context("Failed to render chart")? {
        RenderOutcome::Drawn => {}
        RenderOutcome::NoData => bail!("Dataset has no records to chart"),
        RenderOutcome::MissingSelection => bail!("X or Y column not selected"),
    }

    let Some(chart) = session.active_chart() else {
        bail!("No chart was produced");
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &chart.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {:?} chart to {}", chart.chart, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&chart.bytes)
                .context("Failed to write chart to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}
