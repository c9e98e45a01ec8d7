use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use chartdrop::server::{configure, UploadState};
use chartdrop::store::{DatasetStore, StoredUpload};
use chartdrop::config::AdapterOptions;
use chartdrop::render::PlottersRenderer;
use chartdrop::{RenderOutcome, Session};

const BOUNDARY: &str = "chartdropboundary";

/// Build a multipart/form-data body with one part
fn multipart_body(field: &str, filename: Option<&str>, content_type: Option<&str>, content: &str) -> Vec<u8> {
    let mut body = format!("--{}\r\n", BOUNDARY);
    match filename {
        Some(name) => body.push_str(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, name
        )),
        None => body.push_str(&format!("Content-Disposition: form-data; name=\"{}\"\r\n", field)),
    }
    if let Some(ct) = content_type {
        body.push_str(&format!("Content-Type: {}\r\n", ct));
    }
    body.push_str("\r\n");
    body.push_str(content);
    body.push_str(&format!("\r\n--{}--\r\n", BOUNDARY));
    body.into_bytes()
}

fn upload_request(body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/upload")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
}

fn state(dir: &std::path::Path) -> UploadState {
    UploadState {
        store: DatasetStore::open(dir).unwrap(),
        field: "dataFile".to_string(),
    }
}

#[actix_web::test]
async fn test_upload_returns_metadata_and_serves_file() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path())))).await;

    let content = "State,Rate\nCA,10%\nNY,20%\n";
    let req = upload_request(multipart_body("dataFile", Some("rates.csv"), Some("text/csv"), content)).to_request();
    let stored: StoredUpload = test::call_and_read_body_json(&app, req).await;

    assert_eq!(stored.originalname, "rates.csv");
    assert_eq!(stored.mimetype, "text/csv");
    assert!(stored.filename.ends_with(".csv"));
    assert!(tmp.path().join(&stored.filename).is_file());

    let req = test::TestRequest::get()
        .uri(&format!("/uploads/{}", stored.filename))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, content.as_bytes());
}

#[actix_web::test]
async fn test_upload_guesses_mimetype_when_undeclared() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path())))).await;

    let req = upload_request(multipart_body("dataFile", Some("cities.json"), None, "[]")).to_request();
    let stored: StoredUpload = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stored.mimetype, "application/json");
    assert!(stored.filename.ends_with(".json"));
}

#[actix_web::test]
async fn test_upload_without_file_is_bad_request() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path())))).await;

    let req = upload_request(multipart_body("note", None, None, "hello")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = test::read_body(resp).await;
    assert_eq!(body, "No file uploaded.".as_bytes());
}

#[actix_web::test]
async fn test_upload_under_other_field_is_ignored() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path())))).await;

    let req = upload_request(multipart_body("other", Some("rates.csv"), Some("text/csv"), "a\n1\n")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[actix_web::test]
async fn test_missing_upload_is_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path())))).await;

    let req = test::TestRequest::get().uri("/uploads/nope.csv").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_upload_fetch_parse_render_pipeline() {
    let tmp = tempfile::tempdir().unwrap();
    let app = test::init_service(App::new().configure(configure(state(tmp.path())))).await;

    let content = include_str!("fixtures/physicians.csv");
    let req = upload_request(multipart_body("dataFile", Some("physicians.csv"), Some("text/csv"), content)).to_request();
    let stored: StoredUpload = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/uploads/{}", stored.filename))
        .to_request();
    let fetched = test::call_and_read_body(&app, req).await;
    let fetched = std::str::from_utf8(&fetched).unwrap();

    let mut session = Session::new(PlottersRenderer::default(), AdapterOptions::default());
    assert_eq!(session.ingest(fetched, &stored.mimetype).unwrap(), RenderOutcome::Drawn);
    assert_eq!(session.dataset().len(), 3);
    assert!(session.active_chart().is_some());
}
