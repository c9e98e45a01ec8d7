// Upload server: POST /upload stores a dataset, GET /uploads/{filename} serves it back

use crate::config::ServeArgs;
use crate::store::{DatasetStore, StoredUpload};
use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use futures_util::StreamExt;
use log::{error, info};

/// Shared handler state
#[derive(Debug, Clone)]
pub struct UploadState {
    pub store: DatasetStore,
    /// Multipart field expected to hold the file
    pub field: String,
}

/// Register the upload and retrieval routes
pub fn configure(state: UploadState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let dir = state.store.dir().to_path_buf();
        cfg.app_data(web::Data::new(state))
            .route("/upload", web::post().to(upload))
            .service(Files::new("/uploads", dir));
    }
}

/// Bind and run until shutdown
pub async fn run(args: ServeArgs) -> std::io::Result<()> {
    let store = DatasetStore::open(&args.upload_dir)?;
    let state = UploadState {
        store,
        field: args.field.clone(),
    };
    let static_dir = args.static_dir.clone();

    info!(
        "Server listening at http://{}:{} (uploads in {})",
        args.host,
        args.port,
        args.upload_dir.display()
    );

    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Logger::default())
            .configure(configure(state.clone()));
        if let Some(dir) = &static_dir {
            app = app.service(Files::new("/", dir).index_file("index.html"));
        }
        app
    })
    .bind((args.host.as_str(), args.port))?
    .run()
    .await
}

/// `200` with upload metadata, or `400` when the form carried no file
async fn upload(state: web::Data<UploadState>, mut payload: Multipart) -> impl Responder {
    match receive_upload(&state, &mut payload).await {
        Ok(Some(stored)) => {
            info!(
                "Stored upload '{}' as {} ({})",
                stored.originalname, stored.filename, stored.mimetype
            );
            HttpResponse::Ok().json(stored)
        }
        Ok(None) => HttpResponse::BadRequest()
            .content_type("text/plain; charset=utf-8")
            .body("No file uploaded."),
        Err(e) => {
            error!("Upload failed: {}", e);
            HttpResponse::InternalServerError().body(format!("Error: {}", e))
        }
    }
}

/// Drain the multipart stream, persisting the first file found under the expected field
async fn receive_upload(
    state: &UploadState,
    payload: &mut Multipart,
) -> Result<Option<StoredUpload>, Box<dyn std::error::Error>> {
    let mut stored = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(|n| n.to_string()),
                cd.get_filename().map(|f| f.to_string()),
            ),
            None => (None, None),
        };
        let declared = field.content_type().map(|m| m.essence_str().to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            bytes.extend_from_slice(&chunk?);
        }

        if stored.is_some() || name.as_deref() != Some(state.field.as_str()) {
            continue;
        }
        let Some(original) = filename.filter(|f| !f.is_empty()) else {
            continue;
        };

        let mimetype = declared.unwrap_or_else(|| {
            mime_guess::from_path(&original)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });
        let store = state.store.clone();
        let saved = web::block(move || store.save(&original, &mimetype, &bytes))
            .await
            .map_err(|e| e.to_string())??;
        stored = Some(saved);
    }

    Ok(stored)
}
