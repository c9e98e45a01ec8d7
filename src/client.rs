// HTTP transport for the client pipeline: upload a dataset, fetch it back

use crate::error::{ChartError, Result};
use crate::store::StoredUpload;
use log::info;
use reqwest::blocking::{multipart, Client};
use reqwest::Url;
use std::path::Path;

/// Talks to a running upload server
pub struct UploadClient {
    base_url: String,
    field: String,
    http: Client,
}

impl UploadClient {
    pub fn new(base_url: &str, field: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            field: field.to_string(),
            http: Client::new(),
        }
    }

    /// POST the file as multipart form data
    pub fn upload(&self, path: &Path) -> Result<StoredUpload> {
        let form = multipart::Form::new().file(self.field.clone(), path)?;
        let response = self
            .http
            .post(self.endpoint(&["upload"])?)
            .multipart(form)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChartError::Transport(format!("HTTP error! status: {}", status)));
        }

        let stored: StoredUpload = response.json()?;
        info!("File uploaded successfully: {:?}", stored);
        Ok(stored)
    }

    /// GET the stored file's raw content
    pub fn fetch(&self, filename: &str) -> Result<String> {
        let response = self
            .http
            .get(self.endpoint(&["uploads", filename])?)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChartError::Transport(format!("HTTP error! status: {}", status)));
        }
        Ok(response.text()?)
    }

    /// Server URL with each segment percent-encoded onto the base path
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let invalid = || ChartError::Transport(format!("Invalid server URL: {}", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}
