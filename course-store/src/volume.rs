//! Uploads of local artifacts to a warehouse volume.

use intel_core::{CoreError, WarehouseError, WorkspaceCredentials};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_VOLUME_DIR: &str = "/Volumes/workspace/default/reddit";

#[derive(Debug, Clone)]
pub struct VolumeUploader {
    http_client: Client,
    base_url: String,
    token: String,
}

impl VolumeUploader {
    pub fn new(workspace: &WorkspaceCredentials, timeout: Duration) -> Result<Self, CoreError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: workspace.base_url(),
            token: workspace.token.clone(),
        })
    }

    pub fn files_url(&self, volume_path: &str) -> Result<String, CoreError> {
        if !volume_path.starts_with("/Volumes/") || volume_path.ends_with('/') {
            return Err(CoreError::InvalidInput {
                message: format!("Not a volume file path: {}", volume_path),
            });
        }
        Ok(format!(
            "{}/api/2.0/fs/files{}?overwrite=true",
            self.base_url, volume_path
        ))
    }

    /// Uploads `bytes` to `volume_path`, replacing any existing file.
    pub async fn upload_bytes(&self, bytes: Vec<u8>, volume_path: &str) -> Result<(), CoreError> {
        let url = self.files_url(volume_path)?;
        let size = bytes.len();

        let response = self
            .http_client
            .put(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!("Upload to {} failed with status {}", volume_path, status);
            return Err(WarehouseError::UploadFailed {
                path: volume_path.to_string(),
                status_code: status.as_u16(),
            }
            .into());
        }

        info!("Uploaded {} bytes to {}", size, volume_path);
        Ok(())
    }

    pub async fn upload_file(&self, local: &Path, volume_path: &str) -> Result<(), CoreError> {
        let bytes = tokio::fs::read(local).await?;
        self.upload_bytes(bytes, volume_path).await
    }
}

/// Target path for `file_name` inside the default volume directory.
pub fn default_volume_path(file_name: &str) -> String {
    format!("{}/{}", DEFAULT_VOLUME_DIR, file_name)
}
