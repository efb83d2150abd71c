//! Pure Zenodo deposition REST API client.
//!
//! A minimal client for the Zenodo deposit API. Supports creating a draft
//! deposition, attaching a file, setting descriptive metadata, and
//! publishing.
//!
//! # Example
//!
//! ```rust,ignore
//! use zenodo_client::{Creator, DepositionMetadata, ZenodoClient};
//!
//! let client = ZenodoClient::new("your-access-token");
//!
//! let draft = client.create_deposition().await?;
//! client.upload_file(draft.id, "ro_crate.zip".as_ref()).await?;
//! client
//!     .set_metadata(draft.id, &DepositionMetadata::dataset("Title", "About", vec![Creator::new("Doe, John")]))
//!     .await?;
//! let published = client.publish(draft.id).await?;
//! println!("{}", published.doi().unwrap_or("(no DOI)"));
//! ```

pub mod error;
pub mod types;

pub use error::{Result, ZenodoError};
pub use types::{Creator, Deposition, DepositionFile, DepositionLinks, DepositionMetadata};

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use types::MetadataEnvelope;

/// Sandbox deposit API. Production is `https://zenodo.org/api/deposit`.
pub const DEFAULT_BASE_URL: &str = "https://sandbox.zenodo.org/api/deposit";

/// Zenodo deposit API client.
#[derive(Clone)]
pub struct ZenodoClient {
    http_client: Client,
    token: String,
    base_url: String,
}

impl ZenodoClient {
    /// Create a client for the sandbox with the given access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Set a custom base URL (production, a proxy, or a test server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn depositions_url(&self) -> String {
        format!("{}/depositions", self.base_url)
    }

    /// Create an empty draft deposition.
    pub async fn create_deposition(&self) -> Result<Deposition> {
        let response = self
            .http_client
            .post(self.depositions_url())
            .bearer_auth(&self.token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let deposition: Deposition = parse(response, "create deposition").await?;
        info!(deposition_id = deposition.id, "Draft deposition created");
        Ok(deposition)
    }

    /// Attach the file at `path` to deposition `id` as multipart field `file`.
    pub async fn upload_file(&self, id: u64, path: &Path) -> Result<DepositionFile> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());
        let size = bytes.len();

        let form = Form::new()
            .text("name", file_name.clone())
            .part("file", Part::bytes(bytes).file_name(file_name.clone()));

        let response = self
            .http_client
            .post(format!("{}/{}/files", self.depositions_url(), id))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        let file: DepositionFile = parse(response, "upload file").await?;
        info!(deposition_id = id, file = %file_name, bytes = size, "File uploaded");
        Ok(file)
    }

    /// Replace the descriptive metadata of deposition `id`.
    pub async fn set_metadata(&self, id: u64, metadata: &DepositionMetadata) -> Result<Deposition> {
        let response = self
            .http_client
            .put(format!("{}/{}", self.depositions_url(), id))
            .bearer_auth(&self.token)
            .json(&MetadataEnvelope { metadata })
            .send()
            .await?;

        let deposition = parse(response, "set metadata").await?;
        debug!(deposition_id = id, title = %metadata.title, "Metadata updated");
        Ok(deposition)
    }

    /// Publish deposition `id`. Published records cannot be deleted.
    pub async fn publish(&self, id: u64) -> Result<Deposition> {
        let response = self
            .http_client
            .post(format!("{}/{}/actions/publish", self.depositions_url(), id))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let deposition: Deposition = parse(response, "publish").await?;
        let doi = deposition.doi().ok_or(ZenodoError::MissingDoi(id))?;
        info!(deposition_id = id, doi, "Deposition published");
        Ok(deposition)
    }
}

async fn parse<T: DeserializeOwned>(response: Response, operation: &'static str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        warn!(operation, status = status.as_u16(), error = %message, "Zenodo request failed");
        return Err(ZenodoError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = ZenodoClient::new("token").with_base_url("http://localhost:9000/api/deposit/");
        assert_eq!(client.token, "token");
        assert_eq!(client.base_url(), "http://localhost:9000/api/deposit");
        assert_eq!(
            client.depositions_url(),
            "http://localhost:9000/api/deposit/depositions"
        );
    }

    #[test]
    fn test_default_base_url_is_sandbox() {
        assert_eq!(ZenodoClient::new("t").base_url(), DEFAULT_BASE_URL);
    }
}
