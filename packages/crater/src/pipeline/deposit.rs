//! Deposition - uploads a packaged crate and optionally publishes it.
//!
//! Steps run strictly in order: create → upload file → set metadata →
//! (publish). The first failing step aborts the rest. Nothing is rolled back,
//! so a failure after the upload leaves a draft on the remote service.

use std::path::Path;

use tracing::info;
use zenodo_client::{Creator, Deposition, DepositionMetadata, ZenodoClient, ZenodoError};

use crate::error::{CraterError, Result};
use crate::pipeline::retry::with_retry;
use crate::types::{CraterConfig, RetryPolicy};

/// Whether a deposition has been published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Draft,
    Published,
}

/// Local echo of the remote deposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositionRecord {
    pub id: u64,
    /// Web page of the deposition, when the service reported one
    pub upload_url: Option<String>,
    pub publish_state: PublishState,
    pub doi: Option<String>,
}

/// Runs the deposition sequence against a [`ZenodoClient`].
pub struct Depositor {
    client: ZenodoClient,
    metadata: DepositionMetadata,
    retry: RetryPolicy,
}

impl Depositor {
    /// Create a depositor describing uploads with `metadata`.
    pub fn new(client: ZenodoClient, metadata: DepositionMetadata) -> Self {
        Self {
            client,
            metadata,
            retry: RetryPolicy::none(),
        }
    }

    /// Build from configuration. A deposition token is required.
    pub fn from_config(config: &CraterConfig) -> Result<Self> {
        let token = config
            .deposition_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CraterError::Config("deposition token is not set".into()))?;

        let client = ZenodoClient::new(token).with_base_url(config.deposition_base_url.clone());
        let metadata = DepositionMetadata::dataset(
            config.title.clone(),
            config.description.clone(),
            vec![Creator::new(config.publisher.clone())],
        );
        Ok(Self::new(client, metadata).with_retry(config.deposition_retry))
    }

    /// Retry transient failures of each call under `policy`.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// The metadata `upload` sends with every deposition.
    pub fn metadata(&self) -> &DepositionMetadata {
        &self.metadata
    }

    /// Create an empty draft deposition.
    pub async fn create_deposition(&self) -> Result<Deposition> {
        self.call("create", || self.client.create_deposition()).await
    }

    /// Attach the archive to draft `id`.
    pub async fn upload_file(&self, id: u64, archive: &Path) -> Result<()> {
        self.call("upload", || self.client.upload_file(id, archive))
            .await
            .map(|_| ())
    }

    /// Send `metadata` as the descriptive metadata of draft `id`.
    pub async fn set_metadata(&self, id: u64, metadata: &DepositionMetadata) -> Result<Deposition> {
        self.call("metadata", || self.client.set_metadata(id, metadata))
            .await
    }

    /// Publish draft `id` and return its DOI.
    pub async fn publish(&self, id: u64) -> Result<String> {
        let published = self.call("publish", || self.client.publish(id)).await?;
        published
            .doi()
            .map(str::to_string)
            .ok_or(CraterError::Deposition {
                step: "publish",
                source: ZenodoError::MissingDoi(id),
            })
    }

    /// Run the whole sequence for `archive`.
    pub async fn upload(&self, archive: &Path, publish: bool) -> Result<DepositionRecord> {
        let draft = self.create_deposition().await?;
        self.upload_file(draft.id, archive).await?;
        let updated = self.set_metadata(draft.id, &self.metadata).await?;

        let upload_url = updated
            .links
            .html
            .or(updated.links.self_url)
            .or(draft.links.html);

        let mut record = DepositionRecord {
            id: draft.id,
            upload_url,
            publish_state: PublishState::Draft,
            doi: None,
        };

        if publish {
            record.doi = Some(self.publish(draft.id).await?);
            record.publish_state = PublishState::Published;
        }

        info!(
            deposition_id = record.id,
            published = publish,
            doi = record.doi.as_deref().unwrap_or(""),
            "Deposition finished"
        );
        Ok(record)
    }

    async fn call<T, F, Fut>(&self, step: &'static str, call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = zenodo_client::Result<T>>,
    {
        with_retry(self.retry, step, ZenodoError::is_transient, call)
            .await
            .map_err(|source| CraterError::Deposition { step, source })
    }
}
