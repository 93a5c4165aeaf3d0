use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::Category;
use reqwest::Client;
use url::Url;

use crate::error::SourceError;

/// Remote location of the per-category question documents.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the raw document for `category`.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` on timeout, transport failure or a non-success status.
    async fn fetch(&self, category: Category) -> Result<String, SourceError>;
}

/// Fetches `<base_url>/<category data file>` over HTTP with a bounded timeout.
#[derive(Clone)]
pub struct HttpQuestionSource {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpQuestionSource {
    #[must_use]
    pub fn new(client: Client, base_url: Url, timeout: Duration) -> Self {
        Self {
            client,
            base_url,
            timeout,
        }
    }

    /// Document URL for `category`.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the file name cannot be joined onto the base.
    pub fn document_url(&self, category: Category) -> Result<Url, url::ParseError> {
        self.base_url.join(category.data_file())
    }
}

#[async_trait]
impl QuestionSource for HttpQuestionSource {
    async fn fetch(&self, category: Category) -> Result<String, SourceError> {
        let url = self.document_url(category)?;
        tokio::time::timeout(self.timeout, get_text(&self.client, url))
            .await
            .map_err(|_| SourceError::Timeout)?
    }
}

async fn get_text(client: &Client, url: Url) -> Result<String, SourceError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(SourceError::HttpStatus(response.status()));
    }
    Ok(response.text().await?)
}

/// Source that never delivers, for running on cached and built-in data only.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

#[async_trait]
impl QuestionSource for OfflineSource {
    async fn fetch(&self, _category: Category) -> Result<String, SourceError> {
        Err(SourceError::Offline)
    }
}
