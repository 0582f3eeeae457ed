/// Remote content catalog
///
/// API Flow:
/// GET {base_url}/content → 200 with a `Content` array.
/// GET {base_url}/content/{id} → 200 with a `Content` body, 404 if unknown.
/// Every other status is treated as the catalog being unavailable.
use reqwest::{Client as HttpClient, StatusCode};
use std::time::Duration;

use crate::models::{Content, ContentId};

use super::{CatalogError, ContentCatalog};

#[derive(Clone)]
pub struct HttpCatalog {
    http_client: HttpClient,
    base_url: String,
}

impl HttpCatalog {
    /// Creates a client whose requests are bounded by `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn list_url(&self) -> String {
        format!("{}/content", self.base_url)
    }

    fn content_url(&self, content_id: ContentId) -> String {
        format!("{}/content/{}", self.base_url, content_id)
    }
}

#[async_trait::async_trait]
impl ContentCatalog for HttpCatalog {
    async fn get_content(&self, content_id: ContentId) -> Result<Option<Content>, CatalogError> {
        let response = self
            .http_client
            .get(self.content_url(content_id))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => {
                tracing::warn!(
                    content_id = %content_id,
                    status = status.as_u16(),
                    "Catalog lookup failed"
                );
                Err(CatalogError::Status(status.as_u16()))
            }
        }
    }

    async fn list_contents(&self) -> Result<Vec<Content>, CatalogError> {
        let response = self.http_client.get(self.list_url()).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Catalog listing failed");
            return Err(CatalogError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
