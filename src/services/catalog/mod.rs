//! Content catalog collaborators
//!
//! The ranking engine never owns content metadata. It asks a catalog whether a
//! content id exists before recording a watch, and the HTTP layer uses the same
//! catalog for lookups. Catalogs may be local (in-memory) or remote (HTTP).

use crate::models::{Content, ContentId};

pub mod http;
pub mod in_memory;

pub use http::HttpCatalog;
pub use in_memory::InMemoryCatalog;

/// Failures reaching a content catalog
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Catalog returned status {0}")]
    Status(u16),

    #[error("Catalog seed error: {0}")]
    Seed(String),
}

/// Read-only access to the content catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContentCatalog: Send + Sync {
    /// Fetch a single content entry, `None` if the catalog has no such id
    async fn get_content(&self, content_id: ContentId) -> Result<Option<Content>, CatalogError>;

    /// Every catalog entry, ordered by id
    async fn list_contents(&self) -> Result<Vec<Content>, CatalogError>;

    /// Whether the catalog knows `content_id`
    async fn content_exists(&self, content_id: ContentId) -> Result<bool, CatalogError> {
        Ok(self.get_content(content_id).await?.is_some())
    }

    /// Catalog name for logging
    fn name(&self) -> &'static str;
}
