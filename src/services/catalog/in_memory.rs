use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;

use crate::models::{Content, ContentId};

use super::{CatalogError, ContentCatalog};

/// Catalog held in process memory, optionally seeded from a JSON file
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    contents: RwLock<HashMap<ContentId, Content>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl IntoIterator<Item = Content>) -> Self {
        let catalog = Self::new();
        for content in contents {
            catalog.insert(content);
        }
        catalog
    }

    /// Loads a JSON array of `Content`
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Seed(format!("{}: {}", path.display(), e)))?;
        let contents: Vec<Content> = serde_json::from_str(&raw)
            .map_err(|e| CatalogError::Seed(format!("{}: {}", path.display(), e)))?;

        tracing::info!(
            path = %path.display(),
            content_count = contents.len(),
            "Seeded in-memory catalog"
        );

        Ok(Self::with_contents(contents))
    }

    /// Adds or replaces a catalog entry
    pub fn insert(&self, content: Content) {
        self.contents.write().insert(content.id, content);
    }

    pub fn len(&self) -> usize {
        self.contents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.read().is_empty()
    }
}

#[async_trait::async_trait]
impl ContentCatalog for InMemoryCatalog {
    async fn get_content(&self, content_id: ContentId) -> Result<Option<Content>, CatalogError> {
        Ok(self.contents.read().get(&content_id).cloned())
    }

    async fn list_contents(&self) -> Result<Vec<Content>, CatalogError> {
        let mut contents: Vec<Content> = self.contents.read().values().cloned().collect();
        contents.sort_by_key(|content| content.id);
        Ok(contents)
    }

    async fn content_exists(&self, content_id: ContentId) -> Result<bool, CatalogError> {
        Ok(self.contents.read().contains_key(&content_id))
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;
    use std::io::Write;

    #[tokio::test]
    async fn test_lookup() {
        let catalog = InMemoryCatalog::with_contents(vec![Content::new(
            ContentId(1),
            "Inception",
            ContentType::Movie,
        )]);

        assert!(catalog.content_exists(ContentId(1)).await.unwrap());
        assert!(!catalog.content_exists(ContentId(2)).await.unwrap());

        let content = catalog.get_content(ContentId(1)).await.unwrap().unwrap();
        assert_eq!(content.title, "Inception");
    }

    #[tokio::test]
    async fn test_insert_replaces() {
        let catalog = InMemoryCatalog::new();
        catalog.insert(Content::new(ContentId(1), "Old", ContentType::Show));
        catalog.insert(Content::new(ContentId(1), "New", ContentType::Show));

        assert_eq!(catalog.len(), 1);
        let content = catalog.get_content(ContentId(1)).await.unwrap().unwrap();
        assert_eq!(content.title, "New");
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let catalog = InMemoryCatalog::with_contents(vec![
            Content::new(ContentId(3), "Severance", ContentType::Show),
            Content::new(ContentId(1), "Heat", ContentType::Movie),
            Content::new(ContentId(2), "Frieren", ContentType::Anime),
        ]);

        let ids: Vec<ContentId> = catalog
            .list_contents()
            .await
            .unwrap()
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![ContentId(1), ContentId(2), ContentId(3)]);
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("watchrank-seed-{}.json", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[
                {{"id": 1, "title": "Arrival", "content_type": "movie", "genres": ["sci-fi"]}},
                {{"id": 2, "title": "Dark", "content_type": "show", "platforms": ["netflix"]}}
            ]"#
        )
        .unwrap();

        let catalog = InMemoryCatalog::from_json_file(&path).unwrap();
        assert_eq!(catalog.len(), 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_from_missing_file() {
        let result = InMemoryCatalog::from_json_file("/nonexistent/watchrank-seed.json");
        assert!(matches!(result, Err(CatalogError::Seed(_))));
    }
}
