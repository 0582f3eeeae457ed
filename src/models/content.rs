use serde::{Deserialize, Serialize};

use super::ContentId;

/// Kind of catalog entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Movie,
    Show,
    Documentary,
    Anime,
}

/// A catalog entry that users can watch and rank
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub id: ContentId,
    pub title: String,
    pub content_type: ContentType,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Content {
    /// Creates a catalog entry with only the required fields set
    pub fn new(id: ContentId, title: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            id,
            title: title.into(),
            content_type,
            year: None,
            rating: None,
            genres: Vec::new(),
            platforms: Vec::new(),
            image: None,
            description: None,
        }
    }
}
