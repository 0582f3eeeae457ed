pub mod catalog;
pub mod ranking;

pub use catalog::{ContentCatalog, HttpCatalog, InMemoryCatalog};
pub use ranking::RankingService;
