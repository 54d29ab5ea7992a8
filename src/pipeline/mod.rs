// src/pipeline/mod.rs
//! The fetch-and-cache pipeline behind the HTTP surface.
//!
//! `Mirror` wires one Notion repository and one cache into the page
//! fetcher, the collection fetcher and the archiver. It is built once at
//! startup and shared by every request.

mod archiver;
mod collection_fetcher;
pub mod normalizer;
mod page_fetcher;

pub use archiver::{ArchiveOutcome, PageArchiver};
pub use collection_fetcher::CollectionFetcher;
pub use normalizer::{normalize_block, normalize_tree, BlockTreeBuilder};
pub use page_fetcher::PageFetcher;

use crate::api::NotionRepository;
use crate::cache::ReadThroughCache;
use crate::config::FetchSettings;
use std::sync::Arc;

pub struct Mirror {
    pub pages: PageFetcher,
    pub collection: CollectionFetcher,
    pub archiver: PageArchiver,
    pub cache: ReadThroughCache,
}

impl Mirror {
    pub fn new(
        repo: Arc<dyn NotionRepository>,
        cache: ReadThroughCache,
        settings: &FetchSettings,
        database: Option<String>,
    ) -> Self {
        let tree = BlockTreeBuilder::new(repo.clone(), settings);
        Self {
            pages: PageFetcher::new(repo.clone(), cache.clone(), tree.clone()),
            collection: CollectionFetcher::new(
                repo.clone(),
                cache.clone(),
                tree,
                database,
                settings.row_concurrency,
            ),
            archiver: PageArchiver::new(repo, cache.clone()),
            cache,
        }
    }
}
