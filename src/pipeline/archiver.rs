// src/pipeline/archiver.rs
//! Page deletion: archive in Notion, then evict the cached copy.

use crate::api::NotionRepository;
use crate::cache::{CacheKey, ReadThroughCache};
use crate::error::AppError;
use crate::types::PageId;
use std::sync::Arc;

/// What happened to the cached copy of an archived page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveOutcome {
    /// False when eviction failed; the stale entry is served until it
    /// expires.
    pub evicted: bool,
}

pub struct PageArchiver {
    repo: Arc<dyn NotionRepository>,
    cache: ReadThroughCache,
}

impl PageArchiver {
    pub fn new(repo: Arc<dyn NotionRepository>, cache: ReadThroughCache) -> Self {
        Self { repo, cache }
    }

    /// Archives the page. The collection listing keeps its entry until it
    /// is refreshed or expires.
    pub async fn delete(&self, id: &PageId) -> Result<ArchiveOutcome, AppError> {
        self.repo.archive_page(id).await?;
        log::info!("Archived page {}", id);
        let evicted = self.cache.evict(&CacheKey::Page(id.clone())).await;
        Ok(ArchiveOutcome { evicted })
    }
}
