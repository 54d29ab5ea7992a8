// src/pipeline/page_fetcher.rs
//! Single-page read-through: cache first, then Notion.

use super::normalizer::BlockTreeBuilder;
use crate::api::adapter::decode_properties;
use crate::api::NotionRepository;
use crate::cache::{CacheKey, ReadThroughCache};
use crate::error::AppError;
use crate::model::{Page, TreeSummary};
use crate::types::PageId;
use std::sync::Arc;

pub struct PageFetcher {
    repo: Arc<dyn NotionRepository>,
    cache: ReadThroughCache,
    tree: BlockTreeBuilder,
}

impl PageFetcher {
    pub fn new(
        repo: Arc<dyn NotionRepository>,
        cache: ReadThroughCache,
        tree: BlockTreeBuilder,
    ) -> Self {
        Self { repo, cache, tree }
    }

    /// The page with its normalized blocks. A cached copy is served unless
    /// `force_refresh` is set; a fresh copy is always written back.
    pub async fn fetch(&self, id: &PageId, force_refresh: bool) -> Result<Page, AppError> {
        let key = CacheKey::Page(id.clone());
        if !force_refresh {
            if let Some(page) = self.cache.read::<Page>(&key).await {
                return Ok(page);
            }
        }

        let page = self.fetch_fresh(id).await?;
        self.cache.write(&key, &page).await;
        Ok(page)
    }

    async fn fetch_fresh(&self, id: &PageId) -> Result<Page, AppError> {
        let root = id.cast();
        let (notion_page, blocks) =
            tokio::try_join!(self.repo.retrieve_page(id), self.tree.build(&root))?;

        let summary = TreeSummary::of(&blocks);
        log::info!(
            "Fetched page {}: {} properties, {} blocks, nesting {}",
            id,
            notion_page.properties.len(),
            summary.nodes,
            summary.deepest_nesting
        );

        Ok(Page {
            properties: decode_properties(&notion_page, Page::RESERVED_KEYS),
            id: notion_page.id,
            url: notion_page.url,
            blocks,
        })
    }
}
