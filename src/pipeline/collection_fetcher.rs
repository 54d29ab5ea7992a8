// src/pipeline/collection_fetcher.rs
//! Collection listing: every database row with its block content.

use super::normalizer::BlockTreeBuilder;
use crate::api::adapter::{decode_properties, derive_title};
use crate::api::responses::NotionPage;
use crate::api::NotionRepository;
use crate::cache::{CacheKey, ReadThroughCache};
use crate::error::AppError;
use crate::model::{flatten_full_text, CollectionEntry, PageContent};
use crate::types::{BlockId, DatabaseId};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

pub struct CollectionFetcher {
    repo: Arc<dyn NotionRepository>,
    cache: ReadThroughCache,
    tree: BlockTreeBuilder,
    /// Raw configured database id; checked on every uncached request.
    database: Option<String>,
    row_concurrency: usize,
}

impl CollectionFetcher {
    pub fn new(
        repo: Arc<dyn NotionRepository>,
        cache: ReadThroughCache,
        tree: BlockTreeBuilder,
        database: Option<String>,
        row_concurrency: usize,
    ) -> Self {
        Self {
            repo,
            cache,
            tree,
            database,
            row_concurrency: row_concurrency.max(1),
        }
    }

    /// All rows of the configured database in Notion's order.
    pub async fn fetch(&self, force_refresh: bool) -> Result<Vec<CollectionEntry>, AppError> {
        if !force_refresh {
            if let Some(entries) = self.cache.read(&CacheKey::Collection).await {
                return Ok(entries);
            }
        }

        let database = self.database_id()?;
        let rows = self.repo.query_collection(&database).await?;
        let row_count = rows.len();

        let entries: Vec<CollectionEntry> = stream::iter(rows)
            .map(|row| self.build_entry(row))
            .buffered(self.row_concurrency)
            .collect()
            .await;

        let degraded = entries.iter().filter(|entry| entry.content.is_none()).count();
        log::info!(
            "Mirrored {} rows of database {} ({} without content)",
            row_count,
            database,
            degraded
        );

        self.cache.write(&CacheKey::Collection, &entries).await;
        Ok(entries)
    }

    fn database_id(&self) -> Result<DatabaseId, AppError> {
        let raw = self.database.as_deref().ok_or_else(|| {
            AppError::MissingConfiguration("Notion Database ID is not configured".to_string())
        })?;
        Ok(DatabaseId::parse(raw)?)
    }

    async fn build_entry(&self, row: NotionPage) -> CollectionEntry {
        let content = match self.tree.build(&BlockId::from_api(&row.id)).await {
            Ok(blocks) => Some(PageContent {
                full_text: flatten_full_text(&blocks),
                blocks,
            }),
            Err(e) => {
                log::warn!("Content of row {} unavailable: {}", row.id, e);
                None
            }
        };

        CollectionEntry {
            page_title: derive_title(&row),
            properties: decode_properties(&row, CollectionEntry::RESERVED_KEYS),
            id: row.id,
            url: row.url,
            content,
        }
    }
}
