// tests/common/mod.rs
//! Shared test doubles: an in-memory Notion workspace and a cache store
//! whose operations can be made to fail.
#![allow(dead_code)]

use notion_mirror::api::responses::{
    BlockChildrenResponse, NotionBlock, NotionPage, QueryDatabaseResponse,
};
use notion_mirror::{
    AppError, BlockId, CacheError, CacheStore, DatabaseId, FetchSettings, MemoryCache, Mirror,
    NotionClientError, NotionErrorCode, NotionRepository, PageId, ReadThroughCache,
};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const PAGE_ID: &str = "216cd412-8533-8087-a989-cf37889137c3";
pub const DATABASE_ID: &str = "0a1b2c3d-4e5f-4071-8293-a4b5c6d7e8f9";
pub const TOGGLE_ID: &str = "5f0e6a2c-1b7d-4c8e-9a3f-2d4b6c8e0a11";
pub const LIST_ID: &str = "7a1c3e5f-2b4d-4f6a-8c0e-1a3c5e7f9b22";
pub const DEEPER_ID: &str = "be5a7c9d-6f8b-4a9b-a4d6-6b79dbf3c5bb";
pub const ROW_A: &str = "a1111111-1111-4111-8111-111111111111";
pub const ROW_B: &str = "b2222222-2222-4222-8222-222222222222";
pub const ROW_C: &str = "c3333333-3333-4333-8333-333333333333";

/// Loads a JSON fixture from `tests/fixtures`.
pub fn fixture<T: DeserializeOwned>(name: &str) -> T {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let raw = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Cannot read fixture {}: {}", path.display(), e));
    serde_json::from_str(&raw)
        .unwrap_or_else(|e| panic!("Cannot parse fixture {}: {}", path.display(), e))
}

pub fn fixture_blocks(name: &str) -> Vec<NotionBlock> {
    fixture::<BlockChildrenResponse>(name).results
}

pub fn fixture_rows() -> Vec<NotionPage> {
    fixture::<QueryDatabaseResponse>("collection_query.json").results
}

/// A text block of `kind` carrying `text`.
pub fn text_block(id: &str, kind: &str, text: &str, has_children: bool) -> NotionBlock {
    serde_json::from_value(json!({
        "object": "block",
        "id": id,
        "type": kind,
        "has_children": has_children,
        kind: {"rich_text": [{"type": "text", "plain_text": text}], "color": "default"}
    }))
    .unwrap()
}

fn key(id: &str) -> String {
    BlockId::from_api(id).as_str().to_string()
}

fn not_found(id: &str) -> AppError {
    NotionClientError::NotionApi {
        status: 404,
        code: NotionErrorCode::ObjectNotFound,
        message: format!("Could not find block with ID: {}", id),
        request_id: None,
    }
    .into()
}

/// In-memory Notion workspace with call counters and failure injection.
#[derive(Default)]
pub struct FakeNotion {
    pages: Mutex<HashMap<String, NotionPage>>,
    children: Mutex<HashMap<String, Vec<NotionBlock>>>,
    rows: Mutex<Vec<NotionPage>>,
    failing: Mutex<HashSet<String>>,
    pub page_calls: AtomicUsize,
    pub children_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub archived: Mutex<Vec<String>>,
    latency: Mutex<Option<Duration>>,
    listings_in_flight: AtomicUsize,
    /// Most child listings ever running at once.
    pub max_listings_in_flight: AtomicUsize,
}

impl FakeNotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// The page fixture with its full block tree.
    pub fn with_fixture_page() -> Self {
        let fake = Self::new();
        fake.put_page(fixture("page.json"));
        fake.put_children(PAGE_ID, fixture_blocks("page_blocks.json"));
        fake.put_children(TOGGLE_ID, fixture_blocks("toggle_children.json"));
        fake.put_children(LIST_ID, fixture_blocks("list_children.json"));
        fake.put_children(
            DEEPER_ID,
            vec![
                text_block(
                    "d0000000-0000-4000-8000-000000000001",
                    "paragraph",
                    "Third level",
                    false,
                ),
                text_block(
                    "d0000000-0000-4000-8000-000000000002",
                    "toggle",
                    "Fourth level",
                    true,
                ),
            ],
        );
        fake.put_children(
            "d0000000-0000-4000-8000-000000000002",
            vec![text_block(
                "d0000000-0000-4000-8000-000000000003",
                "paragraph",
                "Too deep",
                false,
            )],
        );
        fake
    }

    /// The collection fixture; every row has one paragraph of content.
    pub fn with_fixture_collection() -> Self {
        let fake = Self::new();
        let rows = fixture_rows();
        for row in &rows {
            fake.put_children(
                &row.id,
                vec![text_block(&row.id, "paragraph", &format!("Body of {}", row.id), false)],
            );
        }
        *fake.rows.lock() = rows;
        fake
    }

    pub fn put_page(&self, page: NotionPage) {
        self.pages.lock().insert(key(&page.id), page);
    }

    pub fn put_children(&self, parent: &str, blocks: Vec<NotionBlock>) {
        self.children.lock().insert(key(parent), blocks);
    }

    /// Every call naming `id` fails with `object_not_found`.
    pub fn fail(&self, id: &str) {
        self.failing.lock().insert(key(id));
    }

    /// Replaces the collection rows.
    pub fn put_rows(&self, rows: Vec<NotionPage>) {
        *self.rows.lock() = rows;
    }

    /// Every child listing waits this long before answering.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    pub fn total_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
            + self.children_calls.load(Ordering::SeqCst)
            + self.query_calls.load(Ordering::SeqCst)
    }

    fn check(&self, id: &str) -> Result<(), AppError> {
        if self.failing.lock().contains(id) {
            Err(not_found(id))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl NotionRepository for FakeNotion {
    async fn retrieve_page(&self, id: &PageId) -> Result<NotionPage, AppError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.check(id.as_str())?;
        self.pages
            .lock()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| not_found(id.as_str()))
    }

    async fn list_children(&self, parent: &BlockId) -> Result<Vec<NotionBlock>, AppError> {
        self.children_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.listings_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_listings_in_flight.fetch_max(running, Ordering::SeqCst);
        let latency = *self.latency.lock();
        match latency {
            Some(latency) => tokio::time::sleep(latency).await,
            None => tokio::task::yield_now().await,
        }
        self.listings_in_flight.fetch_sub(1, Ordering::SeqCst);
        self.check(parent.as_str())?;
        Ok(self
            .children
            .lock()
            .get(parent.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn query_collection(&self, database: &DatabaseId) -> Result<Vec<NotionPage>, AppError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.check(database.as_str())?;
        Ok(self.rows.lock().clone())
    }

    async fn archive_page(&self, id: &PageId) -> Result<(), AppError> {
        self.check(id.as_str())?;
        self.archived.lock().push(id.to_dashed());
        Ok(())
    }
}

/// Memory cache whose reads, writes and deletes can be switched to fail.
#[derive(Default)]
pub struct FlakyCache {
    pub inner: MemoryCache,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_deletes: AtomicBool,
}

impl FlakyCache {
    fn outage(key: &str) -> CacheError {
        CacheError::NotStored {
            key: key.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl CacheStore for FlakyCache {
    fn backend(&self) -> &'static str {
        "flaky"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::outage(key));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::outage(key));
        }
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::outage(key));
        }
        self.inner.delete(key).await
    }
}

pub fn test_settings() -> FetchSettings {
    FetchSettings {
        child_batch_size: 2,
        row_concurrency: 4,
        ..FetchSettings::default()
    }
}

/// A mirror over `repo` and `store` with the fixture database configured.
pub fn mirror(repo: Arc<FakeNotion>, store: Arc<dyn CacheStore>) -> Mirror {
    Mirror::new(
        repo,
        ReadThroughCache::new(store, Some(Duration::from_secs(3600))),
        &test_settings(),
        Some(DATABASE_ID.to_string()),
    )
}

pub fn page_id() -> PageId {
    PageId::parse(PAGE_ID).unwrap()
}
