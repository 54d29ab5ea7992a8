// src/constants.rs
//! Domain constants that define the operational boundaries of the service.
//!
//! Reading these constants should tell you how the mirror behaves: how
//! much it asks Notion for at once, how deep it walks block trees, how
//! long it trusts the cache.

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// How many objects the Notion API returns per page of results.
///
/// The Notion API maximum is 100.
pub const NOTION_API_PAGE_SIZE: u32 = 100;

/// Notion API version sent with every request.
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// Production Notion API endpoint.
pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1/";

// ---------------------------------------------------------------------------
// Block tree boundaries
// ---------------------------------------------------------------------------

/// Default number of block levels kept below a page (top level included).
pub const DEFAULT_MAX_BLOCK_DEPTH: u8 = 3;

/// Child-block requests issued concurrently before waiting for the batch.
pub const DEFAULT_CHILD_FETCH_BATCH_SIZE: usize = 10;

/// Prefix of the content string emitted for block types we do not model.
pub const UNSUPPORTED_BLOCK_PREFIX: &str = "Unsupported block type: ";

/// Property names probed, in order, for a collection row's display title.
///
/// The trailing-space variant exists in real workspaces and must be kept.
pub const TITLE_PROPERTY_CANDIDATES: [&str; 4] = ["Pages", "Pages ", "Name", "Title"];

// ---------------------------------------------------------------------------
// Cache boundaries
// ---------------------------------------------------------------------------

/// How long a cached page or listing is served without asking Notion.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Cache key holding the whole collection listing.
pub const COLLECTION_CACHE_KEY: &str = "notion_pages";

/// Prefix of per-page cache keys (`page:<id>`).
pub const PAGE_CACHE_KEY_PREFIX: &str = "page:";

/// Key written and read back by the connectivity probe.
pub const CACHE_PROBE_KEY: &str = "test-key";

/// Value written by the connectivity probe.
pub const CACHE_PROBE_VALUE: &str = "Hello from Redis!";

/// Used when `REDIS_URL` is not set.
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// How long opening a Redis connection may take before the cache is
/// treated as unavailable.
pub const CACHE_CONNECT_TIMEOUT_MS: u64 = 2_000;

/// How long a single Redis command may wait for its reply.
pub const CACHE_RESPONSE_TIMEOUT_MS: u64 = 1_000;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing unparseable response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;
