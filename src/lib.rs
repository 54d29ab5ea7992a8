// src/lib.rs
//! notion-mirror library: mirrors a Notion database into a cached JSON API.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `CacheError`, `ValidationError`
//! - **Configuration**: `CommandLineInput`, `ServiceConfig`, `FetchSettings`
//! - **Domain model**: `Page`, `CollectionEntry`, `BlockNode`, `PropertyValue`
//! - **API client**: `NotionRepository`, `NotionHttpClient`
//! - **Cache**: `CacheStore` and its Redis, in-memory and disabled backends
//! - **Pipeline**: `Mirror` with its page fetcher, collection fetcher and archiver
//! - **HTTP**: `build_router`, `AppState`

pub mod api;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod server;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, CacheError, NotionClientError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CacheBackend, CommandLineInput, DepthLimit, FetchSettings, ServiceConfig};

// --- Domain Model ---
pub use crate::model::{
    flatten_full_text, BlockKind, BlockNode, CollectionEntry, Page, PageContent, Person,
    PropertyMap, PropertyValue,
};

// --- Domain Types ---
pub use crate::types::{ApiKey, BlockId, DatabaseId, PageId};

// --- API Client ---
pub use crate::api::{ClientConfig, CursorPolicy, NotionHttpClient, NotionRepository};

// --- Cache ---
pub use crate::cache::{
    CacheKey, CacheStore, DisabledCache, MemoryCache, ReadThroughCache, RedisCache,
};

// --- Pipeline ---
pub use crate::pipeline::{ArchiveOutcome, Mirror};

// --- HTTP ---
pub use crate::server::{build_router, AppState};
