// src/config.rs
use crate::api::{ClientConfig, CursorPolicy};
use crate::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_CHILD_FETCH_BATCH_SIZE, DEFAULT_MAX_BLOCK_DEPTH,
    DEFAULT_REDIS_URL,
};
use crate::error::AppError;
use crate::types::ApiKey;
use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

/// Parsed and validated command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Address the HTTP server listens on
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Deepest block level fetched; top-level blocks are level 1
    #[arg(long, default_value_t = DEFAULT_MAX_BLOCK_DEPTH,
          value_parser = clap::value_parser!(u8).range(1..))]
    pub max_depth: u8,

    /// Fetch nested blocks without a depth limit (overrides --max-depth)
    #[arg(long, default_value_t = false)]
    pub unbounded_depth: bool,

    /// Concurrent child-block requests per batch
    #[arg(long, default_value_t = DEFAULT_CHILD_FETCH_BATCH_SIZE,
          value_parser = parse_positive)]
    pub child_batch_size: usize,

    /// Collection rows processed concurrently (default: auto, max 24)
    #[arg(long, value_parser = parse_positive)]
    pub row_concurrency: Option<usize>,

    /// Cache entry lifetime in seconds (0 = entries never expire)
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECS)]
    pub cache_ttl: u64,

    /// Cache backend
    #[arg(long, value_enum, default_value_t = CacheBackend::Redis)]
    pub cache_backend: CacheBackend,

    /// Follow pagination cursors instead of mirroring only the first 100
    /// items of every listing
    #[arg(long, default_value_t = false)]
    pub follow_cursors: bool,

    /// Notion request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub request_timeout: u64,
}

fn parse_positive(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(value) => Ok(value),
        Err(e) => Err(e.to_string()),
    }
}

/// Where cache entries live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackend {
    Redis,
    Memory,
    None,
}

/// How deep block trees are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthLimit {
    /// Blocks down to this level are kept; top-level blocks are level 1.
    Bounded(u8),
    Unbounded,
}

impl DepthLimit {
    /// Whether a block at `depth` may have its children fetched.
    pub fn allows_children(&self, depth: usize) -> bool {
        match self {
            Self::Bounded(max) => depth < usize::from(*max),
            Self::Unbounded => true,
        }
    }
}

impl Default for DepthLimit {
    fn default() -> Self {
        Self::Bounded(DEFAULT_MAX_BLOCK_DEPTH)
    }
}

/// Knobs of the fetch pipeline.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub depth: DepthLimit,
    /// Child-block requests issued concurrently per batch.
    pub child_batch_size: usize,
    /// Collection rows processed concurrently.
    pub row_concurrency: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            depth: DepthLimit::default(),
            child_batch_size: DEFAULT_CHILD_FETCH_BATCH_SIZE,
            row_concurrency: default_row_concurrency(),
        }
    }
}

/// Row workers wait on the network, so more of them than cores is fine.
fn default_row_concurrency() -> usize {
    num_cpus::get().clamp(4, 24)
}

/// Resolved service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub verbose: bool,
    /// `None` when `NOTION_API_KEY` is unset; requests then go out
    /// unauthenticated.
    pub api_key: Option<ApiKey>,
    /// Raw `NOTION_DATABASE_ID`, validated when the collection is requested.
    pub database_id: Option<String>,
    pub redis_url: String,
    pub cache_backend: CacheBackend,
    /// `None` means entries never expire.
    pub cache_ttl: Option<Duration>,
    pub fetch: FetchSettings,
    pub client: ClientConfig,
}

impl ServiceConfig {
    /// Resolves the configuration from CLI input and the process environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        Self::resolve_with(cli, |name| std::env::var(name).ok())
    }

    /// Resolves the configuration with an explicit environment lookup.
    pub fn resolve_with<F>(cli: CommandLineInput, env: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| env(name).filter(|value| !value.trim().is_empty());

        let api_key = match non_empty("NOTION_API_KEY") {
            Some(raw) => Some(ApiKey::new(raw.trim())?),
            None => {
                log::warn!("NOTION_API_KEY is not set; Notion requests will be unauthenticated");
                None
            }
        };

        let database_id = non_empty("NOTION_DATABASE_ID");
        if database_id.is_none() {
            log::warn!(
                "NOTION_DATABASE_ID is not set; the collection endpoint will reject requests"
            );
        }

        let depth = if cli.unbounded_depth {
            DepthLimit::Unbounded
        } else {
            DepthLimit::Bounded(cli.max_depth)
        };

        let client = ClientConfig {
            request_timeout: Duration::from_secs(cli.request_timeout.max(1)),
            cursors: if cli.follow_cursors {
                CursorPolicy::FollowAll
            } else {
                CursorPolicy::FirstPage
            },
            ..ClientConfig::default()
        };

        Ok(ServiceConfig {
            bind: cli.bind,
            verbose: cli.verbose,
            api_key,
            database_id,
            redis_url: non_empty("REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            cache_backend: cli.cache_backend,
            cache_ttl: (cli.cache_ttl > 0).then(|| Duration::from_secs(cli.cache_ttl)),
            fetch: FetchSettings {
                depth,
                child_batch_size: cli.child_batch_size,
                row_concurrency: cli
                    .row_concurrency
                    .unwrap_or_else(default_row_concurrency),
            },
            client,
        })
    }
}
