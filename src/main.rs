// src/main.rs
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_mirror::{
    build_router, AppState, CacheBackend, CacheStore, CommandLineInput, DisabledCache,
    MemoryCache, Mirror, NotionHttpClient, NotionRepository, ReadThroughCache, RedisCache,
    ServiceConfig,
};
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("notion_mirror.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "[{l}] {m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Builds the cache store selected on the command line.
fn open_cache(config: &ServiceConfig) -> anyhow::Result<Arc<dyn CacheStore>> {
    Ok(match config.cache_backend {
        CacheBackend::Redis => {
            log::info!("Cache backend: Redis at {}", config.redis_url);
            Arc::new(RedisCache::open(&config.redis_url).context("Invalid REDIS_URL")?)
        }
        CacheBackend::Memory => {
            log::info!("Cache backend: in-memory");
            Arc::new(MemoryCache::new())
        }
        CacheBackend::None => {
            log::info!("Cache disabled; every request goes to the Notion API");
            Arc::new(DisabledCache)
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose).context("Failed to initialize logging")?;

    let config = ServiceConfig::resolve(cli)?;

    let client = NotionHttpClient::new(config.api_key.as_ref(), &config.client)?;
    let repo: Arc<dyn NotionRepository> = Arc::new(client);
    let cache = ReadThroughCache::new(open_cache(&config)?, config.cache_ttl);

    let mirror = Mirror::new(repo, cache, &config.fetch, config.database_id.clone());
    let app = build_router(AppState::new(mirror));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    log::info!(
        "Serving on http://{} (depth {:?}, {} row workers)",
        config.bind,
        config.fetch.depth,
        config.fetch.row_concurrency
    );

    axum::serve(listener, app).await?;
    Ok(())
}
