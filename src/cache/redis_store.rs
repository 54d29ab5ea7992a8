// src/cache/redis_store.rs
//! Redis-backed cache store.

use super::CacheStore;
use crate::constants::{CACHE_CONNECT_TIMEOUT_MS, CACHE_RESPONSE_TIMEOUT_MS};
use crate::error::CacheError;
use parking_lot::Mutex;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;

/// Cache store over a single multiplexed Redis connection.
///
/// The connection is opened on first use and dropped after any command
/// error or timeout, so a Redis restart costs one failed request rather
/// than a service restart. Connecting and every command are bounded, so
/// a server that stops answering reads as an outage.
pub struct RedisCache {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl RedisCache {
    /// Validates the URL; no connection is made until the first command.
    pub fn open(url: &str) -> Result<Self, CacheError> {
        Ok(Self {
            client: redis::Client::open(url)?,
            connection: Mutex::new(None),
            connect_timeout: Duration::from_millis(CACHE_CONNECT_TIMEOUT_MS),
            response_timeout: Duration::from_millis(CACHE_RESPONSE_TIMEOUT_MS),
        })
    }

    /// Overrides the connect and per-command timeouts.
    pub fn with_timeouts(mut self, connect: Duration, response: Duration) -> Self {
        self.connect_timeout = connect;
        self.response_timeout = response;
        self
    }

    async fn connection(&self) -> Result<MultiplexedConnection, CacheError> {
        let cached = self.connection.lock().clone();
        if let Some(connection) = cached {
            return Ok(connection);
        }
        log::debug!("Opening Redis connection");
        let connection = tokio::time::timeout(
            self.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| CacheError::Timeout {
            operation: "connect",
            after: self.connect_timeout,
        })??;
        *self.connection.lock() = Some(connection.clone());
        Ok(connection)
    }

    /// Runs one command, dropping the connection if it fails or stalls.
    async fn bounded<T, F>(&self, operation: &'static str, command: F) -> Result<T, CacheError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        let outcome = match tokio::time::timeout(self.response_timeout, command).await {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => Err(CacheError::Timeout {
                operation,
                after: self.response_timeout,
            }),
        };
        if outcome.is_err() {
            *self.connection.lock() = None;
        }
        outcome
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisCache {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection().await?;
        self.bounded("GET", connection.get::<_, Option<String>>(key))
            .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut connection = self.connection().await?;
        match ttl {
            Some(ttl) => {
                let seconds = ttl.as_secs().max(1);
                self.bounded("SET", connection.set_ex::<_, _, ()>(key, value, seconds))
                    .await
            }
            None => {
                self.bounded("SET", connection.set::<_, _, ()>(key, value))
                    .await
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut connection = self.connection().await?;
        self.bounded("DEL", connection.del::<_, ()>(key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, ReadThroughCache};
    use std::sync::Arc;
    use tokio::net::TcpListener;

    #[test]
    fn open_rejects_non_redis_urls() {
        assert!(RedisCache::open("http://localhost:6379").is_err());
        assert!(RedisCache::open("redis://localhost:6379").is_ok());
    }

    #[tokio::test]
    async fn unreachable_server_surfaces_as_backend_error() {
        let cache = RedisCache::open("redis://127.0.0.1:1").unwrap();
        assert!(matches!(
            cache.get("anything").await,
            Err(CacheError::Backend(_))
        ));
        assert_eq!(cache.backend(), "redis");
    }

    /// A server that accepts connections and never replies.
    async fn silent_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("redis://{}", addr)
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let cache = RedisCache::open(&silent_server().await)
            .unwrap()
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));

        let outcome = tokio::time::timeout(Duration::from_secs(5), cache.get("page:a"))
            .await
            .expect("cache call should be bounded");
        assert!(matches!(outcome, Err(CacheError::Timeout { .. })));
    }

    #[tokio::test]
    async fn silent_server_reads_as_a_miss() {
        let store = RedisCache::open(&silent_server().await)
            .unwrap()
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
        let cache = ReadThroughCache::new(Arc::new(store), None);

        let read = tokio::time::timeout(
            Duration::from_secs(5),
            cache.read::<Vec<String>>(&CacheKey::Collection),
        )
        .await
        .expect("cache read should be bounded");
        assert!(read.is_none());
    }
}
