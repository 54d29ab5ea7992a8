// src/api/client.rs
//! HTTP client wrapper for the Notion API.
//!
//! A thin layer over reqwest: authentication headers, URL building and
//! request/response plumbing. Parsing lives in `parser`, pagination in
//! `pagination`.

use super::pagination::{collect_pages, CursorPolicy};
use super::parser::parse_api_response;
use super::responses::{
    BlockChildrenResponse, NotionBlock, NotionPage, QueryDatabaseRequest, QueryDatabaseResponse,
    UpdatePageRequest,
};
use super::NotionRepository;
use crate::constants::{NOTION_API_BASE_URL, NOTION_API_VERSION};
use crate::error::AppError;
use crate::types::{ApiKey, BlockId, DatabaseId, PageId};
use reqwest::{header, Client, Response};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Transport settings for the Notion client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum idle connections per host
    pub max_idle_per_host: usize,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// Enable connection keep-alive
    pub tcp_keepalive: Option<Duration>,
    /// How far list endpoints follow `next_cursor`
    pub cursors: CursorPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 10,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            tcp_keepalive: Some(Duration::from_secs(60)),
            cursors: CursorPolicy::default(),
        }
    }
}

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: Url,
    cursors: CursorPolicy,
}

impl NotionHttpClient {
    /// Creates a client. Without an API key requests go out
    /// unauthenticated and Notion answers them with `unauthorized`.
    pub fn new(api_key: Option<&ApiKey>, config: &ClientConfig) -> Result<Self, AppError> {
        let mut builder = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout);

        if let Some(keepalive) = config.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: Url::parse(NOTION_API_BASE_URL)?,
            cursors: config.cursors,
        })
    }

    /// Points the client at another API root, such as a local stub server.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, AppError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        self.base_url = Url::parse(&normalized)?;
        Ok(self)
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: Option<&ApiKey>) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        if let Some(api_key) = api_key {
            let auth_header = format!("Bearer {}", api_key.as_str());
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&auth_header).map_err(|e| {
                    AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
                })?,
            );
        }

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_API_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    fn endpoint(&self, path: &str) -> Result<Url, AppError> {
        Ok(self.base_url.join(path)?)
    }

    /// Makes a GET request to the specified URL.
    pub async fn get(&self, url: Url) -> Result<Response, AppError> {
        log::debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }

    /// Makes a POST request with JSON body to the specified URL.
    pub async fn post<T: Serialize>(&self, url: Url, body: &T) -> Result<Response, AppError> {
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }

    /// Makes a PATCH request with JSON body to the specified URL.
    pub async fn patch<T: Serialize>(&self, url: Url, body: &T) -> Result<Response, AppError> {
        log::debug!("PATCH {}", url);
        Ok(self.client.patch(url).json(body).send().await?)
    }
}

#[async_trait::async_trait]
impl NotionRepository for NotionHttpClient {
    async fn retrieve_page(&self, id: &PageId) -> Result<NotionPage, AppError> {
        let url = self.endpoint(&format!("pages/{}", id.to_dashed()))?;
        let response = self.get(url).await?;
        parse_api_response(extract_response_text(response).await?)
    }

    async fn list_children(&self, parent: &BlockId) -> Result<Vec<NotionBlock>, AppError> {
        let base = self.endpoint(&format!("blocks/{}/children", parent.to_dashed()))?;
        let context = format!("Block {}", parent);
        let result = collect_pages(self.cursors, &context, |page_size, cursor| {
            let mut url = base.clone();
            url.query_pairs_mut()
                .append_pair("page_size", &page_size.to_string());
            if let Some(cursor) = &cursor {
                url.query_pairs_mut().append_pair("start_cursor", cursor);
            }
            async move {
                let response = self.get(url).await?;
                parse_api_response::<BlockChildrenResponse>(extract_response_text(response).await?)
            }
        })
        .await?;
        Ok(result.items)
    }

    async fn query_collection(&self, database: &DatabaseId) -> Result<Vec<NotionPage>, AppError> {
        let url = self.endpoint(&format!("databases/{}/query", database.to_dashed()))?;
        let context = format!("Database {}", database);
        let result = collect_pages(self.cursors, &context, |page_size, start_cursor| {
            let url = url.clone();
            let body = QueryDatabaseRequest {
                page_size,
                start_cursor,
            };
            async move {
                let response = self.post(url, &body).await?;
                parse_api_response::<QueryDatabaseResponse>(extract_response_text(response).await?)
            }
        })
        .await?;
        log::info!(
            "Database {} returned {} rows in {} request(s)",
            database,
            result.items.len(),
            result.pages_fetched
        );
        Ok(result.items)
    }

    async fn archive_page(&self, id: &PageId) -> Result<(), AppError> {
        let url = self.endpoint(&format!("pages/{}", id.to_dashed()))?;
        let response = self
            .patch(url, &UpdatePageRequest { archived: true })
            .await?;
        let page: NotionPage = parse_api_response(extract_response_text(response).await?)?;
        if !page.archived {
            log::warn!("Notion did not report page {} as archived", id);
        }
        Ok(())
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
