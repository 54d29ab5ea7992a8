// src/api/parser.rs
//! Response parsing for Notion API calls.
//!
//! Success bodies deserialize straight into the wire types; error bodies
//! are read with notion-client's error envelope so the provider's code,
//! message and request id reach the caller intact.

use super::client::ApiResponse;
use super::responses::NotionError;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionClientError, NotionErrorCode};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Parse any Notion API response into `T`, or into the provider's error.
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    if result.status.is_success() {
        parse_success(&result.data, &result.url)
    } else {
        parse_error(&result.data, result.status, &result.url)
    }
}

fn parse_success<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        NotionClientError::Deserialization {
            source: e,
            body: body_preview(body),
        }
        .into()
    })
}

fn parse_error<T>(body: &str, status: StatusCode, url: &str) -> Result<T, AppError> {
    if let Ok(notion_error) = serde_json::from_str::<NotionError>(body) {
        log::warn!(
            "Notion rejected {} with {} ({})",
            url,
            notion_error.code,
            notion_error.status
        );
        return Err(NotionClientError::NotionApi {
            status: notion_error.status,
            code: NotionErrorCode::from_api_response(&notion_error.code),
            message: notion_error.message,
            request_id: notion_error.request_id,
        }
        .into());
    }

    log::warn!("HTTP {} from {}: {}", status, url, body_preview(body));
    Err(AppError::NotionService {
        code: NotionErrorCode::from_http_status(status.as_u16()),
        message: format!("HTTP {} from {}", status, url),
        status,
    })
}

/// First characters of a response body, cut on a char boundary.
fn body_preview(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_PREVIEW_LENGTH) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
