// src/api/pagination.rs
//! Cursor pagination over Notion list endpoints.

use super::responses::PaginatedResponse;
use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::AppError;
use std::future::Future;

/// How far to follow `next_cursor` on list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorPolicy {
    /// One request of up to `NOTION_API_PAGE_SIZE` items; a truncated
    /// listing is logged.
    #[default]
    FirstPage,
    /// Follow `next_cursor` until Notion reports no more results.
    FollowAll,
}

/// Items collected across one or more list requests.
#[derive(Debug, Clone)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
    /// Notion had more items than were collected.
    pub truncated: bool,
}

/// Collects list items according to `policy`.
///
/// `fetch_fn` receives the page size and the cursor of the page to fetch.
pub async fn collect_pages<T, F, Fut>(
    policy: CursorPolicy,
    context: &str,
    mut fetch_fn: F,
) -> Result<PaginationResult<T>, AppError>
where
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: Future<Output = Result<PaginatedResponse<T>, AppError>>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0u32;

    loop {
        let response = fetch_fn(NOTION_API_PAGE_SIZE, cursor).await?;
        pages_fetched += 1;
        items.extend(response.results);

        let next = response.next_cursor.filter(|_| response.has_more);
        match (next, policy) {
            (None, _) => {
                return Ok(PaginationResult {
                    items,
                    pages_fetched,
                    truncated: false,
                })
            }
            (Some(_), CursorPolicy::FirstPage) => {
                log::warn!(
                    "{} has more than {} items; only the first page is mirrored",
                    context,
                    NOTION_API_PAGE_SIZE
                );
                return Ok(PaginationResult {
                    items,
                    pages_fetched,
                    truncated: true,
                });
            }
            (Some(next), CursorPolicy::FollowAll) => {
                log::debug!("{}: following cursor after page {}", context, pages_fetched);
                cursor = Some(next);
            }
        }
    }
}
