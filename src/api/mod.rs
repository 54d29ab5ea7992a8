// src/api/mod.rs
//! Notion API interaction: the ability to read a workspace and archive
//! its pages.
//!
//! Business logic depends on the `NotionRepository` trait, never on HTTP
//! details; tests substitute their own repository.

pub mod adapter;
pub mod client;
pub mod pagination;
pub mod parser;
pub mod responses;

use crate::error::AppError;
use crate::types::{BlockId, DatabaseId, PageId};
use responses::{NotionBlock, NotionPage};

/// The ability to retrieve content from a Notion workspace.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    /// `GET pages/{id}`: page metadata and properties.
    async fn retrieve_page(&self, id: &PageId) -> Result<NotionPage, AppError>;

    /// `GET blocks/{id}/children`: direct children of a page or block.
    async fn list_children(&self, parent: &BlockId) -> Result<Vec<NotionBlock>, AppError>;

    /// `POST databases/{id}/query`: the rows of a database.
    async fn query_collection(&self, database: &DatabaseId) -> Result<Vec<NotionPage>, AppError>;

    /// `PATCH pages/{id}` with `archived: true`.
    async fn archive_page(&self, id: &PageId) -> Result<(), AppError>;
}

// Re-export the public interface
pub use client::{ClientConfig, NotionHttpClient};
pub use pagination::CursorPolicy;
