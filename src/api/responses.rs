// src/api/responses.rs
//! Wire types for the Notion API endpoints the mirror calls.
//!
//! Only the fields the pipeline reads are typed. Block payloads and
//! property values stay as JSON under their type tag: the tag decides how
//! they are read, and unrecognized tags must survive untouched.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Notion's error envelope, parsed with notion-client's serde type.
pub use notion_client::objects::error::Error as NotionError;

/// Generic paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub object: String,
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Database query response
pub type QueryDatabaseResponse = PaginatedResponse<NotionPage>;

/// Block children response
pub type BlockChildrenResponse = PaginatedResponse<NotionBlock>;

/// A page object, as returned by `pages/{id}` or a database query row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionPage {
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub archived: bool,
    /// Properties in the order Notion lists them.
    #[serde(default)]
    pub properties: IndexMap<String, NotionProperty>,
}

/// One entry of a page's property bag: a type tag plus the type-keyed
/// value (`{"type": "select", "select": {...}, "id": "..."}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionProperty {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl NotionProperty {
    /// The raw value stored under the property's own type tag.
    pub fn raw_value(&self) -> Option<&Value> {
        self.fields.get(&self.kind)
    }

    /// Reads the type-keyed value as `T`, falling back to `T::default()`
    /// when it is absent, null or shaped unexpectedly.
    pub fn typed_value<T: DeserializeOwned + Default>(&self) -> T {
        match self.raw_value() {
            Some(Value::Null) | None => T::default(),
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                log::debug!("Property of type '{}' has unexpected shape: {}", self.kind, e);
                T::default()
            }),
        }
    }
}

/// A block object from `blocks/{id}/children`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionBlock {
    pub id: String,
    /// Absent on partial block objects.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl NotionBlock {
    /// The text payload stored under the block's type tag, if it has one.
    pub fn text_payload(&self) -> TextPayload {
        self.kind
            .as_ref()
            .and_then(|kind| self.payload.get(kind))
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }
}

/// The part of a text-bearing block payload the normalizer reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextPayload {
    #[serde(default)]
    pub rich_text: Vec<RichTextSpan>,
}

/// One span of Notion rich text. Every span kind (text, mention,
/// equation) carries a `plain_text` rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RichTextSpan {
    #[serde(default)]
    pub plain_text: Option<String>,
}

/// Select and multi-select option.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

/// Date property value; only the start is mirrored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateValue {
    #[serde(default)]
    pub start: Option<String>,
}

/// A user referenced by a `people` property.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotionUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Body of `POST databases/{id}/query`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryDatabaseRequest {
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
}

/// Body of `PATCH pages/{id}`; archiving is Notion's only delete.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePageRequest {
    pub archived: bool,
}
