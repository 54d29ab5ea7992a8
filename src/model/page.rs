use super::block::BlockNode;
use super::properties::PropertyMap;
use serde::{Deserialize, Serialize};

/// A page mirrored for the detail view: `{id, url, ...properties, blocks}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub url: String,
    #[serde(flatten)]
    pub properties: PropertyMap,
    pub blocks: Vec<BlockNode>,
}

impl Page {
    /// Top-level keys a property may not shadow.
    pub const RESERVED_KEYS: &'static [&'static str] = &["id", "url", "blocks"];
}

/// One row of the collection listing.
///
/// `content` is `null` when the row's blocks could not be fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub id: String,
    pub url: String,
    #[serde(rename = "pageTitle")]
    pub page_title: Option<String>,
    #[serde(flatten)]
    pub properties: PropertyMap,
    pub content: Option<PageContent>,
}

impl CollectionEntry {
    /// Top-level keys a property may not shadow.
    pub const RESERVED_KEYS: &'static [&'static str] = &["id", "url", "pageTitle", "content"];
}

/// Block tree of a listing row plus its flattened search text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub blocks: Vec<BlockNode>,
    #[serde(rename = "fullText")]
    pub full_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, PropertyValue};

    #[test]
    fn page_flattens_properties_between_url_and_blocks() {
        let mut properties = PropertyMap::new();
        properties.insert("Pages ".to_string(), PropertyValue::text("Hello"));
        properties.insert("Date".to_string(), PropertyValue::Null);
        let page = Page {
            id: "p1".to_string(),
            url: "https://www.notion.so/p1".to_string(),
            properties,
            blocks: vec![BlockNode::new(BlockKind::Paragraph, "Body")],
        };
        assert_eq!(
            serde_json::to_string(&page).unwrap(),
            r#"{"id":"p1","url":"https://www.notion.so/p1","Pages ":"Hello","Date":null,"blocks":[{"type":"paragraph","content":"Body"}]}"#
        );
    }

    #[test]
    fn entry_without_content_serializes_null() {
        let entry = CollectionEntry {
            id: "p1".to_string(),
            url: "u".to_string(),
            page_title: None,
            properties: PropertyMap::new(),
            content: None,
        };
        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"id":"p1","url":"u","pageTitle":null,"content":null}"#
        );
    }
}
