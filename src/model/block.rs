use crate::constants::UNSUPPORTED_BLOCK_PREFIX;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The block types the mirror renders, plus a carrier for every other
/// Notion type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletedListItem,
    NumberedListItem,
    Toggle,
    /// Any other Notion block type, keeping its original tag.
    Unsupported(String),
}

impl BlockKind {
    /// Maps a Notion type tag to a kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "paragraph" => Self::Paragraph,
            "heading_1" => Self::Heading1,
            "heading_2" => Self::Heading2,
            "heading_3" => Self::Heading3,
            "bulleted_list_item" => Self::BulletedListItem,
            "numbered_list_item" => Self::NumberedListItem,
            "toggle" => Self::Toggle,
            other => Self::Unsupported(other.to_string()),
        }
    }

    /// The Notion type tag.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading1 => "heading_1",
            Self::Heading2 => "heading_2",
            Self::Heading3 => "heading_3",
            Self::BulletedListItem => "bulleted_list_item",
            Self::NumberedListItem => "numbered_list_item",
            Self::Toggle => "toggle",
            Self::Unsupported(tag) => tag,
        }
    }

    /// Kinds whose nested blocks are fetched and kept.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Toggle | Self::BulletedListItem | Self::NumberedListItem
        )
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BlockKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// A normalized, renderable block: `{type, content, children?}`.
///
/// `children` is omitted from JSON when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNode {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    pub fn new(kind: BlockKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            children: Vec::new(),
        }
    }

    /// Fallback node for a Notion type the mirror does not model.
    pub fn unsupported(tag: &str) -> Self {
        Self::new(
            BlockKind::Unsupported(tag.to_string()),
            format!("{}{}", UNSUPPORTED_BLOCK_PREFIX, tag),
        )
    }

    pub fn with_children(mut self, children: Vec<BlockNode>) -> Self {
        self.children = children;
        self
    }
}

/// Flattens a block tree into search text, depth-first.
///
/// Containers with children contribute their own content followed by
/// their children's text; entries are joined by newlines.
pub fn flatten_full_text(blocks: &[BlockNode]) -> String {
    blocks
        .iter()
        .map(|block| {
            if block.kind.is_container() && !block.children.is_empty() {
                format!("{}\n{}", block.content, flatten_full_text(&block.children))
            } else {
                block.content.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Size of a normalized tree, for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeSummary {
    pub nodes: usize,
    pub deepest_nesting: usize,
}

impl TreeSummary {
    pub fn of(blocks: &[BlockNode]) -> Self {
        blocks.iter().fold(Self::default(), |acc, block| {
            let below = Self::of(&block.children);
            Self {
                nodes: acc.nodes + 1 + below.nodes,
                deepest_nesting: acc.deepest_nesting.max(1 + below.deepest_nesting),
            }
        })
    }
}
