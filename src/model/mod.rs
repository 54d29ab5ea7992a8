//! The mirrored domain: normalized block trees, pages and listing rows.
//!
//! Everything here is what the HTTP surface returns and what the cache
//! stores; nothing here knows about Notion's wire format.

mod block;
mod page;
mod properties;

pub use block::{flatten_full_text, BlockKind, BlockNode, TreeSummary};
pub use page::{CollectionEntry, Page, PageContent};
pub use properties::{Person, PropertyMap, PropertyValue};
