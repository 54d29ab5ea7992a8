// src/pipeline/normalizer.rs
//! Block normalization: Notion block objects in, `{type, content,
//! children?}` trees out.

use crate::api::responses::{NotionBlock, TextPayload};
use crate::api::NotionRepository;
use crate::config::{DepthLimit, FetchSettings};
use crate::error::AppError;
use crate::model::{BlockKind, BlockNode};
use crate::types::BlockId;
use futures::future::{join_all, BoxFuture, FutureExt};
use std::sync::Arc;

/// Concatenates every span's `plain_text` and trims the result.
pub fn extract_text(payload: &TextPayload) -> String {
    payload
        .rich_text
        .iter()
        .filter_map(|span| span.plain_text.as_deref())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Keeps a node with content, or a toggle whose empty header still
/// carries children.
fn admit(node: BlockNode) -> Option<BlockNode> {
    let has_content = !node.content.is_empty();
    let headless_toggle = node.kind == BlockKind::Toggle && !node.children.is_empty();
    (has_content || headless_toggle).then_some(node)
}

/// Normalizes one block given its already-normalized children.
///
/// Partial blocks (no type) yield `None`; unmodelled types yield the
/// fallback node. Children are kept only on container kinds.
pub fn normalize_block(block: &NotionBlock, children: Vec<BlockNode>) -> Option<BlockNode> {
    let Some(tag) = block.kind.as_deref() else {
        log::debug!("Skipping partial block {}", block.id);
        return None;
    };

    let kind = BlockKind::from_tag(tag);
    if !kind.is_supported() {
        return Some(BlockNode::unsupported(tag));
    }

    let children = if kind.is_container() { children } else { Vec::new() };
    admit(BlockNode::new(kind, extract_text(&block.text_payload())).with_children(children))
}

/// Re-applies the normalization rules to an already normalized tree.
///
/// Running it on its own output changes nothing.
pub fn normalize_tree(nodes: Vec<BlockNode>) -> Vec<BlockNode> {
    nodes
        .into_iter()
        .filter_map(|node| {
            if !node.kind.is_supported() {
                return Some(node);
            }
            let children = if node.kind.is_container() {
                normalize_tree(node.children)
            } else {
                Vec::new()
            };
            admit(BlockNode::new(node.kind, node.content.trim()).with_children(children))
        })
        .collect()
}

/// Fetches and normalizes the block tree under a page or block.
#[derive(Clone)]
pub struct BlockTreeBuilder {
    repo: Arc<dyn NotionRepository>,
    depth: DepthLimit,
    batch_size: usize,
}

impl BlockTreeBuilder {
    pub fn new(repo: Arc<dyn NotionRepository>, settings: &FetchSettings) -> Self {
        Self {
            repo,
            depth: settings.depth,
            batch_size: settings.child_batch_size.max(1),
        }
    }

    /// The normalized tree under `root`.
    ///
    /// Only the top-level listing can fail; a failed nested listing is
    /// logged and its block is kept without children.
    pub async fn build(&self, root: &BlockId) -> Result<Vec<BlockNode>, AppError> {
        let blocks = self.repo.list_children(root).await?;
        Ok(self.normalize_level(blocks, 1).await)
    }

    fn wants_children(&self, block: &NotionBlock, depth: usize) -> bool {
        block.has_children
            && self.depth.allows_children(depth)
            && block
                .kind
                .as_deref()
                .is_some_and(|tag| BlockKind::from_tag(tag).is_container())
    }

    /// Normalizes the blocks of one level, fetching container children in
    /// sequential batches of concurrent requests.
    fn normalize_level(
        &self,
        blocks: Vec<NotionBlock>,
        depth: usize,
    ) -> BoxFuture<'_, Vec<BlockNode>> {
        async move {
            let pending: Vec<usize> = blocks
                .iter()
                .enumerate()
                .filter(|(_, block)| self.wants_children(block, depth))
                .map(|(index, _)| index)
                .collect();

            let mut children: Vec<Vec<BlockNode>> = vec![Vec::new(); blocks.len()];
            for batch in pending.chunks(self.batch_size) {
                let fetched =
                    join_all(batch.iter().map(|&index| self.subtree(&blocks[index], depth + 1)))
                        .await;
                for (&index, nodes) in batch.iter().zip(fetched) {
                    children[index] = nodes;
                }
            }

            blocks
                .iter()
                .zip(children)
                .filter_map(|(block, nodes)| normalize_block(block, nodes))
                .collect()
        }
        .boxed()
    }

    async fn subtree(&self, parent: &NotionBlock, depth: usize) -> Vec<BlockNode> {
        let id = BlockId::from_api(&parent.id);
        match self.repo.list_children(&id).await {
            Ok(blocks) => self.normalize_level(blocks, depth).await,
            Err(e) => {
                log::warn!("Children of block {} unavailable, keeping it empty: {}", id, e);
                Vec::new()
            }
        }
    }
}
