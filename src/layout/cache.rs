use std::collections::HashMap;

use crate::foundation::core::Tag;

/// Per-node cache used to avoid redundant Taffy style updates.
#[derive(Debug, Default)]
pub(crate) struct LayoutCache {
    /// Fingerprint of the last style pushed for each node (props, intrinsic size, root size).
    style_hash_by_node: HashMap<Tag, u64>,
}

impl LayoutCache {
    /// Record `hash` for `tag`; returns `true` when it differs from the cached value.
    pub(crate) fn update(&mut self, tag: Tag, hash: u64) -> bool {
        self.style_hash_by_node.insert(tag, hash) != Some(hash)
    }

    pub(crate) fn forget(&mut self, tag: Tag) {
        self.style_hash_by_node.remove(&tag);
    }
}
