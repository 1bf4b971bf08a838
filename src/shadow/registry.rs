use std::collections::{BTreeSet, HashMap};

use crate::foundation::affinity::ActorAffinity;
use crate::foundation::core::{Size, Tag};
use crate::foundation::error::{ShadowError, ShadowResult, invariant};
use crate::shadow::node::ShadowNode;

/// Tag -> shadow node arena, owned by the coordination actor.
///
/// Detached subtrees are purged eagerly, so a stale tag never resolves.
#[derive(Debug)]
pub struct ShadowRegistry {
    nodes: HashMap<Tag, ShadowNode>,
    roots: BTreeSet<Tag>,
    affinity: ActorAffinity,
}

impl Default for ShadowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadowRegistry {
    /// Create a registry bound to the calling thread.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: BTreeSet::new(),
            affinity: ActorAffinity::current("shadow"),
        }
    }

    /// Look up a node.
    pub fn get(&self, tag: Tag) -> Option<&ShadowNode> {
        self.affinity.check().ok()?;
        self.nodes.get(&tag)
    }

    /// Whether `tag` names a live node.
    pub fn contains(&self, tag: Tag) -> bool {
        self.get(tag).is_some()
    }

    /// Active roots in ascending tag order.
    pub fn roots(&self) -> impl Iterator<Item = Tag> + '_ {
        self.roots.iter().copied()
    }

    /// Number of live nodes (roots included).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the registry holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `tag` and all of its descendants in pre-order.
    pub fn subtree(&self, tag: Tag) -> Vec<Tag> {
        let mut out = Vec::new();
        let mut stack = vec![tag];
        while let Some(t) = stack.pop() {
            let Some(node) = self.get(t) else {
                continue;
            };
            out.push(t);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Whether `ancestor` is a strict ancestor of `tag`.
    pub fn is_ancestor(&self, ancestor: Tag, tag: Tag) -> bool {
        let mut cur = self.get(tag).and_then(ShadowNode::parent);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.get(p).and_then(ShadowNode::parent);
        }
        false
    }

    pub(crate) fn get_mut(&mut self, tag: Tag) -> ShadowResult<&mut ShadowNode> {
        self.affinity.check()?;
        self.nodes.get_mut(&tag).ok_or(ShadowError::LookupMiss(tag))
    }

    pub(crate) fn require(&self, tag: Tag) -> ShadowResult<&ShadowNode> {
        self.affinity.check()?;
        self.nodes.get(&tag).ok_or(ShadowError::LookupMiss(tag))
    }

    pub(crate) fn insert_root(&mut self, tag: Tag, view_name: &str, size: Size) -> ShadowResult<()> {
        self.affinity.check()?;
        if !tag.is_valid() {
            return Err(invariant(format!("root tag {tag} is not a valid tag")));
        }
        if self.nodes.contains_key(&tag) {
            return Err(invariant(format!("root {tag} registered twice")));
        }
        self.nodes
            .insert(tag, ShadowNode::new_root(tag, view_name, size));
        self.roots.insert(tag);
        Ok(())
    }

    /// Insert a freshly created node under `root_tag` (detached until a children command).
    pub(crate) fn insert(&mut self, node: ShadowNode) -> ShadowResult<()> {
        self.affinity.check()?;
        let tag = node.tag();
        if !tag.is_valid() {
            return Err(invariant(format!("view tag {tag} is not a valid tag")));
        }
        if self.nodes.contains_key(&tag) {
            return Err(invariant(format!("view {tag} created twice")));
        }
        match self.nodes.get(&node.root_tag()) {
            Some(root) if root.is_root() => {}
            Some(_) => {
                return Err(invariant(format!(
                    "view {tag} attached to {} which is not a root",
                    node.root_tag()
                )));
            }
            None => return Err(ShadowError::LookupMiss(node.root_tag())),
        }
        self.nodes.insert(tag, node);
        self.mark_dirty(tag);
        Ok(())
    }

    /// Flag `tag` for re-layout and record it in its root's pending set.
    pub(crate) fn mark_dirty(&mut self, tag: Tag) {
        let Some(node) = self.nodes.get_mut(&tag) else {
            return;
        };
        node.is_dirty = true;
        let root = node.root_tag();
        if let Some(state) = self.nodes.get_mut(&root).and_then(|r| r.root.as_mut()) {
            state.pending_layout.insert(tag);
        }
    }

    pub(crate) fn set_available_size(&mut self, root: Tag, size: Size) -> ShadowResult<()> {
        let node = self.get_mut(root)?;
        let Some(state) = node.root.as_mut() else {
            return Err(invariant(format!("{root} is not a root")));
        };
        if state.available_size != size {
            state.available_size = size;
            state.needs_layout = true;
        }
        Ok(())
    }

    /// Replace the child list of `container`, fixing parent links of old and new children.
    ///
    /// Children taken from another container are detached from it first. Returns the previous
    /// children that are no longer attached.
    pub(crate) fn replace_children(
        &mut self,
        container: Tag,
        children: Vec<Tag>,
    ) -> ShadowResult<Vec<Tag>> {
        let (old, root_tag) = {
            let node = self.get_mut(container)?;
            (std::mem::take(&mut node.children), node.root_tag())
        };
        let keep: BTreeSet<Tag> = children.iter().copied().collect();

        let mut detached = Vec::new();
        for t in old {
            if keep.contains(&t) {
                continue;
            }
            if let Some(child) = self.nodes.get_mut(&t) {
                child.parent = None;
            }
            detached.push(t);
        }

        let mut attached = Vec::with_capacity(children.len());
        for &t in &children {
            if attached.contains(&t) {
                tracing::warn!(%container, child = %t, "child listed twice; later entry skipped");
                continue;
            }
            let Some(child) = self.nodes.get(&t) else {
                tracing::warn!(%container, child = %t, "attaching unknown child; skipped");
                continue;
            };
            if child.is_root() {
                tracing::warn!(%container, child = %t, "a root cannot be attached as a child; skipped");
                continue;
            }
            if let Some(prev) = child.parent.filter(|&p| p != container) {
                if let Some(prev_node) = self.nodes.get_mut(&prev) {
                    prev_node.children.retain(|&c| c != t);
                }
                self.mark_dirty(prev);
            }
            if self.nodes.get(&t).map(ShadowNode::root_tag) != Some(root_tag) {
                self.reroot(t, root_tag);
            }
            if let Some(child) = self.nodes.get_mut(&t) {
                child.parent = Some(container);
            }
            self.mark_dirty(t);
            attached.push(t);
        }

        self.get_mut(container)?.children = attached;
        self.mark_dirty(container);
        Ok(detached)
    }

    fn reroot(&mut self, tag: Tag, root_tag: Tag) {
        for t in self.subtree(tag) {
            if let Some(n) = self.nodes.get_mut(&t) {
                n.set_root_tag(root_tag);
            }
            self.mark_dirty(t);
        }
    }

    /// Remove `tag` and every descendant, each exactly once.
    ///
    /// Returns the purged tags in visit order. The caller detaches `tag` from its parent.
    pub(crate) fn purge(&mut self, tag: Tag) -> Vec<Tag> {
        if self.affinity.check().is_err() {
            return Vec::new();
        }
        let mut purged = Vec::new();
        let mut stack = vec![tag];
        while let Some(t) = stack.pop() {
            let Some(node) = self.nodes.remove(&t) else {
                continue;
            };
            stack.extend(node.children.iter().rev().copied());
            if let Some(state) = self
                .nodes
                .get_mut(&node.root_tag())
                .and_then(|r| r.root.as_mut())
            {
                state.pending_layout.remove(&t);
            }
            self.roots.remove(&t);
            purged.push(t);
        }
        purged
    }

    /// Detach `tag` from its parent, if any.
    pub(crate) fn detach(&mut self, tag: Tag) {
        let Some(parent) = self.nodes.get_mut(&tag).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|&c| c != tag);
        }
        self.mark_dirty(parent);
    }

    /// Purge a root and its whole tree.
    pub(crate) fn remove_root(&mut self, root: Tag) -> ShadowResult<Vec<Tag>> {
        let node = self.require(root)?;
        if node.parent().is_some() || !node.is_root() {
            return Err(invariant(format!("{root} is not a detached root")));
        }
        let mut purged = self.purge(root);
        let stragglers: Vec<Tag> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.root_tag() == root)
            .map(|(&t, _)| t)
            .collect();
        for t in stragglers {
            purged.extend(self.purge(t));
        }
        Ok(purged)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shadow/registry.rs"]
mod tests;
