use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::foundation::affinity::ActorAffinity;
use crate::foundation::core::Tag;
use crate::foundation::error::{ShadowError, ShadowResult, invariant};
use crate::native::view::NativeView;

/// One native widget plus its place in the native tree.
pub struct NativeNode {
    view_name: String,
    view: Box<dyn NativeView>,
    parent: Option<Tag>,
    children: Vec<Tag>,
}

impl NativeNode {
    /// Component name the view was created for.
    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    /// The widget.
    pub fn view(&self) -> &dyn NativeView {
        self.view.as_ref()
    }

    /// Parent tag, `None` for roots and detached views.
    pub fn parent(&self) -> Option<Tag> {
        self.parent
    }

    /// Children in order.
    pub fn children(&self) -> &[Tag] {
        &self.children
    }
}

impl fmt::Debug for NativeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeNode")
            .field("view_name", &self.view_name)
            .field("frame", &self.view.frame())
            .field("hidden", &self.view.is_hidden())
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}

/// Tag -> native widget arena, owned by the UI actor.
///
/// Populated one actor hop after the matching shadow node; a missing entry is a lookup miss.
#[derive(Debug)]
pub struct NativeRegistry {
    nodes: HashMap<Tag, NativeNode>,
    roots: BTreeSet<Tag>,
    // Removed views still fading out; they stay attached until purged.
    deleting: BTreeSet<Tag>,
    affinity: ActorAffinity,
}

impl Default for NativeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeRegistry {
    /// Create a registry bound to the calling thread.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: BTreeSet::new(),
            deleting: BTreeSet::new(),
            affinity: ActorAffinity::current("native"),
        }
    }

    /// Look up a node.
    pub fn get(&self, tag: Tag) -> Option<&NativeNode> {
        self.affinity.check().ok()?;
        self.nodes.get(&tag)
    }

    /// Look up a widget.
    pub fn view(&self, tag: Tag) -> Option<&dyn NativeView> {
        self.get(tag).map(NativeNode::view)
    }

    /// Mutable widget lookup.
    pub fn view_mut(&mut self, tag: Tag) -> Option<&mut dyn NativeView> {
        self.affinity.check().ok()?;
        let view: &mut dyn NativeView = self.nodes.get_mut(&tag)?.view.as_mut();
        Some(view)
    }

    /// Downcast the widget at `tag` to a concrete type.
    pub fn view_as<T: NativeView>(&self, tag: Tag) -> Option<&T> {
        self.view(tag)?.as_any().downcast_ref::<T>()
    }

    /// Whether `tag` names a live view.
    pub fn contains(&self, tag: Tag) -> bool {
        self.get(tag).is_some()
    }

    /// Number of live views.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no views are registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root views in ascending tag order.
    pub fn roots(&self) -> impl Iterator<Item = Tag> + '_ {
        self.roots.iter().copied()
    }

    /// Whether `tag` is playing its delete animation.
    pub fn is_deleting(&self, tag: Tag) -> bool {
        self.deleting.contains(&tag)
    }

    pub(crate) fn mark_deleting(&mut self, tag: Tag) {
        if self.nodes.contains_key(&tag) {
            self.deleting.insert(tag);
        }
    }

    /// `tag` and its descendants in pre-order.
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

    pub(crate) fn require_mut(&mut self, tag: Tag) -> ShadowResult<&mut dyn NativeView> {
        self.affinity.check()?;
        let node = self.nodes.get_mut(&tag).ok_or(ShadowError::LookupMiss(tag))?;
        let view: &mut dyn NativeView = node.view.as_mut();
        Ok(view)
    }

    pub(crate) fn insert(
        &mut self,
        tag: Tag,
        view_name: &str,
        view: Box<dyn NativeView>,
        is_root: bool,
    ) -> ShadowResult<()> {
        self.affinity.check()?;
        if self.nodes.contains_key(&tag) {
            return Err(invariant(format!("native view {tag} created twice")));
        }
        self.nodes.insert(
            tag,
            NativeNode {
                view_name: view_name.to_owned(),
                view,
                parent: None,
                children: Vec::new(),
            },
        );
        if is_root {
            self.roots.insert(tag);
        }
        Ok(())
    }

    /// Overwrite the children of `container`, detaching previous children that are not kept.
    ///
    /// A previous child that is still fading out keeps its slot (clamped to the new length)
    /// until its purge detaches it.
    pub(crate) fn set_children(&mut self, container: Tag, children: &[Tag]) -> ShadowResult<()> {
        self.affinity.check()?;
        let old = match self.nodes.get_mut(&container) {
            Some(node) => std::mem::take(&mut node.children),
            None => return Err(ShadowError::LookupMiss(container)),
        };
        let mut fading = Vec::new();
        for (i, t) in old.into_iter().enumerate() {
            if children.contains(&t) {
                continue;
            }
            if self.deleting.contains(&t) {
                fading.push((i, t));
            } else if let Some(child) = self.nodes.get_mut(&t) {
                child.parent = None;
            }
        }

        let mut attached = Vec::with_capacity(children.len());
        for &t in children {
            let prev = match self.nodes.get_mut(&t) {
                Some(child) => child.parent.replace(container),
                None => {
                    tracing::warn!(%container, child = %t, "native child missing; skipped");
                    continue;
                }
            };
            if let Some(prev) = prev.filter(|&p| p != container)
                && let Some(prev_node) = self.nodes.get_mut(&prev)
            {
                prev_node.children.retain(|&c| c != t);
            }
            attached.push(t);
        }
        for (i, t) in fading {
            attached.insert(i.min(attached.len()), t);
        }

        if let Some(node) = self.nodes.get_mut(&container) {
            node.children = attached;
        }
        Ok(())
    }

    /// Detach `tag` from its parent, if any.
    pub(crate) fn detach(&mut self, tag: Tag) {
        let Some(parent) = self.nodes.get_mut(&tag).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|&c| c != tag);
        }
    }

    /// Remove `tag` and every descendant, each exactly once.
    pub(crate) fn purge(&mut self, tag: Tag) -> Vec<Tag> {
        if self.affinity.check().is_err() {
            return Vec::new();
        }
        self.detach(tag);
        let mut purged = Vec::new();
        let mut stack = vec![tag];
        while let Some(t) = stack.pop() {
            let Some(node) = self.nodes.remove(&t) else {
                continue;
            };
            stack.extend(node.children.iter().rev().copied());
            self.roots.remove(&t);
            self.deleting.remove(&t);
            purged.push(t);
        }
        purged
    }
}

#[cfg(test)]
#[path = "../../tests/unit/native/registry.rs"]
mod tests;
