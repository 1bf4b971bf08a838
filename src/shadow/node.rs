use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::foundation::core::{LayoutMetrics, Props, Size, Tag, merge_props};

/// Opaque per-node attachment owned by a component (e.g. measured text storage).
pub type LocalData = Arc<dyn Any + Send + Sync>;

/// Root-only state: layout constraint and the authoritative pending-layout set.
#[derive(Debug, Clone, Default)]
pub struct RootState {
    pub(crate) available_size: Size,
    pub(crate) pending_layout: BTreeSet<Tag>,
    pub(crate) needs_layout: bool,
}

impl RootState {
    pub(crate) fn new(available_size: Size) -> Self {
        Self {
            available_size,
            pending_layout: BTreeSet::new(),
            needs_layout: true,
        }
    }

    /// Layout constraint (e.g. viewport bounds).
    pub fn available_size(&self) -> Size {
        self.available_size
    }

    /// Nodes under this root whose layout inputs changed since the last pass.
    pub fn pending_layout(&self) -> &BTreeSet<Tag> {
        &self.pending_layout
    }

    /// Whether the next layout pass must visit this root.
    pub fn needs_layout(&self) -> bool {
        self.needs_layout || !self.pending_layout.is_empty()
    }
}

/// Layout-aware mirror of one UI element.
///
/// Parent and root links are tags resolved through the [`ShadowRegistry`](super::registry::ShadowRegistry),
/// never owning references.
pub struct ShadowNode {
    tag: Tag,
    view_name: String,
    root_tag: Tag,
    pub(crate) parent: Option<Tag>,
    pub(crate) children: Vec<Tag>,
    props: Props,
    pub(crate) metrics: Option<LayoutMetrics>,
    pub(crate) is_new: bool,
    pub(crate) is_dirty: bool,
    intrinsic_size: Option<Size>,
    local_data: Option<LocalData>,
    pub(crate) root: Option<RootState>,
}

impl ShadowNode {
    /// Allocate a regular (non-root) node.
    pub fn new(tag: Tag, view_name: impl Into<String>, root_tag: Tag) -> Self {
        Self {
            tag,
            view_name: view_name.into(),
            root_tag,
            parent: None,
            children: Vec::new(),
            props: Props::new(),
            metrics: None,
            is_new: true,
            is_dirty: true,
            intrinsic_size: None,
            local_data: None,
            root: None,
        }
    }

    pub(crate) fn new_root(tag: Tag, view_name: impl Into<String>, available_size: Size) -> Self {
        let mut node = Self::new(tag, view_name, tag);
        node.root = Some(RootState::new(available_size));
        node
    }

    /// Stable tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Component name this node was created with.
    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    /// Tag of the root owning this node.
    pub fn root_tag(&self) -> Tag {
        self.root_tag
    }

    pub(crate) fn set_root_tag(&mut self, root_tag: Tag) {
        self.root_tag = root_tag;
    }

    /// Parent tag, `None` for roots and detached nodes.
    pub fn parent(&self) -> Option<Tag> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[Tag] {
        &self.children
    }

    /// Current merged props.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Merge props into this node, returning the touched names.
    pub fn merge_props(&mut self, update: &Props) -> BTreeSet<String> {
        merge_props(&mut self.props, update)
    }

    /// Metrics recorded by the last layout pass that touched this node.
    pub fn layout_metrics(&self) -> Option<&LayoutMetrics> {
        self.metrics.as_ref()
    }

    /// True until the node's first frame has been planned for mounting.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Whether the node's layout inputs changed since the last pass.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Intrinsic content size used when the node is a layout leaf.
    pub fn intrinsic_size(&self) -> Option<Size> {
        self.intrinsic_size
    }

    /// Returns `true` when the value actually changed.
    pub(crate) fn set_intrinsic_size(&mut self, size: Option<Size>) -> bool {
        if self.intrinsic_size == size {
            return false;
        }
        self.intrinsic_size = size;
        true
    }

    /// Opaque component-owned attachment.
    pub fn local_data(&self) -> Option<&LocalData> {
        self.local_data.as_ref()
    }

    /// Replace the opaque attachment.
    pub fn set_local_data(&mut self, data: Option<LocalData>) {
        self.local_data = data;
    }

    /// Whether this node is a root.
    pub fn is_root(&self) -> bool {
        self.root.is_some()
    }

    /// Root-only state.
    pub fn root_state(&self) -> Option<&RootState> {
        self.root.as_ref()
    }
}

impl fmt::Debug for ShadowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowNode")
            .field("tag", &self.tag)
            .field("view_name", &self.view_name)
            .field("root_tag", &self.root_tag)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("is_new", &self.is_new)
            .field("is_dirty", &self.is_dirty)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
