use std::collections::HashMap;

use crate::foundation::core::{BatchId, LayoutDirection, Rect, Tag};
use crate::mount::animation::AnimationSequencer;
use crate::mount::context::MountContext;
use crate::native::registry::NativeRegistry;

/// Compact, copyable description of one node's changed layout result.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMutation {
    /// Node whose frame changed.
    pub tag: Tag,
    /// New frame in parent coordinates.
    pub frame: Rect,
    /// Resolved layout direction.
    pub layout_direction: LayoutDirection,
    /// The node had never been mounted before this batch.
    pub is_new: bool,
    /// The node's parent had never been mounted before this batch.
    pub parent_is_new: bool,
    /// The resolved display type is `none`.
    pub is_hidden: bool,
}

/// Deferred native-tree change, executed on the UI actor during mounting.
pub type MountOp = Box<dyn FnOnce(&mut MountContext<'_>) + Send>;

/// Component-provided closure merged with the frame mutation of the same tag.
pub type MountHook = Box<dyn FnOnce(&mut NativeRegistry) + Send>;

/// Everything the UI actor needs to mount one batch.
///
/// Built on the coordination actor and moved across; nothing in it refers to shadow state.
pub struct MountBatch {
    /// Batch identifier.
    pub id: BatchId,
    /// Structural closures queued by commands during the batch, in command order.
    pub prelude: Vec<MountOp>,
    /// Frame mutation records from the layout diff.
    pub records: Box<[FrameMutation]>,
    /// Per-tag component hooks.
    pub hooks: HashMap<Tag, MountHook>,
    /// Closures queued outside the layout path (notifications, UI blocks).
    pub epilogue: Vec<MountOp>,
    /// Layout animation configured for this batch, if any.
    pub animation: Option<AnimationSequencer>,
}

impl MountBatch {
    /// An empty batch.
    pub fn new(id: BatchId) -> Self {
        Self {
            id,
            prelude: Vec::new(),
            records: Box::default(),
            hooks: HashMap::new(),
            epilogue: Vec::new(),
            animation: None,
        }
    }

    /// Whether mounting this batch would do nothing observable.
    pub fn is_empty(&self) -> bool {
        self.prelude.is_empty()
            && self.records.is_empty()
            && self.hooks.is_empty()
            && self.epilogue.is_empty()
            && self.animation.is_none()
    }
}

impl std::fmt::Debug for MountBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MountBatch")
            .field("id", &self.id)
            .field("prelude", &self.prelude.len())
            .field("records", &self.records)
            .field("hooks", &self.hooks.len())
            .field("epilogue", &self.epilogue.len())
            .field("animated", &self.animation.is_some())
            .finish()
    }
}
