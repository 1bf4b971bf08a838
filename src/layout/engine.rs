use crate::foundation::core::{LayoutDirection, LayoutMetrics, Tag};
use crate::foundation::error::ShadowResult;
use crate::shadow::registry::ShadowRegistry;

/// Layout capability consumed by the mutation planner.
///
/// Given a root (its style, available size and pending-layout set), produce the metrics of
/// every node in the root's subtree, in pre-order. Implementations may skip recomputing
/// subtrees that contain no pending node.
pub trait LayoutEngine {
    /// Lay out the tree under `root`.
    fn layout(
        &mut self,
        tree: &ShadowRegistry,
        root: Tag,
        base_direction: LayoutDirection,
    ) -> ShadowResult<Vec<(Tag, LayoutMetrics)>>;

    /// Drop any engine-side state for a purged node.
    fn forget(&mut self, _tag: Tag) {}
}
