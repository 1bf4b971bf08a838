use std::any::Any;
use std::collections::BTreeSet;

use crate::foundation::core::{Affine, LayoutDirection, Props, Rect, Tag, merge_props};

/// Animatable visual state of a native view, independent of its frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualState {
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Transform applied around the view's frame.
    pub transform: Affine,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transform: Affine::IDENTITY,
        }
    }
}

/// Native widget contract.
///
/// Native views are created and touched only on the UI actor, so they need not be `Send`.
pub trait NativeView: Any {
    /// Apply a prop update (already filtered by the owning component).
    fn set_props(&mut self, props: &Props);
    /// Position the view in its parent's coordinates.
    fn set_frame(&mut self, frame: Rect);
    /// Current frame.
    fn frame(&self) -> Rect;
    /// Show or hide the view.
    fn set_hidden(&mut self, hidden: bool);
    /// Whether the view is hidden.
    fn is_hidden(&self) -> bool;
    /// Apply the resolved layout direction.
    fn set_layout_direction(&mut self, direction: LayoutDirection);
    /// Current opacity and transform.
    fn visual_state(&self) -> VisualState;
    /// Replace opacity and transform.
    fn set_visual_state(&mut self, state: VisualState);

    /// Props named in `changed` were updated during the last batch.
    fn did_set_props(&mut self, _changed: &BTreeSet<String>) {}
    /// The child list was updated during the last batch.
    fn did_update_children(&mut self, _children: &[Tag]) {}

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;
    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// In-memory native view that records what was applied to it.
///
/// Used by the replay binary and by tests; embedders provide their own widgets.
#[derive(Clone, Debug, Default)]
pub struct BasicView {
    props: Props,
    frame: Rect,
    hidden: bool,
    direction: LayoutDirection,
    visual: VisualState,
    /// Number of frame assignments.
    pub(crate) frame_writes: usize,
    /// Prop names reported through `did_set_props`, in arrival order.
    pub(crate) props_notifications: Vec<BTreeSet<String>>,
    /// Number of `did_update_children` calls.
    pub(crate) children_notifications: usize,
}

impl BasicView {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Props applied so far (merged).
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Last applied layout direction.
    pub fn layout_direction(&self) -> LayoutDirection {
        self.direction
    }

    /// How many times the frame was assigned.
    pub fn frame_writes(&self) -> usize {
        self.frame_writes
    }

    /// Change sets reported through `did_set_props`.
    pub fn props_notifications(&self) -> &[BTreeSet<String>] {
        &self.props_notifications
    }

    /// Number of `did_update_children` calls.
    pub fn children_notifications(&self) -> usize {
        self.children_notifications
    }
}

impl NativeView for BasicView {
    fn set_props(&mut self, props: &Props) {
        merge_props(&mut self.props, props);
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
        self.frame_writes += 1;
    }

    fn frame(&self) -> Rect {
        self.frame
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn set_layout_direction(&mut self, direction: LayoutDirection) {
        self.direction = direction;
    }

    fn visual_state(&self) -> VisualState {
        self.visual
    }

    fn set_visual_state(&mut self, state: VisualState) {
        self.visual = state;
    }

    fn did_set_props(&mut self, changed: &BTreeSet<String>) {
        self.props_notifications.push(changed.clone());
    }

    fn did_update_children(&mut self, _children: &[Tag]) {
        self.children_notifications += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
