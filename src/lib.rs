//! shadowtree keeps a layout-aware shadow copy of a declarative UI tree and turns each batch of
//! commands into one atomic mount on the native tree.
//!
//! - Feed [`Command`]s to a [`Runtime`] (or drive a [`UiManager`] directly)
//! - End each batch with `batch_did_complete`; layout, diff and mount follow
//! - Plug in native widgets through [`ComponentDescriptor`] and [`NativeView`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

pub(crate) mod component;
pub(crate) mod layout;
pub(crate) mod mount;
pub(crate) mod native;
pub(crate) mod runtime;
pub(crate) mod shadow;
pub(crate) mod tracking;

pub use crate::foundation::core::{
    Affine, BatchId, DisplayType, Insets, LayoutDirection, LayoutMetrics, Point, Props, Rect,
    Size, Tag, merge_props,
};
pub use crate::foundation::error::{ShadowError, ShadowResult};

pub use crate::component::descriptor::{ComponentDescriptor, ViewDescriptor};
pub use crate::component::registry::ComponentRegistry;
pub use crate::layout::engine::LayoutEngine;
pub use crate::layout::style::LAYOUT_PROPS;
pub use crate::layout::taffy_engine::TaffyLayoutEngine;
pub use crate::mount::animation::{
    AnimatedProperty, AnimationCallback, AnimationDescriptor, AnimationGroup, AnimationKind,
    AnimationPhase, AnimationRequest, AnimationSequencer, DeferredAnimator, ImmediateAnimator,
    LayoutAnimationConfig, ViewAnimator, ViewTarget,
};
pub use crate::mount::context::MountContext;
pub use crate::mount::mounter::{MountReport, Mounter};
pub use crate::mount::record::{FrameMutation, MountBatch, MountHook, MountOp};
pub use crate::native::registry::{NativeNode, NativeRegistry};
pub use crate::native::view::{BasicView, NativeView, VisualState};
pub use crate::runtime::Runtime;
pub use crate::runtime::command::Command;
pub use crate::runtime::config::UiManagerOpts;
pub use crate::runtime::ui_manager::{
    AnimationErrorCallback, BatchQueue, Measurement, MountSink, RelativeLayout, UiBlock, UiManager,
};
pub use crate::shadow::children::ManageChildren;
pub use crate::shadow::node::{LocalData, RootState, ShadowNode};
pub use crate::shadow::registry::ShadowRegistry;
pub use crate::tracking::change_tracker::{ChangeSet, ChangeTracker};
pub use crate::tracking::observer::{ObserverCoordinator, UiManagerObserver};
