use std::sync::{Arc, Mutex, PoisonError};

use crate::foundation::core::{Affine, Rect, Tag};
use crate::foundation::error::{ShadowError, ShadowResult};
use crate::mount::record::MountHook;
use crate::native::registry::NativeRegistry;
use crate::native::view::VisualState;

/// Timing curve of one layout animation phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimationKind {
    /// Constant speed.
    Linear,
    /// Accelerate.
    EaseIn,
    /// Decelerate.
    EaseOut,
    /// Accelerate then decelerate.
    #[default]
    EaseInEaseOut,
    /// Damped spring.
    Spring,
    /// Platform keyboard curve.
    Keyboard,
}

/// Visual property animated when a view appears or disappears.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimatedProperty {
    /// Fade in or out.
    Opacity,
    /// Scale horizontally from or to zero.
    ScaleX,
    /// Scale vertically from or to zero.
    ScaleY,
    /// Scale both axes from or to zero.
    #[serde(rename = "scaleXY")]
    ScaleXy,
}

impl AnimatedProperty {
    /// Visual state at the "invisible" end of a create or delete animation.
    pub fn collapsed(self, base: VisualState) -> VisualState {
        match self {
            Self::Opacity => VisualState {
                opacity: 0.0,
                ..base
            },
            Self::ScaleX => VisualState {
                transform: base.transform * Affine::scale_non_uniform(0.0, 1.0),
                ..base
            },
            Self::ScaleY => VisualState {
                transform: base.transform * Affine::scale_non_uniform(1.0, 0.0),
                ..base
            },
            Self::ScaleXy => VisualState {
                transform: base.transform * Affine::scale(0.0),
                ..base
            },
        }
    }
}

/// How one phase (create, update or delete) is animated.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationDescriptor {
    /// Overrides the config-wide duration.
    pub duration_ms: Option<f64>,
    /// Start delay.
    pub delay_ms: f64,
    /// Timing curve.
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    /// Property animated on create and delete.
    pub property: Option<AnimatedProperty>,
    /// Spring damping, only meaningful for [`AnimationKind::Spring`].
    pub spring_damping: Option<f64>,
    /// Initial spring velocity.
    pub initial_velocity: Option<f64>,
}

/// One-shot layout animation configuration for the next batch.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutAnimationConfig {
    /// Duration shared by phases that do not set their own.
    pub duration_ms: f64,
    /// Newly created views whose parent already existed.
    pub create: Option<AnimationDescriptor>,
    /// Existing views whose frame changed.
    pub update: Option<AnimationDescriptor>,
    /// Removed views.
    pub delete: Option<AnimationDescriptor>,
}

impl LayoutAnimationConfig {
    /// Reject configurations the mounter cannot honor.
    pub fn validate(&self) -> ShadowResult<()> {
        let finite = |v: f64| v.is_finite() && v >= 0.0;
        if !finite(self.duration_ms) {
            return Err(ShadowError::serde(format!(
                "layout animation duration {} is not a non-negative number",
                self.duration_ms
            )));
        }
        let phases = [
            ("create", &self.create, true),
            ("update", &self.update, false),
            ("delete", &self.delete, true),
        ];
        for (name, desc, needs_property) in phases {
            let Some(desc) = desc else {
                continue;
            };
            if !desc.duration_ms.is_none_or(finite) || !finite(desc.delay_ms) {
                return Err(ShadowError::serde(format!(
                    "layout animation `{name}` has an invalid duration or delay"
                )));
            }
            if needs_property && desc.property.is_none() {
                return Err(ShadowError::serde(format!(
                    "layout animation `{name}` is missing the animated property"
                )));
            }
        }
        Ok(())
    }

    /// Whether any phase is configured.
    pub fn is_empty(&self) -> bool {
        self.create.is_none() && self.update.is_none() && self.delete.is_none()
    }

    /// Copy with every phase removed (mutations become instantaneous).
    pub(crate) fn without_phases(&self) -> Self {
        Self {
            duration_ms: self.duration_ms,
            ..Self::default()
        }
    }

    fn duration_of(&self, desc: &AnimationDescriptor) -> f64 {
        desc.duration_ms.unwrap_or(self.duration_ms)
    }
}

/// Completion callback of a layout animation; receives whether every animation finished.
pub type AnimationCallback = Box<dyn FnOnce(bool) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupState {
    Idle,
    Armed { pending: usize, finished: bool },
    Fired,
}

/// One-shot group whose callback fires exactly once after every member completed.
pub struct AnimationGroup {
    state: Mutex<(GroupState, Option<AnimationCallback>)>,
}

impl std::fmt::Debug for AnimationGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationGroup")
            .field("state", &self.lock().0)
            .finish()
    }
}

impl AnimationGroup {
    /// Idle group holding `callback`.
    pub fn new(callback: AnimationCallback) -> Self {
        Self {
            state: Mutex::new((GroupState::Idle, Some(callback))),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, (GroupState, Option<AnimationCallback>)> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start counting `pending` members. Arming with zero fires immediately.
    pub fn arm(&self, pending: usize) {
        {
            let mut guard = self.lock();
            if guard.0 != GroupState::Idle {
                tracing::warn!(state = ?guard.0, "animation group armed twice; ignored");
                return;
            }
            guard.0 = GroupState::Armed {
                pending,
                finished: true,
            };
        }
        if pending == 0 {
            self.settle();
        }
    }

    /// Fire the callback with `false` if the group was never armed.
    pub fn cancel(&self) {
        let cb = {
            let mut guard = self.lock();
            if guard.0 != GroupState::Idle {
                return;
            }
            guard.0 = GroupState::Fired;
            guard.1.take()
        };
        if let Some(cb) = cb {
            cb(false);
        }
    }

    /// Add one pending member to an armed group.
    pub fn retain(&self) {
        let mut guard = self.lock();
        match &mut guard.0 {
            GroupState::Armed { pending, .. } => *pending += 1,
            state => tracing::warn!(?state, "retain on an unarmed animation group"),
        }
    }

    /// Mark one member done. The last one fires the callback.
    pub fn complete_one(&self, finished: bool) {
        {
            let mut guard = self.lock();
            match &mut guard.0 {
                GroupState::Armed {
                    pending,
                    finished: all,
                } if *pending > 0 => {
                    *pending -= 1;
                    *all &= finished;
                }
                state => {
                    tracing::warn!(?state, "stray animation completion; ignored");
                    return;
                }
            }
        }
        self.settle();
    }

    fn settle(&self) {
        let fire = {
            let mut guard = self.lock();
            match guard.0 {
                GroupState::Armed {
                    pending: 0,
                    finished,
                } => {
                    guard.0 = GroupState::Fired;
                    guard.1.take().map(|cb| (cb, finished))
                }
                _ => None,
            }
        };
        // Invoke outside the lock; the callback may re-enter the group.
        if let Some((cb, finished)) = fire {
            cb(finished);
        }
    }

    /// Members still pending, `None` unless armed.
    pub fn pending(&self) -> Option<usize> {
        match self.lock().0 {
            GroupState::Armed { pending, .. } => Some(pending),
            _ => None,
        }
    }

    /// Whether the callback has fired.
    pub fn is_fired(&self) -> bool {
        self.lock().0 == GroupState::Fired
    }
}

/// Layout animation installed for one batch: the config plus its one-shot group.
#[derive(Debug, Clone)]
pub struct AnimationSequencer {
    config: LayoutAnimationConfig,
    group: Arc<AnimationGroup>,
}

impl AnimationSequencer {
    /// Pair a validated config with its completion callback.
    pub fn new(config: LayoutAnimationConfig, callback: AnimationCallback) -> Self {
        Self {
            config,
            group: Arc::new(AnimationGroup::new(callback)),
        }
    }

    /// The configuration.
    pub fn config(&self) -> &LayoutAnimationConfig {
        &self.config
    }

    /// The shared completion group.
    pub fn group(&self) -> &Arc<AnimationGroup> {
        &self.group
    }

    /// Whether the group is armed with members still outstanding.
    pub fn has_pending(&self) -> bool {
        self.group.pending().is_some_and(|n| n > 0)
    }

    pub(crate) fn request(
        &self,
        tag: Tag,
        phase: AnimationPhase,
        from: ViewTarget,
        to: ViewTarget,
        on_finish: Option<MountHook>,
    ) -> Option<AnimationRequest> {
        let descriptor = match phase {
            AnimationPhase::Create => self.config.create.as_ref(),
            AnimationPhase::Update => self.config.update.as_ref(),
            AnimationPhase::Delete => self.config.delete.as_ref(),
        }?;
        Some(AnimationRequest {
            tag,
            phase,
            duration_ms: self.config.duration_of(descriptor),
            descriptor: descriptor.clone(),
            from,
            to,
            on_finish,
            group: Arc::clone(&self.group),
        })
    }

    pub(crate) fn animates(&self, phase: AnimationPhase) -> bool {
        match phase {
            AnimationPhase::Create => self.config.create.is_some(),
            AnimationPhase::Update => self.config.update.is_some(),
            AnimationPhase::Delete => self.config.delete.is_some(),
        }
    }
}

/// Which mutation an animation covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationPhase {
    /// A view appearing.
    Create,
    /// A view changing frame.
    Update,
    /// A view being removed.
    Delete,
}

/// Geometry and visual state at one end of an animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTarget {
    /// Frame in parent coordinates.
    pub frame: Rect,
    /// Opacity and transform.
    pub visual: VisualState,
}

/// One view animation handed to a [`ViewAnimator`].
///
/// Whoever drives the animation must call [`AnimationRequest::finish`] exactly once.
pub struct AnimationRequest {
    /// Animated view.
    pub tag: Tag,
    /// Covered mutation.
    pub phase: AnimationPhase,
    /// Curve and property.
    pub descriptor: AnimationDescriptor,
    /// Resolved duration.
    pub duration_ms: f64,
    /// Start state (already applied to the view).
    pub from: ViewTarget,
    /// End state.
    pub to: ViewTarget,
    on_finish: Option<MountHook>,
    group: Arc<AnimationGroup>,
}

impl std::fmt::Debug for AnimationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationRequest")
            .field("tag", &self.tag)
            .field("phase", &self.phase)
            .field("duration_ms", &self.duration_ms)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

impl AnimationRequest {
    /// Apply the end state, run the merged completion work and release the group slot.
    pub fn finish(self, views: &mut NativeRegistry, finished: bool) {
        if let Some(view) = views.view_mut(self.tag) {
            view.set_frame(self.to.frame);
            view.set_visual_state(self.to.visual);
        }
        if let Some(hook) = self.on_finish {
            crate::mount::mounter::run_guarded("animation completion", Some(self.tag), || {
                hook(views)
            });
        }
        self.group.complete_one(finished);
    }
}

/// Drives animation curves on the UI actor.
pub trait ViewAnimator {
    /// Start `request`. The start state is already applied to the view.
    fn animate(&mut self, views: &mut NativeRegistry, request: AnimationRequest);
}

impl<T: ViewAnimator + ?Sized> ViewAnimator for Box<T> {
    fn animate(&mut self, views: &mut NativeRegistry, request: AnimationRequest) {
        (**self).animate(views, request);
    }
}

/// Animator that jumps straight to the end state.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateAnimator;

impl ViewAnimator for ImmediateAnimator {
    fn animate(&mut self, views: &mut NativeRegistry, request: AnimationRequest) {
        request.finish(views, true);
    }
}

/// Animator that parks requests until the caller finishes them.
#[derive(Debug, Default)]
pub struct DeferredAnimator {
    running: Vec<AnimationRequest>,
}

impl DeferredAnimator {
    /// Create an animator with nothing running.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests still running, in start order.
    pub fn running(&self) -> &[AnimationRequest] {
        &self.running
    }

    /// Finish the running request at `index`.
    pub fn finish_at(&mut self, views: &mut NativeRegistry, index: usize, finished: bool) -> bool {
        if index >= self.running.len() {
            return false;
        }
        self.running.remove(index).finish(views, finished);
        true
    }

    /// Finish every running request, newest first.
    pub fn finish_all(&mut self, views: &mut NativeRegistry) {
        while let Some(req) = self.running.pop() {
            req.finish(views, true);
        }
    }
}

impl ViewAnimator for DeferredAnimator {
    fn animate(&mut self, _views: &mut NativeRegistry, request: AnimationRequest) {
        self.running.push(request);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mount/animation.rs"]
mod tests;
