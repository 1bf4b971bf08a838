use crate::foundation::core::Tag;
use crate::mount::animation::{AnimationPhase, AnimationSequencer, ViewAnimator, ViewTarget};
use crate::native::registry::NativeRegistry;

/// UI-actor view handed to every [`MountOp`](super::record::MountOp).
pub struct MountContext<'a> {
    views: &'a mut NativeRegistry,
    animator: &'a mut dyn ViewAnimator,
    sequencer: Option<&'a AnimationSequencer>,
}

impl<'a> MountContext<'a> {
    pub(crate) fn new(
        views: &'a mut NativeRegistry,
        animator: &'a mut dyn ViewAnimator,
        sequencer: Option<&'a AnimationSequencer>,
    ) -> Self {
        Self {
            views,
            animator,
            sequencer,
        }
    }

    /// The native registry.
    pub fn views(&mut self) -> &mut NativeRegistry {
        self.views
    }

    /// Remove the native subtree rooted at `tag`, fading it out first when a delete animation
    /// is configured for this batch.
    pub fn remove_subtree(&mut self, tag: Tag) {
        let animated = self
            .sequencer
            .filter(|s| s.animates(AnimationPhase::Delete));
        let (Some(seq), Some(view)) = (animated, self.views.view(tag)) else {
            self.views.purge(tag);
            return;
        };

        let from = ViewTarget {
            frame: view.frame(),
            visual: view.visual_state(),
        };
        let property = seq
            .config()
            .delete
            .as_ref()
            .and_then(|d| d.property);
        let to = ViewTarget {
            frame: from.frame,
            visual: property.map_or(from.visual, |p| p.collapsed(from.visual)),
        };
        let Some(request) = seq.request(
            tag,
            AnimationPhase::Delete,
            from,
            to,
            Some(Box::new(move |views: &mut NativeRegistry| {
                views.purge(tag);
            })),
        ) else {
            self.views.purge(tag);
            return;
        };
        seq.group().retain();
        self.views.mark_deleting(tag);
        self.animator.animate(self.views, request);
    }
}
