use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::foundation::core::{BatchId, Tag};
use crate::foundation::error::ShadowError;
use crate::mount::animation::{AnimationGroup, AnimationPhase, AnimationSequencer, ViewAnimator, ViewTarget};
use crate::mount::context::MountContext;
use crate::mount::record::{FrameMutation, MountBatch, MountHook, MountOp};
use crate::native::registry::NativeRegistry;
use crate::tracking::observer::ObserverCoordinator;

/// Summary of one mount pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MountReport {
    /// Mounted batch.
    pub batch: BatchId,
    /// Frame mutation records applied.
    pub records: usize,
    /// Records handed to the animator.
    pub animated: usize,
    /// Closures and hooks executed.
    pub ops: usize,
    /// Closures and hooks that panicked.
    pub failures: usize,
}

/// UI-actor state: the native registry plus the machinery that mounts batches onto it.
#[derive(Debug)]
pub struct Mounter<A> {
    views: NativeRegistry,
    animator: A,
    observers: ObserverCoordinator,
    in_flight: Option<Arc<AnimationGroup>>,
}

impl<A: ViewAnimator> Mounter<A> {
    /// Create a mounter (and its native registry) bound to the calling thread.
    pub fn new(animator: A, observers: ObserverCoordinator) -> Self {
        Self {
            views: NativeRegistry::new(),
            animator,
            observers,
            in_flight: None,
        }
    }

    /// The native registry.
    pub fn views(&self) -> &NativeRegistry {
        &self.views
    }

    /// Mutable native registry.
    pub fn views_mut(&mut self) -> &mut NativeRegistry {
        &mut self.views
    }

    /// Whether the most recent animated batch still has members running.
    pub fn is_animating(&self) -> bool {
        self.in_flight
            .as_ref()
            .and_then(|g| g.pending())
            .is_some_and(|n| n > 0)
    }

    /// The animator together with the registry it animates.
    pub fn animator_mut(&mut self) -> (&mut A, &mut NativeRegistry) {
        (&mut self.animator, &mut self.views)
    }

    /// Apply one batch: structural closures, frame records, remaining closures, in that order.
    ///
    /// A panicking closure or hook is logged and skipped; the rest of the batch still runs.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(batch = %batch.id, records = batch.records.len())
    )]
    pub fn mount(&mut self, batch: MountBatch) -> MountReport {
        let MountBatch {
            id,
            prelude,
            records,
            mut hooks,
            epilogue,
            animation,
        } = batch;
        self.observers.will_mount(id);

        let mut report = MountReport {
            batch: id,
            ..MountReport::default()
        };
        // One slot per record plus a hold released once every closure has run.
        if let Some(seq) = &animation {
            if let Some(prev) = self.in_flight.take()
                && prev.pending().is_some_and(|n| n > 0)
            {
                tracing::warn!(
                    pending = prev.pending(),
                    "layout animation started while the previous one is still running"
                );
            }
            seq.group().arm(records.len() + 1);
            self.in_flight = Some(Arc::clone(seq.group()));
        }

        self.run_ops(prelude, animation.as_ref(), &mut report);

        for record in records.iter() {
            let hook = hooks.remove(&record.tag);
            self.apply_record(record, hook, animation.as_ref(), &mut report);
        }

        // Hooks for tags without a frame change still run, in tag order.
        let mut leftover: Vec<(Tag, MountHook)> = hooks.into_iter().collect();
        leftover.sort_by_key(|(tag, _)| *tag);
        for (tag, hook) in leftover {
            report.ops += 1;
            let views = &mut self.views;
            if !run_guarded("mount hook", Some(tag), || hook(views)) {
                report.failures += 1;
            }
        }

        self.run_ops(epilogue, animation.as_ref(), &mut report);

        if let Some(seq) = animation {
            seq.group().complete_one(true);
        }
        self.observers.did_mount(id);

        tracing::debug!(
            ops = report.ops,
            animated = report.animated,
            failures = report.failures,
            "batch mounted"
        );
        report
    }

    fn run_ops(
        &mut self,
        ops: Vec<MountOp>,
        sequencer: Option<&AnimationSequencer>,
        report: &mut MountReport,
    ) {
        let mut cx = MountContext::new(&mut self.views, &mut self.animator, sequencer);
        for op in ops {
            report.ops += 1;
            if !run_guarded("mount closure", None, || op(&mut cx)) {
                report.failures += 1;
            }
        }
    }

    fn apply_record(
        &mut self,
        record: &FrameMutation,
        hook: Option<MountHook>,
        sequencer: Option<&AnimationSequencer>,
        report: &mut MountReport,
    ) {
        report.records += 1;
        let tag = record.tag;
        let Some(view) = self.views.view_mut(tag) else {
            tracing::warn!(%tag, "frame for unknown native view; skipped");
            if let Some(seq) = sequencer {
                seq.group().complete_one(true);
            }
            return;
        };

        view.set_hidden(record.is_hidden);
        view.set_layout_direction(record.layout_direction);

        let phase = if record.is_new && !record.parent_is_new {
            Some(AnimationPhase::Create)
        } else if !record.is_new {
            Some(AnimationPhase::Update)
        } else {
            None
        };
        let animated = sequencer.zip(phase).filter(|(s, p)| s.animates(*p));

        let request = match animated {
            Some((seq, AnimationPhase::Create)) => {
                view.set_frame(record.frame);
                let settled = view.visual_state();
                let start = seq
                    .config()
                    .create
                    .as_ref()
                    .and_then(|d| d.property)
                    .map_or(settled, |p| p.collapsed(settled));
                view.set_visual_state(start);
                let from = ViewTarget {
                    frame: record.frame,
                    visual: start,
                };
                let to = ViewTarget {
                    frame: record.frame,
                    visual: settled,
                };
                seq.request(tag, AnimationPhase::Create, from, to, hook)
            }
            Some((seq, phase)) => {
                let visual = view.visual_state();
                let from = ViewTarget {
                    frame: view.frame(),
                    visual,
                };
                let to = ViewTarget {
                    frame: record.frame,
                    visual,
                };
                seq.request(tag, phase, from, to, hook)
            }
            None => {
                view.set_frame(record.frame);
                if let Some(hook) = hook {
                    report.ops += 1;
                    let views = &mut self.views;
                    if !run_guarded("mount hook", Some(tag), || hook(views)) {
                        report.failures += 1;
                    }
                }
                if let Some(seq) = sequencer {
                    seq.group().complete_one(true);
                }
                None
            }
        };

        if let Some(request) = request {
            report.animated += 1;
            self.animator.animate(&mut self.views, request);
        }
    }
}

/// Run `f`, converting a panic into a logged mount failure. Returns `false` on panic.
pub(crate) fn run_guarded(what: &'static str, tag: Option<Tag>, f: impl FnOnce()) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            let err = mount_failure(what, tag, payload.as_ref());
            tracing::error!(error = %err, "closure skipped");
            false
        }
    }
}

fn mount_failure(what: &str, tag: Option<Tag>, payload: &(dyn Any + Send)) -> ShadowError {
    let msg = panic_message(payload);
    match tag {
        Some(tag) => ShadowError::mount(format!("{what} for {tag} panicked: {msg}")),
        None => ShadowError::mount(format!("{what} panicked: {msg}")),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mount/mounter.rs"]
mod tests;
