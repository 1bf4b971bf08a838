//! Two-actor runtime: a coordination thread owning the shadow tree and a UI thread owning the
//! native tree, talking only through posted closures.

pub(crate) mod actor;
pub(crate) mod command;
pub(crate) mod config;
pub(crate) mod ui_manager;

use crate::component::registry::ComponentRegistry;
use crate::foundation::core::Tag;
use crate::foundation::error::{ShadowResult, absorb};
use crate::mount::animation::{
    AnimationCallback, ImmediateAnimator, LayoutAnimationConfig, ViewAnimator,
};
use crate::mount::mounter::Mounter;
use crate::mount::record::MountBatch;
use crate::native::registry::NativeRegistry;
use crate::tracking::observer::ObserverCoordinator;

use self::actor::{Actor, ActorHandle};
use self::command::Command;
use self::config::UiManagerOpts;
use self::ui_manager::{
    AnimationErrorCallback, Measurement, MountSink, RelativeLayout, UiBlock, UiManager,
};

type UiState = Mounter<Box<dyn ViewAnimator>>;

/// Forwards committed batches to the UI actor and reports each mount back.
struct UiDispatch {
    ui: ActorHandle<UiState>,
    coordinator: ActorHandle<UiManager>,
}

impl MountSink for UiDispatch {
    fn submit(&mut self, batch: MountBatch) -> ShadowResult<()> {
        let coordinator = self.coordinator.clone();
        self.ui.dispatch(move |mounter| {
            let id = batch.id;
            mounter.mount(batch);
            if let Err(err) = coordinator.dispatch(move |m| m.batch_did_mount(id)) {
                tracing::warn!(%id, error = %err, "mount completion not delivered");
            }
        })
    }
}

/// Running engine: both actors plus the command surface that feeds them.
///
/// Every command is fire-and-forget; failures are logged on the coordination thread.
pub struct Runtime {
    // Must drop before `ui`: its queued work still posts batches there.
    coordinator: Actor<UiManager>,
    ui: Actor<UiState>,
    observers: ObserverCoordinator,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("coordinator", self.coordinator.handle())
            .field("ui", self.ui.handle())
            .field("observers", &self.observers)
            .finish()
    }
}

impl Runtime {
    /// Start both actors with animations applied instantly.
    pub fn start(opts: UiManagerOpts, components: ComponentRegistry) -> ShadowResult<Self> {
        Self::with_animator(opts, components, || Box::new(ImmediateAnimator))
    }

    /// Start both actors; `make_animator` runs on the UI thread.
    pub fn with_animator(
        opts: UiManagerOpts,
        components: ComponentRegistry,
        make_animator: impl FnOnce() -> Box<dyn ViewAnimator> + Send + 'static,
    ) -> ShadowResult<Self> {
        let observers = ObserverCoordinator::new();

        let ui_observers = observers.clone();
        let ui = Actor::spawn(&opts.ui_thread_name, move |_| {
            Mounter::new(make_animator(), ui_observers)
        })?;

        let ui_handle = ui.handle().clone();
        let coordinator_observers = observers.clone();
        let name = opts.coordinator_thread_name.clone();
        let coordinator = Actor::spawn(&name, move |own| {
            let sink = UiDispatch {
                ui: ui_handle,
                coordinator: own,
            };
            UiManager::new(opts, components, sink).with_observers(coordinator_observers)
        })?;

        tracing::debug!("runtime started");
        Ok(Self {
            coordinator,
            ui,
            observers,
        })
    }

    /// Observers notified at the four batch points.
    pub fn observers(&self) -> &ObserverCoordinator {
        &self.observers
    }

    /// Queue one command on the coordination actor.
    pub fn dispatch(&self, command: Command) -> ShadowResult<()> {
        self.coordinator.handle().dispatch(move |m| {
            let name = command.name();
            absorb(name, m.apply(command));
        })
    }

    /// Close the current batch: lay out, diff and mount it.
    pub fn batch_did_complete(&self) -> ShadowResult<()> {
        self.coordinator.handle().dispatch(|m| {
            if let Err(err) = m.batch_did_complete() {
                tracing::error!(error = %err, "batch not committed");
            }
        })
    }

    /// Measure `tag`; `callback` receives `None` when the tag is unknown or not laid out.
    pub fn measure(
        &self,
        tag: Tag,
        callback: impl FnOnce(Option<Measurement>) + Send + 'static,
    ) -> ShadowResult<()> {
        self.coordinator
            .handle()
            .dispatch(move |m| callback(m.measure(tag)))
    }

    /// Measure `tag` relative to `ancestor`. On failure the anomaly is logged and `callback`
    /// is never invoked.
    pub fn measure_layout_relative_to(
        &self,
        tag: Tag,
        ancestor: Tag,
        callback: impl FnOnce(RelativeLayout) + Send + 'static,
    ) -> ShadowResult<()> {
        self.coordinator.handle().dispatch(move |m| {
            match m.measure_layout_relative_to(tag, ancestor) {
                Ok(layout) => callback(layout),
                Err(err) => absorb("measureLayoutRelativeTo", Err(err)),
            }
        })
    }

    /// Measure `tag` relative to its parent, with the same silence-on-failure contract.
    pub fn measure_layout_relative_to_parent(
        &self,
        tag: Tag,
        callback: impl FnOnce(RelativeLayout) + Send + 'static,
    ) -> ShadowResult<()> {
        self.coordinator.handle().dispatch(move |m| {
            match m.measure_layout_relative_to_parent(tag) {
                Ok(layout) => callback(layout),
                Err(err) => absorb("measureLayoutRelativeToParent", Err(err)),
            }
        })
    }

    /// Install a layout animation for the next batch.
    pub fn configure_next_layout_animation(
        &self,
        config: LayoutAnimationConfig,
        callback: AnimationCallback,
        on_error: AnimationErrorCallback,
    ) -> ShadowResult<()> {
        self.coordinator.handle().dispatch(move |m| {
            m.configure_next_layout_animation(config, callback, on_error);
        })
    }

    /// Queue `block` to run on the UI actor after the next batch's frames.
    pub fn add_ui_block(&self, block: UiBlock) -> ShadowResult<()> {
        self.coordinator
            .handle()
            .dispatch(move |m| m.add_ui_block(block))
    }

    /// Queue `block` ahead of everything already queued for the next batch.
    pub fn prepend_ui_block(&self, block: UiBlock) -> ShadowResult<()> {
        self.coordinator
            .handle()
            .dispatch(move |m| m.prepend_ui_block(block))
    }

    /// Run `f` against the coordination state and wait for its result.
    pub fn with_manager<R: Send + 'static>(
        &self,
        f: impl FnOnce(&mut UiManager) -> R + Send + 'static,
    ) -> ShadowResult<R> {
        self.coordinator.handle().call(f)
    }

    /// Run `f` against the native registry and wait for its result.
    pub fn with_views<R: Send + 'static>(
        &self,
        f: impl FnOnce(&mut NativeRegistry) -> R + Send + 'static,
    ) -> ShadowResult<R> {
        self.ui.handle().call(move |mounter| f(mounter.views_mut()))
    }

    /// Wait until every command queued so far is mounted and its completion reported back.
    pub fn flush(&self) -> ShadowResult<()> {
        // Coordinator barrier: every submit has been posted to the UI actor.
        self.coordinator.handle().call(|_| ())?;
        // UI barrier: every batch mounted and its completion posted back.
        self.ui.handle().call(|_| ())?;
        self.coordinator.handle().call(|_| ())
    }

    /// Stop both actors after draining queued work.
    pub fn shutdown(self) -> ShadowResult<()> {
        let Self {
            coordinator, ui, ..
        } = self;
        coordinator.shutdown()?;
        ui.shutdown()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/runtime.rs"]
mod tests;
