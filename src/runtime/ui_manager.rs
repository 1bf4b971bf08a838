use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::component::descriptor::{ComponentDescriptor, ViewDescriptor};
use crate::component::registry::ComponentRegistry;
use crate::foundation::core::{BatchId, Point, Props, Size, Tag};
use crate::foundation::error::{ShadowError, ShadowResult, absorb, invariant};
use crate::layout::engine::LayoutEngine;
use crate::layout::style::LAYOUT_PROPS;
use crate::layout::taffy_engine::TaffyLayoutEngine;
use crate::mount::animation::{AnimationCallback, AnimationSequencer, LayoutAnimationConfig};
use crate::mount::context::MountContext;
use crate::mount::planner::MutationPlanner;
use crate::mount::record::{FrameMutation, MountBatch, MountHook, MountOp};
use crate::native::registry::NativeRegistry;
use crate::native::view::NativeView;
use crate::runtime::command::Command;
use crate::runtime::config::UiManagerOpts;
use crate::shadow::children::ManageChildren;
use crate::shadow::node::LocalData;
use crate::shadow::registry::ShadowRegistry;
use crate::tracking::change_tracker::ChangeTracker;
use crate::tracking::observer::ObserverCoordinator;

/// Arbitrary closure queued against the native registry.
pub type UiBlock = MountHook;

/// Callback receiving a rejected layout animation configuration.
pub type AnimationErrorCallback = Box<dyn FnOnce(ShadowError) + Send>;

/// Receives committed batches, typically by forwarding them to the UI actor.
pub trait MountSink: Send {
    /// Hand over one committed batch.
    fn submit(&mut self, batch: MountBatch) -> ShadowResult<()>;
}

/// In-memory sink that queues committed batches for the caller to mount.
#[derive(Clone, Default)]
pub struct BatchQueue {
    batches: Arc<Mutex<VecDeque<MountBatch>>>,
}

impl std::fmt::Debug for BatchQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchQueue")
            .field("queued", &self.len())
            .finish()
    }
}

impl BatchQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<MountBatch>> {
        self.batches.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Oldest queued batch.
    pub fn pop(&self) -> Option<MountBatch> {
        self.lock().pop_front()
    }

    /// Every queued batch, oldest first.
    pub fn drain(&self) -> Vec<MountBatch> {
        self.lock().drain(..).collect()
    }

    /// Number of queued batches.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MountSink for BatchQueue {
    fn submit(&mut self, batch: MountBatch) -> ShadowResult<()> {
        self.lock().push_back(batch);
        Ok(())
    }
}

/// Result of `measure`: frame relative to the parent plus the origin relative to the root.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// X in parent coordinates.
    pub x: f64,
    /// Y in parent coordinates.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// X in root coordinates.
    pub page_x: f64,
    /// Y in root coordinates.
    pub page_y: f64,
}

/// Frame of a node relative to one of its ancestors.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct RelativeLayout {
    /// Left offset from the ancestor's origin.
    pub left: f64,
    /// Top offset from the ancestor's origin.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl RelativeLayout {
    fn is_finite(&self) -> bool {
        self.left.is_finite() && self.top.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Coordination-actor state: the shadow tree and everything that turns commands into batches.
///
/// Every command runs synchronously against the shadow tree and queues the matching native
/// closure; `batch_did_complete` lays out, diffs and hands the whole batch to the sink.
pub struct UiManager {
    opts: UiManagerOpts,
    shadow: ShadowRegistry,
    components: ComponentRegistry,
    engine: Box<dyn LayoutEngine>,
    tracker: ChangeTracker,
    observers: ObserverCoordinator,
    prelude: Vec<MountOp>,
    ui_blocks: Vec<MountOp>,
    pending_animation: Option<AnimationSequencer>,
    next_batch: u64,
    last_mounted: Option<BatchId>,
    last_records: Box<[FrameMutation]>,
    sink: Box<dyn MountSink>,
}

impl std::fmt::Debug for UiManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiManager")
            .field("opts", &self.opts)
            .field("nodes", &self.shadow.len())
            .field("queued", &self.prelude.len())
            .field("next_batch", &self.next_batch)
            .field("last_mounted", &self.last_mounted)
            .finish_non_exhaustive()
    }
}

impl UiManager {
    /// Create a manager bound to the calling thread, using the Taffy layout engine.
    pub fn new(
        opts: UiManagerOpts,
        components: ComponentRegistry,
        sink: impl MountSink + 'static,
    ) -> Self {
        Self {
            opts,
            shadow: ShadowRegistry::new(),
            components,
            engine: Box::new(TaffyLayoutEngine::new()),
            tracker: ChangeTracker::new(),
            observers: ObserverCoordinator::new(),
            prelude: Vec::new(),
            ui_blocks: Vec::new(),
            pending_animation: None,
            next_batch: 1,
            last_mounted: None,
            last_records: Box::default(),
            sink: Box::new(sink),
        }
    }

    /// Replace the layout engine.
    pub fn with_engine(mut self, engine: impl LayoutEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Share an observer set (e.g. with the UI actor).
    pub fn with_observers(mut self, observers: ObserverCoordinator) -> Self {
        self.observers = observers;
        self
    }

    /// Active options.
    pub fn opts(&self) -> &UiManagerOpts {
        &self.opts
    }

    /// The shadow tree.
    pub fn shadow(&self) -> &ShadowRegistry {
        &self.shadow
    }

    /// Registered components.
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Batch lifecycle observers.
    pub fn observers(&self) -> &ObserverCoordinator {
        &self.observers
    }

    /// Last batch the UI actor reported as mounted.
    pub fn last_mounted(&self) -> Option<BatchId> {
        self.last_mounted
    }

    /// Frame mutation records of the most recently committed batch.
    pub fn last_records(&self) -> &[FrameMutation] {
        &self.last_records
    }

    /// Changes recorded so far in the current batch.
    pub fn pending_changes(&self) -> &ChangeTracker {
        &self.tracker
    }

    fn component(&self, name: &str) -> Option<Arc<dyn ComponentDescriptor>> {
        self.components.get(name).cloned()
    }

    fn queue(&mut self, op: impl FnOnce(&mut MountContext<'_>) + Send + 'static) {
        self.prelude.push(Box::new(op));
    }

    /// Register a new top-level surface.
    pub fn register_root(&mut self, tag: Tag, available_size: Size) -> ShadowResult<()> {
        const ROOT_VIEW: &str = "RootView";
        self.shadow.insert_root(tag, ROOT_VIEW, available_size)?;
        let component = self
            .component(ROOT_VIEW)
            .unwrap_or_else(|| Arc::new(ViewDescriptor::new(ROOT_VIEW)));
        self.queue(move |cx| {
            let view = component.create_native(tag);
            if let Err(err) = cx.views().insert(tag, ROOT_VIEW, view, true) {
                tracing::error!(%tag, error = %err, "native root not created");
            }
        });
        tracing::debug!(%tag, width = available_size.width, height = available_size.height, "root registered");
        Ok(())
    }

    /// Change the layout constraint of a root.
    pub fn set_available_size(&mut self, root: Tag, size: Size) -> ShadowResult<()> {
        self.shadow.set_available_size(root, size)
    }

    /// Create a view of component `view_name` under `root_tag`.
    ///
    /// An unregistered component is logged and ignored.
    pub fn create_view(
        &mut self,
        tag: Tag,
        view_name: &str,
        root_tag: Tag,
        props: Props,
    ) -> ShadowResult<()> {
        let Some(component) = self.component(view_name) else {
            tracing::warn!(%tag, view_name, "createView for unregistered component; ignored");
            return Ok(());
        };
        let mut node = component.create_shadow(tag, root_tag);
        let changed = component.apply_shadow_props(&mut node, &props);
        self.shadow.insert(node)?;
        self.tracker.record_props_changed(tag, changed);

        let name = view_name.to_owned();
        self.queue(move |cx| {
            let mut view = component.create_native(tag);
            component.apply_native_props(view.as_mut(), &props);
            if let Err(err) = cx.views().insert(tag, &name, view, false) {
                tracing::error!(%tag, error = %err, "native view not created");
            }
        });
        Ok(())
    }

    /// Merge `props` into an existing view.
    pub fn update_view(&mut self, tag: Tag, view_name: &str, props: Props) -> ShadowResult<()> {
        let node = self.shadow.require(tag)?;
        if !view_name.is_empty() && view_name != node.view_name() {
            tracing::debug!(%tag, view_name, actual = node.view_name(), "updateView name mismatch");
        }
        let Some(component) = self.component(node.view_name()) else {
            return Err(invariant(format!(
                "{tag} has unregistered component {}",
                node.view_name()
            )));
        };

        let changed = component.apply_shadow_props(self.shadow.get_mut(tag)?, &props);
        if changed
            .iter()
            .any(|k| LAYOUT_PROPS.binary_search(&k.as_str()).is_ok())
        {
            self.shadow.mark_dirty(tag);
        }
        self.tracker.record_props_changed(tag, changed);

        self.queue(move |cx| match cx.views().view_mut(tag) {
            Some(view) => component.apply_native_props(view, &props),
            None => tracing::warn!(%tag, "props for unknown native view; dropped"),
        });
        Ok(())
    }

    /// Combined move/add/remove on the children of `container`.
    pub fn manage_children(&mut self, container: Tag, args: &ManageChildren) -> ShadowResult<()> {
        let current = self.shadow.require(container)?.children().to_vec();
        let reorder = args.apply(&current, self.opts.strict_child_indices)?;
        for &t in &reorder.dropped {
            tracing::warn!(
                %container,
                child = %t,
                "manageChildren destination overwritten; child purged"
            );
        }

        self.shadow
            .replace_children(container, reorder.children.clone())?;
        let removed: Vec<Tag> = reorder
            .removed
            .into_iter()
            .chain(reorder.dropped)
            .filter(|&t| self.shadow.get(t).is_some_and(|n| n.parent().is_none()))
            .collect();
        for &t in &removed {
            self.purge(t);
        }
        self.tracker.record_children_changed(container);

        let children = reorder.children;
        self.queue(move |cx| {
            for t in removed {
                cx.remove_subtree(t);
            }
            if let Err(err) = cx.views().set_children(container, &children) {
                absorb("manageChildren", Err(err));
            }
        });
        Ok(())
    }

    /// Overwrite the children of `container` with `children`, in order.
    ///
    /// Previous children left out of the list are purged.
    pub fn set_children(&mut self, container: Tag, children: Vec<Tag>) -> ShadowResult<()> {
        let detached = self.shadow.replace_children(container, children)?;
        let purged: Vec<Tag> = detached
            .into_iter()
            .filter(|&t| self.shadow.get(t).is_some_and(|n| n.parent().is_none()))
            .collect();
        for &t in &purged {
            self.purge(t);
        }
        self.tracker.record_children_changed(container);

        let attached = self.shadow.require(container)?.children().to_vec();
        self.queue(move |cx| {
            for t in purged {
                cx.remove_subtree(t);
            }
            if let Err(err) = cx.views().set_children(container, &attached) {
                absorb("setChildren", Err(err));
            }
        });
        Ok(())
    }

    /// Remove and purge every child of `container`.
    pub fn remove_subviews_from_container(&mut self, container: Tag) -> ShadowResult<()> {
        let count = self.shadow.require(container)?.children().len();
        self.manage_children(container, &ManageChildren::remove_all(count))
    }

    /// Put `with_tag` where `tag` sits in its parent and purge `tag`.
    pub fn replace_existing_view(&mut self, tag: Tag, with_tag: Tag) -> ShadowResult<()> {
        let node = self.shadow.require(tag)?;
        let Some(parent) = node.parent() else {
            tracing::warn!(%tag, "replaceExistingView on a view without parent; ignored");
            return Ok(());
        };
        let index = self
            .shadow
            .require(parent)?
            .children()
            .iter()
            .position(|&c| c == tag)
            .ok_or_else(|| invariant(format!("{tag} missing from its parent {parent}")))?;
        self.manage_children(parent, &ManageChildren::replace_at(index, with_tag))
    }

    /// Purge a root and its whole tree. A second call is a lookup miss.
    pub fn remove_root_view(&mut self, root: Tag) -> ShadowResult<()> {
        let purged = self.shadow.remove_root(root)?;
        for &t in &purged {
            self.engine.forget(t);
            self.tracker.forget(t);
        }
        tracing::debug!(%root, nodes = purged.len(), "root removed");
        self.queue(move |cx| {
            // Unattached views under the root are not reachable from it.
            for t in purged {
                cx.views().purge(t);
            }
        });
        Ok(())
    }

    fn purge(&mut self, tag: Tag) {
        for t in self.shadow.purge(tag) {
            self.engine.forget(t);
            self.tracker.forget(t);
        }
    }

    /// Frame of `tag` in parent coordinates plus its origin in root coordinates.
    ///
    /// `None` when the tag is unknown or has not been laid out yet.
    pub fn measure(&self, tag: Tag) -> Option<Measurement> {
        let frame = self.shadow.get(tag)?.layout_metrics()?.frame;
        let page = self.origin_in(tag, None)?;
        Some(Measurement {
            x: frame.x0,
            y: frame.y0,
            width: frame.width(),
            height: frame.height(),
            page_x: page.x,
            page_y: page.y,
        })
    }

    /// Frame of `tag` relative to `ancestor`, which must be `tag` itself or an ancestor of it.
    pub fn measure_layout_relative_to(
        &self,
        tag: Tag,
        ancestor: Tag,
    ) -> ShadowResult<RelativeLayout> {
        let node = self.shadow.require(tag)?;
        self.shadow.require(ancestor)?;
        if tag != ancestor && !self.shadow.is_ancestor(ancestor, tag) {
            return Err(ShadowError::layout(format!(
                "{tag} is not a descendant of {ancestor}"
            )));
        }
        let frame = node
            .layout_metrics()
            .ok_or_else(|| ShadowError::layout(format!("{tag} has not been laid out")))?
            .frame;
        let origin = if tag == ancestor {
            Point::ZERO
        } else {
            self.origin_in(tag, Some(ancestor))
                .ok_or_else(|| ShadowError::layout(format!("{tag} has an unmeasured ancestor")))?
        };
        let out = RelativeLayout {
            left: origin.x,
            top: origin.y,
            width: frame.width(),
            height: frame.height(),
        };
        if !out.is_finite() {
            return Err(ShadowError::layout(format!(
                "{tag} measured to a non-finite layout relative to {ancestor}"
            )));
        }
        Ok(out)
    }

    /// Frame of `tag` relative to its parent.
    pub fn measure_layout_relative_to_parent(&self, tag: Tag) -> ShadowResult<RelativeLayout> {
        let parent = self
            .shadow
            .require(tag)?
            .parent()
            .ok_or_else(|| ShadowError::layout(format!("{tag} has no parent")))?;
        self.measure_layout_relative_to(tag, parent)
    }

    /// Sum of frame origins from `tag` up to (excluding) `stop`, or to the root.
    fn origin_in(&self, tag: Tag, stop: Option<Tag>) -> Option<Point> {
        let mut origin = Point::ZERO;
        let mut cur = Some(tag);
        while let Some(t) = cur {
            if Some(t) == stop {
                break;
            }
            let node = self.shadow.get(t)?;
            let frame = node.layout_metrics()?.frame;
            origin.x += frame.x0;
            origin.y += frame.y0;
            cur = node.parent();
        }
        Some(origin)
    }

    /// Install a layout animation for the next batch.
    ///
    /// An invalid config goes to `on_error` and nothing is installed. Overwriting an animation
    /// that has not been mounted yet cancels it: its callback fires with `false`.
    pub fn configure_next_layout_animation(
        &mut self,
        config: LayoutAnimationConfig,
        callback: AnimationCallback,
        on_error: AnimationErrorCallback,
    ) {
        if let Err(err) = config.validate() {
            tracing::warn!(error = %err, "layout animation rejected");
            on_error(err);
            return;
        }
        let config = if self.opts.layout_animations {
            config
        } else {
            config.without_phases()
        };
        let next = AnimationSequencer::new(config, callback);
        if let Some(prev) = self.pending_animation.replace(next) {
            tracing::warn!("layout animation replaced before its batch mounted; last one wins");
            prev.group().cancel();
        }
    }

    /// Forward an imperative command to the component of `tag`.
    pub fn dispatch_command(
        &mut self,
        tag: Tag,
        command: String,
        args: Vec<serde_json::Value>,
    ) -> ShadowResult<()> {
        let name = self.shadow.require(tag)?.view_name().to_owned();
        let Some(component) = self.component(&name) else {
            return Err(invariant(format!("{tag} has unregistered component {name}")));
        };
        self.ui_blocks.push(Box::new(move |cx: &mut MountContext<'_>| {
            match cx.views().view_mut(tag) {
                Some(view) => component.dispatch_command(view, &command, &args),
                None => tracing::warn!(%tag, %command, "command for unknown native view; dropped"),
            }
        }));
        Ok(())
    }

    /// Attach opaque component data to a shadow node.
    pub fn set_local_data(&mut self, tag: Tag, data: LocalData) -> ShadowResult<()> {
        self.shadow.get_mut(tag)?.set_local_data(Some(data));
        self.shadow.mark_dirty(tag);
        Ok(())
    }

    /// Set (or clear) the intrinsic content size used when `tag` is a layout leaf.
    pub fn set_intrinsic_content_size(&mut self, tag: Tag, size: Option<Size>) -> ShadowResult<()> {
        if self.shadow.get_mut(tag)?.set_intrinsic_size(size) {
            self.shadow.mark_dirty(tag);
        }
        Ok(())
    }

    /// Root owning `tag`.
    pub fn root_tag_for(&self, tag: Tag) -> ShadowResult<Tag> {
        Ok(self.shadow.require(tag)?.root_tag())
    }

    /// Queue `block` to run after the next batch's frames are applied.
    pub fn add_ui_block(&mut self, block: UiBlock) {
        self.ui_blocks
            .push(Box::new(move |cx: &mut MountContext<'_>| block(cx.views())));
    }

    /// Queue `block` ahead of every closure already queued for the next batch.
    pub fn prepend_ui_block(&mut self, block: UiBlock) {
        self.prelude
            .insert(0, Box::new(move |cx: &mut MountContext<'_>| block(cx.views())));
    }

    /// Apply one transport-level command.
    pub fn apply(&mut self, command: Command) -> ShadowResult<()> {
        match command {
            Command::RegisterRoot {
                tag,
                available_size,
            } => self.register_root(tag, available_size),
            Command::SetAvailableSize { tag, size } => self.set_available_size(tag, size),
            Command::CreateView {
                tag,
                view_name,
                root_tag,
                props,
            } => self.create_view(tag, &view_name, root_tag, props),
            Command::UpdateView {
                tag,
                view_name,
                props,
            } => self.update_view(tag, &view_name, props),
            Command::ManageChildren {
                container,
                move_from,
                move_to,
                add_tags,
                add_at,
                remove_at,
            } => self.manage_children(
                container,
                &ManageChildren {
                    move_from,
                    move_to,
                    add_tags,
                    add_at,
                    remove_at,
                },
            ),
            Command::SetChildren {
                container,
                children,
            } => self.set_children(container, children),
            Command::RemoveSubviewsFromContainer { container } => {
                self.remove_subviews_from_container(container)
            }
            Command::ReplaceExistingView { tag, with_tag } => {
                self.replace_existing_view(tag, with_tag)
            }
            Command::RemoveRootView { tag } => self.remove_root_view(tag),
            Command::SetIntrinsicContentSize { tag, size } => {
                self.set_intrinsic_content_size(tag, size)
            }
            Command::DispatchCommand { tag, command, args } => {
                self.dispatch_command(tag, command, args)
            }
            Command::ConfigureNextLayoutAnimation { config } => {
                self.configure_next_layout_animation(
                    config,
                    Box::new(|finished: bool| tracing::debug!(finished, "layout animation done")),
                    Box::new(|err: ShadowError| {
                        tracing::warn!(error = %err, "layout animation failed");
                    }),
                );
                Ok(())
            }
            Command::BatchDidComplete => self.batch_did_complete().map(drop),
        }
    }

    /// Close the current batch: notify, lay out, diff and submit everything queued.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn batch_did_complete(&mut self) -> ShadowResult<BatchId> {
        let id = BatchId(self.next_batch);
        self.next_batch += 1;
        self.observers.will_layout(id);

        let mut epilogue = self.dispatch_change_notifications();

        let plan = MutationPlanner::new(
            &mut self.shadow,
            self.engine.as_mut(),
            &self.components,
            self.opts.default_layout_direction,
        )
        .plan();
        self.observers.did_layout(id);

        epilogue.append(&mut self.ui_blocks);
        let records = plan.records.into_boxed_slice();
        self.last_records = records.clone();
        let batch = MountBatch {
            id,
            prelude: std::mem::take(&mut self.prelude),
            records,
            hooks: plan.hooks,
            epilogue,
            animation: self.pending_animation.take(),
        };
        tracing::debug!(?batch, "batch committed");
        self.sink.submit(batch)?;
        Ok(id)
    }

    /// Shadow-side change notifications now; native-side ones queued for after the frames.
    fn dispatch_change_notifications(&mut self) -> Vec<MountOp> {
        let changes = self.tracker.take();
        let mut ops: Vec<MountOp> = Vec::new();

        for (tag, names) in changes.props {
            let Some(component) = self.live_component(tag) else {
                continue;
            };
            if let Ok(node) = self.shadow.get_mut(tag) {
                component.shadow_did_set_props(node, &names);
            }
            ops.push(Box::new(move |cx: &mut MountContext<'_>| {
                notify(cx.views(), tag, |v| v.did_set_props(&names));
            }));
        }
        for tag in changes.children {
            let Some(component) = self.live_component(tag) else {
                continue;
            };
            let Ok(node) = self.shadow.get_mut(tag) else {
                continue;
            };
            component.shadow_did_update_children(node);
            let children = node.children().to_vec();
            ops.push(Box::new(move |cx: &mut MountContext<'_>| {
                notify(cx.views(), tag, |v| v.did_update_children(&children));
            }));
        }
        ops
    }

    fn live_component(&self, tag: Tag) -> Option<Arc<dyn ComponentDescriptor>> {
        let node = self.shadow.get(tag)?;
        self.component(node.view_name())
    }

    /// The UI actor finished mounting `batch`.
    pub fn batch_did_mount(&mut self, batch: BatchId) {
        tracing::trace!(%batch, "batch mounted");
        self.last_mounted = Some(self.last_mounted.map_or(batch, |b| b.max(batch)));
    }
}

fn notify(views: &mut NativeRegistry, tag: Tag, f: impl FnOnce(&mut dyn NativeView)) {
    if let Some(view) = views.view_mut(tag) {
        f(view);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/ui_manager.rs"]
mod tests;
