use super::*;
use crate::foundation::core::Rect;
use crate::mount::animation::{AnimatedProperty, AnimationDescriptor, ImmediateAnimator};
use crate::mount::mounter::Mounter;
use crate::native::view::{BasicView, NativeView};
use crate::tracking::observer::UiManagerObserver;
use serde_json::json;

const ROOT: Tag = Tag(1);

fn props(v: serde_json::Value) -> Props {
    v.as_object().cloned().unwrap()
}

struct Harness {
    ui: UiManager,
    queue: BatchQueue,
    mounter: Mounter<ImmediateAnimator>,
}

impl Harness {
    fn with(opts: UiManagerOpts, components: ComponentRegistry) -> Self {
        let queue = BatchQueue::new();
        let observers = ObserverCoordinator::new();
        let mut ui = UiManager::new(opts, components, queue.clone()).with_observers(observers.clone());
        ui.register_root(ROOT, Size::new(100.0, 100.0)).unwrap();
        Self {
            ui,
            queue,
            mounter: Mounter::new(ImmediateAnimator, observers),
        }
    }

    fn new() -> Self {
        Self::with(UiManagerOpts::default(), ComponentRegistry::with_defaults())
    }

    fn view(&mut self, tag: u64, p: serde_json::Value) {
        self.ui.create_view(Tag(tag), "View", ROOT, props(p)).unwrap();
    }

    fn append(&mut self, container: u64, tags: &[u64]) {
        let count = self.ui.shadow().get(Tag(container)).unwrap().children().len();
        let args = ManageChildren {
            add_tags: tags.iter().map(|&t| Tag(t)).collect(),
            add_at: (count..count + tags.len()).collect(),
            ..ManageChildren::default()
        };
        self.ui.manage_children(Tag(container), &args).unwrap();
    }

    fn flush(&mut self) -> BatchId {
        let id = self.ui.batch_did_complete().unwrap();
        for batch in self.queue.drain() {
            self.mounter.mount(batch);
        }
        self.ui.batch_did_mount(id);
        id
    }

    fn native(&self, tag: u64) -> &BasicView {
        self.mounter.views().view_as::<BasicView>(Tag(tag)).unwrap()
    }
}

#[test]
fn created_views_mount_with_their_frames() {
    let mut h = Harness::new();
    h.view(2, json!({ "height": 10 }));
    h.view(3, json!({ "height": 20 }));
    h.append(1, &[2, 3]);
    let id = h.flush();

    assert_eq!(h.ui.last_mounted(), Some(id));
    assert_eq!(h.native(2).frame(), Rect::new(0.0, 0.0, 100.0, 10.0));
    assert_eq!(h.native(3).frame(), Rect::new(0.0, 10.0, 100.0, 30.0));
    assert_eq!(
        h.mounter.views().get(ROOT).unwrap().children(),
        &[Tag(2), Tag(3)]
    );
}

#[test]
fn unregistered_component_is_ignored() {
    let mut h = Harness::new();
    h.ui.create_view(Tag(2), "Marquee", ROOT, Props::new()).unwrap();
    assert!(!h.ui.shadow().contains(Tag(2)));
    h.flush();
    assert!(!h.mounter.views().contains(Tag(2)));
}

#[test]
fn non_layout_prop_update_produces_no_frame_records() {
    let mut h = Harness::new();
    h.view(2, json!({ "height": 10 }));
    h.append(1, &[2]);
    h.flush();

    h.ui.update_view(Tag(2), "View", props(json!({ "color": "red" })))
        .unwrap();
    assert!(!h.ui.shadow().get(Tag(2)).unwrap().is_dirty());
    h.ui.batch_did_complete().unwrap();
    let batch = h.queue.pop().unwrap();
    assert!(batch.records.is_empty());
}

#[test]
fn layout_prop_update_moves_siblings() {
    let mut h = Harness::new();
    h.view(2, json!({ "height": 10 }));
    h.view(3, json!({ "height": 10 }));
    h.append(1, &[2, 3]);
    h.flush();

    h.ui.update_view(Tag(2), "View", props(json!({ "height": 40 })))
        .unwrap();
    h.ui.batch_did_complete().unwrap();
    let batch = h.queue.pop().unwrap();
    let tags: Vec<Tag> = batch.records.iter().map(|r| r.tag).collect();
    assert_eq!(tags, vec![Tag(2), Tag(3)]);
    assert!(batch.records.iter().all(|r| !r.is_new));
}

#[test]
fn prop_changes_in_one_batch_notify_once_with_the_union() {
    let mut h = Harness::new();
    h.view(2, json!({ "height": 10 }));
    h.append(1, &[2]);
    h.flush();
    let before = h.native(2).props_notifications().len();

    h.ui.update_view(Tag(2), "View", props(json!({ "opacity": 0.5 })))
        .unwrap();
    h.ui.update_view(Tag(2), "View", props(json!({ "color": "blue" })))
        .unwrap();
    h.flush();

    let notes = h.native(2).props_notifications();
    assert_eq!(notes.len(), before + 1);
    let last: Vec<&str> = notes[before].iter().map(String::as_str).collect();
    assert_eq!(last, vec!["color", "opacity"]);
    assert_eq!(h.native(2).props()["color"], "blue");
}

#[test]
fn removing_a_child_purges_its_subtree_everywhere() {
    let mut h = Harness::new();
    h.view(2, json!({ "height": 10 }));
    h.view(3, json!({ "height": 5 }));
    h.append(1, &[2]);
    h.append(2, &[3]);
    h.flush();

    let remove = ManageChildren {
        remove_at: vec![0],
        ..ManageChildren::default()
    };
    h.ui.manage_children(ROOT, &remove).unwrap();
    assert!(!h.ui.shadow().contains(Tag(2)));
    assert!(!h.ui.shadow().contains(Tag(3)));
    h.flush();
    assert!(!h.mounter.views().contains(Tag(2)));
    assert!(!h.mounter.views().contains(Tag(3)));

    // Index 0 no longer exists; the repeat is skipped.
    h.ui.manage_children(ROOT, &remove).unwrap();
    assert!(h.ui.shadow().get(ROOT).unwrap().children().is_empty());
}

#[test]
fn set_children_purges_children_left_out() {
    let mut h = Harness::new();
    h.view(2, json!({}));
    h.view(3, json!({}));
    h.append(1, &[2, 3]);
    h.flush();

    h.ui.set_children(ROOT, vec![Tag(3)]).unwrap();
    assert!(!h.ui.shadow().contains(Tag(2)));
    h.flush();
    assert!(!h.mounter.views().contains(Tag(2)));
    assert_eq!(h.mounter.views().get(ROOT).unwrap().children(), &[Tag(3)]);
}

#[test]
fn replace_existing_view_keeps_the_slot() {
    let mut h = Harness::new();
    h.view(2, json!({}));
    h.view(3, json!({}));
    h.view(4, json!({}));
    h.append(1, &[2, 3]);
    h.flush();

    h.ui.replace_existing_view(Tag(2), Tag(4)).unwrap();
    assert_eq!(
        h.ui.shadow().get(ROOT).unwrap().children(),
        &[Tag(4), Tag(3)]
    );
    assert!(!h.ui.shadow().contains(Tag(2)));
}

#[test]
fn remove_subviews_empties_the_container() {
    let mut h = Harness::new();
    h.view(2, json!({}));
    h.view(3, json!({}));
    h.append(1, &[2, 3]);
    h.ui.remove_subviews_from_container(ROOT).unwrap();
    assert!(h.ui.shadow().get(ROOT).unwrap().children().is_empty());
    assert_eq!(h.ui.shadow().len(), 1);
}

#[test]
fn removing_a_root_twice_misses() {
    let mut h = Harness::new();
    h.view(2, json!({}));
    h.append(1, &[2]);
    h.flush();

    h.ui.remove_root_view(ROOT).unwrap();
    assert!(h.ui.shadow().is_empty());
    h.flush();
    assert!(h.mounter.views().is_empty());

    let err = h.ui.remove_root_view(ROOT).unwrap_err();
    assert!(err.is_lookup_miss());
}

#[test]
fn removing_a_root_purges_views_never_attached() {
    let mut h = Harness::new();
    h.view(2, json!({}));
    h.view(3, json!({}));
    h.append(1, &[3]);
    h.flush();
    assert!(h.mounter.views().contains(Tag(2)));

    h.ui.remove_root_view(ROOT).unwrap();
    assert!(!h.ui.shadow().contains(Tag(2)));
    let err = h
        .ui
        .update_view(Tag(2), "View", props(json!({ "height": 4 })))
        .unwrap_err();
    assert!(err.is_lookup_miss());
    h.flush();
    assert!(h.mounter.views().is_empty());
}

#[test]
fn overwritten_move_destination_purges_the_loser() {
    let mut h = Harness::new();
    h.view(2, json!({}));
    h.view(3, json!({}));
    h.view(4, json!({}));
    h.append(1, &[2, 3]);
    h.flush();

    let args = ManageChildren {
        move_from: vec![0],
        move_to: vec![0],
        add_tags: vec![Tag(4)],
        add_at: vec![0],
        ..ManageChildren::default()
    };
    h.ui.manage_children(ROOT, &args).unwrap();
    assert_eq!(
        h.ui.shadow().get(ROOT).unwrap().children(),
        &[Tag(4), Tag(3)]
    );
    assert!(!h.ui.shadow().contains(Tag(2)));
    h.flush();
    assert!(!h.mounter.views().contains(Tag(2)));
    assert_eq!(
        h.mounter.views().get(ROOT).unwrap().children(),
        &[Tag(4), Tag(3)]
    );
}

#[test]
fn measurements_accumulate_ancestor_origins() {
    let mut h = Harness::new();
    h.view(2, json!({ "height": 10 }));
    h.view(3, json!({ "height": 20, "paddingTop": 2 }));
    h.view(4, json!({ "height": 5 }));
    h.append(1, &[2, 3]);
    h.append(3, &[4]);
    assert_eq!(h.ui.measure(Tag(4)), None);
    h.flush();

    let m = h.ui.measure(Tag(4)).unwrap();
    assert_eq!((m.x, m.y, m.width, m.height), (0.0, 2.0, 100.0, 5.0));
    assert_eq!((m.page_x, m.page_y), (0.0, 12.0));

    let rel = h.ui.measure_layout_relative_to(Tag(4), ROOT).unwrap();
    assert_eq!((rel.left, rel.top), (0.0, 12.0));
    let same = h.ui.measure_layout_relative_to(Tag(4), Tag(4)).unwrap();
    assert_eq!((same.left, same.top, same.height), (0.0, 0.0, 5.0));
    let parent = h.ui.measure_layout_relative_to_parent(Tag(4)).unwrap();
    assert_eq!(parent.top, 2.0);

    let err = h.ui.measure_layout_relative_to(Tag(4), Tag(2)).unwrap_err();
    assert!(matches!(err, ShadowError::Layout(_)));
}

fn fade() -> LayoutAnimationConfig {
    LayoutAnimationConfig {
        duration_ms: 100.0,
        create: Some(AnimationDescriptor {
            property: Some(AnimatedProperty::Opacity),
            ..AnimationDescriptor::default()
        }),
        ..LayoutAnimationConfig::default()
    }
}

fn recorder() -> (AnimationCallback, Arc<Mutex<Vec<bool>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    (Box::new(move |ok: bool| s.lock().unwrap().push(ok)), seen)
}

#[test]
fn invalid_animation_goes_to_the_error_callback() {
    let mut h = Harness::new();
    let (cb, seen) = recorder();
    let failed = Arc::new(Mutex::new(None));
    let f = Arc::clone(&failed);
    let mut cfg = fade();
    cfg.create = Some(AnimationDescriptor::default());
    h.ui.configure_next_layout_animation(
        cfg,
        cb,
        Box::new(move |err: ShadowError| *f.lock().unwrap() = Some(err.to_string())),
    );
    assert!(failed.lock().unwrap().is_some());
    h.flush();
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn overwritten_animation_reports_unfinished() {
    let mut h = Harness::new();
    let (first, first_seen) = recorder();
    let (second, second_seen) = recorder();
    h.ui.configure_next_layout_animation(fade(), first, Box::new(|_: ShadowError| {}));
    h.ui.configure_next_layout_animation(fade(), second, Box::new(|_: ShadowError| {}));
    assert_eq!(*first_seen.lock().unwrap(), vec![false]);

    h.view(2, json!({ "height": 10 }));
    h.append(1, &[2]);
    h.flush();
    assert_eq!(*first_seen.lock().unwrap(), vec![false]);
    assert_eq!(*second_seen.lock().unwrap(), vec![true]);
}

#[test]
fn disabled_animations_still_complete() {
    let opts = UiManagerOpts {
        layout_animations: false,
        ..UiManagerOpts::default()
    };
    let mut h = Harness::with(opts, ComponentRegistry::with_defaults());
    h.flush();
    let (cb, seen) = recorder();
    h.ui.configure_next_layout_animation(fade(), cb, Box::new(|_: ShadowError| {}));
    h.view(2, json!({ "height": 10 }));
    h.append(1, &[2]);
    h.ui.batch_did_complete().unwrap();
    let batch = h.queue.pop().unwrap();
    assert!(batch.animation.as_ref().unwrap().config().is_empty());
    h.mounter.mount(batch);
    assert_eq!(h.native(2).visual_state().opacity, 1.0);
    assert_eq!(*seen.lock().unwrap(), vec![true]);
}

#[derive(Default)]
struct Clickable {
    seen: Arc<Mutex<Vec<(String, f64)>>>,
}

impl ComponentDescriptor for Clickable {
    fn name(&self) -> &str {
        "Clickable"
    }

    fn create_native(&self, _tag: Tag) -> Box<dyn NativeView> {
        Box::new(BasicView::new())
    }

    fn dispatch_command(&self, view: &mut dyn NativeView, command: &str, _args: &[serde_json::Value]) {
        self.seen
            .lock()
            .unwrap()
            .push((command.to_owned(), view.frame().height()));
    }
}

#[test]
fn commands_run_after_frames_are_applied() {
    let clickable = Clickable::default();
    let seen = Arc::clone(&clickable.seen);
    let mut components = ComponentRegistry::with_defaults();
    components.register(clickable);
    let mut h = Harness::with(UiManagerOpts::default(), components);

    h.ui.create_view(Tag(2), "Clickable", ROOT, props(json!({ "height": 30 })))
        .unwrap();
    h.append(1, &[2]);
    h.ui.dispatch_command(Tag(2), "focus".into(), vec![]).unwrap();
    h.flush();
    assert_eq!(*seen.lock().unwrap(), vec![("focus".to_owned(), 30.0)]);
}

#[test]
fn ui_blocks_bracket_the_batch() {
    let mut h = Harness::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    h.view(2, json!({ "height": 10 }));
    h.append(1, &[2]);

    let l = Arc::clone(&log);
    h.ui.add_ui_block(Box::new(move |views: &mut NativeRegistry| {
        let height = views.view(Tag(2)).map(|v| v.frame().height());
        l.lock().unwrap().push(("after", height));
    }));
    let l = Arc::clone(&log);
    h.ui.prepend_ui_block(Box::new(move |views: &mut NativeRegistry| {
        let height = views.view(Tag(2)).map(|v| v.frame().height());
        l.lock().unwrap().push(("before", height));
    }));
    h.flush();

    assert_eq!(
        *log.lock().unwrap(),
        vec![("before", None), ("after", Some(10.0))]
    );
}

#[test]
fn intrinsic_size_drives_leaf_layout() {
    let mut h = Harness::new();
    h.view(2, json!({ "alignSelf": "flex-start" }));
    h.append(1, &[2]);
    h.ui.set_intrinsic_content_size(Tag(2), Some(Size::new(40.0, 12.0)))
        .unwrap();
    h.flush();
    assert_eq!(h.native(2).frame(), Rect::new(0.0, 0.0, 40.0, 12.0));
    assert_eq!(h.ui.root_tag_for(Tag(2)).unwrap(), ROOT);
}

#[derive(Default)]
struct Lifecycle(Mutex<Vec<(&'static str, BatchId)>>);

impl UiManagerObserver for Lifecycle {
    fn will_layout(&self, batch: BatchId) {
        self.0.lock().unwrap().push(("willLayout", batch));
    }
    fn did_layout(&self, batch: BatchId) {
        self.0.lock().unwrap().push(("didLayout", batch));
    }
    fn will_mount(&self, batch: BatchId) {
        self.0.lock().unwrap().push(("willMount", batch));
    }
    fn did_mount(&self, batch: BatchId) {
        self.0.lock().unwrap().push(("didMount", batch));
    }
}

#[test]
fn observers_see_the_four_batch_points_in_order() {
    let mut h = Harness::new();
    let lifecycle = Arc::new(Lifecycle::default());
    let observer: Arc<dyn UiManagerObserver> = lifecycle.clone();
    h.ui.observers().add(&observer);
    let id = h.flush();

    let names: Vec<&str> = lifecycle.0.lock().unwrap().iter().map(|(n, _)| *n).collect();
    assert_eq!(names, vec!["willLayout", "didLayout", "willMount", "didMount"]);
    assert!(lifecycle.0.lock().unwrap().iter().all(|(_, b)| *b == id));
}

#[test]
fn apply_routes_commands() {
    let mut h = Harness::new();
    let script = r#"[
        {"op":"createView","tag":2,"viewName":"View","rootTag":1,"props":{"height":15}},
        {"op":"manageChildren","container":1,"addTags":[2],"addAt":[0]},
        {"op":"batchDidComplete"}
    ]"#;
    for cmd in Command::parse_script(script).unwrap() {
        h.ui.apply(cmd).unwrap();
    }
    assert_eq!(h.queue.len(), 1);
    for batch in h.queue.drain() {
        h.mounter.mount(batch);
    }
    assert_eq!(h.native(2).frame().height(), 15.0);
}
