use super::*;
use crate::foundation::core::{Props, Size};
use serde_json::json;

const ROOT: Tag = Tag(1);

fn props(v: serde_json::Value) -> Props {
    v.as_object().cloned().unwrap()
}

fn tree(root_props: serde_json::Value, children: &[(u64, serde_json::Value)]) -> ShadowRegistry {
    let mut reg = ShadowRegistry::new();
    reg.insert_root(ROOT, "RootView", Size::new(100.0, 100.0))
        .unwrap();
    reg.get_mut(ROOT).unwrap().merge_props(&props(root_props));
    let mut tags = Vec::new();
    for (t, p) in children {
        let mut node = ShadowNode::new(Tag(*t), "View", ROOT);
        node.merge_props(&props(p.clone()));
        reg.insert(node).unwrap();
        tags.push(Tag(*t));
    }
    reg.replace_children(ROOT, tags).unwrap();
    reg
}

fn metrics_of(out: &[(Tag, LayoutMetrics)], tag: Tag) -> LayoutMetrics {
    out.iter().find(|(t, _)| *t == tag).unwrap().1
}

#[test]
fn column_children_stack_and_stretch() {
    let reg = tree(
        json!({}),
        &[(2, json!({ "height": 20 })), (3, json!({ "height": 30 }))],
    );
    let mut engine = TaffyLayoutEngine::new();
    let out = engine.layout(&reg, ROOT, LayoutDirection::Ltr).unwrap();

    assert_eq!(out[0].0, ROOT);
    assert_eq!(metrics_of(&out, ROOT).frame, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(metrics_of(&out, Tag(2)).frame, Rect::new(0.0, 0.0, 100.0, 20.0));
    assert_eq!(metrics_of(&out, Tag(3)).frame, Rect::new(0.0, 20.0, 100.0, 50.0));
}

#[test]
fn content_frame_is_inset_by_border_and_padding() {
    let reg = tree(
        json!({ "alignItems": "flex-start" }),
        &[(
            2,
            json!({ "width": 50, "height": 50, "padding": 5, "borderWidth": 2 }),
        )],
    );
    let mut engine = TaffyLayoutEngine::new();
    let m = metrics_of(&engine.layout(&reg, ROOT, LayoutDirection::Ltr).unwrap(), Tag(2));
    assert_eq!(m.border, Insets::uniform(2.0));
    assert_eq!(m.content_frame, Rect::new(7.0, 7.0, 43.0, 43.0));
}

#[test]
fn direction_is_inherited_unless_overridden() {
    let mut reg = tree(json!({ "direction": "rtl" }), &[(2, json!({})), (3, json!({}))]);
    let mut inner = ShadowNode::new(Tag(4), "View", ROOT);
    inner.merge_props(&props(json!({ "direction": "ltr" })));
    reg.insert(inner).unwrap();
    reg.replace_children(Tag(2), vec![Tag(4)]).unwrap();

    let mut engine = TaffyLayoutEngine::new();
    let out = engine.layout(&reg, ROOT, LayoutDirection::Ltr).unwrap();
    assert_eq!(metrics_of(&out, ROOT).direction, LayoutDirection::Rtl);
    assert_eq!(metrics_of(&out, Tag(3)).direction, LayoutDirection::Rtl);
    assert_eq!(metrics_of(&out, Tag(4)).direction, LayoutDirection::Ltr);
}

#[test]
fn base_direction_applies_to_roots_without_prop() {
    let reg = tree(json!({}), &[(2, json!({}))]);
    let mut engine = TaffyLayoutEngine::new();
    let out = engine.layout(&reg, ROOT, LayoutDirection::Rtl).unwrap();
    assert_eq!(metrics_of(&out, Tag(2)).direction, LayoutDirection::Rtl);
}

#[test]
fn intrinsic_size_sizes_leaves() {
    let mut reg = tree(json!({ "alignItems": "flex-start" }), &[(2, json!({}))]);
    reg.get_mut(Tag(2))
        .unwrap()
        .set_intrinsic_size(Some(Size::new(30.0, 10.0)));
    let mut engine = TaffyLayoutEngine::new();
    let m = metrics_of(&engine.layout(&reg, ROOT, LayoutDirection::Ltr).unwrap(), Tag(2));
    assert_eq!(m.frame, Rect::new(0.0, 0.0, 30.0, 10.0));
}

#[test]
fn display_none_is_reported() {
    let reg = tree(json!({}), &[(2, json!({ "display": "none", "height": 10 }))]);
    let mut engine = TaffyLayoutEngine::new();
    let m = metrics_of(&engine.layout(&reg, ROOT, LayoutDirection::Ltr).unwrap(), Tag(2));
    assert_eq!(m.display, DisplayType::None);
}

#[test]
fn prop_changes_on_pending_nodes_are_picked_up() {
    let mut reg = tree(json!({}), &[(2, json!({ "height": 20 }))]);
    let mut engine = TaffyLayoutEngine::new();
    engine.layout(&reg, ROOT, LayoutDirection::Ltr).unwrap();

    reg.get_mut(Tag(2))
        .unwrap()
        .merge_props(&props(json!({ "height": 40 })));
    reg.mark_dirty(Tag(2));
    let m = metrics_of(&engine.layout(&reg, ROOT, LayoutDirection::Ltr).unwrap(), Tag(2));
    assert_eq!(m.frame.height(), 40.0);
}

#[test]
fn forget_releases_taffy_nodes() {
    let mut reg = tree(json!({}), &[(2, json!({})), (3, json!({}))]);
    let mut engine = TaffyLayoutEngine::new();
    engine.layout(&reg, ROOT, LayoutDirection::Ltr).unwrap();
    assert_eq!(engine.node_count(), 3);

    reg.detach(Tag(3));
    for t in reg.purge(Tag(3)) {
        engine.forget(t);
    }
    assert_eq!(engine.node_count(), 2);
    let out = engine.layout(&reg, ROOT, LayoutDirection::Ltr).unwrap();
    assert_eq!(out.len(), 2);
}
