use super::*;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn prop_sets_union_per_node() {
    let mut t = ChangeTracker::new();
    t.record_props_changed(Tag(2), names(&["width"]));
    t.record_props_changed(Tag(2), names(&["height", "width"]));
    t.record_props_changed(Tag(3), names(&["opacity"]));

    let set = t.take();
    assert_eq!(set.props.len(), 2);
    assert_eq!(
        set.props[&Tag(2)].iter().cloned().collect::<Vec<_>>(),
        names(&["height", "width"])
    );
}

#[test]
fn take_leaves_tracker_empty() {
    let mut t = ChangeTracker::new();
    t.record_children_changed(Tag(1));
    t.record_children_changed(Tag(1));
    let set = t.take();
    assert_eq!(set.children.len(), 1);
    assert!(t.is_empty());
    assert!(t.take().is_empty());
}

#[test]
fn forget_drops_both_records() {
    let mut t = ChangeTracker::new();
    t.record_props_changed(Tag(4), names(&["top"]));
    t.record_children_changed(Tag(4));
    t.forget(Tag(4));
    assert!(t.is_empty());
}
