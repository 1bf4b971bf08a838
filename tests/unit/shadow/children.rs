use super::*;

fn tags(ids: &[u64]) -> Vec<Tag> {
    ids.iter().copied().map(Tag).collect()
}

const A: Tag = Tag(1);
const B: Tag = Tag(2);
const C: Tag = Tag(3);
const D: Tag = Tag(4);

#[test]
fn move_and_add_use_pre_mutation_indices() {
    let call = ManageChildren {
        move_from: vec![0],
        move_to: vec![2],
        add_tags: vec![D],
        add_at: vec![0],
        ..ManageChildren::default()
    };
    let out = call.apply(&[A, B, C], false).unwrap();
    assert_eq!(out.children, vec![D, B, C, A]);
    assert!(out.removed.is_empty());
    assert!(out.dropped.is_empty());
}

#[test]
fn removal_reports_removed_children() {
    let call = ManageChildren {
        remove_at: vec![1, 0],
        ..ManageChildren::default()
    };
    let out = call.apply(&[A, B, C], false).unwrap();
    assert_eq!(out.children, vec![C]);
    assert_eq!(out.removed, vec![A, B]);
}

#[test]
fn replace_keeps_position() {
    let out = ManageChildren::replace_at(1, D).apply(&[A, B, C], false).unwrap();
    assert_eq!(out.children, vec![A, D, C]);
    assert_eq!(out.removed, vec![B]);
}

#[test]
fn out_of_range_indices_are_skipped_when_lenient() {
    let call = ManageChildren {
        remove_at: vec![0, 9],
        ..ManageChildren::default()
    };
    let out = call.apply(&[A, B], false).unwrap();
    assert_eq!(out.children, vec![B]);
    assert_eq!(out.removed, vec![A]);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "resolved 1 of 2 indices")]
fn out_of_range_indices_fail_when_strict() {
    let call = ManageChildren {
        remove_at: vec![0, 9],
        ..ManageChildren::default()
    };
    let _ = call.apply(&[A, B], true);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "moveFrom has 1 entries but moveTo has 0")]
fn mismatched_move_arrays_are_fatal() {
    let call = ManageChildren {
        move_from: vec![0],
        ..ManageChildren::default()
    };
    let _ = call.apply(&[A], false);
}

#[test]
fn colliding_destinations_last_writer_wins() {
    let call = ManageChildren {
        move_from: vec![0],
        move_to: vec![1],
        add_tags: vec![D],
        add_at: vec![1],
        ..ManageChildren::default()
    };
    let out = call.apply(&[A, B, C], false).unwrap();
    assert_eq!(out.children, vec![B, D, C]);
    assert_eq!(out.dropped, vec![A]);
}

#[test]
fn appends_past_end_clamp() {
    let call = ManageChildren {
        add_tags: tags(&[10, 11]),
        add_at: vec![0, 1],
        ..ManageChildren::default()
    };
    let out = call.apply(&[], false).unwrap();
    assert_eq!(out.children, tags(&[10, 11]));
}

#[test]
fn remove_all_empties_container() {
    let out = ManageChildren::remove_all(3).apply(&[A, B, C], false).unwrap();
    assert!(out.children.is_empty());
    assert_eq!(out.removed, vec![A, B, C]);
}
