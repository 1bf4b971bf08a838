use super::*;
use serde_json::json;

fn props(v: serde_json::Value) -> Props {
    v.as_object().cloned().unwrap()
}

#[test]
fn merge_props_reports_every_touched_key() {
    let mut p = props(json!({ "width": 10, "opacity": 0.5 }));
    let changed = merge_props(&mut p, &props(json!({ "width": 20, "height": 5 })));
    assert_eq!(
        changed.into_iter().collect::<Vec<_>>(),
        vec!["height".to_string(), "width".to_string()]
    );
    assert_eq!(p["width"], json!(20));
    assert_eq!(p["opacity"], json!(0.5));
}

#[test]
fn merge_props_null_deletes_key() {
    let mut p = props(json!({ "width": 10 }));
    let changed = merge_props(&mut p, &props(json!({ "width": null })));
    assert!(changed.contains("width"));
    assert!(!p.contains_key("width"));
}

#[test]
fn display_and_direction_props_parse() {
    assert_eq!(DisplayType::from_prop(Some(&json!("none"))), DisplayType::None);
    assert_eq!(DisplayType::from_prop(Some(&json!("inline"))), DisplayType::Inline);
    assert_eq!(DisplayType::from_prop(None), DisplayType::Flex);
    assert_eq!(LayoutDirection::from_prop(Some(&json!("rtl"))), Some(LayoutDirection::Rtl));
    assert_eq!(LayoutDirection::from_prop(Some(&json!("inherit"))), None);
}

#[test]
fn metrics_finiteness_checks_all_rects() {
    let mut m = LayoutMetrics {
        frame: Rect::new(0.0, 0.0, 10.0, 10.0),
        content_frame: Rect::new(0.0, 0.0, 10.0, 10.0),
        border: Insets::ZERO,
        display: DisplayType::Flex,
        direction: LayoutDirection::Ltr,
    };
    assert!(m.is_finite());
    m.content_frame.x1 = f64::NAN;
    assert!(!m.is_finite());
}

#[test]
fn tag_zero_is_invalid() {
    assert!(!Tag(0).is_valid());
    assert!(Tag(7).is_valid());
    assert_eq!(Tag(7).to_string(), "#7");
}
