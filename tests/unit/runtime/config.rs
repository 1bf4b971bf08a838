use super::*;

#[test]
fn missing_fields_keep_defaults() {
    let opts = UiManagerOpts::from_json_str(r#"{ "strictChildIndices": true }"#).unwrap();
    assert!(opts.strict_child_indices);
    assert!(opts.layout_animations);
    assert_eq!(opts.ui_thread_name, "shadowtree-ui");
}

#[test]
fn direction_parses_lowercase() {
    let opts = UiManagerOpts::from_json_str(r#"{ "defaultLayoutDirection": "rtl" }"#).unwrap();
    assert_eq!(opts.default_layout_direction, LayoutDirection::Rtl);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = UiManagerOpts::from_json_str(r#"{ "strict": true }"#).unwrap_err();
    assert!(matches!(err, ShadowError::Serde(_)));
}

#[test]
fn missing_file_is_an_error() {
    assert!(UiManagerOpts::from_path("/nonexistent/shadowtree-opts.json").is_err());
}
