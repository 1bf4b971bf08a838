use super::*;

#[test]
fn create_view_parses_camel_case_fields() {
    let cmd: Command = serde_json::from_str(
        r#"{"op":"createView","tag":3,"viewName":"View","rootTag":1,"props":{"width":10}}"#,
    )
    .unwrap();
    let Command::CreateView {
        tag,
        view_name,
        root_tag,
        props,
    } = cmd
    else {
        panic!("wrong variant");
    };
    assert_eq!(tag, Tag(3));
    assert_eq!(view_name, "View");
    assert_eq!(root_tag, Tag(1));
    assert_eq!(props["width"], 10);
}

#[test]
fn manage_children_lists_default_to_empty() {
    let cmd: Command =
        serde_json::from_str(r#"{"op":"manageChildren","container":2,"removeAt":[0]}"#).unwrap();
    assert_eq!(
        cmd,
        Command::ManageChildren {
            container: Tag(2),
            move_from: vec![],
            move_to: vec![],
            add_tags: vec![],
            add_at: vec![],
            remove_at: vec![0],
        }
    );
    assert_eq!(cmd.name(), "manageChildren");
}

#[test]
fn script_mixes_commands_and_batch_ends() {
    let script = r#"[
        {"op":"registerRoot","tag":1,"availableSize":{"width":100,"height":50}},
        {"op":"batchDidComplete"}
    ]"#;
    let cmds = Command::parse_script(script).unwrap();
    assert_eq!(cmds.len(), 2);
    assert_eq!(
        cmds[0],
        Command::RegisterRoot {
            tag: Tag(1),
            available_size: Size::new(100.0, 50.0),
        }
    );
    assert_eq!(cmds[1], Command::BatchDidComplete);
}

#[test]
fn unknown_op_is_a_serde_error() {
    let err = Command::parse_script(r#"[{"op":"teleport"}]"#).unwrap_err();
    assert!(matches!(err, ShadowError::Serde(_)));
}
