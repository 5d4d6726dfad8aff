use serde_json::json;

use super::*;

#[test]
fn whole_placeholder_keeps_type_and_partial_interpolates() {
    let tpl = JsonTemplate::new(vec![json!({
        "type": "text",
        "x": "{{count}}",
        "y": 0,
        "text": "Total: {{count}}",
    })]);
    let out = tpl.resolve(&json!({ "count": 5 }));
    assert_eq!(out[0]["x"], json!(5));
    assert_eq!(out[0]["text"], json!("Total: 5"));
}

#[test]
fn nested_paths_and_array_indices() {
    let data = json!({ "theme": { "bg": "#111" }, "tags": ["a", "b"] });
    assert_eq!(lookup_path(&data, "theme.bg"), Some(&json!("#111")));
    assert_eq!(lookup_path(&data, "tags.1"), Some(&json!("b")));
    assert_eq!(lookup_path(&data, "theme.missing.deep"), None);
    assert_eq!(lookup_path(&data, "tags.x"), None);
}

#[test]
fn missing_values() {
    let tpl = JsonTemplate::new(vec![json!({
        "keep": "a",
        "gone": "{{nope}}",
        "list": ["{{nope}}", 1],
        "text": "[{{nope}}]",
        "nil": "x{{n}}y",
    })]);
    let out = tpl.resolve(&json!({ "n": null }));
    assert!(out[0].get("gone").is_none());
    assert_eq!(out[0]["list"], json!([null, 1]));
    assert_eq!(out[0]["text"], json!("[]"));
    assert_eq!(out[0]["nil"], json!("xy"));
}

#[test]
fn non_placeholders_pass_through() {
    let tpl = JsonTemplate::new(vec![json!({
        "a": "{{ spaced }}",
        "b": "{{}}",
        "c": "{{a}}{{b}}",
        "d": true,
    })]);
    let out = tpl.resolve(&json!({ "a": 1, "b": { "k": 2 } }));
    assert_eq!(out[0]["a"], json!("{{ spaced }}"));
    assert_eq!(out[0]["b"], json!("{{}}"));
    assert_eq!(out[0]["c"], json!("1{\"k\":2}"));
    assert_eq!(out[0]["d"], json!(true));
}

#[test]
fn instantiate_decodes_layers() {
    let tpl = JsonTemplate::from_json_str(
        r#"[{"type": "rect", "x": "{{x}}", "y": 2, "width": 10, "height": 10, "fillStyle": "{{c}}"}]"#,
    )
    .unwrap();
    let layers = tpl.instantiate(&json!({ "x": 7, "c": "red" })).unwrap();
    let Layer::Rect(r) = &layers[0] else {
        panic!("expected rect");
    };
    assert_eq!(r.x, 7.0);
    assert_eq!(
        r.style.fill_style,
        Some(crate::model::style::FillStyle::color("red"))
    );
}

#[test]
fn rejects_non_array_templates() {
    assert!(matches!(
        JsonTemplate::from_value(json!({ "type": "rect" })),
        Err(PosterError::Validation(_))
    ));
    let tpl = JsonTemplate::new(vec![json!({ "type": "hexagon" })]);
    assert!(matches!(
        tpl.instantiate(&json!({})),
        Err(PosterError::Serde(_))
    ));
}
