use super::*;
use serde_json::json;

#[test]
fn fill_style_is_string_or_descriptor() {
    let c: FillStyle = serde_json::from_value(json!("#fff")).unwrap();
    assert_eq!(c, FillStyle::color("#fff"));

    let p: FillStyle =
        serde_json::from_value(json!({ "type": "pattern", "image": "tile.png" })).unwrap();
    assert_eq!(p.pattern_source(), Some("tile.png"));

    let r: FillStyle = serde_json::from_value(json!({
        "type": "radial", "x0": 0, "y0": 0, "r0": 0, "x1": 0, "y1": 0, "r1": 10, "stops": []
    }))
    .unwrap();
    assert!(matches!(r, FillStyle::Paint(PaintSpec::Radial { r1, .. }) if r1 == 10.0));
}

#[test]
fn composite_op_uses_css_keywords() {
    let op: CompositeOp = serde_json::from_value(json!("destination-out")).unwrap();
    assert_eq!(op, CompositeOp::DestinationOut);
    assert_eq!(CompositeOp::ColorDodge.as_str(), "color-dodge");
    assert_eq!(
        serde_json::to_value(CompositeOp::SoftLight).unwrap(),
        json!("soft-light")
    );
}

#[test]
fn repetition_keywords() {
    let r: Repetition = serde_json::from_value(json!("no-repeat")).unwrap();
    assert_eq!(r, Repetition::NoRepeat);
    assert_eq!(Repetition::default(), Repetition::Repeat);
}

#[test]
fn merge_prefers_override_fields() {
    let base = Style {
        fill_style: Some(FillStyle::color("#000")),
        line_width: Some(2.0),
        ..Style::default()
    };
    let over = Style {
        fill_style: Some(FillStyle::color("#f00")),
        global_alpha: Some(0.5),
        ..Style::default()
    };
    let merged = base.merged_with(&over);
    assert_eq!(merged.fill_style, Some(FillStyle::color("#f00")));
    assert_eq!(merged.line_width, Some(2.0));
    assert_eq!(merged.global_alpha, Some(0.5));
}

#[test]
fn pattern_sources_cover_fill_and_stroke() {
    let style = Style {
        fill_style: Some(FillStyle::Paint(PaintSpec::Pattern {
            image: "a.png".to_owned(),
            repetition: None,
        })),
        stroke_style: Some(FillStyle::Paint(PaintSpec::Pattern {
            image: "b.png".to_owned(),
            repetition: Some(Repetition::RepeatX),
        })),
        ..Style::default()
    };
    assert_eq!(style.pattern_sources().collect::<Vec<_>>(), vec!["a.png", "b.png"]);
}
