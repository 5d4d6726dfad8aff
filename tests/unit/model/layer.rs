use super::*;
use crate::model::style::{CompositeOp, FillStyle, PaintSpec};
use serde_json::json;

#[test]
fn parses_rect_with_common_fields_and_style() {
    let layer: Layer = serde_json::from_value(json!({
        "type": "rect",
        "id": "bg",
        "zIndex": 2,
        "x": 10, "y": 20, "width": 30, "height": 40,
        "radius": [4, 8],
        "fillStyle": "#ff0000",
        "globalCompositeOperation": "multiply"
    }))
    .unwrap();

    let Layer::Rect(rect) = &layer else {
        panic!("expected rect, got {}", layer.kind());
    };
    assert_eq!(layer.id(), Some("bg"));
    assert_eq!(layer.z_index(), 2.0);
    assert!(layer.is_visible());
    assert_eq!(rect.width, 30.0);
    assert_eq!(rect.radius.as_ref().unwrap().corners(), [4.0, 8.0, 0.0, 0.0]);
    assert_eq!(rect.style.fill_style, Some(FillStyle::color("#ff0000")));
    assert_eq!(
        rect.style.global_composite_operation,
        Some(CompositeOp::Multiply)
    );
}

#[test]
fn missing_geometry_defaults_to_zero() {
    let layer: Layer = serde_json::from_value(json!({ "type": "polygon" })).unwrap();
    let Layer::Polygon(poly) = layer else {
        panic!("expected polygon");
    };
    assert!(poly.points.is_empty());
    assert_eq!(poly.close_path, None);
}

#[test]
fn mask_is_a_nested_layer() {
    let layer: Layer = serde_json::from_value(json!({
        "type": "rect", "x": 0, "y": 0, "width": 100, "height": 100,
        "mask": { "type": "circle", "x": 50, "y": 50, "radius": 50 }
    }))
    .unwrap();
    let mask = layer.common().mask.as_deref().unwrap();
    assert_eq!(mask, &Layer::Circle(CircleLayer::new(50.0, 50.0, 50.0)));
}

#[test]
fn image_accepts_image_alias_for_source() {
    let layer: Layer = serde_json::from_value(json!({
        "type": "image", "image": "logo.png", "x": 0, "y": 0, "width": 10, "height": 10,
        "scale9Grid": [15, 15, 15, 15], "objectFit": "cover"
    }))
    .unwrap();
    let Layer::Image(img) = layer else {
        panic!("expected image");
    };
    assert_eq!(img.source, "logo.png");
    assert_eq!(img.scale9_grid, Some([15.0; 4]));
    assert_eq!(img.object_fit, Some(ObjectFit::Cover));
}

#[test]
fn qrcode_tag_and_options() {
    let layer: Layer = serde_json::from_value(json!({
        "type": "qrcode", "text": "hello", "x": 1, "y": 2, "width": 100, "height": 100,
        "errorCorrectionLevel": "H", "margin": 1, "color": { "dark": "#112233" }
    }))
    .unwrap();
    assert_eq!(layer.kind(), "qrcode");
    let Layer::QrCode(qr) = layer else {
        panic!("expected qrcode");
    };
    assert_eq!(qr.error_correction_level, Some(QrErrorLevel::H));
    assert_eq!(qr.color.unwrap().dark.as_deref(), Some("#112233"));
}

#[test]
fn text_with_spans_and_gradient_fill() {
    let layer: Layer = serde_json::from_value(json!({
        "type": "text", "x": 0, "y": 0,
        "spans": [{ "text": "Hi", "fontSize": 20, "fontWeight": "bold" }, { "text": "!", "fontWeight": 700 }],
        "fillStyle": { "type": "linear", "x0": 0, "y0": 0, "x1": 100, "y1": 0,
                       "stops": [{ "offset": 0, "color": "red" }, { "offset": 1, "color": "blue" }] }
    }))
    .unwrap();
    let Layer::Text(text) = layer else {
        panic!("expected text");
    };
    let spans = text.rich_spans().unwrap();
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0].typography.font_size, Some(20.0));
    assert_eq!(spans[1].typography.font_weight.as_ref().unwrap().numeric(), 700.0);
    assert!(matches!(
        text.style.fill_style,
        Some(FillStyle::Paint(PaintSpec::Linear { .. }))
    ));
}

#[test]
fn empty_spans_are_not_rich() {
    let mut text = TextLayer::new("plain", 0.0, 0.0);
    text.spans = Some(Vec::new());
    assert!(text.rich_spans().is_none());
}

#[test]
fn resolved_line_height_fallbacks() {
    let mut text = TextLayer::new("a", 0.0, 0.0);
    assert_eq!(text.resolved_line_height(), 19.2);
    text.typography.font_size = Some(20.0);
    assert_eq!(text.resolved_line_height(), 24.0);
    text.line_height = Some(30.0);
    assert_eq!(text.resolved_line_height(), 30.0);
}

#[test]
fn serialization_omits_defaults_and_keeps_tag() {
    let layer = Layer::from(RectLayer::new(1.0, 2.0, 3.0, 4.0)).with_id("r");
    let v = serde_json::to_value(&layer).unwrap();
    assert_eq!(
        v,
        json!({ "type": "rect", "id": "r", "x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0 })
    );
    let back: Layer = serde_json::from_value(v).unwrap();
    assert_eq!(back, layer);
}

#[test]
fn hidden_and_locked_flags() {
    let layer: Layer = serde_json::from_value(json!({
        "type": "circle", "x": 0, "y": 0, "radius": 1, "visible": false, "locked": true
    }))
    .unwrap();
    assert!(!layer.is_visible());
    assert!(layer.common().locked);
}
