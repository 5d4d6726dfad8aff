use super::*;
use crate::{
    model::style::Style,
    surface::{
        Paint,
        recording::{DrawCommand, RecordingSurface},
    },
};

fn span(text: &str) -> TextSpan {
    TextSpan::new(text)
}

fn rich_layer(spans: Vec<TextSpan>) -> TextLayer {
    TextLayer {
        spans: Some(spans),
        ..TextLayer::default()
    }
}

fn text_draws(s: &RecordingSurface) -> Vec<(String, f64, f64)> {
    s.commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillText { text, x, y, .. } => Some((text.clone(), *x, *y)),
            _ => None,
        })
        .collect()
}

#[test]
fn merges_span_over_layer_defaults() {
    let mut layer = rich_layer(vec![]);
    layer.color = Some("red".into());
    layer.typography.font_size = Some(20.0);
    layer.letter_spacing = Some(1.0);
    let mut over = span("x");
    over.typography.font_family = Some("Inter".into());
    over.color = Some("blue".into());

    let merged = merge_span(&layer, &over);
    assert_eq!(merged.typography.font_size, Some(20.0));
    assert_eq!(merged.typography.font_family.as_deref(), Some("Inter"));
    assert_eq!(merged.color.as_deref(), Some("blue"));
    assert_eq!(merged.letter_spacing, Some(1.0));
}

#[test]
fn wraps_across_spans() {
    let mut s = RecordingSurface::new(200, 200);
    let mut layer = rich_layer(vec![span("ab"), span("cd")]);
    layer.max_width = Some(30.0);
    let lines = layout_rich_lines(&mut s, &layer, 1.0);

    assert_eq!(lines.len(), 2);
    let texts: Vec<&str> = lines[0].segments.iter().map(|g| g.text.as_str()).collect();
    assert_eq!(texts, ["ab", "c"]);
    assert_eq!(lines[0].width, 30.0);
    assert_eq!(lines[1].segments[0].text, "d");
    assert!((lines[0].height - 19.2).abs() < 1e-9);
    assert_eq!(s.save_depth(), 0);
}

#[test]
fn stops_at_max_lines() {
    let mut s = RecordingSurface::new(200, 200);
    let mut layer = rich_layer(vec![span("abcdefgh")]);
    layer.max_width = Some(30.0);
    layer.max_lines = Some(2);
    let lines = layout_rich_lines(&mut s, &layer, 1.0);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].segments[0].text, "def");
    assert_eq!(s.save_depth(), 0);
}

#[test]
fn letter_spacing_counts_gaps_between_characters() {
    let mut s = RecordingSurface::new(200, 200);
    let mut sp = span("abc");
    sp.letter_spacing = Some(2.0);
    let lines = layout_rich_lines(&mut s, &rich_layer(vec![sp]), 1.0);
    assert_eq!(lines[0].width, 34.0);
}

#[test]
fn line_height_prefers_layer_value_and_scales() {
    let mut s = RecordingSurface::new(200, 200);
    let mut big = span("a");
    big.typography.font_size = Some(30.0);
    let mut layer = rich_layer(vec![span("a"), big]);
    let lines = layout_rich_lines(&mut s, &layer, 2.0);
    assert!((lines[0].height - 72.0).abs() < 1e-9);

    layer.line_height = Some(10.0);
    let lines = layout_rich_lines(&mut s, &layer, 2.0);
    assert_eq!(lines[0].height, 20.0);
}

#[test]
fn draws_spaced_characters_individually() {
    let mut s = RecordingSurface::new(200, 200);
    let mut sp = span("abc");
    sp.letter_spacing = Some(2.0);
    let mut layer = rich_layer(vec![sp]);
    layer.x = 5.0;
    layer.y = 50.0;
    draw_rich_text(&mut s, &layer, 1.0, &ResourceManager::default());
    assert_eq!(
        text_draws(&s),
        vec![
            ("a".to_owned(), 5.0, 50.0),
            ("b".to_owned(), 17.0, 50.0),
            ("c".to_owned(), 29.0, 50.0),
        ]
    );
}

#[test]
fn centers_each_line_and_advances_segments() {
    let mut s = RecordingSurface::new(200, 200);
    let mut layer = rich_layer(vec![span("ab"), span("c")]);
    layer.x = 100.0;
    layer.text_align = Some(TextAlign::Center);
    let extra = draw_rich_text(&mut s, &layer, 1.0, &ResourceManager::default());
    assert_eq!(extra, 0);
    assert_eq!(
        text_draws(&s),
        vec![("ab".to_owned(), 85.0, 0.0), ("c".to_owned(), 105.0, 0.0)]
    );
}

#[test]
fn defaults_to_black_fill_and_strokes_with_color() {
    let mut s = RecordingSurface::new(200, 200);
    let mut stroked = span("b");
    stroked.stroke_text = Some(true);
    stroked.color = Some("green".into());
    let layer = rich_layer(vec![span("a"), stroked]);
    draw_rich_text(&mut s, &layer, 1.0, &ResourceManager::default());

    let cmds = s.commands();
    assert!(cmds.contains(&DrawCommand::State(StateProp::FillPaint(Paint::Color(
        "#000".into()
    )))));
    assert!(cmds.contains(&DrawCommand::State(StateProp::StrokePaint(Paint::Color(
        "green".into()
    )))));
    let strokes: Vec<&DrawCommand> = cmds
        .iter()
        .filter(|c| matches!(c, DrawCommand::StrokeText { .. }))
        .collect();
    assert_eq!(strokes.len(), 1);
    assert_eq!(s.save_depth(), 0);
}

#[test]
fn span_style_overrides_layer_style() {
    let mut s = RecordingSurface::new(200, 200);
    let mut sp = span("a");
    sp.style = Style {
        global_alpha: Some(0.5),
        ..Style::default()
    };
    let mut layer = rich_layer(vec![sp]);
    layer.style.global_alpha = Some(0.9);
    draw_rich_text(&mut s, &layer, 1.0, &ResourceManager::default());
    assert!(s.commands().contains(&DrawCommand::State(StateProp::GlobalAlpha(0.5))));
    assert!(!s.commands().contains(&DrawCommand::State(StateProp::GlobalAlpha(0.9))));
}

#[test]
fn empty_spans_draw_nothing() {
    let mut s = RecordingSurface::new(10, 10);
    let layer = rich_layer(vec![]);
    assert!(layout_rich_lines(&mut s, &layer, 1.0).is_empty());
    assert_eq!(draw_rich_text(&mut s, &layer, 1.0, &ResourceManager::default()), 0);
}
