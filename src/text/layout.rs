use crate::{
    assets::resource::ResourceManager,
    model::{layer::TextLayer, style::FillStyle, text::Typography},
    style::resolve::{scale_value, with_context},
    surface::{FontSpec, StateProp, Surface},
};

/// Font size used when a text layer or span does not set one.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

const ELLIPSIS: &str = "...";

/// Device-space font for `typography`, filling in `normal normal 16px sans-serif`.
pub fn build_font(typography: &Typography, ratio: f64) -> FontSpec {
    FontSpec {
        style: typography
            .font_style
            .clone()
            .unwrap_or_else(|| "normal".to_owned()),
        weight: typography
            .font_weight
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "normal".to_owned()),
        size_px: scale_value(typography.font_size.unwrap_or(DEFAULT_FONT_SIZE), ratio),
        family: typography
            .font_family
            .clone()
            .unwrap_or_else(|| "sans-serif".to_owned()),
    }
}

/// Break `text` into lines no wider than `max_width`, measured with the surface's current font.
///
/// Wrapping is per character (code point), so words are split wherever the width runs out. A
/// line always takes at least one character, which keeps narrow widths from looping. When
/// `max_lines` cuts the text short, the last kept line is trimmed until it fits with a trailing
/// `...`.
pub fn layout_lines(
    surface: &mut dyn Surface,
    text: &str,
    max_width: Option<f64>,
    max_lines: Option<usize>,
) -> Vec<String> {
    let Some(max_width) = max_width.filter(|w| *w > 0.0) else {
        return vec![text.to_owned()];
    };
    let max_lines = max_lines.filter(|n| *n > 0);

    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut truncated = false;
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        let mut candidate = line.clone();
        candidate.push(ch);
        if surface.measure_text(&candidate) > max_width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line.push(ch);
            if max_lines.is_some_and(|n| lines.len() >= n) {
                truncated = true;
                break;
            }
        } else {
            line = candidate;
        }
    }
    if !truncated {
        lines.push(line);
    }

    if truncated && let Some(last) = lines.last_mut() {
        while !last.is_empty() && surface.measure_text(&format!("{last}{ELLIPSIS}")) > max_width {
            last.pop();
        }
        last.push_str(ELLIPSIS);
    }
    lines
}

/// Draw a single-style text layer; returns the number of wrapped lines beyond the first.
pub fn draw_text(
    surface: &mut dyn Surface,
    layer: &TextLayer,
    ratio: f64,
    resources: &ResourceManager,
) -> usize {
    let text = layer.text.as_deref().unwrap_or_default();
    let max_width = layer.max_width.map(|w| scale_value(w, ratio));
    let line_height = scale_value(layer.resolved_line_height(), ratio);

    let mut style = layer.style.clone();
    if let Some(color) = &layer.color {
        style.fill_style = Some(FillStyle::Color(color.clone()));
    }

    with_context(surface, &style, ratio, resources, |s| {
        s.set_state(StateProp::Font(build_font(&layer.typography, ratio)));
        if let Some(align) = layer.text_align {
            s.set_state(StateProp::TextAlign(align));
        }
        if let Some(baseline) = layer.text_baseline {
            s.set_state(StateProp::TextBaseline(baseline));
        }

        let lines = layout_lines(s, text, max_width, layer.max_lines);
        let x = scale_value(layer.x, ratio);
        let mut y = scale_value(layer.y, ratio);
        for line in &lines {
            s.fill_text(line, x, y, max_width);
            if layer.stroke_text == Some(true) {
                s.stroke_text(line, x, y, max_width);
            }
            y += line_height;
        }
        lines.len().saturating_sub(1)
    })
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
