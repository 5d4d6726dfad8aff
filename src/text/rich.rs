use crate::{
    assets::resource::ResourceManager,
    model::{
        layer::TextLayer,
        style::FillStyle,
        text::{TextAlign, TextSpan},
    },
    style::resolve::{scale_value, with_context},
    surface::{StateProp, Surface},
    text::layout::{DEFAULT_FONT_SIZE, build_font},
};

/// A styled run placed on a line.
#[derive(Clone, Debug, PartialEq)]
pub struct RichSegment {
    /// Run content.
    pub text: String,
    /// Measured width in device pixels, letter spacing included.
    pub width: f64,
    /// Span style merged over the layer defaults.
    pub style: TextSpan,
}

/// One wrapped line of styled runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichLine {
    /// Runs in drawing order.
    pub segments: Vec<RichSegment>,
    /// Sum of segment widths.
    pub width: f64,
    /// Line advance: the explicit line height or the tallest run's `fontSize * 1.2`.
    pub height: f64,
}

impl RichLine {
    fn push(&mut self, text: String, width: f64, style: &TextSpan, height: f64) {
        self.segments.push(RichSegment {
            text,
            width,
            style: style.clone(),
        });
        self.width += width;
        self.height = self.height.max(height);
    }
}

/// `span` with every unset field taken from the layer.
pub fn merge_span(layer: &TextLayer, span: &TextSpan) -> TextSpan {
    TextSpan {
        text: span.text.clone(),
        typography: layer.typography.merged_with(&span.typography),
        color: span.color.clone().or_else(|| layer.color.clone()),
        letter_spacing: span.letter_spacing.or(layer.letter_spacing),
        stroke_text: span.stroke_text.or(layer.stroke_text),
        style: layer.style.merged_with(&span.style),
    }
}

fn letter_spacing(style: &TextSpan, ratio: f64) -> f64 {
    style
        .letter_spacing
        .map(|ls| scale_value(ls, ratio))
        .filter(|ls| *ls > 0.0)
        .unwrap_or(0.0)
}

fn measure_spaced(surface: &mut dyn Surface, text: &str, spacing: f64) -> f64 {
    let n = text.chars().count();
    let mut width = surface.measure_text(text);
    if spacing > 0.0 && n > 1 {
        width += (n - 1) as f64 * spacing;
    }
    width
}

/// Lay out the layer's spans into wrapped lines, in device pixels.
///
/// The accumulated run is re-measured in full after every appended character so kerning and
/// spacing stay exact. Layout stops as soon as `maxLines` lines are complete; overflow is dropped
/// without an ellipsis.
pub fn layout_rich_lines(surface: &mut dyn Surface, layer: &TextLayer, ratio: f64) -> Vec<RichLine> {
    let Some(spans) = layer.rich_spans() else {
        return Vec::new();
    };
    let max_width = layer
        .max_width
        .filter(|w| *w > 0.0)
        .map(|w| scale_value(w, ratio));
    let max_lines = layer.max_lines.filter(|n| *n > 0);

    let mut lines = Vec::new();
    let mut line = RichLine::default();

    surface.save();
    for span in spans {
        let style = merge_span(layer, span);
        surface.set_state(StateProp::Font(build_font(&style.typography, ratio)));
        let font_size = scale_value(
            style.typography.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            ratio,
        );
        let span_height = layer
            .line_height
            .map(|lh| scale_value(lh, ratio))
            .unwrap_or(font_size * 1.2);
        let spacing = letter_spacing(&style, ratio);

        let mut run = String::new();
        let mut run_width = 0.0;
        for ch in span.text.chars() {
            let ch_width = measure_spaced(surface, ch.encode_utf8(&mut [0; 4]), spacing);
            let overflows = max_width
                .is_some_and(|max| line.width + run_width + ch_width > max)
                && (!run.is_empty() || !line.segments.is_empty());
            if overflows {
                if !run.is_empty() {
                    line.push(std::mem::take(&mut run), run_width, &style, span_height);
                }
                lines.push(std::mem::take(&mut line));
                if max_lines.is_some_and(|n| lines.len() >= n) {
                    surface.restore();
                    return lines;
                }
                run.push(ch);
                run_width = ch_width;
            } else {
                run.push(ch);
                run_width = measure_spaced(surface, &run, spacing);
            }
        }
        if !run.is_empty() {
            line.push(run, run_width, &style, span_height);
        }
    }
    surface.restore();

    if !line.segments.is_empty() {
        lines.push(line);
    }
    lines
}

/// Draw a rich text layer; returns the number of lines beyond the first.
pub fn draw_rich_text(
    surface: &mut dyn Surface,
    layer: &TextLayer,
    ratio: f64,
    resources: &ResourceManager,
) -> usize {
    let lines = layout_rich_lines(surface, layer, ratio);
    let anchor = layer.text_align.unwrap_or_default().anchor_factor();
    let start_x = scale_value(layer.x, ratio);
    let mut y = scale_value(layer.y, ratio);

    for line in &lines {
        let mut x = start_x - line.width * anchor;
        for segment in &line.segments {
            let span = &segment.style;
            let mut style = span.style.clone();
            if style.fill_style.is_none()
                && let Some(color) = &span.color
            {
                style.fill_style = Some(FillStyle::Color(color.clone()));
            }
            let stroke_text = span.stroke_text == Some(true);
            if style.fill_style.is_none() && style.stroke_style.is_none() && !stroke_text {
                style.fill_style = Some(FillStyle::color("#000"));
            }
            if stroke_text && style.stroke_style.is_none() {
                style.stroke_style = Some(FillStyle::Color(
                    span.color.clone().unwrap_or_else(|| "#000".to_owned()),
                ));
            }
            let fill = style.fill_style.is_some();
            let stroke = stroke_text || style.stroke_style.is_some();

            with_context(surface, &style, ratio, resources, |s| {
                s.set_state(StateProp::Font(build_font(&span.typography, ratio)));
                s.set_state(StateProp::TextAlign(TextAlign::Left));
                if let Some(baseline) = layer.text_baseline {
                    s.set_state(StateProp::TextBaseline(baseline));
                }
                let spacing = letter_spacing(span, ratio);
                if spacing > 0.0 {
                    let mut char_x = x;
                    let mut buf = [0u8; 4];
                    for ch in segment.text.chars() {
                        let ch = ch.encode_utf8(&mut buf);
                        if fill {
                            s.fill_text(ch, char_x, y, None);
                        }
                        if stroke {
                            s.stroke_text(ch, char_x, y, None);
                        }
                        char_x += s.measure_text(ch) + spacing;
                    }
                } else {
                    if fill {
                        s.fill_text(&segment.text, x, y, None);
                    }
                    if stroke {
                        s.stroke_text(&segment.text, x, y, None);
                    }
                }
            });
            x += segment.width;
        }
        y += line.height;
    }
    lines.len().saturating_sub(1)
}

#[cfg(test)]
#[path = "../../tests/unit/text/rich.rs"]
mod tests;
