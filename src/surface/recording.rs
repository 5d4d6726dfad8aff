use crate::{
    assets::decode::DecodedImage,
    foundation::{
        core::{Affine, BezPath, Rect},
        error::PosterResult,
    },
    model::{
        style::{CompositeOp, LineCap, LineJoin},
        text::{TextAlign, TextBaseline},
    },
    surface::{FontSpec, ImageData, Paint, StateProp, Surface},
};

/// One recorded surface call.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum DrawCommand {
    Resize { width: u32, height: u32 },
    Save,
    Restore,
    Transform(Affine),
    State(StateProp),
    ClearRect(Rect),
    FillPath(BezPath),
    StrokePath(BezPath),
    Clip(BezPath),
    FillText {
        text: String,
        x: f64,
        y: f64,
        max_width: Option<f64>,
    },
    StrokeText {
        text: String,
        x: f64,
        y: f64,
        max_width: Option<f64>,
    },
    DrawImage {
        image_width: u32,
        image_height: u32,
        src: Option<Rect>,
        dst: Rect,
    },
}

impl DrawCommand {
    /// Whether the command paints pixels.
    pub fn is_paint(&self) -> bool {
        matches!(
            self,
            Self::FillPath(_)
                | Self::StrokePath(_)
                | Self::FillText { .. }
                | Self::StrokeText { .. }
                | Self::DrawImage { .. }
        )
    }
}

/// Canvas-like drawing state tracked by [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub struct RecordedState {
    pub transform: Affine,
    pub fill: Paint,
    pub stroke: Paint,
    pub line_width: f64,
    pub line_join: LineJoin,
    pub line_cap: LineCap,
    pub line_dash: Vec<f64>,
    pub shadow_color: String,
    pub shadow_blur: f64,
    pub shadow_offset: (f64, f64),
    pub global_alpha: f64,
    pub composite: CompositeOp,
    pub filter: String,
    pub font: FontSpec,
    pub text_align: TextAlign,
    pub text_baseline: TextBaseline,
    pub clip_depth: usize,
}

impl Default for RecordedState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            fill: Paint::Color("#000000".to_owned()),
            stroke: Paint::Color("#000000".to_owned()),
            line_width: 1.0,
            line_join: LineJoin::Miter,
            line_cap: LineCap::Butt,
            line_dash: Vec::new(),
            shadow_color: "rgba(0, 0, 0, 0)".to_owned(),
            shadow_blur: 0.0,
            shadow_offset: (0.0, 0.0),
            global_alpha: 1.0,
            composite: CompositeOp::SourceOver,
            filter: "none".to_owned(),
            font: FontSpec::default(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
            clip_depth: 0,
        }
    }
}

impl RecordedState {
    fn apply(&mut self, prop: &StateProp) {
        match prop.clone() {
            StateProp::FillPaint(p) => self.fill = p,
            StateProp::StrokePaint(p) => self.stroke = p,
            StateProp::LineWidth(w) => self.line_width = w,
            StateProp::LineJoin(j) => self.line_join = j,
            StateProp::LineCap(c) => self.line_cap = c,
            StateProp::LineDash(d) => self.line_dash = d,
            StateProp::ShadowColor(c) => self.shadow_color = c,
            StateProp::ShadowBlur(b) => self.shadow_blur = b,
            StateProp::ShadowOffsetX(x) => self.shadow_offset.0 = x,
            StateProp::ShadowOffsetY(y) => self.shadow_offset.1 = y,
            StateProp::GlobalAlpha(a) => self.global_alpha = a,
            StateProp::Composite(op) => self.composite = op,
            StateProp::Filter(f) => self.filter = f,
            StateProp::Font(f) => self.font = f,
            StateProp::TextAlign(a) => self.text_align = a,
            StateProp::TextBaseline(b) => self.text_baseline = b,
        }
    }
}

/// Display-list surface that records every call instead of rasterizing.
///
/// Text is measured with a fixed advance per character, which makes layout deterministic and
/// independent of installed fonts. Pixel readback returns transparent pixels.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    char_advance: f64,
    commands: Vec<DrawCommand>,
    state: RecordedState,
    stack: Vec<RecordedState>,
}

impl RecordingSurface {
    /// Default advance per character.
    pub const DEFAULT_CHAR_ADVANCE: f64 = 10.0;

    /// Empty recorder of the given device size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            char_advance: Self::DEFAULT_CHAR_ADVANCE,
            commands: Vec::new(),
            state: RecordedState::default(),
            stack: Vec::new(),
        }
    }

    /// Builder-style override of the per-character advance.
    pub fn with_char_advance(mut self, advance: f64) -> Self {
        self.char_advance = advance;
        self
    }

    /// Everything recorded so far.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Current drawing state.
    pub fn state(&self) -> &RecordedState {
        &self.state
    }

    /// Depth of the save stack.
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    /// Recorded paint commands only.
    pub fn paint_commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| c.is_paint())
    }

    /// Text of every `fill_text` call, in order.
    pub fn filled_text(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.state = RecordedState::default();
        self.stack.clear();
        self.commands.push(DrawCommand::Resize { width, height });
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(prev) = self.stack.pop() {
            self.state = prev;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn concat_transform(&mut self, transform: Affine) {
        self.state.transform = self.state.transform * transform;
        self.commands.push(DrawCommand::Transform(transform));
    }

    fn set_state(&mut self, prop: StateProp) {
        self.state.apply(&prop);
        self.commands.push(DrawCommand::State(prop));
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::ClearRect(rect));
    }

    fn fill_path(&mut self, path: &BezPath) {
        self.commands.push(DrawCommand::FillPath(path.clone()));
    }

    fn stroke_path(&mut self, path: &BezPath) {
        self.commands.push(DrawCommand::StrokePath(path.clone()));
    }

    fn clip(&mut self, path: &BezPath) {
        self.state.clip_depth += 1;
        self.commands.push(DrawCommand::Clip(path.clone()));
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        text.chars().count() as f64 * self.char_advance
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_owned(),
            x,
            y,
            max_width,
        });
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.commands.push(DrawCommand::StrokeText {
            text: text.to_owned(),
            x,
            y,
            max_width,
        });
    }

    fn draw_image(&mut self, image: &DecodedImage, src: Option<Rect>, dst: Rect) {
        self.commands.push(DrawCommand::DrawImage {
            image_width: image.width,
            image_height: image.height,
            src,
            dst,
        });
    }

    fn read_pixels(&mut self, rect: Rect) -> PosterResult<ImageData> {
        let w = rect.width().abs().round().max(0.0) as u32;
        let h = rect.height().abs().round().max(0.0) as u32;
        Ok(ImageData::new(w, h))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/recording.rs"]
mod tests;
