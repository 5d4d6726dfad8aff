//! Drawing-surface contract and the built-in surfaces.
//!
//! Every renderer in the crate talks to a `&mut dyn Surface`. Coordinates handed to a surface are
//! device pixels: the engine has already multiplied logical values by the device ratio.

use kurbo::Shape as _;

use crate::{
    assets::decode::DecodedImage,
    foundation::{
        core::{Affine, BezPath, Point, Rect},
        error::PosterResult,
    },
    model::{
        style::{ColorStop, CompositeOp, LineCap, LineJoin, Repetition},
        text::{TextAlign, TextBaseline},
    },
};

pub(crate) mod cpu;
pub(crate) mod recording;

/// Concrete paint handed to a surface, already scaled into device space.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// CSS color string; surfaces ignore strings they cannot parse.
    Color(String),
    /// Linear gradient between two device points.
    LinearGradient {
        /// Start point.
        start: Point,
        /// End point.
        end: Point,
        /// Color stops.
        stops: Vec<ColorStop>,
    },
    /// Two-circle radial gradient.
    RadialGradient {
        /// Start circle center.
        start: Point,
        /// Start circle radius.
        start_radius: f64,
        /// End circle center.
        end: Point,
        /// End circle radius.
        end_radius: f64,
        /// Color stops.
        stops: Vec<ColorStop>,
    },
    /// Tiled image.
    Pattern {
        /// Decoded tile.
        image: DecodedImage,
        /// Tiling mode.
        repetition: Repetition,
    },
}

impl Paint {
    /// Fully transparent paint, used when a pattern cannot be resolved.
    pub fn transparent() -> Self {
        Self::Color("transparent".to_owned())
    }
}

/// Font selection as the surface sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// `normal`, `italic`, or `oblique`.
    pub style: String,
    /// CSS weight keyword or number.
    pub weight: String,
    /// Size in device pixels.
    pub size_px: f64,
    /// Family name.
    pub family: String,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            style: "normal".to_owned(),
            weight: "normal".to_owned(),
            size_px: 10.0,
            family: "sans-serif".to_owned(),
        }
    }
}

impl std::fmt::Display for FontSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}px {}",
            self.style, self.weight, self.size_px, self.family
        )
    }
}

/// One piece of drawing state, mirroring the canvas state properties.
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum StateProp {
    FillPaint(Paint),
    StrokePaint(Paint),
    LineWidth(f64),
    LineJoin(LineJoin),
    LineCap(LineCap),
    LineDash(Vec<f64>),
    ShadowColor(String),
    ShadowBlur(f64),
    ShadowOffsetX(f64),
    ShadowOffsetY(f64),
    GlobalAlpha(f64),
    Composite(CompositeOp),
    Filter(String),
    Font(FontSpec),
    TextAlign(TextAlign),
    TextBaseline(TextBaseline),
}

/// Straight-alpha RGBA8 pixels read back from a surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl ImageData {
    /// Transparent pixels of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// RGBA of one pixel, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Immediate-mode 2D drawing target with canvas-like state semantics.
///
/// State set through [`Surface::set_state`] and [`Surface::concat_transform`] is scoped by
/// [`Surface::save`]/[`Surface::restore`]. Clip regions intersect until restored.
pub trait Surface {
    /// Device size in pixels.
    fn size(&self) -> (u32, u32);

    /// Resize the surface; clears content and resets all state.
    fn set_size(&mut self, width: u32, height: u32);

    /// Push the current state.
    fn save(&mut self);

    /// Pop the most recently saved state; a no-op when nothing is saved.
    fn restore(&mut self);

    /// Post-multiply the current transform.
    fn concat_transform(&mut self, transform: Affine);

    /// Update one piece of drawing state.
    fn set_state(&mut self, prop: StateProp);

    /// Reset pixels inside `rect` (device space, transform ignored) to transparent.
    fn clear_rect(&mut self, rect: Rect);

    /// Fill `path` with the current fill paint.
    fn fill_path(&mut self, path: &BezPath);

    /// Stroke `path` with the current stroke paint and line settings.
    fn stroke_path(&mut self, path: &BezPath);

    /// Intersect the clip region with `path`.
    fn clip(&mut self, path: &BezPath);

    /// Advance width of `text` in the current font.
    fn measure_text(&mut self, text: &str) -> f64;

    /// Fill `text` anchored at `(x, y)` using the current alignment and baseline.
    fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>);

    /// Stroke `text` anchored at `(x, y)`.
    fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>);

    /// Blit `image` (optionally its `src` sub-rectangle, in image pixels) into `dst`.
    fn draw_image(&mut self, image: &DecodedImage, src: Option<Rect>, dst: Rect);

    /// Read back straight-alpha pixels of a device rectangle.
    fn read_pixels(&mut self, rect: Rect) -> PosterResult<ImageData>;

    /// Translate the current transform.
    fn translate(&mut self, dx: f64, dy: f64) {
        self.concat_transform(Affine::translate((dx, dy)));
    }

    /// Rotate the current transform by `radians`.
    fn rotate(&mut self, radians: f64) {
        self.concat_transform(Affine::rotate(radians));
    }

    /// Scale the current transform.
    fn scale(&mut self, sx: f64, sy: f64) {
        self.concat_transform(Affine::scale_non_uniform(sx, sy));
    }

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect) {
        self.fill_path(&rect.to_path(0.1));
    }

    /// Stroke an axis-aligned rectangle.
    fn stroke_rect(&mut self, rect: Rect) {
        self.stroke_path(&rect.to_path(0.1));
    }

    /// Clear the whole surface.
    fn clear(&mut self) {
        let (w, h) = self.size();
        self.clear_rect(Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
    }
}
