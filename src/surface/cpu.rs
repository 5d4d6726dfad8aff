use std::{borrow::Cow, collections::HashMap, sync::Arc};

use crate::{
    assets::decode::DecodedImage,
    foundation::{
        core::{Affine, BezPath, Point, Rect},
        error::{PosterError, PosterResult},
        math::{mul_div255_u16, unpremultiply_rgba8_in_place},
    },
    model::{
        style::{ColorStop, CompositeOp, LineCap, LineJoin, Repetition},
        text::{FontWeight, TextAlign, TextBaseline},
    },
    style::color::{Rgba, parse_css_color},
    surface::{FontSpec, ImageData, Paint, StateProp, Surface},
};

#[derive(Clone, Debug)]
struct CpuState {
    transform: Affine,
    fill: Paint,
    stroke: Paint,
    line_width: f64,
    line_join: LineJoin,
    line_cap: LineCap,
    line_dash: Vec<f64>,
    shadow_color: Rgba,
    shadow_blur: f64,
    shadow_offset: (f64, f64),
    global_alpha: f64,
    composite: CompositeOp,
    font: FontSpec,
    text_align: TextAlign,
    text_baseline: TextBaseline,
    clip_layers: usize,
}

impl Default for CpuState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            fill: Paint::Color("#000000".to_owned()),
            stroke: Paint::Color("#000000".to_owned()),
            line_width: 1.0,
            line_join: LineJoin::Miter,
            line_cap: LineCap::Butt,
            line_dash: Vec::new(),
            shadow_color: Rgba::TRANSPARENT,
            shadow_blur: 0.0,
            shadow_offset: (0.0, 0.0),
            global_alpha: 1.0,
            composite: CompositeOp::SourceOver,
            font: FontSpec::default(),
            text_align: TextAlign::Start,
            text_baseline: TextBaseline::Alphabetic,
            clip_layers: 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PaintTarget {
    Fill,
    Stroke,
}

/// Paint ready for the raster context.
enum CpuPaint {
    Color(vello_cpu::peniko::Color),
    /// Device-space image whose top-left pixel sits at `origin`.
    Image {
        image: vello_cpu::Image,
        origin: Point,
    },
}

#[derive(Clone, Copy, Debug)]
struct ShapedGlyph {
    id: u32,
    x: f32,
    y: f32,
}

struct ShapedText {
    font: vello_cpu::peniko::FontData,
    width: f64,
    baseline: f64,
    ascent: f64,
    descent: f64,
    runs: Vec<(f32, Vec<ShapedGlyph>)>,
}

/// Fonts registered from raw bytes plus the Parley contexts used to shape with them.
struct FontBook {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    faces: HashMap<String, (String, vello_cpu::peniko::FontData)>,
    default_family: Option<String>,
    warned_missing: bool,
}

impl FontBook {
    fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
            default_family: None,
            warned_missing: false,
        }
    }

    fn register(&mut self, bytes: Vec<u8>) -> PosterResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| PosterError::validation("no font families registered from font bytes"))?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PosterError::validation("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        self.faces.insert(
            family_name.to_ascii_lowercase(),
            (family_name.clone(), font),
        );
        if self.default_family.is_none() {
            self.default_family = Some(family_name.to_ascii_lowercase());
        }
        tracing::debug!(family = %family_name, "registered font");
        Ok(family_name)
    }

    /// First registered family named in the CSS family list, else the default family.
    fn resolve(&self, families: &str) -> Option<&(String, vello_cpu::peniko::FontData)> {
        families
            .split(',')
            .map(|f| f.trim().trim_matches(['"', '\'']).to_ascii_lowercase())
            .find_map(|f| self.faces.get(&f))
            .or_else(|| {
                self.default_family
                    .as_ref()
                    .and_then(|f| self.faces.get(f))
            })
    }

    fn shape(&mut self, text: &str, font: &FontSpec) -> Option<ShapedText> {
        let Some((family, data)) = self.resolve(&font.family).cloned() else {
            if !self.warned_missing {
                tracing::warn!(family = %font.family, "no fonts registered; text is not rasterized");
                self.warned_missing = true;
            }
            return None;
        };

        let size = font.size_px.max(0.0) as f32;
        if size <= 0.0 || text.is_empty() {
            return Some(ShapedText {
                font: data,
                width: 0.0,
                baseline: 0.0,
                ascent: 0.0,
                descent: 0.0,
                runs: Vec::new(),
            });
        }

        let weight = FontWeight::Name(font.weight.clone()).numeric();
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(weight),
        ));
        if font.style == "italic" || font.style == "oblique" {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let (baseline, ascent, descent) = layout
            .lines()
            .next()
            .map(|line| {
                let m = line.metrics();
                (
                    f64::from(m.baseline),
                    f64::from(m.ascent),
                    f64::from(m.descent),
                )
            })
            .unwrap_or((0.0, 0.0, 0.0));

        let mut runs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run
                    .positioned_glyphs()
                    .map(|g| ShapedGlyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    })
                    .collect();
                runs.push((run.run().font_size(), glyphs));
            }
        }

        Some(ShapedText {
            font: data,
            width: f64::from(layout.width()),
            baseline,
            ascent,
            descent,
            runs,
        })
    }
}

/// Raster surface backed by `vello_cpu`, with text shaped by Parley.
///
/// Fonts must be registered with [`CpuSurface::register_font`]; there is no system font lookup.
/// Shadow blur and CSS filters are not rasterized: shadows are drawn as a hard offset copy.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    state: CpuState,
    stack: Vec<CpuState>,
    open_layers: usize,
    fonts: FontBook,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("save_depth", &self.stack.len())
            .field("fonts", &self.fonts.faces.len())
            .finish()
    }
}

fn checked_dim(v: u32, what: &str) -> PosterResult<u16> {
    if v == 0 {
        return Err(PosterError::validation(format!("surface {what} must be > 0")));
    }
    u16::try_from(v)
        .map_err(|_| PosterError::validation(format!("surface {what} exceeds {}", u16::MAX)))
}

impl CpuSurface {
    /// Transparent surface of the given device size (each side in `1..=65535`).
    pub fn new(width: u32, height: u32) -> PosterResult<Self> {
        let w = checked_dim(width, "width")?;
        let h = checked_dim(height, "height")?;
        Ok(Self {
            width: w,
            height: h,
            ctx: vello_cpu::RenderContext::new(w, h),
            state: CpuState::default(),
            stack: Vec::new(),
            open_layers: 0,
            fonts: FontBook::new(),
        })
    }

    /// Register a font from TTF/OTF bytes; returns its family name. The first registered family
    /// is used whenever a requested family is unknown.
    pub fn register_font(&mut self, bytes: Vec<u8>) -> PosterResult<String> {
        self.fonts.register(bytes)
    }

    /// Builder-style [`CpuSurface::register_font`].
    pub fn with_font(mut self, bytes: Vec<u8>) -> PosterResult<Self> {
        self.register_font(bytes)?;
        Ok(self)
    }

    /// Families registered so far.
    pub fn font_families(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fonts.faces.values().map(|(n, _)| n.clone()).collect();
        names.sort();
        names
    }

    fn device_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    fn stroke_settings(&self) -> vello_cpu::kurbo::Stroke {
        let join = match self.state.line_join {
            LineJoin::Miter => vello_cpu::kurbo::Join::Miter,
            LineJoin::Round => vello_cpu::kurbo::Join::Round,
            LineJoin::Bevel => vello_cpu::kurbo::Join::Bevel,
        };
        let cap = match self.state.line_cap {
            LineCap::Butt => vello_cpu::kurbo::Cap::Butt,
            LineCap::Round => vello_cpu::kurbo::Cap::Round,
            LineCap::Square => vello_cpu::kurbo::Cap::Square,
        };
        let mut stroke = vello_cpu::kurbo::Stroke::new(self.state.line_width)
            .with_join(join)
            .with_caps(cap);
        if !self.state.line_dash.is_empty() && self.state.line_dash.iter().all(|d| *d >= 0.0) {
            let mut dashes = self.state.line_dash.clone();
            if dashes.len() % 2 == 1 {
                dashes.extend_from_within(..);
            }
            stroke = stroke.with_dashes(0.0, dashes);
        }
        stroke
    }

    /// Resolve a paint for a draw whose device footprint is `region`.
    fn resolve_paint(&self, paint: &Paint, region: Rect, alpha: f64) -> Option<CpuPaint> {
        if let Paint::Color(c) = paint {
            let rgba = parse_css_color(c).ok()?.with_alpha_factor(alpha);
            let [r, g, b, a] = rgba.to_rgba8();
            return Some(CpuPaint::Color(vello_cpu::peniko::Color::from_rgba8(
                r, g, b, a,
            )));
        }

        let region = region.intersect(self.device_rect()).expand();
        if region.width() <= 0.0 || region.height() <= 0.0 {
            return None;
        }
        let inverse = self.state.transform.inverse();
        let w = region.width() as u32;
        let h = region.height() as u32;
        let mut pixels = Vec::with_capacity(w as usize * h as usize);
        let mut may_have_opacities = false;
        for py in 0..h {
            for px in 0..w {
                let device = Point::new(
                    region.x0 + f64::from(px) + 0.5,
                    region.y0 + f64::from(py) + 0.5,
                );
                let user = inverse * device;
                let [r, g, b, a] = sample_paint(paint, user).unwrap_or([0, 0, 0, 0]);
                let a = (f64::from(a) * alpha).round() as u8;
                let [r, g, b, a] =
                    Rgba::new(f64::from(r) / 255.0, f64::from(g) / 255.0, f64::from(b) / 255.0, f64::from(a) / 255.0)
                        .to_rgba8_premul();
                may_have_opacities |= a != 255;
                pixels.push(vello_cpu::peniko::color::PremulRgba8 { r, g, b, a });
            }
        }
        let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(
            pixels,
            w as u16,
            h as u16,
            may_have_opacities,
        );
        Some(CpuPaint::Image {
            image: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            origin: Point::new(region.x0, region.y0),
        })
    }

    /// Run `draw` once for the shadow (if any) and once for the paint, with the current
    /// transform post-multiplied by `local`. `bounds` is the local-space footprint.
    fn paint_op(
        &mut self,
        target: PaintTarget,
        local: Affine,
        bounds: Rect,
        draw: impl Fn(&mut vello_cpu::RenderContext),
    ) {
        let alpha = self.state.global_alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let full = self.state.transform * local;
        let pad = match target {
            PaintTarget::Fill => 1.0,
            PaintTarget::Stroke => self.state.line_width.abs() + 1.0,
        };
        let region = full.transform_rect_bbox(bounds).inflate(pad, pad);

        if target == PaintTarget::Stroke {
            let stroke = self.stroke_settings();
            self.ctx.set_stroke(stroke);
        }
        self.ctx.set_blend_mode(blend_mode_for(self.state.composite));

        let shadow = self.state.shadow_color.with_alpha_factor(alpha);
        let (sx, sy) = self.state.shadow_offset;
        if shadow.a > 0.0 && (sx != 0.0 || sy != 0.0 || self.state.shadow_blur > 0.0) {
            let [r, g, b, a] = shadow.to_rgba8();
            self.ctx
                .set_transform(affine_to_cpu(Affine::translate((sx, sy)) * full));
            self.ctx
                .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            self.ctx
                .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            draw(&mut self.ctx);
        }

        let paint = match target {
            PaintTarget::Fill => &self.state.fill,
            PaintTarget::Stroke => &self.state.stroke,
        };
        match self.resolve_paint(paint, region, alpha) {
            Some(CpuPaint::Color(c)) => {
                self.ctx.set_transform(affine_to_cpu(full));
                self.ctx
                    .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                self.ctx.set_paint(c);
                draw(&mut self.ctx);
            }
            Some(CpuPaint::Image { image, origin }) => {
                self.ctx.set_transform(affine_to_cpu(full));
                self.ctx.set_paint_transform(affine_to_cpu(
                    full.inverse() * Affine::translate(origin.to_vec2()),
                ));
                self.ctx.set_paint(image);
                draw(&mut self.ctx);
            }
            None => {}
        }
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>, target: PaintTarget) {
        let font = self.state.font.clone();
        let Some(shaped) = self.fonts.shape(text, &font) else {
            return;
        };
        if shaped.runs.is_empty() {
            return;
        }

        let mut scale_x = 1.0;
        if let Some(mw) = max_width
            && mw > 0.0
            && shaped.width > mw
        {
            scale_x = mw / shaped.width;
        }
        let drawn_width = shaped.width * scale_x;
        let x0 = x - drawn_width * self.state.text_align.anchor_factor();
        let top = shaped.baseline - shaped.ascent;
        let y0 = match self.state.text_baseline {
            TextBaseline::Top | TextBaseline::Hanging => y - top,
            TextBaseline::Middle => y - top - (shaped.ascent + shaped.descent) / 2.0,
            TextBaseline::Alphabetic => y - shaped.baseline,
            TextBaseline::Ideographic | TextBaseline::Bottom => {
                y - (shaped.baseline + shaped.descent)
            }
        };

        let local = Affine::translate((x0, y0)) * Affine::scale_non_uniform(scale_x, 1.0);
        let bounds = Rect::new(
            0.0,
            top,
            shaped.width,
            shaped.baseline + shaped.descent,
        );
        let font_data = shaped.font.clone();
        let runs = shaped.runs;
        self.paint_op(target, local, bounds, |ctx| {
            for (size, glyphs) in &runs {
                let glyphs = glyphs.iter().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                let builder = ctx.glyph_run(&font_data).font_size(*size);
                match target {
                    PaintTarget::Fill => builder.fill_glyphs(glyphs),
                    PaintTarget::Stroke => builder.stroke_glyphs(glyphs),
                }
            }
        });
    }
}

impl Surface for CpuSurface {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn set_size(&mut self, width: u32, height: u32) {
        let clamp = |v: u32| v.clamp(1, u32::from(u16::MAX)) as u16;
        let (w, h) = (clamp(width), clamp(height));
        if u32::from(w) != width || u32::from(h) != height {
            tracing::warn!(width, height, "surface size clamped to {w}x{h}");
        }
        self.width = w;
        self.height = h;
        self.ctx = vello_cpu::RenderContext::new(w, h);
        self.state = CpuState::default();
        self.stack.clear();
        self.open_layers = 0;
    }

    fn save(&mut self) {
        let mut next = self.state.clone();
        next.clip_layers = 0;
        self.stack.push(std::mem::replace(&mut self.state, next));
    }

    fn restore(&mut self) {
        let Some(prev) = self.stack.pop() else {
            return;
        };
        for _ in 0..self.state.clip_layers {
            self.ctx.pop_layer();
        }
        self.open_layers = self.open_layers.saturating_sub(self.state.clip_layers);
        self.state = prev;
    }

    fn concat_transform(&mut self, transform: Affine) {
        self.state.transform = self.state.transform * transform;
    }

    fn set_state(&mut self, prop: StateProp) {
        let st = &mut self.state;
        match prop {
            StateProp::FillPaint(p) => {
                if paint_is_valid(&p) {
                    st.fill = p;
                }
            }
            StateProp::StrokePaint(p) => {
                if paint_is_valid(&p) {
                    st.stroke = p;
                }
            }
            StateProp::LineWidth(w) => {
                if w.is_finite() && w > 0.0 {
                    st.line_width = w;
                }
            }
            StateProp::LineJoin(j) => st.line_join = j,
            StateProp::LineCap(c) => st.line_cap = c,
            StateProp::LineDash(d) => st.line_dash = d,
            StateProp::ShadowColor(c) => {
                if let Ok(c) = parse_css_color(&c) {
                    st.shadow_color = c;
                }
            }
            StateProp::ShadowBlur(b) => {
                if b > 0.0 {
                    tracing::trace!(blur = b, "shadow blur is drawn as a hard shadow");
                }
                st.shadow_blur = b;
            }
            StateProp::ShadowOffsetX(x) => st.shadow_offset.0 = x,
            StateProp::ShadowOffsetY(y) => st.shadow_offset.1 = y,
            StateProp::GlobalAlpha(a) => {
                if (0.0..=1.0).contains(&a) {
                    st.global_alpha = a;
                }
            }
            StateProp::Composite(op) => st.composite = op,
            StateProp::Filter(f) => {
                if f != "none" {
                    tracing::warn!(filter = %f, "css filters are not rasterized");
                }
            }
            StateProp::Font(f) => st.font = f,
            StateProp::TextAlign(a) => st.text_align = a,
            StateProp::TextBaseline(b) => st.text_baseline = b,
        }
    }

    fn clear_rect(&mut self, rect: Rect) {
        let device = self.device_rect();
        let covers_all = rect.x0 <= 0.0
            && rect.y0 <= 0.0
            && rect.x1 >= device.x1
            && rect.y1 >= device.y1;
        if covers_all && self.open_layers == 0 {
            self.ctx.reset();
            return;
        }
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_blend_mode(vello_cpu::peniko::BlendMode::new(
            vello_cpu::peniko::Mix::Normal,
            vello_cpu::peniko::Compose::Clear,
        ));
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            rect.x0, rect.y0, rect.x1, rect.y1,
        ));
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
    }

    fn fill_path(&mut self, path: &BezPath) {
        let cpu_path = bezpath_to_cpu(path);
        self.paint_op(
            PaintTarget::Fill,
            Affine::IDENTITY,
            kurbo::Shape::bounding_box(path),
            |ctx| ctx.fill_path(&cpu_path),
        );
    }

    fn stroke_path(&mut self, path: &BezPath) {
        let cpu_path = bezpath_to_cpu(path);
        self.paint_op(
            PaintTarget::Stroke,
            Affine::IDENTITY,
            kurbo::Shape::bounding_box(path),
            |ctx| ctx.stroke_path(&cpu_path),
        );
    }

    fn clip(&mut self, path: &BezPath) {
        self.ctx.set_transform(affine_to_cpu(self.state.transform));
        self.ctx.push_clip_layer(&bezpath_to_cpu(path));
        self.state.clip_layers += 1;
        self.open_layers += 1;
    }

    fn measure_text(&mut self, text: &str) -> f64 {
        let font = self.state.font.clone();
        match self.fonts.shape(text, &font) {
            Some(shaped) => shaped.width,
            None => text.chars().count() as f64 * font.size_px * 0.5,
        }
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.draw_text(text, x, y, max_width, PaintTarget::Fill);
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64, max_width: Option<f64>) {
        self.draw_text(text, x, y, max_width, PaintTarget::Stroke);
    }

    fn draw_image(&mut self, image: &DecodedImage, src: Option<Rect>, dst: Rect) {
        let alpha = self.state.global_alpha.clamp(0.0, 1.0);
        if alpha <= 0.0 || image.width == 0 || image.height == 0 {
            return;
        }
        let src = src.unwrap_or(Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        if src.width() <= 0.0 || src.height() <= 0.0 || dst.width() == 0.0 || dst.height() == 0.0
        {
            return;
        }
        let Some(pixmap) = pixmap_from_image(image, alpha) else {
            tracing::warn!(
                width = image.width,
                height = image.height,
                "image exceeds raster limits; skipped"
            );
            return;
        };

        let image_to_user = Affine::translate((dst.x0, dst.y0))
            * Affine::scale_non_uniform(dst.width() / src.width(), dst.height() / src.height())
            * Affine::translate((-src.x0, -src.y0));
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.ctx.set_blend_mode(blend_mode_for(self.state.composite));
        self.ctx.set_transform(affine_to_cpu(self.state.transform));
        self.ctx.set_paint_transform(affine_to_cpu(image_to_user));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            dst.x0, dst.y0, dst.x1, dst.y1,
        ));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
    }

    fn read_pixels(&mut self, rect: Rect) -> PosterResult<ImageData> {
        if self.open_layers > 0 {
            return Err(PosterError::export(
                "cannot read pixels while clip regions are active; restore first",
            ));
        }
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);

        let rect = rect.abs().round();
        let out_w = rect.width().max(0.0) as u32;
        let out_h = rect.height().max(0.0) as u32;
        let mut out = ImageData::new(out_w, out_h);
        let src = pixmap.data_as_u8_slice();
        let (sw, sh) = (i64::from(self.width), i64::from(self.height));
        for oy in 0..i64::from(out_h) {
            let sy = rect.y0 as i64 + oy;
            if sy < 0 || sy >= sh {
                continue;
            }
            for ox in 0..i64::from(out_w) {
                let sx = rect.x0 as i64 + ox;
                if sx < 0 || sx >= sw {
                    continue;
                }
                let si = ((sy * sw + sx) * 4) as usize;
                let di = ((oy * i64::from(out_w) + ox) * 4) as usize;
                out.data[di..di + 4].copy_from_slice(&src[si..si + 4]);
            }
        }
        unpremultiply_rgba8_in_place(&mut out.data);
        Ok(out)
    }
}

fn paint_is_valid(p: &Paint) -> bool {
    match p {
        Paint::Color(c) => parse_css_color(c).is_ok(),
        _ => true,
    }
}

fn blend_mode_for(op: CompositeOp) -> vello_cpu::peniko::BlendMode {
    use vello_cpu::peniko::{BlendMode, Compose, Mix};

    let compose = |c: Compose| BlendMode::new(Mix::Normal, c);
    let mix = |m: Mix| BlendMode::new(m, Compose::SrcOver);
    match op {
        CompositeOp::SourceOver => BlendMode::default(),
        CompositeOp::SourceIn => compose(Compose::SrcIn),
        CompositeOp::SourceOut => compose(Compose::SrcOut),
        CompositeOp::SourceAtop => compose(Compose::SrcAtop),
        CompositeOp::DestinationOver => compose(Compose::DestOver),
        CompositeOp::DestinationIn => compose(Compose::DestIn),
        CompositeOp::DestinationOut => compose(Compose::DestOut),
        CompositeOp::DestinationAtop => compose(Compose::DestAtop),
        CompositeOp::Lighter => compose(Compose::Plus),
        CompositeOp::Copy => compose(Compose::Copy),
        CompositeOp::Xor => compose(Compose::Xor),
        CompositeOp::Multiply => mix(Mix::Multiply),
        CompositeOp::Screen => mix(Mix::Screen),
        CompositeOp::Overlay => mix(Mix::Overlay),
        CompositeOp::Darken => mix(Mix::Darken),
        CompositeOp::Lighten => mix(Mix::Lighten),
        CompositeOp::ColorDodge => mix(Mix::ColorDodge),
        CompositeOp::ColorBurn => mix(Mix::ColorBurn),
        CompositeOp::HardLight => mix(Mix::HardLight),
        CompositeOp::SoftLight => mix(Mix::SoftLight),
        CompositeOp::Difference => mix(Mix::Difference),
        CompositeOp::Exclusion => mix(Mix::Exclusion),
        CompositeOp::Hue => mix(Mix::Hue),
        CompositeOp::Saturation => mix(Mix::Saturation),
        CompositeOp::Color => mix(Mix::Color),
        CompositeOp::Luminosity => mix(Mix::Luminosity),
    }
}

/// Straight RGBA8 of a non-solid paint at a user-space point.
fn sample_paint(paint: &Paint, p: Point) -> Option<[u8; 4]> {
    match paint {
        Paint::Color(c) => parse_css_color(c).ok().map(Rgba::to_rgba8),
        Paint::LinearGradient { start, end, stops } => {
            let d = *end - *start;
            let len2 = d.hypot2();
            let t = if len2 == 0.0 {
                return None;
            } else {
                (p - *start).dot(d) / len2
            };
            Some(gradient_color(stops, t).to_rgba8())
        }
        Paint::RadialGradient {
            start,
            start_radius,
            end,
            end_radius,
            stops,
        } => radial_t(p, *start, *start_radius, *end, *end_radius)
            .map(|t| gradient_color(stops, t).to_rgba8()),
        Paint::Pattern { image, repetition } => sample_pattern(image, *repetition, p),
    }
}

/// Largest `t` whose interpolated circle passes through `p` with non-negative radius.
fn radial_t(p: Point, c0: Point, r0: f64, c1: Point, r1: f64) -> Option<f64> {
    let dc = c1 - c0;
    let dr = r1 - r0;
    let pd = p - c0;
    let a = dc.hypot2() - dr * dr;
    let b = pd.dot(dc) + r0 * dr;
    let c = pd.hypot2() - r0 * r0;

    let valid = |t: f64| r0 + t * dr >= 0.0;
    if a.abs() < 1e-9 {
        if b.abs() < 1e-12 {
            return None;
        }
        let t = c / (2.0 * b);
        return valid(t).then_some(t);
    }
    let disc = b * b - a * c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let (t1, t2) = ((b + sq) / a, (b - sq) / a);
    let (hi, lo) = if t1 >= t2 { (t1, t2) } else { (t2, t1) };
    if valid(hi) {
        Some(hi)
    } else if valid(lo) {
        Some(lo)
    } else {
        None
    }
}

fn gradient_color(stops: &[ColorStop], t: f64) -> Rgba {
    let mut parsed: Vec<(f64, Rgba)> = stops
        .iter()
        .filter_map(|s| {
            parse_css_color(&s.color)
                .ok()
                .map(|c| (s.offset.clamp(0.0, 1.0), c))
        })
        .collect();
    parsed.sort_by(|a, b| a.0.total_cmp(&b.0));

    let t = t.clamp(0.0, 1.0);
    let (Some(first), Some(last)) = (parsed.first(), parsed.last()) else {
        return Rgba::TRANSPARENT;
    };
    if t <= first.0 {
        return first.1;
    }
    if t >= last.0 {
        return last.1;
    }
    for pair in parsed.windows(2) {
        let (o0, c0) = pair[0];
        let (o1, c1) = pair[1];
        if t >= o0 && t <= o1 {
            let span = o1 - o0;
            if span <= 0.0 {
                return c1;
            }
            return c0.lerp(c1, (t - o0) / span);
        }
    }
    last.1
}

fn sample_pattern(image: &DecodedImage, repetition: Repetition, p: Point) -> Option<[u8; 4]> {
    let (w, h) = (i64::from(image.width), i64::from(image.height));
    if w == 0 || h == 0 {
        return None;
    }
    let (mut x, mut y) = (p.x.floor() as i64, p.y.floor() as i64);
    let (repeat_x, repeat_y) = match repetition {
        Repetition::Repeat => (true, true),
        Repetition::RepeatX => (true, false),
        Repetition::RepeatY => (false, true),
        Repetition::NoRepeat => (false, false),
    };
    if repeat_x {
        x = x.rem_euclid(w);
    }
    if repeat_y {
        y = y.rem_euclid(h);
    }
    if x < 0 || x >= w || y < 0 || y >= h {
        return None;
    }
    let i = ((y * w + x) * 4) as usize;
    let mut px = [0u8; 4];
    px.copy_from_slice(image.rgba8_premul.get(i..i + 4)?);
    unpremultiply_rgba8_in_place(&mut px);
    Some(px)
}

fn pixmap_from_image(image: &DecodedImage, alpha: f64) -> Option<vello_cpu::Pixmap> {
    let w = u16::try_from(image.width).ok()?;
    let h = u16::try_from(image.height).ok()?;
    let expected = image.width as usize * image.height as usize * 4;
    if image.rgba8_premul.len() != expected {
        return None;
    }
    let a8 = (alpha.clamp(0.0, 1.0) * 255.0).round() as u16;
    let scale = |c: u8| -> u8 {
        if a8 == 255 {
            c
        } else {
            mul_div255_u16(u16::from(c), a8) as u8
        }
    };

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(image.width as usize * image.height as usize);
    for px in image.rgba8_premul.chunks_exact(4) {
        let a = scale(px[3]);
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: scale(px[0]),
            g: scale(px[1]),
            b: scale(px[2]),
            a,
        });
    }
    Some(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/surface/cpu.rs"]
mod tests;
