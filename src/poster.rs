use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    assets::{decode::DecodedImage, resource::ResourceManager},
    export::{Blob, ExportFormat, export_image_data, to_blob, to_data_url},
    foundation::{
        core::{Affine, BoundingBox, Offset},
        error::{PosterError, PosterResult},
    },
    layout::{
        align::{AlignType, DistributeAxis, align, distribute},
        bounds::get_layer_bounds,
        hit_test::hit_test,
        snap::{SnapResult, get_snap_lines},
    },
    model::{
        layer::{
            CircleLayer, ImageLayer, Layer, LineLayer, PolygonLayer, QrCodeLayer, RectLayer,
            TextLayer,
        },
        text::Typography,
    },
    plugin::Plugin,
    render::{
        debug::{DebugOptions, deserialize_toggle},
        image, pipeline, qrcode, shapes,
    },
    style::resolve::scale_value,
    surface::{ImageData, StateProp, Surface},
    template::{json::JsonTemplate, registry::TemplateRegistry},
    text::{layout, rich},
};

/// Engine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PosterOptions {
    /// Device pixels per logical unit.
    pub ratio: f64,
    /// Diagnostic overlays; JSON `debug: true` enables layer bounds only.
    #[serde(
        deserialize_with = "deserialize_toggle",
        skip_serializing_if = "Option::is_none"
    )]
    pub debug: Option<DebugOptions>,
}

impl Default for PosterOptions {
    fn default() -> Self {
        Self {
            ratio: 1.0,
            debug: None,
        }
    }
}

impl PosterOptions {
    /// Reject ratios that are not finite and positive.
    pub fn validate(&self) -> PosterResult<()> {
        if !(self.ratio.is_finite() && self.ratio > 0.0) {
            return Err(PosterError::validation(format!(
                "ratio must be finite and > 0, got {}",
                self.ratio
            )));
        }
        Ok(())
    }
}

/// Canvas-style transform step: translate (logical units), then rotate, then scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct TransformOptions {
    pub translate_x: Option<f64>,
    pub translate_y: Option<f64>,
    /// Radians.
    pub rotate: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
}

impl TransformOptions {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Device-space affine for `ratio`.
    pub fn to_affine(&self, ratio: f64) -> Affine {
        let translate = Affine::translate((
            scale_value(self.translate_x.unwrap_or(0.0), ratio),
            scale_value(self.translate_y.unwrap_or(0.0), ratio),
        ));
        let rotate = Affine::rotate(self.rotate.unwrap_or(0.0));
        let scale =
            Affine::scale_non_uniform(self.scale_x.unwrap_or(1.0), self.scale_y.unwrap_or(1.0));
        translate * rotate * scale
    }
}

/// Builder for [`DrawPoster`].
pub struct DrawPosterBuilder<S> {
    surface: S,
    options: PosterOptions,
    plugins: Vec<Box<dyn Plugin>>,
    resources: Option<ResourceManager>,
}

impl<S: Surface> DrawPosterBuilder<S> {
    /// Replace all options at once.
    pub fn options(mut self, options: PosterOptions) -> Self {
        self.options = options;
        self
    }

    /// Device pixels per logical unit.
    pub fn ratio(mut self, ratio: f64) -> Self {
        self.options.ratio = ratio;
        self
    }

    /// Enable diagnostic overlays.
    pub fn debug(mut self, debug: DebugOptions) -> Self {
        self.options.debug = Some(debug);
        self
    }

    /// Attach a plugin; its `on_init` runs during [`DrawPosterBuilder::build`].
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Share an existing image cache.
    pub fn resources(mut self, resources: ResourceManager) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Validate options and initialize plugins in order.
    pub fn build(self) -> PosterResult<DrawPoster<S>> {
        self.options.validate()?;
        let mut poster = DrawPoster {
            surface: self.surface,
            options: self.options,
            layers: Vec::new(),
            plugins: Vec::with_capacity(self.plugins.len()),
            templates: TemplateRegistry::new(),
            resources: self.resources.unwrap_or_default(),
            stats: pipeline::RenderStats::default(),
        };
        for plugin in self.plugins {
            poster.use_boxed_plugin(plugin)?;
        }
        Ok(poster)
    }
}

/// Retained-mode poster engine over a drawing surface.
///
/// Holds the layer list, template registry, plugins, and image cache. Coordinates passed in and
/// out are logical; the surface sees them multiplied by [`PosterOptions::ratio`].
pub struct DrawPoster<S> {
    surface: S,
    options: PosterOptions,
    layers: Vec<Layer>,
    plugins: Vec<Box<dyn Plugin>>,
    templates: TemplateRegistry,
    resources: ResourceManager,
    stats: pipeline::RenderStats,
}

impl<S: Surface> DrawPoster<S> {
    /// Start building an engine that draws onto `surface`.
    pub fn builder(surface: S) -> DrawPosterBuilder<S> {
        DrawPosterBuilder {
            surface,
            options: PosterOptions::default(),
            plugins: Vec::new(),
            resources: None,
        }
    }

    /// Engine with `options` and no plugins.
    pub fn new(surface: S, options: PosterOptions) -> PosterResult<Self> {
        Self::builder(surface).options(options).build()
    }

    /// Engine options.
    pub fn options(&self) -> &PosterOptions {
        &self.options
    }

    /// Device pixels per logical unit.
    pub fn ratio(&self) -> f64 {
        self.options.ratio
    }

    /// Borrow the surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutably borrow the surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Give the surface back.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Shared image cache.
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Statistics of the last successful render.
    pub fn stats(&self) -> pipeline::RenderStats {
        self.stats
    }

    /// Logical surface size.
    pub fn size(&self) -> (f64, f64) {
        let (w, h) = self.surface.size();
        (f64::from(w) / self.options.ratio, f64::from(h) / self.options.ratio)
    }

    // Layer list

    /// Append a layer.
    pub fn add_layer(&mut self, layer: impl Into<Layer>) {
        self.layers.push(layer.into());
    }

    /// Remove every layer with `id`; returns whether any was removed.
    pub fn remove_layer(&mut self, id: &str) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.id() != Some(id));
        self.layers.len() != before
    }

    /// Current layers, in z-order after the last render.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Direct access to the layer list.
    pub fn layers_mut(&mut self) -> &mut Vec<Layer> {
        &mut self.layers
    }

    /// First layer with `id`.
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == Some(id))
    }

    /// First layer with `id`, mutably.
    pub fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id() == Some(id))
    }

    /// Paint every layer onto the surface.
    ///
    /// See [`render_layers`](crate::render_layers) for ordering and failure behavior. Statistics
    /// are only updated when the render succeeds.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(layers = self.layers.len(), ratio = self.options.ratio)
    )]
    pub async fn render(&mut self) -> PosterResult<pipeline::RenderStats> {
        let stats = pipeline::render_layers(
            &mut self.surface,
            &mut self.layers,
            &mut self.plugins,
            &self.options,
            &self.resources,
        )
        .await?;
        self.stats = stats;
        Ok(stats)
    }

    // Layout

    fn targets<'a>(layers: &'a mut [Layer], ids: Option<&[&str]>) -> Vec<&'a mut Layer> {
        layers
            .iter_mut()
            .filter(|l| match ids {
                Some(ids) => l.id().is_some_and(|id| ids.contains(&id)),
                None => true,
            })
            .collect()
    }

    /// Align the layers with the given ids (all layers when `None`).
    pub fn align(&mut self, kind: AlignType, ids: Option<&[&str]>) {
        let (w, h) = self.size();
        let mut targets = Self::targets(&mut self.layers, ids);
        align(&mut self.surface, &mut targets, kind, w, h);
    }

    /// Evenly distribute the layers with the given ids (all layers when `None`).
    pub fn distribute(&mut self, axis: DistributeAxis, ids: Option<&[&str]>) {
        let mut targets = Self::targets(&mut self.layers, ids);
        distribute(&mut self.surface, &mut targets, axis);
    }

    /// Logical bounds of the layer with `id`.
    pub fn layer_bounds(&mut self, id: &str) -> Option<BoundingBox> {
        let layer = self.layers.iter().find(|l| l.id() == Some(id))?;
        Some(get_layer_bounds(&mut self.surface, layer))
    }

    /// Snap the layer with `id` against every other visible layer.
    pub fn snap_layer(&mut self, id: &str, threshold: f64) -> Option<SnapResult> {
        let index = self.layers.iter().position(|l| l.id() == Some(id))?;
        let active = get_layer_bounds(&mut self.surface, &self.layers[index]);
        let others: Vec<BoundingBox> = self
            .layers
            .iter()
            .enumerate()
            .filter(|(i, l)| *i != index && l.is_visible())
            .map(|(_, l)| get_layer_bounds(&mut self.surface, l))
            .collect();
        Some(get_snap_lines(&active, &others, threshold))
    }

    /// Id of the topmost hittable layer at a logical point.
    pub fn hit_test(&mut self, x: f64, y: f64) -> Option<String> {
        hit_test(&mut self.surface, &self.layers, x, y)
    }

    // Templates

    /// Register a template generator.
    pub fn register_template<F>(&mut self, name: impl Into<String>, template: F)
    where
        F: Fn(&Value) -> PosterResult<Vec<Layer>> + Send + Sync + 'static,
    {
        self.templates.register(name, template);
    }

    /// Register a JSON template.
    pub fn register_json_template(&mut self, name: impl Into<String>, template: JsonTemplate) {
        self.templates.register_json(name, template);
    }

    /// Instantiate a template; the layers are returned, not added.
    pub fn create_from_template(
        &self,
        name: &str,
        data: &Value,
        offset: Option<Offset>,
    ) -> PosterResult<Vec<Layer>> {
        self.templates.create(name, data, offset)
    }

    /// The template registry.
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// The template registry, mutably.
    pub fn templates_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.templates
    }

    // Plugins

    /// Initialize and attach a plugin. A failing `on_init` leaves it detached.
    pub fn use_plugin(&mut self, plugin: impl Plugin + 'static) -> PosterResult<()> {
        self.use_boxed_plugin(Box::new(plugin))
    }

    fn use_boxed_plugin(&mut self, mut plugin: Box<dyn Plugin>) -> PosterResult<()> {
        plugin.on_init(&mut self.surface, &self.options)?;
        tracing::debug!(plugin = plugin.name(), "plugin attached");
        self.plugins.push(plugin);
        Ok(())
    }

    /// Names of attached plugins, in hook order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    // Immediate drawing

    /// Draw a rectangle now, outside the layer list.
    pub fn draw_rect(&mut self, layer: &RectLayer) {
        shapes::draw_rect(&mut self.surface, layer, self.options.ratio, &self.resources);
    }

    /// Draw a circle now.
    pub fn draw_circle(&mut self, layer: &CircleLayer) {
        shapes::draw_circle(&mut self.surface, layer, self.options.ratio, &self.resources);
    }

    /// Draw a line now.
    pub fn draw_line(&mut self, layer: &LineLayer) {
        shapes::draw_line(&mut self.surface, layer, self.options.ratio, &self.resources);
    }

    /// Draw a polygon now.
    pub fn draw_polygon(&mut self, layer: &PolygonLayer) {
        shapes::draw_polygon(&mut self.surface, layer, self.options.ratio, &self.resources);
    }

    /// Draw text now; returns the number of wrapped lines beyond the first.
    pub fn draw_text(&mut self, layer: &TextLayer) -> usize {
        let ratio = self.options.ratio;
        if layer.rich_spans().is_some() {
            rich::draw_rich_text(&mut self.surface, layer, ratio, &self.resources)
        } else {
            layout::draw_text(&mut self.surface, layer, ratio, &self.resources)
        }
    }

    /// Load the layer's source through the cache, then draw it.
    pub async fn draw_image(&mut self, layer: &ImageLayer) -> PosterResult<()> {
        let decoded = self.resources.load(&layer.source).await?;
        self.draw_decoded_image(layer, &decoded);
        Ok(())
    }

    /// Draw an image layer with an already-decoded image, bypassing the cache.
    pub fn draw_decoded_image(&mut self, layer: &ImageLayer, decoded: &DecodedImage) {
        image::draw_image(
            &mut self.surface,
            layer,
            decoded,
            self.options.ratio,
            &self.resources,
        );
    }

    /// Generate and draw a QR code now.
    pub fn draw_qr_code(&mut self, layer: &QrCodeLayer) -> PosterResult<()> {
        qrcode::draw_qr_code(&mut self.surface, layer, self.options.ratio, &self.resources)
    }

    /// Wrap `text` the way a text layer with `typography` and `max_width` would, without drawing.
    pub fn wrap_text(
        &mut self,
        text: &str,
        typography: &Typography,
        max_width: Option<f64>,
        max_lines: Option<usize>,
    ) -> Vec<String> {
        let ratio = self.options.ratio;
        self.surface.save();
        self.surface
            .set_state(StateProp::Font(layout::build_font(typography, ratio)));
        let lines = layout::layout_lines(
            &mut self.surface,
            text,
            max_width.map(|w| scale_value(w, ratio)),
            max_lines,
        );
        self.surface.restore();
        lines
    }

    // Surface passthrough

    /// Resize to a logical size; the surface is cleared and its state reset.
    pub fn set_size(&mut self, width: f64, height: f64) -> PosterResult<()> {
        let w = scale_value(width, self.options.ratio).round();
        let h = scale_value(height, self.options.ratio).round();
        if !(w >= 1.0 && h >= 1.0 && w <= f64::from(u16::MAX) && h <= f64::from(u16::MAX)) {
            return Err(PosterError::validation(format!(
                "invalid poster size {width}x{height} at ratio {}",
                self.options.ratio
            )));
        }
        self.surface.set_size(w as u32, h as u32);
        Ok(())
    }

    /// Clear `[x, y, width, height]` in logical units, or every pixel when `rect` is `None`.
    pub fn clear(&mut self, rect: Option<[f64; 4]>) {
        match rect {
            Some([x, y, w, h]) => self
                .surface
                .clear_rect(shapes::scaled_rect(x, y, w, h, self.options.ratio)),
            None => self.surface.clear(),
        }
    }

    /// Push the surface state.
    pub fn save(&mut self) {
        self.surface.save();
    }

    /// Pop the surface state.
    pub fn restore(&mut self) {
        self.surface.restore();
    }

    /// Apply a transform step; an empty one is a no-op.
    pub fn transform(&mut self, transform: &TransformOptions) {
        if transform.is_empty() {
            return;
        }
        self.surface
            .concat_transform(transform.to_affine(self.options.ratio));
    }

    // Export

    /// Encoded pixels as a `data:` URL.
    pub fn export_data_url(&mut self, format: ExportFormat, quality: f64) -> PosterResult<String> {
        let data = export_image_data(&mut self.surface, None, self.options.ratio)?;
        to_data_url(&data, format, quality)
    }

    /// Encoded pixels as a blob.
    pub fn export_blob(&mut self, format: ExportFormat, quality: f64) -> PosterResult<Blob> {
        let data = export_image_data(&mut self.surface, None, self.options.ratio)?;
        to_blob(&data, format, quality)
    }

    /// Raw pixels of a logical `[x, y, width, height]` rectangle, or of the whole surface.
    pub fn export_image_data(&mut self, rect: Option<[f64; 4]>) -> PosterResult<ImageData> {
        export_image_data(&mut self.surface, rect, self.options.ratio)
    }
}

#[cfg(test)]
#[path = "../tests/unit/poster.rs"]
mod tests;
