use std::fmt;

use serde_json::Value;

use crate::{
    foundation::{
        core::Offset,
        error::{PosterError, PosterResult},
    },
    layout::bounds::move_layer,
    model::layer::Layer,
    template::json::JsonTemplate,
};

/// Generator mapping template data to a fresh layer list.
pub type TemplateFn = Box<dyn Fn(&Value) -> PosterResult<Vec<Layer>> + Send + Sync>;

/// Named templates, kept in registration order.
#[derive(Default)]
pub struct TemplateRegistry {
    templates: Vec<(String, TemplateFn)>,
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl TemplateRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `template` under `name`, replacing any previous one in place.
    pub fn register<F>(&mut self, name: impl Into<String>, template: F)
    where
        F: Fn(&Value) -> PosterResult<Vec<Layer>> + Send + Sync + 'static,
    {
        let name = name.into();
        let template: TemplateFn = Box::new(template);
        match self.templates.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = template,
            None => self.templates.push((name, template)),
        }
    }

    /// Register a compiled JSON template under `name`.
    pub fn register_json(&mut self, name: impl Into<String>, template: JsonTemplate) {
        self.register(name, move |data| template.instantiate(data));
    }

    /// Whether `name` is registered.
    pub fn has(&self, name: &str) -> bool {
        self.templates.iter().any(|(n, _)| n == name)
    }

    /// Drop `name`; unknown names are ignored.
    pub fn unregister(&mut self, name: &str) {
        self.templates.retain(|(n, _)| n != name);
    }

    /// Registered names, oldest first.
    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Run `name` on `data`, then shift every produced layer by `offset`.
    ///
    /// Masks are not shifted.
    pub fn create(
        &self,
        name: &str,
        data: &Value,
        offset: Option<Offset>,
    ) -> PosterResult<Vec<Layer>> {
        let (_, template) = self
            .templates
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| PosterError::UnknownTemplate(name.to_owned()))?;
        let mut layers = template(data)?;
        apply_layer_offset(&mut layers, offset.unwrap_or_default());
        Ok(layers)
    }
}

/// Shift every layer's coordinates; a zero offset touches nothing.
pub fn apply_layer_offset(layers: &mut [Layer], offset: Offset) {
    if offset.is_zero() {
        return;
    }
    for layer in layers {
        move_layer(layer, offset.x, offset.y);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/registry.rs"]
mod tests;
