use crate::{
    foundation::error::PosterResult, model::layer::Layer, poster::PosterOptions, surface::Surface,
};

/// Lifecycle listener attached to a [`DrawPoster`](crate::DrawPoster).
///
/// Every hook is optional. Hooks run in registration order and an `Err` from any of them is not
/// caught: it aborts the construction, `use_plugin` call, or render that invoked it.
pub trait Plugin {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Called once, when the plugin is attached.
    fn on_init(&mut self, _surface: &mut dyn Surface, _options: &PosterOptions) -> PosterResult<()> {
        Ok(())
    }

    /// Called after sorting and before the surface is cleared.
    fn before_draw(
        &mut self,
        _surface: &mut dyn Surface,
        _layers: &[Layer],
        _options: &PosterOptions,
    ) -> PosterResult<()> {
        Ok(())
    }

    /// Called after every layer and overlay has been drawn.
    fn after_draw(
        &mut self,
        _surface: &mut dyn Surface,
        _layers: &[Layer],
        _options: &PosterOptions,
    ) -> PosterResult<()> {
        Ok(())
    }
}
