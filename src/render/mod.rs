//! Per-variant renderers and the render loop that drives them.

pub(crate) mod debug;
pub(crate) mod image;
pub(crate) mod mask;
pub(crate) mod pipeline;
pub(crate) mod qrcode;
pub(crate) mod shapes;
