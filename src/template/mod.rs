//! Reusable layer generators.

pub(crate) mod json;
pub(crate) mod registry;
