pub(crate) mod align;
pub(crate) mod bounds;
pub(crate) mod snap;
