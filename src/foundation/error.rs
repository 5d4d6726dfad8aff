/// Convenience result type used across drawposter.
pub type PosterResult<T> = Result<T, PosterError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum PosterError {
    /// Invalid user-provided options or layer data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A template was requested by a name nobody registered.
    #[error("template \"{0}\" is not registered")]
    UnknownTemplate(String),

    /// An image source could not be fetched or decoded.
    #[error("failed to load image \"{src}\": {reason}")]
    ImageLoad {
        /// Source key the load was requested for.
        src: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// QR code generation failed (usually the payload is too long).
    #[error("qr code error: {0}")]
    QrCode(String),

    /// Raster readback or encoding failed.
    #[error("export error: {0}")]
    Export(String),

    /// A plugin hook reported a failure.
    #[error("plugin error: {0}")]
    Plugin(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PosterError {
    /// Build a [`PosterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PosterError::ImageLoad`] value.
    pub fn image_load(src: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ImageLoad {
            src: src.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`PosterError::QrCode`] value.
    pub fn qr_code(msg: impl Into<String>) -> Self {
        Self::QrCode(msg.into())
    }

    /// Build a [`PosterError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`PosterError::Plugin`] value.
    pub fn plugin(msg: impl Into<String>) -> Self {
        Self::Plugin(msg.into())
    }

    /// Build a [`PosterError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for PosterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
