//! Raster encoding of surface pixels.

use std::{fmt, str::FromStr};

use anyhow::Context as _;
use base64::Engine as _;
use image::{ExtendedColorType, ImageEncoder as _};

use crate::{
    foundation::{
        core::Rect,
        error::{PosterError, PosterResult},
    },
    style::resolve::scale_value,
    surface::{ImageData, Surface},
};

/// Output encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Lossless, keeps alpha.
    #[default]
    Png,
    /// Lossy; transparent pixels come out black.
    Jpeg,
}

impl ExportFormat {
    /// MIME type used in data URLs and blobs.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Format for a MIME type, falling back to PNG for anything unsupported.
    pub fn from_mime(mime: &str) -> Self {
        mime.parse().unwrap_or_else(|_| {
            tracing::debug!(mime, "unsupported export type; using png");
            Self::Png
        })
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

impl FromStr for ExportFormat {
    type Err = PosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image/png" | "png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" | "jpeg" | "jpg" => Ok(Self::Jpeg),
            other => Err(PosterError::validation(format!(
                "unsupported export type \"{other}\""
            ))),
        }
    }
}

/// Encoded image bytes tagged with their MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    /// MIME type.
    pub mime: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
}

/// Map a `0..=1` quality to the encoder's `1..=100`; non-finite values mean best quality.
pub fn jpeg_quality(quality: f64) -> u8 {
    if !quality.is_finite() {
        return 100;
    }
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode straight-alpha pixels. `quality` only affects JPEG.
pub fn encode_image(data: &ImageData, format: ExportFormat, quality: f64) -> PosterResult<Vec<u8>> {
    let expected = data.width as usize * data.height as usize * 4;
    if data.data.len() != expected || data.width == 0 || data.height == 0 {
        return Err(PosterError::export(format!(
            "cannot encode {}x{} image from {} bytes",
            data.width,
            data.height,
            data.data.len()
        )));
    }

    let mut out = Vec::new();
    match format {
        ExportFormat::Png => {
            image::codecs::png::PngEncoder::new(&mut out)
                .write_image(&data.data, data.width, data.height, ExtendedColorType::Rgba8)
                .context("encode png")?;
        }
        ExportFormat::Jpeg => {
            let rgb: Vec<u8> = data
                .data
                .chunks_exact(4)
                .flat_map(|px| {
                    let a = u16::from(px[3]);
                    [0, 1, 2].map(|i| ((u16::from(px[i]) * a + 127) / 255) as u8)
                })
                .collect();
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, jpeg_quality(quality))
                .write_image(&rgb, data.width, data.height, ExtendedColorType::Rgb8)
                .context("encode jpeg")?;
        }
    }
    Ok(out)
}

/// `data:<mime>;base64,…` URL of the encoded pixels.
pub fn to_data_url(data: &ImageData, format: ExportFormat, quality: f64) -> PosterResult<String> {
    let bytes = encode_image(data, format, quality)?;
    Ok(format!(
        "data:{};base64,{}",
        format.mime(),
        base64::engine::general_purpose::STANDARD.encode(bytes)
    ))
}

/// Encoded pixels as a [`Blob`].
pub fn to_blob(data: &ImageData, format: ExportFormat, quality: f64) -> PosterResult<Blob> {
    Ok(Blob {
        mime: format.mime().to_owned(),
        bytes: encode_image(data, format, quality)?,
    })
}

/// Read back a logical `[x, y, width, height]` rectangle scaled by `ratio`, or the whole surface.
pub fn export_image_data(
    surface: &mut dyn Surface,
    rect: Option<[f64; 4]>,
    ratio: f64,
) -> PosterResult<ImageData> {
    let device = match rect {
        Some([x, y, w, h]) => Rect::from_origin_size(
            (scale_value(x, ratio), scale_value(y, ratio)),
            (scale_value(w, ratio), scale_value(h, ratio)),
        ),
        None => {
            let (w, h) = surface.size();
            Rect::new(0.0, 0.0, f64::from(w), f64::from(h))
        }
    };
    surface.read_pixels(device)
}

#[cfg(test)]
#[path = "../tests/unit/export.rs"]
mod tests;
