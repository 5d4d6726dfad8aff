use std::sync::Arc;

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::{
    error::{PosterError, PosterResult},
    math::premultiply_rgba8_in_place,
};

/// Decoded raster image in premultiplied RGBA8, cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 pixels.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Wrap straight-alpha RGBA8 pixels, premultiplying them.
    pub fn from_rgba8(width: u32, height: u32, mut rgba8: Vec<u8>) -> PosterResult<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba8.len() != expected {
            return Err(PosterError::validation(format!(
                "image buffer has {} bytes, expected {expected} for {width}x{height}",
                rgba8.len()
            )));
        }
        premultiply_rgba8_in_place(&mut rgba8);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8),
        })
    }

    /// Single-color image.
    pub fn solid(width: u32, height: u32, rgba8: [u8; 4]) -> Self {
        let mut px = rgba8.repeat(width as usize * height as usize);
        premultiply_rgba8_in_place(&mut px);
        Self {
            width,
            height,
            rgba8_premul: Arc::new(px),
        }
    }

    /// Whether both handles share the same pixel buffer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rgba8_premul, &other.rgba8_premul)
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> PosterResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Payload bytes of a `data:` URL, or `None` when `src` is not one.
pub fn parse_data_url(src: &str) -> Option<PosterResult<Vec<u8>>> {
    let rest = src.strip_prefix("data:")?;
    let Some((meta, payload)) = rest.split_once(',') else {
        return Some(Err(PosterError::validation(
            "data url is missing the ',' separator",
        )));
    };
    if meta.split(';').any(|p| p.eq_ignore_ascii_case("base64")) {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .context("decode base64 data url payload")
            .map_err(PosterError::from);
        return Some(bytes);
    }
    Some(Ok(percent_decode(payload)))
}

fn percent_decode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(v) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(v);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
