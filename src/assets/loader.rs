use std::{
    future::Future,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use futures::future::{BoxFuture, FutureExt as _};

use crate::{
    assets::decode::{DecodedImage, decode_image, parse_data_url},
    foundation::error::{PosterError, PosterResult},
};

/// Environment variable overriding the root used by [`FsImageLoader::from_env`].
pub const IMAGE_ROOT_ENV: &str = "DRAWPOSTER_IMAGE_ROOT";

/// Turns a source key into a decoded image, asynchronously.
///
/// Closures of the shape `Fn(&str) -> impl Future<Output = PosterResult<DecodedImage>>` implement
/// this trait, which keeps test doubles short.
pub trait ImageLoader: Send + Sync {
    /// Start loading `src`.
    fn load(&self, src: &str) -> BoxFuture<'static, PosterResult<DecodedImage>>;
}

impl<F, Fut> ImageLoader for F
where
    F: Fn(&str) -> Fut + Send + Sync,
    Fut: Future<Output = PosterResult<DecodedImage>> + Send + 'static,
{
    fn load(&self, src: &str) -> BoxFuture<'static, PosterResult<DecodedImage>> {
        (self)(src).boxed()
    }
}

/// Loads `data:` URLs and files relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsImageLoader {
    root: PathBuf,
}

impl FsImageLoader {
    /// Loader resolving relative paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loader rooted at `$DRAWPOSTER_IMAGE_ROOT`, or the working directory when unset.
    pub fn from_env() -> Self {
        let root = std::env::var(IMAGE_ROOT_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| ".".to_owned());
        Self::new(root)
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for FsImageLoader {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ImageLoader for FsImageLoader {
    fn load(&self, src: &str) -> BoxFuture<'static, PosterResult<DecodedImage>> {
        let src = src.to_owned();
        let root = self.root.clone();
        async move {
            if let Some(bytes) = parse_data_url(&src) {
                return decode_image(&bytes?);
            }
            if src.contains("://") {
                return Err(PosterError::validation(format!(
                    "unsupported image source scheme: {src}"
                )));
            }
            let rel = normalize_rel_path(&src)?;
            let path = root.join(&rel);
            let bytes = std::fs::read(&path)
                .with_context(|| format!("read image file {}", path.display()))?;
            decode_image(&bytes)
        }
        .boxed()
    }
}

/// Normalize a relative source path: forward slashes, no `.`/`..` segments, not absolute.
pub fn normalize_rel_path(source: &str) -> PosterResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PosterError::validation("image paths must be relative"));
    }
    if s.is_empty() {
        return Err(PosterError::validation("image path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PosterError::validation("image paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PosterError::validation(
            "image path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
