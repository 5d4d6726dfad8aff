use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

use futures::future::{BoxFuture, FutureExt as _, Shared};

use crate::{
    assets::{
        decode::DecodedImage,
        loader::{FsImageLoader, ImageLoader},
    },
    foundation::error::{PosterError, PosterResult},
};

type SharedLoad = Shared<BoxFuture<'static, Result<DecodedImage, String>>>;

struct Inner {
    loader: Arc<dyn ImageLoader>,
    cache: Mutex<HashMap<String, DecodedImage>>,
    pending: Mutex<HashMap<String, (u64, SharedLoad)>>,
    next_load_id: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Decoded-image cache keyed by source string.
///
/// Concurrent [`ResourceManager::load`] calls for the same key share one in-flight load, so the
/// underlying [`ImageLoader`] runs once per key until the entry is evicted with
/// [`ResourceManager::clear`]. Failed loads are not cached; the next call retries. Clones share the
/// same cache.
#[derive(Clone)]
pub struct ResourceManager {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = self.pending_len();
        let cached = self.cached_len();
        f.debug_struct("ResourceManager")
            .field("cached", &cached)
            .field("pending", &pending)
            .finish()
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new(FsImageLoader::from_env())
    }
}

impl ResourceManager {
    /// Manager backed by `loader`.
    pub fn new(loader: impl ImageLoader + 'static) -> Self {
        Self::with_loader(Arc::new(loader))
    }

    /// Manager backed by a shared loader.
    pub fn with_loader(loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            inner: Arc::new(Inner {
                loader,
                cache: Mutex::new(HashMap::new()),
                pending: Mutex::new(HashMap::new()),
                next_load_id: AtomicU64::new(0),
            }),
        }
    }

    /// Load `src`, reusing the cached image or an in-flight load for the same key.
    pub async fn load(&self, src: &str) -> PosterResult<DecodedImage> {
        if let Some(img) = self.get(src) {
            tracing::trace!(src, "image cache hit");
            return Ok(img);
        }

        let load = {
            let mut pending = lock(&self.inner.pending);
            match pending.get(src) {
                Some((_, fut)) => {
                    tracing::debug!(src, "joining in-flight image load");
                    fut.clone()
                }
                None => {
                    if let Some(img) = self.get(src) {
                        return Ok(img);
                    }
                    tracing::debug!(src, "starting image load");
                    let id = self.inner.next_load_id.fetch_add(1, Ordering::Relaxed);
                    let fut = self.start_load(src, id);
                    pending.insert(src.to_owned(), (id, fut.clone()));
                    fut
                }
            }
        };

        load.await
            .map_err(|reason| PosterError::image_load(src, reason))
    }

    fn start_load(&self, src: &str, id: u64) -> SharedLoad {
        let raw = self.inner.loader.load(src);
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let key = src.to_owned();
        async move {
            let res = raw.await;
            let Some(inner) = inner.upgrade() else {
                return res.map_err(|e| failure_reason(&e));
            };
            let mut pending = lock(&inner.pending);
            let current = pending.get(&key).is_some_and(|(pid, _)| *pid == id);
            if current {
                pending.remove(&key);
            }
            match res {
                Ok(img) => {
                    if current {
                        lock(&inner.cache).insert(key, img.clone());
                    } else {
                        tracing::debug!(src = %key, "image evicted while loading; not cached");
                    }
                    Ok(img)
                }
                Err(err) => {
                    tracing::debug!(src = %key, error = %err, "image load failed");
                    Err(failure_reason(&err))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Load every source and wait for all of them.
    pub async fn preload<I, S>(&self, srcs: I) -> PosterResult<Vec<DecodedImage>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = srcs.into_iter().map(|s| s.as_ref().to_owned()).collect();
        futures::future::try_join_all(keys.iter().map(|k| self.load(k))).await
    }

    /// Cached image for `src`, without loading.
    pub fn get(&self, src: &str) -> Option<DecodedImage> {
        lock(&self.inner.cache).get(src).cloned()
    }

    /// Evict one key (cache and in-flight entry) or everything.
    pub fn clear(&self, src: Option<&str>) {
        let mut pending = lock(&self.inner.pending);
        let mut cache = lock(&self.inner.cache);
        match src {
            Some(src) => {
                cache.remove(src);
                pending.remove(src);
            }
            None => {
                cache.clear();
                pending.clear();
            }
        }
    }

    /// Number of cached images.
    pub fn cached_len(&self) -> usize {
        lock(&self.inner.cache).len()
    }

    /// Number of loads currently in flight.
    pub fn pending_len(&self) -> usize {
        lock(&self.inner.pending).len()
    }
}

fn failure_reason(err: &PosterError) -> String {
    match err {
        PosterError::ImageLoad { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
