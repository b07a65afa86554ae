//! Shared cache of loaded clips keyed by source path.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::debug;

use crate::clip::{Clip, EventRegistry};
use crate::format::decode_clip;
use crate::util::{Error, Result};

/// How [`ClipCache::load`] uses the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Return a cached clip instead of parsing when one exists.
    pub allow_from_cache: bool,
    /// Store a freshly parsed clip.
    pub save_to_cache: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            allow_from_cache: true,
            save_to_cache: true,
        }
    }
}

impl LoadOptions {
    /// Always parse, never touch the cache.
    pub const UNCACHED: Self = Self {
        allow_from_cache: false,
        save_to_cache: false,
    };
}

/// Thread-safe clip cache.
///
/// Loading checks, then parses without holding the lock, then inserts. Two
/// threads loading the same path may both parse; the later insert wins.
/// A failed parse never touches the cache.
pub struct ClipCache {
    clips: RwLock<HashMap<PathBuf, Arc<Clip>>>,
    registry: EventRegistry,
}

impl ClipCache {
    /// Create an empty cache decoding events with the built-in registry.
    pub fn new() -> Self {
        Self::with_registry(EventRegistry::default())
    }

    /// Create an empty cache decoding events with `registry`.
    pub fn with_registry(registry: EventRegistry) -> Self {
        Self {
            clips: RwLock::new(HashMap::new()),
            registry,
        }
    }

    #[inline]
    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Load a clip from `path`.
    pub fn load(&self, path: impl AsRef<Path>, options: LoadOptions) -> Result<Arc<Clip>> {
        let path = path.as_ref();
        if options.allow_from_cache {
            if let Some(clip) = self.get(path) {
                return Ok(clip);
            }
        }

        let clip = Arc::new(load_file(path, &self.registry)?);
        if options.save_to_cache {
            self.clips.write().insert(path.to_path_buf(), Arc::clone(&clip));
        }
        Ok(clip)
    }

    /// Parse `path` again and replace any cached entry.
    pub fn reload(&self, path: impl AsRef<Path>) -> Result<Arc<Clip>> {
        self.load(
            path,
            LoadOptions {
                allow_from_cache: false,
                save_to_cache: true,
            },
        )
    }

    /// Load many clips in parallel, with default options.
    ///
    /// Duplicate paths are loaded once. Results follow the order of first
    /// appearance.
    pub fn load_many<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<(PathBuf, Result<Arc<Clip>>)> {
        let mut distinct: Vec<PathBuf> = Vec::with_capacity(paths.len());
        for p in paths {
            let p = p.as_ref();
            if !distinct.iter().any(|d| d == p) {
                distinct.push(p.to_path_buf());
            }
        }
        distinct
            .into_par_iter()
            .map(|path| {
                let result = self.load(&path, LoadOptions::default());
                (path, result)
            })
            .collect()
    }

    /// Cached clip for `path`, if any.
    #[inline]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Arc<Clip>> {
        self.clips.read().get(path.as_ref()).map(Arc::clone)
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.clips.read().contains_key(path.as_ref())
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> Option<Arc<Clip>> {
        self.clips.write().remove(path.as_ref())
    }

    /// Drop every cached clip.
    pub fn clear(&self) {
        self.clips.write().clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.clips.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ClipCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClipCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipCache").field("len", &self.len()).finish()
    }
}

/// Read and decode one clip file, bypassing any cache.
pub fn load_file(path: &Path, registry: &EventRegistry) -> Result<Clip> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path.to_path_buf())
        } else {
            Error::Io(e)
        }
    })?;
    let size = file.metadata()?.len();
    debug!(path = %path.display(), size, "loading clip");
    decode_file(file, size, registry)
}

#[cfg(feature = "mmap")]
fn decode_file(file: File, size: u64, registry: &EventRegistry) -> Result<Clip> {
    if size == 0 {
        return decode_clip(&[], registry);
    }
    // Safety: the file is opened read-only and the map is dropped before returning.
    let mmap = unsafe { memmap2::Mmap::map(&file) }?;
    decode_clip(&mmap, registry)
}

#[cfg(not(feature = "mmap"))]
fn decode_file(mut file: File, size: u64, registry: &EventRegistry) -> Result<Clip> {
    use std::io::Read;
    let mut bytes = Vec::with_capacity(size as usize);
    file.read_to_end(&mut bytes)?;
    decode_clip(&bytes, registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let cache = ClipCache::new();
        let err = cache.load("/definitely/not/here.anim", LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_default_options() {
        let opts = LoadOptions::default();
        assert!(opts.allow_from_cache && opts.save_to_cache);
        assert!(!LoadOptions::UNCACHED.allow_from_cache);
    }
}
