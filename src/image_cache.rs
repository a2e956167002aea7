//! Asset cache for fast folder rescans.
//!
//! Every change to the folder set rescans all folders. Assets whose file is
//! unchanged since the last read are served from an LRU cache instead of
//! being read and encoded again.

use crate::config::MAX_ASSET_CACHE_CAPACITY;
use crate::image_loader::{self, ImageAsset};
use lru::LruCache;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Identifies one version of a file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        Some(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// LRU cache for storing read assets.
pub struct AssetCache {
    cache: LruCache<PathBuf, (FileStamp, ImageAsset)>,
}

impl AssetCache {
    /// Creates a new asset cache with the specified capacity.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Returns the asset for `path`, reading the file only when it is not
    /// cached or has changed since it was cached. Failures are logged and
    /// yield `None`.
    pub fn load(&mut self, path: &Path) -> Option<ImageAsset> {
        let stamp = FileStamp::of(path);

        if let Some(stamp) = stamp {
            if let Some((cached_stamp, asset)) = self.cache.get(path) {
                if *cached_stamp == stamp {
                    log::debug!("Cache HIT: {}", path.display());
                    return Some(asset.clone());
                }
            }
        }
        log::debug!("Cache MISS: {}", path.display());

        let asset = image_loader::try_load_asset(path)?;
        match stamp {
            Some(stamp) => {
                self.cache.put(path.to_path_buf(), (stamp, asset.clone()));
            }
            None => {
                self.cache.pop(path);
            }
        }
        Some(asset)
    }

    /// Grows the cache so `entries` assets fit at once, up to
    /// [`MAX_ASSET_CACHE_CAPACITY`]. Never shrinks it.
    ///
    /// Rescans visit files in the same order every time; a cache smaller
    /// than the scan would evict each entry just before it is needed again.
    pub fn ensure_capacity(&mut self, entries: usize) {
        let wanted = entries.min(MAX_ASSET_CACHE_CAPACITY);
        if wanted > self.cache.cap().get() {
            if let Some(cap) = NonZeroUsize::new(wanted) {
                log::debug!("Growing asset cache to {}", cap);
                self.cache.resize(cap);
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }

    /// Drops every cached asset.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Checks if an asset is in the cache.
    pub fn contains(&self, path: &Path) -> bool {
        self.cache.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn second_load_is_served_from_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        fs::write(&path, b"one").unwrap();

        let mut cache = AssetCache::new(4);
        assert!(!cache.contains(&path));
        let first = cache.load(&path).unwrap();
        assert!(cache.contains(&path));
        assert_eq!(cache.load(&path), Some(first));
    }

    #[test]
    fn changed_file_is_read_again() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.png");
        fs::write(&path, b"one").unwrap();

        let mut cache = AssetCache::new(4);
        let first = cache.load(&path).unwrap();
        fs::write(&path, b"longer contents").unwrap();
        let second = cache.load(&path).unwrap();
        assert_ne!(first.data, second.data);
    }

    #[test]
    fn unreadable_file_is_not_cached() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.png");

        let mut cache = AssetCache::new(4);
        assert!(cache.load(&path).is_none());
        assert!(!cache.contains(&path));
    }

    #[test]
    fn rescans_larger_than_capacity_stay_cached() {
        let dir = tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..5)
            .map(|i| {
                let path = dir.path().join(format!("{i}.png"));
                fs::write(&path, format!("image {i}")).unwrap();
                path
            })
            .collect();

        let mut cache = AssetCache::new(4);
        cache.ensure_capacity(paths.len());
        assert_eq!(cache.capacity(), 5);

        for path in &paths {
            cache.load(path).unwrap();
        }
        for path in &paths {
            assert!(cache.contains(path), "{} evicted", path.display());
            cache.load(path).unwrap();
        }
        assert!(paths.iter().all(|path| cache.contains(path)));
    }

    #[test]
    fn capacity_never_shrinks_or_exceeds_limit() {
        let mut cache = AssetCache::new(16);
        cache.ensure_capacity(3);
        assert_eq!(cache.capacity(), 16);
        cache.ensure_capacity(MAX_ASSET_CACHE_CAPACITY + 1);
        assert_eq!(cache.capacity(), MAX_ASSET_CACHE_CAPACITY);
    }

    #[test]
    fn clear_empties_the_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.gif");
        fs::write(&path, b"gif").unwrap();

        let mut cache = AssetCache::new(1);
        cache.load(&path);
        cache.clear();
        assert!(!cache.contains(&path));
    }
}
