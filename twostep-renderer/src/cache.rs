//! Resolution cache: remembers which file a template name resolved to.
//!
//! One JSON [`CacheEntry`] per (search path, template name) pair, stored at
//! `<cache_dir>/<key[0..2]>/<key>.json` where `key` is the SHA-256 hex digest
//! of the loader's search directories and the template name. Writes use the
//! atomic `.tmp` + rename pattern.
//!
//! An entry is fresh only while the file it points at still exists with the
//! same modification time and no earlier search directory holds the name. Cache faults never fail a render: they are logged
//! and treated as a miss.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{io_err, RenderError};

/// On-disk cache entry payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    /// Normalised template name.
    pub name: String,
    /// File the name resolved to.
    pub path: PathBuf,
    /// Modification time of `path` (Unix milliseconds) when cached.
    pub modified_ms: u64,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionCache {
    dir: PathBuf,
}

impl ResolutionCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        ResolutionCache { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key for `name` looked up through `search_dirs` (order matters).
    pub fn key(search_dirs: &[PathBuf], name: &str) -> String {
        let mut h = Sha256::new();
        for dir in search_dirs {
            h.update(dir.to_string_lossy().as_bytes());
            h.update([0u8]);
        }
        h.update(name.as_bytes());
        hex::encode(h.finalize())
    }

    /// `<cache_dir>/<key[0..2]>/<key>.json`. No I/O.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        let shard = key.get(..2).unwrap_or(key);
        self.dir.join(shard).join(format!("{key}.json"))
    }

    /// Load the entry for `key`. Returns `None` if it does not exist.
    pub fn load(&self, key: &str) -> Result<Option<CacheEntry>, RenderError> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Save the entry for `key` atomically.
    pub fn save(&self, key: &str, entry: &CacheEntry) -> Result<(), RenderError> {
        let path = self.entry_path(key);
        let Some(dir) = path.parent() else {
            return Err(io_err(path, std::io::Error::other("invalid cache entry path")));
        };
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

        let json = serde_json::to_string_pretty(entry)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&path, e));
        }
        Ok(())
    }

    /// The cached file for `name`, if the entry is present and still fresh.
    pub fn lookup(&self, search_dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
        let key = Self::key(search_dirs, name);
        let entry = match self.load(&key) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(template = name, error = %err, "ignoring unreadable cache entry");
                return None;
            }
        };
        if entry.name != name || modified_ms(&entry.path) != Some(entry.modified_ms) {
            tracing::debug!(template = name, "stale cache entry");
            return None;
        }
        // A file added to a higher-priority directory since the entry was
        // written shadows the cached one.
        let Some(position) = search_dirs.iter().position(|d| entry.path.starts_with(d)) else {
            tracing::debug!(template = name, "cache entry outside search directories");
            return None;
        };
        if search_dirs[..position].iter().any(|d| d.join(name).is_file()) {
            tracing::debug!(template = name, "cached template is now shadowed");
            return None;
        }
        tracing::debug!(template = name, path = %entry.path.display(), "cache hit");
        Some(entry.path)
    }

    /// Record that `name` resolved to `path`.
    pub fn store(&self, search_dirs: &[PathBuf], name: &str, path: &Path) {
        let Some(modified) = modified_ms(path) else {
            return;
        };
        let entry = CacheEntry {
            name: name.to_string(),
            path: path.to_path_buf(),
            modified_ms: modified,
            cached_at: Utc::now(),
        };
        let key = Self::key(search_dirs, name);
        if let Err(err) = self.save(&key, &entry) {
            tracing::warn!(template = name, error = %err, "failed to write cache entry");
        }
    }

    /// Remove every cache entry. Returns the number of entries removed.
    pub fn clear(&self) -> Result<usize, RenderError> {
        if !self.dir.exists() {
            return Ok(0);
        }
        let mut removed = 0;
        let shards = std::fs::read_dir(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        for shard in shards {
            let shard = shard.map_err(|e| io_err(&self.dir, e))?.path();
            if !shard.is_dir() {
                continue;
            }
            let entries = std::fs::read_dir(&shard).map_err(|e| io_err(&shard, e))?;
            for entry in entries {
                let path = entry.map_err(|e| io_err(&shard, e))?.path();
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                if name.ends_with(".json") || name.ends_with(".json.tmp") {
                    std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
                    if name.ends_with(".json") {
                        removed += 1;
                    }
                }
            }
            // Leave shards holding foreign files in place.
            let _ = std::fs::remove_dir(&shard);
        }
        Ok(removed)
    }
}

/// Modification time of `path` in Unix milliseconds, if it can be read.
pub(crate) fn modified_ms(path: &Path) -> Option<u64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let since = modified.duration_since(UNIX_EPOCH).ok()?;
    u64::try_from(since.as_millis()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn template(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn key_depends_on_search_order_and_name() {
        let a = PathBuf::from("/a");
        let b = PathBuf::from("/b");
        let k1 = ResolutionCache::key(&[a.clone(), b.clone()], "index.html");
        let k2 = ResolutionCache::key(&[b, a.clone()], "index.html");
        let k3 = ResolutionCache::key(&[a], "other.html");
        assert_eq!(k1.len(), 64);
        assert_ne!(k1, k2);
        assert_ne!(k1, k3);
    }

    #[test]
    fn entry_path_is_sharded_by_key_prefix() {
        let cache = ResolutionCache::new("/cache");
        let path = cache.entry_path("abcdef");
        assert_eq!(path, PathBuf::from("/cache/ab/abcdef.json"));
    }

    #[test]
    fn store_then_lookup_hits() {
        let tmp = TempDir::new().unwrap();
        let tpl = template(tmp.path(), "index.html", "hi");
        let cache = ResolutionCache::new(tmp.path().join("cache"));
        let dirs = vec![tmp.path().to_path_buf()];

        assert_eq!(cache.lookup(&dirs, "index.html"), None);
        cache.store(&dirs, "index.html", &tpl);
        assert_eq!(cache.lookup(&dirs, "index.html"), Some(tpl));
    }

    #[test]
    fn removed_file_makes_entry_stale() {
        let tmp = TempDir::new().unwrap();
        let tpl = template(tmp.path(), "gone.html", "bye");
        let cache = ResolutionCache::new(tmp.path().join("cache"));
        let dirs = vec![tmp.path().to_path_buf()];

        cache.store(&dirs, "gone.html", &tpl);
        std::fs::remove_file(&tpl).unwrap();
        assert_eq!(cache.lookup(&dirs, "gone.html"), None);
    }

    #[test]
    fn modified_file_makes_entry_stale() {
        let tmp = TempDir::new().unwrap();
        let tpl = template(tmp.path(), "edit.html", "v1");
        let cache = ResolutionCache::new(tmp.path().join("cache"));
        let dirs = vec![tmp.path().to_path_buf()];

        cache.store(&dirs, "edit.html", &tpl);
        let later = filetime::FileTime::from_unix_time(2_000_000_000, 0);
        filetime::set_file_mtime(&tpl, later).unwrap();
        assert_eq!(cache.lookup(&dirs, "edit.html"), None);
    }

    #[test]
    fn file_added_to_earlier_dir_shadows_entry() {
        let tmp = TempDir::new().unwrap();
        let app = tmp.path().join("app");
        let plugin = tmp.path().join("plugin");
        std::fs::create_dir_all(&app).unwrap();
        std::fs::create_dir_all(&plugin).unwrap();
        let tpl = template(&plugin, "x.html", "plugin");
        let cache = ResolutionCache::new(tmp.path().join("cache"));
        let dirs = vec![app.clone(), plugin];

        cache.store(&dirs, "x.html", &tpl);
        assert_eq!(cache.lookup(&dirs, "x.html"), Some(tpl));

        template(&app, "x.html", "app");
        assert_eq!(cache.lookup(&dirs, "x.html"), None);
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = ResolutionCache::new(tmp.path().join("cache"));
        let dirs = vec![tmp.path().to_path_buf()];
        let key = ResolutionCache::key(&dirs, "broken.html");
        let path = cache.entry_path(&key);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        assert!(cache.load(&key).is_err());
        assert_eq!(cache.lookup(&dirs, "broken.html"), None);
    }

    #[test]
    fn clear_removes_entries_and_counts_them() {
        let tmp = TempDir::new().unwrap();
        let a = template(tmp.path(), "a.html", "a");
        let b = template(tmp.path(), "b.html", "b");
        let cache = ResolutionCache::new(tmp.path().join("cache"));
        let dirs = vec![tmp.path().to_path_buf()];
        cache.store(&dirs, "a.html", &a);
        cache.store(&dirs, "b.html", &b);

        assert_eq!(cache.clear().unwrap(), 2);
        assert_eq!(cache.lookup(&dirs, "a.html"), None);
        assert_eq!(cache.clear().unwrap(), 0);
    }

    #[test]
    fn clear_on_missing_dir_is_noop() {
        let tmp = TempDir::new().unwrap();
        let cache = ResolutionCache::new(tmp.path().join("never-created"));
        assert_eq!(cache.clear().unwrap(), 0);
    }
}
