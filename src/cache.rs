//! The persisted modification-time cache.
//!
//! One line per tracked file, in the form `"<path>" <mtime>`. The cache is
//! loaded once per build session, mutated in memory as files are found stale,
//! and written back once after compilation. Paths are compared byte-for-byte
//! with no canonicalization, so `./a.c` and `a.c` are distinct entries.
//! Concurrent sessions racing on the same file are unsupported; the last
//! writer wins.

use crate::fsutil;
use anyhow::{Context, Result, bail};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub const CACHE_FILE: &str = ".chisel_cache";

#[derive(Debug)]
struct CacheEntry {
    path: String,
    mtime: i64,
}

#[derive(Debug, Default)]
pub struct BuildCache {
    entries: Vec<CacheEntry>,
}

impl BuildCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the cache from `file`. A missing file is an empty cache; a line
    /// that does not start with `"` or has no closing `"` fails the whole
    /// load, since a half-parsed cache would silently drop entries.
    pub fn load(file: &Path) -> Result<Self> {
        let mut cache = Self::new();

        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(cache),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read build cache '{}'", file.display()));
            }
        };

        for line in content.lines() {
            let Some(rest) = line.strip_prefix('"') else {
                bail!("Build cache '{}' is corrupted", file.display());
            };
            let Some((path, rest)) = rest.split_once('"') else {
                bail!("Build cache '{}' is corrupted", file.display());
            };
            cache.set(path, parse_mtime(rest));
        }

        Ok(cache)
    }

    /// Write every entry to `file`, one line each, in insertion order. The
    /// content goes to a temporary file first and is renamed over the target,
    /// so a concurrent reader never observes a torn write.
    pub fn save(&self, file: &Path) -> Result<()> {
        let dir = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to open build cache '{}' for writing", file.display()))?;
        for entry in &self.entries {
            writeln!(tmp, "\"{}\" {}", entry.path, entry.mtime)?;
        }

        tmp.persist(file)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to save build cache '{}'", file.display()))?;
        Ok(())
    }

    /// Remove the persisted cache file. Callers on the clean path ignore the
    /// result, since "nothing to delete" is not an error state there.
    pub fn delete(file: &Path) -> Result<()> {
        fs::remove_file(file)
            .with_context(|| format!("Failed to remove build cache '{}'", file.display()))
    }

    pub fn get(&self, path: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.mtime)
    }

    /// Upsert: overwrite the entry for `path` if present, append otherwise.
    pub fn set(&mut self, path: &str, mtime: i64) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.path == path) {
            entry.mtime = mtime;
        } else {
            self.entries.push(CacheEntry {
                path: path.to_string(),
                mtime,
            });
        }
    }

    /// Staleness check with the cache refresh folded in: returns true when
    /// the current mtime of `path` differs from the recorded one, recording
    /// the new stamp in the same step. A never-seen file always reads as
    /// stale, and so does one whose mtime moved *backwards* (restored backup,
    /// clock rollback): anything different triggers a rebuild, not just
    /// newer.
    pub fn update(&mut self, path: &Path) -> Result<bool> {
        let now = fsutil::mtime(path)?;
        let key = path.to_string_lossy();

        if self.get(&key) == Some(now) {
            return Ok(false);
        }
        self.set(&key, now);
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse the mtime field the way `atoll` would: skip leading whitespace, read
/// an optional sign and leading digits, silently ignore anything after them.
fn parse_mtime(field: &str) -> i64 {
    let field = field.trim_start();
    let (sign, digits) = match field.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, field),
    };

    let digits: String = digits.chars().take_while(char::is_ascii_digit).collect();
    digits.parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn set_file_mtime(path: &Path, mtime: SystemTime) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_times(fs::FileTimes::new().set_modified(mtime))
            .unwrap();
    }

    #[test]
    fn missing_file_loads_as_empty_cache() {
        let dir = tempdir().unwrap();
        let cache = BuildCache::load(&dir.path().join(CACHE_FILE)).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(CACHE_FILE);

        let mut cache = BuildCache::new();
        cache.set("src/main.c", 1700000000);
        cache.set("src/util.c", 1700000100);
        cache.set("src/main.c", 1700000200); // upsert, not a duplicate line
        cache.save(&file).unwrap();

        let loaded = BuildCache::load(&file).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("src/main.c"), Some(1700000200));
        assert_eq!(loaded.get("src/util.c"), Some(1700000100));
    }

    #[test]
    fn paths_are_not_canonicalized() {
        let mut cache = BuildCache::new();
        cache.set("./a.c", 1);
        cache.set("a.c", 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("./a.c"), Some(1));
        assert_eq!(cache.get("a.c"), Some(2));
    }

    #[test]
    fn line_without_opening_quote_fails_the_load() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(CACHE_FILE);
        fs::write(&file, "\"a.c\" 100\nb.c 200\n").unwrap();

        let err = BuildCache::load(&file).unwrap_err();
        assert!(err.to_string().contains("corrupted"));
    }

    #[test]
    fn line_without_closing_quote_fails_the_load() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(CACHE_FILE);
        fs::write(&file, "\"a.c 100\n").unwrap();

        assert!(BuildCache::load(&file).is_err());
    }

    #[test]
    fn trailing_junk_after_the_mtime_is_ignored() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(CACHE_FILE);
        fs::write(&file, "\"a.c\" 123junk\n\"b.c\" nonsense\n").unwrap();

        let cache = BuildCache::load(&file).unwrap();
        assert_eq!(cache.get("a.c"), Some(123));
        assert_eq!(cache.get("b.c"), Some(0));
    }

    #[test]
    fn never_seen_file_is_stale() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("fresh.c");
        fs::write(&src, "").unwrap();

        let mut cache = BuildCache::new();
        assert!(cache.update(&src).unwrap());
    }

    #[test]
    fn update_is_idempotent_for_an_unchanged_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("stable.c");
        fs::write(&src, "").unwrap();

        let mut cache = BuildCache::new();
        assert!(cache.update(&src).unwrap());
        assert!(!cache.update(&src).unwrap());
    }

    #[test]
    fn older_mtime_still_counts_as_changed() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("rollback.c");
        fs::write(&src, "").unwrap();

        let mut cache = BuildCache::new();
        cache.update(&src).unwrap();

        set_file_mtime(&src, SystemTime::now() - Duration::from_secs(3600));
        assert!(cache.update(&src).unwrap());
        assert!(!cache.update(&src).unwrap());
    }

    #[test]
    fn update_fails_when_the_file_vanished() {
        let dir = tempdir().unwrap();
        let mut cache = BuildCache::new();
        assert!(cache.update(&dir.path().join("gone.c")).is_err());
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(CACHE_FILE);

        let mut cache = BuildCache::new();
        cache.set("a.c", 1);
        cache.set("b.c", 2);
        cache.save(&file).unwrap();

        let mut cache = BuildCache::new();
        cache.set("a.c", 3);
        cache.save(&file).unwrap();

        let loaded = BuildCache::load(&file).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("a.c"), Some(3));
        assert_eq!(loaded.get("b.c"), None);
    }
}
