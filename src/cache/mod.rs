//! Get-or-compute caches for entity metadata.
//!
//! Scanning annotated declarations is deterministic, so its results can be
//! memoized in-process ([`MemoryCache`]) or persisted across restarts in
//! SQLite ([`MetadataCache`], stored in `~/.rowgraph/cache.db` by default).
//!
//! # Design
//!
//! - Simple key-value store with JSON values
//! - No TTL - cache persists until manually cleared
//! - Versioned - auto-clears on version mismatch
//!
//! # Key Format
//!
//! ```text
//! structure:{declaration_hash}     -> EntityStructure
//! {key}:{property}                 -> any get_or_compute value
//! ```

mod memory;

pub use memory::MemoryCache;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

use crate::config::CacheSettings;
use crate::error::HydrateResult;

/// Current cache schema version. Bump this when the cache format changes.
const CACHE_VERSION: i32 = 1;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to determine cache directory")]
    NoCacheDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Raw JSON key-value storage behind a get-or-compute cache.
pub trait CacheStore {
    fn load(&self, key: &str) -> CacheResult<Option<String>>;

    fn store(&self, key: &str, json: &str) -> CacheResult<()>;
}

/// Typed get-or-compute on top of any [`CacheStore`].
pub trait CacheStoreExt: CacheStore {
    /// Return the cached value for `key`/`property`, computing and storing
    /// it on a miss. Entries that no longer deserialize are recomputed.
    fn get_or_compute<T, E, F>(&self, key: &str, property: &str, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Result<T, E>,
    {
        let entry = CacheKey::entry(key, property);

        if let Some(json) = self.load(&entry)? {
            match serde_json::from_str(&json) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(key = %entry, error = %e, "discarding undecodable cache entry")
                }
            }
        }

        let value = compute()?;
        let json = serde_json::to_string(&value).map_err(CacheError::from)?;
        self.store(&entry, &json)?;
        Ok(value)
    }
}

// Blanket implementation for all CacheStore implementations
impl<C: CacheStore + ?Sized> CacheStoreExt for C {}

/// Shared stores, e.g. one cache behind several providers.
impl<C: CacheStore + ?Sized> CacheStore for Rc<C> {
    fn load(&self, key: &str) -> CacheResult<Option<String>> {
        (**self).load(key)
    }

    fn store(&self, key: &str, json: &str) -> CacheResult<()> {
        (**self).store(key, json)
    }
}

/// SQLite-based metadata cache.
pub struct MetadataCache {
    conn: Connection,
}

impl MetadataCache {
    /// Open or create the cache database at the default location.
    pub fn open_default() -> CacheResult<Self> {
        Self::open(Self::default_path()?)
    }

    /// Open or create the cache database at `path`.
    ///
    /// If the cache version doesn't match, it's automatically cleared.
    pub fn open<P: AsRef<Path>>(path: P) -> CacheResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.init()?;

        Ok(cache)
    }

    /// Open the cache configured by `[cache]`, or `None` when disabled.
    pub fn from_settings(settings: &CacheSettings) -> HydrateResult<Option<Self>> {
        if !settings.enabled {
            return Ok(None);
        }
        let cache = match settings.resolved_path()? {
            Some(path) => Self::open(path)?,
            None => Self::open_default()?,
        };
        Ok(Some(cache))
    }

    /// Open an in-memory cache (for testing).
    pub fn open_in_memory() -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.init()?;
        Ok(cache)
    }

    /// Default path of the cache database: `~/.rowgraph/cache.db`.
    pub fn default_path() -> CacheResult<PathBuf> {
        let base = dirs::home_dir().ok_or(CacheError::NoCacheDir)?;
        Ok(base.join(".rowgraph").join("cache.db"))
    }

    /// Initialize the cache schema and check version.
    fn init(&self) -> CacheResult<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS cache (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;

        let stored_version: Option<i32> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
                let s: String = row.get(0)?;
                Ok(s.parse().unwrap_or(0))
            })
            .optional()?;

        match stored_version {
            Some(v) if v == CACHE_VERSION => {}
            Some(v) => {
                tracing::debug!(stored = v, current = CACHE_VERSION, "cache version changed, clearing");
                self.clear_all()?;
                self.set_version()?;
            }
            None => {
                self.set_version()?;
            }
        }

        Ok(())
    }

    fn set_version(&self) -> CacheResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('version', ?)",
            params![CACHE_VERSION.to_string()],
        )?;
        Ok(())
    }

    /// Get a value from the cache.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        match self.load(key)? {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> CacheResult<()> {
        let json = serde_json::to_string(value)?;
        self.store(key, &json)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> CacheResult<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM cache WHERE key = ?", params![key])?;
        Ok(rows > 0)
    }

    /// Delete all entries matching a key prefix.
    pub fn delete_prefix(&self, prefix: &str) -> CacheResult<usize> {
        let pattern = format!("{}%", prefix);
        let rows = self
            .conn
            .execute("DELETE FROM cache WHERE key LIKE ?", params![pattern])?;
        Ok(rows)
    }

    /// Clear all cache entries (but keep metadata).
    pub fn clear_all(&self) -> CacheResult<()> {
        self.conn.execute("DELETE FROM cache", [])?;
        Ok(())
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheResult<CacheStats> {
        let entry_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cache", [], |row| row.get(0))?;

        let total_size: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(value)), 0) FROM cache",
            [],
            |row| row.get(0),
        )?;

        Ok(CacheStats {
            entry_count: entry_count as usize,
            total_size_bytes: total_size as usize,
        })
    }
}

impl CacheStore for MetadataCache {
    fn load(&self, key: &str) -> CacheResult<Option<String>> {
        let json = self
            .conn
            .query_row(
                "SELECT value FROM cache WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json)
    }

    fn store(&self, key: &str, json: &str) -> CacheResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO cache (key, value) VALUES (?, ?)",
            params![key, json],
        )?;
        Ok(())
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of entries in the cache.
    pub entry_count: usize,
    /// Total size of all values in bytes.
    pub total_size_bytes: usize,
}

/// Helper for generating cache keys.
pub struct CacheKey;

impl CacheKey {
    /// Key for a get-or-compute entry.
    pub fn entry(key: &str, property: &str) -> String {
        format!("{}:{}", key, property)
    }

    /// Cache namespace for scanned entity structures.
    pub const STRUCTURE: &'static str = "structure";
}

/// Hex SHA-256 of `value`'s JSON form.
///
/// Used as the property part of a [`CacheKey::STRUCTURE`] entry: any change
/// to a declaration or its lookup rules yields a new fingerprint, so stale
/// structures are never read back.
pub fn compute_hash<T: Serialize>(value: &T) -> CacheResult<String> {
    let json = serde_json::to_vec(value)?;
    Ok(format!("{:x}", Sha256::digest(&json)))
}
