//! On-disk response store consulted by the HTTP transport.
//!
//! Entries live under a single bounded directory, one pair of files per URL:
//! the raw body plus a JSON metadata sidecar. Keys are a digest of the full
//! request URL, so distinct query assemblies cache independently.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;
use url::Url;

use super::MaxStale;

const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Seconds since the Unix epoch; clamps to zero before it.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Location and byte capacity of the on-disk store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStoreConfig {
    pub directory: PathBuf,
    pub max_bytes: u64,
}

impl CacheStoreConfig {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }

    pub fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// Metadata sidecar stored next to each body file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Unix seconds at which the entry was written or last revalidated.
    pub stored_at: u64,
    /// Freshness lifetime in seconds granted by the origin.
    pub fresh_for: u64,
    pub status: u16,
    pub status_text: String,
    pub etag: Option<String>,
    pub size: u64,
}

/// One stored response: metadata plus the body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    pub metadata: EntryMetadata,
    pub body: Vec<u8>,
}

impl StoredEntry {
    /// Whether this entry may be served under the given staleness tolerance.
    ///
    /// Without a tolerance the entry must still be within its freshness
    /// lifetime; a bounded tolerance extends that window; an unbounded one
    /// accepts any age.
    pub fn is_acceptable(&self, max_stale: Option<MaxStale>, now: u64) -> bool {
        let age = now.saturating_sub(self.metadata.stored_at);
        match max_stale {
            Some(MaxStale::Unbounded) => true,
            Some(MaxStale::Seconds(tolerance)) => {
                age <= self.metadata.fresh_for.saturating_add(tolerance)
            }
            None => age <= self.metadata.fresh_for,
        }
    }
}

/// Response store keyed by request URL.
///
/// Storage layout, eviction and size accounting are owned by implementations;
/// the transport only drives lookups and writes according to the directive in
/// effect.
pub trait CacheStore: Send + Sync {
    fn load(&self, url: &Url) -> io::Result<Option<StoredEntry>>;
    fn store(&self, url: &Url, metadata: &EntryMetadata, body: &[u8]) -> io::Result<()>;
    fn remove(&self, url: &Url) -> io::Result<bool>;
    fn clear(&self) -> io::Result<()>;
    fn name(&self) -> &'static str;
}

/// Store keeping entries as file pairs under a bounded directory.
pub struct DiskCacheStore {
    directory: PathBuf,
    max_bytes: u64,
}

impl DiskCacheStore {
    pub fn open(config: &CacheStoreConfig) -> io::Result<Self> {
        fs::create_dir_all(&config.directory)?;
        Ok(Self {
            directory: config.directory.clone(),
            max_bytes: config.max_bytes,
        })
    }

    fn key_for(url: &Url) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn body_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.body"))
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.meta"))
    }

    fn remove_pair(&self, key: &str) -> io::Result<bool> {
        let mut removed = false;
        for path in [self.meta_path(key), self.body_path(key)] {
            match fs::remove_file(&path) {
                Ok(()) => removed = true,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(removed)
    }

    /// Drop oldest entries until the directory fits the byte capacity.
    fn trim_to_capacity(&self) -> io::Result<()> {
        let mut entries: Vec<(u64, String, u64)> = Vec::new();
        let mut total: u64 = 0;

        for dir_entry in fs::read_dir(&self.directory)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("meta") {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let meta_len = dir_entry.metadata()?.len();
            let body_len = fs::metadata(self.body_path(key)).map(|m| m.len()).unwrap_or(0);
            let stored_at = fs::read(&path)
                .ok()
                .and_then(|bytes| serde_json::from_slice::<EntryMetadata>(&bytes).ok())
                .map(|meta| meta.stored_at)
                .unwrap_or(0);

            total = total.saturating_add(meta_len + body_len);
            entries.push((stored_at, key.to_owned(), meta_len + body_len));
        }

        entries.sort_unstable_by_key(|(stored_at, _, _)| *stored_at);
        for (_, key, len) in entries {
            if total <= self.max_bytes {
                break;
            }
            self.remove_pair(&key)?;
            total = total.saturating_sub(len);
        }
        Ok(())
    }
}

impl CacheStore for DiskCacheStore {
    fn load(&self, url: &Url) -> io::Result<Option<StoredEntry>> {
        let key = Self::key_for(url);
        let meta_bytes = match fs::read(self.meta_path(&key)) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };
        let metadata: EntryMetadata = match serde_json::from_slice(&meta_bytes) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(url = %url, error = %err, "dropping cache entry with unreadable metadata");
                self.remove_pair(&key)?;
                return Ok(None);
            }
        };
        let body = match fs::read(self.body_path(&key)) {
            Ok(body) => body,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.remove_pair(&key)?;
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        Ok(Some(StoredEntry { metadata, body }))
    }

    fn store(&self, url: &Url, metadata: &EntryMetadata, body: &[u8]) -> io::Result<()> {
        let key = Self::key_for(url);
        // Body first; an entry is visible only once its sidecar exists.
        fs::write(self.body_path(&key), body)?;
        let meta_bytes = serde_json::to_vec(metadata)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        fs::write(self.meta_path(&key), meta_bytes)?;
        self.trim_to_capacity()
    }

    fn remove(&self, url: &Url) -> io::Result<bool> {
        self.remove_pair(&Self::key_for(url))
    }

    fn clear(&self) -> io::Result<()> {
        for dir_entry in fs::read_dir(&self.directory)? {
            let path = dir_entry?.path();
            if path.is_file() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}
