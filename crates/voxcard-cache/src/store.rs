//! The on-disk audio cache

use crate::error::{CacheError, CacheResult};
use crate::fingerprint::Fingerprint;
use crate::index::{CacheEntry, CacheIndex, CacheStats, INDEX_VERSION};
use chrono::Utc;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// File extension for cached audio blobs.
pub const AUDIO_EXTENSION: &str = "mp3";

const INDEX_FILE: &str = "index.json";

/// Descriptive metadata recorded alongside a stored blob.
#[derive(Debug, Clone)]
pub struct StoreMetadata {
    pub text: String,
    pub voice_id: String,
    pub language_code: String,
}

/// Result of a `clear` operation: only what was actually removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearOutcome {
    pub deleted_count: usize,
}

/// Read-only consistency report: index entries without blobs and blobs
/// without index entries.
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub dangling_entries: Vec<String>,
    pub orphan_blobs: Vec<String>,
}

/// Content-addressable store mapping fingerprints to audio blobs.
///
/// The in-memory index is guarded by a `parking_lot` mutex; persistence
/// snapshots the index under that lock and performs the write under a
/// separate async lock so concurrent mutations never interleave index
/// writes.
pub struct AudioCache {
    root: PathBuf,
    index: Arc<Mutex<CacheIndex>>,
    persist_lock: tokio::sync::Mutex<()>,
}

impl AudioCache {
    /// Open (or create) the cache directory and load its index. A missing
    /// or unreadable index starts empty; an index from a newer format
    /// version is refused.
    pub async fn open(root: impl Into<PathBuf>) -> CacheResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;

        let index_path = root.join(INDEX_FILE);
        let index = match tokio::fs::read(&index_path).await {
            Ok(bytes) => match serde_json::from_slice::<CacheIndex>(&bytes) {
                Ok(index) if index.version > INDEX_VERSION => {
                    return Err(CacheError::UnsupportedVersion {
                        found: index.version,
                        supported: INDEX_VERSION,
                    });
                }
                Ok(index) => index,
                Err(e) => {
                    warn!("Cache index unreadable, starting empty: {}", e);
                    CacheIndex::empty()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CacheIndex::empty(),
            Err(e) => {
                warn!("Cache index read failed, starting empty: {}", e);
                CacheIndex::empty()
            }
        };

        info!(
            entries = index.entries.len(),
            path = %root.display(),
            "Audio cache opened"
        );
        Ok(Self {
            root,
            index: Arc::new(Mutex::new(index)),
            persist_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn blob_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.root
            .join(format!("{}.{}", fingerprint.to_hex(), AUDIO_EXTENSION))
    }

    /// Look up previously stored audio. A hit bumps the entry's last-access
    /// timestamp and persists the index. A dangling index entry (blob gone)
    /// or a blob read failure degrades to a miss.
    pub async fn lookup(&self, fingerprint: &Fingerprint) -> CacheResult<Option<Vec<u8>>> {
        let key = fingerprint.to_hex();
        if !self.index.lock().entries.contains_key(&key) {
            return Ok(None);
        }

        let bytes = match tokio::fs::read(self.blob_path(fingerprint)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(%fingerprint, "Index entry has no blob, treating as miss");
                return Ok(None);
            }
            Err(e) => {
                warn!(%fingerprint, "Blob read failed, treating as miss: {}", e);
                return Ok(None);
            }
        };

        {
            let mut index = self.index.lock();
            if let Some(entry) = index.entries.get_mut(&key) {
                entry.last_access = Utc::now();
            }
        }
        self.persist_index().await?;
        debug!(%fingerprint, bytes = bytes.len(), "Cache hit");
        Ok(Some(bytes))
    }

    /// Store audio for a fingerprint: blob first, then index entry, then
    /// persist. A repeated store for the same fingerprint overwrites the
    /// blob and keeps the original creation timestamp.
    pub async fn store(
        &self,
        fingerprint: &Fingerprint,
        metadata: StoreMetadata,
        bytes: &[u8],
    ) -> CacheResult<()> {
        tokio::fs::write(self.blob_path(fingerprint), bytes).await?;

        let key = fingerprint.to_hex();
        let now = Utc::now();
        {
            let mut index = self.index.lock();
            let created_at = index
                .entries
                .get(&key)
                .map(|existing| existing.created_at)
                .unwrap_or(now);
            index.entries.insert(
                key.clone(),
                CacheEntry {
                    fingerprint: key.clone(),
                    text: metadata.text,
                    voice_id: metadata.voice_id,
                    language_code: metadata.language_code,
                    created_at,
                    last_access: now,
                    byte_size: bytes.len() as u64,
                },
            );
        }
        self.persist_index().await?;
        debug!(%fingerprint, bytes = bytes.len(), "Cache store");
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        self.index.lock().stats()
    }

    /// Delete every blob referenced by the index, then reset and persist
    /// the index. Individual file-delete failures are logged and excluded
    /// from the reported count, never escalated.
    pub async fn clear(&self) -> CacheResult<ClearOutcome> {
        let keys: Vec<String> = self.index.lock().entries.keys().cloned().collect();

        let mut deleted = 0usize;
        for key in &keys {
            let path = self.root.join(format!("{key}.{AUDIO_EXTENSION}"));
            match tokio::fs::remove_file(&path).await {
                Ok(()) => deleted += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(fingerprint = %key, "Blob already absent during clear");
                }
                Err(e) => warn!(fingerprint = %key, "Blob delete failed: {}", e),
            }
        }

        *self.index.lock() = CacheIndex::empty();
        self.persist_index().await?;
        info!(deleted, "Audio cache cleared");
        Ok(ClearOutcome {
            deleted_count: deleted,
        })
    }

    /// Read-only consistency check over the cache directory.
    pub async fn verify(&self) -> CacheResult<VerifyReport> {
        let keys: std::collections::HashSet<String> =
            self.index.lock().entries.keys().cloned().collect();

        let mut report = VerifyReport::default();
        let mut on_disk = std::collections::HashSet::new();
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(AUDIO_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                on_disk.insert(stem.to_string());
                if !keys.contains(stem) {
                    report.orphan_blobs.push(stem.to_string());
                }
            }
        }
        for key in keys {
            if !on_disk.contains(&key) {
                report.dangling_entries.push(key);
            }
        }
        Ok(report)
    }

    async fn persist_index(&self) -> CacheResult<()> {
        // Snapshot inside the persist lock: a snapshot taken before the
        // lock could land after a newer writer's and roll the file back.
        let _guard = self.persist_lock.lock().await;
        let snapshot = self.index.lock().clone();
        let json = serde_json::to_string_pretty(&snapshot)?;
        tokio::fs::write(self.index_path(), json).await?;
        Ok(())
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
