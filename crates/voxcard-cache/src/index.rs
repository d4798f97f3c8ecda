//! The durable cache index

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Format version written into every index file.
pub const INDEX_VERSION: u32 = 1;

/// Metadata for one cached audio blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Hex fingerprint, also the blob file stem.
    pub fingerprint: String,
    /// Original (normalized) text.
    pub text: String,
    pub voice_id: String,
    pub language_code: String,
    pub created_at: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
    pub byte_size: u64,
}

/// The full on-disk index: version tag plus fingerprint -> entry mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheIndex {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
}

impl CacheIndex {
    pub fn empty() -> Self {
        Self {
            version: INDEX_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Aggregate statistics over all entries. Zeroed when empty.
    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for entry in self.entries.values() {
            stats.count += 1;
            stats.total_bytes += entry.byte_size;
            stats.oldest = match stats.oldest {
                Some(t) if t <= entry.created_at => Some(t),
                _ => Some(entry.created_at),
            };
            stats.newest = match stats.newest {
                Some(t) if t >= entry.created_at => Some(t),
                _ => Some(entry.created_at),
            };
        }
        stats
    }
}

impl Default for CacheIndex {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    pub count: usize,
    pub total_bytes: u64,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}
