//! Persistent content-addressable audio cache for VoxCard
//!
//! One directory holds one blob file per fingerprint plus a JSON index of
//! metadata. The index is loaded once at startup and fully rewritten after
//! every mutation; blob writes always land before their index entry so a
//! crash can leave an orphan blob but never a dangling entry. A dangling
//! entry found anyway (external tampering, partial restore) is treated as a
//! miss on lookup.

pub mod error;
pub mod fingerprint;
pub mod index;
pub mod store;

pub use error::{CacheError, CacheResult};
pub use fingerprint::Fingerprint;
pub use index::{CacheEntry, CacheIndex, CacheStats, INDEX_VERSION};
pub use store::{AudioCache, ClearOutcome, StoreMetadata, VerifyReport, AUDIO_EXTENSION};
