//! Cache fingerprints
//!
//! A fingerprint is a SHA-256 digest over the (text, voice, language)
//! triple. Each field is length-prefixed before hashing, so a delimiter
//! appearing inside a field can never collide with a field boundary.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Deterministic key identifying one synthesis request. Never invertible
/// back to the text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint of a synthesis triple. Text is normalized by
    /// trimming surrounding whitespace; voice and language are hashed as
    /// given.
    pub fn compute(text: &str, voice_id: &str, language_code: &str) -> Self {
        let mut hasher = Sha256::new();
        for field in [text.trim(), voice_id, language_code] {
            let bytes = field.as_bytes();
            hasher.update((bytes.len() as u32).to_le_bytes());
            hasher.update(bytes);
        }
        Self(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_triples_yield_identical_fingerprints() {
        let a = Fingerprint::compute("hola", "voice-1", "es-ES");
        let b = Fingerprint::compute("hola", "voice-1", "es-ES");
        assert_eq!(a, b);
    }

    #[test]
    fn each_field_contributes() {
        let base = Fingerprint::compute("hola", "voice-1", "es-ES");
        assert_ne!(base, Fingerprint::compute("hola!", "voice-1", "es-ES"));
        assert_ne!(base, Fingerprint::compute("hola", "voice-2", "es-ES"));
        assert_ne!(base, Fingerprint::compute("hola", "voice-1", "es-MX"));
    }

    #[test]
    fn field_boundaries_cannot_collide() {
        // A raw delimiter-joined scheme would hash both of these to the
        // same bytes; length prefixing keeps them apart.
        let a = Fingerprint::compute("a|b", "c", "en-US");
        let b = Fingerprint::compute("a", "b|c", "en-US");
        assert_ne!(a, b);

        let c = Fingerprint::compute("ab", "", "en-US");
        let d = Fingerprint::compute("a", "b", "en-US");
        assert_ne!(c, d);
    }

    #[test]
    fn text_is_trimmed_before_hashing() {
        let a = Fingerprint::compute("  hola ", "voice-1", "es-ES");
        let b = Fingerprint::compute("hola", "voice-1", "es-ES");
        assert_eq!(a, b);
    }

    #[test]
    fn hex_form_is_64_chars() {
        let fp = Fingerprint::compute("hola", "voice-1", "es-ES");
        assert_eq!(fp.to_hex().len(), 64);
        assert_eq!(fp.to_string(), fp.to_hex());
    }
}
