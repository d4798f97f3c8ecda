//! Flashcard data model shared by the playback engine and export pipeline.
//!
//! Durations here are estimates derived from word counts and a fixed
//! speaking-rate constant. They only drive the timeline positions shown
//! before any audio exists; actual synthesized audio length is authoritative
//! once it is available.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Base pause after the source word, in seconds at rate 1.0.
pub const PAUSE_AFTER_SOURCE_SECS: f64 = 0.7;
/// Base pause after the target word, in seconds at rate 1.0.
pub const PAUSE_AFTER_TARGET_SECS: f64 = 0.9;
/// Base pause after the target sentence, before the next entry.
pub const PAUSE_BETWEEN_ENTRIES_SECS: f64 = 1.4;

/// Lower and upper bounds for the global playback rate.
pub const MIN_PLAYBACK_RATE: f64 = 0.5;
pub const MAX_PLAYBACK_RATE: f64 = 2.0;

/// Assumed speaking rate for duration estimates.
const WORDS_PER_SECOND: f64 = 2.2;
/// Even a single short word takes this long to speak.
const MIN_FRAGMENT_SECS: f64 = 0.6;

/// One teachable unit: a source-language word, its target-language
/// translation, and an example sentence in the target language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardEntry {
    pub id: u32,
    pub source_word: String,
    pub target_word: String,
    pub target_sentence: String,
    /// Estimated spoken duration of the entry including its pauses, seconds.
    pub estimated_duration: f64,
    /// Cumulative start offset of this entry within the full sequence.
    pub start_offset: f64,
}

impl FlashcardEntry {
    pub fn new(
        id: u32,
        source_word: impl Into<String>,
        target_word: impl Into<String>,
        target_sentence: impl Into<String>,
    ) -> Self {
        Self {
            id,
            source_word: source_word.into(),
            target_word: target_word.into(),
            target_sentence: target_sentence.into(),
            estimated_duration: 0.0,
            start_offset: 0.0,
        }
    }

    /// The three spoken fragments in traversal order.
    pub fn fragments(&self) -> [&str; 3] {
        [&self.source_word, &self.target_word, &self.target_sentence]
    }
}

/// Estimated seconds needed to speak `text` at the assumed speaking rate.
pub fn estimate_fragment_secs(text: &str) -> f64 {
    let words = text.split_whitespace().count();
    if words == 0 {
        return 0.0;
    }
    (words as f64 / WORDS_PER_SECOND).max(MIN_FRAGMENT_SECS)
}

/// Total pause time for one entry at the given playback rate.
pub fn entry_pause_secs(rate: f64) -> f64 {
    (PAUSE_AFTER_SOURCE_SECS + PAUSE_AFTER_TARGET_SECS + PAUSE_BETWEEN_ENTRIES_SECS) / rate
}

/// Recompute `estimated_duration` and `start_offset` for every entry.
///
/// The playback rate scales pause durations only; the spoken fragments are
/// played back as synthesized. Call this whenever the rate changes so the
/// timeline and window math stay in the same time base as the engine.
pub fn recompute_offsets(entries: &mut [FlashcardEntry], rate: f64) {
    let rate = rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
    let mut offset = 0.0;
    for entry in entries.iter_mut() {
        let spoken: f64 = entry
            .fragments()
            .iter()
            .map(|f| estimate_fragment_secs(f))
            .sum();
        entry.estimated_duration = spoken + entry_pause_secs(rate);
        entry.start_offset = offset;
        offset += entry.estimated_duration;
    }
}

/// A half-open `[start, end)` restriction over the sequence timeline,
/// expressed in the same time base as entry start offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Result<Self, AppError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(AppError::Config(format!(
                "time window start ({start}) must be before end ({end})"
            )))
        }
    }

    pub fn contains(&self, offset: f64) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Index of the first entry whose start offset falls inside the window.
    pub fn first_entry_inside(&self, entries: &[FlashcardEntry]) -> Option<usize> {
        entries.iter().position(|e| self.contains(e.start_offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> Vec<FlashcardEntry> {
        vec![
            FlashcardEntry::new(1, "dog", "perro", "El perro corre en el parque."),
            FlashcardEntry::new(2, "house", "casa", "La casa es grande."),
        ]
    }

    #[test]
    fn fragment_estimate_scales_with_word_count() {
        let short = estimate_fragment_secs("perro");
        let long = estimate_fragment_secs("El perro corre en el parque");
        assert!(long > short);
        assert!(short >= 0.6);
        assert_eq!(estimate_fragment_secs("   "), 0.0);
    }

    #[test]
    fn offsets_are_cumulative() {
        let mut entries = deck();
        recompute_offsets(&mut entries, 1.0);
        assert_eq!(entries[0].start_offset, 0.0);
        assert!((entries[1].start_offset - entries[0].estimated_duration).abs() < 1e-9);
        assert!(entries[0].estimated_duration > entry_pause_secs(1.0));
    }

    #[test]
    fn faster_rate_shrinks_pauses_only() {
        let mut normal = deck();
        let mut fast = deck();
        recompute_offsets(&mut normal, 1.0);
        recompute_offsets(&mut fast, 2.0);
        let shrink = normal[0].estimated_duration - fast[0].estimated_duration;
        let expected = entry_pause_secs(1.0) - entry_pause_secs(2.0);
        assert!((shrink - expected).abs() < 1e-9);
    }

    #[test]
    fn rate_is_clamped_in_offset_math() {
        let mut wild = deck();
        let mut max = deck();
        recompute_offsets(&mut wild, 10.0);
        recompute_offsets(&mut max, MAX_PLAYBACK_RATE);
        assert!((wild[0].estimated_duration - max[0].estimated_duration).abs() < 1e-9);
    }

    #[test]
    fn window_rejects_empty_range() {
        assert!(TimeWindow::new(5.0, 5.0).is_err());
        assert!(TimeWindow::new(7.0, 2.0).is_err());
    }

    #[test]
    fn window_selects_first_entry_inside() {
        let mut entries: Vec<FlashcardEntry> = (0..5)
            .map(|i| FlashcardEntry::new(i, "w", "p", "s"))
            .collect();
        for (entry, offset) in entries.iter_mut().zip([0.0, 5.0, 12.0, 18.0, 25.0]) {
            entry.start_offset = offset;
        }
        let window = TimeWindow::new(10.0, 20.0).unwrap();
        assert_eq!(window.first_entry_inside(&entries), Some(2));
        assert!(window.contains(12.0));
        assert!(!window.contains(20.0));
    }
}
