//! Transport state and the per-entry phase sequence

use std::time::Duration;
use voxcard_foundation::{
    PAUSE_AFTER_SOURCE_SECS, PAUSE_AFTER_TARGET_SECS, PAUSE_BETWEEN_ENTRIES_SECS,
};

/// One discrete step within an entry's traversal. Every entry runs all six
/// phases strictly in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SourceWord,
    PauseAfterSource,
    TargetWord,
    PauseAfterTarget,
    TargetSentence,
    PauseBetweenEntries,
}

impl Phase {
    pub const SEQUENCE: [Phase; 6] = [
        Phase::SourceWord,
        Phase::PauseAfterSource,
        Phase::TargetWord,
        Phase::PauseAfterTarget,
        Phase::TargetSentence,
        Phase::PauseBetweenEntries,
    ];

    /// Base pause length at rate 1.0, or None for speak phases.
    pub fn pause_base_secs(self) -> Option<f64> {
        match self {
            Phase::PauseAfterSource => Some(PAUSE_AFTER_SOURCE_SECS),
            Phase::PauseAfterTarget => Some(PAUSE_AFTER_TARGET_SECS),
            Phase::PauseBetweenEntries => Some(PAUSE_BETWEEN_ENTRIES_SECS),
            _ => None,
        }
    }
}

/// The single source of truth for transport UI. One instance per engine.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub is_paused: bool,
    pub current_entry: usize,
    pub phase: Option<Phase>,
    pub elapsed: Duration,
    pub rate: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_paused: false,
            current_entry: 0,
            phase: None,
            elapsed: Duration::ZERO,
            rate: 1.0,
        }
    }
}
