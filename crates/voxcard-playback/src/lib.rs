//! Timed flashcard playback engine for VoxCard
//!
//! Walks an ordered deck of entries, expanding each into a fixed
//! speak/pause phase sequence, driving the synthesis service and an audio
//! sink. Transport controls (play/pause/resume/stop/next/prev/jump), a
//! time-window restriction and live rate changes are supported throughout;
//! a play session is cancelled cleanly via one token observed at every
//! suspend point.

pub mod engine;
pub mod error;
pub mod gate;
pub mod sink;
pub mod state;


pub use engine::{PlaybackEngine, PlaybackEvent, SpeechSource};
pub use error::PlaybackError;
pub use gate::PauseGate;
pub use sink::{AudioSink, RodioSink};
pub use state::{Phase, PlaybackState};
