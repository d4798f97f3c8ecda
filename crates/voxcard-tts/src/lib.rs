//! Text-to-speech gateway abstraction for VoxCard
//!
//! This crate provides the foundational types and the gateway trait for
//! remote speech synthesis. Concrete providers (ElevenLabs, test fakes)
//! live in their own crates and implement [`SynthesisGateway`].

pub mod error;
pub mod gateway;
pub mod types;

pub use error::{TtsError, TtsResult};
pub use gateway::SynthesisGateway;
pub use types::{SynthesisRequest, VoiceSettings};
