//! Audio output seam and the rodio-backed device sink

use crate::error::PlaybackError;
use crate::gate::PauseGate;
use async_trait::async_trait;
use std::io::Cursor;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Plays one encoded clip to completion. The engine calls this for every
/// speak phase; tests substitute a silent fake.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Decodes and plays `audio` at `rate` times natural speed. Must honour
    /// the gate (suspend output while paused) and return early when `cancel`
    /// fires, without reporting an error for the cancellation itself.
    async fn play(
        &self,
        audio: Vec<u8>,
        rate: f64,
        gate: &PauseGate,
        cancel: &CancellationToken,
    ) -> Result<(), PlaybackError>;
}

/// Default sink feeding the system output device through rodio.
///
/// Stream handles are not Send, so each clip gets a short-lived blocking
/// task that owns the stream for the duration of that clip and polls the
/// pause/cancel signals between sleeps.
pub struct RodioSink;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

impl RodioSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RodioSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSink for RodioSink {
    async fn play(
        &self,
        audio: Vec<u8>,
        rate: f64,
        gate: &PauseGate,
        cancel: &CancellationToken,
    ) -> Result<(), PlaybackError> {
        let pause_rx = gate.subscribe();
        let cancel = cancel.clone();
        let result = tokio::task::spawn_blocking(move || {
            let (_stream, handle) = rodio::OutputStream::try_default()
                .map_err(|e| PlaybackError::Device(e.to_string()))?;
            let sink = rodio::Sink::try_new(&handle)
                .map_err(|e| PlaybackError::Device(e.to_string()))?;
            let source = rodio::Decoder::new(Cursor::new(audio))
                .map_err(|e| PlaybackError::Decode(e.to_string()))?;
            sink.set_speed(rate as f32);
            sink.append(source);

            while !sink.empty() {
                if cancel.is_cancelled() {
                    sink.stop();
                    break;
                }
                if *pause_rx.borrow() {
                    sink.pause();
                } else {
                    sink.play();
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Ok(())
        })
        .await;

        match result {
            Ok(outcome) => outcome,
            Err(join_err) => Err(PlaybackError::Device(join_err.to_string())),
        }
    }
}
