//! Batch export pipeline for VoxCard
//!
//! Renders a deck to one WAV file: three speed-scaled silence segments,
//! every entry's fragments resolved cache-first through the synthesis
//! service, interleaved in the playback phase order and concatenated at
//! fixed output parameters. All staging happens under a temp directory
//! that is removed best-effort whether the run succeeds or fails; the
//! output location only ever sees complete files.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};
use voxcard_foundation::{
    FlashcardEntry, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE, PAUSE_AFTER_SOURCE_SECS,
    PAUSE_AFTER_TARGET_SECS, PAUSE_BETWEEN_ENTRIES_SECS,
};
use voxcard_synth::{SynthesisService, SOURCE_LANGUAGE, TARGET_LANGUAGE};

pub mod error;
pub mod processor;


pub use error::ExportError;
pub use processor::{AudioProcessor, WavProcessor, OUTPUT_CHANNELS, OUTPUT_SAMPLE_RATE};

/// Result of a successful export run.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub output_path: PathBuf,
    pub segment_count: usize,
}

/// Monotone progress reporter. Percentages never go backwards no matter
/// what the stages feed in.
struct Progress<F: FnMut(&str, u8)> {
    callback: F,
    last: u8,
}

impl<F: FnMut(&str, u8)> Progress<F> {
    fn new(callback: F) -> Self {
        Self { callback, last: 0 }
    }

    fn report(&mut self, label: &str, percent: u8) {
        let percent = percent.min(100).max(self.last);
        self.last = percent;
        (self.callback)(label, percent);
    }
}

pub struct ExportPipeline {
    synth: Arc<SynthesisService>,
    processor: Arc<dyn AudioProcessor>,
    output_dir: PathBuf,
}

impl ExportPipeline {
    pub fn new(
        synth: Arc<SynthesisService>,
        processor: Arc<dyn AudioProcessor>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            synth,
            processor,
            output_dir: output_dir.into(),
        }
    }

    /// Export `entries` to `<sanitized name>_<timestamp>.wav` under the
    /// output directory. `speed` scales the silence segments only and is
    /// clamped to the playback rate range.
    pub async fn export<F>(
        &self,
        entries: &[FlashcardEntry],
        output_name: &str,
        speed: f64,
        on_progress: F,
    ) -> Result<ExportOutcome, ExportError>
    where
        F: FnMut(&str, u8),
    {
        let mut progress = Progress::new(on_progress);
        let staging = self.output_dir.join(".staging").join(format!(
            "run-{}",
            chrono::Local::now().format("%Y%m%d%H%M%S%3f")
        ));
        fs::create_dir_all(&staging).await?;

        let result = self
            .run(entries, output_name, speed, &mut progress, &staging)
            .await;

        // Temp fragments and silence files go away whatever happened above.
        if let Err(err) = fs::remove_dir_all(&staging).await {
            warn!(path = %staging.display(), error = %err, "Failed to clean export staging");
        }
        if let Ok(outcome) = &result {
            progress.report("Done", 100);
            info!(path = %outcome.output_path.display(), segments = outcome.segment_count, "Export finished");
        }
        result
    }

    async fn run<F>(
        &self,
        entries: &[FlashcardEntry],
        output_name: &str,
        speed: f64,
        progress: &mut Progress<F>,
        staging: &std::path::Path,
    ) -> Result<ExportOutcome, ExportError>
    where
        F: FnMut(&str, u8),
    {
        if entries.is_empty() {
            return Err(ExportError::EmptyDeck);
        }
        let speed = speed.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);

        progress.report("Rendering silence", 1);
        let mut silences = Vec::with_capacity(3);
        for (i, base) in [
            PAUSE_AFTER_SOURCE_SECS,
            PAUSE_AFTER_TARGET_SECS,
            PAUSE_BETWEEN_ENTRIES_SECS,
        ]
        .into_iter()
        .enumerate()
        {
            let bytes = self
                .processor
                .render_silence(Duration::from_secs_f64(base / speed))?;
            fs::write(staging.join(format!("silence_{i}.wav")), &bytes).await?;
            silences.push(bytes);
            progress.report("Rendering silence", 2 + i as u8);
        }

        // Fragment then silence, in the exact phase order of playback.
        let mut segments: Vec<Vec<u8>> = Vec::with_capacity(entries.len() * 6);
        for (index, entry) in entries.iter().enumerate() {
            let fragments = [
                (entry.source_word.as_str(), SOURCE_LANGUAGE),
                (entry.target_word.as_str(), TARGET_LANGUAGE),
                (entry.target_sentence.as_str(), TARGET_LANGUAGE),
            ];
            for (slot, (text, language)) in fragments.into_iter().enumerate() {
                let bytes = self.synth.synthesize(text, language, None).await?;
                fs::write(staging.join(format!("fragment_{index}_{slot}.bin")), &bytes).await?;
                segments.push(bytes);
                segments.push(silences[slot].clone());
            }
            let percent = 5 + (70 * (index + 1) / entries.len()) as u8;
            progress.report("Synthesizing entries", percent);
        }

        progress.report("Concatenating", 80);
        let joined = self.processor.concatenate(&segments)?;

        progress.report("Finalizing", 95);
        let file_name = format!(
            "{}_{}.wav",
            sanitize_name(output_name),
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );
        let staged = staging.join(&file_name);
        fs::write(&staged, &joined).await?;
        fs::create_dir_all(&self.output_dir).await?;
        let output_path = self.output_dir.join(&file_name);
        fs::rename(&staged, &output_path).await?;

        Ok(ExportOutcome {
            output_path,
            segment_count: segments.len(),
        })
    }
}

/// Keep names filesystem-safe without losing recognizability.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "export".to_string()
    } else {
        cleaned
    }
}
