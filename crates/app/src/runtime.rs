//! Wiring of the synthesis stack and the long-running commands

use crate::config::AppConfig;
use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use voxcard_cache::AudioCache;
use voxcard_export::{ExportPipeline, WavProcessor};
use voxcard_foundation::{FlashcardEntry, ShutdownSignal, TimeWindow};
use voxcard_playback::{PlaybackEngine, PlaybackEvent, RodioSink};
use voxcard_synth::SynthesisService;
use voxcard_tts::SynthesisGateway;
use voxcard_tts_elevenlabs::ElevenLabsGateway;

/// Shared service stack behind both the play and export commands.
pub struct Runtime {
    pub config: AppConfig,
    pub cache: Arc<AudioCache>,
    pub synth: Arc<SynthesisService>,
}

impl Runtime {
    pub async fn build(config: AppConfig, api_key: String) -> anyhow::Result<Self> {
        let gateway: Arc<dyn SynthesisGateway> = Arc::new(ElevenLabsGateway::new(api_key)?);
        let cache = Arc::new(
            AudioCache::open(&config.cache_dir)
                .await
                .with_context(|| format!("opening cache at {}", config.cache_dir.display()))?,
        );
        let synth = Arc::new(SynthesisService::new(
            gateway,
            Arc::clone(&cache),
            config.synth.clone(),
        ));
        Ok(Self {
            config,
            cache,
            synth,
        })
    }

    /// Play a deck to the default output device until it completes, fails,
    /// or Ctrl-C arrives.
    pub async fn play(
        &self,
        entries: Vec<FlashcardEntry>,
        from: Option<usize>,
        rate: Option<f64>,
        window: Option<TimeWindow>,
        shutdown: &ShutdownSignal,
    ) -> anyhow::Result<()> {
        let (engine, mut events) =
            PlaybackEngine::new(entries, Arc::clone(&self.synth), RodioSink::new());
        if let Some(rate) = rate {
            engine.set_rate(rate);
        }
        engine.set_time_window(window);
        if let Some(from) = from {
            engine.jump_to_entry(from);
        }
        engine.play();

        loop {
            tokio::select! {
                _ = shutdown.wait() => {
                    info!("Stopping playback");
                    engine.stop().await;
                    return Ok(());
                }
                event = events.recv() => match event {
                    Some(PlaybackEvent::PhaseStarted { entry_index, phase }) => {
                        info!(entry = entry_index, ?phase, "Phase started");
                    }
                    Some(PlaybackEvent::Completed) => {
                        info!("Deck finished");
                        return Ok(());
                    }
                    Some(PlaybackEvent::Stopped) => return Ok(()),
                    Some(PlaybackEvent::Failed(message)) => {
                        anyhow::bail!("playback failed: {message}");
                    }
                    None => return Ok(()),
                }
            }
        }
    }

    /// Export a deck to one WAV file under the configured output directory.
    pub async fn export(
        &self,
        entries: Vec<FlashcardEntry>,
        name: &str,
        speed: f64,
    ) -> anyhow::Result<()> {
        let pipeline = ExportPipeline::new(
            Arc::clone(&self.synth),
            Arc::new(WavProcessor::new()),
            self.config.output_dir.clone(),
        );
        let outcome = pipeline
            .export(&entries, name, speed, |label, percent| {
                println!("[{percent:>3}%] {label}");
            })
            .await?;
        println!("Exported to {}", outcome.output_path.display());
        Ok(())
    }
}
