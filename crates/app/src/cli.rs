//! Command-line surface of the `voxcard` binary

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use voxcard_foundation::{AppError, TimeWindow};

#[derive(Parser, Debug)]
#[command(name = "voxcard", about = "Flashcard audio playback and export", version)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "voxcard.toml")]
    pub config: PathBuf,

    /// ElevenLabs API key; falls back to the config file.
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a deck through the speakers.
    Play {
        /// CSV deck file.
        deck: PathBuf,
        /// Zero-based entry index to start from.
        #[arg(long)]
        from: Option<usize>,
        /// Playback rate, clamped to 0.5..=2.0.
        #[arg(long)]
        rate: Option<f64>,
        /// Restrict playback to a timeline window, e.g. `30..120` (seconds).
        #[arg(long, value_parser = parse_window)]
        window: Option<TimeWindow>,
    },
    /// Export a deck to a single WAV file.
    Export {
        /// CSV deck file.
        deck: PathBuf,
        /// Base name for the output file.
        #[arg(long)]
        name: String,
        /// Silence speed factor, clamped to 0.5..=2.0.
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
    },
    /// Inspect or maintain the audio cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Print entry count and total size.
    Stats,
    /// Delete every cached clip and reset the index.
    Clear,
    /// Report dangling index entries and orphan blobs.
    Verify,
}

/// Parse `START..END` in seconds into a validated window.
fn parse_window(raw: &str) -> Result<TimeWindow, AppError> {
    let (start, end) = raw
        .split_once("..")
        .ok_or_else(|| AppError::Config(format!("expected START..END, got '{raw}'")))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| AppError::Config(format!("'{s}' is not a number of seconds")))
    };
    TimeWindow::new(parse(start)?, parse(end)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_argument_parses_a_range() {
        let window = parse_window("30..120").unwrap();
        assert_eq!(window.start, 30.0);
        assert_eq!(window.end, 120.0);
    }

    #[test]
    fn window_argument_rejects_garbage() {
        assert!(parse_window("30").is_err());
        assert!(parse_window("abc..def").is_err());
        assert!(parse_window("120..30").is_err());
    }

    #[test]
    fn cli_parses_a_play_invocation() {
        let cli = Cli::parse_from([
            "voxcard", "play", "deck.csv", "--rate", "1.5", "--window", "10..60",
        ]);
        match cli.command {
            Command::Play { rate, window, .. } => {
                assert_eq!(rate, Some(1.5));
                assert!(window.is_some());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
