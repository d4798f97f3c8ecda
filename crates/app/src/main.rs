use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use voxcard_app::cli::{CacheAction, Cli, Command};
use voxcard_app::config::AppConfig;
use voxcard_app::deck::load_deck;
use voxcard_app::runtime::Runtime;
use voxcard_cache::AudioCache;
use voxcard_foundation::{AppState, ShutdownSignal, StateManager};

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "voxcard.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr.and(non_blocking_file))
        .with_env_filter(log_level)
        .init();
    std::mem::forget(guard);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().map_err(|e| anyhow::anyhow!("logging init failed: {e}"))?;
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;

    let state = StateManager::new();
    let shutdown = ShutdownSignal::new().install();
    state.transition(AppState::Ready)?;

    match cli.command {
        Command::Play {
            deck,
            from,
            rate,
            window,
        } => {
            let entries = load_deck(&deck)?;
            let api_key = config.resolve_api_key(cli.api_key)?;
            let runtime = Runtime::build(config, api_key).await?;
            state.transition(AppState::Busy {
                task: "play".to_string(),
            })?;
            let result = runtime.play(entries, from, rate, window, &shutdown).await;
            state.transition(AppState::Ready)?;
            result?;
        }
        Command::Export { deck, name, speed } => {
            let entries = load_deck(&deck)?;
            let api_key = config.resolve_api_key(cli.api_key)?;
            let runtime = Runtime::build(config, api_key).await?;
            state.transition(AppState::Busy {
                task: "export".to_string(),
            })?;
            let result = runtime.export(entries, &name, speed).await;
            state.transition(AppState::Ready)?;
            result?;
        }
        Command::Cache { action } => {
            let cache = AudioCache::open(&config.cache_dir).await?;
            match action {
                CacheAction::Stats => {
                    let stats = cache.stats();
                    println!(
                        "{} cached clips, {} bytes on disk",
                        stats.count, stats.total_bytes
                    );
                }
                CacheAction::Clear => {
                    let outcome = cache.clear().await?;
                    println!("Deleted {} cached clips", outcome.deleted_count);
                }
                CacheAction::Verify => {
                    let report = cache.verify().await?;
                    println!(
                        "{} dangling index entries, {} orphan blobs",
                        report.dangling_entries.len(),
                        report.orphan_blobs.len()
                    );
                }
            }
        }
    }

    state.transition(AppState::Stopping)?;
    state.transition(AppState::Stopped)?;
    Ok(())
}
