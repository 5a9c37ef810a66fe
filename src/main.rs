mod config;
mod event;
mod lyrics;
mod player;
mod poller;
mod pool;
mod state;
mod throttle;
mod timer;
mod ui;
mod window;

use crate::config::{JsonConfigStore, resolve_config_path};
use crate::lyrics::database::{LyricsDatabase, load_database};
use crate::player::MprisPlayer;
use crate::pool::{EngineSettings, Overlay};
use crate::window::HeadlessHost;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Application configuration from CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Print each new lyric line to stdout (default logs them to stderr)
    #[arg(long)]
    pipe: bool,
    /// Path to the overlay settings file (default: $XDG_CONFIG_HOME/lyricsync/config.json)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Path to the JSON lyrics database
    #[arg(long = "lyrics-db")]
    lyrics_db: Option<PathBuf>,
    /// MPRIS service to follow (default: playerctld's active player)
    #[arg(long)]
    player: Option<String>,
    /// Blocklist for MPRIS player service names (comma-separated, case-insensitive)
    #[arg(
        long = "block",
        value_name = "SERVICE1,SERVICE2",
        value_delimiter = ','
    )]
    block: Vec<String>,
    /// How often the player is polled, in milliseconds
    #[arg(long = "poll-interval-ms", default_value_t = 100)]
    poll_interval_ms: u64,
    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug_log: bool,
}

fn init_tracing(debug_log: bool) {
    let default = if debug_log {
        "warn,lyricsync=debug"
    } else {
        "warn,lyricsync::ui=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cfg = Config::parse();
    init_tracing(cfg.debug_log);

    let config_path = cfg
        .config
        .clone()
        .or_else(resolve_config_path)
        .ok_or("cannot locate a config directory; pass --config")?;
    tracing::debug!(path = %config_path.display(), "Using config file");

    let lyrics = match &cfg.lyrics_db {
        Some(path) => load_database(path).await,
        None => {
            tracing::warn!("No --lyrics-db given, every track will show the placeholder");
            LyricsDatabase::new()
        }
    };

    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let (update_tx, update_rx) = mpsc::channel(32);

    let settings = EngineSettings {
        poll_interval: Duration::from_millis(cfg.poll_interval_ms.max(1)),
        ..EngineSettings::default()
    };
    let overlay = Overlay::new(
        Arc::new(MprisPlayer::new(cfg.player.clone(), cfg.block.clone())),
        Arc::new(lyrics),
        Arc::new(HeadlessHost::new(cmd_tx.clone())),
        Arc::new(JsonConfigStore::new(config_path)),
        update_tx,
        settings,
    );

    let renderer = if cfg.pipe {
        tokio::spawn(ui::pipe::display_lyrics_pipe(update_rx))
    } else {
        tokio::spawn(ui::display_lyrics_log(update_rx))
    };
    tokio::spawn(ui::control::shutdown_on_ctrl_c(cmd_tx.clone()));
    tokio::spawn(ui::control::read_commands(
        BufReader::new(tokio::io::stdin()),
        cmd_tx,
    ));

    overlay.run(cmd_rx).await;
    renderer.await?;
    Ok(())
}
