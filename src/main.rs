//! # FunkinCTRL
//!
//! Play arrow-key rhythm games with a robotics brick's sensors.
//!
//! This application polls the brick's touch and infrared sensors and injects
//! arrow-key presses through a Linux uinput virtual keyboard.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use funkin_ctrl::config::{Config, LoggingConfig};
use funkin_ctrl::inject::uinput::UinputKeyboard;
use funkin_ctrl::sensor::replay::ReplaySource;
use funkin_ctrl::session::{Readiness, Session, SessionSettings};
use funkin_ctrl::telemetry::recorder::TelemetryRecorder;

/// Configuration file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix for daily rolling log files
const LOG_FILE_PREFIX: &str = "funkin-ctrl.log";

/// Main entry point for FunkinCTRL
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, else `config/default.toml`, else defaults)
///    - Set up logging with tracing subscriber
///    - Open the sensor source and create the virtual keyboard
///
/// 2. **Start**
///    - Wait for the brick's start button (Enter)
///
/// 3. **Main Loop**
///    - Poll sensors at `poll.rate_hz` and inject key transitions
///    - Stop on the exit button (Down), end of data, or Ctrl+C
///
/// 4. **Shutdown**
///    - Release every held key
///
/// # Errors
///
/// Returns error if:
/// - Configuration is invalid
/// - No sensor source is configured or it cannot be opened
/// - `/dev/uinput` cannot be opened
/// - A sensor read or key injection fails mid-session
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO funkin_ctrl: FunkinCTRL v0.1.0 starting...
/// INFO funkin_ctrl::inject::uinput: Created virtual keyboard 'funkin-ctrl' with 6 keys
/// INFO funkin_ctrl::session: Press Enter on the brick to start
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(std::env::args().nth(1))?;
    let _log_guard = init_logging(&config.logging)?;

    info!("FunkinCTRL v{} starting...", env!("CARGO_PKG_VERSION"));

    if config.sensors.replay_file.is_empty() {
        bail!("No sensor source configured (set sensors.replay_file)");
    }
    let source = ReplaySource::open(&config.sensors.replay_file)
        .with_context(|| format!("Failed to open {}", config.sensors.replay_file))?;

    let pad = config.gamepad();
    let keyboard = UinputKeyboard::create(&config.keys.device_name, &pad.keys())?;

    let mut session = Session::new(source, keyboard, pad, SessionSettings::from_config(&config));
    if config.telemetry.enabled {
        session = session.with_recorder(TelemetryRecorder::from_config(&config.telemetry)?);
    }

    if let Readiness::Stopped(reason) = session.wait_for_start().await? {
        info!("Stopped before start ({:?})", reason);
        return Ok(());
    }

    let summary = session.run().await?;
    info!("Program ended after {} ticks", summary.ticks);

    Ok(())
}

/// Picks the configuration file to load, if any.
fn config_path(arg: Option<String>, default_exists: bool) -> Option<PathBuf> {
    match arg {
        Some(path) => Some(PathBuf::from(path)),
        None if default_exists => Some(PathBuf::from(DEFAULT_CONFIG_PATH)),
        None => None,
    }
}

fn load_config(arg: Option<String>) -> Result<Config> {
    let default_exists = Path::new(DEFAULT_CONFIG_PATH).exists();
    match config_path(arg, default_exists) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(Config::default()),
    }
}

/// Initialize logging to stdout, or to a daily rolling file when
/// `logging.log_dir` is set. `RUST_LOG` overrides the configured level.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Invalid log filter")?;

    if config.log_dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return Ok(None);
    }

    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}
