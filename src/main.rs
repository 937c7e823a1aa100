//! Sitegate main entry point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Board (SimIo + SimSound)   LogDisplay   FileConfigStore       │
//! │  (DigitalIo · Numeric · Sound) (Text)    (ConfigPort)          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │   Controller: DeviceState · AlarmPolicy · Hub          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  io_task: policy · entry · exit · display · accept · sessions  │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::net::TcpListener;
use std::rc::Rc;
use anyhow::{Context, Result};
use embassy_time::Duration;
use log::{info, warn};

use sitegate::adapters::board::Board;
use sitegate::adapters::config_file::{DEFAULT_CONFIG_PATH, FileConfigStore};
use sitegate::adapters::sim::{LogDisplay, SimIo, SimSound};
use sitegate::app::ports::{ConfigError, ConfigPort};
use sitegate::app::service::Controller;
use sitegate::config::SystemConfig;
use sitegate::rpc::io_task;

/// Length of the simulated siren clip.
const SIREN_CLIP: Duration = Duration::from_secs(8);

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Sitegate v{:<26}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());
    let store = FileConfigStore::new(&path);
    let config = match store.load() {
        Ok(config) => config,
        Err(ConfigError::IoError(e)) => {
            return Err(e).with_context(|| format!("reading config {path}"));
        }
        Err(e) => {
            warn!("CONFIG: {} ({}), running with defaults", e, path);
            SystemConfig::default()
        }
    };

    // ── 3. Hardware ───────────────────────────────────────────
    let board = Board::new(
        SimIo::new(&config.pins),
        SimSound::new(SIREN_CLIP),
        config.pins.segments,
    );

    // ── 4. Network ────────────────────────────────────────────
    let listener = TcpListener::bind(&config.listen_addr)
        .with_context(|| format!("binding {}", config.listen_addr))?;

    // ── 5. Run ────────────────────────────────────────────────
    let controller = Rc::new(Controller::new(config, board));
    io_task::run(controller, LogDisplay::new(), listener).context("I/O runtime failed")?;
    Ok(())
}
