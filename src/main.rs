//! DehaTrack - body orientation tracking daemon
//!
//! Tracks a body in depth-camera frames and reports its position and yaw
//! over a low-bandwidth actuator link. The real camera and link are
//! external; this binary wires the tracking core to the built-in simulator
//! so the whole pipeline can be exercised end-to-end.

use deha_track::app::TrackerApp;
use deha_track::config::AppConfig;
use deha_track::devices::{AxisEstimator, MockDepthSource, MockSourceConfig};
use deha_track::error::{Error, Result};
use deha_track::transport::LogSink;
use std::env;
use std::sync::atomic::Ordering;

/// Parse config path from command line arguments.
///
/// Supports:
/// - `deha-track <path>` (positional)
/// - `deha-track --config <path>` (flag-based)
/// - `deha-track -c <path>` (short flag)
///
/// Defaults to `/etc/deha-track.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    // Default path
    "/etc/deha-track.toml".to_string()
}

fn main() -> Result<()> {
    // Load configuration; a missing default file falls back to built-in
    // defaults so the simulator runs out of the box
    let config_path = parse_config_path();
    let config = match AppConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(Error::Io(_)) => AppConfig::default(),
        Err(e) => return Err(e),
    };

    // Initialize logger; RUST_LOG overrides the configured default level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.clone()),
    )
    .init();

    log::info!("DehaTrack v{} starting...", env!("CARGO_PKG_VERSION"));
    log::info!("Using config: {}", config_path);

    let source = Box::new(MockDepthSource::new(MockSourceConfig::default()));
    let estimator = Box::new(AxisEstimator::default());
    let sink = Box::new(LogSink);

    let mut app = TrackerApp::new(&config, source, estimator, sink);

    // Set up shutdown signal handler; observed between frames only
    let shutdown = app.shutdown_flag();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        shutdown.store(true, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    log::info!("Tracking with simulated depth source. Press Ctrl-C to stop.");
    app.run()?;

    log::info!("DehaTrack stopped");
    Ok(())
}
