use anyhow::{Context, Result};
use clap::Parser;
use deskmon::audio::{AlertBeeper, BeepPattern, SilentAlert};
use deskmon::config::Config;
use deskmon::core::{BackendSlot, SensorPoller, SharedTelemetryStore};
use deskmon::ui::AlertSound;
use deskmon::WidgetApp;
use deskmon_sources::{OsCounters, SysinfoBackend};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

/// deskmon - hardware telemetry on the desktop layer
#[derive(Parser, Debug)]
#[command(name = "deskmon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,

    /// Config file to use instead of the default location
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run without alert sounds
    #[arg(long = "mute")]
    mute: bool,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    warn!("=== deskmon {} starting ===", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => Some(path),
        None => Config::config_path()
            .map_err(|e| warn!("{}, settings will not be saved", e))
            .ok(),
    };
    let config = match config_path.as_deref() {
        Some(path) => Config::load_or_default(path),
        None => Config::default(),
    };
    info!("Config: {:?}", config);

    let store = Arc::new(SharedTelemetryStore::new());
    let slot = Arc::new(BackendSlot::open(Box::new(SysinfoBackend::new())));
    let poller = SensorPoller::new(Arc::clone(&slot), Arc::clone(&store), Box::new(OsCounters::new()))
        .spawn()
        .context("Failed to start sensor poller")?;

    let sound: Box<dyn AlertSound> = if cli.mute {
        Box::new(SilentAlert)
    } else {
        match AlertBeeper::spawn(BeepPattern::default()) {
            Ok(beeper) => Box::new(beeper),
            Err(e) => {
                warn!("Alert sound disabled: {:#}", e);
                Box::new(SilentAlert)
            }
        }
    };

    #[cfg(windows)]
    let (ws, renderer) = deskmon::platform::win32::Win32Widget::create()?;
    #[cfg(not(windows))]
    let (ws, renderer) = {
        warn!("No desktop layer on this platform, running headless");
        (
            deskmon::platform::VirtualScreen::headless(),
            deskmon::ui::LogRenderer::new(),
        )
    };

    let mut app = WidgetApp::new(ws, renderer, sound, config, config_path, store);
    app.attach_sensors(poller, slot);
    app.run();

    warn!("=== deskmon stopped ===");
    Ok(())
}
