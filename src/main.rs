//! Asteroid Destroyer entry point

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use asteroid_destroyer::config::{AppConfig, TrackingStrategy};
use asteroid_destroyer::display::{HeadlessDisplay, HeadlessOptions, ScriptedKey};
use asteroid_destroyer::error::{ConfigError, StartupError};
use asteroid_destroyer::tracking::Backends;
use asteroid_destroyer::App;

#[derive(Parser, Debug)]
#[command(name = "asteroid-destroyer")]
#[command(about = "Webcam-controlled arcade game: point at falling asteroids to destroy them")]
struct Cli {
    /// JSON configuration file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the default configuration as JSON and exit
    #[arg(long)]
    write_default_config: bool,

    /// RNG seed for asteroid spawning (defaults to the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Override the tracking strategy: color, ml or hand
    #[arg(long)]
    strategy: Option<String>,

    /// Replay PNG captures from this directory instead of the webcam
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Start a game immediately instead of waiting on the menu
    #[arg(long)]
    autostart: bool,

    /// Press a key before the given frame, e.g. `--key 0:Space --key 300:Escape`
    #[arg(long = "key", value_name = "TICK:KEY")]
    keys: Vec<ScriptedKey>,

    /// Stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Write every Nth rendered frame as PNG
    #[arg(long)]
    snapshot_every: Option<u64>,

    #[arg(long, default_value = "snapshots")]
    snapshot_dir: PathBuf,

    /// Run as fast as possible instead of at the target frame rate
    #[arg(long)]
    unpaced: bool,

    /// Show the tracker debug view from the start
    #[arg(long)]
    debug: bool,
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn build_config(cli: &Cli) -> Result<AppConfig, StartupError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    if let Some(name) = &cli.strategy {
        config.tracker.strategy = TrackingStrategy::from_str(name).ok_or_else(|| {
            ConfigError::Invalid(format!("unknown tracking strategy '{name}'"))
        })?;
    }
    if let Some(dir) = &cli.source_dir {
        config.camera.source_dir = Some(dir.clone());
    }
    config.debug_overlay |= cli.debug;
    Ok(config)
}

fn run(cli: Cli) -> Result<(), StartupError> {
    let config = build_config(&cli)?;
    let seed = cli.seed.unwrap_or_else(clock_seed);

    let display = HeadlessDisplay::new(HeadlessOptions {
        autostart: cli.autostart,
        keys: cli.keys,
        max_ticks: cli.max_ticks,
        snapshot_every: cli.snapshot_every,
        snapshot_dir: cli.snapshot_dir,
    });

    // No model runtime is linked into this binary; the ML and hand
    // strategies need backends supplied by an embedding application.
    let mut app = App::setup(config, Backends::default(), Box::new(display), seed)?;
    if cli.unpaced {
        app.set_unpaced();
    }
    app.run();
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if cli.write_default_config {
        return match AppConfig::default().to_json() {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    log::info!("Asteroid Destroyer starting...");
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Startup failed: {e}");
            ExitCode::FAILURE
        }
    }
}
