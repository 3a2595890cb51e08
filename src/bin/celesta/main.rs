//! celesta - playable terminal instrument
//!
//! Run with: cargo run --release -- [--config celesta.toml] [--log celesta.log]

mod app;
mod audio;
mod ui;

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::Mutex,
};

use app::Celesta;
use celesta::{dsp::Waveform, synth::config::MAX_KEY_HOLD, InstrumentConfig};
use clap::Parser;
use color_eyre::eyre::{ensure, Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "celesta", version, about = "Play pentatonic pads from your terminal")]
struct Args {
    /// TOML file with instrument settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Oscillator waveform: sine, triangle, square or saw
    #[arg(short, long)]
    waveform: Option<Waveform>,

    /// Initial master volume, 0.0 to 1.0
    #[arg(short, long)]
    volume: Option<f32>,

    /// Seconds a key counts as held when the terminal cannot report key release
    #[arg(long)]
    hold: Option<f32>,

    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long)]
    log: Option<PathBuf>,
}

impl Args {
    fn instrument_config(&self) -> EyreResult<InstrumentConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => InstrumentConfig::default(),
        };

        if let Some(waveform) = self.waveform {
            config = config.with_waveform(waveform);
        }
        if let Some(volume) = self.volume {
            config = config.with_master_volume(volume);
        }
        if let Some(hold) = self.hold {
            config = config.with_key_hold(hold);
        }
        ensure!(
            config.key_hold.is_finite() && (0.0..=MAX_KEY_HOLD).contains(&config.key_hold),
            "key hold must be between 0 and {MAX_KEY_HOLD} seconds, got {}",
            config.key_hold
        );
        Ok(config)
    }
}

fn load_config(path: &Path) -> EyreResult<InstrumentConfig> {
    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).wrap_err_with(|| format!("invalid config {}", path.display()))
}

fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("celesta=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let args = Args::parse();
    // The terminal belongs to the UI, so logs only go to a file
    if let Some(path) = &args.log {
        init_logging(path)?;
    }

    let config = args.instrument_config()?;
    Celesta::new(config).run()
}
