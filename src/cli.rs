//! Command-line interface definitions.
//!
//! Uses clap derive API for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::intensity::Intensity;
use crate::output::Format;

/// Earthquake early-warning intensity and wave arrival prediction.
#[derive(Parser, Debug)]
#[command(name = "seismocast")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Command,

    /// Region catalog JSON (defaults to the bundled catalog)
    #[arg(long, global = true)]
    pub regions: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    pub quiet: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Predict intensity and arrival times for one alert or earthquake
    Predict(PredictArgs),

    /// Show how far the P and S waves have travelled
    Wavefront(WavefrontArgs),

    /// Replay a stream of alerts (NDJSON), predicting every accepted revision
    Replay(ReplayArgs),

    /// List the region catalog
    Regions(RegionsArgs),
}

/// Model overrides shared by commands that run a prediction.
#[derive(Args, Debug, Clone, Copy)]
pub struct ModelArgs {
    /// Site amplification for regions without their own
    #[arg(long)]
    pub site_effect: Option<f64>,

    /// P-wave velocity at the surface (km/s)
    #[arg(long)]
    pub vp: Option<f64>,

    /// P-wave velocity gradient with depth (1/s)
    #[arg(long)]
    pub gradient: Option<f64>,

    /// Vp/Vs ratio used to derive S-wave velocities
    #[arg(long)]
    pub vp_vs_ratio: Option<f64>,
}

/// Output filters shared by commands that print predictions.
#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    /// Minimum intensity to show (0, 1, 2, 3, 4, 5-, 5+, 6-, 6+, 7)
    #[arg(long, value_parser = parse_intensity)]
    pub min_intensity: Option<Intensity>,

    /// Only show these cities (repeatable)
    #[arg(long = "city")]
    pub cities: Vec<String>,

    /// Only show regions within this epicentral distance (km)
    #[arg(long)]
    pub radius: Option<f64>,

    /// Show every region instead of the strongest region per city
    #[arg(long)]
    pub all_regions: bool,
}

/// Arguments for the `predict` command.
#[derive(Parser, Debug)]
pub struct PredictArgs {
    /// Alert or earthquake JSON file (reads stdin when omitted)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `wavefront` command.
#[derive(Parser, Debug)]
pub struct WavefrontArgs {
    /// Alert or earthquake JSON file (reads stdin when omitted)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Seconds after origin time (repeatable; defaults to now)
    #[arg(long = "at", allow_negative_numbers = true)]
    pub at: Vec<f64>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `replay` command.
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// NDJSON file with one alert per line (reads stdin when omitted)
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Arguments for the `regions` command.
#[derive(Parser, Debug)]
pub struct RegionsArgs {
    /// Only list these cities (repeatable)
    #[arg(long = "city")]
    pub cities: Vec<String>,

    /// Output format
    #[arg(long, short = 'f', default_value = "human", value_parser = parse_format)]
    pub format: Format,
}

/// Parse an output format from string.
fn parse_format(s: &str) -> Result<Format, String> {
    s.parse()
}

/// Parse an intensity label from string.
fn parse_intensity(s: &str) -> Result<Intensity, String> {
    s.parse().map_err(|e| format!("{e}"))
}
