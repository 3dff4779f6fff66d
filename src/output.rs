//! Output formatters for predictions.
//!
//! Supports human-readable (with colors), JSON, and NDJSON formats.

use std::io::{self, Write};

use serde::Serialize;

use crate::intensity::Intensity;
use crate::models::{OutputAlert, OutputEarthquake, OutputRegion, OutputWavefront};
use crate::region::Region;

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

// Intensity-based colors
const PURPLE: &str = "\x1b[95m"; // 6- and above
const RED: &str = "\x1b[91m"; // 5- / 5+
const YELLOW: &str = "\x1b[93m"; // 4
const GREEN: &str = "\x1b[92m"; // 3
const CYAN: &str = "\x1b[96m"; // 1-2
const WHITE: &str = "\x1b[97m"; // 0

const ICON_QUAKE: &str = "🌍";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON document
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// Get the color code for an intensity level.
fn intensity_color(intensity: Intensity) -> &'static str {
    match intensity {
        Intensity::SixWeak | Intensity::SixStrong | Intensity::Seven => PURPLE,
        Intensity::FiveWeak | Intensity::FiveStrong => RED,
        Intensity::Four => YELLOW,
        Intensity::Three => GREEN,
        Intensity::One | Intensity::Two => CYAN,
        Intensity::Zero => WHITE,
    }
}

fn to_json_line<T: Serialize>(value: &T) -> io::Result<String> {
    serde_json::to_string(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn to_json_pretty<T: Serialize>(value: &T) -> io::Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

#[derive(Serialize)]
struct PredictionDocument<'a> {
    earthquake: &'a OutputEarthquake,
    regions: &'a [OutputRegion],
}

#[derive(Serialize)]
struct AlertDocument<'a> {
    alert: &'a OutputAlert,
    earthquake: &'a OutputEarthquake,
    regions: &'a [OutputRegion],
}

/// Write the earthquake summary line.
fn write_header<W: Write>(writer: &mut W, earthquake: &OutputEarthquake) -> io::Result<()> {
    let place = earthquake.place.as_deref().unwrap_or("Unknown location");
    let reported = earthquake
        .reported_max_intensity
        .map(|i| format!(" │ reported max {BOLD}{}{i}{RESET}", intensity_color(i)))
        .unwrap_or_default();

    writeln!(
        writer,
        "{ICON_QUAKE} {BOLD}M{:.1}{RESET} │ {DIM}{:>3}km{RESET} │ {} │ {place} {DIM}({:.2}°, {:.2}°){RESET}{reported}",
        earthquake.magnitude,
        earthquake.depth_km,
        earthquake.time,
        earthquake.latitude,
        earthquake.longitude,
    )
}

/// Write a prediction in human-readable format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_prediction_human<W: Write>(
    writer: &mut W,
    earthquake: &OutputEarthquake,
    rows: &[OutputRegion],
) -> io::Result<()> {
    write_header(writer, earthquake)?;

    for row in rows {
        let color = intensity_color(row.intensity);
        let town = row.town.as_deref().unwrap_or("?");
        writeln!(
            writer,
            "  {color}{BOLD}{:>2}{RESET} │ {:<18} │ {town} {DIM}({}){RESET} │ \
             {DIM}{:>6.1}km{RESET} │ P {:>5.1}s │ S {:>5.1}s",
            row.intensity.label(),
            row.city,
            row.code,
            row.surface_distance_km,
            row.p_arrival_s,
            row.s_arrival_s,
        )?;
    }
    Ok(())
}

/// Write a prediction in the specified format.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_prediction<W: Write>(
    writer: &mut W,
    earthquake: &OutputEarthquake,
    rows: &[OutputRegion],
    format: Format,
) -> io::Result<()> {
    match format {
        Format::Human => write_prediction_human(writer, earthquake, rows),
        Format::Json => {
            let doc = PredictionDocument {
                earthquake,
                regions: rows,
            };
            writeln!(writer, "{}", to_json_pretty(&doc)?)
        }
        Format::Ndjson => {
            for row in rows {
                writeln!(writer, "{}", to_json_line(row)?)?;
            }
            Ok(())
        }
    }
}

/// Write one accepted alert revision and its prediction.
///
/// Human output prefixes the prediction with an alert banner. JSON writes
/// one pretty document per alert and NDJSON one line per alert, each holding
/// the alert, the earthquake and the predicted regions, so a replayed stream
/// stays machine-readable.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_alert<W: Write>(
    writer: &mut W,
    alert: &OutputAlert,
    earthquake: &OutputEarthquake,
    rows: &[OutputRegion],
    format: Format,
) -> io::Result<()> {
    let doc = AlertDocument {
        alert,
        earthquake,
        regions: rows,
    };
    match format {
        Format::Human => {
            if alert.update {
                write!(writer, "{DIM}↻ UPDATE: {RESET}")?;
            }
            let final_tag = if alert.is_final { " (final)" } else { "" };
            writeln!(
                writer,
                "{BOLD}{}{RESET} #{} {}{final_tag}",
                alert.provider_name, alert.serial, alert.id
            )?;
            write_prediction_human(writer, earthquake, rows)
        }
        Format::Json => writeln!(writer, "{}", to_json_pretty(&doc)?),
        Format::Ndjson => writeln!(writer, "{}", to_json_line(&doc)?),
    }
}

/// Write wavefront positions in the specified format.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_wavefronts<W: Write>(
    writer: &mut W,
    fronts: &[OutputWavefront],
    format: Format,
) -> io::Result<()> {
    match format {
        Format::Human => {
            for front in fronts {
                writeln!(
                    writer,
                    "T+{:>7.1}s │ P {BOLD}{:>8.1}km{RESET} │ S {BOLD}{:>8.1}km{RESET}",
                    front.seconds, front.p_km, front.s_km
                )?;
            }
            Ok(())
        }
        Format::Json => writeln!(writer, "{}", to_json_pretty(&fronts)?),
        Format::Ndjson => {
            for front in fronts {
                writeln!(writer, "{}", to_json_line(front)?)?;
            }
            Ok(())
        }
    }
}

/// Write catalog regions in the specified format.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_regions<W: Write>(writer: &mut W, regions: &[&Region], format: Format) -> io::Result<()> {
    match format {
        Format::Human => {
            for region in regions {
                writeln!(
                    writer,
                    "{:>5} │ {:<18} │ {:<14} │ {DIM}{:.4}°, {:.4}°{RESET}",
                    region.code, region.city, region.town, region.lat, region.lon
                )?;
            }
            Ok(())
        }
        Format::Json => writeln!(writer, "{}", to_json_pretty(&regions)?),
        Format::Ndjson => {
            for region in regions {
                writeln!(writer, "{}", to_json_line(region)?)?;
            }
            Ok(())
        }
    }
}
