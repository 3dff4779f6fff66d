//! seismocast - earthquake early-warning intensity prediction from your terminal.
//!
//! Reads EEW alerts as JSON and prints the expected intensity and wave
//! arrival times for every monitored region.

use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{debug, error, info, instrument, warn};

use seismocast::cli::{self, Cli, Command, FilterArgs, ModelArgs};
use seismocast::filters::PredictionFilter;
use seismocast::model::{TravelTimeModel, VelocityModel};
use seismocast::models::{
    InputRecord, OutputAlert, OutputEarthquake, OutputRegion, OutputWavefront, RawEew,
};
use seismocast::output;
use seismocast::revisions::RevisionTracker;
use seismocast::{AttenuationModel, Earthquake, Eew, RegionCatalog};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    let catalog = load_catalog(cli.regions.as_deref())?;

    match cli.command {
        Command::Predict(args) => cmd_predict(&catalog, args),
        Command::Wavefront(args) => cmd_wavefront(&catalog, args),
        Command::Replay(args) => cmd_replay(&catalog, args),
        Command::Regions(args) => cmd_regions(&catalog, &args),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(verbose: bool, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Load the region catalog once at startup.
fn load_catalog(path: Option<&Path>) -> Result<RegionCatalog> {
    let catalog = match path {
        Some(path) => RegionCatalog::from_file(path)
            .with_context(|| format!("failed to load region catalog {}", path.display()))?,
        None => RegionCatalog::bundled().context("bundled region catalog is corrupt")?,
    };
    debug!("catalog has {} regions", catalog.len());
    Ok(catalog)
}

/// Apply command-line overrides to the default model.
fn build_model(args: ModelArgs) -> AttenuationModel {
    let defaults = AttenuationModel::default();
    let p = VelocityModel {
        surface_velocity: args.vp.unwrap_or(TravelTimeModel::DEFAULT_VP),
        gradient: args.gradient.unwrap_or(TravelTimeModel::DEFAULT_GRADIENT),
    };
    AttenuationModel {
        default_site_effect: args.site_effect.unwrap_or(defaults.default_site_effect),
        travel_time: TravelTimeModel::from_p(
            p,
            args.vp_vs_ratio.unwrap_or(TravelTimeModel::DEFAULT_VP_VS_RATIO),
        ),
        ..defaults
    }
}

fn build_filter(args: &FilterArgs) -> PredictionFilter {
    PredictionFilter {
        min_intensity: args.min_intensity,
        cities: args.cities.clone(),
        radius_km: args.radius,
    }
}

/// Read a file, or stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

#[instrument(skip_all)]
fn load_earthquake(path: Option<&Path>) -> Result<Earthquake> {
    let json = read_input(path)?;
    InputRecord::from_json(&json)
        .and_then(InputRecord::into_earthquake)
        .context("failed to parse earthquake")
}

/// Run the prediction and select the rows to print.
fn prediction_rows(
    earthquake: &Earthquake,
    catalog: &RegionCatalog,
    model: &AttenuationModel,
    filter_args: &FilterArgs,
) -> Result<Vec<OutputRegion>> {
    earthquake
        .calc_expected_intensity_with(model, catalog.regions(), catalog.city_groups())
        .context("failed to calculate expected intensity")?;

    let filter = build_filter(filter_args);
    let origin = earthquake.time();
    let mut rows = Vec::new();

    if filter_args.all_regions {
        let table = earthquake.expected_intensity()?;
        for region in catalog.regions() {
            let Some(entry) = table.get(&region.code) else {
                continue;
            };
            if filter.matches(&region.city, entry) {
                rows.push(OutputRegion::new(&region.city, entry, Some(region), origin));
            }
        }
    } else {
        for (city, entry) in earthquake.city_max_intensity()? {
            if filter.matches(city, entry) {
                rows.push(OutputRegion::new(city, entry, catalog.get(entry.code), origin));
            }
        }
    }

    // Strongest first, then earliest arrival
    rows.sort_by(|a, b| {
        b.intensity
            .cmp(&a.intensity)
            .then(a.s_arrival_s.total_cmp(&b.s_arrival_s))
    });
    Ok(rows)
}

/// Execute the `predict` command.
fn cmd_predict(catalog: &RegionCatalog, args: cli::PredictArgs) -> Result<()> {
    let earthquake = load_earthquake(args.input.as_deref())?;
    let model = build_model(args.model);
    let rows = prediction_rows(&earthquake, catalog, &model, &args.filter)?;

    info!(
        "M{:.1} depth {}km: {} rows",
        earthquake.mag(),
        earthquake.depth(),
        rows.len()
    );

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_prediction(
        &mut handle,
        &OutputEarthquake::from(&earthquake),
        &rows,
        args.format,
    )?;
    Ok(())
}

/// Execute the `wavefront` command.
fn cmd_wavefront(catalog: &RegionCatalog, args: cli::WavefrontArgs) -> Result<()> {
    let earthquake = load_earthquake(args.input.as_deref())?;
    let model = build_model(args.model);
    earthquake
        .calc_expected_intensity_with(&model, catalog.regions(), catalog.city_groups())
        .context("failed to calculate expected intensity")?;

    let times = if args.at.is_empty() {
        let elapsed = Utc::now().signed_duration_since(earthquake.time());
        #[allow(clippy::cast_precision_loss)]
        let seconds = elapsed.num_milliseconds() as f64 / 1000.0;
        vec![seconds]
    } else {
        args.at
    };

    let mut fronts = Vec::with_capacity(times.len());
    for seconds in times {
        let (p_km, s_km) = earthquake.travel_distance(seconds)?;
        fronts.push(OutputWavefront {
            seconds,
            p_km,
            s_km,
        });
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_wavefronts(&mut handle, &fronts, args.format)?;
    Ok(())
}

/// Execute the `replay` command - process a stream of alert revisions.
fn cmd_replay(catalog: &RegionCatalog, args: cli::ReplayArgs) -> Result<()> {
    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(io::BufReader::new(
            std::fs::File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(io::BufReader::new(io::stdin())),
    };

    let model = build_model(args.model);
    let mut tracker = RevisionTracker::with_default_capacity();
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("failed to read alert stream")?;
        if line.trim().is_empty() {
            continue;
        }

        let eew = match serde_json::from_str::<RawEew>(&line)
            .map_err(seismocast::EewError::from)
            .and_then(Eew::try_from)
        {
            Ok(eew) => eew,
            Err(e) => {
                warn!("line {}: skipping invalid alert: {}", line_no + 1, e);
                continue;
            }
        };

        let result = tracker.check_and_mark(eew.id(), eew.serial(), eew.is_final());
        if !result.should_emit() {
            warn!(
                "alert {} serial {} rejected ({})",
                eew.id(),
                eew.serial(),
                result.as_str()
            );
            continue;
        }

        let alert = OutputAlert::new(&eew, result.is_update());
        if args.format != output::Format::Human {
            info!(
                "alert {} #{} from {} ({}{})",
                alert.id,
                alert.serial,
                alert.provider_name,
                result.as_str(),
                if alert.is_final { ", final" } else { "" }
            );
        }

        let earthquake = eew.earthquake();
        let rows = prediction_rows(earthquake, catalog, &model, &args.filter)?;
        if let Err(e) = output::write_alert(
            &mut handle,
            &alert,
            &OutputEarthquake::from(earthquake),
            &rows,
            args.format,
        ) {
            warn!("failed to write prediction: {}", e);
        }
        let _ = handle.flush();
    }

    debug!(
        "replay done: {} alerts, {} rejected",
        tracker.total_seen(),
        tracker.total_rejected()
    );
    Ok(())
}

/// Execute the `regions` command.
fn cmd_regions(catalog: &RegionCatalog, args: &cli::RegionsArgs) -> Result<()> {
    let regions: Vec<_> = catalog
        .regions()
        .iter()
        .filter(|r| args.cities.is_empty() || args.cities.iter().any(|c| c.eq_ignore_ascii_case(&r.city)))
        .collect();

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    output::write_regions(&mut handle, &regions, args.format)?;
    Ok(())
}
