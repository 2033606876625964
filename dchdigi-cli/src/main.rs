//! dchdigi: command-line drift chamber digitization.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines,
    clippy::redundant_closure_for_method_calls
)]

use clap::{Parser, Subcommand};

use dchdigi_algorithms::{Digitizer, DigitizerConfig};
use dchdigi_core::EventHeader;
use dchdigi_geometry::{DetectorConfig, WireGeometryModel};
use dchdigi_io::{
    load_calibration, write_debug_histograms, DigiFileWriter, EventFileReader, OutputFormat,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error: {0}")]
    DchIo(#[from] dchdigi_io::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] dchdigi_geometry::Error),

    #[error("Digitization error: {0}")]
    Digitization(#[from] dchdigi_algorithms::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("no calibration file given (use --calibration or calibration_file in --config)")]
    MissingCalibration,
}

/// Digitization of simulated drift chamber hits.
#[derive(Parser)]
#[command(name = "dchdigi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Digitize the events of a JSON event file
    Process {
        /// Input event file
        input: PathBuf,

        /// Output file (.csv, .json or .bin)
        #[arg(short, long)]
        output: PathBuf,

        /// Cluster calibration file
        #[arg(long)]
        calibration: Option<PathBuf>,

        /// Digitizer configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Detector description file (JSON); IDEA defaults if omitted
        #[arg(long)]
        detector: Option<PathBuf>,

        /// Resolution along the wire (mm)
        #[arg(long)]
        z_resolution_mm: Option<f64>,

        /// Resolution perpendicular to the wire (mm)
        #[arg(long)]
        xy_resolution_mm: Option<f64>,

        /// Write debug histograms to this CSV file
        #[arg(long)]
        debug_histograms: Option<PathBuf>,

        /// Base seed for the per-event random streams
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads (default: all cores)
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Print sense wire descriptors of one layer
    Wires {
        /// Layer number (1-based)
        #[arg(long)]
        layer: u32,

        /// Single phi cell; all cells of the layer if omitted
        #[arg(long)]
        nphi: Option<u32>,

        /// Detector description file (JSON); IDEA defaults if omitted
        #[arg(long)]
        detector: Option<PathBuf>,
    },

    /// Show event and hit statistics of an event file
    Info {
        /// Input event file
        input: PathBuf,
    },
}

fn load_detector(path: Option<&Path>) -> Result<DetectorConfig> {
    Ok(match path {
        Some(path) => DetectorConfig::from_file(path)?,
        None => DetectorConfig::idea_defaults(),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Process {
            input,
            output,
            calibration,
            config,
            detector,
            z_resolution_mm,
            xy_resolution_mm,
            debug_histograms,
            seed,
            threads,
        } => {
            if let Some(threads) = threads {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build_global()?;
            }

            // file configuration first, then command-line overrides
            let mut config = match &config {
                Some(path) => DigitizerConfig::from_json(&std::fs::read_to_string(path)?)?,
                None => DigitizerConfig::default(),
            };
            if let Some(path) = calibration {
                config = config.with_calibration_file(path);
            }
            if let Some(z) = z_resolution_mm {
                config.z_resolution_mm = z;
            }
            if let Some(xy) = xy_resolution_mm {
                config.xy_resolution_mm = xy;
            }
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            if let Some(path) = debug_histograms {
                config = config.with_debug_histograms(true);
                config.out_debug_filename = path;
            }
            config.validate()?;

            let calibration_path = config
                .calibration_file
                .clone()
                .ok_or(CliError::MissingCalibration)?;
            let calibration = load_calibration(&calibration_path)?;
            let geometry = Arc::new(WireGeometryModel::new(load_detector(detector.as_deref())?)?);
            let format = OutputFormat::from_path(&output)?;
            let digitizer =
                Digitizer::with_bitfield_decoder(config, geometry, Arc::new(calibration))?;

            let start = Instant::now();
            let reader = EventFileReader::open(&input)?;
            let events = reader.events();
            log::info!("read {} events from {}", events.len(), input.display());

            let collections = if digitizer.config().create_debug_histograms {
                let (collections, histos) = digitizer.process_events_with_debug(events)?;
                write_debug_histograms(&digitizer.config().out_debug_filename, &histos)?;
                collections
            } else {
                digitizer.process_events(events)?
            };

            let n_hits: usize = events.iter().map(|e| e.len()).sum();
            let n_digis: usize = collections.iter().map(|c| c.len()).sum();
            let n_clusters: u64 = collections
                .iter()
                .flat_map(|c| c.digis.iter())
                .map(|d| u64::from(d.n_clusters))
                .sum();

            let headers: Vec<EventHeader> = events.iter().map(|e| e.header).collect();
            let records: Vec<_> = headers.into_iter().zip(collections).collect();
            let mut writer = DigiFileWriter::create(&output)?;
            writer.write(format, &records)?;
            log::info!("wrote {:?} output to {}", format, output.display());

            println!(
                "Digitized {} events in {:.2}s",
                records.len(),
                start.elapsed().as_secs_f64()
            );
            println!("Total hits: {}", n_hits);
            println!("Total digis: {}", n_digis);
            println!("Total clusters: {}", n_clusters);
        }

        Commands::Wires {
            layer,
            nphi,
            detector,
        } => {
            let geometry = WireGeometryModel::new(load_detector(detector.as_deref())?)?;
            let info = geometry.layer_info(layer)?;

            println!(
                "Layer {} (superlayer {}): {} cells, r = {:.4} cm, stereo = {:.6} rad",
                info.layer, info.superlayer, info.ncells, info.radius_sw_z0, info.stereo_angle_z0
            );
            println!(
                "{:>5} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>10}",
                "nphi", "phi_z0", "x0", "y0", "z0", "dx", "dy", "dz"
            );
            println!("{:-<100}", "");

            let (first, last) = nphi.map_or((0, info.ncells.saturating_sub(1)), |n| (n, n));
            for n in first..=last {
                let wire = geometry.wire(layer, n)?;
                let p = wire.z0_point();
                let d = wire.direction();
                println!(
                    "{:>5} | {:>10.6} | {:>10.4} | {:>10.4} | {:>10.4} | {:>10.6} | {:>10.6} | {:>10.6}",
                    n,
                    wire.phi_z0(),
                    p.x,
                    p.y,
                    p.z,
                    d.x,
                    d.y,
                    d.z
                );
            }
        }

        Commands::Info { input } => {
            let reader = EventFileReader::open(&input)?;
            let summary = reader.summary();
            let file_size = std::fs::metadata(&input)?.len();

            println!("File: {}", input.display());
            println!(
                "Size: {} bytes ({:.2} MB)",
                file_size,
                file_size as f64 / 1_000_000.0
            );
            println!("Runs: {}", summary.n_runs);
            println!("Events: {}", summary.n_events);
            println!("Hits: {}", summary.n_hits);
            if summary.n_events > 0 {
                println!(
                    "Hits per event: {:.2} (min {}, max {})",
                    summary.mean_hits(),
                    summary.min_hits,
                    summary.max_hits
                );
                println!("Total energy deposit: {:.4e} GeV", summary.total_edep);
            }
        }
    }

    Ok(())
}
