//! cctv-prep: CCTV dataset preparation and surveillance distance estimation.
//!
//! The crate turns flat folders of images and YOLO label files into the
//! `images/{train,val,test}` + `labels/{train,val,test}` layout expected by
//! object-detection trainers, with a reproducible seeded split, and computes
//! camera-to-target distances from the DORI standard and field-of-view
//! geometry.
//!
//! # Modules
//!
//! - [`split`]: Seeded train/val/test partitioning
//! - [`prepare`]: Image/label pairing and materialization
//! - [`distance`]: DORI and field-of-view distance formulas
//! - [`convert`]: HEIC conversion collaborator and the preparation facade
//! - [`cameras`]: Camera location CSV loading
//! - [`config`]: Run configuration
//! - [`error`]: Error types for cctv-prep operations

pub mod cameras;
pub mod config;
pub mod convert;
pub mod distance;
pub mod error;
pub mod logging;
pub mod prepare;
pub mod split;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub use error::PrepError;

use config::PrepConfig;
use convert::{CommandConverter, DatasetPreparation, ImageConverter};
use distance::DoriLevel;
use prepare::{DataYaml, DatasetPreparer, FsDatasetPreparer, PrepareOutcome, PrepareReport};
use split::SplitName;

/// The cctv-prep CLI application.
#[derive(Parser)]
#[command(name = "cctv-prep")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true, env = "CCTV_PREP_CONFIG")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Split image/label pairs into train/val/test folders.
    Prepare(PrepareArgs),
    /// Estimate surveillance distances.
    #[command(subcommand)]
    Distance(DistanceCommand),
    /// Convert a folder of HEIC images to JPEG.
    ConvertHeic(ConvertArgs),
    /// List unique cameras from a location CSV.
    Cameras(CamerasArgs),
}

/// Report output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for the prepare subcommand.
#[derive(clap::Args)]
struct PrepareArgs {
    /// Folder with the source images.
    #[arg(long)]
    source_images: Option<PathBuf>,

    /// Folder with the source labels (`<stem>.txt`).
    #[arg(long)]
    source_labels: Option<PathBuf>,

    /// Output root receiving images/ and labels/.
    #[arg(long)]
    output_root: Option<PathBuf>,

    /// Fraction of pairs for training.
    #[arg(long)]
    train_ratio: Option<f64>,

    /// Fraction of pairs for validation; the remainder is test.
    #[arg(long)]
    val_ratio: Option<f64>,

    /// Shuffle seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Move files instead of copying them.
    #[arg(long = "move", conflicts_with = "copy")]
    move_files: bool,

    /// Copy files, overriding `move_files` from the config.
    #[arg(long)]
    copy: bool,

    /// Only consider images with this extension (repeatable).
    #[arg(long = "ext")]
    extensions: Vec<String>,

    /// Convert HEIC images from this folder into the source images first.
    #[arg(long)]
    heic_input: Option<PathBuf>,

    /// Write an Ultralytics data.yaml here after preparing.
    #[arg(long)]
    data_yaml: Option<PathBuf>,

    /// Class names for data.yaml (comma separated).
    #[arg(long, value_delimiter = ',')]
    names: Vec<String>,

    /// Pair and split without writing anything.
    #[arg(long)]
    dry_run: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(Subcommand)]
enum DistanceCommand {
    /// Maximum distance meeting a DORI pixel density.
    Dori(DoriArgs),
    /// Distance at which a target fills the horizontal field of view.
    Fov(FovArgs),
    /// DORI distances for every level.
    Table(TableArgs),
}

#[derive(clap::Args)]
struct DoriArgs {
    /// Sensor height in pixels.
    #[arg(long)]
    sensor_height_px: u32,

    /// Target height in meters.
    #[arg(long)]
    target_height_m: f64,

    /// DORI level: detection, observation, recognition or identification.
    #[arg(long, default_value = "recognition", conflicts_with = "ppm")]
    level: String,

    /// Explicit pixels per meter instead of a level.
    #[arg(long)]
    ppm: Option<u32>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(clap::Args)]
struct FovArgs {
    /// Target width in meters.
    #[arg(long)]
    target_width_m: f64,

    /// Horizontal field of view in degrees.
    #[arg(long)]
    hfov_deg: f64,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(clap::Args)]
struct TableArgs {
    /// Sensor height in pixels.
    #[arg(long)]
    sensor_height_px: u32,

    /// Target height in meters.
    #[arg(long)]
    target_height_m: f64,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Folder with HEIC images.
    #[arg(long)]
    input: PathBuf,

    /// Folder receiving JPEG files.
    #[arg(long)]
    output_dir: PathBuf,

    /// Converter program invoked as `<program> <in.heic> <out.jpg>`.
    #[arg(long)]
    program: Option<String>,
}

#[derive(clap::Args)]
struct CamerasArgs {
    /// Camera location CSV (latitude, longitude, url).
    csv: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

/// Run the cctv-prep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PrepError> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => PrepConfig::load(path)?,
        None => PrepConfig::default(),
    };

    match cli.command {
        Some(Commands::Prepare(args)) => run_prepare(args, config),
        Some(Commands::Distance(command)) => run_distance(command),
        Some(Commands::ConvertHeic(args)) => run_convert(args, &config),
        Some(Commands::Cameras(args)) => run_cameras(args, &config),
        None => {
            println!("cctv-prep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("CCTV dataset preparation and surveillance distance estimation.");
            println!();
            println!("Run 'cctv-prep --help' for usage information.");
            Ok(())
        }
    }
}

/// Fold CLI overrides into the configuration.
fn apply_prepare_overrides(args: &PrepareArgs, mut config: PrepConfig) -> PrepConfig {
    if let Some(path) = &args.source_images {
        config.source_images = path.clone();
    }
    if let Some(path) = &args.source_labels {
        config.source_labels = path.clone();
    }
    if let Some(path) = &args.output_root {
        config.output_root = path.clone();
    }
    if let Some(ratio) = args.train_ratio {
        config.train_ratio = ratio;
    }
    if let Some(ratio) = args.val_ratio {
        config.val_ratio = ratio;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.move_files {
        config.move_files = true;
    } else if args.copy {
        config.move_files = false;
    }
    if !args.extensions.is_empty() {
        config.image_extensions = args.extensions.clone();
    }
    if args.heic_input.is_some() {
        config.heic_input = args.heic_input.clone();
    }
    if args.data_yaml.is_some() {
        config.data_yaml = args.data_yaml.clone();
    }
    if !args.names.is_empty() {
        config.class_names = args.names.clone();
    }
    config
}

/// Execute the prepare subcommand.
fn run_prepare(args: PrepareArgs, config: PrepConfig) -> Result<(), PrepError> {
    let config = apply_prepare_overrides(&args, config);
    let request = config.prepare_request();
    let preparer = FsDatasetPreparer::with_seed(config.seed);

    if args.dry_run {
        let report = match preparer.plan(&request)? {
            Some(plan) => preparer.plan_report(&request, &plan),
            None => preparer.empty_report(&request),
        };
        return emit(&report, args.output);
    }

    let facade = DatasetPreparation::new(CommandConverter::new(&config.converter_program), preparer);
    let report = match facade.run(config.heic_input.as_deref(), &request) {
        Ok(report) => report,
        Err(PrepError::MaterializeFailed { failed, report }) => {
            emit(&report, args.output)?;
            return Err(PrepError::MaterializeFailed { failed, report });
        }
        Err(err) => return Err(err),
    };

    emit(&report, args.output)?;

    if let Some(path) = &config.data_yaml {
        if report.outcome == PrepareOutcome::Materialized {
            let has_test = report
                .split(SplitName::Test)
                .is_some_and(|summary| summary.items > 0);
            let descriptor = DataYaml::for_layout(&request.output_images, config.class_names.clone(), has_test);
            prepare::write_data_yaml(path, &descriptor)?;
        }
    }

    Ok(())
}

/// Execute the distance subcommands.
fn run_distance(command: DistanceCommand) -> Result<(), PrepError> {
    #[derive(Serialize)]
    struct DistanceResult {
        method: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        level: Option<DoriLevel>,
        #[serde(skip_serializing_if = "Option::is_none")]
        ppm: Option<u32>,
        max_distance_m: f64,
    }

    match command {
        DistanceCommand::Dori(args) => {
            let (level, ppm) = match args.ppm {
                Some(ppm) => (None, ppm),
                None => {
                    let level: DoriLevel = args.level.parse()?;
                    (Some(level), level.ppm())
                }
            };
            let max_distance_m = distance::max_distance_dori(args.sensor_height_px, args.target_height_m, ppm)?;
            let result = DistanceResult {
                method: "dori",
                level,
                ppm: Some(ppm),
                max_distance_m,
            };
            match args.output {
                ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                ReportFormat::Text => {
                    let label = level.map_or_else(|| format!("{} PPM", ppm), |l| format!("{} ({} PPM)", l, ppm));
                    println!("Maximum {} distance: {:.2} meters", label, max_distance_m);
                }
            }
        }
        DistanceCommand::Fov(args) => {
            let max_distance_m = distance::max_distance_fov(args.target_width_m, args.hfov_deg)?;
            let result = DistanceResult {
                method: "fov",
                level: None,
                ppm: None,
                max_distance_m,
            };
            match args.output {
                ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                ReportFormat::Text => {
                    println!("Maximum observation distance: {:.2} meters", max_distance_m)
                }
            }
        }
        DistanceCommand::Table(args) => {
            let table = distance::dori_table(args.sensor_height_px, args.target_height_m)?;
            match args.output {
                ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
                ReportFormat::Text => {
                    for row in &table {
                        println!("{:<15} {:>4} PPM  {:>8.2} m", row.level.name(), row.ppm, row.max_distance_m);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Execute the convert-heic subcommand.
fn run_convert(args: ConvertArgs, config: &PrepConfig) -> Result<(), PrepError> {
    let program = args
        .program
        .unwrap_or_else(|| config.converter_program.clone());
    let summary = CommandConverter::new(program).convert_heic_to_jpg(&args.input, &args.output_dir)?;
    println!(
        "Converted {} image(s) into {}",
        summary.converted.len(),
        args.output_dir.display()
    );
    Ok(())
}

/// Execute the cameras subcommand.
fn run_cameras(args: CamerasArgs, config: &PrepConfig) -> Result<(), PrepError> {
    let path = args.csv.or_else(|| config.camera_csv.clone()).ok_or_else(|| {
        PrepError::MissingInput("no camera CSV given (pass a path or set camera_csv)".to_string())
    })?;
    let cameras = cameras::load_cameras(&path)?;

    match args.output {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&cameras)?),
        ReportFormat::Text => {
            println!("{} camera(s)", cameras.len());
            for camera in &cameras {
                println!("  {:.6}, {:.6}  {}", camera.latitude, camera.longitude, camera.url);
            }
        }
    }
    Ok(())
}

fn emit(report: &PrepareReport, format: ReportFormat) -> Result<(), PrepError> {
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        ReportFormat::Text => print!("{}", report),
    }
    Ok(())
}
