//! Headless CFD post-processing
//!
//! # Usage
//!
//! ```bash
//! # Nusselt number per saved time, from <case>/<time>/wallHeatTransferCoeff
//! foam-post nusselt --case runs/plate --length 0.5 --conductivity 0.025
//!
//! # Same, constants from a JSON file, CSV output, 4 workers
//! foam-post nusselt --config post.json --format csv --threads 4
//!
//! # pvbatch script rendering U and T slices for every saved time
//! foam-post render --case runs/plate
//! pvbatch render_slices.py
//! ```
//!
//! Exit status is 0 on success, 2 when the case or its configuration is
//! unusable (including a case without time directories) and 1 otherwise.

use clap::{Args, Parser, Subcommand, ValueEnum};
use foam_post_core::{
    discover_snapshots, run, Bounds, ConfigFile, ImageSettings, PostError, PvScriptEngine,
    ReportEmitter, ReportFormat, RunStatus, VisualizationDriver,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CFD time-series post-processing
#[derive(Parser, Debug)]
#[command(name = "foam-post")]
#[command(about = "Nusselt number time series and slice rendering for OpenFOAM cases", long_about = None)]
struct Cli {
    /// Log per-snapshot decisions (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Average the wall heat-transfer coefficient and report Nu per time
    Nusselt(NusseltArgs),
    /// Write a pvbatch script exporting U and T slices per time
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct NusseltArgs {
    /// Case directory holding the time directories [default: .]
    #[arg(short, long)]
    case: Option<PathBuf>,

    /// Characteristic length L in meters
    #[arg(short = 'L', long)]
    length: Option<f64>,

    /// Fluid thermal conductivity k in W/(m·K)
    #[arg(short = 'k', long, allow_negative_numbers = true)]
    conductivity: Option<f64>,

    /// Field file read in each time directory [default: `wallHeatTransferCoeff`]
    #[arg(short, long)]
    field: Option<String>,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Worker threads (1 = sequential, 0 = one per core)
    #[arg(short = 'j', long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Case directory holding the time directories
    #[arg(short, long, default_value = ".")]
    case: PathBuf,

    /// Reader file opened by pvbatch [default: `<case>/case.foam`]
    #[arg(long)]
    foam_file: Option<PathBuf>,

    /// Mesh bounds as xmin,xmax,ymin,ymax,zmin,zmax [default: read from the mesh]
    #[arg(short, long, allow_hyphen_values = true)]
    bounds: Option<Bounds>,

    /// Directory the images are saved to
    #[arg(short, long, default_value = "screenshots")]
    out: PathBuf,

    /// Path of the generated script
    #[arg(short, long, default_value = "render_slices.py")]
    script: PathBuf,

    /// Image width in pixels
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 1080)]
    height: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => ReportFormat::Table,
            OutputFormat::Csv => ReportFormat::Csv,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_CONFIGURATION: u8 = 2;

fn failure_code(err: &PostError) -> u8 {
    if err.is_fatal() {
        EXIT_CONFIGURATION
    } else {
        EXIT_FAILURE
    }
}

fn no_snapshots(case: &Path) -> u8 {
    eprintln!(
        "Error: No time directories found in '{}'. Make sure the case path is correct.",
        case.display()
    );
    EXIT_CONFIGURATION
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn nusselt<W: Write>(args: &NusseltArgs, out: &mut W) -> Result<u8, PostError> {
    let base = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let flags = ConfigFile {
        case_root: args.case.clone(),
        characteristic_length: args.length,
        thermal_conductivity: args.conductivity,
        field_name: args.field.clone(),
        threads: args.threads,
    };
    let config = base.merge(flags).into_config()?;

    let summary = run(&config)?;
    let code = match summary.status {
        RunStatus::Completed => EXIT_SUCCESS,
        RunStatus::NoSnapshots => no_snapshots(&config.case_root),
    };

    ReportEmitter::new(args.format.into())
        .emit(&mut *out, &summary)
        .and_then(|()| out.flush())
        .map_err(|e| PostError::configuration("<stdout>", e.to_string()))?;

    Ok(code)
}

fn render(args: &RenderArgs) -> Result<u8, PostError> {
    let snapshots = discover_snapshots(&args.case)?;
    if snapshots.is_empty() {
        return Ok(no_snapshots(&args.case));
    }

    let image = ImageSettings {
        width: args.width,
        height: args.height,
    };
    let foam_file = args
        .foam_file
        .clone()
        .unwrap_or_else(|| args.case.join("case.foam"));

    let mut engine = PvScriptEngine::new(foam_file, image);
    if let Some(bounds) = args.bounds {
        engine = engine.with_bounds(bounds);
    }
    let images = VisualizationDriver::new(&args.out)
        .with_image(image)
        .render_all(&mut engine, &snapshots, None)?;
    engine.write_to(&args.script)?;

    info!(
        "Wrote {} ({} images for {} times)",
        args.script.display(),
        images.len(),
        snapshots.len()
    );
    println!("Run `pvbatch {}` to export the images", args.script.display());
    Ok(EXIT_SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Nusselt(args) => nusselt(args, &mut io::stdout().lock()),
        Command::Render(args) => render(args),
    };

    let code = result.unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        failure_code(&e)
    });
    ExitCode::from(code)
}
