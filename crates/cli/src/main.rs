//! rhoflow CLI - stochastic Rho4 / Rho8 flow directions

mod synthetic;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rhoflow_algorithms::hydrology::{
    fairfield_leymarie_d4, fairfield_leymarie_d8, flow_summary, FlowSummary, RhoParams, SeededSource,
};
use rhoflow_core::flow::{Direction, FlowProps};
use rhoflow_core::progress::Progress;
use rhoflow_core::Raster;
use rhoflow_parallel::ProcessingMode;
use synthetic::{synthetic_dem, Surface};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "rhoflow")]
#[command(author, version, about = "Stochastic Rho4/Rho8 flow directions", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rho4: 4-neighbor flow directions, stochastic north/south slopes
    Rho4(RunArgs),
    /// Rho8: 8-neighbor flow directions, stochastic diagonal slopes
    Rho8(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Number of rows of the synthetic DEM
    #[arg(short, long, default_value = "512")]
    rows: usize,
    /// Number of columns of the synthetic DEM
    #[arg(short, long, default_value = "512")]
    cols: usize,
    /// Synthetic surface to route
    #[arg(short, long, value_enum, ignore_case = true, default_value = "basin")]
    surface: Surface,
    /// Fraction of cells replaced by no-data (0-1)
    #[arg(long, default_value = "0.0")]
    nodata_fraction: f64,
    /// Seed for the synthetic terrain
    #[arg(long, default_value = "0")]
    terrain_seed: u64,
    /// Seed for the stochastic slope correction (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Worker threads (0 = all cores, 1 = sequential)
    #[arg(short, long)]
    threads: Option<usize>,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy)]
enum Method {
    Rho4,
    Rho8,
}

impl Method {
    fn name(self) -> &'static str {
        match self {
            Method::Rho4 => "Rho4",
            Method::Rho8 => "Rho8",
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

/// indicatif bar driven by the algorithms' progress callbacks
struct BarProgress(ProgressBar);

impl BarProgress {
    fn new(msg: &str) -> Result<Self> {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len} cells ({eta})")?
                .progress_chars("=> "),
        );
        pb.set_message(msg.to_string());
        Ok(Self(pb))
    }
}

impl Progress for BarProgress {
    fn start(&self, total: u64) {
        self.0.set_length(total);
        self.0.set_position(0);
        self.0.enable_steady_tick(Duration::from_millis(100));
    }

    fn inc(&self, n: u64) {
        self.0.inc(n);
    }

    fn stop(&self) {
        self.0.finish_and_clear();
    }
}

fn build_dem(args: &RunArgs) -> Result<Raster<f64>> {
    if args.rows == 0 || args.cols == 0 {
        anyhow::bail!("DEM must have at least one row and one column");
    }
    if !(0.0..=1.0).contains(&args.nodata_fraction) {
        anyhow::bail!("--nodata-fraction must be between 0 and 1, got {}", args.nodata_fraction);
    }
    let dem = synthetic_dem(args.surface, args.rows, args.cols, args.nodata_fraction, args.terrain_seed);
    info!("Input: {} x {} {} surface", dem.cols(), dem.rows(), args.surface.name());
    Ok(dem)
}

fn route(method: Method, dem: &Raster<f64>, seed: u64, mode: ProcessingMode) -> Result<FlowProps> {
    let mut props = FlowProps::like(dem);
    let source = SeededSource::new(seed);
    let progress = BarProgress::new(method.name())?;
    let result = match method {
        Method::Rho4 => fairfield_leymarie_d4(dem, &mut props, &source, &progress, mode),
        Method::Rho8 => fairfield_leymarie_d8(dem, &mut props, &source, &progress, mode),
    };
    result.with_context(|| format!("Failed to calculate {} flow directions", method.name()))?;
    Ok(props)
}

fn print_summary(method: Method, summary: &FlowSummary, seed: u64, elapsed: Duration) {
    let cells = (summary.rows * summary.cols).max(1) as f64;
    println!("{} flow directions ({} x {}, seed {})", method.name(), summary.cols, summary.rows, seed);
    println!(
        "  Flowing cells: {} ({:.1}%)",
        summary.has_flow,
        100.0 * summary.has_flow as f64 / cells
    );
    println!("  No flow: {}", summary.no_flow);
    println!("  No data: {}", summary.nodata);
    println!("\nDirections:");
    for dir in Direction::ALL {
        let count = summary.count(dir);
        if count > 0 {
            println!("  {:>2}: {}", dir.name(), count);
        }
    }
    println!("  Diagonal share: {:.3}", summary.diagonal_fraction());
    println!("  Processing time: {:.2?}", elapsed);
}

fn run(method: Method, args: RunArgs) -> Result<()> {
    let dem = build_dem(&args)?;
    let params = RhoParams {
        seed: args.seed,
        mode: ProcessingMode::from_threads(args.threads),
    }
    .resolved();
    let seed = params.seed.unwrap_or_default();
    let mode = params.mode;
    info!("Running {} with {} thread(s), seed {}", method.name(), mode.threads(), seed);

    let start = Instant::now();
    let props = route(method, &dem, seed, mode)?;
    let elapsed = start.elapsed();
    let summary = flow_summary(&props);

    if args.json {
        let report = serde_json::json!({
            "algorithm": method.name(),
            "surface": args.surface.name(),
            "seed": seed,
            "threads": mode.threads(),
            "elapsed_ms": elapsed.as_secs_f64() * 1000.0,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&report).context("Failed to encode summary")?);
    } else {
        print_summary(method, &summary, seed, elapsed);
    }
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Rho4(args) => run(Method::Rho4, args),
        Commands::Rho8(args) => run(Method::Rho8, args),
    }
}
