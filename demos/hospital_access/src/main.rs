//! hospital_access: share of population within reach of a hospital.
//!
//! With no arguments, runs on a built-in synthetic town.  Point it at real
//! data with:
//!
//! ```text
//! hospital_access --nodes nodes.csv --edges edges.csv \
//!     --facilities hospitals.csv --grid population.asc \
//!     --config access.toml --out output/nairobi
//! ```
//!
//! All inputs must share one projected coordinate system in metres.
//! Writes `node_times.csv`, `population.csv` and `summary.csv` to `--out`.
//! Set `RUST_LOG=info` for stage-by-stage progress.

mod network;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;

use acc_core::AccessConfig;
use acc_engine::{AccessibilityEngine, PopulationPoint};
use acc_io::{
    PointColumns, PopulationGrid, load_graph_csv, load_points_csv, write_node_times_csv,
    write_population_csv, write_summary_csv,
};
use acc_spatial::{EdgeWeightModel, RoadGraph};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Travel-time accessibility from facilities to population")]
struct Args {
    /// TOML run configuration (speeds, cutoff, thresholds).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Road node CSV (`id,x,y`).  Requires --edges.
    #[arg(long, requires = "edges")]
    nodes: Option<PathBuf>,

    /// Road edge CSV (`u,v,key,length,highway`).  Requires --nodes.
    #[arg(long, requires = "nodes")]
    edges: Option<PathBuf>,

    /// Facility point CSV.
    #[arg(long)]
    facilities: Option<PathBuf>,

    /// Population point CSV with an optional `pop` column.
    #[arg(long, conflicts_with = "grid")]
    population: Option<PathBuf>,

    /// Population grid in ESRI ASCII format.
    #[arg(long)]
    grid: Option<PathBuf>,

    /// Override the configured cutoff (seconds).
    #[arg(long)]
    cutoff: Option<f64>,

    /// Skip the coordinate-extent sanity check.
    #[arg(long)]
    no_extent_check: bool,

    #[arg(long, default_value = "output/hospital_access")]
    out: PathBuf,
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // 1. Configuration.
    let mut config = match &args.config {
        Some(path) => AccessConfig::from_toml_file(path).context("loading configuration")?,
        None => AccessConfig::default(),
    };
    if let Some(cutoff) = args.cutoff {
        config.cutoff_secs = cutoff;
    }
    if args.no_extent_check {
        config.check_extent = false;
    }
    config.validate().context("validating configuration")?;

    // 2. Inputs.
    let graph = load_graph(&args)?;
    let facilities = match &args.facilities {
        Some(path) => load_points_csv(path, &PointColumns::default()).context("loading facilities")?,
        None => network::hospitals(),
    };
    let population = load_population(&args, &config)?;

    println!("=== hospital_access ===");
    println!(
        "Road network: {} nodes, {} edges  |  Facilities: {}  |  Population points: {}",
        graph.node_count(),
        graph.edge_count(),
        facilities.len(),
        population.len()
    );
    println!("Cutoff: {} s  |  Thresholds: {:?} min", config.cutoff_secs, config.thresholds_min);
    println!();

    // 3. Engine.
    let t0 = Instant::now();
    let model = EdgeWeightModel::new(config.speeds.clone()).context("building speed model")?;
    let engine = AccessibilityEngine::new(Arc::clone(&graph), facilities, population)
        .context("indexing road network")?
        .check_extent(config.check_extent)
        .assign_speeds_and_travel_time(&model)
        .context("assigning edge travel times")?;

    // 4. Run.
    let run = engine
        .run(config.cutoff_secs, &config.thresholds_min)
        .context("computing accessibility")?;
    let elapsed = t0.elapsed();

    // 5. Output.
    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    write_node_times_csv(&args.out.join("node_times.csv"), &graph, &run.times)
        .context("writing node_times.csv")?;
    write_population_csv(&args.out.join("population.csv"), &run.population)
        .context("writing population.csv")?;
    write_summary_csv(&args.out.join("summary.csv"), &run.summary)
        .context("writing summary.csv")?;

    // 6. Report.
    println!("Accessibility computed in {:.3} s", elapsed.as_secs_f64());
    println!(
        "  facility nodes      : {} ({} excluded)",
        run.facilities.nodes.len(),
        run.facilities.excluded
    );
    println!("  nodes reached       : {}", run.times.len());
    if let Some(mean) = run.summary.mean_travel_time_min {
        println!("  mean travel time    : {mean:.1} min");
    }
    println!(
        "  unreached {}    : {:.0}",
        if run.summary.weighted { "people" } else { "points" },
        run.summary.unreached_weight()
    );
    println!();

    println!("{:<12} {:>10} {:>14}", "Threshold", "Percent", "Covered");
    println!("{}", "-".repeat(38));
    for e in &run.summary.entries {
        println!(
            "{:<12} {:>9.1}% {:>14.0}",
            format!("{} min", e.threshold_min),
            e.percent,
            e.covered_weight
        );
    }
    println!();
    println!("Results written to {}", args.out.display());

    Ok(())
}

// ── Input helpers ─────────────────────────────────────────────────────────────

fn load_graph(args: &Args) -> Result<Arc<RoadGraph>> {
    match (&args.nodes, &args.edges) {
        (Some(nodes), Some(edges)) => {
            let g = load_graph_csv(nodes, edges)
                .with_context(|| format!("loading road graph from {}", nodes.display()))?;
            Ok(Arc::new(g))
        }
        (None, None) => {
            log::info!("no road network given; using the synthetic town");
            network::build_town().context("building synthetic town")
        }
        _ => bail!("--nodes and --edges must be given together"),
    }
}

fn load_population(args: &Args, config: &AccessConfig) -> Result<Vec<PopulationPoint>> {
    let grid = match (&args.population, &args.grid) {
        (Some(path), _) => {
            let points = load_points_csv(path, &PointColumns::default()).context("loading population")?;
            return Ok(points.into_iter().map(PopulationPoint::from).collect());
        }
        (None, Some(path)) => PopulationGrid::from_path(path)
            .with_context(|| format!("loading population grid {}", path.display()))?,
        (None, None) => network::population_grid()?,
    };

    if let Some(stats) = grid.stats() {
        log::info!(
            "grid population {:.0} over {} cells (mean {:.1}, max {:.1})",
            stats.total,
            stats.cell_count,
            stats.mean,
            stats.max
        );
    }
    Ok(grid.to_points(config.grid_threshold, config.max_points))
}
