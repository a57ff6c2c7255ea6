//! WRF EMS de-chunking tool.
//!
//! `plan` prints the chunk runs needed to cover a date range; `extract`
//! stitches the finished chunk runs of a domain into one hourly CSV series
//! at a single site.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use dechunk::{load_field_table, DechunkConfig, Location, DEFAULT_SPINUP_HOURS};
use ems_common::time::parse_run_date;
use ems_common::ChunkConfig;
use projection::GridCell;

#[derive(Parser, Debug)]
#[command(name = "ems-dechunk")]
#[command(about = "Plan and de-chunk WRF EMS simulations")]
struct Args {
    /// Log level
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the chunk runs covering a date range
    Plan(PlanArgs),
    /// Extract a site time series from the chunk runs of a domain
    Extract(ExtractArgs),
}

#[derive(ClapArgs, Debug)]
struct PlanArgs {
    /// Domain name, used for run directory names
    domain: String,

    /// First date (YYYYMMDD)
    #[arg(value_parser = parse_date)]
    start: NaiveDate,

    /// End date, exclusive (YYYYMMDD)
    #[arg(value_parser = parse_date)]
    end: NaiveDate,

    /// Chunk length in days
    #[arg(long, default_value_t = 3)]
    chunk_days: i64,

    /// Spin-up hours prepended to every chunk
    #[arg(long, default_value_t = DEFAULT_SPINUP_HOURS)]
    spinup: i64,

    /// Print the schedule as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ClapArgs, Debug)]
struct ExtractArgs {
    /// Domain name
    domain: String,

    /// Site latitude and longitude in degrees
    #[arg(
        long,
        num_args = 2,
        value_names = ["LAT", "LON"],
        allow_negative_numbers = true,
        conflicts_with = "ij",
        required_unless_present = "ij"
    )]
    ll: Option<Vec<f64>>,

    /// Site grid indices, one-based, along south_north and west_east
    #[arg(long, num_args = 2, value_names = ["I", "J"])]
    ij: Option<Vec<usize>>,

    /// Nest to read (default: finest)
    #[arg(long)]
    nest: Option<u32>,

    /// Spin-up hours discarded from every chunk
    #[arg(long, default_value_t = DEFAULT_SPINUP_HOURS)]
    spinup: i64,

    /// YAML field table replacing the built-in columns
    #[arg(long)]
    fields: Option<PathBuf>,

    /// Directory holding the domain and its chunk runs
    #[arg(long, env = "EMS_RUN")]
    run_root: PathBuf,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_run_date(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs);

    match args.command {
        Command::Plan(plan) => run_plan(&plan),
        Command::Extract(extract) => run_extract(&extract),
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_plan(args: &PlanArgs) -> Result<()> {
    let config = ChunkConfig::new(args.chunk_days, args.spinup).context("Invalid chunk configuration")?;
    let schedule: Vec<_> = config
        .schedule(args.start, args.end)
        .context("Invalid date range")?
        .collect();

    if args.json {
        let rows: Vec<_> = schedule
            .iter()
            .map(|spec| {
                serde_json::json!({
                    "run_dir": spec.run_dir_name(&args.domain),
                    "chunk": spec,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:>5}  {:<19}  {:<19}  {:<19}  {:>5}  run directory",
        "index", "spin-up start", "chunk start", "chunk end", "hours"
    );
    for spec in &schedule {
        println!(
            "{:>5}  {:<19}  {:<19}  {:<19}  {:>5}  {}",
            spec.index,
            spec.spinup_start.format("%Y-%m-%d %H:%M:%S").to_string(),
            spec.chunk_start.format("%Y-%m-%d %H:%M:%S").to_string(),
            spec.chunk_end.format("%Y-%m-%d %H:%M:%S").to_string(),
            spec.hours,
            spec.run_dir_name(&args.domain)
        );
    }
    Ok(())
}

fn run_extract(args: &ExtractArgs) -> Result<()> {
    let config = build_config(args)?;
    info!(
        run_root = %config.run_root.display(),
        domain = %config.domain,
        location = ?config.location,
        "Starting extraction"
    );
    extract(&config, args.json)
}

fn extract(config: &DechunkConfig, json: bool) -> Result<()> {
    let summary = dechunk::run(config)
        .with_context(|| format!("Failed to de-chunk domain {}", config.domain))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let (i, j) = summary.cell.one_based();
        println!(
            "{}: {} rows at i={} j={} (nest {}, {} chunks read, {} skipped)",
            summary.path.display(),
            summary.rows,
            i,
            j,
            summary.nest,
            summary.chunks_read,
            summary.chunks_skipped
        );
    }
    Ok(())
}

/// Turn extract arguments into a validated configuration.
fn build_config(args: &ExtractArgs) -> Result<DechunkConfig> {
    let location = match (&args.ll, &args.ij) {
        (Some(ll), _) => Location::LatLon {
            lat: ll[0],
            lon: ll[1],
        },
        (None, Some(ij)) => {
            if ij[0] == 0 || ij[1] == 0 {
                bail!("grid indices are one-based, got i={} j={}", ij[0], ij[1]);
            }
            Location::Cell(GridCell::new(ij[0] - 1, ij[1] - 1))
        }
        (None, None) => bail!("one of --ll or --ij is required"),
    };

    let mut config = DechunkConfig::new(&args.run_root, &args.domain, location)
        .with_spinup_hours(args.spinup);
    if let Some(nest) = args.nest {
        config = config.with_nest(nest);
    }
    if let Some(path) = &args.fields {
        let fields = load_field_table(path)
            .with_context(|| format!("Failed to load field table {}", path.display()))?;
        config = config.with_fields(fields);
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
