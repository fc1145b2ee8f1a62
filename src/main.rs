//! CLI entry point for the EnviroWatch ETL.
//!
//! `run` fetches weather, loads local air quality and renewable share,
//! enriches and aggregates them, and writes the results as CSV. `seed`
//! writes synthetic local sources.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser, Subcommand};
use envirowatch::config::AppConfig;
use envirowatch::fetch::auth::ApiKey;
use envirowatch::fetch::weather::fetch_external_data;
use envirowatch::fetch::{BasicClient, HttpClient};
use envirowatch::kpi::{attach_daily, compute_kpis};
use envirowatch::output::{DEFAULT_KPI_DIR, DEFAULT_OUTPUT, log_sample, write_kpis, write_table};
use envirowatch::records::to_table;
use envirowatch::simulate::{simulate_renewables, stations_for, trailing_window};
use envirowatch::sources::{
    DEFAULT_DB_PATH, DEFAULT_RENEWABLES_CSV, LocalPaths, load_local_sources, seed_local_sources,
};
use envirowatch::transform::{EnrichOptions, clean_and_join};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const SAMPLE_ROWS: usize = 10;
const DEFAULT_RANGE_DAYS_BACK: u64 = 13;

#[derive(Parser)]
#[command(name = "envirowatch")]
#[command(about = "Enrich weather, air quality and renewable share into city KPIs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write the enriched table and KPIs
    Run {
        /// First day, YYYY-MM-DD (default: 13 days before the end date)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Last day, YYYY-MM-DD (default: today)
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Simulate weather and renewable share instead of calling the API
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// SQLite database holding the air_quality table
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db_path: PathBuf,

        /// Renewable share reference CSV
        #[arg(long, default_value = DEFAULT_RENEWABLES_CSV)]
        renewables_csv: PathBuf,

        /// Enriched CSV output
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Directory for the KPI CSVs
        #[arg(long, default_value = DEFAULT_KPI_DIR)]
        kpi_dir: PathBuf,

        /// Stderr log level (overrides LOG_LEVEL)
        #[arg(long)]
        log_level: Option<String>,

        /// Add temp_f to the enriched table
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        include_fahrenheit: bool,

        /// Seed for reproducible simulated data
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Write synthetic air quality and the default renewable share CSV
    Seed {
        /// SQLite database to (re)create the air_quality table in
        #[arg(long, default_value = DEFAULT_DB_PATH)]
        db_path: PathBuf,

        /// Renewable share CSV to write
        #[arg(long, default_value = DEFAULT_RENEWABLES_CSV)]
        renewables_csv: PathBuf,

        /// Number of days before today to start from
        #[arg(long, default_value_t = 30)]
        days_back: u64,

        /// Rows per station per day; values above one create duplicates
        #[arg(long, default_value_t = 1)]
        rows_per_station_per_day: usize,

        /// Seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Colored stderr plus a JSON daily-rolling log file. The returned guard
/// must live until exit so buffered file logs are flushed.
fn init_logging(
    log_file_path: &Path,
    stderr_level: &str,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = log_file_path.parent().unwrap_or(Path::new("data/logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("envirowatch.log"));
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_filter = EnvFilter::try_new(stderr_level)
        .with_context(|| format!("Invalid log level {stderr_level:?}"))?;
    let json_filter = EnvFilter::try_from_env("RUST_LOG_JSON")
        .or_else(|_| EnvFilter::try_new("debug"))
        .context("Invalid RUST_LOG_JSON")?;

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(stderr_filter);

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(json_filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let stderr_level = match &cli.command {
        Commands::Run {
            log_level: Some(level),
            ..
        } => level.clone(),
        _ => config.log_level.clone(),
    };
    let _file_guard = init_logging(&config.log_file_path, &stderr_level)?;

    match cli.command {
        Commands::Run {
            start_date,
            end_date,
            offline,
            db_path,
            renewables_csv,
            output,
            kpi_dir,
            log_level: _,
            include_fahrenheit,
            seed,
        } => {
            let end = end_date.unwrap_or_else(|| Local::now().date_naive());
            let start = start_date.unwrap_or_else(|| trailing_window(end, DEFAULT_RANGE_DAYS_BACK).0);
            let job = RunJob {
                start,
                end,
                offline,
                paths: LocalPaths {
                    db_path,
                    renewables_csv,
                },
                output,
                kpi_dir,
                options: EnrichOptions { include_fahrenheit },
            };

            info!(event = "run_started", start = %start, end = %end, offline);
            let mut rng = rng_from(seed);
            if let Err(e) = run(&config, &job, &mut rng).await {
                error!(event = "run_failed", error = %format!("{e:#}"));
                return Err(e);
            }
        }
        Commands::Seed {
            db_path,
            renewables_csv,
            days_back,
            rows_per_station_per_day,
            seed,
        } => {
            let (start, end) = trailing_window(Local::now().date_naive(), days_back);
            let paths = LocalPaths {
                db_path,
                renewables_csv,
            };
            let mut rng = rng_from(seed);
            let rows = seed_local_sources(&paths, start, end, rows_per_station_per_day, &mut rng)?;
            info!(
                event = "seeded",
                rows,
                db = %paths.db_path.display(),
                renewables = %paths.renewables_csv.display()
            );
        }
    }

    Ok(())
}

struct RunJob {
    start: NaiveDate,
    end: NaiveDate,
    offline: bool,
    paths: LocalPaths,
    output: PathBuf,
    kpi_dir: PathBuf,
    options: EnrichOptions,
}

#[tracing::instrument(skip_all, fields(start = %job.start, end = %job.end))]
async fn run(config: &AppConfig, job: &RunJob, rng: &mut StdRng) -> Result<()> {
    let stations = stations_for(&config.stations);

    let client: Box<dyn HttpClient> = match &config.api_key {
        Some(key) => Box::new(ApiKey::bearer(BasicClient::new()?, key)?),
        None => Box::new(BasicClient::new()?),
    };
    let weather = fetch_external_data(
        client.as_ref(),
        &config.api_endpoint,
        &config.retry,
        job.start,
        job.end,
        job.offline,
        &stations,
        rng,
    )
    .await;

    let mut local = load_local_sources(&job.paths, job.start, job.end, rng)?;
    if job.offline {
        let cities: Vec<String> = local.renewables.iter().map(|r| r.city.clone()).collect();
        local.renewables = simulate_renewables(rng, &cities);
    }

    let enriched = clean_and_join(
        &to_table(&weather),
        &to_table(&local.air_quality),
        &to_table(&local.renewables),
        job.options,
    )?;
    let report = compute_kpis(&enriched)?;
    let merged = attach_daily(&enriched, &report.daily_city)?;

    write_table(&job.output, &merged)?;
    let kpi_files = write_kpis(&job.kpi_dir, &report)?;
    log_sample(&merged, SAMPLE_ROWS);

    info!(
        event = "run_succeeded",
        rows = merged.len(),
        output = %job.output.display(),
        kpi_files = kpi_files.len()
    );
    Ok(())
}
