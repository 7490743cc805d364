//! CLI entry point for the bike-share explorer.
//!
//! Provides subcommands for summarizing a trip table, listing stations,
//! proposing neighbors for newly opened stations, detrending per-station
//! demand and ranking bikes by malfunction reports.

use anyhow::{Context, Result};
use bikeshare_explorer::analyzers::malfunction::{
    frequent_malfunction, malfunction_counts, same_station_trips,
};
use bikeshare_explorer::analyzers::neighbors::propose_neighbors;
use bikeshare_explorer::analyzers::seasonal::{DetrendMethod, detrend};
use bikeshare_explorer::config::AnalysisConfig;
use bikeshare_explorer::output::{append_record, print_json, print_pretty, write_records};
use bikeshare_explorer::parser::load_trips;
use bikeshare_explorer::stations::{
    new_station_ids, station_coordinates, station_trip_counts, unique_end_stations,
    unique_stations,
};
use bikeshare_explorer::stats::DatasetStats;
use bikeshare_explorer::trips::StationId;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_explorer")]
#[command(about = "Exploratory analysis of bike-share trip records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    /// Regress daily counts on day-of-week indicators
    DayOfWeek,
    /// Subtract the series mean
    Mean,
}

impl From<Method> for DetrendMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::DayOfWeek => DetrendMethod::DayOfWeek,
            Method::Mean => DetrendMethod::Mean,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a trip table and append the summary to a CSV file
    Summary {
        /// Trip table CSV
        #[arg(value_name = "TRIPS")]
        trips: String,

        /// CSV file to append results to
        #[arg(short, long, default_value = "data.csv")]
        output: String,
    },
    /// List unique stations and their coordinates
    Stations {
        /// Trip table CSV
        #[arg(value_name = "TRIPS")]
        trips: String,
    },
    /// List stations present in the next period but not the current one
    NewStations {
        /// Current period trip table
        current: String,
        /// Next period trip table
        next: String,
    },
    /// Propose nearest existing neighbors for every new station
    Neighbors {
        /// Trip table used to judge station activity
        activity: String,
        /// Current period trip table
        current: String,
        /// Next period trip table
        next: String,

        /// JSON file with analysis parameters
        #[arg(short, long)]
        config: Option<String>,

        /// Number of neighbors per station
        #[arg(short = 'k', long)]
        neighbors: Option<usize>,

        /// Stations need trips on more than this many days to count as active
        #[arg(long)]
        min_active_days: Option<usize>,

        /// Fail if a station gets fewer neighbors than requested
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Remove weekly seasonality from a station's daily trip counts
    Detrend {
        /// Trip table CSV
        trips: String,
        /// Station whose arrivals are counted
        station_id: StationId,

        #[arg(short, long, value_enum, default_value_t = Method::DayOfWeek)]
        method: Method,

        /// Optional: CSV file to write the series to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Count malfunctions and rank bikes by malfunction reports
    Malfunctions {
        /// Trip table CSV
        trips: String,

        /// Number of bikes to show in each ranking
        #[arg(short = 'n', long, default_value_t = 10)]
        top: usize,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/bikeshare_explorer.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_explorer.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary { trips, output } => {
            let table = load_trips(&trips)?;
            let stats = DatasetStats::from_trips(&table).with_source(&trips);

            print_json(&stats)?;
            info!(
                malfunction_pct = stats.malfunction_pct(),
                "Malfunction share"
            );
            append_record(&output, &stats)?;
        }
        Commands::Stations { trips } => {
            stations(&trips)?;
        }
        Commands::NewStations { current, next } => {
            let current = load_trips(&current)?;
            let next = load_trips(&next)?;
            let proposed = new_station_ids(&current, &next);

            info!(count = proposed.len(), "New stations found");
            print_json(&proposed)?;
        }
        Commands::Neighbors {
            activity,
            current,
            next,
            config,
            neighbors,
            min_active_days,
            strict,
        } => {
            let base = match config {
                Some(path) => AnalysisConfig::load(&path)
                    .with_context(|| format!("failed to load config '{path}'"))?,
                None => AnalysisConfig::default(),
            };
            let config = base.with_overrides(neighbors, min_active_days, strict);

            neighbor_report(&activity, &current, &next, &config)?;
        }
        Commands::Detrend {
            trips,
            station_id,
            method,
            output,
        } => {
            detrend_report(&trips, station_id, method.into(), output.as_deref())?;
        }
        Commands::Malfunctions { trips, top } => {
            malfunction_report(&trips, top)?;
        }
    }

    Ok(())
}

/// Logs start/end stations, per-station trip counts and the coordinate map.
#[tracing::instrument]
fn stations(trips: &str) -> Result<()> {
    let table = load_trips(trips)?;

    let starts = unique_stations(&table);
    let ends = unique_end_stations(&table);
    let coords = station_coordinates(&table)?;

    info!(
        start_stations = starts.len(),
        end_stations = ends.len(),
        "Stations identified"
    );

    print_json(&json!({
        "start_stations": starts,
        "end_stations": ends,
        "trip_counts": station_trip_counts(&table),
        "coordinates": coords,
    }))
}

/// Proposes neighbors for every station that is new in `next`.
#[tracing::instrument(skip(config), fields(k = config.neighbor_count))]
fn neighbor_report(
    activity: &str,
    current: &str,
    next: &str,
    config: &AnalysisConfig,
) -> Result<()> {
    let activity = load_trips(activity)?;
    let current = load_trips(current)?;
    let next = load_trips(next)?;

    let proposed = new_station_ids(&current, &next);
    info!(proposed = proposed.len(), "Proposing neighbors");

    let proposal = propose_neighbors(&activity, &current, &next, &proposed, config)?;
    print_json(&proposal)
}

/// Detrends one station's series and optionally writes it to CSV.
#[tracing::instrument(skip(method))]
fn detrend_report(
    trips: &str,
    station_id: StationId,
    method: DetrendMethod,
    output: Option<&str>,
) -> Result<()> {
    let table = load_trips(trips)?;
    let series = detrend(&table, station_id, method)?;

    info!(
        dates = series.len(),
        residual_stddev = series.residual_stddev(),
        "Series detrended"
    );
    print_pretty(&series);

    match output {
        Some(path) => {
            write_records(path, &series.rows())?;
            info!(path, "Series written");
            Ok(())
        }
        None => print_json(&series),
    }
}

/// Logs malfunction totals and the top bikes by malfunction and round trips.
#[tracing::instrument]
fn malfunction_report(trips: &str, top: usize) -> Result<()> {
    let table = load_trips(trips)?;

    let counts = malfunction_counts(&table);
    let mut frequent = frequent_malfunction(&table);
    let mut round_trips = same_station_trips(&table);
    frequent.truncate(top);
    round_trips.truncate(top);

    print_json(&json!({
        "counts": counts,
        "frequent_malfunction": frequent,
        "same_station_trips": round_trips,
    }))
}
