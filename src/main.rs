//! CLI entry point for the RDW park-and-ride statistics tool.
//!
//! Provides subcommands for per-city facility counts (optionally geocoded),
//! exporting the joined facility table, and listing one city's facilities.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rdw_parkride::aggregate::{facilities_in_city, sort_by_locations_desc, within_location_range};
use rdw_parkride::config::{
    DEFAULT_FACILITIES_URL, DEFAULT_GEOCODE_CONCURRENCY, DEFAULT_GEOCODE_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_SPEC_LIMIT, DEFAULT_SPECS_URL, EnrichSettings,
    EnrichmentPolicy, PipelineConfig,
};
use rdw_parkride::fetch::auth::ApiKey;
use rdw_parkride::fetch::{BasicClient, HttpClient};
use rdw_parkride::geocode::{Geocoder, HereGeocoder};
use rdw_parkride::output::{print_json, write_csv, write_json};
use rdw_parkride::pipeline::{join_only, run};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "rdw_parkride")]
#[command(about = "Park-and-ride facility statistics from RDW open data", long_about = None)]
struct Cli {
    /// Facility dataset endpoint
    #[arg(long, global = true, default_value = DEFAULT_FACILITIES_URL)]
    facilities_url: String,

    /// Parking specification dataset endpoint
    #[arg(long, global = true, default_value = DEFAULT_SPECS_URL)]
    specs_url: String,

    /// Row limit for the specification dataset (0 = endpoint default)
    #[arg(long, global = true, default_value_t = DEFAULT_SPEC_LIMIT)]
    spec_limit: u32,

    /// Timeout for each source request, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count P+R facilities per city
    Cities {
        /// Look up coordinates for every city (requires HERE_API_KEY)
        #[arg(short, long, default_value_t = false)]
        geocode: bool,

        /// Abort when a geocoding lookup fails instead of leaving it empty
        #[arg(long, default_value_t = false)]
        strict_geocoding: bool,

        /// Only keep cities with more than this many facilities
        #[arg(long)]
        min_locations: Option<usize>,

        /// Only keep cities with fewer than this many facilities
        #[arg(long)]
        max_locations: Option<usize>,

        /// Maximum number of concurrent geocoding lookups
        #[arg(short, long, default_value_t = DEFAULT_GEOCODE_CONCURRENCY)]
        concurrency: usize,

        /// Timeout for each geocoding lookup, in seconds
        #[arg(long, default_value_t = DEFAULT_GEOCODE_TIMEOUT.as_secs())]
        geocode_timeout_secs: u64,

        /// Optional: write a JSON report to this path
        #[arg(long)]
        report: Option<String>,

        /// Optional: write the city table as CSV to this path
        #[arg(long)]
        csv: Option<String>,
    },
    /// Export the joined facility table as CSV
    Facilities {
        /// CSV file to write
        #[arg(short, long, default_value = "facilities.csv")]
        output: String,
    },
    /// List the facilities and capacities of one city
    City {
        /// City name exactly as it appears in the facility description
        #[arg(value_name = "CITY")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/rdw_parkride.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("rdw_parkride.log"));

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

    let timeout = Duration::from_secs(cli.timeout_secs);
    let mut config = PipelineConfig {
        facilities_url: cli.facilities_url,
        specs_url: cli.specs_url,
        spec_limit: (cli.spec_limit > 0).then_some(cli.spec_limit),
        ..Default::default()
    };
    let client = source_client(timeout)?;

    match cli.command {
        Commands::Cities {
            geocode,
            strict_geocoding,
            min_locations,
            max_locations,
            concurrency,
            geocode_timeout_secs,
            report,
            csv,
        } => {
            config.enrich = EnrichSettings {
                concurrency,
                timeout: Duration::from_secs(geocode_timeout_secs),
                policy: if strict_geocoding {
                    EnrichmentPolicy::Propagate
                } else {
                    EnrichmentPolicy::Degrade
                },
            };

            let geocoder = if geocode {
                Some(here_geocoder(timeout)?)
            } else {
                None
            };

            let output = run(&client, &config, geocoder).await?;

            let mut selected = within_location_range(&output.cities, min_locations, max_locations);
            sort_by_locations_desc(&mut selected);

            for city in &selected {
                info!(
                    city = %city.city,
                    pr_locations = city.pr_locations,
                    lat = ?city.lat,
                    lng = ?city.lng,
                    "City"
                );
            }

            info!(
                facilities = output.facilities.len(),
                cities = output.cities.len(),
                selected = selected.len(),
                unresolved_city = output.unresolved_city,
                "City summary"
            );

            if let Some(path) = csv {
                write_csv(&path, &selected)?;
                info!(path = %path, "City table written");
            }
            if let Some(path) = report {
                let mut city_report = output.report();
                city_report.cities = selected;
                write_json(&path, &city_report)?;
                info!(path = %path, "Report written");
            }
        }
        Commands::Facilities { output } => {
            let facilities = join_only(&client, &config).await?;
            write_csv(&output, &facilities)?;
            info!(path = %output, rows = facilities.len(), "Facility table written");
        }
        Commands::City { name } => {
            let facilities = join_only(&client, &config).await?;
            let in_city = facilities_in_city(&facilities, &name);

            if in_city.is_empty() {
                warn!(city = %name, "No facilities found for city");
                return Ok(());
            }

            let total_capacity: u64 = in_city.iter().map(|f| u64::from(f.capacity)).sum();
            for facility in &in_city {
                info!(
                    area_id = ?facility.area_id,
                    name = ?facility.name,
                    capacity = facility.capacity,
                    share = %format!("{:.1}%", 100.0 * f64::from(facility.capacity) / total_capacity as f64),
                    "Facility"
                );
            }
            info!(city = %name, facilities = in_city.len(), total_capacity, "City capacity");
            print_json(&in_city)?;
        }
    }

    Ok(())
}

/// Client for the RDW sources, sending `RDW_APP_TOKEN` when it is set.
fn source_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    let basic = BasicClient::new(timeout)?;
    match std::env::var("RDW_APP_TOKEN") {
        Ok(token) if !token.is_empty() => {
            info!("Using Socrata app token");
            Ok(Arc::new(ApiKey::socrata(basic, &token)?))
        }
        _ => Ok(Arc::new(basic)),
    }
}

fn here_geocoder(timeout: Duration) -> Result<Arc<dyn Geocoder>> {
    let api_key =
        std::env::var("HERE_API_KEY").context("HERE_API_KEY must be set to use --geocode")?;
    Ok(Arc::new(HereGeocoder::new(BasicClient::new(timeout)?, api_key)))
}
