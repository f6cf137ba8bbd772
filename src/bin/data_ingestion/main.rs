//! Data ingestion orchestrator - downloads the PPR, school and bus stop
//! datasets and writes the canonical PPR file

use anyhow::{Context, Result};
use irish_property_analysis::config::{
    Config, BUS_STOPS_SHEET_FRAGMENT, PRIMARY_SCHOOLS_SHEET, SECONDARY_SCHOOLS_SHEET,
};
use irish_property_analysis::ingestion::fetch::{self, SheetMatch};
use irish_property_analysis::ingestion::WriteStats;
use irish_property_analysis::Sales;
use std::env;
use std::io::stderr;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(stderr)
        .init();

    info!("Starting data ingestion pipeline");

    dotenvy::dotenv().ok();
    let config = Config::from_env();
    config
        .ensure_dirs()
        .with_context(|| format!("Failed to create data directories under {:?}", config.data_dir))?;
    info!("Configuration loaded, data in {:?}", config.data_dir);

    // Determine which sources to run (from command line args or run all)
    let args: Vec<String> = env::args().collect();
    let sources = if args.len() > 1 {
        args[1..].to_vec()
    } else {
        vec!["ppr".to_string(), "schools".to_string(), "bus_stops".to_string()]
    };

    let mut failures = 0;

    for source_id in sources {
        info!("Running ingestion for: {}", source_id);

        let result = match source_id.as_str() {
            "ppr" => run_ppr(&config).await.map(|stats| stats.to_string()),
            "schools" => run_schools(&config).await.map(|_| "schools written".to_string()),
            "bus_stops" => run_bus_stops(&config).await.map(|_| "bus stops written".to_string()),
            _ => {
                warn!("Unknown source: {}", source_id);
                continue;
            }
        };

        match result {
            Ok(summary) => info!("✓ {} completed: {}", source_id, summary),
            Err(e) => {
                failures += 1;
                error!("✗ {} failed: {:#}", source_id, e);
            }
        }
    }

    if failures > 0 {
        return Err(anyhow::anyhow!("{} ingestion source(s) failed", failures));
    }

    info!("Data ingestion pipeline complete");

    Ok(())
}

/// Download the register, then load and save it so the file on disk is the
/// deduplicated canonical form
async fn run_ppr(config: &Config) -> Result<WriteStats> {
    info!("=== PPR Pipeline ===");
    let ppr_path = config.ppr_path();

    info!("Step 1/3: Fetching data...");
    let raw = fetch::fetch_ppr(&config.ppr_url, &ppr_path).await?;
    let downloaded = raw.as_file_path()?;
    info!("✓ Fetch complete");

    info!("Step 2/3: Parsing data...");
    let sales = Sales::load(downloaded).context("Failed to load downloaded PPR file")?;
    info!("✓ Parsed {} unique sales", sales.len());

    info!("Step 3/3: Writing canonical file...");
    let stats = sales.save(&ppr_path).context("Failed to save PPR file")?;
    info!("✓ Write complete");

    Ok(stats)
}

async fn run_schools(config: &Config) -> Result<()> {
    info!("=== Schools Pipeline ===");

    let primary = fetch::fetch_sheet_as_csv(
        &config.primary_schools_url,
        SheetMatch::Exact(PRIMARY_SCHOOLS_SHEET),
        &config.primary_schools_path(),
    )
    .await?;
    info!("✓ Primary schools written to {:?}", primary.as_file_path()?);

    let secondary = fetch::fetch_sheet_as_csv(
        &config.secondary_schools_url,
        SheetMatch::Exact(SECONDARY_SCHOOLS_SHEET),
        &config.secondary_schools_path(),
    )
    .await?;
    info!("✓ Secondary schools written to {:?}", secondary.as_file_path()?);

    Ok(())
}

async fn run_bus_stops(config: &Config) -> Result<()> {
    info!("=== Bus Stops Pipeline ===");

    let stops = fetch::fetch_sheet_as_csv(
        &config.bus_stops_url,
        SheetMatch::Contains(BUS_STOPS_SHEET_FRAGMENT),
        &config.bus_stops_path(),
    )
    .await?;
    info!("✓ Bus stops written to {:?}", stops.as_file_path()?);

    Ok(())
}
