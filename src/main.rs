//! Command line lookup over the canonical PPR file
//!
//! Prints matching sales as a table (or JSON), optionally only those close to
//! a listing date, and given coordinates, the amenity scores and nearest
//! schools and bus stops for that location.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::Parser;
use irish_property_analysis::amenities::{Amenities, ScoreRadii, DEFAULT_RADIUS_KM};
use irish_property_analysis::config::Config;
use irish_property_analysis::ingestion::utils::minimize_str;
use irish_property_analysis::{sale_dates_within_range, MatchMode, Sales};
use std::io::stderr;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CELL_WIDTH: usize = 50;
const NEAREST_SHOWN: usize = 5;

#[derive(Parser)]
#[command(name = "ppr-query")]
#[command(about = "Search the Property Price Register")]
struct Cli {
    /// Comma separated address fragments, all of which must match
    #[arg(long)]
    address_substr_csv: Option<String>,

    #[arg(long)]
    county: Option<String>,

    /// Match the whole address and county instead of fragments
    #[arg(long)]
    exact: bool,

    /// Print the matching records as JSON
    #[arg(long)]
    json: bool,

    /// Do not truncate long cells
    #[arg(long)]
    all: bool,

    /// Only keep sales registered within half a year of this listing date (YYYY-MM-DD)
    #[arg(long)]
    listing_date: Option<NaiveDate>,

    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,

    #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
    school_radius_km: f64,

    #[arg(long, default_value_t = DEFAULT_RADIUS_KM)]
    bus_stop_radius_km: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(stderr)
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env();

    let sales = Sales::load(&config.ppr_path())
        .with_context(|| format!("Failed to load PPR data from {:?}", config.ppr_path()))?;

    let substrs: Vec<String> = cli
        .address_substr_csv
        .as_deref()
        .map(|csv| {
            csv.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    let results = if cli.exact {
        sales.filter(
            cli.address_substr_csv.as_deref(),
            cli.county.as_deref(),
            MatchMode::Exact,
        )
    } else {
        sales.search(&substrs, cli.county.as_deref())
    };

    let results = match cli.listing_date {
        Some(listing_date) => {
            let listed = listing_date.and_time(NaiveTime::MIN);
            results
                .into_iter()
                .filter(|sale| sale_dates_within_range(listed, sale.date()))
                .collect::<Sales>()
        }
        None => results,
    };

    info!("{} of {} sales matched", results.len(), sales.len());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results.serialise())?);
    } else {
        print_sales(&results, cli.all);
    }

    if cli.lat.is_some() || cli.lng.is_some() {
        let amenities = Amenities::load(&config).context("Failed to load amenity data")?;
        let radii = ScoreRadii {
            school_km: cli.school_radius_km,
            bus_stop_km: cli.bus_stop_radius_km,
        };
        print_amenities(&amenities, cli.lat, cli.lng, radii, cli.json)?;
    }

    Ok(())
}

fn cell(value: &str, all: bool) -> String {
    if all {
        value.to_string()
    } else {
        minimize_str(value, CELL_WIDTH)
    }
}

fn print_sales(sales: &Sales, all: bool) {
    if sales.is_empty() {
        println!("No matching sales");
        return;
    }

    println!("date\tprice\tcounty\teircode\taddress");
    for sale in sales {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            sale.date().date(),
            sale.price(),
            sale.county(),
            sale.eircode().unwrap_or("-"),
            cell(sale.address(), all),
        );
    }
    println!("{} sales", sales.len());
}

fn print_amenities(
    amenities: &Amenities,
    lat: Option<f64>,
    lng: Option<f64>,
    radii: ScoreRadii,
    json: bool,
) -> Result<()> {
    let scores = amenities.score_location(lat, lng, radii);

    if json {
        println!("{}", serde_json::to_string_pretty(&scores)?);
        return Ok(());
    }

    println!(
        "schools within {} km: {}, bus stops within {} km: {}",
        radii.school_km, scores.school_score, radii.bus_stop_km, scores.bus_stop_score
    );

    let (Some(lat), Some(lng)) = (lat, lng) else {
        println!("Both --lat and --lng are needed to list nearby amenities");
        return Ok(());
    };

    for nearby in amenities.schools.near(lat, lng, radii.school_km).iter().take(NEAREST_SHOWN) {
        let name = nearby.point.attribute("Official Name").unwrap_or("unnamed school");
        println!("  school {:.2} km  {}", nearby.distance_km, minimize_str(name, CELL_WIDTH));
    }

    for nearby in amenities.bus_stops.near(lat, lng, radii.bus_stop_km).iter().take(NEAREST_SHOWN) {
        let name = nearby
            .point
            .attribute("CommonName")
            .or_else(|| nearby.point.attribute("Stop Name"))
            .unwrap_or("unnamed stop");
        println!("  bus stop {:.2} km  {}", nearby.distance_km, minimize_str(name, CELL_WIDTH));
    }

    Ok(())
}
