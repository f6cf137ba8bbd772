// Library module for testable functions

pub mod amenities;
pub mod config;
pub mod ingestion;
pub mod sales;

pub use ingestion::{PprRow, Sale, SaleError, SaleHash, SaleRecord};
pub use sales::{MatchMode, Sales};

use chrono::{Duration, NaiveDateTime};

/// Listings and registrations closer together than this are treated as the
/// same transaction
pub const SALE_DATE_WINDOW_DAYS: f64 = 365.0 / 2.0;

/// Whether a listing date and a register date plausibly describe one sale.
/// The gap is counted in whole days, rounded down, before taking its size.
pub fn sale_dates_within_range(base: NaiveDateTime, other: NaiveDateTime) -> bool {
    let gap = base - other;
    let mut days = gap.num_days();
    if gap < Duration::days(days) {
        days -= 1;
    }

    (days.abs() as f64) < SALE_DATE_WINDOW_DAYS
}
