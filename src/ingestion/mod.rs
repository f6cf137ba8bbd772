//! Data ingestion module - fetch, parse, normalise and persist PPR data

pub mod errors;
pub mod fetch;
pub mod normalize;
pub mod parse;
pub mod types;
pub mod utils;
pub mod write;

pub use errors::{SaleError, SaleResult};
pub use types::*;
