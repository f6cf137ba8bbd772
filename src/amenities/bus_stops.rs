//! Bus stops from the NaPTAN stop points export

use crate::amenities::geo::{Nearby, PointSet};
use crate::amenities::points::{load_point_set, AmenityPoint, PointColumns};
use crate::ingestion::errors::SaleResult;
use std::path::Path;
use tracing::info;

pub const BUS_STOP_LATITUDE: &str = "Latitude";
pub const BUS_STOP_LONGITUDE: &str = "Longitude";

const COLUMNS: PointColumns = PointColumns {
    latitude: BUS_STOP_LATITUDE,
    longitude: BUS_STOP_LONGITUDE,
    header_row: 0,
};

#[derive(Debug, Clone, Default)]
pub struct BusStops {
    pub stops: PointSet<AmenityPoint>,
}

impl BusStops {
    pub fn new(stops: PointSet<AmenityPoint>) -> Self {
        Self { stops }
    }

    pub fn load(path: &Path) -> SaleResult<Self> {
        info!("Loading bus stop data");
        Ok(Self::new(load_point_set(path, COLUMNS)?))
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn near(&self, lat: f64, lng: f64, radius_km: f64) -> Vec<Nearby<'_, AmenityPoint>> {
        self.stops.near(lat, lng, radius_km)
    }

    /// Only a count for now; route counts per stop would make this fairer
    pub fn score(&self, lat: f64, lng: f64, radius_km: f64) -> usize {
        self.stops.score(lat, lng, radius_km)
    }
}
