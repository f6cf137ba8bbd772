//! Amenity datasets and proximity scoring for geocoded properties

pub mod bus_stops;
pub mod geo;
pub mod points;
pub mod schools;

use crate::config::Config;
use crate::ingestion::errors::SaleResult;
use serde::Serialize;
use tracing::info;

pub use bus_stops::BusStops;
pub use geo::{haversine_km, Located, Nearby, PointSet, DEFAULT_RADIUS_KM, EARTH_RADIUS_KM};
pub use points::AmenityPoint;
pub use schools::Schools;

/// Amenity data shared read-only by every query. Built once at startup and
/// passed by reference.
#[derive(Debug, Clone, Default)]
pub struct Amenities {
    pub schools: Schools,
    pub bus_stops: BusStops,
}

/// Per-property amenity scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AmenityScores {
    pub school_score: usize,
    pub bus_stop_score: usize,
}

/// Search radii for scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRadii {
    pub school_km: f64,
    pub bus_stop_km: f64,
}

impl Default for ScoreRadii {
    fn default() -> Self {
        Self {
            school_km: DEFAULT_RADIUS_KM,
            bus_stop_km: DEFAULT_RADIUS_KM,
        }
    }
}

impl Amenities {
    pub fn new(schools: Schools, bus_stops: BusStops) -> Self {
        Self { schools, bus_stops }
    }

    pub fn load(config: &Config) -> SaleResult<Self> {
        let schools = Schools::load(
            &config.primary_schools_path(),
            &config.secondary_schools_path(),
        )?;
        let bus_stops = BusStops::load(&config.bus_stops_path())?;

        info!(
            "Amenities loaded: {} schools, {} bus stops",
            schools.len(),
            bus_stops.len()
        );

        Ok(Self::new(schools, bus_stops))
    }

    /// Scores for a property location. A property without coordinates scores
    /// zero and the point sets are never queried.
    pub fn score_location(&self, lat: Option<f64>, lng: Option<f64>, radii: ScoreRadii) -> AmenityScores {
        let (Some(lat), Some(lng)) = (lat, lng) else {
            return AmenityScores::default();
        };

        AmenityScores {
            school_score: self.schools.score(lat, lng, radii.school_km),
            bus_stop_score: self.bus_stops.score(lat, lng, radii.bus_stop_km),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn point(lat: f64, lng: f64) -> AmenityPoint {
        AmenityPoint {
            latitude: lat,
            longitude: lng,
            attributes: BTreeMap::new(),
        }
    }

    fn mock_amenities() -> Amenities {
        let schools = Schools::new(
            PointSet::new(vec![point(53.3440, -6.2550)]),
            PointSet::new(vec![point(53.3555, -6.2620), point(52.0, -9.0)]),
        );
        let bus_stops = BusStops::new(PointSet::new(vec![
            point(53.3498, -6.2603),
            point(53.3500, -6.2610),
            point(53.3700, -6.3000),
        ]));

        Amenities::new(schools, bus_stops)
    }

    #[test]
    fn test_score_location() {
        let amenities = mock_amenities();
        let scores = amenities.score_location(Some(53.3498), Some(-6.2603), ScoreRadii::default());

        assert_eq!(
            scores,
            AmenityScores {
                school_score: 2,
                bus_stop_score: 2,
            }
        );
    }

    #[test]
    fn test_score_location_respects_radii() {
        let amenities = mock_amenities();
        let radii = ScoreRadii {
            school_km: 0.1,
            bus_stop_km: 5.0,
        };

        let scores = amenities.score_location(Some(53.3498), Some(-6.2603), radii);
        assert_eq!(scores.school_score, 0);
        assert_eq!(scores.bus_stop_score, 3);
    }

    #[test]
    fn test_missing_coordinates_score_zero() {
        let amenities = mock_amenities();

        assert_eq!(
            amenities.score_location(None, Some(-6.2603), ScoreRadii::default()),
            AmenityScores::default()
        );
        assert_eq!(
            amenities.score_location(Some(53.3498), None, ScoreRadii::default()),
            AmenityScores::default()
        );
    }
}
