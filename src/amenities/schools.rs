//! Primary and post-primary schools

use crate::amenities::geo::{Nearby, PointSet};
use crate::amenities::points::{load_point_set, AmenityPoint, PointColumns};
use crate::ingestion::errors::SaleResult;
use std::path::Path;
use tracing::info;

pub const SCHOOL_LATITUDE: &str = "School Latitude";
pub const SCHOOL_LONGITUDE: &str = "School Longitude";

const PRIMARY_COLUMNS: PointColumns = PointColumns {
    latitude: SCHOOL_LATITUDE,
    longitude: SCHOOL_LONGITUDE,
    header_row: 0,
};

// The post-primary export has a title line above its header
const SECONDARY_COLUMNS: PointColumns = PointColumns {
    latitude: SCHOOL_LATITUDE,
    longitude: SCHOOL_LONGITUDE,
    header_row: 1,
};

#[derive(Debug, Clone, Default)]
pub struct Schools {
    pub primary: PointSet<AmenityPoint>,
    pub secondary: PointSet<AmenityPoint>,
}

impl Schools {
    pub fn new(primary: PointSet<AmenityPoint>, secondary: PointSet<AmenityPoint>) -> Self {
        Self { primary, secondary }
    }

    pub fn load(primary_path: &Path, secondary_path: &Path) -> SaleResult<Self> {
        info!("Loading school data");

        Ok(Self {
            primary: load_point_set(primary_path, PRIMARY_COLUMNS)?,
            secondary: load_point_set(secondary_path, SECONDARY_COLUMNS)?,
        })
    }

    pub fn len(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Schools of either level within the radius, nearest first
    pub fn near(&self, lat: f64, lng: f64, radius_km: f64) -> Vec<Nearby<'_, AmenityPoint>> {
        let mut nearby = self.primary.near(lat, lng, radius_km);
        nearby.extend(self.secondary.near(lat, lng, radius_km));
        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        nearby
    }

    pub fn score(&self, lat: f64, lng: f64, radius_km: f64) -> usize {
        self.primary.score(lat, lng, radius_km) + self.secondary.score(lat, lng, radius_km)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_and_merge_levels() {
        let temp = tempdir().unwrap();
        let primary = temp.path().join("primary.csv");
        let secondary = temp.path().join("secondary.csv");

        fs::write(
            &primary,
            "Official Name,School Latitude,School Longitude\nScoil Mhuire,53.3440,-6.2550\nFar Away NS,52.0,-9.0\n",
        )
        .unwrap();
        fs::write(
            &secondary,
            "Post Primary Schools\nOfficial Name,School Latitude,School Longitude\nBelvedere College,53.3555,-6.2620\n",
        )
        .unwrap();

        let schools = Schools::load(&primary, &secondary).unwrap();
        assert_eq!(schools.len(), 3);

        let nearby = schools.near(53.3498, -6.2603, 1.0);
        let names: Vec<&str> = nearby
            .iter()
            .filter_map(|n| n.point.attribute("Official Name"))
            .collect();

        // Belvedere ~0.64km, Scoil Mhuire ~0.73km
        assert_eq!(names, vec!["Belvedere College", "Scoil Mhuire"]);
        assert_eq!(schools.score(53.3498, -6.2603, 1.0), 2);
    }
}
