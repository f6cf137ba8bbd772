//! Loading amenity point datasets from CSV

use crate::amenities::geo::{Located, PointSet};
use crate::ingestion::errors::{SaleError, SaleResult};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// One row of an amenity dataset. Every column is kept as text for display;
/// the coordinates are pulled out as numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct AmenityPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub attributes: BTreeMap<String, String>,
}

impl AmenityPoint {
    pub fn attribute(&self, column: &str) -> Option<&str> {
        self.attributes.get(column).map(String::as_str)
    }
}

impl Located for AmenityPoint {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Where to find the header and coordinates in a dataset
#[derive(Debug, Clone, Copy)]
pub struct PointColumns {
    pub latitude: &'static str,
    pub longitude: &'static str,
    /// Rows above the real header (title lines from a spreadsheet export)
    pub header_row: usize,
}

/// Unparseable coordinates become NaN, which no radius query ever matches
fn coerce_coordinate(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

pub fn read_points<R: Read>(reader: R, columns: PointColumns) -> SaleResult<Vec<AmenityPoint>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = reader.records().skip(columns.header_row);

    let headers = match records.next() {
        Some(headers) => headers?,
        None => return Ok(Vec::new()),
    };

    let lat_idx = headers
        .iter()
        .position(|h| h.trim() == columns.latitude)
        .ok_or_else(|| SaleError::missing(columns.latitude))?;
    let lng_idx = headers
        .iter()
        .position(|h| h.trim() == columns.longitude)
        .ok_or_else(|| SaleError::missing(columns.longitude))?;

    let mut points = Vec::new();
    let mut unusable = 0;

    for result in records {
        let record = result?;

        let latitude = coerce_coordinate(record.get(lat_idx).unwrap_or_default());
        let longitude = coerce_coordinate(record.get(lng_idx).unwrap_or_default());
        if latitude.is_nan() || longitude.is_nan() {
            unusable += 1;
        }

        let attributes = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.trim().to_string(), value.to_string()))
            .collect();

        points.push(AmenityPoint {
            latitude,
            longitude,
            attributes,
        });
    }

    if unusable > 0 {
        warn!("{} rows have no usable coordinates", unusable);
    }

    Ok(points)
}

pub fn load_point_set(path: &Path, columns: PointColumns) -> SaleResult<PointSet<AmenityPoint>> {
    info!("Loading amenity points from {:?}", path);

    let file = std::fs::File::open(path).map_err(|e| SaleError::file_access(path, e))?;
    let points = read_points(std::io::BufReader::new(file), columns)?;

    info!("Loaded {} amenity points from {:?}", points.len(), path);

    Ok(PointSet::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: PointColumns = PointColumns {
        latitude: "Latitude",
        longitude: "Longitude",
        header_row: 0,
    };

    #[test]
    fn test_read_points() {
        let csv = "Name,Latitude,Longitude\nO'Connell St,53.3498,-6.2603\nNowhere,,\n";
        let points = read_points(csv.as_bytes(), COLUMNS).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].latitude, 53.3498);
        assert_eq!(points[0].longitude, -6.2603);
        assert_eq!(points[0].attribute("Name"), Some("O'Connell St"));
        assert!(points[1].latitude.is_nan());
    }

    #[test]
    fn test_read_points_with_title_row() {
        let csv = "Mainstream Schools 2024/25\nOfficial Name,School Latitude,School Longitude\nColáiste Mhuire,53.1,-6.1\n";
        let columns = PointColumns {
            latitude: "School Latitude",
            longitude: "School Longitude",
            header_row: 1,
        };

        let points = read_points(csv.as_bytes(), columns).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].attribute("Official Name"), Some("Coláiste Mhuire"));
        assert_eq!(points[0].latitude, 53.1);
    }

    #[test]
    fn test_read_points_missing_column() {
        let csv = "Name,Lat,Lng\nSomewhere,53.0,-6.0\n";

        match read_points(csv.as_bytes(), COLUMNS) {
            Err(SaleError::MissingField { field }) => assert_eq!(field, "Latitude"),
            other => panic!("Expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_read_points_empty_input() {
        assert!(read_points("".as_bytes(), COLUMNS).unwrap().is_empty());
    }

    #[test]
    fn test_load_point_set_missing_file() {
        let result = load_point_set(Path::new("/definitely/not/here.csv"), COLUMNS);
        assert!(matches!(result, Err(SaleError::FileAccess { .. })));
    }
}
