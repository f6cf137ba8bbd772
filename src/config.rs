//! Configuration loaded from environment variables

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_LOCATION: &str = "/var/lib/irish_property_analysis/";

pub const DEFAULT_PPR_URL: &str =
    "https://www.propertypriceregister.ie/website/npsra/ppr/npsra-ppr.nsf/Downloads/PPR-ALL.zip/$FILE/PPR-ALL.zip";
pub const DEFAULT_PRIMARY_SCHOOLS_URL: &str =
    "https://assets.gov.ie/static/documents/Data_on_Individual_Schools_PPOD_2024_25.xlsx";
pub const DEFAULT_SECONDARY_SCHOOLS_URL: &str =
    "https://assets.gov.ie/static/documents/Data_on_Individual_Schools_Mainstream_2024_25.xlsx";
pub const DEFAULT_BUS_STOPS_URL: &str = "https://www.transportforireland.ie/transitData/Data/NaPTAN.xlsx";

pub const PRIMARY_SCHOOLS_SHEET: &str = "School List";
pub const SECONDARY_SCHOOLS_SHEET: &str = "Mainstream Schools";
pub const BUS_STOPS_SHEET_FRAGMENT: &str = "StopPoints";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub ppr_url: String,
    pub primary_schools_url: String,
    pub secondary_schools_url: String,
    pub bus_stops_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = env::var("PROPERTY_ANALYSIS_DATA_LOCATION")
            .unwrap_or_else(|_| DEFAULT_DATA_LOCATION.to_string());

        Config {
            ppr_url: env::var("PPR_URL").unwrap_or_else(|_| DEFAULT_PPR_URL.to_string()),
            primary_schools_url: env::var("PRIMARY_SCHOOLS_URL")
                .unwrap_or_else(|_| DEFAULT_PRIMARY_SCHOOLS_URL.to_string()),
            secondary_schools_url: env::var("SECONDARY_SCHOOLS_URL")
                .unwrap_or_else(|_| DEFAULT_SECONDARY_SCHOOLS_URL.to_string()),
            bus_stops_url: env::var("BUS_STOPS_URL")
                .unwrap_or_else(|_| DEFAULT_BUS_STOPS_URL.to_string()),
            ..Config::with_data_dir(data_dir)
        }
    }

    /// Default sources, data kept under `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Config {
            data_dir: data_dir.into(),
            ppr_url: DEFAULT_PPR_URL.to_string(),
            primary_schools_url: DEFAULT_PRIMARY_SCHOOLS_URL.to_string(),
            secondary_schools_url: DEFAULT_SECONDARY_SCHOOLS_URL.to_string(),
            bus_stops_url: DEFAULT_BUS_STOPS_URL.to_string(),
        }
    }

    pub fn ppr_path(&self) -> PathBuf {
        self.data_dir.join("ppr.csv")
    }

    pub fn schools_dir(&self) -> PathBuf {
        self.data_dir.join("schools")
    }

    pub fn primary_schools_path(&self) -> PathBuf {
        self.schools_dir().join("primary.csv")
    }

    pub fn secondary_schools_path(&self) -> PathBuf {
        self.schools_dir().join("secondary.csv")
    }

    pub fn bus_stops_dir(&self) -> PathBuf {
        self.data_dir.join("bus_stops")
    }

    pub fn bus_stops_path(&self) -> PathBuf {
        self.bus_stops_dir().join("bus_stops.csv")
    }

    pub fn ensure_dirs(&self) -> io::Result<()> {
        for dir in [self.data_dir.clone(), self.schools_dir(), self.bus_stops_dir()] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths() {
        let config = Config::with_data_dir("/data");

        assert_eq!(config.ppr_path(), PathBuf::from("/data/ppr.csv"));
        assert_eq!(config.primary_schools_path(), PathBuf::from("/data/schools/primary.csv"));
        assert_eq!(config.secondary_schools_path(), PathBuf::from("/data/schools/secondary.csv"));
        assert_eq!(config.bus_stops_path(), PathBuf::from("/data/bus_stops/bus_stops.csv"));
    }

    #[test]
    fn test_ensure_dirs() {
        let temp = tempdir().unwrap();
        let config = Config::with_data_dir(temp.path().join("nested"));

        config.ensure_dirs().unwrap();

        assert!(config.schools_dir().is_dir());
        assert!(config.bus_stops_dir().is_dir());
    }
}
