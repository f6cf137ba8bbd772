//! Core data types for the PPR ingestion pipeline

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Raw data handed from the fetch layer to the parsers
#[derive(Debug)]
pub enum RawData {
    File(PathBuf),
    Bytes(bytes::Bytes),
}

impl RawData {
    pub fn as_file_path(&self) -> anyhow::Result<&PathBuf> {
        match self {
            RawData::File(path) => Ok(path),
            _ => Err(anyhow::anyhow!("Expected File, got {:?}", self)),
        }
    }

    pub fn as_bytes(&self) -> anyhow::Result<&[u8]> {
        match self {
            RawData::Bytes(bytes) => Ok(bytes),
            _ => Err(anyhow::anyhow!("Expected Bytes, got {:?}", self)),
        }
    }
}

/// One row of the PPR file, positional, exactly as read.
///
/// Every column is optional here; required columns are enforced when the
/// row is turned into a [`Sale`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PprRow {
    pub date: Option<String>,
    pub address: Option<String>,
    pub eircode: Option<String>,
    pub county: Option<String>,
    pub price: Option<String>,
    pub not_full_market_price: Option<String>,
    pub vat_exclusive: Option<String>,
    pub description_of_property: Option<String>,
    pub description_of_property_size: Option<String>,
}

/// Column order of the canonical PPR file
pub const PPR_HEADERS: [&str; 9] = [
    "date",
    "address",
    "eircode",
    "county",
    "price",
    "not_full_market_price",
    "vat_exclusive",
    "description_of_property",
    "description_of_property_size",
];

/// Column order of a saved sale, the PPR columns plus the derived eircode parts
pub const SALE_RECORD_HEADERS: [&str; 11] = [
    "date",
    "address",
    "eircode",
    "county",
    "price",
    "not_full_market_price",
    "vat_exclusive",
    "description_of_property",
    "description_of_property_size",
    "eircode_routing_key",
    "eircode_unique_id",
];

/// Property descriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyDescription {
    SecondHand,
    New,
}

impl PropertyDescription {
    /// Map PPR free text (English or Irish) onto a description.
    /// Anything unrecognised is dropped.
    pub fn from_ppr(raw: &str) -> Option<Self> {
        match raw {
            "Second-Hand Dwelling house /Apartment"
            | "Teach/Árasán Cónaithe Atháimhe"
            | "second_hand" => Some(Self::SecondHand),
            "New Dwelling house /Apartment"
            | "New Dwelling house /"
            | "Teach/Árasán Cónaithe Nua"
            | "Teach/?ras?n C?naithe Nua"
            | "new" => Some(Self::New),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyDescription::SecondHand => "second_hand",
            PropertyDescription::New => "new",
        }
    }
}

impl std::fmt::Display for PropertyDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Floor area bands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertySize {
    #[serde(rename = "<38sqm")]
    Under38,
    #[serde(rename = ">38sm <125sqm")]
    From38To125,
    #[serde(rename = ">125sqm")]
    Over125,
}

impl PropertySize {
    pub fn from_ppr(raw: &str) -> Option<Self> {
        match raw {
            "less than 38 sq metres" | "<38sqm" => Some(Self::Under38),
            "greater than or equal to 38 sq metres and less than 125 sq metres"
            | ">38sm <125sqm" => Some(Self::From38To125),
            "greater than 125 sq metres" | ">125sqm" => Some(Self::Over125),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertySize::Under38 => "<38sqm",
            PropertySize::From38To125 => ">38sm <125sqm",
            PropertySize::Over125 => ">125sqm",
        }
    }
}

impl std::fmt::Display for PropertySize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated PPR sale. Only built through [`Sale::from_row`] or
/// [`Sale::from_record`] so the county is always lowercase, the price is
/// non-negative and the descriptions are canonical.
#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub(crate) date: NaiveDateTime,
    pub(crate) address: String,
    pub(crate) eircode: Option<String>,
    pub(crate) county: String,
    pub(crate) price: Decimal,
    pub(crate) not_full_market_price: Option<String>,
    pub(crate) vat_exclusive: Option<String>,
    pub(crate) description_of_property: Option<PropertyDescription>,
    pub(crate) description_of_property_size: Option<PropertySize>,
}

impl Sale {
    pub fn date(&self) -> NaiveDateTime {
        self.date
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn eircode(&self) -> Option<&str> {
        self.eircode.as_deref()
    }

    pub fn county(&self) -> &str {
        &self.county
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn not_full_market_price(&self) -> Option<&str> {
        self.not_full_market_price.as_deref()
    }

    pub fn vat_exclusive(&self) -> Option<&str> {
        self.vat_exclusive.as_deref()
    }

    pub fn description_of_property(&self) -> Option<PropertyDescription> {
        self.description_of_property
    }

    pub fn description_of_property_size(&self) -> Option<PropertySize> {
        self.description_of_property_size
    }

    /// First three characters of the eircode, lowercased
    pub fn eircode_routing_key(&self) -> Option<String> {
        self.eircode
            .as_deref()
            .map(|e| e.chars().take(3).collect::<String>().to_lowercase())
    }

    /// Everything after the routing key, lowercased
    pub fn eircode_unique_id(&self) -> Option<String> {
        self.eircode
            .as_deref()
            .map(|e| e.chars().skip(3).collect::<String>().to_lowercase())
    }

    /// Identity of this sale: date, address, eircode and price
    pub fn key(&self) -> SaleKey<'_> {
        SaleKey {
            date: self.date,
            address: &self.address,
            eircode: self.eircode.as_deref(),
            price: self.price.normalize(),
        }
    }

    pub fn hash(&self) -> SaleHash {
        self.key().digest()
    }

    pub fn serialise(&self) -> SaleRecord {
        SaleRecord {
            date: self.date,
            address: self.address.clone(),
            eircode: self.eircode.clone(),
            county: self.county.clone(),
            price: self.price,
            not_full_market_price: self.not_full_market_price.clone(),
            vat_exclusive: self.vat_exclusive.clone(),
            description_of_property: self.description_of_property,
            description_of_property_size: self.description_of_property_size,
            eircode_routing_key: self.eircode_routing_key(),
            eircode_unique_id: self.eircode_unique_id(),
        }
    }
}

/// The four fields that make two sales the same registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaleKey<'a> {
    pub date: NaiveDateTime,
    pub address: &'a str,
    pub eircode: Option<&'a str>,
    pub price: Decimal,
}

impl SaleKey<'_> {
    /// SHA-256 over the length-prefixed key fields. Stable across runs and
    /// processes, unlike `std::hash`.
    pub fn digest(&self) -> SaleHash {
        let mut hasher = Sha256::new();

        let utc = self.date.and_utc();
        hasher.update(utc.timestamp().to_le_bytes());
        hasher.update(utc.timestamp_subsec_nanos().to_le_bytes());

        update_field(&mut hasher, self.address.as_bytes());

        match self.eircode {
            Some(eircode) => {
                hasher.update([1u8]);
                update_field(&mut hasher, eircode.as_bytes());
            }
            None => hasher.update([0u8]),
        }

        update_field(&mut hasher, self.price.normalize().to_string().as_bytes());

        SaleHash(hasher.finalize().into())
    }
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Content digest of a [`SaleKey`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaleHash([u8; 32]);

impl SaleHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for SaleHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Outward shape of a sale: stored fields plus derived eircode parts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    pub date: NaiveDateTime,
    pub address: String,
    pub eircode: Option<String>,
    pub county: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub not_full_market_price: Option<String>,
    pub vat_exclusive: Option<String>,
    pub description_of_property: Option<PropertyDescription>,
    pub description_of_property_size: Option<PropertySize>,
    pub eircode_routing_key: Option<String>,
    pub eircode_unique_id: Option<String>,
}

/// Write operation statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteStats {
    pub written: usize,
    pub duplicates_dropped: usize,
}

impl std::fmt::Display for WriteStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "written: {}, duplicates dropped: {}",
            self.written, self.duplicates_dropped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_data_accessors() {
        let file = RawData::File(PathBuf::from("/data/ppr.csv"));
        assert_eq!(file.as_file_path().unwrap(), &PathBuf::from("/data/ppr.csv"));
        assert!(file.as_bytes().is_err());

        let bytes = RawData::Bytes(bytes::Bytes::from_static(b"PK"));
        assert_eq!(bytes.as_bytes().unwrap(), b"PK");
        assert!(bytes.as_file_path().is_err());
    }
}
