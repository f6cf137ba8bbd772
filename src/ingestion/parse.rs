//! Parse functions - validate raw PPR rows into Sale structs

use crate::ingestion::errors::{SaleError, SaleResult};
use crate::ingestion::types::{PprRow, PropertyDescription, PropertySize, Sale};
use crate::ingestion::utils::decode_latin1;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Byte 0x80 is the euro sign in the source's code page; read as
/// ISO-8859-1 it arrives as this control character.
const MANGLED_EURO: char = '\u{80}';

/// Microsecond precision, the most a saved date is written with
const MAX_FRACTION_DIGITS: usize = 6;

impl PprRow {
    /// Map a positional CSV record onto the PPR columns. Extra columns
    /// (derived fields in a saved file) are ignored.
    pub fn from_record(record: &StringRecord) -> Self {
        let field = |idx: usize| record.get(idx).map(str::to_string);

        PprRow {
            date: field(0),
            address: field(1),
            eircode: field(2),
            county: field(3),
            price: field(4),
            not_full_market_price: field(5),
            vat_exclusive: field(6),
            description_of_property: field(7),
            description_of_property_size: field(8),
        }
    }
}

impl Sale {
    /// Validating constructor from a raw row
    pub fn from_row(row: PprRow) -> SaleResult<Sale> {
        let date = row.date.ok_or_else(|| SaleError::missing("date"))?;
        let address = row.address.ok_or_else(|| SaleError::missing("address"))?;
        let county = row.county.ok_or_else(|| SaleError::missing("county"))?;
        let price = row.price.ok_or_else(|| SaleError::missing("price"))?;

        Ok(Sale {
            date: parse_date(&date)?,
            address,
            eircode: normalize_eircode(row.eircode),
            county: county.to_lowercase(),
            price: parse_price(&price)?,
            not_full_market_price: non_empty(row.not_full_market_price),
            vat_exclusive: non_empty(row.vat_exclusive),
            description_of_property: row
                .description_of_property
                .as_deref()
                .and_then(PropertyDescription::from_ppr),
            description_of_property_size: row
                .description_of_property_size
                .as_deref()
                .and_then(PropertySize::from_ppr),
        })
    }

    /// An already validated sale passes through unchanged
    pub fn from_record(sale: &Sale) -> Sale {
        sale.clone()
    }
}

/// Parse a currency amount such as `€123,456.00` into a non-negative decimal
pub fn parse_price(raw: &str) -> SaleResult<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(*c, MANGLED_EURO | '€' | ','))
        .collect();

    let price = Decimal::from_str(cleaned.trim())
        .map_err(|e| SaleError::malformed("price", raw, e.to_string()))?;

    if price.is_sign_negative() && !price.is_zero() {
        return Err(SaleError::malformed("price", raw, "price is negative"));
    }

    Ok(price)
}

/// Accepts `DD/MM/YYYY`, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD HH:MM:SS.ffffff`
pub fn parse_date(raw: &str) -> SaleResult<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    let malformed = || {
        SaleError::malformed(
            "date",
            raw,
            "expected DD/MM/YYYY, YYYY-MM-DD HH:MM:SS or YYYY-MM-DD HH:MM:SS.ffffff",
        )
    };

    // chrono's %.f takes up to nine digits; saved files only carry six
    if let Some((_, fraction)) = raw.rsplit_once('.') {
        if fraction.len() > MAX_FRACTION_DIGITS {
            return Err(malformed());
        }
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map_err(|_| malformed())
}

/// Blank and NaN-like eircodes become `None`; the Irish spellings of
/// Dublin (including the mis-encoded one) become `Dublin`.
pub fn normalize_eircode(raw: Option<String>) -> Option<String> {
    let raw = raw.filter(|e| !e.is_empty() && e != "nan")?;

    Some(
        raw.replace("Baile Átha Cliath", "Dublin")
            .replace("Baile ?tha Cliath", "Dublin"),
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Read a PPR file (ISO-8859-1) into raw rows. The first line is the file's
/// own header and is skipped; columns are taken positionally.
pub fn read_ppr_rows(path: &Path) -> SaleResult<Vec<PprRow>> {
    info!("Reading PPR rows from {:?}", path);

    let bytes = std::fs::read(path).map_err(|e| SaleError::file_access(path, e))?;
    let text = decode_latin1(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records().skip(1) {
        let record = result?;
        rows.push(PprRow::from_record(&record));
    }

    info!("Read {} PPR rows", rows.len());

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> PprRow {
        PprRow {
            date: Some("01/01/2010".to_string()),
            address: Some("123 something something street".to_string()),
            eircode: Some("D02X285".to_string()),
            county: Some("Dublin".to_string()),
            price: Some("123,456".to_string()),
            not_full_market_price: Some("No".to_string()),
            vat_exclusive: Some("No".to_string()),
            description_of_property: Some("Second-Hand Dwelling house /Apartment".to_string()),
            description_of_property_size: Some(
                "greater than or equal to 38 sq metres and less than 125 sq metres".to_string(),
            ),
        }
    }

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("123,456").unwrap(), Decimal::from(123_456));
        assert_eq!(parse_price("\u{80}1,234,567.00").unwrap(), Decimal::from(1_234_567));
        assert_eq!(parse_price("€250,000.50").unwrap(), Decimal::from_str("250000.50").unwrap());
        assert_eq!(parse_price(" 99 ").unwrap(), Decimal::from(99));
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        match parse_price("about 100k") {
            Err(SaleError::MalformedValue { field, value, .. }) => {
                assert_eq!(field, "price");
                assert_eq!(value, "about 100k");
            }
            other => panic!("Expected MalformedValue, got {:?}", other),
        }

        assert!(parse_price("").is_err());
        assert!(parse_price("-5,000").is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("25/12/2023").unwrap(), datetime(2023, 12, 25, 0, 0, 0));
        assert_eq!(
            parse_date("2023-12-25 14:30:05").unwrap(),
            datetime(2023, 12, 25, 14, 30, 5)
        );

        let with_fraction = parse_date("2023-12-25 14:30:05.250000").unwrap();
        assert_eq!(with_fraction.date(), NaiveDate::from_ymd_opt(2023, 12, 25).unwrap());
        assert_eq!(with_fraction.and_utc().timestamp_subsec_micros(), 250_000);
    }

    #[test]
    fn test_parse_date_rejects_sub_microsecond_fractions() {
        for raw in ["2020-01-01 00:00:00.1234567", "2020-01-01 00:00:00.123456789"] {
            match parse_date(raw) {
                Err(SaleError::MalformedValue { field, value, .. }) => {
                    assert_eq!(field, "date");
                    assert_eq!(value, raw);
                }
                other => panic!("Expected MalformedValue for {:?}, got {:?}", raw, other),
            }
        }

        let short = parse_date("2020-01-01 00:00:00.5").unwrap();
        assert_eq!(short.and_utc().timestamp_subsec_micros(), 500_000);
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        for raw in ["2023/12/25", "25-12-2023", "invalid", ""] {
            match parse_date(raw) {
                Err(SaleError::MalformedValue { field, .. }) => assert_eq!(field, "date"),
                other => panic!("Expected MalformedValue for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn test_normalize_eircode() {
        assert_eq!(normalize_eircode(None), None);
        assert_eq!(normalize_eircode(Some(String::new())), None);
        assert_eq!(normalize_eircode(Some("nan".to_string())), None);
        assert_eq!(
            normalize_eircode(Some("D02X285".to_string())),
            Some("D02X285".to_string())
        );
        assert_eq!(
            normalize_eircode(Some("Baile Átha Cliath 2".to_string())),
            Some("Dublin 2".to_string())
        );
        assert_eq!(
            normalize_eircode(Some("Baile ?tha Cliath 4".to_string())),
            Some("Dublin 4".to_string())
        );
    }

    #[test]
    fn test_from_row() {
        let sale = Sale::from_row(sample_row()).unwrap();

        assert_eq!(sale.date(), datetime(2010, 1, 1, 0, 0, 0));
        assert_eq!(sale.address(), "123 something something street");
        assert_eq!(sale.county(), "dublin");
        assert_eq!(sale.price(), Decimal::from(123_456));
        assert_eq!(sale.eircode(), Some("D02X285"));
        assert_eq!(sale.description_of_property(), Some(PropertyDescription::SecondHand));
        assert_eq!(sale.description_of_property_size(), Some(PropertySize::From38To125));
    }

    #[test]
    fn test_from_row_missing_fields() {
        for field in ["date", "address", "county", "price"] {
            let mut row = sample_row();
            match field {
                "date" => row.date = None,
                "address" => row.address = None,
                "county" => row.county = None,
                _ => row.price = None,
            }

            match Sale::from_row(row) {
                Err(SaleError::MissingField { field: missing }) => assert_eq!(missing, field),
                other => panic!("Expected MissingField for {}, got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_from_row_optional_fields() {
        let row = PprRow {
            eircode: None,
            not_full_market_price: None,
            vat_exclusive: Some(String::new()),
            description_of_property: None,
            description_of_property_size: None,
            ..sample_row()
        };

        let sale = Sale::from_row(row).unwrap();
        assert_eq!(sale.eircode(), None);
        assert_eq!(sale.eircode_routing_key(), None);
        assert_eq!(sale.eircode_unique_id(), None);
        assert_eq!(sale.not_full_market_price(), None);
        assert_eq!(sale.vat_exclusive(), None);
        assert_eq!(sale.description_of_property(), None);
    }

    #[test]
    fn test_irish_descriptions() {
        let mut row = sample_row();
        row.description_of_property = Some("Teach/Árasán Cónaithe Nua".to_string());
        assert_eq!(
            Sale::from_row(row).unwrap().description_of_property(),
            Some(PropertyDescription::New)
        );

        let mut row = sample_row();
        row.description_of_property = Some("Teach/Árasán Cónaithe Atháimhe".to_string());
        assert_eq!(
            Sale::from_row(row).unwrap().description_of_property(),
            Some(PropertyDescription::SecondHand)
        );
    }

    #[test]
    fn test_unrecognised_descriptions_become_none() {
        let mut row = sample_row();
        row.description_of_property = Some("Dwelling of some sort".to_string());
        row.description_of_property_size = Some("roomy".to_string());

        let sale = Sale::from_row(row).unwrap();
        assert_eq!(sale.description_of_property(), None);
        assert_eq!(sale.description_of_property_size(), None);
    }

    #[test]
    fn test_from_record_is_identity() {
        let sale = Sale::from_row(sample_row()).unwrap();
        let again = Sale::from_record(&sale);

        assert_eq!(again, sale);
        assert_eq!(again.hash(), sale.hash());
    }

    #[test]
    fn test_ppr_row_from_record_ignores_extra_columns() {
        let record = StringRecord::from(vec![
            "2010-01-01 00:00:00",
            "1 Main St",
            "",
            "cork",
            "100000",
            "No",
            "No",
            "new",
            "",
            "",
            "",
        ]);
        let row = PprRow::from_record(&record);

        assert_eq!(row.date.as_deref(), Some("2010-01-01 00:00:00"));
        assert_eq!(row.county.as_deref(), Some("cork"));
        assert_eq!(row.description_of_property_size.as_deref(), Some(""));
    }

    #[test]
    fn test_ppr_row_short_record() {
        let record = StringRecord::from(vec!["01/01/2010", "1 Main St"]);
        let row = PprRow::from_record(&record);

        assert!(row.county.is_none());
        assert!(matches!(
            Sale::from_row(row),
            Err(SaleError::MissingField { field: "county" })
        ));
    }
}
