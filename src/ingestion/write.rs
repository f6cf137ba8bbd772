//! Write functions - persist sale records to the canonical PPR file

use crate::ingestion::errors::{SaleError, SaleResult};
use crate::ingestion::types::{SaleRecord, SALE_RECORD_HEADERS};
use crate::ingestion::utils::encode_latin1;
use chrono::{NaiveDateTime, Timelike};
use std::collections::HashSet;
use std::fs;
use std::hash::Hash;
use std::path::Path;
use tracing::{debug, info, warn};

/// Keep the first item for every distinct key, preserving order
pub fn remove_duplicates<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// `YYYY-MM-DD HH:MM:SS`, with microseconds only when there are any
pub fn format_sale_date(date: &NaiveDateTime) -> String {
    if date.nanosecond() == 0 {
        date.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        date.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

fn record_fields(record: &SaleRecord) -> [String; 11] {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();

    [
        format_sale_date(&record.date),
        record.address.clone(),
        text(&record.eircode),
        record.county.clone(),
        record.price.to_string(),
        text(&record.not_full_market_price),
        text(&record.vat_exclusive),
        record
            .description_of_property
            .map(|d| d.as_str().to_string())
            .unwrap_or_default(),
        record
            .description_of_property_size
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        text(&record.eircode_routing_key),
        text(&record.eircode_unique_id),
    ]
}

/// Write records as ISO-8859-1 CSV with a header line. Nothing is written
/// (and no file is created) when there are no records. Every row is encoded
/// before `path` is opened, so a failed write leaves an existing file as it was.
pub fn write_sales_csv(path: &Path, records: &[SaleRecord]) -> SaleResult<usize> {
    if records.is_empty() {
        warn!("No data to write to: {:?}", path);
        return Ok(0);
    }

    info!("Writing {} sale records to {:?}", records.len(), path);

    let contents = encode_sales_csv(records)?;

    fs::write(path, contents).map_err(|e| SaleError::file_access(path, e))?;

    debug!("Finished writing {:?}", path);

    Ok(records.len())
}

fn encode_sales_csv(records: &[SaleRecord]) -> SaleResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(SALE_RECORD_HEADERS)?;

    for record in records {
        let fields = record_fields(record);
        let mut encoded = Vec::with_capacity(fields.len());

        for (header, value) in SALE_RECORD_HEADERS.into_iter().zip(fields.iter()) {
            let bytes = encode_latin1(value).map_err(|c| {
                SaleError::malformed(
                    header,
                    value,
                    format!("{:?} is not representable in ISO-8859-1", c),
                )
            })?;
            encoded.push(bytes);
        }

        writer.write_record(&encoded)?;
    }

    writer
        .into_inner()
        .map_err(|e| SaleError::Csv(csv::Error::from(e.into_error())))
}
