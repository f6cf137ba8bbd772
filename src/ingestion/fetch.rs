//! Fetch functions - retrieve raw data from the upstream publishers

use crate::ingestion::types::RawData;
use crate::ingestion::utils::{extract_csv_from_zip, http_get, PPR_ARCHIVE_ENTRY};
use anyhow::{Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::info;

/// How to pick a sheet out of a workbook
#[derive(Debug, Clone, Copy)]
pub enum SheetMatch<'a> {
    Exact(&'a str),
    Contains(&'a str),
}

impl SheetMatch<'_> {
    pub fn matches(&self, sheet_name: &str) -> bool {
        match self {
            SheetMatch::Exact(name) => sheet_name == *name,
            SheetMatch::Contains(fragment) => sheet_name.contains(fragment),
        }
    }
}

/// Fetch the Property Price Register (ZIP containing CSV) and leave the
/// extracted CSV at `dest`
pub async fn fetch_ppr(url: &str, dest: &Path) -> Result<RawData> {
    info!("Fetching PPR data from {}", url);

    let zip_bytes = http_get(url).await?;

    let zip_path = dest.with_extension("dl.zip");
    fs::write(&zip_path, &zip_bytes)
        .with_context(|| format!("Failed to save ZIP to {:?}", zip_path))?;
    info!("Saved ZIP to {:?}", zip_path);

    extract_csv_from_zip(&zip_path, PPR_ARCHIVE_ENTRY, dest)?;

    Ok(RawData::File(dest.to_path_buf()))
}

/// Fetch an XLSX workbook and write the matching sheet to `dest` as CSV
pub async fn fetch_sheet_as_csv(url: &str, sheet: SheetMatch<'_>, dest: &Path) -> Result<RawData> {
    info!("Fetching workbook from {}", url);

    let raw = RawData::Bytes(http_get(url).await?);
    let rows = sheet_rows(raw.as_bytes()?, sheet)?;

    write_rows_csv(dest, &rows)?;
    info!("Wrote {} rows to {:?}", rows.len(), dest);

    Ok(RawData::File(dest.to_path_buf()))
}

/// Read every row of the first sheet matching `sheet` as text cells
pub fn sheet_rows(bytes: &[u8], sheet: SheetMatch<'_>) -> Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

    let sheet_name = workbook
        .sheet_names()
        .into_iter()
        .find(|name| sheet.matches(name))
        .ok_or_else(|| anyhow::anyhow!("No sheet matching {:?} in workbook", sheet))?;

    info!("Reading sheet: {}", sheet_name);

    let range = workbook.worksheet_range(&sheet_name)?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        // keep whole numbers (roll numbers, ids) free of a trailing ".0"
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{:.0}", f),
        other => other.to_string(),
    }
}

pub fn write_rows_csv(dest: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(dest)
        .with_context(|| format!("Failed to create {:?}", dest))?;

    for row in rows {
        writer.write_record(row)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sheet_match() {
        assert!(SheetMatch::Exact("School List").matches("School List"));
        assert!(!SheetMatch::Exact("School List").matches("School List 2"));
        assert!(SheetMatch::Contains("StopPoints").matches("NaPTAN StopPoints"));
        assert!(!SheetMatch::Contains("StopPoints").matches("StopAreas"));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(cell_text(&Data::Float(12345.0)), "12345");
        assert_eq!(cell_text(&Data::Float(53.35)), "53.35");
        assert_eq!(cell_text(&Data::String("Scoil Bhríde".to_string())), "Scoil Bhríde");
    }

    #[test]
    fn test_write_rows_csv_allows_ragged_rows() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("rows.csv");

        let rows = vec![
            vec!["Mainstream Schools 2024/25".to_string()],
            vec!["Name".to_string(), "Latitude".to_string()],
        ];
        write_rows_csv(&dest, &rows).unwrap();

        let text = fs::read_to_string(&dest).unwrap();
        assert_eq!(text, "Mainstream Schools 2024/25\nName,Latitude\n");
    }

    #[tokio::test]
    #[ignore] // Ignore by default since it hits the real register
    async fn test_fetch_ppr() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("ppr.csv");
        let url = "https://www.propertypriceregister.ie/website/npsra/ppr/npsra-ppr.nsf/Downloads/PPR-ALL.zip/$FILE/PPR-ALL.zip";

        let result = fetch_ppr(url, &dest).await;
        assert!(result.is_ok());
        assert!(dest.exists());
    }
}
