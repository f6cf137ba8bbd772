//! Utility functions for common operations

use anyhow::Result;
use bytes::Bytes;
use reqwest::Client;
use std::fs;
use std::io;
use std::path::Path;
use tracing::info;

/// Name of the CSV inside the PPR download
pub const PPR_ARCHIVE_ENTRY: &str = "PPR-ALL.csv";

/// Download a file via HTTP
pub async fn http_get(url: &str) -> Result<Bytes> {
    info!("Downloading from {}", url);
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(300)) // 5 min timeout
        .build()?;

    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        return Err(anyhow::anyhow!("HTTP request failed: {}", status));
    }

    let bytes = response.bytes().await?;
    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes)
}

/// Extract a CSV from a ZIP archive to `output_path`. Prefers the entry
/// named `preferred`, otherwise takes the first `.csv` entry.
pub fn extract_csv_from_zip(zip_path: &Path, preferred: &str, output_path: &Path) -> Result<()> {
    info!("Extracting CSV from {:?}", zip_path);

    let file = fs::File::open(zip_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let entry_name = match archive.file_names().find(|name| *name == preferred) {
        Some(name) => name.to_string(),
        None => archive
            .file_names()
            .find(|name| name.ends_with(".csv"))
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("No CSV file found in ZIP archive"))?,
    };

    info!("Found CSV file: {}", entry_name);

    let mut entry = archive.by_name(&entry_name)?;
    let mut output_file = fs::File::create(output_path)?;
    io::copy(&mut entry, &mut output_file)?;

    info!("Extracted to {:?}", output_path);
    Ok(())
}

/// ISO-8859-1 maps every byte straight onto the code point of the same value
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Encode into ISO-8859-1, returning the first character that does not fit
pub fn encode_latin1(text: &str) -> Result<Vec<u8>, char> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| c))
        .collect()
}

/// Shorten a value for a table cell: newlines become spaces, runs of
/// spaces collapse, and anything longer than `length` ends in `...`
pub fn minimize_str(value: &str, length: usize) -> String {
    let mut minimized = String::with_capacity(value.len());
    for c in value.chars() {
        let c = if c == '\n' { ' ' } else { c };
        if c == ' ' && minimized.ends_with(' ') {
            continue;
        }
        minimized.push(c);
    }

    if minimized.chars().count() > length {
        let kept: String = minimized.chars().take(length.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        minimized
    }
}
