//! Delimited-input loader: byte stream → raw listing rows.
//!
//! Only the price and discount columns are extracted; everything else in the
//! export (product name, id, image URLs) is presentation data the pipeline
//! never touches. Header lookup is case- and whitespace-insensitive.

use crate::config::DataConfig;
use crate::error::LoadError;
use crate::models::RawListingRow;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Canonical header form: BOM stripped, trimmed, lower-cased.
fn canon(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Resolved positions of the two interesting columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndices {
    pub price: usize,
    pub discount: usize,
}

/// Find the price column and the first matching discount candidate.
pub fn resolve_columns(
    headers: &csv::StringRecord,
    data: &DataConfig,
) -> Result<ColumnIndices, LoadError> {
    let canonical: Vec<String> = headers.iter().map(canon).collect();

    let price = canonical
        .iter()
        .position(|h| *h == canon(&data.price_column))
        .ok_or_else(|| LoadError::MissingColumn {
            name: data.price_column.clone(),
            headers: canonical.clone(),
        })?;

    let discount = data
        .discount_columns
        .iter()
        .find_map(|cand| canonical.iter().position(|h| *h == canon(cand)))
        .ok_or_else(|| LoadError::MissingDiscountColumn {
            tried: data.discount_columns.clone(),
            headers: canonical.clone(),
        })?;

    Ok(ColumnIndices { price, discount })
}

/// Read raw records from any delimited byte stream.
pub fn read_raw_records<R: Read>(
    input: R,
    data: &DataConfig,
) -> Result<Vec<RawListingRow>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(data.delimiter_byte()?)
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let columns = resolve_columns(reader.headers()?, data)?;
    debug!(
        "resolved columns: price #{}, discount #{}",
        columns.price, columns.discount
    );

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        // Malformed input is fatal; short rows are not (fields read as absent).
        let record = result?;
        rows.push(RawListingRow {
            row: i + 1,
            price: record.get(columns.price).map(str::to_string),
            discount: record.get(columns.discount).map(str::to_string),
        });
    }

    debug!("{} raw rows read", rows.len());
    Ok(rows)
}

/// Read raw records from a file on disk.
pub fn load_raw_file(path: &Path, data: &DataConfig) -> Result<Vec<RawListingRow>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = read_raw_records(file, data)?;
    info!("{:?}: {} data rows", path, rows.len());
    Ok(rows)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
