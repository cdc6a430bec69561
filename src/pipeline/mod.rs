//! Load orchestrator: ties loader → cleaner/enrichment together.
//!
//! One call per CLI invocation: read the CSV, clean every row, and hand back
//! the immutable dataset snapshot plus the load report. All analysis and
//! filtering happens downstream on the snapshot.

use crate::config::AppConfig;
use crate::enrich;
use crate::loader;
use crate::models::{Dataset, LoadReport};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Read `path`, normalize every row, and assemble the dataset.
pub fn load_dataset(path: &Path, config: &AppConfig) -> Result<(Dataset, LoadReport)> {
    info!("loading listings from {}", path.display());

    let raw = loader::load_raw_file(path, &config.data)
        .with_context(|| format!("failed to read listings from {}", path.display()))?;

    let (dataset, report) = enrich::enrich(&raw, &config.cleaning)
        .with_context(|| format!("failed to clean listings from {}", path.display()))?;

    info!(
        "=== Done: {} rows read | {} kept | {} dropped | discount unit: {} ===",
        report.rows_read, report.rows_kept, report.rows_dropped, report.discount_unit
    );

    Ok((dataset, report))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::PRICE_BAND_COUNT;
    use crate::models::DiscountUnit;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_and_cleans_a_real_file_end_to_end() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "preco2;desconto").unwrap();
        writeln!(file, "R$10,00;10%").unwrap();
        writeln!(file, "R$20,00;-").unwrap();
        writeln!(file, "sem preço;5%").unwrap();
        writeln!(file, "R$30,00;").unwrap();
        file.flush().unwrap();

        let config = AppConfig::default();
        let (dataset, report) = load_dataset(file.path(), &config).unwrap();

        assert_eq!(report.rows_read, 4);
        assert_eq!(report.rows_kept, 3);
        assert_eq!(report.rows_dropped, 1);
        assert_eq!(report.discount_unit, DiscountUnit::Percentage);
        assert!(!report.mixed_discount_encodings);

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.price_range, Some((10.0, 30.0)));
        assert_eq!(dataset.bands.len(), PRICE_BAND_COUNT);
        let pcts: Vec<Option<f64>> = dataset.listings.iter().map(|l| l.discount_pct).collect();
        assert_eq!(pcts, vec![Some(10.0), Some(0.0), Some(0.0)]);
    }

    #[test]
    fn missing_file_reports_the_path() {
        let config = AppConfig::default();
        let err = load_dataset(Path::new("/no/such/listings.csv"), &config).unwrap_err();
        assert!(err.to_string().contains("/no/such/listings.csv"));
    }
}
