//! Metric & bucket deriver: raw rows → enriched dataset snapshot.
//!
//! Everything here is pure. `enrich` builds an immutable `Dataset` once per
//! load (discount unit first, then per-row normalization, then bands from the
//! full price range), and `filter_by_price` selects subsets without
//! recomputing anything.

use crate::cleaner::{self, parse_discount, parse_price};
use crate::config::{CleaningConfig, UnparsablePricePolicy};
use crate::error::LoadError;
use crate::models::{Dataset, DiscountUnit, Listing, LoadReport, PriceBand, RawListingRow};
use chrono::Utc;
use tracing::{debug, warn};

/// Number of equal-width price bands used for grouped comparison.
pub const PRICE_BAND_COUNT: usize = 5;

// ── Discount percentage ───────────────────────────────────────────────────────

/// Discount as a percentage of the original (pre-discount) price.
///
/// Monetary unit: `discount / (price + discount) * 100`, reading the discount
/// as the amount knocked off an original price of `price + discount`.
/// Undefined (`None`) when that original price is zero. Percentage unit: the
/// cleaned value already is the percentage.
pub fn discount_percentage(price: f64, discount_value: f64, unit: DiscountUnit) -> Option<f64> {
    match unit {
        DiscountUnit::Percentage => Some(discount_value),
        DiscountUnit::Monetary => {
            let original = price + discount_value;
            if original == 0.0 {
                None
            } else {
                Some(discount_value / original * 100.0)
            }
        }
    }
}

// ── Price bands ───────────────────────────────────────────────────────────────

/// Partition `[min, max]` into `PRICE_BAND_COUNT` equal-width bands,
/// half-open except the last, which closes at `max`. A zero-width range
/// collapses to a single band holding every listing.
pub fn build_price_bands(min: f64, max: f64) -> Vec<PriceBand> {
    if min == max {
        return vec![PriceBand {
            lower: min,
            upper: max,
            upper_inclusive: true,
            label: band_label(min, max),
        }];
    }

    let width = (max - min) / PRICE_BAND_COUNT as f64;
    (0..PRICE_BAND_COUNT)
        .map(|i| {
            let last = i == PRICE_BAND_COUNT - 1;
            let lower = min + i as f64 * width;
            let upper = if last { max } else { min + (i + 1) as f64 * width };
            PriceBand {
                lower,
                upper,
                upper_inclusive: last,
                label: band_label(lower, upper),
            }
        })
        .collect()
}

fn band_label(lower: f64, upper: f64) -> String {
    format!("{:.2} - {:.2}", lower, upper)
}

/// Index of the band containing `price`. Prices sit inside `[min, max]` by
/// construction; anything that escapes by float error clamps to the last band.
pub fn band_index(bands: &[PriceBand], price: f64) -> usize {
    bands
        .iter()
        .position(|b| b.contains(price))
        .unwrap_or(bands.len().saturating_sub(1))
}

// ── Enrichment ────────────────────────────────────────────────────────────────

/// Clean every raw row and assemble the immutable dataset snapshot.
///
/// The discount unit is decided once from the whole column before any row is
/// converted. Band boundaries come from the full (unfiltered) price range so
/// they stay comparable across filter changes.
pub fn enrich(
    rows: &[RawListingRow],
    cleaning: &CleaningConfig,
) -> Result<(Dataset, LoadReport), LoadError> {
    let scan = cleaner::scan_discount_column(rows);
    let unit = scan.unit();
    if scan.is_mixed() {
        warn!(
            "discount column mixes '%' and 'R$' encodings; treating the whole column as {}",
            unit
        );
    }

    let mut listings = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in rows {
        let Some(price) = row.price.as_deref().and_then(parse_price) else {
            match cleaning.on_unparsable_price {
                UnparsablePricePolicy::Drop => {
                    warn!(
                        "row {}: unparseable price {:?}, dropping row",
                        row.row,
                        row.price.as_deref().unwrap_or("")
                    );
                    dropped += 1;
                    continue;
                }
                UnparsablePricePolicy::Fail => {
                    return Err(LoadError::UnparsablePrice {
                        row: row.row,
                        value: row.price.clone().unwrap_or_default(),
                    });
                }
            }
        };

        let discount_value = parse_discount(row.discount.as_deref());
        let discount_pct = discount_percentage(price, discount_value, unit);

        listings.push(Listing {
            row: row.row,
            price,
            discount_value,
            discount_pct,
            band: 0,
        });
    }

    let price_range = full_price_range(&listings);
    let bands = match price_range {
        Some((min, max)) => build_price_bands(min, max),
        None => Vec::new(),
    };
    for listing in &mut listings {
        listing.band = band_index(&bands, listing.price);
    }

    debug!(
        "enriched {} listings ({} dropped), discount unit {}",
        listings.len(),
        dropped,
        unit
    );

    let report = LoadReport {
        rows_read: rows.len(),
        rows_kept: listings.len(),
        rows_dropped: dropped,
        discount_unit: unit,
        mixed_discount_encodings: scan.is_mixed(),
    };

    let dataset = Dataset {
        listings,
        bands,
        discount_unit: unit,
        price_range,
        loaded_at: Utc::now().naive_utc(),
    };

    Ok((dataset, report))
}

fn full_price_range(listings: &[Listing]) -> Option<(f64, f64)> {
    let first = listings.first()?.price;
    Some(listings.iter().fold((first, first), |(lo, hi), l| {
        (lo.min(l.price), hi.max(l.price))
    }))
}

// ── Filtering ─────────────────────────────────────────────────────────────────

/// Select the listings with `lo <= price <= hi`. Inclusive on both ends so
/// the full range reproduces the dataset; band assignments are untouched.
pub fn filter_by_price(listings: &[Listing], lo: f64, hi: f64) -> Vec<Listing> {
    listings
        .iter()
        .copied()
        .filter(|l| l.price >= lo && l.price <= hi)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(row: usize, price: Option<&str>, discount: Option<&str>) -> RawListingRow {
        RawListingRow {
            row,
            price: price.map(String::from),
            discount: discount.map(String::from),
        }
    }

    fn drop_policy() -> CleaningConfig {
        CleaningConfig::default()
    }

    #[test]
    fn monetary_formula_matches_reference() {
        let pct = discount_percentage(50.0, 10.0, DiscountUnit::Monetary).unwrap();
        assert!((pct - 100.0 * 10.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn percentage_unit_passes_through() {
        assert_eq!(
            discount_percentage(10.0, 12.0, DiscountUnit::Percentage),
            Some(12.0)
        );
        assert_eq!(
            discount_percentage(0.0, 0.0, DiscountUnit::Percentage),
            Some(0.0)
        );
    }

    #[test]
    fn zero_price_and_discount_is_undefined_not_zero() {
        assert_eq!(discount_percentage(0.0, 0.0, DiscountUnit::Monetary), None);
        // A free item with a real monetary discount is a full discount.
        assert_eq!(
            discount_percentage(0.0, 5.0, DiscountUnit::Monetary),
            Some(100.0)
        );
    }

    #[test]
    fn bands_partition_range_into_five() {
        let bands = build_price_bands(10.0, 30.0);
        assert_eq!(bands.len(), PRICE_BAND_COUNT);
        assert_eq!(bands[0].lower, 10.0);
        assert_eq!(bands[4].upper, 30.0);
        // Contiguous with shared boundary points only.
        for pair in bands.windows(2) {
            assert_eq!(pair[0].upper, pair[1].lower);
        }
        assert!(bands[..4].iter().all(|b| !b.upper_inclusive));
        assert!(bands[4].upper_inclusive);
        assert_eq!(bands[0].label, "10.00 - 14.00");
        assert_eq!(bands[4].label, "26.00 - 30.00");
    }

    #[test]
    fn band_assignment_covers_edges() {
        let bands = build_price_bands(10.0, 30.0);
        assert_eq!(band_index(&bands, 10.0), 0);
        assert_eq!(band_index(&bands, 13.999), 0);
        // A shared boundary belongs to the upper band.
        assert_eq!(band_index(&bands, 14.0), 1);
        assert_eq!(band_index(&bands, 30.0), 4);
    }

    #[test]
    fn degenerate_range_collapses_to_one_band() {
        let bands = build_price_bands(9.9, 9.9);
        assert_eq!(bands.len(), 1);
        assert!(bands[0].upper_inclusive);
        assert_eq!(bands[0].label, "9.90 - 9.90");
        assert_eq!(band_index(&bands, 9.9), 0);
    }

    #[test]
    fn enrich_percentage_scenario() {
        // One % row switches the whole column to the percentage unit.
        let rows = vec![
            raw(1, Some("R$10,00"), Some("10%")),
            raw(2, Some("R$20,00"), Some("-")),
            raw(3, Some("R$30,00"), Some("R$6,00")),
        ];
        let (ds, report) = enrich(&rows, &drop_policy()).unwrap();

        assert_eq!(report.discount_unit, DiscountUnit::Percentage);
        assert!(report.mixed_discount_encodings);
        let prices: Vec<f64> = ds.listings.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![10.0, 20.0, 30.0]);
        let pcts: Vec<Option<f64>> = ds.listings.iter().map(|l| l.discount_pct).collect();
        assert_eq!(pcts, vec![Some(10.0), Some(0.0), Some(6.0)]);
        assert_eq!(ds.price_range, Some((10.0, 30.0)));
        assert_eq!(ds.bands.len(), PRICE_BAND_COUNT);
    }

    #[test]
    fn enrich_monetary_scenario() {
        let rows = vec![raw(1, Some("R$50,00"), Some("R$10,00"))];
        let (ds, report) = enrich(&rows, &drop_policy()).unwrap();

        assert_eq!(report.discount_unit, DiscountUnit::Monetary);
        let pct = ds.listings[0].discount_pct.unwrap();
        assert!((pct - 100.0 * 10.0 / 60.0).abs() < 1e-9);
        // Single distinct price: one collapsed band.
        assert_eq!(ds.bands.len(), 1);
        assert_eq!(ds.listings[0].band, 0);
    }

    #[test]
    fn enrich_drops_bad_prices_by_default() {
        let rows = vec![
            raw(1, Some("R$10,00"), None),
            raw(2, Some("n/a"), None),
            raw(3, None, None),
            raw(4, Some("R$30,00"), None),
        ];
        let (ds, report) = enrich(&rows, &drop_policy()).unwrap();

        assert_eq!(report.rows_read, 4);
        assert_eq!(report.rows_kept, 2);
        assert_eq!(report.rows_dropped, 2);
        assert_eq!(ds.len(), 2);
    }

    #[test]
    fn enrich_fail_policy_aborts_with_row() {
        let cfg = CleaningConfig {
            on_unparsable_price: UnparsablePricePolicy::Fail,
        };
        let rows = vec![raw(1, Some("R$10,00"), None), raw(2, Some("??"), None)];
        let err = enrich(&rows, &cfg).unwrap_err();
        match err {
            LoadError::UnparsablePrice { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "??");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn enrich_handles_empty_input() {
        let (ds, report) = enrich(&[], &drop_policy()).unwrap();
        assert!(ds.is_empty());
        assert!(ds.bands.is_empty());
        assert_eq!(ds.price_range, None);
        assert_eq!(report.rows_read, 0);
    }

    #[test]
    fn full_range_filter_returns_everything() {
        let rows = vec![
            raw(1, Some("10,00"), Some("1%")),
            raw(2, Some("20,00"), Some("2%")),
            raw(3, Some("30,00"), Some("3%")),
        ];
        let (ds, _) = enrich(&rows, &drop_policy()).unwrap();
        let (min, max) = ds.price_range.unwrap();

        assert_eq!(filter_by_price(&ds.listings, min, max).len(), ds.len());
        assert_eq!(filter_by_price(&ds.listings, 15.0, 25.0).len(), 1);
        assert!(filter_by_price(&ds.listings, 31.0, 40.0).is_empty());
    }

    #[test]
    fn filter_keeps_band_assignments() {
        let rows = vec![raw(1, Some("10,00"), None), raw(2, Some("30,00"), None)];
        let (ds, _) = enrich(&rows, &drop_policy()).unwrap();

        let subset = filter_by_price(&ds.listings, 25.0, 30.0);
        assert_eq!(subset.len(), 1);
        // Still banded against the full range, not the subset's.
        assert_eq!(subset[0].band, ds.listings[1].band);
        assert_eq!(subset[0].band, PRICE_BAND_COUNT - 1);
    }
}
