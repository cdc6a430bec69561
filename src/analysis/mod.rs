//! Descriptive statistics and chart-ready aggregations over listings.
//!
//! `Summary` mirrors the eight-number describe block (count, mean, sample
//! std, min, quartiles, max), `histogram` buckets a column into equal-width
//! bins, and `band_breakdown` summarizes discounts per price band.

use crate::models::{Dataset, Listing};
use serde::Serialize;

// ── Summary ───────────────────────────────────────────────────────────────────

/// Eight-number description of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1). `None` for a single value.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    /// Summarize `values`, or `None` when there is nothing to summarize.
    pub fn from_values(values: &[f64]) -> Option<Summary> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std = if n > 1 {
            let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            Some(var.sqrt())
        } else {
            None
        };

        Some(Summary {
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[n - 1],
        })
    }
}

/// Linearly interpolated quantile over an already sorted slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

// ── Column extraction ─────────────────────────────────────────────────────────

pub fn prices(listings: &[Listing]) -> Vec<f64> {
    listings.iter().map(|l| l.price).collect()
}

pub fn discount_values(listings: &[Listing]) -> Vec<f64> {
    listings.iter().map(|l| l.discount_value).collect()
}

/// Discount percentages, skipping listings where the metric is undefined.
pub fn discount_pcts(listings: &[Listing]) -> Vec<f64> {
    listings.iter().filter_map(|l| l.discount_pct).collect()
}

// ── Histogram ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Bucket `values` into `bins` equal-width bins over their own range. The
/// last bin closes at the maximum; a zero-width range yields one bin with
/// everything in it.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + i as f64 * width,
            upper: if i == bins - 1 {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

// ── Band breakdown ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandBreakdown {
    pub band: usize,
    pub label: String,
    pub count: usize,
    /// Discount-percentage summary for the band, `None` when the band holds
    /// no listings with a defined percentage.
    pub discount_pct: Option<Summary>,
}

/// Summarize discount percentages per price band over `listings`, which may
/// be a filtered subset. Bands come from the dataset, so empty bands stay
/// visible with a zero count.
pub fn band_breakdown(dataset: &Dataset, listings: &[Listing]) -> Vec<BandBreakdown> {
    dataset
        .bands
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let members: Vec<&Listing> = listings.iter().filter(|l| l.band == i).collect();
            let pcts: Vec<f64> = members.iter().filter_map(|l| l.discount_pct).collect();
            BandBreakdown {
                band: i,
                label: band.label.clone(),
                count: members.len(),
                discount_pct: Summary::from_values(&pcts),
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
