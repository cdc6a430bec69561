use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ── Raw rows ──────────────────────────────────────────────────────────────────

/// One data row as read from the delimited source, before any cleaning.
///
/// `row` is the 1-based data-row number (header excluded), carried so that
/// skipped rows can be reported against the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawListingRow {
    pub row: usize,
    pub price: Option<String>,
    pub discount: Option<String>,
}

// ── Discount unit ─────────────────────────────────────────────────────────────

/// Dataset-wide interpretation of the discount column, decided once per load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountUnit {
    /// Values are already on a 0 to 100 scale.
    Percentage,
    /// Values are currency amounts and still need conversion to a percentage.
    Monetary,
}

impl std::fmt::Display for DiscountUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountUnit::Percentage => write!(f, "percentage"),
            DiscountUnit::Monetary => write!(f, "monetary"),
        }
    }
}

// ── Price bands ───────────────────────────────────────────────────────────────

/// One of the equal-width intervals partitioning the full price range.
///
/// Half-open `[lower, upper)`, except the last band, which closes at the
/// dataset maximum so that every price has a home.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub lower: f64,
    pub upper: f64,
    pub upper_inclusive: bool,
    /// `"<lower> - <upper>"`, both bounds rounded to 2 decimal places.
    pub label: String,
}

impl PriceBand {
    pub fn contains(&self, price: f64) -> bool {
        if self.upper_inclusive {
            price >= self.lower && price <= self.upper
        } else {
            price >= self.lower && price < self.upper
        }
    }
}

// ── Listings ──────────────────────────────────────────────────────────────────

/// A fully cleaned and enriched listing. Copy-cheap so filter passes can hand
/// out owned subsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Source data-row number, 1-based.
    pub row: usize,
    /// Price in currency units; non-negative and finite.
    pub price: f64,
    /// Cleaned discount figure; its unit is the dataset's `DiscountUnit`.
    pub discount_value: f64,
    /// Discount as a percentage of the original price. `None` when the
    /// metric is undefined (monetary unit with `price + discount_value == 0`).
    pub discount_pct: Option<f64>,
    /// Index into the dataset's price bands.
    pub band: usize,
}

// ── Dataset snapshot ──────────────────────────────────────────────────────────

/// Immutable enriched snapshot of one loaded dataset.
///
/// Derived columns and band boundaries are computed once at load; the
/// interactive range filter selects subsets without recomputing either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub listings: Vec<Listing>,
    pub bands: Vec<PriceBand>,
    pub discount_unit: DiscountUnit,
    /// `(min, max)` of the full price column; `None` when no row survived
    /// cleaning.
    pub price_range: Option<(f64, f64)>,
    pub loaded_at: NaiveDateTime,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

// ── Load report ───────────────────────────────────────────────────────────────

/// Row accounting for one load, plus the dataset-level decisions the cleaner
/// took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Rows excluded because their price could not be normalized.
    pub rows_dropped: usize,
    pub discount_unit: DiscountUnit,
    /// True when the discount column mixes `%` and currency encodings.
    pub mixed_discount_encodings: bool,
}
