//! Field normalizer: raw price/discount strings → clean numbers.
//!
//! The source exports mix several encodings per column ("R$89,90", "12%",
//! "-", empty). Prices that cannot be parsed stay undefined so a bad row can
//! never masquerade as a free item; discounts default to zero, meaning "no
//! discount".

use crate::models::{DiscountUnit, RawListingRow};

/// Currency marker used throughout the source data.
const CURRENCY_MARKER: &str = "R$";

// ── Price ─────────────────────────────────────────────────────────────────────

/// Parse a price: strip a leading currency marker, comma decimal → dot.
/// "R$89,90" → 89.9 | "610.00" → 610.0
///
/// Returns `None` for anything that is not a non-negative finite number.
/// Zero is a legitimate price ("free"); a failed parse must never look like
/// one.
pub fn parse_price(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.strip_prefix(CURRENCY_MARKER).unwrap_or(s).trim_start();
    let s = s.replace(',', ".");
    s.parse::<f64>().ok().filter(|p| p.is_finite() && *p >= 0.0)
}

// ── Discount ──────────────────────────────────────────────────────────────────

/// Parse a discount field. Three encodings coexist in the source data:
/// "12%" → 12.0 (already a percentage) | "R$5,00" → 5.0 (currency amount) |
/// "-", "", missing → 0.0 (no discount). Bare numbers parse with comma
/// decimals; stray noise and negative placeholders also yield 0.
pub fn parse_discount(raw: Option<&str>) -> f64 {
    let Some(s) = raw else { return 0.0 };
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    let parsed = if s.contains('%') {
        // Percentage: keep the numeric prefix, drop the sign and any residue.
        let numeric: String = s
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
            .collect();
        numeric.replace(',', ".").parse::<f64>().ok()
    } else if s.contains(CURRENCY_MARKER) {
        s.replace(CURRENCY_MARKER, "")
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
    } else {
        s.replace(',', ".").parse::<f64>().ok()
    };

    match parsed {
        Some(v) if v.is_finite() && v > 0.0 => v,
        // Negative values are placeholder noise ("-", "-5%"), not discounts.
        _ => 0.0,
    }
}

// ── Dataset-level unit detection ──────────────────────────────────────────────

/// What the raw discount column contains, gathered in one pass over the rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscountScan {
    pub saw_percent: bool,
    pub saw_currency: bool,
}

impl DiscountScan {
    /// A single `%` row switches the whole column to the percentage unit;
    /// otherwise every value is read as a currency amount.
    pub fn unit(&self) -> DiscountUnit {
        if self.saw_percent {
            DiscountUnit::Percentage
        } else {
            DiscountUnit::Monetary
        }
    }

    /// True when the column mixes `%` and currency encodings, an ambiguity
    /// in the source data worth surfacing to the caller.
    pub fn is_mixed(&self) -> bool {
        self.saw_percent && self.saw_currency
    }
}

/// Scan the whole raw discount column once to choose the dataset-level unit.
pub fn scan_discount_column(rows: &[RawListingRow]) -> DiscountScan {
    let mut scan = DiscountScan::default();
    for row in rows {
        if let Some(d) = row.discount.as_deref() {
            scan.saw_percent |= d.contains('%');
            scan.saw_currency |= d.contains(CURRENCY_MARKER);
        }
    }
    scan
}

// ── Tests ─────────────────────────────────────────────────────────────────────
