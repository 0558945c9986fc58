//! # Lenient Numeric Coercion
//!
//! Quantities, rates, discounts and tax rates arrive as text: typed into a
//! form, read from a CSV cell, or passed on the command line. Bad numbers
//! are never an error here. They become `0.0` and the line simply
//! contributes nothing.
//!
//! ```text
//!   "12.5"  → 12.5        "12,5" → 12.5       "  7 " → 7.0
//!   ""      → 0.0         None   → 0.0        "abc"  → 0.0
//!   "NaN"   → 0.0         "inf"  → 0.0
//! ```

/// Parses a user-entered number, coercing anything unusable to `0.0`.
///
/// A comma is accepted as the decimal separator. Non-finite results
/// (`"NaN"`, `"inf"`) are treated as unparseable.
///
/// ## Example
/// ```rust
/// use tijori_core::numeric::coerce_f64;
///
/// assert_eq!(coerce_f64(Some("3,75")), 3.75);
/// assert_eq!(coerce_f64(Some("")), 0.0);
/// assert_eq!(coerce_f64(None), 0.0);
/// ```
pub fn coerce_f64(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed.replace(',', ".").parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Like [`coerce_f64`] but also clamps negative values to zero.
///
/// Used for inputs whose domain is `>= 0` (quantity, rate, tax rate).
pub fn coerce_non_negative(raw: Option<&str>) -> f64 {
    coerce_f64(raw).max(0.0)
}

/// Formats a quantity without a trailing `.0` for whole numbers.
///
/// ## Example
/// ```rust
/// use tijori_core::numeric::format_qty;
///
/// assert_eq!(format_qty(12.0), "12");
/// assert_eq!(format_qty(2.5), "2.5");
/// ```
pub fn format_qty(qty: f64) -> String {
    if qty.fract() == 0.0 && qty.abs() < 1e15 {
        format!("{}", qty as i64)
    } else {
        format!("{}", qty)
    }
}
