//! # Line-Item Calculator
//!
//! Two pricing rules, one per side of the business:
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────────┐
//! │ Sales (orders, invoices)     │ Purchase (orders, invoices)              │
//! ├──────────────────────────────┼──────────────────────────────────────────┤
//! │ discount is a PERCENT        │ discount is an AMOUNT                    │
//! │                              │                                          │
//! │ total = max(qty × rate       │ net   = max(qty × rate − discount, 0)    │
//! │          × (1 − disc/100),0) │ tax   = net × gst / 100                  │
//! │                              │ total = net + tax                        │
//! └──────────────────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! Both are pure. Raw text goes through [`crate::numeric::coerce_f64`]
//! first, so a garbled cell yields a zero line instead of an error. A product
//! that overflows to infinity is zeroed the same way.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::numeric::coerce_f64;

// =============================================================================
// Sales Line
// =============================================================================

/// A computed sales-side line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesLine {
    pub qty: f64,
    pub rate: f64,
    /// Discount percent as entered (not clamped to 0-100).
    pub discount: f64,
    pub line_total: f64,
}

impl SalesLine {
    /// Computes `max(qty × rate × (1 − discount/100), 0)`.
    ///
    /// ## Example
    /// ```rust
    /// use tijori_core::line::SalesLine;
    ///
    /// assert_eq!(SalesLine::compute(3.0, 100.0, 10.0).line_total, 270.0);
    /// // Over-discounting never yields a negative line.
    /// assert_eq!(SalesLine::compute(1.0, 50.0, 150.0).line_total, 0.0);
    /// ```
    pub fn compute(qty: f64, rate: f64, discount: f64) -> Self {
        let line_total = (qty * rate * (1.0 - discount / 100.0)).max(0.0);
        let line_total = if line_total.is_finite() { line_total } else { 0.0 };
        SalesLine {
            qty,
            rate,
            discount,
            line_total,
        }
    }

    /// Coerces raw text inputs, then computes.
    pub fn from_raw(qty: Option<&str>, rate: Option<&str>, discount: Option<&str>) -> Self {
        Self::compute(coerce_f64(qty), coerce_f64(rate), coerce_f64(discount))
    }
}

// =============================================================================
// Purchase Line
// =============================================================================

/// A computed purchase-side line with its net/tax split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PurchaseLine {
    pub qty: f64,
    pub rate: f64,
    /// Flat discount amount taken off `qty × rate`.
    pub discount: f64,
    pub gst_rate: f64,
    pub net: f64,
    pub tax: f64,
    pub line_total: f64,
}

impl PurchaseLine {
    /// Computes the net/tax split.
    ///
    /// A negative GST rate is treated as zero so tax can never pull the
    /// total below the net amount.
    ///
    /// ## Example
    /// ```rust
    /// use tijori_core::line::PurchaseLine;
    ///
    /// let line = PurchaseLine::compute(10.0, 20.0, 50.0, 18.0);
    /// assert_eq!(line.net, 150.0);
    /// assert_eq!(line.tax, 27.0);
    /// assert_eq!(line.line_total, 177.0);
    /// ```
    pub fn compute(qty: f64, rate: f64, discount: f64, gst_rate: f64) -> Self {
        let gst_rate = gst_rate.max(0.0);
        let net = (qty * rate - discount).max(0.0);
        let tax = net * gst_rate / 100.0;
        let (net, tax) = if (net + tax).is_finite() { (net, tax) } else { (0.0, 0.0) };
        PurchaseLine {
            qty,
            rate,
            discount,
            gst_rate,
            net,
            tax,
            line_total: net + tax,
        }
    }

    /// Coerces raw text inputs, then computes.
    pub fn from_raw(
        qty: Option<&str>,
        rate: Option<&str>,
        discount: Option<&str>,
        gst_rate: Option<&str>,
    ) -> Self {
        Self::compute(
            coerce_f64(qty),
            coerce_f64(rate),
            coerce_f64(discount),
            coerce_f64(gst_rate),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sales_line_basic() {
        let line = SalesLine::compute(3.0, 100.0, 10.0);
        assert_eq!(line.qty, 3.0);
        assert_eq!(line.rate, 100.0);
        assert_eq!(line.discount, 10.0);
        assert_eq!(line.line_total, 270.0);

        assert_eq!(SalesLine::compute(1.0, 50.0, 0.0).line_total, 50.0);
    }

    #[test]
    fn test_sales_line_never_negative() {
        assert_eq!(SalesLine::compute(2.0, 10.0, 100.0).line_total, 0.0);
        assert_eq!(SalesLine::compute(2.0, 10.0, 250.0).line_total, 0.0);
        assert_eq!(SalesLine::compute(-2.0, 10.0, 0.0).line_total, 0.0);
    }

    #[test]
    fn test_sales_line_from_raw() {
        let line = SalesLine::from_raw(Some("2,5"), Some("40"), None);
        assert_eq!(line.qty, 2.5);
        assert_eq!(line.line_total, 100.0);

        let garbage = SalesLine::from_raw(Some("two"), Some("40"), Some("5"));
        assert_eq!(garbage.qty, 0.0);
        assert_eq!(garbage.line_total, 0.0);
    }

    #[test]
    fn test_purchase_line_split() {
        let line = PurchaseLine::compute(4.0, 25.0, 0.0, 5.0);
        assert_eq!(line.net, 100.0);
        assert_eq!(line.tax, 5.0);
        assert_eq!(line.line_total, line.net + line.tax);
    }

    #[test]
    fn test_purchase_discount_larger_than_gross() {
        let line = PurchaseLine::compute(1.0, 30.0, 45.0, 18.0);
        assert_eq!(line.net, 0.0);
        assert_eq!(line.tax, 0.0);
        assert_eq!(line.line_total, 0.0);
    }

    #[test]
    fn test_purchase_negative_gst_is_zero() {
        let line = PurchaseLine::compute(1.0, 100.0, 0.0, -18.0);
        assert_eq!(line.gst_rate, 0.0);
        assert_eq!(line.line_total, 100.0);
    }

    #[test]
    fn test_overflowing_lines_are_zero() {
        let line = PurchaseLine::from_raw(Some("1e200"), Some("1e200"), Some("0"), Some("0"));
        assert_eq!(line.net, 0.0);
        assert_eq!(line.tax, 0.0);
        assert_eq!(line.line_total, 0.0);

        let line = PurchaseLine::compute(1.0, 1e300, 0.0, 1e300);
        assert_eq!(line.line_total, 0.0);

        let line = SalesLine::from_raw(Some("1e200"), Some("1e200"), None);
        assert_eq!(line.line_total, 0.0);
        assert_eq!(SalesLine::compute(1e200, 1e200, 100.0).line_total, 0.0);
    }

    #[test]
    fn test_purchase_from_raw() {
        let line = PurchaseLine::from_raw(Some("3"), Some("10"), Some(""), Some("12,5"));
        assert_eq!(line.net, 30.0);
        assert_eq!(line.gst_rate, 12.5);
        assert_eq!(line.tax, 3.75);
        assert_eq!(line.line_total, 33.75);
    }
}
