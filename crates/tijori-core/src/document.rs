//! # Document Lines and Totals
//!
//! Turns raw line columns into computed lines and header totals.
//!
//! ```text
//!  raw rows                     build_lines(side)             totals
//!  ────────────────────────     ──────────────────────────    ─────────────
//!  item=7  qty=3 rate=100 d=10  ─► line 1  net 270 tax 0  ─┐
//!  item=   qty=9 rate=9         ─► (skipped: blank item)   ├─► total    320
//!  item=9  qty=1 rate=50        ─► line 2  net  50 tax 0  ─┘   tax        0
//!                                                              grand    320
//! ```
//!
//! The header totals are always derived from the same `ComputedLine`s that
//! get persisted, so the two can never disagree.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::line::{PurchaseLine, SalesLine};
use crate::money::Money;
use crate::numbering::Side;
use crate::validation::ValidationResult;

/// One line as entered: every field is raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLine {
    pub item_ref: Option<String>,
    pub qty: Option<String>,
    pub rate: Option<String>,
    pub discount: Option<String>,
    pub gst_rate: Option<String>,
}

impl RawLine {
    fn has_item(&self) -> bool {
        self.item_ref
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

/// A line ready to persist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ComputedLine {
    /// 1-based position among the surviving lines.
    pub line_no: i64,
    pub item_id: i64,
    pub qty: f64,
    pub rate: f64,
    pub discount: f64,
    pub gst_rate: f64,
    pub net: f64,
    pub tax: f64,
    pub line_total: f64,
}

impl ComputedLine {
    fn sales(line_no: i64, item_id: i64, line: SalesLine) -> Self {
        ComputedLine {
            line_no,
            item_id,
            qty: line.qty,
            rate: line.rate,
            discount: line.discount,
            gst_rate: 0.0,
            net: line.line_total,
            tax: 0.0,
            line_total: line.line_total,
        }
    }

    fn purchase(line_no: i64, item_id: i64, line: PurchaseLine) -> Self {
        ComputedLine {
            line_no,
            item_id,
            qty: line.qty,
            rate: line.rate,
            discount: line.discount,
            gst_rate: line.gst_rate,
            net: line.net,
            tax: line.tax,
            line_total: line.line_total,
        }
    }
}

/// Header totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentTotals {
    /// Sum of line nets.
    pub total: f64,
    /// Sum of line taxes.
    pub tax_total: f64,
    /// Sum of line totals.
    pub grand_total: f64,
}

impl DocumentTotals {
    pub fn from_lines(lines: &[ComputedLine]) -> Self {
        lines.iter().fold(DocumentTotals::default(), |acc, line| DocumentTotals {
            total: acc.total + line.net,
            tax_total: acc.tax_total + line.tax,
            grand_total: acc.grand_total + line.line_total,
        })
    }

    pub fn grand_total_money(&self) -> Money {
        Money::from_amount(self.grand_total)
    }
}

/// Computes every line whose item reference is non-blank.
///
/// Blank item references are skipped silently. A reference that is not a
/// positive integer id is a validation error naming the 1-based input row.
pub fn build_lines(side: Side, raw: &[RawLine]) -> ValidationResult<Vec<ComputedLine>> {
    let mut lines = Vec::with_capacity(raw.len());

    for (row, input) in raw.iter().enumerate() {
        if !input.has_item() {
            continue;
        }

        let item_ref = input.item_ref.as_deref().unwrap_or_default().trim();
        let item_id = match item_ref.parse::<i64>() {
            Ok(id) if id > 0 => id,
            _ => {
                return Err(ValidationError::invalid(
                    "item_id",
                    format!("row {}: '{}' is not an item id", row + 1, item_ref),
                ))
            }
        };

        let line_no = lines.len() as i64 + 1;
        let computed = match side {
            Side::Sales => ComputedLine::sales(
                line_no,
                item_id,
                SalesLine::from_raw(
                    input.qty.as_deref(),
                    input.rate.as_deref(),
                    input.discount.as_deref(),
                ),
            ),
            Side::Purchase => ComputedLine::purchase(
                line_no,
                item_id,
                PurchaseLine::from_raw(
                    input.qty.as_deref(),
                    input.rate.as_deref(),
                    input.discount.as_deref(),
                    input.gst_rate.as_deref(),
                ),
            ),
        };
        lines.push(computed);
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(item: &str, qty: &str, rate: &str, discount: &str, gst: &str) -> RawLine {
        RawLine {
            item_ref: Some(item.to_string()),
            qty: Some(qty.to_string()),
            rate: Some(rate.to_string()),
            discount: Some(discount.to_string()),
            gst_rate: Some(gst.to_string()),
        }
    }

    #[test]
    fn test_sales_lines_and_totals() {
        let lines = build_lines(
            Side::Sales,
            &[raw("7", "3", "100", "10", ""), raw("9", "1", "50", "0", "")],
        )
        .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_total, 270.0);
        assert_eq!(lines[0].net, 270.0);
        assert_eq!(lines[0].tax, 0.0);
        assert_eq!(lines[1].line_no, 2);

        let totals = DocumentTotals::from_lines(&lines);
        assert_eq!(totals.total, 320.0);
        assert_eq!(totals.tax_total, 0.0);
        assert_eq!(totals.grand_total, 320.0);
    }

    #[test]
    fn test_sales_side_ignores_gst_column() {
        let lines = build_lines(Side::Sales, &[raw("1", "1", "100", "0", "18")]).unwrap();
        assert_eq!(lines[0].gst_rate, 0.0);
        assert_eq!(lines[0].line_total, 100.0);
    }

    #[test]
    fn test_purchase_lines_and_totals() {
        let lines = build_lines(
            Side::Purchase,
            &[raw("3", "10", "20", "50", "18"), raw("4", "2", "100", "0", "5")],
        )
        .unwrap();

        let totals = DocumentTotals::from_lines(&lines);
        assert_eq!(totals.total, 350.0);
        assert_eq!(totals.tax_total, 37.0);
        assert_eq!(totals.grand_total, 387.0);
    }

    #[test]
    fn test_blank_items_skipped() {
        let lines = build_lines(
            Side::Sales,
            &[
                raw("", "5", "5", "0", ""),
                RawLine::default(),
                raw("  ", "1", "1", "0", ""),
                raw("12", "1", "1", "0", ""),
            ],
        )
        .unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item_id, 12);
        assert_eq!(lines[0].line_no, 1);
    }

    #[test]
    fn test_non_numeric_item_rejected() {
        let err = build_lines(
            Side::Sales,
            &[raw("1", "1", "1", "0", ""), raw("shirt", "1", "1", "0", "")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("row 2"));

        assert!(build_lines(Side::Sales, &[raw("-4", "1", "1", "0", "")]).is_err());
    }

    #[test]
    fn test_empty_document_has_zero_totals() {
        let lines = build_lines(Side::Purchase, &[]).unwrap();
        assert_eq!(DocumentTotals::from_lines(&lines), DocumentTotals::default());
    }
}
