//! # Document Form
//!
//! The typed shape of a document submission. Every recognised field is
//! listed here; anything else is rejected at deserialisation.
//!
//! ```json
//! {
//!   "counterparty_id": 4,
//!   "date": "2024-01-05",
//!   "notes": "deliver before noon",
//!   "item_id":  [7,     9,   ""],
//!   "qty":      ["3",   1,   ""],
//!   "rate":     [100,  "50", ""],
//!   "discount": [10]
//! }
//! ```
//!
//! Line columns are parallel arrays. Short columns are padded with blanks,
//! cells may be numbers or text, and blank cells coerce to zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use ts_rs::TS;

use crate::document::{build_lines, ComputedLine, DocumentTotals, RawLine};
use crate::error::ValidationError;
use crate::numbering::DocumentKind;
use crate::numeric::format_qty;
use crate::types::{DocumentHeader, DocumentLine};
use crate::validation::{clean_optional, ValidationResult};

/// Longest manual document number accepted.
pub const MAX_NUMBER_LEN: usize = 50;

/// A single form cell: text or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum FormValue {
    Number(f64),
    Text(String),
}

impl FormValue {
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FormValue::Number(n) => Cow::Owned(format_qty(*n)),
            FormValue::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        FormValue::Number(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        FormValue::Number(value as f64)
    }
}

/// A document submission: header fields plus parallel line columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default, deny_unknown_fields)]
#[ts(export)]
pub struct DocumentForm {
    /// Customer id (sales) or supplier id (purchase). Required.
    pub counterparty_id: Option<i64>,
    /// Defaults to today.
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub expected_delivery_date: Option<NaiveDate>,
    /// Manual number; generated when absent.
    pub number: Option<String>,
    pub bill_no: Option<String>,
    pub notes: Option<String>,
    /// Order an invoice is raised from.
    pub source_document_id: Option<i64>,
    pub item_id: Vec<Option<FormValue>>,
    pub qty: Vec<Option<FormValue>>,
    pub rate: Vec<Option<FormValue>>,
    pub discount: Vec<Option<FormValue>>,
    pub gst_rate: Vec<Option<FormValue>>,
}

/// A validated form with its lines computed, ready to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentDraft {
    pub kind: DocumentKind,
    pub counterparty_id: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Day the draft was built. Generated numbers take their day from this,
    /// not from `date`, so a back-dated document still numbers under today.
    #[ts(as = "String")]
    pub issued_on: NaiveDate,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub expected_delivery_date: Option<NaiveDate>,
    pub number: Option<String>,
    pub bill_no: Option<String>,
    pub notes: Option<String>,
    pub source_document_id: Option<i64>,
    pub lines: Vec<ComputedLine>,
    pub totals: DocumentTotals,
}

fn cell(column: &[Option<FormValue>], row: usize) -> Option<String> {
    column
        .get(row)
        .and_then(Option::as_ref)
        .map(|v| v.as_text().into_owned())
}

impl DocumentForm {
    /// Appends one line across all columns.
    pub fn push_line(
        &mut self,
        item_id: impl Into<FormValue>,
        qty: impl Into<FormValue>,
        rate: impl Into<FormValue>,
        discount: impl Into<FormValue>,
        gst_rate: impl Into<FormValue>,
    ) {
        let row = self.row_count();
        for column in [
            &mut self.item_id,
            &mut self.qty,
            &mut self.rate,
            &mut self.discount,
            &mut self.gst_rate,
        ] {
            column.resize(row, None);
        }
        self.item_id.push(Some(item_id.into()));
        self.qty.push(Some(qty.into()));
        self.rate.push(Some(rate.into()));
        self.discount.push(Some(discount.into()));
        self.gst_rate.push(Some(gst_rate.into()));
    }

    /// Number of input rows (length of the longest column).
    pub fn row_count(&self) -> usize {
        [
            self.item_id.len(),
            self.qty.len(),
            self.rate.len(),
            self.discount.len(),
            self.gst_rate.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Zips the columns into raw lines, padding short columns with blanks.
    pub fn raw_lines(&self) -> Vec<RawLine> {
        (0..self.row_count())
            .map(|row| RawLine {
                item_ref: cell(&self.item_id, row),
                qty: cell(&self.qty, row),
                rate: cell(&self.rate, row),
                discount: cell(&self.discount, row),
                gst_rate: cell(&self.gst_rate, row),
            })
            .collect()
    }

    /// Validates the form and computes its lines.
    ///
    /// ## Errors
    /// - counterparty missing
    /// - manual number longer than [`MAX_NUMBER_LEN`]
    /// - `source_document_id` on anything but an invoice
    /// - a non-numeric item reference
    pub fn into_draft(
        self,
        kind: DocumentKind,
        today: NaiveDate,
    ) -> ValidationResult<DocumentDraft> {
        let counterparty_id = self
            .counterparty_id
            .filter(|id| *id > 0)
            .ok_or_else(|| ValidationError::required(kind.side().counterparty()))?;

        let number = clean_optional(self.number.as_deref());
        if let Some(n) = &number {
            if n.chars().count() > MAX_NUMBER_LEN {
                return Err(ValidationError::TooLong {
                    field: "number".to_string(),
                    max: MAX_NUMBER_LEN,
                });
            }
        }

        if self.source_document_id.is_some() && !kind.is_invoice() {
            return Err(ValidationError::invalid(
                "source_document_id",
                "only invoices can be raised from an order",
            ));
        }

        let lines = build_lines(kind.side(), &self.raw_lines())?;
        let totals = DocumentTotals::from_lines(&lines);

        Ok(DocumentDraft {
            kind,
            counterparty_id,
            date: self.date.unwrap_or(today),
            issued_on: today,
            due_date: self.due_date,
            expected_delivery_date: self.expected_delivery_date,
            number,
            bill_no: clean_optional(self.bill_no.as_deref()),
            notes: clean_optional(self.notes.as_deref()),
            source_document_id: self.source_document_id,
            lines,
            totals,
        })
    }

    /// Prefills an invoice form from an order and its lines.
    ///
    /// The date is left empty so the invoice takes the day it is raised.
    pub fn from_order(order: &DocumentHeader, lines: &[DocumentLine]) -> Self {
        let mut form = DocumentForm {
            counterparty_id: order.counterparty_id(),
            source_document_id: Some(order.id),
            due_date: order.due_date,
            notes: order.notes.clone(),
            ..DocumentForm::default()
        };
        for line in lines {
            form.push_line(line.item_id, line.qty, line.rate, line.discount, line.gst_rate);
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn test_json_form_with_mixed_cells() {
        let form: DocumentForm = serde_json::from_str(
            r#"{
                "counterparty_id": 4,
                "item_id": [7, "9", ""],
                "qty": ["3", 1, null],
                "rate": [100, "50"],
                "discount": [10]
            }"#,
        )
        .unwrap();

        let draft = form.into_draft(DocumentKind::SalesOrder, today()).unwrap();
        assert_eq!(draft.counterparty_id, 4);
        assert_eq!(draft.date, today());
        assert_eq!(draft.issued_on, today());
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].item_id, 7);
        assert_eq!(draft.totals.grand_total, 320.0);
    }

    #[test]
    fn test_back_dated_form_keeps_issue_day() {
        let form = DocumentForm {
            counterparty_id: Some(1),
            date: NaiveDate::from_ymd_opt(2023, 12, 28),
            ..Default::default()
        };
        let draft = form.into_draft(DocumentKind::SalesOrder, today()).unwrap();
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2023, 12, 28).unwrap());
        assert_eq!(draft.issued_on, today());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = serde_json::from_str::<DocumentForm>(r#"{"counterparty_id":1,"customer":"x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_counterparty_required() {
        let err = DocumentForm::default()
            .into_draft(DocumentKind::PurchaseOrder, today())
            .unwrap_err();
        assert_eq!(err.to_string(), "supplier is required");
    }

    #[test]
    fn test_manual_number_trimmed_and_bounded() {
        let form = DocumentForm {
            counterparty_id: Some(1),
            number: Some("  PO-MANUAL-1 ".to_string()),
            ..Default::default()
        };
        let draft = form.into_draft(DocumentKind::PurchaseOrder, today()).unwrap();
        assert_eq!(draft.number.as_deref(), Some("PO-MANUAL-1"));

        let form = DocumentForm {
            counterparty_id: Some(1),
            number: Some("N".repeat(MAX_NUMBER_LEN + 1)),
            ..Default::default()
        };
        assert!(form.into_draft(DocumentKind::PurchaseOrder, today()).is_err());
    }

    #[test]
    fn test_source_only_on_invoices() {
        let form = DocumentForm {
            counterparty_id: Some(1),
            source_document_id: Some(3),
            ..Default::default()
        };
        assert!(form.clone().into_draft(DocumentKind::SalesOrder, today()).is_err());
        assert!(form.into_draft(DocumentKind::SalesInvoice, today()).is_ok());
    }

    #[test]
    fn test_push_line_pads_columns() {
        let mut form = DocumentForm {
            qty: vec![Some("2".into()), Some("4".into())],
            ..Default::default()
        };
        form.push_line(5_i64, 1.0, 10.0, 0.0, 18.0);

        assert_eq!(form.row_count(), 3);
        let raw = form.raw_lines();
        assert_eq!(raw[0].item_ref, None);
        assert_eq!(raw[2].item_ref.as_deref(), Some("5"));
        assert_eq!(raw[2].gst_rate.as_deref(), Some("18"));
    }

    #[test]
    fn test_purchase_draft_uses_gst() {
        let mut form = DocumentForm {
            counterparty_id: Some(2),
            ..Default::default()
        };
        form.push_line(3_i64, 10.0, 20.0, 50.0, 18.0);

        let draft = form.into_draft(DocumentKind::PurchaseInvoice, today()).unwrap();
        assert_eq!(draft.totals.total, 150.0);
        assert_eq!(draft.totals.tax_total, 27.0);
        assert_eq!(draft.totals.grand_total, 177.0);
    }
}
