//! # Document Numbering
//!
//! Every document carries a human-readable number scoped to the day it
//! was created:
//!
//! ```text
//!    SO 20240105 - 00007
//!    ── ──────── ─ ─────
//!    │     │         └── 5-digit sequence, restarts every day per kind
//!    │     └──────────── creation date (YYYYMMDD)
//!    └────────────────── kind prefix (SO, INV, PO, PI)
//! ```
//!
//! This module only formats and parses. The sequence value itself comes
//! from the counter table in tijori-db, which increments it atomically
//! inside the transaction that creates the document.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Side
// =============================================================================

/// Which side of the business a document belongs to.
///
/// The side decides the pricing rule (see [`crate::line`]) and whether the
/// counterparty is a customer or a supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Sales,
    Purchase,
}

impl Side {
    /// Name of the counterparty role on this side.
    pub const fn counterparty(&self) -> &'static str {
        match self {
            Side::Sales => "customer",
            Side::Purchase => "supplier",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Side::Sales => "sales",
            Side::Purchase => "purchase",
        }
    }
}

impl FromStr for Side {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sales" | "customer" | "customers" => Ok(Side::Sales),
            "purchase" | "supplier" | "suppliers" => Ok(Side::Purchase),
            _ => Err(ValidationError::NotAllowed {
                field: "side".to_string(),
                allowed: vec!["sales".to_string(), "purchase".to_string()],
            }),
        }
    }
}

// =============================================================================
// Document Kind
// =============================================================================

/// The four document types, each with its own number prefix and sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    SalesOrder,
    SalesInvoice,
    PurchaseOrder,
    PurchaseInvoice,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::SalesOrder,
        DocumentKind::SalesInvoice,
        DocumentKind::PurchaseOrder,
        DocumentKind::PurchaseInvoice,
    ];

    /// Number prefix for this kind.
    pub const fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::SalesOrder => "SO",
            DocumentKind::SalesInvoice => "INV",
            DocumentKind::PurchaseOrder => "PO",
            DocumentKind::PurchaseInvoice => "PI",
        }
    }

    pub const fn side(&self) -> Side {
        match self {
            DocumentKind::SalesOrder | DocumentKind::SalesInvoice => Side::Sales,
            DocumentKind::PurchaseOrder | DocumentKind::PurchaseInvoice => Side::Purchase,
        }
    }

    /// Invoices are what payments, ledgers and outstanding reports read.
    pub const fn is_invoice(&self) -> bool {
        matches!(
            self,
            DocumentKind::SalesInvoice | DocumentKind::PurchaseInvoice
        )
    }

    /// The invoice kind an order converts into, if this is an order.
    pub const fn invoice_kind(&self) -> Option<DocumentKind> {
        match self {
            DocumentKind::SalesOrder => Some(DocumentKind::SalesInvoice),
            DocumentKind::PurchaseOrder => Some(DocumentKind::PurchaseInvoice),
            _ => None,
        }
    }

    /// Storage key (matches the `kind` column).
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::SalesOrder => "sales_order",
            DocumentKind::SalesInvoice => "sales_invoice",
            DocumentKind::PurchaseOrder => "purchase_order",
            DocumentKind::PurchaseInvoice => "purchase_invoice",
        }
    }

    /// Human label used in messages.
    pub const fn label(&self) -> &'static str {
        match self {
            DocumentKind::SalesOrder => "Sales order",
            DocumentKind::SalesInvoice => "Sales invoice",
            DocumentKind::PurchaseOrder => "Purchase order",
            DocumentKind::PurchaseInvoice => "Purchase invoice",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentKind {
    type Err = ValidationError;

    /// Accepts the storage key, the prefix, or a short alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        match key.as_str() {
            "sales_order" | "so" => Ok(DocumentKind::SalesOrder),
            "sales_invoice" | "inv" | "si" => Ok(DocumentKind::SalesInvoice),
            "purchase_order" | "po" => Ok(DocumentKind::PurchaseOrder),
            "purchase_invoice" | "pi" => Ok(DocumentKind::PurchaseInvoice),
            _ => Err(ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: DocumentKind::ALL
                    .iter()
                    .map(|k| k.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Counter key for a day: `YYYYMMDD`.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Formats `PREFIX + YYYYMMDD + "-" + seq:05`.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use tijori_core::numbering::{format_number, DocumentKind};
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
/// assert_eq!(format_number(DocumentKind::SalesOrder, day, 1), "SO20240105-00001");
/// assert_eq!(format_number(DocumentKind::SalesInvoice, day, 42), "INV20240105-00042");
/// ```
pub fn format_number(kind: DocumentKind, date: NaiveDate, seq: u32) -> String {
    format!("{}{}-{:05}", kind.prefix(), day_key(date), seq)
}

/// A generated number split back into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedNumber {
    pub kind: DocumentKind,
    pub date: NaiveDate,
    pub seq: u32,
}

/// Parses a number produced by [`format_number`].
///
/// Returns `None` for manually entered numbers that do not follow the
/// generated pattern.
pub fn parse_number(number: &str) -> Option<ParsedNumber> {
    let kind = DocumentKind::ALL
        .into_iter()
        .find(|k| number.starts_with(k.prefix()))?;
    let rest = &number[kind.prefix().len()..];
    let (day, seq) = rest.split_once('-')?;
    if day.len() != 8 || seq.len() < 5 || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let date = NaiveDate::parse_from_str(day, "%Y%m%d").ok()?;
    let seq = seq.parse().ok()?;
    Some(ParsedNumber { kind, date, seq })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_prefixes_and_sides() {
        assert_eq!(DocumentKind::SalesOrder.prefix(), "SO");
        assert_eq!(DocumentKind::PurchaseInvoice.prefix(), "PI");
        assert_eq!(DocumentKind::SalesInvoice.side(), Side::Sales);
        assert_eq!(DocumentKind::PurchaseOrder.side(), Side::Purchase);
        assert_eq!(Side::Purchase.counterparty(), "supplier");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(
            format_number(DocumentKind::PurchaseOrder, day(), 7),
            "PO20240309-00007"
        );
        assert_eq!(
            format_number(DocumentKind::SalesOrder, day(), 123_456),
            "SO20240309-123456"
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let number = format_number(DocumentKind::SalesInvoice, day(), 12);
        let parsed = parse_number(&number).unwrap();
        assert_eq!(parsed.kind, DocumentKind::SalesInvoice);
        assert_eq!(parsed.date, day());
        assert_eq!(parsed.seq, 12);
    }

    #[test]
    fn test_parse_rejects_manual_numbers() {
        assert!(parse_number("BILL-991").is_none());
        assert!(parse_number("PO2024-1").is_none());
        assert!(parse_number("SO20241340-00001").is_none());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("so".parse::<DocumentKind>().unwrap(), DocumentKind::SalesOrder);
        assert_eq!(
            "purchase-invoice".parse::<DocumentKind>().unwrap(),
            DocumentKind::PurchaseInvoice
        );
        assert!("quote".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn test_order_converts_to_invoice() {
        assert_eq!(
            DocumentKind::SalesOrder.invoice_kind(),
            Some(DocumentKind::SalesInvoice)
        );
        assert_eq!(DocumentKind::SalesInvoice.invoice_kind(), None);
    }
}
