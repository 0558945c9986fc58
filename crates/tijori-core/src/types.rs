//! # Domain Types
//!
//! Entities and read models shared by the database layer and the CLI.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────────┐   ┌──────────────────┐   ┌─────────────────┐        │
//! │  │ Customer      │◄──│ DocumentHeader   │──►│ Supplier        │        │
//! │  │ Supplier      │   │  kind, number    │   │                 │        │
//! │  └───────────────┘   │  status, totals  │   └─────────────────┘        │
//! │                      └────────┬─────────┘                               │
//! │                               │ owns (ON DELETE CASCADE)                │
//! │                      ┌────────▼─────────┐   ┌─────────────────┐        │
//! │                      │ DocumentLine     │──►│ Item            │◄─┐     │
//! │                      │ qty, rate, total │   │ sku, stock_qty  │  │     │
//! │                      └──────────────────┘   └─────────────────┘  │     │
//! │                                                                   │     │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌──────────────┐  │     │
//! │  │ Payment          │──►│ invoice header   │   │ StockMove    │──┘     │
//! │  │ amount, mode     │   └──────────────────┘   │ IN / OUT     │        │
//! │  └──────────────────┘                          └──────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identities are SQLite integer row ids. Numbers, SKUs and names are the
//! human-facing keys.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::numbering::DocumentKind;

// =============================================================================
// Customers & Suppliers
// =============================================================================

/// A customer (sales-side counterparty).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or editing a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default, deny_unknown_fields)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

/// A supplier (purchase-side counterparty).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub gstin: Option<String>,
    pub gst_type: String,
    pub status: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or editing a supplier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default, deny_unknown_fields)]
#[ts(export)]
pub struct NewSupplier {
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub gstin: Option<String>,
    /// Defaults to "regular".
    pub gst_type: Option<String>,
    pub status: Option<String>,
}

/// Compact counterparty row returned by search.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PartySearchHit {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

// =============================================================================
// Items
// =============================================================================

/// An inventory item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    pub id: i64,
    /// Natural key for imports; optional for hand-entered items.
    pub sku: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub uom: String,
    pub cost_price: f64,
    pub selling_price: f64,
    pub stock_qty: f64,
    pub reorder_level: f64,
    pub hsn_code: Option<String>,
    pub gst_rate: f64,
    /// Default sales discount percent.
    pub discount: f64,
    pub supplier_id: Option<i64>,
    pub supplier_name: Option<String>,
    pub brand: Option<String>,
    pub status: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Whether stock has fallen to or below the reorder level.
    pub fn is_low_stock(&self) -> bool {
        self.stock_qty <= self.reorder_level
    }

    /// Selling price as Money.
    pub fn price(&self) -> Money {
        Money::from_amount(self.selling_price)
    }
}

/// Fields accepted when creating, editing or importing an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default, deny_unknown_fields)]
#[ts(export)]
pub struct NewItem {
    pub sku: Option<String>,
    pub name: String,
    pub description: Option<String>,
    /// Defaults to [`crate::DEFAULT_UOM`].
    pub uom: Option<String>,
    pub cost_price: f64,
    pub selling_price: f64,
    pub stock_qty: f64,
    pub reorder_level: f64,
    pub hsn_code: Option<String>,
    pub gst_rate: f64,
    pub discount: f64,
    pub supplier_id: Option<i64>,
    pub supplier_name: Option<String>,
    pub brand: Option<String>,
    pub status: Option<String>,
}

/// Item row returned by the line-entry search.
///
/// `rate` is the selling price for sales searches and the cost price for
/// purchase searches.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ItemSearchHit {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub rate: f64,
    pub discount: f64,
    pub gst_rate: f64,
    pub stock_qty: f64,
    pub uom: String,
}

// =============================================================================
// Stock Moves
// =============================================================================

/// Direction of a stock move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveDirection {
    In,
    Out,
}

impl MoveDirection {
    /// Signed change to stock for a move of `qty`.
    pub fn delta(&self, qty: f64) -> f64 {
        match self {
            MoveDirection::In => qty,
            MoveDirection::Out => -qty,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            MoveDirection::In => "IN",
            MoveDirection::Out => "OUT",
        }
    }
}

impl FromStr for MoveDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "IN" => Ok(MoveDirection::In),
            "OUT" => Ok(MoveDirection::Out),
            _ => Err(ValidationError::NotAllowed {
                field: "direction".to_string(),
                allowed: vec!["IN".to_string(), "OUT".to_string()],
            }),
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An append-only stock audit entry, joined with its item name.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMove {
    pub id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub direction: MoveDirection,
    pub qty: f64,
    pub reference: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A stock move to record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewStockMove {
    pub item_id: i64,
    pub direction: MoveDirection,
    pub qty: f64,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Documents
// =============================================================================

/// Lifecycle of a document.
///
/// ```text
///   Draft ──submit──► Submitted ──cancel──► Cancelled
///     │                                        ▲
///     └──────────────────cancel────────────────┘
/// ```
///
/// Only drafts are editable. Only submitted invoices take payments and
/// appear in ledgers and outstanding reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Submitted,
    Cancelled,
}

impl DocumentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::Submitted => "submitted",
            DocumentStatus::Cancelled => "cancelled",
        }
    }

    /// Whether moving from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        matches!(
            (self, next),
            (DocumentStatus::Draft, DocumentStatus::Submitted)
                | (DocumentStatus::Draft, DocumentStatus::Cancelled)
                | (DocumentStatus::Submitted, DocumentStatus::Cancelled)
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted document header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DocumentHeader {
    pub id: i64,
    pub kind: DocumentKind,
    pub number: String,
    pub customer_id: Option<i64>,
    pub supplier_id: Option<i64>,
    /// Order this invoice was raised from, if any.
    pub source_document_id: Option<i64>,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub expected_delivery_date: Option<NaiveDate>,
    /// Supplier's own bill number (purchase side).
    pub bill_no: Option<String>,
    pub notes: Option<String>,
    pub status: DocumentStatus,
    pub total: f64,
    pub tax_total: f64,
    pub grand_total: f64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl DocumentHeader {
    /// Customer id on the sales side, supplier id on the purchase side.
    pub fn counterparty_id(&self) -> Option<i64> {
        self.customer_id.or(self.supplier_id)
    }

    pub fn grand_total_money(&self) -> Money {
        Money::from_amount(self.grand_total)
    }
}

/// A persisted line, joined with the item it references.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DocumentLine {
    pub id: i64,
    pub document_id: i64,
    pub line_no: i64,
    pub item_id: i64,
    pub item_name: String,
    pub sku: Option<String>,
    pub uom: String,
    pub qty: f64,
    pub rate: f64,
    pub discount: f64,
    pub gst_rate: f64,
    pub net: f64,
    pub tax: f64,
    pub line_total: f64,
}

/// One row of a document list.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DocumentSummary {
    pub id: i64,
    pub kind: DocumentKind,
    pub number: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub counterparty_id: i64,
    pub counterparty_name: String,
    pub status: DocumentStatus,
    pub total: f64,
    pub tax_total: f64,
    pub grand_total: f64,
    /// Number of the order an invoice was raised from.
    pub source_number: Option<String>,
}

/// A header with its counterparty, lines and payment position; what a
/// print or PDF renderer consumes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Document {
    pub header: DocumentHeader,
    pub counterparty_name: String,
    pub lines: Vec<DocumentLine>,
    pub amount_in_words: String,
    pub paid: f64,
    pub balance: f64,
}

// =============================================================================
// Payments
// =============================================================================

/// A payment received against a sales invoice or made against a purchase
/// invoice.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: i64,
    pub document_id: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
    /// Cash, UPI, cheque, bank transfer; free text.
    pub mode: Option<String>,
    pub reference: Option<String>,
    pub amount: f64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A payment to record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPayment {
    pub document_id: i64,
    /// Defaults to today.
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    pub mode: Option<String>,
    pub reference: Option<String>,
    pub amount: f64,
    pub notes: Option<String>,
}

// =============================================================================
// Reports
// =============================================================================

/// One row of a customer or supplier ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LedgerEntry {
    /// "invoice" or "payment".
    pub entry_type: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub reference: Option<String>,
    pub debit: f64,
    pub credit: f64,
    /// Running balance (debits minus credits) up to and including this row.
    #[cfg_attr(feature = "sqlx", sqlx(default))]
    pub balance: f64,
}

/// Amount still owed by a customer, or owed to a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OutstandingBalance {
    pub party_id: i64,
    pub name: String,
    pub contact: Option<String>,
    pub total_invoiced: f64,
    pub total_paid: f64,
    pub balance: f64,
}

/// One row of the stock balance report.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockBalanceRow {
    pub sku: Option<String>,
    pub name: String,
    pub stock_qty: f64,
    pub uom: String,
    pub cost_price: f64,
    pub selling_price: f64,
    pub stock_value: f64,
}

/// An item at or below its reorder level.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LowStockItem {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub stock_qty: f64,
    pub reorder_level: f64,
}

/// Headline numbers for the back-office landing view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardSummary {
    pub customers: i64,
    pub suppliers: i64,
    pub items: i64,
    pub sales_invoices: i64,
    pub purchase_invoices: i64,
    pub stock_moves: i64,
    pub sales_total: f64,
    pub purchase_total: f64,
    /// Receivables still open on submitted sales invoices.
    pub outstanding_total: f64,
    pub stock_value: f64,
    pub low_stock: Vec<LowStockItem>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_direction_delta() {
        assert_eq!(MoveDirection::In.delta(5.0), 5.0);
        assert_eq!(MoveDirection::Out.delta(5.0), -5.0);
    }

    #[test]
    fn test_move_direction_parse() {
        assert_eq!("in".parse::<MoveDirection>().unwrap(), MoveDirection::In);
        assert_eq!(" OUT ".parse::<MoveDirection>().unwrap(), MoveDirection::Out);
        assert!("sideways".parse::<MoveDirection>().is_err());
    }

    #[test]
    fn test_move_direction_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&MoveDirection::Out).unwrap(), "\"OUT\"");
    }

    #[test]
    fn test_status_transitions() {
        use DocumentStatus::*;
        assert_eq!(DocumentStatus::default(), Draft);
        assert!(Draft.can_transition_to(Submitted));
        assert!(Draft.can_transition_to(Cancelled));
        assert!(Submitted.can_transition_to(Cancelled));
        assert!(!Submitted.can_transition_to(Draft));
        assert!(!Cancelled.can_transition_to(Submitted));
        assert!(!Draft.can_transition_to(Draft));
    }

    #[test]
    fn test_new_customer_rejects_unknown_fields() {
        let ok: NewCustomer =
            serde_json::from_str(r#"{"name":"Asha Traders","city":"Pune"}"#).unwrap();
        assert_eq!(ok.city.as_deref(), Some("Pune"));
        assert!(ok.status.is_none());

        let err = serde_json::from_str::<NewCustomer>(r#"{"name":"X","fax":"1"}"#);
        assert!(err.is_err());
    }
}
