//! # CSV Import / Export
//!
//! Spreadsheet round-trips for items and suppliers.
//!
//! ```text
//!  export ──► header row + one row per record ──► .csv
//!  import ◄── header row (any order, any case) ◄── .csv
//!                │
//!                ├── blank Name          → skipped (warn!)
//!                ├── rejected by rules   → reported with its line number
//!                └── otherwise           → upsert (items: SKU, suppliers: name)
//! ```
//!
//! Headers are matched after normalising to the form field names, so
//! `Cost Price`, `cost price` and `cost_price` are the same column.
//! Numeric cells go through the same lenient coercion as manual entry.

use csv::{ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use serde::Serialize;
use std::collections::HashMap;
use std::io::{Read, Write};
use tracing::{debug, info, warn};

use tijori_core::numeric::{coerce_non_negative, format_qty};
use tijori_core::{NewItem, NewSupplier};
use tijori_db::{Database, DbError, ItemFilter};

use crate::error::AppResult;

/// Item spreadsheet columns, in export order.
pub const ITEM_HEADERS: [&str; 13] = [
    "SKU",
    "Name",
    "Description",
    "UOM",
    "Brand",
    "HSN Code",
    "Cost Price",
    "Selling Price",
    "GST Rate",
    "Discount",
    "Stock Qty",
    "Reorder Level",
    "Status",
];

/// Supplier spreadsheet columns, in export order.
pub const SUPPLIER_HEADERS: [&str; 12] = [
    "Name",
    "Contact Person",
    "Email",
    "Phone",
    "Mobile",
    "Address",
    "City",
    "State",
    "Pincode",
    "GSTIN",
    "GST Type",
    "Status",
];

/// What an import did.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    /// Rows without a name.
    pub skipped: usize,
    pub rejected: Vec<RejectedRow>,
}

/// A row the business rules refused.
#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    /// 1-based file line, counting the header.
    pub line: usize,
    pub message: String,
}

impl ImportSummary {
    fn reject(&mut self, line: usize, err: DbError) {
        warn!(line, error = %err, "Import row rejected");
        self.rejected.push(RejectedRow {
            line,
            message: err.to_string(),
        });
    }
}

// =============================================================================
// Items
// =============================================================================

/// Writes items matching `filter` as CSV. Returns the row count.
pub async fn export_items<W: Write>(
    db: &Database,
    filter: &ItemFilter,
    writer: W,
) -> AppResult<usize> {
    let items = db.items().all(filter).await?;
    let mut wtr = csv_writer(writer);
    wtr.write_record(ITEM_HEADERS)?;

    for item in &items {
        wtr.write_record([
            item.sku.clone().unwrap_or_default(),
            item.name.clone(),
            item.description.clone().unwrap_or_default(),
            item.uom.clone(),
            item.brand.clone().unwrap_or_default(),
            item.hsn_code.clone().unwrap_or_default(),
            format!("{:.2}", item.cost_price),
            format!("{:.2}", item.selling_price),
            format_qty(item.gst_rate),
            format_qty(item.discount),
            format_qty(item.stock_qty),
            format_qty(item.reorder_level),
            item.status.clone(),
        ])?;
    }
    wtr.flush()?;

    info!(rows = items.len(), "Exported items");
    Ok(items.len())
}

/// Writes an empty item sheet (header row only).
pub fn item_template<W: Write>(writer: W) -> AppResult<()> {
    let mut wtr = csv_writer(writer);
    wtr.write_record(ITEM_HEADERS)?;
    wtr.flush()?;
    Ok(())
}

/// Reads an item sheet and upserts every row.
///
/// Rows with a SKU update the item holding that SKU or create it; rows
/// without one always create a new item.
pub async fn import_items<R: Read>(db: &Database, reader: R) -> AppResult<ImportSummary> {
    let mut rdr = csv_reader(reader);
    let columns = Columns::new(rdr.headers()?);
    let mut summary = ImportSummary::default();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let line = index + 2;
        let row = columns.row(&record);

        let Some(name) = row.text("name") else {
            warn!(line, "Skipping item row without a name");
            summary.skipped += 1;
            continue;
        };

        let input = NewItem {
            sku: row.text("sku").map(str::to_string),
            name: name.to_string(),
            description: row.text("description").map(str::to_string),
            uom: row.text("uom").map(str::to_string),
            cost_price: row.number("cost_price"),
            selling_price: row.number("selling_price"),
            stock_qty: row.number("stock_qty"),
            reorder_level: row.number("reorder_level"),
            hsn_code: row.text("hsn_code").map(str::to_string),
            gst_rate: row.number("gst_rate"),
            discount: row.number("discount"),
            brand: row.text("brand").map(str::to_string),
            status: row.text("status").map(str::to_lowercase),
            ..Default::default()
        };

        let existed = match input.sku.as_deref() {
            Some(sku) => db.items().get_by_sku(sku).await?.is_some(),
            None => false,
        };
        let result = if input.sku.is_some() {
            db.items().upsert_by_sku(&input).await
        } else {
            db.items().create(&input).await
        };

        match result {
            Ok(item) => {
                debug!(line, id = item.id, "Imported item");
                if existed {
                    summary.updated += 1;
                } else {
                    summary.created += 1;
                }
            }
            Err(err) if is_row_error(&err) => summary.reject(line, err),
            Err(err) => return Err(err.into()),
        }
    }

    info!(
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        rejected = summary.rejected.len(),
        "Imported items"
    );
    Ok(summary)
}

// =============================================================================
// Suppliers
// =============================================================================

pub async fn export_suppliers<W: Write>(db: &Database, writer: W) -> AppResult<usize> {
    let suppliers = db.suppliers().all().await?;
    let mut wtr = csv_writer(writer);
    wtr.write_record(SUPPLIER_HEADERS)?;

    for s in &suppliers {
        wtr.write_record([
            s.name.as_str(),
            s.contact_person.as_deref().unwrap_or_default(),
            s.email.as_deref().unwrap_or_default(),
            s.phone.as_deref().unwrap_or_default(),
            s.mobile.as_deref().unwrap_or_default(),
            s.address.as_deref().unwrap_or_default(),
            s.city.as_deref().unwrap_or_default(),
            s.state.as_deref().unwrap_or_default(),
            s.pincode.as_deref().unwrap_or_default(),
            s.gstin.as_deref().unwrap_or_default(),
            s.gst_type.as_str(),
            s.status.as_str(),
        ])?;
    }
    wtr.flush()?;

    info!(rows = suppliers.len(), "Exported suppliers");
    Ok(suppliers.len())
}

pub fn supplier_template<W: Write>(writer: W) -> AppResult<()> {
    let mut wtr = csv_writer(writer);
    wtr.write_record(SUPPLIER_HEADERS)?;
    wtr.flush()?;
    Ok(())
}

/// Reads a supplier sheet; rows update the supplier with the same name
/// (case-insensitive) or create one.
pub async fn import_suppliers<R: Read>(db: &Database, reader: R) -> AppResult<ImportSummary> {
    let mut rdr = csv_reader(reader);
    let columns = Columns::new(rdr.headers()?);
    let mut summary = ImportSummary::default();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let line = index + 2;
        let row = columns.row(&record);

        let Some(name) = row.text("name") else {
            warn!(line, "Skipping supplier row without a name");
            summary.skipped += 1;
            continue;
        };

        let input = NewSupplier {
            name: name.to_string(),
            contact_person: row.text("contact_person").map(str::to_string),
            email: row.text("email").map(str::to_string),
            phone: row.text("phone").map(str::to_string),
            mobile: row.text("mobile").map(str::to_string),
            address: row.text("address").map(str::to_string),
            city: row.text("city").map(str::to_string),
            state: row.text("state").map(str::to_string),
            pincode: row.text("pincode").map(str::to_string),
            gstin: row.text("gstin").map(str::to_string),
            gst_type: row.text("gst_type").map(str::to_string),
            status: row.text("status").map(str::to_lowercase),
        };

        let existing = db.suppliers().find_by_name(name).await?;
        let result = match &existing {
            Some(supplier) => db.suppliers().update(supplier.id, &input).await,
            None => db.suppliers().create(&input).await,
        };

        match result {
            Ok(_) if existing.is_some() => summary.updated += 1,
            Ok(_) => summary.created += 1,
            Err(err) if is_row_error(&err) => summary.reject(line, err),
            Err(err) => return Err(err.into()),
        }
    }

    info!(
        created = summary.created,
        updated = summary.updated,
        skipped = summary.skipped,
        rejected = summary.rejected.len(),
        "Imported suppliers"
    );
    Ok(summary)
}

// =============================================================================
// Helpers
// =============================================================================

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer)
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
}

/// Errors caused by the row's content rather than the database.
fn is_row_error(err: &DbError) -> bool {
    matches!(
        err,
        DbError::Validation(_)
            | DbError::Domain(_)
            | DbError::UniqueViolation { .. }
            | DbError::CheckViolation { .. }
            | DbError::ForeignKeyViolation { .. }
    )
}

/// `"HSN Code"` → `"hsn_code"`
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Header name to column index.
struct Columns(HashMap<String, usize>);

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        Columns(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (normalize_header(h), i))
                .collect(),
        )
    }

    fn row<'a>(&'a self, record: &'a StringRecord) -> Row<'a> {
        Row {
            columns: self,
            record,
        }
    }
}

struct Row<'a> {
    columns: &'a Columns,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// Trimmed, non-empty cell text.
    fn text(&self, key: &str) -> Option<&'a str> {
        let index = *self.columns.0.get(key)?;
        self.record
            .get(index)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn number(&self, key: &str) -> f64 {
        coerce_non_negative(self.text(key))
    }
}
