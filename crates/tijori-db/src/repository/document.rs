//! # Document Repository
//!
//! Orders and invoices on both sides of the business, stored in one header
//! table plus their lines.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DocumentForm ──into_draft()──► DocumentDraft (lines + totals computed) │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │  BEGIN                                                                  │
//! │    check counterparty (and source order, for invoices)                 │
//! │    INSERT documents (number NULL, totals)  ──► id                      │
//! │    number = manual  OR  format_number(kind, issued_on, next_value(...))│
//! │    UPDATE documents SET number = ?        (UNIQUE → Duplicate)         │
//! │    INSERT document_lines × n                                           │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Edits replace every line inside one transaction. Only drafts can be
//! edited; submitted and cancelled documents are frozen.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::listing::ListQuery;
use super::sequence;
use crate::error::{DbError, DbResult};
use tijori_core::document::ComputedLine;
use tijori_core::form::{DocumentDraft, DocumentForm};
use tijori_core::numbering::format_number;
use tijori_core::words::inr_words;
use tijori_core::{
    CoreError, Document, DocumentHeader, DocumentKind, DocumentLine, DocumentStatus,
    DocumentSummary, Page, PageRequest, Side, ValidationError,
};

const COLUMNS: &str = "id, kind, number, customer_id, supplier_id, source_document_id, date, \
                       due_date, expected_delivery_date, bill_no, notes, status, total, \
                       tax_total, grand_total, created_at, updated_at";

const LINE_COLUMNS: &str = "l.id, l.document_id, l.line_no, l.item_id, i.name AS item_name, \
                            i.sku, i.uom, l.qty, l.rate, l.discount, l.gst_rate, l.net, \
                            l.tax, l.line_total";

const SUMMARY_FROM: &str = "documents d \
                            LEFT JOIN customers c ON c.id = d.customer_id \
                            LEFT JOIN suppliers p ON p.id = d.supplier_id \
                            LEFT JOIN documents src ON src.id = d.source_document_id";

const SUMMARY_COLUMNS: &str = "d.id, d.kind, d.number, d.date, \
                               COALESCE(d.customer_id, d.supplier_id) AS counterparty_id, \
                               COALESCE(c.name, p.name) AS counterparty_name, \
                               d.status, d.total, d.tax_total, d.grand_total, \
                               src.number AS source_number";

/// List filters within one document kind.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    /// Free text over the number and the counterparty name.
    pub q: Option<String>,
    pub counterparty_id: Option<i64>,
    pub status: Option<DocumentStatus>,
}

/// Repository for orders and invoices.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

impl DocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DocumentRepository { pool }
    }

    /// Persists a new draft document with its lines.
    ///
    /// The number is the draft's manual number when present, otherwise the
    /// next value of the kind's day-scoped sequence for the day the draft was
    /// issued. A back-dated document keeps its `date` but numbers under today.
    ///
    /// ## Errors
    /// - `NotFound` when the counterparty or source order does not exist
    /// - `Validation(Duplicate)` when the number is already taken
    /// - `ForeignKeyViolation` when a line references a missing item
    pub async fn create(&self, draft: &DocumentDraft) -> DbResult<DocumentHeader> {
        debug!(
            kind = draft.kind.as_str(),
            counterparty_id = draft.counterparty_id,
            lines = draft.lines.len(),
            "Creating document"
        );

        let mut tx = self.pool.begin().await?;

        ensure_counterparty(&mut tx, draft.kind.side(), draft.counterparty_id).await?;
        if let Some(source_id) = draft.source_document_id {
            ensure_source(&mut tx, draft.kind, source_id).await?;
        }

        let (customer_id, supplier_id) = match draft.kind.side() {
            Side::Sales => (Some(draft.counterparty_id), None),
            Side::Purchase => (None, Some(draft.counterparty_id)),
        };

        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO documents (kind, number, customer_id, supplier_id, source_document_id, \
             date, due_date, expected_delivery_date, bill_no, notes, status, total, tax_total, \
             grand_total, created_at, updated_at) \
             VALUES (?1, NULL, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14) \
             RETURNING id",
        )
        .bind(draft.kind)
        .bind(customer_id)
        .bind(supplier_id)
        .bind(draft.source_document_id)
        .bind(draft.date)
        .bind(draft.due_date)
        .bind(draft.expected_delivery_date)
        .bind(&draft.bill_no)
        .bind(&draft.notes)
        .bind(DocumentStatus::Draft)
        .bind(draft.totals.total)
        .bind(draft.totals.tax_total)
        .bind(draft.totals.grand_total)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let number = match &draft.number {
            Some(manual) => manual.clone(),
            None => {
                let seq = sequence::next_value(&mut tx, draft.kind, draft.issued_on).await?;
                format_number(draft.kind, draft.issued_on, seq)
            }
        };
        let header = assign_number(&mut tx, id, &number).await?;

        insert_lines(&mut tx, id, &draft.lines).await?;

        tx.commit().await?;

        info!(
            id,
            number = %header.number,
            grand_total = header.grand_total,
            "Document created"
        );
        Ok(header)
    }

    /// Replaces a draft's header fields and every line in one transaction.
    ///
    /// The number is kept unless the draft carries a different manual one.
    pub async fn replace(&self, id: i64, draft: &DocumentDraft) -> DbResult<DocumentHeader> {
        debug!(id, lines = draft.lines.len(), "Replacing document");

        let mut tx = self.pool.begin().await?;

        let current = fetch_header(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Document", id))?;

        if current.status != DocumentStatus::Draft {
            return Err(CoreError::InvalidDocumentStatus {
                number: current.number,
                current_status: current.status.to_string(),
                operation: "edit".to_string(),
            }
            .into());
        }
        if current.kind != draft.kind {
            return Err(ValidationError::invalid(
                "kind",
                format!("{} cannot be saved as {}", current.number, draft.kind),
            )
            .into());
        }

        ensure_counterparty(&mut tx, draft.kind.side(), draft.counterparty_id).await?;
        if let Some(source_id) = draft.source_document_id {
            ensure_source(&mut tx, draft.kind, source_id).await?;
        }

        let (customer_id, supplier_id) = match draft.kind.side() {
            Side::Sales => (Some(draft.counterparty_id), None),
            Side::Purchase => (None, Some(draft.counterparty_id)),
        };

        sqlx::query(
            "UPDATE documents SET customer_id = ?, supplier_id = ?, source_document_id = ?, \
             date = ?, due_date = ?, expected_delivery_date = ?, bill_no = ?, notes = ?, \
             total = ?, tax_total = ?, grand_total = ?, updated_at = ? WHERE id = ?",
        )
        .bind(customer_id)
        .bind(supplier_id)
        .bind(draft.source_document_id)
        .bind(draft.date)
        .bind(draft.due_date)
        .bind(draft.expected_delivery_date)
        .bind(&draft.bill_no)
        .bind(&draft.notes)
        .bind(draft.totals.total)
        .bind(draft.totals.tax_total)
        .bind(draft.totals.grand_total)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let number = draft.number.as_deref().unwrap_or(&current.number);
        let header = assign_number(&mut tx, id, number).await?;

        sqlx::query("DELETE FROM document_lines WHERE document_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_lines(&mut tx, id, &draft.lines).await?;

        tx.commit().await?;

        info!(id, number = %header.number, "Document replaced");
        Ok(header)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<DocumentHeader>> {
        let mut conn = self.pool.acquire().await?;
        fetch_header(&mut conn, id).await
    }

    /// Looks a document up by its number.
    pub async fn get_by_number(&self, number: &str) -> DbResult<Option<DocumentHeader>> {
        let sql = format!("SELECT {COLUMNS} FROM documents WHERE number = ?");
        let header = sqlx::query_as::<_, DocumentHeader>(&sql)
            .bind(number.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(header)
    }

    /// Lines in entry order, joined with their items.
    pub async fn get_lines(&self, document_id: i64) -> DbResult<Vec<DocumentLine>> {
        let sql = format!(
            "SELECT {LINE_COLUMNS} FROM document_lines l JOIN items i ON i.id = l.item_id \
             WHERE l.document_id = ? ORDER BY l.line_no"
        );
        let lines = sqlx::query_as::<_, DocumentLine>(&sql)
            .bind(document_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(lines)
    }

    /// The full aggregate: header, counterparty, lines, amount in words and
    /// the payment position.
    pub async fn get_document(&self, id: i64) -> DbResult<Option<Document>> {
        let Some(header) = self.get(id).await? else {
            return Ok(None);
        };

        let counterparty_name: String = sqlx::query_scalar(
            "SELECT COALESCE( \
                 (SELECT name FROM customers WHERE id = ?1), \
                 (SELECT name FROM suppliers WHERE id = ?2), '')",
        )
        .bind(header.customer_id)
        .bind(header.supplier_id)
        .fetch_one(&self.pool)
        .await?;

        let lines = self.get_lines(id).await?;

        let paid: f64 = sqlx::query_scalar(
            "SELECT CAST(COALESCE(SUM(amount), 0) AS REAL) FROM payments WHERE document_id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let amount_in_words = inr_words(header.grand_total);
        let balance = header.grand_total - paid;

        Ok(Some(Document {
            header,
            counterparty_name,
            lines,
            amount_in_words,
            paid,
            balance,
        }))
    }

    /// Deletes a draft or cancelled document with its lines and payments.
    ///
    /// Submitted documents must be cancelled first.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting document");

        let header = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Document", id))?;

        if header.status == DocumentStatus::Submitted {
            return Err(CoreError::InvalidDocumentStatus {
                number: header.number,
                current_status: header.status.to_string(),
                operation: "delete".to_string(),
            }
            .into());
        }

        sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn list_query(kind: DocumentKind, filter: &DocumentFilter) -> ListQuery {
        ListQuery::new(SUMMARY_FROM, SUMMARY_COLUMNS, "d.date DESC, d.id DESC")
            .search(&["d.number", "c.name", "p.name"], filter.q.as_deref())
            .filter("d.kind", Some(kind.as_str()))
            .filter("COALESCE(d.customer_id, d.supplier_id)", filter.counterparty_id)
            .filter("d.status", filter.status.map(|s| s.as_str()))
    }

    /// One page of a kind's documents, newest first.
    pub async fn list(
        &self,
        kind: DocumentKind,
        filter: &DocumentFilter,
        page: PageRequest,
    ) -> DbResult<Page<DocumentSummary>> {
        Self::list_query(kind, filter).fetch_page(&self.pool, page).await
    }

    /// Every matching document of a kind, newest first.
    pub async fn all(
        &self,
        kind: DocumentKind,
        filter: &DocumentFilter,
    ) -> DbResult<Vec<DocumentSummary>> {
        Self::list_query(kind, filter).fetch_all(&self.pool).await
    }

    /// Moves a document along its lifecycle.
    ///
    /// ## Errors
    /// `InvalidDocumentStatus` for any transition other than
    /// draft → submitted, draft → cancelled or submitted → cancelled.
    pub async fn set_status(&self, id: i64, next: DocumentStatus) -> DbResult<DocumentHeader> {
        let current = self
            .get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Document", id))?;

        if !current.status.can_transition_to(next) {
            let operation = match next {
                DocumentStatus::Draft => "reopen",
                DocumentStatus::Submitted => "submit",
                DocumentStatus::Cancelled => "cancel",
            };
            return Err(CoreError::InvalidDocumentStatus {
                number: current.number,
                current_status: current.status.to_string(),
                operation: operation.to_string(),
            }
            .into());
        }

        let sql = format!(
            "UPDATE documents SET status = ?, updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
        );
        let header = sqlx::query_as::<_, DocumentHeader>(&sql)
            .bind(next)
            .bind(Utc::now())
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        info!(id, number = %header.number, status = %header.status, "Document status changed");
        Ok(header)
    }

    /// Prefills an invoice form from an order, returning the invoice kind
    /// to save it as.
    pub async fn invoice_form_from_order(
        &self,
        order_id: i64,
    ) -> DbResult<(DocumentKind, DocumentForm)> {
        let order = self
            .get(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Document", order_id))?;

        let Some(invoice_kind) = order.kind.invoice_kind() else {
            return Err(ValidationError::invalid(
                "source_document_id",
                format!("{} is not an order", order.number),
            )
            .into());
        };
        if order.status == DocumentStatus::Cancelled {
            return Err(CoreError::InvalidDocumentStatus {
                number: order.number,
                current_status: order.status.to_string(),
                operation: "invoice".to_string(),
            }
            .into());
        }

        let lines = self.get_lines(order_id).await?;
        Ok((invoice_kind, DocumentForm::from_order(&order, &lines)))
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn fetch_header(conn: &mut SqliteConnection, id: i64) -> DbResult<Option<DocumentHeader>> {
    let sql = format!("SELECT {COLUMNS} FROM documents WHERE id = ?");
    let header = sqlx::query_as::<_, DocumentHeader>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(header)
}

async fn ensure_counterparty(conn: &mut SqliteConnection, side: Side, id: i64) -> DbResult<()> {
    let (sql, entity) = match side {
        Side::Sales => ("SELECT COUNT(*) FROM customers WHERE id = ?", "Customer"),
        Side::Purchase => ("SELECT COUNT(*) FROM suppliers WHERE id = ?", "Supplier"),
    };
    let found: i64 = sqlx::query_scalar(sql).bind(id).fetch_one(&mut *conn).await?;
    if found == 0 {
        return Err(DbError::not_found(entity, id));
    }
    Ok(())
}

/// An invoice may only point at an order of its own side.
async fn ensure_source(
    conn: &mut SqliteConnection,
    kind: DocumentKind,
    source_id: i64,
) -> DbResult<()> {
    let source = fetch_header(conn, source_id)
        .await?
        .ok_or_else(|| DbError::not_found("Document", source_id))?;

    if source.kind.invoice_kind() != Some(kind) {
        return Err(ValidationError::invalid(
            "source_document_id",
            format!("{} cannot be invoiced as {}", source.number, kind),
        )
        .into());
    }
    Ok(())
}

async fn assign_number(
    conn: &mut SqliteConnection,
    id: i64,
    number: &str,
) -> DbResult<DocumentHeader> {
    let sql = format!("UPDATE documents SET number = ? WHERE id = ? RETURNING {COLUMNS}");
    sqlx::query_as::<_, DocumentHeader>(&sql)
        .bind(number)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => ValidationError::Duplicate {
                field: "number".to_string(),
                value: number.to_string(),
            }
            .into(),
            other => other,
        })
}

async fn insert_lines(
    conn: &mut SqliteConnection,
    document_id: i64,
    lines: &[ComputedLine],
) -> DbResult<()> {
    for line in lines {
        sqlx::query(
            "INSERT INTO document_lines (document_id, line_no, item_id, qty, rate, discount, \
             gst_rate, net, tax, line_total) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(document_id)
        .bind(line.line_no)
        .bind(line.item_id)
        .bind(line.qty)
        .bind(line.rate)
        .bind(line.discount)
        .bind(line.gst_rate)
        .bind(line.net)
        .bind(line.tax)
        .bind(line.line_total)
        .execute(&mut *conn)
        .await?;
    }
    debug!(document_id, count = lines.len(), "Inserted document lines");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::NaiveDate;
    use tijori_core::numbering::day_key;
    use tijori_core::{NewCustomer, NewItem, NewSupplier};

    struct Fixture {
        db: Database,
        customer: i64,
        supplier: i64,
        shirt: i64,
        cap: i64,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db
            .customers()
            .create(&NewCustomer {
                name: "Kiran Stores".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id;
        let supplier = db
            .suppliers()
            .create(&NewSupplier {
                name: "Mehta Mills".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id;
        let mut ids = Vec::new();
        for (sku, name) in [("TSH-1", "T-Shirt"), ("CAP-1", "Cap")] {
            let item = db
                .items()
                .create(&NewItem {
                    sku: Some(sku.to_string()),
                    name: name.to_string(),
                    ..Default::default()
                })
                .await
                .unwrap();
            ids.push(item.id);
        }
        Fixture {
            db,
            customer,
            supplier,
            shirt: ids[0],
            cap: ids[1],
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    fn sales_order(f: &Fixture) -> DocumentDraft {
        let mut form = DocumentForm {
            counterparty_id: Some(f.customer),
            date: Some(day()),
            ..Default::default()
        };
        form.push_line(f.shirt, 3.0, 100.0, 10.0, 0.0);
        form.push_line(f.cap, 1.0, 50.0, "", 0.0);
        form.into_draft(DocumentKind::SalesOrder, day()).unwrap()
    }

    #[tokio::test]
    async fn test_sales_order_end_to_end() {
        let f = fixture().await;
        let repo = f.db.documents();

        let first = repo.create(&sales_order(&f)).await.unwrap();
        assert_eq!(first.grand_total, 320.0);
        assert_eq!(first.total, 320.0);
        assert_eq!(first.tax_total, 0.0);
        assert_eq!(first.status, DocumentStatus::Draft);
        assert_eq!(first.number, format!("SO{}-00001", day_key(day())));

        let second = repo.create(&sales_order(&f)).await.unwrap();
        assert_eq!(second.number, "SO20240105-00002");

        let doc = repo.get_document(first.id).await.unwrap().unwrap();
        assert_eq!(doc.counterparty_name, "Kiran Stores");
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.lines[0].item_name, "T-Shirt");
        assert_eq!(doc.lines[0].line_total, 270.0);
        assert_eq!(doc.lines[1].line_total, 50.0);
        assert_eq!(doc.amount_in_words, "three hundred twenty rupees only");
        assert_eq!(doc.balance, 320.0);
    }

    #[tokio::test]
    async fn test_purchase_invoice_totals_include_tax() {
        let f = fixture().await;
        let mut form = DocumentForm {
            counterparty_id: Some(f.supplier),
            bill_no: Some("MM/778".to_string()),
            ..Default::default()
        };
        form.push_line(f.shirt, 10.0, 20.0, 50.0, 18.0);
        let draft = form.into_draft(DocumentKind::PurchaseInvoice, day()).unwrap();

        let header = f.db.documents().create(&draft).await.unwrap();
        assert_eq!(header.number, "PI20240105-00001");
        assert_eq!(header.supplier_id, Some(f.supplier));
        assert_eq!(header.customer_id, None);
        assert_eq!(header.total, 150.0);
        assert_eq!(header.tax_total, 27.0);
        assert_eq!(header.grand_total, 177.0);
    }

    #[tokio::test]
    async fn test_manual_number_collision_is_a_duplicate() {
        let f = fixture().await;
        let mut draft = sales_order(&f);
        draft.number = Some("SO-MANUAL-1".to_string());

        let header = f.db.documents().create(&draft).await.unwrap();
        assert_eq!(header.number, "SO-MANUAL-1");

        let err = f.db.documents().create(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::Duplicate { .. })
        ));
        // The failed create left nothing behind.
        let page = f
            .db
            .documents()
            .list(DocumentKind::SalesOrder, &DocumentFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_unknown_counterparty_is_not_found() {
        let f = fixture().await;
        let mut draft = sales_order(&f);
        draft.counterparty_id = 999;
        assert!(matches!(
            f.db.documents().create(&draft).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_replace_rewrites_lines_and_totals() {
        let f = fixture().await;
        let repo = f.db.documents();
        let header = repo.create(&sales_order(&f)).await.unwrap();

        let mut form = DocumentForm {
            counterparty_id: Some(f.customer),
            date: Some(day()),
            ..Default::default()
        };
        form.push_line(f.cap, 4.0, 25.0, 0.0, 0.0);
        let draft = form.into_draft(DocumentKind::SalesOrder, day()).unwrap();

        let replaced = repo.replace(header.id, &draft).await.unwrap();
        assert_eq!(replaced.number, header.number);
        assert_eq!(replaced.grand_total, 100.0);

        let lines = repo.get_lines(header.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item_id, f.cap);
        assert_eq!(lines[0].line_no, 1);
    }

    #[tokio::test]
    async fn test_submitted_documents_are_frozen() {
        let f = fixture().await;
        let repo = f.db.documents();
        let header = repo.create(&sales_order(&f)).await.unwrap();

        let submitted = repo.set_status(header.id, DocumentStatus::Submitted).await.unwrap();
        assert_eq!(submitted.status, DocumentStatus::Submitted);

        let err = repo.replace(header.id, &sales_order(&f)).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidDocumentStatus { .. })
        ));
        assert!(repo.delete(header.id).await.is_err());
        assert!(repo.set_status(header.id, DocumentStatus::Submitted).await.is_err());

        repo.set_status(header.id, DocumentStatus::Cancelled).await.unwrap();
        repo.delete(header.id).await.unwrap();
        assert!(repo.get(header.id).await.unwrap().is_none());
        assert!(repo.get_lines(header.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_back_dated_document_numbers_under_issue_day() {
        let f = fixture().await;
        let repo = f.db.documents();
        let issued = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let back_dated = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let mut form = DocumentForm {
            counterparty_id: Some(f.customer),
            date: Some(back_dated),
            ..Default::default()
        };
        form.push_line(f.shirt, 1.0, 100.0, 0.0, 0.0);
        let header = repo
            .create(&form.into_draft(DocumentKind::SalesOrder, issued).unwrap())
            .await
            .unwrap();

        assert_eq!(header.number, "SO20240310-00001");
        assert_eq!(header.date, back_dated);

        // The old day's sequence is untouched
        let mut conn = f.db.pool().acquire().await.unwrap();
        let next = sequence::next_value(&mut conn, DocumentKind::SalesOrder, back_dated)
            .await
            .unwrap();
        assert_eq!(next, 1);
    }

    #[tokio::test]
    async fn test_invoice_from_order() {
        let f = fixture().await;
        let repo = f.db.documents();
        let order = repo.create(&sales_order(&f)).await.unwrap();

        let (kind, form) = repo.invoice_form_from_order(order.id).await.unwrap();
        assert_eq!(kind, DocumentKind::SalesInvoice);

        let invoice_day = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        let draft = form.into_draft(kind, invoice_day).unwrap();
        let invoice = repo.create(&draft).await.unwrap();
        assert_eq!(invoice.number, "INV20240109-00001");
        assert_eq!(invoice.grand_total, order.grand_total);
        assert_eq!(invoice.source_document_id, Some(order.id));

        let listed = repo
            .list(DocumentKind::SalesInvoice, &DocumentFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(listed.items[0].source_number.as_deref(), Some(order.number.as_str()));
        assert_eq!(listed.items[0].counterparty_name, "Kiran Stores");

        // An invoice is not an order.
        assert!(matches!(
            repo.invoice_form_from_order(invoice.id).await,
            Err(DbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let f = fixture().await;
        let repo = f.db.documents();
        let older = repo.create(&sales_order(&f)).await.unwrap();

        let mut later = sales_order(&f);
        later.date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let newer = repo.create(&later).await.unwrap();

        let page = repo
            .list(DocumentKind::SalesOrder, &DocumentFilter::default(), PageRequest::default())
            .await
            .unwrap();
        let ids: Vec<_> = page.items.iter().map(|d| d.id).collect();
        assert_eq!(ids, [newer.id, older.id]);

        let filter = DocumentFilter {
            q: Some("kiran".to_string()),
            status: Some(DocumentStatus::Draft),
            ..Default::default()
        };
        let page = repo
            .list(DocumentKind::SalesOrder, &filter, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);

        let none = repo
            .list(DocumentKind::PurchaseOrder, &DocumentFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(none.total, 0);
    }
}
