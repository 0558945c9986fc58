//! # Payment Repository
//!
//! Payments received against sales invoices and made against purchase
//! invoices.
//!
//! ## Rules
//! - The document must be an invoice of the side the caller expects
//! - The invoice must be submitted (drafts can still change; cancelled
//!   invoices are void)
//! - The amount must be positive; paying more than the balance is allowed
//!   but logged

use chrono::{Local, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use tijori_core::validation::{clean_optional, validate_amount};
use tijori_core::{
    CoreError, DocumentHeader, DocumentStatus, NewPayment, Payment, Side, ValidationError,
};

const COLUMNS: &str = "id, document_id, date, mode, reference, amount, notes, created_at";

#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Records a payment against a submitted invoice on `side`.
    ///
    /// ## Errors
    /// - `Validation(MustBePositive)` for a zero, negative or non-finite amount
    /// - `NotFound` when the document does not exist
    /// - `Validation(InvalidFormat)` when it is an order, or an invoice of
    ///   the other side
    /// - `InvalidDocumentStatus` when the invoice is not submitted
    pub async fn record(&self, side: Side, input: &NewPayment) -> DbResult<Payment> {
        validate_amount(input.amount)?;

        let header = self.invoice(side, input.document_id).await?;
        if header.status != DocumentStatus::Submitted {
            return Err(CoreError::InvalidDocumentStatus {
                number: header.number,
                current_status: header.status.to_string(),
                operation: "record a payment".to_string(),
            }
            .into());
        }

        let paid = self.total_paid(header.id).await?;
        if paid + input.amount > header.grand_total + 0.005 {
            warn!(
                number = %header.number,
                grand_total = header.grand_total,
                paid,
                amount = input.amount,
                "Payment exceeds the invoice balance"
            );
        }

        let date = input.date.unwrap_or_else(|| Local::now().date_naive());
        debug!(number = %header.number, amount = input.amount, %date, "Recording payment");

        let sql = format!(
            "INSERT INTO payments (document_id, date, mode, reference, amount, notes, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        );
        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(header.id)
            .bind(date)
            .bind(clean_optional(input.mode.as_deref()))
            .bind(clean_optional(input.reference.as_deref()))
            .bind(input.amount)
            .bind(clean_optional(input.notes.as_deref()))
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        info!(
            id = payment.id,
            number = %header.number,
            amount = payment.amount,
            "Payment recorded"
        );
        Ok(payment)
    }

    async fn invoice(&self, side: Side, document_id: i64) -> DbResult<DocumentHeader> {
        let header = super::document::DocumentRepository::new(self.pool.clone())
            .get(document_id)
            .await?
            .ok_or_else(|| DbError::not_found("Document", document_id))?;

        if !header.kind.is_invoice() || header.kind.side() != side {
            return Err(ValidationError::invalid(
                "document_id",
                format!("{} is not a {} invoice", header.number, side.as_str()),
            )
            .into());
        }
        Ok(header)
    }

    /// Payments on one document, oldest first.
    pub async fn list_for_document(&self, document_id: i64) -> DbResult<Vec<Payment>> {
        let sql = format!("SELECT {COLUMNS} FROM payments WHERE document_id = ? ORDER BY date, id");
        let payments = sqlx::query_as::<_, Payment>(&sql)
            .bind(document_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(payments)
    }

    pub async fn total_paid(&self, document_id: i64) -> DbResult<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT CAST(COALESCE(SUM(amount), 0) AS REAL) FROM payments WHERE document_id = ?",
        )
        .bind(document_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::NaiveDate;
    use tijori_core::form::DocumentForm;
    use tijori_core::{DocumentKind, NewCustomer, NewItem};

    async fn invoice(db: &Database, kind: DocumentKind) -> DocumentHeader {
        let customer = db
            .customers()
            .create(&NewCustomer {
                name: "Kiran Stores".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let item = db
            .items()
            .create(&NewItem {
                name: "T-Shirt".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut form = DocumentForm {
            counterparty_id: Some(customer.id),
            ..Default::default()
        };
        form.push_line(item.id, 2.0, 250.0, 0.0, 0.0);
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let draft = form.into_draft(kind, day).unwrap();
        db.documents().create(&draft).await.unwrap()
    }

    fn payment(document_id: i64, amount: f64) -> NewPayment {
        NewPayment {
            document_id,
            date: NaiveDate::from_ymd_opt(2024, 3, 2),
            mode: Some("UPI".to_string()),
            reference: None,
            amount,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_payments_need_a_submitted_invoice() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let header = invoice(&db, DocumentKind::SalesInvoice).await;

        let err = db
            .payments()
            .record(Side::Sales, &payment(header.id, 100.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InvalidDocumentStatus { .. })
        ));

        db.documents()
            .set_status(header.id, DocumentStatus::Submitted)
            .await
            .unwrap();
        let recorded = db
            .payments()
            .record(Side::Sales, &payment(header.id, 100.0))
            .await
            .unwrap();
        assert_eq!(recorded.mode.as_deref(), Some("UPI"));

        db.payments()
            .record(Side::Sales, &payment(header.id, 150.0))
            .await
            .unwrap();
        assert_eq!(db.payments().total_paid(header.id).await.unwrap(), 250.0);
        assert_eq!(db.payments().list_for_document(header.id).await.unwrap().len(), 2);

        let doc = db.documents().get_document(header.id).await.unwrap().unwrap();
        assert_eq!(doc.paid, 250.0);
        assert_eq!(doc.balance, 250.0);
    }

    #[tokio::test]
    async fn test_orders_and_wrong_side_are_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let order = invoice(&db, DocumentKind::SalesOrder).await;
        db.documents()
            .set_status(order.id, DocumentStatus::Submitted)
            .await
            .unwrap();

        let err = db
            .payments()
            .record(Side::Sales, &payment(order.id, 10.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = db
            .payments()
            .record(Side::Purchase, &payment(order.id, 10.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_amount_must_be_positive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .payments()
            .record(Side::Sales, &payment(1, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let err = db
            .payments()
            .record(Side::Sales, &payment(99, 5.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
