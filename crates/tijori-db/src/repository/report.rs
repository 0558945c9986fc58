//! # Report Repository
//!
//! Read-only views over submitted invoices, payments and stock.
//!
//! Only **submitted** invoices count: drafts are still being written and
//! cancelled invoices are void. Orders never appear in money reports.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use super::item::ItemRepository;
use crate::error::{DbError, DbResult};
use tijori_core::{
    DashboardSummary, DocumentKind, LedgerEntry, OutstandingBalance, Side, StockBalanceRow,
};

/// Items shown in the dashboard's low-stock list.
const DASHBOARD_LOW_STOCK: u32 = 10;

/// Table and column names that differ between the two sides.
struct Party {
    table: &'static str,
    key: &'static str,
    contact: &'static str,
    invoice: DocumentKind,
    entity: &'static str,
}

impl Party {
    const fn of(side: Side) -> Self {
        match side {
            Side::Sales => Party {
                table: "customers",
                key: "customer_id",
                contact: "mobile",
                invoice: DocumentKind::SalesInvoice,
                entity: "Customer",
            },
            Side::Purchase => Party {
                table: "suppliers",
                key: "supplier_id",
                contact: "phone",
                invoice: DocumentKind::PurchaseInvoice,
                entity: "Supplier",
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Parties with an open balance on submitted invoices, by name.
    ///
    /// Sales side: what customers still owe. Purchase side: what is still
    /// owed to suppliers.
    pub async fn outstanding(&self, side: Side) -> DbResult<Vec<OutstandingBalance>> {
        let party = Party::of(side);
        let sql = format!(
            "SELECT x.id AS party_id, x.name, x.{contact} AS contact, \
                    CAST(SUM(d.grand_total) AS REAL) AS total_invoiced, \
                    CAST(COALESCE(SUM(pp.paid), 0) AS REAL) AS total_paid, \
                    CAST(SUM(d.grand_total) - COALESCE(SUM(pp.paid), 0) AS REAL) AS balance \
             FROM {table} x \
             JOIN documents d ON d.{key} = x.id AND d.kind = ?1 AND d.status = 'submitted' \
             LEFT JOIN (SELECT document_id, SUM(amount) AS paid FROM payments \
                        GROUP BY document_id) pp ON pp.document_id = d.id \
             GROUP BY x.id, x.name, x.{contact} \
             HAVING balance > 0.005 \
             ORDER BY x.name, x.id",
            contact = party.contact,
            table = party.table,
            key = party.key,
        );

        let rows = sqlx::query_as::<_, OutstandingBalance>(&sql)
            .bind(party.invoice)
            .fetch_all(&self.pool)
            .await?;

        debug!(side = side.as_str(), parties = rows.len(), "Outstanding report");
        Ok(rows)
    }

    /// A party's invoices (debit) and payments (credit) in date order, with
    /// a running balance, optionally limited to `from..=to`.
    ///
    /// The running balance starts at zero at the first row shown.
    pub async fn ledger(
        &self,
        side: Side,
        party_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DbResult<Vec<LedgerEntry>> {
        let party = Party::of(side);

        let exists: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE id = ?",
            party.table
        ))
        .bind(party_id)
        .fetch_one(&self.pool)
        .await?;
        if exists == 0 {
            return Err(DbError::not_found(party.entity, party_id));
        }

        let sql = format!(
            "SELECT entry_type, date, reference, debit, credit FROM ( \
                 SELECT 'invoice' AS entry_type, d.date AS date, d.number AS reference, \
                        CAST(d.grand_total AS REAL) AS debit, CAST(0 AS REAL) AS credit, \
                        0 AS seq, d.id AS row_id \
                 FROM documents d \
                 WHERE d.{key} = ?1 AND d.kind = ?2 AND d.status = 'submitted' \
                 UNION ALL \
                 SELECT 'payment', p.date, COALESCE(p.reference, d.number), \
                        CAST(0 AS REAL), CAST(p.amount AS REAL), 1, p.id \
                 FROM payments p JOIN documents d ON d.id = p.document_id \
                 WHERE d.{key} = ?1 AND d.kind = ?2 AND d.status = 'submitted' \
             ) \
             WHERE (?3 IS NULL OR date >= ?3) AND (?4 IS NULL OR date <= ?4) \
             ORDER BY date, seq, row_id",
            key = party.key,
        );

        let mut entries = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(party_id)
            .bind(party.invoice)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        let mut balance = 0.0;
        for entry in &mut entries {
            balance += entry.debit - entry.credit;
            entry.balance = balance;
        }

        debug!(side = side.as_str(), party_id, rows = entries.len(), "Ledger report");
        Ok(entries)
    }

    /// Every item with its stock valued at cost, by name.
    pub async fn stock_balance(&self) -> DbResult<Vec<StockBalanceRow>> {
        let rows = sqlx::query_as::<_, StockBalanceRow>(
            "SELECT sku, name, stock_qty, uom, cost_price, selling_price, \
                    CAST(cost_price * stock_qty AS REAL) AS stock_value \
             FROM items ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Headline counts and totals.
    pub async fn dashboard(&self) -> DbResult<DashboardSummary> {
        let count = |table: &'static str| {
            let pool = self.pool.clone();
            async move {
                let n: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
                    .fetch_one(&pool)
                    .await?;
                Ok::<_, DbError>(n)
            }
        };

        let invoices = |kind: DocumentKind| {
            let pool = self.pool.clone();
            async move {
                let row: (i64, f64) = sqlx::query_as(
                    "SELECT COUNT(*), CAST(COALESCE(SUM(grand_total), 0) AS REAL) \
                     FROM documents WHERE kind = ? AND status = 'submitted'",
                )
                .bind(kind)
                .fetch_one(&pool)
                .await?;
                Ok::<_, DbError>(row)
            }
        };

        let (sales_invoices, sales_total) = invoices(DocumentKind::SalesInvoice).await?;
        let (purchase_invoices, purchase_total) = invoices(DocumentKind::PurchaseInvoice).await?;

        let outstanding_total = self
            .outstanding(Side::Sales)
            .await?
            .iter()
            .map(|row| row.balance)
            .sum();

        let stock_value: f64 = sqlx::query_scalar(
            "SELECT CAST(COALESCE(SUM(cost_price * stock_qty), 0) AS REAL) FROM items",
        )
        .fetch_one(&self.pool)
        .await?;

        let low_stock = ItemRepository::new(self.pool.clone())
            .low_stock(DASHBOARD_LOW_STOCK)
            .await?;

        Ok(DashboardSummary {
            customers: count("customers").await?,
            suppliers: count("suppliers").await?,
            items: count("items").await?,
            sales_invoices,
            purchase_invoices,
            stock_moves: count("stock_moves").await?,
            sales_total,
            purchase_total,
            outstanding_total,
            stock_value,
            low_stock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use tijori_core::form::DocumentForm;
    use tijori_core::{DocumentStatus, NewCustomer, NewItem, NewPayment, NewSupplier};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    struct Books {
        db: Database,
        asha: i64,
        bharat: i64,
        mills: i64,
    }

    async fn invoice(
        db: &Database,
        kind: DocumentKind,
        party: i64,
        amount: f64,
        on: NaiveDate,
    ) -> i64 {
        let item = db.items().all(&Default::default()).await.unwrap()[0].id;
        let mut form = DocumentForm {
            counterparty_id: Some(party),
            date: Some(on),
            ..Default::default()
        };
        form.push_line(item, 1.0, amount, 0.0, 0.0);
        let draft = form.into_draft(kind, on).unwrap();
        let header = db.documents().create(&draft).await.unwrap();
        db.documents()
            .set_status(header.id, DocumentStatus::Submitted)
            .await
            .unwrap();
        header.id
    }

    async fn pay(db: &Database, side: Side, document_id: i64, amount: f64, on: NaiveDate) {
        db.payments()
            .record(
                side,
                &NewPayment {
                    document_id,
                    date: Some(on),
                    mode: Some("Cash".to_string()),
                    reference: Some(format!("RCPT-{document_id}")),
                    amount,
                    notes: None,
                },
            )
            .await
            .unwrap();
    }

    async fn books() -> Books {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let party = |name: &str, mobile: &str| NewCustomer {
            name: name.to_string(),
            mobile: Some(mobile.to_string()),
            ..Default::default()
        };
        let asha = db.customers().create(&party("Asha Traders", "90000 00001")).await.unwrap().id;
        let bharat = db
            .customers()
            .create(&party("Bharat Textiles", "90000 00002"))
            .await
            .unwrap()
            .id;
        let mills = db
            .suppliers()
            .create(&NewSupplier {
                name: "Mehta Mills".to_string(),
                phone: Some("020-5555".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .id;
        db.items()
            .create(&NewItem {
                sku: Some("TSH-1".to_string()),
                name: "T-Shirt".to_string(),
                cost_price: 80.0,
                stock_qty: 10.0,
                reorder_level: 12.0,
                ..Default::default()
            })
            .await
            .unwrap();
        Books {
            db,
            asha,
            bharat,
            mills,
        }
    }

    #[tokio::test]
    async fn test_outstanding_skips_settled_parties() {
        let b = books().await;
        let a1 = invoice(&b.db, DocumentKind::SalesInvoice, b.asha, 1000.0, day(1)).await;
        invoice(&b.db, DocumentKind::SalesInvoice, b.asha, 500.0, day(3)).await;
        let b1 = invoice(&b.db, DocumentKind::SalesInvoice, b.bharat, 300.0, day(2)).await;
        pay(&b.db, Side::Sales, a1, 400.0, day(4)).await;
        pay(&b.db, Side::Sales, a1, 100.0, day(5)).await;
        pay(&b.db, Side::Sales, b1, 300.0, day(5)).await;

        let rows = b.db.reports().outstanding(Side::Sales).await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "Asha Traders");
        assert_eq!(row.contact.as_deref(), Some("90000 00001"));
        assert_eq!(row.total_invoiced, 1500.0);
        assert_eq!(row.total_paid, 500.0);
        assert_eq!(row.balance, 1000.0);

        let payable = invoice(&b.db, DocumentKind::PurchaseInvoice, b.mills, 250.0, day(6)).await;
        pay(&b.db, Side::Purchase, payable, 50.0, day(7)).await;
        let rows = b.db.reports().outstanding(Side::Purchase).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].contact.as_deref(), Some("020-5555"));
        assert_eq!(rows[0].balance, 200.0);
    }

    #[tokio::test]
    async fn test_ledger_running_balance_and_range() {
        let b = books().await;
        let a1 = invoice(&b.db, DocumentKind::SalesInvoice, b.asha, 1000.0, day(1)).await;
        pay(&b.db, Side::Sales, a1, 400.0, day(4)).await;
        invoice(&b.db, DocumentKind::SalesInvoice, b.asha, 500.0, day(9)).await;

        let rows = b.db.reports().ledger(Side::Sales, b.asha, None, None).await.unwrap();
        let kinds: Vec<_> = rows.iter().map(|r| r.entry_type.as_str()).collect();
        assert_eq!(kinds, ["invoice", "payment", "invoice"]);
        let balances: Vec<_> = rows.iter().map(|r| r.balance).collect();
        assert_eq!(balances, [1000.0, 600.0, 1100.0]);
        assert_eq!(rows[1].reference.as_deref(), Some(format!("RCPT-{a1}").as_str()));

        let ranged = b
            .db
            .reports()
            .ledger(Side::Sales, b.asha, Some(day(2)), Some(day(8)))
            .await
            .unwrap();
        assert_eq!(ranged.len(), 1);
        assert_eq!(ranged[0].credit, 400.0);
        assert_eq!(ranged[0].balance, -400.0);

        assert!(matches!(
            b.db.reports().ledger(Side::Sales, 999, None, None).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_stock_balance_and_dashboard() {
        let b = books().await;
        invoice(&b.db, DocumentKind::SalesInvoice, b.asha, 1000.0, day(1)).await;

        let rows = b.db.reports().stock_balance().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stock_value, 800.0);

        let summary = b.db.reports().dashboard().await.unwrap();
        assert_eq!(summary.customers, 2);
        assert_eq!(summary.suppliers, 1);
        assert_eq!(summary.items, 1);
        assert_eq!(summary.sales_invoices, 1);
        assert_eq!(summary.sales_total, 1000.0);
        assert_eq!(summary.purchase_invoices, 0);
        assert_eq!(summary.outstanding_total, 1000.0);
        assert_eq!(summary.stock_value, 800.0);
        assert_eq!(summary.low_stock.len(), 1);
    }
}
