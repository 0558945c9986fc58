//! # Document Commands
//!
//! Orders and invoices on both sides.
//!
//! ## Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  docs new --kind so --form order.json        → SO20240105-00001 draft   │
//! │  docs edit SO20240105-00001 --form v2.json   → lines replaced           │
//! │  docs submit SO20240105-00001                → submitted (frozen)       │
//! │  docs invoice --from SO20240105-00001        → INV20240109-00001 draft  │
//! │  docs submit INV20240109-00001               → payments may be recorded │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Forms are JSON objects with the header fields and parallel line columns:
//!
//! ```json
//! {
//!   "counterparty_id": 1,
//!   "item_id": [4, 7],
//!   "qty": ["3", 1],
//!   "rate": [100, "50"],
//!   "discount": [10, null]
//! }
//! ```

use chrono::{Local, NaiveDate};
use clap::{Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

use tijori_core::form::DocumentForm;
use tijori_core::numeric::format_qty;
use tijori_core::{Document, DocumentHeader, DocumentKind, DocumentStatus, Payment, Side};
use tijori_db::DocumentFilter;

use super::{open_input, Ctx, PageArgs};
use crate::error::{AppError, AppResult};
use crate::render::{amount, details, opt, page_footer, Table};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Draft,
    Submitted,
    Cancelled,
}

impl From<StatusArg> for DocumentStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Draft => DocumentStatus::Draft,
            StatusArg::Submitted => DocumentStatus::Submitted,
            StatusArg::Cancelled => DocumentStatus::Cancelled,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum DocCommand {
    /// Create a draft from a JSON form
    New {
        /// so | inv | po | pi (or sales-order, sales-invoice, ...)
        #[arg(long)]
        kind: DocumentKind,
        /// JSON form file, or - for stdin
        #[arg(long, value_name = "PATH")]
        form: PathBuf,
    },

    /// Replace a draft's header and lines from a JSON form
    Edit {
        /// Document id or number
        reference: String,
        #[arg(long, value_name = "PATH")]
        form: PathBuf,
    },

    /// Show a document with its lines and payments
    Show {
        reference: String,
    },

    /// List documents of one kind, newest first
    List {
        #[arg(long)]
        kind: DocumentKind,
        /// Text to look for in the number or the counterparty name
        #[arg(short, long)]
        q: Option<String>,
        /// Customer or supplier id
        #[arg(long)]
        party: Option<i64>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Freeze a draft
    Submit {
        reference: String,
    },

    Cancel {
        reference: String,
    },

    /// Delete a draft or cancelled document
    Delete {
        reference: String,
    },

    /// Raise an invoice from an order (SO → INV, PO → PI)
    Invoice {
        /// Order id or number
        #[arg(long = "from", value_name = "ORDER")]
        order: String,
        /// Invoice date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        due_date: Option<NaiveDate>,
        /// Manual number instead of the next in sequence
        #[arg(long)]
        number: Option<String>,
        /// Supplier's bill number (purchase invoices)
        #[arg(long)]
        bill_no: Option<String>,
    },
}

/// `show` output: the document plus its payments.
#[derive(Debug, Serialize)]
struct DocumentView {
    #[serde(flatten)]
    document: Document,
    payments: Vec<Payment>,
}

/// Finds a document by numeric id or by number.
pub(crate) async fn resolve(ctx: &Ctx, reference: &str) -> AppResult<DocumentHeader> {
    let repo = ctx.db.documents();
    let reference = reference.trim();

    let found = match reference.parse::<i64>() {
        Ok(id) => repo.get(id).await?,
        Err(_) => repo.get_by_number(reference).await?,
    };
    found.ok_or_else(|| AppError::not_found("Document", reference))
}

fn read_form(path: &Path) -> AppResult<DocumentForm> {
    let mut text = String::new();
    open_input(path)?.read_to_string(&mut text)?;
    Ok(serde_json::from_str(&text)?)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub async fn handle(ctx: &Ctx, cmd: DocCommand) -> AppResult<()> {
    let repo = ctx.db.documents();

    match cmd {
        DocCommand::New { kind, form } => {
            let draft = read_form(&form)?.into_draft(kind, today())?;
            let header = repo.create(&draft).await?;
            ctx.emit(&header, |h| {
                format!("Created {} for {}", h.number, h.grand_total_money())
            })
        }
        DocCommand::Edit { reference, form } => {
            let current = resolve(ctx, &reference).await?;
            let mut form = read_form(&form)?;
            // A form without a date keeps the document's own
            form.date.get_or_insert(current.date);
            let draft = form.into_draft(current.kind, today())?;
            let header = repo.replace(current.id, &draft).await?;
            ctx.emit(&header, |h| {
                format!("Updated {}, now {}", h.number, h.grand_total_money())
            })
        }
        DocCommand::Show { reference } => {
            let header = resolve(ctx, &reference).await?;
            let document = repo
                .get_document(header.id)
                .await?
                .ok_or_else(|| AppError::not_found("Document", &reference))?;
            let payments = ctx.db.payments().list_for_document(header.id).await?;
            ctx.emit(&DocumentView { document, payments }, describe)
        }
        DocCommand::List {
            kind,
            q,
            party,
            status,
            page,
        } => {
            let filter = DocumentFilter {
                q,
                counterparty_id: party,
                status: status.map(Into::into),
            };
            let page = repo.list(kind, &filter, ctx.page(&page)).await?;
            ctx.emit(&page, |page| {
                let party = match kind.side() {
                    Side::Sales => "Customer",
                    Side::Purchase => "Supplier",
                };
                let mut table = Table::new(&[
                    "ID>", "Number", "Date", party, "Status", "Net>", "Tax>", "Total>", "Source",
                ]);
                for d in &page.items {
                    table.row(vec![
                        d.id.to_string(),
                        d.number.clone(),
                        d.date.to_string(),
                        d.counterparty_name.clone(),
                        d.status.to_string(),
                        amount(d.total),
                        amount(d.tax_total),
                        amount(d.grand_total),
                        opt(&d.source_number),
                    ]);
                }
                format!("{}{}", table.render(), page_footer(page))
            })
        }
        DocCommand::Submit { reference } => {
            set_status(ctx, &reference, DocumentStatus::Submitted).await
        }
        DocCommand::Cancel { reference } => {
            set_status(ctx, &reference, DocumentStatus::Cancelled).await
        }
        DocCommand::Delete { reference } => {
            let header = resolve(ctx, &reference).await?;
            repo.delete(header.id).await?;
            ctx.emit(&serde_json::json!({ "deleted": header.number }), |_| {
                format!("Deleted {}", header.number)
            })
        }
        DocCommand::Invoice {
            order,
            date,
            due_date,
            number,
            bill_no,
        } => {
            let order = resolve(ctx, &order).await?;
            let (kind, mut form) = repo.invoice_form_from_order(order.id).await?;
            form.date = date;
            if due_date.is_some() {
                form.due_date = due_date;
            }
            form.number = number;
            form.bill_no = bill_no;

            let header = repo.create(&form.into_draft(kind, today())?).await?;
            info!(order = %order.number, invoice = %header.number, "Invoice raised from order");
            ctx.emit(&header, |h| {
                format!(
                    "Created {} from {} for {}",
                    h.number,
                    order.number,
                    h.grand_total_money()
                )
            })
        }
    }
}

async fn set_status(ctx: &Ctx, reference: &str, next: DocumentStatus) -> AppResult<()> {
    let header = resolve(ctx, reference).await?;
    let header = ctx.db.documents().set_status(header.id, next).await?;
    ctx.emit(&header, |h| format!("{} is now {}", h.number, h.status))
}

fn describe(view: &DocumentView) -> String {
    let doc = &view.document;
    let h = &doc.header;
    let side = h.kind.side();
    let party_label = match side {
        Side::Sales => "Customer",
        Side::Purchase => "Supplier",
    };

    let mut out = details(&[
        ("Number", h.number.clone()),
        ("Kind", h.kind.label().to_string()),
        ("Status", h.status.to_string()),
        (party_label, doc.counterparty_name.clone()),
        ("Date", h.date.to_string()),
        ("Due", h.due_date.map(|d| d.to_string()).unwrap_or_default()),
        (
            "Delivery",
            h.expected_delivery_date.map(|d| d.to_string()).unwrap_or_default(),
        ),
        ("Bill no", opt(&h.bill_no)),
        ("Notes", opt(&h.notes)),
    ]);
    out.push('\n');

    let mut lines = match side {
        Side::Sales => Table::new(&["#>", "Item", "SKU", "Qty>", "Rate>", "Disc %>", "Amount>"]),
        Side::Purchase => Table::new(&[
            "#>", "Item", "SKU", "Qty>", "Rate>", "Disc>", "GST %>", "Net>", "Tax>", "Amount>",
        ]),
    };
    for line in &doc.lines {
        let mut cells = vec![
            line.line_no.to_string(),
            line.item_name.clone(),
            opt(&line.sku),
            format!("{} {}", format_qty(line.qty), line.uom),
            amount(line.rate),
            format_qty(line.discount),
        ];
        if side == Side::Purchase {
            cells.push(format_qty(line.gst_rate));
            cells.push(amount(line.net));
            cells.push(amount(line.tax));
        }
        cells.push(amount(line.line_total));
        lines.row(cells);
    }
    out.push_str(&lines.render());
    out.push('\n');

    let mut totals = vec![
        ("Total", amount(h.total)),
        ("Tax", amount(h.tax_total)),
        ("Grand total", h.grand_total_money().to_string()),
        ("In words", doc.amount_in_words.clone()),
    ];
    if h.kind.is_invoice() {
        totals.push(("Paid", amount(doc.paid)));
        totals.push(("Balance", amount(doc.balance)));
    }
    out.push_str(&details(&totals));

    if !view.payments.is_empty() {
        let mut payments = Table::new(&["Date", "Mode", "Reference", "Amount>"]);
        for p in &view.payments {
            payments.row(vec![
                p.date.to_string(),
                opt(&p.mode),
                opt(&p.reference),
                amount(p.amount),
            ]);
        }
        out.push('\n');
        out.push_str(&payments.render());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::fs;
    use tijori_core::numbering::format_number;
    use tijori_core::{NewCustomer, NewItem};
    use tijori_db::{Database, DbConfig};

    async fn ctx() -> Ctx {
        Ctx {
            db: Database::new(DbConfig::in_memory()).await.unwrap(),
            config: AppConfig::default(),
            json: true,
        }
    }

    async fn seed(ctx: &Ctx) -> (i64, i64, i64) {
        let customer = ctx
            .db
            .customers()
            .create(&NewCustomer {
                name: "Asha Traders".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let shirt = ctx
            .db
            .items()
            .create(&NewItem {
                sku: Some("MM-001".to_string()),
                name: "Cotton T-Shirt".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let cap = ctx
            .db
            .items()
            .create(&NewItem {
                sku: Some("KA-002".to_string()),
                name: "Cotton Cap".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        (customer.id, shirt.id, cap.id)
    }

    #[tokio::test]
    async fn test_order_to_invoice_from_form_file() {
        let ctx = ctx().await;
        let (customer, shirt, cap) = seed(&ctx).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.json");
        fs::write(
            &path,
            format!(
                r#"{{
                    "counterparty_id": {customer},
                    "date": "2024-01-05",
                    "item_id": [{shirt}, "{cap}", ""],
                    "qty": ["3", 1, "9"],
                    "rate": [100, "50", 1],
                    "discount": [10]
                }}"#
            ),
        )
        .unwrap();

        handle(
            &ctx,
            DocCommand::New {
                kind: DocumentKind::SalesOrder,
                form: path,
            },
        )
        .await
        .unwrap();

        // Numbered under the day it was entered, dated as the form says
        let order = resolve(&ctx, &format_number(DocumentKind::SalesOrder, today(), 1))
            .await
            .unwrap();
        assert_eq!(order.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(order.grand_total, 320.0);
        assert_eq!(ctx.db.documents().get_lines(order.id).await.unwrap().len(), 2);

        // Invoicing a draft order is allowed; the invoice copies its lines
        handle(
            &ctx,
            DocCommand::Invoice {
                order: order.number.clone(),
                date: NaiveDate::from_ymd_opt(2024, 1, 9),
                due_date: None,
                number: None,
                bill_no: None,
            },
        )
        .await
        .unwrap();

        let invoice = resolve(&ctx, &format_number(DocumentKind::SalesInvoice, today(), 1))
            .await
            .unwrap();
        assert_eq!(invoice.date, NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert_eq!(invoice.source_document_id, Some(order.id));
        assert_eq!(invoice.grand_total, 320.0);
        assert_eq!(invoice.status, DocumentStatus::Draft);

        handle(&ctx, DocCommand::Submit { reference: invoice.id.to_string() })
            .await
            .unwrap();
        let err = handle(&ctx, DocCommand::Delete { reference: invoice.number.clone() })
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Validation);

        handle(&ctx, DocCommand::Show { reference: invoice.number })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_edit_without_date_keeps_document_date() {
        let ctx = ctx().await;
        let (customer, shirt, cap) = seed(&ctx).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.json");
        fs::write(
            &path,
            format!(
                r#"{{"counterparty_id": {customer}, "date": "2023-11-20",
                    "item_id": [{shirt}], "qty": [2], "rate": [100]}}"#
            ),
        )
        .unwrap();
        handle(
            &ctx,
            DocCommand::New {
                kind: DocumentKind::SalesOrder,
                form: path.clone(),
            },
        )
        .await
        .unwrap();
        let number = format_number(DocumentKind::SalesOrder, today(), 1);

        fs::write(
            &path,
            format!(
                r#"{{"counterparty_id": {customer},
                    "item_id": [{shirt}, {cap}], "qty": [2, 1], "rate": [100, 50]}}"#
            ),
        )
        .unwrap();
        handle(
            &ctx,
            DocCommand::Edit {
                reference: number.clone(),
                form: path,
            },
        )
        .await
        .unwrap();

        let order = resolve(&ctx, &number).await.unwrap();
        assert_eq!(order.date, NaiveDate::from_ymd_opt(2023, 11, 20).unwrap());
        assert_eq!(order.grand_total, 250.0);
    }

    #[tokio::test]
    async fn test_unknown_form_fields_are_rejected() {
        let ctx = ctx().await;
        let (customer, _, _) = seed(&ctx).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, format!(r#"{{"counterparty_id": {customer}, "colour": "red"}}"#)).unwrap();

        let err = handle(
            &ctx,
            DocCommand::New {
                kind: DocumentKind::SalesOrder,
                form: path,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Validation);
        assert!(err.message.contains("colour"));
    }

    #[tokio::test]
    async fn test_resolve_reports_missing_documents() {
        let ctx = ctx().await;
        let err = resolve(&ctx, "SO20240105-00042").await.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::NotFound);
        assert_eq!(err.message, "Document not found: SO20240105-00042");
    }
}
