//! # Payment Commands

use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;

use tijori_core::{NewPayment, Payment, Side};

use super::docs::resolve;
use super::Ctx;
use crate::error::AppResult;
use crate::render::{amount, opt, Table};

#[derive(Subcommand, Debug)]
pub enum PaymentCommand {
    /// Record a payment against a submitted invoice
    Record {
        /// sales (money received) | purchase (money paid)
        #[arg(long)]
        side: Side,
        /// Invoice id or number
        #[arg(long)]
        document: String,
        #[arg(long)]
        amount: f64,
        /// Default: today
        #[arg(long)]
        date: Option<NaiveDate>,
        /// cash, UPI, cheque, NEFT ...
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Payments on one invoice, oldest first
    List {
        document: String,
    },
}

#[derive(Debug, Serialize)]
struct PaymentList {
    number: String,
    grand_total: f64,
    paid: f64,
    payments: Vec<Payment>,
}

pub async fn handle(ctx: &Ctx, cmd: PaymentCommand) -> AppResult<()> {
    let repo = ctx.db.payments();

    match cmd {
        PaymentCommand::Record {
            side,
            document,
            amount: value,
            date,
            mode,
            reference,
            notes,
        } => {
            let header = resolve(ctx, &document).await?;
            let payment = repo
                .record(
                    side,
                    &NewPayment {
                        document_id: header.id,
                        date,
                        mode,
                        reference,
                        amount: value,
                        notes,
                    },
                )
                .await?;
            let paid = repo.total_paid(header.id).await?;
            ctx.emit(&payment, |p| {
                format!(
                    "Recorded {} against {} on {}; balance {}",
                    amount(p.amount),
                    header.number,
                    p.date,
                    amount(header.grand_total - paid)
                )
            })
        }
        PaymentCommand::List { document } => {
            let header = resolve(ctx, &document).await?;
            let payments = repo.list_for_document(header.id).await?;
            let list = PaymentList {
                paid: payments.iter().map(|p| p.amount).sum(),
                number: header.number,
                grand_total: header.grand_total,
                payments,
            };
            ctx.emit(&list, |list| {
                let mut table = Table::new(&["ID>", "Date", "Mode", "Reference", "Amount>"]);
                for p in &list.payments {
                    table.row(vec![
                        p.id.to_string(),
                        p.date.to_string(),
                        opt(&p.mode),
                        opt(&p.reference),
                        amount(p.amount),
                    ]);
                }
                format!(
                    "{}\n{}Paid {} of {}",
                    list.number,
                    table.render(),
                    amount(list.paid),
                    amount(list.grand_total)
                )
            })
        }
    }
}
