//! # Report Commands
//!
//! Read-only views over submitted invoices, payments and stock.

use chrono::NaiveDate;
use clap::Subcommand;

use tijori_core::numeric::format_qty;
use tijori_core::{DashboardSummary, Side};

use super::Ctx;
use crate::error::AppResult;
use crate::render::{amount, details, opt, Table};

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Parties with an unpaid balance, largest first
    Outstanding {
        /// sales (customers owe us) | purchase (we owe suppliers)
        #[arg(long, default_value = "sales")]
        side: Side,
    },

    /// Invoices and payments for one customer or supplier
    Ledger {
        #[arg(long, default_value = "sales")]
        side: Side,
        /// Customer id (sales) or supplier id (purchase)
        #[arg(long)]
        party: i64,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Stock on hand and its value at cost and at selling price
    Stock,

    /// Counts, totals and items to reorder
    Dashboard,
}

pub async fn handle(ctx: &Ctx, cmd: ReportCommand) -> AppResult<()> {
    let reports = ctx.db.reports();

    match cmd {
        ReportCommand::Outstanding { side } => {
            let rows = reports.outstanding(side).await?;
            ctx.emit(&rows, |rows| {
                let mut table = Table::new(&[
                    "ID>", "Name", "Contact", "Invoiced>", "Paid>", "Balance>",
                ]);
                for r in rows {
                    table.row(vec![
                        r.party_id.to_string(),
                        r.name.clone(),
                        opt(&r.contact),
                        amount(r.total_invoiced),
                        amount(r.total_paid),
                        amount(r.balance),
                    ]);
                }
                let total: f64 = rows.iter().map(|r| r.balance).sum();
                format!("{}Total outstanding: {}", table.render(), amount(total))
            })
        }
        ReportCommand::Ledger {
            side,
            party,
            from,
            to,
        } => {
            let entries = reports.ledger(side, party, from, to).await?;
            ctx.emit(&entries, |entries| {
                let mut table = Table::new(&[
                    "Date", "Type", "Reference", "Debit>", "Credit>", "Balance>",
                ]);
                for e in entries {
                    table.row(vec![
                        e.date.to_string(),
                        e.entry_type.clone(),
                        opt(&e.reference),
                        amount(e.debit),
                        amount(e.credit),
                        amount(e.balance),
                    ]);
                }
                table.render()
            })
        }
        ReportCommand::Stock => {
            let rows = reports.stock_balance().await?;
            ctx.emit(&rows, |rows| {
                let mut table = Table::new(&[
                    "SKU", "Name", "Stock>", "UOM", "Cost>", "Price>", "Value>",
                ]);
                for r in rows {
                    table.row(vec![
                        opt(&r.sku),
                        r.name.clone(),
                        format_qty(r.stock_qty),
                        r.uom.clone(),
                        amount(r.cost_price),
                        amount(r.selling_price),
                        amount(r.stock_value),
                    ]);
                }
                let total: f64 = rows.iter().map(|r| r.stock_value).sum();
                format!("{}Stock value: {}", table.render(), amount(total))
            })
        }
        ReportCommand::Dashboard => {
            let summary = reports.dashboard().await?;
            ctx.emit(&summary, describe_dashboard)
        }
    }
}

fn describe_dashboard(s: &DashboardSummary) -> String {
    let mut out = details(&[
        ("Customers", s.customers.to_string()),
        ("Suppliers", s.suppliers.to_string()),
        ("Items", s.items.to_string()),
        ("Stock moves", s.stock_moves.to_string()),
        (
            "Sales",
            format!("{} from {} invoices", amount(s.sales_total), s.sales_invoices),
        ),
        (
            "Purchases",
            format!("{} from {} invoices", amount(s.purchase_total), s.purchase_invoices),
        ),
        ("Receivable", amount(s.outstanding_total)),
        ("Stock value", amount(s.stock_value)),
    ]);

    if !s.low_stock.is_empty() {
        let mut table = Table::new(&["ID>", "SKU", "Name", "Stock>", "Reorder>"]);
        for item in &s.low_stock {
            table.row(vec![
                item.id.to_string(),
                opt(&item.sku),
                item.name.clone(),
                format_qty(item.stock_qty),
                format_qty(item.reorder_level),
            ]);
        }
        out.push_str("\nLow stock\n");
        out.push_str(&table.render());
    }
    out
}
