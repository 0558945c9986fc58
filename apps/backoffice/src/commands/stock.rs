//! # Stock Move Commands
//!
//! Moves are append-only: a wrong entry is corrected with an opposite move.

use clap::Subcommand;

use tijori_core::numeric::format_qty;
use tijori_core::{MoveDirection, NewStockMove, StockMove};
use tijori_db::StockMoveFilter;

use super::{Ctx, PageArgs};
use crate::error::AppResult;
use crate::render::{opt, page_footer, Table};

#[derive(Subcommand, Debug)]
pub enum StockCommand {
    /// Record goods in or out and adjust the item's stock
    Record {
        #[arg(long)]
        item: i64,
        /// in | out
        #[arg(long)]
        direction: MoveDirection,
        #[arg(long)]
        qty: f64,
        /// Bill, challan or document number
        #[arg(long)]
        reference: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Recent moves first
    List {
        /// Text to look for in the item name or the reference
        #[arg(short, long)]
        q: Option<String>,
        #[arg(long)]
        item: Option<i64>,
        #[arg(long)]
        direction: Option<MoveDirection>,
        #[command(flatten)]
        page: PageArgs,
    },
}

pub async fn handle(ctx: &Ctx, cmd: StockCommand) -> AppResult<()> {
    let repo = ctx.db.stock_moves();

    match cmd {
        StockCommand::Record {
            item,
            direction,
            qty,
            reference,
            notes,
        } => {
            let recorded = repo
                .record(&NewStockMove {
                    item_id: item,
                    direction,
                    qty,
                    reference,
                    notes,
                })
                .await?;
            ctx.emit(&recorded, |m: &StockMove| {
                format!(
                    "{} {} x {} (move {})",
                    m.direction,
                    format_qty(m.qty),
                    m.item_name,
                    m.id
                )
            })
        }
        StockCommand::List {
            q,
            item,
            direction,
            page,
        } => {
            let filter = StockMoveFilter {
                q,
                item_id: item,
                direction,
            };
            let page = repo.list(&filter, ctx.page(&page)).await?;
            ctx.emit(&page, |page| {
                let mut table = Table::new(&[
                    "ID>", "When", "Item", "Dir", "Qty>", "Reference", "Notes",
                ]);
                for m in &page.items {
                    table.row(vec![
                        m.id.to_string(),
                        m.created_at.format("%Y-%m-%d %H:%M").to_string(),
                        m.item_name.clone(),
                        m.direction.to_string(),
                        format_qty(m.qty),
                        opt(&m.reference),
                        opt(&m.notes),
                    ]);
                }
                format!("{}{}", table.render(), page_footer(page))
            })
        }
    }
}
