//! # Item Commands
//!
//! Catalogue maintenance plus the JSON lookups used while entering lines:
//! `items search` returns the selling rate and item discount, `items search
//! --purchase` returns the cost price with no discount and the purchase GST
//! rate (18% when the item has none).

use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::info;

use tijori_core::numeric::format_qty;
use tijori_core::{Item, NewItem, SearchResults, DEFAULT_SEARCH_LIMIT};
use tijori_db::ItemFilter;

use super::suppliers::describe_import;
use super::{open_input, open_output, print_json, Ctx, PageArgs};
use crate::error::{AppError, AppResult};
use crate::render::{amount, details, opt, page_footer, Table};
use crate::transfer;

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Text to look for in name, SKU, brand, HSN code or description
    #[arg(short, long)]
    pub q: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub supplier: Option<i64>,
    /// active | inactive
    #[arg(long)]
    pub status: Option<String>,
}

impl From<FilterArgs> for ItemFilter {
    fn from(args: FilterArgs) -> Self {
        ItemFilter {
            q: args.q,
            brand: args.brand,
            supplier_id: args.supplier,
            status: args.status,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ItemCommand {
    /// List items, sorted by name
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        page: PageArgs,
    },

    New(ItemFields),

    /// Change an item; omitted fields keep their value
    Edit {
        id: i64,
        #[command(flatten)]
        fields: ItemFields,
    },

    /// Show an item by id or SKU
    Show {
        reference: String,
    },

    /// Delete an item that no document line or stock move references
    Delete {
        id: i64,
    },

    /// JSON lookup for line entry: {"results": [...]}
    Search {
        query: String,
        /// Purchase pricing (cost price, purchase GST)
        #[arg(long)]
        purchase: bool,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },

    /// Write items as CSV
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create or update items from CSV, matching on SKU
    Import {
        /// CSV file, or - for stdin
        file: PathBuf,
    },

    /// Write an empty CSV with the import headers
    Template {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct ItemFields {
    #[arg(long)]
    pub sku: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Unit of measure (default: Nos)
    #[arg(long)]
    pub uom: Option<String>,
    #[arg(long)]
    pub cost_price: Option<f64>,
    #[arg(long)]
    pub selling_price: Option<f64>,
    /// Opening stock; later changes go through `stock record`
    #[arg(long)]
    pub stock_qty: Option<f64>,
    #[arg(long)]
    pub reorder_level: Option<f64>,
    #[arg(long)]
    pub hsn_code: Option<String>,
    /// Percent
    #[arg(long)]
    pub gst_rate: Option<f64>,
    /// Percent, applied on sales lines
    #[arg(long)]
    pub discount: Option<f64>,
    #[arg(long)]
    pub supplier: Option<i64>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
}

impl ItemFields {
    pub fn apply(self, base: NewItem) -> NewItem {
        NewItem {
            sku: self.sku.or(base.sku),
            name: self.name.unwrap_or(base.name),
            description: self.description.or(base.description),
            uom: self.uom.or(base.uom),
            cost_price: self.cost_price.unwrap_or(base.cost_price),
            selling_price: self.selling_price.unwrap_or(base.selling_price),
            stock_qty: self.stock_qty.unwrap_or(base.stock_qty),
            reorder_level: self.reorder_level.unwrap_or(base.reorder_level),
            hsn_code: self.hsn_code.or(base.hsn_code),
            gst_rate: self.gst_rate.unwrap_or(base.gst_rate),
            discount: self.discount.unwrap_or(base.discount),
            supplier_id: self.supplier.or(base.supplier_id),
            // Re-read from the supplier when it changes
            supplier_name: if self.supplier.is_some() { None } else { base.supplier_name },
            brand: self.brand.or(base.brand),
            status: self.status.or(base.status),
        }
    }
}

fn editable(i: Item) -> NewItem {
    NewItem {
        sku: i.sku,
        name: i.name,
        description: i.description,
        uom: Some(i.uom),
        cost_price: i.cost_price,
        selling_price: i.selling_price,
        stock_qty: i.stock_qty,
        reorder_level: i.reorder_level,
        hsn_code: i.hsn_code,
        gst_rate: i.gst_rate,
        discount: i.discount,
        supplier_id: i.supplier_id,
        supplier_name: i.supplier_name,
        brand: i.brand,
        status: Some(i.status),
    }
}

async fn find(ctx: &Ctx, reference: &str) -> AppResult<Item> {
    let repo = ctx.db.items();
    let found = match reference.trim().parse::<i64>() {
        Ok(id) => match repo.get(id).await? {
            Some(item) => Some(item),
            None => repo.get_by_sku(reference).await?,
        },
        Err(_) => repo.get_by_sku(reference).await?,
    };
    found.ok_or_else(|| AppError::not_found("Item", reference))
}

pub async fn handle(ctx: &Ctx, cmd: ItemCommand) -> AppResult<()> {
    let repo = ctx.db.items();

    match cmd {
        ItemCommand::List { filter, page } => {
            let page = repo.list(&filter.into(), ctx.page(&page)).await?;
            ctx.emit(&page, |page| {
                let mut table = Table::new(&[
                    "ID>", "SKU", "Name", "Price>", "Stock>", "UOM", "Status",
                ]);
                for item in &page.items {
                    let stock = if item.is_low_stock() {
                        format!("{} !", format_qty(item.stock_qty))
                    } else {
                        format_qty(item.stock_qty)
                    };
                    table.row(vec![
                        item.id.to_string(),
                        opt(&item.sku),
                        item.name.clone(),
                        amount(item.selling_price),
                        stock,
                        item.uom.clone(),
                        item.status.clone(),
                    ]);
                }
                format!("{}{}", table.render(), page_footer(page))
            })
        }
        ItemCommand::New(fields) => {
            let item = repo.create(&fields.apply(NewItem::default())).await?;
            info!(id = item.id, "Item created");
            ctx.emit(&item, describe)
        }
        ItemCommand::Edit { id, fields } => {
            let current = repo
                .get(id)
                .await?
                .ok_or_else(|| AppError::not_found("Item", &id.to_string()))?;
            let item = repo.update(id, &fields.apply(editable(current))).await?;
            ctx.emit(&item, describe)
        }
        ItemCommand::Show { reference } => {
            let item = find(ctx, &reference).await?;
            ctx.emit(&item, describe)
        }
        ItemCommand::Delete { id } => {
            repo.delete(id).await?;
            ctx.emit(&serde_json::json!({ "deleted": id }), |_| format!("Deleted item {}", id))
        }
        ItemCommand::Search { query, purchase, limit } => {
            let hits = if purchase {
                repo.search_for_purchase(&query, limit).await?
            } else {
                repo.search(&query, limit).await?
            };
            print_json(&SearchResults::from(hits))
        }
        ItemCommand::Export { filter, output } => {
            let filter: ItemFilter = filter.into();
            let writer = open_output(output.as_deref())?;
            let rows = transfer::export_items(&ctx.db, &filter, writer).await?;
            if output.is_some() {
                eprintln!("Exported {} items", rows);
            }
            Ok(())
        }
        ItemCommand::Import { file } => {
            let summary = transfer::import_items(&ctx.db, open_input(&file)?).await?;
            ctx.emit(&summary, describe_import)
        }
        ItemCommand::Template { output } => {
            transfer::item_template(open_output(output.as_deref())?)
        }
    }
}

fn describe(i: &Item) -> String {
    let stock = format!("{} {}", format_qty(i.stock_qty), i.uom);
    details(&[
        ("ID", i.id.to_string()),
        ("SKU", opt(&i.sku)),
        ("Name", i.name.clone()),
        ("Description", opt(&i.description)),
        ("Brand", opt(&i.brand)),
        ("HSN code", opt(&i.hsn_code)),
        ("Cost price", amount(i.cost_price)),
        ("Selling price", i.price().to_string()),
        ("GST rate", format!("{}%", format_qty(i.gst_rate))),
        ("Discount", format!("{}%", format_qty(i.discount))),
        (
            "Stock",
            if i.is_low_stock() {
                format!("{} (reorder level {})", stock, format_qty(i.reorder_level))
            } else {
                stock
            },
        ),
        ("Supplier", opt(&i.supplier_name)),
        ("Status", i.status.clone()),
    ])
}
