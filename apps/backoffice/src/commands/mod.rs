//! # Commands Module
//!
//! One subcommand group per entity, plus a few tools.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (Command enum, Ctx, dispatch)
//! ├── customers.rs  ◄─── list/new/edit/show/delete/search
//! ├── suppliers.rs  ◄─── ... + export/import/template
//! ├── items.rs      ◄─── ... + export/import/template
//! ├── docs.rs       ◄─── orders and invoices
//! ├── stock.rs      ◄─── stock moves
//! ├── payments.rs   ◄─── payments against invoices
//! ├── reports.rs    ◄─── outstanding, ledger, stock, dashboard
//! └── tools.rs      ◄─── barcodes, words, migrate
//! ```
//!
//! ## How Commands Work
//! ```text
//! tijori --json items search shirt
//!          │
//!          ▼
//! Command::Items(ItemCommand::Search { .. })
//!          │  dispatch(&ctx, command)
//!          ▼
//! items::handle(&ctx, cmd) ──► ctx.db.items().search(..)
//!          │
//!          ▼
//! ctx.emit(&value, |v| table)   (JSON with --json, table otherwise)
//! ```

pub mod customers;
pub mod docs;
pub mod items;
pub mod payments;
pub mod reports;
pub mod stock;
pub mod suppliers;
pub mod tools;

use clap::{Args, Subcommand};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use tijori_core::PageRequest;
use tijori_db::Database;

use crate::config::AppConfig;
use crate::error::AppResult;

/// Everything a handler needs.
pub struct Ctx {
    pub db: Database,
    pub config: AppConfig,
    /// `--json`: machine-readable output
    pub json: bool,
}

impl Ctx {
    /// Prints `value` as JSON, or the text `human` builds from it.
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T) -> String) -> AppResult<()> {
        if self.json {
            print_json(value)
        } else {
            let text = human(value);
            println!("{}", text.trim_end());
            Ok(())
        }
    }

    pub fn page(&self, args: &PageArgs) -> PageRequest {
        PageRequest::new(args.page, self.config.page_size)
    }
}

pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{}", out);
    Ok(())
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage customers
    #[command(subcommand)]
    Customers(customers::CustomerCommand),

    /// Manage suppliers
    #[command(subcommand)]
    Suppliers(suppliers::SupplierCommand),

    /// Manage items
    #[command(subcommand)]
    Items(items::ItemCommand),

    /// Sales and purchase orders and invoices
    #[command(subcommand)]
    Docs(docs::DocCommand),

    /// Stock moves
    #[command(subcommand)]
    Stock(stock::StockCommand),

    /// Payments against invoices
    #[command(subcommand)]
    Payments(payments::PaymentCommand),

    /// Outstanding balances, ledgers, stock and dashboard
    #[command(subcommand)]
    Reports(reports::ReportCommand),

    /// Print barcode label sheets into a ZIP of SVG pages
    Barcodes(tools::BarcodeArgs),

    /// Spell an amount in Indian-English words
    Words(tools::WordsArgs),

    /// Apply or inspect database migrations
    Migrate(tools::MigrateArgs),
}

impl Command {
    /// Every command migrates on open except `migrate --status`.
    pub fn applies_migrations(&self) -> bool {
        !matches!(self, Command::Migrate(args) if args.status)
    }
}

pub async fn dispatch(ctx: &Ctx, command: Command) -> AppResult<()> {
    match command {
        Command::Customers(cmd) => customers::handle(ctx, cmd).await,
        Command::Suppliers(cmd) => suppliers::handle(ctx, cmd).await,
        Command::Items(cmd) => items::handle(ctx, cmd).await,
        Command::Docs(cmd) => docs::handle(ctx, cmd).await,
        Command::Stock(cmd) => stock::handle(ctx, cmd).await,
        Command::Payments(cmd) => payments::handle(ctx, cmd).await,
        Command::Reports(cmd) => reports::handle(ctx, cmd).await,
        Command::Barcodes(args) => tools::barcodes(ctx, args).await,
        Command::Words(args) => tools::words(&args, ctx.json),
        Command::Migrate(args) => tools::migrate(ctx, args).await,
    }
}

/// `--page N` on every list command.
#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: i64,
}

/// Opens `path` for reading; `-` is stdin.
pub fn open_input(path: &Path) -> AppResult<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

/// Opens `path` for writing; `None` is stdout.
pub fn open_output(path: Option<&Path>) -> AppResult<Box<dyn Write>> {
    match path {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None => Ok(Box::new(io::stdout().lock())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::Cli;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_migrate_status_skips_migrations() {
        let cli = Cli::try_parse_from(["tijori", "migrate", "--status"]).unwrap();
        assert!(!cli.command.applies_migrations());

        let cli = Cli::try_parse_from(["tijori", "--db", "x.db", "reports", "dashboard"]).unwrap();
        assert!(cli.command.applies_migrations());
        assert_eq!(cli.db.as_deref(), Some(Path::new("x.db")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["tijori", "items", "list", "--json", "--per-page", "25"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.per_page, Some(25));

        assert!(Cli::try_parse_from(["tijori", "items", "list", "--per-page", "0"]).is_err());
    }
}
