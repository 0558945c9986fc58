//! # Tool Commands
//!
//! `barcodes`, `words` and `migrate`.

use clap::Args;
use std::path::PathBuf;

use tijori_core::words::inr_words_str;
use tijori_db::migrations::migration_status;

use super::{print_json, Ctx};
use crate::barcodes::{self, LabelPick};
use crate::error::AppResult;

#[derive(Args, Debug)]
pub struct BarcodeArgs {
    /// Item ids, each optionally with a copy count: 12 or 12:3.
    /// No ids prints every item that has a SKU.
    pub items: Vec<LabelPick>,

    /// Copies for items given without a count
    #[arg(long, default_value_t = 1)]
    pub copies: u32,

    /// ZIP archive to write
    #[arg(short, long, default_value = "barcodes.zip")]
    pub output: PathBuf,

    /// Label header (overrides TIJORI_LABEL_HEADER)
    #[arg(long)]
    pub header: Option<String>,
}

#[derive(Args, Debug)]
pub struct WordsArgs {
    /// Amount in rupees, e.g. 1234.50
    pub amount: String,
}

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Only report applied and pending migrations
    #[arg(long)]
    pub status: bool,
}

pub async fn barcodes(ctx: &Ctx, args: BarcodeArgs) -> AppResult<()> {
    let header = args.header.as_deref().unwrap_or(&ctx.config.label_header);
    let pages = barcodes::generate(&ctx.db, &args.items, args.copies, header, &args.output).await?;

    let output = args.output.display().to_string();
    ctx.emit(
        &serde_json::json!({ "pages": pages, "output": output }),
        |_| format!("Wrote {} page(s) to {}", pages, output),
    )
}

/// Prints the amount in words. Unparseable input reads as zero.
pub fn words(args: &WordsArgs, json: bool) -> AppResult<()> {
    let words = inr_words_str(&args.amount);
    if json {
        print_json(&serde_json::json!({ "amount": args.amount, "words": words }))
    } else {
        println!("{}", words);
        Ok(())
    }
}

pub async fn migrate(ctx: &Ctx, args: MigrateArgs) -> AppResult<()> {
    let (total, applied) = migration_status(ctx.db.pool()).await?;
    let pending = total.saturating_sub(applied);

    ctx.emit(
        &serde_json::json!({ "total": total, "applied": applied, "pending": pending }),
        |_| {
            if args.status {
                format!("{} of {} migrations applied, {} pending", applied, total, pending)
            } else {
                format!("Database is up to date ({} migrations)", applied)
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use tijori_db::{Database, DbConfig};

    #[tokio::test]
    async fn test_barcodes_use_configured_header() {
        let ctx = Ctx {
            db: Database::new(DbConfig::in_memory()).await.unwrap(),
            config: AppConfig {
                label_header: "MEHTA MILLS".to_string(),
                ..AppConfig::default()
            },
            json: true,
        };
        ctx.db
            .items()
            .create(&tijori_core::NewItem {
                sku: Some("MM-001".to_string()),
                name: "Cotton T-Shirt".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("labels.zip");
        barcodes(
            &ctx,
            BarcodeArgs {
                items: Vec::new(),
                copies: 3,
                output: output.clone(),
                header: None,
            },
        )
        .await
        .unwrap();

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&output).unwrap()).unwrap();
        let mut svg = String::new();
        std::io::Read::read_to_string(
            &mut archive.by_name("barcodes_page_1.svg").unwrap(),
            &mut svg,
        )
        .unwrap();
        assert_eq!(svg.matches("MEHTA MILLS").count(), 3);
    }

    #[tokio::test]
    async fn test_migrate_reports_status() {
        let ctx = Ctx {
            db: Database::new(DbConfig::in_memory()).await.unwrap(),
            config: AppConfig::default(),
            json: true,
        };
        migrate(&ctx, MigrateArgs { status: true }).await.unwrap();

        let (total, applied) = migration_status(ctx.db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }
}
