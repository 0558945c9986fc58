//! # Tijori Back Office
//!
//! Library half of the `tijori` binary: argument parsing, configuration,
//! logging, file formats and one handler per subcommand.
//!
//! ## Module Organization
//! ```text
//! tijori_backoffice/
//! ├── lib.rs          ◄─── You are here (Cli, startup, run)
//! ├── config.rs       ◄─── AppConfig from TIJORI_* variables
//! ├── error.rs        ◄─── AppError for every command
//! ├── render.rs       ◄─── Plain-text tables
//! ├── transfer.rs     ◄─── CSV import / export
//! ├── barcodes.rs     ◄─── SVG label sheets in a ZIP
//! └── commands/
//!     ├── mod.rs      ◄─── Subcommand enum, Ctx, dispatch
//!     ├── customers.rs, suppliers.rs, items.rs
//!     ├── docs.rs     ◄─── Orders and invoices
//!     ├── stock.rs, payments.rs, reports.rs
//!     └── tools.rs    ◄─── barcodes, words, migrate
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                              │
//! │  2. Load AppConfig from env, apply --db / --per-page                    │
//! │  3. Initialize logging (stderr; TIJORI_LOG, RUST_LOG or default)        │
//! │  4. Open the database (WAL, foreign keys, migrations)                   │
//! │  5. Dispatch the subcommand, print to stdout                            │
//! │  6. On error: message to stderr, exit code from ErrorKind               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod barcodes;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod transfer;

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::{Command, Ctx};
use config::{parse_page_size, AppConfig};
use error::AppResult;
use tijori_db::{Database, DbConfig};

/// Default tracing filter when neither `TIJORI_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "info,tijori=debug,sqlx=warn";

#[derive(Parser, Debug)]
#[command(name = "tijori", author, version, about = "Back office for orders, invoices and stock")]
pub struct Cli {
    /// Database file (overrides TIJORI_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Rows per listing page (overrides TIJORI_PAGE_SIZE)
    #[arg(long, global = true, value_name = "N", value_parser = page_size_arg)]
    pub per_page: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

fn page_size_arg(raw: &str) -> Result<u32, String> {
    parse_page_size("--per-page", raw).map_err(|e| e.to_string())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `TIJORI_LOG=debug` - Show debug messages
/// - `RUST_LOG=tijori_db=trace` - Used when `TIJORI_LOG` is unset
/// - Default: `info,tijori=debug,sqlx=warn`
///
/// Logs go to stderr so stdout stays machine-readable.
pub fn init_tracing(config: &AppConfig) {
    let filter = config
        .log_filter
        .as_deref()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Opens the configured database.
///
/// `migrate: false` is only used by `tijori migrate --status`, which must
/// report pending migrations rather than apply them.
pub async fn open_database(config: &AppConfig, migrate: bool) -> AppResult<Database> {
    let path = config.database_path()?;
    info!(db_path = %path.display(), "Opening database");

    let db = Database::new(DbConfig::new(path).run_migrations(migrate)).await?;
    Ok(db)
}

/// Runs one parsed command line against `config`.
pub async fn run(cli: Cli, config: AppConfig) -> AppResult<()> {
    let mut config = config.with_db_path(cli.db);
    if let Some(per_page) = cli.per_page {
        config.page_size = per_page;
    }

    // The only command that never touches the database
    if let Command::Words(args) = &cli.command {
        return commands::tools::words(args, cli.json);
    }

    let db = open_database(&config, cli.command.applies_migrations()).await?;
    let ctx = Ctx {
        db,
        config,
        json: cli.json,
    };

    let result = commands::dispatch(&ctx, cli.command).await;
    ctx.db.close().await;
    result
}
