//! # tijori-db: Database Layer for the Tijori Back Office
//!
//! SQLite storage through sqlx: the pool, embedded migrations and one
//! repository per aggregate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tijori Data Flow                                 │
//! │                                                                         │
//! │  tijori CLI (docs new, items import, reports ledger, ...)              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     tijori-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ CustomerRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ DocumentRepo   │    │ 001_initial  │  │   │
//! │  │   │ WAL, FK on    │    │ ReportRepo ... │    │ _schema.sql  │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/tijori/tijori.db (or TIJORI_DB_PATH)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tijori_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("tijori.db")).await?;
//!
//! let header = db.documents().create(&draft).await?;
//! let owed = db.reports().outstanding(Side::Sales).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::{CustomerFilter, CustomerRepository};
pub use repository::document::{DocumentFilter, DocumentRepository};
pub use repository::item::{ItemFilter, ItemRepository};
pub use repository::payment::PaymentRepository;
pub use repository::report::ReportRepository;
pub use repository::stock_move::{StockMoveFilter, StockMoveRepository};
pub use repository::supplier::{SupplierFilter, SupplierRepository};
