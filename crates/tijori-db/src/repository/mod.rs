//! # Repository Module
//!
//! One repository per aggregate, each holding a clone of the pool.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  tijori command                                                         │
//! │       │                                                                 │
//! │       │  db.documents().create(&draft)                                  │
//! │       ▼                                                                 │
//! │  DocumentRepository ──uses──► sequence::next_value (same transaction)   │
//! │       │                                                                 │
//! │       │  SQL (runtime queries, FromRow mapping)                         │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Customer CRUD, listing and search
//! - [`supplier::SupplierRepository`] - Supplier CRUD, listing and search
//! - [`item::ItemRepository`] - Items, SKU upserts, labels, low stock
//! - [`document::DocumentRepository`] - Orders and invoices with their lines
//! - [`stock_move::StockMoveRepository`] - Stock audit trail
//! - [`payment::PaymentRepository`] - Payments against invoices
//! - [`report::ReportRepository`] - Outstanding, ledgers, stock, dashboard
//!
//! [`listing::ListQuery`] is the shared filter-and-paginate builder;
//! [`sequence`] holds the document number counters.

pub mod customer;
pub mod document;
pub mod item;
pub mod listing;
pub mod payment;
pub mod report;
pub mod sequence;
pub mod stock_move;
pub mod supplier;
