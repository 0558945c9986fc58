//! # tijori-core: Pure Business Logic for the Tijori Back Office
//!
//! Everything that decides a number lives here: line totals, document
//! totals, document numbers, amount-in-words and barcode sheet geometry.
//! The crate performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tijori Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    tijori CLI (apps/backoffice)                  │   │
//! │  │    docs new ──► items import ──► barcodes ──► reports           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tijori-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   form    │  │   line    │  │ numbering │  │  barcode  │  │   │
//! │  │   │ Document  │─►│ Sales /   │  │ SO2024..  │  │  Code128  │  │   │
//! │  │   │   Form    │  │ Purchase  │  │  -00001   │  │  layout   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO FILES • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tijori-db (Database Layer)                   │   │
//! │  │        SQLite repositories, numbering counter, migrations       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (Customer, Item, DocumentHeader, ...)
//! - [`money`] - Paise-based money with Indian digit grouping
//! - [`numeric`] - Lenient numeric coercion for form and file input
//! - [`words`] - Amount in Indian-English words
//! - [`line`] - Sales and purchase line calculators
//! - [`numbering`] - Document kinds and day-scoped number format
//! - [`document`] - Line building and document totals
//! - [`form`] - Typed document form
//! - [`pagination`] - Page requests and page math
//! - [`validation`] - Input validation rules
//! - [`barcode`] - Code 128 encoding and label sheet layout
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tijori_core::line::SalesLine;
//! use tijori_core::words::inr_words;
//!
//! let line = SalesLine::compute(3.0, 100.0, 10.0);
//! assert_eq!(line.line_total, 270.0);
//!
//! assert_eq!(inr_words(270.0), "two hundred seventy rupees only");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod barcode;
pub mod document;
pub mod error;
pub mod form;
pub mod line;
pub mod money;
pub mod numbering;
pub mod numeric;
pub mod pagination;
pub mod types;
pub mod validation;
pub mod words;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use numbering::{DocumentKind, Side};
pub use pagination::{Page, PageRequest, SearchResults};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default unit of measure for items created without one.
pub const DEFAULT_UOM: &str = "Nos";

/// Default status for customers, suppliers and items.
pub const DEFAULT_STATUS: &str = "active";

/// Default page size for entity lists.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on a requested page size.
///
/// Keeps a typo like `--per-page 100000` from loading the whole table.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Default number of hits returned by search endpoints.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// GST rate assumed for purchase lines when an item has none recorded.
pub const DEFAULT_PURCHASE_GST_RATE: f64 = 18.0;
