//! # Document Sequences
//!
//! Day-scoped counters behind generated document numbers.
//!
//! ```text
//!  document_sequences
//!  ┌──────────────┬──────────┬────────────┐
//!  │ kind         │ day      │ last_value │
//!  ├──────────────┼──────────┼────────────┤
//!  │ sales_order  │ 20240105 │ 2          │  → SO20240105-00001, -00002
//!  │ sales_invoice│ 20240105 │ 1          │  → INV20240105-00001
//!  └──────────────┴──────────┴────────────┘
//! ```
//!
//! The increment is a single upsert, so two writers can never read the same
//! value. It must run on the connection of the transaction that creates the
//! header: a rollback gives the value back.

use chrono::NaiveDate;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tijori_core::numbering::day_key;
use tijori_core::DocumentKind;

/// Claims the next sequence value for `kind` on `date`, starting at 1.
pub async fn next_value(
    conn: &mut SqliteConnection,
    kind: DocumentKind,
    date: NaiveDate,
) -> DbResult<u32> {
    let day = day_key(date);

    let value: i64 = sqlx::query_scalar(
        "INSERT INTO document_sequences (kind, day, last_value) VALUES (?, ?, 1) \
         ON CONFLICT(kind, day) DO UPDATE SET last_value = last_value + 1 \
         RETURNING last_value",
    )
    .bind(kind)
    .bind(&day)
    .fetch_one(&mut *conn)
    .await?;

    debug!(kind = kind.as_str(), day = %day, value, "Claimed sequence value");

    u32::try_from(value).map_err(|_| {
        DbError::Internal(format!("sequence for {} {} overflowed", kind.as_str(), day))
    })
}
