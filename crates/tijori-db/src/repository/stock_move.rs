//! # Stock Move Repository
//!
//! Append-only stock audit trail. Recording a move applies its delta to the
//! item in the same transaction:
//!
//! ```text
//! BEGIN
//!   UPDATE items SET stock_qty = stock_qty ± qty   (0 rows → NotFound)
//!   INSERT stock_moves
//! COMMIT
//! ```
//!
//! Moves are never updated or deleted; a correction is a move the other way.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::listing::ListQuery;
use crate::error::{DbError, DbResult};
use tijori_core::validation::{clean_optional, validate_quantity};
use tijori_core::{MoveDirection, NewStockMove, Page, PageRequest, StockMove};

const FROM: &str = "stock_moves m JOIN items i ON i.id = m.item_id";

const COLUMNS: &str = "m.id, m.item_id, i.name AS item_name, m.direction, m.qty, m.reference, \
                       m.notes, m.created_at";

#[derive(Debug, Clone, Default)]
pub struct StockMoveFilter {
    /// Free text over the item name and the reference.
    pub q: Option<String>,
    pub item_id: Option<i64>,
    pub direction: Option<MoveDirection>,
}

#[derive(Debug, Clone)]
pub struct StockMoveRepository {
    pool: SqlitePool,
}

impl StockMoveRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockMoveRepository { pool }
    }

    /// Records a move and adjusts the item's stock.
    ///
    /// Outgoing moves may take stock below zero.
    pub async fn record(&self, input: &NewStockMove) -> DbResult<StockMove> {
        validate_quantity(input.qty)?;
        let delta = input.direction.delta(input.qty);

        debug!(
            item_id = input.item_id,
            direction = %input.direction,
            qty = input.qty,
            "Recording stock move"
        );

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE items SET stock_qty = stock_qty + ?, updated_at = ? WHERE id = ?",
        )
        .bind(delta)
        .bind(now)
        .bind(input.item_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", input.item_id));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO stock_moves (item_id, direction, qty, reference, notes, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(input.item_id)
        .bind(input.direction)
        .bind(input.qty)
        .bind(clean_optional(input.reference.as_deref()))
        .bind(clean_optional(input.notes.as_deref()))
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let recorded = fetch_move(&mut tx, id).await?;
        tx.commit().await?;

        info!(id, item_id = input.item_id, delta, "Stock move recorded");
        Ok(recorded)
    }

    /// One page of moves, most recent first.
    pub async fn list(
        &self,
        filter: &StockMoveFilter,
        page: PageRequest,
    ) -> DbResult<Page<StockMove>> {
        ListQuery::new(FROM, COLUMNS, "m.created_at DESC, m.id DESC")
            .search(&["i.name", "m.reference"], filter.q.as_deref())
            .filter("m.item_id", filter.item_id)
            .filter("m.direction", filter.direction.map(|d| d.as_str()))
            .fetch_page(&self.pool, page)
            .await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_moves")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn fetch_move(conn: &mut SqliteConnection, id: i64) -> DbResult<StockMove> {
    let sql = format!("SELECT {COLUMNS} FROM {FROM} WHERE m.id = ?");
    let recorded = sqlx::query_as::<_, StockMove>(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(recorded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use tijori_core::NewItem;

    async fn with_item(stock: f64) -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let item = db
            .items()
            .create(&NewItem {
                sku: Some("TSH-1".to_string()),
                name: "T-Shirt".to_string(),
                stock_qty: stock,
                ..Default::default()
            })
            .await
            .unwrap();
        (db, item.id)
    }

    fn movement(item_id: i64, direction: MoveDirection, qty: f64) -> NewStockMove {
        NewStockMove {
            item_id,
            direction,
            qty,
            reference: Some("GRN-7".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_moves_adjust_stock() {
        let (db, item_id) = with_item(10.0).await;
        let repo = db.stock_moves();

        let inward = repo.record(&movement(item_id, MoveDirection::In, 5.0)).await.unwrap();
        assert_eq!(inward.item_name, "T-Shirt");
        assert_eq!(inward.direction, MoveDirection::In);

        repo.record(&movement(item_id, MoveDirection::Out, 12.5)).await.unwrap();

        let item = db.items().get(item_id).await.unwrap().unwrap();
        assert_eq!(item.stock_qty, 2.5);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_non_positive_quantity_writes_nothing() {
        let (db, item_id) = with_item(10.0).await;

        for qty in [0.0, -3.0, f64::NAN] {
            let err = db
                .stock_moves()
                .record(&movement(item_id, MoveDirection::Out, qty))
                .await
                .unwrap_err();
            assert!(matches!(err, DbError::Validation(_)));
        }

        let item = db.items().get(item_id).await.unwrap().unwrap();
        assert_eq!(item.stock_qty, 10.0);
        assert_eq!(db.stock_moves().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_item_is_not_found() {
        let (db, _) = with_item(0.0).await;
        let err = db
            .stock_moves()
            .record(&movement(404, MoveDirection::In, 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.stock_moves().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_is_most_recent_first() {
        let (db, item_id) = with_item(0.0).await;
        let repo = db.stock_moves();
        let first = repo.record(&movement(item_id, MoveDirection::In, 1.0)).await.unwrap();
        let second = repo.record(&movement(item_id, MoveDirection::Out, 1.0)).await.unwrap();

        let page = repo.list(&StockMoveFilter::default(), PageRequest::default()).await.unwrap();
        let ids: Vec<_> = page.items.iter().map(|m| m.id).collect();
        assert_eq!(ids, [second.id, first.id]);

        let outgoing = StockMoveFilter {
            direction: Some(MoveDirection::Out),
            ..Default::default()
        };
        let page = repo.list(&outgoing, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, second.id);
    }
}
