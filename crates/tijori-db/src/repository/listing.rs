//! # Filtered, Paginated Listing
//!
//! One query shape shared by every entity list.
//!
//! ```text
//!  ListQuery::new("customers", CUSTOMER_COLUMNS, "name, id")
//!      .search(&["name", "email", "mobile"], Some("kir"))
//!      .filter("city", Some("Pune"))
//!
//!  count:  SELECT COUNT(*) FROM customers
//!          WHERE 1 = 1 AND (name LIKE ? OR email LIKE ? OR mobile LIKE ?)
//!                      AND city = ?
//!
//!  page:   SELECT <columns> FROM customers WHERE <same>
//!          ORDER BY name, id LIMIT ? OFFSET ?
//! ```
//!
//! Table, column and ORDER BY fragments are compile-time constants owned by
//! the repositories; only values are bound.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use tijori_core::{Page, PageRequest};

/// A bound value for an exact-match filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

/// Builder for a filtered count plus one page of rows.
#[derive(Debug, Clone)]
pub struct ListQuery {
    from: &'static str,
    columns: &'static str,
    order_by: &'static str,
    search_columns: &'static [&'static str],
    search: Option<String>,
    filters: Vec<(&'static str, FilterValue)>,
}

impl ListQuery {
    /// `order_by` must end in a unique column so pages are stable.
    pub fn new(from: &'static str, columns: &'static str, order_by: &'static str) -> Self {
        ListQuery {
            from,
            columns,
            order_by,
            search_columns: &[],
            search: None,
            filters: Vec::new(),
        }
    }

    /// Free-text `LIKE %q%` across `columns`. Blank text adds nothing.
    pub fn search(mut self, columns: &'static [&'static str], text: Option<&str>) -> Self {
        self.search_columns = columns;
        self.search = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| format!("%{t}%"));
        self
    }

    /// Exact-match filter; `None` or blank text adds nothing.
    pub fn filter(mut self, column: &'static str, value: Option<impl Into<FilterValue>>) -> Self {
        match value.map(Into::into) {
            Some(FilterValue::Text(t)) if t.trim().is_empty() => {}
            Some(v) => self.filters.push((column, v)),
            None => {}
        }
        self
    }

    fn push_where<'q>(&'q self, qb: &mut QueryBuilder<'q, Sqlite>) {
        qb.push(" WHERE 1 = 1");

        if let Some(pattern) = &self.search {
            if !self.search_columns.is_empty() {
                qb.push(" AND (");
                for (i, column) in self.search_columns.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(*column).push(" LIKE ").push_bind(pattern.as_str());
                }
                qb.push(")");
            }
        }

        for (column, value) in &self.filters {
            qb.push(" AND ").push(*column).push(" = ");
            match value {
                FilterValue::Text(t) => qb.push_bind(t.as_str()),
                FilterValue::Int(i) => qb.push_bind(*i),
            };
        }
    }

    /// Number of rows matching the filters.
    pub async fn count(&self, pool: &SqlitePool) -> DbResult<i64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
        qb.push(self.from);
        self.push_where(&mut qb);

        let total = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
        Ok(total)
    }

    /// All matching rows in order, without paging (exports, reports).
    pub async fn fetch_all<T>(&self, pool: &SqlitePool) -> DbResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let mut qb = self.select_builder();
        let rows = qb.build_query_as::<T>().fetch_all(pool).await?;
        Ok(rows)
    }

    /// One page of matching rows plus the total count.
    ///
    /// Pages below 1 or beyond the last page come back empty.
    pub async fn fetch_page<T>(&self, pool: &SqlitePool, page: PageRequest) -> DbResult<Page<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let total = self.count(pool).await?;

        let Some(offset) = page.offset() else {
            return Ok(Page::new(Vec::new(), total, page));
        };

        let mut qb = self.select_builder();
        qb.push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(offset);

        let items = qb.build_query_as::<T>().fetch_all(pool).await?;

        debug!(
            from = self.from,
            total,
            page = page.page,
            returned = items.len(),
            "Listed rows"
        );

        Ok(Page::new(items, total, page))
    }

    fn select_builder(&self) -> QueryBuilder<'_, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(self.columns).push(" FROM ").push(self.from);
        self.push_where(&mut qb);
        qb.push(" ORDER BY ").push(self.order_by);
        qb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[derive(Debug, sqlx::FromRow)]
    struct Row {
        id: i64,
        name: String,
    }

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for (name, city) in [
            ("Asha Traders", "Pune"),
            ("Bharat Textiles", "Surat"),
            ("Chetan Stores", "Pune"),
            ("Deepa Fabrics", "Pune"),
        ] {
            sqlx::query("INSERT INTO customers (name, city) VALUES (?, ?)")
                .bind(name)
                .bind(city)
                .execute(db.pool())
                .await
                .unwrap();
        }
        db
    }

    fn customers() -> ListQuery {
        ListQuery::new("customers", "id, name", "name, id")
    }

    #[tokio::test]
    async fn test_filter_and_page() {
        let db = seeded().await;
        let query = customers().filter("city", Some("Pune"));

        let page: Page<Row> = query.fetch_page(db.pool(), PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].name, "Asha Traders");

        let page: Page<Row> = query.fetch_page(db.pool(), PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Deepa Fabrics");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let db = seeded().await;
        let query = customers().search(&["name", "city"], Some("  surat "));
        let rows: Vec<Row> = query.fetch_all(db.pool()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Bharat Textiles");
        assert!(rows[0].id > 0);
    }

    #[tokio::test]
    async fn test_out_of_range_pages_are_empty() {
        let db = seeded().await;
        let query = customers();

        let beyond: Page<Row> = query.fetch_page(db.pool(), PageRequest::new(9, 10)).await.unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 4);
        assert_eq!(beyond.total_pages, 1);

        let zero: Page<Row> = query.fetch_page(db.pool(), PageRequest::new(0, 10)).await.unwrap();
        assert!(zero.items.is_empty());
    }

    #[tokio::test]
    async fn test_empty_table_has_one_page() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let page: Page<Row> = customers()
            .filter("city", None::<&str>)
            .fetch_page(db.pool(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 1);
    }
}
