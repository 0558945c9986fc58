//! # Item Repository
//!
//! Inventory items: CRUD, filtered listing, line-entry search, SKU upserts
//! for imports and label selection for barcode sheets.
//!
//! ## Search Contexts
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  search()               rate = selling_price   discount = item's     │
//! │  (sales order/invoice)  gst_rate = item's                           │
//! │                                                                      │
//! │  search_for_purchase()  rate = cost_price      discount = 0          │
//! │  (PO / PI)              gst_rate = item's, 18 when unset             │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::listing::ListQuery;
use crate::error::{DbError, DbResult};
use tijori_core::validation::{
    clean_optional, validate_name, validate_non_negative, validate_percent,
    validate_search_query, validate_sku, validate_status,
};
use tijori_core::{
    Item, ItemSearchHit, LowStockItem, NewItem, Page, PageRequest, ValidationError, DEFAULT_UOM,
};

const COLUMNS: &str = "id, sku, name, description, uom, cost_price, selling_price, stock_qty, \
                       reorder_level, hsn_code, gst_rate, discount, supplier_id, supplier_name, \
                       brand, status, created_at, updated_at";

/// List filters: free text over name/SKU/brand/HSN, exact brand, supplier
/// and status.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub q: Option<String>,
    pub brand: Option<String>,
    pub supplier_id: Option<i64>,
    pub status: Option<String>,
}

/// An item payload after validation.
struct CleanItem {
    sku: Option<String>,
    name: String,
    description: Option<String>,
    uom: String,
    cost_price: f64,
    selling_price: f64,
    stock_qty: f64,
    reorder_level: f64,
    hsn_code: Option<String>,
    gst_rate: f64,
    discount: f64,
    supplier_id: Option<i64>,
    supplier_name: Option<String>,
    brand: Option<String>,
    status: String,
}

impl CleanItem {
    fn from_input(input: &NewItem) -> DbResult<Self> {
        validate_non_negative("cost_price", input.cost_price)?;
        validate_non_negative("selling_price", input.selling_price)?;
        validate_non_negative("reorder_level", input.reorder_level)?;
        validate_percent("gst_rate", input.gst_rate)?;
        validate_percent("discount", input.discount)?;
        // Stock may go negative through moves, but not by direct entry.
        validate_non_negative("stock_qty", input.stock_qty)?;

        Ok(CleanItem {
            sku: validate_sku(input.sku.as_deref())?,
            name: validate_name("name", &input.name)?,
            description: clean_optional(input.description.as_deref()),
            uom: clean_optional(input.uom.as_deref()).unwrap_or_else(|| DEFAULT_UOM.to_string()),
            cost_price: input.cost_price,
            selling_price: input.selling_price,
            stock_qty: input.stock_qty,
            reorder_level: input.reorder_level,
            hsn_code: clean_optional(input.hsn_code.as_deref()),
            gst_rate: input.gst_rate,
            discount: input.discount,
            supplier_id: input.supplier_id.filter(|id| *id > 0),
            supplier_name: clean_optional(input.supplier_name.as_deref()),
            brand: clean_optional(input.brand.as_deref()),
            status: validate_status(input.status.as_deref())?,
        })
    }
}

/// Repository for item database operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    /// Inserts an item and returns the stored row.
    ///
    /// When only `supplier_id` is given, `supplier_name` is copied from the
    /// supplier so lists can show it without a join.
    pub async fn create(&self, input: &NewItem) -> DbResult<Item> {
        let it = CleanItem::from_input(input)?;
        debug!(name = %it.name, sku = ?it.sku, "Creating item");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO items (sku, name, description, uom, cost_price, selling_price, \
             stock_qty, reorder_level, hsn_code, gst_rate, discount, supplier_id, \
             supplier_name, brand, status, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, \
             COALESCE(?13, (SELECT name FROM suppliers WHERE id = ?12)), ?14, ?15, ?16, ?16) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Item>(&sql)
            .bind(&it.sku)
            .bind(&it.name)
            .bind(&it.description)
            .bind(&it.uom)
            .bind(it.cost_price)
            .bind(it.selling_price)
            .bind(it.stock_qty)
            .bind(it.reorder_level)
            .bind(&it.hsn_code)
            .bind(it.gst_rate)
            .bind(it.discount)
            .bind(it.supplier_id)
            .bind(&it.supplier_name)
            .bind(&it.brand)
            .bind(&it.status)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(it.sku.clone().unwrap_or_default()))
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Item>> {
        let sql = format!("SELECT {COLUMNS} FROM items WHERE id = ?");
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    /// Gets an item by its SKU (exact match).
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Item>> {
        let sql = format!("SELECT {COLUMNS} FROM items WHERE sku = ?");
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(sku.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    /// Replaces every editable field, including the stock figure.
    pub async fn update(&self, id: i64, input: &NewItem) -> DbResult<Item> {
        let it = CleanItem::from_input(input)?;
        debug!(id, name = %it.name, "Updating item");

        let sql = format!(
            "UPDATE items SET sku = ?1, name = ?2, description = ?3, uom = ?4, \
             cost_price = ?5, selling_price = ?6, stock_qty = ?7, reorder_level = ?8, \
             hsn_code = ?9, gst_rate = ?10, discount = ?11, supplier_id = ?12, \
             supplier_name = COALESCE(?13, (SELECT name FROM suppliers WHERE id = ?12)), \
             brand = ?14, status = ?15, updated_at = ?16 WHERE id = ?17 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Item>(&sql)
            .bind(&it.sku)
            .bind(&it.name)
            .bind(&it.description)
            .bind(&it.uom)
            .bind(it.cost_price)
            .bind(it.selling_price)
            .bind(it.stock_qty)
            .bind(it.reorder_level)
            .bind(&it.hsn_code)
            .bind(it.gst_rate)
            .bind(it.discount)
            .bind(it.supplier_id)
            .bind(&it.supplier_name)
            .bind(&it.brand)
            .bind(&it.status)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(it.sku.clone().unwrap_or_default()))?
            .ok_or_else(|| DbError::not_found("Item", id))
    }

    /// Inserts or updates by SKU; what CSV imports use.
    ///
    /// An existing row keeps its id, so document lines and stock moves that
    /// reference it stay attached.
    pub async fn upsert_by_sku(&self, input: &NewItem) -> DbResult<Item> {
        let it = CleanItem::from_input(input)?;
        let Some(sku) = it.sku.as_deref() else {
            return Err(ValidationError::required("sku").into());
        };
        debug!(sku = %sku, "Upserting item");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO items (sku, name, description, uom, cost_price, selling_price, \
             stock_qty, reorder_level, hsn_code, gst_rate, discount, supplier_id, \
             supplier_name, brand, status, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, \
             COALESCE(?13, (SELECT name FROM suppliers WHERE id = ?12)), ?14, ?15, ?16, ?16) \
             ON CONFLICT(sku) DO UPDATE SET \
                 name = excluded.name, \
                 description = excluded.description, \
                 uom = excluded.uom, \
                 cost_price = excluded.cost_price, \
                 selling_price = excluded.selling_price, \
                 stock_qty = excluded.stock_qty, \
                 reorder_level = excluded.reorder_level, \
                 hsn_code = excluded.hsn_code, \
                 gst_rate = excluded.gst_rate, \
                 discount = excluded.discount, \
                 supplier_id = COALESCE(excluded.supplier_id, items.supplier_id), \
                 supplier_name = COALESCE(excluded.supplier_name, items.supplier_name), \
                 brand = excluded.brand, \
                 status = excluded.status, \
                 updated_at = excluded.updated_at \
             RETURNING {COLUMNS}"
        );
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(sku)
            .bind(&it.name)
            .bind(&it.description)
            .bind(&it.uom)
            .bind(it.cost_price)
            .bind(it.selling_price)
            .bind(it.stock_qty)
            .bind(it.reorder_level)
            .bind(&it.hsn_code)
            .bind(it.gst_rate)
            .bind(it.discount)
            .bind(it.supplier_id)
            .bind(&it.supplier_name)
            .bind(&it.brand)
            .bind(&it.status)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(item)
    }

    /// Deletes an item. Fails with a foreign key violation while document
    /// lines or stock moves still reference it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting item");

        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Item", id));
        }
        Ok(())
    }

    fn list_query(filter: &ItemFilter) -> ListQuery {
        ListQuery::new("items", COLUMNS, "name, id")
            .search(
                &["name", "sku", "brand", "hsn_code", "description"],
                filter.q.as_deref(),
            )
            .filter("brand", filter.brand.as_deref())
            .filter("supplier_id", filter.supplier_id)
            .filter("status", filter.status.as_deref())
    }

    pub async fn list(&self, filter: &ItemFilter, page: PageRequest) -> DbResult<Page<Item>> {
        Self::list_query(filter).fetch_page(&self.pool, page).await
    }

    /// Every matching item, ordered by name (exports).
    pub async fn all(&self, filter: &ItemFilter) -> DbResult<Vec<Item>> {
        Self::list_query(filter).fetch_all(&self.pool).await
    }

    /// Line-entry search for sales documents.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<ItemSearchHit>> {
        self.search_with(
            "selling_price AS rate, discount, gst_rate",
            query,
            limit,
        )
        .await
    }

    /// Line-entry search for purchase documents.
    ///
    /// Purchase discounts are absolute amounts per line, so the item's
    /// percentage discount does not carry over.
    pub async fn search_for_purchase(
        &self,
        query: &str,
        limit: u32,
    ) -> DbResult<Vec<ItemSearchHit>> {
        self.search_with(
            "cost_price AS rate, CAST(0 AS REAL) AS discount, \
             CAST(IFNULL(NULLIF(gst_rate, 0), 18) AS REAL) AS gst_rate",
            query,
            limit,
        )
        .await
    }

    async fn search_with(
        &self,
        pricing: &'static str,
        query: &str,
        limit: u32,
    ) -> DbResult<Vec<ItemSearchHit>> {
        let query = validate_search_query(query)?;
        let pattern = format!("%{query}%");

        let sql = format!(
            "SELECT id, name, sku, {pricing}, stock_qty, uom FROM items \
             WHERE status = 'active' AND (name LIKE ?1 OR sku LIKE ?1 OR brand LIKE ?1) \
             ORDER BY name, id LIMIT ?2"
        );
        let hits = sqlx::query_as::<_, ItemSearchHit>(&sql)
            .bind(&pattern)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        debug!(query = %query, count = hits.len(), "Item search");
        Ok(hits)
    }

    /// Items to print labels for: the given ids, or every item when `ids`
    /// is empty. Items without a SKU have nothing to encode and are left out.
    pub async fn labels(&self, ids: &[i64]) -> DbResult<Vec<Item>> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("SELECT ");
        qb.push(COLUMNS)
            .push(" FROM items WHERE sku IS NOT NULL AND sku <> ''");

        if !ids.is_empty() {
            qb.push(" AND id IN (");
            let mut separated = qb.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }
        qb.push(" ORDER BY name, id");

        let items = qb.build_query_as::<Item>().fetch_all(&self.pool).await?;
        debug!(requested = ids.len(), found = items.len(), "Selected items for labels");
        Ok(items)
    }

    /// Active items at or below their reorder level, lowest stock first.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<LowStockItem>> {
        let rows = sqlx::query_as::<_, LowStockItem>(
            "SELECT id, name, sku, stock_qty, reorder_level FROM items \
             WHERE status = 'active' AND stock_qty <= reorder_level \
             ORDER BY stock_qty, name, id LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use tijori_core::NewSupplier;

    fn item(sku: &str, name: &str) -> NewItem {
        NewItem {
            sku: Some(sku.to_string()),
            name: name.to_string(),
            cost_price: 80.0,
            selling_price: 100.0,
            stock_qty: 10.0,
            reorder_level: 5.0,
            gst_rate: 12.0,
            discount: 5.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_defaults_uom_and_copies_supplier_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let supplier = db
            .suppliers()
            .create(&NewSupplier {
                name: "Mehta Mills".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut input = item("TSH-1", "T-Shirt");
        input.supplier_id = Some(supplier.id);
        let created = db.items().create(&input).await.unwrap();

        assert_eq!(created.uom, "Nos");
        assert_eq!(created.status, "active");
        assert_eq!(created.supplier_name.as_deref(), Some("Mehta Mills"));
    }

    #[tokio::test]
    async fn test_duplicate_sku_is_reported_with_value() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.items().create(&item("TSH-1", "T-Shirt")).await.unwrap();

        let err = db.items().create(&item("TSH-1", "Other")).await.unwrap_err();
        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "items.sku");
                assert_eq!(value, "TSH-1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_percent_is_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut input = item("TSH-1", "T-Shirt");
        input.gst_rate = 140.0;
        assert!(matches!(
            db.items().create(&input).await,
            Err(DbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_by_sku_keeps_id() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.items();

        let first = repo.upsert_by_sku(&item("TSH-1", "T-Shirt")).await.unwrap();
        let mut changed = item("TSH-1", "T-Shirt (Blue)");
        changed.selling_price = 120.0;
        let second = repo.upsert_by_sku(&changed).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "T-Shirt (Blue)");
        assert_eq!(second.selling_price, 120.0);
        assert_eq!(repo.count().await.unwrap(), 1);

        let mut no_sku = item("", "Loose");
        no_sku.sku = None;
        assert!(matches!(
            repo.upsert_by_sku(&no_sku).await,
            Err(DbError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_search_contexts_price_differently() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut untaxed = item("CAP-1", "Cap");
        untaxed.gst_rate = 0.0;
        db.items().create(&item("TSH-1", "T-Shirt")).await.unwrap();
        db.items().create(&untaxed).await.unwrap();

        let sales = db.items().search("shirt", 10).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].rate, 100.0);
        assert_eq!(sales[0].discount, 5.0);

        let purchase = db.items().search_for_purchase("cap", 10).await.unwrap();
        assert_eq!(purchase[0].rate, 80.0);
        assert_eq!(purchase[0].discount, 0.0);
        assert_eq!(purchase[0].gst_rate, 18.0);
    }

    #[tokio::test]
    async fn test_list_filters_by_brand() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut a = item("A-1", "Alpha");
        a.brand = Some("Acme".to_string());
        let mut b = item("B-1", "Beta");
        b.brand = Some("Bolt".to_string());
        db.items().create(&a).await.unwrap();
        db.items().create(&b).await.unwrap();

        let filter = ItemFilter {
            brand: Some("Bolt".to_string()),
            ..Default::default()
        };
        let page = db.items().list(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Beta");
    }

    #[tokio::test]
    async fn test_labels_skip_items_without_sku() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tee = db.items().create(&item("TSH-1", "T-Shirt")).await.unwrap();
        let mut loose = item("", "Loose Thread");
        loose.sku = None;
        let loose = db.items().create(&loose).await.unwrap();

        let all = db.items().labels(&[]).await.unwrap();
        assert_eq!(all.len(), 1);

        let chosen = db.items().labels(&[tee.id, loose.id]).await.unwrap();
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].id, tee.id);
    }

    #[tokio::test]
    async fn test_low_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut low = item("LOW-1", "Low");
        low.stock_qty = 2.0;
        db.items().create(&low).await.unwrap();
        db.items().create(&item("OK-1", "Plenty")).await.unwrap();

        let rows = db.items().low_stock(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Low");
    }
}
