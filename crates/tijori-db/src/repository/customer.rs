//! # Customer Repository
//!
//! CRUD, filtered listing and JSON search for customers.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::listing::ListQuery;
use crate::error::{DbError, DbResult};
use tijori_core::validation::{
    clean_optional, validate_email, validate_name, validate_search_query, validate_status,
};
use tijori_core::{Customer, NewCustomer, Page, PageRequest, PartySearchHit};

const COLUMNS: &str = "id, name, email, mobile, phone, address, city, pincode, state, \
                       country, notes, status, created_at, updated_at";

/// List filters: free text over name/email/mobile/phone, exact city and status.
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub q: Option<String>,
    pub city: Option<String>,
    pub status: Option<String>,
}

/// A customer payload after validation.
struct CleanCustomer {
    name: String,
    email: Option<String>,
    mobile: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    pincode: Option<String>,
    state: Option<String>,
    country: Option<String>,
    notes: Option<String>,
    status: String,
}

impl CleanCustomer {
    fn from_input(input: &NewCustomer) -> DbResult<Self> {
        Ok(CleanCustomer {
            name: validate_name("name", &input.name)?,
            email: validate_email(input.email.as_deref())?,
            mobile: clean_optional(input.mobile.as_deref()),
            phone: clean_optional(input.phone.as_deref()),
            address: clean_optional(input.address.as_deref()),
            city: clean_optional(input.city.as_deref()),
            pincode: clean_optional(input.pincode.as_deref()),
            state: clean_optional(input.state.as_deref()),
            country: clean_optional(input.country.as_deref()),
            notes: clean_optional(input.notes.as_deref()),
            status: validate_status(input.status.as_deref())?,
        })
    }
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a customer and returns the stored row.
    pub async fn create(&self, input: &NewCustomer) -> DbResult<Customer> {
        let c = CleanCustomer::from_input(input)?;
        debug!(name = %c.name, "Creating customer");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO customers (name, email, mobile, phone, address, city, pincode, \
             state, country, notes, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        );
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(&c.name)
            .bind(&c.email)
            .bind(&c.mobile)
            .bind(&c.phone)
            .bind(&c.address)
            .bind(&c.city)
            .bind(&c.pincode)
            .bind(&c.state)
            .bind(&c.country)
            .bind(&c.notes)
            .bind(&c.status)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(customer)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {COLUMNS} FROM customers WHERE id = ?");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    /// Replaces every editable field.
    pub async fn update(&self, id: i64, input: &NewCustomer) -> DbResult<Customer> {
        let c = CleanCustomer::from_input(input)?;
        debug!(id, name = %c.name, "Updating customer");

        let sql = format!(
            "UPDATE customers SET name = ?, email = ?, mobile = ?, phone = ?, address = ?, \
             city = ?, pincode = ?, state = ?, country = ?, notes = ?, status = ?, \
             updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&sql)
            .bind(&c.name)
            .bind(&c.email)
            .bind(&c.mobile)
            .bind(&c.phone)
            .bind(&c.address)
            .bind(&c.city)
            .bind(&c.pincode)
            .bind(&c.state)
            .bind(&c.country)
            .bind(&c.notes)
            .bind(&c.status)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes a customer. Fails with a foreign key violation while any
    /// document still references it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }
        Ok(())
    }

    /// Filtered page, ordered by name.
    pub async fn list(
        &self,
        filter: &CustomerFilter,
        page: PageRequest,
    ) -> DbResult<Page<Customer>> {
        ListQuery::new("customers", COLUMNS, "name, id")
            .search(&["name", "email", "mobile", "phone"], filter.q.as_deref())
            .filter("city", filter.city.as_deref())
            .filter("status", filter.status.as_deref())
            .fetch_page(&self.pool, page)
            .await
    }

    /// Every customer, ordered by name.
    pub async fn all(&self) -> DbResult<Vec<Customer>> {
        ListQuery::new("customers", COLUMNS, "name, id")
            .fetch_all(&self.pool)
            .await
    }

    /// Compact hits for counterparty pickers.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<PartySearchHit>> {
        let query = validate_search_query(query)?;
        let pattern = format!("%{query}%");

        let hits = sqlx::query_as::<_, PartySearchHit>(
            "SELECT id, name, email, COALESCE(mobile, phone) AS phone FROM customers \
             WHERE name LIKE ?1 OR email LIKE ?1 OR mobile LIKE ?1 OR phone LIKE ?1 \
             ORDER BY name, id LIMIT ?2",
        )
        .bind(&pattern)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        debug!(query = %query, count = hits.len(), "Customer search");
        Ok(hits)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn customer(name: &str, city: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            city: Some(city.to_string()),
            mobile: Some("98200 00000".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let created = repo.create(&customer("  Kiran Stores ", "Pune")).await.unwrap();
        assert_eq!(created.name, "Kiran Stores");
        assert_eq!(created.status, "active");

        let mut edit = customer("Kiran Stores Pvt", "Mumbai");
        edit.status = Some("inactive".to_string());
        let updated = repo.update(created.id, &edit).await.unwrap();
        assert_eq!(updated.city.as_deref(), Some("Mumbai"));
        assert_eq!(updated.status, "inactive");

        repo.delete(created.id).await.unwrap();
        assert!(repo.get(created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(created.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_validation_rejects_blank_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db.customers().create(&customer("  ", "Pune")).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(db.customers().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_and_search() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();
        for (name, city) in [("Zoya", "Pune"), ("Amit", "Pune"), ("Farah", "Delhi")] {
            repo.create(&customer(name, city)).await.unwrap();
        }

        let filter = CustomerFilter {
            city: Some("Pune".to_string()),
            ..Default::default()
        };
        let page = repo.list(&filter, PageRequest::default()).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Amit", "Zoya"]);

        let hits = repo.search("far", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].phone.as_deref(), Some("98200 00000"));
    }
}
