//! # Supplier Repository

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::listing::ListQuery;
use crate::error::{DbError, DbResult};
use tijori_core::validation::{
    clean_optional, validate_email, validate_name, validate_search_query, validate_status,
};
use tijori_core::{NewSupplier, Page, PageRequest, PartySearchHit, Supplier};

const COLUMNS: &str = "id, name, contact_person, email, phone, mobile, address, city, state, \
                       pincode, gstin, gst_type, status, created_at, updated_at";

/// GST registration type assumed when none is given.
pub const DEFAULT_GST_TYPE: &str = "regular";

#[derive(Debug, Clone, Default)]
pub struct SupplierFilter {
    pub q: Option<String>,
    pub status: Option<String>,
}

struct CleanSupplier {
    name: String,
    contact_person: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    mobile: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    pincode: Option<String>,
    gstin: Option<String>,
    gst_type: String,
    status: String,
}

impl CleanSupplier {
    fn from_input(input: &NewSupplier) -> DbResult<Self> {
        Ok(CleanSupplier {
            name: validate_name("name", &input.name)?,
            contact_person: clean_optional(input.contact_person.as_deref()),
            email: validate_email(input.email.as_deref())?,
            phone: clean_optional(input.phone.as_deref()),
            mobile: clean_optional(input.mobile.as_deref()),
            address: clean_optional(input.address.as_deref()),
            city: clean_optional(input.city.as_deref()),
            state: clean_optional(input.state.as_deref()),
            pincode: clean_optional(input.pincode.as_deref()),
            gstin: clean_optional(input.gstin.as_deref()).map(|g| g.to_ascii_uppercase()),
            gst_type: clean_optional(input.gst_type.as_deref())
                .map(|g| g.to_ascii_lowercase())
                .unwrap_or_else(|| DEFAULT_GST_TYPE.to_string()),
            status: validate_status(input.status.as_deref())?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn create(&self, input: &NewSupplier) -> DbResult<Supplier> {
        let s = CleanSupplier::from_input(input)?;
        debug!(name = %s.name, "Creating supplier");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO suppliers (name, contact_person, email, phone, mobile, address, \
             city, state, pincode, gstin, gst_type, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        );
        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(&s.name)
            .bind(&s.contact_person)
            .bind(&s.email)
            .bind(&s.phone)
            .bind(&s.mobile)
            .bind(&s.address)
            .bind(&s.city)
            .bind(&s.state)
            .bind(&s.pincode)
            .bind(&s.gstin)
            .bind(&s.gst_type)
            .bind(&s.status)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(supplier)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Supplier>> {
        let sql = format!("SELECT {COLUMNS} FROM suppliers WHERE id = ?");
        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(supplier)
    }

    /// Exact (case-insensitive) name lookup; used by imports to upsert.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Supplier>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM suppliers WHERE name = ? COLLATE NOCASE ORDER BY id LIMIT 1"
        );
        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(supplier)
    }

    pub async fn update(&self, id: i64, input: &NewSupplier) -> DbResult<Supplier> {
        let s = CleanSupplier::from_input(input)?;
        debug!(id, name = %s.name, "Updating supplier");

        let sql = format!(
            "UPDATE suppliers SET name = ?, contact_person = ?, email = ?, phone = ?, \
             mobile = ?, address = ?, city = ?, state = ?, pincode = ?, gstin = ?, \
             gst_type = ?, status = ?, updated_at = ? WHERE id = ? RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Supplier>(&sql)
            .bind(&s.name)
            .bind(&s.contact_person)
            .bind(&s.email)
            .bind(&s.phone)
            .bind(&s.mobile)
            .bind(&s.address)
            .bind(&s.city)
            .bind(&s.state)
            .bind(&s.pincode)
            .bind(&s.gstin)
            .bind(&s.gst_type)
            .bind(&s.status)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting supplier");

        let result = sqlx::query("DELETE FROM suppliers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        filter: &SupplierFilter,
        page: PageRequest,
    ) -> DbResult<Page<Supplier>> {
        ListQuery::new("suppliers", COLUMNS, "name, id")
            .search(
                &["name", "contact_person", "email", "phone", "gstin", "city"],
                filter.q.as_deref(),
            )
            .filter("status", filter.status.as_deref())
            .fetch_page(&self.pool, page)
            .await
    }

    pub async fn all(&self) -> DbResult<Vec<Supplier>> {
        ListQuery::new("suppliers", COLUMNS, "name, id")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<PartySearchHit>> {
        let query = validate_search_query(query)?;
        let pattern = format!("%{query}%");

        let hits = sqlx::query_as::<_, PartySearchHit>(
            "SELECT id, name, email, COALESCE(phone, mobile) AS phone FROM suppliers \
             WHERE name LIKE ?1 OR email LIKE ?1 OR phone LIKE ?1 OR gstin LIKE ?1 \
             ORDER BY name, id LIMIT ?2",
        )
        .bind(&pattern)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        debug!(query = %query, count = hits.len(), "Supplier search");
        Ok(hits)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
