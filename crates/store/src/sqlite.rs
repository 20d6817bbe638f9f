//! Sqlite backend over the `retail_products` table.
//!
//! Columns keep the Indonesian names the JSON file uses in spirit:
//! `nama_produk`, `harga_encer`, `type_produk`, `tanggal_ditambah`. Each
//! operation is a single statement; there are no multi-statement
//! transactions, so two writers racing on the same product can interleave.
//! WAL mode plus the busy timeout in the pool keeps that safe at the
//! statement level.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use lapak_core::ProductRecord;

use crate::{CategoryPolicy, DbPool, ProductStore, SearchField, StoreError};

pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: SqliteRow) -> Result<ProductRecord, StoreError> {
    Ok(ProductRecord {
        id: Some(row.try_get::<i64, _>("id")?),
        category: row.try_get::<String, _>("type_produk")?,
        name: row.try_get::<String, _>("nama_produk")?,
        retail_price: row.try_get::<String, _>("harga_encer")?,
        added_on: Some(row.try_get::<String, _>("tanggal_ditambah")?),
    })
}

const SELECT_COLUMNS: &str =
    "SELECT id, nama_produk, harga_encer, type_produk, tanggal_ditambah FROM retail_products";

#[async_trait]
impl ProductStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn category_policy(&self) -> CategoryPolicy {
        CategoryPolicy::CreateImplicitly
    }

    fn enforces_unique_names(&self) -> bool {
        false
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT LOWER(type_produk) AS category
             FROM retail_products
             ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.try_get::<String, _>("category").map_err(StoreError::from))
            .collect()
    }

    async fn products_in(&self, category: &str) -> Result<Option<Vec<ProductRecord>>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE LOWER(type_produk) = LOWER(?) ORDER BY id"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(None);
        }
        rows.into_iter().map(record_from_row).collect::<Result<Vec<_>, _>>().map(Some)
    }

    async fn all_products(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        // sqlite requires a LIMIT clause before OFFSET; -1 means unbounded.
        let limit = limit.map(i64::from).unwrap_or(-1);
        let offset = i64::from(offset.unwrap_or(0));

        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY id LIMIT ? OFFSET ?"))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(record_from_row).collect()
    }

    async fn search(
        &self,
        field: SearchField,
        keyword: &str,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        // The column name comes from the SearchField enum, never from input.
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE {} LIKE ? ORDER BY id",
            field.column()
        ))
        .bind(format!("%{}%", keyword.trim()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(record_from_row).collect()
    }

    async fn insert(&self, record: ProductRecord) -> Result<ProductRecord, StoreError> {
        let added_on = record
            .added_on
            .clone()
            .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string());

        let result = sqlx::query(
            "INSERT INTO retail_products (nama_produk, harga_encer, type_produk, tanggal_ditambah)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&record.name)
        .bind(&record.retail_price)
        .bind(&record.category)
        .bind(&added_on)
        .execute(&self.pool)
        .await?;

        Ok(ProductRecord {
            id: Some(result.last_insert_rowid()),
            added_on: Some(added_on),
            ..record
        })
    }

    async fn update_price(
        &self,
        category: &str,
        name: &str,
        new_price: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE retail_products
             SET harga_encer = ?
             WHERE LOWER(type_produk) = LOWER(?) AND LOWER(nama_produk) = LOWER(?)",
        )
        .bind(new_price)
        .bind(category)
        .bind(name.trim())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn rename(
        &self,
        category: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE retail_products
             SET nama_produk = ?
             WHERE LOWER(type_produk) = LOWER(?) AND LOWER(nama_produk) = LOWER(?)",
        )
        .bind(new_name.trim())
        .bind(category)
        .bind(old_name.trim())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(
        &self,
        category: &str,
        name: &str,
    ) -> Result<Option<ProductRecord>, StoreError> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS}
             WHERE LOWER(type_produk) = LOWER(?) AND LOWER(nama_produk) = LOWER(?)
             ORDER BY id LIMIT 1"
        ))
        .bind(category)
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let record = record_from_row(row)?;

        sqlx::query("DELETE FROM retail_products WHERE id = ?")
            .bind(record.id)
            .execute(&self.pool)
            .await?;

        Ok(Some(record))
    }

    async fn delete_category(&self, category: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM retail_products WHERE LOWER(type_produk) = LOWER(?)")
            .bind(category)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
