pub mod catalog;
pub mod connection;
pub mod fixtures;
pub mod json;
pub mod memory;
pub mod migrations;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use lapak_core::ProductRecord;

pub use catalog::{
    BatchOutcome, CatalogService, CatalogStats, CategoryCount, ItemOutcome, ItemStatus,
    PriceAdjustment,
};
pub use connection::{connect, connect_with_settings, DbPool};
pub use json::JsonFileStore;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read store data: {0}")]
    Read(String),
    #[error("could not write store data: {0}")]
    Write(String),
    #[error("store data is malformed: {0}")]
    Malformed(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// How a backend treats a category name it has never seen on insert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryPolicy {
    /// Inserts into an unknown category are rejected.
    MustExist,
    /// An unknown category springs into existence with its first product.
    CreateImplicitly,
}

/// Searchable columns. A fixed enum rather than a free string so the sqlite
/// backend never interpolates caller input into SQL identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Price,
    Category,
}

impl SearchField {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "name" | "nama_produk" => Some(Self::Name),
            "price" | "harga_encer" => Some(Self::Price),
            "category" | "type_produk" => Some(Self::Category),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "nama_produk",
            Self::Price => "harga_encer",
            Self::Category => "type_produk",
        }
    }

    pub const ALLOWED: &'static str = "name|price|category";
}

/// Storage contract shared by the JSON file, sqlite, and in-memory backends.
///
/// Category arguments are expected pre-normalized (trimmed, lowercase); the
/// catalog service owns that normalization. Product name matching inside a
/// category is case-insensitive in every backend. `products_in` distinguishes
/// an absent category (`None`) from an empty one (`Some(vec![])`).
#[async_trait]
pub trait ProductStore: Send + Sync {
    fn backend_name(&self) -> &'static str;
    fn category_policy(&self) -> CategoryPolicy;
    fn enforces_unique_names(&self) -> bool;

    async fn categories(&self) -> Result<Vec<String>, StoreError>;
    async fn products_in(&self, category: &str) -> Result<Option<Vec<ProductRecord>>, StoreError>;
    async fn all_products(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<ProductRecord>, StoreError>;
    async fn search(&self, field: SearchField, keyword: &str)
        -> Result<Vec<ProductRecord>, StoreError>;

    async fn insert(&self, record: ProductRecord) -> Result<ProductRecord, StoreError>;
    async fn update_price(
        &self,
        category: &str,
        name: &str,
        new_price: &str,
    ) -> Result<bool, StoreError>;
    async fn rename(
        &self,
        category: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<bool, StoreError>;
    async fn delete(&self, category: &str, name: &str)
        -> Result<Option<ProductRecord>, StoreError>;
    async fn delete_category(&self, category: &str) -> Result<u64, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::SearchField;

    #[test]
    fn search_fields_accept_friendly_and_column_spellings() {
        assert_eq!(SearchField::parse("name"), Some(SearchField::Name));
        assert_eq!(SearchField::parse("NAMA_PRODUK"), Some(SearchField::Name));
        assert_eq!(SearchField::parse(" price "), Some(SearchField::Price));
        assert_eq!(SearchField::parse("type_produk"), Some(SearchField::Category));
        assert_eq!(SearchField::parse("description"), None);
    }

    #[test]
    fn search_fields_map_to_fixed_columns() {
        assert_eq!(SearchField::Name.column(), "nama_produk");
        assert_eq!(SearchField::Price.column(), "harga_encer");
        assert_eq!(SearchField::Category.column(), "type_produk");
    }
}
