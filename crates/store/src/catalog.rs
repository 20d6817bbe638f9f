//! Generic product CRUD service over any [`ProductStore`] backend.
//!
//! Category names are normalized here (trimmed, lowercased) so the backends
//! can match on exact keys. Multi-item operations never stop at the first
//! failure: every item is attempted and the caller gets a per-item ledger.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use lapak_core::price::{apply_percent, format_rupiah, parse_digits};
use lapak_core::{CatalogError, ProductRecord};

use crate::{CategoryPolicy, ProductStore, SearchField, StoreError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Success,
    Failed,
}

/// One line of a batch ledger.
#[derive(Clone, Debug, Serialize)]
pub struct ItemOutcome {
    pub item: String,
    pub status: ItemStatus,
    pub detail: String,
}

impl ItemOutcome {
    fn success(item: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { item: item.into(), status: ItemStatus::Success, detail: detail.into() }
    }

    fn failed(item: impl Into<String>, detail: impl Into<String>) -> Self {
        Self { item: item.into(), status: ItemStatus::Failed, detail: detail.into() }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchOutcome {
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<ItemOutcome>,
}

impl BatchOutcome {
    fn from_items(items: Vec<ItemOutcome>) -> Self {
        let succeeded = items.iter().filter(|i| i.status == ItemStatus::Success).count();
        Self { succeeded, failed: items.len() - succeeded, items }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PriceAdjustment {
    pub name: String,
    pub old_price: String,
    pub new_price: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct CatalogStats {
    pub total_products: u64,
    pub per_category: Vec<CategoryCount>,
    pub most_recent: Vec<ProductRecord>,
}

pub struct CatalogService {
    store: Arc<dyn ProductStore>,
}

fn persistence(err: StoreError) -> CatalogError {
    CatalogError::Persistence(err.to_string())
}

fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

impl CatalogService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn list_categories(&self) -> Result<Vec<String>, CatalogError> {
        self.store.categories().await.map_err(persistence)
    }

    pub async fn list_products(&self, category: &str) -> Result<Vec<String>, CatalogError> {
        let records = self.list_products_with_prices(category).await?;
        Ok(records.into_iter().map(|record| record.name).collect())
    }

    pub async fn list_products_with_prices(
        &self,
        category: &str,
    ) -> Result<Vec<ProductRecord>, CatalogError> {
        let category = normalize_category(category);
        self.store
            .products_in(&category)
            .await
            .map_err(persistence)?
            .ok_or(CatalogError::CategoryNotFound(category))
    }

    pub async fn get_price(
        &self,
        category: &str,
        name: &str,
    ) -> Result<ProductRecord, CatalogError> {
        let category = normalize_category(category);
        let records = self
            .store
            .products_in(&category)
            .await
            .map_err(persistence)?
            .ok_or_else(|| CatalogError::CategoryNotFound(category.clone()))?;

        records.into_iter().find(|record| record.matches_name(name)).ok_or_else(|| {
            CatalogError::ProductNotFound { category, name: name.trim().to_string() }
        })
    }

    /// Adds a batch of products. `names` and `prices` are parallel lists.
    pub async fn add_products(
        &self,
        category: &str,
        names: &[String],
        prices: &[String],
    ) -> Result<BatchOutcome, CatalogError> {
        if names.len() != prices.len() {
            return Err(CatalogError::Validation(format!(
                "got {} product names but {} prices",
                names.len(),
                prices.len()
            )));
        }
        if names.is_empty() {
            return Err(CatalogError::Validation("no products were given".to_string()));
        }

        let category = normalize_category(category);
        let existing = self.store.products_in(&category).await.map_err(persistence)?;
        if existing.is_none() && self.store.category_policy() == CategoryPolicy::MustExist {
            return Err(CatalogError::CategoryNotFound(category));
        }

        let mut items = Vec::with_capacity(names.len());
        for (name, price) in names.iter().zip(prices) {
            let name = name.trim();
            if name.is_empty() {
                items.push(ItemOutcome::failed(name, "product name is empty"));
                continue;
            }

            if self.store.enforces_unique_names() {
                let taken = self
                    .store
                    .products_in(&category)
                    .await
                    .map_err(persistence)?
                    .is_some_and(|rows| rows.iter().any(|row| row.matches_name(name)));
                if taken {
                    items.push(ItemOutcome::failed(
                        name,
                        format!("'{name}' already exists in '{category}'"),
                    ));
                    continue;
                }
            }

            let record = ProductRecord {
                id: None,
                category: category.clone(),
                name: name.to_string(),
                retail_price: price.trim().to_string(),
                added_on: None,
            };
            match self.store.insert(record).await {
                Ok(inserted) => {
                    items.push(ItemOutcome::success(
                        name,
                        format!("added with price {}", inserted.retail_price),
                    ));
                }
                Err(err) => items.push(ItemOutcome::failed(name, err.to_string())),
            }
        }

        let outcome = BatchOutcome::from_items(items);
        info!(
            backend = self.store.backend_name(),
            %category,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "added products"
        );
        Ok(outcome)
    }

    /// Updates prices for a batch of existing products.
    pub async fn update_prices(
        &self,
        category: &str,
        names: &[String],
        prices: &[String],
    ) -> Result<BatchOutcome, CatalogError> {
        if names.len() != prices.len() {
            return Err(CatalogError::Validation(format!(
                "got {} product names but {} prices",
                names.len(),
                prices.len()
            )));
        }
        if names.is_empty() {
            return Err(CatalogError::Validation("no products were given".to_string()));
        }

        let category = normalize_category(category);
        if self.store.category_policy() == CategoryPolicy::MustExist
            && self.store.products_in(&category).await.map_err(persistence)?.is_none()
        {
            return Err(CatalogError::CategoryNotFound(category));
        }

        let mut items = Vec::with_capacity(names.len());
        for (name, price) in names.iter().zip(prices) {
            match self.store.update_price(&category, name, price.trim()).await {
                Ok(true) => {
                    items.push(ItemOutcome::success(
                        name.trim(),
                        format!("price updated to {}", price.trim()),
                    ));
                }
                Ok(false) => items.push(ItemOutcome::failed(
                    name.trim(),
                    format!("'{}' was not found in '{category}'", name.trim()),
                )),
                Err(err) => items.push(ItemOutcome::failed(name.trim(), err.to_string())),
            }
        }

        let outcome = BatchOutcome::from_items(items);
        info!(
            backend = self.store.backend_name(),
            %category,
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "updated prices"
        );
        Ok(outcome)
    }

    pub async fn rename_product(
        &self,
        category: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), CatalogError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(CatalogError::Validation("new product name is empty".to_string()));
        }

        let category = normalize_category(category);
        if self.store.enforces_unique_names() {
            let taken = self
                .store
                .products_in(&category)
                .await
                .map_err(persistence)?
                .is_some_and(|rows| {
                    rows.iter().any(|row| {
                        row.matches_name(new_name) && !row.matches_name(old_name)
                    })
                });
            if taken {
                return Err(CatalogError::Validation(format!(
                    "'{new_name}' already exists in '{category}'"
                )));
            }
        }

        let renamed =
            self.store.rename(&category, old_name, new_name).await.map_err(persistence)?;
        if !renamed {
            return Err(CatalogError::ProductNotFound {
                category,
                name: old_name.trim().to_string(),
            });
        }

        info!(backend = self.store.backend_name(), %category, old_name, new_name, "renamed product");
        Ok(())
    }

    /// Moves a product into another category, keeping its name and price.
    pub async fn move_product(
        &self,
        category: &str,
        name: &str,
        new_category: &str,
    ) -> Result<ProductRecord, CatalogError> {
        let from = normalize_category(category);
        let to = normalize_category(new_category);
        if from == to {
            return Err(CatalogError::Validation(format!(
                "product is already in category '{to}'"
            )));
        }

        let target = self.store.products_in(&to).await.map_err(persistence)?;
        if target.is_none() && self.store.category_policy() == CategoryPolicy::MustExist {
            return Err(CatalogError::CategoryNotFound(to));
        }
        if self.store.enforces_unique_names()
            && target.is_some_and(|rows| rows.iter().any(|row| row.matches_name(name)))
        {
            return Err(CatalogError::Validation(format!(
                "'{}' already exists in '{to}'",
                name.trim()
            )));
        }

        let removed = self
            .store
            .delete(&from, name)
            .await
            .map_err(persistence)?
            .ok_or_else(|| CatalogError::ProductNotFound {
                category: from.clone(),
                name: name.trim().to_string(),
            })?;

        let relocated = ProductRecord {
            id: None,
            category: to.clone(),
            name: removed.name.clone(),
            retail_price: removed.retail_price.clone(),
            added_on: removed.added_on.clone(),
        };
        match self.store.insert(relocated).await {
            Ok(moved) => {
                info!(
                    backend = self.store.backend_name(),
                    %from,
                    %to,
                    name = %moved.name,
                    "moved product"
                );
                Ok(moved)
            }
            Err(err) => {
                // Best effort: put the row back where it came from.
                let _ = self.store.insert(removed).await;
                Err(persistence(err))
            }
        }
    }

    pub async fn delete_product(
        &self,
        category: &str,
        name: &str,
    ) -> Result<ProductRecord, CatalogError> {
        let category = normalize_category(category);
        let removed = self.store.delete(&category, name).await.map_err(persistence)?;

        match removed {
            Some(record) => {
                info!(backend = self.store.backend_name(), %category, name = %record.name, "deleted product");
                Ok(record)
            }
            None => Err(CatalogError::ProductNotFound {
                category,
                name: name.trim().to_string(),
            }),
        }
    }

    /// Removes every product in a category. Zero matches is reported as
    /// NotFound rather than a silent no-op.
    pub async fn delete_category(&self, category: &str) -> Result<u64, CatalogError> {
        let category = normalize_category(category);
        let removed = self.store.delete_category(&category).await.map_err(persistence)?;

        if removed == 0 {
            return Err(CatalogError::CategoryNotFound(category));
        }

        info!(backend = self.store.backend_name(), %category, removed, "deleted category");
        Ok(removed)
    }

    /// Mass-adjusts every price in a category by a percentage. Prices with no
    /// parsable digits are left untouched and omitted from the ledger. The
    /// arithmetic truncates toward zero, it does not round.
    pub async fn adjust_prices_by_percent(
        &self,
        category: &str,
        percent: f64,
    ) -> Result<Vec<PriceAdjustment>, CatalogError> {
        if !percent.is_finite() {
            return Err(CatalogError::Validation("percentage must be a finite number".to_string()));
        }

        let category = normalize_category(category);
        let records = self
            .store
            .products_in(&category)
            .await
            .map_err(persistence)?
            .ok_or_else(|| CatalogError::CategoryNotFound(category.clone()))?;

        let mut adjustments = Vec::new();
        for record in records {
            let Some(amount) = parse_digits(&record.retail_price) else {
                continue;
            };
            let new_price = format_rupiah(apply_percent(amount, percent));

            if self
                .store
                .update_price(&category, &record.name, &new_price)
                .await
                .map_err(persistence)?
            {
                adjustments.push(PriceAdjustment {
                    name: record.name,
                    old_price: record.retail_price,
                    new_price,
                });
            }
        }

        info!(
            backend = self.store.backend_name(),
            %category,
            percent,
            adjusted = adjustments.len(),
            "adjusted prices"
        );
        Ok(adjustments)
    }

    pub async fn search_products(
        &self,
        field: &str,
        keyword: &str,
    ) -> Result<Vec<ProductRecord>, CatalogError> {
        let field = SearchField::parse(field).ok_or_else(|| {
            CatalogError::Validation(format!(
                "unknown search field '{field}' (expected {})",
                SearchField::ALLOWED
            ))
        })?;

        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(CatalogError::Validation("search keyword is empty".to_string()));
        }

        self.store.search(field, keyword).await.map_err(persistence)
    }

    pub async fn list_all(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<ProductRecord>, CatalogError> {
        self.store.all_products(limit, offset).await.map_err(persistence)
    }

    pub async fn catalog_stats(&self) -> Result<CatalogStats, CatalogError> {
        let all = self.store.all_products(None, None).await.map_err(persistence)?;

        let mut per_category: Vec<CategoryCount> = Vec::new();
        for record in &all {
            match per_category.iter_mut().find(|c| c.category == record.category) {
                Some(entry) => entry.count += 1,
                None => per_category
                    .push(CategoryCount { category: record.category.clone(), count: 1 }),
            }
        }
        per_category.sort_by(|a, b| a.category.cmp(&b.category));

        let most_recent = all.iter().rev().take(5).cloned().collect();

        Ok(CatalogStats { total_products: all.len() as u64, per_category, most_recent })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lapak_core::{CatalogError, ProductRecord};

    use super::{CatalogService, ItemStatus};
    use crate::json::JsonFileStore;
    use crate::memory::InMemoryStore;
    use crate::ProductStore;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    async fn seeded_service() -> CatalogService {
        let store = InMemoryStore::new();
        store.seed_category("jenis rokok");
        store.seed_category("produk makanan");
        let service = CatalogService::new(Arc::new(store));

        service
            .add_products(
                "jenis rokok",
                &strings(&["GA Bold", "Surya 12"]),
                &strings(&["Rp.13.000", "Rp.21.000"]),
            )
            .await
            .expect("seed rokok");
        service
            .add_products("produk makanan", &strings(&["Indomie Goreng"]), &strings(&["Rp.3.500"]))
            .await
            .expect("seed makanan");
        service
    }

    #[tokio::test]
    async fn listing_an_unknown_category_is_not_found() {
        let service = seeded_service().await;
        let error = service.list_products("alat tulis").await.expect_err("unknown category");
        assert_eq!(error, CatalogError::CategoryNotFound("alat tulis".to_string()));
    }

    #[tokio::test]
    async fn category_names_are_normalized_before_lookup() {
        let service = seeded_service().await;
        let names = service.list_products("  JENIS ROKOK  ").await.expect("list");
        assert_eq!(names, vec!["GA Bold".to_string(), "Surya 12".to_string()]);
    }

    #[tokio::test]
    async fn get_price_matches_product_names_case_insensitively() {
        let service = seeded_service().await;

        let record = service.get_price("jenis rokok", "ga bold").await.expect("get price");
        assert_eq!(record.retail_price, "Rp.13.000");

        let error = service.get_price("jenis rokok", "missing").await.expect_err("missing");
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn add_with_mismatched_lists_fails_whole_call() {
        let service = seeded_service().await;
        let error = service
            .add_products("jenis rokok", &strings(&["A", "B"]), &strings(&["Rp.1.000"]))
            .await
            .expect_err("length mismatch");
        assert_eq!(error.error_class(), "validation");
    }

    #[tokio::test]
    async fn add_into_unknown_category_fails_under_must_exist_policy() {
        let service = seeded_service().await;
        let error = service
            .add_products("alat tulis", &strings(&["Pulpen"]), &strings(&["Rp.2.000"]))
            .await
            .expect_err("unknown category");
        assert_eq!(error, CatalogError::CategoryNotFound("alat tulis".to_string()));
    }

    #[tokio::test]
    async fn duplicate_in_batch_fails_that_item_but_not_the_rest() {
        let service = seeded_service().await;

        let outcome = service
            .add_products(
                "jenis rokok",
                &strings(&["GA BOLD", "Sampoerna Mild"]),
                &strings(&["Rp.13.000", "Rp.29.000"]),
            )
            .await
            .expect("batch add");

        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.items[0].status, ItemStatus::Failed);
        assert!(outcome.items[0].detail.contains("already exists"));
        assert_eq!(outcome.items[1].status, ItemStatus::Success);

        let names = service.list_products("jenis rokok").await.expect("list");
        assert!(names.contains(&"Sampoerna Mild".to_string()));
    }

    #[tokio::test]
    async fn update_batch_reports_misses_without_aborting() {
        let service = seeded_service().await;

        let outcome = service
            .update_prices(
                "jenis rokok",
                &strings(&["missing", "GA Bold"]),
                &strings(&["Rp.1", "Rp.14.000"]),
            )
            .await
            .expect("batch update");

        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.succeeded, 1);

        let record = service.get_price("jenis rokok", "GA Bold").await.expect("get");
        assert_eq!(record.retail_price, "Rp.14.000");
    }

    #[tokio::test]
    async fn rename_rejects_a_name_that_is_already_taken() {
        let service = seeded_service().await;

        let error = service
            .rename_product("jenis rokok", "GA Bold", "Surya 12")
            .await
            .expect_err("collision");
        assert_eq!(error.error_class(), "validation");

        service.rename_product("jenis rokok", "GA Bold", "GA Bold Filter").await.expect("rename");
        let names = service.list_products("jenis rokok").await.expect("list");
        assert!(names.contains(&"GA Bold Filter".to_string()));
    }

    #[tokio::test]
    async fn rename_to_a_casing_variant_of_itself_is_allowed() {
        let service = seeded_service().await;
        service.rename_product("jenis rokok", "GA Bold", "ga bold").await.expect("self rename");
    }

    #[tokio::test]
    async fn delete_returns_the_record_and_second_delete_is_not_found() {
        let service = seeded_service().await;

        let removed = service.delete_product("jenis rokok", "ga bold").await.expect("delete");
        assert_eq!(removed.name, "GA Bold");

        let error = service.delete_product("jenis rokok", "ga bold").await.expect_err("repeat");
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn delete_category_reports_count_and_empty_is_not_found() {
        let service = seeded_service().await;

        assert_eq!(service.delete_category("jenis rokok").await.expect("delete"), 2);
        let error = service.delete_category("jenis rokok").await.expect_err("repeat");
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn percent_adjustment_truncates_and_skips_unparsable_prices() {
        let service = seeded_service().await;
        service
            .add_products("produk makanan", &strings(&["Misteri"]), &strings(&["harga menyusul"]))
            .await
            .expect("add unparsable");

        let adjustments =
            service.adjust_prices_by_percent("produk makanan", 10.0).await.expect("adjust");

        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].name, "Indomie Goreng");
        assert_eq!(adjustments[0].old_price, "Rp.3.500");
        assert_eq!(adjustments[0].new_price, "Rp.3.850");

        let untouched = service.get_price("produk makanan", "Misteri").await.expect("get");
        assert_eq!(untouched.retail_price, "harga menyusul");
    }

    #[tokio::test]
    async fn search_rejects_unknown_fields_but_finds_substrings() {
        let service = seeded_service().await;

        let error = service.search_products("description", "x").await.expect_err("bad field");
        assert_eq!(error.error_class(), "validation");

        let hits = service.search_products("name", "surya").await.expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Surya 12");
    }

    #[tokio::test]
    async fn move_product_relocates_between_categories() {
        let service = seeded_service().await;

        let moved =
            service.move_product("jenis rokok", "ga bold", "Produk Makanan").await.expect("move");
        assert_eq!(moved.category, "produk makanan");
        assert_eq!(moved.retail_price, "Rp.13.000");

        let gone = service.get_price("jenis rokok", "GA Bold").await.expect_err("moved out");
        assert!(gone.is_not_found());
        let there = service.get_price("produk makanan", "GA Bold").await.expect("moved in");
        assert_eq!(there.retail_price, "Rp.13.000");
    }

    #[tokio::test]
    async fn move_product_rejects_unknown_targets_and_name_collisions() {
        let service = seeded_service().await;

        let error = service
            .move_product("jenis rokok", "GA Bold", "alat tulis")
            .await
            .expect_err("unknown target");
        assert_eq!(error, CatalogError::CategoryNotFound("alat tulis".to_string()));

        service
            .add_products("produk makanan", &strings(&["GA Bold"]), &strings(&["Rp.13.000"]))
            .await
            .expect("seed collision");
        let error = service
            .move_product("jenis rokok", "GA Bold", "produk makanan")
            .await
            .expect_err("collision");
        assert_eq!(error.error_class(), "validation");

        let error = service
            .move_product("jenis rokok", "Surya 12", "jenis rokok")
            .await
            .expect_err("same category");
        assert_eq!(error.error_class(), "validation");
    }

    #[tokio::test]
    async fn failed_store_write_is_persistence_not_not_found() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let json_store = JsonFileStore::new(dir.path().join("retail_data.json"));
        json_store
            .insert(ProductRecord {
                id: None,
                category: "jenis rokok".to_string(),
                name: "GA Bold".to_string(),
                retail_price: "Rp.13.000".to_string(),
                added_on: None,
            })
            .await
            .expect("seed");

        // A directory squatting on the staging path makes every write fail.
        std::fs::create_dir(dir.path().join("retail_data.tmp")).expect("block staging path");

        let service = CatalogService::new(Arc::new(json_store));
        let error =
            service.delete_product("jenis rokok", "GA Bold").await.expect_err("write fails");
        assert_eq!(error.error_class(), "persistence");
        assert!(!error.is_not_found());

        // The product survived the failed delete and is still readable.
        let record = service.get_price("jenis rokok", "GA Bold").await.expect("still there");
        assert_eq!(record.retail_price, "Rp.13.000");
    }

    #[tokio::test]
    async fn stats_count_products_per_category() {
        let service = seeded_service().await;
        let stats = service.catalog_stats().await.expect("stats");

        assert_eq!(stats.total_products, 3);
        assert_eq!(stats.per_category.len(), 2);
        let rokok = stats
            .per_category
            .iter()
            .find(|c| c.category == "jenis rokok")
            .expect("rokok bucket");
        assert_eq!(rokok.count, 2);
        assert!(stats.most_recent.len() <= 5);
    }
}
