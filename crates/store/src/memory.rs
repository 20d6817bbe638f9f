//! In-memory store used by service and adapter tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use lapak_core::ProductRecord;

use crate::{CategoryPolicy, ProductStore, SearchField, StoreError};

pub struct InMemoryStore {
    state: Mutex<State>,
    policy: CategoryPolicy,
    unique_names: bool,
}

struct State {
    categories: BTreeMap<String, Vec<ProductRecord>>,
    next_id: i64,
}

impl InMemoryStore {
    /// JSON file semantics: categories must pre-exist, names are unique.
    pub fn new() -> Self {
        Self::with_semantics(CategoryPolicy::MustExist, true)
    }

    /// Sqlite semantics: implicit categories, duplicate names allowed.
    pub fn with_sql_semantics() -> Self {
        Self::with_semantics(CategoryPolicy::CreateImplicitly, false)
    }

    fn with_semantics(policy: CategoryPolicy, unique_names: bool) -> Self {
        Self {
            state: Mutex::new(State { categories: BTreeMap::new(), next_id: 1 }),
            policy,
            unique_names,
        }
    }

    /// Creates an empty category so MustExist semantics can be exercised.
    pub fn seed_category(&self, category: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.categories.entry(category.to_string()).or_default();
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Write("store mutex is poisoned".to_string()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn position(rows: &[ProductRecord], name: &str) -> Option<usize> {
    rows.iter().position(|row| row.matches_name(name))
}

#[async_trait]
impl ProductStore for InMemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn category_policy(&self) -> CategoryPolicy {
        self.policy
    }

    fn enforces_unique_names(&self) -> bool {
        self.unique_names
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.categories.keys().cloned().collect())
    }

    async fn products_in(&self, category: &str) -> Result<Option<Vec<ProductRecord>>, StoreError> {
        Ok(self.lock()?.categories.get(category).cloned())
    }

    async fn all_products(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let state = self.lock()?;
        let flattened = state.categories.values().flatten().cloned();
        let skipped = flattened.skip(offset.unwrap_or(0) as usize);
        Ok(match limit {
            Some(limit) => skipped.take(limit as usize).collect(),
            None => skipped.collect(),
        })
    }

    async fn search(
        &self,
        field: SearchField,
        keyword: &str,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let needle = keyword.trim().to_lowercase();
        let state = self.lock()?;
        Ok(state
            .categories
            .values()
            .flatten()
            .filter(|record| {
                let haystack = match field {
                    SearchField::Name => &record.name,
                    SearchField::Price => &record.retail_price,
                    SearchField::Category => &record.category,
                };
                haystack.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn insert(&self, record: ProductRecord) -> Result<ProductRecord, StoreError> {
        let mut state = self.lock()?;
        let id = state.next_id;
        state.next_id += 1;

        let stored = ProductRecord { id: Some(id), ..record };
        state.categories.entry(stored.category.clone()).or_default().push(stored.clone());
        Ok(stored)
    }

    async fn update_price(
        &self,
        category: &str,
        name: &str,
        new_price: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        let Some(rows) = state.categories.get_mut(category) else {
            return Ok(false);
        };
        let Some(index) = position(rows, name) else {
            return Ok(false);
        };
        rows[index].retail_price = new_price.to_string();
        Ok(true)
    }

    async fn rename(
        &self,
        category: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        let Some(rows) = state.categories.get_mut(category) else {
            return Ok(false);
        };
        let Some(index) = position(rows, old_name) else {
            return Ok(false);
        };
        rows[index].name = new_name.trim().to_string();
        Ok(true)
    }

    async fn delete(
        &self,
        category: &str,
        name: &str,
    ) -> Result<Option<ProductRecord>, StoreError> {
        let mut state = self.lock()?;
        let Some(rows) = state.categories.get_mut(category) else {
            return Ok(None);
        };
        let Some(index) = position(rows, name) else {
            return Ok(None);
        };
        Ok(Some(rows.remove(index)))
    }

    async fn delete_category(&self, category: &str) -> Result<u64, StoreError> {
        let mut state = self.lock()?;
        Ok(state.categories.remove(category).map(|rows| rows.len() as u64).unwrap_or(0))
    }
}
