//! JSON file backend.
//!
//! The data file is a single object keyed by lowercase category name, each
//! value a list of rows shaped `{"nama produk": ..., "harga encer": ...}`.
//! Every mutation reloads the file, applies the change in memory, and
//! rewrites the whole file; reads reload too, so out-of-band edits to the
//! file are picked up on the next call. A process-wide mutex serializes the
//! load-mutate-persist cycle, which makes concurrent tasks in one process
//! safe. Two processes writing the same file can still lose updates; the
//! deployment assumption is a single writer process.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lapak_core::ProductRecord;

use crate::{CategoryPolicy, ProductStore, SearchField, StoreError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct JsonProductRow {
    #[serde(rename = "nama produk")]
    name: String,
    #[serde(rename = "harga encer")]
    retail_price: String,
}

type StoreMap = BTreeMap<String, Vec<JsonProductRow>>;

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file reads as an empty catalog; the first mutation creates it.
    fn load(&self) -> Result<StoreMap, StoreError> {
        if !self.path.exists() {
            return Ok(StoreMap::new());
        }

        let raw = fs::read_to_string(&self.path)
            .map_err(|err| StoreError::Read(format!("{}: {err}", self.path.display())))?;

        serde_json::from_str(&raw)
            .map_err(|err| StoreError::Malformed(format!("{}: {err}", self.path.display())))
    }

    /// Writes go through a staging file in the same directory followed by a
    /// rename, so an interrupted write leaves the last persisted state on
    /// disk instead of a truncated file.
    fn persist(&self, map: &StoreMap) -> Result<(), StoreError> {
        let rendered = serde_json::to_string_pretty(map)
            .map_err(|err| StoreError::Write(err.to_string()))?;

        let staging = self.path.with_extension("tmp");
        fs::write(&staging, rendered)
            .map_err(|err| StoreError::Write(format!("{}: {err}", staging.display())))?;
        fs::rename(&staging, &self.path)
            .map_err(|err| StoreError::Write(format!("{}: {err}", self.path.display())))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Write("store mutex is poisoned".to_string()))
    }

    fn to_record(category: &str, row: &JsonProductRow) -> ProductRecord {
        ProductRecord {
            id: None,
            category: category.to_string(),
            name: row.name.clone(),
            retail_price: row.retail_price.clone(),
            added_on: None,
        }
    }
}

fn row_position(rows: &[JsonProductRow], name: &str) -> Option<usize> {
    let wanted = name.trim();
    rows.iter().position(|row| row.name.trim().eq_ignore_ascii_case(wanted))
}

#[async_trait]
impl ProductStore for JsonFileStore {
    fn backend_name(&self) -> &'static str {
        "json"
    }

    fn category_policy(&self) -> CategoryPolicy {
        CategoryPolicy::MustExist
    }

    fn enforces_unique_names(&self) -> bool {
        true
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let _guard = self.lock()?;
        Ok(self.load()?.into_keys().collect())
    }

    async fn products_in(&self, category: &str) -> Result<Option<Vec<ProductRecord>>, StoreError> {
        let _guard = self.lock()?;
        let map = self.load()?;
        Ok(map
            .get(category)
            .map(|rows| rows.iter().map(|row| Self::to_record(category, row)).collect()))
    }

    async fn all_products(
        &self,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Vec<ProductRecord>, StoreError> {
        let _guard = self.lock()?;
        let map = self.load()?;

        let flattened = map.iter().flat_map(|(category, rows)| {
            rows.iter().map(move |row| Self::to_record(category, row))
        });

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
        let _guard = self.lock()?;
        let map = self.load()?;
        let needle = keyword.trim().to_lowercase();

        let matches = map
            .iter()
            .flat_map(|(category, rows)| {
                rows.iter().map(move |row| Self::to_record(category, row))
            })
            .filter(|record| {
                let haystack = match field {
                    SearchField::Name => &record.name,
                    SearchField::Price => &record.retail_price,
                    SearchField::Category => &record.category,
                };
                haystack.to_lowercase().contains(&needle)
            })
            .collect();

        Ok(matches)
    }

    async fn insert(&self, record: ProductRecord) -> Result<ProductRecord, StoreError> {
        let _guard = self.lock()?;
        let mut map = self.load()?;

        map.entry(record.category.clone()).or_default().push(JsonProductRow {
            name: record.name.clone(),
            retail_price: record.retail_price.clone(),
        });

        self.persist(&map)?;
        Ok(record)
    }

    async fn update_price(
        &self,
        category: &str,
        name: &str,
        new_price: &str,
    ) -> Result<bool, StoreError> {
        let _guard = self.lock()?;
        let mut map = self.load()?;

        let Some(rows) = map.get_mut(category) else {
            return Ok(false);
        };
        let Some(position) = row_position(rows, name) else {
            return Ok(false);
        };

        rows[position].retail_price = new_price.to_string();
        self.persist(&map)?;
        Ok(true)
    }

    async fn rename(
        &self,
        category: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<bool, StoreError> {
        let _guard = self.lock()?;
        let mut map = self.load()?;

        let Some(rows) = map.get_mut(category) else {
            return Ok(false);
        };
        let Some(position) = row_position(rows, old_name) else {
            return Ok(false);
        };

        rows[position].name = new_name.trim().to_string();
        self.persist(&map)?;
        Ok(true)
    }

    async fn delete(
        &self,
        category: &str,
        name: &str,
    ) -> Result<Option<ProductRecord>, StoreError> {
        let _guard = self.lock()?;
        let mut map = self.load()?;

        let Some(rows) = map.get_mut(category) else {
            return Ok(None);
        };
        let Some(position) = row_position(rows, name) else {
            return Ok(None);
        };

        let removed = rows.remove(position);
        self.persist(&map)?;
        Ok(Some(Self::to_record(category, &removed)))
    }

    async fn delete_category(&self, category: &str) -> Result<u64, StoreError> {
        let _guard = self.lock()?;
        let mut map = self.load()?;

        let Some(rows) = map.remove(category) else {
            return Ok(0);
        };

        self.persist(&map)?;
        Ok(rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use lapak_core::ProductRecord;

    use super::JsonFileStore;
    use crate::{ProductStore, SearchField};

    fn record(category: &str, name: &str, price: &str) -> ProductRecord {
        ProductRecord {
            id: None,
            category: category.to_string(),
            name: name.to_string(),
            retail_price: price.to_string(),
            added_on: None,
        }
    }

    fn store(dir: &TempDir) -> JsonFileStore {
        JsonFileStore::new(dir.path().join("retail_data.json"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty_catalog() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);

        assert!(store.categories().await.expect("categories").is_empty());
        assert_eq!(store.products_in("jenis rokok").await.expect("products"), None);
    }

    #[tokio::test]
    async fn insert_then_read_round_trips_through_the_file() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);

        store.insert(record("jenis rokok", "Gudang Garam Merah", "Rp.15.000")).await.expect("insert");
        store.insert(record("jenis rokok", "GA Bold", "Rp.13.000")).await.expect("insert");
        store.insert(record("produk makanan", "Indomie Goreng", "Rp.3.500")).await.expect("insert");

        // A fresh handle must see the persisted state, not in-process memory.
        let reopened = JsonFileStore::new(store.path().to_path_buf());
        let rows = reopened.products_in("jenis rokok").await.expect("products").expect("category");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Gudang Garam Merah");
        assert_eq!(reopened.categories().await.expect("categories").len(), 2);
    }

    #[tokio::test]
    async fn file_uses_the_spaced_indonesian_field_names() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);

        store.insert(record("jenis rokok", "GA Bold", "Rp.13.000")).await.expect("insert");

        let raw = fs::read_to_string(store.path()).expect("read raw file");
        assert!(raw.contains("\"nama produk\""));
        assert!(raw.contains("\"harga encer\""));
        assert!(raw.contains("\"jenis rokok\""));
    }

    #[tokio::test]
    async fn update_and_rename_match_names_case_insensitively() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        store.insert(record("jenis rokok", "GA Bold", "Rp.13.000")).await.expect("insert");

        assert!(store.update_price("jenis rokok", "ga bold", "Rp.14.000").await.expect("update"));
        assert!(store.rename("jenis rokok", "GA BOLD", "GA Bold Filter").await.expect("rename"));

        let rows = store.products_in("jenis rokok").await.expect("products").expect("category");
        assert_eq!(rows[0].name, "GA Bold Filter");
        assert_eq!(rows[0].retail_price, "Rp.14.000");
    }

    #[tokio::test]
    async fn delete_returns_the_removed_row_and_miss_returns_none() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        store.insert(record("jenis rokok", "GA Bold", "Rp.13.000")).await.expect("insert");

        let removed = store.delete("jenis rokok", "ga bold").await.expect("delete");
        assert_eq!(removed.map(|r| r.name), Some("GA Bold".to_string()));

        let missed = store.delete("jenis rokok", "ga bold").await.expect("second delete");
        assert!(missed.is_none());
    }

    #[tokio::test]
    async fn delete_category_removes_the_key_and_counts_rows() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        store.insert(record("jenis rokok", "GA Bold", "Rp.13.000")).await.expect("insert");
        store.insert(record("jenis rokok", "Surya 12", "Rp.21.000")).await.expect("insert");

        assert_eq!(store.delete_category("jenis rokok").await.expect("delete"), 2);
        assert_eq!(store.products_in("jenis rokok").await.expect("products"), None);
        assert_eq!(store.delete_category("jenis rokok").await.expect("redelete"), 0);
    }

    #[tokio::test]
    async fn search_is_substring_and_case_insensitive() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        store.insert(record("jenis rokok", "GA Bold", "Rp.13.000")).await.expect("insert");
        store.insert(record("produk makanan", "Indomie Goreng", "Rp.3.500")).await.expect("insert");

        let by_name = store.search(SearchField::Name, "indomie").await.expect("search");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].category, "produk makanan");

        let by_price = store.search(SearchField::Price, "13.000").await.expect("search");
        assert_eq!(by_price.len(), 1);
        assert_eq!(by_price[0].name, "GA Bold");
    }

    #[tokio::test]
    async fn malformed_file_is_reported_not_clobbered() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("retail_data.json");
        fs::write(&path, "{ not json").expect("write garbage");

        let store = JsonFileStore::new(&path);
        let error = store.categories().await.expect_err("malformed file should error");
        assert!(error.to_string().contains("malformed"));

        // The broken file is left alone for the operator to inspect.
        assert_eq!(fs::read_to_string(&path).expect("reread"), "{ not json");
    }

    #[tokio::test]
    async fn failed_write_keeps_the_last_persisted_state() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        store.insert(record("jenis rokok", "GA Bold", "Rp.13.000")).await.expect("insert");

        // A directory squatting on the staging path makes the next write fail.
        fs::create_dir(dir.path().join("retail_data.tmp")).expect("block staging path");

        let error = store
            .insert(record("jenis rokok", "Surya 12", "Rp.21.000"))
            .await
            .expect_err("write should fail");
        assert!(matches!(error, crate::StoreError::Write(_)));

        // The prior state is still on disk and still parses.
        let rows = store.products_in("jenis rokok").await.expect("reload").expect("category");
        assert_eq!(rows.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["GA Bold"]);
    }

    #[tokio::test]
    async fn all_products_applies_offset_then_limit() {
        let dir = TempDir::new().expect("tempdir");
        let store = store(&dir);
        for (name, price) in
            [("A", "Rp.1.000"), ("B", "Rp.2.000"), ("C", "Rp.3.000"), ("D", "Rp.4.000")]
        {
            store.insert(record("produk makanan", name, price)).await.expect("insert");
        }

        let page = store.all_products(Some(2), Some(1)).await.expect("page");
        assert_eq!(page.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["B", "C"]);
    }
}
