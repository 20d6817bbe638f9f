//! Seed dataset for demos and operator smoke tests.

use lapak_core::ProductRecord;

use crate::{ProductStore, StoreError};

pub struct SeedDataset {
    pub entries: Vec<SeedEntry>,
}

pub struct SeedEntry {
    pub category: &'static str,
    pub name: &'static str,
    pub retail_price: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
}

impl SeedDataset {
    /// A small catalog in the shape the assistant manages in production:
    /// lowercase Indonesian category names, `Rp.`-formatted display prices.
    pub fn sample() -> Self {
        let entries = vec![
            entry("jenis rokok", "Gudang Garam Merah", "Rp.15.000"),
            entry("jenis rokok", "GA Bold", "Rp.13.000"),
            entry("jenis rokok", "Surya 12", "Rp.21.000"),
            entry("jenis rokok", "Sampoerna Mild", "Rp.29.000"),
            entry("produk makanan", "Indomie Goreng", "Rp.3.500"),
            entry("produk makanan", "Roti Sobek", "Rp.12.000"),
            entry("produk makanan", "Beng Beng", "Rp.2.000"),
            entry("produk isi ulang", "Galon Aqua", "Rp.20.000"),
            entry("produk isi ulang", "Gas 3kg", "Rp.22.000"),
        ];
        Self { entries }
    }

    pub async fn apply(&self, store: &dyn ProductStore) -> Result<SeedSummary, StoreError> {
        let mut categories: Vec<&str> = Vec::new();

        for seed in &self.entries {
            if !categories.contains(&seed.category) {
                categories.push(seed.category);
            }
            store
                .insert(ProductRecord {
                    id: None,
                    category: seed.category.to_string(),
                    name: seed.name.to_string(),
                    retail_price: seed.retail_price.to_string(),
                    added_on: None,
                })
                .await?;
        }

        Ok(SeedSummary { categories: categories.len(), products: self.entries.len() })
    }
}

fn entry(category: &'static str, name: &'static str, retail_price: &'static str) -> SeedEntry {
    SeedEntry { category, name, retail_price }
}
