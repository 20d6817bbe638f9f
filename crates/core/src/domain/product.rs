use serde::{Deserialize, Serialize};

/// A catalog row as seen by the CRUD service.
///
/// One shape serves both backends: rows from the JSON store carry no database
/// identity or date stamp, rows from sqlite carry both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Option<i64>,
    pub category: String,
    pub name: String,
    pub retail_price: String,
    pub added_on: Option<String>,
}

impl ProductRecord {
    /// Case-insensitive name match; product names are display strings and the
    /// assistant should not care about casing when looking one up.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::ProductRecord;

    fn record(name: &str) -> ProductRecord {
        ProductRecord {
            id: None,
            category: "jenis rokok".to_string(),
            name: name.to_string(),
            retail_price: "Rp.15.000".to_string(),
            added_on: None,
        }
    }

    #[test]
    fn name_match_ignores_case_and_outer_whitespace() {
        let product = record("Gudang Garam Merah");
        assert!(product.matches_name("gudang garam merah"));
        assert!(product.matches_name("  GUDANG GARAM MERAH  "));
        assert!(!product.matches_name("gudang garam"));
    }
}
