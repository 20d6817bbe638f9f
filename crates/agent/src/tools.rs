//! Catalog tools exposed to the model.
//!
//! Every tool resolves to a tagged JSON object. Argument problems come back
//! as `status: "error"` with a `validation` class rather than a fault, and
//! batch tools report a per-item ledger under `status: "multi"`. Batch
//! name/price arguments accept either a single string or a list of strings,
//! because models emit both shapes.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use lapak_core::CatalogError;
use lapak_store::{BatchOutcome, CatalogService};

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// Mutating tools are gated behind admin authorization by the runtime.
    fn mutating(&self) -> bool {
        false
    }
    async fn execute(&self, input: Value) -> Result<Value>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.values().map(|tool| tool.name()).collect();
        names.sort_unstable();
        names
    }

    /// (name, description, mutating) for every registered tool, sorted by name.
    pub fn descriptions(&self) -> Vec<(&'static str, &'static str, bool)> {
        let mut entries: Vec<_> = self
            .tools
            .values()
            .map(|tool| (tool.name(), tool.description(), tool.mutating()))
            .collect();
        entries.sort_unstable_by_key(|(name, _, _)| *name);
        entries
    }

    /// The full catalog toolset wired to one service instance.
    pub fn catalog_tools(service: Arc<CatalogService>) -> Self {
        let mut registry = Self::default();
        registry.register(ListCategories { service: service.clone() });
        registry.register(ListProducts { service: service.clone() });
        registry.register(ListProductsWithPrices { service: service.clone() });
        registry.register(GetPrice { service: service.clone() });
        registry.register(AddProducts { service: service.clone() });
        registry.register(UpdatePrices { service: service.clone() });
        registry.register(RenameProduct { service: service.clone() });
        registry.register(MoveProduct { service: service.clone() });
        registry.register(DeleteProduct { service: service.clone() });
        registry.register(DeleteCategory { service: service.clone() });
        registry.register(AdjustPricesByPercent { service: service.clone() });
        registry.register(SearchProducts { service: service.clone() });
        registry.register(ListAllProducts { service: service.clone() });
        registry.register(CatalogStatsTool { service });
        registry
    }
}

pub fn success_value(result: Value) -> Value {
    json!({ "status": "success", "result": result })
}

pub fn error_value(error_class: &str, message: impl Into<String>) -> Value {
    json!({ "status": "error", "error_class": error_class, "message": message.into() })
}

fn batch_value(outcome: &BatchOutcome) -> Value {
    json!({
        "status": "multi",
        "succeeded": outcome.succeeded,
        "failed": outcome.failed,
        "items": outcome.items,
    })
}

fn catalog_error(error: &CatalogError) -> Value {
    error_value(error.error_class(), error.to_string())
}

fn validation(message: impl Into<String>) -> Value {
    error_value("validation", message)
}

fn required_str(input: &Value, key: &str) -> Result<String, Value> {
    match input.get(key) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Some(Value::String(_)) => Err(validation(format!("argument '{key}' is empty"))),
        Some(_) => Err(validation(format!("argument '{key}' must be a string"))),
        None => Err(validation(format!("missing required argument '{key}'"))),
    }
}

/// Accepts `"x"` or `["x", "y"]` for batch fields.
fn string_or_list(input: &Value, key: &str) -> Result<Vec<String>, Value> {
    match input.get(key) {
        Some(Value::String(value)) => Ok(vec![value.clone()]),
        Some(Value::Array(values)) => values
            .iter()
            .map(|value| match value {
                Value::String(item) => Ok(item.clone()),
                _ => Err(validation(format!("argument '{key}' must contain only strings"))),
            })
            .collect(),
        Some(_) => Err(validation(format!("argument '{key}' must be a string or list of strings"))),
        None => Err(validation(format!("missing required argument '{key}'"))),
    }
}

fn required_f64(input: &Value, key: &str) -> Result<f64, Value> {
    match input.get(key) {
        Some(value) => value
            .as_f64()
            .ok_or_else(|| validation(format!("argument '{key}' must be a number"))),
        None => Err(validation(format!("missing required argument '{key}'"))),
    }
}

fn optional_u32(input: &Value, key: &str) -> Result<Option<u32>, Value> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| validation(format!("argument '{key}' must be a non-negative integer"))),
    }
}

struct ListCategories {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for ListCategories {
    fn name(&self) -> &'static str {
        "list_categories"
    }

    fn description(&self) -> &'static str {
        "List every product category in the catalog."
    }

    async fn execute(&self, _input: Value) -> Result<Value> {
        Ok(match self.service.list_categories().await {
            Ok(categories) => success_value(json!({ "categories": categories })),
            Err(error) => catalog_error(&error),
        })
    }
}

struct ListProducts {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for ListProducts {
    fn name(&self) -> &'static str {
        "list_products"
    }

    fn description(&self) -> &'static str {
        "List the product names in one category."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let category = match required_str(&input, "category") {
            Ok(value) => value,
            Err(error) => return Ok(error),
        };
        Ok(match self.service.list_products(&category).await {
            Ok(products) => success_value(json!({ "category": category, "products": products })),
            Err(error) => catalog_error(&error),
        })
    }
}

struct ListProductsWithPrices {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for ListProductsWithPrices {
    fn name(&self) -> &'static str {
        "list_products_with_prices"
    }

    fn description(&self) -> &'static str {
        "List the products in one category together with their retail prices."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let category = match required_str(&input, "category") {
            Ok(value) => value,
            Err(error) => return Ok(error),
        };
        Ok(match self.service.list_products_with_prices(&category).await {
            Ok(products) => success_value(json!({ "category": category, "products": products })),
            Err(error) => catalog_error(&error),
        })
    }
}

struct GetPrice {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for GetPrice {
    fn name(&self) -> &'static str {
        "get_price"
    }

    fn description(&self) -> &'static str {
        "Get the retail price of one product in a category."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let (category, name) =
            match (required_str(&input, "category"), required_str(&input, "name")) {
                (Ok(category), Ok(name)) => (category, name),
                (Err(error), _) | (_, Err(error)) => return Ok(error),
            };
        Ok(match self.service.get_price(&category, &name).await {
            Ok(record) => success_value(json!({
                "category": record.category,
                "name": record.name,
                "retail_price": record.retail_price,
            })),
            Err(error) => catalog_error(&error),
        })
    }
}

struct AddProducts {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for AddProducts {
    fn name(&self) -> &'static str {
        "add_products"
    }

    fn description(&self) -> &'static str {
        "Add one or more products with prices to a category."
    }

    fn mutating(&self) -> bool {
        true
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let category = match required_str(&input, "category") {
            Ok(value) => value,
            Err(error) => return Ok(error),
        };
        let (names, prices) =
            match (string_or_list(&input, "names"), string_or_list(&input, "prices")) {
                (Ok(names), Ok(prices)) => (names, prices),
                (Err(error), _) | (_, Err(error)) => return Ok(error),
            };
        Ok(match self.service.add_products(&category, &names, &prices).await {
            Ok(outcome) => batch_value(&outcome),
            Err(error) => catalog_error(&error),
        })
    }
}

struct UpdatePrices {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for UpdatePrices {
    fn name(&self) -> &'static str {
        "update_prices"
    }

    fn description(&self) -> &'static str {
        "Update the prices of one or more existing products in a category."
    }

    fn mutating(&self) -> bool {
        true
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let category = match required_str(&input, "category") {
            Ok(value) => value,
            Err(error) => return Ok(error),
        };
        let (names, prices) =
            match (string_or_list(&input, "names"), string_or_list(&input, "prices")) {
                (Ok(names), Ok(prices)) => (names, prices),
                (Err(error), _) | (_, Err(error)) => return Ok(error),
            };
        Ok(match self.service.update_prices(&category, &names, &prices).await {
            Ok(outcome) => batch_value(&outcome),
            Err(error) => catalog_error(&error),
        })
    }
}

struct RenameProduct {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for RenameProduct {
    fn name(&self) -> &'static str {
        "rename_product"
    }

    fn description(&self) -> &'static str {
        "Rename a product inside a category, keeping its price."
    }

    fn mutating(&self) -> bool {
        true
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args = (
            required_str(&input, "category"),
            required_str(&input, "old_name"),
            required_str(&input, "new_name"),
        );
        let (category, old_name, new_name) = match args {
            (Ok(category), Ok(old_name), Ok(new_name)) => (category, old_name, new_name),
            (Err(error), _, _) | (_, Err(error), _) | (_, _, Err(error)) => return Ok(error),
        };
        Ok(match self.service.rename_product(&category, &old_name, &new_name).await {
            Ok(()) => success_value(json!({
                "category": category,
                "old_name": old_name,
                "new_name": new_name,
            })),
            Err(error) => catalog_error(&error),
        })
    }
}

struct MoveProduct {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for MoveProduct {
    fn name(&self) -> &'static str {
        "move_product"
    }

    fn description(&self) -> &'static str {
        "Move a product into a different category, keeping its name and price."
    }

    fn mutating(&self) -> bool {
        true
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let args = (
            required_str(&input, "category"),
            required_str(&input, "name"),
            required_str(&input, "new_category"),
        );
        let (category, name, new_category) = match args {
            (Ok(category), Ok(name), Ok(new_category)) => (category, name, new_category),
            (Err(error), _, _) | (_, Err(error), _) | (_, _, Err(error)) => return Ok(error),
        };
        Ok(match self.service.move_product(&category, &name, &new_category).await {
            Ok(record) => success_value(json!({ "moved": record })),
            Err(error) => catalog_error(&error),
        })
    }
}

struct DeleteProduct {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for DeleteProduct {
    fn name(&self) -> &'static str {
        "delete_product"
    }

    fn description(&self) -> &'static str {
        "Delete one product from a category."
    }

    fn mutating(&self) -> bool {
        true
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let (category, name) =
            match (required_str(&input, "category"), required_str(&input, "name")) {
                (Ok(category), Ok(name)) => (category, name),
                (Err(error), _) | (_, Err(error)) => return Ok(error),
            };
        Ok(match self.service.delete_product(&category, &name).await {
            Ok(record) => success_value(json!({ "deleted": record })),
            Err(error) => catalog_error(&error),
        })
    }
}

struct DeleteCategory {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for DeleteCategory {
    fn name(&self) -> &'static str {
        "delete_category"
    }

    fn description(&self) -> &'static str {
        "Delete an entire category and every product in it."
    }

    fn mutating(&self) -> bool {
        true
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let category = match required_str(&input, "category") {
            Ok(value) => value,
            Err(error) => return Ok(error),
        };
        Ok(match self.service.delete_category(&category).await {
            Ok(removed) => success_value(json!({ "category": category, "removed": removed })),
            Err(error) => catalog_error(&error),
        })
    }
}

struct AdjustPricesByPercent {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for AdjustPricesByPercent {
    fn name(&self) -> &'static str {
        "adjust_prices_by_percent"
    }

    fn description(&self) -> &'static str {
        "Raise or lower every price in a category by a percentage."
    }

    fn mutating(&self) -> bool {
        true
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let category = match required_str(&input, "category") {
            Ok(value) => value,
            Err(error) => return Ok(error),
        };
        let percent = match required_f64(&input, "percent") {
            Ok(value) => value,
            Err(error) => return Ok(error),
        };
        Ok(match self.service.adjust_prices_by_percent(&category, percent).await {
            Ok(adjustments) => success_value(json!({
                "category": category,
                "percent": percent,
                "adjusted": adjustments,
            })),
            Err(error) => catalog_error(&error),
        })
    }
}

struct SearchProducts {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for SearchProducts {
    fn name(&self) -> &'static str {
        "search_products"
    }

    fn description(&self) -> &'static str {
        "Search products by name, price, or category keyword."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let (field, keyword) =
            match (required_str(&input, "field"), required_str(&input, "keyword")) {
                (Ok(field), Ok(keyword)) => (field, keyword),
                (Err(error), _) | (_, Err(error)) => return Ok(error),
            };
        Ok(match self.service.search_products(&field, &keyword).await {
            Ok(products) => success_value(json!({ "products": products })),
            Err(error) => catalog_error(&error),
        })
    }
}

struct ListAllProducts {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for ListAllProducts {
    fn name(&self) -> &'static str {
        "list_all_products"
    }

    fn description(&self) -> &'static str {
        "List every product in the catalog, optionally paged with limit and offset."
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let (limit, offset) = match (optional_u32(&input, "limit"), optional_u32(&input, "offset"))
        {
            (Ok(limit), Ok(offset)) => (limit, offset),
            (Err(error), _) | (_, Err(error)) => return Ok(error),
        };
        Ok(match self.service.list_all(limit, offset).await {
            Ok(products) => success_value(json!({ "products": products })),
            Err(error) => catalog_error(&error),
        })
    }
}

struct CatalogStatsTool {
    service: Arc<CatalogService>,
}

#[async_trait]
impl Tool for CatalogStatsTool {
    fn name(&self) -> &'static str {
        "catalog_stats"
    }

    fn description(&self) -> &'static str {
        "Summarize the catalog: totals, per-category counts, most recent products."
    }

    async fn execute(&self, _input: Value) -> Result<Value> {
        Ok(match self.service.catalog_stats().await {
            Ok(stats) => success_value(json!({ "stats": stats })),
            Err(error) => catalog_error(&error),
        })
    }
}
