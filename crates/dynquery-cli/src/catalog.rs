//! Product catalog entities read from JSON files.

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use dynquery_core::Queryable;
use serde::{Deserialize, Serialize};

/// A catalog product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Queryable)]
#[serde(default)]
pub struct Product {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub stock: u32,
    pub released: Option<NaiveDate>,
    pub category: Option<Category>,
    pub items: Vec<ProductItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Queryable)]
#[serde(default)]
pub struct Category {
    pub code: Option<String>,
    pub name: Option<String>,
}

/// A component or variant of a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Queryable)]
#[serde(default)]
pub struct ProductItem {
    pub item_name: Option<String>,
    pub price: f64,
    pub quantity: u32,
}

/// Parse a catalog from a JSON array of products.
pub fn parse_catalog(json: &str) -> anyhow::Result<Vec<Product>> {
    serde_json::from_str(json).context("catalog must be a JSON array of products")
}

/// Load a catalog file.
pub fn load_catalog(path: &Path) -> anyhow::Result<Vec<Product>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    parse_catalog(&content).with_context(|| format!("in {}", path.display()))
}
