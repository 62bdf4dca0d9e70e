//! Output formatters for query results.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use dynquery_core::proto::PagedResult;
use dynquery_core::reflect::scalar_field;
use dynquery_core::{Reflect, Shape, Value};
use serde::Serialize;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Render a page in the requested format.
pub fn format_page<T>(page: &PagedResult<T>, format: OutputFormat) -> anyhow::Result<String>
where
    T: Reflect + Serialize,
{
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(page)?),
        OutputFormat::Table => format_table(page),
    }
}

/// One row per item and one column per top-level member.
///
/// Scalar members print as plain text; nested records and collections print
/// as compact JSON.
fn format_table<T>(page: &PagedResult<T>) -> anyhow::Result<String>
where
    T: Reflect + Serialize,
{
    let columns: Vec<&'static str> = match T::shape() {
        Shape::Record(info) => info.fields.iter().map(|field| field.name).collect(),
        _ => Vec::new(),
    };

    let mut output = if page.items.is_empty() {
        "No results".to_string()
    } else {
        let mut table = Table::new();
        table.set_header(columns.iter().map(|name| Cell::new(*name)).collect::<Vec<_>>());
        for item in &page.items {
            let row = serde_json::to_value(item)?;
            let cells: Vec<Cell> = columns
                .iter()
                .map(|name| Cell::new(format_cell(item, &row, name)))
                .collect();
            table.add_row(cells);
        }
        table.to_string()
    };

    output.push_str(&format!(
        "\npage {} of {} ({} matching item(s))",
        page.page_index,
        page.total_pages(),
        page.total_items
    ));
    Ok(output)
}

fn format_cell<T: Reflect>(item: &T, row: &serde_json::Value, name: &str) -> String {
    match scalar_field(item, name) {
        Some(Value::Null) => String::new(),
        Some(value) => value.to_string(),
        None => row.get(name).map(|v| v.to_string()).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, Product, ProductItem};
    use dynquery_core::proto::PageRequest;

    fn page() -> PagedResult<Product> {
        let product = Product {
            code: Some("P001".into()),
            name: Some("Chair".into()),
            price: 49.5,
            category: Some(Category {
                code: Some("C1".into()),
                name: None,
            }),
            items: vec![ProductItem {
                item_name: Some("leg".into()),
                price: 2.0,
                quantity: 4,
            }],
            ..Default::default()
        };
        PagedResult::new(vec![product], 11, PageRequest::new(1, 10))
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_json_format_uses_wire_names() {
        let output = format_page(&page(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["totalItems"], 11);
        assert_eq!(parsed["pageIndex"], 1);
        assert_eq!(parsed["items"][0]["code"], "P001");
        assert_eq!(parsed["items"][0]["items"][0]["item_name"], "leg");
    }

    #[test]
    fn test_table_format_columns_and_cells() {
        let output = format_page(&page(), OutputFormat::Table).unwrap();

        for header in ["code", "name", "price", "released", "category", "items"] {
            assert!(output.contains(header), "missing column {header}");
        }
        assert!(output.contains("Chair"));
        assert!(output.contains("49.5"));
        assert!(output.contains(r#""item_name":"leg""#));
        assert!(output.contains("page 1 of 2 (11 matching item(s))"));
    }

    #[test]
    fn test_table_format_empty_page() {
        let empty: PagedResult<Product> = PagedResult::new(Vec::new(), 0, PageRequest::new(1, 10));
        let output = format_page(&empty, OutputFormat::Table).unwrap();
        assert!(output.starts_with("No results"));
        assert!(output.contains("0 matching item(s)"));
    }
}
