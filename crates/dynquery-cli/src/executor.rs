//! Request loading and execution against a catalog.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use dynquery_core::proto::{PagedResult, QueryRequest, SortSpec};
use dynquery_core::{Error, QueryEngine};
use tracing::info;

use crate::catalog::Product;

/// Read a request from `source`, or from stdin when `source` is `-`.
pub fn read_request(source: &Path) -> anyhow::Result<QueryRequest> {
    let json = if source.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("failed to read request {}", source.display()))?
    };
    parse_request(&json)
}

/// Decode a request body.
pub fn parse_request(json: &str) -> anyhow::Result<QueryRequest> {
    Ok(QueryRequest::from_json(json).map_err(Error::from)?)
}

/// Validate `request` against the engine's limits and run it over `catalog`.
pub fn execute(
    engine: &QueryEngine,
    catalog: Vec<Product>,
    request: &QueryRequest,
    fallback: &SortSpec,
) -> anyhow::Result<PagedResult<Product>> {
    engine.validate(request)?;

    let catalog_size = catalog.len();
    let page = engine.execute(catalog, request, fallback)?;
    info!(
        catalog = catalog_size,
        matched = page.total_items,
        returned = page.items.len(),
        "request complete"
    );
    Ok(page)
}
