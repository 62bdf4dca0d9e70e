//! Query pipeline.
//!
//! [`QueryEngine::execute`] runs a request in a fixed order: filter, count,
//! sort, page, then project when fields were requested.

use std::any::type_name;
use std::sync::Arc;

use tracing::{debug, instrument};

use super::cache::ChainCache;
use super::page::paginate;
use super::predicate::{Predicate, PredicateBuilder};
use super::projection::Projector;
use super::sort::Sorter;
use crate::config::EngineConfig;
use crate::error::Error;
use crate::proto::{PagedResult, QueryRequest, SearchCriterion, SortSpec};
use crate::reflect::{Queryable, Reflect};

/// Evaluates list/search requests against in-memory entity sequences.
///
/// The engine holds no per-request state; one instance can serve any
/// number of entity types and concurrent callers.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    config: EngineConfig,
    cache: Arc<ChainCache>,
}

impl QueryEngine {
    /// Create an engine; it owns a chain cache unless the configuration
    /// asks for the process-wide one.
    pub fn new(config: EngineConfig) -> Self {
        let cache = if config.shared_cache {
            ChainCache::global()
        } else {
            Arc::new(ChainCache::new(config.cache_capacity))
        };
        Self { config, cache }
    }

    /// Create an engine resolving through an existing cache.
    pub fn with_cache(cache: Arc<ChainCache>, config: EngineConfig) -> Self {
        Self { config, cache }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Accessor-chain cache used by this engine.
    pub fn cache(&self) -> &Arc<ChainCache> {
        &self.cache
    }

    /// Check `request` against the paging bounds this engine accepts.
    ///
    /// [`execute`](Self::execute) does not clamp; callers validate first.
    pub fn validate(&self, request: &QueryRequest) -> Result<(), Error> {
        request.validate(self.config.max_page_size)?;
        Ok(())
    }

    /// Compile filter criteria for `T`.
    pub fn predicate<T: Reflect>(&self, criteria: &[SearchCriterion]) -> Result<Predicate<T>, Error> {
        PredicateBuilder::new(&self.cache).build(criteria)
    }

    /// Build a projector for `T`.
    pub fn projector<T: Queryable>(&self, fields: &[String]) -> Projector<T> {
        Projector::new(&self.cache, fields)
    }

    /// Build a sorter for `T`.
    pub fn sorter<T: Reflect>(&self, sort: Option<&SortSpec>, fallback: &SortSpec) -> Sorter<T> {
        Sorter::new(&self.cache, sort, fallback)
    }

    /// Run `request` over `source`.
    ///
    /// `fallback` orders the result when the request has no usable sort
    /// field. Paging bounds are not checked here; callers validate them
    /// with [`QueryRequest::validate`] first.
    #[instrument(
        skip_all,
        fields(
            entity = type_name::<T>(),
            page_index = request.page_index,
            page_size = request.page_size,
            criteria = request.searching.len(),
        )
    )]
    pub fn execute<T, I>(
        &self,
        source: I,
        request: &QueryRequest,
        fallback: &SortSpec,
    ) -> Result<PagedResult<T>, Error>
    where
        T: Queryable,
        I: IntoIterator<Item = T>,
    {
        let predicate = self.predicate::<T>(&request.searching)?;
        let sorter = self.sorter::<T>(request.sort.as_ref(), fallback);
        let projector = (!request.fields.is_empty()).then(|| self.projector::<T>(&request.fields));

        let matched: Vec<T> = predicate.filter(source).collect();
        let total = matched.len();

        let sorted = sorter.sort(matched);
        let page = request.page();
        let (items, _) = paginate(sorted, &page);

        let items = match &projector {
            Some(projector) => projector.project_all(items),
            None => items,
        };

        debug!(
            total,
            returned = items.len(),
            sort_by = sorter.field().unwrap_or("<source order>"),
            projected = projector.is_some(),
            "query executed"
        );
        Ok(PagedResult::new(items, total, page))
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::SearchOperator;
    use crate::Queryable;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Default, PartialEq, Queryable)]
    struct Product {
        code: Option<String>,
        name: Option<String>,
        description: Option<String>,
        price: f64,
    }

    fn product(code: &str, name: &str, price: f64, description: &str) -> Product {
        Product {
            code: Some(code.into()),
            name: Some(name.into()),
            description: Some(description.into()),
            price,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("P001", "Product 1", 100.0, "Desc 1"),
            product("P002", "Product 2", 200.0, "Desc 2"),
            product("P003", "Chair", 150.0, "Oak chair"),
        ]
    }

    #[test]
    fn test_select_fields_end_to_end() {
        let engine = QueryEngine::default();
        let request = QueryRequest::new()
            .search(SearchCriterion::contains("name", "product"))
            .select("Code")
            .select("Name");
        let result = engine
            .execute(catalog(), &request, &SortSpec::asc("code"))
            .unwrap();

        assert_eq!(result.total_items, 2);
        assert_eq!(
            result.items,
            vec![
                Product {
                    code: Some("P001".into()),
                    name: Some("Product 1".into()),
                    description: None,
                    price: 0.0,
                },
                Product {
                    code: Some("P002".into()),
                    name: Some("Product 2".into()),
                    description: None,
                    price: 0.0,
                },
            ]
        );
    }

    #[test]
    fn test_count_precedes_paging() {
        let engine = QueryEngine::default();
        let request = QueryRequest::new()
            .with_page(2, 2)
            .with_sort(SortSpec::desc("price"));
        let result = engine
            .execute(catalog(), &request, &SortSpec::asc("code"))
            .unwrap();

        assert_eq!(result.total_items, 3);
        assert_eq!(result.items, vec![product("P001", "Product 1", 100.0, "Desc 1")]);
        assert_eq!(result.total_pages(), 2);
        assert!(!result.has_next_page());
    }

    #[test]
    fn test_filter_error_fails_request() {
        let engine = QueryEngine::default();
        let request = QueryRequest::new().search(SearchCriterion::new(
            "weight",
            SearchOperator::GreaterThan,
            3,
        ));
        let err = engine
            .execute(catalog(), &request, &SortSpec::default())
            .unwrap_err();
        assert!(matches!(err, Error::Filter { .. }));
    }

    #[test]
    fn test_validate_reports_protocol_error() {
        let engine = QueryEngine::new(EngineConfig::new().with_max_page_size(20));
        assert!(engine.validate(&QueryRequest::new().with_page(3, 20)).is_ok());

        let err = engine
            .validate(&QueryRequest::new().with_page(1, 21))
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert!(err.to_string().starts_with("invalid request:"));

        let err = engine
            .validate(&QueryRequest::new().with_page(0, 5))
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn test_shared_and_owned_caches() {
        let owned = QueryEngine::new(EngineConfig::new().with_cache_capacity(4));
        assert_eq!(owned.cache().capacity(), 4);

        let shared = QueryEngine::new(EngineConfig::new().with_shared_cache());
        assert!(Arc::ptr_eq(shared.cache(), &ChainCache::global()));

        let cache = Arc::new(ChainCache::new(8));
        let engine = QueryEngine::with_cache(cache.clone(), EngineConfig::default());
        engine
            .execute(catalog(), &QueryRequest::new(), &SortSpec::asc("code"))
            .unwrap();
        assert_eq!(cache.len(), 1);
    }
}
