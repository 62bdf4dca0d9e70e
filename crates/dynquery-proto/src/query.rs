//! List/search request types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Page size used when a request omits `pageSize`.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Filter operators understood by the engine.
///
/// The serialized names are part of the wire contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchOperator {
    /// Case-insensitive for text members, typed equality otherwise.
    Equal,
    /// Negation of `Equal`.
    NotEqual,
    /// Case-insensitive substring test on text members.
    Contains,
    /// Field greater than value.
    GreaterThan,
    /// Field greater than or equal to value.
    GreaterThanEqual,
    /// Field less than value.
    LessThan,
    /// Field less than or equal to value.
    LessThanEqual,
    /// Field within an inclusive `[start, end]` pair.
    DateTimeRange,
    /// Day-of-month of a date member equals value.
    DayPart,
    /// Month of a date member equals value.
    MonthPart,
    /// Calendar date of a date member equals value.
    DatePart,
    /// Field is null.
    IsNull,
    /// Field is not null.
    IsNotNull,
    /// Field is in a set of values.
    In,
    /// Field is not in a set of values.
    NotIn,
    /// Exact, case-sensitive equality.
    EqualExact,
}

impl SearchOperator {
    /// Every operator, in wire order.
    pub const ALL: [SearchOperator; 16] = [
        SearchOperator::Equal,
        SearchOperator::NotEqual,
        SearchOperator::Contains,
        SearchOperator::GreaterThan,
        SearchOperator::GreaterThanEqual,
        SearchOperator::LessThan,
        SearchOperator::LessThanEqual,
        SearchOperator::DateTimeRange,
        SearchOperator::DayPart,
        SearchOperator::MonthPart,
        SearchOperator::DatePart,
        SearchOperator::IsNull,
        SearchOperator::IsNotNull,
        SearchOperator::In,
        SearchOperator::NotIn,
        SearchOperator::EqualExact,
    ];

    /// Wire name of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOperator::Equal => "Equal",
            SearchOperator::NotEqual => "NotEqual",
            SearchOperator::Contains => "Contains",
            SearchOperator::GreaterThan => "GreaterThan",
            SearchOperator::GreaterThanEqual => "GreaterThanEqual",
            SearchOperator::LessThan => "LessThan",
            SearchOperator::LessThanEqual => "LessThanEqual",
            SearchOperator::DateTimeRange => "DateTimeRange",
            SearchOperator::DayPart => "DayPart",
            SearchOperator::MonthPart => "MonthPart",
            SearchOperator::DatePart => "DatePart",
            SearchOperator::IsNull => "IsNull",
            SearchOperator::IsNotNull => "IsNotNull",
            SearchOperator::In => "In",
            SearchOperator::NotIn => "NotIn",
            SearchOperator::EqualExact => "EqualExact",
        }
    }

    /// Whether a criterion with this operator must carry a value.
    pub fn requires_value(&self) -> bool {
        !matches!(self, SearchOperator::IsNull | SearchOperator::IsNotNull)
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One filter clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCriterion {
    /// Dot-separated field path, e.g. `"Items.ItemName"`.
    pub field: String,
    /// Operator applied at the resolved field.
    pub operator: SearchOperator,
    /// Untyped operand; `null` when absent.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl SearchCriterion {
    /// Create a criterion.
    pub fn new(
        field: impl Into<String>,
        operator: SearchOperator,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// Create an `Equal` criterion.
    pub fn equal(field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::new(field, SearchOperator::Equal, value)
    }

    /// Create a `Contains` criterion.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, SearchOperator::Contains, value.into())
    }

    /// Create an `IsNull` criterion.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, SearchOperator::IsNull, serde_json::Value::Null)
    }

    /// Create an `IsNotNull` criterion.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, SearchOperator::IsNotNull, serde_json::Value::Null)
    }

    /// Whether the operand is absent.
    pub fn has_value(&self) -> bool {
        !self.value.is_null()
    }
}

/// Requested ordering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    /// Field path to order by.
    #[serde(default)]
    pub sort_by: String,
    /// Descending when true.
    #[serde(rename = "sortDescending", default)]
    pub descending: bool,
}

impl SortSpec {
    /// Ascending order on a field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            sort_by: field.into(),
            descending: false,
        }
    }

    /// Descending order on a field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            sort_by: field.into(),
            descending: true,
        }
    }
}

/// Paging input with a 1-based page index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// 1-based page number.
    pub page_index: u32,
    /// Items per page.
    pub page_size: u32,
}

impl PageRequest {
    /// Create a page request.
    pub fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    /// Number of items preceding this page.
    pub fn skip(&self) -> usize {
        (self.page_index.saturating_sub(1) as usize).saturating_mul(self.page_size as usize)
    }

    /// Maximum number of items on this page.
    pub fn take(&self) -> usize {
        self.page_size as usize
    }

    /// Check the page against caller bounds.
    pub fn validate(&self, max_page_size: u32) -> Result<(), Error> {
        if self.page_index < 1 {
            return Err(Error::InvalidPage(format!(
                "pageIndex must be at least 1, got {}",
                self.page_index
            )));
        }
        if self.page_size < 1 {
            return Err(Error::InvalidPage(format!(
                "pageSize must be at least 1, got {}",
                self.page_size
            )));
        }
        if self.page_size > max_page_size {
            return Err(Error::InvalidPage(format!(
                "pageSize {} exceeds the maximum of {}",
                self.page_size, max_page_size
            )));
        }
        Ok(())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

fn default_page_index() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// A list/search request as received from the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// 1-based page number.
    #[serde(default = "default_page_index")]
    pub page_index: u32,
    /// Items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Sparse field selection; empty returns full entities.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Optional ordering.
    #[serde(rename = "sortDTO", default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    /// Filter clauses, combined with AND.
    #[serde(default)]
    pub searching: Vec<SearchCriterion>,
}

impl QueryRequest {
    /// Create a request for the first page with no filters.
    pub fn new() -> Self {
        Self {
            page_index: 1,
            page_size: DEFAULT_PAGE_SIZE,
            fields: vec![],
            sort: None,
            searching: vec![],
        }
    }

    /// Decode a request from JSON.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the page.
    pub fn with_page(mut self, page_index: u32, page_size: u32) -> Self {
        self.page_index = page_index;
        self.page_size = page_size;
        self
    }

    /// Set the fields to select.
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// Add a field to select.
    pub fn select(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Set the ordering.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Add a filter clause.
    pub fn search(mut self, criterion: SearchCriterion) -> Self {
        self.searching.push(criterion);
        self
    }

    /// Paging part of the request.
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.page_index, self.page_size)
    }

    /// Check paging bounds before handing the request to the engine.
    pub fn validate(&self, max_page_size: u32) -> Result<(), Error> {
        self.page().validate(max_page_size)
    }
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_decode_wire_request() {
        let request = QueryRequest::from_json(
            r#"{
                "pageIndex": 1,
                "pageSize": 10,
                "fields": ["Code", "Name"],
                "sortDTO": { "sortBy": "price", "sortDescending": true },
                "searching": [
                    { "field": "name", "operator": "Contains", "value": "chair" },
                    { "field": "price", "operator": "GreaterThanEqual", "value": 100 }
                ]
            }"#,
        )
        .unwrap();

        let expected = QueryRequest::new()
            .with_page(1, 10)
            .with_fields(vec!["Code".into(), "Name".into()])
            .with_sort(SortSpec::desc("price"))
            .search(SearchCriterion::contains("name", "chair"))
            .search(SearchCriterion::new(
                "price",
                SearchOperator::GreaterThanEqual,
                100,
            ));

        assert_eq!(request, expected);
    }

    #[test]
    fn test_decode_defaults() {
        let request = QueryRequest::from_json("{}").unwrap();
        assert_eq!(request, QueryRequest::new());
        assert_eq!(request.page(), PageRequest::default());

        let criterion: SearchCriterion =
            serde_json::from_value(json!({ "field": "Description", "operator": "IsNull" }))
                .unwrap();
        assert!(!criterion.has_value());
    }

    #[test]
    fn test_operator_wire_names() {
        for op in SearchOperator::ALL {
            let encoded = serde_json::to_value(op).unwrap();
            assert_eq!(encoded, json!(op.as_str()));
            let decoded: SearchOperator = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, op);
        }
        assert!(serde_json::from_value::<SearchOperator>(json!("Like")).is_err());
    }

    #[test]
    fn test_requires_value() {
        assert!(!SearchOperator::IsNull.requires_value());
        assert!(!SearchOperator::IsNotNull.requires_value());
        assert!(SearchOperator::In.requires_value());
        assert!(SearchOperator::Equal.requires_value());
    }

    #[test]
    fn test_page_skip_take() {
        assert_eq!(PageRequest::new(1, 10).skip(), 0);
        assert_eq!(PageRequest::new(3, 10).skip(), 20);
        assert_eq!(PageRequest::new(3, 10).take(), 10);
        // Out-of-range input saturates instead of underflowing.
        assert_eq!(PageRequest::new(0, 10).skip(), 0);
    }

    #[test]
    fn test_page_validation() {
        assert!(PageRequest::new(1, 10).validate(100).is_ok());
        assert!(matches!(
            PageRequest::new(0, 10).validate(100),
            Err(Error::InvalidPage(_))
        ));
        assert!(matches!(
            PageRequest::new(1, 0).validate(100),
            Err(Error::InvalidPage(_))
        ));
        assert!(matches!(
            PageRequest::new(1, 101).validate(100),
            Err(Error::InvalidPage(_))
        ));
    }

    #[test]
    fn test_sort_encoding() {
        let encoded = serde_json::to_value(SortSpec::asc("name")).unwrap();
        assert_eq!(encoded, json!({ "sortBy": "name", "sortDescending": false }));
    }
}
