//! dynquery protocol types.
//!
//! This crate defines the wire shape of list/search requests and their paged
//! responses. It carries no evaluation logic; see `dynquery-core` for the
//! engine that consumes these types.
//!
//! # Modules
//!
//! - [`query`] - Request types: filters, ordering, paging, field selection
//! - [`result`] - The paged response envelope
//! - [`error`] - Protocol error types
//!
//! # Wire format
//!
//! ```json
//! {
//!   "pageIndex": 1,
//!   "pageSize": 10,
//!   "fields": ["Code", "Name"],
//!   "sortDTO": { "sortBy": "price", "sortDescending": true },
//!   "searching": [
//!     { "field": "name", "operator": "Contains", "value": "chair" }
//!   ]
//! }
//! ```

pub mod error;
pub mod query;
pub mod result;

pub use error::Error;

// Re-export commonly used types at crate root
pub use query::{
    PageRequest, QueryRequest, SearchCriterion, SearchOperator, SortSpec, DEFAULT_PAGE_SIZE,
};
pub use result::PagedResult;
