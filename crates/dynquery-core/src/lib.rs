//! dynquery core - filtering, ordering, paging and projection over typed
//! entity graphs driven by string field paths.
//!
//! Entities opt in with `#[derive(Queryable)]`, which generates the runtime
//! metadata the engine walks. A [`QueryEngine`] then evaluates a wire-level
//! [`proto::QueryRequest`] against any in-memory sequence of those entities:
//!
//! ```ignore
//! use dynquery_core::{EngineConfig, QueryEngine, Queryable};
//! use dynquery_core::proto::{QueryRequest, SortSpec};
//!
//! #[derive(Debug, Clone, Default, Queryable)]
//! struct Product {
//!     code: String,
//!     name: String,
//!     price: f64,
//! }
//!
//! let engine = QueryEngine::new(EngineConfig::default());
//! let request = QueryRequest::from_json(r#"{"fields": ["Code"], "pageSize": 5}"#)?;
//! let page = engine.execute(products, &request, &SortSpec::asc("code"))?;
//! ```

// Lets generated code name `::dynquery_core` from inside this crate.
extern crate self as dynquery_core;

pub mod config;
pub mod error;
pub mod query;
pub mod reflect;
pub mod value;

pub use config::EngineConfig;
pub use error::Error;
pub use query::{
    paginate, resolve, AccessorChain, CacheStats, ChainCache, Hop, Leaf, Predicate,
    PredicateBuilder, Projector, QueryEngine, ResolveError, Sorter, Step,
};
pub use reflect::{Queryable, Reflect, Shape};
pub use value::{ScalarKind, Value};

/// Derive macro generating [`Reflect`] metadata for a struct.
pub use dynquery_derive::Queryable;

/// Re-export protocol types.
pub use dynquery_proto as proto;
