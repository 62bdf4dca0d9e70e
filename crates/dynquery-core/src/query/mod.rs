//! Query engine: path resolution, filtering, ordering, paging, projection.

mod cache;
mod coerce;
mod page;
mod path;
mod pipeline;
mod predicate;
mod projection;
mod sort;

pub use cache::{CacheStats, CachedChain, ChainCache};
pub use coerce::{coerce, parse_date, parse_datetime};
pub use page::paginate;
pub use path::{resolve, resolve_shape, AccessorChain, Hop, Leaf, ResolveError, Step};
pub use pipeline::QueryEngine;
pub use predicate::{Predicate, PredicateBuilder};
pub use projection::Projector;
pub use sort::Sorter;
