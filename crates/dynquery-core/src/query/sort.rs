//! Dynamic ordering.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, warn};

use super::cache::ChainCache;
use super::path::AccessorChain;
use crate::proto::SortSpec;
use crate::reflect::Reflect;
use crate::value::Value;

struct SortKey {
    chain: Arc<AccessorChain>,
    descending: bool,
}

/// Orders entities of type `T` by one field path.
///
/// Building a sorter never fails: a requested field that does not resolve
/// to a single scalar per entity falls back to the caller's default order,
/// and when that is unusable too the source order is kept.
pub struct Sorter<T> {
    key: Option<SortKey>,
    _entity: PhantomData<fn(&T)>,
}

impl<T: Reflect> Sorter<T> {
    /// Create a sorter for `sort`, or for `fallback` when `sort` is absent
    /// or unusable.
    pub fn new(cache: &ChainCache, sort: Option<&SortSpec>, fallback: &SortSpec) -> Self {
        let requested = sort.and_then(|spec| {
            let key = sort_key::<T>(cache, spec);
            if key.is_none() {
                debug!(
                    sort_by = %spec.sort_by,
                    fallback = %fallback.sort_by,
                    "sort field unusable, using fallback"
                );
            }
            key
        });
        let key = requested.or_else(|| {
            let key = sort_key::<T>(cache, fallback);
            if key.is_none() {
                warn!(
                    sort_by = %fallback.sort_by,
                    "fallback sort field unusable, keeping source order"
                );
            }
            key
        });
        Self {
            key,
            _entity: PhantomData,
        }
    }

    /// Resolved field path being sorted on, if any.
    pub fn field(&self) -> Option<&str> {
        self.key.as_ref().map(|key| key.chain.path())
    }

    /// Check if the order is descending.
    pub fn is_descending(&self) -> bool {
        self.key.as_ref().is_some_and(|key| key.descending)
    }

    /// Sort `items`; equal keys keep their relative order.
    ///
    /// Nulls order first when ascending and last when descending.
    pub fn sort(&self, items: Vec<T>) -> Vec<T> {
        let Some(key) = &self.key else {
            return items;
        };
        let mut keyed: Vec<(Value, T)> = items
            .into_iter()
            .map(|item| (key.chain.value_of(&item).unwrap_or(Value::Null), item))
            .collect();
        if key.descending {
            keyed.sort_by(|(a, _), (b, _)| b.sort_cmp(a));
        } else {
            keyed.sort_by(|(a, _), (b, _)| a.sort_cmp(b));
        }
        keyed.into_iter().map(|(_, item)| item).collect()
    }
}

fn sort_key<T: Reflect>(cache: &ChainCache, spec: &SortSpec) -> Option<SortKey> {
    if spec.sort_by.trim().is_empty() {
        return None;
    }
    let chain = cache.resolve::<T>(&spec.sort_by).ok()?;
    if chain.fans_out() || chain.leaf_kind().is_none() {
        return None;
    }
    Some(SortKey {
        chain,
        descending: spec.descending,
    })
}
