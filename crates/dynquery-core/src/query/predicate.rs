//! Filter predicates built from search criteria.
//!
//! Each criterion is resolved to an accessor chain and compiled into a leaf
//! test once; the operand is coerced to the field's scalar kind at build
//! time. An operand that cannot be coerced compiles to a test that never
//! matches. A predicate is the logical AND of its clauses, and a clause
//! whose chain fans out matches when any reachable element passes.
//! `IsNull`/`IsNotNull` test the named member itself, so a collection in
//! final position is null only when absent.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value as Json;
use tracing::trace;

use super::cache::ChainCache;
use super::coerce::{calendar_part, coerce, coerce_calendar_part, parse_date, CalendarPart};
use super::path::{AccessorChain, Leaf};
use crate::error::Error;
use crate::proto::{SearchCriterion, SearchOperator};
use crate::reflect::Reflect;
use crate::value::{ScalarKind, Value};

type LeafTest = Box<dyn Fn(&Leaf<'_>) -> bool + Send + Sync>;

struct Clause {
    chain: Arc<AccessorChain>,
    operator: SearchOperator,
    test: LeafTest,
}

impl Clause {
    fn matches(&self, entity: &dyn Reflect) -> bool {
        if is_presence(self.operator) {
            self.chain.any_member(entity, |leaf| (self.test)(leaf))
        } else {
            self.chain.any(entity, |leaf| (self.test)(leaf))
        }
    }
}

// Presence tests look at the named member itself, so a collection in final
// position is null only when absent.
fn is_presence(operator: SearchOperator) -> bool {
    matches!(operator, SearchOperator::IsNull | SearchOperator::IsNotNull)
}

/// A compiled filter over entities of type `T`.
pub struct Predicate<T> {
    clauses: Vec<Clause>,
    _entity: PhantomData<fn(&T) -> bool>,
}

impl<T: Reflect> Predicate<T> {
    /// The predicate that matches every entity.
    pub fn always() -> Self {
        Self {
            clauses: Vec::new(),
            _entity: PhantomData,
        }
    }

    /// Number of clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Check if this predicate has no clauses and so matches everything.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Test one entity.
    pub fn matches(&self, entity: &T) -> bool {
        self.clauses.iter().all(|clause| clause.matches(entity))
    }

    /// Keep only the entities of `source` that match.
    pub fn filter<'p, I>(&'p self, source: I) -> impl Iterator<Item = T> + 'p
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'p,
    {
        source.into_iter().filter(move |entity| self.matches(entity))
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.clauses
                    .iter()
                    .map(|clause| format!("{} {}", clause.chain.path(), clause.operator)),
            )
            .finish()
    }
}

/// Builds [`Predicate`]s, resolving field paths through a [`ChainCache`].
pub struct PredicateBuilder<'c> {
    cache: &'c ChainCache,
}

impl<'c> PredicateBuilder<'c> {
    /// Create a builder resolving through `cache`.
    pub fn new(cache: &'c ChainCache) -> Self {
        Self { cache }
    }

    /// Compile `criteria` into one predicate over `T`.
    ///
    /// Fails when a field path does not resolve or an operand is missing;
    /// an empty list compiles to [`Predicate::always`].
    pub fn build<T: Reflect>(&self, criteria: &[SearchCriterion]) -> Result<Predicate<T>, Error> {
        let clauses = criteria
            .iter()
            .map(|criterion| self.clause::<T>(criterion))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Predicate {
            clauses,
            _entity: PhantomData,
        })
    }

    fn clause<T: Reflect>(&self, criterion: &SearchCriterion) -> Result<Clause, Error> {
        let operator = criterion.operator;
        let chain = self
            .cache
            .resolve::<T>(&criterion.field)
            .map_err(|source| Error::Filter { operator, source })?;

        if operator.requires_value() && !criterion.has_value() {
            return Err(Error::MissingValue {
                field: criterion.field.clone(),
                operator,
            });
        }

        trace!(
            field = chain.path(),
            operator = %operator,
            fan_out = chain.fans_out(),
            "compiled filter clause"
        );
        let test = compile(operator, chain.leaf_kind(), &criterion.value);
        Ok(Clause {
            chain,
            operator,
            test,
        })
    }
}

fn compile(operator: SearchOperator, kind: Option<ScalarKind>, raw: &Json) -> LeafTest {
    match operator {
        SearchOperator::Equal => equality(raw, kind, Value::equals_ignore_case),
        SearchOperator::EqualExact => equality(raw, kind, Value::equals),
        SearchOperator::NotEqual => inequality(raw, kind),
        SearchOperator::Contains => contains(raw, kind),
        SearchOperator::GreaterThan => ordering(raw, kind, Ordering::is_gt),
        SearchOperator::GreaterThanEqual => ordering(raw, kind, Ordering::is_ge),
        SearchOperator::LessThan => ordering(raw, kind, Ordering::is_lt),
        SearchOperator::LessThanEqual => ordering(raw, kind, Ordering::is_le),
        SearchOperator::DateTimeRange => date_range(raw, kind),
        SearchOperator::DatePart => date_part(raw, kind),
        SearchOperator::MonthPart => calendar(raw, kind, CalendarPart::Month),
        SearchOperator::DayPart => calendar(raw, kind, CalendarPart::Day),
        SearchOperator::IsNull => Box::new(|leaf: &Leaf<'_>| leaf.is_null()),
        SearchOperator::IsNotNull => Box::new(|leaf: &Leaf<'_>| !leaf.is_null()),
        SearchOperator::In => membership(raw, kind, false),
        SearchOperator::NotIn => membership(raw, kind, true),
    }
}

fn never() -> LeafTest {
    Box::new(|_: &Leaf<'_>| false)
}

fn on_value(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> LeafTest {
    Box::new(move |leaf: &Leaf<'_>| match leaf {
        Leaf::Value(v) => test(v),
        _ => false,
    })
}

// Negated tests hold for null leaves but never for composite ones.
fn on_value_negated(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> LeafTest {
    Box::new(move |leaf: &Leaf<'_>| match leaf {
        Leaf::Value(v) => !test(v),
        Leaf::Null => true,
        Leaf::Composite(_) => false,
    })
}

fn operand(raw: &Json, kind: Option<ScalarKind>) -> Option<Value> {
    kind.and_then(|kind| coerce(raw, kind))
        .filter(|value| !value.is_null())
}

fn equality(raw: &Json, kind: Option<ScalarKind>, eq: fn(&Value, &Value) -> bool) -> LeafTest {
    match operand(raw, kind) {
        Some(expected) => on_value(move |v| eq(v, &expected)),
        None => never(),
    }
}

fn inequality(raw: &Json, kind: Option<ScalarKind>) -> LeafTest {
    match operand(raw, kind) {
        Some(expected) => on_value_negated(move |v| v.equals_ignore_case(&expected)),
        None => never(),
    }
}

fn contains(raw: &Json, kind: Option<ScalarKind>) -> LeafTest {
    if kind != Some(ScalarKind::String) {
        return never();
    }
    match operand(raw, kind) {
        Some(Value::String(needle)) => {
            let needle = needle.to_lowercase();
            on_value(move |v| {
                v.as_str()
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
            })
        }
        _ => never(),
    }
}

fn ordering(raw: &Json, kind: Option<ScalarKind>, accept: fn(Ordering) -> bool) -> LeafTest {
    match operand(raw, kind) {
        Some(bound) => on_value(move |v| v.compare(&bound).is_some_and(accept)),
        None => never(),
    }
}

fn temporal(kind: Option<ScalarKind>) -> Option<ScalarKind> {
    kind.filter(ScalarKind::is_temporal)
}

fn range_bounds(raw: &Json) -> Option<(&Json, &Json)> {
    match raw {
        Json::Array(items) if items.len() == 2 => Some((&items[0], &items[1])),
        Json::Object(map) => Some((map.get("start")?, map.get("end")?)),
        _ => None,
    }
}

fn date_range(raw: &Json, kind: Option<ScalarKind>) -> LeafTest {
    let kind = temporal(kind);
    let bounds = range_bounds(raw)
        .and_then(|(start, end)| Some((operand(start, kind)?, operand(end, kind)?)));
    match bounds {
        Some((start, end)) => on_value(move |v| {
            v.compare(&start).is_some_and(Ordering::is_ge)
                && v.compare(&end).is_some_and(Ordering::is_le)
        }),
        None => never(),
    }
}

fn date_part(raw: &Json, kind: Option<ScalarKind>) -> LeafTest {
    let date = temporal(kind).and_then(|_| raw.as_str()).and_then(parse_date);
    match date {
        Some(date) => on_value(move |v| v.as_date() == Some(date)),
        None => never(),
    }
}

fn calendar(raw: &Json, kind: Option<ScalarKind>, part: CalendarPart) -> LeafTest {
    let expected = temporal(kind).and_then(|_| coerce_calendar_part(raw, part));
    match expected {
        Some(expected) => on_value(move |v| calendar_part(v, part) == Some(expected)),
        None => never(),
    }
}

fn membership(raw: &Json, kind: Option<ScalarKind>, negate: bool) -> LeafTest {
    let (Json::Array(items), Some(_)) = (raw, kind) else {
        return never();
    };
    // Elements that cannot be coerced can never be equal to a member value.
    let set: Vec<Value> = items.iter().filter_map(|item| operand(item, kind)).collect();
    let has_null = items.iter().any(Json::is_null);
    Box::new(move |leaf: &Leaf<'_>| {
        let member = match leaf {
            Leaf::Null => has_null,
            Leaf::Value(v) => set.iter().any(|item| v.equals_ignore_case(item)),
            Leaf::Composite(_) => return false,
        };
        member != negate
    })
}
