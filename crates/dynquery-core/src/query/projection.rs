//! Sparse field projection.
//!
//! A [`Projector`] merges the requested field paths into a selection tree
//! and copies only the selected members from a source entity into a fresh
//! `T::default()`. Intermediate records, optionals and collections are
//! materialised along selected paths; collections keep their element count.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use tracing::debug;

use super::cache::ChainCache;
use super::path::Step;
use crate::reflect::{Queryable, Reflect, ReflectMut, ReflectRef};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Selection {
    members: BTreeMap<usize, Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    /// Copy the member wholesale.
    Whole,
    /// Copy only the selected sub-members.
    Nested(Selection),
}

impl Selection {
    fn insert(&mut self, steps: &[Step]) {
        let Some((step, rest)) = steps.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.members.insert(step.index, Node::Whole);
            return;
        }
        let node = self
            .members
            .entry(step.index)
            .or_insert_with(|| Node::Nested(Selection::default()));
        if let Node::Nested(inner) = node {
            inner.insert(rest);
        }
    }
}

/// Builds partially-populated copies of entities of type `T`.
pub struct Projector<T> {
    selection: Selection,
    fields: Vec<String>,
    _entity: PhantomData<fn(&T) -> T>,
}

impl<T: Queryable> Projector<T> {
    /// Create a projector for `fields`.
    ///
    /// Paths that do not resolve against `T` are skipped; the remaining
    /// fields still project.
    pub fn new(cache: &ChainCache, fields: &[String]) -> Self {
        let mut selection = Selection::default();
        let mut resolved = Vec::with_capacity(fields.len());
        for field in fields {
            match cache.resolve::<T>(field) {
                Ok(chain) => {
                    selection.insert(chain.steps());
                    resolved.push(chain.path().to_string());
                }
                Err(e) => debug!(field = %field, error = %e, "ignoring unresolved projection field"),
            }
        }
        Self {
            selection,
            fields: resolved,
            _entity: PhantomData,
        }
    }

    /// Resolved field paths, in request order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Check if no requested field resolved.
    pub fn is_empty(&self) -> bool {
        self.selection.members.is_empty()
    }

    /// Copy the selected members of `source` into a default `T`.
    pub fn project(&self, source: &T) -> T {
        let mut target = T::default();
        copy_selection(source, &mut target, &self.selection);
        target
    }

    /// Project every entity of `items`.
    pub fn project_all(&self, items: Vec<T>) -> Vec<T> {
        items.iter().map(|item| self.project(item)).collect()
    }
}

impl<T> std::fmt::Debug for Projector<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projector")
            .field("fields", &self.fields)
            .finish()
    }
}

fn copy_selection(source: &dyn Reflect, target: &mut dyn Reflect, selection: &Selection) {
    let (ReflectRef::Record(from), ReflectMut::Record(to)) = (source.reflect(), target.reflect_mut())
    else {
        return;
    };
    for (&index, node) in &selection.members {
        let (Some(value), Some(slot)) = (from.field(index), to.field_mut(index)) else {
            continue;
        };
        match node {
            Node::Whole => {
                slot.assign(value);
            }
            Node::Nested(inner) => copy_nested(value, slot, inner),
        }
    }
}

fn copy_nested(source: &dyn Reflect, target: &mut dyn Reflect, selection: &Selection) {
    match source.reflect() {
        ReflectRef::Record(_) => copy_selection(source, target, selection),
        ReflectRef::Optional(None) => {
            if let ReflectMut::Optional(slot) = target.reflect_mut() {
                slot.set_none();
            }
        }
        ReflectRef::Optional(Some(inner)) => {
            if let ReflectMut::Optional(slot) = target.reflect_mut() {
                copy_nested(inner, slot.get_or_insert_default(), selection);
            }
        }
        ReflectRef::List(items) => {
            if let ReflectMut::List(slots) = target.reflect_mut() {
                slots.resize_default(items.len());
                for (index, item) in items.iter().enumerate() {
                    if let Some(slot) = slots.get_mut(index) {
                        copy_nested(item, slot, selection);
                    }
                }
            }
        }
        ReflectRef::Scalar(_) => {
            target.assign(source);
        }
    }
}
