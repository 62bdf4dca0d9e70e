//! Field path resolution.
//!
//! A dot-separated path such as `"Items.ItemName"` is resolved once against
//! an entity's [`Shape`] into an [`AccessorChain`]. The chain records, for
//! every segment, which member to read and which wrappers sit between that
//! member and the next segment: an `Option` is an [`Hop::Unwrap`] and a
//! `Vec` is a [`Hop::FanOut`], the 1-to-N point where the rest of the chain
//! applies to every element.

use std::ops::ControlFlow;

use thiserror::Error;

use crate::reflect::{Reflect, ReflectRef, Shape};
use crate::value::{ScalarKind, Value};

/// Field path resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The path has no segments.
    #[error("field path is empty")]
    EmptyPath,

    /// A segment names no member of the type reached so far.
    #[error("`{entity}` has no field `{segment}` (in path `{path}`)")]
    UnknownField {
        /// Type the segment was looked up on.
        entity: String,
        /// Full field path.
        path: String,
        /// Offending segment.
        segment: String,
    },

    /// A segment follows a member that has no members of its own.
    #[error("cannot read `{segment}` from `{entity}` (in path `{path}`)")]
    NotNavigable {
        /// Type the segment was applied to.
        entity: String,
        /// Full field path.
        path: String,
        /// Offending segment.
        segment: String,
    },
}

/// Wrapper crossed after reading a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    /// Step into a present `Option`; an absent one ends the walk with null.
    Unwrap,
    /// Continue with every element of a collection.
    FanOut,
}

/// One resolved path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Declared member name.
    pub name: &'static str,
    /// Member index in the record's field list.
    pub index: usize,
    /// Wrappers between the member and the next segment, outermost first.
    pub hops: Vec<Hop>,
}

impl Step {
    /// Check if this step crosses a collection.
    pub fn fans_out(&self) -> bool {
        self.hops.contains(&Hop::FanOut)
    }
}

/// A resolved field path, reusable across instances of its entity type.
#[derive(Debug, Clone)]
pub struct AccessorChain {
    path: String,
    entity: &'static str,
    steps: Vec<Step>,
    leaf: Shape,
}

/// A value reached at the end of an accessor chain.
#[derive(Clone)]
pub enum Leaf<'a> {
    /// An absent optional somewhere along the path.
    Null,
    /// A scalar member.
    Value(Value),
    /// A record or collection member.
    Composite(&'a dyn Reflect),
}

impl Leaf<'_> {
    /// Check if this leaf is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Leaf::Null)
    }

    /// Scalar value of this leaf, with null as [`Value::Null`].
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Leaf::Null => Some(Value::Null),
            Leaf::Value(v) => Some(v.clone()),
            Leaf::Composite(_) => None,
        }
    }
}

impl std::fmt::Debug for Leaf<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Leaf::Null => f.write_str("Null"),
            Leaf::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Leaf::Composite(_) => f.write_str("Composite"),
        }
    }
}

/// Resolve `path` against entity type `T`.
pub fn resolve<T: Reflect>(path: &str) -> Result<AccessorChain, ResolveError> {
    resolve_shape(T::shape(), path)
}

/// Resolve `path` against a root shape.
pub fn resolve_shape(root: Shape, path: &str) -> Result<AccessorChain, ResolveError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ResolveError::EmptyPath);
    }

    let entity = match root {
        Shape::Record(info) => info.name,
        _ => "",
    };

    let mut current = root;
    let mut steps = Vec::new();
    for segment in trimmed.split('.').map(str::trim) {
        let info = match current {
            Shape::Record(info) => info,
            other => {
                return Err(ResolveError::NotNavigable {
                    entity: other.describe(),
                    path: trimmed.to_string(),
                    segment: segment.to_string(),
                })
            }
        };
        let (index, field) = info.find(segment).ok_or_else(|| ResolveError::UnknownField {
            entity: info.name.to_string(),
            path: trimmed.to_string(),
            segment: segment.to_string(),
        })?;

        let (hops, inner) = peel(field.shape());
        steps.push(Step {
            name: field.name,
            index,
            hops,
        });
        current = inner;
    }

    Ok(AccessorChain {
        path: trimmed.to_string(),
        entity,
        steps,
        leaf: current,
    })
}

fn peel(mut shape: Shape) -> (Vec<Hop>, Shape) {
    let mut hops = Vec::new();
    loop {
        match shape {
            Shape::Optional(inner) => {
                hops.push(Hop::Unwrap);
                shape = inner();
            }
            Shape::List(inner) => {
                hops.push(Hop::FanOut);
                shape = inner();
            }
            other => return (hops, other),
        }
    }
}

impl AccessorChain {
    /// The path as resolved, trimmed.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name of the root entity type.
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Resolved segments in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Shape at the end of the chain, with wrappers removed.
    pub fn leaf(&self) -> Shape {
        self.leaf
    }

    /// Scalar kind at the end of the chain, if it is a leaf value.
    pub fn leaf_kind(&self) -> Option<ScalarKind> {
        match self.leaf {
            Shape::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    /// Check if any step crosses a collection.
    pub fn fans_out(&self) -> bool {
        self.steps.iter().any(Step::fans_out)
    }

    /// Visit every leaf reachable from `root`, stopping early on `Break`.
    ///
    /// A non-fan-out chain yields exactly one leaf. A fan-out chain yields
    /// one leaf per reachable element, so an empty collection yields none.
    pub fn walk<'a>(
        &self,
        root: &'a dyn Reflect,
        visit: &mut dyn FnMut(Leaf<'a>) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        walk_steps(&self.steps, Reach::Elements, root, visit)
    }

    /// Visit the member the path names, without spreading a collection at
    /// the last segment.
    ///
    /// A present collection in final position is one composite leaf, even
    /// when empty; fan-out at earlier segments still applies.
    pub fn walk_members<'a>(
        &self,
        root: &'a dyn Reflect,
        visit: &mut dyn FnMut(Leaf<'a>) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        walk_steps(&self.steps, Reach::Member, root, visit)
    }

    /// Check if any leaf reachable from `root` satisfies `test`.
    pub fn any(&self, root: &dyn Reflect, mut test: impl FnMut(&Leaf<'_>) -> bool) -> bool {
        self.walk(root, &mut |leaf| {
            if test(&leaf) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .is_break()
    }

    /// Check if any member reached by [`walk_members`](Self::walk_members)
    /// satisfies `test`.
    pub fn any_member(
        &self,
        root: &dyn Reflect,
        mut test: impl FnMut(&Leaf<'_>) -> bool,
    ) -> bool {
        self.walk_members(root, &mut |leaf| {
            if test(&leaf) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .is_break()
    }

    /// Collect every leaf reachable from `root`.
    pub fn leaves<'a>(&self, root: &'a dyn Reflect) -> Vec<Leaf<'a>> {
        let mut out = Vec::new();
        let _ = self.walk(root, &mut |leaf| {
            out.push(leaf);
            ControlFlow::Continue(())
        });
        out
    }

    /// Read the scalar at the end of a non-fan-out chain.
    ///
    /// Returns `None` when the chain fans out or ends on a composite member.
    pub fn value_of(&self, root: &dyn Reflect) -> Option<Value> {
        if self.fans_out() {
            return None;
        }
        let mut found = None;
        let _ = self.walk(root, &mut |leaf| {
            found = leaf.to_value();
            ControlFlow::Break(())
        });
        found
    }
}

/// How far the final segment reaches into a collection member.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Reach {
    /// Spread into the elements.
    Elements,
    /// Stop at the collection itself.
    Member,
}

fn walk_steps<'a>(
    steps: &[Step],
    reach: Reach,
    value: &'a dyn Reflect,
    visit: &mut dyn FnMut(Leaf<'a>) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let Some((step, rest)) = steps.split_first() else {
        return visit(leaf_of(value));
    };
    match value.reflect() {
        ReflectRef::Record(record) => match record.field(step.index) {
            Some(member) => walk_hops(&step.hops, rest, reach, member, visit),
            None => ControlFlow::Continue(()),
        },
        _ => ControlFlow::Continue(()),
    }
}

fn walk_hops<'a>(
    hops: &[Hop],
    steps: &[Step],
    reach: Reach,
    value: &'a dyn Reflect,
    visit: &mut dyn FnMut(Leaf<'a>) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let Some((hop, more)) = hops.split_first() else {
        return walk_steps(steps, reach, value, visit);
    };
    match (hop, value.reflect()) {
        (Hop::Unwrap, ReflectRef::Optional(Some(inner))) => {
            walk_hops(more, steps, reach, inner, visit)
        }
        (Hop::Unwrap, ReflectRef::Optional(None)) => visit(Leaf::Null),
        (Hop::FanOut, ReflectRef::List(_)) if steps.is_empty() && reach == Reach::Member => {
            visit(Leaf::Composite(value))
        }
        (Hop::FanOut, ReflectRef::List(list)) => {
            for item in list.iter() {
                walk_hops(more, steps, reach, item, visit)?;
            }
            ControlFlow::Continue(())
        }
        _ => ControlFlow::Continue(()),
    }
}

fn leaf_of(value: &dyn Reflect) -> Leaf<'_> {
    match value.reflect() {
        ReflectRef::Scalar(v) => Leaf::Value(v),
        _ => Leaf::Composite(value),
    }
}
