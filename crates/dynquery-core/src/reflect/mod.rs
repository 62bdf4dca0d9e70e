//! Runtime type metadata for entity graphs.
//!
//! Entities describe their members through [`Reflect`], normally generated
//! with `#[derive(Queryable)]`. The engine never names an entity type
//! directly: it walks [`Shape`] metadata to resolve field paths and walks
//! [`ReflectRef`]/[`ReflectMut`] views to read and populate instances.
//!
//! Wrappers are described structurally: `Option<T>` is [`Shape::Optional`],
//! `Vec<T>` is [`Shape::List`], and `Box<T>` is transparent.

mod impls;

use std::any::Any;
use std::fmt;

use crate::value::{ScalarKind, Value};

/// Static description of a type's structure.
///
/// Nested shapes are produced through function pointers so that recursive
/// entity graphs can be described without infinite metadata.
#[derive(Clone, Copy)]
pub enum Shape {
    /// A leaf value.
    Scalar(ScalarKind),
    /// A struct with named members.
    Record(&'static RecordInfo),
    /// A nullable wrapper around another shape.
    Optional(fn() -> Shape),
    /// A collection of another shape.
    List(fn() -> Shape),
}

impl Shape {
    /// Human-readable type description, e.g. `Option<Vec<Item>>`.
    pub fn describe(&self) -> String {
        match self {
            Shape::Scalar(kind) => kind.to_string(),
            Shape::Record(info) => info.name.to_string(),
            Shape::Optional(inner) => format!("Option<{}>", inner().describe()),
            Shape::List(inner) => format!("Vec<{}>", inner().describe()),
        }
    }

    /// Check if this shape is a leaf value.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Shape::Scalar(_))
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Member list of a record type.
pub struct RecordInfo {
    /// Type name.
    pub name: &'static str,
    /// Addressable members, in declaration order.
    pub fields: &'static [FieldInfo],
}

impl RecordInfo {
    /// Find a member by path segment.
    ///
    /// Matching ignores ASCII/Unicode case and underscores, so `ItemName`,
    /// `itemName` and `item_name` all name the same member.
    pub fn find(&'static self, segment: &str) -> Option<(usize, &'static FieldInfo)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.matches(segment))
    }
}

impl fmt::Debug for RecordInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordInfo")
            .field("name", &self.name)
            .field("fields", &self.fields.iter().map(|field| field.name).collect::<Vec<_>>())
            .finish()
    }
}

/// One addressable member of a record.
pub struct FieldInfo {
    /// Member name as exposed to field paths.
    pub name: &'static str,
    /// Shape of the member's type.
    pub shape: fn() -> Shape,
}

impl FieldInfo {
    /// Shape of the member's type.
    pub fn shape(&self) -> Shape {
        (self.shape)()
    }

    /// Check if a path segment names this member.
    pub fn matches(&self, segment: &str) -> bool {
        normalized(self.name).eq(normalized(segment))
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.name, self.shape())
    }
}

fn normalized(name: &str) -> impl Iterator<Item = char> + '_ {
    name.chars().filter(|c| *c != '_').flat_map(char::to_lowercase)
}

/// Dynamic access to a value whose type is only known at runtime.
pub trait Reflect: Any + Send + Sync {
    /// Static shape of the implementing type.
    fn shape() -> Shape
    where
        Self: Sized;

    /// Upcast for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Read-only structural view.
    fn reflect(&self) -> ReflectRef<'_>;

    /// Mutable structural view.
    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Replace `self` with a deep copy of `source`.
    ///
    /// Returns `false` and leaves `self` untouched when `source` has a
    /// different concrete type.
    fn assign(&mut self, source: &dyn Reflect) -> bool;
}

/// Read-only structural view of a reflected value.
pub enum ReflectRef<'a> {
    /// A leaf value, copied out.
    Scalar(Value),
    /// A struct.
    Record(&'a dyn Record),
    /// A nullable wrapper.
    Optional(Option<&'a dyn Reflect>),
    /// A collection.
    List(&'a dyn List),
}

/// Mutable structural view of a reflected value.
pub enum ReflectMut<'a> {
    /// A leaf value; replace it through [`Reflect::assign`].
    Scalar,
    /// A struct.
    Record(&'a mut dyn Record),
    /// A nullable wrapper.
    Optional(&'a mut dyn OptionalMut),
    /// A collection.
    List(&'a mut dyn List),
}

/// Member access on a reflected struct.
///
/// Indices follow the order of [`RecordInfo::fields`].
pub trait Record: Send + Sync {
    /// Static member list.
    fn record_info(&self) -> &'static RecordInfo;

    /// Member at `index`.
    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    /// Mutable member at `index`.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Element access on a reflected collection.
pub trait List: Send + Sync {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Element at `index`.
    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    /// Mutable element at `index`.
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Truncate or extend with default elements to exactly `len` elements.
    fn resize_default(&mut self, len: usize);

    /// Check if the collection is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> dyn List + 'a {
    /// Iterate over the elements.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Reflect> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }
}

/// Mutation of a reflected nullable wrapper.
pub trait OptionalMut: Send + Sync {
    /// Inner value, inserting a default one when absent.
    fn get_or_insert_default(&mut self) -> &mut dyn Reflect;

    /// Clear the wrapper.
    fn set_none(&mut self);
}

/// Entity types the engine can query.
///
/// `Default` provides the zero value that unselected members keep in a
/// projection.
pub trait Queryable: Reflect + Default + Clone {}

impl<T: Reflect + Default + Clone> Queryable for T {}

/// Deep-copy `source` into `target` when both share a concrete type.
///
/// Shared implementation of [`Reflect::assign`] for generated and built-in
/// impls.
pub fn assign_from<T: Reflect + Clone>(target: &mut T, source: &dyn Reflect) -> bool {
    match source.as_any().downcast_ref::<T>() {
        Some(value) => {
            target.clone_from(value);
            true
        }
        None => false,
    }
}

/// Read a top-level member of a record as a scalar.
///
/// Returns `None` for unknown members and for members that are not leaf
/// values; an absent optional reads as [`Value::Null`].
pub fn scalar_field(value: &dyn Reflect, name: &str) -> Option<Value> {
    let ReflectRef::Record(record) = value.reflect() else {
        return None;
    };
    let (index, _) = record.record_info().find(name)?;
    let mut current = record.field(index)?;
    loop {
        match current.reflect() {
            ReflectRef::Scalar(v) => return Some(v),
            ReflectRef::Optional(Some(inner)) => current = inner,
            ReflectRef::Optional(None) => return Some(Value::Null),
            ReflectRef::Record(_) | ReflectRef::List(_) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Queryable;

    #[derive(Debug, Clone, Default, PartialEq, Queryable)]
    struct Tag {
        label: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Queryable)]
    struct Article {
        item_name: String,
        #[query(rename = "Rating")]
        score: Option<i32>,
        tags: Vec<Tag>,
        #[query(skip)]
        internal: u8,
    }

    fn record_of(shape: Shape) -> &'static RecordInfo {
        match shape {
            Shape::Record(info) => info,
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn test_derived_metadata() {
        let info = record_of(Article::shape());
        assert_eq!(info.name, "Article");
        let names: Vec<_> = info.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["item_name", "Rating", "tags"]);
        assert_eq!(info.fields[1].shape().describe(), "Option<int>");
        assert_eq!(info.fields[2].shape().describe(), "Vec<Tag>");
    }

    #[test]
    fn test_member_matching() {
        let info = record_of(Article::shape());
        assert_eq!(info.find("ItemName").map(|(i, _)| i), Some(0));
        assert_eq!(info.find("itemname").map(|(i, _)| i), Some(0));
        assert_eq!(info.find("item_name").map(|(i, _)| i), Some(0));
        assert_eq!(info.find("rating").map(|(i, _)| i), Some(1));
        assert!(info.find("score").is_none());
        assert!(info.find("internal").is_none());
        assert!(info.find("item").is_none());
    }

    #[test]
    fn test_record_access() {
        let mut article = Article {
            item_name: "Lamp".into(),
            score: Some(4),
            tags: vec![Tag { label: "home".into() }],
            internal: 7,
        };

        assert_eq!(scalar_field(&article, "ItemName"), Some(Value::from("Lamp")));
        assert_eq!(scalar_field(&article, "Rating"), Some(Value::Int(4)));
        assert_eq!(scalar_field(&article, "Tags"), None);

        let ReflectMut::Record(record) = article.reflect_mut() else {
            panic!("expected record");
        };
        let name = record.field_mut(0).unwrap();
        assert!(name.assign(&"Desk".to_string()));
        assert!(!name.assign(&5i32));
        assert_eq!(article.item_name, "Desk");
    }

    #[test]
    fn test_list_and_optional_views() {
        let mut tags = vec![Tag::default(); 2];
        match tags.reflect_mut() {
            ReflectMut::List(list) => list.resize_default(3),
            _ => panic!("expected list"),
        }
        assert_eq!(tags.len(), 3);

        let mut maybe: Option<Tag> = None;
        match maybe.reflect_mut() {
            ReflectMut::Optional(opt) => {
                opt.get_or_insert_default();
            }
            _ => panic!("expected optional"),
        }
        assert_eq!(maybe, Some(Tag::default()));
    }

    #[test]
    fn test_boxed_is_transparent() {
        let boxed = Box::new(Tag { label: "x".into() });
        assert_eq!(<Box<Tag>>::shape().describe(), "Tag");
        assert_eq!(scalar_field(&boxed, "label"), Some(Value::from("x")));
    }
}
