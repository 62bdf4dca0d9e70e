//! Built-in [`Reflect`] implementations for scalars and wrappers.

use std::any::Any;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::{assign_from, List, OptionalMut, Reflect, ReflectMut, ReflectRef, Shape};
use crate::value::{ScalarKind, Value};

macro_rules! impl_scalar {
    ($ty:ty, $kind:expr, |$v:ident| $to_value:expr) => {
        impl Reflect for $ty {
            fn shape() -> Shape {
                Shape::Scalar($kind)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }

            fn reflect(&self) -> ReflectRef<'_> {
                let $v = self;
                ReflectRef::Scalar($to_value)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Scalar
            }

            fn assign(&mut self, source: &dyn Reflect) -> bool {
                assign_from(self, source)
            }
        }
    };
}

impl_scalar!(String, ScalarKind::String, |v| Value::String(v.clone()));
impl_scalar!(char, ScalarKind::String, |v| Value::String(v.to_string()));
impl_scalar!(bool, ScalarKind::Bool, |v| Value::Bool(*v));

impl_scalar!(i8, ScalarKind::Int, |v| Value::Int(i64::from(*v)));
impl_scalar!(i16, ScalarKind::Int, |v| Value::Int(i64::from(*v)));
impl_scalar!(i32, ScalarKind::Int, |v| Value::Int(i64::from(*v)));
impl_scalar!(i64, ScalarKind::Int, |v| Value::Int(*v));
impl_scalar!(isize, ScalarKind::Int, |v| Value::Int(*v as i64));

impl_scalar!(u8, ScalarKind::UInt, |v| Value::UInt(u64::from(*v)));
impl_scalar!(u16, ScalarKind::UInt, |v| Value::UInt(u64::from(*v)));
impl_scalar!(u32, ScalarKind::UInt, |v| Value::UInt(u64::from(*v)));
impl_scalar!(u64, ScalarKind::UInt, |v| Value::UInt(*v));
impl_scalar!(usize, ScalarKind::UInt, |v| Value::UInt(*v as u64));

impl_scalar!(f32, ScalarKind::Float, |v| Value::Float(f64::from(*v)));
impl_scalar!(f64, ScalarKind::Float, |v| Value::Float(*v));

impl_scalar!(NaiveDate, ScalarKind::Date, |v| Value::Date(*v));
impl_scalar!(NaiveDateTime, ScalarKind::DateTime, |v| Value::DateTime(*v));
impl_scalar!(DateTime<Utc>, ScalarKind::DateTime, |v| Value::DateTime(v.naive_utc()));

impl<T: Reflect + Default + Clone> Reflect for Option<T> {
    fn shape() -> Shape {
        Shape::Optional(T::shape)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn reflect(&self) -> ReflectRef<'_> {
        ReflectRef::Optional(self.as_ref().map(|inner| inner as &dyn Reflect))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Optional(self)
    }

    fn assign(&mut self, source: &dyn Reflect) -> bool {
        assign_from(self, source)
    }
}

impl<T: Reflect + Default + Clone> OptionalMut for Option<T> {
    fn get_or_insert_default(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }

    fn set_none(&mut self) {
        *self = None;
    }
}

impl<T: Reflect + Default + Clone> Reflect for Vec<T> {
    fn shape() -> Shape {
        Shape::List(T::shape)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn reflect(&self) -> ReflectRef<'_> {
        ReflectRef::List(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::List(self)
    }

    fn assign(&mut self, source: &dyn Reflect) -> bool {
        assign_from(self, source)
    }
}

impl<T: Reflect + Default + Clone> List for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|item| item as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|item| item as &mut dyn Reflect)
    }

    fn resize_default(&mut self, len: usize) {
        self.resize_with(len, T::default);
    }
}

// Boxes are transparent: they report and expose the boxed value.
impl<T: Reflect + Clone> Reflect for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn as_any(&self) -> &dyn Any {
        (**self).as_any()
    }

    fn reflect(&self) -> ReflectRef<'_> {
        (**self).reflect()
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        (**self).reflect_mut()
    }

    fn assign(&mut self, source: &dyn Reflect) -> bool {
        (**self).assign(source)
    }
}
