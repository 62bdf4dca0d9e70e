//! Scalar values read out of entities.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Scalar kinds an entity member can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Boolean value.
    Bool,
    /// Signed integer of any width.
    Int,
    /// Unsigned integer of any width.
    UInt,
    /// Floating point.
    Float,
    /// UTF-8 text.
    String,
    /// Calendar date.
    Date,
    /// Date and time of day, UTC.
    DateTime,
}

impl ScalarKind {
    /// Check if this kind is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::UInt | ScalarKind::Float)
    }

    /// Check if this kind is text.
    pub fn is_text(&self) -> bool {
        matches!(self, ScalarKind::String)
    }

    /// Check if this kind carries a calendar date.
    pub fn is_temporal(&self) -> bool {
        matches!(self, ScalarKind::Date | ScalarKind::DateTime)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::UInt => "uint",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
            ScalarKind::Date => "date",
            ScalarKind::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// A scalar read from an entity member, or a coerced filter operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time, UTC.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Kind of this value, `None` for null.
    pub fn kind(&self) -> Option<ScalarKind> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ScalarKind::Bool),
            Value::Int(_) => Some(ScalarKind::Int),
            Value::UInt(_) => Some(ScalarKind::UInt),
            Value::Float(_) => Some(ScalarKind::Float),
            Value::String(_) => Some(ScalarKind::String),
            Value::Date(_) => Some(ScalarKind::Date),
            Value::DateTime(_) => Some(ScalarKind::DateTime),
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Calendar date of a date or date-time value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Compare two values, returning their ordering if comparable.
    ///
    /// Numbers compare across signedness and width; a date compares with a
    /// date-time as midnight of that day. Null and mismatched kinds are
    /// incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::UInt(a), Value::UInt(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::UInt(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Value::UInt(a), Value::Int(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::UInt(b)) => a.partial_cmp(&(*b as f64)),
            (Value::UInt(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::DateTime(b)) => Some(a.and_time(NaiveTime::MIN).cmp(b)),
            (Value::DateTime(a), Value::Date(b)) => Some(a.cmp(&b.and_time(NaiveTime::MIN))),
            _ => None,
        }
    }

    /// Typed equality; null equals null.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }

    /// Equality that ignores case when both sides are text.
    pub fn equals_ignore_case(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.to_lowercase() == b.to_lowercase(),
            _ => self.equals(other),
        }
    }

    /// Total order used for sorting.
    ///
    /// Nulls sort before everything and NaN after every other number.
    /// Values of different kinds order by kind: bool, number, text, then
    /// date and date-time.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        self.sort_rank()
            .cmp(&other.sort_rank())
            .then_with(|| self.compare(other).unwrap_or(Ordering::Equal))
    }

    fn sort_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Float(x) if x.is_nan() => 3,
            Value::Int(_) | Value::UInt(_) | Value::Float(_) => 2,
            Value::String(_) => 4,
            Value::Date(_) | Value::DateTime(_) => 5,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::UInt(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

// Conversion implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_numeric_comparison_across_kinds() {
        assert_eq!(Value::Int(5).compare(&Value::UInt(5)), Some(Ordering::Equal));
        assert_eq!(Value::Int(-1).compare(&Value::UInt(0)), Some(Ordering::Less));
        assert_eq!(Value::Float(2.5).compare(&Value::Int(2)), Some(Ordering::Greater));
        assert_eq!(Value::Float(f64::NAN).compare(&Value::Float(1.0)), None);
    }

    #[test]
    fn test_incompatible_kinds() {
        assert_eq!(Value::String("1".into()).compare(&Value::Int(1)), None);
        assert_eq!(Value::Null.compare(&Value::Null), None);
        assert!(!Value::Bool(true).equals(&Value::Int(1)));
    }

    #[test]
    fn test_date_against_datetime() {
        let day = date(2024, 3, 1);
        let noon = day.and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(Value::Date(day).compare(&Value::DateTime(noon)), Some(Ordering::Less));
        assert_eq!(
            Value::DateTime(day.and_time(NaiveTime::MIN)).compare(&Value::Date(day)),
            Some(Ordering::Equal)
        );
        assert_eq!(Value::DateTime(noon).as_date(), Some(day));
    }

    #[test]
    fn test_equality_rules() {
        assert!(Value::Null.equals(&Value::Null));
        assert!(!Value::Null.equals(&Value::Int(0)));
        assert!(Value::from("Chair").equals_ignore_case(&Value::from("CHAIR")));
        assert!(!Value::from("Chair").equals(&Value::from("CHAIR")));
    }

    #[test]
    fn test_sort_cmp_nulls_first() {
        assert_eq!(Value::Null.sort_cmp(&Value::Int(1)), Ordering::Less);
        assert_eq!(Value::Int(1).sort_cmp(&Value::Null), Ordering::Greater);
        assert_eq!(Value::Int(1).sort_cmp(&Value::from("x")), Ordering::Less);
    }

    #[test]
    fn test_sort_cmp_is_total_with_nan() {
        let nan = Value::Float(f64::NAN);
        assert_eq!(nan.sort_cmp(&Value::Float(1.0)), Ordering::Greater);
        assert_eq!(Value::Int(i64::MAX).sort_cmp(&nan), Ordering::Less);
        assert_eq!(nan.sort_cmp(&Value::Float(f64::NAN)), Ordering::Equal);
        assert_eq!(Value::Null.sort_cmp(&nan), Ordering::Less);

        let mut values = vec![
            Value::Float(3.0),
            nan.clone(),
            Value::Float(1.0),
            Value::Null,
            Value::Float(2.0),
            nan,
        ];
        values.sort_by(Value::sort_cmp);
        let finite: Vec<_> = values.iter().skip(1).take(3).cloned().collect();
        assert_eq!(finite, vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)]);
        assert!(values[0].is_null());
        assert!(values[4..].iter().all(|v| matches!(v, Value::Float(x) if x.is_nan())));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::String("a".into()));
        assert_eq!(Value::from(date(2024, 1, 2)).to_string(), "2024-01-02");
    }
}
