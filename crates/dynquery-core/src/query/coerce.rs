//! Coercion of untyped wire operands to a member's scalar kind.
//!
//! Every comparison operator goes through [`coerce`]; a `None` result means
//! the operand cannot be expressed in the member's type and the clause
//! evaluates to false.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value as Json;

use crate::value::{ScalarKind, Value};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Calendar component compared by `MonthPart` / `DayPart`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarPart {
    /// Month of year, 1-12.
    Month,
    /// Day of month, 1-31.
    Day,
}

impl CalendarPart {
    fn of(&self, date: NaiveDate) -> u32 {
        match self {
            CalendarPart::Month => date.month(),
            CalendarPart::Day => date.day(),
        }
    }

    fn range(&self) -> std::ops::RangeInclusive<u32> {
        match self {
            CalendarPart::Month => 1..=12,
            CalendarPart::Day => 1..=31,
        }
    }
}

/// Coerce a wire operand to `kind`.
///
/// JSON `null` coerces to [`Value::Null`] for every kind.
pub fn coerce(raw: &Json, kind: ScalarKind) -> Option<Value> {
    if raw.is_null() {
        return Some(Value::Null);
    }
    match kind {
        ScalarKind::Bool => coerce_bool(raw).map(Value::Bool),
        ScalarKind::Int => coerce_int(raw).map(Value::Int),
        ScalarKind::UInt => coerce_uint(raw).map(Value::UInt),
        ScalarKind::Float => coerce_float(raw).map(Value::Float),
        ScalarKind::String => match raw {
            Json::String(s) => Some(Value::String(s.clone())),
            Json::Number(n) => Some(Value::String(n.to_string())),
            Json::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        ScalarKind::Date => raw.as_str().and_then(parse_date).map(Value::Date),
        ScalarKind::DateTime => raw.as_str().and_then(parse_datetime).map(Value::DateTime),
    }
}

/// Coerce a `MonthPart` / `DayPart` operand.
///
/// Accepts an integer, a numeric string, or a date string whose component
/// is used. Out-of-range numbers are uncoercible.
pub fn coerce_calendar_part(raw: &Json, part: CalendarPart) -> Option<u32> {
    let number = match raw {
        Json::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Json::String(s) => match s.trim().parse::<u32>() {
            Ok(n) => Some(n),
            Err(_) => parse_date(s).map(|date| part.of(date)),
        },
        _ => None,
    }?;
    part.range().contains(&number).then_some(number)
}

/// Calendar component of a date-valued leaf.
pub fn calendar_part(value: &Value, part: CalendarPart) -> Option<u32> {
    value.as_date().map(|date| part.of(date))
}

fn coerce_bool(raw: &Json) -> Option<bool> {
    match raw {
        Json::Bool(b) => Some(*b),
        Json::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        Json::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_int(raw: &Json) -> Option<i64> {
    match raw {
        Json::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral_f64)),
        Json::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_f64))
        }
        _ => None,
    }
}

fn coerce_uint(raw: &Json) -> Option<u64> {
    coerce_int(raw)
        .and_then(|i| u64::try_from(i).ok())
        .or_else(|| match raw {
            Json::Number(n) => n.as_u64(),
            Json::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        })
}

fn coerce_float(raw: &Json) -> Option<f64> {
    match raw {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn integral_f64(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Parse an ISO-8601 date, or the date part of an ISO-8601 date-time.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
}

/// Parse an ISO-8601 date-time; offsets are normalised to UTC and a bare
/// date reads as midnight.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(coerce(&json!("42"), ScalarKind::Int), Some(Value::Int(42)));
        assert_eq!(coerce(&json!(" 7 "), ScalarKind::UInt), Some(Value::UInt(7)));
        assert_eq!(coerce(&json!("2.5"), ScalarKind::Float), Some(Value::Float(2.5)));
        assert_eq!(coerce(&json!(100.0), ScalarKind::Int), Some(Value::Int(100)));
        assert_eq!(coerce(&json!(100), ScalarKind::Float), Some(Value::Float(100.0)));
    }

    #[test]
    fn test_uncoercible() {
        assert_eq!(coerce(&json!("abc"), ScalarKind::Int), None);
        assert_eq!(coerce(&json!(1.5), ScalarKind::Int), None);
        assert_eq!(coerce(&json!(-1), ScalarKind::UInt), None);
        assert_eq!(coerce(&json!("NaN"), ScalarKind::Float), None);
        assert_eq!(coerce(&json!([1]), ScalarKind::String), None);
        assert_eq!(coerce(&json!("yesterday"), ScalarKind::Date), None);
        assert_eq!(coerce(&json!(20240101), ScalarKind::Date), None);
    }

    #[test]
    fn test_null_coerces_to_null() {
        for kind in [ScalarKind::Int, ScalarKind::String, ScalarKind::Date] {
            assert_eq!(coerce(&Json::Null, kind), Some(Value::Null));
        }
    }

    #[test]
    fn test_text_from_scalars() {
        assert_eq!(coerce(&json!(12), ScalarKind::String), Some(Value::from("12")));
        assert_eq!(coerce(&json!(true), ScalarKind::String), Some(Value::from("true")));
        assert_eq!(coerce(&json!("TRUE"), ScalarKind::Bool), Some(Value::Bool(true)));
        assert_eq!(coerce(&json!(0), ScalarKind::Bool), Some(Value::Bool(false)));
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            coerce(&json!("2024-02-29"), ScalarKind::Date),
            Some(Value::Date(date(2024, 2, 29)))
        );
        assert_eq!(
            coerce(&json!("2024-02-29T23:15:00"), ScalarKind::Date),
            Some(Value::Date(date(2024, 2, 29)))
        );
        assert_eq!(
            coerce(&json!("2024-02-29"), ScalarKind::DateTime),
            Some(Value::DateTime(date(2024, 2, 29).and_time(NaiveTime::MIN)))
        );
    }

    #[test]
    fn test_datetime_offsets_normalised() {
        let parsed = parse_datetime("2024-03-01T10:00:00+02:00").unwrap();
        assert_eq!(parsed, date(2024, 3, 1).and_hms_opt(8, 0, 0).unwrap());

        let fractional = parse_datetime("2024-03-01T10:00:00.250").unwrap();
        assert_eq!(
            fractional,
            date(2024, 3, 1).and_hms_milli_opt(10, 0, 0, 250).unwrap()
        );
        assert!(parse_datetime("2024-03-01 10:00:00").is_some());
        assert!(parse_datetime("03/01/2024").is_none());
    }

    #[test]
    fn test_calendar_parts() {
        assert_eq!(coerce_calendar_part(&json!(3), CalendarPart::Month), Some(3));
        assert_eq!(coerce_calendar_part(&json!("12"), CalendarPart::Month), Some(12));
        assert_eq!(coerce_calendar_part(&json!(13), CalendarPart::Month), None);
        assert_eq!(coerce_calendar_part(&json!(0), CalendarPart::Day), None);
        assert_eq!(
            coerce_calendar_part(&json!("2024-07-19"), CalendarPart::Day),
            Some(19)
        );
        assert_eq!(
            calendar_part(&Value::Date(date(2024, 7, 19)), CalendarPart::Month),
            Some(7)
        );
        assert_eq!(calendar_part(&Value::Int(7), CalendarPart::Month), None);
    }
}
