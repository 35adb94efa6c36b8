//! Cell values and the fallback comparator used for column sorting
//!
//! Rows carry heterogeneous data, so sorting dispatches on the runtime
//! variant of both cells. The chain is, in order: nulls last, text, numbers,
//! timestamps, lists, and finally "equal" for anything else.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use std::cmp::Ordering;
use std::fmt;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::SortDirection;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
    List(Vec<Value>),
    Bool(bool),
    #[default]
    Null,
    /// Anything without a meaningful ordering (nested objects etc.)
    Opaque(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Interpret the value as a point in time, in epoch milliseconds
    pub fn timestamp_millis(&self) -> Option<f64> {
        match self {
            Value::Date(dt) => Some(dt.timestamp_millis() as f64),
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Text(s) => parse_timestamp(s).map(|dt| dt.timestamp_millis() as f64),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::Opaque(s) => f.write_str(s),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{}", n),
            Value::Date(dt) if dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0 => {
                write!(f, "{}", dt.format("%Y-%m-%d"))
            }
            Value::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            Value::List(items) => f.write_str(&join(items, ", ")),
            Value::Bool(b) => f.write_str(if *b { "Yes" } else { "No" }),
            Value::Null => f.write_str("-"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::Date(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            obj @ serde_json::Value::Object(_) => Value::Opaque(obj.to_string()),
        }
    }
}

/// Parse the textual timestamp formats fleet data shows up in
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Base letters only: decomposed, accents dropped, lowercased
fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Collation-style ordering: base letters first, then accents (unaccented
/// ahead), then case (lowercase ahead), then code points.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| {
            a.nfd()
                .flat_map(char::to_lowercase)
                .cmp(b.nfd().flat_map(char::to_lowercase))
        })
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

fn join(items: &[Value], sep: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Compare two cells for a sort in `direction`.
///
/// Nulls go last whatever the direction. Pairs the chain cannot order
/// (mixed or opaque types) compare equal, so the result is not guaranteed
/// to be a total order.
pub fn compare(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let ord = match (a, b) {
        (Value::Text(x), Value::Text(y)) => locale_cmp(x, y),
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        _ => match (a.timestamp_millis(), b.timestamp_millis()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => match (a, b) {
                (Value::List(x), Value::List(y)) => locale_cmp(&join(x, ","), &join(y, ",")),
                _ => Ordering::Equal,
            },
        },
    };

    direction.apply(ord)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASC: SortDirection = SortDirection::Ascending;
    const DESC: SortDirection = SortDirection::Descending;

    #[test]
    fn test_nulls_sort_last_in_both_directions() {
        let n = Value::Null;
        let five = Value::from(5);
        assert_eq!(compare(&n, &five, ASC), Ordering::Greater);
        assert_eq!(compare(&n, &five, DESC), Ordering::Greater);
        assert_eq!(compare(&five, &n, DESC), Ordering::Less);
        assert_eq!(compare(&n, &Value::Null, ASC), Ordering::Equal);
    }

    #[test]
    fn test_text_is_case_insensitive() {
        assert_eq!(locale_cmp("amy", "Bob"), Ordering::Less);
        assert_eq!(locale_cmp("Zed", "alpha"), Ordering::Greater);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(compare(&"amy".into(), &"Bob".into(), DESC), Ordering::Greater);
    }

    #[test]
    fn test_accents_sort_with_their_base_letter() {
        assert_eq!(locale_cmp("Élodie", "Zoe"), Ordering::Less);
        assert_eq!(locale_cmp("Ärne", "Bo"), Ordering::Less);
        assert_eq!(locale_cmp("resume", "résumé"), Ordering::Less);
        assert_eq!(locale_cmp("résumé", "resumes"), Ordering::Less);
        assert_eq!(locale_cmp("Elodie", "élodie"), Ordering::Less);
        assert_eq!(locale_cmp("élodie", "Élodie"), Ordering::Less);
    }

    #[test]
    fn test_numbers_and_nan() {
        assert_eq!(compare(&5.into(), &12.into(), ASC), Ordering::Less);
        assert_eq!(compare(&5.into(), &12.into(), DESC), Ordering::Greater);
        assert_eq!(compare(&f64::NAN.into(), &1.into(), ASC), Ordering::Equal);
    }

    #[test]
    fn test_dates_compare_against_text_and_numbers() {
        let d = Value::Date(parse_timestamp("2024-03-01").unwrap());
        let later = Value::from("2024-06-15T08:30:00Z");
        assert_eq!(compare(&d, &later, ASC), Ordering::Less);

        let epoch = Value::from(0);
        assert_eq!(compare(&d, &epoch, ASC), Ordering::Greater);
    }

    #[test]
    fn test_two_date_strings_use_text_order() {
        // Both are text, so they never reach the timestamp step
        let a = Value::from("2024-1-5");
        let b = Value::from("2024-01-05");
        assert_eq!(compare(&a, &b, ASC), locale_cmp("2024-1-5", "2024-01-05"));
    }

    #[test]
    fn test_lists_join_before_comparing() {
        let a = Value::List(vec!["ev".into(), "van".into()]);
        let b = Value::List(vec!["sedan".into()]);
        assert_eq!(compare(&a, &b, ASC), Ordering::Less);
        assert_eq!(compare(&a, &b, DESC), Ordering::Greater);
    }

    #[test]
    fn test_mixed_types_are_equal() {
        let list = Value::List(vec!["x".into()]);
        assert_eq!(compare(&list, &"x".into(), ASC), Ordering::Equal);
        assert_eq!(compare(&Value::Opaque("{}".into()), &3.into(), ASC), Ordering::Equal);
        assert_eq!(compare(&"not a date".into(), &3.into(), DESC), Ordering::Equal);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(12).to_string(), "12");
        assert_eq!(Value::from(4.5).to_string(), "4.5");
        assert_eq!(Value::Null.to_string(), "-");
        assert_eq!(Value::from(true).to_string(), "Yes");
        assert_eq!(
            Value::Date(parse_timestamp("2023-11-02").unwrap()).to_string(),
            "2023-11-02"
        );
        assert_eq!(
            Value::List(vec!["a".into(), "b".into()]).to_string(),
            "a, b"
        );
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"a": [1, "x"], "b": null, "c": {"k": 1}});
        let obj = json.as_object().unwrap();
        assert_eq!(
            Value::from(obj["a"].clone()),
            Value::List(vec![Value::Number(1.0), Value::Text("x".into())])
        );
        assert!(Value::from(obj["b"].clone()).is_null());
        assert!(matches!(Value::from(obj["c"].clone()), Value::Opaque(_)));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-02-29").is_some());
        assert!(parse_timestamp("2024-02-29 13:45").is_some());
        assert!(parse_timestamp("2024-02-29T13:45:10").is_some());
        assert!(parse_timestamp("2024-02-29T13:45:10+02:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
