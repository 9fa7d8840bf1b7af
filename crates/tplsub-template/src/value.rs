//! Dynamic values flowing through template evaluation.
//!
//! Provides [`Value`], the closed set of shapes a template function can
//! receive or return. Values come from decoded JSON, from literals written in a
//! template, or from other functions (e.g. `parseDate` yields a
//! [`Value::Timestamp`]).

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use tplsub_core::error::{TplError, TplResult};

/// A dynamic template value.
///
/// Values are never mutated in place; every function builds a new value.
/// `List` order is significant, `Map` key order is not.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absence of a value (JSON `null`).
    Null,
    /// A boolean.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating point number.
    Float(f64),
    /// A UTF-8 string.
    Text(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A string-keyed mapping.
    Map(HashMap<String, Value>),
    /// An instant with calendar fields and a UTC offset.
    Timestamp(DateTime<FixedOffset>),
}

impl Value {
    /// Returns the lowercase name of this value's variant, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Converts this value to its canonical text rendering.
    ///
    /// - `Null` renders as the empty string
    /// - floats use the shortest decimal that reads back to the same value
    /// - timestamps render as RFC 3339
    /// - lists render as `[a, b]` and maps as `{k: v}` with keys sorted
    ///
    /// List, map, and timestamp renderings are for display only.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => {
                let inner: Vec<String> = items.iter().map(Self::to_display_string).collect();
                format!("[{}]", inner.join(", "))
            }
            Self::Map(map) => {
                let mut entries: Vec<(&String, &Self)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                let inner: Vec<String> = entries
                    .into_iter()
                    .map(|(k, v)| format!("{k}: {}", v.to_display_string()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
            Self::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }

    /// Returns the string contents if this is `Text`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the items if this is a `List`.
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this is a `Map`.
    pub const fn as_map(&self) -> Option<&HashMap<String, Self>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the instant if this is a `Timestamp`.
    pub const fn as_timestamp(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    /// Returns `true` if this is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts this value to a JSON value.
    ///
    /// Map keys come out sorted. Timestamps become RFC 3339 strings.
    ///
    /// # Errors
    ///
    /// Returns [`TplError::SerializationError`] for NaN or infinite floats,
    /// which JSON cannot represent.
    pub fn to_json(&self) -> TplResult<serde_json::Value> {
        Ok(match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| {
                    TplError::SerializationError(format!("float {f} has no JSON representation"))
                })?,
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| v.to_json().map_err(|e| e.context(format!("element {i}"))))
                    .collect::<TplResult<_>>()?,
            ),
            Self::Map(map) => {
                let mut object = serde_json::Map::new();
                for (k, v) in map {
                    let json = v.to_json().map_err(|e| e.context(format!("key '{k}'")))?;
                    object.insert(k.clone(), json);
                }
                serde_json::Value::Object(object)
            }
            Self::Timestamp(ts) => {
                serde_json::Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl PartialEq for Value {
    #[allow(clippy::cast_precision_loss)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

// -- From implementations --

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        Self::Timestamp(ts)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts.fixed_offset())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(m: HashMap<String, T>) -> Self {
        Self::Map(m.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    /// Decodes JSON: numbers that fit `i64` become `Int`, all other numbers
    /// become `Float`.
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::Null
                }
            }
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(arr) => Self::List(arr.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_value_from_str() {
        let v: Value = "hello".into();
        assert_eq!(v, Value::Text("hello".to_string()));
    }

    #[test]
    fn test_value_from_vec() {
        let v: Value = vec![1i32, 2, 3].into();
        assert_eq!(v.to_display_string(), "[1, 2, 3]");
    }

    #[test]
    fn test_value_from_option() {
        let v: Value = Some(42i32).into();
        assert_eq!(v, Value::Int(42));
        let v: Value = Option::<i32>::None.into();
        assert!(v.is_null());
    }

    #[test]
    fn test_value_from_json() {
        let json = serde_json::json!({
            "name": "john",
            "age": 30,
            "score": 9.5,
            "big": 1e3,
            "active": true,
            "tags": ["a", "b"],
            "meta": null
        });
        let v: Value = json.into();
        let map = v.as_map().unwrap();
        assert!(matches!(map.get("name"), Some(Value::Text(s)) if s == "john"));
        assert!(matches!(map.get("age"), Some(Value::Int(30))));
        assert!(matches!(map.get("score"), Some(Value::Float(f)) if (*f - 9.5).abs() < f64::EPSILON));
        assert!(matches!(map.get("big"), Some(Value::Float(_))));
        assert!(matches!(map.get("active"), Some(Value::Bool(true))));
        assert!(matches!(map.get("tags"), Some(Value::List(l)) if l.len() == 2));
        assert!(matches!(map.get("meta"), Some(Value::Null)));
    }

    #[test]
    fn test_json_u64_beyond_i64_becomes_float() {
        let v: Value = serde_json::json!(u64::MAX).into();
        assert!(matches!(v, Value::Float(_)));
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Null.to_display_string(), "");
        assert_eq!(Value::Bool(true).to_display_string(), "true");
        assert_eq!(Value::Int(-7).to_display_string(), "-7");
        assert_eq!(Value::Float(10.0).to_display_string(), "10");
        assert_eq!(Value::Float(2.5).to_display_string(), "2.5");
        assert_eq!(format!("{}", Value::from("hi")), "hi");
    }

    #[test]
    fn test_display_map_sorted() {
        let mut map = HashMap::new();
        map.insert("b".to_string(), Value::Int(2));
        map.insert("a".to_string(), Value::from("x"));
        assert_eq!(Value::Map(map).to_display_string(), "{a: x, b: 2}");
    }

    #[test]
    fn test_display_timestamp() {
        let ts = Utc.with_ymd_and_hms(2023, 12, 25, 10, 30, 0).unwrap();
        assert_eq!(Value::from(ts).to_display_string(), "2023-12-25T10:30:00Z");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::List(vec![]).type_name(), "list");
        assert_eq!(Value::Map(HashMap::new()).type_name(), "map");
    }

    #[test]
    fn test_equality_across_numbers() {
        assert_eq!(Value::Int(10), Value::Float(10.0));
        assert_ne!(Value::Int(1), Value::from("1"));
        assert_ne!(Value::Null, Value::from(""));
    }

    #[test]
    fn test_to_json() {
        let mut map = HashMap::new();
        map.insert("name".to_string(), Value::from("John"));
        map.insert("age".to_string(), Value::Int(30));
        let json = Value::Map(map).to_json().unwrap();
        assert_eq!(json, serde_json::json!({"age": 30, "name": "John"}));
    }

    #[test]
    fn test_to_json_non_finite_float() {
        let v = Value::List(vec![Value::Int(1), Value::Float(f64::NAN)]);
        let err = v.to_json().unwrap_err();
        assert!(matches!(err, TplError::SerializationError(_)));
        assert!(err.to_string().contains("element 1"));
    }
}
