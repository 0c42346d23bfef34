//! A single flat record.

use std::fmt;

use serde_json::{Map, Value};

use crate::common::{Error, Result};

/// A flat record: named fields with JSON values.
///
/// Mirrors one row of a table exported in "records" orientation, i.e.
/// `[{"VAERS_ID": 902465, "AGE_YRS": 51.0, ...}, ...]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Value of `field`, treating JSON `null` as missing.
    pub fn get_non_null(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|value| !value.is_null())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Copy every field of `other` into `self`, overwriting on name clash.
    pub fn merge_from(&mut self, other: &Record) {
        for (field, value) in &other.0 {
            self.0.insert(field.clone(), value.clone());
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Integer identifier stored in `field`.
    ///
    /// Accepts integers, integral floats (`902465.0`, as tabular exports
    /// produce for columns with gaps) and strings holding an integer.
    ///
    /// # Errors
    /// - `Error::MissingKey` if the field is absent or `null`
    /// - `Error::InvalidKey` for anything else that is not an integer
    pub fn key(&self, field: &str) -> Result<i64> {
        let value = self.get_non_null(field).ok_or_else(|| Error::MissingKey {
            field: field.to_string(),
        })?;
        let invalid = || Error::InvalidKey {
            field: field.to_string(),
            value: value.to_string(),
        };

        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .ok_or_else(invalid),
            Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::InvalidRecord(format!(
                "expected a JSON object, found {}",
                kind_of(&other)
            ))),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::try_from(value).unwrap()
    }

    #[test]
    fn test_key_from_integer_float_and_string() {
        assert_eq!(record(json!({"ID": 902465})).key("ID").unwrap(), 902465);
        assert_eq!(record(json!({"ID": 902465.0})).key("ID").unwrap(), 902465);
        assert_eq!(record(json!({"ID": " 17 "})).key("ID").unwrap(), 17);
    }

    #[test]
    fn test_key_missing_or_null() {
        assert!(matches!(
            record(json!({"OTHER": 1})).key("ID"),
            Err(Error::MissingKey { .. })
        ));
        assert!(matches!(
            record(json!({"ID": null})).key("ID"),
            Err(Error::MissingKey { .. })
        ));
    }

    #[test]
    fn test_key_invalid() {
        for value in [json!(1.5), json!("abc"), json!(true), json!([1])] {
            let err = record(json!({ "ID": value })).key("ID").unwrap_err();
            assert!(matches!(err, Error::InvalidKey { .. }), "{err}");
        }
    }

    #[test]
    fn test_try_from_non_object() {
        let err = Record::try_from(json!([1, 2])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid record: expected a JSON object, found an array"
        );
    }

    #[test]
    fn test_merge_from_overwrites() {
        let mut a = record(json!({"ID": 1, "AGE": 30}));
        let b = record(json!({"ID": 1, "AGE": 31, "SEX": "F"}));

        a.merge_from(&b);

        assert_eq!(a, record(json!({"ID": 1, "AGE": 31, "SEX": "F"})));
    }
}
