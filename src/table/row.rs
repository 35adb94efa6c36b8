use std::collections::BTreeMap;

use super::value::Value;

static NULL: Value = Value::Null;

/// One record of the table, keyed by field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Field value; absent fields read as null
    pub fn get(&self, key: &str) -> &Value {
        self.fields.get(key).unwrap_or(&NULL)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Row {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            fields: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_field_is_null() {
        let row = Row::new().with("name", "Bob");
        assert_eq!(row.get("name"), &Value::from("Bob"));
        assert!(row.get("trips").is_null());
    }

    #[test]
    fn test_from_json_object() {
        let json = serde_json::json!({"plate": "KX-102", "trips": 14});
        let row = Row::from(json.as_object().unwrap().clone());
        assert_eq!(row.get("trips"), &Value::Number(14.0));
        assert_eq!(row.get("plate"), &Value::from("KX-102"));
    }
}
