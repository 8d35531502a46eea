//! Utility functions shared across the application.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Byte order mark some spreadsheet exports prepend to CSV files
const UTF8_BOM: char = '\u{feff}';

/// Required task `info` fields and the values they accept.
///
/// Field names and values compare case-insensitively. A field with no listed
/// values accepts anything non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredFields {
    fields: BTreeMap<String, Vec<String>>,
}

impl RequiredFields {
    pub fn new(fields: &HashMap<String, Vec<String>>) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(name, values)| (name.clone(), values.clone()))
                .collect(),
        }
    }

    /// Fields that only need to be present, with any value
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names
                .into_iter()
                .map(|name| (name.into(), Vec::new()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Required fields with no matching header, in sorted order
    pub fn missing_headers(&self, headers: &[String]) -> Vec<String> {
        self.names()
            .filter(|name| !headers.iter().any(|h| h == name))
            .map(str::to_string)
            .collect()
    }

    /// Required fields that are missing, empty, or hold a value outside the
    /// accepted list, in sorted order
    pub fn validate(&self, data: &Map<String, Value>) -> Vec<String> {
        let lowered: HashMap<String, &Value> =
            data.iter().map(|(k, v)| (k.to_lowercase(), v)).collect();

        self.fields
            .iter()
            .filter(|(name, accepted)| {
                let value = lowered.get(&name.to_lowercase()).copied();
                !Self::is_acceptable(value, accepted)
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn is_acceptable(value: Option<&Value>, accepted: &[String]) -> bool {
        let Some(value) = value else {
            return false;
        };
        if is_blank(value) {
            return false;
        }
        if accepted.is_empty() {
            return true;
        }
        match value {
            Value::String(s) => accepted.iter().any(|a| a.eq_ignore_ascii_case(s)),
            other => accepted.iter().any(|a| a == &other.to_string()),
        }
    }
}

/// Empty strings, nulls and empty containers count as missing
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Drop a leading UTF-8 byte order mark
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(UTF8_BOM).unwrap_or(text)
}
