//! Parameter mapping handed to the expander
//!
//! A variable is bound to either a single string or an ordered list of
//! strings. Only `-list` accepts lists for substitution; `-opt` and `-neg`
//! only test presence, where an empty list counts as absent.
//!
//! Uses FxHashMap for faster hashing on small string keys.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Value bound to a template variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
}

impl Value {
    /// Present means any scalar (even "") or a non-empty list
    pub fn is_present(&self) -> bool {
        match self {
            Value::Scalar(_) => true,
            Value::List(items) => !items.is_empty(),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::Scalar(_) => None,
            Value::List(items) => Some(items),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::List(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::List(items.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Value {
    fn from(items: [&str; N]) -> Self {
        Value::List(items.iter().map(|s| s.to_string()).collect())
    }
}

/// Scalars as they appear in JSON/YAML params files
#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl From<RawScalar> for String {
    fn from(raw: RawScalar) -> Self {
        match raw {
            RawScalar::Text(s) => s,
            RawScalar::Integer(n) => n.to_string(),
            RawScalar::Float(n) => n.to_string(),
            RawScalar::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Scalar(RawScalar),
    List(Vec<RawScalar>),
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match RawValue::deserialize(deserializer)? {
            RawValue::Scalar(raw) => Value::Scalar(raw.into()),
            RawValue::List(items) => Value::List(items.into_iter().map(String::from).collect()),
        })
    }
}

/// Variable name → value mapping, read-only during expansion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params {
    values: FxHashMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Key is bound, whatever its value
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Key is bound to a scalar or a non-empty list
    pub fn is_present(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(Value::is_present)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Partition into (bindings named in `names`, everything else)
    pub fn split<S: AsRef<str>>(&self, names: &[S]) -> (Params, Params) {
        let mut selected = Params::new();
        let mut rest = Params::new();
        for (name, value) in &self.values {
            if names.iter().any(|n| n.as_ref() == name) {
                selected.values.insert(name.clone(), value.clone());
            } else {
                rest.values.insert(name.clone(), value.clone());
            }
        }
        (selected, rest)
    }

    /// Load a flat JSON object
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a flat YAML mapping
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        params.extend(iter);
        params
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Params {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}
