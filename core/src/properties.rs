//! Kind-specific property payload of a record.
//!
//! The dump writes properties as a JSON object. A key can be missing, present
//! with a value, or present but unset (`null` or the engine's `"None"`
//! placeholder). Accessors treat unset exactly like missing; [`Properties::raw`]
//! still tells the two apart.

use crate::reference::ObjectReference;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

const UNSET_SENTINEL: &str = "None";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Properties(Map<String, Value>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Properties from an optional JSON value; anything but an object is empty.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => Self(map.clone()),
            _ => Self::default(),
        }
    }

    pub fn is_unset(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s == UNSET_SENTINEL,
            _ => false,
        }
    }

    /// Prototype-style inheritance: the template's set values, overlaid by `overrides`.
    /// Keys defined in both take the override.
    pub fn inherit(template: &Properties, overrides: &Properties) -> Properties {
        let mut merged: Map<String, Value> = template
            .0
            .iter()
            .filter(|(_, value)| !Self::is_unset(value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        for (key, value) in &overrides.0 {
            merged.insert(key.clone(), value.clone());
        }
        Properties(merged)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|value| !Self::is_unset(value))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Plain strings and the dump's localized text objects
    /// (`SourceString`, `CultureInvariantString`, `LocalizedString`).
    pub fn text(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => ["SourceString", "CultureInvariantString", "LocalizedString"]
                .iter()
                .find_map(|field| map.get(*field).and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        }
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_f64()
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        let value = self.get(key)?;
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0)
                .map(|f| f as i64)
        })
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    pub fn reference(&self, key: &str) -> Option<ObjectReference> {
        let reference: ObjectReference = serde_json::from_value(self.get(key)?.clone()).ok()?;
        (reference.object_name != UNSET_SENTINEL).then_some(reference)
    }

    /// Every well-formed reference in a list property; malformed entries are skipped.
    pub fn references(&self, key: &str) -> Vec<ObjectReference> {
        let Some(Value::Array(items)) = self.get(key) else {
            return Vec::new();
        };
        items
            .iter()
            .filter(|item| !Self::is_unset(item))
            .filter_map(|item| serde_json::from_value::<ObjectReference>(item.clone()).ok())
            .filter(|reference| reference.object_name != UNSET_SENTINEL)
            .collect()
    }

    /// Decode one property into a typed payload. `Ok(None)` when the key is unset.
    pub fn typed<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, serde_json::Error> {
        self.get(key)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
    }

    /// Decode the whole map into a typed payload. Unset keys are dropped first
    /// so they fall back to the payload's defaults.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let set: Map<String, Value> = self
            .0
            .iter()
            .filter(|(_, value)| !Self::is_unset(value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        serde_json::from_value(Value::Object(set))
    }
}

impl From<Map<String, Value>> for Properties {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
