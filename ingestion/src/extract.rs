use pakdump_core::{ObjectReference, Properties, RecordKind};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Malformed(String),
}

/// One element of an object file as written by the dumper.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObject {
    #[serde(rename = "Type")]
    pub type_name: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "SuperStruct", default)]
    pub super_struct: Option<ObjectReference>,
    #[serde(rename = "Template", default)]
    pub template: Option<ObjectReference>,
    #[serde(rename = "Properties", default)]
    pub properties: Option<Value>,
}

impl RawObject {
    pub fn properties(&self) -> Properties {
        Properties::from_value(self.properties.as_ref())
    }
}

/// An object file: the class (or plain object) description, followed for
/// blueprints by the default instance carrying the actual property values.
#[derive(Debug, Clone)]
pub struct RawContainer {
    pub class: RawObject,
    pub instance: Option<RawObject>,
}

pub fn parse_container(bytes: &[u8]) -> Result<RawContainer, ExtractError> {
    let elements: Vec<Value> = serde_json::from_slice(bytes)?;
    let mut elements = elements.into_iter();

    let first = elements
        .next()
        .ok_or_else(|| ExtractError::Malformed("empty object array".to_string()))?;
    if !first.is_object() {
        return Err(ExtractError::Malformed("first element is not an object".to_string()));
    }
    let class: RawObject = serde_json::from_value(first)?;
    if class.name.trim().is_empty() {
        return Err(ExtractError::Malformed("first element has no Name".to_string()));
    }

    let instance = match elements.next() {
        Some(value) if value.is_object() => Some(serde_json::from_value(value)?),
        _ => None,
    };

    Ok(RawContainer { class, instance })
}

pub fn detect_kind(raw: &RawObject) -> Option<RecordKind> {
    RecordKind::from_type_name(&raw.type_name)
}
