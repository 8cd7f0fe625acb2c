//! Plug and Play model definition (the parts vtwin reads).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Content type tag for telemetry items
pub const TELEMETRY_TYPE: &str = "Telemetry";

/// Content type tag for command items
pub const COMMAND_TYPE: &str = "Command";

/// `@type` is either a single tag or a list (semantic types add a second tag)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeTag {
    Single(String),
    Many(Vec<String>),
}

impl TypeTag {
    pub fn is(&self, tag: &str) -> bool {
        match self {
            Self::Single(t) => t == tag,
            Self::Many(tags) => tags.iter().any(|t| t == tag),
        }
    }
}

/// One entry of the model's `contents` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "@type")]
    pub kind: TypeTag,

    pub name: String,

    /// Kept raw: enum schemas are validated when they are used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,

    #[serde(default, rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentItem {
    pub fn is_telemetry(&self) -> bool {
        self.kind.is(TELEMETRY_TYPE)
    }

    pub fn is_command(&self) -> bool {
        self.kind.is(COMMAND_TYPE)
    }
}

/// Interface definition resolved for a component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    #[serde(default, rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub contents: Vec<ContentItem>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelDefinition {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Names of Telemetry-tagged contents, in content order
    pub fn telemetry_names(&self) -> Vec<&str> {
        self.contents
            .iter()
            .filter(|c| c.is_telemetry())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Telemetry names as a lookup set
    pub fn telemetry_set(&self) -> HashSet<&str> {
        self.telemetry_names().into_iter().collect()
    }

    /// Command-tagged contents, in content order
    pub fn commands(&self) -> Vec<&ContentItem> {
        self.contents.iter().filter(|c| c.is_command()).collect()
    }

    /// First content item with the given name
    pub fn find(&self, name: &str) -> Option<&ContentItem> {
        self.contents.iter().find(|c| c.name == name)
    }
}
