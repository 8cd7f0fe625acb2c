//! Device twin document as returned by the device-twin service.
//!
//! Only `properties.reported` and `properties.desired` are interpreted.
//! Everything else (etag, tags, connection state, ...) is carried through
//! untouched so a patched twin can be handed back to the service as-is.

use crate::error::{Result, VtError};
use crate::METADATA_KEY;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Desired and reported property mappings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwinProperties {
    #[serde(default)]
    pub desired: Map<String, Value>,

    #[serde(default)]
    pub reported: Map<String, Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single device (or module) twin snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,

    #[serde(default)]
    pub properties: TwinProperties,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TwinDocument {
    /// Parse a twin from its JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build a twin from an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Reported properties, in document order
    pub fn reported(&self) -> &Map<String, Value> {
        &self.properties.reported
    }

    /// Desired properties, in document order
    pub fn desired(&self) -> &Map<String, Value> {
        &self.properties.desired
    }

    /// The `$metadata` mapping parallel to the reported properties, if present.
    ///
    /// Fails when `$metadata` exists but is not an object.
    pub fn reported_metadata(&self) -> Result<Option<&Map<String, Value>>> {
        match self.properties.reported.get(METADATA_KEY) {
            None => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(VtError::malformed(format!(
                "properties.reported.{} is not an object",
                METADATA_KEY
            ))),
        }
    }

    /// A reported component object (e.g. `vTDevice` or a sensor name)
    pub fn reported_component(&self, name: &str) -> Result<&Map<String, Value>> {
        reported_object(&self.properties.reported, name)
    }
}

/// Look up `reported[name]` and require it to be an object
pub(crate) fn reported_object<'a>(
    reported: &'a Map<String, Value>,
    name: &str,
) -> Result<&'a Map<String, Value>> {
    match reported.get(name) {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(VtError::malformed(format!(
            "properties.reported.{} is not an object",
            name
        ))),
        None => Err(VtError::missing(format!("properties.reported.{}", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TwinDocument {
        TwinDocument::from_value(json!({
            "deviceId": "soil-01",
            "etag": "AAAAAAAAAAE=",
            "properties": {
                "desired": { "$version": 1 },
                "reported": {
                    "vTsoilMoistureExternal1": { "telemetryStatus": true },
                    "vTDevice": { "deviceStatus": false },
                    "$metadata": {},
                    "$version": 7
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parses_ids_and_keeps_unknown_fields() {
        let twin = sample();
        assert_eq!(twin.device_id.as_deref(), Some("soil-01"));
        assert!(twin.module_id.is_none());
        assert_eq!(twin.extra.get("etag"), Some(&json!("AAAAAAAAAAE=")));

        let back = serde_json::to_value(&twin).unwrap();
        assert_eq!(back["etag"], json!("AAAAAAAAAAE="));
        assert_eq!(back["properties"]["reported"]["$version"], json!(7));
    }

    #[test]
    fn test_reported_order_is_document_order() {
        let twin = sample();
        let keys: Vec<&str> = twin.reported().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["vTsoilMoistureExternal1", "vTDevice", "$metadata", "$version"]
        );
    }

    #[test]
    fn test_reported_component_missing_and_malformed() {
        let twin = sample();
        assert!(twin.reported_component("vTDevice").is_ok());
        assert!(matches!(
            twin.reported_component("nope"),
            Err(VtError::MissingField { .. })
        ));
        assert!(matches!(
            twin.reported_component("$version"),
            Err(VtError::MalformedSchema(_))
        ));
    }

    #[test]
    fn test_metadata_absent_is_none() {
        let twin = TwinDocument::from_json(r#"{"properties":{"reported":{}}}"#).unwrap();
        assert!(twin.reported_metadata().unwrap().is_none());
        assert!(twin.desired().is_empty());
    }
}
