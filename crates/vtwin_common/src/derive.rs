//! Telemetry status derivation.
//!
//! Classifies every reported property of a twin into a sensor row:
//!
//! - `telemetryStatus: true`  → verified
//! - `telemetryStatus: false` → faulty
//! - a modeled Telemetry name outside the `vT` namespace → unverified,
//!   whatever its `telemetryStatus` says
//!
//! Anything else produces no row. Rows are rebuilt from scratch on every
//! call; nothing is cached between snapshots.

use crate::error::{Result, VtError};
use crate::model::ModelDefinition;
use crate::twin::TwinDocument;
use crate::{METADATA_KEY, TIMESTAMP_PREFIX_LEN, VT_PREFIX};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

/// Field on a reported sensor object carrying the verification result
pub const TELEMETRY_STATUS_FIELD: &str = "telemetryStatus";

/// Field on a `$metadata` entry carrying the update timestamp
pub const LAST_UPDATED_FIELD: &str = "$lastUpdated";

/// Derived status of one sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Verified,
    Faulty,
    Unverified,
}

impl std::fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Verified => write!(f, "verified"),
            Self::Faulty => write!(f, "faulty"),
            Self::Unverified => write!(f, "unverified"),
        }
    }
}

/// One row of the sensor status table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorStatusRow {
    /// Position of the property in the reported mapping
    pub key: usize,
    pub name: String,
    pub status: SensorStatus,
    pub interface_id: String,
    /// `YYYY-MM-DDTHH:MM:SS`
    pub last_update: String,
}

impl SensorStatusRow {
    /// Parsed `last_update`, if it is a full second-precision timestamp
    pub fn last_update_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.last_update, "%Y-%m-%dT%H:%M:%S").ok()
    }
}

/// Classify one reported property.
///
/// Returns `None` when the property does not describe a sensor.
pub fn classify(name: &str, value: &Value, telemetry: &HashSet<&str>) -> Option<SensorStatus> {
    let mut status = match value.get(TELEMETRY_STATUS_FIELD) {
        Some(Value::Bool(true)) => Some(SensorStatus::Verified),
        Some(Value::Bool(false)) => Some(SensorStatus::Faulty),
        _ => None,
    };

    if !name.starts_with(VT_PREFIX) && telemetry.contains(name) {
        status = Some(SensorStatus::Unverified);
    }

    status
}

/// Keep the first 19 characters of a `$lastUpdated` value
pub fn truncate_timestamp(stamp: &str) -> String {
    stamp.chars().take(TIMESTAMP_PREFIX_LEN).collect()
}

/// Derive all sensor rows from a reported mapping and its `$metadata`.
///
/// Metadata is only consulted for properties that produce a row; a row whose
/// metadata entry is absent fails with [`VtError::MissingField`].
pub fn derive_rows(
    reported: &Map<String, Value>,
    metadata: Option<&Map<String, Value>>,
    model: &ModelDefinition,
    interface_id: &str,
) -> Result<Vec<SensorStatusRow>> {
    collect_rows(reported, || Ok(metadata), model, interface_id)
}

/// Derive sensor rows straight from a twin snapshot.
///
/// `$metadata` is only validated once a property classifies.
pub fn derive_twin_rows(
    twin: &TwinDocument,
    model: &ModelDefinition,
    interface_id: &str,
) -> Result<Vec<SensorStatusRow>> {
    collect_rows(twin.reported(), || twin.reported_metadata(), model, interface_id)
}

fn collect_rows<'a, F>(
    reported: &Map<String, Value>,
    metadata: F,
    model: &ModelDefinition,
    interface_id: &str,
) -> Result<Vec<SensorStatusRow>>
where
    F: Fn() -> Result<Option<&'a Map<String, Value>>>,
{
    let telemetry = model.telemetry_set();
    let mut rows = Vec::new();

    for (key, (name, value)) in reported.iter().enumerate() {
        let Some(status) = classify(name, value, &telemetry) else {
            continue;
        };

        let last_update = last_update(metadata()?, name)?;
        debug!(sensor = %name, %status, %last_update, "classified sensor");

        rows.push(SensorStatusRow {
            key,
            name: name.clone(),
            status,
            interface_id: interface_id.to_string(),
            last_update,
        });
    }

    Ok(rows)
}

fn last_update(metadata: Option<&Map<String, Value>>, name: &str) -> Result<String> {
    let metadata =
        metadata.ok_or_else(|| VtError::missing(format!("properties.reported.{}", METADATA_KEY)))?;

    let path = format!("properties.reported.{}.{}", METADATA_KEY, name);
    let entry = metadata
        .get(name)
        .ok_or_else(|| VtError::missing(path.clone()))?;

    match entry.get(LAST_UPDATED_FIELD) {
        Some(Value::String(stamp)) => Ok(truncate_timestamp(stamp)),
        Some(_) => Err(VtError::malformed(format!(
            "{}.{} is not a string",
            path, LAST_UPDATED_FIELD
        ))),
        None => Err(VtError::missing(format!("{}.{}", path, LAST_UPDATED_FIELD))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn telemetry<'a>(names: &[&'a str]) -> HashSet<&'a str> {
        names.iter().copied().collect()
    }

    #[test]
    fn test_classify_boolean_status() {
        let none = telemetry(&[]);
        assert_eq!(
            classify("vTsoil", &json!({"telemetryStatus": true}), &none),
            Some(SensorStatus::Verified)
        );
        assert_eq!(
            classify("vTsoil", &json!({"telemetryStatus": false}), &none),
            Some(SensorStatus::Faulty)
        );
    }

    #[test]
    fn test_classify_non_boolean_is_empty() {
        let none = telemetry(&[]);
        assert_eq!(classify("a", &json!({"telemetryStatus": null}), &none), None);
        assert_eq!(classify("a", &json!({"telemetryStatus": "true"}), &none), None);
        assert_eq!(classify("a", &json!({"telemetryStatus": 1}), &none), None);
        assert_eq!(classify("a", &json!({}), &none), None);
        assert_eq!(classify("$version", &json!(4), &none), None);
    }

    #[test]
    fn test_modeled_telemetry_overrides_to_unverified() {
        let t = telemetry(&["humidity"]);
        assert_eq!(
            classify("humidity", &json!({"telemetryStatus": true}), &t),
            Some(SensorStatus::Unverified)
        );
        assert_eq!(
            classify("humidity", &json!(41.5), &t),
            Some(SensorStatus::Unverified)
        );
    }

    #[test]
    fn test_vt_namespace_is_never_unverified() {
        let t = telemetry(&["vTsoil"]);
        assert_eq!(
            classify("vTsoil", &json!({"telemetryStatus": false}), &t),
            Some(SensorStatus::Faulty)
        );
        assert_eq!(classify("vTsoil", &json!({}), &t), None);
    }

    #[test]
    fn test_truncate_timestamp() {
        assert_eq!(truncate_timestamp("2023-04-01T10:00:00.123Z"), "2023-04-01T10:00:00");
        assert_eq!(truncate_timestamp("2023-04-01"), "2023-04-01");
    }

    #[test]
    fn test_row_keys_follow_reported_positions() {
        let twin = TwinDocument::from_value(json!({
            "properties": { "reported": {
                "$version": 3,
                "vTa": { "telemetryStatus": true },
                "other": { "x": 1 },
                "vTb": { "telemetryStatus": false },
                "$metadata": {
                    "vTa": { "$lastUpdated": "2023-04-01T10:00:00.1Z" },
                    "vTb": { "$lastUpdated": "2023-04-01T10:05:00.1Z" }
                }
            }}
        }))
        .unwrap();

        let rows = derive_twin_rows(&twin, &ModelDefinition::default(), "dtmi:x;1").unwrap();
        let keys: Vec<usize> = rows.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![1, 3]);
        assert!(rows.iter().all(|r| r.interface_id == "dtmi:x;1"));
    }

    #[test]
    fn test_missing_metadata_entry_fails() {
        let reported = json!({ "vTa": { "telemetryStatus": true } });
        let metadata = json!({});
        let err = derive_rows(
            reported.as_object().unwrap(),
            metadata.as_object(),
            &ModelDefinition::default(),
            "",
        )
        .unwrap_err();

        match err {
            VtError::MissingField { path } => assert_eq!(path, "properties.reported.$metadata.vTa"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_string_timestamp_is_malformed() {
        let reported = json!({ "vTa": { "telemetryStatus": true } });
        let metadata = json!({ "vTa": { "$lastUpdated": 17 } });
        let err = derive_rows(
            reported.as_object().unwrap(),
            metadata.as_object(),
            &ModelDefinition::default(),
            "",
        )
        .unwrap_err();
        assert!(matches!(err, VtError::MalformedSchema(_)));
    }

    #[test]
    fn test_unclassified_properties_need_no_metadata() {
        let reported = json!({ "firmware": "1.2.0", "vTa": { "x": true } });
        let rows = derive_rows(
            reported.as_object().unwrap(),
            None,
            &ModelDefinition::default(),
            "",
        )
        .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_non_object_metadata_only_fails_when_a_row_needs_it() {
        let quiet = TwinDocument::from_value(json!({
            "properties": { "reported": { "firmware": "1.2.0", "$metadata": 5 } }
        }))
        .unwrap();
        let rows = derive_twin_rows(&quiet, &ModelDefinition::default(), "").unwrap();
        assert!(rows.is_empty());

        let sensor = TwinDocument::from_value(json!({
            "properties": { "reported": { "vTa": { "telemetryStatus": true }, "$metadata": 5 } }
        }))
        .unwrap();
        assert!(matches!(
            derive_twin_rows(&sensor, &ModelDefinition::default(), ""),
            Err(VtError::MalformedSchema(_))
        ));
    }

    #[test]
    fn test_last_update_time_parses() {
        let row = SensorStatusRow {
            key: 0,
            name: "vTa".into(),
            status: SensorStatus::Verified,
            interface_id: String::new(),
            last_update: "2023-04-01T10:00:00".into(),
        };
        let t = row.last_update_time().unwrap();
        assert_eq!(t.format("%H:%M").to_string(), "10:00");
    }
}
