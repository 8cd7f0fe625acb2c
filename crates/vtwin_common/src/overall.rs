//! Overall device status.
//!
//! Where the device-level verdict lives has moved between device firmware
//! revisions, so the lookup is a configurable rule rather than a fixed path.

use crate::derive::TELEMETRY_STATUS_FIELD;
use crate::error::Result;
use crate::twin::{reported_object, TwinDocument};
use crate::VT_DEVICE_COMPONENT;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

fn default_component() -> String {
    VT_DEVICE_COMPONENT.to_string()
}

fn default_field() -> String {
    "deviceStatus".to_string()
}

fn default_sensors() -> Vec<String> {
    vec![
        "vTsoilMoistureExternal1".to_string(),
        "vTsoilMoistureExternal2".to_string(),
    ]
}

/// How to read the overall device status from reported properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum OverallStatusRule {
    /// `reported[component][field] == true`
    DeviceField {
        #[serde(default = "default_component")]
        component: String,
        #[serde(default = "default_field")]
        field: String,
    },
    /// Every listed sensor reports `telemetryStatus == true`
    SensorConjunction {
        #[serde(default = "default_sensors")]
        sensors: Vec<String>,
    },
}

impl Default for OverallStatusRule {
    fn default() -> Self {
        Self::DeviceField {
            component: default_component(),
            field: default_field(),
        }
    }
}

impl OverallStatusRule {
    /// Rule used by the earliest verified telemetry samples
    pub fn sensor_conjunction() -> Self {
        Self::SensorConjunction {
            sensors: default_sensors(),
        }
    }

    /// Short name as written in configuration
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeviceField { .. } => "device_field",
            Self::SensorConjunction { .. } => "sensor_conjunction",
        }
    }

    /// Evaluate against a reported mapping.
    ///
    /// A referenced component that is absent is an error; a present component
    /// whose flag is anything but boolean `true` counts as not working.
    pub fn evaluate(&self, reported: &Map<String, Value>) -> Result<bool> {
        let working = match self {
            Self::DeviceField { component, field } => {
                let object = reported_object(reported, component)?;
                is_true(object.get(field))
            }
            Self::SensorConjunction { sensors } => {
                if sensors.is_empty() {
                    false
                } else {
                    let mut all = true;
                    for sensor in sensors {
                        let object = reported_object(reported, sensor)?;
                        all &= is_true(object.get(TELEMETRY_STATUS_FIELD));
                    }
                    all
                }
            }
        };

        debug!(rule = self.name(), working, "evaluated overall status");
        Ok(working)
    }

    pub fn evaluate_twin(&self, twin: &TwinDocument) -> Result<bool> {
        self.evaluate(twin.reported())
    }
}

impl std::fmt::Display for OverallStatusRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeviceField { component, field } => write!(f, "{}.{}", component, field),
            Self::SensorConjunction { sensors } => {
                write!(f, "all of [{}]", sensors.join(", "))
            }
        }
    }
}

fn is_true(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VtError;
    use serde_json::json;

    fn reported(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_device_field_default() {
        let rule = OverallStatusRule::default();
        assert!(rule
            .evaluate(&reported(json!({"vTDevice": {"deviceStatus": true}})))
            .unwrap());
        assert!(!rule
            .evaluate(&reported(json!({"vTDevice": {"deviceStatus": "true"}})))
            .unwrap());
        assert!(!rule.evaluate(&reported(json!({"vTDevice": {}}))).unwrap());
    }

    #[test]
    fn test_device_field_missing_component_fails() {
        let err = OverallStatusRule::default()
            .evaluate(&reported(json!({})))
            .unwrap_err();
        match err {
            VtError::MissingField { path } => assert_eq!(path, "properties.reported.vTDevice"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sensor_conjunction() {
        let rule = OverallStatusRule::sensor_conjunction();
        let both = reported(json!({
            "vTsoilMoistureExternal1": {"telemetryStatus": true},
            "vTsoilMoistureExternal2": {"telemetryStatus": true}
        }));
        let one = reported(json!({
            "vTsoilMoistureExternal1": {"telemetryStatus": true},
            "vTsoilMoistureExternal2": {"telemetryStatus": false}
        }));
        assert!(rule.evaluate(&both).unwrap());
        assert!(!rule.evaluate(&one).unwrap());
    }

    #[test]
    fn test_empty_conjunction_is_false() {
        let rule = OverallStatusRule::SensorConjunction { sensors: vec![] };
        assert!(!rule.evaluate(&reported(json!({}))).unwrap());
    }

    #[test]
    fn test_rule_deserializes_with_defaults() {
        let rule: OverallStatusRule = serde_json::from_value(json!({"rule": "device_field"})).unwrap();
        assert_eq!(rule, OverallStatusRule::default());

        let rule: OverallStatusRule =
            serde_json::from_value(json!({"rule": "sensor_conjunction", "sensors": ["vTa"]})).unwrap();
        assert_eq!(
            rule,
            OverallStatusRule::SensorConjunction { sensors: vec!["vTa".into()] }
        );
        assert_eq!(rule.to_string(), "all of [vTa]");
    }
}
