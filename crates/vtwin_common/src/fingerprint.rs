//! Fingerprint template helpers for verified telemetry sensors.

use crate::error::{Result, VtError};
use crate::model::ModelDefinition;
use crate::twin::reported_object;
use serde_json::{Map, Value};

/// Model content item (and reported field) holding the confidence metric
pub const CONFIDENCE_METRIC_NAME: &str = "fingerprintTemplateConfidenceMetric";

/// Reported field holding the raw fingerprint template
pub const FINGERPRINT_TEMPLATE_NAME: &str = "fingerprintTemplate";

/// Resolve a confidence metric code to its enum label.
///
/// Returns an empty string when no enum entry matches, or when the model has
/// no confidence metric item at all.
pub fn resolve_confidence_metric(code: i64, model: &ModelDefinition) -> Result<String> {
    let Some(item) = model.find(CONFIDENCE_METRIC_NAME) else {
        return Ok(String::new());
    };

    let schema = item.schema.as_ref().ok_or_else(|| {
        VtError::malformed(format!("{} has no schema", CONFIDENCE_METRIC_NAME))
    })?;

    let values = schema
        .get("enumValues")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            VtError::malformed(format!(
                "{} schema has no enumValues array",
                CONFIDENCE_METRIC_NAME
            ))
        })?;

    for entry in values {
        if entry.get("enumValue").and_then(Value::as_i64) != Some(code) {
            continue;
        }
        return entry
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                VtError::malformed(format!(
                    "{} enum value {} has no name",
                    CONFIDENCE_METRIC_NAME, code
                ))
            });
    }

    Ok(String::new())
}

/// Confidence metric code reported by a sensor component
pub fn component_confidence_code(reported: &Map<String, Value>, component: &str) -> Result<i64> {
    let object = reported_object(reported, component)?;
    match object.get(CONFIDENCE_METRIC_NAME) {
        Some(value) => value.as_i64().ok_or_else(|| {
            VtError::malformed(format!(
                "properties.reported.{}.{} is not an integer",
                component, CONFIDENCE_METRIC_NAME
            ))
        }),
        None => Err(VtError::missing(format!(
            "properties.reported.{}.{}",
            component, CONFIDENCE_METRIC_NAME
        ))),
    }
}

/// Raw fingerprint template reported by a sensor component
pub fn fingerprint_template<'a>(
    reported: &'a Map<String, Value>,
    component: &str,
) -> Result<&'a Value> {
    reported_object(reported, component)?
        .get(FINGERPRINT_TEMPLATE_NAME)
        .ok_or_else(|| {
            VtError::missing(format!(
                "properties.reported.{}.{}",
                component, FINGERPRINT_TEMPLATE_NAME
            ))
        })
}
