//! Desired-properties patch for switching verified telemetry on or off.

use crate::error::{Result, VtError};
use crate::twin::TwinDocument;
use crate::VT_DEVICE_COMPONENT;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

/// Desired field toggled on the `vTDevice` component
pub const ENABLE_FIELD: &str = "enableVerifiedTelemetry";

/// Requested verified telemetry state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VtToggle {
    #[default]
    Enable,
    Disable,
}

impl VtToggle {
    pub fn flip(self) -> Self {
        match self {
            Self::Enable => Self::Disable,
            Self::Disable => Self::Enable,
        }
    }

    pub fn as_bool(self) -> bool {
        matches!(self, Self::Enable)
    }
}

impl std::fmt::Display for VtToggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enable => write!(f, "enabled"),
            Self::Disable => write!(f, "disabled"),
        }
    }
}

/// Minimal twin patch carrying only the toggle
pub fn build_enable_patch(toggle: VtToggle) -> Value {
    json!({
        "properties": {
            "desired": {
                VT_DEVICE_COMPONENT: { ENABLE_FIELD: toggle.as_bool() }
            }
        }
    })
}

/// Return a copy of `twin` with the toggle written into its desired properties.
///
/// `properties.desired.vTDevice` is created when absent.
pub fn apply_enable_toggle(twin: &TwinDocument, toggle: VtToggle) -> Result<TwinDocument> {
    let mut updated = twin.clone();

    let component = updated
        .properties
        .desired
        .entry(VT_DEVICE_COMPONENT)
        .or_insert_with(|| Value::Object(Map::new()));

    let Value::Object(component) = component else {
        return Err(VtError::malformed(format!(
            "properties.desired.{} is not an object",
            VT_DEVICE_COMPONENT
        )));
    };

    component.insert(ENABLE_FIELD.to_string(), Value::Bool(toggle.as_bool()));
    info!(device = ?updated.device_id, state = %toggle, "prepared verified telemetry toggle");

    Ok(updated)
}
