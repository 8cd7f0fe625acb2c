//! Display state for the verified telemetry screen.
//!
//! Decides what a presentation layer should show for a twin snapshot:
//! a loading placeholder, nothing, or the device banner plus sensor table.

use crate::derive::{derive_twin_rows, SensorStatusRow};
use crate::error::Result;
use crate::model::ModelDefinition;
use crate::overall::OverallStatusRule;
use crate::twin::TwinDocument;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Fetch state of the twin snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynchronizationStatus {
    Initialized,
    Working,
    Updating,
    Fetched,
    Failed,
    Upserted,
    Deleted,
}

impl SynchronizationStatus {
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Working | Self::Updating)
    }
}

/// Banner plus sensor rows for a fetched twin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceReport {
    pub device_working: bool,
    pub rows: Vec<SensorStatusRow>,
}

impl DeviceReport {
    /// Build the report for one snapshot
    pub fn build(
        twin: &TwinDocument,
        model: &ModelDefinition,
        rule: &OverallStatusRule,
        interface_id: &str,
    ) -> Result<Self> {
        Ok(Self {
            device_working: rule.evaluate_twin(twin)?,
            rows: derive_twin_rows(twin, model, interface_id)?,
        })
    }

    /// Word shown after "Device status:"
    pub fn device_state(&self) -> &'static str {
        if self.device_working {
            "working"
        } else {
            "faulty"
        }
    }

    pub fn banner(&self) -> String {
        format!("Device status: {}", self.device_state())
    }

    /// Most recent sensor update across all rows
    pub fn latest_update(&self) -> Option<NaiveDateTime> {
        self.rows.iter().filter_map(|r| r.last_update_time()).max()
    }
}

/// What to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifiedTelemetryView {
    Loading,
    Ready(DeviceReport),
    Empty,
}

/// Map a fetch state and snapshot to the view to render
pub fn derive_view(
    sync: SynchronizationStatus,
    twin: Option<&TwinDocument>,
    model: &ModelDefinition,
    rule: &OverallStatusRule,
    interface_id: &str,
) -> Result<VerifiedTelemetryView> {
    if sync.is_busy() {
        return Ok(VerifiedTelemetryView::Loading);
    }

    match (sync, twin) {
        (SynchronizationStatus::Fetched, Some(twin)) => Ok(VerifiedTelemetryView::Ready(
            DeviceReport::build(twin, model, rule, interface_id)?,
        )),
        _ => Ok(VerifiedTelemetryView::Empty),
    }
}

/// Rows whose lower-cased name contains `text`; an empty filter keeps all
pub fn filter_rows<'a>(rows: &'a [SensorStatusRow], text: &str) -> Vec<&'a SensorStatusRow> {
    if text.is_empty() {
        return rows.iter().collect();
    }
    rows.iter()
        .filter(|r| r.name.to_lowercase().contains(text))
        .collect()
}

/// One-line description of the current table selection
pub fn selection_summary(selected: &[&SensorStatusRow]) -> String {
    match selected {
        [] => "No items selected".to_string(),
        [only] => format!("1 item selected: {}", only.name),
        many => format!("{} items selected", many.len()),
    }
}
