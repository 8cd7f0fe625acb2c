//! Shared types and derivations for vtwin components.
//!
//! Everything here is pure: callers hand in a twin snapshot and a model
//! definition, and get back sensor rows, an overall device flag, or a
//! desired-properties patch. Fetching and submitting twins belongs to the caller.

pub mod config;
pub mod derive;
pub mod error;
pub mod fingerprint;
pub mod model;
pub mod overall;
pub mod patch;
pub mod twin;
pub mod view;

pub use config::{ColorMode, OutputConfig, VtwinConfig};
pub use derive::{classify, derive_rows, derive_twin_rows, SensorStatus, SensorStatusRow};
pub use error::{Result, VtError};
pub use fingerprint::{component_confidence_code, fingerprint_template, resolve_confidence_metric};
pub use model::{ContentItem, ModelDefinition, TypeTag};
pub use overall::OverallStatusRule;
pub use patch::{apply_enable_toggle, build_enable_patch, VtToggle};
pub use twin::{TwinDocument, TwinProperties};
pub use view::{derive_view, filter_rows, selection_summary, DeviceReport, SynchronizationStatus, VerifiedTelemetryView};

/// Name prefix reserved for verified telemetry properties
pub const VT_PREFIX: &str = "vT";

/// Reported/desired component holding device-level verified telemetry state
pub const VT_DEVICE_COMPONENT: &str = "vTDevice";

/// Metadata key inside the reported (and desired) property mapping
pub const METADATA_KEY: &str = "$metadata";

/// Length of the `YYYY-MM-DDTHH:MM:SS` prefix kept from `$lastUpdated`
pub const TIMESTAMP_PREFIX_LEN: usize = 19;
