//! Command handlers for vtwinctl.
//!
//! Each handler reads its input documents once, runs the pure derivation from
//! `vtwin_common`, and prints the result. Nothing here talks to a device
//! service; patches are written out for the caller to submit.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use vtwin_common::{
    apply_enable_toggle, build_enable_patch, component_confidence_code, filter_rows,
    resolve_confidence_metric, selection_summary, DeviceReport, ModelDefinition,
    SensorStatusRow, TwinDocument, VtToggle, VtwinConfig,
};

use crate::output;

/// Read and parse a twin document
pub fn load_twin(path: &Path) -> Result<TwinDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read twin {}", path.display()))?;
    TwinDocument::from_json(&text)
        .with_context(|| format!("Failed to parse twin {}", path.display()))
}

/// Read and parse a model definition
pub fn load_model(path: &Path) -> Result<ModelDefinition> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model {}", path.display()))?;
    ModelDefinition::from_json(&text)
        .with_context(|| format!("Failed to parse model {}", path.display()))
}

/// Options for the status command
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    pub twin: PathBuf,
    pub model: PathBuf,
    pub interface_id: Option<String>,
    pub filter: Option<String>,
    pub select: Vec<String>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusJson<'a> {
    generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    device_id: Option<&'a str>,
    device_working: bool,
    rule: String,
    rows: Vec<&'a SensorStatusRow>,
}

/// Render the status screen (or its JSON form) for one twin snapshot
pub fn status_text(opts: &StatusOptions, config: &VtwinConfig, color: bool) -> Result<String> {
    let twin = load_twin(&opts.twin)?;
    let model = load_model(&opts.model)?;

    let interface_id = opts
        .interface_id
        .clone()
        .or_else(|| model.id.clone())
        .unwrap_or_default();

    let report = DeviceReport::build(&twin, &model, &config.status, &interface_id)
        .context("Failed to derive verified telemetry status")?;
    let rows = filter_rows(&report.rows, opts.filter.as_deref().unwrap_or(""));
    info!(
        device = ?twin.device_id,
        rows = rows.len(),
        working = report.device_working,
        "derived verified telemetry status"
    );

    if opts.json {
        let body = StatusJson {
            generated_at: Utc::now(),
            device_id: twin.device_id.as_deref(),
            device_working: report.device_working,
            rule: config.status.to_string(),
            rows,
        };
        return Ok(serde_json::to_string_pretty(&body)?);
    }

    let mut out = Vec::new();
    out.push(output::render_banner(&report, color));
    out.push(format!("Status rule: {}", config.status));
    if let Some(latest) = report.latest_update() {
        out.push(format!("Latest sensor update: {}", latest.format("%Y-%m-%d %H:%M:%S")));
    }
    out.push(output::HR.to_string());
    out.push(output::render_rows(&rows, color));

    if !opts.select.is_empty() {
        let selected: Vec<&SensorStatusRow> = rows
            .iter()
            .copied()
            .filter(|r| opts.select.iter().any(|s| s == &r.name))
            .collect();
        out.push(output::HR.to_string());
        out.push(selection_summary(&selected));
    }

    Ok(out.join("\n"))
}

/// Handle status command
pub fn status(opts: &StatusOptions, config: &VtwinConfig) -> Result<()> {
    let color = !opts.json && output::use_color(config.output.color);
    println!("{}", status_text(opts, config, color)?);
    Ok(())
}

/// Handle telemetry command
pub fn telemetry(model: &Path) -> Result<()> {
    let model = load_model(model)?;
    let names = model.telemetry_names();
    if names.is_empty() {
        println!("No telemetry defined");
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

/// Handle commands command
pub fn commands(model: &Path, component: Option<&str>) -> Result<()> {
    let model = load_model(model)?;
    let component = component
        .map(str::to_string)
        .or_else(|| model.id.clone())
        .unwrap_or_else(|| "default component".to_string());
    println!("{}", output::render_commands(&component, &model.commands()));
    Ok(())
}

/// Confidence line for one sensor component
pub fn confidence_text(twin: &Path, model: &Path, component: &str) -> Result<String> {
    let twin = load_twin(twin)?;
    let model = load_model(model)?;

    let code = component_confidence_code(twin.reported(), component)?;
    let label = resolve_confidence_metric(code, &model)?;
    let label = if label.is_empty() { "unknown".to_string() } else { label };

    Ok(format!("{}: confidence {} ({})", component, code, label))
}

/// Handle confidence command
pub fn confidence(twin: &Path, model: &Path, component: &str) -> Result<()> {
    println!("{}", confidence_text(twin, model, component)?);
    Ok(())
}

/// Options for the toggle command
#[derive(Debug, Clone)]
pub struct ToggleOptions {
    pub twin: Option<PathBuf>,
    pub toggle: VtToggle,
    pub output: Option<PathBuf>,
    pub patch_only: bool,
}

/// JSON to submit for a toggle: the minimal patch or the full updated twin
pub fn toggle_json(opts: &ToggleOptions) -> Result<String> {
    let body = if opts.patch_only {
        build_enable_patch(opts.toggle)
    } else {
        let path = opts
            .twin
            .as_deref()
            .context("--twin is required unless --patch-only is given")?;
        let twin = load_twin(path)?;
        serde_json::to_value(apply_enable_toggle(&twin, opts.toggle)?)?
    };
    Ok(serde_json::to_string_pretty(&body)?)
}

/// Handle toggle command
pub fn toggle(opts: &ToggleOptions) -> Result<()> {
    let json = toggle_json(opts)?;
    match &opts.output {
        Some(path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Verified telemetry {} patch written to {}", opts.toggle, path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Handle config command
pub fn config(explicit: Option<&Path>, set: Option<&str>, show: bool) -> Result<()> {
    // --set against a fresh --config path starts from defaults
    let mut config = match explicit {
        Some(path) if set.is_some() && !path.exists() => VtwinConfig::default(),
        _ => VtwinConfig::load(explicit)?,
    };

    if let Some(set_expr) = set {
        let (key, value) = set_expr
            .split_once('=')
            .context("Invalid format. Use: key=value")?;
        config.set(key.trim(), value.trim())?;

        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => VtwinConfig::user_config_path()?,
        };
        config.save_to(&path)?;
        println!("Saved {} to {}", key.trim(), path.display());
        if !show {
            return Ok(());
        }
    }

    print!(
        "{}",
        toml_preview(&config).context("Failed to render configuration")?
    );
    Ok(())
}

fn toml_preview(config: &VtwinConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
