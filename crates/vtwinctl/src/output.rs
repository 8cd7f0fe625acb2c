//! Output formatting - plain ASCII tables, color only for states

use owo_colors::OwoColorize;
use std::io::IsTerminal;
use vtwin_common::{ColorMode, ContentItem, DeviceReport, SensorStatus, SensorStatusRow};

pub const HR: &str = "------------------------------------------------------------";

const NAME_HEADER: &str = "Sensor name";
const STATUS_HEADER: &str = "Status";
const UPDATE_HEADER: &str = "Last update";

/// Resolve the configured color mode against stdout
pub fn use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Auto => std::io::stdout().is_terminal(),
        ColorMode::Always => true,
        ColorMode::Never => false,
    }
}

/// "Device status: working|faulty"
pub fn render_banner(report: &DeviceReport, color: bool) -> String {
    let banner = report.banner();
    if !color {
        return banner;
    }

    let state = report.device_state();
    let painted = if report.device_working {
        state.green().bold().to_string()
    } else {
        state.red().bold().to_string()
    };
    banner.replacen(state, &painted, 1)
}

fn paint_status(status: SensorStatus, padded: String, color: bool) -> String {
    if !color {
        return padded;
    }
    match status {
        SensorStatus::Verified => padded.green().to_string(),
        SensorStatus::Faulty => padded.red().to_string(),
        SensorStatus::Unverified => padded.yellow().to_string(),
    }
}

/// Sensor table with a header row; empty input renders a single notice line
pub fn render_rows(rows: &[&SensorStatusRow], color: bool) -> String {
    if rows.is_empty() {
        return "No sensors reported".to_string();
    }

    let name_w = rows
        .iter()
        .map(|r| r.name.len())
        .max()
        .unwrap_or(0)
        .max(NAME_HEADER.len());
    let status_w = "unverified".len().max(STATUS_HEADER.len());

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "{:<name_w$}  {:<status_w$}  {}",
        NAME_HEADER, STATUS_HEADER, UPDATE_HEADER
    ));
    lines.push(format!(
        "{}  {}  {}",
        "-".repeat(name_w),
        "-".repeat(status_w),
        "-".repeat(UPDATE_HEADER.len().max(19))
    ));

    for row in rows {
        let status = paint_status(row.status, format!("{:<status_w$}", row.status.to_string()), color);
        lines.push(format!("{:<name_w$}  {}  {}", row.name, status, row.last_update));
    }

    lines.join("\n")
}

/// Command list for a component
pub fn render_commands(component: &str, commands: &[&ContentItem]) -> String {
    if commands.is_empty() {
        return format!("No commands defined for {}", component);
    }

    commands
        .iter()
        .map(|c| match c.extra.get("request").and_then(|r| r.get("name")) {
            Some(request) => format!("{}({})", c.name, request.as_str().unwrap_or_default()),
            None => format!("{}()", c.name),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Display an error
pub fn display_error(message: &str) {
    eprintln!("[ERROR] {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, status: SensorStatus) -> SensorStatusRow {
        SensorStatusRow {
            key: 0,
            name: name.to_string(),
            status,
            interface_id: String::new(),
            last_update: "2023-04-01T10:00:00".to_string(),
        }
    }

    #[test]
    fn test_plain_banner() {
        let report = DeviceReport { device_working: true, rows: vec![] };
        assert_eq!(render_banner(&report, false), "Device status: working");
        let report = DeviceReport { device_working: false, rows: vec![] };
        assert_eq!(render_banner(&report, false), "Device status: faulty");
        assert_eq!(render_banner(&report, false), report.banner());
    }

    #[test]
    fn test_colored_banner_keeps_text() {
        let report = DeviceReport { device_working: false, rows: vec![] };
        let banner = render_banner(&report, true);
        assert!(banner.starts_with("Device status: "));
        assert!(banner.contains("faulty"));
        assert!(banner.contains("\x1b["));
    }

    #[test]
    fn test_table_alignment() {
        let rows = [
            row("vTsoilMoistureExternal1", SensorStatus::Verified),
            row("humidity", SensorStatus::Unverified),
        ];
        let refs: Vec<&SensorStatusRow> = rows.iter().collect();
        let table = render_rows(&refs, false);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Sensor name"));
        assert_eq!(
            lines[3],
            "humidity                 unverified  2023-04-01T10:00:00"
        );
        assert_eq!(lines[2].find("verified"), lines[3].find("unverified"));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(render_rows(&[], false), "No sensors reported");
    }
}
