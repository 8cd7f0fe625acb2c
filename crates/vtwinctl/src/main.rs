//! vtwinctl - verified telemetry status for device twins
//!
//! Reads twin and model definition documents, prints the sensor status table
//! and device banner, and prepares the desired patch that toggles verified
//! telemetry.

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use vtwin_common::{VtToggle, VtwinConfig};
use vtwinctl::commands::{self, StatusOptions, ToggleOptions};
use vtwinctl::{errors, logging, output};

#[derive(Parser)]
#[command(name = "vtwinctl")]
#[command(about = "Verified telemetry status for IoT device twins", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (overrides $VTWIN_CONFIG and the default locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show device status and the per-sensor verification table
    Status {
        /// Twin document (JSON)
        #[arg(long)]
        twin: PathBuf,

        /// Model definition for the component (JSON)
        #[arg(long)]
        model: PathBuf,

        /// Interface id stamped into each row (defaults to the model @id)
        #[arg(long)]
        interface_id: Option<String>,

        /// Only show sensors whose name contains this text
        #[arg(long)]
        filter: Option<String>,

        /// Mark sensors as selected (repeatable)
        #[arg(long)]
        select: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List telemetry names defined by a model
    Telemetry {
        #[arg(long)]
        model: PathBuf,
    },

    /// List commands defined by a model
    Commands {
        #[arg(long)]
        model: PathBuf,

        /// Component name used in messages
        #[arg(long)]
        component: Option<String>,
    },

    /// Resolve a sensor's fingerprint confidence metric
    Confidence {
        #[arg(long)]
        twin: PathBuf,

        #[arg(long)]
        model: PathBuf,

        /// Reported sensor component, e.g. vTsoilMoistureExternal1
        #[arg(long)]
        component: String,
    },

    /// Prepare the desired patch enabling or disabling verified telemetry
    #[command(group(ArgGroup::new("state").required(true).args(["enable", "disable"])))]
    Toggle {
        /// Twin document to update (not needed with --patch-only)
        #[arg(long, required_unless_present = "patch_only")]
        twin: Option<PathBuf>,

        #[arg(long)]
        enable: bool,

        #[arg(long)]
        disable: bool,

        /// Write JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Emit only the desired patch, not the full updated twin
        #[arg(long)]
        patch_only: bool,
    },

    /// Show or change configuration
    Config {
        /// Print the effective configuration (default without --set)
        #[arg(long)]
        show: bool,

        /// Set a configuration value (key=value)
        #[arg(long)]
        set: Option<String>,
    },
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status {
            twin,
            model,
            interface_id,
            filter,
            select,
            json,
        } => {
            let config = VtwinConfig::load(cli.config.as_deref())?;
            let opts = StatusOptions {
                twin,
                model,
                interface_id,
                filter,
                select,
                json,
            };
            commands::status(&opts, &config)
        }
        Commands::Telemetry { model } => commands::telemetry(&model),
        Commands::Commands { model, component } => commands::commands(&model, component.as_deref()),
        Commands::Confidence {
            twin,
            model,
            component,
        } => commands::confidence(&twin, &model, &component),
        Commands::Toggle {
            twin,
            enable,
            disable: _,
            output,
            patch_only,
        } => {
            let toggle = if enable { VtToggle::Enable } else { VtToggle::Disable };
            commands::toggle(&ToggleOptions {
                twin,
                toggle,
                output,
                patch_only,
            })
        }
        Commands::Config { show, set } => {
            commands::config(cli.config.as_deref(), set.as_deref(), show)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::from(errors::EXIT_SUCCESS as u8),
        Err(err) => {
            output::display_error(&format!("{:#}", err));
            ExitCode::from(errors::exit_code_for(&err) as u8)
        }
    }
}
