//! CLI argument definitions using clap.

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// sensor-view - synchronized sensor compositing for a CARLA-style simulator
#[derive(Parser, Debug)]
#[command(
    name = "sensor-view",
    author,
    version,
    about = "Synchronized sensor view for a CARLA-style simulator",
    long_about = "Connects to the simulator, spawns a vehicle with cameras / GNSS / IMU, \n\
                  keeps the latest sample of every sensor, and composites a camera grid, \n\
                  a single camera view or a telemetry dashboard every cycle."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SENSOR_VIEW_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SENSOR_VIEW_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sensor view
    Run(RunArgs),

    /// Validate a configuration without running
    Validate(ValidateArgs),

    /// Describe a configuration
    Info(InfoArgs),

    /// List built-in presets or dump one as a config file
    Presets(PresetsArgs),
}

/// Where the rig comes from: a config file or a built-in preset
#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("source").required(true).args(["config", "preset"])))]
pub struct SourceArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "SENSOR_VIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Built-in preset (surround, telemetry, chase-camera, drive)
    #[arg(short, long, env = "SENSOR_VIEW_PRESET")]
    pub preset: Option<String>,
}

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Use the in-process mock simulator instead of a real server
    #[arg(long, env = "SENSOR_VIEW_MOCK")]
    pub mock: bool,

    /// Override simulator host from configuration
    #[arg(long, env = "CARLA_HOST")]
    pub host: Option<String>,

    /// Override simulator port from configuration
    #[arg(long, env = "CARLA_PORT")]
    pub port: Option<u16>,

    /// Stop after this many cycles (0 = configuration / unlimited)
    #[arg(long, default_value = "0", env = "SENSOR_VIEW_MAX_FRAMES")]
    pub max_frames: u64,

    /// Stop after this many seconds (0 = configuration / unlimited)
    #[arg(long, default_value = "0", env = "SENSOR_VIEW_DURATION")]
    pub duration: f64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", env = "SENSOR_VIEW_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed sensor information
    #[arg(long)]
    pub sensors: bool,
}

/// Arguments for the `presets` command
#[derive(Args, Debug)]
pub struct PresetsArgs {
    /// Print this preset as a config file instead of listing
    #[arg(long)]
    pub dump: Option<String>,

    /// Format of the dumped config
    #[arg(long, value_enum, default_value = "toml")]
    pub format: DumpFormat,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DumpFormat {
    #[default]
    Toml,
    Json,
}
