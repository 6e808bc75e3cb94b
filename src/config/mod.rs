pub mod cli;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating mode. Accepted and reported, but the session does not branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    #[default]
    Simple,
    MultiZone,
    MarketFocused,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Mode::Simple => "simple",
            Mode::MultiZone => "multi-zone",
            Mode::MarketFocused => "market-focused",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Fixed-cadence counter.
    #[default]
    Cadence,
    /// Perception, decision and action over the simulated field.
    Agent,
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverKind::Cadence => f.write_str("cadence"),
            DriverKind::Agent => f.write_str("agent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Longest accepted session: one week.
pub const MAX_DURATION_MINUTES: u64 = 7 * 24 * 60;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ore-session")]
#[command(about = "Timed resource-gathering session runner")]
#[command(version)]
pub struct CliConfig {
    /// Session duration in minutes
    #[arg(long, default_value_t = 120)]
    pub duration: u64,

    #[arg(long, help = "Enable verbose (debug) logging")]
    pub verbose: bool,

    /// Operating mode
    #[arg(long, value_enum, default_value_t = Mode::Simple)]
    pub mode: Mode,

    /// Path to a TOML session configuration
    #[arg(long)]
    pub config: Option<String>,

    /// Override the driver from the configuration file
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,

    /// Override the simulation seed
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, help = "Log process CPU and memory usage")]
    pub monitor: bool,

    /// Directory to write the JSON session report into
    #[arg(long)]
    pub report: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_range("duration", self.duration, 0, MAX_DURATION_MINUTES)?;
        if let Some(path) = &self.config {
            validation::validate_path("config", path)?;
        }
        if let Some(dir) = &self.report {
            validation::validate_path("report", dir)?;
        }
        Ok(())
    }
}
