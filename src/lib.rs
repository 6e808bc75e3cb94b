pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::JsonFileSink, settings::SessionSettings, DriverKind, Mode};

pub use crate::core::{
    agent::AgentDriver, cadence::CadenceDriver, runner::run_configured, session::SessionEngine,
};
pub use domain::summary::{SessionOutcome, SessionSummary};
pub use utils::error::{Result, SessionError};
