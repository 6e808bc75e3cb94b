pub mod agent;
pub mod cadence;
pub mod decision;
pub mod executor;
pub mod field;
pub mod perception;
pub mod route;
pub mod runner;
pub mod schedule;
pub mod session;
pub mod telemetry;

pub use crate::domain::model::{ActionOutcome, ActionPlan, Observation, OreLedger};
pub use crate::domain::ports::{Actuator, FrameSource, ReportSink, TickDriver};
pub use crate::utils::error::Result;
