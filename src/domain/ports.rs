use crate::domain::model::{Frame, Input, InputEffect, OreLedger};
use crate::domain::summary::SessionSummary;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Per-iteration work plugged into the session loop.
#[async_trait]
pub trait TickDriver: Send {
    fn name(&self) -> &'static str;

    async fn tick(&mut self, iteration: u64, ledger: &mut OreLedger) -> Result<()>;

    /// Extra data for the summary, if the driver keeps any.
    fn telemetry(&self) -> Option<serde_json::Value> {
        None
    }
}

pub trait FrameSource: Send {
    fn capture(&mut self, tick: u64) -> Result<Frame>;
}

pub trait Actuator: Send {
    fn apply(&mut self, input: &Input) -> Result<InputEffect>;
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persists the summary and returns where it went.
    async fn publish(&self, summary: &SessionSummary) -> Result<String>;
}
