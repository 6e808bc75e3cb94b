use crate::config::settings::SessionSettings;
use crate::config::DriverKind;
use crate::core::agent::AgentDriver;
use crate::core::cadence::CadenceDriver;
use crate::core::session::SessionEngine;
use crate::domain::summary::SessionSummary;
use crate::utils::error::Result;
use std::future::Future;

/// Builds the configured driver and runs one session with it.
pub async fn run_configured<S>(settings: SessionSettings, shutdown: S) -> Result<SessionSummary>
where
    S: Future<Output = ()>,
{
    let monitor = settings.monitor;
    let summary = match settings.driver {
        DriverKind::Cadence => {
            let driver = CadenceDriver::new(settings.ore_every_ticks);
            SessionEngine::new_with_monitoring(driver, settings, monitor)
                .run(shutdown)
                .await
        }
        DriverKind::Agent => {
            let driver = AgentDriver::simulated(&settings.agent, &settings.tuning)?;
            SessionEngine::new_with_monitoring(driver, settings, monitor)
                .run(shutdown)
                .await
        }
    };
    Ok(summary)
}

/// Resolves on Ctrl+C. If the handler cannot be installed the session simply
/// runs to its deadline.
pub async fn ctrl_c_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("⚠️ Could not listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
