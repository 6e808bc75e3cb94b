use crate::config::settings::SessionSettings;
use crate::core::schedule::TierSchedule;
use crate::domain::model::OreLedger;
use crate::domain::ports::TickDriver;
use crate::domain::summary::{hourly_rate, SessionOutcome, SessionSummary};
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;
use std::future::Future;
use tokio::time::{sleep, Instant};

/// 每 N 次迭代記錄一次系統狀態
const MONITOR_EVERY: u64 = 600;

pub struct SessionEngine<D: TickDriver> {
    driver: D,
    settings: SessionSettings,
    schedule: TierSchedule,
    monitor: SystemMonitor,
}

impl<D: TickDriver> SessionEngine<D> {
    pub fn new(driver: D, settings: SessionSettings) -> Self {
        Self::new_with_monitoring(driver, settings, false)
    }

    pub fn new_with_monitoring(driver: D, settings: SessionSettings, monitor_enabled: bool) -> Self {
        Self {
            driver,
            settings,
            schedule: TierSchedule::default(),
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs until the deadline, a driver fault, or `shutdown` resolving.
    /// Always ends with exactly one summary.
    pub async fn run<S>(&mut self, shutdown: S) -> SessionSummary
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let started_at = Utc::now();
        let started = Instant::now();
        let deadline = started + self.settings.duration;
        let mut ledger = OreLedger::new(self.settings.luno_per_ore);
        let mut iteration: u64 = 0;

        tracing::info!(
            "🚀 Session started - Duration: {}m, Mode: {}, Driver: {}",
            self.settings.duration.as_secs_f64() / 60.0,
            self.settings.mode,
            self.driver.name()
        );
        self.monitor.log_stats("Session start");

        let outcome = loop {
            if Instant::now() >= deadline {
                break SessionOutcome::Completed;
            }
            iteration += 1;
            self.schedule.emit_before_driver(iteration);

            if let Err(e) = self.driver.tick(iteration, &mut ledger).await {
                tracing::error!("❌ Error during session at iteration {}: {:?}", iteration, e);
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                break SessionOutcome::Faulted {
                    message: e.to_string(),
                };
            }
            self.schedule.emit_after_driver(iteration);

            if iteration % MONITOR_EVERY == 0 {
                self.monitor.log_stats("Session");
            }

            tokio::select! {
                _ = sleep(self.settings.tick_interval) => {}
                _ = &mut shutdown => {
                    tracing::info!("⏹️  Session interrupted by user (Ctrl+C)");
                    break SessionOutcome::Interrupted;
                }
            }
        };

        let elapsed = started.elapsed();
        let summary = SessionSummary {
            started_at,
            mode: self.settings.mode.to_string(),
            driver: self.driver.name().to_string(),
            iterations: iteration,
            elapsed_secs: elapsed.as_secs_f64(),
            ores_mined: ledger.ores_mined(),
            luno_earned: ledger.luno_earned(),
            rate_per_hour: hourly_rate(ledger.ores_mined(), elapsed),
            outcome,
            telemetry: self.driver.telemetry(),
        };

        self.monitor.log_final_stats();
        tracing::info!("\n{}", summary.render());
        summary
    }
}
