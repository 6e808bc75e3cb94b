use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SessionOutcome {
    Completed,
    Interrupted,
    Faulted { message: String },
}

impl SessionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SessionOutcome::Completed => "Session Complete",
            SessionOutcome::Interrupted => "Interrupted",
            SessionOutcome::Faulted { .. } => "Faulted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub started_at: DateTime<Utc>,
    pub mode: String,
    pub driver: String,
    pub iterations: u64,
    pub elapsed_secs: f64,
    pub ores_mined: u64,
    pub luno_earned: u64,
    pub rate_per_hour: f64,
    pub outcome: SessionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<serde_json::Value>,
}

/// Ores per hour; zero when no time has passed.
pub fn hourly_rate(ores: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        ores as f64 / (secs / 3600.0)
    } else {
        0.0
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl SessionSummary {
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed_secs / 60.0
    }

    pub fn render(&self) -> String {
        let rule = "═".repeat(64);
        let mut lines = vec![
            format!("╔{}╗", rule),
            format!("║ {:^62} ║", "📊 SESSION SUMMARY"),
            format!("╠{}╣", rule),
        ];
        let rows = [
            ("Mode", self.mode.clone()),
            ("Driver", self.driver.clone()),
            ("Duration", format!("{:>8.1} minutes", self.elapsed_minutes())),
            ("Iterations", format!("{:>8}", self.iterations)),
            ("Ores Mined", format!("{:>8}", self.ores_mined)),
            ("Mining Rate", format!("{:>8.1} nodes/hour", self.rate_per_hour)),
            ("Total Luno", format!("{:>8}", group_thousands(self.luno_earned))),
            ("Status", self.outcome.label().to_string()),
        ];
        for (label, value) in rows {
            lines.push(format!("║  {:<18} {:<42} ║", format!("{}:", label), value));
        }
        if let SessionOutcome::Faulted { message } = &self.outcome {
            lines.push(format!("║  {:<18} {:<42} ║", "Error:", message));
        }
        lines.push(format!("╚{}╝", rule));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(ores: u64, elapsed_secs: f64, outcome: SessionOutcome) -> SessionSummary {
        SessionSummary {
            started_at: Utc::now(),
            mode: "simple".to_string(),
            driver: "cadence".to_string(),
            iterations: ores * 10,
            elapsed_secs,
            ores_mined: ores,
            luno_earned: ores * 500,
            rate_per_hour: hourly_rate(ores, Duration::from_secs_f64(elapsed_secs)),
            outcome,
            telemetry: None,
        }
    }

    #[test]
    fn test_hourly_rate() {
        assert_eq!(hourly_rate(12, Duration::from_secs(60)), 720.0);
        assert_eq!(hourly_rate(5, Duration::ZERO), 0.0);
        assert_eq!(hourly_rate(0, Duration::from_secs(10)), 0.0);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(500), "500");
        assert_eq!(group_thousands(6000), "6,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_render_contains_counters() {
        let report = summary(12, 60.0, SessionOutcome::Completed).render();
        assert!(report.contains("SESSION SUMMARY"));
        assert!(report.contains("1.0 minutes"));
        assert!(report.contains("6,000"));
        assert!(report.contains("720.0 nodes/hour"));
        assert!(report.contains("Session Complete"));
    }

    #[test]
    fn test_render_faulted_includes_message() {
        let report = summary(
            1,
            5.0,
            SessionOutcome::Faulted {
                message: "frame capture failed".to_string(),
            },
        )
        .render();
        assert!(report.contains("Faulted"));
        assert!(report.contains("frame capture failed"));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(SessionOutcome::Interrupted).unwrap();
        assert_eq!(json["status"], "interrupted");
    }
}
