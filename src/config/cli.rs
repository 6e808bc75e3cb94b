use crate::domain::ports::ReportSink;
use crate::domain::summary::SessionSummary;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Writes each summary as `session-<timestamp>.json` under a local directory.
/// Existing reports are never overwritten; a `-N` suffix is added instead.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    base_path: PathBuf,
}

impl JsonFileSink {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn file_name(summary: &SessionSummary, attempt: u32) -> String {
        let stamp = summary.started_at.format("%Y%m%dT%H%M%S%.3fZ");
        if attempt == 0 {
            format!("session-{}.json", stamp)
        } else {
            format!("session-{}-{}.json", stamp, attempt)
        }
    }
}

#[async_trait]
impl ReportSink for JsonFileSink {
    async fn publish(&self, summary: &SessionSummary) -> Result<String> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        let json_data = serde_json::to_string_pretty(summary)?;

        let mut attempt = 0;
        let full_path = loop {
            let candidate = self.base_path.join(Self::file_name(summary, attempt));
            match OpenOptions::new().write(true).create_new(true).open(&candidate).await {
                Ok(mut file) => {
                    file.write_all(json_data.as_bytes()).await?;
                    file.flush().await?;
                    break candidate;
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        };

        tracing::debug!("Session report written to {}", full_path.display());
        Ok(full_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::summary::SessionOutcome;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_publish_writes_json_report() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(temp_dir.path().join("reports"));
        let summary = SessionSummary {
            started_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap(),
            mode: "simple".to_string(),
            driver: "cadence".to_string(),
            iterations: 120,
            elapsed_secs: 60.0,
            ores_mined: 12,
            luno_earned: 6000,
            rate_per_hour: 720.0,
            outcome: SessionOutcome::Completed,
            telemetry: None,
        };

        let path = sink.publish(&summary).await.unwrap();
        assert!(path.ends_with("session-20260301T123000.000Z.json"));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["ores_mined"], 12);
        assert_eq!(written["luno_earned"], 6000);
        assert_eq!(written["outcome"]["status"], "completed");
        assert!(written.get("telemetry").is_none());
    }

    #[tokio::test]
    async fn test_reports_started_in_the_same_second_are_kept() {
        let temp_dir = TempDir::new().unwrap();
        let sink = JsonFileSink::new(temp_dir.path());
        let started_at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let summary = |started_at| SessionSummary {
            started_at,
            mode: "simple".to_string(),
            driver: "cadence".to_string(),
            iterations: 0,
            elapsed_secs: 0.0,
            ores_mined: 0,
            luno_earned: 0,
            rate_per_hour: 0.0,
            outcome: SessionOutcome::Interrupted,
            telemetry: None,
        };

        let first = sink.publish(&summary(started_at)).await.unwrap();
        let second = sink
            .publish(&summary(started_at + chrono::Duration::milliseconds(250)))
            .await
            .unwrap();
        let third = sink.publish(&summary(started_at)).await.unwrap();

        assert!(second.ends_with("session-20260301T123000.250Z.json"));
        assert!(third.ends_with("session-20260301T123000.000Z-1.json"));
        assert_ne!(first, third);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 3);
    }
}
