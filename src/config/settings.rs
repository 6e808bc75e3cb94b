use crate::config::toml_config::{AgentSettings, SessionFileConfig, TuningSettings};
use crate::config::{DriverKind, Mode};
#[cfg(feature = "cli")]
use crate::utils::{error::Result, validation::Validate};
use std::time::Duration;

/// Fully resolved session parameters: file config first, CLI flags on top.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub duration: Duration,
    pub tick_interval: Duration,
    pub mode: Mode,
    pub driver: DriverKind,
    pub luno_per_ore: u64,
    pub ore_every_ticks: u64,
    pub agent: AgentSettings,
    pub tuning: TuningSettings,
    pub monitor: bool,
    pub report_dir: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_file_config(SessionFileConfig::default(), Duration::from_secs(120 * 60))
    }
}

impl SessionSettings {
    pub fn from_file_config(file: SessionFileConfig, duration: Duration) -> Self {
        let monitor = file.monitoring_enabled();
        Self {
            duration,
            tick_interval: Duration::from_millis(file.session.tick_interval_ms),
            mode: Mode::default(),
            driver: file.session.driver,
            luno_per_ore: file.session.luno_per_ore,
            ore_every_ticks: file.session.ore_every_ticks,
            agent: file.agent,
            tuning: file.tuning,
            monitor,
            report_dir: None,
        }
    }

    #[cfg(feature = "cli")]
    pub fn resolve(cli: &crate::config::CliConfig, file: Option<SessionFileConfig>) -> Result<Self> {
        let file = file.unwrap_or_default();
        file.validate()?;

        let mut settings =
            Self::from_file_config(file, Duration::from_secs(cli.duration.saturating_mul(60)));
        settings.mode = cli.mode;
        if let Some(driver) = cli.driver {
            settings.driver = driver;
        }
        if let Some(seed) = cli.seed {
            settings.agent.seed = seed;
        }
        settings.monitor |= cli.monitor;
        settings.report_dir = cli.report.clone();
        Ok(settings)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_driver(mut self, driver: DriverKind) -> Self {
        self.driver = driver;
        self
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::config::CliConfig;
    use clap::Parser;

    #[test]
    fn test_resolve_defaults() {
        let cli = CliConfig::try_parse_from(["ore-session"]).unwrap();
        let settings = SessionSettings::resolve(&cli, None).unwrap();
        assert_eq!(settings.duration, Duration::from_secs(7200));
        assert_eq!(settings.tick_interval, Duration::from_millis(500));
        assert_eq!(settings.driver, DriverKind::Cadence);
        assert_eq!(settings.luno_per_ore, 500);
        assert!(!settings.monitor);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = SessionFileConfig::from_toml_str(
            r#"
[session]
driver = "cadence"

[agent]
seed = 1
"#,
        )
        .unwrap();
        let cli = CliConfig::try_parse_from([
            "ore-session",
            "--duration",
            "1",
            "--driver",
            "agent",
            "--seed",
            "77",
            "--mode",
            "market-focused",
            "--monitor",
        ])
        .unwrap();

        let settings = SessionSettings::resolve(&cli, Some(file)).unwrap();
        assert_eq!(settings.duration, Duration::from_secs(60));
        assert_eq!(settings.driver, DriverKind::Agent);
        assert_eq!(settings.agent.seed, 77);
        assert_eq!(settings.mode, Mode::MarketFocused);
        assert!(settings.monitor);
    }

    #[test]
    fn test_resolve_rejects_invalid_file() {
        let file = SessionFileConfig::from_toml_str("[session]\nore_every_ticks = 0\n").unwrap();
        let cli = CliConfig::try_parse_from(["ore-session"]).unwrap();
        assert!(SessionSettings::resolve(&cli, Some(file)).is_err());
    }
}
