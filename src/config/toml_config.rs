use crate::config::DriverKind;
use crate::utils::error::{Result, SessionError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// 單一礦石的 Luno 上限，讓累計金額在任何實際迭代次數內都不會溢位
pub const MAX_LUNO_PER_ORE: u64 = 1_000_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFileConfig {
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub tuning: TuningSettings,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub tick_interval_ms: u64,
    pub driver: DriverKind,
    pub luno_per_ore: u64,
    pub ore_every_ticks: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            driver: DriverKind::Cadence,
            luno_per_ore: 500,
            ore_every_ticks: 10,
        }
    }
}

/// Simulated field, executor timing and stamina rules for the agent driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub seed: u64,
    pub field_width: i32,
    pub field_height: i32,
    pub node_count: usize,
    pub mining_ticks: u32,
    pub stamina_max: u32,
    pub swing_cost: u32,
    pub rest_regen: u32,
    pub rest_below: u32,
    pub resume_at: u32,
    pub signal_noise: f32,
    pub jitter_pct: f32,
    pub step_ms: u64,
    pub swing_ms: u64,
    pub rest_ms: u64,
    pub idle_ms: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            seed: 7,
            field_width: 24,
            field_height: 16,
            node_count: 12,
            mining_ticks: 3,
            stamina_max: 100,
            swing_cost: 6,
            rest_regen: 10,
            rest_below: 12,
            resume_at: 80,
            signal_noise: 0.08,
            jitter_pct: 0.15,
            step_ms: 420,
            swing_ms: 900,
            rest_ms: 1000,
            idle_ms: 250,
        }
    }
}

/// Adaptive controller bounds for the detection confidence threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningSettings {
    pub initial_threshold: f32,
    pub min_threshold: f32,
    pub max_threshold: f32,
    pub step: f32,
    pub window: usize,
    pub target_success_rate: f32,
}

impl Default for TuningSettings {
    fn default() -> Self {
        Self {
            initial_threshold: 0.55,
            min_threshold: 0.30,
            max_threshold: 0.95,
            step: 0.05,
            window: 8,
            target_success_rate: 0.75,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("static pattern is valid"))
}

impl SessionFileConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${ORE_SEED})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for SessionSection {
    fn validate(&self) -> Result<()> {
        validation::validate_at_least("session.tick_interval_ms", self.tick_interval_ms, 1)?;
        validation::validate_at_least("session.ore_every_ticks", self.ore_every_ticks, 1)?;
        validation::validate_range("session.luno_per_ore", self.luno_per_ore, 1, MAX_LUNO_PER_ORE)?;
        Ok(())
    }
}

impl Validate for AgentSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_range("agent.field_width", self.field_width, 2, 4096)?;
        validation::validate_range("agent.field_height", self.field_height, 2, 4096)?;
        let cells = (self.field_width as usize) * (self.field_height as usize);
        if self.node_count == 0 || self.node_count >= cells {
            return Err(SessionError::InvalidConfigValueError {
                field: "agent.node_count".to_string(),
                value: self.node_count.to_string(),
                reason: format!("Must be between 1 and {} for this field size", cells - 1),
            });
        }
        validation::validate_at_least("agent.mining_ticks", self.mining_ticks, 1)?;
        validation::validate_at_least("agent.stamina_max", self.stamina_max, 1)?;
        validation::validate_range("agent.swing_cost", self.swing_cost, 0, self.stamina_max)?;
        validation::validate_at_least("agent.rest_regen", self.rest_regen, 1)?;
        validation::validate_ordered(
            "agent.rest_below",
            self.rest_below,
            "agent.resume_at",
            self.resume_at,
        )?;
        validation::validate_range("agent.resume_at", self.resume_at, 0, self.stamina_max)?;
        validation::validate_range("agent.signal_noise", self.signal_noise, 0.0, 1.0)?;
        validation::validate_range("agent.jitter_pct", self.jitter_pct, 0.0, 0.9)?;
        Ok(())
    }
}

impl Validate for TuningSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_range("tuning.min_threshold", self.min_threshold, 0.0, 1.0)?;
        validation::validate_range("tuning.max_threshold", self.max_threshold, 0.0, 1.0)?;
        validation::validate_ordered(
            "tuning.min_threshold",
            self.min_threshold,
            "tuning.max_threshold",
            self.max_threshold,
        )?;
        validation::validate_range(
            "tuning.initial_threshold",
            self.initial_threshold,
            self.min_threshold,
            self.max_threshold,
        )?;
        validation::validate_range("tuning.step", self.step, 0.0, 1.0)?;
        validation::validate_at_least("tuning.window", self.window, 1)?;
        validation::validate_range(
            "tuning.target_success_rate",
            self.target_success_rate,
            0.0,
            1.0,
        )?;
        Ok(())
    }
}

impl Validate for SessionFileConfig {
    fn validate(&self) -> Result<()> {
        self.session.validate()?;
        self.agent.validate()?;
        self.tuning.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SessionFileConfig::from_toml_str("").unwrap();
        assert_eq!(config.session.tick_interval_ms, 500);
        assert_eq!(config.session.luno_per_ore, 500);
        assert_eq!(config.session.ore_every_ticks, 10);
        assert_eq!(config.session.driver, DriverKind::Cadence);
        assert_eq!(config.agent, AgentSettings::default());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_sections() {
        let toml_content = r#"
[session]
tick_interval_ms = 50
driver = "agent"

[agent]
seed = 99
node_count = 5

[tuning]
window = 4

[monitoring]
enabled = true
"#;

        let config = SessionFileConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.session.tick_interval_ms, 50);
        assert_eq!(config.session.driver, DriverKind::Agent);
        assert_eq!(config.session.luno_per_ore, 500);
        assert_eq!(config.agent.seed, 99);
        assert_eq!(config.agent.node_count, 5);
        assert_eq!(config.agent.field_width, 24);
        assert_eq!(config.tuning.window, 4);
        assert!(config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ORE_SESSION_TEST_SEED", "4242");

        let toml_content = r#"
[agent]
seed = ${ORE_SESSION_TEST_SEED}
"#;

        let config = SessionFileConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.agent.seed, 4242);

        std::env::remove_var("ORE_SESSION_TEST_SEED");
    }

    #[test]
    fn test_unknown_driver_is_rejected() {
        let toml_content = r#"
[session]
driver = "turbo"
"#;
        let err = SessionFileConfig::from_toml_str(toml_content).unwrap_err();
        assert!(matches!(err, SessionError::TomlError(_)));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[session]
tick_interval_ms = 0
"#;
        let config = SessionFileConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[tuning]
min_threshold = 0.8
max_threshold = 0.4
initial_threshold = 0.5
"#;
        let config = SessionFileConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[agent]
field_width = 3
field_height = 3
node_count = 9
"#;
        let config = SessionFileConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_agent_noise_and_jitter_are_rejected() {
        let config =
            SessionFileConfig::from_toml_str("[session]\ndriver = \"agent\"\n[agent]\nsignal_noise = nan\n")
                .unwrap();
        assert!(config.agent.signal_noise.is_nan());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("agent.signal_noise"));

        let config = SessionFileConfig::from_toml_str("[agent]\njitter_pct = nan\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("agent.jitter_pct"));

        let config = SessionFileConfig::from_toml_str("[tuning]\nstep = inf\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_luno_per_ore_is_bounded() {
        let config =
            SessionFileConfig::from_toml_str("[session]\nluno_per_ore = 9223372036854775807\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("session.luno_per_ore"));

        let config = SessionFileConfig::from_toml_str("[session]\nluno_per_ore = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[session]
luno_per_ore = 250
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = SessionFileConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.session.luno_per_ore, 250);
    }
}
