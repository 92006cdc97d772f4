//! tourney.toml engine configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub schedule: ScheduleConfig,
    pub optimizer: OptimizerConfig,
    pub weights: WeightsConfig,
    /// Fixed RNG seed for reproducible schedules.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScheduleConfig {
    pub teams_per_alliance: u32,
    /// Matches a team should sit out between consecutive appearances.
    pub min_match_separation: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            teams_per_alliance: 2,
            min_match_separation: 3,
        }
    }
}

/// Iteration budget presets for the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationTier {
    Low,
    #[default]
    Medium,
    High,
}

impl OptimizationTier {
    pub fn max_iterations(self) -> u32 {
        match self {
            OptimizationTier::Low => 5_000,
            OptimizationTier::Medium => 10_000,
            OptimizationTier::High => 25_000,
        }
    }
}

impl std::str::FromStr for OptimizationTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(OptimizationTier::Low),
            "medium" => Ok(OptimizationTier::Medium),
            "high" => Ok(OptimizationTier::High),
            other => Err(format!("unknown optimization tier: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    pub tier: OptimizationTier,
    /// Overrides the tier's iteration cap when set.
    pub max_iterations: Option<u32>,
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub min_temperature: f64,
    pub iterations_per_cooling_step: u32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            tier: OptimizationTier::default(),
            max_iterations: None,
            initial_temperature: 100.0,
            cooling_rate: 0.95,
            min_temperature: 0.01,
            iterations_per_cooling_step: 100,
        }
    }
}

impl OptimizerConfig {
    pub fn iteration_cap(&self) -> u32 {
        self.max_iterations
            .unwrap_or_else(|| self.tier.max_iterations())
    }
}

/// Penalty weights for the schedule score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeightsConfig {
    pub partner_repeat: f64,
    pub opponent_repeat: f64,
    pub separation: f64,
    pub color_imbalance: f64,
    pub station_imbalance: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            partner_repeat: 3.0,
            opponent_repeat: 2.0,
            separation: 10.0,
            color_imbalance: 2.0,
            station_imbalance: 0.5,
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.schedule.teams_per_alliance, 2);
        assert_eq!(config.optimizer.iteration_cap(), 10_000);
    }

    #[test]
    fn test_parse_partial_sections() {
        let toml_str = r#"
seed = 42

[optimizer]
tier = "high"

[weights]
separation = 4.0
"#;
        let config: EngineConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.optimizer.iteration_cap(), 25_000);
        assert_eq!(config.optimizer.cooling_rate, 0.95);
        assert_eq!(config.weights.separation, 4.0);
        assert_eq!(config.weights.partner_repeat, 3.0);
    }

    #[test]
    fn test_iteration_override_beats_tier() {
        let config = OptimizerConfig {
            tier: OptimizationTier::Low,
            max_iterations: Some(123),
            ..Default::default()
        };
        assert_eq!(config.iteration_cap(), 123);
    }

    #[test]
    fn test_tier_from_str() {
        assert_eq!("LOW".parse::<OptimizationTier>(), Ok(OptimizationTier::Low));
        assert!("extreme".parse::<OptimizationTier>().is_err());
    }

    #[test]
    fn test_toml_roundtrip_keeps_seed() {
        let config = EngineConfig {
            seed: Some(7),
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("seed = 7"));
    }
}
