//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. Every section and field is optional in the file;
//! anything left out keeps its default.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (hardcoded in `Default` impls)
//! 2. `config.toml` file (overrides defaults)
//! 3. Command line flags of the driving binary (override both)
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [genesis]
//! max_roots = 9
//! seed = 42
//!
//! [evaluation]
//! edge_kill_chance = 0.1
//!
//! [tuning]
//! global_entropy = 5
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shape of the random activation nets given to newly created particles.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenesisConfig {
    pub min_roots: usize,
    /// Upper bound on roots before scaling by computational difficulty.
    pub max_roots: usize,
    /// Non-root nodes generated per root.
    pub max_descendants: usize,
    pub max_edges: usize,
    /// Operand and comparator magnitude before scaling by global entropy.
    pub operand_range: i64,
    pub identity_chance: f64,
    pub inject_chance: f64,
    pub unconditional_chance: f64,
    /// When set, each lattice point's particle is derived from this seed and
    /// its coordinates.
    pub seed: Option<u64>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            min_roots: 1,
            max_roots: 9,
            max_descendants: 4,
            max_edges: 3,
            operand_range: 10,
            identity_chance: 0.05,
            inject_chance: 0.05,
            unconditional_chance: 0.3,
            seed: None,
        }
    }
}

/// Parameters of the per-tick evaluation pass.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Whether poll applies net decay after writing a particle back.
    pub decay_enabled: bool,
    /// Chance that a selected edge dies after being traversed.
    pub edge_kill_chance: f64,
    /// Alive roots served per neighbourhood layer.
    pub coverage_per_layer: usize,
    /// Edge hops allowed in one root evaluation before the carried value is
    /// returned as a leaf.
    pub max_traversal_depth: usize,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            decay_enabled: true,
            edge_kill_chance: 0.1,
            coverage_per_layer: 9,
            max_traversal_depth: 4096,
        }
    }
}

/// Starting values and bounds for the adaptive tuning loop.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TuningConfig {
    pub computational_difficulty: i64,
    pub global_entropy: i64,
    /// Target wall time of one expand + poll tick.
    pub time_to_expand_ms: u64,
    pub min_entropy: i64,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            computational_difficulty: 2,
            global_entropy: 5,
            time_to_expand_ms: 15,
            min_entropy: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_simulations: usize,
    /// Ticks between INFO summaries.
    pub log_interval: u64,
    pub max_ticks: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_simulations: 1,
            log_interval: 100,
            max_ticks: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub logs_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            logs_dir: "data/logs".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub genesis: GenesisConfig,
    pub evaluation: EvaluationConfig,
    pub tuning: TuningConfig,
    pub simulation: SimulationConfig,
    pub storage: StorageConfig,
}

fn is_probability(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

impl AppConfig {
    /// Validates configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value found.
    pub fn validate(&self) -> anyhow::Result<()> {
        let g = &self.genesis;
        anyhow::ensure!(g.min_roots >= 1, "Genesis needs at least one root");
        anyhow::ensure!(
            g.max_roots >= g.min_roots,
            "Max roots must be at least min roots"
        );
        anyhow::ensure!(g.operand_range >= 0, "Operand range must be non-negative");
        anyhow::ensure!(
            is_probability(g.identity_chance),
            "Identity chance must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            is_probability(g.inject_chance),
            "Inject chance must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            g.identity_chance + g.inject_chance <= 1.0,
            "Identity and inject chances must not exceed 1.0 together"
        );
        anyhow::ensure!(
            is_probability(g.unconditional_chance),
            "Unconditional chance must be in [0.0, 1.0]"
        );

        let e = &self.evaluation;
        anyhow::ensure!(
            is_probability(e.edge_kill_chance),
            "Edge kill chance must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            e.coverage_per_layer > 0,
            "Coverage per layer must be positive"
        );

        let t = &self.tuning;
        anyhow::ensure!(
            t.computational_difficulty >= 1,
            "Computational difficulty must be positive"
        );
        anyhow::ensure!(t.min_entropy >= 1, "Min entropy must be positive");
        anyhow::ensure!(
            t.global_entropy >= t.min_entropy,
            "Global entropy must not start below min entropy"
        );
        anyhow::ensure!(
            t.time_to_expand_ms > 0,
            "Time to expand must be positive"
        );

        anyhow::ensure!(
            self.simulation.log_interval > 0,
            "Log interval must be positive"
        );
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the validated defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
    }

    /// Hash of the sections that change simulated behaviour.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.genesis).as_bytes());
        hasher.update(format!("{:?}", self.evaluation).as_bytes());
        hasher.update(format!("{:?}", self.tuning).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [genesis]
            max_roots = 4
            seed = 7

            [tuning]
            global_entropy = 9
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(config.genesis.max_roots, 4);
        assert_eq!(config.genesis.seed, Some(7));
        assert_eq!(config.genesis.min_roots, 1);
        assert_eq!(config.tuning.global_entropy, 9);
        assert_eq!(config.evaluation, EvaluationConfig::default());
    }

    #[test]
    fn test_invalid_kill_chance() {
        let config = AppConfig {
            evaluation: EvaluationConfig {
                edge_kill_chance: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_roots() {
        let config = AppConfig {
            genesis: GenesisConfig {
                min_roots: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            genesis: GenesisConfig {
                min_roots: 5,
                max_roots: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_coverage() {
        let config = AppConfig {
            evaluation: EvaluationConfig {
                coverage_per_layer: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_entropy_below_minimum() {
        let config = AppConfig {
            tuning: TuningConfig {
                global_entropy: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load_or_default("/nonexistent/eve/config.toml")
            .expect("missing config falls back to defaults");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config1 = AppConfig::default();
        let mut config2 = AppConfig::default();
        assert_eq!(config1.fingerprint(), config2.fingerprint());
        config2.storage.data_dir = "elsewhere".to_string();
        assert_eq!(config1.fingerprint(), config2.fingerprint());
        config2.evaluation.edge_kill_chance = 0.2;
        assert_ne!(config1.fingerprint(), config2.fingerprint());
    }
}
