//! Experiment configuration structures and YAML parsing.
//!
//! Configurations describe one experiment run: the topology to build, the
//! sources to attach, and general run parameters such as the RNG seed.

use color_eyre::eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::network::Emission;

/// Topology templates for network construction
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Topology {
    /// Linear chain: agent[i] links to agent[i+1]
    Chain,
    /// Every ordered pair of distinct agents is linked
    FullyConnected,
    /// Fully connected seed of `m0` agents, preferential-attachment growth
    ScaleFree,
}

/// Complete experiment configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub general: GeneralConfig,
    pub network: NetworkConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.network.topology {
            Topology::ScaleFree => {
                let m0 = self.network.m0.ok_or_else(|| {
                    ValidationError::InvalidNetwork("ScaleFree requires m0".to_string())
                })?;
                let m = self.network.m.ok_or_else(|| {
                    ValidationError::InvalidNetwork("ScaleFree requires m".to_string())
                })?;
                if m0 == 0 {
                    return Err(ValidationError::InvalidNetwork(
                        "m0 must be at least 1".to_string(),
                    ));
                }
                if m == 0 || m > m0 {
                    return Err(ValidationError::InvalidNetwork(format!(
                        "m must be between 1 and m0 (got m = {}, m0 = {})",
                        m, m0
                    )));
                }
                if self.network.size < m0 {
                    return Err(ValidationError::InvalidNetwork(format!(
                        "size must be at least m0 (got size = {}, m0 = {})",
                        self.network.size, m0
                    )));
                }
            }
            Topology::Chain | Topology::FullyConnected => {
                if self.network.m0.is_some() || self.network.m.is_some() {
                    return Err(ValidationError::InvalidNetwork(
                        "m0 and m only apply to the ScaleFree topology".to_string(),
                    ));
                }
            }
        }

        for (index, source) in self.sources.iter().enumerate() {
            source
                .validate(self.network.size)
                .map_err(|reason| ValidationError::InvalidSource(format!(
                    "source {}: {}",
                    index, reason
                )))?;
        }

        Ok(())
    }
}

/// Shared general configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneralConfig {
    /// Seed for deterministic runs; omit for entropy-based seeding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// How many times each source is triggered (default 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            seed: None,
            rounds: Some(1),
            log_level: Some("info".to_string()),
        }
    }
}

/// Network construction parameters
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetworkConfig {
    pub topology: Topology,
    /// Number of agents the network is grown to
    pub size: usize,
    /// Seed size for ScaleFree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m0: Option<usize>,
    /// Connections per growth step for ScaleFree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m: Option<usize>,
}

/// How a source is wired into the network
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum SourceMode {
    /// Linked to every agent present at attach time
    Global,
    /// Linked to one agent, addressed by network-order index
    Local,
}

/// One source to attach after construction
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SourceConfig {
    pub mode: SourceMode,
    /// Agent index for Local mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<usize>,
    pub contents: Vec<Emission>,
}

impl SourceConfig {
    fn validate(&self, network_size: usize) -> Result<(), String> {
        match self.mode {
            SourceMode::Local => {
                let target = self
                    .target
                    .ok_or_else(|| "Local mode requires a target agent index".to_string())?;
                if target >= network_size {
                    return Err(format!(
                        "target {} is out of range for a network of {} agents",
                        target, network_size
                    ));
                }
            }
            SourceMode::Global => {
                if self.target.is_some() {
                    return Err("Global mode does not take a target".to_string());
                }
            }
        }

        if self.contents.is_empty() {
            return Err("at least one content type is required".to_string());
        }
        let mut seen = HashSet::new();
        for emission in &self.contents {
            if emission.content_type.is_empty() {
                return Err("content_type cannot be empty".to_string());
            }
            if !seen.insert(emission.content_type.as_str()) {
                return Err(format!(
                    "duplicate content type '{}'",
                    emission.content_type
                ));
            }
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid network configuration: {0}")]
    InvalidNetwork(String),
    #[error("Invalid source configuration: {0}")]
    InvalidSource(String),
}

/// Load and validate a configuration from a YAML file
pub fn load_config(path: &Path) -> color_eyre::Result<Config> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read configuration file '{}'", path.display()))?;
    let config: Config = serde_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse configuration file '{}'", path.display()))?;
    config
        .validate()
        .wrap_err("Configuration validation failed")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Payload;

    #[test]
    fn test_scale_free_config_parsing() {
        let yaml = r#"
general:
  seed: 42
  rounds: 2
network:
  topology: ScaleFree
  size: 6
  m0: 4
  m: 4
sources:
  - mode: Global
    contents:
      - content_type: genome
        payload:
          random_binary:
            bits: 16
      - content_type: memome
        payload:
          random_binary:
            bits: 16
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.general.seed, Some(42));
        assert_eq!(config.network.topology, Topology::ScaleFree);
        assert_eq!(config.network.m0, Some(4));
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].mode, SourceMode::Global);
        assert_eq!(config.sources[0].contents.len(), 2);
    }

    #[test]
    fn test_chain_config_with_local_source() {
        let yaml = r#"
general: {}
network:
  topology: Chain
  size: 4
sources:
  - mode: Local
    target: 0
    contents:
      - content_type: genome
        payload:
          fixed:
            value: "0101"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.network.topology, Topology::Chain);
        assert_eq!(config.sources[0].target, Some(0));
        assert_eq!(
            config.sources[0].contents[0].payload,
            Payload::Fixed {
                value: "0101".to_string()
            }
        );
    }

    #[test]
    fn test_scale_free_requires_m0_and_m() {
        let yaml = r#"
general: {}
network:
  topology: ScaleFree
  size: 6
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_m_larger_than_m0_is_rejected() {
        let yaml = r#"
general: {}
network:
  topology: ScaleFree
  size: 8
  m0: 2
  m: 4
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_chain_rejects_growth_parameters() {
        let yaml = r#"
general: {}
network:
  topology: Chain
  size: 4
  m: 2
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_local_source_requires_valid_target() {
        let yaml = r#"
general: {}
network:
  topology: Chain
  size: 2
sources:
  - mode: Local
    target: 5
    contents:
      - content_type: genome
        payload:
          random_binary:
            bits: 8
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidSource(_))
        ));
    }

    #[test]
    fn test_duplicate_content_types_are_rejected() {
        let yaml = r#"
general: {}
network:
  topology: Chain
  size: 2
sources:
  - mode: Global
    contents:
      - content_type: genome
        payload:
          random_binary:
            bits: 8
      - content_type: genome
        payload:
          random_binary:
            bits: 8
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }
}
