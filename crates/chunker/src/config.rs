use crate::error::ChunkerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Thresholds for the chunking strategies, all measured in characters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Window size of the default strategy
    pub chunk_size: usize,

    /// A sentence break is honoured only past this fraction of the window
    pub break_ratio: f64,

    /// Overlap between default windows (carried, not applied)
    pub overlap: usize,

    /// context_aware: comment or blank lines split a block above this size
    pub context_soft_limit: usize,

    /// context_aware: any block is cut once it grows past this size
    pub context_hard_limit: usize,

    /// semantic_cisco: a command group is cut once it grows past this size
    pub cisco_max_chars: usize,

    /// error_pattern: units are packed up to this size
    pub error_max_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            break_ratio: 0.7,
            overlap: 200,
            context_soft_limit: 800,
            context_hard_limit: 1500,
            cisco_max_chars: 1200,
            error_max_chars: 800,
        }
    }
}

impl ChunkerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".to_string());
        }

        if !(0.0..1.0).contains(&self.break_ratio) {
            return Err(format!(
                "break_ratio ({}) must be in [0, 1)",
                self.break_ratio
            ));
        }

        if self.context_soft_limit > self.context_hard_limit {
            return Err(format!(
                "context_soft_limit ({}) cannot exceed context_hard_limit ({})",
                self.context_soft_limit, self.context_hard_limit
            ));
        }

        if self.cisco_max_chars == 0 || self.error_max_chars == 0 {
            return Err("cisco_max_chars and error_max_chars must be > 0".to_string());
        }

        Ok(())
    }
}

/// Strategy for chunking a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStrategy {
    /// Fixed window that prefers to end on a sentence or line break
    Default,

    /// Configuration blocks delimited by top-level keywords
    ContextAware,

    /// Lines grouped by Cisco IOS command family
    SemanticCisco,

    /// Error / Cause / Solution units packed together
    ErrorPattern,
}

impl ChunkingStrategy {
    pub const ALL: [ChunkingStrategy; 4] = [
        ChunkingStrategy::Default,
        ChunkingStrategy::ContextAware,
        ChunkingStrategy::SemanticCisco,
        ChunkingStrategy::ErrorPattern,
    ];

    /// Wire name stored as `chunkingStrategy`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::ContextAware => "context_aware",
            Self::SemanticCisco => "semantic_cisco",
            Self::ErrorPattern => "error_pattern",
        }
    }

    /// Human readable name shown in the strategy picker
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Default => "Default Sentence-Aware",
            Self::ContextAware => "Context-Aware Configuration Blocks",
            Self::SemanticCisco => "Cisco IOS Command Grouping",
            Self::ErrorPattern => "Error Pattern Structured",
        }
    }
}

impl Default for ChunkingStrategy {
    fn default() -> Self {
        Self::Default
    }
}

impl fmt::Display for ChunkingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChunkingStrategy {
    type Err = ChunkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| ChunkerError::UnknownStrategy(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ChunkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.overlap, 200);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ChunkerConfig::default();

        config.chunk_size = 0;
        assert!(config.validate().is_err());

        config.chunk_size = 1000;
        config.break_ratio = 1.0;
        assert!(config.validate().is_err());

        config.break_ratio = 0.7;
        config.context_soft_limit = 2000;
        assert!(config.validate().is_err());

        config.context_soft_limit = 800;
        config.error_max_chars = 0;
        assert!(config.validate().is_err());

        config.error_max_chars = 800;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for strategy in ChunkingStrategy::ALL {
            let parsed: ChunkingStrategy = strategy.as_str().parse().unwrap();
            assert_eq!(parsed, strategy);
        }
        assert!("knowledge".parse::<ChunkingStrategy>().is_err());
    }

    #[test]
    fn test_strategy_serde_uses_wire_names() {
        let json = serde_json::to_string(&ChunkingStrategy::SemanticCisco).unwrap();
        assert_eq!(json, "\"semantic_cisco\"");
    }
}
