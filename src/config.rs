use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub max_upload_bytes: usize,
    pub flip_policy: FlipPolicy,
    pub unrealized_policy: UnrealizedPolicy,
}

/// What happens to cash closing quantity beyond the open queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlipPolicy {
    /// Excess opens a new lot in the opposite direction.
    #[default]
    Reverse,
    /// Excess is reported as an unmatched close.
    Discard,
}

/// Whether residual lots contribute to total P&L.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnrealizedPolicy {
    /// Mark residual lots at the last observed trade price and include them.
    #[default]
    MarkToLast,
    /// Report residual lots but count realized P&L only.
    Exclude,
}

/// Policy knobs handed to each analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalysisPolicy {
    pub flip: FlipPolicy,
    pub unrealized: UnrealizedPolicy,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let max_upload_bytes = env_map
            .get("MAX_UPLOAD_BYTES")
            .map(|s| s.as_str())
            .unwrap_or("10485760")
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "MAX_UPLOAD_BYTES".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        let flip_policy = match env_map
            .get("FLIP_POLICY")
            .map(|s| s.as_str())
            .unwrap_or("reverse")
        {
            "reverse" => FlipPolicy::Reverse,
            "discard" => FlipPolicy::Discard,
            other => {
                return Err(ConfigError::InvalidValue(
                    "FLIP_POLICY".to_string(),
                    format!("must be reverse or discard, got {}", other),
                ))
            }
        };

        let unrealized_policy = match env_map
            .get("UNREALIZED_PNL")
            .map(|s| s.as_str())
            .unwrap_or("mark")
        {
            "mark" => UnrealizedPolicy::MarkToLast,
            "exclude" => UnrealizedPolicy::Exclude,
            other => {
                return Err(ConfigError::InvalidValue(
                    "UNREALIZED_PNL".to_string(),
                    format!("must be mark or exclude, got {}", other),
                ))
            }
        };

        Ok(Config {
            port,
            max_upload_bytes,
            flip_policy,
            unrealized_policy,
        })
    }

    pub fn policy(&self) -> AnalysisPolicy {
        AnalysisPolicy {
            flip: self.flip_policy,
            unrealized: self.unrealized_policy,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            max_upload_bytes: 10 * 1024 * 1024,
            flip_policy: FlipPolicy::default(),
            unrealized_policy: UnrealizedPolicy::default(),
        }
    }
}
