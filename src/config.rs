//! Engine configuration.

use crate::error::AppError;

/// Environment variable overriding [`EngineConfig::max_actions_per_hand`].
pub const MAX_ACTIONS_ENV: &str = "HAND_SETTLEMENT_MAX_ACTIONS";

/// Policy knobs for hand construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on actions recorded per hand. Bounds manual entry only.
    pub max_actions_per_hand: usize,
}

impl EngineConfig {
    pub const DEFAULT_MAX_ACTIONS: usize = 3;

    pub fn with_max_actions(max_actions_per_hand: usize) -> Self {
        EngineConfig {
            max_actions_per_hand,
        }
    }

    /// Builds a config from an optional raw override value.
    ///
    /// `None` yields the default; a value that is not a positive integer is rejected.
    pub fn from_override(raw: Option<&str>) -> std::result::Result<Self, AppError> {
        match raw.map(str::trim) {
            None => Ok(Self::default()),
            Some(value) => match value.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Self::with_max_actions(n)),
                _ => Err(AppError::InvalidConfig(format!(
                    "{} must be a positive integer, got {:?}",
                    MAX_ACTIONS_ENV, value
                ))),
            },
        }
    }

    /// Reads the config from the process environment.
    pub fn from_env() -> std::result::Result<Self, AppError> {
        let raw = std::env::var(MAX_ACTIONS_ENV).ok();
        Self::from_override(raw.as_deref())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::with_max_actions(Self::DEFAULT_MAX_ACTIONS)
    }
}
