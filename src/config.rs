//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::geo::DistanceUnit;

pub const ENV_CATALOG: &str = "CLINIC_FINDER_CATALOG";
pub const ENV_TOP_K: &str = "CLINIC_FINDER_TOP_K";
pub const ENV_UNIT: &str = "CLINIC_FINDER_UNIT";
pub const ENV_INTENT_THRESHOLD: &str = "CLINIC_FINDER_INTENT_THRESHOLD";
pub const ENV_MAX_REPROMPTS: &str = "CLINIC_FINDER_MAX_REPROMPTS";

/// Bot configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    /// Catalog file to load. `None` uses the built-in catalog.
    pub catalog_path: Option<PathBuf>,
    /// How many facilities to offer per search.
    pub top_k: usize,
    /// Unit distances are shown in.
    pub unit: DistanceUnit,
    /// Minimum intent score required to act on an intent.
    pub intent_threshold: f64,
    /// Invalid answers tolerated per prompt before the dialog is dropped.
    pub max_reprompts: u32,
    /// Identifier the bot uses for itself in conversation updates.
    pub bot_id: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            top_k: 3,
            unit: DistanceUnit::Miles,
            intent_threshold: 0.5,
            max_reprompts: 3,
            bot_id: "clinic-finder".to_string(),
        }
    }
}

impl BotConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let catalog_path = lookup(ENV_CATALOG)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            catalog_path,
            top_k: parse_or(&lookup, ENV_TOP_K, defaults.top_k),
            unit: parse_or(&lookup, ENV_UNIT, defaults.unit),
            intent_threshold: parse_or(&lookup, ENV_INTENT_THRESHOLD, defaults.intent_threshold),
            max_reprompts: parse_or(&lookup, ENV_MAX_REPROMPTS, defaults.max_reprompts),
            bot_id: defaults.bot_id,
        }
    }

    /// Reject values the bot cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_TOP_K.to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.intent_threshold) {
            return Err(ConfigError::InvalidValue {
                key: ENV_INTENT_THRESHOLD.to_string(),
                message: format!("{} is outside [0, 1]", self.intent_threshold),
            });
        }
        Ok(())
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Ignoring unparseable configuration value");
                default
            }
        },
        None => default,
    }
}
