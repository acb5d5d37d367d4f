//! Level-independent world settings read from TOML.

use heist_core::{Difficulty, SurfaceRules, Viewport};
use heist_system_guards::GuardConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings applied to every level loaded into a [`crate::World`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Terminal area levels are centered in.
    pub viewport: Viewport,
    /// Difficulty active when a level loads.
    pub difficulty: Difficulty,
    /// Symbol kinds that can be walked on and seen through.
    pub surface: SurfaceRules,
    /// Tunables shared by every guard.
    pub guards: GuardConfig,
}

/// Errors raised while reading a [`WorldConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document was not valid TOML or did not match the schema.
    #[error("invalid world configuration")]
    Parse(#[from] toml::de::Error),
    /// A guard step interval was zero.
    #[error("guard {field} must be greater than zero")]
    ZeroInterval {
        /// Name of the offending setting.
        field: &'static str,
    },
}

impl WorldConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would stall or spin the guard throttle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.guards.patrol_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "patrol_interval_ms",
            });
        }
        if self.guards.chase_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "chase_interval_ms",
            });
        }
        Ok(())
    }
}
