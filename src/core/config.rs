//! Gameplay configuration
//!
//! Tunables for abilities, spawners and cooldowns, loaded from RON or JSON.
//! Everything loaded here is validated before it reaches a runtime component,
//! so `tick` paths never have to deal with nonsensical values.

use std::fmt;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::AbilitySpec;
use crate::spawn::SpawnerConfig;

// ============================================================================
// Errors
// ============================================================================

/// Errors produced while building or loading gameplay configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Spawn rate was zero, negative or not finite
    InvalidRate(f32),
    /// Jitter fraction outside `[0, 1)`
    InvalidJitter(f32),
    /// Spawn cap of zero, which would never let anything spawn
    InvalidSpawnCap,
    /// An ability phase had a negative or non-finite duration
    InvalidDuration {
        /// Ability name
        ability: String,
        /// Phase name (`startup`, `active` or `recovery`)
        phase: &'static str,
        /// Offending value
        value: f32,
    },
    /// Error reading a config file
    IoError(String),
    /// Error parsing config contents
    ParseError(String),
    /// File extension is neither `.ron` nor `.json`
    UnsupportedFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRate(rate) => write!(f, "Spawn rate must be positive, got {rate}"),
            Self::InvalidJitter(jitter) => {
                write!(f, "Jitter must be in [0, 1), got {jitter}")
            }
            Self::InvalidSpawnCap => write!(f, "Spawn cap must be at least 1"),
            Self::InvalidDuration {
                ability,
                phase,
                value,
            } => write!(
                f,
                "Ability '{ability}' has invalid {phase} duration {value}"
            ),
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::ParseError(e) => write!(f, "Parse error: {e}"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported config format: {ext}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Kit Config
// ============================================================================

/// Top-level gameplay configuration.
///
/// # Example (RON)
///
/// ```ignore
/// (
///     max_health: 100.0,
///     abilities: [
///         (name: "slash", startup: 0.1, active: 0.15, recovery: 0.2, payload: (24.0, 0.0)),
///     ],
///     spawners: { "grunts": (rate: 0.5, jitter: 0.1) },
///     cooldowns: { "dash": 0.75 },
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KitConfig {
    /// Default hit points for new `Health` components
    pub max_health: f32,
    /// Ability table
    pub abilities: Vec<AbilitySpec>,
    /// Spawner tunables by name
    pub spawners: FxHashMap<String, SpawnerConfig>,
    /// Cooldown durations (seconds) by name
    pub cooldowns: FxHashMap<String, f32>,
}

impl Default for KitConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            abilities: Vec::new(),
            spawners: FxHashMap::default(),
            cooldowns: FxHashMap::default(),
        }
    }
}

impl KitConfig {
    /// Parse a RON document and validate it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` on malformed input, or the first
    /// validation error found.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(source).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document and validate it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` on malformed input, or the first
    /// validation error found.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(source).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, picking the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read, has an unknown extension,
    /// or fails to parse or validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let config = match ext.as_str() {
            "ron" => Self::from_ron_str(&source)?,
            "json" => Self::from_json_str(&source)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        log::info!(
            "Loaded config {}: {} abilities, {} spawners",
            path.display(),
            config.abilities.len(),
            config.spawners.len()
        );
        Ok(config)
    }

    /// Check every ability and spawner entry.
    ///
    /// # Errors
    ///
    /// Returns the first invalid entry found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for ability in &self.abilities {
            ability.validate().inspect_err(|e| log::warn!("{e}"))?;
        }
        for (name, spawner) in &self.spawners {
            spawner
                .validate()
                .inspect_err(|e| log::warn!("Spawner '{name}': {e}"))?;
        }
        Ok(())
    }

    /// Find an ability by name.
    #[must_use]
    pub fn ability(&self, name: &str) -> Option<&AbilitySpec> {
        self.abilities.iter().find(|a| a.name == name)
    }

    /// Find a spawner config by name.
    #[must_use]
    pub fn spawner(&self, name: &str) -> Option<&SpawnerConfig> {
        self.spawners.get(name)
    }

    /// Cooldown duration by name, if configured.
    #[must_use]
    pub fn cooldown(&self, name: &str) -> Option<f32> {
        self.cooldowns.get(name).copied()
    }
}

// ============================================================================
// Tests
// ============================================================================
