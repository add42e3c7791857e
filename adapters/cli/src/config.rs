use std::{fs, io, path::Path};

use arena_horde_core::{PlayerState, WaveConfig, WaveTable, WaveTableError};
use arena_horde_system_combat::CombatConfig;
use arena_horde_system_difficulty::DifficultyCurve;
use arena_horde_system_spawning::{ScheduledSpawn, SpawnConfig};
use serde::Deserialize;

/// Session configuration read from a TOML file.
///
/// Every section is optional and every omitted key keeps its default.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionConfig {
    pub(crate) spawn: SpawnConfig,
    pub(crate) difficulty: DifficultyCurve,
    pub(crate) combat: CombatConfig,
    pub(crate) player: PlayerState,
    /// Replaces the reference wave table when present.
    pub(crate) waves: Option<Vec<WaveConfig>>,
    pub(crate) events: Vec<ScheduledSpawn>,
}

impl SessionConfig {
    /// Reads and parses the configuration stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(ConfigError::Read)?;
        Self::parse(&contents)
    }

    /// Parses a configuration document.
    pub(crate) fn parse(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(ConfigError::Parse)
    }

    /// Validated wave table, falling back to the reference progression.
    pub(crate) fn wave_table(&self) -> Result<WaveTable, ConfigError> {
        match &self.waves {
            Some(waves) => WaveTable::new(waves.clone()).map_err(ConfigError::Waves),
            None => Ok(WaveTable::default()),
        }
    }
}

/// Errors raised while loading a session configuration.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration")]
    Read(#[source] io::Error),
    /// The document is not valid TOML or does not match the schema.
    #[error("invalid configuration")]
    Parse(#[source] toml::de::Error),
    /// The configured waves were rejected.
    #[error("invalid wave table")]
    Waves(#[source] WaveTableError),
}
