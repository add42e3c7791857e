//! Wave configuration table and spawn pattern tags.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::EnemyKind;

/// Pool tag that expands to the full unlocked roster.
const ALL_SENTINEL: &str = "all";

/// Geometry used to place the entities of a spawn batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatternKind {
    /// Random angle and distance around the player.
    #[default]
    Circle,
    /// Square grid offset from the player.
    Grid,
    /// Arc facing a cardinal direction that rotates every wave.
    Directional,
    /// Line perpendicular to a heading that rotates every wave.
    Line,
    /// Round-robin over caller-supplied fixed points.
    Fixed,
}

impl PatternKind {
    /// Lowercase name used in configuration files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Grid => "grid",
            Self::Directional => "directional",
            Self::Line => "line",
            Self::Fixed => "fixed",
        }
    }

    /// Parses a pattern name, returning `None` for unknown names.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            Self::Circle,
            Self::Grid,
            Self::Directional,
            Self::Line,
            Self::Fixed,
        ]
        .into_iter()
        .find(|pattern| pattern.name() == name)
    }
}

impl From<String> for PatternKind {
    /// Unknown names fall back to [`PatternKind::Circle`].
    fn from(name: String) -> Self {
        Self::from_name(&name).unwrap_or_default()
    }
}

impl From<PatternKind> for String {
    fn from(pattern: PatternKind) -> Self {
        pattern.name().to_owned()
    }
}

/// Enemy kinds eligible to spawn during a wave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub enum EnemyPool {
    /// Every kind unlocked at the current wave.
    All,
    /// Uniform draw from the listed kinds; repeats weight the draw.
    Kinds(Vec<EnemyKind>),
}

impl TryFrom<Vec<String>> for EnemyPool {
    type Error = WaveTableError;

    fn try_from(tags: Vec<String>) -> Result<Self, Self::Error> {
        match tags.first() {
            None => Ok(Self::All),
            Some(first) if first == ALL_SENTINEL => Ok(Self::All),
            Some(_) => tags
                .iter()
                .map(|tag| {
                    EnemyKind::from_tag(tag).ok_or_else(|| WaveTableError::UnknownEnemy(tag.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Kinds),
        }
    }
}

impl From<EnemyPool> for Vec<String> {
    fn from(pool: EnemyPool) -> Self {
        match pool {
            EnemyPool::All => vec![ALL_SENTINEL.to_owned()],
            EnemyPool::Kinds(kinds) => kinds.iter().map(|kind| kind.tag().to_owned()).collect(),
        }
    }
}

/// Configuration of a single wave epoch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Time the wave lasts before the next one begins.
    #[serde(rename = "duration_ms", with = "crate::millis")]
    pub duration: Duration,
    /// Kinds eligible to spawn.
    #[serde(rename = "enemies")]
    pub enemy_pool: EnemyPool,
    /// Base time between spawn batches.
    #[serde(rename = "spawn_interval_ms", with = "crate::millis")]
    pub spawn_interval: Duration,
    /// Base number of entities per batch.
    pub spawn_count: u32,
    /// Placement geometry; `None` defers to the scheduler's default pattern.
    #[serde(default)]
    pub pattern: Option<PatternKind>,
    /// Announcement echoed when the wave begins.
    #[serde(default)]
    pub message: String,
}

impl WaveConfig {
    fn reference(
        duration_ms: u64,
        pool: &[EnemyKind],
        spawn_interval_ms: u64,
        spawn_count: u32,
        pattern: PatternKind,
        message: &str,
    ) -> Self {
        let enemy_pool = if pool.is_empty() {
            EnemyPool::All
        } else {
            EnemyPool::Kinds(pool.to_vec())
        };
        Self {
            duration: Duration::from_millis(duration_ms),
            enemy_pool,
            spawn_interval: Duration::from_millis(spawn_interval_ms),
            spawn_count,
            pattern: Some(pattern),
            message: message.to_owned(),
        }
    }
}

/// Reasons a wave table may be rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WaveTableError {
    /// No waves were provided.
    #[error("wave table must define at least one wave")]
    Empty,
    /// A wave would end immediately and advance on every tick.
    #[error("wave {wave} has a zero duration")]
    ZeroDuration {
        /// One-based index of the offending wave.
        wave: u32,
    },
    /// A pool referenced a tag missing from the enemy catalog.
    #[error("unknown enemy type '{0}' in wave pool")]
    UnknownEnemy(String),
}

/// Ordered wave configurations keyed by one-based wave index.
///
/// Indices past the end reuse the last entry, so progression never ends.
#[derive(Clone, Debug, PartialEq)]
pub struct WaveTable {
    waves: Vec<WaveConfig>,
}

impl WaveTable {
    /// Validates and wraps the provided waves; `waves[0]` is wave 1.
    pub fn new(waves: Vec<WaveConfig>) -> Result<Self, WaveTableError> {
        if waves.is_empty() {
            return Err(WaveTableError::Empty);
        }

        for (index, wave) in waves.iter().enumerate() {
            if wave.duration.is_zero() {
                return Err(WaveTableError::ZeroDuration {
                    wave: u32::try_from(index + 1).unwrap_or(u32::MAX),
                });
            }
        }

        Ok(Self { waves })
    }

    /// Configuration governing the provided one-based wave index.
    #[must_use]
    pub fn get(&self, wave: u32) -> &WaveConfig {
        let index = usize::try_from(wave.saturating_sub(1)).unwrap_or(usize::MAX);
        self.waves
            .get(index)
            .unwrap_or_else(|| &self.waves[self.waves.len() - 1])
    }

    /// Number of explicitly configured waves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Always `false`; construction rejects empty tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Iterator over the configured waves in order.
    pub fn iter(&self) -> impl Iterator<Item = &WaveConfig> {
        self.waves.iter()
    }
}

impl Default for WaveTable {
    /// Reference eight-wave progression.
    fn default() -> Self {
        use EnemyKind::{Basic, Fast, Swarm, Tank};
        use PatternKind::{Circle, Directional, Grid, Line};

        Self {
            waves: vec![
                WaveConfig::reference(30_000, &[Basic], 2_000, 1, Circle, "The horde approaches!"),
                WaveConfig::reference(
                    40_000,
                    &[Basic, Basic, Fast],
                    1_800,
                    1,
                    Circle,
                    "Speed demons join the fight!",
                ),
                WaveConfig::reference(
                    45_000,
                    &[Basic, Fast, Fast],
                    1_600,
                    1,
                    Directional,
                    "They're getting faster!",
                ),
                WaveConfig::reference(
                    50_000,
                    &[Basic, Fast, Tank],
                    1_500,
                    1,
                    Circle,
                    "Heavy units incoming!",
                ),
                WaveConfig::reference(
                    60_000,
                    &[Basic, Fast, Tank, Swarm, Swarm],
                    1_400,
                    2,
                    Circle,
                    "The swarm arrives!",
                ),
                WaveConfig::reference(
                    60_000,
                    &[Fast, Tank, Swarm, Swarm],
                    1_200,
                    2,
                    Line,
                    "Chaos unleashed!",
                ),
                WaveConfig::reference(
                    70_000,
                    &[Tank, Tank, Fast, Swarm],
                    1_000,
                    2,
                    Grid,
                    "Elite forces deployed!",
                ),
                WaveConfig::reference(80_000, &[], 800, 3, Circle, "MAXIMUM THREAT!"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Document {
        waves: Vec<WaveConfig>,
    }

    #[test]
    fn waves_past_the_table_reuse_the_last_entry() {
        let table = WaveTable::default();
        assert_eq!(table.len(), 8);
        assert_eq!(table.get(8), table.get(9));
        assert_eq!(table.get(8), table.get(500));
        assert_eq!(table.get(8).enemy_pool, EnemyPool::All);
        assert_eq!(table.get(1).spawn_interval, Duration::from_millis(2_000));
    }

    #[test]
    fn rejects_empty_and_zero_duration_tables() {
        assert_eq!(WaveTable::new(Vec::new()), Err(WaveTableError::Empty));

        let mut wave = WaveTable::default().get(1).clone();
        wave.duration = Duration::ZERO;
        let first = WaveTable::default().get(1).clone();
        assert_eq!(
            WaveTable::new(vec![first, wave]),
            Err(WaveTableError::ZeroDuration { wave: 2 })
        );
    }

    #[test]
    fn parses_waves_from_toml() {
        let document: Document = toml::from_str(
            r#"
            [[waves]]
            duration_ms = 30000
            enemies = ["basic", "fast"]
            spawn_interval_ms = 2000
            spawn_count = 1
            pattern = "line"
            message = "hello"

            [[waves]]
            duration_ms = 10000
            enemies = ["all", "basic"]
            spawn_interval_ms = 500
            spawn_count = 4
            pattern = "spiral"
            "#,
        )
        .expect("valid wave document");

        let table = WaveTable::new(document.waves).expect("valid table");
        let first = table.get(1);
        assert_eq!(
            first.enemy_pool,
            EnemyPool::Kinds(vec![EnemyKind::Basic, EnemyKind::Fast])
        );
        assert_eq!(first.pattern, Some(PatternKind::Line));
        assert_eq!(first.message, "hello");

        let second = table.get(2);
        assert_eq!(second.enemy_pool, EnemyPool::All);
        assert_eq!(second.pattern, Some(PatternKind::Circle));
        assert!(second.message.is_empty());
    }

    #[test]
    fn unknown_enemy_tags_fail_to_parse() {
        let result: Result<Document, _> = toml::from_str(
            r#"
            [[waves]]
            duration_ms = 1000
            enemies = ["basic", "dragon"]
            spawn_interval_ms = 100
            spawn_count = 1
            "#,
        );
        let error = result.expect_err("dragon is not a catalog entry");
        assert!(error.to_string().contains("dragon"), "{error}");
    }
}
