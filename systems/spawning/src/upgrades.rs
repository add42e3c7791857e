//! Player upgrades that reshape the spawn cadence and enemy toughness.

use std::fmt;

use arena_horde_core::ModifierKind;

/// Permanent spawn upgrades a player may pick between waves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnUpgrade {
    /// More enemies per batch.
    SwarmTraining,
    /// Shorter time between batches.
    HordeMaster,
    /// Fewer but tougher enemies.
    Culling,
    /// Enemies spawn closer.
    MonsterMagnet,
    /// Enemies spawn farther away.
    SafeDistance,
}

impl SpawnUpgrade {
    /// Every upgrade in catalog order.
    pub const ALL: [SpawnUpgrade; 5] = [
        Self::SwarmTraining,
        Self::HordeMaster,
        Self::Culling,
        Self::MonsterMagnet,
        Self::SafeDistance,
    ];

    /// Kebab-case name used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SwarmTraining => "swarm-training",
            Self::HordeMaster => "horde-master",
            Self::Culling => "culling",
            Self::MonsterMagnet => "monster-magnet",
            Self::SafeDistance => "safe-distance",
        }
    }

    /// Parses a kebab-case upgrade name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|upgrade| upgrade.name() == name)
    }

    /// Modifier factors applied permanently when the upgrade is taken.
    #[must_use]
    pub const fn effects(self) -> &'static [(ModifierKind, f64)] {
        match self {
            Self::SwarmTraining => &[(ModifierKind::SpawnCount, 1.2)],
            Self::HordeMaster => &[(ModifierKind::SpawnRate, 1.15)],
            Self::Culling => &[
                (ModifierKind::SpawnCount, 0.7),
                (ModifierKind::EnemyHealth, 1.5),
                (ModifierKind::EnemyDamage, 1.5),
            ],
            Self::MonsterMagnet => &[(ModifierKind::SpawnRadius, 0.75)],
            Self::SafeDistance => &[(ModifierKind::SpawnRadius, 1.4)],
        }
    }
}

impl fmt::Display for SpawnUpgrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
