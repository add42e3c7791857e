#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Arena Horde simulation.
//!
//! This crate defines the data that flows between the live-entity arena and
//! the pure systems. The spawn scheduler appends [`LiveEnemy`] values created
//! through an [`EntityFactory`], the combat resolver mutates and retires them
//! while consuming [`Projectile`] values, and every system reports what
//! happened through [`Event`] values so adapters can echo them to players.

mod catalog;
pub mod millis;
mod waves;

use std::{collections::BTreeSet, time::Duration};

use glam::DVec2;
use serde::{Deserialize, Serialize};

pub use catalog::{
    Archetype, AttackPattern, BaseStats, Behavior, BossAbilities, ChargeSpec, EnemyKind,
    EnrageStep, ExplosionSpec, MovementStyle, PhaseShift, RangedAttack, SummonSpec,
};
pub use waves::{EnemyPool, PatternKind, WaveConfig, WaveTable, WaveTableError};

/// Unique identifier assigned to a live enemy by the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u64);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Named multiplicative scalars recognised by the modifier registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModifierKind {
    /// Divides the time between spawn batches.
    SpawnRate,
    /// Scales the number of entities per batch.
    SpawnCount,
    /// Scales the health of newly spawned entities.
    EnemyHealth,
    /// Scales the damage of newly spawned entities.
    EnemyDamage,
    /// Scales the distance between the player and spawn positions.
    SpawnRadius,
    /// Scales the per-spawn boss roll on boss waves.
    BossChance,
}

impl ModifierKind {
    /// Every recognised modifier in declaration order.
    pub const ALL: [ModifierKind; 6] = [
        Self::SpawnRate,
        Self::SpawnCount,
        Self::EnemyHealth,
        Self::EnemyDamage,
        Self::SpawnRadius,
        Self::BossChance,
    ];

    /// Canonical kebab-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SpawnRate => "spawn-rate",
            Self::SpawnCount => "spawn-count",
            Self::EnemyHealth => "enemy-health",
            Self::EnemyDamage => "enemy-damage",
            Self::SpawnRadius => "spawn-radius",
            Self::BossChance => "boss-chance",
        }
    }

    const fn legacy_name(self) -> &'static str {
        match self {
            Self::SpawnRate => "spawnRateMultiplier",
            Self::SpawnCount => "spawnCountMultiplier",
            Self::EnemyHealth => "enemyHealthMultiplier",
            Self::EnemyDamage => "enemyDamageMultiplier",
            Self::SpawnRadius => "spawnRadiusMultiplier",
            Self::BossChance => "bossSpawnChanceMultiplier",
        }
    }

    /// Resolves either the kebab-case or the legacy camel-case name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name || kind.legacy_name() == name)
    }

    /// Position of the modifier within [`ModifierKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Projectile parameters used when the player attacks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileProfile {
    /// Ground distance travelled per tick.
    pub speed: f64,
    /// Lifetime measured in ticks.
    pub lifetime: u32,
    /// When present, projectiles detonate with this radius instead of piercing.
    pub explosion_radius: Option<f64>,
}

impl Default for ProjectileProfile {
    fn default() -> Self {
        Self {
            speed: 0.6,
            lifetime: 80,
            explosion_radius: None,
        }
    }
}

/// Player statistics read by the systems; only health is mutated by them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    /// Ground-plane position (x, z).
    pub position: DVec2,
    /// Current health; the session ends when it reaches zero.
    pub health: f64,
    /// Health ceiling for healing.
    pub max_health: f64,
    /// Maximum distance at which the auto-attack acquires targets.
    pub attack_range: f64,
    /// Damage carried by each projectile before critical hits.
    pub damage: f64,
    /// Probability in `[0, 1]` that a projectile deals double damage.
    pub crit_chance: f64,
    /// Number of additional entities each projectile may pass through.
    pub piercing: u32,
    /// Health restored per kill.
    pub life_steal: f64,
    /// Minimum time between two attacks.
    #[serde(rename = "attack_cooldown_ms", with = "crate::millis")]
    pub attack_cooldown: Duration,
    /// Parameters of the projectiles fired by the player.
    pub projectile: ProjectileProfile,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position: DVec2::ZERO,
            health: 100.0,
            max_health: 100.0,
            attack_range: 8.0,
            damage: 10.0,
            crit_chance: 0.0,
            piercing: 0,
            life_steal: 0.0,
            attack_cooldown: Duration::from_millis(1_000),
            projectile: ProjectileProfile::default(),
        }
    }
}

impl PlayerState {
    /// Reports whether the player has run out of health.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    /// Restores up to `amount` health without exceeding the maximum.
    ///
    /// Returns the health actually restored.
    pub fn heal(&mut self, amount: f64) -> f64 {
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health).max(before);
        self.health - before
    }
}

/// Base template produced by an [`EntityFactory`] for a new enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyTemplate {
    /// Kind requested from the factory.
    pub kind: EnemyKind,
    /// Unscaled statistics the factory assigned.
    pub stats: BaseStats,
}

/// External collaborator that creates and disposes the handles behind enemies.
pub trait EntityFactory {
    /// Produces the template of a new enemy, or `None` to skip the spawn.
    fn create(&mut self, kind: EnemyKind, position: DVec2) -> Option<EnemyTemplate>;

    /// Releases whatever the factory bound to an enemy that left the arena.
    fn destroy(&mut self, enemy: &LiveEnemy);
}

/// Factory that serves catalog statistics and owns no external resources.
#[derive(Clone, Copy, Debug, Default)]
pub struct CatalogFactory;

impl EntityFactory for CatalogFactory {
    fn create(&mut self, kind: EnemyKind, _position: DVec2) -> Option<EnemyTemplate> {
        Some(EnemyTemplate {
            kind,
            stats: kind.archetype().stats,
        })
    }

    fn destroy(&mut self, _enemy: &LiveEnemy) {}
}

/// Mutable state of a single hostile entity inside the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveEnemy {
    /// Identifier assigned by the arena.
    pub id: EnemyId,
    /// Catalog kind.
    pub kind: EnemyKind,
    /// Ground-plane position (x, z).
    pub position: DVec2,
    /// Remaining health.
    pub health: f64,
    /// Health at spawn after multipliers.
    pub max_health: f64,
    /// Contact damage after multipliers.
    pub damage: f64,
    /// Experience awarded on death.
    pub xp_value: u32,
    /// Ground distance travelled per tick.
    pub speed: f64,
    /// Time of the last ranged attack.
    pub last_action: Duration,
    /// Set once the archetype's phase shift has been applied.
    pub phase_shifted: bool,
    /// Charge burst in progress, if any.
    pub charge: Option<Charge>,
}

/// Charge burst carried by a live enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Charge {
    /// Unit heading fixed when the charge started.
    pub heading: DVec2,
    /// Extra ground distance travelled per tick.
    pub speed: f64,
    /// Last simulation time at which the burst applies.
    pub until: Duration,
}

impl LiveEnemy {
    /// Builds a live enemy from a factory template and scaled statistics.
    #[must_use]
    pub fn from_template(
        id: EnemyId,
        template: EnemyTemplate,
        position: DVec2,
        health_multiplier: f64,
        damage_multiplier: f64,
    ) -> Self {
        let health = template.stats.health * health_multiplier;
        Self {
            id,
            kind: template.kind,
            position,
            health,
            max_health: health,
            damage: (template.stats.damage * damage_multiplier).round(),
            xp_value: template.stats.xp_value,
            speed: template.stats.speed,
            last_action: Duration::ZERO,
            phase_shifted: false,
            charge: None,
        }
    }

    /// Behaviour flags of the enemy's kind.
    #[must_use]
    pub fn behavior(&self) -> Behavior {
        self.kind.archetype().behavior
    }

    /// Fraction of maximum health remaining.
    #[must_use]
    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        self.health / self.max_health
    }

    /// Subtracts `amount` health and applies on-damage behaviour.
    ///
    /// Returns `true` when health is at or below zero afterwards.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        self.health -= amount;
        if let Some(enrage) = self.behavior().enrage {
            if self.health_fraction() < enrage.threshold {
                self.speed = enrage.cap.min(self.speed + enrage.step);
            }
        }
        self.health <= 0.0
    }
}

/// Projectile fired by the player.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    /// Ground-plane position (x, z).
    pub position: DVec2,
    /// Displacement applied every tick.
    pub velocity: DVec2,
    /// Damage applied per hit.
    pub damage: f64,
    /// Ticks left before the projectile expires.
    pub remaining_lifetime: u32,
    /// Number of additional entities the projectile may pass through.
    pub piercing_budget: u32,
    /// Entities already damaged by this projectile.
    pub hit_set: BTreeSet<EnemyId>,
    /// Detonation radius of area projectiles.
    pub explosion_radius: Option<f64>,
}

impl Projectile {
    /// Creates a projectile travelling from `from` toward `to`.
    #[must_use]
    pub fn aimed(
        from: DVec2,
        to: DVec2,
        damage: f64,
        piercing_budget: u32,
        profile: ProjectileProfile,
    ) -> Self {
        Self {
            position: from,
            velocity: (to - from).normalize_or_zero() * profile.speed,
            damage,
            remaining_lifetime: profile.lifetime,
            piercing_budget,
            hit_set: BTreeSet::new(),
            explosion_radius: profile.explosion_radius,
        }
    }

    /// Reports whether the projectile detonates instead of piercing.
    #[must_use]
    pub fn is_area(&self) -> bool {
        self.explosion_radius.is_some()
    }

    /// Moves one tick forward and consumes one tick of lifetime.
    pub fn advance(&mut self) {
        self.position += self.velocity;
        self.remaining_lifetime = self.remaining_lifetime.saturating_sub(1);
    }
}

/// Projectile fired by an enemy at the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostileProjectile {
    /// Ground-plane position (x, z).
    pub position: DVec2,
    /// Displacement applied every tick.
    pub velocity: DVec2,
    /// Damage applied to the player on contact.
    pub damage: f64,
    /// Ticks left before the projectile expires.
    pub remaining_lifetime: u32,
}

impl HostileProjectile {
    /// Moves one tick forward and consumes one tick of lifetime.
    pub fn advance(&mut self) {
        self.position += self.velocity;
        self.remaining_lifetime = self.remaining_lifetime.saturating_sub(1);
    }
}

/// Origin of an explosion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExplosionSource {
    /// An explosive enemy died.
    EnemyDeath(EnemyId),
    /// A player area projectile detonated.
    AreaProjectile,
}

/// Ephemeral area-damage event, resolved as soon as it is produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Explosion {
    /// Centre of the blast.
    pub position: DVec2,
    /// Radius of the blast.
    pub radius: f64,
    /// Flat damage applied to everything within the radius.
    pub damage: f64,
    /// What produced the blast.
    pub source: ExplosionSource,
}

impl Explosion {
    /// Reports whether the blast damages the player.
    ///
    /// Blasts from the player's own area projectiles never do.
    #[must_use]
    pub const fn harms_player(&self) -> bool {
        matches!(self.source, ExplosionSource::EnemyDeath(_))
    }

    /// Reports whether `point` lies within the blast radius.
    #[must_use]
    pub fn reaches(&self, point: DVec2) -> bool {
        self.position.distance(point) <= self.radius
    }
}

/// Reason an enemy died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KillCause {
    /// A player projectile dealt the final hit.
    Projectile,
    /// An explosion dealt the final hit.
    Explosion,
    /// The enemy reached the player and was spent on contact.
    Contact,
}

/// Reason the player lost health.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DamageSource {
    /// A hostile projectile hit the player.
    Projectile,
    /// An explosion caught the player.
    Explosion,
    /// An enemy reached the player.
    Contact(EnemyId),
}

/// Events reported by the systems while resolving a tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A new wave began.
    WaveAdvanced {
        /// One-based index of the wave that began.
        wave: u32,
        /// Announcement configured for the wave.
        message: String,
    },
    /// An enemy joined the arena.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        id: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Spawn position.
        position: DVec2,
    },
    /// An enemy died and was retired from the arena.
    EnemyKilled {
        /// Identifier of the enemy.
        id: EnemyId,
        /// Kind of the enemy.
        kind: EnemyKind,
        /// Position at the time of death, used for loot drops.
        position: DVec2,
        /// Experience awarded.
        xp_value: u32,
        /// What dealt the final hit.
        cause: KillCause,
    },
    /// Life steal restored player health.
    LifeStolen {
        /// Health restored.
        amount: f64,
    },
    /// The player took damage.
    PlayerDamaged {
        /// Damage taken.
        amount: f64,
        /// What dealt the damage.
        source: DamageSource,
    },
    /// An explosion was resolved.
    ExplosionResolved {
        /// The resolved blast.
        explosion: Explosion,
    },
}
