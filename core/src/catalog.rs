//! Enemy catalog describing every hostile archetype as plain data.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// Wave index after which each kind joins the roster used by the `"all"` pool.
///
/// A kind is unlocked once the current wave is strictly greater than its
/// threshold. The order defines the roster order used for uniform draws.
const UNLOCK_THRESHOLDS: [(EnemyKind, u32); 6] = [
    (EnemyKind::Basic, 0),
    (EnemyKind::Fast, 0),
    (EnemyKind::Swarm, 3),
    (EnemyKind::Tank, 5),
    (EnemyKind::Explosive, 10),
    (EnemyKind::Ranged, 15),
];

/// Boss waves recur every this many waves.
const BOSS_WAVE_PERIOD: u32 = 20;

/// Types of hostile entities that can appear in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline melee chaser.
    Basic,
    /// Fragile chaser with jittery movement.
    Fast,
    /// Slow, durable chaser that speeds up when badly hurt.
    Tank,
    /// Weak chaser that appears in numbers.
    Swarm,
    /// Chaser that detonates when it dies.
    Explosive,
    /// Keeps its distance and fires aimed projectiles.
    Ranged,
    /// Large entity firing radial barrages, appears on boss waves.
    Boss,
}

impl EnemyKind {
    /// Every enemy kind in catalog order.
    pub const ALL: [EnemyKind; 7] = [
        Self::Basic,
        Self::Fast,
        Self::Tank,
        Self::Swarm,
        Self::Explosive,
        Self::Ranged,
        Self::Boss,
    ];

    /// Lowercase tag used by wave tables and logs.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Fast => "fast",
            Self::Tank => "tank",
            Self::Swarm => "swarm",
            Self::Explosive => "explosive",
            Self::Ranged => "ranged",
            Self::Boss => "boss",
        }
    }

    /// Parses a lowercase tag, returning `None` for unknown tags.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Catalog entry describing base statistics and behaviour.
    #[must_use]
    pub const fn archetype(self) -> Archetype {
        match self {
            Self::Basic => Archetype {
                stats: BaseStats::new(30.0, 0.03, 5.0, 0.8, 1),
                behavior: Behavior::CHASER,
            },
            Self::Fast => Archetype {
                stats: BaseStats::new(15.0, 0.06, 3.0, 0.6, 2),
                behavior: Behavior {
                    movement: MovementStyle::Erratic { jitter: 0.1 },
                    ..Behavior::CHASER
                },
            },
            Self::Tank => Archetype {
                stats: BaseStats::new(80.0, 0.015, 12.0, 1.2, 5),
                behavior: Behavior {
                    enrage: Some(EnrageStep {
                        threshold: 0.5,
                        step: 0.001,
                        cap: 0.025,
                    }),
                    ..Behavior::CHASER
                },
            },
            Self::Swarm => Archetype {
                stats: BaseStats::new(10.0, 0.06, 2.0, 0.4, 1),
                behavior: Behavior::CHASER,
            },
            Self::Explosive => Archetype {
                stats: BaseStats::new(20.0, 0.04, 8.0, 0.7, 3),
                behavior: Behavior {
                    explosion: Some(ExplosionSpec {
                        radius: 3.0,
                        damage: 15.0,
                    }),
                    ..Behavior::CHASER
                },
            },
            Self::Ranged => Archetype {
                stats: BaseStats::new(25.0, 0.02, 4.0, 0.9, 4),
                behavior: Behavior {
                    movement: MovementStyle::KeepDistance {
                        optimal: 6.0,
                        tolerance: 1.0,
                    },
                    attack: Some(RangedAttack {
                        range: 8.0,
                        cooldown: Duration::from_millis(2_000),
                        projectile_speed: 0.3,
                        projectile_lifetime: 120,
                        damage_scale: 1.0,
                        pattern: AttackPattern::Aimed,
                    }),
                    ..Behavior::CHASER
                },
            },
            Self::Boss => Archetype {
                stats: BaseStats::new(200.0, 0.01, 20.0, 2.0, 25),
                behavior: Behavior {
                    attack: Some(RangedAttack {
                        range: f64::INFINITY,
                        cooldown: Duration::from_millis(3_000),
                        projectile_speed: 0.2,
                        projectile_lifetime: 150,
                        damage_scale: 0.5,
                        pattern: AttackPattern::Radial {
                            count: 8,
                            stagger: Duration::from_millis(100),
                        },
                    }),
                    abilities: Some(BossAbilities {
                        charge: ChargeSpec {
                            speed: 0.1,
                            duration: Duration::from_millis(1_000),
                        },
                        summon: SummonSpec {
                            kind: EnemyKind::Basic,
                            count: 3,
                            distance: 3.0,
                        },
                    }),
                    phase_shift: Some(PhaseShift {
                        threshold: 0.5,
                        cooldown: Duration::from_millis(2_000),
                        speed_multiplier: 1.5,
                    }),
                    ..Behavior::CHASER
                },
            },
        }
    }

    /// Writes the kinds unlocked at `wave` into `out`, replacing its contents.
    pub fn unlocked_roster(wave: u32, out: &mut Vec<EnemyKind>) {
        out.clear();
        out.extend(
            UNLOCK_THRESHOLDS
                .iter()
                .filter(|(_, threshold)| wave > *threshold)
                .map(|(kind, _)| *kind),
        );
    }

    /// Reports whether bosses may be rolled on the provided wave.
    #[must_use]
    pub const fn is_boss_wave(wave: u32) -> bool {
        wave > 0 && wave % BOSS_WAVE_PERIOD == 0
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Base statistics and behaviour flags of an enemy kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Archetype {
    /// Unscaled statistics.
    pub stats: BaseStats,
    /// Behaviour flags consumed by the movement and combat systems.
    pub behavior: Behavior,
}

/// Unscaled numeric statistics of an enemy kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseStats {
    /// Starting and maximum health.
    pub health: f64,
    /// Ground distance travelled per tick.
    pub speed: f64,
    /// Damage dealt on player contact.
    pub damage: f64,
    /// Visual diameter.
    pub size: f64,
    /// Experience awarded on death.
    pub xp_value: u32,
}

impl BaseStats {
    /// Creates a new statistics block.
    #[must_use]
    pub const fn new(health: f64, speed: f64, damage: f64, size: f64, xp_value: u32) -> Self {
        Self {
            health,
            speed,
            damage,
            size,
            xp_value,
        }
    }
}

/// Behaviour flags describing how an enemy moves, attacks and dies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Behavior {
    /// Movement rule applied every tick.
    pub movement: MovementStyle,
    /// Optional periodic ranged attack.
    pub attack: Option<RangedAttack>,
    /// Optional explosion released on death.
    pub explosion: Option<ExplosionSpec>,
    /// Optional speed gain while badly hurt.
    pub enrage: Option<EnrageStep>,
    /// Optional one-off phase transition while badly hurt.
    pub phase_shift: Option<PhaseShift>,
    /// Optional charge and summon actions competing with the ranged attack.
    pub abilities: Option<BossAbilities>,
}

impl Behavior {
    /// Plain chaser with no special abilities.
    pub const CHASER: Behavior = Behavior {
        movement: MovementStyle::Chase,
        attack: None,
        explosion: None,
        enrage: None,
        phase_shift: None,
        abilities: None,
    };
}

/// Movement rules available to enemies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MovementStyle {
    /// Moves straight toward the player.
    Chase,
    /// Moves toward the player with random jitter added to the heading.
    Erratic {
        /// Width of the uniform jitter applied to each heading component.
        jitter: f64,
    },
    /// Holds a preferred distance band around the player.
    KeepDistance {
        /// Preferred distance to the player.
        optimal: f64,
        /// Half-width of the band in which the enemy holds position.
        tolerance: f64,
    },
}

/// Periodic projectile attack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangedAttack {
    /// Maximum distance to the player at which the attack fires.
    pub range: f64,
    /// Minimum time between two attacks.
    pub cooldown: Duration,
    /// Ground distance travelled per tick by each projectile.
    pub projectile_speed: f64,
    /// Lifetime of each projectile measured in ticks.
    pub projectile_lifetime: u32,
    /// Fraction of the enemy's damage carried by each projectile.
    pub damage_scale: f64,
    /// Geometry of the volley.
    pub pattern: AttackPattern,
}

/// Geometry of a ranged volley.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttackPattern {
    /// One projectile aimed at the player.
    Aimed,
    /// Projectiles evenly spread over a full circle.
    Radial {
        /// Number of projectiles in the volley.
        count: u32,
        /// Delay between two consecutive projectiles of the volley.
        stagger: Duration,
    },
}

/// Explosion released when an enemy dies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplosionSpec {
    /// Radius of the area damage.
    pub radius: f64,
    /// Flat damage applied to everything within the radius.
    pub damage: f64,
}

/// Speed gain applied on every hit taken while health is below a threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnrageStep {
    /// Health fraction below which the step applies.
    pub threshold: f64,
    /// Speed added per hit.
    pub step: f64,
    /// Speed ceiling.
    pub cap: f64,
}

/// Actions a boss draws from, together with its ranged attack, whenever the
/// attack cooldown has elapsed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossAbilities {
    /// Straight-line speed burst toward the player.
    pub charge: ChargeSpec,
    /// Minions summoned around the boss.
    pub summon: SummonSpec,
}

/// Speed burst along a heading fixed when the charge starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeSpec {
    /// Extra ground distance travelled per tick while charging.
    pub speed: f64,
    /// Length of the burst.
    pub duration: Duration,
}

/// Minions placed evenly on a circle around the summoner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SummonSpec {
    /// Kind of every minion.
    pub kind: EnemyKind,
    /// Number of minions per summon.
    pub count: u32,
    /// Distance from the summoner.
    pub distance: f64,
}

/// One-off transition applied the first time health drops below a threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseShift {
    /// Health fraction below which the shift happens.
    pub threshold: f64,
    /// Attack cooldown used after the shift.
    pub cooldown: Duration,
    /// Multiplier applied to speed when the shift happens.
    pub speed_multiplier: f64,
}
