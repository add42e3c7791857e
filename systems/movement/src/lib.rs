#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick enemy behaviour: movement, periodic ranged attacks, boss abilities
//! and player contact.
//!
//! Behaviours are plain data on each enemy's archetype and are resolved by the
//! free functions of this crate. [`Movement`] drives them over the arena in
//! identifier order so a seeded run replays identically.

use std::{f64::consts::TAU, time::Duration};

use arena_horde_core::{
    AttackPattern, Charge, DamageSource, EnemyId, EnemyKind, EntityFactory, Event,
    HostileProjectile, KillCause, LiveEnemy, MovementStyle, PlayerState,
};
use arena_horde_world::EnemyArena;
use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

/// Distance below which an enemy touches the player.
pub const PLAYER_CONTACT_RADIUS: f64 = 1.0;

/// Moves `position` one step of length `speed` straight toward `target`.
#[must_use]
pub fn move_toward_player(position: DVec2, target: DVec2, speed: f64) -> DVec2 {
    position + (target - position).normalize_or_zero() * speed
}

/// Moves toward `target` along a heading perturbed by up to `jitter / 2` per axis.
pub fn erratic_step<R>(position: DVec2, target: DVec2, speed: f64, jitter: f64, rng: &mut R) -> DVec2
where
    R: Rng + ?Sized,
{
    let noise = DVec2::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5) * jitter;
    let heading = ((target - position).normalize_or_zero() + noise).normalize_or_zero();
    position + heading * speed
}

/// Holds the band `optimal ± tolerance` around `target`.
///
/// Retreats when closer than the band, approaches when farther and otherwise
/// stays put.
#[must_use]
pub fn keep_distance(
    position: DVec2,
    target: DVec2,
    speed: f64,
    optimal: f64,
    tolerance: f64,
) -> DVec2 {
    let distance = position.distance(target);
    if distance < optimal - tolerance {
        position + (position - target).normalize_or_zero() * speed
    } else if distance > optimal + tolerance {
        move_toward_player(position, target, speed)
    } else {
        position
    }
}

/// Action an enemy takes when its attack cooldown elapses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyAction {
    /// The archetype's ranged volley.
    Volley,
    /// A short speed burst toward the player.
    Charge,
    /// Minions placed around the caster.
    Summon,
}

/// Projectile waiting for its release time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueuedShot {
    /// Enemy that fires the shot from its position at release.
    pub enemy: EnemyId,
    /// Simulation time at which the shot leaves.
    pub fire_at: Duration,
    /// Displacement per tick once released.
    pub velocity: DVec2,
    /// Damage dealt on contact with the player.
    pub damage: f64,
    /// Ticks the projectile survives once released.
    pub lifetime: u32,
}

/// Minion requested by a summoning enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SummonRequest {
    /// Kind of the minion.
    pub kind: EnemyKind,
    /// Where the minion appears.
    pub position: DVec2,
}

/// Work produced by enemy actions that outlives the tick it was decided in.
#[derive(Clone, Debug, Default)]
pub struct ActionQueue {
    /// Shots of staggered volleys, in the order they were queued.
    pub shots: Vec<QueuedShot>,
    /// Minions waiting to enter the arena.
    pub summons: Vec<SummonRequest>,
}

impl ActionQueue {
    /// Moves every shot due at `now` into `out`.
    ///
    /// Shots whose enemy left the arena before release are dropped.
    pub fn release_due(
        &mut self,
        now: Duration,
        arena: &EnemyArena,
        out: &mut Vec<HostileProjectile>,
    ) {
        self.shots.retain(|shot| {
            if shot.fire_at > now {
                return true;
            }
            if let Some(enemy) = arena.get(shot.enemy) {
                out.push(HostileProjectile {
                    position: enemy.position,
                    velocity: shot.velocity,
                    damage: shot.damage,
                    remaining_lifetime: shot.lifetime,
                });
            }
            false
        });
    }
}

/// Lets the enemy act when its attack cooldown has elapsed.
///
/// The first time health drops under the archetype's phase-shift threshold,
/// the shift is applied before the range check of the next action. Enemies
/// with boss abilities draw the action from `rng`, every other attacker
/// always fires its volley. Returns the action taken.
pub fn periodic_ranged_attack<R>(
    enemy: &mut LiveEnemy,
    target: DVec2,
    now: Duration,
    rng: &mut R,
    queue: &mut ActionQueue,
) -> Option<EnemyAction>
where
    R: Rng + ?Sized,
{
    let behavior = enemy.behavior();
    let attack = behavior.attack?;

    let mut cooldown = attack.cooldown;
    if let Some(shift) = behavior.phase_shift {
        if enemy.phase_shifted {
            cooldown = shift.cooldown;
        }
    }
    if now.saturating_sub(enemy.last_action) < cooldown {
        return None;
    }

    if let Some(shift) = behavior.phase_shift {
        if !enemy.phase_shifted && enemy.health_fraction() < shift.threshold {
            enemy.phase_shifted = true;
            enemy.speed *= shift.speed_multiplier;
            debug!(id = enemy.id.get(), kind = enemy.kind.tag(), "phase shift");
        }
    }

    if enemy.position.distance(target) > attack.range {
        return None;
    }

    let action = match behavior.abilities {
        Some(_) => match rng.gen_range(0..3) {
            0 => EnemyAction::Charge,
            1 => EnemyAction::Summon,
            _ => EnemyAction::Volley,
        },
        None => EnemyAction::Volley,
    };
    perform_action(enemy, action, target, now, queue);
    enemy.last_action = now;
    Some(action)
}

/// Carries out `action` for `enemy` without any cooldown bookkeeping.
///
/// Abilities the archetype lacks do nothing.
pub fn perform_action(
    enemy: &mut LiveEnemy,
    action: EnemyAction,
    target: DVec2,
    now: Duration,
    queue: &mut ActionQueue,
) {
    let behavior = enemy.behavior();
    match action {
        EnemyAction::Volley => {
            let Some(attack) = behavior.attack else {
                return;
            };
            let damage = enemy.damage * attack.damage_scale;
            match attack.pattern {
                AttackPattern::Aimed => queue.shots.push(QueuedShot {
                    enemy: enemy.id,
                    fire_at: now,
                    velocity: (target - enemy.position).normalize_or_zero()
                        * attack.projectile_speed,
                    damage,
                    lifetime: attack.projectile_lifetime,
                }),
                AttackPattern::Radial { count, stagger } => {
                    let mut fire_at = now;
                    for index in 0..count {
                        let angle = f64::from(index) / f64::from(count) * TAU;
                        queue.shots.push(QueuedShot {
                            enemy: enemy.id,
                            fire_at,
                            velocity: DVec2::from_angle(angle) * attack.projectile_speed,
                            damage,
                            lifetime: attack.projectile_lifetime,
                        });
                        fire_at += stagger;
                    }
                }
            }
            trace!(id = enemy.id.get(), kind = enemy.kind.tag(), "ranged volley");
        }
        EnemyAction::Charge => {
            let Some(abilities) = behavior.abilities else {
                return;
            };
            enemy.charge = Some(Charge {
                heading: (target - enemy.position).normalize_or_zero(),
                speed: abilities.charge.speed,
                until: now + abilities.charge.duration,
            });
            debug!(id = enemy.id.get(), kind = enemy.kind.tag(), "charge");
        }
        EnemyAction::Summon => {
            let Some(abilities) = behavior.abilities else {
                return;
            };
            let summon = abilities.summon;
            for index in 0..summon.count {
                let angle = f64::from(index) / f64::from(summon.count) * TAU;
                queue.summons.push(SummonRequest {
                    kind: summon.kind,
                    position: enemy.position + DVec2::from_angle(angle) * summon.distance,
                });
            }
            debug!(id = enemy.id.get(), count = summon.count, "summon");
        }
    }
}

/// Writes the identifiers of enemies touching the player into `out`.
pub fn collect_player_contacts(arena: &EnemyArena, player: DVec2, out: &mut Vec<EnemyId>) {
    out.clear();
    out.extend(
        arena
            .iter()
            .filter(|enemy| enemy.position.distance(player) < PLAYER_CONTACT_RADIUS)
            .map(|enemy| enemy.id),
    );
}

/// System advancing every live enemy by one tick.
#[derive(Debug)]
pub struct Movement {
    rng: ChaCha8Rng,
    queue: ActionQueue,
    contacts: Vec<EnemyId>,
}

impl Movement {
    /// Creates the system with a seeded random source for erratic movement and
    /// ability choice.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            queue: ActionQueue::default(),
            contacts: Vec::new(),
        }
    }

    /// Moves every enemy, lets attackers act and releases due shots into
    /// `hostile`.
    pub fn update(
        &mut self,
        now: Duration,
        player: &PlayerState,
        arena: &mut EnemyArena,
        hostile: &mut Vec<HostileProjectile>,
    ) {
        let target = player.position;
        for enemy in arena.iter_mut() {
            enemy.position = match enemy.behavior().movement {
                MovementStyle::Chase => move_toward_player(enemy.position, target, enemy.speed),
                MovementStyle::Erratic { jitter } => {
                    erratic_step(enemy.position, target, enemy.speed, jitter, &mut self.rng)
                }
                MovementStyle::KeepDistance { optimal, tolerance } => {
                    keep_distance(enemy.position, target, enemy.speed, optimal, tolerance)
                }
            };
            if let Some(charge) = enemy.charge {
                if now <= charge.until {
                    enemy.position += charge.heading * charge.speed;
                } else {
                    enemy.charge = None;
                }
            }
            let _ = periodic_ranged_attack(enemy, target, now, &mut self.rng, &mut self.queue);
        }
        self.queue.release_due(now, arena, hostile);
    }

    /// Brings every pending summon into the arena with unscaled statistics.
    pub fn spawn_summons<F>(
        &mut self,
        arena: &mut EnemyArena,
        factory: &mut F,
        events: &mut Vec<Event>,
    ) where
        F: EntityFactory + ?Sized,
    {
        for request in self.queue.summons.drain(..) {
            let Some(template) = factory.create(request.kind, request.position) else {
                debug!(kind = request.kind.tag(), "factory declined to create minion");
                continue;
            };
            let id = arena.spawn(template, request.position, 1.0, 1.0);
            events.push(Event::EnemySpawned {
                id,
                kind: request.kind,
                position: request.position,
            });
        }
    }

    /// Shots and summons still waiting.
    #[must_use]
    pub fn pending(&self) -> &ActionQueue {
        &self.queue
    }

    /// Applies contact damage from every enemy touching the player.
    ///
    /// Touching enemies deal their damage once and leave the arena. They still
    /// drop their experience, reported as a kill with [`KillCause::Contact`];
    /// contact never triggers death explosions or life steal.
    pub fn resolve_player_contacts(
        &mut self,
        arena: &mut EnemyArena,
        player: &mut PlayerState,
        events: &mut Vec<Event>,
    ) {
        collect_player_contacts(arena, player.position, &mut self.contacts);
        for &id in &self.contacts {
            let Some(enemy) = arena.remove(id) else {
                continue;
            };
            player.health -= enemy.damage;
            debug!(id = id.get(), damage = enemy.damage, "enemy reached the player");
            events.push(Event::PlayerDamaged {
                amount: enemy.damage,
                source: DamageSource::Contact(id),
            });
            events.push(Event::EnemyKilled {
                id,
                kind: enemy.kind,
                position: enemy.position,
                xp_value: enemy.xp_value,
                cause: KillCause::Contact,
            });
        }
    }
}
