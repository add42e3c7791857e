#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player auto-attack that fires at the nearest enemy within range.

use std::time::Duration;

use arena_horde_core::{EnemyId, PlayerState, Projectile};
use arena_horde_world::EnemyArena;
use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Damage multiplier applied to critical hits.
pub const CRIT_MULTIPLIER: f64 = 2.0;

/// Auto-attack system owning the attack cooldown and the critical-hit source.
#[derive(Debug)]
pub struct AutoAttack {
    rng: ChaCha8Rng,
    last_attack: Option<Duration>,
}

impl AutoAttack {
    /// Creates the system with a seeded source for critical-hit rolls.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            last_attack: None,
        }
    }

    /// Fires at the nearest enemy once the player's cooldown has elapsed.
    ///
    /// The new projectile is appended to `out` and the target returned. The
    /// cooldown only restarts when a projectile is actually fired.
    pub fn update(
        &mut self,
        now: Duration,
        player: &PlayerState,
        arena: &EnemyArena,
        out: &mut Vec<Projectile>,
    ) -> Option<EnemyId> {
        if let Some(last) = self.last_attack {
            if now.saturating_sub(last) < player.attack_cooldown {
                return None;
            }
        }

        let (target, position) = nearest_target(arena, player.position, player.attack_range)?;

        let critical = self.rng.gen_bool(player.crit_chance.clamp(0.0, 1.0));
        let damage = if critical {
            player.damage * CRIT_MULTIPLIER
        } else {
            player.damage
        };

        out.push(Projectile::aimed(
            player.position,
            position,
            damage,
            player.piercing,
            player.projectile,
        ));
        self.last_attack = Some(now);
        trace!(target = target.get(), damage, critical, "projectile fired");
        Some(target)
    }
}

/// Nearest live enemy within `range` of `origin`; ties go to the lowest id.
#[must_use]
pub fn nearest_target(arena: &EnemyArena, origin: DVec2, range: f64) -> Option<(EnemyId, DVec2)> {
    let mut best: Option<Candidate> = None;
    for enemy in arena.iter() {
        let distance_sq = enemy.position.distance_squared(origin);
        if distance_sq > range * range {
            continue;
        }

        let current = Candidate {
            distance_sq,
            id: enemy.id,
            position: enemy.position,
        };
        match &mut best {
            Some(existing) => {
                if current.precedes(existing) {
                    *existing = current;
                }
            }
            None => best = Some(current),
        }
    }
    best.map(|candidate| (candidate.id, candidate.position))
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    distance_sq: f64,
    id: EnemyId,
    position: DVec2,
}

impl Candidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }
        self.id < other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_horde_core::{CatalogFactory, EnemyKind, EntityFactory};

    fn spawn(arena: &mut EnemyArena, position: DVec2) -> EnemyId {
        let template = CatalogFactory
            .create(EnemyKind::Basic, position)
            .expect("catalog factory always creates");
        arena.spawn(template, position, 1.0, 1.0)
    }

    #[test]
    fn picks_nearest_within_range() {
        let mut arena = EnemyArena::new();
        let _far = spawn(&mut arena, DVec2::new(7.0, 0.0));
        let near = spawn(&mut arena, DVec2::new(0.0, -3.0));
        let _outside = spawn(&mut arena, DVec2::new(0.0, 8.5));

        let found = nearest_target(&arena, DVec2::ZERO, 8.0);
        assert_eq!(found.map(|(id, _)| id), Some(near));
    }

    #[test]
    fn ties_go_to_the_lowest_identifier() {
        let mut arena = EnemyArena::new();
        let first = spawn(&mut arena, DVec2::new(4.0, 0.0));
        let _second = spawn(&mut arena, DVec2::new(-4.0, 0.0));
        let _third = spawn(&mut arena, DVec2::new(0.0, 4.0));

        let found = nearest_target(&arena, DVec2::ZERO, 8.0);
        assert_eq!(found.map(|(id, _)| id), Some(first));
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let mut arena = EnemyArena::new();
        let edge = spawn(&mut arena, DVec2::new(8.0, 0.0));
        assert_eq!(nearest_target(&arena, DVec2::ZERO, 8.0).map(|(id, _)| id), Some(edge));
    }
}
