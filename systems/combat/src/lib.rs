#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat resolver advancing projectiles and applying their effects.
//!
//! Every tick runs two independent passes. Player projectiles are tested
//! against live enemies in identifier order, honouring each projectile's
//! hit-set and piercing budget. Hostile projectiles are tested against the
//! player and vanish on first contact. Kills go through a single path that
//! retires the enemy from the arena exactly once, so an enemy reached by
//! several projectiles or blasts in the same tick only dies once.

mod hooks;

use std::mem;

use arena_horde_core::{
    DamageSource, EnemyId, Explosion, ExplosionSource, HostileProjectile, KillCause, PlayerState,
    Projectile,
};
use arena_horde_world::EnemyArena;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub use hooks::CombatHooks;

/// Whether enemies killed by a blast release blasts of their own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum ExplosionChaining {
    /// Blast kills never detonate further blasts.
    #[default]
    Suppressed,
    /// Blast kills detonate further blasts up to `max_depth` links deep.
    Recursive {
        /// Maximum number of chained blasts after the first one.
        max_depth: u32,
    },
}

impl ExplosionChaining {
    fn allows(self, depth: u32) -> bool {
        match self {
            Self::Suppressed => false,
            Self::Recursive { max_depth } => depth <= max_depth,
        }
    }
}

/// Tuning of the combat resolver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Distance below which a projectile touches its target.
    pub contact_radius: f64,
    /// Chain policy for blasts released by blast kills.
    pub chaining: ExplosionChaining,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            contact_radius: 0.8,
            chaining: ExplosionChaining::Suppressed,
        }
    }
}

/// Owns every in-flight projectile and resolves their effects.
#[derive(Debug, Default)]
pub struct CombatResolver {
    config: CombatConfig,
    projectiles: Vec<Projectile>,
    hostile: Vec<HostileProjectile>,
    candidates: Vec<EnemyId>,
}

impl CombatResolver {
    /// Creates a resolver with no projectiles in flight.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Player projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Hostile projectiles in flight.
    #[must_use]
    pub fn hostile_projectiles(&self) -> &[HostileProjectile] {
        &self.hostile
    }

    /// Buffer into which player projectiles are fired.
    pub fn projectile_buffer(&mut self) -> &mut Vec<Projectile> {
        &mut self.projectiles
    }

    /// Buffer into which enemies fire hostile projectiles.
    pub fn hostile_buffer(&mut self) -> &mut Vec<HostileProjectile> {
        &mut self.hostile
    }

    /// Adds a player projectile.
    pub fn fire(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }

    /// Adds a hostile projectile.
    pub fn fire_hostile(&mut self, projectile: HostileProjectile) {
        self.hostile.push(projectile);
    }

    /// Runs both projectile passes for one tick.
    pub fn update<H>(&mut self, player: &mut PlayerState, arena: &mut EnemyArena, hooks: &mut H)
    where
        H: CombatHooks + ?Sized,
    {
        self.resolve_player_projectiles(player, arena, hooks);
        self.resolve_hostile_projectiles(player, hooks);
    }

    /// Applies flat damage to the player and every enemy within the blast.
    ///
    /// Blasts released by enemies killed here follow the configured
    /// [`ExplosionChaining`] policy.
    pub fn resolve_explosion<H>(
        &mut self,
        explosion: Explosion,
        player: &mut PlayerState,
        arena: &mut EnemyArena,
        hooks: &mut H,
    ) where
        H: CombatHooks + ?Sized,
    {
        self.resolve_explosion_at(explosion, 0, player, arena, hooks);
    }

    fn resolve_player_projectiles<H>(
        &mut self,
        player: &mut PlayerState,
        arena: &mut EnemyArena,
        hooks: &mut H,
    ) where
        H: CombatHooks + ?Sized,
    {
        let mut projectiles = mem::take(&mut self.projectiles);
        let mut candidates = mem::take(&mut self.candidates);

        projectiles.retain_mut(|projectile| {
            projectile.advance();
            arena.collect_ids(&mut candidates);

            let mut spent = false;
            let mut detonate = false;
            for &id in &candidates {
                if projectile.hit_set.contains(&id) {
                    continue;
                }
                let Some(enemy) = arena.get_mut(id) else {
                    continue;
                };
                if enemy.position.distance(projectile.position) >= self.config.contact_radius {
                    continue;
                }

                if projectile.is_area() {
                    detonate = true;
                    break;
                }

                let killed = enemy.take_damage(projectile.damage);
                let _ = projectile.hit_set.insert(id);
                trace!(enemy = id.get(), damage = projectile.damage, killed, "projectile hit");
                if killed {
                    if let Some(blast) = kill(id, KillCause::Projectile, player, arena, hooks) {
                        self.resolve_explosion_at(blast, 0, player, arena, hooks);
                    }
                }

                if projectile.hit_set.len() > projectile.piercing_budget as usize {
                    spent = true;
                    break;
                }
            }

            if !spent && projectile.remaining_lifetime == 0 {
                spent = true;
                detonate = projectile.is_area();
            }

            if detonate {
                let blast = Explosion {
                    position: projectile.position,
                    radius: projectile.explosion_radius.unwrap_or_default(),
                    damage: projectile.damage,
                    source: ExplosionSource::AreaProjectile,
                };
                self.resolve_explosion_at(blast, 0, player, arena, hooks);
                spent = true;
            }
            !spent
        });

        // Projectiles fired from hooks during resolution land after the survivors.
        projectiles.append(&mut self.projectiles);
        self.projectiles = projectiles;
        self.candidates = candidates;
    }

    fn resolve_hostile_projectiles<H>(&mut self, player: &mut PlayerState, hooks: &mut H)
    where
        H: CombatHooks + ?Sized,
    {
        let radius = self.config.contact_radius;
        self.hostile.retain_mut(|projectile| {
            projectile.advance();
            if projectile.position.distance(player.position) < radius {
                player.health -= projectile.damage;
                hooks.on_player_hit(projectile.damage, DamageSource::Projectile);
                return false;
            }
            projectile.remaining_lifetime > 0
        });
    }

    fn resolve_explosion_at<H>(
        &mut self,
        explosion: Explosion,
        depth: u32,
        player: &mut PlayerState,
        arena: &mut EnemyArena,
        hooks: &mut H,
    ) where
        H: CombatHooks + ?Sized,
    {
        debug!(
            x = explosion.position.x,
            z = explosion.position.y,
            radius = explosion.radius,
            damage = explosion.damage,
            depth,
            "explosion"
        );
        hooks.on_explosion(&explosion);

        if explosion.harms_player() && explosion.reaches(player.position) {
            player.health -= explosion.damage;
            hooks.on_player_hit(explosion.damage, DamageSource::Explosion);
        }

        let mut caught = Vec::new();
        arena.collect_ids(&mut caught);
        for id in caught {
            let Some(enemy) = arena.get_mut(id) else {
                continue;
            };
            if !explosion.reaches(enemy.position) || !enemy.take_damage(explosion.damage) {
                continue;
            }

            let Some(chained) = kill(id, KillCause::Explosion, player, arena, hooks) else {
                continue;
            };
            if self.config.chaining.allows(depth + 1) {
                self.resolve_explosion_at(chained, depth + 1, player, arena, hooks);
            } else {
                debug!(enemy = id.get(), "chained explosion suppressed");
            }
        }
    }
}

/// Retires a dead enemy exactly once and runs the kill side effects.
///
/// Returns the blast the enemy releases, if any.
fn kill<H>(
    id: EnemyId,
    cause: KillCause,
    player: &mut PlayerState,
    arena: &mut EnemyArena,
    hooks: &mut H,
) -> Option<Explosion>
where
    H: CombatHooks + ?Sized,
{
    let enemy = arena.remove(id)?;
    debug!(enemy = id.get(), kind = enemy.kind.tag(), ?cause, "enemy killed");

    if player.life_steal > 0.0 {
        let healed = player.heal(player.life_steal);
        hooks.on_life_steal(healed);
    }
    hooks.on_kill(&enemy, cause);

    enemy.behavior().explosion.map(|spec| Explosion {
        position: enemy.position,
        radius: spec.radius,
        damage: spec.damage,
        source: ExplosionSource::EnemyDeath(id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_horde_core::{
        CatalogFactory, EntityFactory, EnemyKind, Event, ProjectileProfile,
    };
    use glam::DVec2;

    fn spawn(arena: &mut EnemyArena, kind: EnemyKind, position: DVec2) -> EnemyId {
        let template = CatalogFactory
            .create(kind, position)
            .expect("catalog factory always creates");
        arena.spawn(template, position, 1.0, 1.0)
    }

    #[test]
    fn chaining_policy_bounds_depth() {
        assert!(!ExplosionChaining::Suppressed.allows(1));
        assert!(ExplosionChaining::Recursive { max_depth: 2 }.allows(2));
        assert!(!ExplosionChaining::Recursive { max_depth: 2 }.allows(3));
    }

    #[test]
    fn config_reads_chaining_policy_from_toml() {
        let config: CombatConfig =
            toml::from_str("chaining = { policy = \"recursive\", max_depth = 3 }")
                .expect("config parses");
        assert_eq!(config.chaining, ExplosionChaining::Recursive { max_depth: 3 });
        assert!((config.contact_radius - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn hostile_projectiles_hit_once_or_expire() {
        let mut resolver = CombatResolver::new(CombatConfig::default());
        let mut player = PlayerState::default();
        let mut arena = EnemyArena::new();
        let mut events: Vec<Event> = Vec::new();

        resolver.fire_hostile(HostileProjectile {
            position: DVec2::new(1.0, 0.0),
            velocity: DVec2::new(-0.5, 0.0),
            damage: 4.0,
            remaining_lifetime: 10,
        });
        resolver.fire_hostile(HostileProjectile {
            position: DVec2::new(0.0, 5.0),
            velocity: DVec2::new(0.0, 1.0),
            damage: 4.0,
            remaining_lifetime: 2,
        });

        resolver.update(&mut player, &mut arena, &mut events);
        assert!((player.health - 96.0).abs() < 1e-9);
        assert_eq!(resolver.hostile_projectiles().len(), 1);

        resolver.update(&mut player, &mut arena, &mut events);
        assert!(resolver.hostile_projectiles().is_empty());
        assert!((player.health - 96.0).abs() < 1e-9);
    }

    #[test]
    fn player_projectile_expires_after_its_lifetime() {
        let mut resolver = CombatResolver::new(CombatConfig::default());
        let mut player = PlayerState::default();
        let mut arena = EnemyArena::new();
        let mut events: Vec<Event> = Vec::new();

        resolver.fire(Projectile::aimed(
            DVec2::ZERO,
            DVec2::new(1.0, 0.0),
            10.0,
            0,
            ProjectileProfile {
                lifetime: 3,
                ..ProjectileProfile::default()
            },
        ));
        for _ in 0..2 {
            resolver.update(&mut player, &mut arena, &mut events);
        }
        assert_eq!(resolver.projectiles().len(), 1);
        resolver.update(&mut player, &mut arena, &mut events);
        assert!(resolver.projectiles().is_empty());
    }

    #[test]
    fn area_projectile_detonates_on_contact_without_hurting_the_player() {
        let mut resolver = CombatResolver::new(CombatConfig::default());
        let mut player = PlayerState::default();
        let mut arena = EnemyArena::new();
        let near = spawn(&mut arena, EnemyKind::Basic, DVec2::new(1.0, 0.0));
        let beside = spawn(&mut arena, EnemyKind::Basic, DVec2::new(2.0, 0.5));
        let far = spawn(&mut arena, EnemyKind::Basic, DVec2::new(9.0, 0.0));
        let mut events: Vec<Event> = Vec::new();

        resolver.fire(Projectile::aimed(
            DVec2::ZERO,
            DVec2::new(1.0, 0.0),
            12.0,
            0,
            ProjectileProfile {
                speed: 0.6,
                lifetime: 80,
                explosion_radius: Some(2.0),
            },
        ));
        resolver.update(&mut player, &mut arena, &mut events);

        assert!(resolver.projectiles().is_empty());
        assert!((player.health - 100.0).abs() < 1e-9);
        let health = |id| arena.get(id).map(|enemy| enemy.health);
        assert_eq!(health(near), Some(18.0));
        assert_eq!(health(beside), Some(18.0));
        assert_eq!(health(far), Some(30.0));
    }
}
