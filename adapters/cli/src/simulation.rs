use std::time::Duration;

use arena_horde_core::{CatalogFactory, EntityFactory, Event, KillCause, LiveEnemy, PlayerState};
use arena_horde_system_combat::CombatResolver;
use arena_horde_system_movement::Movement;
use arena_horde_system_spawning::{SpawnDiagnostics, SpawnScheduler, SpawnUpgrade};
use arena_horde_system_targeting::AutoAttack;
use arena_horde_world::EnemyArena;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, SessionConfig};

/// Headless session wiring every system into a fixed-step frame loop.
#[derive(Debug)]
pub(crate) struct Simulation {
    scheduler: SpawnScheduler,
    movement: Movement,
    attack: AutoAttack,
    combat: CombatResolver,
    arena: EnemyArena,
    player: PlayerState,
    factory: CatalogFactory,
    events: Vec<Event>,
    retired: Vec<LiveEnemy>,
    tally: Tally,
}

impl Simulation {
    /// Builds every system from the session configuration.
    pub(crate) fn new(config: SessionConfig, upgrades: &[SpawnUpgrade]) -> Result<Self, ConfigError> {
        let waves = config.wave_table()?;
        let seed = config.spawn.rng_seed;
        let mut scheduler = SpawnScheduler::new(config.spawn, config.difficulty, waves);
        for &upgrade in upgrades {
            scheduler.apply_upgrade(upgrade);
        }
        for event in config.events {
            scheduler.schedule_spawn_event(event);
        }

        Ok(Self {
            scheduler,
            movement: Movement::new(seed.wrapping_add(1)),
            attack: AutoAttack::new(seed.wrapping_add(2)),
            combat: CombatResolver::new(config.combat),
            arena: EnemyArena::new(),
            player: config.player,
            factory: CatalogFactory,
            events: Vec::new(),
            retired: Vec::new(),
            tally: Tally::default(),
        })
    }

    /// Runs one frame at simulation time `now`.
    pub(crate) fn tick(&mut self, now: Duration) {
        self.events.clear();

        self.scheduler.update(
            now,
            &self.player,
            &mut self.arena,
            &mut self.factory,
            &mut self.events,
        );
        self.movement.update(
            now,
            &self.player,
            &mut self.arena,
            self.combat.hostile_buffer(),
        );
        self.movement
            .spawn_summons(&mut self.arena, &mut self.factory, &mut self.events);
        self.movement
            .resolve_player_contacts(&mut self.arena, &mut self.player, &mut self.events);
        let _ = self.attack.update(
            now,
            &self.player,
            &self.arena,
            self.combat.projectile_buffer(),
        );
        self.combat
            .update(&mut self.player, &mut self.arena, &mut self.events);

        self.arena.compact(&mut self.retired);
        for enemy in self.retired.drain(..) {
            self.factory.destroy(&enemy);
        }

        for event in &self.events {
            self.tally.record(event);
        }
    }

    /// Steps the session from zero to `duration` or until the player falls.
    pub(crate) fn run(&mut self, duration: Duration, step: Duration) -> SessionSummary {
        let mut now = Duration::ZERO;
        let mut ticks = 0_u64;
        loop {
            self.tick(now);
            ticks += 1;
            if self.player.is_defeated() {
                warn!(elapsed_ms = now.as_millis() as u64, "player defeated");
                break;
            }
            if now >= duration {
                break;
            }
            now = (now + step).min(duration);
        }

        let summary = SessionSummary {
            elapsed_ms: now.as_millis() as u64,
            ticks,
            wave: self.scheduler.current_wave(),
            spawned: self.tally.spawned,
            kills: self.tally.kills,
            contacts: self.tally.contacts,
            xp: self.tally.xp,
            explosions: self.tally.explosions,
            damage_taken: self.tally.damage_taken,
            life_stolen: self.tally.life_stolen,
            player_health: self.player.health,
            defeated: self.player.is_defeated(),
            live_enemies: self.arena.len(),
        };
        info!(
            wave = summary.wave,
            kills = summary.kills,
            live = summary.live_enemies,
            "session finished"
        );
        summary
    }

    /// Scheduler diagnostics at the current point of the session.
    pub(crate) fn diagnostics(&self) -> SpawnDiagnostics {
        self.scheduler.diagnostics()
    }

    /// Releases every live enemy and scheduler state at the end of a session.
    pub(crate) fn shutdown(&mut self) {
        for enemy in self.arena.iter() {
            self.factory.destroy(enemy);
        }
        self.scheduler.teardown();
        debug!(released = self.arena.len(), "session torn down");
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Tally {
    spawned: u64,
    kills: u64,
    contacts: u64,
    xp: u64,
    explosions: u64,
    damage_taken: f64,
    life_stolen: f64,
}

impl Tally {
    fn record(&mut self, event: &Event) {
        match event {
            Event::WaveAdvanced { .. } => {}
            Event::EnemySpawned { .. } => self.spawned += 1,
            Event::EnemyKilled { xp_value, cause, .. } => {
                match cause {
                    KillCause::Contact => self.contacts += 1,
                    KillCause::Projectile | KillCause::Explosion => self.kills += 1,
                }
                self.xp += u64::from(*xp_value);
            }
            Event::LifeStolen { amount } => self.life_stolen += amount,
            Event::PlayerDamaged { amount, .. } => self.damage_taken += amount,
            Event::ExplosionResolved { .. } => self.explosions += 1,
        }
    }
}

/// Outcome of a headless session.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub(crate) struct SessionSummary {
    pub(crate) elapsed_ms: u64,
    pub(crate) ticks: u64,
    pub(crate) wave: u32,
    pub(crate) spawned: u64,
    pub(crate) kills: u64,
    /// Enemies spent on the player; their experience is included in `xp`.
    pub(crate) contacts: u64,
    pub(crate) xp: u64,
    pub(crate) explosions: u64,
    pub(crate) damage_taken: f64,
    pub(crate) life_stolen: f64,
    pub(crate) player_health: f64,
    pub(crate) defeated: bool,
    pub(crate) live_enemies: usize,
}
