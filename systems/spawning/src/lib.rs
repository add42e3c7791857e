#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn scheduler deciding when, how many, what kind and where enemies appear.
//!
//! Each call to [`SpawnScheduler::update`] runs the same stages in order:
//! pending modifier reversions are drained, the wave clock advances, due
//! scheduled spawn events fire, and finally the regular batch spawns once the
//! effective interval has elapsed since the previous batch.

mod upgrades;

use std::time::Duration;

use arena_horde_core::{
    EnemyKind, EnemyPool, EntityFactory, Event, ModifierKind, PatternKind, PlayerState,
    WaveConfig, WaveTable,
};
use arena_horde_system_difficulty::DifficultyCurve;
use arena_horde_system_modifiers::{ModifierRegistry, ModifierSnapshot};
use arena_horde_system_spawn_patterns::{self as patterns, PatternContext};
use arena_horde_system_wave_clock::WaveClock;
use arena_horde_world::EnemyArena;
use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use upgrades::SpawnUpgrade;

/// Tuning of the spawn scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Minimum distance between the player and a spawn position.
    pub spawn_distance: f64,
    /// Random extra distance added on top of `spawn_distance`.
    pub spawn_distance_variance: f64,
    /// Pattern used by waves that do not configure one.
    pub default_pattern: PatternKind,
    /// Per-spawn boss probability on boss waves before the `boss-chance` modifier.
    pub base_boss_chance: f64,
    /// Floor of the effective spawn interval.
    #[serde(rename = "min_interval_ms", with = "arena_horde_core::millis")]
    pub min_interval: Duration,
    /// Seed of the scheduler's random source.
    pub rng_seed: u64,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            spawn_distance: 12.0,
            spawn_distance_variance: 5.0,
            default_pattern: PatternKind::Circle,
            base_boss_chance: 0.1,
            min_interval: Duration::from_millis(100),
            rng_seed: 0x5eed_a2e4_a5c1_0001,
        }
    }
}

/// One-off batch of a single kind fired when `trigger_at` is reached.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSpawn {
    /// Simulation time at which the batch spawns.
    #[serde(rename = "trigger_at_ms", with = "arena_horde_core::millis")]
    pub trigger_at: Duration,
    /// Kind of every entity in the batch.
    pub kind: EnemyKind,
    /// Number of entities in the batch.
    pub count: u32,
    /// Placement geometry; `None` uses the current wave's pattern.
    #[serde(default)]
    pub pattern: Option<PatternKind>,
}

/// Read-only snapshot of the scheduler's effective values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpawnDiagnostics {
    /// One-based index of the current wave.
    pub current_wave: u32,
    /// Time between batches after modifiers, time scaling and the floor.
    #[serde(rename = "effective_spawn_interval_ms", with = "arena_horde_core::millis")]
    pub effective_spawn_interval: Duration,
    /// Entities per regular batch.
    pub effective_spawn_count: u32,
    /// Health multiplier applied to new entities.
    pub health_multiplier: f64,
    /// Damage multiplier applied to new entities.
    pub damage_multiplier: f64,
    /// Current time-scaling factor.
    pub time_scaling: f64,
    /// Raw modifier values.
    pub raw_modifiers: ModifierSnapshot,
    /// Timed modifier reversions still pending.
    pub pending_reversions: usize,
    /// Scheduled spawn events still waiting for their trigger time.
    pub scheduled_spawns: usize,
}

/// Orchestrates the wave clock, modifiers, difficulty curve and spawn patterns.
#[derive(Debug)]
pub struct SpawnScheduler {
    config: SpawnConfig,
    difficulty: DifficultyCurve,
    waves: WaveTable,
    modifiers: ModifierRegistry,
    clock: WaveClock,
    session_start: Option<Duration>,
    last_spawn: Duration,
    now: Duration,
    spawn_points: Vec<DVec2>,
    scheduled: Vec<ScheduledSpawn>,
    rng: ChaCha8Rng,
    roster: Vec<EnemyKind>,
}

impl SpawnScheduler {
    /// Creates a scheduler; the session starts on the first update.
    #[must_use]
    pub fn new(config: SpawnConfig, difficulty: DifficultyCurve, waves: WaveTable) -> Self {
        Self {
            config,
            difficulty,
            waves,
            modifiers: ModifierRegistry::new(),
            clock: WaveClock::new(),
            session_start: None,
            last_spawn: Duration::ZERO,
            now: Duration::ZERO,
            spawn_points: Vec::new(),
            scheduled: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            roster: Vec::new(),
        }
    }

    /// Runs one tick of the spawn pipeline.
    ///
    /// New entities are appended to `arena` and reported through `events`.
    pub fn update<F>(
        &mut self,
        now: Duration,
        player: &PlayerState,
        arena: &mut EnemyArena,
        factory: &mut F,
        events: &mut Vec<Event>,
    ) where
        F: EntityFactory + ?Sized,
    {
        if self.session_start.is_none() {
            self.begin_session(now);
        }
        self.now = now;

        self.modifiers.advance(now);

        if let Some(wave) = self.clock.advance(now, &self.waves) {
            events.push(Event::WaveAdvanced {
                wave,
                message: self.clock.config(&self.waves).message.clone(),
            });
        }

        self.fire_scheduled_spawns(now, player, arena, factory, events);

        let interval = self.effective_spawn_interval();
        if now.saturating_sub(self.last_spawn) < interval {
            return;
        }

        let wave = self.clock.current();
        let wave_config = self.waves.get(wave).clone();
        let count = self.effective_spawn_count();
        let pattern = wave_config.pattern.unwrap_or(self.config.default_pattern);
        debug!(
            wave,
            count,
            interval_ms = interval.as_millis() as u64,
            pattern = pattern.name(),
            "spawning batch"
        );

        for index in 0..count {
            let Some(kind) = self.select_kind(&wave_config, wave) else {
                continue;
            };
            self.spawn_one(kind, pattern, index, count, player, arena, factory, events);
        }
        self.last_spawn = now;
    }

    /// Multiplies a modifier, optionally reverting after `duration`.
    ///
    /// Durations are measured from the time of the most recent update, or
    /// from the session start when no update has run yet.
    pub fn apply_modifier(&mut self, name: &str, factor: f64, duration: Option<Duration>) {
        self.modifiers.apply(name, factor, duration, self.now);
    }

    /// Overwrites a modifier with an absolute value.
    pub fn set_modifier(&mut self, name: &str, value: f64) {
        self.modifiers.set(name, value);
    }

    /// Current value of a modifier, or `None` for unknown names.
    #[must_use]
    pub fn modifier(&self, name: &str) -> Option<f64> {
        self.modifiers.get(name)
    }

    /// Applies every permanent effect of a spawn upgrade.
    pub fn apply_upgrade(&mut self, upgrade: SpawnUpgrade) {
        for &(kind, factor) in upgrade.effects() {
            self.modifiers.apply_kind(kind, factor, None, self.now);
        }
        debug!(upgrade = upgrade.name(), "spawn upgrade applied");
    }

    /// Registers a point used by the fixed pattern.
    pub fn add_spawn_point(&mut self, x: f64, z: f64) {
        self.spawn_points.push(DVec2::new(x, z));
    }

    /// Removes every fixed spawn point.
    pub fn clear_spawn_points(&mut self) {
        self.spawn_points.clear();
    }

    /// Queues a one-off batch fired on the first update at or after its trigger.
    pub fn schedule_spawn_event(&mut self, event: ScheduledSpawn) {
        self.scheduled.push(event);
    }

    /// One-based index of the current wave.
    #[must_use]
    pub fn current_wave(&self) -> u32 {
        self.clock.current()
    }

    /// Snapshot of the effective spawn values at the most recent update.
    #[must_use]
    pub fn diagnostics(&self) -> SpawnDiagnostics {
        SpawnDiagnostics {
            current_wave: self.clock.current(),
            effective_spawn_interval: self.effective_spawn_interval(),
            effective_spawn_count: self.effective_spawn_count(),
            health_multiplier: self.health_multiplier(),
            damage_multiplier: self.damage_multiplier(),
            time_scaling: self.difficulty.scale(self.elapsed()),
            raw_modifiers: self.modifiers.snapshot(),
            pending_reversions: self.modifiers.pending_len(),
            scheduled_spawns: self.scheduled.len(),
        }
    }

    /// Ends the session: discards pending reversions and scheduled events.
    ///
    /// The next update starts a fresh session on wave 1. Modifier values are
    /// kept as they are.
    pub fn teardown(&mut self) {
        self.modifiers.clear_pending();
        self.scheduled.clear();
        self.session_start = None;
    }

    fn begin_session(&mut self, now: Duration) {
        // Reversions recorded before the first update count from the session start.
        self.modifiers.shift_pending(now.saturating_sub(self.now));
        self.session_start = Some(now);
        self.clock.restart(now);
        self.last_spawn = now;
    }

    fn elapsed(&self) -> Duration {
        self.session_start
            .map_or(Duration::ZERO, |start| self.now.saturating_sub(start))
    }

    fn effective_spawn_interval(&self) -> Duration {
        let base = self.clock.config(&self.waves).spawn_interval.as_secs_f64();
        let rate = self.modifiers.value(ModifierKind::SpawnRate);
        let seconds = base / rate / self.difficulty.scale(self.elapsed());
        Duration::try_from_secs_f64(seconds)
            .unwrap_or(Duration::MAX)
            .max(self.config.min_interval)
    }

    fn effective_spawn_count(&self) -> u32 {
        let base = f64::from(self.clock.config(&self.waves).spawn_count);
        let count = base
            * self.modifiers.value(ModifierKind::SpawnCount)
            * self.difficulty.count_factor(self.elapsed());
        count.max(1.0).round() as u32
    }

    fn health_multiplier(&self) -> f64 {
        self.modifiers.value(ModifierKind::EnemyHealth) * self.difficulty.stat_factor(self.elapsed())
    }

    fn damage_multiplier(&self) -> f64 {
        self.modifiers.value(ModifierKind::EnemyDamage) * self.difficulty.stat_factor(self.elapsed())
    }

    fn select_kind(&mut self, wave_config: &WaveConfig, wave: u32) -> Option<EnemyKind> {
        if EnemyKind::is_boss_wave(wave) {
            let chance = self.config.base_boss_chance * self.modifiers.value(ModifierKind::BossChance);
            if self.rng.gen_bool(chance.clamp(0.0, 1.0)) {
                return Some(EnemyKind::Boss);
            }
        }

        match &wave_config.enemy_pool {
            EnemyPool::All => EnemyKind::unlocked_roster(wave, &mut self.roster),
            EnemyPool::Kinds(kinds) => {
                self.roster.clear();
                self.roster.extend_from_slice(kinds);
            }
        }

        if self.roster.is_empty() {
            debug!(wave, "empty enemy pool, skipping spawn");
            return None;
        }
        let index = self.rng.gen_range(0..self.roster.len());
        Some(self.roster[index])
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_one<F>(
        &mut self,
        kind: EnemyKind,
        pattern: PatternKind,
        index: u32,
        total: u32,
        player: &PlayerState,
        arena: &mut EnemyArena,
        factory: &mut F,
        events: &mut Vec<Event>,
    ) where
        F: EntityFactory + ?Sized,
    {
        let context = PatternContext {
            origin: player.position,
            index: index as usize,
            total: total as usize,
            wave: self.clock.current(),
            base_distance: self.config.spawn_distance,
            distance_variance: self.config.spawn_distance_variance,
            radius_multiplier: self.modifiers.value(ModifierKind::SpawnRadius),
            spawn_points: &self.spawn_points,
        };
        let position = patterns::position(pattern, &context, &mut self.rng);

        let Some(template) = factory.create(kind, position) else {
            debug!(kind = kind.tag(), "factory declined to create enemy");
            return;
        };

        let id = arena.spawn(
            template,
            position,
            self.health_multiplier(),
            self.damage_multiplier(),
        );
        debug!(id = id.get(), kind = kind.tag(), x = position.x, z = position.y, "enemy spawned");
        events.push(Event::EnemySpawned { id, kind, position });
    }

    fn fire_scheduled_spawns<F>(
        &mut self,
        now: Duration,
        player: &PlayerState,
        arena: &mut EnemyArena,
        factory: &mut F,
        events: &mut Vec<Event>,
    ) where
        F: EntityFactory + ?Sized,
    {
        if self.scheduled.iter().all(|event| event.trigger_at > now) {
            return;
        }

        let (mut due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scheduled)
            .into_iter()
            .partition(|event| event.trigger_at <= now);
        self.scheduled = pending;
        due.sort_by_key(|event| event.trigger_at);

        let wave_pattern = self
            .clock
            .config(&self.waves)
            .pattern
            .unwrap_or(self.config.default_pattern);
        for event in due {
            debug!(kind = event.kind.tag(), count = event.count, "scheduled spawn fired");
            let pattern = event.pattern.unwrap_or(wave_pattern);
            for index in 0..event.count {
                self.spawn_one(
                    event.kind, pattern, index, event.count, player, arena, factory, events,
                );
            }
        }
    }
}
