use std::time::Duration;

use arena_horde_core::{
    CatalogFactory, EnemyKind, EnemyPool, EnemyTemplate, EntityFactory, Event, LiveEnemy,
    PatternKind, PlayerState, WaveConfig, WaveTable,
};
use arena_horde_system_difficulty::DifficultyCurve;
use arena_horde_system_spawning::{ScheduledSpawn, SpawnConfig, SpawnScheduler, SpawnUpgrade};
use arena_horde_world::EnemyArena;
use glam::DVec2;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn single_basic_wave() -> WaveTable {
    WaveTable::new(vec![WaveConfig {
        duration: ms(30_000),
        enemy_pool: EnemyPool::Kinds(vec![EnemyKind::Basic]),
        spawn_interval: ms(2_000),
        spawn_count: 1,
        pattern: Some(PatternKind::Circle),
        message: "The horde approaches!".to_owned(),
    }])
    .expect("valid table")
}

fn scheduler(waves: WaveTable) -> SpawnScheduler {
    SpawnScheduler::new(SpawnConfig::default(), DifficultyCurve::default(), waves)
}

fn spawned_kinds(events: &[Event]) -> Vec<EnemyKind> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect()
}

#[derive(Default)]
struct RecordingFactory {
    created: Vec<(EnemyKind, DVec2)>,
    refuse: bool,
}

impl EntityFactory for RecordingFactory {
    fn create(&mut self, kind: EnemyKind, position: DVec2) -> Option<EnemyTemplate> {
        if self.refuse {
            return None;
        }
        self.created.push((kind, position));
        CatalogFactory.create(kind, position)
    }

    fn destroy(&mut self, _enemy: &LiveEnemy) {}
}

#[test]
fn single_wave_scenario_spawns_on_schedule_and_advances() {
    let mut scheduler = scheduler(single_basic_wave());
    let player = PlayerState::default();
    let mut arena = EnemyArena::new();
    let mut factory = RecordingFactory::default();
    let mut events = Vec::new();

    let mut now = 0;
    while now < 2_000 {
        scheduler.update(ms(now), &player, &mut arena, &mut factory, &mut events);
        now += 1;
    }
    assert!(factory.created.is_empty(), "no spawn before the first interval");

    scheduler.update(ms(2_000), &player, &mut arena, &mut factory, &mut events);
    assert_eq!(factory.created.len(), 1);
    assert_eq!(factory.created[0].0, EnemyKind::Basic);
    assert_eq!(spawned_kinds(&events), vec![EnemyKind::Basic]);

    let distance = factory.created[0].1.distance(player.position);
    assert!((12.0..=17.0).contains(&distance), "distance {distance}");

    while now <= 30_001 {
        scheduler.update(ms(now), &player, &mut arena, &mut factory, &mut events);
        now += 1;
    }
    assert_eq!(scheduler.current_wave(), 2);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::WaveAdvanced { wave: 2, .. }))
            .count(),
        1
    );
}

#[test]
fn session_starts_at_first_update() {
    let mut scheduler = scheduler(single_basic_wave());
    let player = PlayerState::default();
    let mut arena = EnemyArena::new();
    let mut events = Vec::new();

    scheduler.update(ms(10_000), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert!(arena.is_empty());

    scheduler.update(ms(11_999), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert!(arena.is_empty());

    scheduler.update(ms(12_000), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert_eq!(arena.len(), 1);
}

#[test]
fn refused_creations_are_skipped() {
    let mut scheduler = scheduler(single_basic_wave());
    let player = PlayerState::default();
    let mut arena = EnemyArena::new();
    let mut factory = RecordingFactory {
        refuse: true,
        ..RecordingFactory::default()
    };
    let mut events = Vec::new();

    scheduler.update(ms(0), &player, &mut arena, &mut factory, &mut events);
    scheduler.update(ms(2_000), &player, &mut arena, &mut factory, &mut events);

    assert!(arena.is_empty());
    assert!(events.is_empty());
}

#[test]
fn spawned_enemies_carry_modifier_multipliers() {
    let mut scheduler = scheduler(single_basic_wave());
    scheduler.apply_upgrade(SpawnUpgrade::Culling);
    let player = PlayerState::default();
    let mut arena = EnemyArena::new();
    let mut events = Vec::new();

    scheduler.update(ms(0), &player, &mut arena, &mut CatalogFactory, &mut events);
    scheduler.update(ms(2_000), &player, &mut arena, &mut CatalogFactory, &mut events);

    let enemy = arena.iter().next().expect("one enemy spawned");
    assert!((enemy.max_health - 45.0).abs() < 1e-9);
    assert!((enemy.damage - 8.0).abs() < 1e-9, "7.5 rounds to 8");
}

#[test]
fn timed_modifiers_revert_during_updates() {
    let mut scheduler = scheduler(single_basic_wave());
    let player = PlayerState::default();
    let mut arena = EnemyArena::new();
    let mut events = Vec::new();

    scheduler.update(ms(0), &player, &mut arena, &mut CatalogFactory, &mut events);
    scheduler.apply_modifier("enemy-health", 1.5, Some(ms(1_000)));
    assert_eq!(scheduler.modifier("enemy-health"), Some(1.5));

    scheduler.update(ms(999), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert_eq!(scheduler.modifier("enemy-health"), Some(1.5));

    scheduler.update(ms(1_000), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert_eq!(scheduler.modifier("enemy-health"), Some(1.0));
    assert_eq!(scheduler.modifier("gold-find"), None);
}

#[test]
fn timed_modifiers_applied_before_the_session_count_from_its_start() {
    let mut scheduler = scheduler(single_basic_wave());
    let player = PlayerState::default();
    let mut arena = EnemyArena::new();
    let mut events = Vec::new();

    scheduler.apply_modifier("enemy-health", 1.5, Some(ms(10_000)));
    scheduler.update(ms(60_000), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert_eq!(scheduler.modifier("enemy-health"), Some(1.5));

    scheduler.update(ms(69_999), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert_eq!(scheduler.modifier("enemy-health"), Some(1.5));

    scheduler.update(ms(70_000), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert_eq!(scheduler.modifier("enemy-health"), Some(1.0));
}

#[test]
fn spawn_rate_modifier_shortens_the_interval() {
    let mut scheduler = scheduler(single_basic_wave());
    scheduler.apply_modifier("spawnRateMultiplier", 2.0, None);
    let player = PlayerState::default();
    let mut arena = EnemyArena::new();
    let mut events = Vec::new();

    scheduler.update(ms(0), &player, &mut arena, &mut CatalogFactory, &mut events);
    scheduler.update(ms(999), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert!(arena.is_empty());
    scheduler.update(ms(1_000), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert_eq!(arena.len(), 1);
    assert_eq!(scheduler.diagnostics().effective_spawn_interval, ms(1_000));
}

#[test]
fn fixed_pattern_uses_spawn_points_round_robin() {
    let waves = WaveTable::new(vec![WaveConfig {
        duration: ms(60_000),
        enemy_pool: EnemyPool::Kinds(vec![EnemyKind::Swarm]),
        spawn_interval: ms(1_000),
        spawn_count: 3,
        pattern: Some(PatternKind::Fixed),
        message: String::new(),
    }])
    .expect("valid table");
    let mut scheduler = scheduler(waves);
    scheduler.add_spawn_point(5.0, 5.0);
    scheduler.add_spawn_point(-5.0, 5.0);
    let player = PlayerState::default();
    let mut arena = EnemyArena::new();
    let mut factory = RecordingFactory::default();
    let mut events = Vec::new();

    scheduler.update(ms(0), &player, &mut arena, &mut factory, &mut events);
    scheduler.update(ms(1_000), &player, &mut arena, &mut factory, &mut events);

    let positions: Vec<_> = factory.created.iter().map(|(_, position)| *position).collect();
    assert_eq!(
        positions,
        vec![
            DVec2::new(5.0, 5.0),
            DVec2::new(-5.0, 5.0),
            DVec2::new(5.0, 5.0),
        ]
    );

    scheduler.clear_spawn_points();
    factory.created.clear();
    scheduler.update(ms(2_000), &player, &mut arena, &mut factory, &mut events);
    assert_eq!(factory.created.len(), 3);
    for (_, position) in &factory.created {
        let distance = position.length();
        assert!((12.0..=17.0).contains(&distance), "circle fallback {distance}");
    }
}

#[test]
fn scheduled_spawns_fire_once() {
    let mut scheduler = scheduler(single_basic_wave());
    scheduler.schedule_spawn_event(ScheduledSpawn {
        trigger_at: ms(500),
        kind: EnemyKind::Tank,
        count: 2,
        pattern: Some(PatternKind::Line),
    });
    let player = PlayerState::default();
    let mut arena = EnemyArena::new();
    let mut events = Vec::new();

    scheduler.update(ms(0), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert_eq!(scheduler.diagnostics().scheduled_spawns, 1);

    scheduler.update(ms(500), &player, &mut arena, &mut CatalogFactory, &mut events);
    scheduler.update(ms(600), &player, &mut arena, &mut CatalogFactory, &mut events);

    assert_eq!(spawned_kinds(&events), vec![EnemyKind::Tank, EnemyKind::Tank]);
    assert_eq!(scheduler.diagnostics().scheduled_spawns, 0);
}

#[test]
fn teardown_discards_pending_work_and_restarts_the_session() {
    let mut scheduler = scheduler(WaveTable::default());
    let player = PlayerState::default();
    let mut arena = EnemyArena::new();
    let mut events = Vec::new();

    scheduler.update(ms(0), &player, &mut arena, &mut CatalogFactory, &mut events);
    scheduler.apply_modifier("spawn-rate", 2.0, Some(ms(50_000)));
    scheduler.schedule_spawn_event(ScheduledSpawn {
        trigger_at: ms(50_000),
        kind: EnemyKind::Boss,
        count: 1,
        pattern: None,
    });
    scheduler.update(ms(30_000), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert_eq!(scheduler.current_wave(), 2);

    scheduler.teardown();
    let diagnostics = scheduler.diagnostics();
    assert_eq!(diagnostics.pending_reversions, 0);
    assert_eq!(diagnostics.scheduled_spawns, 0);

    events.clear();
    scheduler.update(ms(40_000), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert_eq!(scheduler.current_wave(), 1);

    scheduler.update(ms(60_000), &player, &mut arena, &mut CatalogFactory, &mut events);
    assert_eq!(scheduler.modifier("spawn-rate"), Some(2.0));
    let kinds = spawned_kinds(&events);
    assert!(!kinds.is_empty());
    assert!(!kinds.contains(&EnemyKind::Boss));
}

#[test]
fn diagnostics_serialise_to_json() {
    let mut scheduler = scheduler(WaveTable::default());
    scheduler.apply_upgrade(SpawnUpgrade::SwarmTraining);
    scheduler.apply_upgrade(SpawnUpgrade::SwarmTraining);

    let diagnostics = scheduler.diagnostics();
    assert_eq!(diagnostics.current_wave, 1);
    assert_eq!(diagnostics.effective_spawn_count, 1);
    assert_eq!(diagnostics.effective_spawn_interval, ms(2_000));

    let json = serde_json::to_value(diagnostics).expect("serialisable diagnostics");
    assert_eq!(json["effective_spawn_interval_ms"], 2_000);
    let count = json["raw_modifiers"]["spawn-count"]
        .as_f64()
        .expect("numeric modifier");
    assert!((count - 1.44).abs() < 1e-9);
}

#[test]
fn scheduled_spawns_parse_from_toml() {
    #[derive(serde::Deserialize)]
    struct Document {
        events: Vec<ScheduledSpawn>,
    }

    let document: Document = toml::from_str(
        r#"
        [[events]]
        trigger_at_ms = 45000
        kind = "explosive"
        count = 4
        pattern = "grid"
        "#,
    )
    .expect("valid events");

    assert_eq!(
        document.events,
        vec![ScheduledSpawn {
            trigger_at: ms(45_000),
            kind: EnemyKind::Explosive,
            count: 4,
            pattern: Some(PatternKind::Grid),
        }]
    );
}
