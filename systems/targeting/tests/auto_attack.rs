use std::time::Duration;

use arena_horde_core::{CatalogFactory, EnemyKind, EntityFactory, PlayerState};
use arena_horde_system_targeting::AutoAttack;
use arena_horde_world::EnemyArena;
use glam::DVec2;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn arena_with_basic_at(position: DVec2) -> EnemyArena {
    let mut arena = EnemyArena::new();
    let template = CatalogFactory
        .create(EnemyKind::Basic, position)
        .expect("catalog factory always creates");
    let _ = arena.spawn(template, position, 1.0, 1.0);
    arena
}

#[test]
fn cooldown_gates_consecutive_attacks() {
    let arena = arena_with_basic_at(DVec2::new(5.0, 0.0));
    let player = PlayerState::default();
    let mut attack = AutoAttack::new(9);
    let mut projectiles = Vec::new();

    assert!(attack.update(ms(0), &player, &arena, &mut projectiles).is_some());
    assert!(attack.update(ms(999), &player, &arena, &mut projectiles).is_none());
    assert!(attack.update(ms(1_000), &player, &arena, &mut projectiles).is_some());
    assert_eq!(projectiles.len(), 2);

    let shot = &projectiles[0];
    assert!((shot.velocity - DVec2::new(0.6, 0.0)).length() < 1e-12);
    assert_eq!(shot.remaining_lifetime, 80);
    assert!((shot.damage - 10.0).abs() < 1e-12);
}

#[test]
fn no_target_keeps_the_attack_ready() {
    let arena = arena_with_basic_at(DVec2::new(50.0, 0.0));
    let player = PlayerState::default();
    let mut attack = AutoAttack::new(9);
    let mut projectiles = Vec::new();

    assert!(attack.update(ms(0), &player, &arena, &mut projectiles).is_none());

    let close = arena_with_basic_at(DVec2::new(2.0, 0.0));
    assert!(attack.update(ms(1), &player, &close, &mut projectiles).is_some());
}

#[test]
fn guaranteed_crits_double_damage_and_carry_piercing() {
    let arena = arena_with_basic_at(DVec2::new(0.0, 3.0));
    let player = PlayerState {
        crit_chance: 1.0,
        piercing: 2,
        ..PlayerState::default()
    };
    let mut attack = AutoAttack::new(0);
    let mut projectiles = Vec::new();

    let _ = attack.update(ms(0), &player, &arena, &mut projectiles);
    assert!((projectiles[0].damage - 20.0).abs() < 1e-12);
    assert_eq!(projectiles[0].piercing_budget, 2);
    assert!(projectiles[0].hit_set.is_empty());
}
