#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Named multiplicative modifiers with deterministic timed reversion.
//!
//! Timed applications are recorded as [`TimedModifierEntry`] values in a
//! min-heap keyed by expiry and drained by [`ModifierRegistry::advance`].
//! Each reversion divides by its own factor only, so overlapping timed
//! applications on one name compound and later unwind independently. A
//! [`ModifierRegistry::set`] issued while reversions are pending does not
//! cancel them; they still divide the new absolute value when they fire.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
    mem,
    time::Duration,
};

use arena_horde_core::ModifierKind;
use serde::Serialize;
use tracing::debug;

/// Outstanding obligation to divide a modifier by `factor` at `expires_at`.
#[derive(Clone, Copy, Debug)]
pub struct TimedModifierEntry {
    /// Modifier the reversion applies to.
    pub kind: ModifierKind,
    /// Factor applied by the originating call.
    pub factor: f64,
    /// Simulation time at which the reversion fires.
    pub expires_at: Duration,
    sequence: u64,
}

impl TimedModifierEntry {
    fn key(&self) -> (Duration, u64) {
        (self.expires_at, self.sequence)
    }
}

impl PartialEq for TimedModifierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TimedModifierEntry {}

impl PartialOrd for TimedModifierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimedModifierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Raw values of every recognised modifier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModifierSnapshot {
    /// Value of `spawn-rate`.
    pub spawn_rate: f64,
    /// Value of `spawn-count`.
    pub spawn_count: f64,
    /// Value of `enemy-health`.
    pub enemy_health: f64,
    /// Value of `enemy-damage`.
    pub enemy_damage: f64,
    /// Value of `spawn-radius`.
    pub spawn_radius: f64,
    /// Value of `boss-chance`.
    pub boss_chance: f64,
}

/// Registry holding the six recognised modifiers and their pending reversions.
#[derive(Clone, Debug)]
pub struct ModifierRegistry {
    values: [f64; ModifierKind::ALL.len()],
    pending: BinaryHeap<Reverse<TimedModifierEntry>>,
    next_sequence: u64,
}

impl Default for ModifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModifierRegistry {
    /// Creates a registry with every modifier at `1.0` and nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: [1.0; ModifierKind::ALL.len()],
            pending: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    /// Multiplies the named modifier by `factor`.
    ///
    /// When `duration` is provided, the same factor is divided back out once
    /// `now + duration` is reached. Unknown names and factors that are not
    /// finite and positive are ignored.
    pub fn apply(&mut self, name: &str, factor: f64, duration: Option<Duration>, now: Duration) {
        match ModifierKind::from_name(name) {
            Some(kind) => self.apply_kind(kind, factor, duration, now),
            None => debug!(modifier = name, "ignoring unrecognised modifier"),
        }
    }

    /// Typed counterpart of [`ModifierRegistry::apply`].
    pub fn apply_kind(
        &mut self,
        kind: ModifierKind,
        factor: f64,
        duration: Option<Duration>,
        now: Duration,
    ) {
        if !is_valid_scalar(factor) {
            debug!(modifier = kind.name(), factor, "ignoring non-positive modifier factor");
            return;
        }

        self.values[kind.index()] *= factor;
        debug!(
            modifier = kind.name(),
            factor,
            value = self.values[kind.index()],
            "modifier applied"
        );

        if let Some(duration) = duration {
            let entry = TimedModifierEntry {
                kind,
                factor,
                expires_at: now.saturating_add(duration),
                sequence: self.next_sequence,
            };
            self.next_sequence += 1;
            self.pending.push(Reverse(entry));
        }
    }

    /// Overwrites the named modifier with an absolute value.
    ///
    /// Pending reversions are left in place. Unknown names and values that are
    /// not finite and positive are ignored.
    pub fn set(&mut self, name: &str, value: f64) {
        match ModifierKind::from_name(name) {
            Some(kind) => self.set_kind(kind, value),
            None => debug!(modifier = name, "ignoring unrecognised modifier"),
        }
    }

    /// Typed counterpart of [`ModifierRegistry::set`].
    pub fn set_kind(&mut self, kind: ModifierKind, value: f64) {
        if !is_valid_scalar(value) {
            debug!(modifier = kind.name(), value, "ignoring non-positive modifier value");
            return;
        }
        self.values[kind.index()] = value;
    }

    /// Current value of the named modifier, or `None` for unknown names.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        ModifierKind::from_name(name).map(|kind| self.value(kind))
    }

    /// Current value of a recognised modifier.
    #[must_use]
    pub fn value(&self, kind: ModifierKind) -> f64 {
        self.values[kind.index()]
    }

    /// Fires every reversion whose expiry is at or before `now`.
    ///
    /// Reversions fire in expiry order; ties fire in application order.
    pub fn advance(&mut self, now: Duration) {
        while let Some(Reverse(entry)) = self.pending.peek() {
            if entry.expires_at > now {
                break;
            }
            let entry = *entry;
            let _ = self.pending.pop();
            self.values[entry.kind.index()] /= entry.factor;
            debug!(
                modifier = entry.kind.name(),
                factor = entry.factor,
                value = self.values[entry.kind.index()],
                "timed modifier reverted"
            );
        }
    }

    /// Discards the pending reversions of one modifier without firing them.
    pub fn cancel(&mut self, kind: ModifierKind) {
        self.pending.retain(|Reverse(entry)| entry.kind != kind);
    }

    /// Delays every pending reversion by `offset`.
    ///
    /// Used to anchor reversions recorded before a session clock existed.
    pub fn shift_pending(&mut self, offset: Duration) {
        if offset.is_zero() {
            return;
        }
        let entries = mem::take(&mut self.pending).into_vec();
        self.pending = entries
            .into_iter()
            .map(|Reverse(mut entry)| {
                entry.expires_at = entry.expires_at.saturating_add(offset);
                Reverse(entry)
            })
            .collect();
    }

    /// Discards every pending reversion; used when a session is torn down.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Number of reversions still waiting to fire.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Pending reversions ordered by expiry.
    #[must_use]
    pub fn pending(&self) -> Vec<TimedModifierEntry> {
        let mut entries: Vec<_> = self.pending.iter().map(|Reverse(entry)| *entry).collect();
        entries.sort();
        entries
    }

    /// Captures the raw value of every modifier.
    #[must_use]
    pub fn snapshot(&self) -> ModifierSnapshot {
        ModifierSnapshot {
            spawn_rate: self.value(ModifierKind::SpawnRate),
            spawn_count: self.value(ModifierKind::SpawnCount),
            enemy_health: self.value(ModifierKind::EnemyHealth),
            enemy_damage: self.value(ModifierKind::EnemyDamage),
            spawn_radius: self.value(ModifierKind::SpawnRadius),
            boss_chance: self.value(ModifierKind::BossChance),
        }
    }
}

fn is_valid_scalar(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn unknown_names_are_silently_ignored() {
        let mut registry = ModifierRegistry::new();
        registry.apply("gold-find", 2.0, Some(ms(10)), Duration::ZERO);
        registry.set("gold-find", 3.0);

        assert_eq!(registry.get("gold-find"), None);
        assert_eq!(registry.pending_len(), 0);
        assert_eq!(registry.snapshot(), ModifierRegistry::new().snapshot());
    }

    #[test]
    fn non_positive_scalars_are_rejected() {
        let mut registry = ModifierRegistry::new();
        registry.apply_kind(ModifierKind::SpawnRate, 0.0, None, Duration::ZERO);
        registry.apply_kind(ModifierKind::SpawnRate, -2.0, None, Duration::ZERO);
        registry.apply_kind(ModifierKind::SpawnRate, f64::NAN, None, Duration::ZERO);
        registry.set_kind(ModifierKind::SpawnRate, 0.0);

        assert!((registry.value(ModifierKind::SpawnRate) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shifted_reversions_fire_later() {
        let mut registry = ModifierRegistry::new();
        registry.apply_kind(ModifierKind::EnemyHealth, 1.5, Some(ms(1_000)), Duration::ZERO);
        registry.apply_kind(ModifierKind::SpawnRate, 2.0, Some(ms(500)), Duration::ZERO);
        registry.shift_pending(ms(60_000));

        registry.advance(ms(60_499));
        assert!((registry.value(ModifierKind::SpawnRate) - 2.0).abs() < 1e-12);
        registry.advance(ms(60_500));
        assert!((registry.value(ModifierKind::SpawnRate) - 1.0).abs() < 1e-12);
        assert!((registry.value(ModifierKind::EnemyHealth) - 1.5).abs() < 1e-12);
        registry.advance(ms(61_000));
        assert!((registry.value(ModifierKind::EnemyHealth) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ties_revert_in_application_order() {
        let mut registry = ModifierRegistry::new();
        registry.apply_kind(ModifierKind::SpawnCount, 2.0, Some(ms(100)), Duration::ZERO);
        registry.apply_kind(ModifierKind::EnemyHealth, 3.0, Some(ms(50)), ms(50));
        registry.apply_kind(ModifierKind::SpawnRadius, 4.0, Some(ms(10)), Duration::ZERO);

        let order: Vec<_> = registry.pending().iter().map(|entry| entry.kind).collect();
        assert_eq!(
            order,
            vec![
                ModifierKind::SpawnRadius,
                ModifierKind::SpawnCount,
                ModifierKind::EnemyHealth,
            ]
        );
    }

    #[test]
    fn snapshot_starts_at_identity() {
        let registry = ModifierRegistry::new();
        let snapshot = registry.snapshot();
        assert!((snapshot.boss_chance - 1.0).abs() < f64::EPSILON);
        assert!((snapshot.spawn_rate - 1.0).abs() < f64::EPSILON);
    }
}
