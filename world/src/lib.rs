#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative live-entity arena for the Arena Horde simulation.
//!
//! The spawn scheduler appends entities and the combat resolver retires them
//! within the same frame. Retiring only tombstones a slot, so identifiers and
//! iteration order stay stable until [`EnemyArena::compact`] runs at the tick
//! boundary.

use arena_horde_core::{EnemyId, EnemyTemplate, LiveEnemy};
use glam::DVec2;

#[derive(Clone, Debug)]
struct Slot {
    enemy: LiveEnemy,
    alive: bool,
}

/// Collection of live enemies addressed by stable identifiers.
#[derive(Clone, Debug, Default)]
pub struct EnemyArena {
    slots: Vec<Slot>,
    next_id: u64,
    live: usize,
}

impl EnemyArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new enemy built from `template` and returns its identifier.
    ///
    /// Identifiers increase monotonically, which keeps slots sorted by id.
    pub fn spawn(
        &mut self,
        template: EnemyTemplate,
        position: DVec2,
        health_multiplier: f64,
        damage_multiplier: f64,
    ) -> EnemyId {
        let id = EnemyId::new(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot {
            enemy: LiveEnemy::from_template(
                id,
                template,
                position,
                health_multiplier,
                damage_multiplier,
            ),
            alive: true,
        });
        self.live += 1;
        id
    }

    /// Returns the live enemy with the provided identifier.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&LiveEnemy> {
        self.slot_index(id)
            .map(|index| &self.slots[index])
            .filter(|slot| slot.alive)
            .map(|slot| &slot.enemy)
    }

    /// Returns mutable access to the live enemy with the provided identifier.
    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut LiveEnemy> {
        let index = self.slot_index(id)?;
        let slot = &mut self.slots[index];
        if slot.alive {
            Some(&mut slot.enemy)
        } else {
            None
        }
    }

    /// Tombstones the enemy and returns it.
    ///
    /// Only the first call for a given identifier yields the enemy, so a death
    /// is never reported twice.
    pub fn remove(&mut self, id: EnemyId) -> Option<LiveEnemy> {
        let index = self.slot_index(id)?;
        let slot = &mut self.slots[index];
        if !slot.alive {
            return None;
        }
        slot.alive = false;
        self.live -= 1;
        Some(slot.enemy)
    }

    /// Iterator over live enemies in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &LiveEnemy> {
        self.slots
            .iter()
            .filter(|slot| slot.alive)
            .map(|slot| &slot.enemy)
    }

    /// Mutable iterator over live enemies in identifier order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut LiveEnemy> {
        self.slots
            .iter_mut()
            .filter(|slot| slot.alive)
            .map(|slot| &mut slot.enemy)
    }

    /// Writes the identifiers of live enemies into `out`, replacing its contents.
    pub fn collect_ids(&self, out: &mut Vec<EnemyId>) {
        out.clear();
        out.extend(self.iter().map(|enemy| enemy.id));
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Reports whether no enemy is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Drops tombstoned slots, appending the retired enemies to `out`.
    ///
    /// Call once per tick, after every system finished with the arena.
    pub fn compact(&mut self, out: &mut Vec<LiveEnemy>) {
        if self.slots.len() == self.live {
            return;
        }

        self.slots.retain(|slot| {
            if !slot.alive {
                out.push(slot.enemy);
            }
            slot.alive
        });
    }

    fn slot_index(&self, id: EnemyId) -> Option<usize> {
        self.slots
            .binary_search_by_key(&id, |slot| slot.enemy.id)
            .ok()
    }
}
