use arena_horde_core::{DamageSource, Event, Explosion, KillCause, LiveEnemy};

/// Observer notified of the side effects of combat resolution.
///
/// Loot drops, experience and kill counters live outside this crate and are
/// driven from these callbacks.
pub trait CombatHooks {
    /// An enemy died and has already left the arena.
    fn on_kill(&mut self, enemy: &LiveEnemy, cause: KillCause);

    /// Life steal restored `amount` health.
    fn on_life_steal(&mut self, amount: f64);

    /// The player lost `amount` health.
    fn on_player_hit(&mut self, amount: f64, source: DamageSource);

    /// A blast is about to be applied.
    fn on_explosion(&mut self, explosion: &Explosion);
}

impl CombatHooks for Vec<Event> {
    fn on_kill(&mut self, enemy: &LiveEnemy, cause: KillCause) {
        self.push(Event::EnemyKilled {
            id: enemy.id,
            kind: enemy.kind,
            position: enemy.position,
            xp_value: enemy.xp_value,
            cause,
        });
    }

    fn on_life_steal(&mut self, amount: f64) {
        self.push(Event::LifeStolen { amount });
    }

    fn on_player_hit(&mut self, amount: f64, source: DamageSource) {
        self.push(Event::PlayerDamaged { amount, source });
    }

    fn on_explosion(&mut self, explosion: &Explosion) {
        self.push(Event::ExplosionResolved {
            explosion: *explosion,
        });
    }
}
