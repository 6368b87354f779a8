//! Combat: входящий урон, мораль, смерть.
//!
//! Исходящего урона нет: AttackStarted (ai) — это hook, резолвит его
//! внешний слой.

pub mod damage;

pub use damage::{apply_damage, DamageTaken, Dead, EntityDied};

use bevy::prelude::*;

use crate::SimSet;

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageTaken>();
        app.add_event::<EntityDied>();

        app.add_systems(FixedUpdate, apply_damage.in_set(SimSet::Damage));
    }
}
