//! AI агентов: perception-driven FSM + атакующий рывок.
//!
//! Порядок внутри тика: cooldowns → senses → FSM. Урон и смерть
//! обрабатываются раньше (SimSet::Damage), движение — позже
//! (SimSet::Move), так что Dead-агент не думает и не едет на том же
//! тике, когда умер.

pub mod lunge;
pub mod state;
pub mod systems;

pub use state::AgentState;
pub use systems::{tick_cooldowns, update_agents, update_senses, AttackStarted};

use bevy::prelude::*;

use crate::SimSet;

pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<AttackStarted>();

        app.add_systems(
            FixedUpdate,
            (tick_cooldowns, update_senses)
                .chain()
                .in_set(SimSet::Senses),
        );
        app.add_systems(FixedUpdate, update_agents.in_set(SimSet::Think));
    }
}
