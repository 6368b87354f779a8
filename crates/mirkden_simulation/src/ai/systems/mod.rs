//! FixedUpdate-системы AI

mod fsm;
mod senses;

pub use fsm::{tick_cooldowns, update_agents, AttackStarted};
pub use senses::update_senses;

pub(crate) use fsm::enter_return;
