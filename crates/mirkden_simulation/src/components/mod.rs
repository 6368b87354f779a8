//! ECS компоненты агента
//!
//! Организация по доменам:
//! - actor: здоровье (Health)
//! - agent: tunables (AgentProfile), сквозные таймеры (AgentMemory), дом (HomePosition)
//! - movement: locomotion driver (NavAgent)
//! - player: маркер отслеживаемой цели (PlayerTarget)

pub mod actor;
pub mod agent;
pub mod movement;
pub mod player;

// Re-exports для удобного импорта
pub use actor::*;
pub use agent::*;
pub use movement::*;
pub use player::*;
