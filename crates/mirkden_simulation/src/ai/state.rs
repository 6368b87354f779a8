//! Состояния агента

use bevy::prelude::*;

use crate::ai::lunge::LungeSequence;

/// FSM агента — один enum с данными в вариантах.
///
/// Таймеры, принадлежащие конкретному состоянию, живут в варианте и
/// умирают вместе с ним. Сквозные таймеры — в AgentMemory.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum AgentState {
    /// Пауза между patrol-точками
    Idle { wait_timer: f32 },
    /// Движение к случайной точке вокруг дома
    Patrol,
    /// Сближение с целью
    Chase,
    /// Орбита вокруг цели, ожидание окна атаки
    Strafe { dir: f32, swap_timer: f32 },
    /// Атакующий рывок (face → lunge → hold)
    Attack { seq: LungeSequence },
    /// Бегство при низком HP
    Flee { timer: f32 },
    /// Возврат к дому после потери цели
    Return,
    /// Глубокий отдых у дома
    IdleSit { seated_timer: f32 },
    /// Терминальное состояние, absorbing
    Dead,
}

impl Default for AgentState {
    fn default() -> Self {
        AgentState::Patrol
    }
}

impl AgentState {
    /// Имя состояния для логов
    pub fn name(&self) -> &'static str {
        match self {
            AgentState::Idle { .. } => "Idle",
            AgentState::Patrol => "Patrol",
            AgentState::Chase => "Chase",
            AgentState::Strafe { .. } => "Strafe",
            AgentState::Attack { .. } => "Attack",
            AgentState::Flee { .. } => "Flee",
            AgentState::Return => "Return",
            AgentState::IdleSit { .. } => "IdleSit",
            AgentState::Dead => "Dead",
        }
    }
}
