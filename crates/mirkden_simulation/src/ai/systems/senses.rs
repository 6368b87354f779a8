//! Система восприятия: общий perception-тик для всех агентов.
//!
//! Обнаружение переводит мирные состояния в Chase НА ТОМ ЖЕ ТИКЕ.
//! Потеря цели копится в last_seen_timer и из боевых состояний
//! уводит в Return.

use bevy::prelude::*;

use super::enter_return;
use crate::ai::AgentState;
use crate::components::{AgentMemory, AgentProfile, HomePosition, NavAgent, PlayerTarget};
use crate::logger::log;
use crate::perception::perceive;
use crate::spatial::SpatialQueries;

pub fn update_senses(
    mut agents: Query<
        (
            Entity,
            &Transform,
            &AgentProfile,
            &HomePosition,
            &mut AgentMemory,
            &mut AgentState,
            &mut NavAgent,
        ),
        Without<PlayerTarget>,
    >,
    target: Query<&Transform, With<PlayerTarget>>,
    queries: Res<SpatialQueries>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();
    let target_pos = target.iter().next().map(|t| t.translation);

    for (entity, transform, profile, home, mut memory, mut state, mut nav) in agents.iter_mut() {
        if matches!(*state, AgentState::Dead) {
            continue;
        }

        let perceived = match target_pos {
            Some(pos) => perceive(
                transform.translation,
                *transform.forward(),
                profile,
                pos,
                &queries,
            ),
            None => false,
        };

        if perceived {
            memory.last_seen_timer = 0.0;
            memory.stillness_timer = 0.0;

            // Мирные состояния срываются в погоню немедленно
            if matches!(
                *state,
                AgentState::Patrol
                    | AgentState::Idle { .. }
                    | AgentState::Return
                    | AgentState::IdleSit { .. }
            ) {
                log(&format!(
                    "👁️ Агент {:?}: цель обнаружена ({} → Chase)",
                    entity,
                    state.name()
                ));
                nav.resume();
                nav.reset_path();
                *state = AgentState::Chase;
            }
        } else {
            memory.last_seen_timer += dt;

            // Из боевых состояний — домой после return_home_after секунд потери
            if matches!(*state, AgentState::Chase | AgentState::Strafe { .. })
                && memory.last_seen_timer >= profile.return_home_after
            {
                log(&format!(
                    "🏠 Агент {:?}: цель потеряна {:.1}s → Return",
                    entity, memory.last_seen_timer
                ));
                enter_return(&mut state, &mut nav, &mut memory, profile, home);
            }
        }
    }
}
