//! Применение урона, мораль и смерть

use bevy::prelude::*;

use crate::ai::AgentState;
use crate::components::{AgentProfile, Health, NavAgent};
use crate::logger::log;
use crate::presentation::TargetFreezeRequest;

/// Входящий урон по агенту (от host-движка: hitbox, ловушка, скрипт)
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageTaken {
    pub target: Entity,
    pub amount: u32,
}

/// Агент умер на этом тике
#[derive(Event, Debug, Clone, Copy)]
pub struct EntityDied {
    pub entity: Entity,
}

/// Маркер мёртвого агента — для фильтрации запросов снаружи
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Урон → HP → мораль/смерть.
///
/// Смерть абсорбирующая: повторный урон по Dead игнорируется.
/// Порог морали: HP ≤ flee_at_hp и агент не в Attack/Flee → Flee.
pub fn apply_damage(
    mut commands: Commands,
    mut events: EventReader<DamageTaken>,
    mut agents: Query<(&mut Health, &AgentProfile, &mut AgentState, &mut NavAgent)>,
    mut died_events: EventWriter<EntityDied>,
    mut freeze_events: EventWriter<TargetFreezeRequest>,
) {
    for event in events.read() {
        let Ok((mut health, profile, mut state, mut nav)) = agents.get_mut(event.target) else {
            continue;
        };

        if matches!(*state, AgentState::Dead) {
            continue;
        }

        health.take_damage(event.amount);

        if !health.is_alive() {
            // Смерть посреди рывка не оставляет цель замороженной
            if let AgentState::Attack { seq } = &*state {
                freeze_events.write(TargetFreezeRequest {
                    target: seq.target,
                    frozen: false,
                });
            }
            nav.halt();
            nav.reset_path();
            nav.velocity = Vec3::ZERO;
            *state = AgentState::Dead;
            commands.entity(event.target).insert(Dead);
            died_events.write(EntityDied {
                entity: event.target,
            });
            log(&format!("💀 Агент {:?}: смерть", event.target));
        } else if health.current <= profile.flee_at_hp
            && !matches!(*state, AgentState::Flee { .. } | AgentState::Attack { .. })
        {
            nav.resume();
            *state = AgentState::Flee {
                timer: profile.flee_time,
            };
            log(&format!(
                "🏃 Агент {:?}: HP {} ≤ {} → Flee",
                event.target, health.current, profile.flee_at_hp
            ));
        }
    }
}
