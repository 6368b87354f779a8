//! Движение: интеграция NavAgent'ов, доворот, keep-away.
//!
//! Вся кинематика планарная (XZ), y транслейта не трогаем.

use bevy::prelude::*;

use crate::ai::AgentState;
use crate::components::{planar_distance, AgentProfile, NavAgent, PlayerTarget};
use crate::spatial::SpatialQueries;
use crate::SimSet;

pub struct NavPlugin;

impl Plugin for NavPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (drive_nav_agents, align_facing, clamp_target_separation)
                .chain()
                .in_set(SimSet::Move),
        );
    }
}

/// Интеграция: velocity стремится к desired с ограничением acceleration,
/// шаг клампится, чтобы не перелететь stopping_distance
pub fn drive_nav_agents(
    mut agents: Query<(&mut NavAgent, &mut Transform)>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (mut nav, mut transform) in agents.iter_mut() {
        let pos = transform.translation;

        let desired = match nav.destination {
            Some(dest) if !nav.is_stopped => {
                let to = Vec3::new(dest.x - pos.x, 0.0, dest.z - pos.z);
                let remaining = to.length();
                if remaining <= nav.stopping_distance {
                    Vec3::ZERO
                } else {
                    to.normalize_or_zero() * nav.speed
                }
            }
            _ => Vec3::ZERO,
        };

        let dv = desired - nav.velocity;
        let max_dv = nav.acceleration * dt;
        if dv.length() <= max_dv {
            nav.velocity = desired;
        } else {
            let step = dv.normalize_or_zero() * max_dv;
            nav.velocity += step;
        }

        let mut step = nav.velocity * dt;
        // Кламп перелёта: не заступаем за stopping_distance
        if let Some(dest) = nav.destination {
            if !nav.is_stopped {
                let allowed =
                    (planar_distance(pos, dest) - nav.stopping_distance).max(0.0);
                let planned = Vec3::new(step.x, 0.0, step.z).length();
                if planned > allowed && planned > 0.0 {
                    step *= allowed / planned;
                    nav.velocity = step / dt;
                }
            }
        }

        transform.translation += Vec3::new(step.x, 0.0, step.z);
    }
}

/// Доворот по yaw: в бою — на цель, иначе по велосити
pub fn align_facing(
    mut agents: Query<(&AgentState, &NavAgent, &mut Transform), Without<PlayerTarget>>,
    target: Query<&Transform, (With<PlayerTarget>, Without<AgentState>)>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();
    let target_pos = target.iter().next().map(|t| t.translation);

    for (state, nav, mut transform) in agents.iter_mut() {
        if matches!(state, AgentState::Dead) {
            continue;
        }

        let in_combat = matches!(
            state,
            AgentState::Attack { .. } | AgentState::Strafe { .. }
        );

        let mut dir = if in_combat {
            match target_pos {
                Some(pos) => pos - transform.translation,
                None => nav.velocity,
            }
        } else if nav.velocity.length_squared() > 0.01 {
            nav.velocity
        } else {
            match target_pos {
                Some(pos) => pos - transform.translation,
                None => continue,
            }
        };
        dir.y = 0.0;
        if dir.length_squared() < 1e-6 {
            continue;
        }

        let turn_speed = match state {
            AgentState::Attack { .. } => 10.0,
            AgentState::Strafe { .. } => 7.5,
            _ => 6.0,
        };

        let wanted = Transform::IDENTITY
            .looking_to(dir.normalize(), Vec3::Y)
            .rotation;
        let t = (dt * turn_speed).min(1.0);
        transform.rotation = transform.rotation.slerp(wanted, t);
    }
}

/// Hard-кламп личного пространства: агент никогда не ближе
/// keep_away_distance к цели, независимо от состояния
pub fn clamp_target_separation(
    mut agents: Query<(&AgentProfile, &AgentState, &mut Transform), Without<PlayerTarget>>,
    target: Query<&Transform, With<PlayerTarget>>,
    queries: Res<SpatialQueries>,
) {
    let Some(target_pos) = target.iter().next().map(|t| t.translation) else {
        return;
    };

    for (profile, state, mut transform) in agents.iter_mut() {
        if matches!(state, AgentState::Dead) {
            continue;
        }

        let pos = transform.translation;
        let dist = planar_distance(pos, target_pos);
        if dist < profile.keep_away_distance && dist > 0.001 {
            let away = (Vec3::new(pos.x, 0.0, pos.z)
                - Vec3::new(target_pos.x, 0.0, target_pos.z))
                / dist;
            let push = profile.keep_away_distance - dist + 0.01;
            let desired = pos + away * push;
            let clamped = queries.sample_or(desired, 0.75, desired);
            transform.translation = Vec3::new(clamped.x, pos.y, clamped.z);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use std::time::Duration;

    fn world_with_fixed_tick() -> World {
        let mut world = World::new();
        let mut time = Time::<Fixed>::from_hz(60.0);
        time.advance_by(Duration::from_secs_f64(1.0 / 60.0));
        world.insert_resource(time);
        world
    }

    #[test]
    fn test_drive_moves_toward_destination() {
        let mut world = world_with_fixed_tick();
        let entity = world
            .spawn((
                Transform::from_translation(Vec3::ZERO),
                NavAgent {
                    destination: Some(Vec3::new(10.0, 0.0, 0.0)),
                    ..Default::default()
                },
            ))
            .id();

        world.run_system_once(drive_nav_agents).unwrap();

        let transform = world.get::<Transform>(entity).unwrap();
        assert!(transform.translation.x > 0.0);
        let nav = world.get::<NavAgent>(entity).unwrap();
        assert!(nav.planar_speed() > 0.0);
    }

    #[test]
    fn test_drive_respects_stopping_distance() {
        let mut world = world_with_fixed_tick();
        let entity = world
            .spawn((
                Transform::from_translation(Vec3::ZERO),
                NavAgent {
                    destination: Some(Vec3::new(0.5, 0.0, 0.0)),
                    stopping_distance: 0.4,
                    speed: 10.0,
                    acceleration: 1000.0,
                    ..Default::default()
                },
            ))
            .id();

        // Несколько тиков — шаг клампится, за stopping_distance не заходим
        for _ in 0..30 {
            world.run_system_once(drive_nav_agents).unwrap();
        }

        let transform = world.get::<Transform>(entity).unwrap();
        assert!(transform.translation.x <= 0.5 - 0.4 + 1e-4);
    }

    #[test]
    fn test_halted_agent_decelerates() {
        let mut world = world_with_fixed_tick();
        let entity = world
            .spawn((
                Transform::from_translation(Vec3::ZERO),
                NavAgent {
                    destination: Some(Vec3::new(10.0, 0.0, 0.0)),
                    velocity: Vec3::new(2.0, 0.0, 0.0),
                    is_stopped: true,
                    ..Default::default()
                },
            ))
            .id();

        for _ in 0..60 {
            world.run_system_once(drive_nav_agents).unwrap();
        }

        let nav = world.get::<NavAgent>(entity).unwrap();
        assert!(nav.planar_speed() < 1e-3);
    }
}
