//! Основная FSM агентов.
//!
//! Один match на состояние за FixedUpdate-тик. Переход вычисляется
//! внутри match'а как Option<AgentState> и применяется после — мутации
//! данных текущего варианта (таймеры, dir) идут in place.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::lunge::{LungeSequence, SequenceStatus};
use crate::ai::AgentState;
use crate::components::{
    planar_distance, AgentMemory, AgentProfile, HomePosition, NavAgent, PlayerTarget,
};
use crate::logger::log;
use crate::perception::{EYE_HEIGHT, TARGET_CHEST_HEIGHT};
use crate::presentation::{CameraFocusRequest, TargetFreezeRequest};
use crate::spatial::SpatialQueries;
use crate::DeterministicRng;

/// Атака стартовала (момент входа в Attack).
///
/// Урон по цели симуляция НЕ наносит — это hook для внешнего
/// combat-резолвера (hitbox, блок, парирование на стороне host).
#[derive(Event, Debug, Clone, Copy)]
pub struct AttackStarted {
    pub attacker: Entity,
    pub target: Entity,
}

/// Вход в Return: единая точка для senses и fsm
pub(crate) fn enter_return(
    state: &mut AgentState,
    nav: &mut NavAgent,
    memory: &mut AgentMemory,
    profile: &AgentProfile,
    home: &HomePosition,
) {
    nav.resume();
    nav.speed = profile.patrol_speed;
    nav.stopping_distance = 0.0;
    nav.set_destination(home.position);
    memory.stillness_timer = 0.0;
    *state = AgentState::Return;
}

/// Тик cooldown'ов — отдельная система, чтобы cooldown тикал
/// в любом состоянии (кроме Dead)
pub fn tick_cooldowns(mut agents: Query<(&mut AgentMemory, &AgentState)>, time: Res<Time<Fixed>>) {
    let dt = time.delta_secs();
    for (mut memory, state) in agents.iter_mut() {
        if matches!(state, AgentState::Dead) {
            continue;
        }
        memory.attack_cooldown_timer = (memory.attack_cooldown_timer - dt).max(0.0);
    }
}

pub fn update_agents(
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
    target: Query<(Entity, &Transform), With<PlayerTarget>>,
    queries: Res<SpatialQueries>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
    mut attack_events: EventWriter<AttackStarted>,
    mut focus_events: EventWriter<CameraFocusRequest>,
    mut freeze_events: EventWriter<TargetFreezeRequest>,
) {
    let dt = time.delta_secs();
    let elapsed = time.elapsed_secs();
    let target_info = target.iter().next().map(|(e, t)| (e, t.translation));

    for (entity, transform, profile, home, mut memory, mut state, mut nav) in agents.iter_mut() {
        let pos = transform.translation;

        // Учёт неподвижности (для IdleSit)
        if nav.planar_speed() > 0.05 {
            memory.stillness_timer = 0.0;
        } else {
            memory.stillness_timer += dt;
        }

        let next: Option<AgentState> = match &mut *state {
            AgentState::Idle { wait_timer } => {
                if memory.stillness_timer >= profile.idle_sit_after
                    && planar_distance(pos, home.position) <= 2.0
                {
                    nav.halt();
                    log(&format!("💤 Агент {:?}: Idle → IdleSit", entity));
                    Some(AgentState::IdleSit { seated_timer: 0.0 })
                } else {
                    *wait_timer -= dt;
                    if *wait_timer <= 0.0 {
                        pick_patrol_point(&mut nav, home, pos, profile, &queries, &mut rng);
                        Some(AgentState::Patrol)
                    } else {
                        None
                    }
                }
            }

            AgentState::Patrol => {
                nav.speed = profile.patrol_speed;
                nav.stopping_distance = 0.0;
                if nav.destination.is_none() {
                    pick_patrol_point(&mut nav, home, pos, profile, &queries, &mut rng);
                }
                if nav.remaining_distance(pos) <= nav.stopping_distance + 0.05 {
                    nav.reset_path();
                    let wait = rng.rng.gen_range(profile.patrol_wait * 0.5..profile.patrol_wait * 1.5);
                    Some(AgentState::Idle { wait_timer: wait })
                } else {
                    None
                }
            }

            AgentState::Chase => match target_info {
                None => {
                    enter_return(&mut state, &mut nav, &mut memory, profile, home);
                    continue;
                }
                Some((_, target_pos)) => {
                    nav.speed = profile.chase_speed;
                    nav.stopping_distance =
                        profile.keep_away_distance.max(profile.attack_range * 0.6);
                    nav.resume();
                    nav.set_destination(target_pos);

                    let dist = planar_distance(pos, target_pos);
                    if dist <= (profile.strafe_radius + 0.5).max(profile.attack_range + 0.4) {
                        let dir = if rng.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                        Some(AgentState::Strafe {
                            dir,
                            swap_timer: 0.0,
                        })
                    } else {
                        None
                    }
                }
            },

            AgentState::Strafe { dir, swap_timer } => match target_info {
                None => {
                    enter_return(&mut state, &mut nav, &mut memory, profile, home);
                    continue;
                }
                Some((target_entity, target_pos)) => {
                    let orbit = profile.orbit_radius();
                    nav.speed = profile.strafe_speed;
                    nav.stopping_distance =
                        (profile.attack_range * 0.5).clamp(0.0, (orbit - 0.05).max(0.0));

                    let dist = planar_distance(pos, target_pos);
                    let to_agent = (Vec3::new(pos.x, 0.0, pos.z)
                        - Vec3::new(target_pos.x, 0.0, target_pos.z))
                    .normalize_or_zero();

                    // Точка орбиты: радиус дышит синусом, tangent тянет вбок
                    let wobble = (elapsed * 2.6).sin() * profile.strafe_jitter;
                    let tangent = Vec3::Y.cross(to_agent) * *dir;
                    let desired =
                        target_pos + to_agent * (orbit + wobble) + tangent * 1.25;
                    if let Some(point) = queries.sample_navigable(desired, 1.5) {
                        nav.set_destination(point);
                    }

                    *swap_timer += dt;
                    if *swap_timer >= profile.strafe_swap_time {
                        *swap_timer = 0.0;
                        *dir = -*dir;
                    }

                    // LOS-гейт: грязный луч держит ВСЕ переходы — агент
                    // кружит на орбите, пока не увидит цель чисто
                    let eye = pos + Vec3::Y * EYE_HEIGHT;
                    let chest = target_pos + Vec3::Y * TARGET_CHEST_HEIGHT;
                    let ray = chest - eye;
                    let los_dirty = profile.require_los_to_attack
                        && ray
                            .try_normalize()
                            .map(|d| queries.los_blocked(eye, d, ray.length()))
                            .unwrap_or(false);

                    if los_dirty {
                        None
                    } else if memory.attack_cooldown_timer <= 0.0
                        && dist <= profile.attack_range + 0.35
                    {
                        // Cooldown штампуется на ВХОДЕ в Attack
                        memory.attack_cooldown_timer = profile.attack_cooldown;
                        let seq = LungeSequence::begin(&mut nav, profile, target_entity);

                        log(&format!("⚔️ Агент {:?}: Strafe → Attack", entity));
                        attack_events.write(AttackStarted {
                            attacker: entity,
                            target: target_entity,
                        });
                        focus_events.write(CameraFocusRequest {
                            anchor: entity,
                            ease_in: profile.camera_ease_in,
                            hold: profile.pre_attack_face_time
                                + profile.lunge_timeout()
                                + profile.post_attack_hold,
                            track_strength: profile.camera_track_strength,
                        });
                        freeze_events.write(TargetFreezeRequest {
                            target: target_entity,
                            frozen: true,
                        });
                        Some(AgentState::Attack { seq })
                    } else if dist > profile.sight_range * 1.2 {
                        enter_return(&mut state, &mut nav, &mut memory, profile, home);
                        continue;
                    } else if dist > orbit + 2.0 {
                        Some(AgentState::Chase)
                    } else {
                        None
                    }
                }
            },

            AgentState::Attack { seq } => {
                let target_pos = target_info.map(|(_, p)| p);
                let frozen_target = seq.target;
                match seq.advance(dt, pos, target_pos, &mut nav, profile, &queries) {
                    SequenceStatus::Continue => None,
                    SequenceStatus::Done => {
                        // После рывка — всегда обратно на орбиту, не в Chase
                        freeze_events.write(TargetFreezeRequest {
                            target: frozen_target,
                            frozen: false,
                        });
                        let dir = if rng.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                        Some(AgentState::Strafe {
                            dir,
                            swap_timer: 0.0,
                        })
                    }
                    SequenceStatus::Aborted => {
                        // Заморозка снимается и при срыве секвенции
                        freeze_events.write(TargetFreezeRequest {
                            target: frozen_target,
                            frozen: false,
                        });
                        enter_return(&mut state, &mut nav, &mut memory, profile, home);
                        continue;
                    }
                }
            }

            AgentState::Flee { timer } => {
                *timer -= dt;
                nav.speed = profile.chase_speed;
                nav.resume();
                if let Some((_, target_pos)) = target_info {
                    let away = (Vec3::new(pos.x, 0.0, pos.z)
                        - Vec3::new(target_pos.x, 0.0, target_pos.z))
                    .normalize_or_zero();
                    if away.length_squared() > 0.0 {
                        // Вне navmesh — бежим к дому, не стоим на месте
                        let point =
                            queries.sample_or(pos + away * 6.0, 2.0, home.position);
                        nav.set_destination(point);
                    }
                }
                if *timer <= 0.0 {
                    enter_return(&mut state, &mut nav, &mut memory, profile, home);
                    continue;
                }
                None
            }

            AgentState::Return => {
                nav.speed = profile.patrol_speed;
                nav.stopping_distance = 0.0;
                if nav.destination.is_none() {
                    nav.set_destination(home.position);
                }
                if nav.remaining_distance(pos) <= 0.1 {
                    nav.reset_path();
                    Some(AgentState::Idle {
                        wait_timer: profile.patrol_wait,
                    })
                } else {
                    None
                }
            }

            AgentState::IdleSit { seated_timer } => {
                *seated_timer += dt;
                // Perception выдёргивает из сидения в Chase в любой момент
                // (senses); сам по себе агент встаёт после min_time
                if *seated_timer >= profile.idle_sit_min_time {
                    memory.stillness_timer = 0.0;
                    Some(AgentState::Idle {
                        wait_timer: profile.patrol_wait,
                    })
                } else {
                    None
                }
            }

            AgentState::Dead => continue,
        };

        if let Some(new_state) = next {
            *state = new_state;
        }
    }
}

/// Случайная точка патруля: равномерно по диску вокруг дома
fn pick_patrol_point(
    nav: &mut NavAgent,
    home: &HomePosition,
    pos: Vec3,
    profile: &AgentProfile,
    queries: &SpatialQueries,
    rng: &mut DeterministicRng,
) {
    let angle = rng.rng.gen_range(0.0..std::f32::consts::TAU);
    let radius = profile.patrol_radius * rng.rng.gen_range(0.0f32..1.0).sqrt();
    let candidate =
        home.position + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);

    nav.stopping_distance = 0.0;
    nav.resume();
    match queries.sample_navigable(candidate, 3.0) {
        Some(point) => nav.set_destination(point),
        // Кандидат вне navmesh — идём к дому (или стоим на месте)
        None => nav.set_destination(queries.sample_or(home.position, 2.0, pos)),
    }
}
