//! Presentation adapter: аниматор, footstep-loop, camera/freeze события.
//!
//! Симуляция пишет типизированные команды в компоненты и события —
//! host engine читает их и дёргает свой аниматор/аудио/камеру.
//! Никакого runtime-пробинга параметров аниматора: схема фиксирована.

use bevy::prelude::*;

use crate::ai::AgentState;
use crate::components::{planar_distance, AgentProfile, NavAgent, PlayerTarget};
use crate::SimSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum AnimClip {
    #[default]
    Locomotion,
    Attack,
    IdleSit,
}

/// Команды аниматору на текущий тик
#[derive(Component, Debug, Clone, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct AnimatorCommands {
    pub is_moving: bool,
    pub attack: bool,
    pub play_state: AnimClip,
}

/// Состояние footstep-лупа (host плеер читает и применяет)
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct FootstepLoop {
    pub volume: f32,
    pub target_volume: f32,
    pub pitch: f32,
    pub paused: bool,
}

impl Default for FootstepLoop {
    fn default() -> Self {
        Self {
            volume: 0.0,
            target_volume: 0.0,
            pitch: 1.0,
            paused: true,
        }
    }
}

/// Запрос фокуса камеры на агенте (на время атаки).
///
/// Восстановление камеры после hold — забота host'а, симуляция
/// restore-события не шлёт.
#[derive(Event, Debug, Clone, Copy)]
pub struct CameraFocusRequest {
    pub anchor: Entity,
    pub ease_in: f32,
    pub hold: f32,
    pub track_strength: f32,
}

/// Запрос заморозки/разморозки цели (единственное воздействие на цель)
#[derive(Event, Debug, Clone, Copy)]
pub struct TargetFreezeRequest {
    pub target: Entity,
    pub frozen: bool,
}

/// Считается ли состояние «движением» для аниматора.
///
/// Flee движением не считается: беглец играет idle-позу поверх
/// перемещения, исторический quirk поведения.
pub fn is_moving_state(state: &AgentState) -> bool {
    matches!(
        state,
        AgentState::Patrol
            | AgentState::Chase
            | AgentState::Strafe { .. }
            | AgentState::Return
    )
}

/// Команды аниматору из состояния и скорости. Pure и идемпотентна.
pub fn animator_for(state: &AgentState, planar_speed: f32) -> AnimatorCommands {
    let play_state = match state {
        AgentState::Attack { .. } => AnimClip::Attack,
        AgentState::IdleSit { .. } => AnimClip::IdleSit,
        _ => AnimClip::Locomotion,
    };
    AnimatorCommands {
        is_moving: is_moving_state(state) && planar_speed > 0.05,
        attack: matches!(state, AgentState::Attack { .. }),
        play_state,
    }
}

/// Кривая громкости по близости: 1.0 на near, 0.0 на far
pub fn proximity_factor(dist: f32, near: f32, far: f32, power: f32) -> f32 {
    if far <= near {
        // Вырожденная настройка: ступенька по near
        return if dist <= near { 1.0 } else { 0.0 };
    }
    let linear = ((far - dist) / (far - near)).clamp(0.0, 1.0);
    linear.powf(power.max(0.1))
}

/// Целевые volume/pitch/paused footstep-лупа
pub fn footstep_targets(
    state: &AgentState,
    planar_speed: f32,
    dist_to_target: Option<f32>,
    profile: &AgentProfile,
) -> (f32, f32, bool) {
    let playing = is_moving_state(state) && planar_speed > 0.05;
    if !playing {
        return (0.0, 1.0, true);
    }

    let move_factor = (planar_speed / profile.chase_speed).clamp(0.0, 1.0);
    let proximity = match dist_to_target {
        Some(dist) => proximity_factor(
            dist,
            profile.hear_near_distance,
            profile.hear_far_distance,
            profile.hear_curve_power,
        ),
        // Цели нет — слушателя нет, луп крутится тихо
        None => 0.0,
    };

    let volume = (0.25 + 0.5 * move_factor) * proximity;
    let pitch = 0.95 + 0.10 * move_factor;
    (volume, pitch, false)
}

/// Синхронизация presentation-компонентов из состояния симуляции
pub fn sync_presentation(
    mut agents: Query<
        (
            &Transform,
            &AgentProfile,
            &AgentState,
            &NavAgent,
            &mut AnimatorCommands,
            &mut FootstepLoop,
        ),
        Without<PlayerTarget>,
    >,
    target: Query<&Transform, With<PlayerTarget>>,
    time: Res<Time<Fixed>>,
) {
    let dt = time.delta_secs();
    let target_pos = target.iter().next().map(|t| t.translation);

    for (transform, profile, state, nav, mut animator, mut footstep) in agents.iter_mut() {
        let speed = nav.planar_speed();

        // Запись только при изменении — host не передёргивает аниматор
        let wanted = animator_for(state, speed);
        if *animator != wanted {
            *animator = wanted;
        }

        let dist = target_pos.map(|pos| planar_distance(transform.translation, pos));
        let (target_volume, pitch, wants_pause) = footstep_targets(state, speed, dist, profile);
        footstep.target_volume = target_volume;
        footstep.pitch = pitch;

        // Громкость едет к цели со скоростью fade
        let fade = if footstep.volume < footstep.target_volume {
            profile.footstep_fade_in
        } else {
            profile.footstep_fade_out
        };
        let rate = if fade > 0.0 { dt / fade } else { 1.0 };
        let diff = footstep.target_volume - footstep.volume;
        if diff.abs() <= rate {
            footstep.volume = footstep.target_volume;
        } else {
            footstep.volume += rate * diff.signum();
        }

        // Пауза — только после того, как fade-out доехал до нуля,
        // иначе host обрежет хвост затухания
        footstep.paused = wants_pause && footstep.volume <= 0.0;
    }
}

pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CameraFocusRequest>();
        app.add_event::<TargetFreezeRequest>();

        app.add_systems(FixedUpdate, sync_presentation.in_set(SimSet::Present));
    }
}
