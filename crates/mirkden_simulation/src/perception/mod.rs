//! Perception: слух + конус зрения с LOS.
//!
//! Pure-функция без доступа к ECS — системы зовут её с уже
//! распакованными данными, тесты зовут напрямую.

use bevy::prelude::*;

use crate::components::AgentProfile;
use crate::spatial::SpatialQueries;

/// Высота глаз агента над translation
pub const EYE_HEIGHT: f32 = 1.2;
/// Точка прицеливания на цели (грудь)
pub const TARGET_CHEST_HEIGHT: f32 = 0.9;

/// Воспринимает ли агент цель на этом тике.
///
/// Два независимых канала:
/// 1. Слух: 3D дистанция ≤ hear_range — безусловно, сквозь стены.
/// 2. Зрение: дистанция ≤ sight_range, цель в конусе sight_angle,
///    и raycast глаза → грудь не заблокирован.
pub fn perceive(
    agent_pos: Vec3,
    agent_forward: Vec3,
    profile: &AgentProfile,
    target_pos: Vec3,
    queries: &SpatialQueries,
) -> bool {
    let eye = agent_pos + Vec3::Y * EYE_HEIGHT;
    let chest = target_pos + Vec3::Y * TARGET_CHEST_HEIGHT;
    let to = chest - eye;
    let dist = to.length();

    // Слух — bubble без LOS
    if dist <= profile.hear_range {
        return true;
    }

    if dist > profile.sight_range {
        return false;
    }

    // Вырожденный случай: цель в точке глаз — зрение молчит (слух уже отработал)
    let Some(dir) = to.try_normalize() else {
        return false;
    };

    // sight_angle — полный угол конуса
    let angle = agent_forward.angle_between(to).to_degrees();
    if angle > profile.sight_angle * 0.5 {
        return false;
    }

    !queries.los_blocked(eye, dir, dist)
}
