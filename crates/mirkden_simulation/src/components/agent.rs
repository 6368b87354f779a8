//! Параметры и память агента (goblin-архетип)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Неизменяемые tunables агента — конфигурационная запись.
///
/// Задаётся при спавне, read-only во время симуляции.
/// Значения по умолчанию — базовый гоблин.
#[derive(Component, Debug, Clone, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct AgentProfile {
    // --- senses ---
    pub sight_range: f32,
    /// Полный угол конуса зрения (градусы)
    pub sight_angle: f32,
    /// Радиус слуха (3D, сквозь стены)
    pub hear_range: f32,

    // --- patrol ---
    pub patrol_radius: f32,
    /// Базовая пауза между patrol-точками (секунды, рандомизируется ×0.5..1.5)
    pub patrol_wait: f32,
    /// Минимальная планарная дистанция до цели
    pub keep_away_distance: f32,

    // --- strafe ---
    /// Желаемый радиус орбиты (клампится под attack_range, см. orbit_radius)
    pub strafe_radius: f32,
    /// Амплитуда синусоидального wobble орбиты
    pub strafe_jitter: f32,
    /// Интервал смены направления орбиты (секунды)
    pub strafe_swap_time: f32,

    // --- attack ---
    pub attack_range: f32,
    pub attack_cooldown: f32,
    /// Доворот на цель перед рывком (секунды, локомоция стоит)
    pub pre_attack_face_time: f32,
    pub lunge_distance: f32,
    /// Множитель скорости на lunge-фазе
    pub lunge_speed_boost: f32,
    /// Пауза после рывка перед возвратом в Strafe
    pub post_attack_hold: f32,
    /// Атака только при чистом LOS до цели
    pub require_los_to_attack: bool,

    // --- speeds ---
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub strafe_speed: f32,

    // --- morale / health ---
    pub max_hp: u32,
    /// Порог бегства (HP ≤ порога и не в Attack/Flee → Flee)
    pub flee_at_hp: u32,
    pub flee_time: f32,

    // --- return / idle-sit ---
    /// Потеря цели на столько секунд в Chase/Strafe → Return
    pub return_home_after: f32,
    /// Неподвижность у дома столько секунд → IdleSit
    pub idle_sit_after: f32,
    /// Минимальное время сидения перед возвратом в Patrol
    pub idle_sit_min_time: f32,

    // --- footstep loop audio ---
    pub footstep_fade_in: f32,
    pub footstep_fade_out: f32,
    /// Полная громкость внутри этой планарной дистанции до цели
    pub hear_near_distance: f32,
    /// Затухание до нуля к этой дистанции
    pub hear_far_distance: f32,
    /// 1 = линейно, >1 — медленный подъём у дальнего края
    pub hear_curve_power: f32,

    // --- camera focus (attack hold) ---
    pub camera_ease_in: f32,
    pub camera_track_strength: f32,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            sight_range: 16.0,
            sight_angle: 120.0,
            hear_range: 10.0,

            patrol_radius: 10.0,
            patrol_wait: 2.0,
            keep_away_distance: 0.8,

            strafe_radius: 1.8,
            strafe_jitter: 0.6,
            strafe_swap_time: 2.2,

            attack_range: 1.7,
            attack_cooldown: 1.1,
            pre_attack_face_time: 0.10,
            lunge_distance: 1.9,
            lunge_speed_boost: 1.35,
            post_attack_hold: 0.25,
            require_los_to_attack: true,

            patrol_speed: 2.0,
            chase_speed: 3.4,
            strafe_speed: 3.0,

            max_hp: 30,
            flee_at_hp: 8,
            flee_time: 3.0,

            return_home_after: 6.0,
            idle_sit_after: 4.0,
            idle_sit_min_time: 2.0,

            footstep_fade_in: 0.25,
            footstep_fade_out: 0.25,
            hear_near_distance: 2.5,
            hear_far_distance: 12.0,
            hear_curve_power: 1.0,

            camera_ease_in: 0.35,
            camera_track_strength: 8.0,
        }
    }
}

impl AgentProfile {
    /// Радиус орбиты strafe.
    ///
    /// Инвариант: всегда ≤ attack_range − 0.1, чтобы с орбиты можно было
    /// дотянуться до атаки без дополнительного сближения. Пол 0.15.
    pub fn orbit_radius(&self) -> f32 {
        self.strafe_radius.min(self.attack_range - 0.1).max(0.15)
    }

    /// Timeout lunge-фазы: 0.5 + дистанция / boosted speed
    pub fn lunge_timeout(&self) -> f32 {
        0.5 + self.lunge_distance / (self.strafe_speed * self.lunge_speed_boost).max(0.01)
    }
}

/// Сквозные таймеры агента (живут поверх смены состояний)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct AgentMemory {
    /// Сколько секунд цель не воспринимается (0 при каждом успехе perception)
    pub last_seen_timer: f32,
    /// Cooldown атаки: штампуется при ВХОДЕ в Attack, тикает вниз до 0
    pub attack_cooldown_timer: f32,
    /// Сколько секунд агент стоит неподвижно (для IdleSit)
    pub stillness_timer: f32,
}

/// Домашняя точка агента — центр патруля и цель Return
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HomePosition {
    pub position: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults() {
        let profile = AgentProfile::default();
        assert_eq!(profile.sight_range, 16.0);
        assert_eq!(profile.attack_cooldown, 1.1);
        assert_eq!(profile.flee_at_hp, 8);
    }

    #[test]
    fn test_orbit_radius_clamped_below_attack_range() {
        let profile = AgentProfile::default();
        // strafe_radius 1.8 > attack_range 1.7 − 0.1 → кламп
        assert!(profile.orbit_radius() <= profile.attack_range - 0.1);
        assert_eq!(profile.orbit_radius(), 1.6);
    }

    #[test]
    fn test_orbit_radius_floor() {
        let profile = AgentProfile {
            strafe_radius: 0.05,
            attack_range: 0.2,
            ..Default::default()
        };
        assert_eq!(profile.orbit_radius(), 0.15);
    }

    #[test]
    fn test_lunge_timeout() {
        let profile = AgentProfile::default();
        // 0.5 + 1.9 / (3.0 × 1.35)
        let expected = 0.5 + 1.9 / 4.05;
        assert!((profile.lunge_timeout() - expected).abs() < 1e-5);
    }
}
