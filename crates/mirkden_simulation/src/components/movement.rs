//! Locomotion driver — собственный NavAgent поверх open-field движения.
//!
//! Семантика host-engine navigation agent'а: destination, speed,
//! acceleration, stopping_distance, is_stopped. Интеграция по велосити
//! делает drive_nav_agents в nav-модуле.

use bevy::prelude::*;

/// Планарная (XZ) дистанция — вся навигация живёт в плоскости
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Агент движения
///
/// is_stopped замораживает интеграцию, но НЕ стирает destination —
/// halt/resume обратимы без перепланирования.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    pub destination: Option<Vec3>,
    pub speed: f32,
    pub acceleration: f32,
    pub stopping_distance: f32,
    pub is_stopped: bool,
    pub velocity: Vec3,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            destination: None,
            speed: 2.0,
            acceleration: 8.0,
            stopping_distance: 0.0,
            is_stopped: false,
            velocity: Vec3::ZERO,
        }
    }
}

impl NavAgent {
    pub fn set_destination(&mut self, point: Vec3) {
        self.destination = Some(point);
    }

    /// Планарная дистанция до destination (0.0, если пути нет)
    pub fn remaining_distance(&self, from: Vec3) -> f32 {
        match self.destination {
            Some(dest) => planar_distance(from, dest),
            None => 0.0,
        }
    }

    pub fn halt(&mut self) {
        self.is_stopped = true;
    }

    pub fn resume(&mut self) {
        self.is_stopped = false;
    }

    pub fn reset_path(&mut self) {
        self.destination = None;
    }

    pub fn planar_speed(&self) -> f32 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z).length()
    }
}
