//! Пространственные запросы — seam между симуляцией и host-физикой.
//!
//! Симуляция не знает, кто отвечает на raycast'ы и где navmesh:
//! host engine вставляет свой провайдер в SpatialQueries. Для headless
//! тестов и бинарника по умолчанию — OpenField (пустое поле).

use bevy::prelude::*;

/// Провайдер LOS и navmesh-сэмплирования
pub trait SpatialQueryProvider: Send + Sync {
    /// Есть ли препятствие на луче origin → origin + dir * max_distance
    fn los_blocked(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> bool;

    /// Ближайшая навигабельная точка в радиусе от near (None — вне navmesh)
    fn sample_navigable(&self, near: Vec3, radius: f32) -> Option<Vec3>;
}

#[derive(Resource)]
pub struct SpatialQueries {
    provider: Box<dyn SpatialQueryProvider>,
}

impl SpatialQueries {
    pub fn new(provider: impl SpatialQueryProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
        }
    }

    pub fn los_blocked(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> bool {
        self.provider.los_blocked(origin, dir, max_distance)
    }

    pub fn sample_navigable(&self, near: Vec3, radius: f32) -> Option<Vec3> {
        self.provider.sample_navigable(near, radius)
    }

    /// Сэмпл с детерминированным fallback'ом: вне navmesh — fallback, не паника
    pub fn sample_or(&self, near: Vec3, radius: f32, fallback: Vec3) -> Vec3 {
        self.sample_navigable(near, radius).unwrap_or(fallback)
    }
}

/// Пустое поле: LOS всегда чист, навигабельна вся плоскость y=0
pub struct OpenField;

impl SpatialQueryProvider for OpenField {
    fn los_blocked(&self, _origin: Vec3, _dir: Vec3, _max_distance: f32) -> bool {
        false
    }

    fn sample_navigable(&self, near: Vec3, _radius: f32) -> Option<Vec3> {
        Some(Vec3::new(near.x, 0.0, near.z))
    }
}
