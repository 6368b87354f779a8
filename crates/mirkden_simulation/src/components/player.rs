//! Маркер цели агентов

use bevy::prelude::*;

/// Отслеживаемая цель (игрок).
///
/// Симуляция агентов цель НЕ мутирует — единственное воздействие наружу
/// идёт через TargetFreezeRequest (presentation).
#[derive(Component, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerTarget;
