//! MIRKDEN Simulation Core — headless-симуляция поведения агентов.
//!
//! Архитектура: strategic/tactical split.
//! - Strategic (этот crate): perception, FSM, locomotion driver,
//!   combat-мораль, presentation-команды. Bevy ECS без рендера,
//!   детерминированный FixedUpdate 60 Hz.
//! - Tactical (host engine): физика/raycast'ы через SpatialQueries,
//!   аниматор/аудио/камера через presentation-компоненты и события.
//!
//! Детерминизм: один DeterministicRng (ChaCha8, фиксированный seed),
//! никакого wall-clock в логике — одинаковый seed и одинаковые входы
//! дают бит-в-бит одинаковую траекторию симуляции.

pub mod ai;
pub mod combat;
pub mod components;
pub mod logger;
pub mod nav;
pub mod perception;
pub mod presentation;
pub mod spatial;

pub use ai::{AgentState, AttackStarted};
pub use combat::{DamageTaken, Dead, EntityDied};
pub use components::{
    AgentMemory, AgentProfile, Health, HomePosition, NavAgent, PlayerTarget,
};
pub use presentation::{
    AnimClip, AnimatorCommands, CameraFocusRequest, FootstepLoop, TargetFreezeRequest,
};
pub use spatial::{OpenField, SpatialQueries, SpatialQueryProvider};

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Порядок подсистем внутри FixedUpdate-тика.
///
/// Damage → Senses → Think → Move → Present: смерть видна perception
/// и FSM на том же тике, движение исполняет уже принятые решения.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimSet {
    Damage,
    Senses,
    Think,
    Move,
    Present,
}

/// Единственный источник случайности симуляции
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Вся симуляция одним плагином.
///
/// RNG, SpatialQueries и фиксированный таймстеп вставляются только при
/// отсутствии — host может вставить свои до добавления плагина.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<Time<Fixed>>() {
            app.insert_resource(Time::<Fixed>::from_hz(60.0));
        }
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }
        if !app.world().contains_resource::<SpatialQueries>() {
            app.insert_resource(SpatialQueries::new(OpenField));
        }

        app.configure_sets(
            FixedUpdate,
            (
                SimSet::Damage,
                SimSet::Senses,
                SimSet::Think,
                SimSet::Move,
                SimSet::Present,
            )
                .chain(),
        );

        app.add_plugins((
            combat::CombatPlugin,
            ai::AIPlugin,
            nav::NavPlugin,
            presentation::PresentationPlugin,
        ));
    }
}

/// Headless-приложение для тестов и standalone-прогона
pub fn create_headless_app(seed: u64) -> App {
    logger::init();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins.build().disable::<ScheduleRunnerPlugin>());
    app.insert_resource(DeterministicRng::new(seed));
    app.insert_resource(Time::<Fixed>::from_hz(60.0));
    app
}

/// Прокрутка ровно `ticks` FixedUpdate-тиков, без wall-clock
pub fn step_fixed(app: &mut App, ticks: u32) {
    let timestep = app
        .world()
        .resource::<Time<Fixed>>()
        .timestep();
    for _ in 0..ticks {
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(timestep);
        app.world_mut().run_schedule(FixedUpdate);
    }
}

/// Снапшот компонента по всем entity — байты для сравнения прогонов
pub fn world_snapshot<T: Component + std::fmt::Debug>(world: &mut World) -> Vec<u8> {
    let mut query = world.query::<(Entity, &T)>();
    let mut entries: Vec<(u32, String)> = query
        .iter(world)
        .map(|(entity, component)| (entity.index(), format!("{:?}", component)))
        .collect();
    entries.sort_by_key(|(index, _)| *index);

    let mut bytes = Vec::new();
    for (index, debug) in entries {
        bytes.extend_from_slice(&index.to_le_bytes());
        bytes.extend_from_slice(debug.as_bytes());
    }
    bytes
}

/// Спавн агента со всем бандлом компонентов
pub fn spawn_agent(world: &mut World, position: Vec3, profile: AgentProfile) -> Entity {
    world
        .spawn((
            Transform::from_translation(position),
            Health::new(profile.max_hp),
            HomePosition { position },
            AgentMemory::default(),
            AgentState::default(),
            NavAgent::default(),
            AnimatorCommands::default(),
            FootstepLoop::default(),
            profile,
        ))
        .id()
}
