//! Standalone headless-прогон: один агент против неподвижной цели.
//!
//! Печатает смену состояний агента за ~16 секунд симуляции.

use bevy::prelude::*;

use mirkden_simulation::{
    create_headless_app, spawn_agent, step_fixed, AgentProfile, AgentState, PlayerTarget,
    SimulationPlugin,
};

fn main() {
    let mut app = create_headless_app(42);
    app.add_plugins(SimulationPlugin);

    let agent = spawn_agent(app.world_mut(), Vec3::ZERO, AgentProfile::default());
    app.world_mut().spawn((
        Transform::from_translation(Vec3::new(6.0, 0.0, 0.0)),
        PlayerTarget,
    ));

    println!("=== MIRKDEN headless run (seed 42) ===");

    let mut last_state = String::new();
    for tick in 0..1000u32 {
        step_fixed(&mut app, 1);

        let state = app
            .world()
            .get::<AgentState>(agent)
            .map(|s| s.name().to_string())
            .unwrap_or_default();
        if state != last_state {
            println!("tick {:4}: {} → {}", tick, last_state, state);
            last_state = state;
        }
    }

    println!("=== done ===");
}
