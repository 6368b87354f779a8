//! Интеграционные тесты поведения: headless-приложение, ручная
//! прокрутка FixedUpdate-тиков, прямая инспекция компонентов.

use bevy::prelude::*;

use mirkden_simulation::{
    create_headless_app, spawn_agent, step_fixed, AgentProfile, AgentState, AttackStarted,
    DamageTaken, Dead, Health, NavAgent, PlayerTarget, SimulationPlugin, SpatialQueries,
    SpatialQueryProvider, TargetFreezeRequest,
};

/// Сплошные стены: LOS всегда грязный, навигация по плоскости работает
struct SolidWalls;

impl SpatialQueryProvider for SolidWalls {
    fn los_blocked(&self, _: Vec3, _: Vec3, _: f32) -> bool {
        true
    }
    fn sample_navigable(&self, near: Vec3, _: f32) -> Option<Vec3> {
        Some(Vec3::new(near.x, 0.0, near.z))
    }
}

/// Navmesh отсутствует целиком: любой сэмпл мимо
struct VoidNavmesh;

impl SpatialQueryProvider for VoidNavmesh {
    fn los_blocked(&self, _: Vec3, _: Vec3, _: f32) -> bool {
        false
    }
    fn sample_navigable(&self, _: Vec3, _: f32) -> Option<Vec3> {
        None
    }
}

fn freeze_counts(app: &App) -> (u32, u32) {
    let events = app.world().resource::<Events<TargetFreezeRequest>>();
    let mut cursor = events.get_cursor();
    let mut frozen = 0;
    let mut released = 0;
    for event in cursor.read(events) {
        if event.frozen {
            frozen += 1;
        } else {
            released += 1;
        }
    }
    (frozen, released)
}

fn setup(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app
}

fn spawn_target(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((Transform::from_translation(position), PlayerTarget))
        .id()
}

fn state_name(app: &App, agent: Entity) -> &'static str {
    app.world().get::<AgentState>(agent).unwrap().name()
}

fn set_state(app: &mut App, agent: Entity, state: AgentState) {
    *app.world_mut().get_mut::<AgentState>(agent).unwrap() = state;
}

// Обнаружение переводит Patrol → Chase на том же тике
#[test]
fn detection_switches_to_chase_same_tick() {
    let mut app = setup(42);
    let agent = spawn_agent(app.world_mut(), Vec3::ZERO, AgentProfile::default());
    spawn_target(&mut app, Vec3::new(6.0, 0.0, 0.0));

    assert_eq!(state_name(&app, agent), "Patrol");
    step_fixed(&mut app, 1);
    assert_eq!(state_name(&app, agent), "Chase");
}

// Цель вне восприятия → last_seen копится → Return → дом → Patrol-цикл
#[test]
fn lost_target_returns_home_and_resumes_patrol() {
    let mut app = setup(42);
    let profile = AgentProfile::default();
    let home = Vec3::ZERO;
    let agent = spawn_agent(app.world_mut(), home, profile.clone());
    spawn_target(&mut app, Vec3::new(200.0, 0.0, 0.0));
    set_state(&mut app, agent, AgentState::Chase);

    // return_home_after = 6.0s при 60 Hz
    let mut saw_return = false;
    for _ in 0..400 {
        step_fixed(&mut app, 1);
        if state_name(&app, agent) == "Return" {
            saw_return = true;
            break;
        }
    }
    assert!(saw_return, "агент не ушёл в Return после потери цели");

    // Дорога домой (~20м на chase, назад на patrol_speed) + patrol-цикл
    step_fixed(&mut app, 1200);
    let state = state_name(&app, agent);
    assert!(
        state == "Idle" || state == "Patrol",
        "ожидали мирный цикл у дома, получили {}",
        state
    );

    let pos = app.world().get::<Transform>(agent).unwrap().translation;
    let dist_home = Vec3::new(pos.x, 0.0, pos.z).distance(home);
    assert!(
        dist_home <= profile.patrol_radius + 1.0,
        "агент слишком далеко от дома: {:.2}",
        dist_home
    );
}

// HP ≤ порога → Flee на том же тике; по истечении flee_time → Return
#[test]
fn low_health_triggers_flee_then_return() {
    let mut app = setup(42);
    let agent = spawn_agent(app.world_mut(), Vec3::ZERO, AgentProfile::default());
    let target = spawn_target(&mut app, Vec3::new(2.0, 0.0, 0.0));
    set_state(
        &mut app,
        agent,
        AgentState::Strafe {
            dir: 1.0,
            swap_timer: 0.0,
        },
    );
    // Cooldown взводим, чтобы Strafe не сорвался в Attack до урона
    app.world_mut()
        .get_mut::<mirkden_simulation::AgentMemory>(agent)
        .unwrap()
        .attack_cooldown_timer = 100.0;

    // 30 − 25 = 5 ≤ flee_at_hp 8
    app.world_mut().send_event(DamageTaken {
        target: agent,
        amount: 25,
    });
    step_fixed(&mut app, 1);
    assert_eq!(state_name(&app, agent), "Flee");
    assert_eq!(app.world().get::<Health>(agent).unwrap().current, 5);

    // Убираем цель, чтобы после бегства не сорвался обратно в погоню
    app.world_mut().despawn(target);

    // flee_time = 3.0s
    step_fixed(&mut app, 200);
    assert_eq!(state_name(&app, agent), "Return");
}

// Полный цикл атаки: Strafe → Attack → (face/lunge/hold) → Strafe.
// После рывка агент никогда не уходит в Chase.
#[test]
fn attack_cycle_ends_in_strafe_never_chase() {
    let mut app = setup(42);
    let agent = spawn_agent(app.world_mut(), Vec3::ZERO, AgentProfile::default());
    spawn_target(&mut app, Vec3::new(1.6, 0.0, 0.0));
    set_state(
        &mut app,
        agent,
        AgentState::Strafe {
            dir: 1.0,
            swap_timer: 0.0,
        },
    );

    let mut states = Vec::new();
    for _ in 0..400 {
        step_fixed(&mut app, 1);
        states.push(state_name(&app, agent));
    }

    let first_attack = states
        .iter()
        .position(|s| *s == "Attack")
        .expect("атака не стартовала");
    assert!(states[first_attack..].iter().any(|s| *s == "Strafe"));
    assert!(
        !states.iter().any(|s| *s == "Chase"),
        "Chase в окне атаки недопустим"
    );

    // Событие атаки ушло наружу
    let events = app.world().resource::<Events<AttackStarted>>();
    assert!(!events.is_empty());
}

// Повторные входы в Attack разнесены минимум на attack_cooldown
#[test]
fn attack_entries_respect_cooldown() {
    let mut app = setup(42);
    let profile = AgentProfile::default();
    let agent = spawn_agent(app.world_mut(), Vec3::ZERO, profile.clone());
    spawn_target(&mut app, Vec3::new(1.6, 0.0, 0.0));
    set_state(
        &mut app,
        agent,
        AgentState::Strafe {
            dir: 1.0,
            swap_timer: 0.0,
        },
    );

    let mut entry_ticks = Vec::new();
    let mut prev = "Strafe";
    for tick in 0..600u32 {
        step_fixed(&mut app, 1);
        let state = state_name(&app, agent);
        if state == "Attack" && prev != "Attack" {
            entry_ticks.push(tick);
        }
        prev = state;
    }

    assert!(
        entry_ticks.len() >= 2,
        "ожидали минимум два входа в Attack, получили {:?}",
        entry_ticks
    );
    let min_gap = (profile.attack_cooldown * 60.0) as u32;
    for pair in entry_ticks.windows(2) {
        assert!(
            pair[1] - pair[0] >= min_gap,
            "входы в Attack чаще cooldown: {:?}",
            entry_ticks
        );
    }
}

// Смерть на том же тике, absorbing: дальнейший урон и тики ничего не меняют
#[test]
fn death_is_immediate_and_absorbing() {
    let mut app = setup(42);
    let agent = spawn_agent(app.world_mut(), Vec3::ZERO, AgentProfile::default());
    spawn_target(&mut app, Vec3::new(3.0, 0.0, 0.0));

    app.world_mut().send_event(DamageTaken {
        target: agent,
        amount: 100,
    });
    step_fixed(&mut app, 1);

    assert_eq!(state_name(&app, agent), "Dead");
    assert!(app.world().get::<Dead>(agent).is_some());
    assert_eq!(app.world().get::<Health>(agent).unwrap().current, 0);

    let pos_at_death = app.world().get::<Transform>(agent).unwrap().translation;

    app.world_mut().send_event(DamageTaken {
        target: agent,
        amount: 50,
    });
    step_fixed(&mut app, 120);

    assert_eq!(state_name(&app, agent), "Dead");
    assert_eq!(app.world().get::<Health>(agent).unwrap().current, 0);
    let pos_after = app.world().get::<Transform>(agent).unwrap().translation;
    assert_eq!(pos_at_death, pos_after, "мёртвый агент сдвинулся");
}

// Смерть посреди рывка снимает заморозку цели: каждый frozen:true
// закрыт ровно одним frozen:false
#[test]
fn death_mid_attack_releases_target_freeze() {
    let mut app = setup(42);
    let agent = spawn_agent(app.world_mut(), Vec3::ZERO, AgentProfile::default());
    spawn_target(&mut app, Vec3::new(1.6, 0.0, 0.0));
    set_state(
        &mut app,
        agent,
        AgentState::Strafe {
            dir: 1.0,
            swap_timer: 0.0,
        },
    );

    step_fixed(&mut app, 1);
    assert_eq!(state_name(&app, agent), "Attack");
    let (frozen, released) = freeze_counts(&app);
    assert_eq!(frozen, 1);
    assert_eq!(released, 0);

    app.world_mut().send_event(DamageTaken {
        target: agent,
        amount: 100,
    });
    step_fixed(&mut app, 1);

    assert_eq!(state_name(&app, agent), "Dead");
    let (frozen, released) = freeze_counts(&app);
    assert_eq!(frozen, 1);
    assert_eq!(released, 1, "смерть в Attack не разморозила цель");
}

// Срыв секвенции (цель перестала отслеживаться, entity жив) тоже
// снимает заморозку
#[test]
fn aborted_attack_releases_target_freeze() {
    let mut app = setup(42);
    let agent = spawn_agent(app.world_mut(), Vec3::ZERO, AgentProfile::default());
    let target = spawn_target(&mut app, Vec3::new(1.6, 0.0, 0.0));
    set_state(
        &mut app,
        agent,
        AgentState::Strafe {
            dir: 1.0,
            swap_timer: 0.0,
        },
    );

    step_fixed(&mut app, 1);
    assert_eq!(state_name(&app, agent), "Attack");

    app.world_mut().entity_mut(target).remove::<PlayerTarget>();
    step_fixed(&mut app, 1);

    assert_eq!(state_name(&app, agent), "Return");
    let (frozen, released) = freeze_counts(&app);
    assert_eq!(frozen, 1);
    assert_eq!(released, 1, "сорванный рывок не разморозил цель");
}

// Грязный LOS держит ВСЕ переходы Strafe — и атаку, и дистанционные
// выходы в Chase/Return
#[test]
fn blocked_ray_holds_all_strafe_transitions() {
    let mut app = create_headless_app(42);
    app.insert_resource(SpatialQueries::new(SolidWalls));
    app.add_plugins(SimulationPlugin);

    let agent = spawn_agent(app.world_mut(), Vec3::ZERO, AgentProfile::default());
    // Дальше и sight_range * 1.2, и orbit + 2.0 — оба выхода взведены
    spawn_target(&mut app, Vec3::new(25.0, 0.0, 0.0));
    set_state(
        &mut app,
        agent,
        AgentState::Strafe {
            dir: 1.0,
            swap_timer: 0.0,
        },
    );

    step_fixed(&mut app, 5);
    assert_eq!(state_name(&app, agent), "Strafe");
}

// Flee вне navmesh: скорость и resume ставятся безусловно,
// fallback-точка — дом
#[test]
fn flee_off_navmesh_heads_home() {
    let mut app = create_headless_app(42);
    app.insert_resource(SpatialQueries::new(VoidNavmesh));
    app.add_plugins(SimulationPlugin);

    let home = Vec3::new(4.0, 0.0, 0.0);
    let profile = AgentProfile::default();
    let agent = spawn_agent(app.world_mut(), home, profile.clone());
    spawn_target(&mut app, Vec3::new(6.0, 0.0, 0.0));
    set_state(&mut app, agent, AgentState::Flee { timer: 2.0 });
    app.world_mut().get_mut::<NavAgent>(agent).unwrap().halt();

    step_fixed(&mut app, 1);

    let nav = app.world().get::<NavAgent>(agent).unwrap();
    assert_eq!(nav.speed, profile.chase_speed);
    assert!(!nav.is_stopped);
    assert_eq!(nav.destination, Some(home));
}

// Долгая неподвижность у дома → IdleSit; обнаружение выдёргивает в Chase
#[test]
fn idle_sit_enters_and_breaks_on_detection() {
    let mut app = setup(42);
    let profile = AgentProfile {
        patrol_radius: 1.5,
        patrol_wait: 10.0,
        idle_sit_after: 0.5,
        idle_sit_min_time: 5.0,
        ..Default::default()
    };
    let agent = spawn_agent(app.world_mut(), Vec3::ZERO, profile);

    let mut seated = false;
    for _ in 0..1200 {
        step_fixed(&mut app, 1);
        if state_name(&app, agent) == "IdleSit" {
            seated = true;
            break;
        }
    }
    assert!(seated, "агент так и не сел");

    spawn_target(&mut app, Vec3::new(3.0, 0.0, 0.0));
    step_fixed(&mut app, 1);
    assert_eq!(state_name(&app, agent), "Chase");
}

// Health никогда не превышает max и не уходит ниже нуля
#[test]
fn health_bounds_hold_under_damage() {
    let mut app = setup(42);
    let agent = spawn_agent(app.world_mut(), Vec3::ZERO, AgentProfile::default());

    for amount in [3u32, 10, 500] {
        app.world_mut().send_event(DamageTaken {
            target: agent,
            amount,
        });
        step_fixed(&mut app, 1);
        let health = app.world().get::<Health>(agent).unwrap();
        assert!(health.current <= health.max);
    }
    assert_eq!(app.world().get::<Health>(agent).unwrap().current, 0);
}
