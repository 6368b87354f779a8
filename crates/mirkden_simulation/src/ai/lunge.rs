//! Атакующий рывок: face → lunge → hold.
//!
//! Секвенсер живёт внутри варианта Attack и сам рулит NavAgent'ом.
//! На время рывка скорость/ускорение бустятся и восстанавливаются
//! при любом исходе (Done и Aborted).

use bevy::prelude::*;

use crate::components::{AgentProfile, NavAgent};
use crate::spatial::SpatialQueries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStatus {
    /// Секвенция продолжается
    Continue,
    /// Рывок завершён штатно → Strafe
    Done,
    /// Цель исчезла посреди рывка → Return
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub enum LungePhase {
    /// Доворот на цель, локомоция стоит
    Face { timer: f32 },
    /// Boosted-движение к точке рывка
    Lunge { timer: f32 },
    /// Пауза после рывка
    Hold { timer: f32 },
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct LungeSequence {
    pub phase: LungePhase,
    /// Цель, замороженная на время рывка. Снятие заморозки обязано
    /// произойти при ЛЮБОМ исходе секвенции, включая смерть агента,
    /// поэтому entity живёт в самой секвенции, а не в запросе цели.
    pub target: Entity,
    restore_speed: f32,
    restore_accel: f32,
    boosted: bool,
}

impl LungeSequence {
    /// Старт секвенции: стоп, сброс пути, запоминаем скорости для отката
    pub fn begin(nav: &mut NavAgent, profile: &AgentProfile, target: Entity) -> Self {
        let restore_speed = nav.speed;
        let restore_accel = nav.acceleration;
        nav.halt();
        nav.reset_path();
        Self {
            phase: LungePhase::Face {
                timer: profile.pre_attack_face_time,
            },
            target,
            restore_speed,
            restore_accel,
            boosted: false,
        }
    }

    /// Один тик секвенции. target_pos = None → цель пропала → Aborted.
    pub fn advance(
        &mut self,
        dt: f32,
        agent_pos: Vec3,
        target_pos: Option<Vec3>,
        nav: &mut NavAgent,
        profile: &AgentProfile,
        queries: &SpatialQueries,
    ) -> SequenceStatus {
        let Some(target) = target_pos else {
            self.restore(nav);
            nav.resume();
            return SequenceStatus::Aborted;
        };

        match &mut self.phase {
            LungePhase::Face { timer } => {
                *timer -= dt;
                if *timer <= 0.0 {
                    // Точка рывка: от себя к цели, не дальше lunge_distance
                    let toward = (Vec3::new(target.x, 0.0, target.z)
                        - Vec3::new(agent_pos.x, 0.0, agent_pos.z))
                    .normalize_or_zero();
                    let desired = agent_pos + toward * profile.lunge_distance;
                    let point = queries.sample_or(desired, 1.0, desired);

                    nav.speed = self.restore_speed * profile.lunge_speed_boost;
                    nav.acceleration = self.restore_accel * 1.25;
                    nav.stopping_distance = profile.keep_away_distance;
                    nav.resume();
                    nav.set_destination(point);
                    self.boosted = true;
                    self.phase = LungePhase::Lunge {
                        timer: profile.lunge_timeout(),
                    };
                }
                SequenceStatus::Continue
            }
            LungePhase::Lunge { timer } => {
                *timer -= dt;
                let arrived =
                    nav.remaining_distance(agent_pos) <= nav.stopping_distance + 0.05;
                if *timer <= 0.0 || arrived {
                    self.restore(nav);
                    nav.halt();
                    self.phase = LungePhase::Hold {
                        timer: profile.post_attack_hold,
                    };
                }
                SequenceStatus::Continue
            }
            LungePhase::Hold { timer } => {
                *timer -= dt;
                if *timer <= 0.0 {
                    nav.resume();
                    SequenceStatus::Done
                } else {
                    SequenceStatus::Continue
                }
            }
        }
    }

    fn restore(&mut self, nav: &mut NavAgent) {
        if self.boosted {
            nav.speed = self.restore_speed;
            nav.acceleration = self.restore_accel;
            self.boosted = false;
        }
    }
}
