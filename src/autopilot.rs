//! Idle/demo mode controller
//!
//! Plays the game through the same command surface a human would use:
//! launches a glued ball and steers the paddle under the predicted landing
//! point. Deterministic for a given sequence of playfields.

use crate::sim::{MoveIntent, Playfield};

/// Commands for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutopilotInput {
    pub intent: MoveIntent,
    pub launch: bool,
}

/// Ball-tracking controller
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    ticks: u64,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide the next tick's commands from the current playfield
    pub fn decide(&mut self, field: &Playfield) -> AutopilotInput {
        self.ticks += 1;
        let ball = &field.ball;
        let paddle = &field.paddle;

        if !ball.launched {
            return AutopilotInput {
                intent: MoveIntent::None,
                launch: true,
            };
        }

        let target = if ball.vel.y > 0.0 {
            predict_landing_x(field)
        } else {
            ball.pos.x
        };

        // Oscillating aim offset keeps rebounds from locking into a vertical loop
        let time = self.ticks as f32 * 0.01;
        let offset = (time.sin() * 0.3 + (time * 0.7).sin() * 0.15) * paddle.width / 2.0;
        let delta = target - offset - paddle.center_x();

        let deadzone = paddle.speed / 2.0;
        let intent = if delta < -deadzone {
            MoveIntent::Left
        } else if delta > deadzone {
            MoveIntent::Right
        } else {
            MoveIntent::None
        };

        AutopilotInput {
            intent,
            launch: false,
        }
    }
}

/// Where a falling ball will cross the paddle's top edge, folding the
/// straight-line path back off the side walls
pub fn predict_landing_x(field: &Playfield) -> f32 {
    let ball = &field.ball;
    if ball.vel.y <= 0.0 {
        return ball.pos.x;
    }
    let ticks = ((field.paddle.y - ball.radius - ball.pos.y) / ball.vel.y).max(0.0);
    let raw_x = ball.pos.x + ball.vel.x * ticks;
    fold_into(raw_x, ball.radius, crate::consts::FIELD_WIDTH - ball.radius)
}

/// Reflect `x` back into `[lo, hi]` as if bouncing off both ends
fn fold_into(x: f32, lo: f32, hi: f32) -> f32 {
    let span = hi - lo;
    if span <= 0.0 {
        return lo;
    }
    let mut t = (x - lo).rem_euclid(2.0 * span);
    if t > span {
        t = 2.0 * span - t;
    }
    lo + t
}
