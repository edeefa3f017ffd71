//! Fixed-step physics
//!
//! One call advances the ball by one tick: integrate, clamp speed, resolve
//! walls, at most one brick, then the paddle, and finally check the bottom
//! edge for a lost life.

use glam::Vec2;

use super::collision::{Aabb, clamp_speed, paddle_hit_position};
use super::state::{GameEvent, Playfield, Scoreboard};
use crate::consts::*;

/// What the session has to react to after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// Ball fell out, lives remain, ball is back on the paddle
    LifeLost,
    /// Last life lost
    GameOver,
}

/// Advance the ball one tick against the paddle and bricks.
///
/// Score and lives on `board` are updated in place; anything notable is
/// appended to `events`.
pub fn step(
    field: &mut Playfield,
    board: &mut Scoreboard,
    events: &mut Vec<GameEvent>,
) -> StepOutcome {
    let Playfield {
        paddle,
        ball,
        bricks,
    } = field;

    if !ball.launched {
        ball.glue_to(paddle);
        return StepOutcome::Continue;
    }

    let prev_pos = ball.pos;
    ball.pos += ball.vel;
    ball.vel = clamp_speed(ball.vel, BALL_MAX_SPEED);

    // Walls: left, right, top. The bottom is open.
    if ball.pos.x - ball.radius < 0.0 {
        ball.pos.x = ball.radius;
        ball.vel.x = ball.vel.x.abs();
        events.push(GameEvent::WallHit);
    } else if ball.pos.x + ball.radius > FIELD_WIDTH {
        ball.pos.x = FIELD_WIDTH - ball.radius;
        ball.vel.x = -ball.vel.x.abs();
        events.push(GameEvent::WallHit);
    }
    if ball.pos.y - ball.radius < 0.0 {
        ball.pos.y = ball.radius;
        ball.vel.y = ball.vel.y.abs();
        events.push(GameEvent::WallHit);
    }

    // Bricks: first overlapping live brick wins
    let ball_box = Aabb::around(ball.pos, ball.radius);
    let mut brick_hit = false;
    for (index, brick) in bricks.iter_mut().enumerate() {
        if !brick.alive() || !ball_box.overlaps(&Aabb::from(&*brick)) {
            continue;
        }

        if brick.hit() {
            let score = u64::from(brick.max_hp()) * SCORE_PER_BRICK_HP;
            board.score += score;
            events.push(GameEvent::BrickDestroyed { index, score });
        } else {
            events.push(GameEvent::BrickHit { index });
        }

        ball.pos.y = if ball.vel.y > 0.0 {
            brick.y - ball.radius
        } else {
            brick.y + brick.height + ball.radius
        };
        ball.vel.y = -ball.vel.y;
        ball.vel = clamp_speed(ball.vel, BALL_MAX_SPEED);
        brick_hit = true;
        break;
    }

    // Paddle: only a falling ball whose lower edge crosses the top edge
    if !brick_hit && ball.vel.y > 0.0 {
        let bottom = ball.pos.y + ball.radius;
        let prev_bottom = prev_pos.y + ball.radius;
        let within_span = ball.pos.x >= paddle.x && ball.pos.x <= paddle.x + paddle.width;
        if within_span && prev_bottom <= paddle.y && bottom >= paddle.y {
            ball.pos.y = paddle.y - ball.radius;
            let hit_pos = paddle_hit_position(ball.pos.x, paddle);
            ball.vel = Vec2::new(hit_pos * BALL_BASE_SPEED, -ball.vel.y.abs());
            ball.vel = clamp_speed(ball.vel, BALL_MAX_SPEED);
            events.push(GameEvent::PaddleHit);
        }
    }

    if ball.pos.y - ball.radius > FIELD_HEIGHT {
        board.lives = board.lives.saturating_sub(1);
        events.push(GameEvent::LifeLost {
            lives_left: board.lives,
        });
        if board.lives == 0 {
            events.push(GameEvent::GameOver {
                score: board.score,
                level: board.level,
            });
            return StepOutcome::GameOver;
        }
        ball.reset(paddle);
        return StepOutcome::LifeLost;
    }

    StepOutcome::Continue
}
