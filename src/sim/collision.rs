//! Collision primitives
//!
//! Everything in the field is an axis-aligned rectangle, the ball included
//! (its bounding box). Overlap is strict: touching edges do not collide.

use glam::Vec2;

use super::state::{Ball, Brick, Paddle};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Bounding box of a circle
    pub fn around(center: Vec2, radius: f32) -> Self {
        Self {
            min: center - Vec2::splat(radius),
            max: center + Vec2::splat(radius),
        }
    }

    /// Overlap on both axes
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

impl From<&Brick> for Aabb {
    fn from(brick: &Brick) -> Self {
        Aabb::new(brick.x, brick.y, brick.width, brick.height)
    }
}

impl From<&Paddle> for Aabb {
    fn from(paddle: &Paddle) -> Self {
        Aabb::new(paddle.x, paddle.y, paddle.width, paddle.height)
    }
}

impl From<&Ball> for Aabb {
    fn from(ball: &Ball) -> Self {
        Aabb::around(ball.pos, ball.radius)
    }
}

/// Rescale `vel` so its magnitude is at most `max_speed`, keeping direction.
///
/// The result satisfies `length() <= max_speed` exactly in f32.
pub fn clamp_speed(vel: Vec2, max_speed: f32) -> Vec2 {
    if vel.length() <= max_speed {
        return vel;
    }
    let (x, y) = (f64::from(vel.x), f64::from(vel.y));
    let scale = f64::from(max_speed) / x.hypot(y);
    let mut clamped = Vec2::new((x * scale) as f32, (y * scale) as f32);
    // f32 rounding can still land one ulp above the cap
    while clamped.length() > max_speed {
        clamped *= 1.0 - f32::EPSILON;
    }
    clamped
}

/// Map where the ball met the paddle to `[-1, 1]`, center is 0
#[inline]
pub fn paddle_hit_position(ball_x: f32, paddle: &Paddle) -> f32 {
    let half = paddle.width / 2.0;
    if half <= 0.0 {
        return 0.0;
    }
    ((ball_x - paddle.center_x()) / half).clamp(-1.0, 1.0)
}
