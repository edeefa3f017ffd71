//! Entity model: paddle, ball, bricks
//!
//! Plain data plus the small operations that keep each entity's
//! invariants. Everything here is serializable so hosts can render
//! from a snapshot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Horizontal movement requested by the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveIntent {
    #[default]
    None,
    Left,
    Right,
}

/// The player's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Distance moved per tick
    pub speed: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self::new(PADDLE_BASE_WIDTH)
    }
}

impl Paddle {
    /// Create a paddle of `width`, horizontally centered
    pub fn new(width: f32) -> Self {
        let width = width.min(FIELD_WIDTH);
        Self {
            x: (FIELD_WIDTH - width) / 2.0,
            y: PADDLE_Y,
            width,
            height: PADDLE_HEIGHT,
            speed: PADDLE_SPEED,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Move one step according to `intent`, then clamp into the field
    pub fn apply_intent(&mut self, intent: MoveIntent) {
        match intent {
            MoveIntent::Left => self.x -= self.speed,
            MoveIntent::Right => self.x += self.speed,
            MoveIntent::None => {}
        }
        self.clamp_to_field();
    }

    /// Keep `0 <= x <= FIELD_WIDTH - width`
    pub fn clamp_to_field(&mut self) {
        self.x = self.x.clamp(0.0, (FIELD_WIDTH - self.width).max(0.0));
    }
}

/// The ball. Position is its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// False while glued to the paddle
    pub launched: bool,
}

impl Default for Ball {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            launched: false,
        }
    }
}

impl Ball {
    /// A ball glued on top of `paddle`
    pub fn on_paddle(paddle: &Paddle) -> Self {
        let mut ball = Self::default();
        ball.glue_to(paddle);
        ball
    }

    /// Center the ball just above the paddle
    pub fn glue_to(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(
            paddle.center_x(),
            paddle.y - self.radius - BALL_GLUE_GAP,
        );
    }

    /// Re-attach after a lost life
    pub fn reset(&mut self, paddle: &Paddle) {
        self.launched = false;
        self.vel = Vec2::ZERO;
        self.glue_to(paddle);
    }

    /// Release from the paddle, heading up and to the right.
    /// Returns false if already in flight.
    pub fn launch(&mut self) -> bool {
        if self.launched {
            return false;
        }
        self.vel = Vec2::new(0.6 * BALL_BASE_SPEED, -0.8 * BALL_BASE_SPEED);
        self.launched = true;
        true
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// A destructible brick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    hp: u32,
    max_hp: u32,
}

impl Brick {
    /// Fresh brick at full health. `hp` is raised to at least 1.
    pub fn new(x: f32, y: f32, width: f32, height: f32, hp: u32) -> Self {
        let hp = hp.max(1);
        Self {
            x,
            y,
            width,
            height,
            hp,
            max_hp: hp,
        }
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn alive(&self) -> bool {
        self.hp > 0
    }

    /// Take one point of damage. Returns true on the hit that destroys it.
    pub fn hit(&mut self) -> bool {
        if self.hp == 0 {
            return false;
        }
        self.hp -= 1;
        self.hp == 0
    }
}

/// Bricks for the current level, in collision-test order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrickField {
    bricks: Vec<Brick>,
}

impl BrickField {
    pub fn new(bricks: Vec<Brick>) -> Self {
        Self { bricks }
    }

    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Brick> {
        self.bricks.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive()).count()
    }

    /// True once every brick of a non-empty field is destroyed
    pub fn is_cleared(&self) -> bool {
        !self.bricks.is_empty() && self.bricks.iter().all(|b| !b.alive())
    }
}

/// Everything the physics step touches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub paddle: Paddle,
    pub ball: Ball,
    pub bricks: BrickField,
}

impl Playfield {
    /// Paddle of `paddle_width` with the ball glued on top
    pub fn new(paddle_width: f32, bricks: BrickField) -> Self {
        let paddle = Paddle::new(paddle_width);
        let ball = Ball::on_paddle(&paddle);
        Self {
            paddle,
            ball,
            bricks,
        }
    }
}

/// Counters a step updates in place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scoreboard {
    pub score: u64,
    pub lives: u32,
    /// Reported in `GameOver`, never changed by the step
    pub level: u32,
}

/// Things that happened during a tick, for audio/visual collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    WallHit,
    PaddleHit,
    /// Brick at `index` took damage and survived
    BrickHit { index: usize },
    /// Brick at `index` was destroyed, awarding `score`
    BrickDestroyed { index: usize, score: u64 },
    LifeLost { lives_left: u32 },
    LevelCleared { level: u32, reward: u64 },
    GameOver { score: u64, level: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_paddle_starts_centered() {
        let paddle = Paddle::default();
        assert_eq!(paddle.x, 350.0);
        assert_eq!(paddle.center_x(), FIELD_WIDTH / 2.0);
    }

    #[test]
    fn test_paddle_clamps_at_edges() {
        let mut paddle = Paddle::new(140.0);
        for _ in 0..200 {
            paddle.apply_intent(MoveIntent::Left);
        }
        assert_eq!(paddle.x, 0.0);
        for _ in 0..200 {
            paddle.apply_intent(MoveIntent::Right);
        }
        assert_eq!(paddle.x, FIELD_WIDTH - 140.0);
    }

    #[test]
    fn test_ball_glue_follows_paddle() {
        let mut paddle = Paddle::default();
        let mut ball = Ball::on_paddle(&paddle);
        paddle.apply_intent(MoveIntent::Right);
        ball.glue_to(&paddle);
        assert_eq!(ball.pos.x, paddle.center_x());
        assert!(ball.pos.y + ball.radius < paddle.y);
    }

    #[test]
    fn test_launch_only_once() {
        let mut ball = Ball::on_paddle(&Paddle::default());
        assert!(ball.launch());
        assert_eq!(ball.vel, Vec2::new(3.0, -4.0));
        assert!(!ball.launch());
    }

    #[test]
    fn test_brick_dies_exactly_once() {
        let mut brick = Brick::new(0.0, 0.0, 10.0, 10.0, 2);
        assert!(!brick.hit());
        assert!(brick.alive());
        assert!(brick.hit());
        assert!(!brick.alive());
        assert!(!brick.hit());
        assert_eq!(brick.hp(), 0);
        assert_eq!(brick.max_hp(), 2);
    }

    #[test]
    fn test_brick_hp_floor_is_one() {
        let brick = Brick::new(0.0, 0.0, 10.0, 10.0, 0);
        assert_eq!(brick.hp(), 1);
        assert!(brick.alive());
    }

    #[test]
    fn test_empty_field_is_not_cleared() {
        assert!(!BrickField::default().is_cleared());
        let mut field = BrickField::new(vec![Brick::new(0.0, 0.0, 1.0, 1.0, 1)]);
        assert!(!field.is_cleared());
        field.iter_mut().for_each(|b| {
            b.hit();
        });
        assert!(field.is_cleared());
        assert_eq!(field.alive_count(), 0);
    }

    fn intent_strategy() -> impl Strategy<Value = MoveIntent> {
        prop_oneof![
            Just(MoveIntent::None),
            Just(MoveIntent::Left),
            Just(MoveIntent::Right),
        ]
    }

    proptest! {
        #[test]
        fn prop_paddle_stays_in_field(
            width in 60.0f32..200.0,
            intents in proptest::collection::vec(intent_strategy(), 1..300),
        ) {
            let mut paddle = Paddle::new(width);
            for intent in intents {
                paddle.apply_intent(intent);
                prop_assert!(paddle.x >= 0.0);
                prop_assert!(paddle.x <= FIELD_WIDTH - paddle.width);
            }
        }
    }
}
