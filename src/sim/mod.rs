//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per `tick`
//! - Seeded stream only, consumed by level generation alone
//! - Bricks tested in layout order
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod level;
pub mod rng;
pub mod state;
pub mod tick;

pub use collision::{Aabb, clamp_speed, paddle_hit_position};
pub use difficulty::{Difficulty, DifficultyProfile, Pattern};
pub use level::{base_hp, brick_width, generate_level, row_bonus};
pub use rng::SeededRandomStream;
pub use state::{Ball, Brick, BrickField, GameEvent, MoveIntent, Paddle, Playfield, Scoreboard};
pub use tick::{StepOutcome, step};
