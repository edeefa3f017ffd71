//! Procedural level generation
//!
//! Each row draws one template from the difficulty's pool, then every
//! placed brick draws once for its extra-hp roll. Empty slots draw nothing.
//! Resuming a run replays this exact draw order from the seed, so any
//! change here changes every saved run's layouts.

use super::difficulty::{Difficulty, DifficultyProfile};
use super::rng::SeededRandomStream;
use super::state::{Brick, BrickField};
use crate::consts::*;

/// Width of one brick so ten columns plus padding span the field
pub fn brick_width() -> f32 {
    (FIELD_WIDTH - BRICK_PADDING * (BRICK_COLUMNS as f32 + 1.0)) / BRICK_COLUMNS as f32
}

/// Hp every brick of `level` starts from, before row bonus and extra roll
pub fn base_hp(level: u32, profile: &DifficultyProfile) -> u32 {
    let tier = 1.0 + (f64::from(level.saturating_sub(1)) * 0.7).floor();
    (tier * profile.hp_mult).ceil() as u32
}

/// Extra hp gained every second row from the top
pub fn row_bonus(row: usize, profile: &DifficultyProfile) -> u32 {
    ((row / 2) as f64 * profile.row_bonus_mult).ceil() as u32
}

/// Build the brick layout for `level` (1-based)
pub fn generate_level(
    level: u32,
    difficulty: Difficulty,
    rng: &mut SeededRandomStream,
) -> BrickField {
    let profile = difficulty.profile();
    let width = brick_width();
    let base = base_hp(level, profile);

    let mut bricks = Vec::with_capacity(profile.rows * BRICK_COLUMNS);
    for row in 0..profile.rows {
        let pattern = &profile.patterns[rng.pick_index(profile.patterns.len())];
        let y = BRICK_TOP_OFFSET + row as f32 * (BRICK_HEIGHT + BRICK_PADDING);
        let row_hp = base + row_bonus(row, profile);

        for (col, _) in pattern.iter().enumerate().filter(|(_, placed)| **placed) {
            let mut hp = row_hp;
            if rng.next_f64() < profile.extra_hp_chance {
                hp += 1;
            }
            let x = BRICK_PADDING + col as f32 * (width + BRICK_PADDING);
            bricks.push(Brick::new(x, y, width, BRICK_HEIGHT, hp));
        }
    }

    log::debug!(
        "Level {} ({}): {} bricks, base hp {}",
        level,
        difficulty,
        bricks.len(),
        base
    );
    BrickField::new(bricks)
}
