//! Session controller
//!
//! Owns the run, the entities, the seeded stream and the progression store.
//! Render and input collaborators only ever talk to [`Session`]:
//! commands in, [`Snapshot`] and per-tick [`GameEvent`]s out.
//!
//! Phases:
//! `NotStarted -> Running -> {LevelCleared -> Running | GameOver}`,
//! `Running <-> Paused`. Only `new_run` leaves `GameOver`.

use serde::{Deserialize, Serialize};

use crate::consts::CURRENCY_PER_LEVEL;
use crate::error::SessionError;
use crate::highscores::{HighScores, now_ms};
use crate::persistence::KeyValueStore;
use crate::progression::{HIGHSCORES_KEY, MetaState, ProgressionStore, RunState, UpgradeKind};
use crate::sim::{
    BrickField, Difficulty, GameEvent, MoveIntent, Playfield, Scoreboard, SeededRandomStream,
    StepOutcome, generate_level, step,
};

/// Where the session is in the run/level state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunPhase {
    #[default]
    NotStarted,
    Running,
    Paused,
    /// Field cleared, waiting for `advance_level`
    LevelCleared,
    GameOver,
}

/// Final numbers of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub seed: u32,
    pub difficulty: Difficulty,
    pub score: u64,
    pub level: u32,
    /// Leaderboard placement, if it made the board
    pub rank: Option<usize>,
}

/// Shop line for one upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpgradeOffer {
    pub kind: UpgradeKind,
    pub level: u32,
    pub max_level: u32,
    /// `None` once maxed out
    pub next_cost: Option<u64>,
    pub affordable: bool,
}

/// Read-only view handed to renderers each frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: RunPhase,
    pub playfield: Playfield,
    pub score: u64,
    pub level: u32,
    pub lives: u32,
    pub difficulty: Option<Difficulty>,
    pub currency: u64,
    pub advance_available: bool,
    pub last_run: Option<RunSummary>,
}

/// The engine's single entry point
pub struct Session<S> {
    store: ProgressionStore<S>,
    meta: MetaState,
    run: Option<RunState>,
    rng: SeededRandomStream,
    playfield: Playfield,
    phase: RunPhase,
    intent: MoveIntent,
    high_scores: HighScores,
    last_run: Option<RunSummary>,
    events: Vec<GameEvent>,
}

impl<S: KeyValueStore> Session<S> {
    /// Open a session on `backend`, loading meta-state and high scores
    pub fn new(backend: S) -> Self {
        let mut store = ProgressionStore::new(backend);
        let meta = store.load_meta();
        let high_scores: HighScores = store.load_record(HIGHSCORES_KEY);
        log::info!(
            "Session ready: {} currency, upgrades {:?}, {} high scores",
            meta.currency,
            meta.upgrades,
            high_scores.entries.len()
        );

        Self {
            store,
            playfield: Playfield::new(meta.paddle_width(), BrickField::default()),
            meta,
            run: None,
            rng: SeededRandomStream::new(0),
            phase: RunPhase::NotStarted,
            intent: MoveIntent::None,
            high_scores,
            last_run: None,
            events: Vec::new(),
        }
    }

    /// Start a fresh run at level 1. Draws a random seed if none is given.
    /// Returns the seed in use.
    pub fn new_run(&mut self, difficulty: Difficulty, seed: Option<u32>) -> u32 {
        let seed = seed.unwrap_or_else(rand::random::<u32>);
        let run = RunState::new(seed, difficulty, self.meta.starting_lives());

        self.rng.reseed(seed);
        let bricks = generate_level(run.level, difficulty, &mut self.rng);
        self.playfield = Playfield::new(self.meta.paddle_width(), bricks);
        self.run = Some(run);
        self.intent = MoveIntent::None;
        self.last_run = None;
        self.events.clear();
        self.phase = RunPhase::Running;
        self.store.save_run(&run);

        log::info!(
            "New run: seed {seed}, {difficulty}, {} lives, paddle {}",
            run.lives,
            self.playfield.paddle.width
        );
        seed
    }

    /// Advance one fixed step. Does nothing unless running.
    pub fn tick(&mut self) -> &[GameEvent] {
        self.events.clear();
        if self.phase != RunPhase::Running {
            return &self.events;
        }
        let Some(run) = self.run.as_mut() else {
            return &self.events;
        };

        self.playfield.paddle.apply_intent(self.intent);
        let mut board = Scoreboard {
            score: run.score,
            lives: run.lives,
            level: run.level,
        };
        let outcome = step(&mut self.playfield, &mut board, &mut self.events);
        run.score = board.score;
        run.lives = board.lives;

        match outcome {
            StepOutcome::GameOver => {
                self.finish_run();
                return &self.events;
            }
            StepOutcome::LifeLost => log::info!("Life lost, {} left", board.lives),
            StepOutcome::Continue => {}
        }

        if self.playfield.bricks.is_cleared() {
            self.clear_level();
        }
        &self.events
    }

    pub fn set_move_intent(&mut self, intent: MoveIntent) {
        self.intent = intent;
    }

    /// Release the ball. Returns false if not running or already in flight.
    pub fn launch(&mut self) -> bool {
        self.phase == RunPhase::Running && self.playfield.ball.launch()
    }

    /// Move on from a cleared level. Returns the new level.
    pub fn advance_level(&mut self) -> Result<u32, SessionError> {
        if self.phase != RunPhase::LevelCleared {
            return Err(SessionError::NotLevelCleared { phase: self.phase });
        }
        let Some(run) = self.run.as_mut() else {
            return Err(SessionError::NotLevelCleared { phase: self.phase });
        };
        run.level += 1;
        let (level, difficulty) = (run.level, run.difficulty);

        let bricks = generate_level(level, difficulty, &mut self.rng);
        self.playfield = Playfield::new(self.meta.paddle_width(), bricks);
        self.intent = MoveIntent::None;
        self.phase = RunPhase::Running;

        log::info!("Level {level}: {} bricks", self.playfield.bricks.len());
        Ok(level)
    }

    /// Continue the saved run.
    ///
    /// Levels 1..=N are regenerated in order from the stored seed so the
    /// stream is consumed exactly as in the first playthrough.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        if self.phase != RunPhase::NotStarted {
            return Err(SessionError::InvalidPhase {
                command: "resume",
                phase: self.phase,
            });
        }
        let Some(run) = self.store.load_run() else {
            log::info!("Nothing to resume");
            return Err(SessionError::NoSavedRun);
        };
        self.meta = self.store.load_meta();

        self.rng.reseed(run.seed);
        let mut bricks = BrickField::default();
        for level in 1..=run.level {
            bricks = generate_level(level, run.difficulty, &mut self.rng);
        }
        self.playfield = Playfield::new(self.meta.paddle_width(), bricks);
        self.run = Some(run);
        self.intent = MoveIntent::None;
        self.last_run = None;
        self.phase = RunPhase::Running;

        log::info!(
            "Resumed run: seed {}, {}, level {}, score {}, {} lives",
            run.seed,
            run.difficulty,
            run.level,
            run.score,
            run.lives
        );
        Ok(())
    }

    /// Drop the current run and its save. Meta-state is kept.
    pub fn abandon_run(&mut self) -> Result<(), SessionError> {
        match self.phase {
            RunPhase::Running | RunPhase::Paused | RunPhase::LevelCleared => {}
            phase => {
                return Err(SessionError::InvalidPhase {
                    command: "abandon run",
                    phase,
                });
            }
        }
        self.store.clear_run();
        if let Some(run) = self.run.take() {
            log::info!("Run abandoned at level {} (score {})", run.level, run.score);
        }
        self.playfield = Playfield::new(self.meta.paddle_width(), BrickField::default());
        self.intent = MoveIntent::None;
        self.phase = RunPhase::NotStarted;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.phase != RunPhase::Running {
            return Err(SessionError::InvalidPhase {
                command: "pause",
                phase: self.phase,
            });
        }
        self.phase = RunPhase::Paused;
        Ok(())
    }

    pub fn unpause(&mut self) -> Result<(), SessionError> {
        if self.phase != RunPhase::Paused {
            return Err(SessionError::InvalidPhase {
                command: "unpause",
                phase: self.phase,
            });
        }
        self.phase = RunPhase::Running;
        Ok(())
    }

    /// Buy the next tier of `kind`. Returns the new level.
    ///
    /// Takes effect from the next run start, resume or level advance.
    pub fn purchase_upgrade(&mut self, kind: UpgradeKind) -> Result<u32, SessionError> {
        match self.meta.purchase(kind) {
            Ok(level) => {
                self.store.save_meta(&self.meta);
                log::info!(
                    "Bought {kind} level {level}, {} currency left",
                    self.meta.currency
                );
                Ok(level)
            }
            Err(e) => {
                log::info!("Upgrade rejected: {e}");
                Err(e.into())
            }
        }
    }

    pub fn upgrade_offer(&self, kind: UpgradeKind) -> UpgradeOffer {
        let next_cost = self.meta.next_cost(kind);
        UpgradeOffer {
            kind,
            level: self.meta.upgrades.level(kind),
            max_level: kind.max_level(),
            next_cost,
            affordable: next_cost.is_some_and(|cost| cost <= self.meta.currency),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let (score, level, lives, difficulty) = match (&self.run, &self.last_run) {
            (Some(run), _) => (run.score, run.level, run.lives, Some(run.difficulty)),
            (None, Some(last)) => (last.score, last.level, 0, Some(last.difficulty)),
            (None, None) => (0, 0, 0, None),
        };
        Snapshot {
            phase: self.phase,
            playfield: self.playfield.clone(),
            score,
            level,
            lives,
            difficulty,
            currency: self.meta.currency,
            advance_available: self.phase == RunPhase::LevelCleared,
            last_run: self.last_run,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn meta(&self) -> &MetaState {
        &self.meta
    }

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn playfield(&self) -> &Playfield {
        &self.playfield
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Summary of the last finished run
    pub fn last_run(&self) -> Option<&RunSummary> {
        self.last_run.as_ref()
    }

    pub fn store(&self) -> &ProgressionStore<S> {
        &self.store
    }

    fn clear_level(&mut self) {
        let Some(run) = self.run else {
            return;
        };
        let reward = CURRENCY_PER_LEVEL * u64::from(run.level);

        // Saved with the next level pending so a resume starts there
        self.store.save_run(&RunState {
            level: run.level + 1,
            ..run
        });
        self.meta.credit(reward);
        self.store.save_meta(&self.meta);
        self.phase = RunPhase::LevelCleared;
        self.events.push(GameEvent::LevelCleared {
            level: run.level,
            reward,
        });

        log::info!(
            "Level {} cleared: +{reward} currency ({} total), score {}",
            run.level,
            self.meta.currency,
            run.score
        );
    }

    fn finish_run(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        self.store.clear_run();

        let rank = self
            .high_scores
            .add_score(run.score, run.level, run.difficulty, now_ms());
        if rank.is_some() {
            self.store.save_record(HIGHSCORES_KEY, &self.high_scores);
        }

        self.last_run = Some(RunSummary {
            seed: run.seed,
            difficulty: run.difficulty,
            score: run.score,
            level: run.level,
            rank,
        });
        self.intent = MoveIntent::None;
        self.phase = RunPhase::GameOver;

        log::info!(
            "Game over: score {}, level {}, rank {:?}",
            run.score,
            run.level,
            rank
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::error::PurchaseError;
    use crate::persistence::MemoryStore;
    use crate::progression::{META_KEY, RUN_KEY};
    use glam::Vec2;

    fn session() -> Session<MemoryStore> {
        Session::new(MemoryStore::new())
    }

    /// Destroy every brick, then tick so the session notices
    fn clear_current_level(session: &mut Session<MemoryStore>) {
        session.playfield.bricks.iter_mut().for_each(|b| {
            while b.alive() {
                b.hit();
            }
        });
        session.tick();
    }

    fn drop_ball_out(session: &mut Session<MemoryStore>) {
        let ball = &mut session.playfield.ball;
        ball.launched = true;
        ball.pos = Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT + 20.0);
        ball.vel = Vec2::new(0.0, 5.0);
    }

    #[test]
    fn test_new_run_initial_state() {
        let mut session = session();
        let seed = session.new_run(Difficulty::Normal, Some(7));
        assert_eq!(seed, 7);
        assert_eq!(session.phase(), RunPhase::Running);

        let run = *session.run().unwrap();
        assert_eq!(run.level, 1);
        assert_eq!(run.score, 0);
        assert_eq!(run.lives, BASE_LIVES);
        assert!(!session.playfield().bricks.is_empty());
        assert!(!session.playfield().ball.launched);
        assert!(session.store().backend().contains(RUN_KEY));
    }

    #[test]
    fn test_tick_is_noop_before_start() {
        let mut session = session();
        let before = session.snapshot();
        assert!(session.tick().is_empty());
        assert_eq!(session.snapshot(), before);
        assert!(!session.launch());
    }

    #[test]
    fn test_move_intent_moves_paddle_and_glued_ball() {
        let mut session = session();
        session.new_run(Difficulty::Easy, Some(1));
        let start = session.playfield().paddle.x;
        session.set_move_intent(MoveIntent::Left);
        session.tick();
        session.tick();
        assert_eq!(session.playfield().paddle.x, start - 2.0 * PADDLE_SPEED);
        assert_eq!(
            session.playfield().ball.pos.x,
            session.playfield().paddle.center_x()
        );
    }

    #[test]
    fn test_level_clear_rewards_and_persists() {
        let mut session = session();
        session.new_run(Difficulty::Normal, Some(3));
        clear_current_level(&mut session);

        assert_eq!(session.phase(), RunPhase::LevelCleared);
        assert!(session.snapshot().advance_available);
        assert_eq!(session.meta().currency, 10);

        let mut store = ProgressionStore::new(session.store().backend().clone());
        assert_eq!(store.load_meta().currency, 10);
        assert_eq!(store.load_run().map(|r| r.level), Some(2));

        // Frozen until advanced
        assert!(session.tick().is_empty());
        assert_eq!(session.advance_level(), Ok(2));
        assert_eq!(session.phase(), RunPhase::Running);
        assert_eq!(session.run().map(|r| r.level), Some(2));
        assert!(!session.playfield().bricks.is_cleared());
    }

    #[test]
    fn test_level_clear_event() {
        let mut session = session();
        session.new_run(Difficulty::Normal, Some(3));
        session.playfield.bricks.iter_mut().for_each(|b| {
            while b.alive() {
                b.hit();
            }
        });
        let events = session.tick().to_vec();
        assert_eq!(
            events,
            vec![GameEvent::LevelCleared {
                level: 1,
                reward: 10
            }]
        );
    }

    #[test]
    fn test_advance_rejected_unless_cleared() {
        let mut session = session();
        assert_eq!(
            session.advance_level(),
            Err(SessionError::NotLevelCleared {
                phase: RunPhase::NotStarted
            })
        );

        session.new_run(Difficulty::Normal, Some(3));
        let before = session.snapshot();
        assert_eq!(
            session.advance_level(),
            Err(SessionError::NotLevelCleared {
                phase: RunPhase::Running
            })
        );
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_resume_reproduces_advanced_layout() {
        let mut played = session();
        played.new_run(Difficulty::Hard, Some(42));
        for _ in 0..3 {
            clear_current_level(&mut played);
            played.advance_level().unwrap();
        }
        // Level 4 saved when level 3 was cleared
        assert_eq!(played.run().map(|r| r.level), Some(4));

        let mut resumed = Session::new(played.store().backend().clone());
        resumed.resume().unwrap();

        assert_eq!(resumed.phase(), RunPhase::Running);
        assert_eq!(resumed.run(), played.run());
        assert_eq!(resumed.playfield().bricks, played.playfield().bricks);
        assert_eq!(resumed.rng, played.rng);
    }

    #[test]
    fn test_resume_rejects_run_without_lives() {
        let mut session = Session::new(MemoryStore::with_entries([(
            RUN_KEY,
            r#"{"seed":3,"level":2,"score":10,"lives":0,"difficulty":"hard"}"#,
        )]));
        assert_eq!(session.resume(), Err(SessionError::NoSavedRun));
        assert_eq!(session.phase(), RunPhase::NotStarted);
    }

    #[test]
    fn test_resume_without_save() {
        let mut session = session();
        assert_eq!(session.resume(), Err(SessionError::NoSavedRun));
        assert_eq!(session.phase(), RunPhase::NotStarted);
    }

    #[test]
    fn test_last_life_ends_run() {
        let mut session = session();
        session.new_run(Difficulty::Normal, Some(5));
        if let Some(run) = session.run.as_mut() {
            run.lives = 1;
            run.score = 40;
        }
        drop_ball_out(&mut session);

        let events = session.tick().to_vec();
        assert!(events.contains(&GameEvent::LifeLost { lives_left: 0 }));
        assert!(events.contains(&GameEvent::GameOver { score: 40, level: 1 }));
        assert_eq!(session.phase(), RunPhase::GameOver);
        assert!(session.run().is_none());
        assert!(!session.store().backend().contains(RUN_KEY));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.lives, 0);
        assert_eq!(snapshot.score, 40);
        assert_eq!(session.last_run().map(|r| r.rank), Some(Some(1)));
        assert_eq!(session.high_scores().top_score(), Some(40));
    }

    #[test]
    fn test_only_new_run_leaves_game_over() {
        let mut session = session();
        session.new_run(Difficulty::Normal, Some(5));
        if let Some(run) = session.run.as_mut() {
            run.lives = 1;
        }
        drop_ball_out(&mut session);
        session.tick();
        assert_eq!(session.phase(), RunPhase::GameOver);

        assert!(session.tick().is_empty());
        assert!(!session.launch());
        assert!(session.advance_level().is_err());
        assert!(session.resume().is_err());
        assert!(session.abandon_run().is_err());
        assert!(session.pause().is_err());
        assert_eq!(session.phase(), RunPhase::GameOver);

        session.new_run(Difficulty::Normal, None);
        assert_eq!(session.phase(), RunPhase::Running);
        assert!(session.last_run().is_none());
    }

    #[test]
    fn test_life_lost_keeps_running() {
        let mut session = session();
        session.new_run(Difficulty::Normal, Some(5));
        drop_ball_out(&mut session);
        session.tick();
        assert_eq!(session.phase(), RunPhase::Running);
        assert_eq!(session.run().map(|r| r.lives), Some(BASE_LIVES - 1));
        assert!(!session.playfield().ball.launched);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut session = session();
        session.new_run(Difficulty::Normal, Some(5));
        assert!(session.launch());
        session.tick();
        session.pause().unwrap();
        let frozen = session.playfield().ball.pos;
        session.tick();
        assert_eq!(session.playfield().ball.pos, frozen);
        assert!(!session.launch());
        session.unpause().unwrap();
        session.tick();
        assert_ne!(session.playfield().ball.pos, frozen);
        assert!(session.unpause().is_err());
    }

    #[test]
    fn test_abandon_clears_saved_run() {
        let mut session = session();
        session.new_run(Difficulty::Normal, Some(5));
        session.abandon_run().unwrap();
        assert_eq!(session.phase(), RunPhase::NotStarted);
        assert!(session.run().is_none());
        assert!(!session.store().backend().contains(RUN_KEY));
        assert_eq!(session.resume(), Err(SessionError::NoSavedRun));
    }

    #[test]
    fn test_purchase_applies_from_next_run() {
        let mut session = Session::new(MemoryStore::with_entries([(
            META_KEY,
            r#"{"currency":25,"upgrades":{"paddleWidth":0,"extraLife":0}}"#,
        )]));
        session.new_run(Difficulty::Normal, Some(1));

        assert_eq!(session.purchase_upgrade(UpgradeKind::PaddleWidth), Ok(1));
        assert_eq!(session.meta().currency, 5);
        // In-progress run keeps its paddle
        assert_eq!(session.playfield().paddle.width, PADDLE_BASE_WIDTH);

        assert_eq!(
            session.purchase_upgrade(UpgradeKind::PaddleWidth),
            Err(SessionError::Purchase(PurchaseError::InsufficientFunds {
                kind: UpgradeKind::PaddleWidth,
                cost: 40,
                currency: 5,
            }))
        );

        let mut store = ProgressionStore::new(session.store().backend().clone());
        assert_eq!(store.load_meta().upgrades.paddle_width, 1);

        session.new_run(Difficulty::Normal, Some(1));
        assert_eq!(
            session.playfield().paddle.width,
            PADDLE_BASE_WIDTH + PADDLE_WIDTH_PER_LEVEL
        );
    }

    #[test]
    fn test_upgrade_bought_between_levels_widens_next_paddle() {
        let mut session = Session::new(MemoryStore::with_entries([(
            META_KEY,
            r#"{"currency":15,"upgrades":{"paddleWidth":0,"extraLife":0}}"#,
        )]));
        session.new_run(Difficulty::Normal, Some(8));
        clear_current_level(&mut session);
        assert_eq!(session.phase(), RunPhase::LevelCleared);
        assert_eq!(session.meta().currency, 25);

        assert_eq!(session.purchase_upgrade(UpgradeKind::PaddleWidth), Ok(1));
        assert_eq!(session.playfield().paddle.width, PADDLE_BASE_WIDTH);

        assert_eq!(session.advance_level(), Ok(2));
        let paddle = &session.playfield().paddle;
        assert_eq!(paddle.width, PADDLE_BASE_WIDTH + PADDLE_WIDTH_PER_LEVEL);
        assert_eq!(paddle.center_x(), FIELD_WIDTH / 2.0);
        assert_eq!(session.playfield().ball.pos.x, paddle.center_x());
    }

    #[test]
    fn test_resume_applies_stored_upgrades() {
        let mut session = Session::new(MemoryStore::with_entries([
            (META_KEY, r#"{"currency":0,"upgrades":{"paddleWidth":1,"extraLife":0}}"#),
            (
                RUN_KEY,
                r#"{"seed":4,"level":2,"score":60,"lives":2,"difficulty":"easy"}"#,
            ),
        ]));
        session.resume().unwrap();
        assert_eq!(
            session.playfield().paddle.width,
            PADDLE_BASE_WIDTH + PADDLE_WIDTH_PER_LEVEL
        );
        // Lives come from the saved run, not the upgrade
        assert_eq!(session.run().map(|r| r.lives), Some(2));
    }

    #[test]
    fn test_extra_life_raises_starting_lives() {
        let mut session = Session::new(MemoryStore::with_entries([(
            META_KEY,
            r#"{"currency":60,"upgrades":{}}"#,
        )]));
        session.purchase_upgrade(UpgradeKind::ExtraLife).unwrap();
        session.new_run(Difficulty::Easy, Some(1));
        assert_eq!(session.run().map(|r| r.lives), Some(BASE_LIVES + 1));
    }

    #[test]
    fn test_upgrade_offer() {
        let session = Session::new(MemoryStore::with_entries([(META_KEY, r#"{"currency":45}"#)]));
        let offer = session.upgrade_offer(UpgradeKind::PaddleWidth);
        assert_eq!(offer.level, 0);
        assert_eq!(offer.next_cost, Some(20));
        assert!(offer.affordable);
        assert_eq!(offer.max_level, 3);

        let offer = session.upgrade_offer(UpgradeKind::ExtraLife);
        assert_eq!(offer.next_cost, Some(50));
        assert!(!offer.affordable);
    }
}
