//! Brick Run entry point
//!
//! Native builds run the engine headless under the autopilot, saving to a
//! directory so runs and upgrades carry over between invocations. The
//! browser build is driven from `brick_run::web` instead.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use clap::Parser;

    use brick_run::autopilot::Autopilot;
    use brick_run::persistence::{FileStore, KeyValueStore, MemoryStore};
    use brick_run::progression::{ProgressionStore, SETTINGS_KEY};
    use brick_run::sim::MoveIntent;
    use brick_run::{Difficulty, RunPhase, Session, SessionError, Settings, UpgradeKind};

    /// Headless Brick Run
    #[derive(Debug, Parser)]
    #[command(name = "brick-run", version, about)]
    struct Args {
        /// Run seed (random if omitted)
        #[arg(long)]
        seed: Option<u32>,

        /// easy, normal or hard
        #[arg(long, value_parser = parse_difficulty)]
        difficulty: Option<Difficulty>,

        /// Stop after this many ticks
        #[arg(long)]
        ticks: Option<u64>,

        /// Directory for save files (in-memory if omitted)
        #[arg(long)]
        save_dir: Option<PathBuf>,

        /// Continue the saved run instead of starting a new one
        #[arg(long)]
        resume: bool,

        /// Spend currency on upgrades before starting
        #[arg(long)]
        buy_upgrades: bool,

        /// Keep the paddle still and relaunch immediately instead of tracking the ball
        #[arg(long)]
        no_autopilot: bool,
    }

    fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
        Difficulty::from_name(s).ok_or_else(|| format!("unknown difficulty '{s}'"))
    }

    fn open_backend(save_dir: Option<PathBuf>) -> Box<dyn KeyValueStore> {
        match save_dir.map(FileStore::open) {
            Some(Ok(store)) => {
                log::info!("Saving to {}", store.dir().display());
                Box::new(store)
            }
            Some(Err(e)) => {
                log::warn!("{e}; falling back to in-memory saves");
                Box::new(MemoryStore::new())
            }
            None => Box::new(MemoryStore::new()),
        }
    }

    pub fn run() {
        env_logger::init();
        let args = Args::parse();
        log::info!("Brick Run (headless) starting...");

        let mut backend = open_backend(args.save_dir);
        let mut settings: Settings = ProgressionStore::new(&mut backend).load_record(SETTINGS_KEY);
        if let Some(difficulty) = args.difficulty {
            settings.difficulty = difficulty;
        }
        if let Some(ticks) = args.ticks {
            settings.max_ticks = ticks;
        }
        settings.auto_buy_upgrades |= args.buy_upgrades;
        if args.no_autopilot {
            settings.autopilot = false;
        }
        ProgressionStore::new(&mut backend).save_record(SETTINGS_KEY, &settings);

        let mut session = Session::new(backend);
        if settings.auto_buy_upgrades {
            buy_affordable_upgrades(&mut session);
        }

        let resumed = args.resume
            && match session.resume() {
                Ok(()) => true,
                Err(SessionError::NoSavedRun) => false,
                Err(e) => {
                    log::warn!("Resume failed: {e}");
                    false
                }
            };
        if !resumed {
            session.new_run(settings.difficulty, args.seed);
        }

        let mut pilot = Autopilot::new();
        for tick in 1..=settings.max_ticks {
            if settings.autopilot {
                let input = pilot.decide(session.playfield());
                session.set_move_intent(input.intent);
                if input.launch {
                    session.launch();
                }
            } else {
                session.set_move_intent(MoveIntent::None);
                session.launch();
            }

            session.tick();

            match session.phase() {
                RunPhase::LevelCleared if settings.auto_advance => {
                    if let Err(e) = session.advance_level() {
                        log::warn!("Advance failed: {e}");
                    }
                }
                RunPhase::LevelCleared => break,
                RunPhase::GameOver => break,
                _ => {}
            }

            if settings.report_due(tick) {
                let snapshot = session.snapshot();
                log::info!(
                    "tick {tick}: level {}, score {}, lives {}, {} bricks left",
                    snapshot.level,
                    snapshot.score,
                    snapshot.lives,
                    snapshot.playfield.bricks.alive_count()
                );
            }
        }

        let snapshot = session.snapshot();
        println!(
            "{:?}: level {}, score {}, lives {}, currency {}",
            snapshot.phase, snapshot.level, snapshot.score, snapshot.lives, snapshot.currency
        );
        if let Some(top) = session.high_scores().top_score() {
            println!("Best score: {top}");
        }
    }

    fn buy_affordable_upgrades<S: KeyValueStore>(session: &mut Session<S>) {
        for kind in UpgradeKind::ALL {
            while session.upgrade_offer(kind).affordable {
                if session.purchase_upgrade(kind).is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `brick_run::web::start`, this is just to satisfy the compiler
}
