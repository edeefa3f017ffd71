//! Browser facade
//!
//! Exposes the session command surface to JavaScript. The page owns the
//! canvas, DOM and `requestAnimationFrame` loop; it calls `tick()` once per
//! frame and renders from `snapshot_json()`.

use wasm_bindgen::prelude::*;

use crate::persistence::{KeyValueStore, LocalStorageStore, MemoryStore};
use crate::progression::UpgradeKind;
use crate::session::Session;
use crate::sim::{Difficulty, MoveIntent};

/// LocalStorage key prefix
const STORAGE_PREFIX: &str = "brick_run";

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Brick Run engine loaded");
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Engine handle held by the page
#[wasm_bindgen]
pub struct WebEngine {
    session: Session<Box<dyn KeyValueStore>>,
}

#[wasm_bindgen]
impl WebEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebEngine {
        let backend: Box<dyn KeyValueStore> = match LocalStorageStore::open(STORAGE_PREFIX) {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("{e}; progress will not be saved");
                Box::new(MemoryStore::new())
            }
        };
        WebEngine {
            session: Session::new(backend),
        }
    }

    /// Advance one frame. Returns the tick's events as JSON.
    pub fn tick(&mut self) -> String {
        let events = self.session.tick();
        serde_json::to_string(events).unwrap_or_else(|_| "[]".to_string())
    }

    /// Full render state as JSON
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(js_err)
    }

    /// -1 = left, 1 = right, anything else = stop
    pub fn set_move_intent(&mut self, direction: i32) {
        let intent = match direction {
            d if d < 0 => MoveIntent::Left,
            d if d > 0 => MoveIntent::Right,
            _ => MoveIntent::None,
        };
        self.session.set_move_intent(intent);
    }

    pub fn launch(&mut self) -> bool {
        self.session.launch()
    }

    /// Start a run, returns the seed in use
    pub fn new_run(&mut self, difficulty: &str, seed: Option<u32>) -> Result<u32, JsValue> {
        let difficulty = Difficulty::from_name(difficulty)
            .ok_or_else(|| js_err(format!("unknown difficulty '{difficulty}'")))?;
        Ok(self.session.new_run(difficulty, seed))
    }

    pub fn advance_level(&mut self) -> Result<u32, JsValue> {
        self.session.advance_level().map_err(js_err)
    }

    pub fn resume(&mut self) -> Result<(), JsValue> {
        self.session.resume().map_err(js_err)
    }

    pub fn abandon_run(&mut self) -> Result<(), JsValue> {
        self.session.abandon_run().map_err(js_err)
    }

    pub fn pause(&mut self) -> Result<(), JsValue> {
        self.session.pause().map_err(js_err)
    }

    pub fn unpause(&mut self) -> Result<(), JsValue> {
        self.session.unpause().map_err(js_err)
    }

    /// Buy `paddleWidth` or `extraLife`, returns the new level
    pub fn purchase_upgrade(&mut self, kind: &str) -> Result<u32, JsValue> {
        let kind = UpgradeKind::from_name(kind)
            .ok_or_else(|| js_err(format!("unknown upgrade '{kind}'")))?;
        self.session.purchase_upgrade(kind).map_err(js_err)
    }

    /// Shop lines for every upgrade as JSON
    pub fn upgrade_offers_json(&self) -> Result<String, JsValue> {
        let offers: Vec<_> = UpgradeKind::ALL
            .iter()
            .map(|&kind| self.session.upgrade_offer(kind))
            .collect();
        serde_json::to_string(&offers).map_err(js_err)
    }

    pub fn high_scores_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.high_scores()).map_err(js_err)
    }
}

impl Default for WebEngine {
    fn default() -> Self {
        Self::new()
    }
}
