//! WASM bindings for cycle-of-crime, driving the browser build of the game.
//!
//! The page owns rendering and input. It polls `scene_changed` after every
//! call and re-reads `twist`/`npcs` when it returns true.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;

use cycle_of_crime::core::config::GameConfig;
use cycle_of_crime::core::machine::Step;
use cycle_of_crime::core::persistence::{save_key, MemoryStore, PersistenceError, SaveStore};
use cycle_of_crime::schema::npc::{DialogueAction, DialogueNode, Npc};
use cycle_of_crime::schema::player::{GameState, Outfit};
use cycle_of_crime::schema::twist::Twist;
use cycle_of_crime::{ChoiceOutcome, Game, Presenter};

// ---------------------------------------------------------------------------
// Shared handles between the game and the exported wrapper
// ---------------------------------------------------------------------------

/// In-memory saves the page can seed from and flush to localStorage.
#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<MemoryStore>>);

impl SaveStore for SharedStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.0.borrow().read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.0.borrow_mut().write(key, value)
    }
}

#[derive(Clone, Default)]
struct PagePresenter {
    scene_changed: Rc<Cell<bool>>,
    prompt: Rc<RefCell<Option<String>>>,
}

impl Presenter for PagePresenter {
    fn set_twist(&mut self, _twist: &Twist) {
        self.scene_changed.set(true);
    }

    fn set_npcs(&mut self, _npcs: &[Npc]) {
        self.scene_changed.set(true);
    }

    fn set_player_outfit(&mut self, _outfit: Outfit) {
        self.scene_changed.set(true);
    }

    fn interaction_prompt(&self) -> Option<String> {
        self.prompt.borrow().clone()
    }
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ChoiceInfo {
    Advanced {
        node: DialogueNode,
    },
    Closed,
    Dispatched {
        action: DialogueAction,
        accepted: bool,
        state: GameState,
    },
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct TransitionInfo {
    from: GameState,
    to: GameState,
    at_ms: u64,
}

#[derive(serde::Serialize)]
struct PreviewInfo {
    twist: Twist,
    npcs: Vec<Npc>,
}

#[derive(serde::Serialize)]
struct OutfitInfo {
    id: &'static str,
    name: &'static str,
    description: &'static str,
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// WasmGame, the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct WasmGame {
    game: Game,
    store: SharedStore,
    presenter: PagePresenter,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game with the built-in content. `config_ron` may override
    /// timings and limits; `epoch_millis` is `Date.now()` at startup.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, epoch_millis: f64, config_ron: Option<String>) -> Result<WasmGame, JsError> {
        let config = match config_ron {
            Some(src) => GameConfig::parse_ron(&src)
                .map_err(|e| JsError::new(&format!("Config parse error: {e}")))?,
            None => GameConfig::default(),
        };

        let store = SharedStore::default();
        let presenter = PagePresenter::default();
        let game = Game::builder()
            .config(config)
            .seed(seed)
            .epoch_millis(epoch_millis.max(0.0) as u64)
            .store(store.clone())
            .presenter(presenter.clone())
            .build()
            .map_err(|e| JsError::new(&format!("Game build error: {e}")))?;

        Ok(WasmGame {
            game,
            store,
            presenter,
        })
    }

    /// Seed the save for `username` before logging in, e.g. from localStorage.
    pub fn import_save(&mut self, username: &str, json: &str) -> Result<(), JsError> {
        self.store
            .write(&save_key(username.trim()), json)
            .map_err(|e| JsError::new(&format!("Save import error: {e}")))
    }

    /// Current snapshot as JSON, ready to be written to localStorage under `save_key`.
    pub fn export_save(&self) -> Result<String, JsError> {
        self.game
            .snapshot()
            .to_json()
            .map_err(|e| JsError::new(&format!("Save export error: {e}")))
    }

    /// Storage key of the logged-in player.
    pub fn save_key(&self) -> String {
        save_key(&self.game.player().username)
    }

    /// Log in. Returns true when an imported save was resumed.
    pub fn login(&mut self, username: &str) -> Result<bool, JsError> {
        self.game
            .login(username)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Open dialogue with an NPC. Returns the node as JSON, or "null" when
    /// the NPC has nothing to say.
    pub fn interact(&mut self, npc_id: &str) -> Result<String, JsError> {
        let node = self
            .game
            .interact(npc_id)
            .map_err(|e| JsError::new(&e.to_string()))?;
        to_json(&node)
    }

    /// Pick an option of the open dialogue. Returns a `kind`-tagged JSON object.
    pub fn choose(&mut self, index: usize) -> Result<String, JsError> {
        let info = match self
            .game
            .choose(index)
            .map_err(|e| JsError::new(&e.to_string()))?
        {
            ChoiceOutcome::Advanced(node) => ChoiceInfo::Advanced { node },
            ChoiceOutcome::Closed => ChoiceInfo::Closed,
            ChoiceOutcome::Dispatched { action, step } => ChoiceInfo::Dispatched {
                action,
                accepted: !matches!(step, Step::Ignored),
                state: self.game.state(),
            },
        };
        to_json(&info)
    }

    pub fn close_dialogue(&mut self) {
        self.game.close_dialogue();
    }

    /// Advance game time by `ms`. Returns the transitions that fired.
    pub fn tick(&mut self, ms: f64) -> Result<String, JsError> {
        let fired = self
            .game
            .tick(Duration::from_millis(ms.max(0.0) as u64))
            .map_err(|e| JsError::new(&e.to_string()))?;
        let fired: Vec<TransitionInfo> = fired
            .into_iter()
            .map(|t| TransitionInfo {
                from: t.from,
                to: t.to,
                at_ms: t.at.as_millis() as u64,
            })
            .collect();
        to_json(&fired)
    }

    pub fn hud(&self) -> Result<String, JsError> {
        to_json(&self.game.hud())
    }

    pub fn npcs(&self) -> Result<String, JsError> {
        to_json(&self.game.npcs())
    }

    pub fn twist(&self) -> Result<String, JsError> {
        to_json(self.game.twist())
    }

    pub fn state(&self) -> String {
        self.game.state().name().to_string()
    }

    /// True once after the twist, NPCs or outfit changed.
    pub fn scene_changed(&mut self) -> bool {
        self.presenter.scene_changed.replace(false)
    }

    /// Display name of the nearest interactable NPC, or none.
    pub fn set_interaction_prompt(&mut self, prompt: Option<String>) {
        *self.presenter.prompt.borrow_mut() = prompt;
    }

    pub fn set_player_transform(&mut self, x: f32, y: f32, z: f32, rot_y: f32) {
        use cycle_of_crime::schema::npc::Vec3;
        self.game
            .update_transform(Vec3::new(x, y, z), Vec3::new(0.0, rot_y, 0.0));
    }

    pub fn set_outfit(&mut self, outfit_id: &str) -> Result<(), JsError> {
        let outfit = Outfit::from_id(outfit_id)
            .ok_or_else(|| JsError::new(&format!("Unknown outfit: {outfit_id}")))?;
        self.game
            .set_outfit(outfit)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Return JSON array of the selectable outfits.
    pub fn outfits() -> String {
        let outfits: Vec<OutfitInfo> = Outfit::ALL
            .iter()
            .map(|outfit| OutfitInfo {
                id: outfit.id(),
                name: outfit.label(),
                description: outfit.description(),
            })
            .collect();
        serde_json::to_string(&outfits).unwrap_or_else(|_| "[]".to_string())
    }

    /// A random twist with its assembled NPCs, as JSON. Does not affect play.
    pub fn preview(&mut self) -> Result<String, JsError> {
        let (twist, npcs) = self.game.preview_random();
        to_json(&PreviewInfo {
            twist,
            npcs: npcs.to_vec(),
        })
    }
}
