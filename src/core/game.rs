/// The game orchestrator: owns the player, the active twist and its NPCs,
/// the open dialogue and the progression machine, and is the only place
/// narrative state changes.
///
/// Presentation is reached through the `Presenter` trait and always after
/// the state it reflects has been updated.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::content::{Content, ContentError};
use crate::core::assembler::assemble_npcs;
use crate::core::catalog::{CatalogError, TwistCatalog};
use crate::core::config::{ConfigError, GameConfig};
use crate::core::hud::{self, HudSnapshot};
use crate::core::machine::{MissionBrief, ProgressionMachine, Step, Transition};
use crate::core::navigation::{choose_option, NavigationEffect};
use crate::core::persistence::{self, MemoryStore, PersistenceError, SaveStore, Snapshot};
use crate::core::resolver::resolve_dialogue;
use crate::core::script::DialogueScript;
use crate::core::templates::TemplateStore;
use crate::schema::npc::{DialogueAction, DialogueNode, Npc, NpcType, Vec3};
use crate::schema::player::{GameState, Mission, Outfit, Player};
use crate::schema::twist::Twist;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("content error: {0}")]
    Content(#[from] ContentError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("save error: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username is {len} characters, the limit is {max}")]
    UsernameTooLong { len: usize, max: usize },
    #[error("already logged in")]
    AlreadyLoggedIn,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("no dialogue is open")]
    NoActiveDialogue,
    #[error("option {index} out of range, node has {len} options")]
    OptionOutOfRange { index: usize, len: usize },
    #[error("unknown NPC '{0}'")]
    UnknownNpc(String),
}

/// Rendering side of the game. Every method defaults to doing nothing.
pub trait Presenter {
    /// New palette, effects and identities.
    fn set_twist(&mut self, _twist: &Twist) {}
    /// Full replacement NPC list.
    fn set_npcs(&mut self, _npcs: &[Npc]) {}
    fn set_player_outfit(&mut self, _outfit: Outfit) {}
    /// Display name of the nearest interactable NPC, if any.
    fn interaction_prompt(&self) -> Option<String> {
        None
    }
}

/// Presenter for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {}

/// The NPC and node currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueSession {
    pub npc_id: String,
    pub node_id: String,
}

/// What choosing a dialogue option did.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceOutcome {
    /// Dialogue continues at this node.
    Advanced(DialogueNode),
    /// Dialogue closed without touching progression.
    Closed,
    /// Dialogue closed and the action reached the progression machine.
    Dispatched { action: DialogueAction, step: Step },
}

pub struct Game {
    config: GameConfig,
    content: Content,
    player: Player,
    twist: Twist,
    npcs: Vec<Npc>,
    machine: ProgressionMachine,
    dialogue: Option<DialogueSession>,
    store: Box<dyn SaveStore>,
    presenter: Box<dyn Presenter>,
    rng: StdRng,
    epoch_millis: u64,
    since_autosave: Duration,
}

impl Game {
    pub fn builder() -> GameBuilder {
        GameBuilder::default()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn state(&self) -> GameState {
        self.machine.state()
    }

    pub fn current_loop(&self) -> u32 {
        self.machine.current_loop()
    }

    pub fn twist(&self) -> &Twist {
        &self.twist
    }

    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn npc(&self, id: &str) -> Option<&Npc> {
        self.npcs.iter().find(|npc| npc.id == id)
    }

    pub fn mission(&self) -> Option<&Mission> {
        self.machine.mission()
    }

    pub fn machine(&self) -> &ProgressionMachine {
        &self.machine
    }

    pub fn dialogue(&self) -> Option<&DialogueSession> {
        self.dialogue.as_ref()
    }

    /// The node currently shown, if a dialogue is open.
    pub fn current_node(&self) -> Option<&DialogueNode> {
        let session = self.dialogue.as_ref()?;
        self.npc(&session.npc_id)?.node(&session.node_id)
    }

    /// Enter the game as `username`, resuming its save if one exists.
    /// Returns whether a save was resumed.
    pub fn login(&mut self, username: &str) -> Result<bool, GameError> {
        if self.machine.state() != GameState::Login {
            return Err(GameError::AlreadyLoggedIn);
        }
        let username = username.trim();
        if username.is_empty() {
            return Err(GameError::EmptyUsername);
        }
        let len = username.chars().count();
        if len > self.config.max_username_len {
            return Err(GameError::UsernameTooLong {
                len,
                max: self.config.max_username_len,
            });
        }

        self.machine.login();
        let resumed = match persistence::load(self.store.as_ref(), username) {
            Some(snapshot) => {
                self.player = snapshot.player;
                self.machine.restore(
                    self.player.game_state,
                    self.player.current_loop,
                    snapshot.current_mission,
                );
                self.sync_player();
                true
            }
            None => {
                self.player = Player {
                    username: username.to_string(),
                    ..Player::default()
                };
                self.sync_player();
                false
            }
        };
        info!(username = %username, resumed, loop_number = self.player.current_loop, "logged in");

        self.apply_twist(!resumed)?;
        if self.machine.state() == GameState::Investigating {
            self.mark_interacted(NpcType::Informant);
        }
        Ok(resumed)
    }

    /// Open the dialogue `npc_id` has for the current state. `None` means
    /// the NPC has nothing to say and no dialogue opens.
    pub fn interact(&mut self, npc_id: &str) -> Result<Option<DialogueNode>, GameError> {
        self.require_login()?;
        let npc = self
            .npc(npc_id)
            .ok_or_else(|| GameError::UnknownNpc(npc_id.to_string()))?;

        match resolve_dialogue(npc, self.machine.state()) {
            Some(node) => {
                let node = node.clone();
                debug!(npc = %npc_id, node = %node.id, "dialogue opened");
                self.dialogue = Some(DialogueSession {
                    npc_id: npc_id.to_string(),
                    node_id: node.id.clone(),
                });
                Ok(Some(node))
            }
            None => {
                debug!(npc = %npc_id, state = %self.machine.state(), "nothing to say");
                Ok(None)
            }
        }
    }

    /// Pick option `index` of the node on screen.
    pub fn choose(&mut self, index: usize) -> Result<ChoiceOutcome, GameError> {
        let session = self.dialogue.clone().ok_or(GameError::NoActiveDialogue)?;
        let npc = match self.npc(&session.npc_id) {
            Some(npc) => npc,
            None => {
                self.dialogue = None;
                return Err(GameError::UnknownNpc(session.npc_id));
            }
        };
        let node = npc.node(&session.node_id).ok_or(GameError::NoActiveDialogue)?;
        let option = node.options.get(index).ok_or(GameError::OptionOutOfRange {
            index,
            len: node.options.len(),
        })?;

        let npc_type = npc.npc_type;
        let (next, action) = match choose_option(option, npc) {
            NavigationEffect::Goto(node) => (Some(node.clone()), None),
            NavigationEffect::Close => (None, None),
            NavigationEffect::Dispatch(action) => (None, Some(action)),
        };

        match (next, action) {
            (Some(node), _) => {
                self.dialogue = Some(DialogueSession {
                    npc_id: session.npc_id,
                    node_id: node.id.clone(),
                });
                Ok(ChoiceOutcome::Advanced(node))
            }
            (None, Some(action)) => {
                self.dialogue = None;
                let step = self.dispatch(action, &session.npc_id, npc_type);
                Ok(ChoiceOutcome::Dispatched { action, step })
            }
            (None, None) => {
                self.dialogue = None;
                debug!(npc = %session.npc_id, "dialogue closed");
                Ok(ChoiceOutcome::Closed)
            }
        }
    }

    /// Close the open dialogue, if any, without choosing.
    pub fn close_dialogue(&mut self) {
        if let Some(session) = self.dialogue.take() {
            debug!(npc = %session.npc_id, "dialogue dismissed");
        }
    }

    /// Advance game time: fire due bust-sequence transitions and autosave.
    pub fn tick(&mut self, dt: Duration) -> Result<Vec<Transition>, GameError> {
        if self.machine.state() == GameState::Login {
            return Ok(Vec::new());
        }

        let fired = self.machine.advance(dt);
        for transition in &fired {
            self.player.game_state = transition.to;
            if transition.closes_loop() {
                self.sync_player();
                self.apply_twist(true)?;
            }
        }
        self.sync_player();

        self.since_autosave += dt;
        if self.since_autosave >= self.config.autosave_interval() {
            self.since_autosave = Duration::ZERO;
            if let Err(err) = self.save() {
                warn!(error = %err, "autosave failed");
            }
        }
        Ok(fired)
    }

    pub fn set_outfit(&mut self, outfit: Outfit) -> Result<(), GameError> {
        self.require_login()?;
        self.player.outfit = outfit;
        self.presenter.set_player_outfit(outfit);
        Ok(())
    }

    /// Record where the presentation layer has moved the player.
    pub fn update_transform(&mut self, position: Vec3, rotation: Vec3) {
        self.player.position = position;
        self.player.rotation = rotation;
    }

    pub fn hud(&self) -> HudSnapshot {
        let state = self.machine.state();
        HudSnapshot {
            username: self.player.username.clone(),
            current_loop: self.player.current_loop,
            game_state: state,
            status: hud::status_text(state),
            outfit: self.player.outfit,
            outfit_label: self.player.outfit.label(),
            twist_name: self.twist.name.clone(),
            twist_description: self.twist.description.clone(),
            conversation_set: self.twist.conversation_set,
            mission_title: self.machine.mission().map(|mission| mission.title.clone()),
            objective: hud::objective(state, &self.twist),
            marker: hud::objective_marker(state, &self.npcs),
            interaction_prompt: self.presenter.interaction_prompt(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let elapsed = self.machine.timeline().now().as_millis() as u64;
        Snapshot {
            player: self.player.clone(),
            current_mission: self.machine.mission().cloned(),
            timestamp: self.epoch_millis + elapsed,
        }
    }

    pub fn save(&mut self) -> Result<(), GameError> {
        self.require_login()?;
        let snapshot = self.snapshot();
        persistence::save(self.store.as_mut(), &snapshot)?;
        debug!(username = %self.player.username, "game saved");
        Ok(())
    }

    /// A random twist with its NPCs, for browsing outside the loop.
    pub fn preview_random(&mut self) -> (Twist, [Npc; 3]) {
        let twist = self.content.catalog.random_twist(&mut self.rng).clone();
        let npcs = assemble_npcs(&twist, &self.content.templates, &self.content.script);
        (twist, npcs)
    }

    fn dispatch(&mut self, action: DialogueAction, npc_id: &str, npc_type: NpcType) -> Step {
        let step = match action {
            DialogueAction::AcceptMission => self.machine.accept_mission(MissionBrief {
                assigned_by: npc_id.to_string(),
                target_npc_id: self.twist.npc_assignments.target.id.clone(),
            }),
            DialogueAction::Investigate => {
                let step = self.machine.investigate(npc_type);
                if npc_type == NpcType::Informant && step.accepted() {
                    self.mark_interacted(NpcType::Informant);
                }
                step
            }
            DialogueAction::Refuse => {
                info!(npc = %npc_id, "job refused");
                Step::Stayed(self.machine.state())
            }
            DialogueAction::End => Step::Stayed(self.machine.state()),
        };
        self.sync_player();
        step
    }

    fn mark_interacted(&mut self, npc_type: NpcType) {
        for npc in self.npcs.iter_mut().filter(|npc| npc.npc_type == npc_type) {
            npc.has_interacted = true;
        }
    }

    /// Rebuild the world for the current loop and publish it.
    fn apply_twist(&mut self, reset_outfit: bool) -> Result<(), GameError> {
        let twist = self
            .content
            .catalog
            .twist_for_loop(self.machine.current_loop())?
            .clone();
        self.npcs = assemble_npcs(&twist, &self.content.templates, &self.content.script).to_vec();
        self.twist = twist;
        self.dialogue = None;
        if reset_outfit {
            self.player.outfit = self.twist.player_outfit;
        }

        info!(
            twist = %self.twist.id,
            loop_number = self.machine.current_loop(),
            set = ?self.twist.conversation_set,
            "twist applied"
        );
        self.presenter.set_twist(&self.twist);
        self.presenter.set_npcs(&self.npcs);
        self.presenter.set_player_outfit(self.player.outfit);
        Ok(())
    }

    fn sync_player(&mut self) {
        self.player.game_state = self.machine.state();
        self.player.current_loop = self.machine.current_loop();
    }

    fn require_login(&self) -> Result<(), GameError> {
        if self.machine.state() == GameState::Login {
            return Err(GameError::NotLoggedIn);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct GameBuilder {
    config: GameConfig,
    content_dir: Option<PathBuf>,
    catalog: Option<TwistCatalog>,
    templates: Option<TemplateStore>,
    script: Option<DialogueScript>,
    store: Option<Box<dyn SaveStore>>,
    presenter: Option<Box<dyn Presenter>>,
    seed: u64,
    epoch_millis: u64,
}

impl GameBuilder {
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Directory whose content files override the built-in ones.
    pub fn content_dir(mut self, path: &str) -> Self {
        self.content_dir = Some(PathBuf::from(path));
        self
    }

    /// Provide the twist catalog directly (for testing without files).
    pub fn with_catalog(mut self, catalog: TwistCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Provide conversation templates directly (for testing without files).
    pub fn with_templates(mut self, templates: TemplateStore) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Provide the dialogue script directly (for testing without files).
    pub fn with_script(mut self, script: DialogueScript) -> Self {
        self.script = Some(script);
        self
    }

    pub fn store(mut self, store: impl SaveStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Some(Box::new(presenter));
        self
    }

    /// Seed for twist previews.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Wall-clock time at startup, used to stamp saves.
    pub fn epoch_millis(mut self, millis: u64) -> Self {
        self.epoch_millis = millis;
        self
    }

    pub fn build(self) -> Result<Game, GameError> {
        self.config.validate()?;

        let mut content = Content::builtin()?;
        if let Some(catalog) = self.catalog {
            content.catalog = catalog;
        }
        if let Some(templates) = self.templates {
            content.templates = templates;
        }
        if let Some(script) = self.script {
            content.script = script;
        }
        content.templates.validate().map_err(ContentError::from)?;
        content.script.validate().map_err(ContentError::from)?;

        // Game-specific content overrides everything above
        if let Some(dir) = &self.content_dir {
            content.apply_dir(dir)?;
        }

        let twist = content.catalog.twist_for_loop(1)?.clone();
        let npcs = assemble_npcs(&twist, &content.templates, &content.script).to_vec();
        let player = Player {
            outfit: twist.player_outfit,
            ..Player::default()
        };

        Ok(Game {
            machine: ProgressionMachine::new(self.config.timings),
            config: self.config,
            content,
            player,
            twist,
            npcs,
            dialogue: None,
            store: self.store.unwrap_or_else(|| Box::new(MemoryStore::new())),
            presenter: self.presenter.unwrap_or_else(|| Box::new(NullPresenter)),
            rng: StdRng::seed_from_u64(self.seed),
            epoch_millis: self.epoch_millis,
            since_autosave: Duration::ZERO,
        })
    }
}
