/// Save snapshots: player and mission state as camelCase JSON in a
/// key-value store keyed by username.
///
/// Loading is best-effort: saved player fields are laid over the defaults
/// one by one, and anything unreadable counts as no save at all.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::schema::player::{Mission, Player};

pub const SAVE_KEY_PREFIX: &str = "cycle_of_crime_";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save key '{0}' cannot be used as a file name")]
    InvalidKey(String),
}

/// Store key for a username's save.
pub fn save_key(username: &str) -> String {
    format!("{}{}", SAVE_KEY_PREFIX, username)
}

/// Where snapshots live. Values are opaque strings.
pub trait SaveStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SaveStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per save inside a directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Creates the directory if it does not exist yet.
    pub fn open(root: &Path) -> Result<DirStore, PersistenceError> {
        std::fs::create_dir_all(root)?;
        Ok(DirStore {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        let usable = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' '))
            && !key.starts_with('.');
        if !usable {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl SaveStore for DirStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        std::fs::write(path, value)?;
        Ok(())
    }
}

/// What gets written on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub player: Player,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_mission: Option<Mission>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Read a saved snapshot for `username`.
    ///
    /// The saved `player` object is merged onto `Player::default()` field
    /// by field and the username is forced to the login name. A missing or
    /// malformed mission is dropped.
    pub fn from_json(raw: &str, username: &str) -> Result<Snapshot, PersistenceError> {
        let data: Value = serde_json::from_str(raw)?;

        let mut player = serde_json::to_value(Player::default())?;
        if let (Value::Object(fields), Some(Value::Object(saved))) =
            (&mut player, data.get("player"))
        {
            for (key, value) in saved {
                fields.insert(key.clone(), value.clone());
            }
        }
        let mut player: Player = serde_json::from_value(player)?;
        player.username = username.to_string();

        let current_mission = match data.get("currentMission") {
            None | Some(Value::Null) => None,
            Some(value) => match serde_json::from_value::<Mission>(value.clone()) {
                Ok(mission) => Some(mission),
                Err(err) => {
                    warn!(error = %err, "dropping unreadable mission from save");
                    None
                }
            },
        };

        let timestamp = data.get("timestamp").and_then(Value::as_u64).unwrap_or(0);

        Ok(Snapshot {
            player,
            current_mission,
            timestamp,
        })
    }
}

/// Write `snapshot` under its player's key.
pub fn save(store: &mut dyn SaveStore, snapshot: &Snapshot) -> Result<(), PersistenceError> {
    let key = save_key(&snapshot.player.username);
    store.write(&key, &snapshot.to_json()?)
}

/// Load the save for `username`. Absent, unreadable and corrupt saves all
/// come back as `None`; only the latter two are logged.
pub fn load(store: &dyn SaveStore, username: &str) -> Option<Snapshot> {
    let key = save_key(username);
    let raw = match store.read(&key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(key = %key, error = %err, "save could not be read, starting fresh");
            return None;
        }
    };
    match Snapshot::from_json(&raw, username) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!(key = %key, error = %err, "corrupt save, starting fresh");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::player::{GameState, Outfit};

    fn mission() -> Mission {
        Mission {
            id: "mission_1".to_string(),
            title: "Elimination Contract".to_string(),
            description: "Find and eliminate the target. Be discrete.".to_string(),
            target_npc_id: "target2".to_string(),
            assigned_by: "undercover2".to_string(),
            is_completed: false,
            loop_number: 2,
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            player: Player {
                username: "vince".to_string(),
                outfit: Outfit::Trench,
                current_loop: 2,
                game_state: GameState::Assigned,
                ..Player::default()
            },
            current_mission: Some(mission()),
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn key_format() {
        assert_eq!(save_key("vince"), "cycle_of_crime_vince");
    }

    #[test]
    fn json_shape() {
        let json: Value = serde_json::from_str(&snapshot().to_json().unwrap()).unwrap();
        assert_eq!(json["player"]["currentLoop"], 2);
        assert_eq!(json["player"]["gameState"], "ASSIGNED");
        assert_eq!(json["currentMission"]["targetNPCId"], "target2");
        assert_eq!(json["currentMission"]["loop"], 2);
        assert_eq!(json["timestamp"], 1_700_000_000_000u64);
    }

    #[test]
    fn memory_store_saves_and_loads() {
        let mut store = MemoryStore::new();
        save(&mut store, &snapshot()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(load(&store, "vince"), Some(snapshot()));
        assert_eq!(load(&store, "nobody"), None);
    }

    #[test]
    fn partial_player_merges_onto_defaults() {
        let loaded = Snapshot::from_json(r#"{"player":{"currentLoop":4,"outfit":"casual"}}"#, "ana").unwrap();
        assert_eq!(loaded.player.current_loop, 4);
        assert_eq!(loaded.player.outfit, Outfit::Casual);
        assert_eq!(loaded.player.health, 100);
        assert_eq!(loaded.player.game_state, GameState::Login);
        assert_eq!(loaded.player.username, "ana");
        assert!(loaded.current_mission.is_none());
        assert_eq!(loaded.timestamp, 0);
    }

    #[test]
    fn username_comes_from_login() {
        let mut store = MemoryStore::new();
        store
            .write(&save_key("ana"), r#"{"player":{"username":"mallory"},"timestamp":5}"#)
            .unwrap();
        assert_eq!(load(&store, "ana").unwrap().player.username, "ana");
    }

    #[test]
    fn corrupt_saves_fall_back() {
        let mut store = MemoryStore::new();
        store.write(&save_key("ana"), "{not json").unwrap();
        assert_eq!(load(&store, "ana"), None);
        store
            .write(&save_key("ana"), r#"{"player":{"currentLoop":"many"}}"#)
            .unwrap();
        assert_eq!(load(&store, "ana"), None);
    }

    #[test]
    fn bad_mission_is_dropped() {
        let loaded = Snapshot::from_json(
            r#"{"player":{"currentLoop":2},"currentMission":{"id":3}}"#,
            "ana",
        )
        .unwrap();
        assert_eq!(loaded.player.current_loop, 2);
        assert!(loaded.current_mission.is_none());
    }

    #[test]
    fn dir_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirStore::open(&dir.path().join("saves")).unwrap();
        assert_eq!(load(&store, "vince"), None);
        save(&mut store, &snapshot()).unwrap();
        assert!(store.root().join("cycle_of_crime_vince.json").exists());
        assert_eq!(load(&store, "vince"), Some(snapshot()));
    }

    #[test]
    fn dir_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.write("../escape", "{}"),
            Err(PersistenceError::InvalidKey(_))
        ));
        assert!(store.read("a/b").is_err());
    }
}
