use serde::{Deserialize, Serialize};

use super::npc::Vec3;

/// Progression state of the player. `Login` sits outside the gameplay loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    Login,
    Idle,
    Assigned,
    Investigating,
    Equipped,
    Busted,
    Jailed,
    Released,
}

impl GameState {
    pub const LOOP: [GameState; 7] = [
        GameState::Idle,
        GameState::Assigned,
        GameState::Investigating,
        GameState::Equipped,
        GameState::Busted,
        GameState::Jailed,
        GameState::Released,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::Idle => "IDLE",
            Self::Assigned => "ASSIGNED",
            Self::Investigating => "INVESTIGATING",
            Self::Equipped => "EQUIPPED",
            Self::Busted => "BUSTED",
            Self::Jailed => "JAILED",
            Self::Released => "RELEASED",
        }
    }

    /// States driven by the bust timer chain rather than by the player.
    pub fn is_bust_sequence(&self) -> bool {
        matches!(
            self,
            Self::Equipped | Self::Busted | Self::Jailed | Self::Released
        )
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Cosmetic outfit hint passed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outfit {
    #[default]
    Street,
    Trench,
    Prison,
    Casual,
}

impl Outfit {
    pub const ALL: [Outfit; 4] = [Outfit::Street, Outfit::Trench, Outfit::Prison, Outfit::Casual];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::Trench => "trench",
            Self::Prison => "prison",
            Self::Casual => "casual",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Street => "Street Clothes",
            Self::Trench => "Black Trench Coat",
            Self::Prison => "Orange Jumpsuit",
            Self::Casual => "Casual Wear",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Street => "Hoodie and jeans",
            Self::Trench => "For serious business",
            Self::Prison => "Fresh from jail",
            Self::Casual => "T-shirt and cargo pants",
        }
    }

    pub fn from_id(id: &str) -> Option<Outfit> {
        Self::ALL.into_iter().find(|outfit| outfit.id() == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub username: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub outfit: Outfit,
    pub health: u32,
    pub current_loop: u32,
    pub game_state: GameState,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            id: "player1".to_string(),
            username: String::new(),
            position: Vec3::default(),
            rotation: Vec3::default(),
            outfit: Outfit::Street,
            health: 100,
            current_loop: 1,
            game_state: GameState::Login,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "targetNPCId")]
    pub target_npc_id: String,
    pub assigned_by: String,
    pub is_completed: bool,
    #[serde(rename = "loop")]
    pub loop_number: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_defaults() {
        let player = Player::default();
        assert_eq!(player.current_loop, 1);
        assert_eq!(player.health, 100);
        assert_eq!(player.game_state, GameState::Login);
        assert_eq!(player.outfit, Outfit::Street);
    }

    #[test]
    fn game_state_wire_names() {
        assert_eq!(serde_json::to_string(&GameState::Investigating).unwrap(), "\"INVESTIGATING\"");
        assert_eq!(GameState::Released.to_string(), "RELEASED");
    }

    #[test]
    fn bust_sequence_states() {
        assert!(!GameState::Idle.is_bust_sequence());
        assert!(!GameState::Investigating.is_bust_sequence());
        assert!(GameState::Equipped.is_bust_sequence());
        assert!(GameState::Released.is_bust_sequence());
    }

    #[test]
    fn outfit_lookup() {
        assert_eq!(Outfit::from_id("trench"), Some(Outfit::Trench));
        assert_eq!(Outfit::from_id("tuxedo"), None);
        assert_eq!(Outfit::Prison.label(), "Orange Jumpsuit");
    }

    #[test]
    fn mission_json_field_names() {
        let mission = Mission {
            id: "mission_1".to_string(),
            title: "Elimination Contract".to_string(),
            description: String::new(),
            target_npc_id: "target1".to_string(),
            assigned_by: "undercover1".to_string(),
            is_completed: false,
            loop_number: 1,
        };
        let json = serde_json::to_value(&mission).unwrap();
        assert_eq!(json["targetNPCId"], "target1");
        assert_eq!(json["assignedBy"], "undercover1");
        assert_eq!(json["loop"], 1);
    }
}
