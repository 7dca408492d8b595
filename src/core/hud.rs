/// HUD model: the status line, current objective and next-waypoint marker
/// derived from progression state and the active twist.

use serde::Serialize;

use crate::schema::npc::{Npc, Vec3};
use crate::schema::player::{GameState, Outfit};
use crate::schema::twist::{ConversationSet, Role, Twist};

pub fn status_text(state: GameState) -> &'static str {
    match state {
        GameState::Login => "Signing in",
        GameState::Idle => "Explore the city",
        GameState::Assigned => "Mission assigned",
        GameState::Investigating => "Investigating...",
        GameState::Equipped => "Armed and dangerous",
        GameState::Busted => "BUSTED!",
        GameState::Jailed => "Behind bars",
        GameState::Released => "Released",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Objective {
    pub title: String,
    pub description: String,
}

impl Objective {
    fn new(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// What the player should be doing in `state`. None before login.
pub fn objective(state: GameState, twist: &Twist) -> Option<Objective> {
    let first_name = |role| twist.npc_assignments.for_role(role).first_name();
    let objective = match state {
        GameState::Login => return None,
        GameState::Idle => Objective::new(
            "Find Work",
            format!("Look for {} to get a job opportunity", first_name(Role::JobGiver)),
        ),
        GameState::Assigned => Objective::new(
            "Gather Intel",
            format!(
                "Talk to {} for information about the target",
                first_name(Role::Informant)
            ),
        ),
        GameState::Investigating => Objective::new(
            "Find Target",
            format!("Locate {} and approach carefully", first_name(Role::Target)),
        ),
        GameState::Equipped => Objective::new("Oh No...", "Something's not right..."),
        GameState::Busted => Objective {
            title: twist.bust_message.clone(),
            description: twist.bust_sub_message.clone(),
        },
        GameState::Jailed => Objective::new("Locked Up", twist.jail_message.clone()),
        GameState::Released => Objective::new(
            "Freedom!",
            "Back on the streets... ready for another 'opportunity'?",
        ),
    };
    Some(objective)
}

/// Waypoint at the NPC the player should visit next.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveMarker {
    pub npc_id: String,
    pub label: String,
    pub position: Vec3,
}

pub fn objective_marker(state: GameState, npcs: &[Npc]) -> Option<ObjectiveMarker> {
    let role = match state {
        GameState::Idle => Role::JobGiver,
        GameState::Assigned => Role::Informant,
        GameState::Investigating => Role::Target,
        _ => return None,
    };
    npcs.iter()
        .find(|npc| npc.npc_type == role.npc_type())
        .map(|npc| ObjectiveMarker {
            npc_id: npc.id.clone(),
            label: npc.display_name().to_string(),
            position: npc.position,
        })
}

/// Everything a HUD renderer shows, in one serializable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudSnapshot {
    pub username: String,
    pub current_loop: u32,
    pub game_state: GameState,
    pub status: &'static str,
    pub outfit: Outfit,
    pub outfit_label: &'static str,
    pub twist_name: String,
    pub twist_description: String,
    pub conversation_set: ConversationSet,
    pub mission_title: Option<String>,
    pub objective: Option<Objective>,
    pub marker: Option<ObjectiveMarker>,
    pub interaction_prompt: Option<String>,
}
