use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::npc::NpcType;
use super::player::Outfit;

/// One of the three narrative functions every twist assigns to an NPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    JobGiver,
    Informant,
    Target,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::JobGiver, Role::Informant, Role::Target];

    /// The NPC type an assembled NPC of this role carries.
    pub fn npc_type(&self) -> NpcType {
        match self {
            Self::JobGiver => NpcType::Undercover,
            Self::Informant => NpcType::Informant,
            Self::Target => NpcType::Target,
        }
    }

    /// Dialogue node ids every assembled NPC of this role must expose.
    pub fn canonical_nodes(&self) -> &'static [&'static str] {
        match self {
            Self::JobGiver => &["intro", "details", "negotiate", "refuse", "already_assigned"],
            Self::Informant => &[
                "no_mission",
                "info",
                "hint",
                "warning",
                "trust",
                "already_helped",
            ],
            Self::Target => &["no_mission", "no_info", "approach", "casual", "threat"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::JobGiver => "jobGiver",
            Self::Informant => "informant",
            Self::Target => "target",
        }
    }
}

/// Which of the two alternating conversation scripts a twist uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConversationSet {
    A,
    B,
}

/// Dialogue styles found in the twist catalog.
///
/// Only a handful of styles carry a substitution transform; the rest,
/// including names this build does not know, render their lines unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueStyle {
    Casual,
    StreetSmart,
    Noir,
    Whispered,
    Suspicious,
    Corporate,
    Coded,
    Robotic,
    Western,
    OldWest,
    Cowboy,
    Apocalyptic,
    Desperate,
    Erratic,
    Medieval,
    OldeEnglish,
    Chivalrous,
    #[serde(other)]
    Other,
}

/// Lighting palette handed through to the renderer. Colors are packed RGB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub sky_color: u32,
    pub fog_color: u32,
    pub ambient_intensity: f32,
    pub directional_light_color: u32,
}

/// Identity an NPC wears for one twist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Identity {
    /// First whitespace-separated token of the name, used as the speaker label.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcAssignments {
    pub job_giver: Identity,
    pub informant: Identity,
    pub target: Identity,
}

impl NpcAssignments {
    pub fn for_role(&self, role: Role) -> &Identity {
        match role {
            Role::JobGiver => &self.job_giver,
            Role::Informant => &self.informant,
            Role::Target => &self.target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueVariation {
    pub personality: String,
    pub dialogue_style: DialogueStyle,
    pub suspicion_level: f32,
}

/// A themed re-skin of the world selected per loop. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Twist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub environment: Environment,
    pub player_outfit: Outfit,
    pub npc_assignments: NpcAssignments,
    #[serde(default)]
    pub npc_dialogue_variations: FxHashMap<String, DialogueVariation>,
    #[serde(default)]
    pub special_effects: Vec<String>,
    pub bust_message: String,
    pub bust_sub_message: String,
    pub jail_message: String,
    pub warning_message: String,
    pub conversation_set: ConversationSet,
}

impl Twist {
    pub fn variation(&self, npc_id: &str) -> Option<&DialogueVariation> {
        self.npc_dialogue_variations.get(npc_id)
    }
}
