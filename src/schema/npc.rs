use serde::{Deserialize, Serialize};

/// World coordinates. Opaque to the narrative core beyond identity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcType {
    Undercover,
    Informant,
    Target,
    Ambient,
}

/// Terminal verb on a dialogue option. Feeds the progression machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueAction {
    AcceptMission,
    Refuse,
    Investigate,
    End,
}

impl DialogueAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AcceptMission => "accept_mission",
            Self::Refuse => "refuse",
            Self::Investigate => "investigate",
            Self::End => "end",
        }
    }
}

/// A player-choosable follow-up. At most one of `next_id` and `action`
/// is set; an option with neither behaves like `end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueOption {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<DialogueAction>,
}

impl DialogueOption {
    pub fn goto(text: &str, next_id: &str) -> Self {
        Self {
            text: text.to_string(),
            next_id: Some(next_id.to_string()),
            action: None,
        }
    }

    pub fn act(text: &str, action: DialogueAction) -> Self {
        Self {
            text: text.to_string(),
            next_id: None,
            action: Some(action),
        }
    }
}

/// One line of NPC speech, already styled for the active twist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub id: String,
    pub speaker: String,
    pub text: String,
    pub options: Vec<DialogueOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub npc_type: NpcType,
    pub position: Vec3,
    pub dialogue: Vec<DialogueNode>,
    pub is_active: bool,
    pub has_interacted: bool,
}

impl Npc {
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.dialogue.iter().find(|node| node.id == id)
    }

    /// Speaker label shown in dialogue, the first token of the name.
    pub fn display_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}
