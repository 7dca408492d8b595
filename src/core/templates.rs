/// Conversation template store: the two alternating scripts (A/B) of
/// base lines and options per role.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::schema::npc::DialogueOption;
use crate::schema::twist::{ConversationSet, Role};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("set {set:?} {role} template '{node}' is not a dialogue node of that role")]
    UnknownNode {
        set: ConversationSet,
        role: &'static str,
        node: String,
    },
    #[error("set {set:?} {role} template '{node}' has no options")]
    NoOptions {
        set: ConversationSet,
        role: &'static str,
        node: String,
    },
    #[error("set {set:?} {role} template '{node}' points at unknown node '{next}'")]
    DanglingNext {
        set: ConversationSet,
        role: &'static str,
        node: String,
        next: String,
    },
    #[error("set {set:?} {role} template '{node}' has an option with both nextId and action")]
    AmbiguousOption {
        set: ConversationSet,
        role: &'static str,
        node: String,
    },
}

/// Base text and options for one node of one role in one set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTemplate {
    pub base: String,
    pub options: Vec<DialogueOption>,
}

/// Templates of one conversation set, keyed by node id per role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleTemplates {
    #[serde(default)]
    pub job_giver: FxHashMap<String, ConversationTemplate>,
    #[serde(default)]
    pub informant: FxHashMap<String, ConversationTemplate>,
    #[serde(default)]
    pub target: FxHashMap<String, ConversationTemplate>,
}

impl RoleTemplates {
    pub fn for_role(&self, role: Role) -> &FxHashMap<String, ConversationTemplate> {
        match role {
            Role::JobGiver => &self.job_giver,
            Role::Informant => &self.informant,
            Role::Target => &self.target,
        }
    }

    fn for_role_mut(&mut self, role: Role) -> &mut FxHashMap<String, ConversationTemplate> {
        match role {
            Role::JobGiver => &mut self.job_giver,
            Role::Informant => &mut self.informant,
            Role::Target => &mut self.target,
        }
    }
}

/// Static template content. Lookups may miss; callers fall back to the
/// dialogue script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateStore {
    #[serde(default)]
    pub a: RoleTemplates,
    #[serde(default)]
    pub b: RoleTemplates,
}

impl TemplateStore {
    pub fn load_from_ron(path: &Path) -> Result<TemplateStore, TemplateError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<TemplateStore, TemplateError> {
        let store: TemplateStore = ron::from_str(input)?;
        store.validate()?;
        Ok(store)
    }

    pub fn set(&self, set: ConversationSet) -> &RoleTemplates {
        match set {
            ConversationSet::A => &self.a,
            ConversationSet::B => &self.b,
        }
    }

    pub fn template(
        &self,
        set: ConversationSet,
        role: Role,
        node_id: &str,
    ) -> Option<&ConversationTemplate> {
        self.set(set).for_role(role).get(node_id)
    }

    /// Templates may only override nodes the role actually has, every
    /// override must keep at least one option, and options may only point
    /// at nodes of the same role.
    pub fn validate(&self) -> Result<(), TemplateError> {
        for set in [ConversationSet::A, ConversationSet::B] {
            for role in Role::ALL {
                for (node, template) in self.set(set).for_role(role) {
                    if !role.canonical_nodes().contains(&node.as_str()) {
                        return Err(TemplateError::UnknownNode {
                            set,
                            role: role.label(),
                            node: node.clone(),
                        });
                    }
                    if template.options.is_empty() {
                        return Err(TemplateError::NoOptions {
                            set,
                            role: role.label(),
                            node: node.clone(),
                        });
                    }
                    for option in &template.options {
                        if option.next_id.is_some() && option.action.is_some() {
                            return Err(TemplateError::AmbiguousOption {
                                set,
                                role: role.label(),
                                node: node.clone(),
                            });
                        }
                        if let Some(next) = &option.next_id {
                            if !role.canonical_nodes().contains(&next.as_str()) {
                                return Err(TemplateError::DanglingNext {
                                    set,
                                    role: role.label(),
                                    node: node.clone(),
                                    next: next.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Merge another store into this one. Templates from `other` override
    /// templates in `self` with the same set, role and node id.
    pub fn merge(&mut self, other: TemplateStore) {
        for (set, incoming) in [(ConversationSet::A, other.a), (ConversationSet::B, other.b)] {
            let target = match set {
                ConversationSet::A => &mut self.a,
                ConversationSet::B => &mut self.b,
            };
            for role in Role::ALL {
                let entries = incoming.for_role(role).clone();
                target.for_role_mut(role).extend(entries);
            }
        }
    }
}
