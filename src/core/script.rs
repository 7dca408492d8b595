/// Dialogue script: every role's full node set with fallback literals.
///
/// The script decides which nodes exist and how each one is resolved;
/// conversation templates only override the text and options of nodes
/// marked `templated`.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::schema::npc::DialogueOption;
use crate::schema::twist::{ConversationSet, Role};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("{role} script is missing node '{node}'")]
    MissingNode { role: &'static str, node: &'static str },
    #[error("{role} script defines node '{node}' which the role does not use")]
    UnknownNode { role: &'static str, node: String },
    #[error("{role} script defines node '{node}' twice")]
    DuplicateNode { role: &'static str, node: String },
    #[error("{role} node '{node}' has no options in set {set:?}")]
    NoOptions {
        role: &'static str,
        node: String,
        set: ConversationSet,
    },
    #[error("{role} node '{node}' points at unknown node '{next}'")]
    DanglingNext {
        role: &'static str,
        node: String,
        next: String,
    },
    #[error("{role} node '{node}' has an option with both nextId and action")]
    AmbiguousOption { role: &'static str, node: String },
}

/// How a node's text is produced for a twist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Styling {
    /// Template base when one exists, else the literal; styled either way.
    Templated,
    /// The literal, styled.
    Styled,
    /// The literal verbatim. Used for state-gating lines.
    Fixed,
}

/// A value that is either shared by both conversation sets or split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerSet<T> {
    Shared(T),
    PerSet { a: T, b: T },
}

impl<T> PerSet<T> {
    pub fn get(&self, set: ConversationSet) -> &T {
        match self {
            Self::Shared(value) => value,
            Self::PerSet { a, .. } if set == ConversationSet::A => a,
            Self::PerSet { b, .. } => b,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptNode {
    pub id: String,
    pub styling: Styling,
    pub text: PerSet<String>,
    pub options: PerSet<Vec<DialogueOption>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueScript {
    pub job_giver: Vec<ScriptNode>,
    pub informant: Vec<ScriptNode>,
    pub target: Vec<ScriptNode>,
}

impl DialogueScript {
    pub fn load_from_ron(path: &Path) -> Result<DialogueScript, ScriptError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<DialogueScript, ScriptError> {
        let script: DialogueScript = ron::from_str(input)?;
        script.validate()?;
        Ok(script)
    }

    /// Nodes of a role, in display order.
    pub fn nodes(&self, role: Role) -> &[ScriptNode] {
        match role {
            Role::JobGiver => &self.job_giver,
            Role::Informant => &self.informant,
            Role::Target => &self.target,
        }
    }

    /// Each role must define exactly its canonical node set, every node must
    /// offer at least one option in both sets, and every `nextId` must name
    /// a node of the same role.
    pub fn validate(&self) -> Result<(), ScriptError> {
        for role in Role::ALL {
            let canonical = role.canonical_nodes();
            let mut ids = FxHashSet::default();

            for node in self.nodes(role) {
                if !canonical.contains(&node.id.as_str()) {
                    return Err(ScriptError::UnknownNode {
                        role: role.label(),
                        node: node.id.clone(),
                    });
                }
                if !ids.insert(node.id.as_str()) {
                    return Err(ScriptError::DuplicateNode {
                        role: role.label(),
                        node: node.id.clone(),
                    });
                }

                for set in [ConversationSet::A, ConversationSet::B] {
                    let options = node.options.get(set);
                    if options.is_empty() {
                        return Err(ScriptError::NoOptions {
                            role: role.label(),
                            node: node.id.clone(),
                            set,
                        });
                    }
                    for option in options {
                        if option.next_id.is_some() && option.action.is_some() {
                            return Err(ScriptError::AmbiguousOption {
                                role: role.label(),
                                node: node.id.clone(),
                            });
                        }
                        if let Some(next) = &option.next_id {
                            if !canonical.contains(&next.as_str()) {
                                return Err(ScriptError::DanglingNext {
                                    role: role.label(),
                                    node: node.id.clone(),
                                    next: next.clone(),
                                });
                            }
                        }
                    }
                }
            }

            if let Some(missing) = canonical.iter().find(|id| !ids.contains(**id)) {
                return Err(ScriptError::MissingNode {
                    role: role.label(),
                    node: *missing,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::BUILTIN_SCRIPT;
    use crate::schema::npc::DialogueAction;

    #[test]
    fn builtin_script_loads() {
        let script = DialogueScript::parse_ron(BUILTIN_SCRIPT).unwrap();
        assert_eq!(script.nodes(Role::JobGiver).len(), 5);
        assert_eq!(script.nodes(Role::Informant).len(), 6);
        assert_eq!(script.nodes(Role::Target).len(), 5);
    }

    #[test]
    fn gating_lines_are_fixed() {
        let script = DialogueScript::parse_ron(BUILTIN_SCRIPT).unwrap();
        let styling = |role: Role, id: &str| {
            script
                .nodes(role)
                .iter()
                .find(|node| node.id == id)
                .unwrap()
                .styling
        };
        assert_eq!(styling(Role::JobGiver, "already_assigned"), Styling::Fixed);
        assert_eq!(styling(Role::Informant, "no_mission"), Styling::Fixed);
        assert_eq!(styling(Role::Informant, "already_helped"), Styling::Fixed);
        assert_eq!(styling(Role::Target, "no_info"), Styling::Fixed);
        assert_eq!(styling(Role::Informant, "warning"), Styling::Styled);
        assert_eq!(styling(Role::Target, "approach"), Styling::Templated);
    }

    #[test]
    fn per_set_selection() {
        let split = PerSet::PerSet {
            a: "alpha".to_string(),
            b: "beta".to_string(),
        };
        assert_eq!(split.get(ConversationSet::A), "alpha");
        assert_eq!(split.get(ConversationSet::B), "beta");
        let shared = PerSet::Shared(3);
        assert_eq!(*shared.get(ConversationSet::B), 3);
    }

    fn minimal_script() -> DialogueScript {
        let node = |id: &str| ScriptNode {
            id: id.to_string(),
            styling: Styling::Fixed,
            text: PerSet::Shared(format!("{} line", id)),
            options: PerSet::Shared(vec![DialogueOption::act("Bye.", DialogueAction::End)]),
        };
        DialogueScript {
            job_giver: Role::JobGiver.canonical_nodes().iter().map(|id| node(id)).collect(),
            informant: Role::Informant.canonical_nodes().iter().map(|id| node(id)).collect(),
            target: Role::Target.canonical_nodes().iter().map(|id| node(id)).collect(),
        }
    }

    #[test]
    fn minimal_script_validates() {
        assert!(minimal_script().validate().is_ok());
    }

    #[test]
    fn missing_node_rejected() {
        let mut script = minimal_script();
        script.target.retain(|node| node.id != "threat");
        assert!(matches!(
            script.validate(),
            Err(ScriptError::MissingNode { node: "threat", .. })
        ));
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut script = minimal_script();
        let again = script.informant[0].clone();
        script.informant.push(again);
        assert!(matches!(
            script.validate(),
            Err(ScriptError::DuplicateNode { .. })
        ));
    }

    #[test]
    fn empty_options_in_one_set_rejected() {
        let mut script = minimal_script();
        script.job_giver[0].options = PerSet::PerSet {
            a: vec![DialogueOption::act("Bye.", DialogueAction::End)],
            b: Vec::new(),
        };
        assert!(matches!(
            script.validate(),
            Err(ScriptError::NoOptions {
                set: ConversationSet::B,
                ..
            })
        ));
    }

    #[test]
    fn dangling_next_rejected() {
        let mut script = minimal_script();
        script.target[2].options = PerSet::Shared(vec![DialogueOption::goto("Huh?", "details")]);
        assert!(matches!(
            script.validate(),
            Err(ScriptError::DanglingNext { next, .. }) if next == "details"
        ));
    }
}
