/// Dialogue navigation: what choosing an option does.

use tracing::debug;

use crate::schema::npc::{DialogueAction, DialogueNode, DialogueOption, Npc};

/// Outcome of choosing an option in an open dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationEffect<'a> {
    /// Stay with the same NPC and show this node.
    Goto(&'a DialogueNode),
    /// Close the dialogue and hand the action to the progression machine.
    Dispatch(DialogueAction),
    /// Close the dialogue with no state effect.
    Close,
}

impl NavigationEffect<'_> {
    pub fn closes_dialogue(&self) -> bool {
        !matches!(self, NavigationEffect::Goto(_))
    }
}

pub fn choose_option<'a>(option: &DialogueOption, npc: &'a Npc) -> NavigationEffect<'a> {
    if let Some(next) = &option.next_id {
        return match npc.node(next) {
            Some(node) => {
                debug!(npc = %npc.id, node = %node.id, "dialogue advanced");
                NavigationEffect::Goto(node)
            }
            None => {
                debug!(npc = %npc.id, next = %next, "unresolved nextId, closing dialogue");
                NavigationEffect::Close
            }
        };
    }

    match option.action {
        Some(DialogueAction::End) | None => NavigationEffect::Close,
        Some(action) => NavigationEffect::Dispatch(action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::npc::{NpcType, Vec3};

    fn npc() -> Npc {
        let node = |id: &str, options| DialogueNode {
            id: id.to_string(),
            speaker: "Marcus".to_string(),
            text: format!("{} text", id),
            options,
        };
        Npc {
            id: "undercover1".to_string(),
            name: "Marcus \"The Broker\"".to_string(),
            npc_type: NpcType::Undercover,
            position: Vec3::new(10.0, 0.0, 10.0),
            dialogue: vec![
                node("intro", vec![DialogueOption::goto("Go on.", "details")]),
                node(
                    "details",
                    vec![DialogueOption::act("Count me in.", DialogueAction::AcceptMission)],
                ),
            ],
            is_active: true,
            has_interacted: false,
        }
    }

    #[test]
    fn next_id_moves_within_tree() {
        let npc = npc();
        let option = npc.node("intro").unwrap().options[0].clone();
        match choose_option(&option, &npc) {
            NavigationEffect::Goto(node) => assert_eq!(node.id, "details"),
            other => panic!("expected goto, got {:?}", other),
        }
    }

    #[test]
    fn unresolved_next_id_closes() {
        let npc = npc();
        let effect = choose_option(&DialogueOption::goto("Huh?", "backstory"), &npc);
        assert_eq!(effect, NavigationEffect::Close);
        assert!(effect.closes_dialogue());
    }

    #[test]
    fn actions_dispatch() {
        let npc = npc();
        for action in [
            DialogueAction::AcceptMission,
            DialogueAction::Refuse,
            DialogueAction::Investigate,
        ] {
            assert_eq!(
                choose_option(&DialogueOption::act("x", action), &npc),
                NavigationEffect::Dispatch(action)
            );
        }
    }

    #[test]
    fn end_and_bare_options_close() {
        let npc = npc();
        assert_eq!(
            choose_option(&DialogueOption::act("Bye.", DialogueAction::End), &npc),
            NavigationEffect::Close
        );
        let bare = DialogueOption {
            text: "...".to_string(),
            next_id: None,
            action: None,
        };
        assert_eq!(choose_option(&bare, &npc), NavigationEffect::Close);
    }
}
