/// Interaction resolver: which dialogue node an NPC opens with, given the
/// player's progression state.

use crate::schema::npc::{DialogueNode, Npc, NpcType};
use crate::schema::player::GameState;

/// Node id an NPC of `npc_type` surfaces in `state`, or `None` when the
/// NPC has nothing to say and no dialogue should open.
pub fn select_node_id(
    npc_type: NpcType,
    state: GameState,
    has_interacted: bool,
) -> Option<&'static str> {
    use GameState::*;

    match npc_type {
        NpcType::Undercover => match state {
            Idle => Some("intro"),
            Assigned | Investigating | Equipped | Busted | Jailed | Released => {
                Some("already_assigned")
            }
            Login => None,
        },
        NpcType::Informant => match state {
            Idle => Some("no_mission"),
            Assigned => Some("info"),
            Investigating if has_interacted => Some("already_helped"),
            Investigating => Some("info"),
            _ => None,
        },
        NpcType::Target => match state {
            Idle => Some("no_mission"),
            Assigned => Some("no_info"),
            Investigating => Some("approach"),
            _ => None,
        },
        NpcType::Ambient => None,
    }
}

/// The node to open for `npc`, using its own interaction flag.
pub fn resolve_dialogue(npc: &Npc, state: GameState) -> Option<&DialogueNode> {
    select_node_id(npc.npc_type, state, npc.has_interacted).and_then(|id| npc.node(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::twist::Role;

    const ALL_STATES: [GameState; 8] = [
        GameState::Login,
        GameState::Idle,
        GameState::Assigned,
        GameState::Investigating,
        GameState::Equipped,
        GameState::Busted,
        GameState::Jailed,
        GameState::Released,
    ];

    #[test]
    fn selection_is_total_and_canonical() {
        for role in Role::ALL {
            for state in ALL_STATES {
                for has_interacted in [false, true] {
                    if let Some(id) = select_node_id(role.npc_type(), state, has_interacted) {
                        assert!(
                            role.canonical_nodes().contains(&id),
                            "{:?} in {} picked {}",
                            role,
                            state,
                            id
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn undercover_table() {
        assert_eq!(select_node_id(NpcType::Undercover, GameState::Idle, false), Some("intro"));
        for state in GameState::LOOP.into_iter().skip(1) {
            assert_eq!(
                select_node_id(NpcType::Undercover, state, true),
                Some("already_assigned")
            );
        }
        assert_eq!(select_node_id(NpcType::Undercover, GameState::Login, false), None);
    }

    #[test]
    fn informant_table() {
        let pick = |state, seen| select_node_id(NpcType::Informant, state, seen);
        assert_eq!(pick(GameState::Idle, false), Some("no_mission"));
        assert_eq!(pick(GameState::Assigned, false), Some("info"));
        assert_eq!(pick(GameState::Assigned, true), Some("info"));
        assert_eq!(pick(GameState::Investigating, false), Some("info"));
        assert_eq!(pick(GameState::Investigating, true), Some("already_helped"));
        for state in [GameState::Equipped, GameState::Busted, GameState::Jailed, GameState::Released] {
            assert_eq!(pick(state, false), None);
        }
    }

    #[test]
    fn target_table() {
        let pick = |state| select_node_id(NpcType::Target, state, false);
        assert_eq!(pick(GameState::Idle), Some("no_mission"));
        assert_eq!(pick(GameState::Assigned), Some("no_info"));
        assert_eq!(pick(GameState::Investigating), Some("approach"));
        assert_eq!(pick(GameState::Equipped), None);
        assert_eq!(pick(GameState::Login), None);
    }

    #[test]
    fn ambient_never_talks() {
        for state in ALL_STATES {
            assert_eq!(select_node_id(NpcType::Ambient, state, false), None);
        }
    }

    #[test]
    fn resolves_against_npc_tree() {
        use crate::content::Content;
        use crate::core::assembler::assemble_npcs;

        let content = Content::builtin().unwrap();
        let twist = content.catalog.twist_for_loop(1).unwrap();
        let [_, mut informant, _] = assemble_npcs(twist, &content.templates, &content.script);

        assert_eq!(
            resolve_dialogue(&informant, GameState::Investigating).map(|n| n.id.as_str()),
            Some("info")
        );
        informant.has_interacted = true;
        assert_eq!(
            resolve_dialogue(&informant, GameState::Investigating).map(|n| n.id.as_str()),
            Some("already_helped")
        );

        // Missing node degrades to no dialogue.
        informant.dialogue.retain(|node| node.id != "already_helped");
        assert!(resolve_dialogue(&informant, GameState::Investigating).is_none());
    }
}
