/// NPC assembly: turns a twist into its three role-bound NPCs with fully
/// built, styled dialogue trees.

use tracing::debug;

use crate::core::script::{DialogueScript, ScriptNode, Styling};
use crate::core::style::styled_line;
use crate::core::templates::TemplateStore;
use crate::schema::npc::{DialogueNode, Npc, Vec3};
use crate::schema::twist::{Role, Twist};

/// Fixed stage marks per role. Not twist dependent.
pub fn role_position(role: Role) -> Vec3 {
    match role {
        Role::JobGiver => Vec3::new(10.0, 0.0, 10.0),
        Role::Informant => Vec3::new(-15.0, 0.0, 5.0),
        Role::Target => Vec3::new(25.0, 0.0, -10.0),
    }
}

/// Build the jobGiver, informant and target NPCs for `twist`, in that order.
pub fn assemble_npcs(twist: &Twist, templates: &TemplateStore, script: &DialogueScript) -> [Npc; 3] {
    let npcs = Role::ALL.map(|role| assemble_npc(role, twist, templates, script));
    debug!(
        twist = %twist.id,
        npcs = ?npcs.iter().map(|npc| npc.id.as_str()).collect::<Vec<_>>(),
        "assembled NPCs"
    );
    npcs
}

fn assemble_npc(role: Role, twist: &Twist, templates: &TemplateStore, script: &DialogueScript) -> Npc {
    let identity = twist.npc_assignments.for_role(role);
    let speaker = identity.first_name().to_string();

    let dialogue = script
        .nodes(role)
        .iter()
        .map(|node| build_node(node, role, &speaker, &identity.id, twist, templates))
        .collect();

    Npc {
        id: identity.id.clone(),
        name: identity.name.clone(),
        npc_type: role.npc_type(),
        position: role_position(role),
        dialogue,
        is_active: true,
        has_interacted: false,
    }
}

fn build_node(
    node: &ScriptNode,
    role: Role,
    speaker: &str,
    npc_id: &str,
    twist: &Twist,
    templates: &TemplateStore,
) -> DialogueNode {
    let set = twist.conversation_set;
    let fallback_text = node.text.get(set);
    let fallback_options = node.options.get(set);

    let (text, options) = match node.styling {
        Styling::Templated => match templates.template(set, role, &node.id) {
            Some(template) => (
                styled_line(&template.base, npc_id, twist),
                template.options.clone(),
            ),
            None => (
                styled_line(fallback_text, npc_id, twist),
                fallback_options.clone(),
            ),
        },
        Styling::Styled => (
            styled_line(fallback_text, npc_id, twist),
            fallback_options.clone(),
        ),
        Styling::Fixed => (fallback_text.clone(), fallback_options.clone()),
    };

    DialogueNode {
        id: node.id.clone(),
        speaker: speaker.to_string(),
        text,
        options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use crate::schema::npc::{DialogueAction, NpcType};
    use rustc_hash::FxHashSet;

    fn content() -> Content {
        Content::builtin().unwrap()
    }

    #[test]
    fn three_npcs_one_per_role() {
        let content = content();
        for twist in content.catalog.twists() {
            let npcs = assemble_npcs(twist, &content.templates, &content.script);
            let types: Vec<NpcType> = npcs.iter().map(|npc| npc.npc_type).collect();
            assert_eq!(
                types,
                vec![NpcType::Undercover, NpcType::Informant, NpcType::Target]
            );

            let ids: FxHashSet<&str> = npcs.iter().map(|npc| npc.id.as_str()).collect();
            assert_eq!(ids.len(), 3, "ids must be distinct in {}", twist.id);

            for (npc, role) in npcs.iter().zip(Role::ALL) {
                assert!(npc.is_active);
                assert!(!npc.has_interacted);
                assert_eq!(npc.position, role_position(role));
                assert!(!npc.dialogue.is_empty());
                for id in role.canonical_nodes() {
                    let node = npc.node(id).unwrap_or_else(|| panic!("{} missing {}", npc.id, id));
                    assert!(!node.options.is_empty());
                }
            }
        }
    }

    #[test]
    fn sunny_day_intro_is_unstyled_set_a() {
        let content = content();
        let twist = content.catalog.twist_for_loop(1).unwrap();
        let [undercover, _, _] = assemble_npcs(twist, &content.templates, &content.script);

        assert_eq!(undercover.id, "undercover1");
        assert!(undercover.name.starts_with("Marcus"));
        let intro = undercover.node("intro").unwrap();
        assert_eq!(intro.speaker, "Marcus");
        assert_eq!(
            intro.text,
            "Hey there, new face! You look like someone who could use some easy money. I've got a simple job if you're interested..."
        );
        assert_eq!(intro.options[0].next_id.as_deref(), Some("details"));
        assert!(undercover
            .node("details")
            .unwrap()
            .text
            .starts_with("There's this guy who's been causing problems"));
    }

    #[test]
    fn noir_twist_styles_templated_lines() {
        let content = content();
        let twist = content.catalog.get("rainy_night").unwrap();
        let [undercover, _, _] = assemble_npcs(twist, &content.templates, &content.script);

        let details = undercover.node("details").unwrap();
        assert_eq!(
            details.text,
            "Someone's been talking to the wrong people, if you catch my drift. This person needs to disappear permanently. Twenty grand if you can make it happen tonight."
        );
        let negotiate = undercover.node("negotiate").unwrap();
        assert!(negotiate.text.contains("legitimate racket"));
        assert_eq!(
            negotiate.options[0].action,
            Some(DialogueAction::AcceptMission)
        );
    }

    #[test]
    fn styled_fallback_nodes_follow_twist() {
        let content = content();
        let twist = content.catalog.get("medieval_fantasy").unwrap();
        let [undercover, informant, target] =
            assemble_npcs(twist, &content.templates, &content.script);

        // Sir Gareth speaks medieval, Mara's olde_english has no transform.
        assert!(undercover.node("intro").unwrap().text.starts_with("Listen up"));
        assert!(undercover.node("details").unwrap().text.contains("Twenty grand"));
        assert!(informant
            .node("trust")
            .unwrap()
            .text
            .contains("the guy who gave you the job"));
        assert_eq!(target.node("threat").unwrap().speaker, "Lord");
    }

    #[test]
    fn fixed_lines_identical_across_twists() {
        let content = content();
        let gating = [
            (0, "already_assigned"),
            (0, "refuse"),
            (1, "no_mission"),
            (1, "already_helped"),
            (2, "no_mission"),
            (2, "no_info"),
        ];
        let mut seen: Vec<Option<String>> = vec![None; gating.len()];
        for twist in content.catalog.twists() {
            let npcs = assemble_npcs(twist, &content.templates, &content.script);
            for (i, (index, node)) in gating.iter().enumerate() {
                let text = npcs[*index].node(node).unwrap().text.clone();
                match &seen[i] {
                    Some(previous) => assert_eq!(previous, &text),
                    None => seen[i] = Some(text),
                }
            }
        }
    }

    #[test]
    fn apocalyptic_styles_template_intro() {
        let content = content();
        let twist = content.catalog.get("zombie_apocalypse").unwrap();
        let [undercover, _, _] = assemble_npcs(twist, &content.templates, &content.script);
        assert!(undercover
            .node("intro")
            .unwrap()
            .text
            .starts_with("Survivor, new face! You look like someone who could use some easy supplies."));
    }

    #[test]
    fn options_resolve_inside_tree() {
        let content = content();
        for twist in content.catalog.twists() {
            for npc in assemble_npcs(twist, &content.templates, &content.script) {
                for node in &npc.dialogue {
                    for option in &node.options {
                        if let Some(next) = &option.next_id {
                            assert!(npc.node(next).is_some(), "{}:{} -> {}", npc.id, node.id, next);
                        }
                    }
                }
            }
        }
    }
}
