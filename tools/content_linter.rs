/// Content Linter: validates a content directory against the built-in
/// content and reports problems the loader lets through.
///
/// Usage: content_linter <content_dir> [--config <file>]

use cycle_of_crime::content::Content;
use cycle_of_crime::core::assembler::assemble_npcs;
use cycle_of_crime::core::config::GameConfig;
use cycle_of_crime::core::resolver::select_node_id;
use cycle_of_crime::core::script::Styling;
use cycle_of_crime::schema::npc::Npc;
use cycle_of_crime::schema::player::GameState;
use cycle_of_crime::schema::twist::{ConversationSet, Role};
use rustc_hash::FxHashSet;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: content_linter <content_dir> [--config <file>]");
        process::exit(0);
    }

    let content_dir = &args[1];
    let mut config_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--config" && i + 1 < args.len() {
            i += 1;
            config_path = Some(args[i].clone());
        }
        i += 1;
    }

    let content = match Content::load_from_dir(Path::new(content_dir)) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded {} twists from '{}' (built-ins fill missing files)",
        content.catalog.len(),
        content_dir
    );

    let mut errors = Vec::new();
    if let Some(ref path) = config_path {
        if let Err(e) = GameConfig::load_from_ron(Path::new(path)) {
            errors.push(format!("Config '{}': {}", path, e));
        }
    }

    let (lint_errors, warnings) = lint_content(&content);
    errors.extend(lint_errors);

    println!("\n=== Content Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

const STATES: [GameState; 8] = [
    GameState::Login,
    GameState::Idle,
    GameState::Assigned,
    GameState::Investigating,
    GameState::Equipped,
    GameState::Busted,
    GameState::Jailed,
    GameState::Released,
];

fn lint_content(content: &Content) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Twist checks
    let twists = content.catalog.twists();
    for pair in twists.windows(2) {
        if pair[0].conversation_set == pair[1].conversation_set {
            warnings.push(format!(
                "Twists '{}' and '{}' are consecutive but share conversation set {:?}",
                pair[0].id, pair[1].id, pair[0].conversation_set
            ));
        }
    }

    for twist in twists {
        let role_ids: FxHashSet<&str> = Role::ALL
            .iter()
            .map(|role| twist.npc_assignments.for_role(*role).id.as_str())
            .collect();

        for npc_id in twist.npc_dialogue_variations.keys() {
            if !role_ids.contains(npc_id.as_str()) {
                warnings.push(format!(
                    "Twist '{}' has a dialogue variation for '{}' which no role uses",
                    twist.id, npc_id
                ));
            }
        }
        for role in Role::ALL {
            let identity = twist.npc_assignments.for_role(role);
            if twist.variation(&identity.id).is_none() {
                warnings.push(format!(
                    "Twist '{}' has no dialogue variation for {} '{}'; lines will be unstyled",
                    twist.id,
                    role.label(),
                    identity.id
                ));
            }
        }

        for npc in assemble_npcs(twist, &content.templates, &content.script) {
            lint_npc(&twist.id, &npc, &mut errors, &mut warnings);
        }
    }

    // Templates that the script never consults
    for set in [ConversationSet::A, ConversationSet::B] {
        for role in Role::ALL {
            for node_id in content.templates.set(set).for_role(role).keys() {
                let styling = content
                    .script
                    .nodes(role)
                    .iter()
                    .find(|node| &node.id == node_id)
                    .map(|node| node.styling);
                if styling != Some(Styling::Templated) {
                    warnings.push(format!(
                        "Set {:?} {} template '{}' is never used; the script does not mark that node templated",
                        set,
                        role.label(),
                        node_id
                    ));
                }
            }
        }
    }

    (errors, warnings)
}

fn lint_npc(twist_id: &str, npc: &Npc, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    // Entry nodes come from the resolver, everything else must be reachable from them
    let mut reachable: FxHashSet<&str> = FxHashSet::default();
    let mut frontier: Vec<&str> = Vec::new();
    for state in STATES {
        for has_interacted in [false, true] {
            if let Some(id) = select_node_id(npc.npc_type, state, has_interacted) {
                if npc.node(id).is_none() {
                    errors.push(format!(
                        "Twist '{}': {} has no '{}' node to open with in {}",
                        twist_id, npc.id, id, state
                    ));
                } else if reachable.insert(id) {
                    frontier.push(id);
                }
            }
        }
    }

    while let Some(id) = frontier.pop() {
        let Some(node) = npc.node(id) else { continue };
        for option in &node.options {
            if let Some(next) = &option.next_id {
                match npc.node(next) {
                    Some(target) => {
                        if reachable.insert(target.id.as_str()) {
                            frontier.push(target.id.as_str());
                        }
                    }
                    None => errors.push(format!(
                        "Twist '{}': {} node '{}' points at missing node '{}'",
                        twist_id, npc.id, node.id, next
                    )),
                }
            }
        }
    }

    for node in &npc.dialogue {
        if !reachable.contains(node.id.as_str()) {
            warnings.push(format!(
                "Twist '{}': {} node '{}' is unreachable",
                twist_id, npc.id, node.id
            ));
        }
        if node.text.trim().is_empty() {
            errors.push(format!(
                "Twist '{}': {} node '{}' has empty text",
                twist_id, npc.id, node.id
            ));
        }
    }
}
