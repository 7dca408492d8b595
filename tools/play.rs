/// Play: interactive terminal playthrough of the loop.
///
/// Usage: play [--content <dir>] [--config <file>] [--saves <dir>] [--seed <n>] [--user <name>]
///
/// Commands:
///   login <name>     log in (resumes a save from --saves)
///   look             list NPCs and what they would say now
///   talk <npc>       open dialogue with an NPC (id or list number)
///   <n>              pick option n of the open dialogue
///   wait <secs>      let time pass
///   hud              show status, objective and marker
///   outfit [id]      list outfits or change into one
///   twists           list the twist catalog
///   preview          assemble a random twist without playing it
///   save             write a save now
///   help             list commands
///   quit             exit

use cycle_of_crime::core::config::GameConfig;
use cycle_of_crime::core::persistence::{DirStore, MemoryStore};
use cycle_of_crime::core::resolver::resolve_dialogue;
use cycle_of_crime::schema::npc::{DialogueNode, Npc};
use cycle_of_crime::schema::player::Outfit;
use cycle_of_crime::schema::twist::Twist;
use cycle_of_crime::{ChoiceOutcome, Game, GameBuilder, Presenter};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

/// Prints what a renderer would be told.
struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn set_twist(&mut self, twist: &Twist) {
        println!("\n*** {} ***", twist.name);
        println!("    {}", twist.description);
        println!(
            "    sky #{:06x}  fog #{:06x}  effects: {}",
            twist.environment.sky_color,
            twist.environment.fog_color,
            if twist.special_effects.is_empty() {
                "none".to_string()
            } else {
                twist.special_effects.join(", ")
            }
        );
    }

    fn set_npcs(&mut self, npcs: &[Npc]) {
        let names: Vec<&str> = npcs.iter().map(|npc| npc.name.as_str()).collect();
        println!("    in town: {}", names.join(", "));
    }

    fn set_player_outfit(&mut self, outfit: Outfit) {
        println!("    you are wearing: {}", outfit.label());
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut content_dir = None;
    let mut config_path = None;
    let mut saves_dir = None;
    let mut username = None;
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return;
            }
            "--content" if i + 1 < args.len() => {
                i += 1;
                content_dir = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--saves" if i + 1 < args.len() => {
                i += 1;
                saves_dir = Some(args[i].clone());
            }
            "--user" if i + 1 < args.len() => {
                i += 1;
                username = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(ref path) => match GameConfig::load_from_ron(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("ERROR loading config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => GameConfig::default(),
    };

    let epoch_millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut builder: GameBuilder = Game::builder()
        .config(config)
        .seed(seed)
        .epoch_millis(epoch_millis)
        .presenter(TerminalPresenter);
    if let Some(ref dir) = content_dir {
        builder = builder.content_dir(dir);
    }
    builder = match saves_dir {
        Some(ref dir) => match DirStore::open(Path::new(dir)) {
            Ok(store) => builder.store(store),
            Err(e) => {
                eprintln!("ERROR opening save directory {}: {}", dir, e);
                std::process::exit(1);
            }
        },
        None => builder.store(MemoryStore::new()),
    };

    let mut game = match builder.build() {
        Ok(game) => game,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("Cycle of Crime: {} twists loaded, seed {}", game.content().catalog.len(), seed);
    if let Some(ref name) = username {
        login(&mut game, name);
    } else {
        println!("Type 'login <name>' to start, 'help' for commands.\n");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}> ", game.state().name().to_lowercase());
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        if let Ok(pick) = cmd.parse::<usize>() {
            choose(&mut game, pick);
            continue;
        }

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                if game.save().is_ok() {
                    println!("Saved.");
                }
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "login" => {
                if parts.len() < 2 {
                    println!("Usage: login <name>");
                    continue;
                }
                login(&mut game, &parts[1..].join(" "));
            }
            "look" => {
                for (n, npc) in game.npcs().iter().enumerate() {
                    let opener = resolve_dialogue(npc, game.state())
                        .map(|node| node.id.as_str())
                        .unwrap_or("-");
                    println!(
                        "  {}. {} [{}] at ({:.0}, {:.0}) opens with: {}",
                        n + 1,
                        npc.name,
                        npc.id,
                        npc.position.x,
                        npc.position.z,
                        opener
                    );
                }
            }
            "talk" => {
                if parts.len() < 2 {
                    println!("Usage: talk <npc id or number>");
                    continue;
                }
                let npc_id = match parts[1].parse::<usize>() {
                    Ok(n) if n >= 1 && n <= game.npcs().len() => game.npcs()[n - 1].id.clone(),
                    _ => parts[1].to_string(),
                };
                match game.interact(&npc_id) {
                    Ok(Some(node)) => print_node(&node),
                    Ok(None) => println!("They have nothing to say to you right now."),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "choose" => match parts.get(1).and_then(|s| s.parse::<usize>().ok()) {
                Some(pick) => choose(&mut game, pick),
                None => println!("Usage: choose <n>"),
            },
            "wait" => {
                let secs: f64 = match parts.get(1).map(|s| s.parse::<f64>()) {
                    Some(Ok(secs)) if secs > 0.0 => secs,
                    None => 1.0,
                    _ => {
                        println!("Usage: wait <seconds>");
                        continue;
                    }
                };
                // Step in tenths so each phase prints as it happens
                let steps = (secs * 10.0).ceil() as u64;
                for _ in 0..steps {
                    match game.tick(Duration::from_millis(100)) {
                        Ok(fired) => {
                            for transition in fired {
                                println!("  -> {}", transition.to);
                                if let Some(objective) = game.hud().objective {
                                    println!("     {}: {}", objective.title, objective.description);
                                }
                            }
                        }
                        Err(e) => {
                            println!("ERROR: {}", e);
                            break;
                        }
                    }
                }
            }
            "hud" => print_hud(&game),
            "outfit" => {
                let Some(id) = parts.get(1) else {
                    for outfit in Outfit::ALL {
                        let marker = if outfit == game.player().outfit { "*" } else { " " };
                        println!(" {} {:<8} {} ({})", marker, outfit.id(), outfit.label(), outfit.description());
                    }
                    continue;
                };
                match Outfit::from_id(id) {
                    Some(outfit) => {
                        if let Err(e) = game.set_outfit(outfit) {
                            println!("ERROR: {}", e);
                        }
                    }
                    None => println!("Unknown outfit: {}", id),
                }
            }
            "twists" => {
                for (n, twist) in game.content().catalog.twists().iter().enumerate() {
                    let current = if twist.id == game.twist().id { "*" } else { " " };
                    println!(
                        " {} {}. {} [{}] set {:?}",
                        current,
                        n + 1,
                        twist.name,
                        twist.id,
                        twist.conversation_set
                    );
                }
            }
            "preview" => {
                let (twist, npcs) = game.preview_random();
                println!("\n--- Preview: {} ---", twist.name);
                for npc in &npcs {
                    let style = twist
                        .variation(&npc.id)
                        .map(|v| format!("{:?}", v.dialogue_style))
                        .unwrap_or_else(|| "plain".to_string());
                    println!("  {} ({}, {})", npc.name, npc.id, style);
                    let opener = ["intro", "info", "approach"]
                        .iter()
                        .find_map(|id| npc.node(id));
                    if let Some(node) = opener {
                        println!("    \"{}\"", node.text);
                    }
                }
                println!("--- End ---\n");
            }
            "save" => match game.save() {
                Ok(()) => println!("Saved."),
                Err(e) => println!("ERROR: {}", e),
            },
            _ => {
                println!("Unknown command: '{}'. Type 'help' for available commands.", cmd);
            }
        }
    }
}

fn login(game: &mut Game, name: &str) {
    match game.login(name) {
        Ok(true) => println!("Welcome back, {}. Loop {}.", game.player().username, game.current_loop()),
        Ok(false) => println!("Welcome, {}.", game.player().username),
        Err(e) => println!("ERROR: {}", e),
    }
}

fn choose(game: &mut Game, pick: usize) {
    if pick == 0 {
        println!("Options are numbered from 1.");
        return;
    }
    match game.choose(pick - 1) {
        Ok(ChoiceOutcome::Advanced(node)) => print_node(&node),
        Ok(ChoiceOutcome::Closed) => println!("(conversation ends)"),
        Ok(ChoiceOutcome::Dispatched { action, step }) => {
            println!("(conversation ends: {})", action.name());
            if step.accepted() {
                println!("  state: {}", game.state());
            }
        }
        Err(e) => println!("ERROR: {}", e),
    }
}

fn print_node(node: &DialogueNode) {
    println!("\n{}: \"{}\"", node.speaker, node.text);
    for (n, option) in node.options.iter().enumerate() {
        println!("  {}. {}", n + 1, option.text);
    }
    println!();
}

fn print_hud(game: &Game) {
    let hud = game.hud();
    println!("Player: {}  Loop: {}  Outfit: {}", hud.username, hud.current_loop, hud.outfit_label);
    println!("Status: {}", hud.status);
    println!("Twist:  {} (set {:?})", hud.twist_name, hud.conversation_set);
    if let Some(title) = hud.mission_title {
        println!("Mission: {}", title);
    }
    if let Some(objective) = hud.objective {
        println!("Objective: {}: {}", objective.title, objective.description);
    }
    if let Some(marker) = hud.marker {
        println!(
            "Marker: {} at ({:.0}, {:.0})",
            marker.label, marker.position.x, marker.position.z
        );
    }
}

fn print_usage() {
    println!("Play: interactive terminal playthrough of the loop.");
    println!();
    println!("Usage: play [--content <dir>] [--config <file>] [--saves <dir>] [--seed <n>] [--user <name>]");
    println!();
    println!("  --content <dir>   Content directory overriding the built-in twists and dialogue");
    println!("  --config <file>   Game config (RON)");
    println!("  --saves <dir>     Directory for save files (default: in memory)");
    println!("  --seed <n>        Seed for twist previews (default: 42)");
    println!("  --user <name>     Log in immediately");
}

fn print_help() {
    println!("Commands:");
    println!("  login <name>   Log in, resuming a save if one exists");
    println!("  look           List NPCs and what they would say now");
    println!("  talk <npc>     Talk to an NPC by id or list number");
    println!("  <n>            Pick option n of the open dialogue");
    println!("  wait <secs>    Let time pass (default 1s)");
    println!("  hud            Show status, objective and marker");
    println!("  outfit [id]    List outfits or change into one");
    println!("  twists         List the twist catalog");
    println!("  preview        Assemble a random twist without playing it");
    println!("  save           Save now");
    println!("  help           Show this help");
    println!("  quit           Save and exit");
}
