/// Content integration tests: built-in catalog shape, content directory
/// overrides and config files.

use cycle_of_crime::content::Content;
use cycle_of_crime::core::assembler::assemble_npcs;
use cycle_of_crime::core::catalog::{CatalogError, TwistCatalog};
use cycle_of_crime::core::config::GameConfig;
use cycle_of_crime::schema::player::{GameState, Outfit};
use cycle_of_crime::schema::twist::{ConversationSet, Role};
use cycle_of_crime::Game;
use std::path::Path;
use std::time::Duration;

const FIXTURES: &str = "tests/fixtures";

#[test]
fn builtin_catalog_alternates_conversation_sets() {
    let content = Content::builtin().unwrap();
    let ids: Vec<&str> = content
        .catalog
        .twists()
        .iter()
        .map(|twist| twist.id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "sunny_day",
            "rainy_night",
            "neon_cyberpunk",
            "desert_western",
            "zombie_apocalypse",
            "medieval_fantasy"
        ]
    );

    for (i, twist) in content.catalog.twists().iter().enumerate() {
        let expected = if i % 2 == 0 {
            ConversationSet::A
        } else {
            ConversationSet::B
        };
        assert_eq!(twist.conversation_set, expected, "{}", twist.id);
    }
}

#[test]
fn builtin_loops_cycle() {
    let content = Content::builtin().unwrap();
    let catalog = &content.catalog;
    assert_eq!(catalog.twist_for_loop(1).unwrap().id, "sunny_day");
    assert_eq!(catalog.twist_for_loop(6).unwrap().id, "medieval_fantasy");
    assert_eq!(catalog.twist_for_loop(7).unwrap().id, "sunny_day");
    assert_eq!(catalog.twist_for_loop(14).unwrap().id, "rainy_night");
    assert!(matches!(
        catalog.twist_for_loop(0),
        Err(CatalogError::LoopOutOfRange(0))
    ));
}

#[test]
fn builtin_npc_ids_follow_loop_number() {
    let content = Content::builtin().unwrap();
    for (i, twist) in content.catalog.twists().iter().enumerate() {
        let n = i + 1;
        let assignments = &twist.npc_assignments;
        assert_eq!(assignments.for_role(Role::JobGiver).id, format!("undercover{}", n));
        assert_eq!(assignments.for_role(Role::Informant).id, format!("informant{}", n));
        assert_eq!(assignments.for_role(Role::Target).id, format!("target{}", n));
    }
}

#[test]
fn fixture_dir_replaces_catalog_only() {
    let content = Content::load_from_dir(Path::new(FIXTURES)).unwrap();
    assert_eq!(content.catalog.len(), 2);
    assert_eq!(content.catalog.twist_for_loop(3).unwrap().id, "harbor_fog");

    // No script or conversations in the fixture dir: built-ins stay.
    let builtin = Content::builtin().unwrap();
    assert_eq!(
        content.script.nodes(Role::Target).len(),
        builtin.script.nodes(Role::Target).len()
    );
    assert!(content
        .templates
        .template(ConversationSet::A, Role::JobGiver, "intro")
        .is_some());
}

#[test]
fn game_runs_on_fixture_content() {
    let mut game = Game::builder().content_dir(FIXTURES).build().unwrap();
    game.login("rosa").unwrap();

    assert_eq!(game.twist().id, "harbor_fog");
    assert_eq!(game.player().outfit, Outfit::Trench);
    let ids: Vec<&str> = game.npcs().iter().map(|npc| npc.id.as_str()).collect();
    assert_eq!(ids, vec!["dockmaster", "net_mender", "smuggler"]);

    let intro = game.interact("dockmaster").unwrap().unwrap();
    assert_eq!(intro.id, "intro");
    assert_eq!(intro.speaker, "Silas");
    assert_eq!(game.hud().objective.unwrap().description, "Look for Silas to get a job opportunity");
}

#[test]
fn fixture_twist_without_variations_is_unstyled() {
    let content = Content::load_from_dir(Path::new(FIXTURES)).unwrap();
    let twist = content.catalog.get("night_market").unwrap();
    assert!(twist.npc_dialogue_variations.is_empty());
    assert_eq!(twist.conversation_set, ConversationSet::B);

    let builtin_b = content.templates.template(ConversationSet::B, Role::Target, "casual").unwrap();
    let npcs = assemble_npcs(twist, &content.templates, &content.script);
    assert_eq!(npcs[2].node("casual").unwrap().text, builtin_b.base);
}

#[test]
fn bad_catalogs_rejected() {
    assert!(matches!(TwistCatalog::parse_ron("[]"), Err(CatalogError::Empty)));
    assert!(matches!(
        TwistCatalog::parse_ron("[(id: \"half\")]"),
        Err(CatalogError::Ron(_))
    ));
    assert!(Content::load_from_dir(Path::new("tests/fixtures/missing")).is_err());
}

#[test]
fn fixture_config_loads() {
    let config = GameConfig::load_from_ron(Path::new("tests/fixtures/game_config.ron")).unwrap();
    assert_eq!(config.timings.total(), Duration::from_millis(1500));
    assert_eq!(config.autosave_interval(), Duration::from_secs(1));
    assert_eq!(config.max_username_len, 12);

    let mut game = Game::builder().config(config).build().unwrap();
    assert!(game.login("a_rather_long_name").is_err());
    game.login("vince").unwrap();
    assert_eq!(game.state(), GameState::Idle);
}
