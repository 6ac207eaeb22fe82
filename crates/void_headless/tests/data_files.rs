//! Loading config, template and player files from disk.

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use void_core::prelude::*;
use void_headless::config_loader::{load_match, load_match_config, load_player, load_templates};
use void_headless::LoadError;

fn shipped(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config").join(name)
}

fn ron_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn test_shipped_default_config_matches_builtin() {
    let config = load_match_config(&shipped("default_match.ron")).unwrap();
    let builtin = MatchConfig {
        seed: 42,
        ..MatchConfig::default()
    };
    assert_eq!(config, builtin);
}

#[test]
fn test_partial_config_takes_defaults() {
    let config = load_match_config(&shipped("hard_match.ron")).unwrap();
    assert_eq!(config.difficulty, Difficulty::Hard);
    assert_eq!(config.seed, 7);
    assert_eq!(config.max_energy, Fixed::from_num(300));
}

#[test]
fn test_shipped_player_loads() {
    let player = load_player(&shipped("archer_line.ron")).unwrap();
    assert_eq!(player.name, "Archer line");
    assert_eq!(player.next_unit(), Some("tank"));
    assert_eq!(player.min_gap_frames, 90);
}

#[test]
fn test_parse_error_names_the_file() {
    let file = ron_file("MatchConfig(initial_energy: \"lots\")");
    let err = load_match_config(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::Parse { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn test_invalid_config_is_rejected() {
    let file = ron_file("MatchConfig(spawn_interval: 0.0)");
    let err = load_match_config(file.path()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Validation {
            source: GameError::InvalidConfig(_),
            ..
        }
    ));
}

#[test]
fn test_custom_roster_drives_a_match() {
    let file = ron_file(
        r#"TemplateRegistry(
            allies: {
                "spear": AllyTemplate(name: "Spear", hp: 70, speed: 30.0, damage: 18,
                    range: 90.0, attack_cooldown: 1.2, deployment_cost: 60),
            },
            enemies: {
                "raider": EnemyTemplate(name: "Raider", hp: 48, speed: 28.0, damage: 10,
                    range: 70.0, attack_cooldown: 1.5, reward: Some(25), spawn_weight: 1),
            },
        )"#,
    );
    let templates = load_templates(file.path()).unwrap();
    assert_eq!(templates.ally("spear").unwrap().deployment_cost, 60);

    // The default config selects "basic", which this roster lacks.
    assert!(matches!(
        load_match(None, Some(file.path())),
        Err(LoadError::Validation { .. })
    ));

    let config = ron_file("MatchConfig(default_unit: \"spear\")");
    let mut game = load_match(Some(config.path()), Some(file.path())).unwrap();
    assert_eq!(game.selected_unit(), "spear");
    let raider = game.spawn_enemy("raider").unwrap();
    assert_eq!(game.unit(raider).unwrap().reward_on_death(), 25);
}
