//! Test fixtures and helpers.
//!
//! Template records and pre-built matches for consistent testing.

use fixed::types::I32F32;
use void_core::components::EntityId;
use void_core::config::MatchConfig;
use void_core::data::{AllyTemplate, EnemyTemplate, TemplateRegistry};
use void_core::math::Vec2Fixed;
use void_core::simulation::Match;

/// Lane y used by every fixture.
pub const LANE_Y: i32 = 300;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A point on the fixture lane.
#[must_use]
pub fn lane_point(x: i32) -> Vec2Fixed {
    Vec2Fixed::new(fixed(x), fixed(LANE_Y))
}

/// Ally template with the given stats, speed 10 and a 1 second cooldown.
#[must_use]
pub fn test_ally_template(hp: u32, damage: u32, range: i32, cost: u32) -> AllyTemplate {
    AllyTemplate {
        name: "Test Ally".to_string(),
        hp,
        speed: fixed(10),
        damage,
        range: fixed(range),
        attack_cooldown: fixed(1),
        deployment_cost: cost,
    }
}

/// Enemy template with the given stats, speed 10 and a 1 second cooldown.
///
/// The reward is left to the match's reward policy and the template is
/// kept out of the random spawn rotation.
#[must_use]
pub fn test_enemy_template(hp: u32, damage: u32, range: i32) -> EnemyTemplate {
    EnemyTemplate {
        name: "Test Enemy".to_string(),
        hp,
        speed: fixed(10),
        damage,
        range: fixed(range),
        attack_cooldown: fixed(1),
        reward: None,
        spawn_weight: 0,
    }
}

/// Config with no passive income and no timer spawns.
#[must_use]
pub fn quiet_config(initial_energy: i32) -> MatchConfig {
    MatchConfig {
        initial_energy: fixed(initial_energy),
        max_energy: fixed(initial_energy.max(300)),
        energy_regen_rate: I32F32::ZERO,
        spawn_interval: fixed(1_000_000),
        ..MatchConfig::default()
    }
}

/// Registry with one test ally (`"duelist"`) and one test enemy (`"target"`).
#[must_use]
pub fn duel_registry(ally: AllyTemplate, enemy: EnemyTemplate) -> TemplateRegistry {
    let mut registry = TemplateRegistry::new();
    registry.register_ally("duelist", ally);
    registry.register_enemy("target", enemy);
    registry
}

/// A running, quiet match with one ally at `ally_x` and one enemy at
/// `enemy_x`, both 40 hp with range 100.
///
/// Returns the match and the ids of the ally and the enemy.
///
/// # Panics
///
/// Panics if the ally cannot be deployed, which would be a fixture bug.
#[must_use]
pub fn duel_match(
    ally_x: i32,
    enemy_x: i32,
    ally_damage: u32,
    enemy_damage: u32,
) -> (Match, EntityId, EntityId) {
    let config = MatchConfig {
        enemy_spawn_x: fixed(enemy_x),
        ..quiet_config(100)
    };
    let registry = duel_registry(
        test_ally_template(40, ally_damage, 100, 10),
        test_enemy_template(40, enemy_damage, 100),
    );
    let mut game = Match::new(config, registry);
    game.start();

    let ally = game
        .deploy("duelist", lane_point(ally_x))
        .expect("fixture ally deploys");
    let enemy = game.spawn_enemy("target").expect("fixture enemy spawns");
    (game, ally, enemy)
}

/// A running match with `per_side` allies spread along the left of the
/// lane and `per_side` enemies stacked at the spawn point.
///
/// Timer spawns stay on, so the lane keeps filling as it is stepped.
///
/// # Panics
///
/// Panics if a deploy fails, which would be a fixture bug.
#[must_use]
pub fn crowded_lane(per_side: u32, seed: u64) -> Match {
    let config = MatchConfig {
        initial_energy: fixed(1_000_000),
        max_energy: fixed(1_000_000),
        spawn_interval: fixed_f(0.5),
        seed,
        ..MatchConfig::default()
    };
    let mut game = Match::new(config, TemplateRegistry::default());
    game.start();

    let keys = ["basic", "tank", "archer"];
    for i in 0..per_side {
        let key = keys[i as usize % keys.len()];
        let x = 80 + i32::try_from(i % 100).unwrap_or(0) * 4;
        game.deploy(key, lane_point(x)).expect("fixture deploy");
        let enemy = if i % 2 == 0 { "grunt" } else { "heavy" };
        game.spawn_enemy(enemy).expect("fixture spawn");
    }
    game
}
