//! End-to-end match scenarios.
//!
//! Each test drives a [`Match`] only through its public operations, the
//! same way a host would.

use void_core::prelude::*;
use void_test_utils::fixtures::{
    duel_match, duel_registry, fixed, fixed_f, lane_point, quiet_config, test_ally_template,
    test_enemy_template,
};

const SHORT_FRAME: f64 = 0.01;

fn short_frame(game: &mut Match) -> FrameEvents {
    game.frame(fixed_f(SHORT_FRAME))
}

#[test]
fn test_deploy_budget_two_of_three() {
    let mut registry = TemplateRegistry::new();
    registry.register_ally("basic", test_ally_template(60, 20, 100, 50));
    let mut game = Match::new(quiet_config(100), registry);

    assert!(game.deploy("basic", lane_point(80)).is_ok());
    assert_eq!(game.energy().current(), fixed(50));
    assert!(game.deploy("basic", lane_point(80)).is_ok());
    assert_eq!(game.energy().current(), fixed(0));

    let hash = game.state_hash();
    assert_eq!(
        game.deploy("basic", lane_point(80)),
        Err(GameError::InsufficientEnergy {
            required: 50,
            available: 0
        })
    );
    assert_eq!(game.state_hash(), hash);
    assert_eq!(game.energy().current(), fixed(0));
    assert_eq!(game.allies().len(), 2);
}

#[test]
fn test_killed_enemy_acts_until_reclaim_then_pays() {
    let (mut game, ally, enemy) = duel_match(100, 150, 40, 1);
    assert_eq!(game.energy().current(), fixed(90));

    // Frame 1: both walk a little, then lock on.
    let events = short_frame(&mut game);
    assert!(events.damage.is_empty());
    assert_eq!(game.unit(ally).unwrap().target(), Some(enemy));
    assert_eq!(game.unit(enemy).unwrap().target(), Some(ally));

    // Frame 2: the ally's hit is lethal, yet the enemy's own attack this
    // frame still lands because it was decided before damage applied.
    let events = short_frame(&mut game);
    assert_eq!(events.damage.len(), 2);
    let kill = events.damage.iter().find(|e| e.target == enemy).unwrap();
    assert!(kill.killed);
    assert_eq!(kill.damage, 40);
    let counter = events.damage.iter().find(|e| e.target == ally).unwrap();
    assert_eq!(counter.damage, 1);

    // Reclaimed at the end of the frame that killed it, for floor(40/4)+10.
    assert_eq!(events.deaths.len(), 1);
    assert_eq!(events.deaths[0].id, enemy);
    assert_eq!(events.deaths[0].faction, Faction::Enemy);
    assert_eq!(events.deaths[0].reward, 20);
    assert_eq!(game.energy().current(), fixed(110));
    assert!(game.enemies().is_empty());
    assert_eq!(game.unit(enemy), Err(GameError::EntityNotFound(enemy)));

    // The ally forgot its target on the same frame.
    assert_eq!(game.unit(ally).unwrap().target(), None);
    assert_eq!(game.unit(ally).unwrap().health.current, 39);
}

#[test]
fn test_mutual_attack_same_frame() {
    let (mut game, ally, enemy) = duel_match(100, 150, 10, 10);
    short_frame(&mut game);
    let events = short_frame(&mut game);

    assert_eq!(events.damage.len(), 2);
    assert_eq!(game.unit(ally).unwrap().health.current, 30);
    assert_eq!(game.unit(enemy).unwrap().health.current, 30);
    assert!(!game.unit(ally).unwrap().combat.can_attack());
    assert!(!game.unit(enemy).unwrap().combat.can_attack());
}

#[test]
fn test_units_walk_then_hold_when_engaged() {
    let (mut game, ally, enemy) = duel_match(100, 400, 1, 1);
    short_frame(&mut game);
    assert!(game.unit(ally).unwrap().is_moving());
    assert!(game.unit(ally).unwrap().position.x > fixed(100));
    assert!(game.unit(enemy).unwrap().position.x < fixed(400));

    // Closing speed is 20/s over a 300 gap; range 100 is reached at 10 s.
    for _ in 0..60 {
        game.frame(fixed_f(0.25));
    }
    let engaged_at = game.unit(ally).unwrap().position;
    assert!(!game.unit(ally).unwrap().is_moving());
    assert!(!game.unit(enemy).unwrap().is_moving());

    game.frame(fixed_f(0.25));
    assert_eq!(game.unit(ally).unwrap().position, engaged_at);
    let gap = game.unit(enemy).unwrap().position.x - game.unit(ally).unwrap().position.x;
    assert!(gap <= fixed(100));
}

#[test]
fn test_tie_goes_to_lowest_id_then_retargets() {
    let config = MatchConfig {
        enemy_spawn_x: fixed(150),
        ..quiet_config(100)
    };
    let registry = duel_registry(
        test_ally_template(40, 40, 100, 10),
        test_enemy_template(40, 1, 100),
    );
    let mut game = Match::new(config, registry);
    game.start();
    let ally = game.deploy("duelist", lane_point(100)).unwrap();
    let first = game.spawn_enemy("target").unwrap();
    let second = game.spawn_enemy("target").unwrap();
    assert!(first < second);

    short_frame(&mut game);
    assert_eq!(game.unit(ally).unwrap().target(), Some(first));

    // The kill frame re-acquires the survivor before the corpse is reclaimed.
    let events = short_frame(&mut game);
    assert_eq!(events.deaths.len(), 1);
    assert_eq!(events.deaths[0].id, first);
    assert_eq!(game.unit(ally).unwrap().target(), Some(second));
}

#[test]
fn test_pause_and_stop_freeze_the_match() {
    let (mut game, ally, _) = duel_match(100, 400, 1, 1);
    game.toggle_pause();
    let hash = game.state_hash();
    for _ in 0..10 {
        assert!(game.frame(fixed_f(0.1)).is_empty());
    }
    assert_eq!(game.state_hash(), hash);

    game.toggle_pause();
    game.stop();
    let hash = game.state_hash();
    game.frame(fixed_f(0.1));
    assert_eq!(game.state_hash(), hash);

    game.start();
    game.frame(fixed_f(0.125));
    assert_eq!(game.unit(ally).unwrap().position.x, fixed_f(101.25));
    assert_eq!(game.frame_count(), 1);
}

#[test]
fn test_speed_multiplier_scales_movement() {
    let (mut slow, slow_ally, _) = duel_match(100, 1000, 1, 1);
    let (mut fast, fast_ally, _) = duel_match(100, 1000, 1, 1);
    fast.set_speed(fixed(2));

    slow.frame(fixed_f(0.125));
    fast.frame(fixed_f(0.125));
    assert_eq!(slow.unit(slow_ally).unwrap().position.x, fixed_f(101.25));
    assert_eq!(fast.unit(fast_ally).unwrap().position.x, fixed_f(102.5));
}

#[test]
fn test_long_frame_is_clamped() {
    let (mut game, ally, _) = duel_match(100, 1000, 1, 1);
    game.frame(fixed(5));
    assert_eq!(game.unit(ally).unwrap().position.x, fixed_f(102.5));
}

#[test]
fn test_notification_fades_after_reward() {
    let (mut game, _, _) = duel_match(100, 150, 40, 1);
    short_frame(&mut game);
    short_frame(&mut game);

    let snapshot = game.snapshot();
    assert_eq!(snapshot.notifications.len(), 1);
    let note = snapshot.notifications[0];
    assert_eq!(note.amount, 20);
    assert!(note.remaining_life_fraction < 1.0);
    assert!(note.y < 300.0);

    for _ in 0..8 {
        game.frame(fixed_f(0.25));
    }
    assert!(game.snapshot().notifications.is_empty());
}

#[test]
fn test_hard_difficulty_scales_spawns() {
    let config = MatchConfig {
        difficulty: Difficulty::Hard,
        ..MatchConfig::default()
    };
    let mut game = Match::new(config, TemplateRegistry::default());
    let grunt = game.spawn_enemy("grunt").unwrap();
    let unit = game.unit(grunt).unwrap();
    assert_eq!(unit.health.max, 52);
    assert_eq!(unit.reward_on_death(), 52 / 4 + 10);
}

#[test]
fn test_snapshot_shows_selection_and_flags() {
    let mut game = Match::default();
    game.select_unit_type("archer").unwrap();
    game.start();
    game.toggle_pause();

    let snapshot = game.snapshot();
    assert_eq!(snapshot.selected_unit, "archer");
    assert!(snapshot.running);
    assert!(snapshot.paused);
    assert_eq!(snapshot.energy.max, 300.0);
    assert_eq!(snapshot.speed_multiplier, 1.0);
}

#[test]
fn test_extended_roster_match_runs() {
    let templates = TemplateRegistry::extended().unwrap();
    let config = MatchConfig {
        seed: 17,
        ..MatchConfig::default()
    };
    let mut game = Match::validated(config, templates).unwrap();
    game.start();

    let mut spawned = 0;
    for frame in 0..600 {
        if frame % 40 == 0 {
            let _ = game.deploy_selected(lane_point(100));
        }
        spawned += game.frame(fixed_f(0.05)).spawned.len();

        let energy = game.energy();
        assert!(energy.current() >= fixed(0) && energy.current() <= energy.max());
        assert!(game.entities().iter().all(|(_, unit)| unit.is_alive()));
    }
    assert_eq!(spawned, 15);
}
