//! Full protocol sessions against the runner.

use void_core::prelude::*;
use void_headless::protocol::{Command, Response};
use void_headless::runner::HeadlessRunner;
use void_test_utils::fixtures::duel_match;

const SCRIPT: &str = r#"
{"cmd":"start"}
{"cmd":"select_unit_type","key":"archer"}
{"cmd":"deploy_selected","x":200,"y":300}
{"cmd":"deploy_selected","x":900,"y":300}
{"cmd":"set_speed","multiplier":2.0}
{"cmd":"tick","count":120,"dt":0.05}
{"cmd":"hash"}
{"cmd":"quit"}
"#;

fn run_script(script: &str) -> Vec<serde_json::Value> {
    let mut runner = HeadlessRunner::new(Match::default());
    let mut output = Vec::new();
    runner.run(script.as_bytes(), &mut output).unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_scripted_session_responses() {
    let lines = run_script(SCRIPT);
    let types: Vec<&str> = lines.iter().map(|v| v["type"].as_str().unwrap()).collect();
    assert_eq!(
        types,
        vec!["ready", "ack", "ack", "deployed", "error", "ack", "ack", "state_hash", "bye"]
    );
    assert_eq!(lines[3]["unit_type"], "archer");
    assert_eq!(lines[4]["cmd"], "deploy_selected");
    assert_eq!(lines[7]["frame"], 120);
}

#[test]
fn test_same_script_same_hash() {
    let first = run_script(SCRIPT);
    let second = run_script(SCRIPT);
    assert_eq!(first[7]["hash"], second[7]["hash"]);
}

#[test]
fn test_query_reflects_duel() {
    let (game, ally, enemy) = duel_match(100, 150, 40, 1);
    let mut runner = HeadlessRunner::new(game);

    runner.handle(Command::Tick { count: 2, dt: 0.01 });
    let Response::State { snapshot, hash } = runner.handle(Command::Query) else {
        panic!("query must answer with state");
    };
    assert_eq!(hash, runner.game().state_hash());
    assert_eq!(snapshot.frame, 2);
    assert!(snapshot.units.iter().any(|u| u.id == ally));
    assert!(snapshot.units.iter().all(|u| u.id != enemy));
    assert_eq!(snapshot.notifications.len(), 1);
    assert_eq!(snapshot.notifications[0].amount, 20);
}

#[test]
fn test_state_line_is_flat_json() {
    let mut runner = HeadlessRunner::new(Match::default()).with_auto_state(true);
    runner.handle(Command::Start);
    let line = runner
        .handle(Command::Tick { count: 1, dt: 0.05 })
        .to_json_line();
    let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(value["type"], "state");
    assert_eq!(value["frame"], 1);
    assert_eq!(value["energy"]["max"], 300.0);
    assert!(value["units"].is_array());
    assert!(value["hash"].is_u64());
}
