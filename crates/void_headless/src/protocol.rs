//! JSON protocol for headless match control.
//!
//! The runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Responses and match state
//!
//! # Protocol Flow
//!
//! 1. Runner starts, outputs `{"type":"ready","version":"1.0","frame":0}`
//! 2. Controller sends commands as JSON lines
//! 3. Runner answers every command with one response
//! 4. On `quit`, outputs `{"type":"bye"}` and exits
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","frame":0}
//! -> {"cmd":"start"}
//! <- {"type":"ack","cmd":"start"}
//! -> {"cmd":"deploy","unit_type":"archer","x":80,"y":300}
//! <- {"type":"deployed","entity_id":1,"unit_type":"archer"}
//! -> {"cmd":"tick","count":60}
//! <- {"type":"ack","cmd":"tick"}
//! -> {"cmd":"query"}
//! <- {"type":"state","frame":60,"running":true,...,"hash":1234}
//! ```
//!
//! Player commands use the same field names as
//! [`PlayerCommand`], so a controller can forward recorded input verbatim.

use serde::{Deserialize, Serialize};
use void_core::commands::PlayerCommand;
use void_core::components::EntityId;
use void_core::snapshot::MatchSnapshot;

/// Protocol version reported in the ready line.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance the match by `count` frames of `dt` seconds each.
    Tick {
        #[serde(default = "default_tick_count")]
        count: u32,
        #[serde(default = "default_tick_dt")]
        dt: f64,
    },

    /// Query current match state without advancing time.
    Query,

    /// Report the state hash (for determinism verification).
    Hash,

    /// End the session.
    Quit,

    /// Deploy an ally of the given type.
    Deploy { unit_type: String, x: f64, y: f64 },

    /// Deploy the selected ally type in response to a lane click.
    DeploySelected { x: f64, y: f64 },

    /// Pause or resume.
    TogglePause,

    /// Select the ally type used by `deploy_selected`.
    SelectUnitType { key: String },

    /// Change the speed multiplier.
    SetSpeed { multiplier: f64 },

    /// Start running frames.
    Start,

    /// Stop running frames.
    Stop,
}

fn default_tick_count() -> u32 {
    1
}

fn default_tick_dt() -> f64 {
    1.0 / 60.0
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready { version: String, frame: u64 },

    /// A command took effect.
    Ack { cmd: String },

    /// An ally was deployed.
    Deployed {
        entity_id: EntityId,
        unit_type: String,
    },

    /// A command was rejected or could not be parsed.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Full match state.
    State {
        #[serde(flatten)]
        snapshot: MatchSnapshot,
        hash: u64,
    },

    /// State hash at a frame.
    StateHash { frame: u64, hash: u64 },

    /// Session ended.
    Bye,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(frame: u64) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            frame,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"Serialization failed: {e}","cmd":null}}"#)
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tick { .. } => "tick",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Quit => "quit",
            Self::Deploy { .. } => "deploy",
            Self::DeploySelected { .. } => "deploy_selected",
            Self::TogglePause => "toggle_pause",
            Self::SelectUnitType { .. } => "select_unit_type",
            Self::SetSpeed { .. } => "set_speed",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }

    /// The player command this maps to, if any. Session commands
    /// (tick, query, hash, quit) return `None`.
    pub fn into_player_command(self) -> Option<PlayerCommand> {
        match self {
            Self::Deploy { unit_type, x, y } => Some(PlayerCommand::Deploy { unit_type, x, y }),
            Self::DeploySelected { x, y } => Some(PlayerCommand::DeploySelected { x, y }),
            Self::TogglePause => Some(PlayerCommand::TogglePause),
            Self::SelectUnitType { key } => Some(PlayerCommand::SelectUnitType { key }),
            Self::SetSpeed { multiplier } => Some(PlayerCommand::SetSpeed { multiplier }),
            Self::Start => Some(PlayerCommand::Start),
            Self::Stop => Some(PlayerCommand::Stop),
            Self::Tick { .. } | Self::Query | Self::Hash | Self::Quit => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use void_core::simulation::Match;

    #[test]
    fn test_parse_tick_command() {
        let json = r#"{"cmd":"tick","count":60,"dt":0.05}"#;
        let cmd = Command::from_json(json).unwrap();
        assert_eq!(cmd, Command::Tick { count: 60, dt: 0.05 });
    }

    #[test]
    fn test_default_tick_count() {
        let json = r#"{"cmd":"tick"}"#;
        let cmd = Command::from_json(json).unwrap();
        assert!(matches!(cmd, Command::Tick { count: 1, dt } if (dt - 1.0 / 60.0).abs() < 1e-12));
    }

    #[test]
    fn test_parse_deploy_command() {
        let json = r#"{"cmd":"deploy","unit_type":"tank","x":80.0,"y":300.0}"#;
        let cmd = Command::from_json(json).unwrap();
        assert!(matches!(
            cmd,
            Command::Deploy { ref unit_type, x, y } if unit_type == "tank" && x == 80.0 && y == 300.0
        ));
    }

    #[test]
    fn test_player_command_names_line_up() {
        let commands = [
            Command::Deploy {
                unit_type: "basic".to_string(),
                x: 1.0,
                y: 2.0,
            },
            Command::DeploySelected { x: 1.0, y: 2.0 },
            Command::TogglePause,
            Command::SelectUnitType {
                key: "tank".to_string(),
            },
            Command::SetSpeed { multiplier: 2.0 },
            Command::Start,
            Command::Stop,
        ];
        for command in commands {
            let name = command.name();
            let player = command.into_player_command().unwrap();
            assert_eq!(player.name(), name);
        }
        assert_eq!(Command::Query.into_player_command(), None);
    }

    #[test]
    fn test_recorded_player_input_parses_as_command() {
        let recorded = PlayerCommand::SelectUnitType {
            key: "archer".to_string(),
        };
        let line = serde_json::to_string(&recorded).unwrap();
        let cmd = Command::from_json(&line).unwrap();
        assert_eq!(cmd.into_player_command(), Some(recorded));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Command::from_json(r#"{"cmd":"teleport"}"#).is_err());
    }

    #[test]
    fn test_serialize_state_response() {
        let game = Match::default();
        let resp = Response::State {
            snapshot: game.snapshot(),
            hash: 12345,
        };
        let json = resp.to_json_line();
        assert!(json.ends_with('\n'));
        assert!(json.contains(r#""type":"state""#));
        assert!(json.contains(r#""frame":0"#));
        assert!(json.contains(r#""selected_unit":"basic""#));
        assert!(json.contains(r#""hash":12345"#));
    }

    #[test]
    fn test_serialize_error_response() {
        let json = Response::error("Unknown unit template: dragon", Some("deploy")).to_json_line();
        let value: serde_json::Value = serde_json::from_str(json.trim()).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["cmd"], "deploy");
    }
}
