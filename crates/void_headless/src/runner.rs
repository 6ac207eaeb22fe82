//! Headless runner implementation.

use std::io::{self, BufRead, Write};

use void_core::commands::CommandOutcome;
use void_core::error::GameError;
use void_core::math::fixed_from_f64;
use void_core::simulation::Match;

use crate::protocol::{Command, Response};

/// Most frames one tick command may step: ten simulated minutes at 60 Hz.
pub const MAX_TICKS_PER_COMMAND: u32 = 36_000;

/// Drives one match from protocol commands.
///
/// Each command produces exactly one response. Tick commands step frames
/// back to back, the way a host clock would between two renders.
#[derive(Debug, Clone)]
pub struct HeadlessRunner {
    game: Match,
    auto_state: bool,
    finished: bool,
}

impl HeadlessRunner {
    /// Create a runner around a match.
    pub fn new(game: Match) -> Self {
        Self {
            game,
            auto_state: false,
            finished: false,
        }
    }

    /// Answer tick commands with full state instead of an acknowledgment.
    #[must_use]
    pub fn with_auto_state(mut self, auto_state: bool) -> Self {
        self.auto_state = auto_state;
        self
    }

    /// The match being driven.
    pub fn game(&self) -> &Match {
        &self.game
    }

    /// Whether a quit command has been handled.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The line written before any command is read.
    pub fn greeting(&self) -> Response {
        Response::ready(self.game.frame_count())
    }

    fn state(&self) -> Response {
        Response::State {
            snapshot: self.game.snapshot(),
            hash: self.game.state_hash(),
        }
    }

    /// Handle one command.
    pub fn handle(&mut self, command: Command) -> Response {
        let name = command.name();
        tracing::debug!(cmd = name, frame = self.game.frame_count(), "Handling command");

        match command {
            Command::Tick { count, dt } => {
                if count > MAX_TICKS_PER_COMMAND {
                    let error = GameError::InvalidInput(format!(
                        "tick count {count} exceeds {MAX_TICKS_PER_COMMAND}"
                    ));
                    return Response::error(error.to_string(), Some(name));
                }
                let Some(dt) = fixed_from_f64(dt) else {
                    let error = GameError::InvalidInput(format!("frame delta {dt} is not finite"));
                    return Response::error(error.to_string(), Some(name));
                };
                for _ in 0..count {
                    self.game.frame(dt);
                }
                if self.auto_state {
                    self.state()
                } else {
                    Response::ack(name)
                }
            }
            Command::Query => self.state(),
            Command::Hash => Response::StateHash {
                frame: self.game.frame_count(),
                hash: self.game.state_hash(),
            },
            Command::Quit => {
                self.finished = true;
                Response::Bye
            }
            player => match player.into_player_command() {
                Some(command) => self.apply(name, command),
                None => Response::error("Unsupported command", Some(name)),
            },
        }
    }

    fn apply(&mut self, name: &str, command: void_core::commands::PlayerCommand) -> Response {
        match self.game.apply_command(command) {
            CommandOutcome::Deployed(entity_id) => Response::Deployed {
                entity_id,
                unit_type: self
                    .game
                    .unit(entity_id)
                    .map(|unit| unit.template.clone())
                    .unwrap_or_default(),
            },
            CommandOutcome::Applied => Response::ack(name),
            CommandOutcome::Rejected(error) => Response::error(error.to_string(), Some(name)),
        }
    }

    /// Parse and handle one input line. Blank lines produce nothing.
    pub fn handle_line(&mut self, line: &str) -> Option<Response> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(match Command::from_json(line) {
            Ok(command) => self.handle(command),
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable command line");
                Response::error(format!("Invalid command: {e}"), None)
            }
        })
    }

    /// Run the session: greet, then answer lines until quit or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> io::Result<()> {
        writer.write_all(self.greeting().to_json_line().as_bytes())?;
        writer.flush()?;

        for line in reader.lines() {
            let line = line?;
            if let Some(response) = self.handle_line(&line) {
                writer.write_all(response.to_json_line().as_bytes())?;
                writer.flush()?;
            }
            if self.finished {
                break;
            }
        }

        tracing::info!(frame = self.game.frame_count(), "Session ended");
        Ok(())
    }
}
