//! Player input.
//!
//! The input layer turns clicks and key presses into [`PlayerCommand`]s.
//! The host either applies them directly with
//! [`Match::apply_command`](crate::simulation::Match::apply_command) or
//! pushes them onto a [`CommandQueue`] and drains it between frames.
//! Commands never run in the middle of a frame.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::error::GameError;

/// A command from the input layer.
///
/// Coordinates and multipliers arrive as host floats and are converted to
/// fixed-point when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    /// Deploy an ally of the given type at a position.
    Deploy {
        /// Ally template key.
        unit_type: String,
        /// Lane x.
        x: f64,
        /// Lane y.
        y: f64,
    },
    /// Deploy the currently selected ally type at a position.
    DeploySelected {
        /// Lane x.
        x: f64,
        /// Lane y.
        y: f64,
    },
    /// Pause or resume.
    TogglePause,
    /// Select the ally type used by [`PlayerCommand::DeploySelected`].
    SelectUnitType {
        /// Ally template key.
        key: String,
    },
    /// Change the simulation speed multiplier.
    SetSpeed {
        /// Requested multiplier; clamped to the configured bounds.
        multiplier: f64,
    },
    /// Start (or resume) running frames.
    Start,
    /// Stop running frames.
    Stop,
}

impl PlayerCommand {
    /// Short name for logs and acknowledgements.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Deploy { .. } => "deploy",
            Self::DeploySelected { .. } => "deploy_selected",
            Self::TogglePause => "toggle_pause",
            Self::SelectUnitType { .. } => "select_unit_type",
            Self::SetSpeed { .. } => "set_speed",
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

/// Result of applying one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// An ally was deployed.
    Deployed(EntityId),
    /// The command took effect.
    Applied,
    /// The command was declined; match state is unchanged.
    Rejected(GameError),
}

impl CommandOutcome {
    /// Whether the command took effect.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Queue of commands waiting for the next frame boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandQueue {
    commands: VecDeque<PlayerCommand>,
}

impl CommandQueue {
    /// Create an empty command queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: VecDeque::new(),
        }
    }

    /// Add a command to the back of the queue.
    pub fn push(&mut self, command: PlayerCommand) {
        self.commands.push_back(command);
    }

    /// Remove and return the oldest command.
    pub fn pop(&mut self) -> Option<PlayerCommand> {
        self.commands.pop_front()
    }

    /// Check if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Get the number of queued commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }
}
