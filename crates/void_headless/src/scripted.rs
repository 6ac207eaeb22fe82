//! Scripted player for unattended matches.
//!
//! Stands in for the human at the keyboard: works through a rotation of
//! ally types and deploys the next one as soon as energy covers it.

use serde::{Deserialize, Serialize};
use void_core::commands::{CommandOutcome, PlayerCommand};
use void_core::config::MatchConfig;
use void_core::data::TemplateRegistry;
use void_core::error::Result;
use void_core::math::Fixed;
use void_core::simulation::Match;

use crate::metrics::{MatchMetrics, MatchOutcome};

/// Frames per simulated second in scripted runs.
pub const FRAMES_PER_SECOND: u32 = 60;

/// An enemy this far left of the lane origin has reached the player's side.
pub const OVERRUN_X: i32 = -50;

/// A deploy rotation with pacing.
///
/// # Example RON
///
/// ```ron
/// ScriptedPlayer(
///     name: "Archer line",
///     rotation: ["tank", "archer", "archer"],
///     min_gap_frames: 90,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedPlayer {
    /// Label for logs and reports.
    pub name: String,
    /// Ally types deployed in turn, wrapping around.
    pub rotation: Vec<String>,
    /// Frames to wait after a deploy before the next one.
    pub min_gap_frames: u64,
    #[serde(skip)]
    next: usize,
    #[serde(skip)]
    last_deploy_frame: Option<u64>,
}

impl Default for ScriptedPlayer {
    fn default() -> Self {
        Self::new(
            "Balanced",
            ["basic", "basic", "tank", "archer"],
            u64::from(FRAMES_PER_SECOND),
        )
    }
}

impl ScriptedPlayer {
    /// Create a player with a rotation and a gap between deploys.
    pub fn new<I, S>(name: &str, rotation: I, min_gap_frames: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            rotation: rotation.into_iter().map(Into::into).collect(),
            min_gap_frames,
            next: 0,
            last_deploy_frame: None,
        }
    }

    /// Cheapest unit as fast as energy allows.
    #[must_use]
    pub fn rush() -> Self {
        Self::new("Rush", ["basic"], 0)
    }

    /// Slow, heavy line with ranged support.
    #[must_use]
    pub fn turtle() -> Self {
        Self::new(
            "Turtle",
            ["tank", "archer", "archer"],
            u64::from(FRAMES_PER_SECOND) * 3,
        )
    }

    /// Look up a preset by name.
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "balanced" => Some(Self::default()),
            "rush" => Some(Self::rush()),
            "turtle" => Some(Self::turtle()),
            _ => None,
        }
    }

    /// Ally type the player wants next.
    pub fn next_unit(&self) -> Option<&str> {
        if self.rotation.is_empty() {
            return None;
        }
        Some(self.rotation[self.next % self.rotation.len()].as_str())
    }

    /// The command to issue before the coming frame, if any.
    ///
    /// Holds off during the gap after a deploy and while the next unit is
    /// unaffordable. Unknown types are still issued so the rejection moves
    /// the rotation along.
    pub fn decide(&self, game: &Match) -> Option<PlayerCommand> {
        let unit_type = self.next_unit()?;
        if let Some(last) = self.last_deploy_frame {
            if game.frame_count().saturating_sub(last) < self.min_gap_frames {
                return None;
            }
        }
        if let Some(template) = game.templates().ally(unit_type) {
            if !game.energy().can_afford(template.deployment_cost) {
                return None;
            }
        }

        let config = game.config();
        Some(PlayerCommand::Deploy {
            unit_type: unit_type.to_string(),
            x: config.ally_deploy_x.to_num(),
            y: config.lane_y.to_num(),
        })
    }

    /// Account for the outcome of the last decided command.
    pub fn observe(&mut self, outcome: &CommandOutcome, frame: u64) {
        match outcome {
            CommandOutcome::Deployed(_) => {
                self.next += 1;
                self.last_deploy_frame = Some(frame);
            }
            CommandOutcome::Rejected(error) => {
                tracing::debug!(player = %self.name, %error, "Skipping rotation entry");
                self.next += 1;
            }
            CommandOutcome::Applied => {}
        }
    }
}

fn overrun(game: &Match) -> bool {
    let edge = Fixed::from_num(OVERRUN_X);
    game.enemies()
        .iter()
        .filter_map(|&id| game.unit(id).ok())
        .any(|unit| unit.position.x < edge)
}

/// Play one match with a scripted player for up to `duration_seconds` of
/// simulated time at [`FRAMES_PER_SECOND`].
///
/// # Errors
///
/// Returns the validation error if the config or templates are unusable.
pub fn run_scripted_match(
    config: MatchConfig,
    templates: TemplateRegistry,
    mut player: ScriptedPlayer,
    duration_seconds: u32,
) -> Result<MatchMetrics> {
    let mut game = Match::validated(config, templates)?;
    let mut metrics = MatchMetrics::new(game.config().seed);
    let dt = Fixed::ONE / Fixed::from_num(FRAMES_PER_SECOND);
    let frames = u64::from(duration_seconds) * u64::from(FRAMES_PER_SECOND);
    let mut outcome = MatchOutcome::Held;

    game.start();
    for _ in 0..frames {
        if let Some(command) = player.decide(&game) {
            let result = game.apply_command(command);
            if let CommandOutcome::Deployed(id) = result {
                if let Ok(unit) = game.unit(id) {
                    metrics.record_deploy(&unit.template, unit.deployment_cost().unwrap_or(0));
                }
            }
            player.observe(&result, game.frame_count());
        }

        let events = game.frame(dt);
        metrics.record_frame(&game, &events);

        if overrun(&game) {
            outcome = MatchOutcome::Overrun;
            break;
        }
    }

    metrics.finalize(&game, outcome);
    tracing::debug!(
        seed = metrics.seed,
        player = %player.name,
        frames = metrics.frames,
        outcome = ?metrics.outcome,
        kills = metrics.kills,
        "Scripted match finished"
    );
    Ok(metrics)
}
