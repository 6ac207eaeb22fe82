//! Match configuration.
//!
//! Everything the frame loop needs that is not a unit template: the energy
//! economy, spawn cadence, lane geometry, speed bounds, frame clamping and
//! notification tuning. Loaded from RON by the host, validated once.

use serde::{Deserialize, Serialize};

use crate::economy::RewardPolicy;
use crate::error::{GameError, Result};
use crate::math::{decimal_serde, Fixed};

/// Static difficulty preset, applied once when a match is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// Slower spawns, weaker enemies, faster regeneration.
    Easy,
    /// Template values as written.
    #[default]
    Normal,
    /// Faster spawns, tougher enemies, slower regeneration.
    Hard,
}

impl Difficulty {
    /// Spawn rate in percent; the interval is divided by it.
    #[must_use]
    pub const fn spawn_rate_percent(self) -> u32 {
        match self {
            Self::Easy => 70,
            Self::Normal => 100,
            Self::Hard => 150,
        }
    }

    /// Enemy health in percent of the template value.
    #[must_use]
    pub const fn enemy_health_percent(self) -> u32 {
        match self {
            Self::Easy => 80,
            Self::Normal => 100,
            Self::Hard => 130,
        }
    }

    /// Energy regeneration in percent of the configured rate.
    #[must_use]
    pub const fn energy_regen_percent(self) -> u32 {
        match self {
            Self::Easy => 120,
            Self::Normal => 100,
            Self::Hard => 80,
        }
    }
}

/// Configuration for one match.
///
/// # Example RON
///
/// ```ron
/// MatchConfig(
///     initial_energy: 150.0,
///     max_energy: 300.0,
///     energy_regen_rate: 3.0,
///     spawn_interval: 2.0,
///     difficulty: Hard,
///     seed: 42,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Energy at match start.
    #[serde(with = "decimal_serde")]
    pub initial_energy: Fixed,
    /// Energy cap.
    #[serde(with = "decimal_serde")]
    pub max_energy: Fixed,
    /// Passive energy per second.
    #[serde(with = "decimal_serde")]
    pub energy_regen_rate: Fixed,
    /// Seconds between enemy spawns.
    #[serde(with = "decimal_serde")]
    pub spawn_interval: Fixed,
    /// The lane's y coordinate; every unit lives on it.
    #[serde(with = "decimal_serde")]
    pub lane_y: Fixed,
    /// Lane length. Deploy clicks on the left half are accepted.
    #[serde(with = "decimal_serde")]
    pub lane_width: Fixed,
    /// Where allies appear on a default deploy.
    #[serde(with = "decimal_serde")]
    pub ally_deploy_x: Fixed,
    /// Where enemies appear.
    #[serde(with = "decimal_serde")]
    pub enemy_spawn_x: Fixed,
    /// Slowest allowed speed multiplier.
    #[serde(with = "decimal_serde")]
    pub min_speed: Fixed,
    /// Fastest allowed speed multiplier.
    #[serde(with = "decimal_serde")]
    pub max_speed: Fixed,
    /// Longest real-time frame delta accepted; longer frames are clamped.
    #[serde(with = "decimal_serde")]
    pub max_frame_delta: Fixed,
    /// Seconds a reward notification stays visible.
    #[serde(with = "decimal_serde")]
    pub notification_lifetime: Fixed,
    /// Upward drift of reward notifications, units per second.
    #[serde(with = "decimal_serde")]
    pub notification_rise_speed: Fixed,
    /// Reward for enemies whose template names none.
    pub reward_policy: RewardPolicy,
    /// Static difficulty preset.
    pub difficulty: Difficulty,
    /// Seed for enemy selection.
    pub seed: u64,
    /// Ally type selected at start.
    pub default_unit: String,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            initial_energy: Fixed::from_num(150),
            max_energy: Fixed::from_num(300),
            energy_regen_rate: Fixed::from_num(3),
            spawn_interval: Fixed::from_num(2),
            lane_y: Fixed::from_num(300),
            lane_width: Fixed::from_num(1200),
            ally_deploy_x: Fixed::from_num(80),
            enemy_spawn_x: Fixed::from_num(1120),
            min_speed: Fixed::from_num(0.5),
            max_speed: Fixed::from_num(3),
            max_frame_delta: Fixed::from_num(0.25),
            notification_lifetime: Fixed::ONE,
            notification_rise_speed: Fixed::from_num(30),
            reward_policy: RewardPolicy::default(),
            difficulty: Difficulty::Normal,
            seed: 0,
            default_unit: "basic".to_string(),
        }
    }
}

impl MatchConfig {
    /// Parse a config from RON text. Missing fields take their defaults.
    pub fn from_ron_str(source: &str, text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })
    }

    /// Spawn interval after difficulty scaling.
    #[must_use]
    pub fn effective_spawn_interval(&self) -> Fixed {
        let percent = Fixed::from_num(self.difficulty.spawn_rate_percent());
        self.spawn_interval
            .saturating_mul(Fixed::from_num(100))
            .checked_div(percent)
            .unwrap_or(self.spawn_interval)
    }

    /// Regeneration rate after difficulty scaling.
    #[must_use]
    pub fn effective_regen_rate(&self) -> Fixed {
        let percent = Fixed::from_num(self.difficulty.energy_regen_percent());
        self.energy_regen_rate.saturating_mul(percent) / Fixed::from_num(100)
    }

    /// Enemy max health after difficulty scaling, rounded down, at least 1.
    #[must_use]
    pub fn scaled_enemy_hp(&self, hp: u32) -> u32 {
        let scaled = u64::from(hp) * u64::from(self.difficulty.enemy_health_percent()) / 100;
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    }

    /// Check that every value is usable, returning all problems.
    #[must_use]
    pub fn validate(&self) -> Vec<GameError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, message: &str| {
            if !ok {
                errors.push(GameError::InvalidConfig(message.to_string()));
            }
        };

        check(self.max_energy >= Fixed::ZERO, "max_energy must not be negative");
        check(
            self.initial_energy >= Fixed::ZERO,
            "initial_energy must not be negative",
        );
        check(
            self.energy_regen_rate >= Fixed::ZERO,
            "energy_regen_rate must not be negative",
        );
        check(self.spawn_interval > Fixed::ZERO, "spawn_interval must be positive");
        check(self.min_speed > Fixed::ZERO, "min_speed must be positive");
        check(
            self.max_speed >= self.min_speed,
            "max_speed must not be below min_speed",
        );
        check(
            self.max_frame_delta > Fixed::ZERO,
            "max_frame_delta must be positive",
        );
        check(
            self.notification_lifetime >= Fixed::ZERO,
            "notification_lifetime must not be negative",
        );
        check(!self.default_unit.is_empty(), "default_unit must not be empty");

        errors
    }

    /// Validate, failing on the first problem.
    pub fn ensure_valid(&self) -> Result<()> {
        match self.validate().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
