//! Unit template records.

use serde::{Deserialize, Serialize};

use crate::components::{CombatStats, FactionTraits, UnitSpawnParams};
use crate::math::{decimal_serde, Fixed, Vec2Fixed};

/// Stat profile for a deployable ally.
///
/// # Example RON
///
/// ```ron
/// AllyTemplate(
///     name: "Guardian",
///     hp: 60,
///     speed: 40.0,
///     damage: 20,
///     range: 100.0,
///     attack_cooldown: 1.0,
///     deployment_cost: 50,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllyTemplate {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Maximum health points.
    pub hp: u32,
    /// Lane speed in units per second.
    #[serde(with = "decimal_serde")]
    pub speed: Fixed,
    /// Damage per attack.
    pub damage: u32,
    /// Attack range in lane units.
    #[serde(with = "decimal_serde")]
    pub range: Fixed,
    /// Seconds between attacks.
    #[serde(with = "decimal_serde")]
    pub attack_cooldown: Fixed,
    /// Energy cost to deploy.
    pub deployment_cost: u32,
}

impl AllyTemplate {
    /// Spawn parameters for an ally built from this template.
    #[must_use]
    pub fn spawn_params(&self, key: &str, position: Vec2Fixed) -> UnitSpawnParams {
        UnitSpawnParams {
            template: key.to_string(),
            position,
            health: self.hp,
            speed: self.speed,
            combat: CombatStats::new(self.damage, self.range, self.attack_cooldown),
            traits: FactionTraits::Ally {
                deployment_cost: self.deployment_cost,
            },
        }
    }
}

/// Stat profile for a spawned enemy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Maximum health points.
    pub hp: u32,
    /// Lane speed in units per second.
    #[serde(with = "decimal_serde")]
    pub speed: Fixed,
    /// Damage per attack.
    pub damage: u32,
    /// Attack range in lane units.
    #[serde(with = "decimal_serde")]
    pub range: Fixed,
    /// Seconds between attacks.
    #[serde(with = "decimal_serde")]
    pub attack_cooldown: Fixed,
    /// Explicit death reward. When absent the match's reward policy decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<u32>,
    /// Relative weight in the spawn table. Zero keeps it out of rotation.
    #[serde(default = "default_spawn_weight")]
    pub spawn_weight: u32,
}

/// Default spawn weight for templates without one.
const fn default_spawn_weight() -> u32 {
    1
}

impl EnemyTemplate {
    /// Spawn parameters for an enemy built from this template.
    ///
    /// `hp` and `reward` are passed in because difficulty scaling and the
    /// reward policy belong to the match, not the template.
    #[must_use]
    pub fn spawn_params(
        &self,
        key: &str,
        position: Vec2Fixed,
        hp: u32,
        reward: u32,
    ) -> UnitSpawnParams {
        UnitSpawnParams {
            template: key.to_string(),
            position,
            health: hp,
            speed: self.speed,
            combat: CombatStats::new(self.damage, self.range, self.attack_cooldown),
            traits: FactionTraits::Enemy { reward },
        }
    }
}

/// Shared stat checks, returning one message per problem.
pub(crate) fn stat_problems(hp: u32, speed: Fixed, range: Fixed, cooldown: Fixed) -> Vec<String> {
    let mut problems = Vec::new();
    if hp == 0 {
        problems.push("hp must be positive".to_string());
    }
    if speed < Fixed::ZERO {
        problems.push("speed must not be negative".to_string());
    }
    if range < Fixed::ZERO {
        problems.push("range must not be negative".to_string());
    }
    if cooldown < Fixed::ZERO {
        problems.push("attack_cooldown must not be negative".to_string());
    }
    problems
}
