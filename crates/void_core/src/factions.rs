//! Faction definitions.

use serde::{Deserialize, Serialize};

/// The two sides of the lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// Player-deployed guardians, advancing toward increasing x.
    Ally,
    /// Spawned invaders, advancing toward decreasing x.
    Enemy,
}

impl Faction {
    /// Default movement direction along the lane (+1 or -1).
    #[must_use]
    pub const fn lane_direction(self) -> i32 {
        match self {
            Self::Ally => 1,
            Self::Enemy => -1,
        }
    }

    /// The faction this one fights.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Ally => Self::Enemy,
            Self::Enemy => Self::Ally,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factions_advance_toward_each_other() {
        assert_eq!(Faction::Ally.lane_direction(), -Faction::Enemy.lane_direction());
    }

    #[test]
    fn test_opponent_is_symmetric() {
        assert_eq!(Faction::Ally.opponent(), Faction::Enemy);
        assert_eq!(Faction::Enemy.opponent().opponent(), Faction::Enemy);
    }
}
