//! Energy economy.
//!
//! Energy regenerates passively, is earned when enemies are reclaimed, and
//! is spent to deploy allies. The pool is always within `[0, max]`.

use serde::{Deserialize, Serialize};

use crate::math::{decimal_serde, Fixed};

/// How an enemy's death reward is derived from its stats when the template
/// does not name one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardPolicy {
    /// `floor(max_hp / divisor) + bonus`.
    Formula {
        /// Health divisor.
        divisor: u32,
        /// Flat bonus added on top.
        bonus: u32,
    },
    /// Same reward for every enemy.
    Flat(u32),
}

impl RewardPolicy {
    /// Reward for an enemy with the given max health.
    #[must_use]
    pub fn reward_for(self, max_hp: u32) -> u32 {
        match self {
            Self::Formula { divisor, bonus } => {
                let scaled = max_hp.checked_div(divisor).unwrap_or(0);
                scaled.saturating_add(bonus)
            }
            Self::Flat(amount) => amount,
        }
    }
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self::Formula {
            divisor: 4,
            bonus: 10,
        }
    }
}

/// The player's energy pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyPool {
    /// Current energy.
    #[serde(with = "decimal_serde")]
    current: Fixed,
    /// Maximum energy.
    #[serde(with = "decimal_serde")]
    max: Fixed,
    /// Passive regeneration per second.
    #[serde(with = "decimal_serde")]
    regen_rate: Fixed,
}

impl EnergyPool {
    /// Create a pool. The starting amount is clamped into `[0, max]`.
    #[must_use]
    pub fn new(initial: Fixed, max: Fixed, regen_rate: Fixed) -> Self {
        let max = max.max(Fixed::ZERO);
        Self {
            current: initial.clamp(Fixed::ZERO, max),
            max,
            regen_rate,
        }
    }

    /// Current energy.
    #[must_use]
    pub const fn current(&self) -> Fixed {
        self.current
    }

    /// Maximum energy.
    #[must_use]
    pub const fn max(&self) -> Fixed {
        self.max
    }

    /// Passive regeneration per second.
    #[must_use]
    pub const fn regen_rate(&self) -> Fixed {
        self.regen_rate
    }

    /// Whole units of energy available, rounded down.
    #[must_use]
    pub fn whole(&self) -> u32 {
        self.current.to_num::<i64>().clamp(0, i64::from(u32::MAX)) as u32
    }

    /// Check available headroom below the cap.
    #[must_use]
    pub fn available_capacity(&self) -> Fixed {
        self.max - self.current
    }

    /// Apply passive regeneration for `dt` seconds.
    pub fn regenerate(&mut self, dt: Fixed) {
        let gained = self.regen_rate.saturating_mul(dt);
        self.current = self.current.saturating_add(gained).clamp(Fixed::ZERO, self.max);
    }

    /// Deposit energy, respecting the cap.
    ///
    /// Returns the amount actually deposited.
    pub fn deposit(&mut self, amount: u32) -> Fixed {
        let deposited = Fixed::saturating_from_num(amount).min(self.available_capacity());
        self.current += deposited;
        deposited
    }

    /// Check if the pool can cover a cost.
    #[must_use]
    pub fn can_afford(&self, cost: u32) -> bool {
        self.current >= Fixed::saturating_from_num(cost)
    }

    /// Spend energy if available.
    ///
    /// Returns true if the transaction succeeded; on failure nothing changes.
    pub fn spend(&mut self, cost: u32) -> bool {
        if self.can_afford(cost) {
            self.current -= Fixed::saturating_from_num(cost);
            true
        } else {
            false
        }
    }
}
