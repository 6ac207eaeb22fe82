//! # Void Core
//!
//! Deterministic lane battle simulation for Void Frontier.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness (enemy selection uses a seeded RNG)
//! - No floating-point math inside the frame loop (uses fixed-point)
//!
//! The host owns the clock and the screen. It feeds input through
//! [`commands::PlayerCommand`], calls [`simulation::Match::frame`] with the
//! elapsed time, and reads back a [`snapshot::MatchSnapshot`].
//!
//! ## Crate Structure
//!
//! - [`components`] - Unit state machine (movement, cooldown, attack intent)
//! - [`targeting`] - Nearest-in-range target assignment
//! - [`combat`] - Damage application
//! - [`economy`] - Energy pool and death rewards
//! - [`simulation`] - The match controller and frame loop
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod commands;
pub mod components;
pub mod config;
pub mod data;
pub mod economy;
pub mod error;
pub mod factions;
pub mod math;
pub mod notifications;
pub mod simulation;
pub mod snapshot;
pub mod spawner;
pub mod targeting;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{AttackIntent, DamageEvent};
    pub use crate::commands::{CommandOutcome, CommandQueue, PlayerCommand};
    pub use crate::components::{CombatStats, EntityId, FactionTraits, Health, TargetView, Unit};
    pub use crate::config::{Difficulty, MatchConfig};
    pub use crate::data::{AllyTemplate, EnemyTemplate, TemplateRegistry};
    pub use crate::economy::{EnergyPool, RewardPolicy};
    pub use crate::error::{GameError, Result};
    pub use crate::factions::Faction;
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::simulation::{DeathEvent, FrameEvents, Match};
    pub use crate::snapshot::MatchSnapshot;
}
