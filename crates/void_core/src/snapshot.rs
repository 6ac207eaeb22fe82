//! Read-only view of a match for the rendering layer.
//!
//! Built after a frame completes. Values are plain `f64` because renderers
//! and JSON consumers want floats; nothing here feeds back into the
//! simulation.

use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::factions::Faction;

/// One unit as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Entity id.
    pub id: EntityId,
    /// Owning faction.
    pub faction: Faction,
    /// Template key.
    pub template: String,
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Current health.
    pub hp: u32,
    /// Maximum health.
    pub max_hp: u32,
    /// Whether the unit is alive. A unit killed this frame shows `false`
    /// until the next reclaim phase removes it.
    pub alive: bool,
    /// Whether the unit is walking (not engaged).
    pub moving: bool,
    /// Attack range, for range rings.
    pub range: f64,
    /// Position of the current target, if it still exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_position: Option<(f64, f64)>,
}

/// Energy totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergySnapshot {
    /// Current energy.
    pub current: f64,
    /// Energy cap.
    pub max: f64,
}

/// A reward popup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NotificationSnapshot {
    /// Position x.
    pub x: f64,
    /// Position y.
    pub y: f64,
    /// Energy amount shown.
    pub amount: u32,
    /// 1.0 when fresh, falling to 0.0; use as opacity.
    pub remaining_life_fraction: f64,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Frames simulated so far.
    pub frame: u64,
    /// Whether frames are being simulated.
    pub running: bool,
    /// Whether the match is paused.
    pub paused: bool,
    /// Current speed multiplier.
    pub speed_multiplier: f64,
    /// Ally type used by deploy-selected.
    pub selected_unit: String,
    /// Energy totals.
    pub energy: EnergySnapshot,
    /// Units in ascending id order.
    pub units: Vec<UnitSnapshot>,
    /// Live notifications, oldest first.
    pub notifications: Vec<NotificationSnapshot>,
}

impl MatchSnapshot {
    /// Units belonging to one faction.
    pub fn units_of(&self, faction: Faction) -> impl Iterator<Item = &UnitSnapshot> {
        self.units.iter().filter(move |u| u.faction == faction)
    }
}
