//! Attack resolution.
//!
//! There is no separate combat phase. A unit's step produces an
//! [`AttackIntent`] when its cooldown and range allow, and the controller
//! turns intents into [`DamageEvent`]s once every unit has stepped. Legality
//! depends only on the attacker and its already-assigned target, so there is
//! no event queue to re-enter.

use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::simulation::EntityStorage;

/// An attack a unit committed to during its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackIntent {
    /// The attacking unit.
    pub attacker: EntityId,
    /// The unit being attacked.
    pub target: EntityId,
    /// Damage to deal.
    pub damage: u32,
}

/// Damage that actually landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// The entity dealing damage.
    pub attacker: EntityId,
    /// The entity receiving damage.
    pub target: EntityId,
    /// Amount of damage dealt after clamping to remaining health.
    pub damage: u32,
    /// Whether this hit took the target to zero health.
    pub killed: bool,
}

/// Apply one attack intent to its target.
///
/// Returns `None` if the target is gone or already dead, so a kill is only
/// ever reported once.
pub fn resolve_attack(storage: &mut EntityStorage, intent: AttackIntent) -> Option<DamageEvent> {
    let target = storage.get_mut(intent.target)?;
    if !target.is_alive() {
        return None;
    }

    let damage = target.apply_damage(intent.damage);
    let killed = !target.is_alive();
    if killed {
        tracing::debug!(
            attacker = intent.attacker,
            target = intent.target,
            "Unit killed"
        );
    }

    Some(DamageEvent {
        attacker: intent.attacker,
        target: intent.target,
        damage,
        killed,
    })
}

/// Apply a batch of intents in ascending attacker order.
pub fn resolve_attacks(
    storage: &mut EntityStorage,
    mut intents: Vec<AttackIntent>,
) -> Vec<DamageEvent> {
    intents.sort_by_key(|intent| intent.attacker);
    intents
        .into_iter()
        .filter_map(|intent| resolve_attack(storage, intent))
        .collect()
}
