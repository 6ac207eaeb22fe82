//! Unit data and the per-unit state machine.
//!
//! A [`Unit`] is any combatant on the lane, ally or enemy. The two factions
//! share the same movement, cooldown and attack rules; they only differ in
//! lane direction and in the [`FactionTraits`] payload (deployment cost for
//! allies, death reward for enemies).
//!
//! Units never hold a reference to another unit. The current target is an
//! [`EntityId`] that the controller resolves into a [`TargetView`] before
//! each step; a removed or dead target resolves to nothing and the unit
//! forgets it.

use serde::{Deserialize, Serialize};

use crate::combat::AttackIntent;
use crate::factions::Faction;
use crate::math::{decimal_serde, Fixed, Vec2Fixed};

/// Unique identifier for entities. Allocated from 1 upward, never reused.
pub type EntityId = u64;

/// Health component for damageable units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create new health component at full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if the unit is dead (health == 0).
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Apply damage, returning actual damage dealt.
    /// Uses saturating subtraction to prevent underflow.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.current);
        self.current = self.current.saturating_sub(actual);
        actual
    }
}

/// Combat stats component.
///
/// Cooldowns are measured in seconds of simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    /// Damage per attack.
    pub damage: u32,
    /// Attack range in lane units (inclusive).
    #[serde(with = "decimal_serde")]
    pub range: Fixed,
    /// Seconds between attacks.
    #[serde(with = "decimal_serde")]
    pub attack_cooldown: Fixed,
    /// Seconds until the next attack is allowed. Never negative.
    #[serde(with = "decimal_serde")]
    pub cooldown_remaining: Fixed,
}

impl CombatStats {
    /// Create combat stats ready to attack immediately.
    #[must_use]
    pub const fn new(damage: u32, range: Fixed, attack_cooldown: Fixed) -> Self {
        Self {
            damage,
            range,
            attack_cooldown,
            cooldown_remaining: Fixed::ZERO,
        }
    }

    /// Check if ready to attack.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.cooldown_remaining == Fixed::ZERO
    }

    /// Reset cooldown after attacking.
    pub fn reset_cooldown(&mut self) {
        self.cooldown_remaining = self.attack_cooldown;
    }

    /// Tick down the cooldown by `dt` seconds, floored at zero.
    pub fn tick_cooldown(&mut self, dt: Fixed) {
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(Fixed::ZERO);
    }
}

/// Faction-specific payload carried by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactionTraits {
    /// A player-deployed unit.
    Ally {
        /// Energy paid to deploy this unit. The controller checks it, the
        /// unit never does.
        deployment_cost: u32,
    },
    /// A spawned invader.
    Enemy {
        /// Energy credited to the player when this unit is reclaimed.
        reward: u32,
    },
}

impl FactionTraits {
    /// The faction these traits belong to.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        match self {
            Self::Ally { .. } => Faction::Ally,
            Self::Enemy { .. } => Faction::Enemy,
        }
    }
}

/// What a unit is allowed to know about its target during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetView {
    /// Target entity.
    pub id: EntityId,
    /// Target position at the time of the lookup.
    pub position: Vec2Fixed,
    /// Whether the target is still alive.
    pub alive: bool,
}

/// Parameters for spawning a new unit.
#[derive(Debug, Clone)]
pub struct UnitSpawnParams {
    /// Template key the unit was built from.
    pub template: String,
    /// Initial position.
    pub position: Vec2Fixed,
    /// Maximum health (unit starts at full health).
    pub health: u32,
    /// Lane speed in units per second.
    pub speed: Fixed,
    /// Combat statistics.
    pub combat: CombatStats,
    /// Faction payload.
    pub traits: FactionTraits,
}

/// A combatant on the lane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Unique identifier for this unit.
    pub id: EntityId,
    /// Template key the unit was built from.
    pub template: String,
    /// World position. `y` never changes after spawn.
    pub position: Vec2Fixed,
    /// Lane speed in units per second.
    pub speed: Fixed,
    /// Lane direction, +1 or -1.
    pub direction: i32,
    /// Health.
    pub health: Health,
    /// Combat statistics.
    pub combat: CombatStats,
    /// Faction payload.
    pub traits: FactionTraits,
    target: Option<EntityId>,
    alive: bool,
    moving: bool,
}

impl Unit {
    /// Build a unit from spawn parameters.
    #[must_use]
    pub fn from_params(id: EntityId, params: UnitSpawnParams) -> Self {
        let faction = params.traits.faction();
        Self {
            id,
            template: params.template,
            position: params.position,
            speed: params.speed,
            direction: faction.lane_direction(),
            health: Health::new(params.health),
            combat: params.combat,
            traits: params.traits,
            target: None,
            alive: params.health > 0,
            moving: true,
        }
    }

    /// The unit's faction.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.traits.faction()
    }

    /// Whether the unit is alive. Once false, never true again.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Whether the unit is walking the lane (not engaged with an in-range target).
    #[must_use]
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    /// Current target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Replace the current target. No validation; the targeting resolver
    /// only ever assigns live opponents.
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    /// Energy yielded on death. Zero for allies.
    #[must_use]
    pub const fn reward_on_death(&self) -> u32 {
        match self.traits {
            FactionTraits::Enemy { reward } => reward,
            FactionTraits::Ally { .. } => 0,
        }
    }

    /// Deployment cost, for allies only.
    #[must_use]
    pub const fn deployment_cost(&self) -> Option<u32> {
        match self.traits {
            FactionTraits::Ally { deployment_cost } => Some(deployment_cost),
            FactionTraits::Enemy { .. } => None,
        }
    }

    /// Inclusive Euclidean range check against a point.
    #[must_use]
    pub fn is_in_range(&self, point: Vec2Fixed) -> bool {
        let range = self.combat.range;
        self.position.distance_squared(point) <= range.saturating_mul(range)
    }

    /// Apply damage, clamping at zero. Returns the damage actually taken.
    ///
    /// The alive flag flips to false the first time health reaches zero.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        let dealt = self.health.apply_damage(amount);
        if self.health.is_dead() {
            self.alive = false;
        }
        dealt
    }

    /// Advance one frame: tick cooldown, move, then attack if possible.
    ///
    /// `target` must be the resolved view of [`Self::target`]. Does nothing
    /// for a dead unit.
    pub fn step(&mut self, dt: Fixed, target: Option<TargetView>) -> Option<AttackIntent> {
        if !self.alive {
            return None;
        }
        self.advance(dt, target);
        self.engage(target)
    }

    /// Movement half of a step: cooldown and lane movement.
    ///
    /// Units hold position while they have a target.
    pub fn advance(&mut self, dt: Fixed, target: Option<TargetView>) {
        if !self.alive {
            return;
        }
        self.combat.tick_cooldown(dt);
        if self.sync_target(target).is_none() {
            let step = self.speed.saturating_mul(dt);
            self.position.x = if self.direction < 0 {
                self.position.x.saturating_sub(step)
            } else {
                self.position.x.saturating_add(step)
            };
        }
    }

    /// Attack half of a step.
    ///
    /// Returns an intent when the target is alive, in range, and the
    /// cooldown has elapsed; the cooldown restarts immediately. Damage is
    /// applied later by the controller.
    pub fn engage(&mut self, target: Option<TargetView>) -> Option<AttackIntent> {
        if !self.alive {
            return None;
        }
        let target = self.sync_target(target);
        let in_range = target.is_some_and(|t| self.is_in_range(t.position));
        self.moving = !in_range;

        let target = target?;
        if !in_range || !self.combat.can_attack() {
            return None;
        }
        self.combat.reset_cooldown();
        Some(AttackIntent {
            attacker: self.id,
            target: target.id,
            damage: self.combat.damage,
        })
    }

    /// Drop the target reference if the view does not confirm a live target.
    fn sync_target(&mut self, view: Option<TargetView>) -> Option<TargetView> {
        match (self.target, view) {
            (Some(id), Some(view)) if view.id == id && view.alive => Some(view),
            _ => {
                self.target = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(id: EntityId, x: i32, traits: FactionTraits) -> Unit {
        Unit::from_params(
            id,
            UnitSpawnParams {
                template: "test".to_string(),
                position: Vec2Fixed::new(Fixed::from_num(x), Fixed::from_num(300)),
                health: 40,
                speed: Fixed::from_num(10),
                combat: CombatStats::new(15, Fixed::from_num(50), Fixed::from_num(1)),
                traits,
            },
        )
    }

    fn ally(id: EntityId, x: i32) -> Unit {
        unit(id, x, FactionTraits::Ally { deployment_cost: 50 })
    }

    fn enemy(id: EntityId, x: i32) -> Unit {
        unit(id, x, FactionTraits::Enemy { reward: 20 })
    }

    fn view_of(unit: &Unit) -> TargetView {
        TargetView {
            id: unit.id,
            position: unit.position,
            alive: unit.is_alive(),
        }
    }

    #[test]
    fn test_health_apply_damage_saturates() {
        let mut health = Health::new(100);
        assert_eq!(health.apply_damage(30), 30);
        assert_eq!(health.current, 70);
        assert_eq!(health.apply_damage(100), 70);
        assert_eq!(health.current, 0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_directions_follow_faction() {
        assert_eq!(ally(1, 0).direction, 1);
        assert_eq!(enemy(2, 0).direction, -1);
    }

    #[test]
    fn test_move_without_target() {
        let mut a = ally(1, 100);
        let mut e = enemy(2, 500);
        a.step(Fixed::from_num(0.5), None);
        e.step(Fixed::from_num(0.5), None);
        assert_eq!(a.position.x, Fixed::from_num(105));
        assert_eq!(e.position.x, Fixed::from_num(495));
        assert_eq!(a.position.y, Fixed::from_num(300));
        assert!(a.is_moving());
    }

    #[test]
    fn test_movement_saturates_at_fixed_limits() {
        let mut a = ally(1, 0);
        let mut e = enemy(2, 0);
        a.position.x = Fixed::MAX - Fixed::from_num(1);
        e.position.x = Fixed::MIN + Fixed::from_num(1);
        a.step(Fixed::from_num(0.25), None);
        e.step(Fixed::from_num(0.25), None);
        assert_eq!(a.position.x, Fixed::MAX);
        assert_eq!(e.position.x, Fixed::MIN);
    }

    #[test]
    fn test_combat_stats_ron_uses_decimals() {
        let stats = CombatStats::new(12, Fixed::from_num(70), Fixed::from_num(1.5));
        let text = ron::to_string(&stats).unwrap();
        assert!(text.contains("attack_cooldown:1.5"), "{text}");
        let parsed: CombatStats = ron::from_str(&text).unwrap();
        assert_eq!(parsed, stats);
    }

    #[test]
    fn test_holds_position_with_target() {
        let mut a = ally(1, 100);
        let e = enemy(2, 140);
        a.set_target(Some(e.id));
        let intent = a.step(Fixed::from_num(1), Some(view_of(&e)));
        assert_eq!(a.position.x, Fixed::from_num(100));
        assert!(!a.is_moving());
        assert_eq!(
            intent,
            Some(AttackIntent {
                attacker: 1,
                target: 2,
                damage: 15
            })
        );
        assert_eq!(a.combat.cooldown_remaining, Fixed::from_num(1));
    }

    #[test]
    fn test_no_attack_during_cooldown() {
        let mut a = ally(1, 100);
        let e = enemy(2, 140);
        a.set_target(Some(e.id));
        a.combat.cooldown_remaining = Fixed::from_num(0.75);

        let intent = a.step(Fixed::from_num(0.5), Some(view_of(&e)));
        assert!(intent.is_none());
        assert_eq!(a.combat.cooldown_remaining, Fixed::from_num(0.25));

        // Cooldown floors at zero, and the attack happens once it does.
        let intent = a.step(Fixed::from_num(0.5), Some(view_of(&e)));
        assert!(intent.is_some());
        assert_eq!(a.combat.cooldown_remaining, a.combat.attack_cooldown);
    }

    #[test]
    fn test_no_attack_out_of_range() {
        let mut a = ally(1, 100);
        let e = enemy(2, 151);
        a.set_target(Some(e.id));
        let intent = a.step(Fixed::from_num(0.1), Some(view_of(&e)));
        assert!(intent.is_none());
        assert!(a.is_moving());
        assert_eq!(a.combat.cooldown_remaining, Fixed::ZERO);
    }

    #[test]
    fn test_range_boundary_is_inclusive() {
        let a = ally(1, 100);
        assert!(a.is_in_range(Vec2Fixed::new(Fixed::from_num(150), Fixed::from_num(300))));
        assert!(a.is_in_range(Vec2Fixed::new(Fixed::from_num(130), Fixed::from_num(340))));
        assert!(!a.is_in_range(Vec2Fixed::new(Fixed::from_num(131), Fixed::from_num(340))));
    }

    #[test]
    fn test_dead_target_is_forgotten() {
        let mut a = ally(1, 100);
        let mut e = enemy(2, 140);
        e.apply_damage(1000);
        a.set_target(Some(e.id));

        let intent = a.step(Fixed::from_num(1), Some(view_of(&e)));
        assert!(intent.is_none());
        assert_eq!(a.target(), None);
        // No target means it walks on.
        assert_eq!(a.position.x, Fixed::from_num(110));
    }

    #[test]
    fn test_missing_target_is_forgotten() {
        let mut a = ally(1, 100);
        a.set_target(Some(99));
        a.step(Fixed::from_num(1), None);
        assert_eq!(a.target(), None);
    }

    #[test]
    fn test_dead_unit_step_is_noop() {
        let mut a = ally(1, 100);
        a.apply_damage(40);
        let before = a.clone();
        assert!(a.step(Fixed::from_num(1), None).is_none());
        assert_eq!(a, before);
    }

    #[test]
    fn test_alive_flag_flips_once() {
        let mut e = enemy(2, 0);
        assert_eq!(e.apply_damage(39), 39);
        assert!(e.is_alive());
        assert_eq!(e.apply_damage(5), 1);
        assert!(!e.is_alive());
        assert_eq!(e.apply_damage(5), 0);
        assert!(!e.is_alive());
        assert_eq!(e.health.current, 0);
    }

    #[test]
    fn test_faction_payload() {
        assert_eq!(ally(1, 0).deployment_cost(), Some(50));
        assert_eq!(ally(1, 0).reward_on_death(), 0);
        assert_eq!(enemy(2, 0).deployment_cost(), None);
        assert_eq!(enemy(2, 0).reward_on_death(), 20);
    }
}
