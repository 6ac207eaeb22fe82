//! Per-frame target assignment.
//!
//! Every frame, after all units have stepped, each living unit rescans
//! every living opponent and locks onto the nearest one within its own
//! range. The full O(|A|·|B|) rescan is intentional: assignments always
//! reflect current positions and liveness, so a unit whose target died or
//! walked away re-acquires on the same frame.
//!
//! Ties on distance go to the lowest entity id. Candidates are scanned in
//! ascending id order and only a strictly closer one replaces the current
//! best.

use std::collections::BTreeSet;

use crate::components::{EntityId, Unit};
use crate::factions::Faction;
use crate::simulation::EntityStorage;

/// Find the nearest living candidate within `seeker`'s attack range.
#[must_use]
pub fn nearest_in_range(
    storage: &EntityStorage,
    seeker: &Unit,
    candidates: &BTreeSet<EntityId>,
) -> Option<EntityId> {
    let range_sq = seeker.combat.range.saturating_mul(seeker.combat.range);
    let mut best = None;

    for &id in candidates {
        let Some(candidate) = storage.get(id) else {
            continue;
        };
        if !candidate.is_alive() {
            continue;
        }

        let dist_sq = seeker.position.distance_squared(candidate.position);
        if dist_sq > range_sq {
            continue;
        }
        match best {
            Some((_, best_dist)) if dist_sq >= best_dist => {}
            _ => best = Some((id, dist_sq)),
        }
    }

    best.map(|(id, _)| id)
}

/// Reassign targets for both factions.
///
/// Dead units are skipped and keep whatever they had; they are reclaimed
/// before anything reads it. Returns how many units ended up engaged.
pub fn resolve_targets(
    storage: &mut EntityStorage,
    allies: &BTreeSet<EntityId>,
    enemies: &BTreeSet<EntityId>,
) -> usize {
    let mut assignments = Vec::with_capacity(allies.len() + enemies.len());

    let roster = |faction: Faction| match faction {
        Faction::Ally => allies,
        Faction::Enemy => enemies,
    };

    for faction in [Faction::Ally, Faction::Enemy] {
        let opponents = roster(faction.opponent());
        for &id in roster(faction) {
            let Some(seeker) = storage.get(id) else {
                continue;
            };
            if !seeker.is_alive() {
                continue;
            }
            assignments.push((id, nearest_in_range(storage, seeker, opponents)));
        }
    }

    let mut engaged = 0;
    for (id, target) in assignments {
        if let Some(unit) = storage.get_mut(id) {
            unit.set_target(target);
            engaged += usize::from(target.is_some());
        }
    }
    engaged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{CombatStats, FactionTraits, UnitSpawnParams};
    use crate::math::{Fixed, Vec2Fixed};

    fn spawn(storage: &mut EntityStorage, x: i32, y: i32, range: i32, ally: bool) -> EntityId {
        let traits = if ally {
            FactionTraits::Ally { deployment_cost: 50 }
        } else {
            FactionTraits::Enemy { reward: 20 }
        };
        storage.insert(UnitSpawnParams {
            template: "test".to_string(),
            position: Vec2Fixed::new(Fixed::from_num(x), Fixed::from_num(y)),
            health: 50,
            speed: Fixed::from_num(10),
            combat: CombatStats::new(10, Fixed::from_num(range), Fixed::from_num(1)),
            traits,
        })
    }

    #[test]
    fn test_picks_nearest_in_range() {
        let mut storage = EntityStorage::new();
        let a = spawn(&mut storage, 100, 300, 100, true);
        let far = spawn(&mut storage, 190, 300, 70, false);
        let near = spawn(&mut storage, 150, 300, 70, false);

        let allies = BTreeSet::from([a]);
        let enemies = BTreeSet::from([far, near]);
        resolve_targets(&mut storage, &allies, &enemies);

        assert_eq!(storage.get(a).unwrap().target(), Some(near));
        assert_eq!(storage.get(near).unwrap().target(), Some(a));
        // 90 away with range 70: out of reach.
        assert_eq!(storage.get(far).unwrap().target(), None);
    }

    #[test]
    fn test_tie_goes_to_lowest_id() {
        let mut storage = EntityStorage::new();
        let a = spawn(&mut storage, 100, 300, 100, true);
        let first = spawn(&mut storage, 150, 300, 10, false);
        let second = spawn(&mut storage, 50, 300, 10, false);

        let allies = BTreeSet::from([a]);
        let enemies = BTreeSet::from([second, first]);
        resolve_targets(&mut storage, &allies, &enemies);
        assert_eq!(storage.get(a).unwrap().target(), Some(first.min(second)));
    }

    #[test]
    fn test_dead_candidates_ignored_and_stale_targets_cleared() {
        let mut storage = EntityStorage::new();
        let a = spawn(&mut storage, 100, 300, 100, true);
        let e = spawn(&mut storage, 120, 300, 70, false);
        storage.get_mut(a).unwrap().set_target(Some(e));
        storage.get_mut(e).unwrap().apply_damage(1000);

        let allies = BTreeSet::from([a]);
        let enemies = BTreeSet::from([e]);
        let engaged = resolve_targets(&mut storage, &allies, &enemies);
        assert_eq!(engaged, 0);
        assert_eq!(storage.get(a).unwrap().target(), None);
    }

    #[test]
    fn test_ranges_are_asymmetric() {
        let mut storage = EntityStorage::new();
        let archer = spawn(&mut storage, 100, 300, 180, true);
        let grunt = spawn(&mut storage, 250, 300, 70, false);

        let allies = BTreeSet::from([archer]);
        let enemies = BTreeSet::from([grunt]);
        assert_eq!(resolve_targets(&mut storage, &allies, &enemies), 1);
        assert_eq!(storage.get(archer).unwrap().target(), Some(grunt));
        assert_eq!(storage.get(grunt).unwrap().target(), None);
    }
}
