//! The match controller and frame loop.
//!
//! [`Match`] owns every piece of match state and advances it one frame at a
//! time. The host owns the clock: it calls [`Match::frame`] with the real
//! elapsed time and reads back a [`MatchSnapshot`] for rendering.
//!
//! # Frame order
//!
//! Each frame runs these phases in order:
//! 1. **Regenerate** - passive energy income
//! 2. **Spawn** - at most one enemy when the spawn timer fires
//! 3. **Step** - cooldowns and movement, then attacks, then damage
//! 4. **Target** - every living unit re-acquires the nearest opponent in range
//! 5. **Reclaim** - dead units pay out and leave every collection
//! 6. **Notify** - reward popups drift and fade
//!
//! A unit killed during the step phase is still stored, and still visible
//! to anything that looks it up, until the reclaim phase of the same frame.
//!
//! # Determinism
//!
//! - Fixed-point arithmetic throughout (see [`Fixed`])
//! - Enemy selection draws from a `ChaCha8Rng` seeded from the config
//! - Units are processed in ascending id order
//!
//! # Example
//!
//! ```
//! use void_core::math::{Fixed, Vec2Fixed};
//! use void_core::simulation::Match;
//!
//! let mut game = Match::default();
//! game.start();
//!
//! let ally = game
//!     .deploy("basic", Vec2Fixed::new(Fixed::from_num(80), Fixed::from_num(300)))
//!     .unwrap();
//! game.frame(Fixed::from_num(0.016));
//!
//! assert!(game.entities().contains(ally));
//! assert_eq!(game.frame_count(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::combat::{self, DamageEvent};
use crate::commands::{CommandOutcome, CommandQueue, PlayerCommand};
use crate::components::{EntityId, TargetView, Unit, UnitSpawnParams};
use crate::config::MatchConfig;
use crate::data::TemplateRegistry;
use crate::economy::EnergyPool;
use crate::error::{GameError, Result};
use crate::factions::Faction;
use crate::math::{fixed_from_f64, Fixed, Vec2Fixed};
use crate::notifications::NotificationFeed;
use crate::snapshot::{EnergySnapshot, MatchSnapshot, NotificationSnapshot, UnitSnapshot};
use crate::spawner::{SpawnSchedule, SpawnTable};
use crate::targeting;

/// Storage for all units in the match.
///
/// Uses a `HashMap` for O(1) lookup by id, with deterministic iteration via
/// sorted keys whenever order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStorage {
    /// Map of entity id to unit.
    units: HashMap<EntityId, Unit>,
    /// Next id to assign.
    next_id: EntityId,
}

impl EntityStorage {
    /// Create empty storage. The first id handed out is 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
            next_id: 1,
        }
    }

    /// Build a unit from `params` under a fresh id and return the id.
    pub fn insert(&mut self, params: UnitSpawnParams) -> EntityId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.units.insert(id, Unit::from_params(id, params));
        id
    }

    /// Remove a unit by id.
    pub fn remove(&mut self, id: EntityId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Get a unit by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a mutable reference to a unit by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Check if a unit exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.units.contains_key(&id)
    }

    /// Get the number of stored units, dead ones awaiting reclaim included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Get sorted ids for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.units.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all units (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &Unit)> {
        self.units.iter()
    }

    /// Look up what a unit may see of `id` as a target.
    #[must_use]
    pub fn target_view(&self, id: EntityId) -> Option<TargetView> {
        self.get(id).map(|unit| TargetView {
            id,
            position: unit.position,
            alive: unit.is_alive(),
        })
    }

    /// Resolve the current target of `seeker` into a view.
    ///
    /// `None` when the seeker has no target or the target was reclaimed.
    #[must_use]
    pub fn target_view_of(&self, seeker: EntityId) -> Option<TargetView> {
        let target = self.get(seeker)?.target()?;
        self.target_view(target)
    }
}

/// A unit removed during the reclaim phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathEvent {
    /// The reclaimed unit.
    pub id: EntityId,
    /// Its faction.
    pub faction: Faction,
    /// Its last position.
    pub position: Vec2Fixed,
    /// Energy credited for it (zero for allies). The pool cap may have
    /// absorbed part of it.
    pub reward: u32,
}

/// Everything that happened during one frame.
///
/// Hosts use these to trigger effects and sounds; the simulation never
/// reads them back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameEvents {
    /// Damage that landed during the step phase.
    pub damage: Vec<DamageEvent>,
    /// Units reclaimed this frame, in ascending id order.
    pub deaths: Vec<DeathEvent>,
    /// Enemies spawned by the timer this frame.
    pub spawned: Vec<EntityId>,
}

impl FrameEvents {
    /// Whether nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.damage.is_empty() && self.deaths.is_empty() && self.spawned.is_empty()
    }
}

/// One lane battle.
///
/// Owns the units, the energy pool, the spawn timer and its RNG, and the
/// reward notifications. Nothing is shared or global; two matches built
/// from the same config and templates evolve identically under the same
/// inputs.
#[derive(Debug, Clone)]
pub struct Match {
    config: MatchConfig,
    templates: TemplateRegistry,
    /// Frames simulated so far.
    frame: u64,
    /// Simulated seconds so far, after clamping and speed scaling.
    elapsed: Fixed,
    entities: EntityStorage,
    allies: BTreeSet<EntityId>,
    enemies: BTreeSet<EntityId>,
    energy: EnergyPool,
    schedule: SpawnSchedule,
    spawn_table: SpawnTable,
    rng: ChaCha8Rng,
    notifications: NotificationFeed,
    running: bool,
    paused: bool,
    speed_multiplier: Fixed,
    selected_unit: String,
}

impl Match {
    /// Build a match from a config and a template registry.
    ///
    /// Difficulty scaling is applied here, once. The match starts stopped;
    /// call [`Self::start`] before stepping frames. Inputs are assumed
    /// valid; use [`Self::validated`] for data loaded from disk.
    #[must_use]
    pub fn new(config: MatchConfig, templates: TemplateRegistry) -> Self {
        let energy = EnergyPool::new(
            config.initial_energy,
            config.max_energy,
            config.effective_regen_rate(),
        );
        let schedule = SpawnSchedule::new(config.effective_spawn_interval());
        let spawn_table = SpawnTable::from_registry(&templates);
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let notifications =
            NotificationFeed::new(config.notification_lifetime, config.notification_rise_speed);
        let selected_unit = config.default_unit.clone();

        Self {
            config,
            templates,
            frame: 0,
            elapsed: Fixed::ZERO,
            entities: EntityStorage::new(),
            allies: BTreeSet::new(),
            enemies: BTreeSet::new(),
            energy,
            schedule,
            spawn_table,
            rng,
            notifications,
            running: false,
            paused: false,
            speed_multiplier: Fixed::ONE,
            selected_unit,
        }
    }

    /// Validate the config and templates, then build the match.
    ///
    /// # Errors
    ///
    /// Returns the first config or template problem found, or
    /// [`GameError::UnknownTemplate`] if the default unit is not a
    /// registered ally.
    pub fn validated(config: MatchConfig, templates: TemplateRegistry) -> Result<Self> {
        config.ensure_valid()?;
        templates.ensure_valid()?;
        if templates.ally(&config.default_unit).is_none() {
            return Err(GameError::UnknownTemplate(config.default_unit));
        }
        Ok(Self::new(config, templates))
    }

    /// Frames simulated so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds so far.
    #[must_use]
    pub const fn elapsed(&self) -> Fixed {
        self.elapsed
    }

    /// The match configuration.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// The template registry.
    #[must_use]
    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// All stored units.
    #[must_use]
    pub fn entities(&self) -> &EntityStorage {
        &self.entities
    }

    /// Look up a unit.
    ///
    /// # Errors
    ///
    /// [`GameError::EntityNotFound`] once the unit has been reclaimed.
    pub fn unit(&self, id: EntityId) -> Result<&Unit> {
        self.entities.get(id).ok_or(GameError::EntityNotFound(id))
    }

    /// Ids of stored allies.
    #[must_use]
    pub fn allies(&self) -> &BTreeSet<EntityId> {
        &self.allies
    }

    /// Ids of stored enemies.
    #[must_use]
    pub fn enemies(&self) -> &BTreeSet<EntityId> {
        &self.enemies
    }

    /// The energy pool.
    #[must_use]
    pub fn energy(&self) -> &EnergyPool {
        &self.energy
    }

    /// Live reward notifications.
    #[must_use]
    pub fn notifications(&self) -> &NotificationFeed {
        &self.notifications
    }

    /// Whether frames are being simulated.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the match is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Current speed multiplier.
    #[must_use]
    pub const fn speed_multiplier(&self) -> Fixed {
        self.speed_multiplier
    }

    /// Ally type used by [`Self::deploy_selected`].
    #[must_use]
    pub fn selected_unit(&self) -> &str {
        &self.selected_unit
    }

    /// Advance the match by one frame of `raw_dt` real seconds.
    ///
    /// Does nothing while stopped or paused. Negative deltas count as zero;
    /// the delta is clamped to `max_frame_delta` and then scaled by the
    /// speed multiplier.
    pub fn frame(&mut self, raw_dt: Fixed) -> FrameEvents {
        let mut events = FrameEvents::default();
        if !self.running || self.paused {
            return events;
        }
        let dt = self.scaled_delta(raw_dt);

        // 1. Regenerate
        self.energy.regenerate(dt);

        // 2. Spawn
        if self.schedule.advance(dt) {
            if let Some(id) = self.spawn_from_table() {
                events.spawned.push(id);
            }
        }

        // 3. Step
        events.damage = self.run_step_pass(dt);

        // 4. Target
        let engaged = targeting::resolve_targets(&mut self.entities, &self.allies, &self.enemies);

        // 5. Reclaim
        events.deaths = self.reclaim_dead();

        // 6. Notify
        self.notifications.advance(dt);

        self.frame += 1;
        self.elapsed = self.elapsed.saturating_add(dt);

        tracing::trace!(frame = self.frame, engaged, "Frame complete");
        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(frame = self.frame, state_hash = hash, "Match state hash");
        }

        events
    }

    /// Clamp and scale a raw frame delta.
    fn scaled_delta(&self, raw_dt: Fixed) -> Fixed {
        raw_dt
            .clamp(Fixed::ZERO, self.config.max_frame_delta)
            .saturating_mul(self.speed_multiplier)
    }

    /// Step every unit that was alive at the start of the pass.
    ///
    /// Movement for everyone happens before anyone attacks, and damage is
    /// held back until every attack has been decided, so no unit's outcome
    /// depends on where it sits in the processing order.
    fn run_step_pass(&mut self, dt: Fixed) -> Vec<DamageEvent> {
        let living: Vec<EntityId> = self
            .entities
            .sorted_ids()
            .into_iter()
            .filter(|&id| self.entities.get(id).is_some_and(Unit::is_alive))
            .collect();

        for &id in &living {
            let view = self.entities.target_view_of(id);
            if let Some(unit) = self.entities.get_mut(id) {
                unit.advance(dt, view);
            }
        }

        let mut intents = Vec::new();
        for &id in &living {
            let view = self.entities.target_view_of(id);
            if let Some(intent) = self.entities.get_mut(id).and_then(|unit| unit.engage(view)) {
                intents.push(intent);
            }
        }

        combat::resolve_attacks(&mut self.entities, intents)
    }

    /// Pay out and remove every dead unit, in ascending id order.
    fn reclaim_dead(&mut self) -> Vec<DeathEvent> {
        let dead: Vec<EntityId> = self
            .entities
            .sorted_ids()
            .into_iter()
            .filter(|&id| self.entities.get(id).is_some_and(|unit| !unit.is_alive()))
            .collect();

        let mut deaths = Vec::with_capacity(dead.len());
        for id in dead {
            let Some(unit) = self.entities.remove(id) else {
                continue;
            };
            let faction = unit.faction();
            let reward = unit.reward_on_death();

            match faction {
                Faction::Ally => {
                    self.allies.remove(&id);
                }
                Faction::Enemy => {
                    self.enemies.remove(&id);
                    let credited = self.energy.deposit(reward);
                    self.notifications.push(unit.position, reward);
                    tracing::debug!(
                        id,
                        reward,
                        credited = credited.to_num::<f64>(),
                        "Enemy reclaimed"
                    );
                }
            }

            deaths.push(DeathEvent {
                id,
                faction,
                position: unit.position,
                reward,
            });
        }
        deaths
    }

    /// Pick a weighted enemy type and spawn it.
    fn spawn_from_table(&mut self) -> Option<EntityId> {
        let key = self.spawn_table.choose(&mut self.rng)?.to_string();
        self.spawn_enemy(&key)
    }

    /// Spawn an enemy of type `key` at the enemy spawn point.
    ///
    /// Returns `None` and changes nothing for an unknown key. Health is
    /// scaled by difficulty; the reward comes from the template or, when
    /// it names none, from the reward policy applied to the scaled health.
    pub fn spawn_enemy(&mut self, key: &str) -> Option<EntityId> {
        let template = self.templates.enemy(key)?;
        let hp = self.config.scaled_enemy_hp(template.hp);
        let reward = template
            .reward
            .unwrap_or_else(|| self.config.reward_policy.reward_for(hp));
        let position = Vec2Fixed::new(self.config.enemy_spawn_x, self.config.lane_y);

        let id = self
            .entities
            .insert(template.spawn_params(key, position, hp, reward));
        self.enemies.insert(id);
        tracing::debug!(id, key, hp, reward, "Enemy spawned");
        Some(id)
    }

    /// Deploy an ally of type `unit_type` at `position`.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownTemplate`] for an unregistered type and
    /// [`GameError::InsufficientEnergy`] when the pool cannot cover the
    /// cost. Either way nothing changes.
    pub fn deploy(&mut self, unit_type: &str, position: Vec2Fixed) -> Result<EntityId> {
        let template = self
            .templates
            .ally(unit_type)
            .ok_or_else(|| GameError::UnknownTemplate(unit_type.to_string()))?;
        let cost = template.deployment_cost;
        if !self.energy.spend(cost) {
            return Err(GameError::InsufficientEnergy {
                required: cost,
                available: self.energy.whole(),
            });
        }

        let id = self.entities.insert(template.spawn_params(unit_type, position));
        self.allies.insert(id);
        tracing::debug!(id, unit_type, cost, "Ally deployed");
        Ok(id)
    }

    /// Deploy the selected ally type in response to a lane click.
    ///
    /// Clicks on the left half of the lane deploy at the ally deploy point
    /// on the lane; the click position only decides whether to deploy.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidInput`] for a click on the right half, plus
    /// everything [`Self::deploy`] can return.
    pub fn deploy_selected(&mut self, click: Vec2Fixed) -> Result<EntityId> {
        let half_lane = self.config.lane_width / 2;
        if click.x >= half_lane {
            return Err(GameError::InvalidInput(format!(
                "click at x={} is outside the deploy zone",
                click.x
            )));
        }
        let position = Vec2Fixed::new(self.config.ally_deploy_x, self.config.lane_y);
        let unit_type = self.selected_unit.clone();
        self.deploy(&unit_type, position)
    }

    /// Select the ally type used by [`Self::deploy_selected`].
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownTemplate`] if no ally is registered under `key`.
    pub fn select_unit_type(&mut self, key: &str) -> Result<()> {
        if self.templates.ally(key).is_none() {
            return Err(GameError::UnknownTemplate(key.to_string()));
        }
        self.selected_unit = key.to_string();
        Ok(())
    }

    /// Flip the pause flag.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        tracing::debug!(paused = self.paused, "Pause toggled");
    }

    /// Start running frames.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop running frames. State is kept; [`Self::start`] resumes.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Set the speed multiplier, clamped to the configured bounds.
    ///
    /// Returns the multiplier actually applied.
    pub fn set_speed(&mut self, multiplier: Fixed) -> Fixed {
        self.speed_multiplier = multiplier.clamp(self.config.min_speed, self.config.max_speed);
        self.speed_multiplier
    }

    /// Apply one player command between frames.
    pub fn apply_command(&mut self, command: PlayerCommand) -> CommandOutcome {
        let name = command.name();
        let result = match command {
            PlayerCommand::Deploy { unit_type, x, y } => lane_point(x, y)
                .and_then(|position| self.deploy(&unit_type, position))
                .map(CommandOutcome::Deployed),
            PlayerCommand::DeploySelected { x, y } => lane_point(x, y)
                .and_then(|click| self.deploy_selected(click))
                .map(CommandOutcome::Deployed),
            PlayerCommand::TogglePause => {
                self.toggle_pause();
                Ok(CommandOutcome::Applied)
            }
            PlayerCommand::SelectUnitType { key } => self
                .select_unit_type(&key)
                .map(|()| CommandOutcome::Applied),
            PlayerCommand::SetSpeed { multiplier } => fixed_from_f64(multiplier)
                .ok_or_else(|| {
                    GameError::InvalidInput(format!("speed multiplier {multiplier} is not finite"))
                })
                .map(|multiplier| {
                    self.set_speed(multiplier);
                    CommandOutcome::Applied
                }),
            PlayerCommand::Start => {
                self.start();
                Ok(CommandOutcome::Applied)
            }
            PlayerCommand::Stop => {
                self.stop();
                Ok(CommandOutcome::Applied)
            }
        };

        result.unwrap_or_else(|error| {
            tracing::debug!(command = name, %error, "Command declined");
            CommandOutcome::Rejected(error)
        })
    }

    /// Apply every queued command in order, emptying the queue.
    pub fn drain_commands(&mut self, queue: &mut CommandQueue) -> Vec<CommandOutcome> {
        let mut outcomes = Vec::with_capacity(queue.len());
        while let Some(command) = queue.pop() {
            outcomes.push(self.apply_command(command));
        }
        outcomes
    }

    /// Read-only view of the match for rendering.
    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        let units = self
            .entities
            .sorted_ids()
            .into_iter()
            .filter_map(|id| self.entities.get(id))
            .map(|unit| {
                let (x, y) = unit.position.to_f64();
                UnitSnapshot {
                    id: unit.id,
                    faction: unit.faction(),
                    template: unit.template.clone(),
                    x,
                    y,
                    hp: unit.health.current,
                    max_hp: unit.health.max,
                    alive: unit.is_alive(),
                    moving: unit.is_moving(),
                    range: unit.combat.range.to_num(),
                    target_position: unit
                        .target()
                        .and_then(|target| self.entities.get(target))
                        .map(|target| target.position.to_f64()),
                }
            })
            .collect();

        let notifications = self
            .notifications
            .items()
            .iter()
            .map(|item| {
                let (x, y) = item.position.to_f64();
                NotificationSnapshot {
                    x,
                    y,
                    amount: item.amount,
                    remaining_life_fraction: item.remaining_fraction(),
                }
            })
            .collect();

        MatchSnapshot {
            frame: self.frame,
            running: self.running,
            paused: self.paused,
            speed_multiplier: self.speed_multiplier.to_num(),
            selected_unit: self.selected_unit.clone(),
            energy: EnergySnapshot {
                current: self.energy.current().to_num(),
                max: self.energy.max().to_num(),
            },
            units,
            notifications,
        }
    }

    /// Compute a hash of the match state for determinism verification.
    ///
    /// Covers the frame counter, flags, energy, spawn timer, RNG position,
    /// every unit and every notification. Two matches with equal hashes
    /// will evolve identically under the same inputs.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.frame.hash(&mut hasher);
        self.elapsed.to_bits().hash(&mut hasher);
        self.running.hash(&mut hasher);
        self.paused.hash(&mut hasher);
        self.speed_multiplier.to_bits().hash(&mut hasher);
        self.selected_unit.hash(&mut hasher);

        self.energy.current().to_bits().hash(&mut hasher);
        self.schedule.elapsed().to_bits().hash(&mut hasher);
        self.rng.get_word_pos().hash(&mut hasher);

        let ids = self.entities.sorted_ids();
        ids.len().hash(&mut hasher);
        for id in ids {
            let Some(unit) = self.entities.get(id) else {
                continue;
            };
            id.hash(&mut hasher);
            unit.position.hash(&mut hasher);
            unit.health.current.hash(&mut hasher);
            unit.health.max.hash(&mut hasher);
            unit.combat.cooldown_remaining.to_bits().hash(&mut hasher);
            unit.target().hash(&mut hasher);
            unit.is_alive().hash(&mut hasher);
            unit.is_moving().hash(&mut hasher);
        }

        for item in self.notifications.items() {
            item.position.hash(&mut hasher);
            item.amount.hash(&mut hasher);
            item.life.to_bits().hash(&mut hasher);
        }

        hasher.finish()
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new(MatchConfig::default(), TemplateRegistry::default())
    }
}

/// Convert host coordinates into a lane point.
fn lane_point(x: f64, y: f64) -> Result<Vec2Fixed> {
    Vec2Fixed::from_f64(x, y)
        .ok_or_else(|| GameError::InvalidInput(format!("position ({x}, {y}) is not finite")))
}
