//! Keyed template tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::templates::{stat_problems, AllyTemplate, EnemyTemplate};
use crate::error::{GameError, Result};
use crate::math::Fixed;

/// Extended roster shipped with the crate.
const EXTENDED_TEMPLATES: &str = include_str!("../../data/extended_templates.ron");

/// All ally and enemy templates, keyed by string identifier.
///
/// Keys iterate in sorted order, which keeps the spawn table (and so the
/// seeded enemy sequence) stable regardless of how the file was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRegistry {
    /// Deployable ally templates.
    #[serde(default)]
    pub allies: BTreeMap<String, AllyTemplate>,
    /// Spawnable enemy templates.
    #[serde(default)]
    pub enemies: BTreeMap<String, EnemyTemplate>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allies: BTreeMap::new(),
            enemies: BTreeMap::new(),
        }
    }

    /// The extended roster: healer, assassin, fast and boss on top of the
    /// standard units.
    pub fn extended() -> Result<Self> {
        Self::from_ron_str("extended_templates.ron", EXTENDED_TEMPLATES)
    }

    /// Parse a registry from RON text. `source` labels errors.
    pub fn from_ron_str(source: &str, text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })
    }

    /// Register an ally template, replacing any previous one with the key.
    pub fn register_ally(&mut self, key: impl Into<String>, template: AllyTemplate) {
        self.allies.insert(key.into(), template);
    }

    /// Register an enemy template, replacing any previous one with the key.
    pub fn register_enemy(&mut self, key: impl Into<String>, template: EnemyTemplate) {
        self.enemies.insert(key.into(), template);
    }

    /// Look up an ally template.
    #[must_use]
    pub fn ally(&self, key: &str) -> Option<&AllyTemplate> {
        self.allies.get(key)
    }

    /// Look up an enemy template.
    #[must_use]
    pub fn enemy(&self, key: &str) -> Option<&EnemyTemplate> {
        self.enemies.get(key)
    }

    /// Ally keys in sorted order.
    pub fn ally_keys(&self) -> impl Iterator<Item = &str> {
        self.allies.keys().map(String::as_str)
    }

    /// Enemy keys with a non-zero spawn weight, in sorted order.
    pub fn spawn_table(&self) -> impl Iterator<Item = (&str, u32)> {
        self.enemies
            .iter()
            .filter(|(_, t)| t.spawn_weight > 0)
            .map(|(key, t)| (key.as_str(), t.spawn_weight))
    }

    /// Validate all templates, returning every problem found.
    #[must_use]
    pub fn validate(&self) -> Vec<GameError> {
        let mut errors = Vec::new();
        let mut push = |key: &str, reason: String| {
            errors.push(GameError::InvalidTemplate {
                key: key.to_string(),
                reason,
            });
        };

        if self.allies.is_empty() {
            push("<allies>", "at least one ally template is required".to_string());
        }
        if self.spawn_table().next().is_none() {
            push(
                "<enemies>",
                "at least one enemy template needs a non-zero spawn_weight".to_string(),
            );
        }

        for (key, t) in &self.allies {
            if key.is_empty() {
                push(key, "template key must not be empty".to_string());
            }
            for problem in stat_problems(t.hp, t.speed, t.range, t.attack_cooldown) {
                push(key, problem);
            }
            if Fixed::checked_from_num(t.deployment_cost).is_none() {
                push(key, "deployment_cost is too large".to_string());
            }
        }
        for (key, t) in &self.enemies {
            if key.is_empty() {
                push(key, "template key must not be empty".to_string());
            }
            for problem in stat_problems(t.hp, t.speed, t.range, t.attack_cooldown) {
                push(key, problem);
            }
        }

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

impl Default for TemplateRegistry {
    /// The standard roster: basic, tank and archer against grunt and heavy,
    /// with grunts and heavies spawning equally often.
    fn default() -> Self {
        let mut registry = Self::new();
        let ally = |name: &str, hp, speed: i32, damage, range: i32, cooldown: f64, cost| {
            AllyTemplate {
                name: name.to_string(),
                hp,
                speed: Fixed::from_num(speed),
                damage,
                range: Fixed::from_num(range),
                attack_cooldown: Fixed::from_num(cooldown),
                deployment_cost: cost,
            }
        };
        let enemy = |name: &str, hp, speed: i32, damage, range: i32, cooldown: f64| EnemyTemplate {
            name: name.to_string(),
            hp,
            speed: Fixed::from_num(speed),
            damage,
            range: Fixed::from_num(range),
            attack_cooldown: Fixed::from_num(cooldown),
            reward: None,
            spawn_weight: 1,
        };

        registry.register_ally("basic", ally("Guardian", 60, 40, 20, 100, 1.0, 50));
        registry.register_ally("tank", ally("Bulwark", 120, 20, 15, 80, 1.5, 80));
        registry.register_ally("archer", ally("Archer", 40, 35, 30, 180, 0.8, 70));
        registry.register_enemy("grunt", enemy("Grunt", 40, 25, 12, 70, 1.8));
        registry.register_enemy("heavy", enemy("Heavy", 120, 12, 20, 65, 2.5));
        registry
    }
}
