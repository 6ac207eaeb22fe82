//! Enemy spawn cadence.
//!
//! A fixed-interval timer decides *when* an enemy appears and a weighted
//! table decides *which*. The table draws from a seeded `ChaCha8Rng` owned
//! by the match, so the same seed always yields the same wave.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::data::TemplateRegistry;
use crate::math::Fixed;

/// Spawn timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnSchedule {
    /// Time accumulated since the last spawn.
    elapsed: Fixed,
    /// Seconds between spawns.
    interval: Fixed,
}

impl SpawnSchedule {
    /// Create a timer that first fires after one full interval.
    #[must_use]
    pub const fn new(interval: Fixed) -> Self {
        Self {
            elapsed: Fixed::ZERO,
            interval,
        }
    }

    /// Time accumulated since the last spawn.
    #[must_use]
    pub const fn elapsed(&self) -> Fixed {
        self.elapsed
    }

    /// Seconds between spawns.
    #[must_use]
    pub const fn interval(&self) -> Fixed {
        self.interval
    }

    /// Advance by `dt` and report whether a spawn is due.
    ///
    /// The timer resets to zero when it fires; any overshoot past the
    /// interval is dropped, so at most one enemy spawns per frame.
    pub fn advance(&mut self, dt: Fixed) -> bool {
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.interval {
            self.elapsed = Fixed::ZERO;
            true
        } else {
            false
        }
    }
}

/// Weighted choice over enemy template keys.
#[derive(Debug, Clone)]
pub struct SpawnTable {
    keys: Vec<String>,
    weights: Option<WeightedIndex<u32>>,
}

impl SpawnTable {
    /// Build the table from every enemy template with a non-zero weight.
    #[must_use]
    pub fn from_registry(registry: &TemplateRegistry) -> Self {
        let (keys, weights): (Vec<String>, Vec<u32>) = registry
            .spawn_table()
            .map(|(key, weight)| (key.to_string(), weight))
            .unzip();
        Self {
            weights: WeightedIndex::new(&weights).ok(),
            keys,
        }
    }

    /// Number of templates in rotation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing can be spawned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_none()
    }

    /// Pick a template key.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        let weights = self.weights.as_ref()?;
        self.keys.get(weights.sample(rng)).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_schedule_fires_on_interval() {
        let mut schedule = SpawnSchedule::new(Fixed::from_num(2));
        assert!(!schedule.advance(Fixed::from_num(1)));
        assert!(!schedule.advance(Fixed::from_num(0.5)));
        assert!(schedule.advance(Fixed::from_num(0.5)));
        assert_eq!(schedule.elapsed(), Fixed::ZERO);
    }

    #[test]
    fn test_schedule_forfeits_overshoot() {
        let mut schedule = SpawnSchedule::new(Fixed::from_num(2));
        assert!(schedule.advance(Fixed::from_num(5)));
        assert_eq!(schedule.elapsed(), Fixed::ZERO);
        assert!(!schedule.advance(Fixed::from_num(1.5)));
    }

    #[test]
    fn test_table_is_seed_deterministic() {
        let table = SpawnTable::from_registry(&TemplateRegistry::default());
        assert_eq!(table.len(), 2);

        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..32)
                .map(|_| table.choose(&mut rng).unwrap().to_string())
                .collect::<Vec<_>>()
        };
        let first = draw(7);
        assert_eq!(first, draw(7));
        assert!(first.iter().any(|k| k == "grunt"));
        assert!(first.iter().any(|k| k == "heavy"));
    }

    #[test]
    fn test_zero_weights_excluded() {
        let mut registry = TemplateRegistry::default();
        registry.enemies.get_mut("heavy").unwrap().spawn_weight = 0;
        let table = SpawnTable::from_registry(&registry);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..16 {
            assert_eq!(table.choose(&mut rng), Some("grunt"));
        }
    }

    #[test]
    fn test_empty_table_chooses_nothing() {
        let table = SpawnTable::from_registry(&TemplateRegistry::new());
        assert!(table.is_empty());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(table.choose(&mut rng), None);
    }
}
