//! Match metrics collection for balance runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use void_core::factions::Faction;
use void_core::simulation::{FrameEvents, Match};

/// How a scripted match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The player's side held until time ran out.
    #[default]
    Held,
    /// An enemy walked off the player's end of the lane.
    Overrun,
}

/// Complete metrics for a single match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Seed the match ran with.
    pub seed: u64,
    /// Frames simulated.
    pub frames: u64,
    /// Simulated seconds.
    pub duration_seconds: f64,
    /// How the match ended.
    pub outcome: MatchOutcome,
    /// Allies deployed.
    pub deploys: u32,
    /// Allies deployed per template key.
    pub deploys_by_type: BTreeMap<String, u32>,
    /// Enemies spawned by the timer.
    pub spawns: u32,
    /// Enemies reclaimed.
    pub kills: u32,
    /// Allies reclaimed.
    pub losses: u32,
    /// Damage landed by allies.
    pub damage_dealt: u64,
    /// Damage landed on allies.
    pub damage_taken: u64,
    /// Rewards paid for kills, before the energy cap.
    pub energy_earned: u64,
    /// Energy paid for deployments.
    pub energy_spent: u64,
    /// Most units on the lane at a frame boundary.
    pub peak_population: usize,
    /// Final state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl MatchMetrics {
    /// Create empty metrics for a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Record a successful deployment.
    pub fn record_deploy(&mut self, unit_type: &str, cost: u32) {
        self.deploys += 1;
        *self.deploys_by_type.entry(unit_type.to_string()).or_insert(0) += 1;
        self.energy_spent += u64::from(cost);
    }

    /// Fold one frame's events in. Call right after [`Match::frame`].
    pub fn record_frame(&mut self, game: &Match, events: &FrameEvents) {
        self.spawns += u32::try_from(events.spawned.len()).unwrap_or(u32::MAX);

        // Units reclaimed this frame are gone from the match but still
        // show up in the damage list.
        let faction_of = |id| {
            game.unit(id).map(|unit| unit.faction()).ok().or_else(|| {
                events
                    .deaths
                    .iter()
                    .find(|death| death.id == id)
                    .map(|death| death.faction)
            })
        };

        for hit in &events.damage {
            match faction_of(hit.target) {
                Some(Faction::Enemy) => self.damage_dealt += u64::from(hit.damage),
                Some(Faction::Ally) => self.damage_taken += u64::from(hit.damage),
                None => {}
            }
        }

        for death in &events.deaths {
            match death.faction {
                Faction::Enemy => {
                    self.kills += 1;
                    self.energy_earned += u64::from(death.reward);
                }
                Faction::Ally => self.losses += 1,
            }
        }

        self.peak_population = self.peak_population.max(game.entities().len());
    }

    /// Close out the metrics with the final match state.
    pub fn finalize(&mut self, game: &Match, outcome: MatchOutcome) {
        self.frames = game.frame_count();
        self.duration_seconds = game.elapsed().to_num();
        self.outcome = outcome;
        self.final_state_hash = game.state_hash();
    }
}

/// Aggregate statistics across a batch of matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches summarized.
    pub total_matches: u32,
    /// Matches that ended in an overrun.
    pub overruns: u32,
    /// Fraction of matches the player held.
    pub hold_rate: f64,
    /// Mean enemies reclaimed per match.
    pub avg_kills: f64,
    /// Mean allies lost per match.
    pub avg_losses: f64,
    /// Mean kill rewards per match.
    pub avg_energy_earned: f64,
    /// Mean simulated seconds per match.
    pub avg_duration_seconds: f64,
    /// Deploy counts per template key across the batch.
    pub deploys_by_type: BTreeMap<String, u32>,
}

impl BatchSummary {
    /// Summarize a set of match metrics.
    #[must_use]
    pub fn from_games(games: &[MatchMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }
        let total = games.len() as f64;
        let mean = |value: fn(&MatchMetrics) -> f64| games.iter().map(value).sum::<f64>() / total;

        let overruns = games
            .iter()
            .filter(|game| game.outcome == MatchOutcome::Overrun)
            .count();
        let mut deploys_by_type = BTreeMap::new();
        for game in games {
            for (key, count) in &game.deploys_by_type {
                *deploys_by_type.entry(key.clone()).or_insert(0) += count;
            }
        }

        Self {
            total_matches: u32::try_from(games.len()).unwrap_or(u32::MAX),
            overruns: u32::try_from(overruns).unwrap_or(u32::MAX),
            hold_rate: (total - overruns as f64) / total,
            avg_kills: mean(|g| f64::from(g.kills)),
            avg_losses: mean(|g| f64::from(g.losses)),
            avg_energy_earned: mean(|g| g.energy_earned as f64),
            avg_duration_seconds: mean(|g| g.duration_seconds),
            deploys_by_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(kills: u32, outcome: MatchOutcome) -> MatchMetrics {
        let mut metrics = MatchMetrics::new(u64::from(kills));
        metrics.kills = kills;
        metrics.energy_earned = u64::from(kills) * 20;
        metrics.outcome = outcome;
        metrics.record_deploy("basic", 50);
        metrics
    }

    #[test]
    fn test_record_deploy_tracks_spend() {
        let mut metrics = MatchMetrics::new(1);
        metrics.record_deploy("tank", 80);
        metrics.record_deploy("basic", 50);
        metrics.record_deploy("tank", 80);
        assert_eq!(metrics.deploys, 3);
        assert_eq!(metrics.energy_spent, 210);
        assert_eq!(metrics.deploys_by_type["tank"], 2);
    }

    #[test]
    fn test_summary_averages() {
        let games = vec![
            game(4, MatchOutcome::Held),
            game(2, MatchOutcome::Overrun),
            game(6, MatchOutcome::Held),
            game(0, MatchOutcome::Held),
        ];
        let summary = BatchSummary::from_games(&games);
        assert_eq!(summary.total_matches, 4);
        assert_eq!(summary.overruns, 1);
        assert!((summary.hold_rate - 0.75).abs() < 1e-9);
        assert!((summary.avg_kills - 3.0).abs() < 1e-9);
        assert!((summary.avg_energy_earned - 60.0).abs() < 1e-9);
        assert_eq!(summary.deploys_by_type["basic"], 4);
    }

    #[test]
    fn test_empty_summary() {
        let summary = BatchSummary::from_games(&[]);
        assert_eq!(summary.total_matches, 0);
        assert_eq!(summary.hold_rate, 0.0);
    }
}
