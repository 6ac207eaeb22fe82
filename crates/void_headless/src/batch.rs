//! Batch match runner for balance testing.
//!
//! Runs many scripted matches in parallel using rayon, one seed per match,
//! and collects metrics across all of them.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use void_core::config::MatchConfig;
use void_core::data::TemplateRegistry;

use crate::metrics::{BatchSummary, MatchMetrics};
use crate::scripted::{run_scripted_match, ScriptedPlayer};

/// Configuration for a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of matches to run.
    pub game_count: u32,
    /// Maximum parallel matches (0 = use rayon default).
    pub parallel_games: u32,
    /// Seed of the first match; match `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Simulated seconds per match.
    pub duration_seconds: u32,
    /// Config shared by every match; its seed is overridden.
    pub match_config: MatchConfig,
    /// Templates shared by every match.
    pub templates: TemplateRegistry,
    /// The player driving every match.
    pub player: ScriptedPlayer,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 100,
            parallel_games: 0,
            seed_start: 0,
            duration_seconds: 180,
            match_config: MatchConfig::default(),
            templates: TemplateRegistry::default(),
            player: ScriptedPlayer::default(),
        }
    }
}

impl BatchConfig {
    /// Create a config for `game_count` matches with default settings.
    pub fn new(game_count: u32) -> Self {
        Self {
            game_count,
            ..Default::default()
        }
    }

    /// Set seed start.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the simulated length of each match.
    pub fn with_duration(mut self, seconds: u32) -> Self {
        self.duration_seconds = seconds;
        self
    }

    /// Set the scripted player.
    pub fn with_player(mut self, player: ScriptedPlayer) -> Self {
        self.player = player;
        self
    }

    fn run_one(&self, seed: u64) -> Result<MatchMetrics, String> {
        let config = MatchConfig {
            seed,
            ..self.match_config.clone()
        };
        run_scripted_match(
            config,
            self.templates.clone(),
            self.player.clone(),
            self.duration_seconds,
        )
        .map_err(|e| e.to_string())
    }
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual match metrics, in seed order.
    pub games: Vec<MatchMetrics>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total wall-clock runtime.
    pub duration_seconds: f64,
    /// Errors encountered.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Match index.
    pub game_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Run a batch of matches.
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        games = config.game_count,
        seed_start = config.seed_start,
        player = %config.player.name,
        "Starting batch run"
    );

    let run = || -> Vec<Result<MatchMetrics, BatchError>> {
        (0..config.game_count)
            .into_par_iter()
            .map(|i| {
                let seed = config.seed_start.wrapping_add(u64::from(i));
                let result = config.run_one(seed).map_err(|message| {
                    warn!(game = i, seed, %message, "Match failed");
                    BatchError {
                        game_index: i,
                        seed,
                        message,
                    }
                });
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 10 == 0 {
                    debug!("Progress: {}/{}", done, config.game_count);
                }
                result
            })
            .collect()
    };

    let results = if config.parallel_games > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_games as usize)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!(error = %e, "Falling back to the global thread pool");
                run()
            }
        }
    } else {
        run()
    };

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<MatchMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} matches in {:.1}s ({:.1} matches/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(0.001)
    );

    BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    }
}

/// Run the same seed `runs` times and check every final hash agrees.
pub fn verify_determinism(config: &BatchConfig, seed: u64, runs: u32) -> bool {
    let hashes: Vec<Option<u64>> = (0..runs)
        .map(|_| config.run_one(seed).ok().map(|m| m.final_state_hash))
        .collect();
    debug!(?hashes, "Verification hashes");
    hashes.iter().all(Option::is_some) && hashes.windows(2).all(|w| w[0] == w[1])
}
