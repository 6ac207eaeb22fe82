//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! Replays and side-by-side comparisons only work if a match is fully
//! deterministic. Sources of non-determinism include:
//!
//! - **Floating-point math**: We use fixed-point arithmetic via
//!   [`void_core::math::Fixed`] inside the frame loop.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Units are always processed in sorted id order.
//!
//! - **System randomness**: Enemy selection draws from a `ChaCha8Rng`
//!   seeded from the match config, never from the OS.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual phases (step, targeting, reclaim)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full match scenarios are reproducible
//! 4. **Parallel tests**: Running N matches on N threads all match

use std::thread;

use void_core::math::Fixed;
use void_core::simulation::Match;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of frames simulated.
    pub frames: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the match was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Frames: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.frames,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `frames` - Number of frames to simulate per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one frame
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```
/// use void_core::math::Fixed;
/// use void_core::simulation::Match;
/// use void_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     3,
///     50,
///     || {
///         let mut game = Match::default();
///         game.start();
///         game
///     },
///     |game| {
///         game.frame(Fixed::from_num(0.1));
///     },
///     Match::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    frames: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..frames {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        frames,
    }
}

/// Run a match twice from identical setup with a constant frame delta and
/// check the final hashes match exactly.
pub fn verify_match_determinism<F>(setup_fn: F, frames: u64, dt: Fixed) -> bool
where
    F: Fn() -> Match,
{
    verify_determinism(
        2,
        frames,
        &setup_fn,
        |game| {
            game.frame(dt);
        },
        Match::state_hash,
    )
    .is_deterministic
}

/// Run `num_matches` matches on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_matches_scoped<F>(
    setup_fn: F,
    num_matches: usize,
    frames: u64,
    dt: Fixed,
) -> DeterminismResult
where
    F: Fn() -> Match + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_matches)
            .map(|_| {
                s.spawn(|| {
                    let mut game = setup_fn();
                    for _ in 0..frames {
                        game.frame(dt);
                    }
                    game.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("match thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        frames,
    }
}

/// Compare two runs frame-by-frame, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(frame)` for the first frame
/// after which their hashes differ (0 means they differ before any frame).
pub fn find_first_divergence<F>(setup_fn: F, frames: u64, dt: Fixed) -> Option<u64>
where
    F: Fn() -> Match,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for frame in 1..=frames {
        first.frame(dt);
        second.frame(dt);

        if first.state_hash() != second.state_hash() {
            return Some(frame);
        }
    }

    None
}

/// Proptest strategies for match inputs.
pub mod strategies {
    use proptest::prelude::*;
    use void_core::commands::PlayerCommand;
    use void_core::math::Fixed;

    /// Frame delta between -0.1 and 0.5 seconds, in thousandths.
    ///
    /// Includes negative and over-long deltas so clamping is exercised.
    pub fn arb_frame_delta() -> impl Strategy<Value = Fixed> {
        (-100i32..500i32).prop_map(|ms| Fixed::from_num(ms) / 1000)
    }

    /// Lane x coordinate across the whole 1200-unit lane.
    pub fn arb_lane_x() -> impl Strategy<Value = f64> {
        (0u32..1200u32).prop_map(f64::from)
    }

    /// Any player command, with keys drawn from the standard roster plus
    /// one unknown key.
    pub fn arb_player_command() -> impl Strategy<Value = PlayerCommand> {
        let key = prop::sample::select(vec!["basic", "tank", "archer", "dragon"])
            .prop_map(str::to_string);
        prop_oneof![
            4 => (key.clone(), arb_lane_x()).prop_map(|(unit_type, x)| PlayerCommand::Deploy {
                unit_type,
                x,
                y: 300.0,
            }),
            3 => arb_lane_x().prop_map(|x| PlayerCommand::DeploySelected { x, y: 300.0 }),
            2 => key.prop_map(|key| PlayerCommand::SelectUnitType { key }),
            1 => (0u32..40u32).prop_map(|tenths| PlayerCommand::SetSpeed {
                multiplier: f64::from(tenths) / 10.0,
            }),
            1 => Just(PlayerCommand::TogglePause),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{crowded_lane, fixed_f};

    #[test]
    fn test_default_match_is_deterministic() {
        assert!(verify_match_determinism(
            || {
                let mut game = Match::default();
                game.start();
                game
            },
            400,
            fixed_f(0.05),
        ));
    }

    #[test]
    fn test_crowded_lane_has_no_divergence() {
        assert_eq!(
            find_first_divergence(|| crowded_lane(20, 11), 200, fixed_f(0.05)),
            None
        );
    }

    #[test]
    fn test_parallel_matches_agree() {
        run_parallel_matches_scoped(|| crowded_lane(10, 5), 4, 100, fixed_f(0.05))
            .assert_deterministic();
    }
}
