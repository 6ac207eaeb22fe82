//! Headless match runner for scripted play and CI verification.
//!
//! Runs a Void Frontier match without a screen, controlled through JSON
//! lines on stdin with responses on stdout. This enables:
//!
//! - **Scripted play**: A controller process drives the match frame by frame
//! - **CI verification**: Automated checks of match logic and determinism
//! - **Balance runs**: Many seeded matches in parallel with a scripted player
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the controller (tick, deploy, query, ...)
//! - **stdout**: Responses and state (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] for the full command/response format.
//!
//! # Example
//!
//! ```bash
//! # Run interactively
//! echo '{"cmd":"tick","count":60}' | cargo run -p void_headless
//!
//! # Run a batch of scripted matches
//! cargo run -p void_headless -- batch --count 200 --output results/
//!
//! # Verify determinism
//! cargo run -p void_headless -- verify --seed 42 --runs 5
//! ```

pub mod batch;
pub mod config_loader;
pub mod metrics;
pub mod protocol;
pub mod runner;
pub mod scripted;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use config_loader::{load_match, load_match_config, load_templates, LoadError};
pub use metrics::{BatchSummary, MatchMetrics, MatchOutcome};
pub use protocol::{Command, Response};
pub use runner::{HeadlessRunner, MAX_TICKS_PER_COMMAND};
pub use scripted::{run_scripted_match, ScriptedPlayer};
