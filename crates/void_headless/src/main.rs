//! Headless Void Frontier match runner.
//!
//! This binary runs a match without a screen, controlled via JSON on
//! stdin/stdout. Designed for scripted controllers, CI testing, and
//! determinism checks.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p void_headless
//!
//! # Interactive mode with a custom config
//! cargo run -p void_headless -- run --config crates/void_headless/config/default_match.ron
//!
//! # Batch of scripted matches
//! cargo run -p void_headless -- batch --count 500 --player rush --output results/
//!
//! # Check config files without running anything
//! cargo run -p void_headless -- validate --templates my_roster.ron
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use void_core::math::Fixed;
use void_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    config_loader::{load_match, load_match_config, load_player, load_templates, LoadError},
    runner::HeadlessRunner,
    scripted::{ScriptedPlayer, FRAMES_PER_SECOND},
};

#[derive(Parser)]
#[command(name = "void_headless")]
#[command(about = "Headless Void Frontier match runner for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Data files shared by every subcommand.
#[derive(Args, Clone, Default)]
struct DataArgs {
    /// Match config RON file (defaults built in)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Template table RON file (standard roster built in)
    #[arg(short, long)]
    templates: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single interactive match
    Run {
        #[command(flatten)]
        data: DataArgs,

        /// Answer every tick with full state
        #[arg(long)]
        auto_state: bool,
    },

    /// Run a batch of scripted matches for balance testing
    Batch {
        #[command(flatten)]
        data: DataArgs,

        /// Number of matches to run
        #[arg(short = 'n', long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Simulated seconds per match
        #[arg(long, default_value = "180")]
        duration: u32,

        /// Player preset (balanced, rush, turtle) or RON file
        #[arg(long, default_value = "balanced")]
        player: String,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        #[command(flatten)]
        data: DataArgs,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,

        /// Simulated seconds per run
        #[arg(long, default_value = "120")]
        duration: u32,
    },

    /// Run N frames for benchmarking
    Benchmark {
        #[command(flatten)]
        data: DataArgs,

        /// Number of frames to run
        #[arg(short, long, default_value = "36000")]
        frames: u64,
    },

    /// Load and validate data files, then exit
    Validate {
        #[command(flatten)]
        data: DataArgs,

        /// Scripted player RON file
        #[arg(long)]
        player: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run { data, auto_state }) => cmd_run(&data, auto_state),
        Some(Commands::Batch {
            data,
            count,
            parallel,
            output,
            seed,
            duration,
            player,
        }) => cmd_batch(&data, count, parallel, &output, seed, duration, &player),
        Some(Commands::Verify {
            data,
            seed,
            runs,
            duration,
        }) => cmd_verify(&data, seed, runs, duration),
        Some(Commands::Benchmark { data, frames }) => cmd_benchmark(&data, frames),
        Some(Commands::Validate { data, player }) => cmd_validate(&data, player.as_deref()),
        None => cmd_run(&DataArgs::default(), false),
    }
}

fn fail(context: &str, error: &dyn std::fmt::Display) -> ! {
    tracing::error!(%error, "{context}");
    eprintln!("FATAL: {context}: {error}");
    std::process::exit(1);
}

fn batch_base(data: &DataArgs) -> Result<BatchConfig, LoadError> {
    let mut config = BatchConfig::default();
    if let Some(path) = &data.config {
        config.match_config = load_match_config(path)?;
    }
    if let Some(path) = &data.templates {
        config.templates = load_templates(path)?;
    }
    Ok(config)
}

fn resolve_player(name_or_path: &str) -> Result<ScriptedPlayer, LoadError> {
    match ScriptedPlayer::preset(name_or_path) {
        Some(player) => Ok(player),
        None => load_player(Path::new(name_or_path)),
    }
}

/// Run a single interactive match
fn cmd_run(data: &DataArgs, auto_state: bool) {
    tracing::info!("Starting interactive session");

    let game = load_match(data.config.as_deref(), data.templates.as_deref())
        .unwrap_or_else(|e| fail("Failed to load match", &e));

    let mut runner = HeadlessRunner::new(game).with_auto_state(auto_state);
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(e) = runner.run(stdin.lock(), stdout.lock()) {
        fail("Session IO failed", &e);
    }
}

/// Run batch of scripted matches
fn cmd_batch(
    data: &DataArgs,
    count: u32,
    parallel: u32,
    output: &Path,
    seed: u64,
    duration: u32,
    player: &str,
) {
    let player = resolve_player(player).unwrap_or_else(|e| fail("Failed to load player", &e));
    let mut config = batch_base(data)
        .unwrap_or_else(|e| fail("Failed to load data", &e))
        .with_seed(seed)
        .with_duration(duration)
        .with_player(player);
    config.game_count = count;
    config.parallel_games = parallel;

    tracing::info!(
        count,
        parallel,
        seed,
        duration,
        player = %config.player.name,
        output = %output.display(),
        "Batch configuration"
    );

    let results = run_batch(config);

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        fail("Failed to save results", &e);
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matches played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Matches FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!("Hold rate: {:.1}%", summary.hold_rate * 100.0);
    eprintln!("Avg kills: {:.1}", summary.avg_kills);
    eprintln!("Avg losses: {:.1}", summary.avg_losses);
    eprintln!("Avg energy earned: {:.1}", summary.avg_energy_earned);
    for (unit_type, deploys) in &summary.deploys_by_type {
        eprintln!("  {unit_type}: {deploys} deploys");
    }

    if !results.errors.is_empty() {
        eprintln!("\nMATCH FAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!(
                "  Match {} (seed {}): {}",
                error.game_index, error.seed, error.message
            );
        }
    }

    eprintln!("\nResults saved to: {}", results_path.display());
}

/// Verify determinism
fn cmd_verify(data: &DataArgs, seed: u64, runs: u32, duration: u32) {
    tracing::info!("Verifying determinism: seed {} ({} runs)", seed, runs);

    let config = batch_base(data)
        .unwrap_or_else(|e| fail("Failed to load data", &e))
        .with_duration(duration);

    if verify_determinism(&config, seed, runs) {
        eprintln!("PASS: All {runs} runs produced identical results");
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        std::process::exit(1);
    }
}

/// Run benchmark
fn cmd_benchmark(data: &DataArgs, frames: u64) {
    tracing::info!("Running {} frame benchmark", frames);

    let mut game = load_match(data.config.as_deref(), data.templates.as_deref())
        .unwrap_or_else(|e| fail("Failed to load match", &e));
    let mut player = ScriptedPlayer::rush();
    let dt = Fixed::ONE / Fixed::from_num(FRAMES_PER_SECOND);
    game.start();

    let start = Instant::now();
    let mut peak = 0;
    for _ in 0..frames {
        if let Some(command) = player.decide(&game) {
            let outcome = game.apply_command(command);
            player.observe(&outcome, game.frame_count());
        }
        game.frame(dt);
        peak = peak.max(game.entities().len());
    }
    let elapsed = start.elapsed();

    let fps = frames as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BENCHMARK RESULTS");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Frames: {frames}");
    eprintln!("Duration: {:.3}s", elapsed.as_secs_f64());
    eprintln!("Frames/second: {fps:.1}");
    eprintln!("Peak units: {peak}");
    eprintln!("Final units: {}", game.entities().len());
    eprintln!("State hash: {:016x}", game.state_hash());
}

/// Validate data files
fn cmd_validate(data: &DataArgs, player: Option<&Path>) {
    if let Err(e) = load_match(data.config.as_deref(), data.templates.as_deref()) {
        fail("Validation failed", &e);
    }
    if let Some(path) = player {
        if let Err(e) = load_player(path) {
            fail("Validation failed", &e);
        }
    }
    eprintln!("OK: data files are valid");
}
