mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use pebble_balance::script::{DEFAULT_BOARD, PlaytestScript};
use pebble_balance::{BalanceTuning, PebbleBalance, PlacementMode};
use report::PlaytestReport;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Parser)]
#[command(name = "pebble-playtest")]
#[command(about = "Replay headless Pebble Balance sessions and print JSON reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a JSON script of pointer and clock steps.
    Run {
        #[arg(long)]
        script: PathBuf,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long)]
        tuning: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        digest_only: bool,
    },
    /// Stack every pebble on the center line and wait for the win.
    Demo {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, value_enum, default_value_t = ModeArg::Snap)]
        mode: ModeArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Snap,
    Free,
}

impl From<ModeArg> for PlacementMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Snap => PlacementMode::Snap,
            ModeArg::Free => PlacementMode::Free,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            script,
            seed,
            tuning,
            digest_only,
        } => cmd_run(&script, seed, tuning.as_deref(), digest_only),
        Commands::Demo { seed, mode } => cmd_demo(seed, mode.into()),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn cmd_run(script_path: &Path, seed: u64, tuning: Option<&Path>, digest_only: bool) -> Result<()> {
    let tuning = match tuning {
        Some(path) => BalanceTuning::load(path)
            .with_context(|| format!("Failed to load tuning {}", path.display()))?,
        None => BalanceTuning::default(),
    };
    let script = PlaytestScript::load(script_path)
        .with_context(|| format!("Failed to load script {}", script_path.display()))?;

    let started_at = Utc::now();
    let mode = tuning.placement_mode;
    let mut game = PebbleBalance::with_tuning(seed, tuning);
    info!(
        seed,
        steps = script.steps.len(),
        script = %script_path.display(),
        "replaying script"
    );
    let recording = script.run(&mut game);

    let report = PlaytestReport::new(
        started_at,
        seed,
        mode,
        Some(script_path.display().to_string()),
        recording,
    )
    .context("Failed to digest final snapshot")?;
    info!(won = report.won, digest = %report.final_digest, "replay finished");

    if digest_only {
        print_json(&report.digest_only())
    } else {
        print_json(&report)
    }
}

fn cmd_demo(seed: u64, mode: PlacementMode) -> Result<()> {
    let tuning = BalanceTuning::default().with_placement_mode(mode);
    let script = PlaytestScript::centered_stack(&tuning, DEFAULT_BOARD);

    let started_at = Utc::now();
    let mut game = PebbleBalance::with_tuning(seed, tuning);
    let recording = script.run(&mut game);
    let report = PlaytestReport::new(started_at, seed, mode, None, recording)
        .context("Failed to digest final snapshot")?;

    if report.won {
        info!(seed, digest = %report.final_digest, "demo stack won");
    } else {
        warn!(seed, "demo stack did not win");
    }
    print_json(&report)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{text}");
    Ok(())
}
