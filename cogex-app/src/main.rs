mod app;
mod logging;
mod participant;

use anyhow::{Context, Result};
use app::App;
use clap::{Args, Parser, Subcommand};
use cogex_core::Difficulty;
use cogex_experiment::age::{self, DEFAULT_TRIAL_COUNT};
use cogex_experiment::{ExperimentConfig, ExperimentStateMachine, ReactionTimeTask, StroopTask, Task};
use cogex_timing::{HighPrecisionTimer, ManualTimer, Timer};
use participant::{Distractor, SimulatedParticipant};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "cogex", version, about = "Reaction-time and Stroop sessions")]
struct Cli {
    /// JSON file overriding any subset of the timing settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for trial order and the simulated participant
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Wait on the wall clock instead of jumping between deadlines
    #[arg(long, global = true)]
    realtime: bool,

    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args, Debug, Clone)]
struct ParticipantArgs {
    #[arg(long, default_value_t = 450)]
    mean_rt_ms: u64,

    #[arg(long, default_value_t = 120)]
    rt_spread_ms: u64,

    /// Chance of pressing a wrong key
    #[arg(long, default_value_t = 0.1, value_parser = parse_rate)]
    error_rate: f64,

    /// Chance of letting a stimulus time out (reaction task only)
    #[arg(long, default_value_t = 0.05, value_parser = parse_rate)]
    miss_rate: f64,
}

/// A probability in `[0, 1]`
fn parse_rate(raw: &str) -> Result<f64, String> {
    let rate: f64 = raw.parse().map_err(|e| format!("`{raw}` is not a number: {e}"))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(format!("`{raw}` must be between 0 and 1"));
    }
    Ok(rate)
}

#[derive(Subcommand)]
enum Commands {
    /// Two-choice colour/key reaction-time session
    Reaction {
        #[arg(long)]
        repetitions: Option<usize>,

        #[command(flatten)]
        participant: ParticipantArgs,
    },
    /// Stroop session with an age estimate
    Stroop {
        #[arg(long, default_value = "easy")]
        difficulty: Difficulty,

        #[command(flatten)]
        participant: ParticipantArgs,
    },
    /// Age prediction from a finished Stroop run
    Age {
        /// Completion time in seconds; estimated from the trial count when omitted
        #[arg(long)]
        time: Option<f64>,

        #[arg(long)]
        errors: i64,

        #[arg(long, default_value = "easy")]
        difficulty: Difficulty,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);

    let mut config = match &cli.config {
        Some(path) => ExperimentConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ExperimentConfig::default(),
    };

    match cli.cmd {
        Commands::Reaction {
            repetitions,
            ref participant,
        } => {
            if let Some(repetitions) = repetitions {
                config.reaction_time.repetitions = repetitions;
            }
            config.validate().context("invalid reaction-time settings")?;
            let task = ReactionTimeTask::new(config.reaction_time);
            run_session(&cli, task, None, participant)
        }
        Commands::Stroop {
            difficulty,
            ref participant,
        } => {
            let task = StroopTask::new(config.stroop);
            run_session(&cli, task, Some(difficulty), participant)
        }
        Commands::Age {
            time,
            errors,
            difficulty,
        } => {
            let predicted = match time {
                Some(seconds) => age::predict_age(seconds, errors, difficulty)?,
                None => age::predict_from_errors(errors, DEFAULT_TRIAL_COUNT)?,
            };
            println!("Predicted age: {predicted:.1}");
            println!("{}", age::equation(difficulty));
            Ok(())
        }
    }
}

fn run_session<K>(
    cli: &Cli,
    task: K,
    selection: Option<K::Selection>,
    args: &ParticipantArgs,
) -> Result<()>
where
    K: Task,
    K::Stimulus: Distractor,
{
    if cli.realtime {
        drive(cli, task, HighPrecisionTimer::new(), selection, args)
    } else {
        drive(cli, task, ManualTimer::new(), selection, args)
    }
}

fn drive<K, T>(
    cli: &Cli,
    task: K,
    timer: T,
    selection: Option<K::Selection>,
    args: &ParticipantArgs,
) -> Result<()>
where
    K: Task,
    K::Stimulus: Distractor,
    T: Timer,
{
    let (session_rng, participant_rng) = match cli.seed {
        Some(seed) => (
            StdRng::seed_from_u64(seed),
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        ),
        None => (StdRng::from_os_rng(), StdRng::from_os_rng()),
    };
    info!(task = K::NAME, realtime = cli.realtime, seed = ?cli.seed, "running session");

    let machine = ExperimentStateMachine::new(task, timer, session_rng);
    let participant = SimulatedParticipant::new(
        args.mean_rt_ms,
        args.rt_spread_ms,
        args.error_rate,
        args.miss_rate,
        participant_rng,
    );
    let report = App::new(machine, participant).run(selection)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
