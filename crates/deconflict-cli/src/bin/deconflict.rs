//! Check planned UAV missions for spatio-temporal conflicts.
//!
//! Usage:
//!   cargo run -p deconflict-cli --bin deconflict -- check --missions plans.json
//!   cargo run -p deconflict-cli --bin deconflict -- scenario direct-conflict

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use deconflict_cli::loader::{build_detector, load_missions};
use deconflict_cli::report::{exit_code, render_json, render_text};
use deconflict_cli::{run_parallel, Config, Scenario, ScenarioKind};
use deconflict_core::DetectionReport;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Strategic deconfliction for planned drone missions
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    thresholds: Thresholds,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Thresholds {
    /// Minimum separation distance (overrides DECONFLICT_SAFETY_BUFFER)
    #[arg(long, global = true)]
    safety_buffer: Option<f64>,

    /// Maximum arrival-time gap in seconds (overrides DECONFLICT_TIME_THRESHOLD_SECS)
    #[arg(long, global = true)]
    time_threshold: Option<f64>,

    /// Trajectory sampling step in seconds (overrides DECONFLICT_SAMPLE_STEP_SECS)
    #[arg(long, global = true)]
    sample_step: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check missions loaded from a JSON file
    Check {
        /// Mission file path
        #[arg(long)]
        missions: PathBuf,

        /// Verify only this drone's mission against all others
        #[arg(long, conflicts_with = "parallel")]
        primary: Option<String>,

        /// Check mission pairs concurrently
        #[arg(long)]
        parallel: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a built-in scenario
    Scenario {
        #[arg(value_enum)]
        kind: ScenarioKind,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("deconflict_core=info".parse()?)
        .add_directive("deconflict_cli=info".parse()?);

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
    Ok(())
}

fn print_report(report: &DetectionReport, json: bool) -> Result<()> {
    if json {
        println!("{}", render_json(report)?);
    } else {
        print!("{}", render_text(report));
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<i32> {
    let mut config = Config::from_env();
    if let Some(buffer) = cli.thresholds.safety_buffer {
        config.safety_buffer = buffer;
    }
    if let Some(threshold) = cli.thresholds.time_threshold {
        config.time_threshold_secs = threshold;
    }
    if let Some(step) = cli.thresholds.sample_step {
        config.sample_step_secs = step;
    }
    let rules = config.rules();
    tracing::info!(
        "Safety buffer {}, time threshold {}s, sample step {}s",
        rules.safety_buffer,
        rules.time_threshold_secs,
        rules.sample_step_secs
    );

    match cli.command {
        Command::Check {
            missions,
            primary,
            parallel,
            json,
        } => {
            let missions = load_missions(&missions)?;
            let report = match primary {
                Some(primary_id) => {
                    let Some(primary) = missions
                        .iter()
                        .find(|m| m.drone_id() == primary_id)
                        .cloned()
                    else {
                        bail!("Primary drone '{}' not found in mission file", primary_id);
                    };
                    let others = missions
                        .into_iter()
                        .filter(|m| m.drone_id() != primary_id)
                        .collect();
                    build_detector(rules, others)?.verify_mission(&primary)
                }
                None => {
                    let detector = build_detector(rules, missions)?;
                    if parallel {
                        run_parallel(&detector, config.max_concurrency).await?
                    } else {
                        detector.run()
                    }
                }
            };
            print_report(&report, json)?;
            Ok(exit_code(&report))
        }
        Command::Scenario { kind, json } => {
            let scenario = Scenario::build(kind, Utc::now())
                .with_context(|| format!("Failed to build scenario {:?}", kind))?;
            if !json {
                println!("\n--- Running Scenario: {} ---", scenario.name);
            }
            let detector = scenario.detector(rules)?;
            let report = scenario.verify(&detector);
            print_report(&report, json)?;
            Ok(exit_code(&report))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    let code = run(cli).await?;
    std::process::exit(code);
}
