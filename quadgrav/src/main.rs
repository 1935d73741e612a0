use quadgrav::{bench_gravity, bench_step_curve};
use quadgrav::{Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quadgrav", about = "Barnes-Hut gravity for 2D bodies in a circular world")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario headless and print a summary
    Run {
        /// Scenario file; bare names are looked up in the crate's scenarios/ directory
        #[arg(short, long, default_value = "two_body.yaml")]
        file: String,

        /// Override the scenario's step count
        #[arg(long)]
        steps: Option<usize>,
    },
    /// Compare direct summation and Barnes-Hut on generated fields
    Bench {
        #[arg(long, value_delimiter = ',', default_values_t = vec![200, 400, 800, 1600, 3200, 6400])]
        sizes: Vec<usize>,

        #[arg(long, default_value_t = 0.5)]
        theta: f64,

        /// Print a CSV of full-step timings up to this many bodies instead
        #[arg(long)]
        curve: Option<usize>,
    },
}

// resolve here to keep main clean
fn scenario_path(file: &str) -> PathBuf {
    let direct = PathBuf::from(file);
    if direct.exists() {
        return direct;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file)
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let args = Args::parse();

    match args.command {
        Command::Run { file, steps } => {
            let path = scenario_path(&file);
            let cfg = ScenarioConfig::from_path(&path)
                .with_context(|| format!("loading scenario {}", path.display()))?;
            let mut scenario = Scenario::build_scenario(cfg).context("building scenario")?;

            let steps = steps.unwrap_or(scenario.steps);
            let summary = scenario.run(steps);

            println!(
                "steps = {}, bodies = {}, reflections = {}, rejected = {}, max depth = {}, mean speed = {:.6}",
                summary.steps,
                scenario.system.bodies.len(),
                summary.reflected,
                summary.rejected,
                summary.max_tree_depth,
                summary.mean_speed
            );
        }
        Command::Bench { sizes, theta, curve } => match curve {
            Some(max_n) => bench_step_curve(max_n, 200),
            None => bench_gravity(&sizes, theta),
        },
    }

    Ok(())
}
