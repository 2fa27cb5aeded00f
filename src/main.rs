//! Headless driver: builds a web from flags or a JSON config, evolves it for a
//! number of generations and writes the results.
//!
//! Usage:
//!   weaver --sides 12 --flies 300 --generations 2000 --seed 7
//!   RUST_LOG=weaver=debug weaver --config web.json --report report.json

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use weaver::{RunReport, ScoringPolicy, Simulation, WebConfig};

#[derive(Parser)]
#[command(name = "weaver")]
#[command(about = "Evolve spider webs that catch the most flies for the least silk")]
struct Args {
    /// JSON file with a web configuration; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of skeleton lines
    #[arg(long)]
    sides: Option<usize>,

    /// Number of flies
    #[arg(long)]
    flies: Option<usize>,

    /// Upper bound on the total trapping net length
    #[arg(long)]
    max_length: Option<f64>,

    /// Sample most flies from the restricted band instead of uniformly
    #[arg(long)]
    restricted_flies: bool,

    /// Resample the flies every generation
    #[arg(long)]
    dynamic_flies: bool,

    /// Mutated children per generation
    #[arg(long)]
    children: Option<usize>,

    /// Ranking policy: catches, blended or rate
    #[arg(long, value_parser = parse_scoring)]
    scoring: Option<ScoringPolicy>,

    /// Generations to run
    #[arg(long, default_value_t = 1000)]
    generations: u64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write a JSON run report here
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write a JSON snapshot of the final web here
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn parse_scoring(value: &str) -> Result<ScoringPolicy, String> {
    ScoringPolicy::parse_cli(value).ok_or_else(|| format!("unknown scoring policy `{value}`"))
}

fn load_config(args: &Args) -> Result<WebConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => WebConfig::default(),
    };

    if let Some(sides) = args.sides {
        config.sides_count = sides;
    }
    if let Some(flies) = args.flies {
        config.flies_count = flies;
    }
    if let Some(max_length) = args.max_length {
        config.max_net_length = max_length;
    }
    if args.restricted_flies {
        config.normal_flies_distribution = false;
    }
    if args.dynamic_flies {
        config.dynamic_flies = true;
    }
    if let Some(children) = args.children {
        config.children_count = children;
    }
    if let Some(scoring) = args.scoring {
        config.scoring = scoring;
    }

    config.validate().context("invalid web configuration")?;
    Ok(config)
}

fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let mut sim = Simulation::new(config, args.seed).context("failed to create a web")?;
    println!("{}", sim.status_line());

    sim.run(args.generations, |progress| {
        info!(percent = progress.percent, done = progress.done, "working");
    })
    .context("evolution aborted")?;

    println!("{}", sim.status_line());

    if let Some(path) = &args.report {
        write_json(path, &RunReport::from_simulation(&sim))?;
    }
    if let Some(path) = &args.snapshot {
        write_json(path, &sim.web().snapshot())?;
    }
    Ok(())
}
