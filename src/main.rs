//! # gridpath CLI
//!
//! Train the grid agent from the command line, or answer one of the fixed
//! front-end routes and print the response.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use gridpath::agent::AgentBuilder;
use gridpath::checkpoint::CheckpointPolicy;
use gridpath::config::{AgentConfig, TrainingConfig};
use gridpath::environment::{Cell, Obstacle};
use gridpath::routes;
use gridpath::trainer::Trainer;

#[derive(Parser)]
#[command(name = "gridpath", about = "Deep Q-learning on a grid")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train (or resume) an agent and print the final episode as JSON
    Train(TrainArgs),
    /// Answer a front-end route and print its status and body
    Route {
        /// Route name or path, e.g. `tensorflow_simple`
        name: String,
        /// Directory holding `models/<route>/`
        #[arg(long, default_value = ".")]
        base_dir: PathBuf,
    },
}

#[derive(clap::Args)]
struct TrainArgs {
    /// JSON training configuration; explicit flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON agent configuration
    #[arg(long)]
    agent_config: Option<PathBuf>,
    /// Grid side length [default: 5]
    #[arg(long)]
    grid_size: Option<usize>,
    /// Obstacle cell as `ROW,COL`; repeatable
    #[arg(long = "obstacle", value_parser = parse_cell)]
    obstacles: Vec<Obstacle>,
    /// [default: 10]
    #[arg(long)]
    episodes: Option<usize>,
    /// [default: model.bin]
    #[arg(long)]
    model_path: Option<PathBuf>,
    /// [default: epsilon.json]
    #[arg(long)]
    epsilon_path: Option<PathBuf>,
    /// every-step, every-episode, never, or a step interval
    #[arg(long)]
    checkpoint: Option<CheckpointPolicy>,
    #[arg(long)]
    seed: Option<u64>,
    /// Print the full training report instead of only the last episode
    #[arg(long)]
    report: bool,
}

fn parse_cell(s: &str) -> std::result::Result<Cell, String> {
    let (row, col) = s.split_once(',').ok_or_else(|| format!("expected ROW,COL, got '{}'", s))?;
    let row = row.trim().parse().map_err(|e| format!("bad row in '{}': {}", s, e))?;
    let col = col.trim().parse().map_err(|e| format!("bad col in '{}': {}", s, e))?;
    Ok(Cell::new(row, col))
}

/// The training configuration file, or the defaults, with every flag given
/// on the command line applied on top.
fn training_config(args: &TrainArgs) -> Result<TrainingConfig> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_json_file(path)
            .with_context(|| format!("reading training config {}", path.display()))?,
        None => TrainingConfig::new(5, vec![], 10, "model.bin", "epsilon.json"),
    };

    if let Some(grid_size) = args.grid_size {
        config.grid_size = grid_size;
    }
    if !args.obstacles.is_empty() {
        config.obstacles = args.obstacles.clone();
    }
    if let Some(episodes) = args.episodes {
        config.episodes = episodes;
    }
    if let Some(path) = &args.model_path {
        config.model_path = path.clone();
    }
    if let Some(path) = &args.epsilon_path {
        config.epsilon_path = path.clone();
    }
    if let Some(checkpoint) = args.checkpoint {
        config.checkpoint = checkpoint;
    }
    Ok(config)
}

fn train(args: TrainArgs) -> Result<()> {
    let config = training_config(&args)?;

    let mut agent_config = match &args.agent_config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading agent config {}", path.display()))?;
            serde_json::from_str::<AgentConfig>(&text)?
        }
        None => AgentConfig::default(),
    };
    if args.seed.is_some() {
        agent_config.seed = args.seed;
    }

    let trainer = Trainer::new(config)?;
    let mut agent = AgentBuilder::from_config(agent_config).build()?;
    let report = trainer.run(&mut agent)?;

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.last_episode.to_json()?);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    match Cli::parse().command {
        Command::Train(args) => train(args),
        Command::Route { name, base_dir } => {
            let response = routes::respond(&name, &base_dir);
            println!("{}", response.status);
            println!("{}", response.body);
            if response.is_success() {
                Ok(())
            } else {
                anyhow::bail!("route {} answered {}", name, response.status)
            }
        }
    }
}
