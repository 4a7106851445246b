// Scripted RRT / RRT* run on the predefined arena
//
// usage: grid_rrt [--strategy rrt|rrt-star] [--grid-size N] [--seed S]

use std::fs;
use std::process;

use clap::Parser;
use log::{error, info};

use grid_rrt::{
    Cell, ObstacleLayout, PlannerConfig, RrtError, RrtResult, SessionSignals, Simulation, Strategy,
    TickOutcome,
};

const MAX_TICKS: usize = 2_000_000;

/// Grow a tree across the predefined arena and save a snapshot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tree growth strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::RrtStar)]
    strategy: Strategy,

    /// Grid dimension N of the N x N arena (even)
    #[arg(short, long, default_value_t = 200)]
    grid_size: usize,

    /// Seed for obstacle placement and sampling
    #[arg(long)]
    seed: Option<u64>,
}

fn run(args: Args) -> RrtResult<()> {
    let config = PlannerConfig {
        strategy: args.strategy,
        seed: args.seed,
        ..PlannerConfig::for_grid(args.grid_size)
    };
    let n = config.grid_size as i32;
    let strategy = config.strategy;
    let mut sim = Simulation::new(config, ObstacleLayout::Predefined)?;

    // lower-left room to lower-right room, through both wall gaps
    let start = Cell::new(n / 10, n / 10);
    let end = Cell::new(n * 17 / 20, n / 10);
    let script = [
        SessionSignals::click(start),
        SessionSignals::confirm_start(),
        SessionSignals::click(end),
        SessionSignals::confirm_end(),
    ];
    for signals in &script {
        if let TickOutcome::Rejected(err) = sim.tick(signals)? {
            return Err(err);
        }
    }

    let path = match sim.run_until_path(MAX_TICKS)? {
        Some(path) => path,
        None => {
            error!("no path after {} ticks", sim.ticks());
            return Ok(());
        }
    };
    info!(
        "path with {} cells after {} ticks, tree holds {} nodes",
        path.len(),
        sim.ticks(),
        sim.tree().len()
    );

    let title = format!("{:?} on a {}x{} grid", strategy, n, n);
    let mut vis = sim.snapshot(&title);
    fs::create_dir_all("./img").map_err(|e| RrtError::VisualizationError(e.to_string()))?;
    vis.save_png("./img/grid_rrt.png", 800, 800)?;
    info!("snapshot saved to ./img/grid_rrt.png");
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(args) {
        error!("{}", err);
        process::exit(1);
    }
}
