#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs, queries and exports Gridwalk layouts.

mod layout_transfer;

use std::{
    fs,
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use gridwalk_core::{CellCoord, Event, DEFAULT_POPULATION_CAP};
use gridwalk_simulation::{Config, Simulation, DEFAULT_SEED};
use gridwalk_system_pathfinding::find_path;
use gridwalk_world::{self as world, query};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use layout_transfer::{ImportedLayout, LayoutSnapshot};

const DEFAULT_LAYOUT: &str = include_str!("../assets/default_layout.json");

#[derive(Parser, Debug)]
#[command(
    name = "gridwalk",
    version,
    about = "Headless grid navigation sandbox"
)]
struct Cli {
    /// Number of cell columns, unless the layout carries its own size.
    #[arg(long, default_value_t = 70)]
    width: u32,
    /// Number of cell rows, unless the layout carries its own size.
    #[arg(long, default_value_t = 40)]
    height: u32,
    /// Layout file holding a JSON document or a clipboard string.
    #[arg(long, conflicts_with = "blank")]
    layout: Option<PathBuf>,
    /// Start from an all-terrain grid instead of the bundled layout.
    #[arg(long)]
    blank: bool,
    /// Seed for spawn positions, headings and goal choices.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the simulation and log a summary every simulated second.
    Run {
        /// Number of ticks to simulate.
        #[arg(long, default_value_t = 2_400)]
        ticks: u64,
        /// Ticks per second.
        #[arg(long, default_value_t = 40.0)]
        tick_rate: f64,
        /// Maximum number of simultaneously live units.
        #[arg(long, default_value_t = DEFAULT_POPULATION_CAP)]
        population_cap: usize,
        /// Pace ticks against the wall clock and feed measured deltas.
        #[arg(long)]
        realtime: bool,
    },
    /// Print the way between two cells.
    Route {
        /// Start cell as `column,row`.
        #[arg(long, value_parser = parse_cell)]
        from: CellCoord,
        /// Goal cell as `column,row`.
        #[arg(long, value_parser = parse_cell)]
        to: CellCoord,
    },
    /// Print the loaded layout.
    Export {
        /// Emit the single-line clipboard form instead of JSON.
        #[arg(long)]
        compact: bool,
    },
}

/// Entry point for the Gridwalk command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let layout = load_layout(&cli)?;
    let (width, height) = layout.dimensions.unwrap_or((cli.width, cli.height));
    ensure!(width > 0 && height > 0, "grid must have at least one cell");

    let population_cap = match cli.command {
        Command::Run { population_cap, .. } => population_cap,
        _ => DEFAULT_POPULATION_CAP,
    };
    let mut simulation = Simulation::new(Config::new(
        world::Config::new(width, height).with_population_cap(population_cap),
        cli.seed,
    ));

    if layout.skipped > 0 {
        warn!(skipped = layout.skipped, "skipped malformed layout entries");
    }
    let changed = simulation.apply_layout(layout.cells);
    info!(
        width,
        height,
        changed,
        spawns = query::spawn_cells(simulation.world()).len(),
        goals = query::goal_cells(simulation.world()).len(),
        "layout loaded"
    );

    match cli.command {
        Command::Run {
            ticks,
            tick_rate,
            realtime,
            ..
        } => run(&mut simulation, ticks, tick_rate, realtime),
        Command::Route { from, to } => {
            route(&simulation, from, to);
            Ok(())
        }
        Command::Export { compact } => export(&simulation, width, height, compact),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_layout(cli: &Cli) -> Result<ImportedLayout> {
    if cli.blank {
        return Ok(ImportedLayout::default());
    }
    match &cli.layout {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read layout {}", path.display()))?;
            layout_transfer::decode(&contents)
                .with_context(|| format!("failed to load layout {}", path.display()))
        }
        None => layout_transfer::decode(DEFAULT_LAYOUT).context("bundled layout is invalid"),
    }
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `column,row`, got `{value}`"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid column `{column}`: {error}"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid row `{row}`: {error}"))?;
    Ok(CellCoord::new(column, row))
}

#[derive(Clone, Copy, Debug, Default)]
struct Summary {
    spawned: usize,
    arrived: usize,
    unreachable: usize,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::UnitSpawned { .. } => self.spawned += 1,
            Event::UnitArrived { .. } => self.arrived += 1,
            Event::RouteAssigned { waypoints: 0, .. } => self.unreachable += 1,
            _ => {}
        }
    }

    fn absorb(&mut self, other: Self) {
        self.spawned += other.spawned;
        self.arrived += other.arrived;
        self.unreachable += other.unreachable;
    }
}

fn run(simulation: &mut Simulation, ticks: u64, tick_rate: f64, realtime: bool) -> Result<()> {
    ensure!(
        tick_rate.is_finite() && tick_rate > 0.0,
        "tick rate must be a positive number, got {tick_rate}"
    );
    let frame = Duration::try_from_secs_f64(tick_rate.recip())
        .with_context(|| format!("tick rate {tick_rate} is out of range"))?;
    let ticks_per_report = (tick_rate.round() as u64).max(1);

    let mut second = Summary::default();
    let mut total = Summary::default();
    let mut last = Instant::now();
    for tick in 1..=ticks {
        let dt = if realtime {
            thread::sleep(frame.saturating_sub(last.elapsed()));
            let now = Instant::now();
            let measured = now.duration_since(last);
            last = now;
            measured
        } else {
            frame
        };

        for event in simulation.tick(dt) {
            second.record(&event);
        }

        if tick % ticks_per_report == 0 {
            info!(
                clock = query::clock(simulation.world()).as_secs_f64(),
                population = query::population(simulation.world()),
                spawned = second.spawned,
                arrived = second.arrived,
                unreachable = second.unreachable,
                "progress"
            );
            total.absorb(second);
            second = Summary::default();
        }
    }
    total.absorb(second);

    info!(
        ticks,
        clock = query::clock(simulation.world()).as_secs_f64(),
        population = query::population(simulation.world()),
        spawned = total.spawned,
        arrived = total.arrived,
        unreachable = total.unreachable,
        "run finished"
    );
    Ok(())
}

fn route(simulation: &Simulation, from: CellCoord, to: CellCoord) {
    let way = find_path(query::grid(simulation.world()), Some(from), Some(to));
    if way.is_empty() {
        println!("unreachable");
        return;
    }
    let cells: Vec<String> = way.iter().map(ToString::to_string).collect();
    println!("{}", cells.join(" -> "));
}

fn export(simulation: &Simulation, width: u32, height: u32, compact: bool) -> Result<()> {
    let snapshot = LayoutSnapshot {
        width,
        height,
        cells: query::layout(simulation.world()),
    };
    let output = if compact {
        snapshot.encode()
    } else {
        snapshot.to_json()
    };
    println!("{}", output.context("failed to serialise layout")?);
    Ok(())
}
