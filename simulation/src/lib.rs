#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Owns a world together with the systems that drive it and runs the tick loop.
//!
//! Every tick applies the clock, fills the population up to its cap, then
//! steers each live unit. Systems only ever see read-only views; all mutation
//! happens through [`gridwalk_world::apply`].

use std::time::Duration;

use gridwalk_core::{CellCoord, CellKind, CellOverride, Command, Event};
use gridwalk_system_editor::{Editor, EditorInput};
use gridwalk_system_spawning::{self as spawning, Spawning};
use gridwalk_system_steering::{self as steering, Steering};
use gridwalk_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

/// Seed used when no explicit seed is configured.
pub const DEFAULT_SEED: u64 = 0x5eed_0f_9a1d;

/// Configuration parameters required to construct a simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    world: world::Config,
    steering: steering::Config,
    seed: u64,
}

impl Config {
    /// Creates a configuration from a world description and an RNG seed.
    #[must_use]
    pub fn new(world: world::Config, seed: u64) -> Self {
        Self {
            world,
            steering: steering::Config::default(),
            seed,
        }
    }

    /// Overrides the steering tuning.
    #[must_use]
    pub const fn with_steering(mut self, steering: steering::Config) -> Self {
        self.steering = steering;
        self
    }

    /// World description used to build the simulation.
    #[must_use]
    pub const fn world(&self) -> world::Config {
        self.world
    }

    /// Seed for the simulation's random number generator.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(world::Config::default(), DEFAULT_SEED)
    }
}

/// A world plus the systems and randomness that advance it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    spawning: Spawning,
    steering: Steering,
    rng: ChaCha8Rng,
}

impl Simulation {
    /// Builds an empty world and seeds the simulation's RNG.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let world_config = config.world();
        Self {
            world: World::with_config(world_config),
            spawning: Spawning::new(spawning::Config::new(world_config.population_cap())),
            steering: Steering::new(config.steering),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    /// Read-only access to the simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Advances the simulation by `dt` and returns every event it produced.
    ///
    /// A zero `dt` leaves the world untouched.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        if dt.is_zero() {
            return events;
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        self.spawning.handle(
            &events,
            query::population(&self.world),
            query::spawn_cells(&self.world),
            &mut self.rng,
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        let units = query::unit_view(&self.world);
        self.steering.handle(
            &events,
            query::grid(&self.world),
            &units,
            &mut self.rng,
            &mut commands,
        );
        self.flush(&mut commands, &mut events);

        trace!(
            tick = query::tick_index(&self.world),
            dt = dt.as_secs_f64(),
            population = query::population(&self.world),
            events = events.len(),
            "tick"
        );
        events
    }

    /// Changes the kind of a single cell, reporting whether anything changed.
    pub fn edit(&mut self, cell: CellCoord, kind: CellKind) -> bool {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::SetCellKind { cell, kind },
            &mut events,
        );
        changed_cells(&events) > 0
    }

    /// Applies a batch of overrides and returns how many cells changed.
    pub fn apply_layout(&mut self, overrides: Vec<CellOverride>) -> usize {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::ApplyLayout { overrides },
            &mut events,
        );
        changed_cells(&events)
    }

    /// Routes adapter input through `editor` and applies the resulting edits.
    pub fn handle_editor_input(&mut self, editor: &mut Editor, input: EditorInput) -> bool {
        let mut commands = Vec::new();
        editor.handle(
            input,
            |cell| query::cell_kind(&self.world, cell),
            &mut commands,
        );
        let mut events = Vec::new();
        self.flush(&mut commands, &mut events);
        changed_cells(&events) > 0
    }

    fn flush(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }
}

fn changed_cells(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::CellKindChanged { .. }))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_dt_is_a_no_op() {
        let mut simulation = Simulation::new(Config::default());
        assert!(simulation.tick(Duration::ZERO).is_empty());
        assert_eq!(query::tick_index(simulation.world()), 0);
    }

    #[test]
    fn edit_reports_unchanged_cells() {
        let mut simulation = Simulation::new(Config::new(world::Config::new(3, 3), 1));
        let cell = CellCoord::new(1, 1);
        assert!(simulation.edit(cell, CellKind::Obstacle));
        assert!(!simulation.edit(cell, CellKind::Obstacle));
        assert!(!simulation.edit(CellCoord::new(5, 5), CellKind::Goal));
    }
}
