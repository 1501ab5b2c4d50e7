#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system that tops the population up to its cap every tick.

use std::time::Duration;

use gridwalk_core::{CellCoord, Command, Event};
use rand::Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    population_cap: usize,
}

impl Config {
    /// Creates a new configuration that fills the world up to `population_cap` units.
    #[must_use]
    pub const fn new(population_cap: usize) -> Self {
        Self { population_cap }
    }

    /// Maximum number of live units the system spawns towards.
    #[must_use]
    pub const fn population_cap(&self) -> usize {
        self.population_cap
    }
}

/// Pure system that emits spawn commands whenever time advances.
#[derive(Debug)]
pub struct Spawning {
    population_cap: usize,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            population_cap: config.population_cap,
        }
    }

    /// Consumes events and immutable views to emit spawn commands.
    ///
    /// Each spawn targets a uniformly chosen spawner and faces a uniformly
    /// chosen heading in `[0, 360)`.
    pub fn handle<R>(
        &mut self,
        events: &[Event],
        population: usize,
        spawners: &[CellCoord],
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        if spawners.is_empty() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }
        if accumulated.is_zero() {
            return;
        }

        for _ in 0..self.vacancies(population) {
            let spawn = spawners[rng.gen_range(0..spawners.len())];
            let heading = rng.gen_range(0.0..360.0);
            out.push(Command::SpawnUnit { spawn, heading });
        }
    }

    fn vacancies(&self, population: usize) -> usize {
        self.population_cap.saturating_sub(population)
    }
}
