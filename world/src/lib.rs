#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Gridwalk.

mod grid;

use std::{collections::VecDeque, time::Duration};

use glam::DVec2;
use gridwalk_core::{
    CellCoord, CellKind, CellOverride, Command, Event, RouteError, SpawnError, UnitId,
    UnitProfile, DEFAULT_POPULATION_CAP,
};
use tracing::debug;

pub use grid::{Cell, Grid, CELL_SIZE, DIAGONAL_COST, EDGE_PENALTY, ORTHOGONAL_COST};

const DEFAULT_GRID_WIDTH: u32 = 70;
const DEFAULT_GRID_HEIGHT: u32 = 40;

/// Configuration parameters required to construct a world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    width: u32,
    height: u32,
    population_cap: usize,
    unit_profile: UnitProfile,
}

impl Config {
    /// Creates a configuration for a grid of the given size with default units.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            population_cap: DEFAULT_POPULATION_CAP,
            unit_profile: UnitProfile::default(),
        }
    }

    /// Overrides the maximum number of simultaneously live units.
    #[must_use]
    pub const fn with_population_cap(mut self, population_cap: usize) -> Self {
        self.population_cap = population_cap;
        self
    }

    /// Overrides the physical profile given to spawned units.
    #[must_use]
    pub const fn with_unit_profile(mut self, unit_profile: UnitProfile) -> Self {
        self.unit_profile = unit_profile;
        self
    }

    /// Maximum number of simultaneously live units.
    #[must_use]
    pub const fn population_cap(&self) -> usize {
        self.population_cap
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT)
    }
}

/// Represents the authoritative Gridwalk world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    units: Vec<Unit>,
    next_unit_id: u32,
    population_cap: usize,
    unit_profile: UnitProfile,
    clock: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a world from an explicit configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        debug!(
            width = config.width,
            height = config.height,
            population_cap = config.population_cap,
            "world created"
        );
        Self {
            grid: Grid::new(config.width, config.height),
            units: Vec::new(),
            next_unit_id: 0,
            population_cap: config.population_cap,
            unit_profile: config.unit_profile,
            clock: Duration::ZERO,
            tick_index: 0,
        }
    }

    fn unit_mut(&mut self, unit: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|candidate| candidate.id == unit)
    }

    fn unit_index(&self, unit: UnitId) -> Option<usize> {
        self.units.iter().position(|candidate| candidate.id == unit)
    }

    fn invalidate_routes(&mut self, out_events: &mut Vec<Event>) {
        for unit in &mut self.units {
            unit.way.clear();
        }
        out_events.push(Event::RoutesInvalidated);
    }

    fn spawn_unit(&mut self, spawn: CellCoord, heading: f64, out_events: &mut Vec<Event>) {
        if self.units.len() >= self.population_cap {
            out_events.push(Event::SpawnRejected {
                spawn,
                reason: SpawnError::PopulationCapReached,
            });
            return;
        }
        if self.grid.kind(spawn) != Some(CellKind::Spawn) {
            out_events.push(Event::SpawnRejected {
                spawn,
                reason: SpawnError::NotASpawnCell,
            });
            return;
        }

        let id = UnitId::new(self.next_unit_id);
        self.next_unit_id = self.next_unit_id.wrapping_add(1);
        let heading = normalize_heading(heading);
        self.units.push(Unit {
            id,
            position: Grid::origin(spawn),
            heading,
            profile: self.unit_profile,
            goal: None,
            way: VecDeque::new(),
        });
        debug!(unit = %id, cell = %spawn, heading, "unit created");
        out_events.push(Event::UnitSpawned {
            unit: id,
            cell: spawn,
            heading,
        });
    }

    fn retire_unit(&mut self, unit: UnitId, out_events: &mut Vec<Event>) {
        let Some(index) = self.unit_index(unit) else {
            return;
        };
        let candidate = &self.units[index];
        let Some(goal) = candidate.goal else {
            return;
        };
        if self.grid.lookup_point(candidate.position) != Some(goal) {
            return;
        }

        let _ = self.units.remove(index);
        debug!(unit = %unit, goal = %goal, "unit arrived");
        out_events.push(Event::UnitArrived { unit, goal });
    }

    fn assign_route(
        &mut self,
        unit: UnitId,
        goal: CellCoord,
        way: Vec<CellCoord>,
        out_events: &mut Vec<Event>,
    ) {
        let rejection = if self.grid.index(goal).is_none() {
            Some(RouteError::OutOfBounds)
        } else if way.last().is_some_and(|last| *last != goal) {
            Some(RouteError::DetachedWay)
        } else {
            None
        };
        if let Some(reason) = rejection {
            out_events.push(Event::RouteRejected { unit, reason });
            return;
        }

        let waypoints = way.len();
        let Some(target) = self.unit_mut(unit) else {
            out_events.push(Event::RouteRejected {
                unit,
                reason: RouteError::MissingUnit,
            });
            return;
        };
        target.goal = Some(goal);
        target.way = way.into();
        out_events.push(Event::RouteAssigned {
            unit,
            goal,
            waypoints,
        });
    }

    fn steer_unit(
        &mut self,
        unit: UnitId,
        consumed: usize,
        heading: f64,
        position: DVec2,
        out_events: &mut Vec<Event>,
    ) {
        let Some(target) = self.unit_mut(unit) else {
            return;
        };
        let consumed = consumed.min(target.way.len());
        let _ = target.way.drain(..consumed);
        target.heading = normalize_heading(heading);
        target.position = position;
        out_events.push(Event::UnitMoved {
            unit,
            position,
            heading: target.heading,
        });
    }

    fn set_cell_kind(&mut self, cell: CellCoord, kind: CellKind, out_events: &mut Vec<Event>) {
        let Some(from) = self.grid.kind(cell) else {
            return;
        };
        if !self.grid.set_kind(cell, kind) {
            return;
        }

        self.grid.rebuild();
        debug!(cell = %cell, ?from, to = ?kind, "cell kind changed");
        out_events.push(Event::CellKindChanged {
            cell,
            from,
            to: kind,
        });
        self.invalidate_routes(out_events);
    }

    fn apply_layout(&mut self, overrides: Vec<CellOverride>, out_events: &mut Vec<Event>) {
        let mut changed = 0_usize;
        let mut skipped = 0_usize;
        for entry in overrides {
            let Some(from) = self.grid.kind(entry.cell) else {
                skipped += 1;
                continue;
            };
            if self.grid.set_kind(entry.cell, entry.kind) {
                changed += 1;
                out_events.push(Event::CellKindChanged {
                    cell: entry.cell,
                    from,
                    to: entry.kind,
                });
            }
        }

        debug!(changed, skipped, "layout applied");
        if changed > 0 {
            self.grid.rebuild();
            self.invalidate_routes(out_events);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetCellKind { cell, kind } => world.set_cell_kind(cell, kind, out_events),
        Command::ApplyLayout { overrides } => world.apply_layout(overrides, out_events),
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnUnit { spawn, heading } => world.spawn_unit(spawn, heading, out_events),
        Command::RetireUnit { unit } => world.retire_unit(unit, out_events),
        Command::AssignRoute { unit, goal, way } => {
            world.assign_route(unit, goal, way, out_events);
        }
        Command::SteerUnit {
            unit,
            consumed,
            heading,
            position,
        } => world.steer_unit(unit, consumed, heading, position, out_events),
    }
}

/// Maps an angle in degrees into `[0, 360)`.
///
/// Negative angles are shifted by one full turn, every other value is reduced
/// modulo 360, which is exact for the single-turn deltas steering produces.
#[must_use]
pub fn normalize_heading(angle: f64) -> f64 {
    if angle < 0.0 {
        360.0 + angle
    } else {
        angle % 360.0
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Grid, World};
    use gridwalk_core::{CellCoord, CellKind, CellOverride, UnitSnapshot, UnitView};

    /// Provides read-only access to the cell table.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Kind of the cell at `cell`, if it lies within the grid.
    #[must_use]
    pub fn cell_kind(world: &World, cell: CellCoord) -> Option<CellKind> {
        world.grid.kind(cell)
    }

    /// Spawn cells known to the world.
    #[must_use]
    pub fn spawn_cells(world: &World) -> &[CellCoord] {
        world.grid.spawns()
    }

    /// Goal cells known to the world.
    #[must_use]
    pub fn goal_cells(world: &World) -> &[CellCoord] {
        world.grid.goals()
    }

    /// Every non-terrain cell, suitable for persisting the layout.
    #[must_use]
    pub fn layout(world: &World) -> Vec<CellOverride> {
        world.grid.overrides()
    }

    /// Number of live units.
    #[must_use]
    pub fn population(world: &World) -> usize {
        world.units.len()
    }

    /// Maximum number of live units the world accepts.
    #[must_use]
    pub fn population_cap(world: &World) -> usize {
        world.population_cap
    }

    /// Total simulated time applied through ticks.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a read-only view of the live units.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        UnitView::from_snapshots(
            world
                .units
                .iter()
                .map(|unit| UnitSnapshot {
                    id: unit.id,
                    position: unit.position,
                    heading: unit.heading,
                    profile: unit.profile,
                    goal: unit.goal,
                    way: unit.way.iter().copied().collect(),
                })
                .collect(),
        )
    }
}

#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    position: DVec2,
    heading: f64,
    profile: UnitProfile,
    goal: Option<CellCoord>,
    way: VecDeque<CellCoord>,
}
