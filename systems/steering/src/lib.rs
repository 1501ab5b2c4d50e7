#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-unit steering: arrival checks, route assignment, waypoint advancement,
//! rotation and translation.

mod kinematics;

use std::time::Duration;

use glam::DVec2;
use gridwalk_core::{CellCoord, Command, Event, UnitSnapshot, UnitView};
use gridwalk_system_pathfinding::find_path;
use gridwalk_world::{normalize_heading, Grid, CELL_SIZE};
use rand::Rng;

use kinematics::{angular_difference, bearing, forward, rotation_sign};

/// Tuning parameters for the steering system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    dead_zone: f64,
    alignment_limit: f64,
    lookahead_cells: f64,
}

impl Config {
    /// Creates a configuration from explicit angles (degrees) and lookahead (cells).
    #[must_use]
    pub const fn new(dead_zone: f64, alignment_limit: f64, lookahead_cells: f64) -> Self {
        Self {
            dead_zone,
            alignment_limit,
            lookahead_cells,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(15.0, 50.0, 2.0)
    }
}

/// Pure system that turns elapsed time into steering commands.
#[derive(Debug, Default)]
pub struct Steering {
    config: Config,
}

impl Steering {
    /// Creates a steering system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Consumes world events and immutable views to emit steering commands.
    ///
    /// Nothing is emitted unless the events carry a non-zero
    /// [`Event::TimeAdvanced`]. Units are visited in identifier order.
    pub fn handle<R>(
        &mut self,
        events: &[Event],
        grid: &Grid,
        units: &UnitView,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        let mut elapsed = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = elapsed.saturating_add(*dt);
            }
        }
        if elapsed.is_zero() {
            return;
        }
        let dt = elapsed.as_secs_f64();

        for unit in units.iter() {
            self.steer(unit, grid, dt, rng, out);
        }
    }

    fn steer<R>(
        &self,
        unit: &UnitSnapshot,
        grid: &Grid,
        dt: f64,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        let current = grid.lookup_point(unit.position);
        if current.is_some() && current == unit.goal {
            out.push(Command::RetireUnit { unit: unit.id });
            return;
        }

        let way = if unit.way.is_empty() {
            let goals = grid.goals();
            if goals.is_empty() {
                return;
            }
            let goal = goals[rng.gen_range(0..goals.len())];
            let way = find_path(grid, current, Some(goal));
            out.push(Command::AssignRoute {
                unit: unit.id,
                goal,
                way: way.clone(),
            });
            way
        } else {
            unit.way.clone()
        };

        let (consumed, target) = self.advance(&way, current, unit.position);

        let mut heading = unit.heading;
        let mut position = unit.position;
        if let Some(target) = target {
            let desired = bearing(position, Grid::center(target));
            let difference = angular_difference(desired, heading);
            if difference > self.config.dead_zone {
                let step = (unit.profile.rotate_speed * dt).min(difference);
                heading = normalize_heading(heading + rotation_sign(heading, desired) * step);
            }
            if difference < self.config.alignment_limit {
                position += forward(heading) * (unit.profile.move_speed * dt);
            }
        }

        if target.is_some() || consumed > 0 {
            out.push(Command::SteerUnit {
                unit: unit.id,
                consumed,
                heading,
                position,
            });
        }
    }

    /// Counts the head waypoints already reached and returns the next target.
    fn advance(
        &self,
        way: &[CellCoord],
        current: Option<CellCoord>,
        position: DVec2,
    ) -> (usize, Option<CellCoord>) {
        let reach = self.config.lookahead_cells * CELL_SIZE;
        let mut consumed = 0;
        while let Some(&head) = way.get(consumed) {
            let passed = Some(head) == current
                || (consumed + 1 < way.len() && position.distance(Grid::center(head)) < reach);
            if !passed {
                return (consumed, Some(head));
            }
            consumed += 1;
        }
        (consumed, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_skips_close_waypoints_but_keeps_the_last() {
        let steering = Steering::default();
        let way = [
            CellCoord::new(0, 0),
            CellCoord::new(1, 0),
            CellCoord::new(2, 0),
        ];
        let (consumed, target) =
            steering.advance(&way, Some(CellCoord::new(0, 0)), DVec2::new(0.5, 0.5));
        assert_eq!(consumed, 2);
        assert_eq!(target, Some(CellCoord::new(2, 0)));
    }

    #[test]
    fn advance_keeps_distant_waypoints() {
        let steering = Steering::default();
        let way = [CellCoord::new(5, 0), CellCoord::new(6, 0)];
        let (consumed, target) =
            steering.advance(&way, Some(CellCoord::new(0, 0)), DVec2::new(0.5, 0.5));
        assert_eq!(consumed, 0);
        assert_eq!(target, Some(CellCoord::new(5, 0)));
    }

    #[test]
    fn advance_drops_the_goal_once_inside_it() {
        let steering = Steering::default();
        let goal = CellCoord::new(3, 3);
        let (consumed, target) = steering.advance(&[goal], Some(goal), DVec2::new(3.2, 3.9));
        assert_eq!(consumed, 1);
        assert_eq!(target, None);
    }
}
