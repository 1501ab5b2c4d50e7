#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gridwalk engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems react to. Systems consume event streams, query immutable
//! snapshots such as [`UnitView`], and respond exclusively with new command
//! batches.

use std::{fmt, time::Duration};

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of units that may be alive at the same time by default.
pub const DEFAULT_POPULATION_CAP: usize = 50;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Changes the kind of a single cell.
    SetCellKind {
        /// Cell being edited.
        cell: CellCoord,
        /// Kind the cell should adopt.
        kind: CellKind,
    },
    /// Applies a batch of cell kinds, typically loaded from a persisted layout.
    ApplyLayout {
        /// Overrides to apply; entries outside the grid are skipped.
        overrides: Vec<CellOverride>,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests creation of a new unit on a spawn cell.
    SpawnUnit {
        /// Spawn cell the unit appears on.
        spawn: CellCoord,
        /// Initial heading in degrees.
        heading: f64,
    },
    /// Removes a unit that reached its goal.
    RetireUnit {
        /// Identifier of the unit that arrived.
        unit: UnitId,
    },
    /// Assigns a goal and the way leading to it.
    AssignRoute {
        /// Identifier of the unit receiving the route.
        unit: UnitId,
        /// Goal cell selected for the unit.
        goal: CellCoord,
        /// Ordered waypoints from the unit's cell to the goal, possibly empty.
        way: Vec<CellCoord>,
    },
    /// Commits the kinematic result of one steering pass for a unit.
    SteerUnit {
        /// Identifier of the steered unit.
        unit: UnitId,
        /// Number of waypoints consumed from the front of the way.
        consumed: usize,
        /// Heading after rotation, in degrees.
        heading: f64,
        /// Position after translation, in world units.
        position: DVec2,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Reports that a cell changed kind.
    CellKindChanged {
        /// Cell that was edited.
        cell: CellCoord,
        /// Kind held before the edit.
        from: CellKind,
        /// Kind held after the edit.
        to: CellKind,
    },
    /// Announces that every unit's way was cleared after a grid edit.
    RoutesInvalidated,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a unit was created on a spawn cell.
    UnitSpawned {
        /// Identifier assigned to the new unit.
        unit: UnitId,
        /// Spawn cell the unit appeared on.
        cell: CellCoord,
        /// Initial heading in degrees.
        heading: f64,
    },
    /// Reports that a spawn request was refused.
    SpawnRejected {
        /// Spawn cell named in the request.
        spawn: CellCoord,
        /// Reason the request failed.
        reason: SpawnError,
    },
    /// Confirms that a unit received a goal and a way.
    RouteAssigned {
        /// Identifier of the routed unit.
        unit: UnitId,
        /// Goal assigned to the unit.
        goal: CellCoord,
        /// Number of waypoints in the assigned way.
        waypoints: usize,
    },
    /// Reports that a route assignment was refused.
    RouteRejected {
        /// Identifier named in the request.
        unit: UnitId,
        /// Reason the request failed.
        reason: RouteError,
    },
    /// Confirms that a unit moved or turned.
    UnitMoved {
        /// Identifier of the unit.
        unit: UnitId,
        /// Position after the update.
        position: DVec2,
        /// Heading after the update, in degrees.
        heading: f64,
    },
    /// Confirms that a unit reached its goal and left the simulation.
    UnitArrived {
        /// Identifier of the retired unit.
        unit: UnitId,
        /// Goal the unit reached.
        goal: CellCoord,
    },
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SpawnError {
    /// The live population already reached the configured cap.
    #[error("population cap reached")]
    PopulationCapReached,
    /// The requested cell is missing or is not a spawn cell.
    #[error("cell is not a spawn cell")]
    NotASpawnCell,
}

/// Reasons a route assignment may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RouteError {
    /// No live unit carries the provided identifier.
    #[error("unit does not exist")]
    MissingUnit,
    /// The goal lies outside the grid.
    #[error("goal lies outside the grid")]
    OutOfBounds,
    /// The way does not terminate at the goal.
    #[error("way does not end at the goal")]
    DetachedWay,
}

/// Kind of terrain a cell represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// Open ground that units may cross.
    #[default]
    Terrain,
    /// Impassable cell without joints.
    Obstacle,
    /// Cell where new units appear.
    Spawn,
    /// Cell units travel towards.
    Goal,
}

impl CellKind {
    /// Every kind ordered by its persisted code.
    pub const ALL: [CellKind; 4] = [
        CellKind::Terrain,
        CellKind::Obstacle,
        CellKind::Spawn,
        CellKind::Goal,
    ];

    /// Integer code used by the persisted layout format.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Terrain => 0,
            Self::Obstacle => 1,
            Self::Spawn => 2,
            Self::Goal => 3,
        }
    }

    /// Resolves a persisted integer code, returning `None` for unknown codes.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Terrain),
            1 => Some(Self::Obstacle),
            2 => Some(Self::Spawn),
            3 => Some(Self::Goal),
            _ => None,
        }
    }

    /// Reports whether units can stand on the cell.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Obstacle)
    }
}

/// Joint directions connecting a cell to its eight neighbours.
///
/// The declaration order is significant: path search relaxes joints in this
/// order and every odd position is a diagonal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards decreasing row indices.
    North,
    /// Up and to the right.
    NorthEast,
    /// Towards increasing column indices.
    East,
    /// Down and to the right.
    SouthEast,
    /// Towards increasing row indices.
    South,
    /// Down and to the left.
    SouthWest,
    /// Towards decreasing column indices.
    West,
    /// Up and to the left.
    NorthWest,
}

impl Direction {
    /// Every direction in joint order.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Position of the direction within [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::NorthEast => 1,
            Self::East => 2,
            Self::SouthEast => 3,
            Self::South => 4,
            Self::SouthWest => 5,
            Self::West => 6,
            Self::NorthWest => 7,
        }
    }

    /// Column and row delta travelled when following the direction.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Reports whether the direction crosses a cell corner.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        self.index() % 2 == 1
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::ALL[(self.index() + 4) % 8]
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell reached by following `direction`, bounded by the grid dimensions.
    #[must_use]
    pub fn step(self, direction: Direction, width: u32, height: u32) -> Option<CellCoord> {
        let (dx, dy) = direction.offset();
        let column = i64::from(self.column) + dx;
        let row = i64::from(self.row) + dy;
        if column < 0 || row < 0 || column >= i64::from(width) || row >= i64::from(height) {
            return None;
        }
        Some(CellCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Non-default cell kind recorded for a single coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellOverride {
    /// Coordinate of the overridden cell.
    pub cell: CellCoord,
    /// Kind applied to the cell.
    pub kind: CellKind,
}

impl CellOverride {
    /// Creates a new override.
    #[must_use]
    pub const fn new(cell: CellCoord, kind: CellKind) -> Self {
        Self { cell, kind }
    }
}

/// Fixed physical characteristics shared by every spawned unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitProfile {
    /// Body radius in world units, used for presentation.
    pub radius: f64,
    /// Forward speed in world units per second.
    pub move_speed: f64,
    /// Turning speed in degrees per second.
    pub rotate_speed: f64,
}

impl UnitProfile {
    /// Creates a profile from explicit values.
    #[must_use]
    pub const fn new(radius: f64, move_speed: f64, rotate_speed: f64) -> Self {
        Self {
            radius,
            move_speed,
            rotate_speed,
        }
    }
}

impl Default for UnitProfile {
    fn default() -> Self {
        Self::new(0.5, 5.0, 90.0)
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Continuous position in world units.
    pub position: DVec2,
    /// Heading in degrees within `[0, 360)`.
    pub heading: f64,
    /// Physical characteristics of the unit.
    pub profile: UnitProfile,
    /// Goal currently assigned to the unit, if any.
    pub goal: Option<CellCoord>,
    /// Remaining waypoints, front first.
    pub way: Vec<CellCoord>,
}

/// Read-only snapshot describing all live units.
#[derive(Clone, Debug, Default)]
pub struct UnitView {
    snapshots: Vec<UnitSnapshot>,
}

impl UnitView {
    /// Creates a new unit view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured unit snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Number of units captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, CellKind, CellOverride, Direction, SpawnError};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn cell_kind_codes_are_stable() {
        for kind in CellKind::ALL {
            assert_eq!(CellKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(CellKind::from_code(4), None);
        assert_eq!(CellKind::default(), CellKind::Terrain);
    }

    #[test]
    fn diagonals_sit_on_odd_positions() {
        for (position, direction) in Direction::ALL.iter().enumerate() {
            assert_eq!(direction.index(), position);
            let (dx, dy) = direction.offset();
            assert_eq!(direction.is_diagonal(), dx != 0 && dy != 0);
            let (ox, oy) = direction.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn step_respects_grid_bounds() {
        let corner = CellCoord::new(0, 0);
        assert_eq!(corner.step(Direction::North, 3, 3), None);
        assert_eq!(corner.step(Direction::West, 3, 3), None);
        assert_eq!(
            corner.step(Direction::SouthEast, 3, 3),
            Some(CellCoord::new(1, 1))
        );
        assert_eq!(CellCoord::new(2, 1).step(Direction::East, 3, 3), None);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_override_round_trips_through_bincode() {
        assert_round_trip(&CellOverride::new(CellCoord::new(5, 7), CellKind::Goal));
    }

    #[test]
    fn spawn_error_round_trips_through_bincode() {
        assert_round_trip(&SpawnError::PopulationCapReached);
    }
}
