//! Dense cell table with eight-way joints and traversal costs.

use std::f64::consts::SQRT_2;

use glam::DVec2;
use gridwalk_core::{CellCoord, CellKind, CellOverride, Direction};

/// Side length of a single cell measured in world units.
pub const CELL_SIZE: f64 = 1.0;

/// Base cost of entering a cell through an orthogonal joint.
pub const ORTHOGONAL_COST: f64 = 1.0;

/// Base cost of entering a cell through a diagonal joint.
pub const DIAGONAL_COST: f64 = SQRT_2;

/// Multiplier applied to cells that lack at least one joint.
pub const EDGE_PENALTY: f64 = 1.7;

/// Single grid cell together with its derived connectivity and costs.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    coord: CellCoord,
    kind: CellKind,
    joints: [Option<usize>; 8],
    cost: f64,
    dcost: f64,
}

impl Cell {
    fn new(coord: CellCoord) -> Self {
        Self {
            coord,
            kind: CellKind::Terrain,
            joints: [None; 8],
            cost: ORTHOGONAL_COST,
            dcost: DIAGONAL_COST,
        }
    }

    /// Coordinate identifying the cell.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Kind currently assigned to the cell.
    #[must_use]
    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    /// Grid index of the neighbour linked in `direction`, if any.
    #[must_use]
    pub const fn joint(&self, direction: Direction) -> Option<usize> {
        self.joints[direction.index()]
    }

    /// Cost of entering this cell orthogonally.
    #[must_use]
    pub const fn cost(&self) -> f64 {
        self.cost
    }

    /// Cost of entering this cell diagonally.
    #[must_use]
    pub const fn dcost(&self) -> f64 {
        self.dcost
    }

    /// Cost of entering this cell when arriving along `direction`.
    #[must_use]
    pub const fn entry_cost(&self, direction: Direction) -> f64 {
        if direction.is_diagonal() {
            self.dcost
        } else {
            self.cost
        }
    }

    /// Reports whether any of the eight joints is missing.
    #[must_use]
    pub fn is_hemmed(&self) -> bool {
        self.joints.iter().any(Option::is_none)
    }
}

/// Authoritative cell table.
///
/// Joints and costs are caches derived from cell kinds. Every mutation through
/// [`Grid::set_kind`] must be followed by [`Grid::rebuild`] before the grid is
/// searched again.
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    spawns: Vec<CellCoord>,
    goals: Vec<CellCoord>,
}

impl Grid {
    /// Builds an all-terrain grid with connectivity and costs computed.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut cells = Vec::new();
        for row in 0..height {
            for column in 0..width {
                cells.push(Cell::new(CellCoord::new(column, row)));
            }
        }

        let mut grid = Self {
            width,
            height,
            cells,
            spawns: Vec::new(),
            goals: Vec::new(),
        };
        grid.rebuild();
        grid
    }

    /// Builds a grid and applies the in-bounds overrides in one pass.
    #[must_use]
    pub fn with_overrides(width: u32, height: u32, overrides: &[CellOverride]) -> Self {
        let mut grid = Self::new(width, height);
        for entry in overrides {
            let _ = grid.set_kind(entry.cell, entry.kind);
        }
        grid.rebuild();
        grid
    }

    /// Number of cell columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cell rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Every cell in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row-major index of the cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Cell stored at `coord`.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.index(coord).and_then(|index| self.cells.get(index))
    }

    /// Kind stored at `coord`.
    #[must_use]
    pub fn kind(&self, coord: CellCoord) -> Option<CellKind> {
        self.cell(coord).map(Cell::kind)
    }

    /// Coordinate of the neighbour joined to `coord` in `direction`.
    #[must_use]
    pub fn joint(&self, coord: CellCoord, direction: Direction) -> Option<CellCoord> {
        let target = self.cell(coord)?.joint(direction)?;
        self.cells.get(target).map(Cell::coord)
    }

    /// Iterates over the joints of `coord` in [`Direction::ALL`] order.
    pub fn joints(&self, coord: CellCoord) -> impl Iterator<Item = (Direction, CellCoord)> + '_ {
        let cell = self.cell(coord);
        Direction::ALL.into_iter().filter_map(move |direction| {
            let target = cell?.joint(direction)?;
            self.cells
                .get(target)
                .map(|neighbor| (direction, neighbor.coord()))
        })
    }

    /// Resolves the cell containing the continuous point `(x, y)`.
    #[must_use]
    pub fn lookup(&self, x: f64, y: f64) -> Option<CellCoord> {
        let column = (x / CELL_SIZE).floor();
        let row = (y / CELL_SIZE).floor();
        if !(column >= 0.0 && row >= 0.0) {
            return None;
        }
        if column >= f64::from(self.width) || row >= f64::from(self.height) {
            return None;
        }
        Some(CellCoord::new(column as u32, row as u32))
    }

    /// Resolves the cell containing `point`.
    #[must_use]
    pub fn lookup_point(&self, point: DVec2) -> Option<CellCoord> {
        self.lookup(point.x, point.y)
    }

    /// Centre of `coord` in world units.
    #[must_use]
    pub fn center(coord: CellCoord) -> DVec2 {
        DVec2::new(
            f64::from(coord.column()) * CELL_SIZE + CELL_SIZE / 2.0,
            f64::from(coord.row()) * CELL_SIZE + CELL_SIZE / 2.0,
        )
    }

    /// Top-left corner of `coord` in world units.
    #[must_use]
    pub fn origin(coord: CellCoord) -> DVec2 {
        DVec2::new(
            f64::from(coord.column()) * CELL_SIZE,
            f64::from(coord.row()) * CELL_SIZE,
        )
    }

    /// Spawn cells in table order, as of the last rebuild.
    #[must_use]
    pub fn spawns(&self) -> &[CellCoord] {
        &self.spawns
    }

    /// Goal cells in table order, as of the last rebuild.
    #[must_use]
    pub fn goals(&self) -> &[CellCoord] {
        &self.goals
    }

    /// Every cell whose kind differs from terrain.
    #[must_use]
    pub fn overrides(&self) -> Vec<CellOverride> {
        self.cells
            .iter()
            .filter(|cell| cell.kind != CellKind::Terrain)
            .map(|cell| CellOverride::new(cell.coord, cell.kind))
            .collect()
    }

    /// Changes the kind of a single cell, reporting whether anything changed.
    ///
    /// Joints, costs, and the spawn/goal lists are left stale until
    /// [`Grid::rebuild`] runs.
    pub fn set_kind(&mut self, coord: CellCoord, kind: CellKind) -> bool {
        let Some(index) = self.index(coord) else {
            return false;
        };
        let cell = &mut self.cells[index];
        if cell.kind == kind {
            return false;
        }
        cell.kind = kind;
        true
    }

    /// Recomputes joints, then costs and the spawn/goal lists.
    pub fn rebuild(&mut self) {
        self.recompute_connectivity();
        self.recompute_costs();
    }

    /// Links every non-obstacle cell to its in-bounds, non-obstacle neighbours.
    pub fn recompute_connectivity(&mut self) {
        for index in 0..self.cells.len() {
            let mut joints = [None; 8];
            if self.cells[index].kind.is_passable() {
                let coord = self.cells[index].coord;
                for direction in Direction::ALL {
                    let Some(neighbor) = coord.step(direction, self.width, self.height) else {
                        continue;
                    };
                    let Some(neighbor_index) = self.index(neighbor) else {
                        continue;
                    };
                    if self.cells[neighbor_index].kind.is_passable() {
                        joints[direction.index()] = Some(neighbor_index);
                    }
                }
            }
            self.cells[index].joints = joints;
        }
    }

    /// Resets costs, penalises hemmed cells, and rebuilds the spawn/goal lists.
    pub fn recompute_costs(&mut self) {
        self.spawns.clear();
        self.goals.clear();

        for cell in &mut self.cells {
            match cell.kind {
                CellKind::Spawn => self.spawns.push(cell.coord),
                CellKind::Goal => self.goals.push(cell.coord),
                CellKind::Terrain | CellKind::Obstacle => {}
            }

            cell.cost = ORTHOGONAL_COST;
            cell.dcost = DIAGONAL_COST;
            if cell.kind.is_passable() && cell.is_hemmed() {
                cell.cost *= EDGE_PENALTY;
                cell.dcost *= EDGE_PENALTY;
            }
        }
    }
}
