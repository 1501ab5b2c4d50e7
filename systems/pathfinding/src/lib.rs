#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Priority-ordered way search over the world's joint graph.
//!
//! The search pops the open cell with the lowest priority, where priority is
//! the cumulative entry cost at the time the cell was queued plus its
//! Manhattan distance to the goal. Ties pop in queueing order.
//!
//! A cell is queued exactly once, when it is first discovered. Later, cheaper
//! discoveries rewrite its recorded cost and predecessor but never requeue it,
//! so a queued cell keeps its original priority. Together with the Manhattan
//! estimate, which can exceed the true diagonal cost, this means the returned
//! way is valid but not guaranteed to be the cheapest one.

use std::{cmp::Ordering, collections::BinaryHeap};

use gridwalk_core::{CellCoord, Direction};
use gridwalk_world::Grid;

/// Searches for a way from `start` to `goal`.
///
/// Returns the cells from `start` to `goal`, both inclusive. An empty vector
/// means there is no goal, the endpoints lie outside the grid or coincide, or
/// the goal cannot be reached through the grid's joints.
#[must_use]
pub fn find_path(grid: &Grid, start: Option<CellCoord>, goal: Option<CellCoord>) -> Vec<CellCoord> {
    let (Some(start), Some(goal)) = (start, goal) else {
        return Vec::new();
    };
    let (Some(start_index), Some(goal_index)) = (grid.index(start), grid.index(goal)) else {
        return Vec::new();
    };
    if start_index == goal_index {
        return Vec::new();
    }

    let cell_count = grid.cells().len();
    let mut costs: Vec<Option<f64>> = vec![None; cell_count];
    let mut previous: Vec<Option<usize>> = vec![None; cell_count];
    let mut open = OpenSet::default();

    costs[start_index] = Some(0.0);
    open.push(start_index, priority(0.0, start, goal));

    let mut reached = false;
    while let Some(index) = open.pop() {
        if index == goal_index {
            reached = true;
            break;
        }

        let Some(cost) = costs[index] else {
            continue;
        };
        let cell = &grid.cells()[index];

        for direction in Direction::ALL {
            let Some(neighbor_index) = cell.joint(direction) else {
                continue;
            };
            let neighbor = &grid.cells()[neighbor_index];
            let neighbor_cost = cost + neighbor.entry_cost(direction);

            match costs[neighbor_index] {
                Some(recorded) => {
                    if recorded > neighbor_cost {
                        costs[neighbor_index] = Some(neighbor_cost);
                        previous[neighbor_index] = Some(index);
                    }
                }
                None => {
                    costs[neighbor_index] = Some(neighbor_cost);
                    previous[neighbor_index] = Some(index);
                    open.push(neighbor_index, priority(neighbor_cost, neighbor.coord(), goal));
                }
            }
        }
    }

    if !reached {
        return Vec::new();
    }

    let mut way = Vec::new();
    let mut cursor = Some(goal_index);
    while let Some(index) = cursor {
        way.push(grid.cells()[index].coord());
        cursor = previous[index];
    }
    way.reverse();
    way
}

fn priority(cost: f64, cell: CellCoord, goal: CellCoord) -> f64 {
    cost + f64::from(cell.manhattan_distance(goal))
}

/// Min-priority queue that pops equal priorities in insertion order.
#[derive(Debug, Default)]
struct OpenSet {
    heap: BinaryHeap<OpenEntry>,
    sequence: u64,
}

impl OpenSet {
    fn push(&mut self, index: usize, priority: f64) {
        self.heap.push(OpenEntry {
            index,
            priority,
            sequence: self.sequence,
        });
        self.sequence += 1;
    }

    fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|entry| entry.index)
    }
}

#[derive(Debug)]
struct OpenEntry {
    index: usize,
    priority: f64,
    sequence: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap yields the lowest priority, oldest first.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
