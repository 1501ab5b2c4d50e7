use gridwalk_core::{CellCoord, CellKind, CellOverride};
use gridwalk_system_pathfinding::find_path;
use gridwalk_world::Grid;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn assert_valid_way(grid: &Grid, way: &[CellCoord], start: CellCoord, goal: CellCoord) {
    assert_eq!(way.first(), Some(&start), "way must begin at the start");
    assert_eq!(way.last(), Some(&goal), "way must end at the goal");
    for pair in way.windows(2) {
        let linked = grid
            .joints(pair[0])
            .any(|(_, neighbor)| neighbor == pair[1]);
        assert!(linked, "{} is not joined to {}", pair[0], pair[1]);
    }
}

#[test]
fn routes_around_a_single_obstacle() {
    let start = CellCoord::new(0, 0);
    let goal = CellCoord::new(4, 4);
    let obstacle = CellCoord::new(2, 2);
    let grid = Grid::with_overrides(
        5,
        5,
        &[
            CellOverride::new(start, CellKind::Spawn),
            CellOverride::new(goal, CellKind::Goal),
            CellOverride::new(obstacle, CellKind::Obstacle),
        ],
    );

    let way = find_path(&grid, Some(start), Some(goal));

    assert!(!way.is_empty(), "goal should be reachable");
    assert_valid_way(&grid, &way, start, goal);
    assert!(!way.contains(&obstacle), "way crosses the obstacle");
}

#[test]
fn solid_wall_makes_goal_unreachable() {
    let wall: Vec<_> = (0..6)
        .map(|row| CellOverride::new(CellCoord::new(3, row), CellKind::Obstacle))
        .collect();
    let grid = Grid::with_overrides(7, 6, &wall);

    let way = find_path(&grid, Some(CellCoord::new(0, 2)), Some(CellCoord::new(6, 2)));

    assert!(way.is_empty());
}

#[test]
fn diagonal_gaps_between_obstacles_are_traversable() {
    let grid = Grid::with_overrides(
        3,
        3,
        &[
            CellOverride::new(CellCoord::new(1, 0), CellKind::Obstacle),
            CellOverride::new(CellCoord::new(0, 1), CellKind::Obstacle),
            CellOverride::new(CellCoord::new(2, 1), CellKind::Obstacle),
            CellOverride::new(CellCoord::new(1, 2), CellKind::Obstacle),
        ],
    );

    let start = CellCoord::new(0, 0);
    let goal = CellCoord::new(2, 2);
    let way = find_path(&grid, Some(start), Some(goal));

    assert_eq!(way, vec![start, CellCoord::new(1, 1), goal]);
}

#[test]
fn obstacle_goal_cannot_be_reached() {
    let goal = CellCoord::new(2, 0);
    let grid = Grid::with_overrides(3, 1, &[CellOverride::new(goal, CellKind::Obstacle)]);

    assert!(find_path(&grid, Some(CellCoord::new(0, 0)), Some(goal)).is_empty());
}

#[test]
fn random_grids_only_yield_valid_ways() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x9a7f_1e55);

    for _ in 0..40 {
        let width = rng.gen_range(2..16);
        let height = rng.gen_range(2..16);
        let mut overrides = Vec::new();
        for row in 0..height {
            for column in 0..width {
                if rng.gen_bool(0.3) {
                    overrides.push(CellOverride::new(
                        CellCoord::new(column, row),
                        CellKind::Obstacle,
                    ));
                }
            }
        }
        let grid = Grid::with_overrides(width, height, &overrides);

        let start = CellCoord::new(rng.gen_range(0..width), rng.gen_range(0..height));
        let goal = CellCoord::new(rng.gen_range(0..width), rng.gen_range(0..height));
        let way = find_path(&grid, Some(start), Some(goal));

        if way.is_empty() {
            continue;
        }
        assert_valid_way(&grid, &way, start, goal);
        assert!(way
            .iter()
            .all(|cell| grid.kind(*cell) != Some(CellKind::Obstacle)));
        let mut unique = way.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), way.len(), "way revisits a cell");
    }
}

#[test]
fn repeated_searches_agree() {
    let grid = Grid::with_overrides(
        12,
        9,
        &[
            CellOverride::new(CellCoord::new(5, 2), CellKind::Obstacle),
            CellOverride::new(CellCoord::new(5, 3), CellKind::Obstacle),
            CellOverride::new(CellCoord::new(5, 4), CellKind::Obstacle),
            CellOverride::new(CellCoord::new(6, 4), CellKind::Obstacle),
        ],
    );
    let start = Some(CellCoord::new(1, 3));
    let goal = Some(CellCoord::new(10, 5));

    let first = find_path(&grid, start, goal);
    let second = find_path(&grid, start, goal);

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn queued_cells_keep_their_first_priority() {
    // (1, 1) is found cheaper through (1, 2) after it was queued, but the
    // goal is popped before its stale entry, so the edge column wins.
    let grid = Grid::new(4, 4);

    let way = find_path(&grid, Some(CellCoord::new(0, 3)), Some(CellCoord::new(0, 0)));

    assert_eq!(
        way,
        vec![
            CellCoord::new(0, 3),
            CellCoord::new(0, 2),
            CellCoord::new(0, 1),
            CellCoord::new(0, 0),
        ]
    );
}

#[test]
fn first_discovery_order_decides_the_way_around_obstacles() {
    let grid = Grid::with_overrides(
        4,
        4,
        &[
            CellOverride::new(CellCoord::new(1, 0), CellKind::Obstacle),
            CellOverride::new(CellCoord::new(3, 0), CellKind::Obstacle),
            CellOverride::new(CellCoord::new(0, 3), CellKind::Obstacle),
        ],
    );

    let way = find_path(&grid, Some(CellCoord::new(0, 2)), Some(CellCoord::new(3, 3)));

    assert_eq!(
        way,
        vec![
            CellCoord::new(0, 2),
            CellCoord::new(1, 3),
            CellCoord::new(2, 3),
            CellCoord::new(3, 3),
        ]
    );
}

#[test]
fn coinciding_endpoints_yield_empty_way() {
    let cell = CellCoord::new(2, 1);
    let open = Grid::new(4, 3);
    let blocked = Grid::with_overrides(4, 3, &[CellOverride::new(cell, CellKind::Obstacle)]);

    assert!(find_path(&open, Some(cell), Some(cell)).is_empty());
    assert!(find_path(&blocked, Some(cell), Some(cell)).is_empty());
}
