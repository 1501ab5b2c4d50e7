use std::time::Duration;

use gridwalk_core::{CellCoord, CellKind, Command, Event};
use gridwalk_system_spawning::{Config, Spawning};
use gridwalk_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn tick() -> Vec<Event> {
    vec![Event::TimeAdvanced {
        dt: Duration::from_millis(25),
    }]
}

fn spawn_commands(
    spawning: &mut Spawning,
    events: &[Event],
    population: usize,
    spawners: &[CellCoord],
) -> Vec<Command> {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let mut commands = Vec::new();
    spawning.handle(events, population, spawners, &mut rng, &mut commands);
    commands
}

#[test]
fn fills_every_vacancy_in_one_tick() {
    let spawners = [CellCoord::new(0, 0), CellCoord::new(3, 2)];
    let mut spawning = Spawning::new(Config::new(5));

    let commands = spawn_commands(&mut spawning, &tick(), 2, &spawners);

    assert_eq!(commands.len(), 3);
    for command in &commands {
        match command {
            Command::SpawnUnit { spawn, heading } => {
                assert!(spawners.contains(spawn));
                assert!((0.0..360.0).contains(heading));
            }
            other => panic!("unexpected command emitted: {other:?}"),
        }
    }
}

#[test]
fn full_population_spawns_nothing() {
    let spawners = [CellCoord::new(1, 1)];
    let mut spawning = Spawning::new(Config::new(4));

    assert!(spawn_commands(&mut spawning, &tick(), 4, &spawners).is_empty());
    assert!(spawn_commands(&mut spawning, &tick(), 9, &spawners).is_empty());
}

#[test]
fn requires_spawners_and_elapsed_time() {
    let mut spawning = Spawning::new(Config::new(4));

    assert!(spawn_commands(&mut spawning, &tick(), 0, &[]).is_empty());
    assert!(spawn_commands(&mut spawning, &[], 0, &[CellCoord::new(0, 0)]).is_empty());
    let idle = [Event::TimeAdvanced { dt: Duration::ZERO }];
    assert!(spawn_commands(&mut spawning, &idle, 0, &[CellCoord::new(0, 0)]).is_empty());
}

#[test]
fn world_population_stays_within_cap() {
    let mut world = World::with_config(world::Config::new(6, 4).with_population_cap(3));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SetCellKind {
            cell: CellCoord::new(1, 1),
            kind: CellKind::Spawn,
        },
        &mut events,
    );

    let mut spawning = Spawning::new(Config::new(query::population_cap(&world)));
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..5 {
        let mut commands = Vec::new();
        spawning.handle(
            &tick(),
            query::population(&world),
            query::spawn_cells(&world),
            &mut rng,
            &mut commands,
        );
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        assert!(query::population(&world) <= 3);
    }

    assert_eq!(query::population(&world), 3);
}
