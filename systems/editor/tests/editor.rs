use gridwalk_core::{CellCoord, CellKind, Command, Event};
use gridwalk_system_editor::{Editor, EditorInput};
use gridwalk_world::{self as world, query, World};

fn paint_at(cell: CellCoord) -> EditorInput {
    EditorInput {
        cursor_cell: Some(cell),
        paint: true,
        ..EditorInput::default()
    }
}

#[test]
fn painting_terrain_emits_obstacle_command() {
    let mut editor = Editor::default();
    let mut commands = Vec::new();

    editor.handle(
        paint_at(CellCoord::new(2, 3)),
        |_| Some(CellKind::Terrain),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::SetCellKind {
            cell: CellCoord::new(2, 3),
            kind: CellKind::Obstacle,
        }]
    );
}

#[test]
fn painting_the_same_kind_is_silent() {
    let mut editor = Editor::default();
    let mut commands = Vec::new();

    editor.handle(
        paint_at(CellCoord::new(0, 0)),
        |_| Some(CellKind::Obstacle),
        &mut commands,
    );
    editor.handle(paint_at(CellCoord::new(99, 99)), |_| None, &mut commands);

    assert!(commands.is_empty());
}

#[test]
fn erase_resets_to_terrain() {
    let mut editor = Editor::default();
    let mut commands = Vec::new();

    editor.handle(
        EditorInput {
            erase: true,
            ..paint_at(CellCoord::new(1, 1))
        },
        |_| Some(CellKind::Goal),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::SetCellKind {
            cell: CellCoord::new(1, 1),
            kind: CellKind::Terrain,
        }]
    );
}

#[test]
fn cycling_changes_the_painted_kind() {
    let mut editor = Editor::default();
    let mut commands = Vec::new();

    editor.handle(
        EditorInput {
            cycle_brush: true,
            ..paint_at(CellCoord::new(4, 0))
        },
        |_| Some(CellKind::Terrain),
        &mut commands,
    );

    assert_eq!(editor.brush(), CellKind::Spawn);
    assert_eq!(
        commands,
        vec![Command::SetCellKind {
            cell: CellCoord::new(4, 0),
            kind: CellKind::Spawn,
        }]
    );
}

#[test]
fn hovering_without_painting_emits_nothing() {
    let mut editor = Editor::default();
    let mut commands = Vec::new();

    editor.handle(
        EditorInput::new(Some(CellCoord::new(1, 0)), false, false, false),
        |_| Some(CellKind::Terrain),
        &mut commands,
    );

    assert!(commands.is_empty());
}

#[test]
fn edits_flow_through_the_world() {
    let mut world = World::with_config(world::Config::new(4, 4));
    let mut editor = Editor::default();
    let mut commands = Vec::new();
    let cell = CellCoord::new(2, 2);

    editor.handle(
        paint_at(cell),
        |candidate| query::cell_kind(&world, candidate),
        &mut commands,
    );

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    assert_eq!(query::cell_kind(&world, cell), Some(CellKind::Obstacle));
    assert!(events.contains(&Event::RoutesInvalidated));
}
