#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure editing system that turns pointer input into cell kind commands.

use gridwalk_core::{CellCoord, CellKind, Command};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EditorInput {
    /// Cell currently under the cursor, if the cursor is over the grid.
    pub cursor_cell: Option<CellCoord>,
    /// Indicates whether the player is painting on this frame.
    pub paint: bool,
    /// Indicates whether painting should reset cells to terrain instead.
    pub erase: bool,
    /// Indicates whether the player asked for the next brush on this frame.
    pub cycle_brush: bool,
}

impl EditorInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(
        cursor_cell: Option<CellCoord>,
        paint: bool,
        erase: bool,
        cycle_brush: bool,
    ) -> Self {
        Self {
            cursor_cell,
            paint,
            erase,
            cycle_brush,
        }
    }
}

/// Editing system holding the brush used for painting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Editor {
    brush: CellKind,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// Creates an editor painting obstacles.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            brush: CellKind::Obstacle,
        }
    }

    /// Kind painted by the next non-erasing stroke.
    #[must_use]
    pub const fn brush(&self) -> CellKind {
        self.brush
    }

    /// Consumes adapter input and emits edit commands.
    ///
    /// `kind_at` should mirror the world's `query::cell_kind` so strokes over
    /// cells that already hold the painted kind emit nothing.
    pub fn handle<F>(&mut self, input: EditorInput, mut kind_at: F, out: &mut Vec<Command>)
    where
        F: FnMut(CellCoord) -> Option<CellKind>,
    {
        if input.cycle_brush {
            self.brush = next_brush(self.brush);
        }

        if !input.paint {
            return;
        }
        let Some(cell) = input.cursor_cell else {
            return;
        };
        let kind = if input.erase {
            CellKind::Terrain
        } else {
            self.brush
        };

        match kind_at(cell) {
            Some(current) if current != kind => out.push(Command::SetCellKind { cell, kind }),
            _ => {}
        }
    }
}

const fn next_brush(brush: CellKind) -> CellKind {
    match brush {
        CellKind::Obstacle => CellKind::Spawn,
        CellKind::Spawn => CellKind::Goal,
        CellKind::Goal | CellKind::Terrain => CellKind::Obstacle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_cycle_visits_every_paintable_kind() {
        let mut brush = CellKind::Obstacle;
        let mut seen = Vec::new();
        for _ in 0..3 {
            brush = next_brush(brush);
            seen.push(brush);
        }
        assert_eq!(
            seen,
            vec![CellKind::Spawn, CellKind::Goal, CellKind::Obstacle]
        );
    }
}
