use serpents_core::{Cell, Grid, Mode};

use crate::MazeLayout;

/// Boundary and obstacle policy for a round, chosen once when the round is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeRules {
    /// Edges wrap, no obstacles, untimed.
    Classic,
    /// Edges are lethal, no obstacles, untimed.
    Boxed,
    /// Edges are lethal and the layout's walls are obstacles.
    Maze(MazeLayout),
    /// Edges wrap, no obstacles, the round lasts two minutes.
    TimeAttack,
}

/// Result of applying a boundary policy to a candidate head.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryResolution {
    /// The head lands on this playfield cell.
    Head(Cell),
    /// The head left the playfield under a lethal policy.
    Died,
}

impl ModeRules {
    /// Rules for `mode`; `layout` is only consulted for Maze.
    #[must_use]
    pub const fn for_mode(mode: Mode, layout: MazeLayout) -> Self {
        match mode {
            Mode::Classic => ModeRules::Classic,
            Mode::Boxed => ModeRules::Boxed,
            Mode::Maze => ModeRules::Maze(layout),
            Mode::TimeAttack => ModeRules::TimeAttack,
        }
    }

    /// Mode tag the rules implement.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        match self {
            ModeRules::Classic => Mode::Classic,
            ModeRules::Boxed => Mode::Boxed,
            ModeRules::Maze(_) => Mode::Maze,
            ModeRules::TimeAttack => Mode::TimeAttack,
        }
    }

    /// Applies the boundary policy to a head computed one step ahead.
    #[must_use]
    pub const fn resolve_boundary(&self, next_head: Cell) -> BoundaryResolution {
        match self {
            ModeRules::Classic | ModeRules::TimeAttack => {
                BoundaryResolution::Head(Grid::wrap(next_head))
            }
            ModeRules::Boxed | ModeRules::Maze(_) => {
                if Grid::in_bounds(next_head) {
                    BoundaryResolution::Head(next_head)
                } else {
                    BoundaryResolution::Died
                }
            }
        }
    }

    /// Cells the snake dies on.
    #[must_use]
    pub const fn obstacle_cells(&self) -> &'static [Cell] {
        match self {
            ModeRules::Maze(layout) => layout.walls(),
            ModeRules::Classic | ModeRules::Boxed | ModeRules::TimeAttack => &[],
        }
    }

    /// Whether the round ends on a clock.
    #[must_use]
    pub const fn is_timed(&self) -> bool {
        matches!(self, ModeRules::TimeAttack)
    }

    /// Maze layout in play, if any.
    #[must_use]
    pub const fn layout(&self) -> Option<MazeLayout> {
        match self {
            ModeRules::Maze(layout) => Some(*layout),
            ModeRules::Classic | ModeRules::Boxed | ModeRules::TimeAttack => None,
        }
    }
}
