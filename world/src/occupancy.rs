use serpents_core::{Cell, Grid};

/// What fills a playfield cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Occupant {
    /// Nothing; the snake or food may enter.
    Empty,
    /// Part of the snake's body.
    Snake,
    /// A maze wall.
    Wall,
}

/// Dense per-cell occupancy shared by collision checks and food placement.
#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    cells: Vec<Occupant>,
}

impl OccupancyGrid {
    pub(crate) fn new() -> Self {
        Self {
            cells: vec![Occupant::Empty; Grid::CELL_COUNT],
        }
    }

    /// Cells off the playfield read as walls.
    pub(crate) fn occupant(&self, cell: Cell) -> Occupant {
        Grid::index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(Occupant::Wall)
    }

    pub(crate) fn is_free(&self, cell: Cell) -> bool {
        self.occupant(cell) == Occupant::Empty
    }

    pub(crate) fn set(&mut self, cell: Cell, occupant: Occupant) {
        if let Some(slot) = Grid::index(cell).and_then(|index| self.cells.get_mut(index)) {
            *slot = occupant;
        }
    }
}
