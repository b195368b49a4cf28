use std::collections::VecDeque;

use serpents_core::{Cell, Direction};

use crate::occupancy::{Occupant, OccupancyGrid};

/// Ordered snake body with its heading and buffered turn.
#[derive(Clone, Debug)]
pub struct Snake {
    head: Cell,
    trailing: VecDeque<Cell>,
    heading: Direction,
    pending: Option<Direction>,
}

impl Snake {
    pub(crate) fn new(head: Cell, trailing: VecDeque<Cell>, heading: Direction) -> Self {
        Self {
            head,
            trailing,
            heading,
            pending: None,
        }
    }

    /// Cell occupied by the head.
    #[must_use]
    pub const fn head(&self) -> Cell {
        self.head
    }

    /// Last cell of the body; the head itself for a one-cell snake.
    #[must_use]
    pub fn tail(&self) -> Cell {
        self.trailing.back().copied().unwrap_or(self.head)
    }

    /// Direction of the last step taken.
    #[must_use]
    pub const fn heading(&self) -> Direction {
        self.heading
    }

    /// Number of cells in the body; never zero since the head is stored apart.
    #[allow(clippy::len_without_is_empty)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.trailing.len() + 1
    }

    /// Body cells from head to tail.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        std::iter::once(self.head).chain(self.trailing.iter().copied())
    }

    /// Buffers a turn for the next step. Later calls overwrite earlier ones.
    pub(crate) fn buffer(&mut self, direction: Direction) {
        self.pending = Some(direction);
    }

    /// Consumes the buffered turn and returns the heading for this step.
    ///
    /// A turn onto the exact opposite heading is dropped.
    pub(crate) fn latch_heading(&mut self) -> Direction {
        if let Some(candidate) = self.pending.take() {
            if candidate != self.heading.opposite() {
                self.heading = candidate;
            }
        }
        self.heading
    }

    /// Moves the head onto `next_head`, dropping the tail unless the snake grew.
    ///
    /// Returns `true` when `next_head` hits the body. The cell vacated by the
    /// tail during this same step does not count. The body is left untouched
    /// on collision.
    pub(crate) fn step(&mut self, next_head: Cell, grew: bool, occupancy: &mut OccupancyGrid) -> bool {
        let chasing_tail = !grew && next_head == self.tail();
        if occupancy.occupant(next_head) == Occupant::Snake && !chasing_tail {
            return true;
        }

        self.trailing.push_front(self.head);
        self.head = next_head;
        if !grew {
            if let Some(vacated) = self.trailing.pop_back() {
                occupancy.set(vacated, Occupant::Empty);
            }
        }
        occupancy.set(next_head, Occupant::Snake);
        false
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::Snake;
    use crate::occupancy::{Occupant, OccupancyGrid};
    use serpents_core::{Cell, Direction};

    fn snake_on(grid: &mut OccupancyGrid, cells: &[Cell], heading: Direction) -> Snake {
        for cell in cells {
            grid.set(*cell, Occupant::Snake);
        }
        let trailing: VecDeque<Cell> = cells[1..].iter().copied().collect();
        Snake::new(cells[0], trailing, heading)
    }

    #[test]
    fn last_buffered_turn_wins() {
        let mut grid = OccupancyGrid::new();
        let mut snake = snake_on(&mut grid, &[Cell::new(5, 5), Cell::new(4, 5)], Direction::Right);

        snake.buffer(Direction::Up);
        snake.buffer(Direction::Down);

        assert_eq!(snake.latch_heading(), Direction::Down);
        assert_eq!(snake.latch_heading(), Direction::Down, "buffer is consumed");
    }

    #[test]
    fn reversal_is_ignored() {
        let mut grid = OccupancyGrid::new();
        let mut snake = snake_on(&mut grid, &[Cell::new(5, 5), Cell::new(4, 5)], Direction::Right);

        snake.buffer(Direction::Left);

        assert_eq!(snake.latch_heading(), Direction::Right);
    }

    #[test]
    fn step_keeps_length_unless_growing() {
        let mut grid = OccupancyGrid::new();
        let cells = [Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)];
        let mut snake = snake_on(&mut grid, &cells, Direction::Right);

        assert!(!snake.step(Cell::new(6, 5), false, &mut grid));
        assert_eq!(snake.len(), 3);
        assert!(grid.is_free(Cell::new(3, 5)));

        assert!(!snake.step(Cell::new(7, 5), true, &mut grid));
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.tail(), Cell::new(4, 5));
    }

    #[test]
    fn entering_the_vacating_tail_is_not_a_collision() {
        let mut grid = OccupancyGrid::new();
        let cells = [
            Cell::new(5, 5),
            Cell::new(6, 5),
            Cell::new(6, 6),
            Cell::new(5, 6),
        ];
        let mut snake = snake_on(&mut grid, &cells, Direction::Left);

        assert!(!snake.step(Cell::new(5, 6), false, &mut grid));
        assert_eq!(snake.head(), Cell::new(5, 6));
        assert_eq!(grid.occupant(Cell::new(5, 6)), Occupant::Snake);
        assert_eq!(snake.len(), 4);
    }

    #[test]
    fn entering_the_tail_while_growing_collides() {
        let mut grid = OccupancyGrid::new();
        let cells = [
            Cell::new(5, 5),
            Cell::new(6, 5),
            Cell::new(6, 6),
            Cell::new(5, 6),
        ];
        let mut snake = snake_on(&mut grid, &cells, Direction::Left);

        assert!(snake.step(Cell::new(5, 6), true, &mut grid));
        assert_eq!(snake.head(), Cell::new(5, 5), "body untouched on collision");
    }
}
