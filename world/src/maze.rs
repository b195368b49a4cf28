use serpents_core::Cell;

/// Named, immutable set of wall cells placed by Maze rounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MazeLayout {
    name: &'static str,
    walls: &'static [Cell],
}

impl MazeLayout {
    /// Central cross with flanking blocks.
    pub const CROSS: MazeLayout = MazeLayout::new("cross", &CROSS_WALLS);
    /// Two-by-two blocks in each corner.
    pub const CORNERS: MazeLayout = MazeLayout::new("corners", &CORNERS_WALLS);
    /// Two horizontal bars with a gap in the middle.
    pub const RAILS: MazeLayout = MazeLayout::new("rails", &RAILS_WALLS);
    /// Two vertical bars split around the middle row.
    pub const PILLARS: MazeLayout = MazeLayout::new("pillars", &PILLARS_WALLS);
    /// Scattered single cells.
    pub const SCATTER: MazeLayout = MazeLayout::new("scatter", &SCATTER_WALLS);

    /// Every registered layout in rotation order.
    pub const ALL: [MazeLayout; 5] = [
        Self::CROSS,
        Self::CORNERS,
        Self::RAILS,
        Self::PILLARS,
        Self::SCATTER,
    ];

    const fn new(name: &'static str, walls: &'static [Cell]) -> Self {
        Self { name, walls }
    }

    /// Layout at `index` in the rotation, wrapping past the end.
    #[must_use]
    pub const fn nth(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Looks a layout up by its registry name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layout| layout.name == name)
    }

    /// Registry name of the layout.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Wall cells placed by the layout.
    #[must_use]
    pub const fn walls(&self) -> &'static [Cell] {
        self.walls
    }
}

const fn cells<const N: usize>(pairs: [(i32, i32); N]) -> [Cell; N] {
    let mut out = [Cell::new(0, 0); N];
    let mut index = 0;
    while index < N {
        out[index] = Cell::new(pairs[index].0, pairs[index].1);
        index += 1;
    }
    out
}

const CROSS_WALLS: [Cell; 16] = cells([
    (7, 3),
    (8, 3),
    (7, 4),
    (8, 4),
    (7, 9),
    (8, 9),
    (7, 10),
    (8, 10),
    (3, 5),
    (4, 5),
    (3, 6),
    (4, 6),
    (11, 5),
    (12, 5),
    (11, 6),
    (12, 6),
]);

const CORNERS_WALLS: [Cell; 16] = cells([
    (2, 2),
    (3, 2),
    (2, 3),
    (3, 3),
    (12, 2),
    (13, 2),
    (12, 3),
    (13, 3),
    (2, 10),
    (3, 10),
    (2, 11),
    (3, 11),
    (12, 10),
    (13, 10),
    (12, 11),
    (13, 11),
]);

const RAILS_WALLS: [Cell; 20] = cells([
    (3, 4),
    (4, 4),
    (5, 4),
    (6, 4),
    (7, 4),
    (9, 4),
    (10, 4),
    (11, 4),
    (12, 4),
    (13, 4),
    (3, 9),
    (4, 9),
    (5, 9),
    (6, 9),
    (7, 9),
    (9, 9),
    (10, 9),
    (11, 9),
    (12, 9),
    (13, 9),
]);

const PILLARS_WALLS: [Cell; 16] = cells([
    (4, 2),
    (4, 3),
    (4, 4),
    (4, 5),
    (4, 8),
    (4, 9),
    (4, 10),
    (4, 11),
    (11, 2),
    (11, 3),
    (11, 4),
    (11, 5),
    (11, 8),
    (11, 9),
    (11, 10),
    (11, 11),
]);

const SCATTER_WALLS: [Cell; 12] = cells([
    (4, 3),
    (11, 3),
    (3, 6),
    (12, 6),
    (4, 10),
    (11, 10),
    (7, 5),
    (8, 5),
    (7, 8),
    (8, 8),
    (5, 9),
    (10, 4),
]);
