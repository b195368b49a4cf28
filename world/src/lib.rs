#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round simulation for Serpents Per Second.
//!
//! A [`RoundState`] aggregates the snake, the food, the mode rules and the
//! scoring counters of one playthrough. The only mutation entry point is
//! [`RoundState::advance`], which consumes wall-clock time through a fixed
//! timestep accumulator so that logic runs at the speed curve's rate no
//! matter how fast frames arrive. Read-only access lives in [`query`].

mod food;
mod maze;
mod occupancy;
mod rules;
mod snake;

use std::{collections::VecDeque, time::Duration};

use serpents_core::{
    speed_curve, Cell, DeathCause, Direction, EndReason, Grid, SCORE_PER_FOOD, TIME_ATTACK_LIMIT,
};
use thiserror::Error;

use self::{food::Food, occupancy::OccupancyGrid};

pub use self::{
    food::NoSpaceAvailable,
    maze::MazeLayout,
    occupancy::Occupant,
    rules::{BoundaryResolution, ModeRules},
    snake::Snake,
};

const SPAWN_HEAD: Cell = Cell::new(3, 7);
const SPAWN_LENGTH: i32 = 3;
const SPAWN_HEADING: Direction = Direction::Right;

/// Observable result of a call to [`RoundState::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdvanceOutcome {
    /// The round keeps going.
    Continue,
    /// At least one food was eaten and the round keeps going.
    FoodEaten,
    /// The snake died.
    Died(DeathCause),
    /// The TimeAttack clock ran out.
    TimeExpired,
    /// The snake filled the board and no food could be placed.
    BoardFilled,
}

impl AdvanceOutcome {
    /// Reason the round ended, or `None` when it continues.
    #[must_use]
    pub const fn end_reason(self) -> Option<EndReason> {
        match self {
            AdvanceOutcome::Continue | AdvanceOutcome::FoodEaten => None,
            AdvanceOutcome::Died(cause) => Some(EndReason::Died(cause)),
            AdvanceOutcome::TimeExpired => Some(EndReason::TimeUp),
            AdvanceOutcome::BoardFilled => Some(EndReason::BoardFilled),
        }
    }
}

impl From<EndReason> for AdvanceOutcome {
    fn from(reason: EndReason) -> Self {
        match reason {
            EndReason::Died(cause) => AdvanceOutcome::Died(cause),
            EndReason::TimeUp => AdvanceOutcome::TimeExpired,
            EndReason::BoardFilled => AdvanceOutcome::BoardFilled,
        }
    }
}

/// Reasons explicit round geometry is rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    /// The body has no cells.
    #[error("the snake needs at least one cell")]
    EmptyBody,
    /// A body cell lies off the playfield.
    #[error("snake cell {0} lies outside the playfield")]
    OutOfBounds(Cell),
    /// A body cell is listed twice.
    #[error("snake cell {0} appears twice")]
    Overlap(Cell),
    /// A body cell sits on a maze wall.
    #[error("snake cell {0} sits on a wall")]
    OnWall(Cell),
    /// The food cell is off the playfield or already occupied.
    #[error("food cell {0} is blocked")]
    FoodBlocked(Cell),
}

/// One playthrough: snake, food, rules, score and clocks.
#[derive(Clone, Debug)]
pub struct RoundState {
    rules: ModeRules,
    snake: Snake,
    food: Food,
    occupancy: OccupancyGrid,
    score: u32,
    foods_eaten: u32,
    ticks_per_second: f32,
    step_period: Duration,
    accumulator: Duration,
    elapsed: Duration,
    scored_seconds: u64,
    ticks: u64,
    finished: Option<EndReason>,
}

impl RoundState {
    /// Creates a round with the snake in its spawn position and one food placed.
    #[must_use]
    pub fn new(rules: ModeRules, seed: u64) -> Self {
        let mut round = Self::empty(rules, seed);
        let head = SPAWN_HEAD;
        let (column_delta, row_delta) = SPAWN_HEADING.delta();
        let trailing: VecDeque<Cell> = (1..SPAWN_LENGTH)
            .map(|offset| {
                Cell::new(
                    head.column() - column_delta * offset,
                    head.row() - row_delta * offset,
                )
            })
            .collect();
        for cell in std::iter::once(head).chain(trailing.iter().copied()) {
            round.occupancy.set(cell, Occupant::Snake);
        }
        round.snake = Snake::new(head, trailing, SPAWN_HEADING);
        // A freshly spawned snake leaves most of the board free.
        let _ = round.respawn_food();
        round
    }

    /// Creates a round from explicit geometry.
    ///
    /// `body` runs from head to tail. When `food` is `None` it is placed at
    /// random like in a fresh round.
    pub fn from_geometry(
        rules: ModeRules,
        body: &[Cell],
        heading: Direction,
        food: Option<Cell>,
        seed: u64,
    ) -> Result<Self, SetupError> {
        let (&head, trailing) = body.split_first().ok_or(SetupError::EmptyBody)?;
        let mut round = Self::empty(rules, seed);

        for &cell in body {
            match round.occupancy.occupant(cell) {
                _ if !Grid::in_bounds(cell) => return Err(SetupError::OutOfBounds(cell)),
                Occupant::Snake => return Err(SetupError::Overlap(cell)),
                Occupant::Wall => return Err(SetupError::OnWall(cell)),
                Occupant::Empty => round.occupancy.set(cell, Occupant::Snake),
            }
        }
        round.snake = Snake::new(head, trailing.iter().copied().collect(), heading);

        match food {
            Some(cell) if round.occupancy.is_free(cell) => round.food.place(cell),
            Some(cell) => return Err(SetupError::FoodBlocked(cell)),
            None => {
                let _ = round.respawn_food();
            }
        }
        Ok(round)
    }

    fn empty(rules: ModeRules, seed: u64) -> Self {
        let mut occupancy = OccupancyGrid::new();
        for &wall in rules.obstacle_cells() {
            occupancy.set(wall, Occupant::Wall);
        }
        let ticks_per_second = speed_curve(0);

        Self {
            rules,
            snake: Snake::new(SPAWN_HEAD, VecDeque::new(), SPAWN_HEADING),
            food: Food::new(seed),
            occupancy,
            score: 0,
            foods_eaten: 0,
            ticks_per_second,
            step_period: step_period(ticks_per_second),
            accumulator: Duration::ZERO,
            elapsed: Duration::ZERO,
            scored_seconds: 0,
            ticks: 0,
            finished: None,
        }
    }

    /// Advances the round by `dt` of wall-clock time.
    ///
    /// `input` is buffered as the pending turn and latched by the first
    /// discrete step that runs. Once the round has ended every further call
    /// returns the same terminal outcome without touching the state.
    pub fn advance(&mut self, input: Option<Direction>, dt: Duration) -> AdvanceOutcome {
        if let Some(reason) = self.finished {
            return AdvanceOutcome::from(reason);
        }

        if let Some(direction) = input {
            self.snake.buffer(direction);
        }
        self.food.animate(dt);
        self.elapsed = self.elapsed.saturating_add(dt);

        if self.rules.is_timed() {
            self.award_survival_seconds();
            if self.elapsed >= TIME_ATTACK_LIMIT {
                return self.finish(EndReason::TimeUp);
            }
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let mut outcome = AdvanceOutcome::Continue;
        while self.accumulator >= self.step_period {
            self.accumulator -= self.step_period;
            match self.step() {
                AdvanceOutcome::Continue => {}
                AdvanceOutcome::FoodEaten => outcome = AdvanceOutcome::FoodEaten,
                terminal => return terminal,
            }
        }
        outcome
    }

    fn step(&mut self) -> AdvanceOutcome {
        self.ticks += 1;
        let heading = self.snake.latch_heading();
        let candidate = self.snake.head().offset(heading);

        let head = match self.rules.resolve_boundary(candidate) {
            BoundaryResolution::Head(cell) => cell,
            BoundaryResolution::Died => {
                return self.finish(EndReason::Died(DeathCause::Boundary));
            }
        };
        if self.occupancy.occupant(head) == Occupant::Wall {
            return self.finish(EndReason::Died(DeathCause::Obstacle));
        }

        let grew = self.food.cell() == Some(head);
        if self.snake.step(head, grew, &mut self.occupancy) {
            return self.finish(EndReason::Died(DeathCause::SelfCollision));
        }
        if !grew {
            return AdvanceOutcome::Continue;
        }

        self.score = self.score.saturating_add(SCORE_PER_FOOD);
        self.foods_eaten += 1;
        self.ticks_per_second = speed_curve(self.foods_eaten);
        self.step_period = step_period(self.ticks_per_second);
        if self.respawn_food().is_err() {
            return self.finish(EndReason::BoardFilled);
        }
        AdvanceOutcome::FoodEaten
    }

    fn respawn_food(&mut self) -> Result<Cell, NoSpaceAvailable> {
        let occupancy = &self.occupancy;
        self.food.respawn(|cell| !occupancy.is_free(cell))
    }

    fn award_survival_seconds(&mut self) {
        let whole = self.elapsed.as_secs().min(TIME_ATTACK_LIMIT.as_secs());
        if whole > self.scored_seconds {
            let crossed = u32::try_from(whole - self.scored_seconds).unwrap_or(u32::MAX);
            self.score = self.score.saturating_add(crossed);
            self.scored_seconds = whole;
        }
    }

    fn finish(&mut self, reason: EndReason) -> AdvanceOutcome {
        self.finished = Some(reason);
        self.accumulator = Duration::ZERO;
        AdvanceOutcome::from(reason)
    }
}

fn step_period(ticks_per_second: f32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(ticks_per_second))
}

/// Query functions that provide read-only access to the round state.
pub mod query {
    use std::time::Duration;

    use super::{MazeLayout, Occupant, RoundState, Snake};
    use serpents_core::{Cell, DeathCause, Direction, EndReason, Mode, TIME_ATTACK_LIMIT};

    /// Mode the round is played under.
    #[must_use]
    pub fn mode(round: &RoundState) -> Mode {
        round.rules.mode()
    }

    /// Maze layout in play, if any.
    #[must_use]
    pub fn layout(round: &RoundState) -> Option<MazeLayout> {
        round.rules.layout()
    }

    /// Read-only access to the snake.
    #[must_use]
    pub fn snake(round: &RoundState) -> &Snake {
        &round.snake
    }

    /// Cell holding the food, if one is placed.
    #[must_use]
    pub fn food(round: &RoundState) -> Option<Cell> {
        round.food.cell()
    }

    /// Blink frame of the food sprite, either 0 or 1.
    #[must_use]
    pub fn food_frame(round: &RoundState) -> u8 {
        round.food.frame()
    }

    /// Wall cells of the active layout.
    #[must_use]
    pub fn walls(round: &RoundState) -> &'static [Cell] {
        round.rules.obstacle_cells()
    }

    /// What fills `cell` right now.
    #[must_use]
    pub fn occupant(round: &RoundState, cell: Cell) -> Occupant {
        round.occupancy.occupant(cell)
    }

    /// Current score.
    #[must_use]
    pub fn score(round: &RoundState) -> u32 {
        round.score
    }

    /// Foods eaten so far.
    #[must_use]
    pub fn foods_eaten(round: &RoundState) -> u32 {
        round.foods_eaten
    }

    /// Current simulation rate.
    #[must_use]
    pub fn ticks_per_second(round: &RoundState) -> f32 {
        round.ticks_per_second
    }

    /// Round time consumed so far, excluding paused time.
    #[must_use]
    pub fn elapsed(round: &RoundState) -> Duration {
        round.elapsed
    }

    /// Time left on the clock for timed modes.
    #[must_use]
    pub fn time_remaining(round: &RoundState) -> Option<Duration> {
        round
            .rules
            .is_timed()
            .then(|| TIME_ATTACK_LIMIT.saturating_sub(round.elapsed))
    }

    /// Number of discrete steps simulated.
    #[must_use]
    pub fn ticks(round: &RoundState) -> u64 {
        round.ticks
    }

    /// Whether the snake is still alive.
    #[must_use]
    pub fn is_alive(round: &RoundState) -> bool {
        !matches!(round.finished, Some(EndReason::Died(_)))
    }

    /// Cause of death, when the snake died.
    #[must_use]
    pub fn death_cause(round: &RoundState) -> Option<DeathCause> {
        match round.finished {
            Some(EndReason::Died(cause)) => Some(cause),
            _ => None,
        }
    }

    /// Why the round ended, or `None` while it runs.
    #[must_use]
    pub fn end_reason(round: &RoundState) -> Option<EndReason> {
        round.finished
    }

    /// Captures a comparable snapshot of the round.
    #[must_use]
    pub fn snapshot(round: &RoundState) -> RoundSnapshot {
        RoundSnapshot {
            snake: round.snake.cells().collect(),
            heading: round.snake.heading(),
            food: round.food.cell(),
            score: round.score,
            foods_eaten: round.foods_eaten,
            ticks: round.ticks,
            end_reason: round.finished,
        }
    }

    /// Immutable capture of the round's observable state.
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct RoundSnapshot {
        /// Body cells from head to tail.
        pub snake: Vec<Cell>,
        /// Direction of the last step.
        pub heading: Direction,
        /// Food cell, if placed.
        pub food: Option<Cell>,
        /// Current score.
        pub score: u32,
        /// Foods eaten so far.
        pub foods_eaten: u32,
        /// Discrete steps simulated.
        pub ticks: u64,
        /// Why the round ended, if it has.
        pub end_reason: Option<EndReason>,
    }
}
