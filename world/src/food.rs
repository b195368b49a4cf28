use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serpents_core::{Cell, Grid};
use thiserror::Error;

const ANIMATION_INTERVAL: Duration = Duration::from_millis(250);

/// Raised when every playfield cell is taken and food cannot be placed.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("no free cell is available for food")]
pub struct NoSpaceAvailable;

/// The single food item and the random stream that places it.
#[derive(Clone, Debug)]
pub(crate) struct Food {
    cell: Option<Cell>,
    rng: ChaCha8Rng,
    animation: Duration,
    frame: u8,
}

impl Food {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            cell: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            animation: Duration::ZERO,
            frame: 0,
        }
    }

    pub(crate) fn cell(&self) -> Option<Cell> {
        self.cell
    }

    pub(crate) fn place(&mut self, cell: Cell) {
        self.cell = Some(cell);
    }

    pub(crate) fn frame(&self) -> u8 {
        self.frame
    }

    /// Picks a cell uniformly at random among those `is_blocked` rejects.
    pub(crate) fn respawn<F>(&mut self, is_blocked: F) -> Result<Cell, NoSpaceAvailable>
    where
        F: Fn(Cell) -> bool,
    {
        self.cell = None;
        let free: Vec<Cell> = Grid::cells().filter(|cell| !is_blocked(*cell)).collect();
        if free.is_empty() {
            return Err(NoSpaceAvailable);
        }

        let index = self.rng.gen_range(0..free.len());
        let cell = free.get(index).copied().ok_or(NoSpaceAvailable)?;
        self.cell = Some(cell);
        Ok(cell)
    }

    /// Advances the two-frame blink by the round time that passed.
    pub(crate) fn animate(&mut self, dt: Duration) {
        self.animation = self.animation.saturating_add(dt);
        while self.animation >= ANIMATION_INTERVAL {
            self.animation -= ANIMATION_INTERVAL;
            self.frame ^= 1;
        }
    }
}
