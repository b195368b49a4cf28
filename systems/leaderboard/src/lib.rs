#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-mode top-ten leaderboards with deterministic ordering.

use std::cmp::Ordering;

use serpents_core::{HighScoreEntry, HighScoreRecord, Mode, RECORD_VERSION};

/// Maximum number of entries kept per mode.
pub const MAX_ENTRIES: usize = 10;

/// Ordering used by every leaderboard: higher score first, earlier timestamp on ties.
#[must_use]
pub fn rank_order(left: &HighScoreEntry, right: &HighScoreEntry) -> Ordering {
    right
        .score
        .cmp(&left.score)
        .then_with(|| left.timestamp.cmp(&right.timestamp))
}

/// One ordered leaderboard per mode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighScoreTable {
    classic: Vec<HighScoreEntry>,
    boxed: Vec<HighScoreEntry>,
    maze: Vec<HighScoreEntry>,
    time_attack: Vec<HighScoreEntry>,
}

impl HighScoreTable {
    /// Creates a table with every leaderboard empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from a persisted record, re-sorting and truncating each list.
    #[must_use]
    pub fn from_record(record: HighScoreRecord) -> Self {
        Self {
            classic: normalized(record.classic),
            boxed: normalized(record.boxed),
            maze: normalized(record.maze),
            time_attack: normalized(record.time_attack),
        }
    }

    /// Produces the persisted form of the table.
    #[must_use]
    pub fn to_record(&self) -> HighScoreRecord {
        HighScoreRecord {
            version: RECORD_VERSION,
            classic: self.classic.clone(),
            boxed: self.boxed.clone(),
            maze: self.maze.clone(),
            time_attack: self.time_attack.clone(),
        }
    }

    /// Ordered entries for `mode`.
    #[must_use]
    pub fn entries(&self, mode: Mode) -> &[HighScoreEntry] {
        match mode {
            Mode::Classic => &self.classic,
            Mode::Boxed => &self.boxed,
            Mode::Maze => &self.maze,
            Mode::TimeAttack => &self.time_attack,
        }
    }

    /// Whether a score recorded now would make the leaderboard for `mode`.
    ///
    /// A fresh entry carries the latest timestamp, so on a full list it must
    /// beat the last entry outright.
    #[must_use]
    pub fn qualifies(&self, mode: Mode, score: u32) -> bool {
        let entries = self.entries(mode);
        entries.len() < MAX_ENTRIES || entries.last().map_or(true, |last| score > last.score)
    }

    /// Inserts `entry` into the leaderboard for `mode`.
    ///
    /// Returns the zero-based rank the entry took, or `None` when it ranked
    /// below the tenth place and was dropped. Entries tied on both score and
    /// timestamp keep insertion order.
    pub fn insert(&mut self, mode: Mode, entry: HighScoreEntry) -> Option<usize> {
        let entries = self.entries_mut(mode);
        let rank = entries
            .iter()
            .position(|existing| rank_order(&entry, existing) == Ordering::Less)
            .unwrap_or(entries.len());
        if rank >= MAX_ENTRIES {
            return None;
        }

        entries.insert(rank, entry);
        entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    fn entries_mut(&mut self, mode: Mode) -> &mut Vec<HighScoreEntry> {
        match mode {
            Mode::Classic => &mut self.classic,
            Mode::Boxed => &mut self.boxed,
            Mode::Maze => &mut self.maze,
            Mode::TimeAttack => &mut self.time_attack,
        }
    }
}

fn normalized(mut entries: Vec<HighScoreEntry>) -> Vec<HighScoreEntry> {
    entries.sort_by(rank_order);
    entries.truncate(MAX_ENTRIES);
    entries
}
