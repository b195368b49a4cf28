#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scene machine that drives Serpents Per Second from menu to leaderboard.
//!
//! [`SceneMachine`] is the single context object of the application: it owns
//! the active scene, the live [`RoundState`] while one exists, the
//! high-score table and the settings. Adapters feed it decoded [`Command`]
//! values, including one [`Command::Tick`] per frame, and react to the
//! [`Event`] values it reports. It never performs I/O; persistence adapters
//! act on [`Event::SettingsChanged`] and [`Event::HighScoreRecorded`].

mod menu;

use std::{fmt, mem, time::Duration};

use chrono::{DateTime, Utc};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serpents_core::{
    Command, Direction, EndReason, Event, HighScoreEntry, Mode, SceneKind, Settings,
};
use serpents_system_leaderboard::HighScoreTable;
use serpents_world::{query, AdvanceOutcome, MazeLayout, ModeRules, RoundState};
use tracing::{debug, info};

pub use self::menu::{MenuItem, ModeSelectItem, NameEntry, OptionsItem, RoundSummary};
use self::menu::cycle;

/// Longest frame forwarded to the round; longer stalls are dropped.
pub const MAX_FRAME_DT: Duration = Duration::from_millis(250);

/// Source of wall-clock timestamps for leaderboard entries.
pub trait Clock: fmt::Debug {
    /// Current moment in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug)]
enum Scene {
    Menu { cursor: usize },
    ModeSelect { cursor: usize },
    Options { cursor: usize, opened_with: Settings },
    Playing(Box<RoundState>),
    Paused(Box<RoundState>),
    GameOver(RoundSummary),
    HighScoreEntry(NameEntry),
    Leaderboard { mode: Mode },
}

impl Scene {
    fn menu_at(item: MenuItem) -> Self {
        Scene::Menu {
            cursor: item.index(),
        }
    }

    fn kind(&self) -> SceneKind {
        match self {
            Scene::Menu { .. } => SceneKind::Menu,
            Scene::ModeSelect { .. } => SceneKind::ModeSelect,
            Scene::Options { .. } => SceneKind::Options,
            Scene::Playing(_) => SceneKind::Playing,
            Scene::Paused(_) => SceneKind::Paused,
            Scene::GameOver(_) => SceneKind::GameOver,
            Scene::HighScoreEntry(_) => SceneKind::HighScoreEntry,
            Scene::Leaderboard { .. } => SceneKind::Leaderboard,
        }
    }
}

/// Borrowed description of the active scene for presentation.
#[derive(Clone, Copy, Debug)]
pub enum SceneView<'a> {
    /// Title menu with the highlighted item.
    Menu {
        /// Highlighted item.
        selected: MenuItem,
    },
    /// Mode picker with the highlighted item.
    ModeSelect {
        /// Highlighted item.
        selected: ModeSelectItem,
    },
    /// Settings editor.
    Options {
        /// Highlighted item.
        selected: OptionsItem,
        /// Settings as currently edited.
        settings: &'a Settings,
    },
    /// Running round.
    Playing {
        /// Live round.
        round: &'a RoundState,
    },
    /// Frozen round.
    Paused {
        /// Live round.
        round: &'a RoundState,
    },
    /// Summary of the last round.
    GameOver {
        /// Round result.
        summary: &'a RoundSummary,
    },
    /// Name editor for a qualifying score.
    HighScoreEntry {
        /// Name being edited.
        entry: &'a NameEntry,
    },
    /// Leaderboard page.
    Leaderboard {
        /// Mode whose page is shown.
        mode: Mode,
        /// Ordered entries of that page.
        entries: &'a [HighScoreEntry],
    },
}

/// Top-level state machine and sole owner of the application state.
#[derive(Debug)]
pub struct SceneMachine {
    scene: Scene,
    settings: Settings,
    high_scores: HighScoreTable,
    seeds: ChaCha8Rng,
    maze_rotation: usize,
    buffered: Option<Direction>,
    clock: Box<dyn Clock>,
}

impl SceneMachine {
    /// Creates a machine on the title menu.
    ///
    /// `seed` feeds the stream that seeds every round's food placement.
    #[must_use]
    pub fn new(settings: Settings, high_scores: HighScoreTable, seed: u64) -> Self {
        Self {
            scene: Scene::menu_at(MenuItem::Play),
            settings,
            high_scores,
            seeds: ChaCha8Rng::seed_from_u64(seed),
            maze_rotation: 0,
            buffered: None,
            clock: Box::new(SystemClock),
        }
    }

    /// Replaces the clock used to stamp leaderboard entries.
    #[must_use]
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Tag of the active scene.
    #[must_use]
    pub fn kind(&self) -> SceneKind {
        self.scene.kind()
    }

    /// Current settings, including unsaved edits made in the options scene.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Leaderboards for every mode.
    #[must_use]
    pub fn high_scores(&self) -> &HighScoreTable {
        &self.high_scores
    }

    /// Live round, present only while playing or paused.
    #[must_use]
    pub fn round(&self) -> Option<&RoundState> {
        match &self.scene {
            Scene::Playing(round) | Scene::Paused(round) => Some(&**round),
            _ => None,
        }
    }

    /// Borrowed description of the active scene.
    #[must_use]
    pub fn view(&self) -> SceneView<'_> {
        match &self.scene {
            Scene::Menu { cursor } => SceneView::Menu {
                selected: MenuItem::at(*cursor),
            },
            Scene::ModeSelect { cursor } => SceneView::ModeSelect {
                selected: ModeSelectItem::at(*cursor),
            },
            Scene::Options { cursor, .. } => SceneView::Options {
                selected: OptionsItem::at(*cursor),
                settings: &self.settings,
            },
            Scene::Playing(round) => SceneView::Playing { round: &**round },
            Scene::Paused(round) => SceneView::Paused { round: &**round },
            Scene::GameOver(summary) => SceneView::GameOver { summary },
            Scene::HighScoreEntry(entry) => SceneView::HighScoreEntry { entry },
            Scene::Leaderboard { mode } => SceneView::Leaderboard {
                mode: *mode,
                entries: self.high_scores.entries(*mode),
            },
        }
    }

    /// Executes a command against the active scene and reports what happened.
    pub fn apply(&mut self, command: Command, out_events: &mut Vec<Event>) {
        let from = self.scene.kind();
        let scene = mem::replace(&mut self.scene, Scene::menu_at(MenuItem::Play));
        self.scene = match scene {
            Scene::Menu { cursor } => self.on_menu(cursor, command, out_events),
            Scene::ModeSelect { cursor } => self.on_mode_select(cursor, command, out_events),
            Scene::Options {
                cursor,
                opened_with,
            } => self.on_options(cursor, opened_with, command, out_events),
            Scene::Playing(round) => self.on_playing(round, command, out_events),
            Scene::Paused(round) => on_paused(round, command),
            Scene::GameOver(summary) => on_game_over(summary, command),
            Scene::HighScoreEntry(entry) => self.on_name_entry(entry, command, out_events),
            Scene::Leaderboard { mode } => on_leaderboard(mode, command),
        };

        let to = self.scene.kind();
        if from != to {
            debug!(?from, ?to, "scene changed");
            out_events.push(Event::SceneChanged { from, to });
        }
    }

    fn on_menu(&mut self, cursor: usize, command: Command, out_events: &mut Vec<Event>) -> Scene {
        match command {
            Command::Steer { direction } => Scene::Menu {
                cursor: move_cursor(cursor, MenuItem::ALL.len(), direction),
            },
            Command::Confirm => match MenuItem::at(cursor) {
                MenuItem::Play => Scene::ModeSelect { cursor: 0 },
                MenuItem::Options => Scene::Options {
                    cursor: 0,
                    opened_with: self.settings,
                },
                MenuItem::HighScores => Scene::Leaderboard {
                    mode: Mode::Classic,
                },
                MenuItem::Quit => {
                    info!("quit requested");
                    out_events.push(Event::QuitRequested);
                    Scene::Menu { cursor }
                }
            },
            Command::Cancel | Command::Pause | Command::Tick { .. } => Scene::Menu { cursor },
        }
    }

    fn on_mode_select(
        &mut self,
        cursor: usize,
        command: Command,
        out_events: &mut Vec<Event>,
    ) -> Scene {
        match command {
            Command::Steer { direction } => Scene::ModeSelect {
                cursor: move_cursor(cursor, ModeSelectItem::ALL.len(), direction),
            },
            Command::Confirm => match ModeSelectItem::at(cursor) {
                ModeSelectItem::Mode(mode) => self.start_round(mode, out_events),
                ModeSelectItem::Back => Scene::menu_at(MenuItem::Play),
            },
            Command::Cancel => Scene::menu_at(MenuItem::Play),
            Command::Pause | Command::Tick { .. } => Scene::ModeSelect { cursor },
        }
    }

    fn on_options(
        &mut self,
        cursor: usize,
        opened_with: Settings,
        command: Command,
        out_events: &mut Vec<Event>,
    ) -> Scene {
        let item = OptionsItem::at(cursor);
        match command {
            Command::Steer {
                direction: direction @ (Direction::Up | Direction::Down),
            } => {
                return Scene::Options {
                    cursor: move_cursor(cursor, OptionsItem::ALL.len(), direction),
                    opened_with,
                };
            }
            Command::Steer { direction } => {
                let steps = if direction == Direction::Right { 1 } else { -1 };
                match item {
                    OptionsItem::Scale => self.settings.step_scale(steps),
                    OptionsItem::Fullscreen => self.settings.fullscreen = !self.settings.fullscreen,
                    OptionsItem::MusicVolume => self.settings.step_music_volume(steps),
                    OptionsItem::SfxVolume => self.settings.step_sfx_volume(steps),
                    OptionsItem::Back => {}
                }
            }
            Command::Confirm => match item {
                OptionsItem::Fullscreen => self.settings.fullscreen = !self.settings.fullscreen,
                OptionsItem::Back => return self.leave_options(opened_with, out_events),
                OptionsItem::Scale | OptionsItem::MusicVolume | OptionsItem::SfxVolume => {}
            },
            Command::Cancel => return self.leave_options(opened_with, out_events),
            Command::Pause | Command::Tick { .. } => {}
        }

        Scene::Options {
            cursor,
            opened_with,
        }
    }

    fn leave_options(&mut self, opened_with: Settings, out_events: &mut Vec<Event>) -> Scene {
        if self.settings != opened_with {
            info!(settings = ?self.settings, "settings changed");
            out_events.push(Event::SettingsChanged {
                settings: self.settings,
            });
        }
        Scene::menu_at(MenuItem::Options)
    }

    fn on_playing(
        &mut self,
        mut round: Box<RoundState>,
        command: Command,
        out_events: &mut Vec<Event>,
    ) -> Scene {
        match command {
            Command::Steer { direction } => {
                self.buffered = Some(direction);
                Scene::Playing(round)
            }
            Command::Pause => Scene::Paused(round),
            Command::Cancel => {
                info!(mode = ?query::mode(&round), score = query::score(&round), "round abandoned");
                self.buffered = None;
                Scene::menu_at(MenuItem::Play)
            }
            Command::Confirm => Scene::Playing(round),
            Command::Tick { dt } => {
                let outcome = round.advance(self.buffered.take(), dt.min(MAX_FRAME_DT));
                if let Some(reason) = outcome.end_reason() {
                    return self.end_round(&round, reason, out_events);
                }
                if outcome == AdvanceOutcome::FoodEaten {
                    out_events.push(Event::FoodEaten {
                        score: query::score(&round),
                        foods_eaten: query::foods_eaten(&round),
                    });
                }
                Scene::Playing(round)
            }
        }
    }

    fn on_name_entry(
        &mut self,
        mut entry: NameEntry,
        command: Command,
        out_events: &mut Vec<Event>,
    ) -> Scene {
        match command {
            Command::Steer { direction } => {
                match direction {
                    Direction::Up => entry.cycle_letter(true),
                    Direction::Down => entry.cycle_letter(false),
                    Direction::Left => entry.move_cursor(false),
                    Direction::Right => entry.move_cursor(true),
                }
                Scene::HighScoreEntry(entry)
            }
            Command::Confirm => {
                let mode = entry.mode();
                let record = HighScoreEntry::new(entry.name(), entry.score(), self.clock.now());
                info!(?mode, name = %record.name, score = record.score, "high score entered");
                if let Some(rank) = self.high_scores.insert(mode, record) {
                    out_events.push(Event::HighScoreRecorded { mode, rank });
                }
                Scene::Leaderboard { mode }
            }
            Command::Cancel => Scene::menu_at(MenuItem::Play),
            Command::Pause | Command::Tick { .. } => Scene::HighScoreEntry(entry),
        }
    }

    fn start_round(&mut self, mode: Mode, out_events: &mut Vec<Event>) -> Scene {
        let layout = MazeLayout::nth(self.maze_rotation);
        if mode == Mode::Maze {
            self.maze_rotation = (self.maze_rotation + 1) % MazeLayout::ALL.len();
        }
        let rules = ModeRules::for_mode(mode, layout);
        let seed = self.seeds.next_u64();
        let layout_name = rules.layout().map(|layout| layout.name());
        self.buffered = None;

        info!(?mode, layout = ?layout_name, seed, "round started");
        out_events.push(Event::RoundStarted {
            mode,
            layout: layout_name,
        });
        Scene::Playing(Box::new(RoundState::new(rules, seed)))
    }

    fn end_round(
        &mut self,
        round: &RoundState,
        reason: EndReason,
        out_events: &mut Vec<Event>,
    ) -> Scene {
        let mode = query::mode(round);
        let score = query::score(round);
        let summary = RoundSummary {
            mode,
            score,
            foods_eaten: query::foods_eaten(round),
            reason,
            qualifies: self.high_scores.qualifies(mode, score),
        };
        self.buffered = None;

        info!(?mode, score, ?reason, qualifies = summary.qualifies, "round ended");
        out_events.push(Event::RoundEnded {
            mode,
            score,
            reason,
        });
        Scene::GameOver(summary)
    }
}

fn on_paused(round: Box<RoundState>, command: Command) -> Scene {
    match command {
        Command::Pause => Scene::Playing(round),
        Command::Cancel => Scene::menu_at(MenuItem::Play),
        Command::Steer { .. } | Command::Confirm | Command::Tick { .. } => Scene::Paused(round),
    }
}

fn on_game_over(summary: RoundSummary, command: Command) -> Scene {
    match command {
        Command::Confirm if summary.qualifies => {
            Scene::HighScoreEntry(NameEntry::new(summary.mode, summary.score))
        }
        Command::Confirm | Command::Cancel => Scene::menu_at(MenuItem::Play),
        Command::Steer { .. } | Command::Pause | Command::Tick { .. } => Scene::GameOver(summary),
    }
}

fn on_leaderboard(mode: Mode, command: Command) -> Scene {
    match command {
        Command::Steer {
            direction: direction @ (Direction::Left | Direction::Right),
        } => {
            let index = Mode::ALL.iter().position(|candidate| *candidate == mode).unwrap_or(0);
            let next = cycle(index, Mode::ALL.len(), direction == Direction::Right);
            Scene::Leaderboard {
                mode: Mode::ALL[next],
            }
        }
        Command::Confirm | Command::Cancel => Scene::menu_at(MenuItem::HighScores),
        Command::Steer { .. } | Command::Pause | Command::Tick { .. } => {
            Scene::Leaderboard { mode }
        }
    }
}

fn move_cursor(cursor: usize, len: usize, direction: Direction) -> usize {
    match direction {
        Direction::Up => cycle(cursor, len, false),
        Direction::Down => cycle(cursor, len, true),
        Direction::Left | Direction::Right => cursor,
    }
}
