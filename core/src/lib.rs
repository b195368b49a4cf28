#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Serpents Per Second engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative round simulation, and the scene machine. Adapters decode
//! physical input into [`Command`] values, the scene machine executes those
//! commands against the live round, and then reports [`Event`] values that
//! adapters react to (persistence, audio, presentation). Plain records such as
//! [`Settings`] and [`HighScoreRecord`] cross the boundary to the persistence
//! adapter without the simulation ever touching a file.

use std::{fmt, time::Duration};

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Title shown by adapters when the experience boots.
pub const GAME_TITLE: &str = "Serpents Per Second";

/// Points awarded for every food the snake eats.
pub const SCORE_PER_FOOD: u32 = 10;

/// Length of a TimeAttack round.
pub const TIME_ATTACK_LIMIT: Duration = Duration::from_secs(120);

/// Tick rate of a fresh round.
pub const INITIAL_TICKS_PER_SECOND: f32 = 8.0;

/// Tick rate gained per food eaten.
pub const TICKS_PER_SECOND_PER_FOOD: f32 = 0.25;

/// Upper bound of the tick rate.
pub const MAX_TICKS_PER_SECOND: f32 = 14.0;

/// Maps the number of foods eaten in a round to the simulation tick rate.
///
/// The curve is monotonic non-decreasing and saturates at
/// [`MAX_TICKS_PER_SECOND`] after 24 foods.
#[must_use]
pub fn speed_curve(foods_eaten: u32) -> f32 {
    let accelerated = INITIAL_TICKS_PER_SECOND + TICKS_PER_SECOND_PER_FOOD * foods_eaten as f32;
    accelerated.min(MAX_TICKS_PER_SECOND)
}

/// Commands that express every logical input the game accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the snake turn, or moves a menu cursor.
    Steer {
        /// Direction decoded from the input device.
        direction: Direction,
    },
    /// Accepts the highlighted menu item or the entered name.
    Confirm,
    /// Backs out of the current scene.
    Cancel,
    /// Toggles between playing and paused.
    Pause,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of wall-clock time that elapsed since the previous frame.
        dt: Duration,
    },
}

/// Events broadcast by the scene machine after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the active scene changed.
    SceneChanged {
        /// Scene that was active before the transition.
        from: SceneKind,
        /// Scene that became active.
        to: SceneKind,
    },
    /// Confirms that a fresh round was created.
    RoundStarted {
        /// Rule set governing the round.
        mode: Mode,
        /// Name of the maze layout when the mode places walls.
        layout: Option<&'static str>,
    },
    /// Reports that the snake ate food during the last frame.
    FoodEaten {
        /// Score after the food was credited.
        score: u32,
        /// Total foods eaten in the round.
        foods_eaten: u32,
    },
    /// Reports that the live round finished.
    RoundEnded {
        /// Rule set the round was played under.
        mode: Mode,
        /// Final score of the round.
        score: u32,
        /// Why the round finished.
        reason: EndReason,
    },
    /// Confirms that a new entry was written into the high-score table.
    HighScoreRecorded {
        /// Leaderboard the entry belongs to.
        mode: Mode,
        /// Zero-based position the entry took in the leaderboard.
        rank: usize,
    },
    /// Reports that the player edited the settings and left the options scene.
    SettingsChanged {
        /// Settings after the edit.
        settings: Settings,
    },
    /// Requests that the adapter shut the application down.
    QuitRequested,
}

/// Tags identifying every scene the application can display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneKind {
    /// Title menu.
    Menu,
    /// Rule-set picker shown before a round.
    ModeSelect,
    /// Settings editor.
    Options,
    /// A round is running.
    Playing,
    /// A round exists but its clock is frozen.
    Paused,
    /// Summary of a finished round.
    GameOver,
    /// Name entry for a qualifying score.
    HighScoreEntry,
    /// Per-mode high-score listing.
    Leaderboard,
}

/// Cardinal directions the snake can travel in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a stable order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Direction pointing the other way along the same axis.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit offset applied to a cell when travelling in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that a head computed one step past an edge can
/// be represented before the boundary policy resolves it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    column: i32,
    row: i32,
}

impl Cell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Cell one unit away in the provided direction, without any boundary policy.
    #[must_use]
    pub const fn offset(self, direction: Direction) -> Self {
        let (column_delta, row_delta) = direction.delta();
        Self {
            column: self.column + column_delta,
            row: self.row + row_delta,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Fixed 16×14 playfield with wrap and containment arithmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Grid;

impl Grid {
    /// Number of columns on the playfield.
    pub const COLUMNS: i32 = 16;
    /// Number of rows on the playfield.
    pub const ROWS: i32 = 14;
    /// Total number of cells on the playfield.
    pub const CELL_COUNT: usize = (Self::COLUMNS * Self::ROWS) as usize;

    /// Reduces each axis modulo its dimension.
    #[must_use]
    pub const fn wrap(cell: Cell) -> Cell {
        Cell::new(
            cell.column().rem_euclid(Self::COLUMNS),
            cell.row().rem_euclid(Self::ROWS),
        )
    }

    /// Reports whether the cell lies on the playfield.
    #[must_use]
    pub const fn in_bounds(cell: Cell) -> bool {
        cell.column() >= 0
            && cell.column() < Self::COLUMNS
            && cell.row() >= 0
            && cell.row() < Self::ROWS
    }

    /// Row-major index of the cell, or `None` when it lies off the playfield.
    #[must_use]
    pub fn index(cell: Cell) -> Option<usize> {
        if !Self::in_bounds(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(Self::COLUMNS).ok()?;
        Some(row * width + column)
    }

    /// Every playfield cell in row-major order.
    pub fn cells() -> impl Iterator<Item = Cell> {
        (0..Self::ROWS).flat_map(|row| (0..Self::COLUMNS).map(move |column| Cell::new(column, row)))
    }
}

/// Rule sets a round can be played under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Edges wrap around.
    Classic,
    /// Edges are lethal.
    Boxed,
    /// Edges are lethal and a maze layout places walls.
    Maze,
    /// Edges wrap and the round ends after two minutes.
    TimeAttack,
}

impl Mode {
    /// Every mode in menu order.
    pub const ALL: [Mode; 4] = [Mode::Classic, Mode::Boxed, Mode::Maze, Mode::TimeAttack];

    /// Upper-case label shown in menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Mode::Classic => "CLASSIC",
            Mode::Boxed => "BOXED",
            Mode::Maze => "MAZE",
            Mode::TimeAttack => "TIME ATTACK",
        }
    }
}

/// What killed the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// The head moved onto the snake's own body.
    SelfCollision,
    /// The head left the playfield under a lethal boundary policy.
    Boundary,
    /// The head moved onto a maze wall.
    Obstacle,
}

/// Reason a round finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// The snake died.
    Died(DeathCause),
    /// The TimeAttack clock ran out.
    TimeUp,
    /// No free cell remained for food.
    BoardFilled,
}

impl EndReason {
    /// Headline displayed on the game-over screen.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            EndReason::Died(DeathCause::SelfCollision) => "GAME OVER: SELF",
            EndReason::Died(DeathCause::Boundary | DeathCause::Obstacle) => "GAME OVER: WALL",
            EndReason::TimeUp => "TIME UP",
            EndReason::BoardFilled => "VICTORY",
        }
    }
}

/// Characters allowed in a leaderboard name.
pub const NAME_CHARSET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of characters in a leaderboard name.
pub const NAME_LENGTH: usize = 3;

/// Three-character leaderboard name drawn from [`NAME_CHARSET`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PlayerName(String);

impl PlayerName {
    /// Creates a name when the input already satisfies the charset and length.
    #[must_use]
    pub fn new(raw: &str) -> Option<Self> {
        let valid = raw.chars().count() == NAME_LENGTH && raw.chars().all(is_name_char);
        valid.then(|| Self(raw.to_owned()))
    }

    /// Coerces arbitrary input into a valid name.
    ///
    /// Input is uppercased, characters outside the charset become `A`, and a
    /// wrong length falls back to `AAA`.
    #[must_use]
    pub fn sanitize(raw: &str) -> Self {
        let upper = raw.to_uppercase();
        if upper.chars().count() != NAME_LENGTH {
            return Self::default();
        }
        let name = upper
            .chars()
            .map(|ch| if is_name_char(ch) { ch } else { 'A' })
            .collect();
        Self(name)
    }

    /// Borrowed textual form of the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlayerName {
    fn default() -> Self {
        Self("AAA".to_owned())
    }
}

impl From<String> for PlayerName {
    fn from(raw: String) -> Self {
        Self::sanitize(&raw)
    }
}

impl From<PlayerName> for String {
    fn from(name: PlayerName) -> Self {
        name.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_name_char(ch: char) -> bool {
    NAME_CHARSET.contains(ch)
}

/// Single row of a leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Name entered by the player.
    pub name: PlayerName,
    /// Final score of the round.
    pub score: u32,
    /// Moment the entry was recorded, with second precision.
    #[serde(alias = "ts")]
    pub timestamp: DateTime<Utc>,
}

impl HighScoreEntry {
    /// Creates an entry, truncating the timestamp to whole seconds.
    #[must_use]
    pub fn new(name: PlayerName, score: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            name,
            score,
            timestamp: timestamp.trunc_subsecs(0),
        }
    }
}

/// Version written into every persisted record.
pub const RECORD_VERSION: u32 = 1;

/// Persisted form of every leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    /// Format version of the record.
    #[serde(default = "record_version")]
    pub version: u32,
    /// Classic leaderboard.
    #[serde(default)]
    pub classic: Vec<HighScoreEntry>,
    /// Boxed leaderboard.
    #[serde(default)]
    pub boxed: Vec<HighScoreEntry>,
    /// Maze leaderboard.
    #[serde(default)]
    pub maze: Vec<HighScoreEntry>,
    /// TimeAttack leaderboard.
    #[serde(default)]
    pub time_attack: Vec<HighScoreEntry>,
}

impl Default for HighScoreRecord {
    fn default() -> Self {
        Self {
            version: RECORD_VERSION,
            classic: Vec::new(),
            boxed: Vec::new(),
            maze: Vec::new(),
            time_attack: Vec::new(),
        }
    }
}

impl HighScoreRecord {
    /// Entries stored for the provided mode.
    #[must_use]
    pub fn entries(&self, mode: Mode) -> &[HighScoreEntry] {
        match mode {
            Mode::Classic => &self.classic,
            Mode::Boxed => &self.boxed,
            Mode::Maze => &self.maze,
            Mode::TimeAttack => &self.time_attack,
        }
    }
}

const fn record_version() -> u32 {
    RECORD_VERSION
}

/// Smallest window scale factor.
pub const MIN_SCALE: u32 = 3;
/// Largest window scale factor.
pub const MAX_SCALE: u32 = 6;
/// Scale factor used when nothing else is configured.
pub const DEFAULT_SCALE: u32 = 4;
/// Increment applied by the options scene to a volume slider.
pub const VOLUME_STEP: f32 = 0.05;

const DEFAULT_MUSIC_VOLUME: f32 = 0.70;
const DEFAULT_SFX_VOLUME: f32 = 0.80;

/// Player-adjustable presentation settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Format version of the record.
    pub version: u32,
    /// Integer window scale factor, between [`MIN_SCALE`] and [`MAX_SCALE`].
    #[serde(deserialize_with = "deserialize_scale")]
    pub scale: u32,
    /// Whether the window covers the whole display.
    pub fullscreen: bool,
    /// Music volume in the range 0.0..=1.0.
    pub music_volume: f32,
    /// Sound-effect volume in the range 0.0..=1.0.
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: RECORD_VERSION,
            scale: DEFAULT_SCALE,
            fullscreen: false,
            music_volume: DEFAULT_MUSIC_VOLUME,
            sfx_volume: DEFAULT_SFX_VOLUME,
        }
    }
}

impl Settings {
    /// Clamps every field into its valid range.
    ///
    /// Returns the names of the fields that had to be adjusted.
    pub fn normalize(&mut self) -> Vec<&'static str> {
        let mut adjusted = Vec::new();

        let scale = clamp_scale(i64::from(self.scale));
        if scale != self.scale {
            self.scale = scale;
            adjusted.push("scale");
        }

        let music = clamp_volume(self.music_volume, DEFAULT_MUSIC_VOLUME);
        if music.to_bits() != self.music_volume.to_bits() {
            self.music_volume = music;
            adjusted.push("music_volume");
        }

        let sfx = clamp_volume(self.sfx_volume, DEFAULT_SFX_VOLUME);
        if sfx.to_bits() != self.sfx_volume.to_bits() {
            self.sfx_volume = sfx;
            adjusted.push("sfx_volume");
        }

        if self.version != RECORD_VERSION {
            self.version = RECORD_VERSION;
            adjusted.push("version");
        }

        adjusted
    }

    /// Moves the scale factor by `steps`, staying within range.
    pub fn step_scale(&mut self, steps: i32) {
        self.scale = clamp_scale(i64::from(self.scale) + i64::from(steps));
    }

    /// Moves the music volume by `steps` increments of [`VOLUME_STEP`].
    pub fn step_music_volume(&mut self, steps: i32) {
        self.music_volume = step_volume(self.music_volume, steps);
    }

    /// Moves the sound-effect volume by `steps` increments of [`VOLUME_STEP`].
    pub fn step_sfx_volume(&mut self, steps: i32) {
        self.sfx_volume = step_volume(self.sfx_volume, steps);
    }
}

// Negative scales saturate to zero so `normalize` can clamp and report them.
fn deserialize_scale<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(u32::try_from(raw.max(0)).unwrap_or(u32::MAX))
}

/// Clamps an arbitrary requested scale into the supported range.
#[must_use]
pub fn clamp_scale(requested: i64) -> u32 {
    let clamped = requested.clamp(i64::from(MIN_SCALE), i64::from(MAX_SCALE));
    u32::try_from(clamped).unwrap_or(DEFAULT_SCALE)
}

fn clamp_volume(volume: f32, fallback: f32) -> f32 {
    if volume.is_nan() {
        fallback
    } else {
        volume.clamp(0.0, 1.0)
    }
}

fn step_volume(volume: f32, steps: i32) -> f32 {
    let stepped = volume + VOLUME_STEP * steps as f32;
    // Snap to the slider grid so repeated steps do not drift.
    ((stepped / VOLUME_STEP).round() * VOLUME_STEP).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::{
        speed_curve, Cell, Direction, Grid, HighScoreEntry, Mode, PlayerName, Settings,
        MAX_SCALE, MIN_SCALE,
    };
    use chrono::{TimeZone, Utc};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn opposite_directions_pair_up() {
        for direction in Direction::ALL {
            assert_ne!(direction, direction.opposite());
            assert_eq!(direction, direction.opposite().opposite());
        }
    }

    #[test]
    fn wrap_reenters_from_opposite_edges() {
        assert_eq!(Grid::wrap(Cell::new(16, 5)), Cell::new(0, 5));
        assert_eq!(Grid::wrap(Cell::new(-1, 5)), Cell::new(15, 5));
        assert_eq!(Grid::wrap(Cell::new(4, 14)), Cell::new(4, 0));
        assert_eq!(Grid::wrap(Cell::new(4, -1)), Cell::new(4, 13));
        assert_eq!(Grid::wrap(Cell::new(7, 7)), Cell::new(7, 7));
    }

    #[test]
    fn in_bounds_rejects_every_edge() {
        assert!(Grid::in_bounds(Cell::new(0, 0)));
        assert!(Grid::in_bounds(Cell::new(15, 13)));
        assert!(!Grid::in_bounds(Cell::new(16, 0)));
        assert!(!Grid::in_bounds(Cell::new(0, 14)));
        assert!(!Grid::in_bounds(Cell::new(-1, 0)));
        assert!(!Grid::in_bounds(Cell::new(0, -1)));
    }

    #[test]
    fn grid_cells_cover_every_index_once() {
        let indices: Vec<usize> = Grid::cells().filter_map(Grid::index).collect();
        assert_eq!(indices.len(), Grid::CELL_COUNT);
        assert!(indices.iter().enumerate().all(|(expected, index)| expected == *index));
    }

    #[test]
    fn speed_curve_saturates() {
        assert_eq!(speed_curve(0), 8.0);
        assert_eq!(speed_curve(24), 14.0);
        assert_eq!(speed_curve(100), 14.0);

        let mut previous = speed_curve(0);
        for foods in 1..200 {
            let current = speed_curve(foods);
            assert!(current >= previous, "speed curve dipped at {foods}");
            previous = current;
        }
    }

    #[test]
    fn player_names_are_sanitized() {
        assert_eq!(PlayerName::sanitize("abc").as_str(), "ABC");
        assert_eq!(PlayerName::sanitize("a-9").as_str(), "AA9");
        assert_eq!(PlayerName::sanitize("TOOLONG").as_str(), "AAA");
        assert_eq!(PlayerName::sanitize("").as_str(), "AAA");
        assert!(PlayerName::new("Z3Q").is_some());
        assert!(PlayerName::new("z3q").is_none());
    }

    #[test]
    fn settings_normalize_reports_clamped_fields() {
        let mut settings = Settings {
            scale: 11,
            music_volume: 1.5,
            sfx_volume: f32::NAN,
            ..Settings::default()
        };

        let adjusted = settings.normalize();

        assert_eq!(adjusted, vec!["scale", "music_volume", "sfx_volume"]);
        assert_eq!(settings.scale, MAX_SCALE);
        assert_eq!(settings.music_volume, 1.0);
        assert_eq!(settings.sfx_volume, Settings::default().sfx_volume);
    }

    #[test]
    fn negative_saved_scale_is_clamped_not_rejected() {
        let mut settings: Settings =
            serde_json::from_str(r#"{ "scale": -1, "fullscreen": true }"#).expect("deserialize");

        assert_eq!(settings.normalize(), vec!["scale"]);
        assert_eq!(settings.scale, MIN_SCALE);
        assert!(settings.fullscreen);
    }

    #[test]
    fn settings_steps_stay_in_range() {
        let mut settings = Settings::default();
        settings.step_scale(-10);
        assert_eq!(settings.scale, MIN_SCALE);

        settings.step_music_volume(100);
        assert_eq!(settings.music_volume, 1.0);

        settings.step_sfx_volume(-1);
        assert!((settings.sfx_volume - 0.75).abs() < 1e-6);
    }

    #[test]
    fn cell_round_trips_through_bincode() {
        assert_round_trip(&Cell::new(-1, 13));
    }

    #[test]
    fn mode_round_trips_through_bincode() {
        for mode in Mode::ALL {
            assert_round_trip(&mode);
        }
    }

    #[test]
    fn high_score_entry_uses_iso_timestamps() {
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let entry = HighScoreEntry::new(PlayerName::sanitize("SNK"), 120, timestamp);

        let json = serde_json::to_string(&entry).expect("serialize");
        assert_eq!(
            json,
            r#"{"name":"SNK","score":120,"timestamp":"2024-05-01T12:30:00Z"}"#
        );

        let legacy = r#"{"name":"abc","score":5,"ts":"2024-05-01T12:30:00Z"}"#;
        let restored: HighScoreEntry = serde_json::from_str(legacy).expect("deserialize");
        assert_eq!(restored.name.as_str(), "ABC");
        assert_eq!(restored.timestamp, timestamp);
    }
}
