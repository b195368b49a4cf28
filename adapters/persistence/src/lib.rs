#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! JSON records for settings and leaderboards stored in the data directory.
//!
//! Loading never fails: missing files yield defaults and malformed files are
//! reported as [`PersistenceError::InvalidPersistedRecord`], logged, and
//! replaced by defaults. Saving writes a sibling `.tmp` file and renames it
//! over the target so a crash never leaves a half-written record behind.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result as AnyResult};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use serpents_core::{HighScoreEntry, HighScoreRecord, Mode, Settings, RECORD_VERSION};
use serpents_system_leaderboard::HighScoreTable;
use tracing::{debug, info, warn};

/// File holding the player's settings.
pub const SETTINGS_FILE: &str = "settings.json";
/// File holding every leaderboard.
pub const HIGH_SCORES_FILE: &str = "highscores.json";
/// File receiving the application log.
pub const LOG_FILE: &str = "app.log";

/// Failures while reading or writing a persisted record.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The file could not be read, written or renamed.
    #[error("i/o failure on {path}")]
    Io {
        /// File involved in the failure.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The file exists but does not hold a record this build understands.
    #[error("invalid persisted record in {path}")]
    InvalidPersistedRecord {
        /// File holding the record.
        path: PathBuf,
        /// Parse failure reported by the decoder.
        #[source]
        source: serde_json::Error,
    },
    /// The record could not be encoded.
    #[error("failed to encode record for {path}")]
    Encode {
        /// File the record was destined for.
        path: PathBuf,
        /// Encoder failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Directory that holds every persisted file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveLocation {
    dir: PathBuf,
}

impl SaveLocation {
    /// Uses `dir` as the data directory without touching the filesystem.
    #[must_use]
    pub fn new<P>(dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self { dir: dir.into() }
    }

    /// Resolves the data directory and makes sure it exists.
    ///
    /// `override_dir` wins over the platform's per-user data directory.
    pub fn resolve(override_dir: Option<PathBuf>) -> AnyResult<Self> {
        let dir = match override_dir {
            Some(dir) => dir,
            None => ProjectDirs::from("com", "SerpentsPerSecond", "SerpentsPerSecond")
                .context("could not resolve the user data directory")?
                .data_dir()
                .to_path_buf(),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;

        Ok(Self::new(dir))
    }

    /// Data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the settings record.
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    /// Path of the leaderboard record.
    #[must_use]
    pub fn high_scores_path(&self) -> PathBuf {
        self.dir.join(HIGH_SCORES_FILE)
    }

    /// Path of the application log.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE)
    }

    /// Loads the settings, falling back to defaults on any failure.
    ///
    /// Out-of-range values are clamped and reported with a warning.
    #[must_use]
    pub fn load_settings(&self) -> Settings {
        let path = self.settings_path();
        let mut settings = match read_record::<Settings>(&path) {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                info!(path = %path.display(), "no settings saved yet, using defaults");
                return Settings::default();
            }
            Err(error) => {
                warn!(%error, cause = ?std::error::Error::source(&error), "using default settings");
                return Settings::default();
            }
        };

        let adjusted = settings.normalize();
        if !adjusted.is_empty() {
            warn!(path = %path.display(), ?adjusted, "clamped out-of-range settings");
        }
        settings
    }

    /// Writes the settings record.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), PersistenceError> {
        let record = Settings {
            version: RECORD_VERSION,
            ..*settings
        };
        write_record(&self.settings_path(), &record)
    }

    /// Loads every leaderboard, falling back to empty ones on any failure.
    ///
    /// Each mode's list is read on its own and malformed entries are skipped
    /// with a warning, so one bad row never costs the other leaderboards.
    #[must_use]
    pub fn load_high_scores(&self) -> HighScoreTable {
        let path = self.high_scores_path();
        match read_record::<Value>(&path) {
            Ok(Some(value)) => high_scores_from_json(&path, &value),
            Ok(None) => {
                info!(path = %path.display(), "no high scores saved yet");
                HighScoreTable::new()
            }
            Err(error) => {
                warn!(%error, cause = ?std::error::Error::source(&error), "using empty high scores");
                HighScoreTable::new()
            }
        }
    }

    /// Writes every leaderboard.
    pub fn save_high_scores(&self, table: &HighScoreTable) -> Result<(), PersistenceError> {
        write_record(&self.high_scores_path(), &table.to_record())
    }
}

fn high_scores_from_json(path: &Path, value: &Value) -> HighScoreTable {
    let Some(fields) = value.as_object() else {
        warn!(path = %path.display(), "high score record is not an object, using empty high scores");
        return HighScoreTable::new();
    };

    let version = fields
        .get("version")
        .and_then(Value::as_u64)
        .unwrap_or(u64::from(RECORD_VERSION));
    if version != u64::from(RECORD_VERSION) {
        warn!(version, "unexpected high score record version");
    }

    HighScoreTable::from_record(HighScoreRecord {
        version: RECORD_VERSION,
        classic: mode_entries(fields, Mode::Classic),
        boxed: mode_entries(fields, Mode::Boxed),
        maze: mode_entries(fields, Mode::Maze),
        time_attack: mode_entries(fields, Mode::TimeAttack),
    })
}

fn mode_entries(fields: &Map<String, Value>, mode: Mode) -> Vec<HighScoreEntry> {
    let Some(list) = fields.get(record_key(mode)) else {
        return Vec::new();
    };
    let Some(items) = list.as_array() else {
        warn!(?mode, "leaderboard is not a list, skipping it");
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match HighScoreEntry::deserialize(item) {
            Ok(entry) => Some(entry),
            Err(error) => {
                warn!(?mode, index, %error, "skipping malformed high score entry");
                None
            }
        })
        .collect()
}

const fn record_key(mode: Mode) -> &'static str {
    match mode {
        Mode::Classic => "classic",
        Mode::Boxed => "boxed",
        Mode::Maze => "maze",
        Mode::TimeAttack => "time_attack",
    }
}

/// Reads a JSON record, returning `None` when the file does not exist.
pub fn read_record<T>(path: &Path) -> Result<Option<T>, PersistenceError>
where
    T: DeserializeOwned,
{
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| PersistenceError::InvalidPersistedRecord {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes a pretty-printed JSON record atomically.
///
/// The record goes to a sibling `.tmp` file which is flushed and synced
/// before being renamed over `path`. The temporary file is removed when any
/// step fails.
pub fn write_record<T>(path: &Path, record: &T) -> Result<(), PersistenceError>
where
    T: Serialize,
{
    let staging = staging_path(path);
    let result = write_staged(&staging, record).and_then(|()| {
        fs::rename(&staging, path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })
    });

    if result.is_err() {
        let _ = fs::remove_file(&staging);
    } else {
        debug!(path = %path.display(), "record saved");
    }
    result
}

fn write_staged<T>(staging: &Path, record: &T) -> Result<(), PersistenceError>
where
    T: Serialize,
{
    let io_error = |source| PersistenceError::Io {
        path: staging.to_path_buf(),
        source,
    };

    let file = File::create(staging).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, record).map_err(|source| {
        PersistenceError::Encode {
            path: staging.to_path_buf(),
            source,
        }
    })?;
    writer.write_all(b"\n").map_err(io_error)?;
    let file = writer
        .into_inner()
        .map_err(|error| io_error(error.into_error()))?;
    file.sync_all().map_err(io_error)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
