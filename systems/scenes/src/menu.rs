use serpents_core::{Mode, PlayerName, NAME_CHARSET, NAME_LENGTH};

/// Entries of the title menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MenuItem {
    /// Opens the mode picker.
    Play,
    /// Opens the settings editor.
    Options,
    /// Opens the leaderboards.
    HighScores,
    /// Asks the adapter to exit.
    Quit,
}

impl MenuItem {
    /// Items in display order.
    pub const ALL: [MenuItem; 4] = [
        MenuItem::Play,
        MenuItem::Options,
        MenuItem::HighScores,
        MenuItem::Quit,
    ];

    /// Text shown for the item.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            MenuItem::Play => "PLAY",
            MenuItem::Options => "OPTIONS",
            MenuItem::HighScores => "HIGH SCORES",
            MenuItem::Quit => "QUIT",
        }
    }

    pub(crate) fn at(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(MenuItem::Play)
    }

    pub(crate) fn index(self) -> usize {
        Self::ALL.iter().position(|item| *item == self).unwrap_or(0)
    }
}

/// Entries of the mode picker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModeSelectItem {
    /// Starts a round in the mode.
    Mode(Mode),
    /// Returns to the title menu.
    Back,
}

impl ModeSelectItem {
    /// Items in display order.
    pub const ALL: [ModeSelectItem; 5] = [
        ModeSelectItem::Mode(Mode::Classic),
        ModeSelectItem::Mode(Mode::Boxed),
        ModeSelectItem::Mode(Mode::Maze),
        ModeSelectItem::Mode(Mode::TimeAttack),
        ModeSelectItem::Back,
    ];

    /// Text shown for the item.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ModeSelectItem::Mode(mode) => mode.label(),
            ModeSelectItem::Back => "BACK",
        }
    }

    pub(crate) fn at(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(ModeSelectItem::Back)
    }
}

/// Entries of the settings editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionsItem {
    /// Window scale factor.
    Scale,
    /// Fullscreen toggle.
    Fullscreen,
    /// Music volume slider.
    MusicVolume,
    /// Sound-effect volume slider.
    SfxVolume,
    /// Returns to the title menu.
    Back,
}

impl OptionsItem {
    /// Items in display order.
    pub const ALL: [OptionsItem; 5] = [
        OptionsItem::Scale,
        OptionsItem::Fullscreen,
        OptionsItem::MusicVolume,
        OptionsItem::SfxVolume,
        OptionsItem::Back,
    ];

    /// Text shown for the item.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            OptionsItem::Scale => "SCALE",
            OptionsItem::Fullscreen => "FULLSCREEN",
            OptionsItem::MusicVolume => "MUSIC VOLUME",
            OptionsItem::SfxVolume => "SFX VOLUME",
            OptionsItem::Back => "BACK",
        }
    }

    pub(crate) fn at(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(OptionsItem::Back)
    }
}

/// Outcome of a finished round as shown on the game-over screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RoundSummary {
    /// Mode the round was played under.
    pub mode: Mode,
    /// Final score.
    pub score: u32,
    /// Foods eaten during the round.
    pub foods_eaten: u32,
    /// Why the round finished.
    pub reason: serpents_core::EndReason,
    /// Whether the score earns a leaderboard entry.
    pub qualifies: bool,
}

/// Three-character name being edited for a qualifying score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NameEntry {
    mode: Mode,
    score: u32,
    letters: [usize; NAME_LENGTH],
    cursor: usize,
}

impl NameEntry {
    pub(crate) fn new(mode: Mode, score: u32) -> Self {
        Self {
            mode,
            score,
            letters: [0; NAME_LENGTH],
            cursor: 0,
        }
    }

    /// Leaderboard the name will be recorded in.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Score being recorded.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Position of the character being edited.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Name as currently spelled.
    #[must_use]
    pub fn name(&self) -> PlayerName {
        let spelled: String = self
            .letters
            .iter()
            .filter_map(|index| NAME_CHARSET.chars().nth(*index))
            .collect();
        PlayerName::sanitize(&spelled)
    }

    pub(crate) fn cycle_letter(&mut self, forward: bool) {
        let charset_len = NAME_CHARSET.chars().count();
        if let Some(letter) = self.letters.get_mut(self.cursor) {
            *letter = cycle(*letter, charset_len, forward);
        }
    }

    pub(crate) fn move_cursor(&mut self, forward: bool) {
        self.cursor = if forward {
            (self.cursor + 1).min(NAME_LENGTH - 1)
        } else {
            self.cursor.saturating_sub(1)
        };
    }
}

/// Moves `index` one slot through a list of `len` items, wrapping at both ends.
pub(crate) fn cycle(index: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}
