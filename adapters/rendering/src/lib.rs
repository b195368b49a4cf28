#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Serpents Per Second adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use serpents_core::{Command, Grid};
use std::{error::Error, fmt, time::Duration};

/// Side length of a board cell on the unscaled canvas, in pixels.
pub const CELL_PIXELS: u32 = 16;

/// Width of the unscaled canvas in pixels.
pub const CANVAS_WIDTH: u32 = Grid::COLUMNS as u32 * CELL_PIXELS;

/// Height of the unscaled canvas in pixels.
pub const CANVAS_HEIGHT: u32 = Grid::ROWS as u32 * CELL_PIXELS;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with its alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Colors shared by every backend.
pub mod palette {
    use super::Color;

    /// Frame clear color.
    pub const BACKGROUND: Color = Color::from_rgb_u8(16, 20, 24);
    /// Board floor.
    pub const BOARD: Color = Color::from_rgb_u8(28, 36, 40);
    /// Faint cell separators.
    pub const GRID_LINE: Color = Color::from_rgb_u8(36, 46, 52);
    /// Maze obstacles and the boxed border.
    pub const WALL: Color = Color::from_rgb_u8(112, 96, 80);
    /// Snake head.
    pub const SNAKE_HEAD: Color = Color::from_rgb_u8(120, 220, 96);
    /// Snake body segments.
    pub const SNAKE_BODY: Color = Color::from_rgb_u8(64, 168, 72);
    /// Food.
    pub const FOOD: Color = Color::from_rgb_u8(232, 72, 64);
    /// Regular panel text.
    pub const TEXT: Color = Color::from_rgb_u8(220, 220, 210);
    /// Highlighted panel text.
    pub const HIGHLIGHT: Color = Color::from_rgb_u8(250, 210, 80);
    /// Backdrop behind panels drawn over the board.
    pub const SCRIM: Color = Color::new(0.0, 0.0, 0.0, 0.6);
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Logical commands decoded from key presses on this frame, in press order.
    pub commands: Vec<Command>,
}

/// Decision returned by the per-frame update callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep presenting frames.
    Continue,
    /// Close the window and return from [`RenderingBackend::run`].
    Exit,
}

/// Single board cell filled with a solid color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPresentation {
    /// Zero-based column of the cell.
    pub column: u32,
    /// Zero-based row of the cell.
    pub row: u32,
    /// Fill color.
    pub color: Color,
}

impl CellPresentation {
    /// Creates a new cell descriptor.
    #[must_use]
    pub const fn new(column: u32, row: u32, color: Color) -> Self {
        Self { column, row, color }
    }
}

/// Food marker with its animation frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoodPresentation {
    /// Cell holding the food.
    pub cell: CellPresentation,
    /// Animation frame, alternating between 0 and 1.
    pub frame: u8,
}

/// Play field drawn while a round is live.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardPresentation {
    /// Number of columns contained in the board.
    pub columns: u32,
    /// Number of rows contained in the board.
    pub rows: u32,
    /// Side length of a single cell expressed in canvas pixels.
    pub cell_length: f32,
    /// Whether the board edges are lethal and should be outlined.
    pub bordered: bool,
    /// Obstacle cells.
    pub walls: Vec<CellPresentation>,
    /// Snake cells ordered head first.
    pub snake: Vec<CellPresentation>,
    /// Food, absent once the board filled up.
    pub food: Option<FoodPresentation>,
}

impl BoardPresentation {
    /// Creates an empty board.
    ///
    /// Returns an error when the board has no area.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_length: f32,
    ) -> std::result::Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyBoard { columns, rows });
        }
        if cell_length <= f32::EPSILON {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
            bordered: false,
            walls: Vec::new(),
            snake: Vec::new(),
            food: None,
        })
    }

    /// Calculates the total width of the board.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Calculates the total height of the board.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// Top-left corner of a cell relative to the board origin.
    #[must_use]
    pub fn cell_origin(&self, column: u32, row: u32) -> Vec2 {
        Vec2::new(column as f32, row as f32) * self.cell_length
    }
}

/// Line of panel text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelLine {
    /// Text to draw.
    pub text: String,
    /// Whether the line is the current selection.
    pub highlighted: bool,
}

impl PanelLine {
    /// Creates a regular line.
    #[must_use]
    pub fn plain<T>(text: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            text: text.into(),
            highlighted: false,
        }
    }

    /// Creates a line that is highlighted when `highlighted` is set.
    #[must_use]
    pub fn selectable<T>(text: T, highlighted: bool) -> Self
    where
        T: Into<String>,
    {
        Self {
            text: text.into(),
            highlighted,
        }
    }
}

/// Text drawn over or instead of the board.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Panel {
    /// Heading, empty while playing.
    pub title: String,
    /// Body lines in display order.
    pub lines: Vec<PanelLine>,
    /// Status strip along the top edge, used during rounds.
    pub hud: Option<String>,
}

/// Window configuration the adapter should apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayRequest {
    /// Integer multiplier applied to the base canvas.
    pub scale: u32,
    /// Whether the window should cover the display.
    pub fullscreen: bool,
}

impl DisplayRequest {
    /// Window size in pixels for the requested scale.
    #[must_use]
    pub const fn window_size(&self) -> (u32, u32) {
        (CANVAS_WIDTH * self.scale, CANVAS_HEIGHT * self.scale)
    }
}

/// Scene description for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Board of the live round, if any.
    pub board: Option<BoardPresentation>,
    /// Text content of the frame.
    pub panel: Panel,
    /// Window configuration requested by the application.
    pub display: DisplayRequest,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(board: Option<BoardPresentation>, panel: Panel, display: DisplayRequest) -> Self {
        Self {
            board,
            panel,
            display,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed first.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Serpents Per Second scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the update callback asks it to exit
    /// or the window is closed.
    ///
    /// The provided `update_scene` closure receives the measured frame delta,
    /// the commands decoded on that frame, and rewrites the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Boards need at least one row and one column.
    EmptyBoard {
        /// Provided column count.
        columns: u32,
        /// Provided row count.
        rows: u32,
    },
    /// Cells must have a positive side length.
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBoard { columns, rows } => {
                write!(f, "board must have a positive area (received {columns}x{rows})")
            }
            Self::InvalidCellLength { cell_length } => {
                write!(f, "cell_length must be positive (received {cell_length})")
            }
        }
    }
}

impl Error for RenderingError {}
