#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Serpents Per Second.
//!
//! The game has no sound output yet, so macroquad is built without its
//! `audio` feature.
//!
//! The adapter only decodes physical keys into logical [`Command`] values and
//! draws whatever [`Scene`] the update callback leaves behind; it has no
//! knowledge of rounds or menus.

use anyhow::{ensure, Result};
use glam::Vec2;
use macroquad::input::{is_key_pressed, KeyCode};
use serpents_core::{Command, Direction};
use serpents_rendering::{
    palette, BoardPresentation, Color, DisplayRequest, FrameControl, FrameInput, Panel,
    Presentation, RenderingBackend, Scene, CANVAS_HEIGHT, CANVAS_WIDTH,
};
use std::{collections::VecDeque, time::Duration};
use tracing::{debug, info};

/// Physical keys and the logical command each one produces, in polling order.
pub const KEY_BINDINGS: [(KeyCode, Command); 14] = [
    (KeyCode::Up, steer(Direction::Up)),
    (KeyCode::W, steer(Direction::Up)),
    (KeyCode::Down, steer(Direction::Down)),
    (KeyCode::S, steer(Direction::Down)),
    (KeyCode::Left, steer(Direction::Left)),
    (KeyCode::A, steer(Direction::Left)),
    (KeyCode::Right, steer(Direction::Right)),
    (KeyCode::D, steer(Direction::Right)),
    (KeyCode::Enter, Command::Confirm),
    (KeyCode::KpEnter, Command::Confirm),
    (KeyCode::Space, Command::Confirm),
    (KeyCode::Escape, Command::Cancel),
    (KeyCode::Backspace, Command::Cancel),
    (KeyCode::P, Command::Pause),
];

const fn steer(direction: Direction) -> Command {
    Command::Steer { direction }
}

/// Decodes the keys reported as pressed this frame into logical commands.
///
/// Commands follow [`KEY_BINDINGS`] order and a command bound to several
/// pressed keys is reported once.
pub fn decode_commands<F>(mut is_pressed: F) -> FrameInput
where
    F: FnMut(KeyCode) -> bool,
{
    let mut commands = Vec::new();
    for (key, command) in KEY_BINDINGS {
        if is_pressed(key) && !commands.contains(&command) {
            commands.push(command);
        }
    }
    FrameInput { commands }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            match self.frame_times.pop_front() {
                Some(removed) => {
                    self.window_duration = self.window_duration.saturating_sub(removed);
                }
                None => break,
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;
        ensure!(
            scene.display.scale > 0,
            "display scale must be positive (received {})",
            scene.display.scale
        );

        let (window_width, window_height) = scene.display.window_size();
        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window_width)?,
            window_height: i32::try_from(window_height)?,
            fullscreen: scene.display.fullscreen,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        info!(
            window_width,
            window_height,
            fullscreen = scene.display.fullscreen,
            "opening window"
        );

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut applied_display = scene.display;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = decode_commands(is_key_pressed);

                if update_scene(frame_dt, frame_input, &mut scene) == FrameControl::Exit {
                    info!("closing window");
                    break;
                }

                if scene.display != applied_display {
                    apply_display(applied_display, scene.display);
                    applied_display = scene.display;
                }

                macroquad::window::clear_background(background);
                let metrics = CanvasMetrics::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                if let Some(board) = &scene.board {
                    draw_board(board, &metrics);
                }
                draw_panel(&scene.panel, scene.board.is_some(), &metrics);

                if let Some(FpsMetrics {
                    per_second,
                    trailing_ten_seconds,
                }) = fps_counter.record_frame(frame_dt)
                {
                    if show_fps {
                        info!(fps = per_second, fps_10s = trailing_ten_seconds, "frame rate");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn apply_display(previous: DisplayRequest, requested: DisplayRequest) {
    debug!(?previous, ?requested, "display changed");
    if requested.fullscreen != previous.fullscreen {
        macroquad::window::set_fullscreen(requested.fullscreen);
    }
    if requested.scale != previous.scale && !requested.fullscreen {
        let (width, height) = requested.window_size();
        macroquad::window::request_new_screen_size(width as f32, height as f32);
    }
}

/// Placement of the base canvas inside the actual window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CanvasMetrics {
    scale: f32,
    offset: Vec2,
    size: Vec2,
}

impl CanvasMetrics {
    fn new(screen_width: f32, screen_height: f32) -> Self {
        let canvas = Vec2::new(CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32);
        let scale = (screen_width / canvas.x).min(screen_height / canvas.y).max(0.0);
        let size = canvas * scale;
        let offset = ((Vec2::new(screen_width, screen_height) - size) * 0.5).max(Vec2::ZERO);

        Self {
            scale,
            offset,
            size,
        }
    }

    /// Maps a canvas-space position to window pixels.
    fn project(&self, position: Vec2) -> Vec2 {
        self.offset + position * self.scale
    }
}

fn draw_board(board: &BoardPresentation, metrics: &CanvasMetrics) {
    let origin = metrics.project(Vec2::ZERO);
    let cell_step = board.cell_length * metrics.scale;
    if cell_step <= f32::EPSILON {
        return;
    }

    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        board.width() * metrics.scale,
        board.height() * metrics.scale,
        to_macroquad_color(palette::BOARD),
    );
    draw_grid_lines(board, metrics);

    for wall in &board.walls {
        fill_cell(board, metrics, wall.column, wall.row, wall.color, 0.0);
    }
    for (index, segment) in board.snake.iter().enumerate() {
        let inset = if index == 0 { 0.0 } else { 0.06 };
        fill_cell(board, metrics, segment.column, segment.row, segment.color, inset);
    }
    if let Some(food) = board.food {
        let inset = if food.frame == 0 { 0.18 } else { 0.28 };
        fill_cell(
            board,
            metrics,
            food.cell.column,
            food.cell.row,
            food.cell.color,
            inset,
        );
    }

    if board.bordered {
        macroquad::shapes::draw_rectangle_lines(
            origin.x,
            origin.y,
            board.width() * metrics.scale,
            board.height() * metrics.scale,
            metrics.scale.max(1.0) * 2.0,
            to_macroquad_color(palette::WALL),
        );
    }
}

fn draw_grid_lines(board: &BoardPresentation, metrics: &CanvasMetrics) {
    let color = to_macroquad_color(palette::GRID_LINE);
    let top_left = metrics.project(Vec2::ZERO);
    let bottom_right = metrics.project(Vec2::new(board.width(), board.height()));

    for column in 1..board.columns {
        let x = metrics.project(board.cell_origin(column, 0)).x;
        macroquad::shapes::draw_line(x, top_left.y, x, bottom_right.y, 1.0, color);
    }
    for row in 1..board.rows {
        let y = metrics.project(board.cell_origin(0, row)).y;
        macroquad::shapes::draw_line(top_left.x, y, bottom_right.x, y, 1.0, color);
    }
}

/// Fills a cell, shrinking it by `inset` cell lengths on each side.
fn fill_cell(
    board: &BoardPresentation,
    metrics: &CanvasMetrics,
    column: u32,
    row: u32,
    color: Color,
    inset: f32,
) {
    let inset = board.cell_length * inset;
    let corner = metrics.project(board.cell_origin(column, row) + Vec2::splat(inset));
    let side = (board.cell_length - 2.0 * inset).max(0.0) * metrics.scale;
    macroquad::shapes::draw_rectangle(corner.x, corner.y, side, side, to_macroquad_color(color));
}

const TITLE_SIZE: f32 = 24.0;
const LINE_SIZE: f32 = 12.0;
const HUD_SIZE: f32 = 10.0;

fn draw_panel(panel: &Panel, over_board: bool, metrics: &CanvasMetrics) {
    if let Some(hud) = &panel.hud {
        let position = metrics.project(Vec2::new(4.0, HUD_SIZE + 2.0));
        macroquad::text::draw_text(
            hud,
            position.x,
            position.y,
            HUD_SIZE * metrics.scale,
            to_macroquad_color(palette::TEXT),
        );
    }

    if panel.title.is_empty() && panel.lines.is_empty() {
        return;
    }

    if over_board {
        macroquad::shapes::draw_rectangle(
            metrics.offset.x,
            metrics.offset.y,
            metrics.size.x,
            metrics.size.y,
            to_macroquad_color(palette::SCRIM),
        );
    }

    let mut baseline = 56.0;
    draw_centered(&panel.title, baseline, TITLE_SIZE, palette::HIGHLIGHT, metrics);
    baseline += TITLE_SIZE + 8.0;
    for line in &panel.lines {
        let color = if line.highlighted {
            palette::HIGHLIGHT
        } else {
            palette::TEXT
        };
        let text = if line.highlighted {
            format!("> {} <", line.text)
        } else {
            line.text.clone()
        };
        draw_centered(&text, baseline, LINE_SIZE, color, metrics);
        baseline += LINE_SIZE + 4.0;
    }
}

fn draw_centered(text: &str, baseline: f32, size: f32, color: Color, metrics: &CanvasMetrics) {
    if text.is_empty() {
        return;
    }
    let font_size = size * metrics.scale;
    let dimensions = macroquad::text::measure_text(text, None, font_size as u16, 1.0);
    let y = metrics.project(Vec2::new(0.0, baseline)).y;
    let x = metrics.offset.x + (metrics.size.x - dimensions.width) * 0.5;
    macroquad::text::draw_text(text, x, y, font_size, to_macroquad_color(color));
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
