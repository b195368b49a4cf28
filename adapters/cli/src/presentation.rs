//! Translates the scene machine's view into backend-agnostic frames.

use serpents_core::{Cell, Grid, HighScoreEntry, Mode, Settings, GAME_TITLE, NAME_LENGTH};
use serpents_rendering::{
    palette, BoardPresentation, CellPresentation, Color, DisplayRequest, FoodPresentation, Panel,
    PanelLine, Scene, CELL_PIXELS,
};
use serpents_system_leaderboard::MAX_ENTRIES;
use serpents_system_scenes::{
    MenuItem, ModeSelectItem, NameEntry, OptionsItem, RoundSummary, SceneView,
};
use serpents_world::{query, RoundState};

/// Builds the frame for the active scene.
pub(crate) fn build_scene(view: SceneView<'_>, display: DisplayRequest) -> Scene {
    let (board, panel) = match view {
        SceneView::Menu { selected } => (None, menu_panel(selected)),
        SceneView::ModeSelect { selected } => (None, mode_select_panel(selected)),
        SceneView::Options { selected, settings } => (None, options_panel(selected, settings)),
        SceneView::Playing { round } => (
            board(round),
            Panel {
                hud: Some(hud(round)),
                ..Panel::default()
            },
        ),
        SceneView::Paused { round } => (
            board(round),
            Panel {
                title: "PAUSED".to_owned(),
                lines: vec![
                    PanelLine::plain("P  RESUME"),
                    PanelLine::plain("ESC  MENU"),
                ],
                hud: Some(hud(round)),
            },
        ),
        SceneView::GameOver { summary } => (None, game_over_panel(summary)),
        SceneView::HighScoreEntry { entry } => (None, name_entry_panel(entry)),
        SceneView::Leaderboard { mode, entries } => (None, leaderboard_panel(mode, entries)),
    };

    Scene::new(board, panel, display)
}

fn menu_panel(selected: MenuItem) -> Panel {
    Panel {
        title: GAME_TITLE.to_uppercase(),
        lines: MenuItem::ALL
            .iter()
            .map(|item| PanelLine::selectable(item.label(), *item == selected))
            .collect(),
        hud: None,
    }
}

fn mode_select_panel(selected: ModeSelectItem) -> Panel {
    Panel {
        title: "SELECT MODE".to_owned(),
        lines: ModeSelectItem::ALL
            .iter()
            .map(|item| PanelLine::selectable(item.label(), *item == selected))
            .collect(),
        hud: None,
    }
}

fn options_panel(selected: OptionsItem, settings: &Settings) -> Panel {
    let lines = OptionsItem::ALL
        .iter()
        .map(|item| {
            let text = match item {
                OptionsItem::Scale => format!("{}  {}X", item.label(), settings.scale),
                OptionsItem::Fullscreen => format!(
                    "{}  {}",
                    item.label(),
                    if settings.fullscreen { "ON" } else { "OFF" }
                ),
                OptionsItem::MusicVolume => {
                    format!("{}  {}%", item.label(), percent(settings.music_volume))
                }
                OptionsItem::SfxVolume => {
                    format!("{}  {}%", item.label(), percent(settings.sfx_volume))
                }
                OptionsItem::Back => item.label().to_owned(),
            };
            PanelLine::selectable(text, *item == selected)
        })
        .collect();

    Panel {
        title: "OPTIONS".to_owned(),
        lines,
        hud: None,
    }
}

fn percent(volume: f32) -> u32 {
    (volume.clamp(0.0, 1.0) * 100.0).round() as u32
}

fn game_over_panel(summary: &RoundSummary) -> Panel {
    let mut lines = vec![
        PanelLine::plain(format!("MODE  {}", summary.mode.label())),
        PanelLine::plain(format!("SCORE  {}", summary.score)),
        PanelLine::plain(format!("FOOD  {}", summary.foods_eaten)),
    ];
    if summary.qualifies {
        lines.push(PanelLine::selectable("NEW HIGH SCORE!", true));
    }
    lines.push(PanelLine::plain("ENTER TO CONTINUE"));

    Panel {
        title: summary.reason.title().to_owned(),
        lines,
        hud: None,
    }
}

fn name_entry_panel(entry: &NameEntry) -> Panel {
    let name = entry.name();
    let spelled: Vec<String> = name
        .as_str()
        .chars()
        .take(NAME_LENGTH)
        .enumerate()
        .map(|(index, ch)| {
            if index == entry.cursor() {
                format!("[{ch}]")
            } else {
                format!(" {ch} ")
            }
        })
        .collect();

    Panel {
        title: "NEW HIGH SCORE".to_owned(),
        lines: vec![
            PanelLine::plain(format!("{}  {}", entry.mode().label(), entry.score())),
            PanelLine::selectable(spelled.concat(), true),
            PanelLine::plain("ENTER TO SAVE"),
        ],
        hud: None,
    }
}

fn leaderboard_panel(mode: Mode, entries: &[HighScoreEntry]) -> Panel {
    let mut lines = vec![PanelLine::selectable(format!("< {} >", mode.label()), true)];
    if entries.is_empty() {
        lines.push(PanelLine::plain("NO SCORES YET"));
    }
    lines.extend(
        entries
            .iter()
            .take(MAX_ENTRIES)
            .enumerate()
            .map(|(rank, entry)| {
                PanelLine::plain(format!("{:>2}. {}  {:>6}", rank + 1, entry.name, entry.score))
            }),
    );

    Panel {
        title: "HIGH SCORES".to_owned(),
        lines,
        hud: None,
    }
}

fn hud(round: &RoundState) -> String {
    let mut text = format!(
        "{}  SCORE {}  LEN {}",
        query::mode(round).label(),
        query::score(round),
        query::snake(round).len()
    );
    if let Some(remaining) = query::time_remaining(round) {
        let seconds = remaining.as_secs_f32().ceil() as u32;
        text.push_str(&format!("  TIME {}:{:02}", seconds / 60, seconds % 60));
    }
    text
}

fn board(round: &RoundState) -> Option<BoardPresentation> {
    let mut board =
        BoardPresentation::new(Grid::COLUMNS as u32, Grid::ROWS as u32, CELL_PIXELS as f32).ok()?;
    board.bordered = query::mode(round) == Mode::Boxed;
    board.walls = query::walls(round)
        .iter()
        .filter_map(|wall| cell(*wall, palette::WALL))
        .collect();
    board.snake = query::snake(round)
        .cells()
        .enumerate()
        .filter_map(|(index, segment)| {
            let color = if index == 0 {
                palette::SNAKE_HEAD
            } else {
                palette::SNAKE_BODY
            };
            cell(segment, color)
        })
        .collect();
    board.food = query::food(round)
        .and_then(|food| cell(food, palette::FOOD))
        .map(|cell| FoodPresentation {
            cell,
            frame: query::food_frame(round),
        });
    Some(board)
}

fn cell(cell: Cell, color: Color) -> Option<CellPresentation> {
    let column = u32::try_from(cell.column()).ok()?;
    let row = u32::try_from(cell.row()).ok()?;
    Some(CellPresentation::new(column, row, color))
}
