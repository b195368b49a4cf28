#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots Serpents Per Second.

mod config;
mod logging;
mod presentation;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serpents_core::{Command, Event, GAME_TITLE};
use serpents_persistence::SaveLocation;
use serpents_rendering::{palette, FrameControl, FrameInput, Presentation, RenderingBackend};
use serpents_rendering_macroquad::MacroquadBackend;
use serpents_system_scenes::SceneMachine;
use tracing::{info, warn};

use self::config::{CliArgs, DisplayOverrides};

/// Entry point for the Serpents Per Second command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    let location = SaveLocation::resolve(args.data_dir.clone())?;
    logging::init(&location.log_path(), &args.log_level)?;

    let settings = location.load_settings();
    let high_scores = location.load_high_scores();
    let seed = args.seed.unwrap_or_else(rand::random);
    let overrides = args.display_overrides();
    info!(
        data_dir = %location.dir().display(),
        seed,
        ?overrides,
        "starting {GAME_TITLE}"
    );

    let machine = SceneMachine::new(settings, high_scores, seed);
    let display = overrides.apply(machine.settings());
    let first_scene = presentation::build_scene(machine.view(), display);
    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps);

    let mut session = Session {
        machine,
        location,
        overrides,
    };
    backend
        .run(
            Presentation::new(GAME_TITLE, palette::BACKGROUND, first_scene),
            move |dt, input, scene| session.frame(dt, input, scene),
        )
        .context("window loop failed")?;

    info!("shut down");
    Ok(())
}

/// Everything the frame callback owns between frames.
struct Session {
    machine: SceneMachine,
    location: SaveLocation,
    overrides: DisplayOverrides,
}

impl Session {
    fn frame(
        &mut self,
        dt: Duration,
        input: FrameInput,
        scene: &mut serpents_rendering::Scene,
    ) -> FrameControl {
        let mut events = Vec::new();
        for command in input.commands {
            self.machine.apply(command, &mut events);
        }
        self.machine.apply(Command::Tick { dt }, &mut events);

        let control = self.persist(&events);
        *scene = presentation::build_scene(
            self.machine.view(),
            self.overrides.apply(self.machine.settings()),
        );
        control
    }

    /// Saves records at the boundaries reported by the machine.
    fn persist(&self, events: &[Event]) -> FrameControl {
        let mut control = FrameControl::Continue;
        for event in events {
            match event {
                Event::SettingsChanged { settings } => {
                    if let Err(error) = self.location.save_settings(settings) {
                        warn!(%error, "failed to save settings");
                    }
                }
                Event::HighScoreRecorded { mode, rank } => {
                    info!(?mode, rank, "saving high scores");
                    if let Err(error) = self.location.save_high_scores(self.machine.high_scores()) {
                        warn!(%error, "failed to save high scores");
                    }
                }
                Event::QuitRequested => control = FrameControl::Exit,
                Event::SceneChanged { .. }
                | Event::RoundStarted { .. }
                | Event::FoodEaten { .. }
                | Event::RoundEnded { .. } => {}
            }
        }
        control
    }
}
