use std::path::PathBuf;

use clap::{builder::BoolishValueParser, ArgAction, Parser};
use serpents_core::{clamp_scale, Settings};
use serpents_rendering::DisplayRequest;

/// Command-line and environment configuration.
#[derive(Debug, Parser)]
#[command(name = "serpents", version, about = "Serpents Per Second, a grid snake arcade game")]
pub(crate) struct CliArgs {
    /// Window scale factor (3-6) for this session, overriding the saved setting.
    #[arg(long, env = "SPS_FORCE_SCALE", allow_negative_numbers = true)]
    pub(crate) scale: Option<i64>,

    /// Forces windowed mode even when fullscreen is saved.
    #[arg(
        long,
        env = "SPS_FORCE_WINDOWED",
        value_parser = BoolishValueParser::new(),
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub(crate) windowed: bool,

    /// Log filter, e.g. `info` or `serpents_world=debug`.
    #[arg(long, env = "SPS_LOG_LEVEL", default_value = "info")]
    pub(crate) log_level: String,

    /// Directory holding settings, high scores and the log.
    #[arg(long, env = "SPS_DATA_DIR")]
    pub(crate) data_dir: Option<PathBuf>,

    /// Seed for every round of the session; random when omitted.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Renders as fast as possible instead of waiting for the display refresh.
    #[arg(long)]
    pub(crate) no_vsync: bool,

    /// Logs the frame rate once per second.
    #[arg(long)]
    pub(crate) show_fps: bool,
}

impl CliArgs {
    pub(crate) fn display_overrides(&self) -> DisplayOverrides {
        DisplayOverrides {
            scale: self.scale.map(clamp_scale),
            windowed: self.windowed,
        }
    }
}

/// Session-only display adjustments layered over the saved settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct DisplayOverrides {
    pub(crate) scale: Option<u32>,
    pub(crate) windowed: bool,
}

impl DisplayOverrides {
    pub(crate) fn apply(&self, settings: &Settings) -> DisplayRequest {
        DisplayRequest {
            scale: self.scale.unwrap_or(settings.scale),
            fullscreen: settings.fullscreen && !self.windowed,
        }
    }
}
