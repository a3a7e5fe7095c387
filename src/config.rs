use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "backdrop",
    version,
    about = "Procedural animated backdrop (waves, silk, topographic contours) in the terminal"
)]
pub struct Config {
    /// Theme tag: waves, silk or contour. Unknown tags fall back to waves.
    #[arg(long, default_value = "waves")]
    pub theme: String,

    /// Colour preset tag: indigo, ocean, teal or sunset. Unknown tags fall back to indigo.
    #[arg(long, default_value = "indigo")]
    pub preset: String,

    /// Take over the terminal's default background colour while running.
    #[arg(long, default_value_t = false)]
    pub fixed: bool,

    /// Device pixel density; clamped to [1, 2].
    #[arg(long, default_value_t = 1.0)]
    pub density: f32,

    /// Logical pixels per terminal half-cell.
    #[arg(long, default_value_t = 4)]
    pub pixel_scale: u16,

    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Fixed seed for noise, particles and grain.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub hud: bool,

    /// Write logs here; nothing is logged without it since stderr shares the screen.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }
}

impl Config {
    /// Logical pixels per terminal half-cell, never zero.
    pub fn pixel_scale(&self) -> f32 {
        self.pixel_scale.max(1) as f32
    }

    pub fn frame_budget(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(1.0 / self.fps.clamp(1, 240) as f32)
    }
}
