pub mod app;
pub mod canvas;
pub mod chain;
pub mod config;
pub mod contour;
pub mod error;
pub mod field;
pub mod noise;
pub mod particles;
pub mod render;
pub mod scene;
pub mod surface;
pub mod terminal;
pub mod theme;
pub mod waves;

pub use error::{BackdropError, Result};
pub use scene::FrameStats;
pub use surface::{Backdrop, BackdropOptions, Host, Lifecycle, OffscreenHost, SurfaceSize};
pub use theme::{PresetKind, Style, ThemeKind};
