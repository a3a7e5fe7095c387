//! Surface ownership, resize handling and the frame loop.
//!
//! The loop is cooperative: the host calls [`Backdrop::on_frame`] whenever a
//! frame it requested comes due, and the backdrop asks for the next one only
//! while it is still running.

use crate::canvas::{Canvas, Rgb};
use crate::error::{BackdropError, Result};
use crate::scene::{FrameStats, Scene};
use crate::theme::{PresetKind, Style, ThemeKind};
use std::time::Instant;

pub const MIN_DENSITY: f32 = 1.0;
pub const MAX_DENSITY: f32 = 2.0;

/// Host measurement: logical size plus device pixel density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
    pub density: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32, density: f32) -> Self {
        Self {
            width,
            height,
            density,
        }
    }

    pub fn clamped_density(&self) -> f32 {
        clamp_density(self.density)
    }

    /// Backing buffer size in device pixels.
    pub fn backing(&self) -> (usize, usize) {
        let d = self.clamped_density();
        (to_px(self.width * d), to_px(self.height * d))
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.width.is_finite()
            || !self.height.is_finite()
    }
}

pub fn clamp_density(density: f32) -> f32 {
    if density.is_finite() {
        density.clamp(MIN_DENSITY, MAX_DENSITY)
    } else {
        MIN_DENSITY
    }
}

fn to_px(v: f32) -> usize {
    if v.is_finite() && v > 0.0 {
        v.round() as usize
    } else {
        0
    }
}

/// Everything the backdrop needs from the application that mounts it.
pub trait Host {
    fn measure(&self) -> SurfaceSize;

    /// Whether the host can give us something to draw on at all.
    fn supports_2d(&self) -> bool {
        true
    }

    fn page_background(&self) -> Option<Rgb> {
        None
    }

    fn set_page_background(&mut self, _color: Option<Rgb>) {}

    /// Ask for one more [`Backdrop::on_frame`] call.
    fn request_frame(&mut self);

    fn present(&mut self, canvas: &mut Canvas) -> Result<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Sized,
    Running,
    Disposed,
}

impl Lifecycle {
    pub fn label(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Sized => "sized",
            Self::Running => "running",
            Self::Disposed => "disposed",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BackdropOptions {
    pub theme: ThemeKind,
    pub preset: PresetKind,
    /// Span the whole viewport and borrow the page background while mounted.
    pub fixed: bool,
    /// Explicit seed for noise, particles and grain; `None` draws a fresh one.
    pub seed: Option<u64>,
}

impl Default for BackdropOptions {
    fn default() -> Self {
        Self {
            theme: ThemeKind::DEFAULT,
            preset: PresetKind::DEFAULT,
            fixed: false,
            seed: None,
        }
    }
}

impl BackdropOptions {
    /// Options from free-form host tags; unknown tags fall back to defaults.
    pub fn from_tags(theme: &str, preset: &str) -> Self {
        Self {
            theme: ThemeKind::from_tag(theme),
            preset: PresetKind::from_tag(preset),
            ..Self::default()
        }
    }
}

/// One animated backdrop instance. All mutable frame state lives here, so two
/// instances never share anything.
pub struct Backdrop {
    options: BackdropOptions,
    style: Style,
    state: Lifecycle,
    rng: fastrand::Rng,
    scene: Option<Scene>,
    canvas: Option<Canvas>,
    size: Option<SurfaceSize>,
    /// Page background captured at mount, restored at dispose.
    saved_background: Option<Option<Rgb>>,
    inert: bool,
    last_frame_t: Option<f32>,
    frames: u64,
    transitions: u64,
}

impl Backdrop {
    pub fn new(options: BackdropOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            style: Style::new(options.theme, options.preset),
            options,
            state: Lifecycle::Uninitialized,
            rng,
            scene: None,
            canvas: None,
            size: None,
            saved_background: None,
            inert: false,
            last_frame_t: None,
            frames: 0,
            transitions: 0,
        }
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn options(&self) -> &BackdropOptions {
        &self.options
    }

    pub fn size(&self) -> Option<SurfaceSize> {
        self.size
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Lifecycle state changes so far.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// True when mounted on a host without drawing capability.
    pub fn is_inert(&self) -> bool {
        self.inert
    }

    /// Contour grid dimensions for the current size; `(0, 0)` before sizing or
    /// for wave themes.
    pub fn grid_dims(&self) -> (usize, usize) {
        self.scene.as_ref().map(Scene::grid_dims).unwrap_or((0, 0))
    }

    /// Measure the host, size the surface and start the loop.
    pub fn mount(&mut self, host: &mut dyn Host) {
        if self.state != Lifecycle::Uninitialized || self.inert {
            return;
        }
        if !host.supports_2d() {
            tracing::debug!("host has no 2d drawing capability; backdrop stays inert");
            self.inert = true;
            return;
        }

        if self.options.fixed {
            self.saved_background = Some(host.page_background());
            host.set_page_background(Some(self.style.preset.page_background));
        }

        self.scene = Some(Scene::new(self.style, &mut self.rng));
        self.apply_size(host.measure());
        self.transition(Lifecycle::Sized);

        self.transition(Lifecycle::Running);
        host.request_frame();
    }

    /// Resize notification from the host. Passes through `Sized` while all
    /// size-derived state is recomputed, then a running loop resumes.
    pub fn resize(&mut self, host: &mut dyn Host) {
        match self.state {
            Lifecycle::Uninitialized | Lifecycle::Disposed => return,
            Lifecycle::Sized | Lifecycle::Running => {}
        }
        let was_running = self.state == Lifecycle::Running;
        self.transition(Lifecycle::Sized);
        self.apply_size(host.measure());
        if was_running {
            self.transition(Lifecycle::Running);
        }
    }

    /// Switch theme and preset at runtime; size-derived state is rebuilt from
    /// scratch.
    pub fn set_style(&mut self, theme: ThemeKind, preset: PresetKind, host: &mut dyn Host) {
        if self.state == Lifecycle::Disposed {
            return;
        }
        self.options.theme = theme;
        self.options.preset = preset;
        self.style = Style::new(theme, preset);
        if let Some(scene) = self.scene.as_mut() {
            scene.set_style(self.style, &mut self.rng);
        }
        if self.options.fixed && self.saved_background.is_some() {
            host.set_page_background(Some(self.style.preset.page_background));
        }
        tracing::info!(theme = theme.tag(), preset = preset.tag(), "style changed");
    }

    /// A requested frame came due at `t` seconds of host time. Returns the
    /// frame's stats, or `None` when nothing was drawn.
    pub fn on_frame(&mut self, host: &mut dyn Host, t: f32) -> Result<Option<FrameStats>> {
        if self.state != Lifecycle::Running {
            return Ok(None);
        }

        let dt = match self.last_frame_t {
            Some(prev) if t >= prev => t - prev,
            _ => 1.0 / 60.0,
        };
        self.last_frame_t = Some(t);

        let mut drawn = None;
        if let (Some(scene), Some(canvas)) = (self.scene.as_mut(), self.canvas.as_mut()) {
            if !canvas.is_empty() {
                let started = Instant::now();
                let stats = scene.draw(canvas, t, dt);
                host.present(canvas)?;
                self.frames += 1;
                tracing::trace!(
                    frame = self.frames,
                    ms = started.elapsed().as_secs_f32() * 1000.0,
                    segments = stats.segments,
                    chains = stats.chains,
                    particles = stats.particles,
                    "frame"
                );
                drawn = Some(stats);
            }
        }

        if self.state == Lifecycle::Running {
            host.request_frame();
        }
        Ok(drawn)
    }

    /// Stop the loop and undo host-level side effects. Idempotent.
    pub fn dispose(&mut self, host: &mut dyn Host) {
        if self.state == Lifecycle::Disposed {
            return;
        }
        if let Some(prev) = self.saved_background.take() {
            host.set_page_background(prev);
        }
        self.transition(Lifecycle::Disposed);
        self.scene = None;
        self.canvas = None;
    }

    fn apply_size(&mut self, size: SurfaceSize) {
        let density = size.clamped_density();
        let (logical, (bw, bh)) = if size.is_degenerate() {
            (SurfaceSize::new(0.0, 0.0, density), (0, 0))
        } else {
            (SurfaceSize::new(size.width, size.height, density), size.backing())
        };

        self.canvas = Some(Canvas::new(bw, bh, density));
        if let Some(scene) = self.scene.as_mut() {
            scene.reset(logical.width, logical.height, &mut self.rng);
        }
        self.size = Some(logical);
        tracing::debug!(
            width = logical.width,
            height = logical.height,
            density,
            backing_w = bw,
            backing_h = bh,
            "surface sized"
        );
    }

    fn transition(&mut self, next: Lifecycle) {
        if self.state != next {
            tracing::info!(from = self.state.label(), to = next.label(), "backdrop lifecycle");
            self.state = next;
            self.transitions += 1;
        }
    }
}

/// In-memory host of a fixed size. Keeps the last presented frame and counts
/// frame requests, which makes it suitable for offline export and tests.
#[derive(Clone, Debug)]
pub struct OffscreenHost {
    pub size: SurfaceSize,
    pub supports_2d: bool,
    pub page_background: Option<Rgb>,
    pub frame_requests: u64,
    pub presents: u64,
    pub last_frame: Vec<u8>,
    pub last_frame_size: (usize, usize),
}

impl OffscreenHost {
    pub fn new(width: f32, height: f32, density: f32) -> Self {
        Self {
            size: SurfaceSize::new(width, height, density),
            supports_2d: true,
            page_background: None,
            frame_requests: 0,
            presents: 0,
            last_frame: Vec::new(),
            last_frame_size: (0, 0),
        }
    }

    pub fn without_2d(mut self) -> Self {
        self.supports_2d = false;
        self
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.size.width = width;
        self.size.height = height;
    }

    /// Consume one pending frame request, if any.
    pub fn take_request(&mut self) -> bool {
        if self.frame_requests == 0 {
            return false;
        }
        self.frame_requests -= 1;
        true
    }
}

impl Host for OffscreenHost {
    fn measure(&self) -> SurfaceSize {
        self.size
    }

    fn supports_2d(&self) -> bool {
        self.supports_2d
    }

    fn page_background(&self) -> Option<Rgb> {
        self.page_background
    }

    fn set_page_background(&mut self, color: Option<Rgb>) {
        self.page_background = color;
    }

    fn request_frame(&mut self) {
        self.frame_requests += 1;
    }

    fn present(&mut self, canvas: &mut Canvas) -> Result<()> {
        let (w, h) = (canvas.width(), canvas.height());
        if w == 0 || h == 0 {
            return Err(BackdropError::InvalidSize { width: w, height: h });
        }
        let rgba = canvas.to_rgba8();
        self.last_frame.clear();
        self.last_frame.extend_from_slice(rgba);
        self.last_frame_size = (w, h);
        self.presents += 1;
        Ok(())
    }
}
