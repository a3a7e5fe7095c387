//! Per-surface derived state and the fixed per-frame layer order:
//! background gradient (+ accent spot), grid, particles, waves or contours,
//! grain, vignette.

use crate::canvas::{Blend, Canvas, StrokeStyle};
use crate::chain;
use crate::contour::{self, Segment};
use crate::field::ScalarField;
use crate::noise::Noise3;
use crate::particles::ParticleField;
use crate::theme::{ContourTuning, Foreground, Style};
use crate::waves::{self, Wave};

/// What one frame drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub particles: usize,
    pub waves: usize,
    pub contour_levels: usize,
    pub segments: usize,
    pub chains: usize,
    pub draw_calls: u64,
}

/// One compositing pass of a frame, in the order [`Scene::draw`] runs them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Background,
    Grid,
    Particles,
    Waves,
    Contours,
    Grain,
    Vignette,
}

pub struct Scene {
    style: Style,
    width: f32,
    height: f32,
    noise: Noise3,
    particles: ParticleField,
    waves: Vec<Wave>,
    field: ScalarField,
    segments: Vec<Segment>,
    levels: Vec<f32>,
    grain_rng: fastrand::Rng,
    layers: Vec<Layer>,
}

impl Scene {
    /// Noise permutation is drawn from `rng` here, once per surface lifetime.
    pub fn new(style: Style, rng: &mut fastrand::Rng) -> Self {
        Self {
            style,
            width: 0.0,
            height: 0.0,
            noise: Noise3::new(rng),
            particles: ParticleField::default(),
            waves: Vec::new(),
            field: ScalarField::default(),
            segments: Vec::new(),
            levels: Vec::new(),
            grain_rng: fastrand::Rng::with_seed(rng.u64(..)),
            layers: Vec::with_capacity(6),
        }
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    /// Passes the last [`Scene::draw`] ran, in order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Contour grid dimensions for the current size (zero for wave themes).
    pub fn grid_dims(&self) -> (usize, usize) {
        match self.style.theme.foreground {
            Foreground::Contours(c) => ScalarField::dims(self.width, self.height, c.cell_size),
            Foreground::Waves(_) => (0, 0),
        }
    }

    /// Rebuild everything that depends on size: particles, waves, thresholds.
    pub fn reset(&mut self, width: f32, height: f32, rng: &mut fastrand::Rng) {
        self.width = width;
        self.height = height;
        self.particles = ParticleField::new(rng, width, height);
        self.waves = match self.style.theme.foreground {
            Foreground::Waves(tuning) => waves::build_waves(&tuning, self.style.preset, height),
            Foreground::Contours(_) => Vec::new(),
        };
        self.levels = match self.style.theme.foreground {
            Foreground::Contours(c) => contour::thresholds(c.levels, c.level_lo, c.level_hi),
            Foreground::Waves(_) => Vec::new(),
        };
        self.field = ScalarField::default();
        self.segments.clear();
        tracing::debug!(
            width,
            height,
            theme = self.style.theme.kind.tag(),
            particles = self.particles.len(),
            waves = self.waves.len(),
            "scene reset"
        );
    }

    /// Swap theme/preset; nothing derived from the previous style survives.
    pub fn set_style(&mut self, style: Style, rng: &mut fastrand::Rng) {
        self.style = style;
        self.reset(self.width, self.height, rng);
    }

    /// Advance by `dt` seconds and draw the frame at time `t`.
    pub fn draw(&mut self, canvas: &mut Canvas, t: f32, dt: f32) -> FrameStats {
        let mut stats = FrameStats::default();
        self.layers.clear();
        if canvas.is_empty() || !(self.width > 0.0 && self.height > 0.0) {
            return stats;
        }
        let calls_before = canvas.draw_calls();
        let theme = self.style.theme;
        let preset = self.style.preset;
        let (w, h) = (self.width, self.height);

        let bg = preset.background;
        let stops = [(0.0, bg[0]), (0.5, bg[1]), (1.0, bg[2])];
        canvas.fill_linear_gradient((0.0, 0.0), (w, h), &stops);
        let drift = (t * 0.05).sin() * 0.08;
        canvas.fill_radial(
            (w * (0.72 + drift), h * 0.22),
            w.max(h) * 0.55,
            preset.accent_inner,
            preset.accent_outer,
            Blend::Screen,
        );
        self.layers.push(Layer::Background);

        draw_grid(canvas, theme.grid_spacing, w, h, self.style);
        self.layers.push(Layer::Grid);

        self.particles.step(dt);
        self.particles.draw(canvas, preset.particle);
        stats.particles = self.particles.len();
        self.layers.push(Layer::Particles);

        match theme.foreground {
            Foreground::Waves(tuning) => {
                waves::draw_waves(canvas, &self.waves, &tuning, t);
                stats.waves = self.waves.len();
                self.layers.push(Layer::Waves);
            }
            Foreground::Contours(tuning) => {
                let (segments, chains) = self.draw_contours(canvas, &tuning, t);
                stats.contour_levels = self.levels.len();
                stats.segments = segments;
                stats.chains = chains;
                self.layers.push(Layer::Contours);
            }
        }

        canvas.grain(theme.noise_alpha, &mut self.grain_rng);
        self.layers.push(Layer::Grain);
        canvas.vignette(theme.vignette_alpha);
        self.layers.push(Layer::Vignette);

        stats.draw_calls = canvas.draw_calls() - calls_before;
        stats
    }

    fn draw_contours(
        &mut self,
        canvas: &mut Canvas,
        tuning: &ContourTuning,
        t: f32,
    ) -> (usize, usize) {
        let preset = self.style.preset;
        let (w, h) = (self.width, self.height);

        canvas.fill_radial(
            (w * 0.5, h * 0.55),
            w.max(h) * 0.7,
            preset.contour_fill,
            preset.contour_fill.with_alpha(0.0),
            Blend::Over,
        );

        self.field.sample_into(
            &self.noise,
            w,
            h,
            tuning.cell_size,
            tuning.field_scale,
            t * tuning.drift,
        );

        let mut total_segments = 0usize;
        let mut total_chains = 0usize;
        let n = self.levels.len();
        for (i, &level) in self.levels.iter().enumerate() {
            contour::extract_into(&self.field, level, &mut self.segments);
            total_segments += self.segments.len();
            let chains = chain::chains(&self.segments);
            total_chains += chains.len();

            // Middle levels read strongest; the extremes fade out.
            let centre = if n > 1 {
                1.0 - (i as f32 / (n - 1) as f32 * 2.0 - 1.0).abs() * 0.55
            } else {
                1.0
            };
            let line = preset.contour_lines[i % 2];
            let glow = preset.contour_glow;

            for c in &chains {
                canvas.stroke_polyline(
                    &c.points,
                    c.closed,
                    StrokeStyle {
                        width: tuning.glow_width,
                        blur: tuning.glow_blur,
                        color: glow.with_alpha(glow.a * centre),
                        blend: Blend::Screen,
                    },
                );
                canvas.stroke_polyline(
                    &c.points,
                    c.closed,
                    StrokeStyle {
                        width: tuning.line_width,
                        blur: 0.0,
                        color: line.with_alpha(line.a * centre),
                        blend: Blend::Screen,
                    },
                );
            }
        }
        (total_segments, total_chains)
    }
}

fn draw_grid(canvas: &mut Canvas, spacing: f32, w: f32, h: f32, style: Style) {
    if !(spacing > 0.0) {
        return;
    }
    let minor = spacing * 0.25;
    let preset = style.preset;
    let mut k = 0usize;
    let mut x = 0.0f32;
    while x < w {
        let c = if k % 4 == 0 {
            preset.grid_major
        } else {
            preset.grid_minor
        };
        canvas.vline(x, c);
        x += minor;
        k += 1;
    }
    k = 0;
    let mut y = 0.0f32;
    while y < h {
        let c = if k % 4 == 0 {
            preset.grid_major
        } else {
            preset.grid_minor
        };
        canvas.hline(y, c);
        y += minor;
        k += 1;
    }
}
