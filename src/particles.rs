use crate::canvas::{Blend, Canvas, Rgb, rgba};

pub const AREA_PER_PARTICLE: f32 = 18_000.0;
pub const MIN_PARTICLES: usize = 60;
pub const MAX_PARTICLES: usize = 180;
/// Particles may drift this far past an edge before wrapping to the other side.
pub const WRAP_PADDING: f32 = 20.0;

/// Population for a surface of `area` logical square pixels.
pub fn particle_count(area: f32) -> usize {
    let raw = if area.is_finite() && area > 0.0 {
        (area / AREA_PER_PARTICLE).floor() as usize
    } else {
        0
    };
    raw.clamp(MIN_PARTICLES, MAX_PARTICLES)
}

/// One twinkling point light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub base_alpha: f32,
    /// Logical px per 60 Hz frame.
    pub velocity: (f32, f32),
    pub twinkle_phase: f32,
    /// Radians per 60 Hz frame.
    pub twinkle_speed: f32,
}

impl Dot {
    fn random(rng: &mut fastrand::Rng, width: f32, height: f32) -> Self {
        Self {
            x: rng.f32() * width,
            y: rng.f32() * height,
            radius: 0.35 + rng.f32() * 1.25,
            base_alpha: 0.15 + rng.f32() * 0.6,
            velocity: ((rng.f32() - 0.5) * 0.24, (rng.f32() - 0.5) * 0.24),
            twinkle_phase: rng.f32() * std::f32::consts::TAU,
            twinkle_speed: 0.01 + rng.f32() * 0.03,
        }
    }

    /// Base alpha scaled by the current twinkle, `(sin(phase)+1)/2` mapped into
    /// `[0.35, 1]`.
    pub fn alpha(&self) -> f32 {
        let tw = (self.twinkle_phase.sin() + 1.0) * 0.5;
        self.base_alpha * (0.35 + 0.65 * tw)
    }
}

/// Fixed-size drifting starfield for one surface size.
#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    dots: Vec<Dot>,
    width: f32,
    height: f32,
}

impl ParticleField {
    /// Fresh population for a `width x height` logical surface. A degenerate
    /// surface gets no particles.
    pub fn new(rng: &mut fastrand::Rng, width: f32, height: f32) -> Self {
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Self::default();
        }
        let count = particle_count(width * height);
        let dots = (0..count).map(|_| Dot::random(rng, width, height)).collect();
        Self {
            dots,
            width,
            height,
        }
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn len(&self) -> usize {
        self.dots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    /// Advance positions and twinkle by `dt` seconds, wrapping toroidally.
    pub fn step(&mut self, dt: f32) {
        let k = if dt.is_finite() {
            (dt * 60.0).clamp(0.0, 4.0)
        } else {
            0.0
        };
        let (w, h) = (self.width, self.height);
        for d in &mut self.dots {
            d.x += d.velocity.0 * k;
            d.y += d.velocity.1 * k;
            d.twinkle_phase = (d.twinkle_phase + d.twinkle_speed * k) % std::f32::consts::TAU;

            if d.x < -WRAP_PADDING {
                d.x = w + WRAP_PADDING;
            } else if d.x > w + WRAP_PADDING {
                d.x = -WRAP_PADDING;
            }
            if d.y < -WRAP_PADDING {
                d.y = h + WRAP_PADDING;
            } else if d.y > h + WRAP_PADDING {
                d.y = -WRAP_PADDING;
            }
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, color: Rgb) {
        for d in &self.dots {
            let a = d.alpha();
            if !(a > 0.0) {
                continue;
            }
            canvas.fill_disc(
                (d.x, d.y),
                d.radius,
                rgba(color[0], color[1], color[2], a),
                Blend::Screen,
            );
        }
    }
}
