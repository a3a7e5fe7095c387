use crate::canvas::{Blend, Canvas, StrokeStyle, hsv_to_rgb, rgba};
use crate::theme::{PresetConfig, WaveTuning};

/// Logical px between curve samples when stroking.
const SAMPLE_STEP: f32 = 6.0;

/// One band of the wave family. Later indices are larger, slower-rippling,
/// faster-moving, fainter and hue-shifted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wave {
    pub index: usize,
    pub amplitude: f32,
    pub frequency: f32,
    pub speed: f32,
    pub baseline_y: f32,
    pub opacity: f32,
    /// Turns.
    pub hue: f32,
}

impl Wave {
    /// Composite height at logical `x` and time `t` (seconds).
    #[inline]
    pub fn y_at(&self, x: f32, t: f32) -> f32 {
        let f = self.frequency;
        let s = self.speed;
        let a = self.amplitude;
        self.baseline_y
            + a * (x * f + t * s).sin()
            + 0.28 * a * (1.9 * x * f + 1.15 * t * s).sin()
            + 0.42 * a * (0.65 * x * f + 0.75 * t * s).sin()
    }

    /// Highest point the composite can reach.
    pub fn crest(&self) -> f32 {
        self.baseline_y - self.amplitude * (1.0 + 0.28 + 0.42)
    }
}

/// Derive the ordered wave set for a `height`-tall surface.
pub fn build_waves(tuning: &WaveTuning, preset: &PresetConfig, height: f32) -> Vec<Wave> {
    if !(height > 0.0) || !height.is_finite() {
        return Vec::new();
    }
    (0..tuning.count)
        .map(|i| {
            let fi = i as f32;
            Wave {
                index: i,
                amplitude: height * (tuning.amp_base + tuning.amp_step * fi),
                frequency: tuning.freq_base / (1.0 + tuning.freq_falloff * fi),
                speed: tuning.speed_base + tuning.speed_step * fi,
                baseline_y: height * (tuning.baseline_base + tuning.baseline_step * fi),
                opacity: tuning.opacity_base * tuning.opacity_falloff.powi(i as i32),
                hue: preset.hue_base + preset.hue_step * fi,
            }
        })
        .collect()
}

/// Fill, glow and line passes for every wave, in ascending index order.
pub fn draw_waves(canvas: &mut Canvas, waves: &[Wave], tuning: &WaveTuning, t: f32) {
    let (width, _) = canvas.logical_size();
    let mut points: Vec<(f32, f32)> = Vec::with_capacity((width / SAMPLE_STEP) as usize + 2);

    for wave in waves {
        let rgb = hsv_to_rgb(wave.hue, tuning.saturation, tuning.value);
        let color = rgba(rgb[0], rgb[1], rgb[2], wave.opacity);

        canvas.fill_below(
            |x| wave.y_at(x, t),
            wave.crest(),
            color.with_alpha(wave.opacity * 0.55),
            color.with_alpha(0.0),
            Blend::Over,
        );

        points.clear();
        let mut x = 0.0f32;
        while x < width + SAMPLE_STEP {
            points.push((x, wave.y_at(x, t)));
            x += SAMPLE_STEP;
        }

        canvas.stroke_polyline(
            &points,
            false,
            StrokeStyle {
                width: tuning.glow_width,
                blur: tuning.glow_blur,
                color: color.with_alpha(wave.opacity * 0.5),
                blend: Blend::Screen,
            },
        );
        canvas.stroke_polyline(
            &points,
            false,
            StrokeStyle {
                width: tuning.line_width,
                blur: 0.0,
                color: color.with_alpha((wave.opacity * 2.2).min(0.9)),
                blend: Blend::Screen,
            },
        );
    }
}
