//! Theme and colour-preset tables.
//!
//! A theme picks the foreground algorithm family and its tunables; a preset
//! picks colours. The two are orthogonal and resolved once into a [`Style`]
//! whenever the host changes either tag.

use crate::canvas::{Rgb, Rgba, rgba};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThemeKind {
    /// Four broad composite-sine bands.
    Waves,
    /// Six thinner, faster bands.
    Silk,
    /// Iso-contours of drifting fbm noise.
    Contour,
}

impl ThemeKind {
    pub const DEFAULT: Self = Self::Waves;

    pub const fn all() -> [Self; 3] {
        [Self::Waves, Self::Silk, Self::Contour]
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Waves => "waves",
            Self::Silk => "silk",
            Self::Contour => "contour",
        }
    }

    /// Exact (case-insensitive) tag or alias.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "waves" | "wave" | "aurora" => Some(Self::Waves),
            "silk" | "ribbons" | "ribbon" => Some(Self::Silk),
            "contour" | "contours" | "topo" | "topography" => Some(Self::Contour),
            _ => None,
        }
    }

    /// Like [`ThemeKind::parse`] but never fails: unknown tags resolve to
    /// [`ThemeKind::DEFAULT`].
    pub fn from_tag(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_else(|| {
            tracing::warn!(tag, fallback = Self::DEFAULT.tag(), "unknown theme tag");
            Self::DEFAULT
        })
    }

    pub fn next(self) -> Self {
        match self {
            Self::Waves => Self::Silk,
            Self::Silk => Self::Contour,
            Self::Contour => Self::Waves,
        }
    }

    pub fn config(self) -> &'static ThemeConfig {
        match self {
            Self::Waves => &THEMES[0],
            Self::Silk => &THEMES[1],
            Self::Contour => &THEMES[2],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PresetKind {
    Indigo,
    Ocean,
    Teal,
    Sunset,
}

impl PresetKind {
    pub const DEFAULT: Self = Self::Indigo;

    pub const fn all() -> [Self; 4] {
        [Self::Indigo, Self::Ocean, Self::Teal, Self::Sunset]
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Indigo => "indigo",
            Self::Ocean => "ocean",
            Self::Teal => "teal",
            Self::Sunset => "sunset",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "indigo" | "violet" | "default" => Some(Self::Indigo),
            "ocean" | "blue" | "sea" => Some(Self::Ocean),
            "teal" | "mint" | "cyan" => Some(Self::Teal),
            "sunset" | "dusk" | "ember" => Some(Self::Sunset),
            _ => None,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        Self::parse(tag).unwrap_or_else(|| {
            tracing::warn!(tag, fallback = Self::DEFAULT.tag(), "unknown preset tag");
            Self::DEFAULT
        })
    }

    pub fn next(self) -> Self {
        match self {
            Self::Indigo => Self::Ocean,
            Self::Ocean => Self::Teal,
            Self::Teal => Self::Sunset,
            Self::Sunset => Self::Indigo,
        }
    }

    pub fn config(self) -> &'static PresetConfig {
        match self {
            Self::Indigo => &PRESETS[0],
            Self::Ocean => &PRESETS[1],
            Self::Teal => &PRESETS[2],
            Self::Sunset => &PRESETS[3],
        }
    }
}

/// Progressions for the wave family. Wave `i` gets:
/// amplitude `h * (amp_base + amp_step * i)`,
/// frequency `freq_base / (1 + freq_falloff * i)`,
/// speed `speed_base + speed_step * i`,
/// opacity `opacity_base * opacity_falloff^i`,
/// baseline `h * (baseline_base + baseline_step * i)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveTuning {
    pub count: usize,
    pub amp_base: f32,
    pub amp_step: f32,
    pub freq_base: f32,
    pub freq_falloff: f32,
    pub speed_base: f32,
    pub speed_step: f32,
    pub opacity_base: f32,
    pub opacity_falloff: f32,
    pub baseline_base: f32,
    pub baseline_step: f32,
    pub line_width: f32,
    pub glow_width: f32,
    pub glow_blur: f32,
    pub saturation: f32,
    pub value: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContourTuning {
    pub cell_size: f32,
    pub field_scale: f32,
    /// Noise z advance per second of animation time.
    pub drift: f32,
    pub levels: usize,
    pub level_lo: f32,
    pub level_hi: f32,
    pub line_width: f32,
    pub glow_width: f32,
    pub glow_blur: f32,
}

/// Foreground algorithm family with its tunables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Foreground {
    Waves(WaveTuning),
    Contours(ContourTuning),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemeConfig {
    pub kind: ThemeKind,
    pub noise_alpha: f32,
    pub vignette_alpha: f32,
    /// Logical spacing between major grid lines; minor lines every quarter.
    pub grid_spacing: f32,
    pub foreground: Foreground,
}

impl ThemeConfig {
    pub fn is_contour(&self) -> bool {
        matches!(self.foreground, Foreground::Contours(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresetConfig {
    pub kind: PresetKind,
    /// Diagonal background stops (top-left, centre, bottom-right).
    pub background: [Rgb; 3],
    /// Colour borrowed by the host page while a `fixed` backdrop is mounted.
    pub page_background: Rgb,
    pub accent_inner: Rgba,
    pub accent_outer: Rgba,
    pub grid_major: Rgba,
    pub grid_minor: Rgba,
    pub particle: Rgb,
    /// Wave hue of index 0, in turns.
    pub hue_base: f32,
    /// Hue offset per wave index, in turns.
    pub hue_step: f32,
    /// Alternating line colours for successive contour levels.
    pub contour_lines: [Rgba; 2],
    pub contour_fill: Rgba,
    pub contour_glow: Rgba,
}

/// Resolved `(theme, preset)` pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub theme: &'static ThemeConfig,
    pub preset: &'static PresetConfig,
}

impl Style {
    pub fn new(theme: ThemeKind, preset: PresetKind) -> Self {
        Self {
            theme: theme.config(),
            preset: preset.config(),
        }
    }

    /// Resolve free-form host tags, falling back to the defaults.
    pub fn resolve(theme: &str, preset: &str) -> Self {
        Self::new(ThemeKind::from_tag(theme), PresetKind::from_tag(preset))
    }

    pub fn theme_kind(&self) -> ThemeKind {
        self.theme.kind
    }

    pub fn preset_kind(&self) -> PresetKind {
        self.preset.kind
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::new(ThemeKind::DEFAULT, PresetKind::DEFAULT)
    }
}

pub static THEMES: [ThemeConfig; 3] = [
    ThemeConfig {
        kind: ThemeKind::Waves,
        noise_alpha: 0.045,
        vignette_alpha: 0.55,
        grid_spacing: 48.0,
        foreground: Foreground::Waves(WaveTuning {
            count: 4,
            amp_base: 0.045,
            amp_step: 0.018,
            freq_base: 0.0065,
            freq_falloff: 0.22,
            speed_base: 0.45,
            speed_step: 0.12,
            opacity_base: 0.34,
            opacity_falloff: 0.78,
            baseline_base: 0.56,
            baseline_step: 0.07,
            line_width: 1.4,
            glow_width: 5.0,
            glow_blur: 9.0,
            saturation: 0.62,
            value: 0.96,
        }),
    },
    ThemeConfig {
        kind: ThemeKind::Silk,
        noise_alpha: 0.035,
        vignette_alpha: 0.6,
        grid_spacing: 48.0,
        foreground: Foreground::Waves(WaveTuning {
            count: 6,
            amp_base: 0.028,
            amp_step: 0.011,
            freq_base: 0.0095,
            freq_falloff: 0.16,
            speed_base: 0.62,
            speed_step: 0.09,
            opacity_base: 0.26,
            opacity_falloff: 0.84,
            baseline_base: 0.5,
            baseline_step: 0.055,
            line_width: 1.0,
            glow_width: 3.0,
            glow_blur: 6.0,
            saturation: 0.5,
            value: 1.0,
        }),
    },
    ThemeConfig {
        kind: ThemeKind::Contour,
        noise_alpha: 0.04,
        vignette_alpha: 0.65,
        grid_spacing: 64.0,
        foreground: Foreground::Contours(ContourTuning {
            cell_size: 6.0,
            field_scale: 0.0036,
            drift: 0.06,
            levels: 24,
            level_lo: -0.42,
            level_hi: 0.42,
            line_width: 1.0,
            glow_width: 2.0,
            glow_blur: 3.0,
        }),
    },
];

pub static PRESETS: [PresetConfig; 4] = [
    PresetConfig {
        kind: PresetKind::Indigo,
        background: [[12, 10, 34], [22, 18, 58], [8, 8, 24]],
        page_background: [10, 9, 28],
        accent_inner: rgba(124, 92, 255, 0.28),
        accent_outer: rgba(124, 92, 255, 0.0),
        grid_major: rgba(150, 140, 255, 0.07),
        grid_minor: rgba(150, 140, 255, 0.03),
        particle: [214, 208, 255],
        hue_base: 0.70,
        hue_step: 0.035,
        contour_lines: [rgba(168, 150, 255, 0.42), rgba(110, 190, 255, 0.30)],
        contour_fill: rgba(60, 40, 140, 0.10),
        contour_glow: rgba(140, 110, 255, 0.12),
    },
    PresetConfig {
        kind: PresetKind::Ocean,
        background: [[4, 16, 36], [8, 32, 64], [2, 10, 26]],
        page_background: [4, 14, 32],
        accent_inner: rgba(40, 140, 255, 0.26),
        accent_outer: rgba(40, 140, 255, 0.0),
        grid_major: rgba(110, 180, 255, 0.07),
        grid_minor: rgba(110, 180, 255, 0.03),
        particle: [200, 230, 255],
        hue_base: 0.57,
        hue_step: 0.03,
        contour_lines: [rgba(110, 190, 255, 0.42), rgba(80, 240, 230, 0.28)],
        contour_fill: rgba(20, 70, 140, 0.10),
        contour_glow: rgba(60, 150, 255, 0.12),
    },
    PresetConfig {
        kind: PresetKind::Teal,
        background: [[4, 24, 26], [8, 44, 44], [2, 14, 16]],
        page_background: [4, 20, 22],
        accent_inner: rgba(40, 220, 190, 0.24),
        accent_outer: rgba(40, 220, 190, 0.0),
        grid_major: rgba(120, 240, 220, 0.06),
        grid_minor: rgba(120, 240, 220, 0.025),
        particle: [200, 255, 240],
        hue_base: 0.46,
        hue_step: 0.028,
        contour_lines: [rgba(100, 240, 210, 0.40), rgba(160, 220, 255, 0.26)],
        contour_fill: rgba(20, 110, 100, 0.10),
        contour_glow: rgba(60, 230, 200, 0.12),
    },
    PresetConfig {
        kind: PresetKind::Sunset,
        background: [[36, 12, 30], [62, 20, 42], [20, 8, 22]],
        page_background: [30, 10, 26],
        accent_inner: rgba(255, 120, 80, 0.26),
        accent_outer: rgba(255, 120, 80, 0.0),
        grid_major: rgba(255, 170, 140, 0.06),
        grid_minor: rgba(255, 170, 140, 0.025),
        particle: [255, 226, 200],
        hue_base: 0.96,
        hue_step: 0.03,
        contour_lines: [rgba(255, 150, 110, 0.42), rgba(255, 210, 120, 0.28)],
        contour_fill: rgba(140, 40, 60, 0.10),
        contour_glow: rgba(255, 110, 90, 0.12),
    },
];
