//! Seeded 3D gradient noise and its fractal sum.
//!
//! The third axis is only ever used as time, so a 2D slice drifts smoothly
//! without re-deriving a separate animated noise law.

/// Frequency multipliers for the four fbm octaves.
pub const FBM_FREQUENCIES: [f32; 4] = [1.0, 1.9, 3.7, 7.5];
/// Amplitudes for the four fbm octaves.
pub const FBM_AMPLITUDES: [f32; 4] = [0.5, 0.25, 0.125, 0.0625];

/// Gradient noise over a shuffled 256-entry permutation, stored twice so
/// lattice lookups never need to wrap.
#[derive(Clone)]
pub struct Noise3 {
    perm: [u8; 512],
}

impl Noise3 {
    /// Build a table shuffled by `rng`.
    pub fn new(rng: &mut fastrand::Rng) -> Self {
        let mut base = [0u8; 256];
        for (i, v) in base.iter_mut().enumerate() {
            *v = i as u8;
        }
        // Fisher-Yates.
        for i in (1..base.len()).rev() {
            let j = rng.usize(..=i);
            base.swap(i, j);
        }

        let mut perm = [0u8; 512];
        perm[..256].copy_from_slice(&base);
        perm[256..].copy_from_slice(&base);
        Self { perm }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(&mut fastrand::Rng::with_seed(seed))
    }

    /// Raw permutation (both halves).
    pub fn permutation(&self) -> &[u8; 512] {
        &self.perm
    }

    /// Smooth noise in `[-1, 1]`.
    pub fn noise3(&self, x: f32, y: f32, z: f32) -> f32 {
        let xf = x.floor();
        let yf = y.floor();
        let zf = z.floor();
        let xi = (xf as i64 & 255) as usize;
        let yi = (yf as i64 & 255) as usize;
        let zi = (zf as i64 & 255) as usize;

        let x = x - xf;
        let y = y - yf;
        let z = z - zf;
        let u = fade(x);
        let v = fade(y);
        let w = fade(z);

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        let x1 = lerp(grad(p[aa], x, y, z), grad(p[ba], x - 1.0, y, z), u);
        let x2 = lerp(
            grad(p[ab], x, y - 1.0, z),
            grad(p[bb], x - 1.0, y - 1.0, z),
            u,
        );
        let y1 = lerp(x1, x2, v);

        let x3 = lerp(
            grad(p[aa + 1], x, y, z - 1.0),
            grad(p[ba + 1], x - 1.0, y, z - 1.0),
            u,
        );
        let x4 = lerp(
            grad(p[ab + 1], x, y - 1.0, z - 1.0),
            grad(p[bb + 1], x - 1.0, y - 1.0, z - 1.0),
            u,
        );
        let y2 = lerp(x3, x4, v);

        lerp(y1, y2, w).clamp(-1.0, 1.0)
    }

    /// Four octaves of [`Noise3::noise3`]; the result stays within
    /// `±0.9375` (sum of the octave amplitudes).
    pub fn fbm(&self, x: f32, y: f32, z: f32) -> f32 {
        let mut sum = 0.0f32;
        for (freq, amp) in FBM_FREQUENCIES.iter().zip(FBM_AMPLITUDES.iter()) {
            sum += amp * self.noise3(x * freq, y * freq, z * freq);
        }
        sum
    }
}

impl std::fmt::Debug for Noise3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Noise3")
            .field("head", &&self.perm[..8])
            .finish_non_exhaustive()
    }
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Dot product with one of the 12 cube-edge gradients (the four extra hash
/// values repeat existing directions).
#[inline]
fn grad(hash: u8, x: f32, y: f32, z: f32) -> f32 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    let su = if h & 1 == 0 { u } else { -u };
    let sv = if h & 2 == 0 { v } else { -v };
    su + sv
}
