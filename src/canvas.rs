//! CPU raster target for one backdrop surface.
//!
//! All drawing calls take logical (CSS-like) coordinates; the canvas multiplies
//! them by its density scale, so the backing buffer matches the clamped device
//! density while callers keep working in logical pixels.

pub type Rgb = [u8; 3];

/// Colour plus straight alpha in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub a: f32,
}

pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Rgba {
    Rgba { rgb: [r, g, b], a }
}

impl Rgba {
    pub fn with_alpha(self, a: f32) -> Self {
        Self { rgb: self.rgb, a }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blend {
    /// Plain source-over.
    Over,
    /// `1 - (1 - dst)(1 - src)`; brightens without clipping.
    Screen,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    /// Extra soft falloff outside the solid core; 0 for a crisp line.
    pub blur: f32,
    pub color: Rgba,
    pub blend: Blend,
}

pub struct Canvas {
    width: usize,
    height: usize,
    scale: f32,
    px: Vec<[f32; 3]>,
    mask: Vec<f32>,
    touched: Vec<u32>,
    rgba: Vec<u8>,
    draw_calls: u64,
}

impl Canvas {
    /// `width`/`height` are backing (device) pixels; `scale` is device pixels
    /// per logical pixel.
    pub fn new(width: usize, height: usize, scale: f32) -> Self {
        let n = width.saturating_mul(height);
        Self {
            width,
            height,
            scale: if scale.is_finite() && scale > 0.0 {
                scale
            } else {
                1.0
            },
            px: vec![[0.0; 3]; n],
            mask: vec![0.0; n],
            touched: Vec::new(),
            rgba: vec![0; n.saturating_mul(4)],
            draw_calls: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn logical_size(&self) -> (f32, f32) {
        (
            self.width as f32 / self.scale,
            self.height as f32 / self.scale,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Drawing operations issued since creation.
    pub fn draw_calls(&self) -> u64 {
        self.draw_calls
    }

    /// Linear RGB-ish value of one backing pixel, each channel in `[0, 1]`.
    pub fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        self.px[y * self.width + x]
    }

    /// Opaque linear gradient along the logical line `from -> to`.
    pub fn fill_linear_gradient(
        &mut self,
        from: (f32, f32),
        to: (f32, f32),
        stops: &[(f32, Rgb)],
    ) {
        if self.is_empty() || stops.is_empty() {
            return;
        }
        self.draw_calls += 1;
        let (x0, y0) = (from.0 * self.scale, from.1 * self.scale);
        let (dx, dy) = (to.0 * self.scale - x0, to.1 * self.scale - y0);
        let len2 = (dx * dx + dy * dy).max(1e-6);
        let stops_unit: Vec<(f32, [f32; 3])> =
            stops.iter().map(|&(p, c)| (p, to_unit(c))).collect();

        for y in 0..self.height {
            let py = y as f32 + 0.5 - y0;
            let row = y * self.width;
            for x in 0..self.width {
                let px = x as f32 + 0.5 - x0;
                let t = ((px * dx + py * dy) / len2).clamp(0.0, 1.0);
                self.px[row + x] = sample_stops(&stops_unit, t);
            }
        }
    }

    /// Radial spot fading from `inner` at the centre to `outer` at `radius`.
    pub fn fill_radial(
        &mut self,
        center: (f32, f32),
        radius: f32,
        inner: Rgba,
        outer: Rgba,
        blend: Blend,
    ) {
        if self.is_empty() || !(radius > 0.0) {
            return;
        }
        self.draw_calls += 1;
        let cx = center.0 * self.scale;
        let cy = center.1 * self.scale;
        let r = radius * self.scale;
        let (x0, x1) = self.span_x(cx - r, cx + r);
        let (y0, y1) = self.span_y(cy - r, cy + r);
        let ci = to_unit(inner.rgb);
        let co = to_unit(outer.rgb);

        for y in y0..y1 {
            let fy = y as f32 + 0.5 - cy;
            for x in x0..x1 {
                let fx = x as f32 + 0.5 - cx;
                let t = (fx * fx + fy * fy).sqrt() / r;
                if t >= 1.0 {
                    if outer.a > 0.0 {
                        self.blend_at(y * self.width + x, co, outer.a, blend);
                    }
                    continue;
                }
                let c = lerp3(ci, co, t);
                let a = inner.a + (outer.a - inner.a) * t;
                self.blend_at(y * self.width + x, c, a, blend);
            }
        }
    }

    /// One backing-pixel-thick horizontal line at logical `y`.
    pub fn hline(&mut self, y: f32, color: Rgba) {
        let row = (y * self.scale).floor();
        if self.is_empty() || row < 0.0 || row >= self.height as f32 {
            return;
        }
        self.draw_calls += 1;
        let c = to_unit(color.rgb);
        let base = row as usize * self.width;
        for x in 0..self.width {
            self.blend_at(base + x, c, color.a, Blend::Over);
        }
    }

    /// One backing-pixel-thick vertical line at logical `x`.
    pub fn vline(&mut self, x: f32, color: Rgba) {
        let col = (x * self.scale).floor();
        if self.is_empty() || col < 0.0 || col >= self.width as f32 {
            return;
        }
        self.draw_calls += 1;
        let c = to_unit(color.rgb);
        let col = col as usize;
        for y in 0..self.height {
            self.blend_at(y * self.width + col, c, color.a, Blend::Over);
        }
    }

    /// Anti-aliased disc.
    pub fn fill_disc(&mut self, center: (f32, f32), radius: f32, color: Rgba, blend: Blend) {
        if self.is_empty() || !(radius > 0.0) || !center.0.is_finite() || !center.1.is_finite() {
            return;
        }
        self.draw_calls += 1;
        let cx = center.0 * self.scale;
        let cy = center.1 * self.scale;
        let r = (radius * self.scale).max(0.5);
        let (x0, x1) = self.span_x(cx - r - 1.0, cx + r + 1.0);
        let (y0, y1) = self.span_y(cy - r - 1.0, cy + r + 1.0);
        let c = to_unit(color.rgb);

        for y in y0..y1 {
            let fy = y as f32 + 0.5 - cy;
            for x in x0..x1 {
                let fx = x as f32 + 0.5 - cx;
                let cov = (r + 0.5 - (fx * fx + fy * fy).sqrt()).clamp(0.0, 1.0);
                if cov > 0.0 {
                    self.blend_at(y * self.width + x, c, color.a * cov, blend);
                }
            }
        }
    }

    /// Stroke an open or closed polyline. Coverage is accumulated with `max`
    /// into a scratch mask first so joints are not blended twice.
    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], closed: bool, style: StrokeStyle) {
        if self.is_empty() || points.len() < 2 || style.color.a <= 0.0 {
            return;
        }
        self.draw_calls += 1;
        let hw = (style.width * self.scale * 0.5).max(0.35);
        let blur = (style.blur * self.scale).max(0.0);

        for pair in points.windows(2) {
            self.cover_segment(pair[0], pair[1], hw, blur);
        }
        if closed && points.len() > 2 {
            self.cover_segment(points[points.len() - 1], points[0], hw, blur);
        }
        self.flush_mask(style.color, style.blend);
    }

    /// Fill the region between `curve(x)` and the bottom edge, with a vertical
    /// gradient running from `top` at logical `gradient_top` to `bottom` at the
    /// surface bottom.
    pub fn fill_below<F>(
        &mut self,
        curve: F,
        gradient_top: f32,
        top: Rgba,
        bottom: Rgba,
        blend: Blend,
    ) where
        F: Fn(f32) -> f32,
    {
        if self.is_empty() {
            return;
        }
        self.draw_calls += 1;
        let h = self.height as f32;
        let g0 = gradient_top * self.scale;
        let span = (h - g0).max(1.0);
        let ct = to_unit(top.rgb);
        let cb = to_unit(bottom.rgb);

        for x in 0..self.width {
            let lx = (x as f32 + 0.5) / self.scale;
            let edge = curve(lx) * self.scale;
            if !edge.is_finite() {
                continue;
            }
            let start = edge.floor().max(0.0) as usize;
            for y in start..self.height {
                let cov = ((y as f32 + 1.0) - edge).clamp(0.0, 1.0);
                if cov <= 0.0 {
                    continue;
                }
                let t = ((y as f32 + 0.5 - g0) / span).clamp(0.0, 1.0);
                let c = lerp3(ct, cb, t);
                let a = top.a + (bottom.a - top.a) * t;
                self.blend_at(y * self.width + x, c, a * cov, blend);
            }
        }
    }

    /// Film grain: each pixel nudged by uniform noise of strength `alpha`.
    pub fn grain(&mut self, alpha: f32, rng: &mut fastrand::Rng) {
        if self.is_empty() || alpha <= 0.0 {
            return;
        }
        self.draw_calls += 1;
        for p in &mut self.px {
            let n = (rng.f32() - 0.5) * alpha;
            p[0] = (p[0] + n).clamp(0.0, 1.0);
            p[1] = (p[1] + n).clamp(0.0, 1.0);
            p[2] = (p[2] + n).clamp(0.0, 1.0);
        }
    }

    /// Darken towards the corners; `alpha` is the corner darkening amount.
    pub fn vignette(&mut self, alpha: f32) {
        if self.is_empty() || alpha <= 0.0 {
            return;
        }
        self.draw_calls += 1;
        let cx = self.width as f32 * 0.5;
        let cy = self.height as f32 * 0.5;
        let inv = 1.0 / (cx * cx + cy * cy).sqrt().max(1.0);
        for y in 0..self.height {
            let fy = y as f32 + 0.5 - cy;
            for x in 0..self.width {
                let fx = x as f32 + 0.5 - cx;
                let r = (fx * fx + fy * fy).sqrt() * inv;
                let k = smoothstep(0.35, 1.0, r) * alpha;
                let p = &mut self.px[y * self.width + x];
                let g = 1.0 - k;
                p[0] *= g;
                p[1] *= g;
                p[2] *= g;
            }
        }
    }

    /// Opaque RGBA8 view of the current frame.
    pub fn to_rgba8(&mut self) -> &[u8] {
        for (dst, src) in self.rgba.chunks_exact_mut(4).zip(self.px.iter()) {
            dst[0] = (src[0].clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
            dst[1] = (src[1].clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
            dst[2] = (src[2].clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
            dst[3] = 255;
        }
        &self.rgba
    }

    fn cover_segment(&mut self, a: (f32, f32), b: (f32, f32), hw: f32, blur: f32) {
        if !(a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite()) {
            return;
        }
        let (ax, ay) = (a.0 * self.scale, a.1 * self.scale);
        let (bx, by) = (b.0 * self.scale, b.1 * self.scale);
        let pad = hw + blur + 1.0;
        let (x0, x1) = self.span_x(ax.min(bx) - pad, ax.max(bx) + pad);
        let (y0, y1) = self.span_y(ay.min(by) - pad, ay.max(by) + pad);

        let dx = bx - ax;
        let dy = by - ay;
        let len2 = dx * dx + dy * dy;

        for y in y0..y1 {
            let py = y as f32 + 0.5;
            for x in x0..x1 {
                let px = x as f32 + 0.5;
                let t = if len2 > 1e-9 {
                    (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let qx = ax + dx * t - px;
                let qy = ay + dy * t - py;
                let d = (qx * qx + qy * qy).sqrt();

                let cov = if blur > 0.0 {
                    if d <= hw {
                        1.0
                    } else {
                        let k = (1.0 - (d - hw) / blur).clamp(0.0, 1.0);
                        k * k * (3.0 - 2.0 * k)
                    }
                } else {
                    (hw + 0.5 - d).clamp(0.0, 1.0)
                };
                if cov <= 0.0 {
                    continue;
                }
                let i = y * self.width + x;
                if self.mask[i] == 0.0 {
                    self.touched.push(i as u32);
                }
                if cov > self.mask[i] {
                    self.mask[i] = cov;
                }
            }
        }
    }

    fn flush_mask(&mut self, color: Rgba, blend: Blend) {
        let c = to_unit(color.rgb);
        let touched = std::mem::take(&mut self.touched);
        for &i in &touched {
            let i = i as usize;
            let cov = self.mask[i];
            self.mask[i] = 0.0;
            self.blend_at(i, c, color.a * cov, blend);
        }
        self.touched = touched;
        self.touched.clear();
    }

    #[inline]
    fn blend_at(&mut self, i: usize, src: [f32; 3], alpha: f32, blend: Blend) {
        let a = alpha.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let dst = &mut self.px[i];
        for ch in 0..3 {
            let d = dst[ch];
            let s = src[ch];
            let mixed = match blend {
                Blend::Over => s,
                Blend::Screen => 1.0 - (1.0 - d) * (1.0 - s),
            };
            dst[ch] = d + (mixed - d) * a;
        }
    }

    fn span_x(&self, lo: f32, hi: f32) -> (usize, usize) {
        clamp_span(lo, hi, self.width)
    }

    fn span_y(&self, lo: f32, hi: f32) -> (usize, usize) {
        clamp_span(lo, hi, self.height)
    }
}

fn clamp_span(lo: f32, hi: f32, limit: usize) -> (usize, usize) {
    if !(lo.is_finite() && hi.is_finite()) || hi < 0.0 || lo >= limit as f32 {
        return (0, 0);
    }
    let a = lo.floor().max(0.0) as usize;
    let b = (hi.ceil().max(0.0) as usize).min(limit);
    (a.min(b), b)
}

#[inline]
fn to_unit(c: Rgb) -> [f32; 3] {
    [c[0] as f32 / 255.0, c[1] as f32 / 255.0, c[2] as f32 / 255.0]
}

#[inline]
fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

fn sample_stops(stops: &[(f32, [f32; 3])], t: f32) -> [f32; 3] {
    let Some(&(first_pos, first)) = stops.first() else {
        return [0.0; 3];
    };
    if t <= first_pos {
        return first;
    }
    for pair in stops.windows(2) {
        let (p0, c0) = pair[0];
        let (p1, c1) = pair[1];
        if t <= p1 {
            let k = if p1 > p0 { (t - p0) / (p1 - p0) } else { 1.0 };
            return lerp3(c0, c1, k);
        }
    }
    stops[stops.len() - 1].1
}

#[inline]
pub fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Hue/saturation/value to RGB; `h` wraps, `s` and `v` in `[0, 1]`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h = fract01(h) * 6.0;
    let i = h.floor() as i32;
    let f = h - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match i.rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    [
        (r.clamp(0.0, 1.0) * 255.0) as u8,
        (g.clamp(0.0, 1.0) * 255.0) as u8,
        (b.clamp(0.0, 1.0) * 255.0) as u8,
    ]
}

pub fn fract01(x: f32) -> f32 {
    let f = x - x.floor();
    if f < 0.0 { f + 1.0 } else { f }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_clip_to_the_buffer() {
        assert_eq!(clamp_span(-3.0, 4.2, 10), (0, 5));
        assert_eq!(clamp_span(8.5, 40.0, 10), (8, 10));
        assert_eq!(clamp_span(12.0, 14.0, 10), (0, 0));
        assert_eq!(clamp_span(-5.0, -1.0, 10), (0, 0));
        assert_eq!(clamp_span(f32::NAN, 3.0, 10), (0, 0));
    }

    #[test]
    fn gradient_stops_interpolate_and_hold_ends() {
        let stops = [(0.0, [0.0, 0.0, 0.0]), (0.5, [1.0, 0.5, 0.0]), (1.0, [1.0, 1.0, 1.0])];
        assert_eq!(sample_stops(&stops, -1.0), [0.0, 0.0, 0.0]);
        assert_eq!(sample_stops(&stops, 0.25), [0.5, 0.25, 0.0]);
        assert_eq!(sample_stops(&stops, 2.0), [1.0, 1.0, 1.0]);
        assert_eq!(sample_stops(&[], 0.3), [0.0; 3]);
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [255, 0, 0]);
        assert_eq!(hsv_to_rgb(1.0 / 3.0, 1.0, 1.0), [0, 255, 0]);
        assert_eq!(hsv_to_rgb(2.0 / 3.0, 1.0, 1.0), [0, 0, 255]);
        assert_eq!(hsv_to_rgb(0.4, 0.0, 0.5), [127, 127, 127]);
    }
}
