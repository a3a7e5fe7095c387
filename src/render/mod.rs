//! Terminal presentation of finished frames.

mod halfblock;

pub use halfblock::HalfBlockPresenter;

/// One presentable frame plus the terminal geometry it is painted into.
pub struct Frame<'a> {
    pub term_cols: u16,
    /// Terminal rows given to the picture; the HUD sits below them.
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    pub pixels_rgba: &'a [u8],
    pub hud: &'a str,
    pub hud_rows: u16,
    pub sync_updates: bool,
}

/// Box-filter an RGBA8 image of `sw x sh` down (or up) to `dw x dh`.
///
/// Every destination pixel averages the source pixels whose centres fall
/// inside its footprint, with at least one source pixel per destination.
pub fn resample_rgba(src: &[u8], sw: usize, sh: usize, dw: usize, dh: usize, dst: &mut Vec<u8>) {
    dst.clear();
    if sw == 0 || sh == 0 || dw == 0 || dh == 0 || src.len() < sw * sh * 4 {
        return;
    }
    dst.resize(dw * dh * 4, 0);

    for dy in 0..dh {
        let y0 = dy * sh / dh;
        let y1 = ((dy + 1) * sh / dh).max(y0 + 1).min(sh);
        for dx in 0..dw {
            let x0 = dx * sw / dw;
            let x1 = ((dx + 1) * sw / dw).max(x0 + 1).min(sw);

            let mut acc = [0u32; 4];
            for y in y0..y1 {
                let row = y * sw;
                for x in x0..x1 {
                    let i = (row + x) * 4;
                    acc[0] += src[i] as u32;
                    acc[1] += src[i + 1] as u32;
                    acc[2] += src[i + 2] as u32;
                    acc[3] += src[i + 3] as u32;
                }
            }
            let n = ((y1 - y0) * (x1 - x0)) as u32;
            let o = (dy * dw + dx) * 4;
            for c in 0..4 {
                dst[o + c] = ((acc[c] + n / 2) / n) as u8;
            }
        }
    }
}
