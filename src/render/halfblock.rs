use crate::error::{BackdropError, Result};
use crate::render::{Frame, resample_rgba};
use std::io::Write;

const HALF_BLOCK: char = '\u{2580}';

/// Truecolor half-block painter: each cell shows two vertically stacked
/// pixels, the upper one as foreground and the lower one as background.
pub struct HalfBlockPresenter {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
    scratch: Vec<u8>,
}

impl Default for HalfBlockPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl HalfBlockPresenter {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
            scratch: Vec::new(),
        }
    }

    /// Pixel grid the terminal can show for `cols x visual_rows` cells.
    pub fn cell_pixels(cols: u16, visual_rows: u16) -> (usize, usize) {
        (cols as usize, visual_rows as usize * 2)
    }

    pub fn present(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> Result<()> {
        let (cols, px_h) = Self::cell_pixels(frame.term_cols, frame.visual_rows);
        let visual_rows = frame.visual_rows as usize;
        if cols == 0 || visual_rows == 0 || frame.pixel_width == 0 || frame.pixel_height == 0 {
            return Ok(());
        }

        let need = frame.pixel_width * frame.pixel_height * 4;
        if frame.pixels_rgba.len() < need {
            return Err(BackdropError::present(format!(
                "pixel buffer too small (need {need}, got {})",
                frame.pixels_rgba.len()
            )));
        }

        let mut scratch = std::mem::take(&mut self.scratch);
        resample_rgba(
            frame.pixels_rgba,
            frame.pixel_width,
            frame.pixel_height,
            cols,
            px_h,
            &mut scratch,
        );
        let painted = if scratch.len() == cols * px_h * 4 {
            self.paint(frame, &scratch, cols, visual_rows, out)
        } else {
            Ok(())
        };
        self.scratch = scratch;
        painted
    }

    fn paint(
        &mut self,
        frame: &Frame<'_>,
        px: &[u8],
        cols: usize,
        visual_rows: usize,
        out: &mut dyn Write,
    ) -> Result<()> {
        if frame.sync_updates {
            out.write_all(b"\x1b[?2026h")?;
        }
        out.write_all(b"\x1b[H\x1b[0m")?;
        // No autowrap while painting full-width rows.
        out.write_all(b"\x1b[?7l")?;
        self.last_fg = None;
        self.last_bg = None;

        for row in 0..visual_rows {
            let top_y = row * 2;
            let bot_y = top_y + 1;
            for x in 0..cols {
                let ti = (top_y * cols + x) * 4;
                let bi = (bot_y * cols + x) * 4;
                let top = (px[ti], px[ti + 1], px[ti + 2]);
                let bot = (px[bi], px[bi + 1], px[bi + 2]);

                if self.last_fg != Some(top) {
                    write!(out, "\x1b[38;2;{};{};{}m", top.0, top.1, top.2)?;
                    self.last_fg = Some(top);
                }
                if self.last_bg != Some(bot) {
                    write!(out, "\x1b[48;2;{};{};{}m", bot.0, bot.1, bot.2)?;
                    self.last_bg = Some(bot);
                }
                write!(out, "{HALF_BLOCK}")?;
            }
            out.write_all(b"\r\n")?;
        }

        let mut hud_lines = frame.hud.lines();
        for i in 0..(frame.hud_rows as usize) {
            write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", visual_rows + i + 1)?;
            if let Some(line) = hud_lines.next() {
                let clipped: String = line.chars().take(cols).collect();
                write!(out, "{clipped}")?;
            }
        }

        out.write_all(b"\x1b[?7h")?;
        if frame.sync_updates {
            out.write_all(b"\x1b[?2026l")?;
        }
        out.flush()?;
        Ok(())
    }
}
