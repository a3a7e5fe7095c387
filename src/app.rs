use crate::canvas::{Canvas, Rgb};
use crate::config::{Config, LogLevel};
use crate::error::Result as BackdropResult;
use crate::render::{Frame, HalfBlockPresenter};
use crate::surface::{Backdrop, BackdropOptions, Host, SurfaceSize};
use crate::terminal::{TerminalGuard, write_default_background};
use crate::theme::{PresetKind, ThemeKind};
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::fs::File;
use std::io::{BufWriter, Stdout};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub fn run(cfg: Config) -> anyhow::Result<()> {
    init_file_logging(cfg.log_file.as_deref(), cfg.log_level)?;

    let last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.1 < 2 || last_size.0 < 4 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let _term = TerminalGuard::new()?;
    let mut host = TerminalHost::new(&cfg, last_size);

    let options = BackdropOptions {
        theme: ThemeKind::from_tag(&cfg.theme),
        preset: PresetKind::from_tag(&cfg.preset),
        fixed: cfg.fixed,
        seed: cfg.seed,
    };
    let mut backdrop = Backdrop::new(options);
    backdrop.mount(&mut host);
    if backdrop.is_inert() {
        anyhow::bail!("terminal host cannot draw");
    }

    let result = drive(&cfg, &mut backdrop, &mut host);
    backdrop.dispose(&mut host);
    tracing::info!(frames = backdrop.frames(), "exiting");
    result
}

fn drive(cfg: &Config, backdrop: &mut Backdrop, host: &mut TerminalHost) -> anyhow::Result<()> {
    let start = Instant::now();
    let target = cfg.frame_budget();
    let mut fps = FpsCounter::new();

    loop {
        let now = Instant::now();

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    match handle_key(k.code, k.modifiers) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::NextTheme => {
                            let style = backdrop.style();
                            let (theme, preset) = (style.theme_kind().next(), style.preset_kind());
                            backdrop.set_style(theme, preset, host);
                        }
                        KeyAction::NextPreset => {
                            let style = backdrop.style();
                            let (theme, preset) = (style.theme_kind(), style.preset_kind().next());
                            backdrop.set_style(theme, preset, host);
                        }
                        KeyAction::ToggleHud => {
                            host.show_hud = !host.show_hud;
                            backdrop.resize(host);
                        }
                        KeyAction::None => {}
                    }
                }
                Event::Resize(c, r) => {
                    host.term_size = (c, r);
                    backdrop.resize(host);
                }
                _ => {}
            }
        }

        // Resize events can be missed in some terminals.
        let sz = crossterm::terminal::size()?;
        if sz != host.term_size {
            host.term_size = sz;
            backdrop.resize(host);
        }

        if host.take_request() {
            let style = backdrop.style();
            host.hud = format!(
                "{} / {}  {:>5.1} fps  [t] theme  [p] preset  [h] hud  [q] quit",
                style.theme_kind().tag(),
                style.preset_kind().tag(),
                fps.fps(),
            );
            let t = start.elapsed().as_secs_f32();
            backdrop.on_frame(host, t).context("present frame")?;
            fps.tick();
        }

        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
    NextTheme,
    NextPreset,
    ToggleHud,
}

pub fn handle_key(code: KeyCode, mods: KeyModifiers) -> KeyAction {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return KeyAction::Quit;
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Char('t') | KeyCode::Char('T') => KeyAction::NextTheme,
        KeyCode::Char('p') | KeyCode::Char('P') => KeyAction::NextPreset,
        KeyCode::Char('h') | KeyCode::Char('H') => KeyAction::ToggleHud,
        _ => KeyAction::None,
    }
}

/// Route `tracing` output to `path`. Without a path nothing is installed:
/// stderr would draw over the picture.
pub fn init_file_logging(path: Option<&Path>, level: LogLevel) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level.as_tracing())
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {e}"))?;
    Ok(())
}

/// The interactive terminal as a backdrop host. One logical pixel is
/// `1 / pixel_scale` of a half-cell.
pub struct TerminalHost {
    out: BufWriter<Stdout>,
    presenter: HalfBlockPresenter,
    term_size: (u16, u16),
    pixel_scale: f32,
    density: f32,
    sync_updates: bool,
    show_hud: bool,
    hud: String,
    pending_frame: bool,
}

impl TerminalHost {
    fn new(cfg: &Config, term_size: (u16, u16)) -> Self {
        Self {
            out: BufWriter::new(TerminalGuard::stdout()),
            presenter: HalfBlockPresenter::new(),
            term_size,
            pixel_scale: cfg.pixel_scale(),
            density: cfg.density,
            sync_updates: cfg.sync_updates,
            show_hud: cfg.hud,
            hud: String::new(),
            pending_frame: false,
        }
    }

    fn hud_rows(&self) -> u16 {
        if self.show_hud && self.term_size.1 >= 4 {
            1
        } else {
            0
        }
    }

    fn visual_rows(&self) -> u16 {
        self.term_size.1.saturating_sub(self.hud_rows())
    }

    fn take_request(&mut self) -> bool {
        std::mem::take(&mut self.pending_frame)
    }
}

impl Host for TerminalHost {
    fn measure(&self) -> SurfaceSize {
        let (cols, _) = self.term_size;
        SurfaceSize::new(
            cols as f32 * self.pixel_scale,
            self.visual_rows() as f32 * 2.0 * self.pixel_scale,
            self.density,
        )
    }

    fn set_page_background(&mut self, color: Option<Rgb>) {
        if let Err(err) = write_default_background(&mut self.out, color) {
            tracing::warn!(%err, "could not set terminal background");
        }
    }

    fn request_frame(&mut self) {
        self.pending_frame = true;
    }

    fn present(&mut self, canvas: &mut Canvas) -> BackdropResult<()> {
        let (w, h) = (canvas.width(), canvas.height());
        let frame = Frame {
            term_cols: self.term_size.0,
            visual_rows: self.visual_rows(),
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: canvas.to_rgba8(),
            hud: &self.hud,
            hud_rows: self.hud_rows(),
            sync_updates: self.sync_updates,
        };
        self.presenter.present(&frame, &mut self.out)
    }
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
