use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use anyhow::{Context, Result, anyhow, bail};
use backdrop::surface::{Backdrop, BackdropOptions, OffscreenHost, SurfaceSize, clamp_density};
use backdrop::theme::{PresetKind, ThemeKind};
use clap::Parser;

const DEFAULT_OUTPUT: &str = "backdrop.mp4";
const DEFAULT_SEED: u64 = 0xB4C0_D20F;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "export_video",
    version,
    about = "Offline backdrop export (rawvideo -> MP4 via ffmpeg)"
)]
pub(crate) struct Cli {
    #[arg(long, value_name = "MP4", default_value = DEFAULT_OUTPUT)]
    pub(crate) out: PathBuf,

    /// Logical width.
    #[arg(long, default_value_t = 1280)]
    pub(crate) width: usize,

    /// Logical height.
    #[arg(long, default_value_t = 720)]
    pub(crate) height: usize,

    /// Device pixel density; the encoded video is `width*density x height*density`.
    #[arg(long, default_value_t = 1.0)]
    pub(crate) density: f32,

    #[arg(long, default_value_t = 60)]
    pub(crate) fps: u32,

    #[arg(long, value_name = "SECONDS", default_value_t = 10.0)]
    pub(crate) duration: f32,

    #[arg(long, default_value = "waves")]
    pub(crate) theme: String,

    #[arg(long, default_value = "indigo")]
    pub(crate) preset: String,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,
}

pub(crate) fn compute_frame_count(duration_s: f32, fps: u32) -> usize {
    ((duration_s.max(0.0) * fps as f32).floor() as usize).max(1)
}

/// Even dimensions for yuv420p.
pub(crate) fn encoded_size(width: usize, height: usize, density: f32) -> (usize, usize) {
    let size = SurfaceSize::new(width as f32, height as f32, density);
    let (w, h) = size.backing();
    (w & !1, h & !1)
}

pub(crate) fn validate_args(args: &Cli) -> Result<()> {
    if args.width < 2 {
        bail!("--width must be >= 2");
    }
    if args.height < 2 {
        bail!("--height must be >= 2");
    }
    if args.fps == 0 {
        bail!("--fps must be >= 1");
    }
    if !(args.duration > 0.0) || !args.duration.is_finite() {
        bail!("--duration must be > 0 seconds");
    }
    if !args.density.is_finite() {
        bail!("--density must be a finite number");
    }
    Ok(())
}

pub(crate) fn options_for(args: &Cli) -> BackdropOptions {
    BackdropOptions {
        theme: ThemeKind::from_tag(&args.theme),
        preset: PresetKind::from_tag(&args.preset),
        fixed: false,
        seed: Some(args.seed),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();
    let args = Cli::parse();
    run(args)
}

fn run(args: Cli) -> Result<()> {
    validate_args(&args)?;
    ensure_ffmpeg_available()?;

    let frame_count = compute_frame_count(args.duration, args.fps);
    let (enc_w, enc_h) = encoded_size(args.width, args.height, args.density);
    let density = clamp_density(args.density);

    let mut host = OffscreenHost::new(enc_w as f32 / density, enc_h as f32 / density, density);
    let mut backdrop = Backdrop::new(options_for(&args));
    backdrop.mount(&mut host);
    if backdrop.is_inert() {
        bail!("offscreen host refused to draw");
    }

    let mut parent = args.out.parent().unwrap_or_else(|| Path::new(""));
    if parent == Path::new("") {
        parent = Path::new(".");
    }
    fs::create_dir_all(parent)
        .with_context(|| format!("create output directory {}", parent.display()))?;

    let mut ffmpeg = spawn_ffmpeg(&args.out, enc_w, enc_h, args.fps)?;
    let mut ffmpeg_in = ffmpeg
        .stdin
        .take()
        .context("failed to open ffmpeg stdin for rawvideo input")?;

    let started = Instant::now();
    render_frames(
        &mut backdrop,
        &mut host,
        frame_count,
        args.fps,
        (enc_w, enc_h),
        &mut ffmpeg_in,
    )?;
    drop(ffmpeg_in);
    backdrop.dispose(&mut host);

    let status = ffmpeg.wait().context("wait for ffmpeg")?;
    if !status.success() {
        bail!("ffmpeg exited with status {status}");
    }

    println!(
        "exported {} frames ({} / {}) @ {} fps, {}x{} in {:.2}s -> {}",
        frame_count,
        backdrop.style().theme_kind().tag(),
        backdrop.style().preset_kind().tag(),
        args.fps,
        enc_w,
        enc_h,
        started.elapsed().as_secs_f32(),
        args.out.display()
    );
    Ok(())
}

pub(crate) fn render_frames(
    backdrop: &mut Backdrop,
    host: &mut OffscreenHost,
    frame_count: usize,
    fps: u32,
    size: (usize, usize),
    out: &mut dyn Write,
) -> Result<()> {
    for i in 0..frame_count {
        if !host.take_request() {
            bail!("backdrop stopped requesting frames at frame {i}");
        }
        let t = i as f32 / fps as f32;
        backdrop
            .on_frame(host, t)
            .with_context(|| format!("render frame {i}"))?;
        if host.last_frame_size != size {
            bail!(
                "frame {i} is {}x{}, expected {}x{}",
                host.last_frame_size.0,
                host.last_frame_size.1,
                size.0,
                size.1
            );
        }
        out.write_all(&host.last_frame)
            .with_context(|| format!("write frame {i} to ffmpeg"))?;
    }
    Ok(())
}

fn ensure_ffmpeg_available() -> Result<()> {
    match Command::new("ffmpeg")
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            bail!("ffmpeg not found in PATH (install ffmpeg and retry)")
        }
        Err(err) => Err(anyhow!("failed to run ffmpeg: {err}")),
    }
}

fn spawn_ffmpeg(
    out_path: &Path,
    width: usize,
    height: usize,
    fps: u32,
) -> Result<std::process::Child> {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-hide_banner")
        .arg("-loglevel")
        .arg("error")
        .arg("-y")
        .arg("-f")
        .arg("rawvideo")
        .arg("-pix_fmt")
        .arg("rgba")
        .arg("-video_size")
        .arg(format!("{width}x{height}"))
        .arg("-framerate")
        .arg(fps.to_string())
        .arg("-i")
        .arg("-")
        .arg("-c:v")
        .arg("libx264")
        .arg("-pix_fmt")
        .arg("yuv420p")
        .arg("-movflags")
        .arg("+faststart")
        .arg(out_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    cmd.spawn()
        .with_context(|| format!("spawn ffmpeg for {}", out_path.display()))
}
