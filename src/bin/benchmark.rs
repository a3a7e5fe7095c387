use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use backdrop::scene::FrameStats;
use backdrop::surface::{Backdrop, BackdropOptions, OffscreenHost};
use backdrop::theme::{PresetKind, ThemeKind};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "benchmark", about = "Per theme x preset frame cost of the backdrop renderer")]
struct Args {
    #[arg(long, default_value_t = 120)]
    frames: usize,

    /// Logical width.
    #[arg(long, default_value_t = 960)]
    w: usize,

    /// Logical height.
    #[arg(long, default_value_t = 540)]
    h: usize,

    #[arg(long, default_value_t = 1.0)]
    density: f32,

    /// Only benchmark this theme.
    #[arg(long)]
    theme: Option<String>,

    /// Fail when a combination never changes between frames or exceeds --max-ms.
    #[arg(long, default_value_t = false)]
    ci_smoke: bool,

    #[arg(long, default_value_t = 40.0)]
    max_ms: f64,

    #[arg(long, default_value_t = 7)]
    seed: u64,
}

struct Outcome {
    ms: f64,
    moving: usize,
    last: FrameStats,
}

fn bench_one(args: &Args, theme: ThemeKind, preset: PresetKind) -> Result<Outcome> {
    let mut host = OffscreenHost::new(args.w as f32, args.h as f32, args.density);
    let mut backdrop = Backdrop::new(BackdropOptions {
        theme,
        preset,
        fixed: false,
        seed: Some(args.seed),
    });
    backdrop.mount(&mut host);

    let mut prev: Vec<u8> = Vec::new();
    let mut moving = 0usize;
    let mut last = FrameStats::default();
    let mut spent = Duration::ZERO;

    for f in 0..args.frames {
        if !host.take_request() {
            bail!("{}/{}: loop stopped at frame {f}", theme.tag(), preset.tag());
        }
        let t = f as f32 / 60.0;
        let start = Instant::now();
        let stats = backdrop.on_frame(&mut host, t)?;
        spent += start.elapsed();
        if let Some(stats) = stats {
            last = stats;
        }
        if !prev.is_empty() && prev != host.last_frame {
            moving += 1;
        }
        prev.clone_from(&host.last_frame);
    }
    backdrop.dispose(&mut host);

    Ok(Outcome {
        ms: spent.as_secs_f64() * 1000.0 / args.frames.max(1) as f64,
        moving,
        last,
    })
}

fn describe_stats(s: &FrameStats) -> String {
    format!(
        "segments={:>5} chains={:>4} particles={:>3} draws={}",
        s.segments, s.chains, s.particles, s.draw_calls
    )
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();
    let args = Args::parse();
    let frames = args.frames.max(2);
    let args = Args { frames, ..args };

    let themes: Vec<ThemeKind> = match args.theme.as_deref() {
        Some(tag) => vec![ThemeKind::from_tag(tag)],
        None => ThemeKind::all().to_vec(),
    };

    println!(
        "benchmark: themes={} presets={} frames={} size={}x{} density={}",
        themes.len(),
        PresetKind::all().len(),
        args.frames,
        args.w,
        args.h,
        args.density
    );

    let mut total_ms = 0.0f64;
    let mut runs = 0usize;
    let mut still = Vec::<String>::new();
    let mut slow = Vec::<(String, f64)>::new();

    for theme in themes {
        for preset in PresetKind::all() {
            let name = format!("{}/{}", theme.tag(), preset.tag());
            let o = bench_one(&args, theme, preset)?;
            println!(
                "{:<16} {:>8.3} ms/frame  moving={:>3}/{}  {}",
                name,
                o.ms,
                o.moving,
                args.frames - 1,
                describe_stats(&o.last)
            );
            total_ms += o.ms;
            runs += 1;
            if o.moving == 0 {
                still.push(name.clone());
            }
            if args.ci_smoke && o.ms > args.max_ms {
                slow.push((name, o.ms));
            }
        }
    }

    let avg_ms = total_ms / runs.max(1) as f64;
    let fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };
    println!("summary: {:>8.3} ms/frame avg  {:>7.2} FPS", avg_ms, fps);

    if args.ci_smoke {
        if !still.is_empty() || !slow.is_empty() {
            eprintln!("CI smoke: FAIL");
            if !still.is_empty() {
                eprintln!("  static combinations: {}", still.join(", "));
            }
            for (name, ms) in slow {
                eprintln!("  slow: {} ({:.3} ms/frame > {:.3})", name, ms, args.max_ms);
            }
            bail!("ci smoke failed");
        }
        println!("CI smoke: PASS (max_ms={:.3})", args.max_ms);
    }
    Ok(())
}
