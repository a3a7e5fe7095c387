use backdrop::surface::{
    Backdrop, BackdropOptions, Host, Lifecycle, OffscreenHost, SurfaceSize, clamp_density,
};
use backdrop::theme::{PresetKind, ThemeKind};

fn options(theme: ThemeKind, fixed: bool) -> BackdropOptions {
    BackdropOptions {
        theme,
        preset: PresetKind::Indigo,
        fixed,
        seed: Some(21),
    }
}

/// Drive frames the way a host event loop would: one per pending request.
fn pump(backdrop: &mut Backdrop, host: &mut OffscreenHost, frames: usize, t0: f32) -> usize {
    let mut drawn = 0;
    for i in 0..frames {
        if !host.take_request() {
            break;
        }
        let stats = backdrop
            .on_frame(host, t0 + i as f32 / 60.0)
            .expect("offscreen present");
        if stats.is_some() {
            drawn += 1;
        }
    }
    drawn
}

#[test]
fn density_is_clamped_to_one_and_two() {
    assert_eq!(clamp_density(0.5), 1.0);
    assert_eq!(clamp_density(1.5), 1.5);
    assert_eq!(clamp_density(3.0), 2.0);
    assert_eq!(clamp_density(f32::NAN), 1.0);
    assert_eq!(SurfaceSize::new(100.0, 50.0, 3.0).backing(), (200, 100));
    assert_eq!(SurfaceSize::new(101.0, 51.0, 1.5).backing(), (152, 77));
    assert_eq!(SurfaceSize::new(100.0, 50.0, 0.25).backing(), (100, 50));
}

#[test]
fn mount_sizes_then_runs_and_requests_a_frame() {
    let mut host = OffscreenHost::new(320.0, 180.0, 2.0);
    let mut backdrop = Backdrop::new(options(ThemeKind::Waves, false));
    assert_eq!(backdrop.state(), Lifecycle::Uninitialized);

    backdrop.mount(&mut host);
    assert_eq!(backdrop.state(), Lifecycle::Running);
    assert_eq!(host.frame_requests, 1);
    let canvas = backdrop.canvas().expect("canvas after mount");
    assert_eq!((canvas.width(), canvas.height()), (640, 360));
    assert_eq!(canvas.logical_size(), (320.0, 180.0));

    assert_eq!(pump(&mut backdrop, &mut host, 5, 0.0), 5);
    assert_eq!(host.presents, 5);
    assert_eq!(host.last_frame_size, (640, 360));
    assert_eq!(host.last_frame.len(), 640 * 360 * 4);
    assert_eq!(host.frame_requests, 1, "exactly one request outstanding");
    assert_eq!(backdrop.frames(), 5);
}

#[test]
fn mount_twice_is_a_no_op() {
    let mut host = OffscreenHost::new(100.0, 100.0, 1.0);
    let mut backdrop = Backdrop::new(options(ThemeKind::Waves, false));
    backdrop.mount(&mut host);
    backdrop.mount(&mut host);
    assert_eq!(host.frame_requests, 1);
}

#[test]
fn contour_grid_matches_the_surface() {
    let mut host = OffscreenHost::new(1280.0, 720.0, 1.0);
    let mut backdrop = Backdrop::new(options(ThemeKind::Contour, false));
    assert_eq!(backdrop.grid_dims(), (0, 0));
    backdrop.mount(&mut host);
    assert_eq!(backdrop.grid_dims(), (216, 122));
}

#[test]
fn resize_is_idempotent_and_keeps_running() {
    let mut host = OffscreenHost::new(640.0, 360.0, 1.0);
    let mut backdrop = Backdrop::new(options(ThemeKind::Contour, false));
    backdrop.mount(&mut host);
    pump(&mut backdrop, &mut host, 2, 0.0);
    assert_eq!(backdrop.transitions(), 2, "uninitialized -> sized -> running");

    host.set_size(900.0, 600.0);
    backdrop.resize(&mut host);
    assert_eq!(backdrop.transitions(), 4, "running -> sized -> running");
    let dims = backdrop.grid_dims();
    let particles = backdrop.scene().map(|s| s.particles().len());
    assert_eq!(backdrop.state(), Lifecycle::Running);
    assert_eq!(particles, Some(60));

    backdrop.resize(&mut host);
    backdrop.resize(&mut host);
    assert_eq!(backdrop.grid_dims(), dims);
    assert_eq!(backdrop.state(), Lifecycle::Running);
    assert_eq!(backdrop.transitions(), 8);

    assert_eq!(pump(&mut backdrop, &mut host, 3, 1.0), 3);
    assert_eq!(host.last_frame_size, (900, 600));
}

#[test]
fn resize_to_zero_skips_drawing_but_keeps_the_loop() {
    let mut host = OffscreenHost::new(200.0, 100.0, 1.0);
    let mut backdrop = Backdrop::new(options(ThemeKind::Silk, false));
    backdrop.mount(&mut host);

    host.set_size(0.0, 0.0);
    backdrop.resize(&mut host);
    assert_eq!(pump(&mut backdrop, &mut host, 4, 0.0), 0);
    assert_eq!(host.presents, 0);
    assert_eq!(host.frame_requests, 1);
    assert_eq!(backdrop.state(), Lifecycle::Running);

    host.set_size(200.0, 100.0);
    backdrop.resize(&mut host);
    assert_eq!(pump(&mut backdrop, &mut host, 1, 1.0), 1);
}

#[test]
fn dispose_stops_drawing_and_scheduling() {
    let mut host = OffscreenHost::new(200.0, 100.0, 1.0);
    let mut backdrop = Backdrop::new(options(ThemeKind::Waves, false));
    backdrop.mount(&mut host);
    pump(&mut backdrop, &mut host, 2, 0.0);
    let presents = host.presents;

    backdrop.dispose(&mut host);
    assert_eq!(backdrop.state(), Lifecycle::Disposed);

    // The request issued by the last frame is still pending; it must not draw.
    assert!(host.take_request());
    let stats = backdrop.on_frame(&mut host, 5.0).expect("no error after dispose");
    assert!(stats.is_none());
    assert_eq!(host.presents, presents);
    assert_eq!(host.frame_requests, 0);

    let transitions = backdrop.transitions();
    backdrop.resize(&mut host);
    backdrop.dispose(&mut host);
    assert_eq!(backdrop.state(), Lifecycle::Disposed);
    assert_eq!(backdrop.transitions(), transitions);
    assert!(backdrop.canvas().is_none());
}

#[test]
fn fixed_mode_borrows_and_restores_the_page_background() {
    let mut host = OffscreenHost::new(200.0, 100.0, 1.0);
    host.page_background = Some([250, 250, 250]);

    let mut backdrop = Backdrop::new(options(ThemeKind::Waves, true));
    backdrop.mount(&mut host);
    assert_eq!(host.page_background, Some(PresetKind::Indigo.config().page_background));

    backdrop.set_style(ThemeKind::Waves, PresetKind::Sunset, &mut host);
    assert_eq!(host.page_background, Some(PresetKind::Sunset.config().page_background));

    backdrop.dispose(&mut host);
    assert_eq!(host.page_background, Some([250, 250, 250]));
}

#[test]
fn non_fixed_mode_leaves_the_page_alone() {
    let mut host = OffscreenHost::new(200.0, 100.0, 1.0);
    let mut backdrop = Backdrop::new(options(ThemeKind::Waves, false));
    backdrop.mount(&mut host);
    assert_eq!(host.page_background, None);
    backdrop.dispose(&mut host);
    assert_eq!(host.page_background, None);
}

#[test]
fn host_without_2d_keeps_the_backdrop_inert() {
    let mut host = OffscreenHost::new(200.0, 100.0, 1.0).without_2d();
    host.page_background = Some([1, 2, 3]);
    let mut backdrop = Backdrop::new(options(ThemeKind::Contour, true));

    backdrop.mount(&mut host);
    assert!(backdrop.is_inert());
    assert_eq!(backdrop.state(), Lifecycle::Uninitialized);
    assert_eq!(host.frame_requests, 0);
    assert_eq!(host.page_background, Some([1, 2, 3]));

    backdrop.resize(&mut host);
    assert!(backdrop.on_frame(&mut host, 0.0).expect("inert frame").is_none());
    backdrop.dispose(&mut host);
    assert_eq!(host.presents, 0);
    assert_eq!(host.page_background, Some([1, 2, 3]));
}

#[test]
fn style_switch_at_runtime_reinitialises() {
    let mut host = OffscreenHost::new(400.0, 240.0, 1.0);
    let mut backdrop = Backdrop::new(options(ThemeKind::Waves, false));
    backdrop.mount(&mut host);
    pump(&mut backdrop, &mut host, 1, 0.0);
    assert_eq!(backdrop.grid_dims(), (0, 0));

    backdrop.set_style(ThemeKind::Contour, PresetKind::Teal, &mut host);
    assert_eq!(backdrop.style().theme_kind(), ThemeKind::Contour);
    assert_eq!(backdrop.options().preset, PresetKind::Teal);
    assert_eq!(backdrop.grid_dims(), (69, 42));
    assert_eq!(backdrop.state(), Lifecycle::Running);

    let mut drawn = None;
    if host.take_request() {
        drawn = backdrop.on_frame(&mut host, 0.1).expect("frame");
    }
    let stats = drawn.expect("frame after style change");
    assert_eq!(stats.contour_levels, 24);
    assert_eq!(stats.waves, 0);
}

#[test]
fn seeded_instances_are_reproducible_and_independent() {
    let mut host_a = OffscreenHost::new(160.0, 90.0, 1.0);
    let mut host_b = OffscreenHost::new(160.0, 90.0, 1.0);
    let mut a = Backdrop::new(options(ThemeKind::Contour, false));
    let mut b = Backdrop::new(options(ThemeKind::Contour, false));
    a.mount(&mut host_a);
    b.mount(&mut host_b);

    pump(&mut a, &mut host_a, 1, 0.0);
    pump(&mut b, &mut host_b, 1, 0.0);
    assert_eq!(host_a.last_frame, host_b.last_frame);

    let mut host_c = OffscreenHost::new(160.0, 90.0, 1.0);
    let mut c = Backdrop::new(BackdropOptions {
        seed: Some(22),
        ..options(ThemeKind::Contour, false)
    });
    c.mount(&mut host_c);
    pump(&mut c, &mut host_c, 1, 0.0);
    assert_ne!(host_a.last_frame, host_c.last_frame);
}

#[test]
fn offscreen_host_rejects_empty_frames() {
    let mut host = OffscreenHost::new(0.0, 0.0, 1.0);
    let mut canvas = backdrop::canvas::Canvas::new(0, 0, 1.0);
    assert!(host.present(&mut canvas).is_err());
    assert_eq!(host.measure(), SurfaceSize::new(0.0, 0.0, 1.0));
}
