use backdrop::surface::BackdropOptions;
use backdrop::theme::{Foreground, PRESETS, PresetKind, Style, THEMES, ThemeKind};

#[test]
fn unknown_tags_fall_back_to_defaults() {
    assert_eq!(ThemeKind::from_tag("foo"), ThemeKind::Waves);
    assert_eq!(ThemeKind::from_tag(""), ThemeKind::DEFAULT);
    assert_eq!(PresetKind::from_tag("chartreuse"), PresetKind::Indigo);
    assert_eq!(ThemeKind::parse("foo"), None);

    let style = Style::resolve("foo", "bar");
    assert_eq!(style.theme_kind(), ThemeKind::DEFAULT);
    assert_eq!(style.preset_kind(), PresetKind::DEFAULT);
    assert_eq!(style, Style::default());

    let opts = BackdropOptions::from_tags("nope", "nope");
    assert_eq!(opts.theme, ThemeKind::Waves);
    assert_eq!(opts.preset, PresetKind::Indigo);
    assert!(!opts.fixed);
    assert_eq!(opts.seed, None);
}

#[test]
fn tags_are_case_insensitive_and_round_trip() {
    assert_eq!(ThemeKind::parse("  CONTOUR "), Some(ThemeKind::Contour));
    assert_eq!(ThemeKind::parse("Silk"), Some(ThemeKind::Silk));
    assert_eq!(PresetKind::parse("Sunset"), Some(PresetKind::Sunset));
    for t in ThemeKind::all() {
        assert_eq!(ThemeKind::parse(t.tag()), Some(t));
    }
    for p in PresetKind::all() {
        assert_eq!(PresetKind::parse(p.tag()), Some(p));
    }
}

#[test]
fn every_combination_resolves_to_its_own_tables() {
    for t in ThemeKind::all() {
        for p in PresetKind::all() {
            let style = Style::resolve(t.tag(), p.tag());
            assert_eq!(style.theme_kind(), t);
            assert_eq!(style.preset_kind(), p);
            assert_eq!(style.theme.kind, t);
            assert_eq!(style.preset.kind, p);
        }
    }
}

#[test]
fn tables_are_indexed_by_kind() {
    for (i, t) in ThemeKind::all().into_iter().enumerate() {
        assert_eq!(THEMES[i].kind, t);
    }
    for (i, p) in PresetKind::all().into_iter().enumerate() {
        assert_eq!(PRESETS[i].kind, p);
    }
}

#[test]
fn cycling_visits_everything_once() {
    let mut t = ThemeKind::DEFAULT;
    let mut seen = Vec::new();
    for _ in 0..ThemeKind::all().len() {
        seen.push(t);
        t = t.next();
    }
    assert_eq!(t, ThemeKind::DEFAULT);
    seen.sort_by_key(|k| k.tag());
    seen.dedup();
    assert_eq!(seen.len(), ThemeKind::all().len());

    let mut p = PresetKind::DEFAULT;
    for _ in 0..PresetKind::all().len() {
        p = p.next();
    }
    assert_eq!(p, PresetKind::DEFAULT);
}

#[test]
fn only_the_contour_theme_draws_contours() {
    for t in ThemeKind::all() {
        let cfg = t.config();
        assert_eq!(cfg.is_contour(), t == ThemeKind::Contour);
        assert!(cfg.grid_spacing > 0.0);
        assert!((0.0..=1.0).contains(&cfg.noise_alpha));
        assert!((0.0..=1.0).contains(&cfg.vignette_alpha));
    }
    let Foreground::Contours(c) = ThemeKind::Contour.config().foreground else {
        panic!("contour theme lost its contour tuning");
    };
    assert_eq!(c.cell_size, 6.0);
    assert_eq!(c.levels, 24);
    assert_eq!((c.level_lo, c.level_hi), (-0.42, 0.42));
    assert_eq!(c.field_scale, 0.0036);
    assert_eq!(ThemeKind::Contour.config().grid_spacing, 64.0);
    assert_eq!(ThemeKind::Waves.config().grid_spacing, 48.0);
}

#[test]
fn preset_alphas_are_valid() {
    for p in &PRESETS {
        for c in [
            p.accent_inner,
            p.accent_outer,
            p.grid_major,
            p.grid_minor,
            p.contour_fill,
            p.contour_glow,
            p.contour_lines[0],
            p.contour_lines[1],
        ] {
            assert!((0.0..=1.0).contains(&c.a), "{}: alpha {}", p.kind.tag(), c.a);
        }
        assert_ne!(p.page_background, [0, 0, 0]);
    }
}
