//! Tests for intensity accumulation on a pixmap surface.

use heatmap_common::GeoPoint;
use renderer::rasterize::{IntensityBounds, IntensityRasterizer, MIN_OPACITY};
use renderer::stamp::StampKernel;
use renderer::surface::{PixmapSurface, RenderSurface, ViewTransform};
use test_utils::{assert_approx_eq, blue_red_style, LinearView};

fn alpha(surface: &PixmapSurface, x: u32, y: u32) -> u8 {
    surface.pixel(x, y).map(|p| p[3]).unwrap_or(0)
}

fn setup() -> (IntensityRasterizer, PixmapSurface, LinearView) {
    (
        IntensityRasterizer::new(),
        PixmapSurface::new(100, 100).unwrap(),
        LinearView::new(100, 100),
    )
}

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn test_normalized_weights_lie_in_unit_interval() {
    let weights = [3.0, -1.5, 8.25, 0.0, 8.25, 2.0];
    let bounds = IntensityBounds::from_weights(weights, None, None);
    for w in weights {
        let n = bounds.normalize(w);
        assert!((0.0..=1.0).contains(&n), "{} -> {}", w, n);
    }
    assert_eq!(bounds.normalize(-1.5), 0.0);
    assert_eq!(bounds.normalize(8.25), 1.0);
}

#[test]
fn test_range_never_below_one() {
    let bounds = IntensityBounds::new(0.2, 0.4);
    assert_eq!(bounds.range(), 1.0);
    assert_approx_eq!(bounds.normalize(0.4), 0.2, 1e-12);
}

// ============================================================================
// Accumulation
// ============================================================================

#[test]
fn test_no_points_leaves_surface_transparent() {
    let (mut rasterizer, mut surface, view) = setup();
    let style = blue_red_style(5.0, 5.0);
    let stats = rasterizer
        .render(&mut surface, &view, &style, Vec::new(), IntensityBounds::default())
        .unwrap();
    assert_eq!(stats.drawn, 0);
    assert!(surface.to_rgba().iter().all(|&b| b == 0));
}

#[test]
fn test_render_clears_previous_content() {
    let (mut rasterizer, mut surface, view) = setup();
    let style = blue_red_style(4.0, 0.0);
    let bounds = IntensityBounds::new(0.0, 1.0);

    rasterizer
        .render(&mut surface, &view, &style, vec![(GeoPoint::new(0.0, 0.0), 1.0)], bounds)
        .unwrap();
    assert_eq!(alpha(&surface, 50, 50), 255);

    rasterizer
        .render(&mut surface, &view, &style, vec![(GeoPoint::new(30.0, 0.0), 1.0)], bounds)
        .unwrap();
    assert_eq!(alpha(&surface, 50, 50), 0);
    assert_eq!(alpha(&surface, 80, 50), 255);
}

#[test]
fn test_stamp_is_centered_on_the_point() {
    let (mut rasterizer, mut surface, view) = setup();
    let style = blue_red_style(4.0, 0.0);
    rasterizer
        .render(
            &mut surface,
            &view,
            &style,
            vec![(GeoPoint::new(0.0, 0.0), 1.0)],
            IntensityBounds::new(0.0, 1.0),
        )
        .unwrap();

    // Glyph covers [46, 54) on both axes.
    assert_eq!(alpha(&surface, 49, 49), 255);
    assert_eq!(alpha(&surface, 50, 50), 255);
    assert_eq!(alpha(&surface, 45, 50), 0);
    assert_eq!(alpha(&surface, 54, 50), 0);
    assert_eq!(alpha(&surface, 50, 45), 0);
}

#[test]
fn test_points_at_or_below_minimum_are_skipped() {
    let (mut rasterizer, mut surface, view) = setup();
    let style = blue_red_style(4.0, 0.0);
    let points = vec![
        (GeoPoint::new(-30.0, 0.0), 0.0),
        (GeoPoint::new(0.0, 0.0), -5.0),
        (GeoPoint::new(30.0, 0.0), f64::NAN),
    ];
    let stats = rasterizer
        .render(&mut surface, &view, &style, points, IntensityBounds::new(0.0, 10.0))
        .unwrap();
    assert_eq!(stats.drawn, 0);
    assert_eq!(stats.skipped, 3);
    assert!(surface.to_rgba().iter().all(|&b| b == 0));
}

#[test]
fn test_unprojectable_points_are_skipped() {
    let (mut rasterizer, mut surface, view) = setup();
    let style = blue_red_style(4.0, 0.0);
    let points = vec![
        (GeoPoint::new(f64::NAN, 0.0), 1.0),
        (GeoPoint::new(f64::INFINITY, 0.0), 1.0),
        (GeoPoint::new(0.0, 0.0), 1.0),
    ];
    let stats = rasterizer
        .render(&mut surface, &view, &style, points, IntensityBounds::new(0.0, 1.0))
        .unwrap();
    assert_eq!(stats.drawn, 1);
    assert_eq!(stats.skipped, 2);
}

#[test]
fn test_opacity_follows_normalized_weight() {
    let (mut rasterizer, mut surface, view) = setup();
    let style = blue_red_style(4.0, 0.0);
    rasterizer
        .render(
            &mut surface,
            &view,
            &style,
            vec![(GeoPoint::new(0.0, 0.0), 5.0)],
            IntensityBounds::new(0.0, 10.0),
        )
        .unwrap();
    let a = alpha(&surface, 50, 50);
    assert!((126..=129).contains(&a), "alpha {}", a);
}

#[test]
fn test_overlapping_points_accumulate() {
    let (mut rasterizer, mut surface, view) = setup();
    let style = blue_red_style(4.0, 0.0);
    let bounds = IntensityBounds::new(0.0, 10.0);
    let p = GeoPoint::new(0.0, 0.0);

    rasterizer
        .render(&mut surface, &view, &style, vec![(p, 5.0)], bounds)
        .unwrap();
    let single = alpha(&surface, 50, 50);

    rasterizer
        .render(&mut surface, &view, &style, vec![(p, 5.0), (p, 5.0)], bounds)
        .unwrap();
    let double = alpha(&surface, 50, 50);

    // Source-over: 1 - (1 - 0.5)^2 = 0.75
    assert!(double > single);
    assert!((188..=194).contains(&double), "alpha {}", double);
}

#[test]
fn test_faint_points_use_minimum_opacity() {
    let (mut rasterizer, mut surface, view) = setup();
    let style = blue_red_style(4.0, 0.0);
    rasterizer
        .render(
            &mut surface,
            &view,
            &style,
            vec![(GeoPoint::new(0.0, 0.0), 0.0001)],
            IntensityBounds::new(0.0, 1.0),
        )
        .unwrap();
    let a = alpha(&surface, 50, 50);
    assert!(a > 0 && f64::from(a) <= (MIN_OPACITY * 255.0).ceil() + 1.0, "alpha {}", a);
}

#[test]
fn test_weights_above_maximum_clamp_to_opaque() {
    let (mut rasterizer, mut surface, view) = setup();
    let style = blue_red_style(4.0, 0.0);
    rasterizer
        .render(
            &mut surface,
            &view,
            &style,
            vec![(GeoPoint::new(0.0, 0.0), 50.0)],
            IntensityBounds::new(0.0, 10.0),
        )
        .unwrap();
    assert_eq!(alpha(&surface, 50, 50), 255);
}

#[test]
fn test_equal_opacities_are_set_once() {
    let (mut rasterizer, mut surface, view) = setup();
    let style = blue_red_style(2.0, 0.0);
    let points: Vec<_> = (0..5)
        .map(|i| (GeoPoint::new(i as f64 * 10.0 - 20.0, 0.0), 7.0))
        .collect();
    let stats = rasterizer
        .render(&mut surface, &view, &style, points, IntensityBounds::new(0.0, 10.0))
        .unwrap();
    assert_eq!(stats.drawn, 5);
    assert_eq!(rasterizer.render_state().writes(), 1);
}

#[test]
fn test_earlier_points_are_drawn_last() {
    // Drawing order only matters through the final global alpha left on the
    // surface; the first point's opacity must be the last one applied.
    let (mut rasterizer, mut surface, view) = setup();
    let style = blue_red_style(2.0, 0.0);
    let points = vec![
        (GeoPoint::new(-10.0, 0.0), 2.0),
        (GeoPoint::new(10.0, 0.0), 8.0),
    ];
    rasterizer
        .render(&mut surface, &view, &style, points, IntensityBounds::new(0.0, 10.0))
        .unwrap();
    assert_eq!(rasterizer.render_state().writes(), 2);

    // A third glyph drawn now inherits the first point's opacity (0.2).
    let kernel = StampKernel::build(2.0, 0.0).unwrap();
    surface.draw_glyph(&kernel, 48, 48);
    let a = alpha(&surface, 50, 50);
    assert!((49..=53).contains(&a), "alpha {}", a);
}

// ============================================================================
// Surface state and placement
// ============================================================================

#[test]
fn test_render_clears_display_transform() {
    let (mut rasterizer, mut surface, view) = setup();
    surface.set_display_transform(Some(ViewTransform {
        scale: 1.5,
        ..ViewTransform::IDENTITY
    }));
    rasterizer
        .render(
            &mut surface,
            &view,
            &blue_red_style(3.0, 0.0),
            vec![(GeoPoint::new(0.0, 0.0), 1.0)],
            IntensityBounds::new(0.0, 1.0),
        )
        .unwrap();
    assert_eq!(surface.display_transform(), None);
}

#[test]
fn test_unbuildable_stamp_leaves_surface_alone() {
    let (mut rasterizer, mut surface, view) = setup();
    let style = blue_red_style(3.0, 0.0);
    rasterizer
        .render(
            &mut surface,
            &view,
            &style,
            vec![(GeoPoint::new(0.0, 0.0), 1.0)],
            IntensityBounds::new(0.0, 1.0),
        )
        .unwrap();
    let shown = ViewTransform {
        scale: 2.0,
        ..ViewTransform::IDENTITY
    };
    surface.set_display_transform(Some(shown));

    let result = rasterizer.render(
        &mut surface,
        &view,
        &blue_red_style(60000.0, 0.0),
        vec![(GeoPoint::new(0.0, 0.0), 1.0)],
        IntensityBounds::new(0.0, 1.0),
    );
    assert!(result.is_err());
    assert_eq!(surface.display_transform(), Some(shown));
    assert_eq!(alpha(&surface, 50, 50), 255);
}

#[test]
fn test_odd_stamp_lands_half_a_pixel_off() {
    let (mut rasterizer, mut surface, view) = setup();
    // side 5, extent 2.5
    let style = blue_red_style(2.5, 0.0);
    // Screen (10, 10): the glyph's corner rounds from 7.5 to 8.
    rasterizer
        .render(
            &mut surface,
            &view,
            &style,
            vec![(GeoPoint::new(-40.0, 40.0), 1.0)],
            IntensityBounds::new(0.0, 1.0),
        )
        .unwrap();

    assert_eq!(alpha(&surface, 7, 10), 0);
    assert!(alpha(&surface, 8, 10) > 0);
    assert!(alpha(&surface, 12, 10) > 0);
    assert_eq!(alpha(&surface, 13, 10), 0);
    assert_eq!(alpha(&surface, 10, 7), 0);
    assert!(alpha(&surface, 10, 8) > 0);
    assert!(alpha(&surface, 10, 12) > 0);
    assert_eq!(alpha(&surface, 10, 13), 0);
}
