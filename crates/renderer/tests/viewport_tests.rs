//! Tests for raster reuse across camera movement.

use std::f64::consts::FRAC_PI_2;
use std::time::{Duration, Instant};

use heatmap_common::ScreenPoint;
use renderer::surface::{PixmapSurface, RenderSurface, ViewTransform};
use renderer::viewport::{PanOutcome, TrackerState, ViewportTracker};
use test_utils::{assert_approx_eq, LinearView};

const DELAY: Duration = Duration::from_millis(100);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn setup() -> (ViewportTracker, PixmapSurface, LinearView) {
    let view = LinearView::new(100, 100).with_center(10.0, 20.0).with_zoom(2.0);
    let mut tracker = ViewportTracker::new(DELAY);
    tracker.snapshot(&view);
    (tracker, PixmapSurface::new(100, 100).unwrap(), view)
}

#[test]
fn test_pan_before_first_build() {
    let mut tracker = ViewportTracker::new(DELAY);
    let mut surface = PixmapSurface::new(10, 10).unwrap();
    let outcome = tracker.on_pan(&LinearView::new(10, 10), &mut surface, Instant::now());
    assert_eq!(outcome, PanOutcome::NotBuilt);
    assert_eq!(surface.display_transform(), None);
}

#[test]
fn test_snapshot_records_pose() {
    let (tracker, _, _) = setup();
    let pose = tracker.pose().unwrap();
    assert_eq!(pose.zoom, 2.0);
    assert_eq!(pose.rotation, 0.0);
    assert_eq!(pose.gcs_origin.lon, 10.0 - 50.0 / 4.0);
    assert_eq!(pose.gcs_origin.lat, 20.0 + 50.0 / 4.0);
    assert_eq!(pose.last_applied, ViewTransform::IDENTITY);
    assert_eq!(tracker.state(), TrackerState::Stable);
}

#[test]
fn test_zero_movement_is_a_no_op() {
    let (mut tracker, mut surface, view) = setup();
    let outcome = tracker.on_pan(&view, &mut surface, Instant::now());
    assert_eq!(outcome, PanOutcome::Unchanged);
    assert_eq!(surface.display_transform(), None);
    assert_eq!(tracker.state(), TrackerState::Stable);
    assert_eq!(tracker.next_deadline(), None);
}

#[test]
fn test_sub_pixel_pan_transforms_without_scheduling() {
    let (mut tracker, mut surface, view) = setup();
    let outcome = tracker.on_pan(&view.panned(0.03125, 0.0), &mut surface, Instant::now());
    assert_eq!(
        outcome,
        PanOutcome::Transformed {
            rebuild_scheduled: false
        }
    );
    let t = surface.display_transform().unwrap();
    assert_eq!(t.origin, ScreenPoint::new(0.03125, 0.0));
    assert_eq!(tracker.state(), TrackerState::Stable);
}

#[test]
fn test_pan_translates_and_schedules_rebuild() {
    let (mut tracker, mut surface, view) = setup();
    let now = Instant::now();
    let outcome = tracker.on_pan(&view.panned(20.0, -8.0), &mut surface, now);
    assert_eq!(
        outcome,
        PanOutcome::Transformed {
            rebuild_scheduled: true
        }
    );

    let t = surface.display_transform().unwrap();
    assert_eq!(t.origin, ScreenPoint::new(20.0, -8.0));
    assert_eq!(t.scale, 1.0);
    assert_eq!(t.rotation, 0.0);
    assert_eq!(tracker.state(), TrackerState::PendingRebuild { deadline: now + DELAY });
}

#[test]
fn test_repeated_identical_pan_does_not_rearm() {
    let (mut tracker, mut surface, view) = setup();
    let t0 = Instant::now();
    let moved = view.panned(20.0, 0.0);
    tracker.on_pan(&moved, &mut surface, t0);
    assert_eq!(tracker.on_pan(&moved, &mut surface, t0 + ms(50)), PanOutcome::Unchanged);
    assert_eq!(tracker.next_deadline(), Some(t0 + DELAY));
}

#[test]
fn test_zoom_scales_about_the_raster_origin() {
    let (mut tracker, mut surface, view) = setup();
    tracker.on_pan(&view.with_zoom(3.0), &mut surface, Instant::now());

    let t = surface.display_transform().unwrap();
    assert_eq!(t.scale, 2.0);
    assert_eq!(t.origin, ScreenPoint::new(-50.0, -50.0));
    // The viewport center stays put.
    assert_eq!(t.apply(ScreenPoint::new(50.0, 50.0)), ScreenPoint::new(50.0, 50.0));
}

#[test]
fn test_rotation_delta() {
    let (mut tracker, mut surface, view) = setup();
    let outcome = tracker.on_pan(&view.with_rotation(FRAC_PI_2), &mut surface, Instant::now());
    assert_eq!(
        outcome,
        PanOutcome::Transformed {
            rebuild_scheduled: true
        }
    );
    let t = surface.display_transform().unwrap();
    assert_approx_eq!(t.rotation_degrees(), 90.0, 1e-9);
    assert!(t.to_css().ends_with("rotate(90deg)"));
}

#[test]
fn test_settling_fires_exactly_one_rebuild_after_last_event() {
    let (mut tracker, mut surface, view) = setup();
    let t0 = Instant::now();

    tracker.on_pan(&view.panned(5.0, 0.0), &mut surface, t0);
    tracker.on_pan(&view.panned(10.0, 0.0), &mut surface, t0 + ms(30));
    tracker.on_pan(&view.panned(15.0, 0.0), &mut surface, t0 + ms(60));

    // The first two deadlines were superseded.
    assert!(!tracker.poll(t0 + ms(100)));
    assert!(!tracker.poll(t0 + ms(130)));
    assert!(!tracker.poll(t0 + ms(159)));
    assert!(tracker.poll(t0 + ms(160)));

    assert!(!tracker.poll(t0 + ms(1000)));
    assert_eq!(tracker.state(), TrackerState::Stable);
}

#[test]
fn test_returning_within_tolerance_cancels_rebuild() {
    let (mut tracker, mut surface, view) = setup();
    let t0 = Instant::now();

    tracker.on_pan(&view.panned(12.0, 4.0), &mut surface, t0);
    assert!(tracker.next_deadline().is_some());

    let outcome = tracker.on_pan(&view, &mut surface, t0 + ms(20));
    assert_eq!(
        outcome,
        PanOutcome::Transformed {
            rebuild_scheduled: false
        }
    );
    assert_eq!(surface.display_transform(), Some(ViewTransform::IDENTITY));
    assert_eq!(tracker.state(), TrackerState::Stable);
    assert!(!tracker.poll(t0 + ms(500)));
}

#[test]
fn test_snapshot_supersedes_pending_rebuild() {
    let (mut tracker, mut surface, view) = setup();
    let t0 = Instant::now();
    let moved = view.panned(30.0, 0.0);
    tracker.on_pan(&moved, &mut surface, t0);

    tracker.snapshot(&moved);
    assert_eq!(tracker.state(), TrackerState::Stable);
    assert!(!tracker.poll(t0 + ms(500)));
    assert_eq!(tracker.on_pan(&moved, &mut surface, t0 + ms(600)), PanOutcome::Unchanged);
}

#[test]
fn test_new_delay_applies_to_next_arm() {
    let (mut tracker, mut surface, view) = setup();
    let t0 = Instant::now();
    tracker.set_update_delay(ms(10));
    tracker.on_pan(&view.panned(30.0, 0.0), &mut surface, t0);
    assert_eq!(tracker.next_deadline(), Some(t0 + ms(10)));
    assert_eq!(tracker.update_delay(), ms(10));
}

#[test]
fn test_reset() {
    let (mut tracker, mut surface, view) = setup();
    tracker.on_pan(&view.panned(30.0, 0.0), &mut surface, Instant::now());
    tracker.reset();
    assert!(tracker.pose().is_none());
    assert_eq!(tracker.next_deadline(), None);
}
