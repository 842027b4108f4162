//! Reuse of the last rendered raster across pan, zoom and rotation.
//!
//! A full build records the pose it was rendered at. Later camera changes are
//! expressed as a [`ViewTransform`] of that raster and written to the
//! surface's display transform instead of re-rendering. Once the transform
//! drifts visibly away from identity a rebuild is scheduled `update_delay`
//! after the last such change.

use std::time::{Duration, Instant};

use heatmap_common::{GeoPoint, ScreenPoint};
use projection::MapView;
use tracing::{debug, trace};

use crate::debounce::DebounceTimer;
use crate::surface::{RenderSurface, ViewTransform};

/// Camera pose at the last full build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterPose {
    pub zoom: f64,
    /// Geographic position under the raster's top-left pixel
    pub gcs_origin: GeoPoint,
    /// Radians
    pub rotation: f64,
    /// Transform most recently written to the surface
    pub last_applied: ViewTransform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Stable,
    PendingRebuild { deadline: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanOutcome {
    /// Nothing has been rendered yet
    NotBuilt,
    /// Same transform as last time; the surface was not touched
    Unchanged,
    /// A new display transform was written
    Transformed { rebuild_scheduled: bool },
}

#[derive(Debug, Clone)]
pub struct ViewportTracker {
    pose: Option<RasterPose>,
    timer: DebounceTimer,
    update_delay: Duration,
}

impl ViewportTracker {
    pub fn new(update_delay: Duration) -> Self {
        Self {
            pose: None,
            timer: DebounceTimer::new(),
            update_delay,
        }
    }

    pub fn update_delay(&self) -> Duration {
        self.update_delay
    }

    /// Takes effect the next time the timer is armed.
    pub fn set_update_delay(&mut self, delay: Duration) {
        self.update_delay = delay;
    }

    pub fn pose(&self) -> Option<&RasterPose> {
        self.pose.as_ref()
    }

    pub fn state(&self) -> TrackerState {
        match self.timer.deadline() {
            Some(deadline) => TrackerState::PendingRebuild { deadline },
            None => TrackerState::Stable,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Record the pose of a just-completed build and cancel any pending
    /// rebuild.
    pub fn snapshot<V: MapView + ?Sized>(&mut self, view: &V) {
        let pose = RasterPose {
            zoom: view.zoom(),
            gcs_origin: view.display_to_gcs(ScreenPoint::ORIGIN),
            rotation: view.rotation(),
            last_applied: ViewTransform::IDENTITY,
        };
        if self.timer.cancel() {
            debug!("Pending rebuild superseded by full build");
        }
        self.pose = Some(pose);
    }

    /// Transform the existing raster to follow the camera.
    pub fn on_pan<V, S>(&mut self, view: &V, surface: &mut S, now: Instant) -> PanOutcome
    where
        V: MapView + ?Sized,
        S: RenderSurface + ?Sized,
    {
        let Some(pose) = self.pose.as_mut() else {
            return PanOutcome::NotBuilt;
        };

        let transform = ViewTransform {
            origin: view.gcs_to_display(pose.gcs_origin),
            scale: 2f64.powf(view.zoom() - pose.zoom),
            rotation: view.rotation() - pose.rotation,
        };
        if transform == pose.last_applied {
            return PanOutcome::Unchanged;
        }

        trace!(transform = %transform.to_css(), "Applying display transform");
        surface.set_display_transform(Some(transform));
        pose.last_applied = transform;
        self.timer.cancel();

        if exceeds_tolerance(&transform) {
            let deadline = self.timer.arm(now, self.update_delay);
            trace!(?deadline, "Rebuild scheduled");
            PanOutcome::Transformed {
                rebuild_scheduled: true,
            }
        } else {
            PanOutcome::Transformed {
                rebuild_scheduled: false,
            }
        }
    }

    /// Returns `true` once when a scheduled rebuild is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = self.timer.fire_if_due(now);
        if due {
            debug!("Debounced rebuild due");
        }
        due
    }

    /// Forget the pose and cancel any pending rebuild.
    pub fn reset(&mut self) {
        self.pose = None;
        self.timer.cancel();
    }
}

/// Whether `t` differs visibly from the identity transform.
pub fn exceeds_tolerance(t: &ViewTransform) -> bool {
    round_to(t.scale, 4) != 1.0
        || round_to(t.rotation_degrees(), 4) != 0.0
        || round_to(t.origin.x, 1) != 0.0
        || round_to(t.origin.y, 1) != 0.0
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
