//! A 2D map camera: center, zoom, rotation and viewport over a projection.
//!
//! World pixel coordinates are the unit-square projection scaled by
//! `TILE_SIZE * 2^zoom`. The display transform is
//!
//! ```text
//! display = R(rotation) · (world(p) - world(center)) + viewport / 2
//! ```
//!
//! with `R` a clockwise rotation in the y-down display frame.

use heatmap_common::{GeoPoint, ScreenPoint};

use crate::{MapView, Projection};

/// Side of the world square at zoom 0, in pixels.
pub const TILE_SIZE: f64 = 256.0;

#[derive(Debug, Clone)]
pub struct MapCamera<P> {
    projection: P,
    center: GeoPoint,
    zoom: f64,
    rotation: f64,
    width: u32,
    height: u32,
}

impl<P: Projection> MapCamera<P> {
    pub fn new(projection: P, width: u32, height: u32) -> Self {
        Self {
            projection,
            center: GeoPoint::default(),
            zoom: 0.0,
            rotation: 0.0,
            width,
            height,
        }
    }

    pub fn with_center(mut self, center: GeoPoint) -> Self {
        self.center = center;
        self
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn center(&self) -> GeoPoint {
        self.center
    }

    pub fn set_center(&mut self, center: GeoPoint) {
        self.center = center;
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Move the map content by `(dx, dy)` display pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = self.half_viewport();
        self.center = self.display_to_gcs(ScreenPoint::new(cx - dx, cy - dy));
    }

    fn world_scale(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    fn half_viewport(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    fn to_world(&self, gcs: GeoPoint) -> (f64, f64) {
        let (x, y) = self.projection.project(gcs);
        let scale = self.world_scale();
        (x * scale, y * scale)
    }
}

impl<P: Projection> MapView for MapCamera<P> {
    fn gcs_to_display(&self, gcs: GeoPoint) -> ScreenPoint {
        let (wx, wy) = self.to_world(gcs);
        let (cx, cy) = self.to_world(self.center);
        let (dx, dy) = (wx - cx, wy - cy);
        let (sin, cos) = self.rotation.sin_cos();
        let (hx, hy) = self.half_viewport();
        ScreenPoint::new(cos * dx - sin * dy + hx, sin * dx + cos * dy + hy)
    }

    fn display_to_gcs(&self, display: ScreenPoint) -> GeoPoint {
        let (hx, hy) = self.half_viewport();
        let (dx, dy) = (display.x - hx, display.y - hy);
        let (sin, cos) = self.rotation.sin_cos();
        let (cx, cy) = self.to_world(self.center);
        let wx = cos * dx + sin * dy + cx;
        let wy = -sin * dx + cos * dy + cy;
        let scale = self.world_scale();
        self.projection.unproject(wx / scale, wy / scale)
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
