//! Plate carrée onto the unit square.
//!
//! One degree spans the same number of pixels in both directions, so the
//! 360°×180° world occupies the band `y ∈ [0.25, 0.75]`.

use heatmap_common::GeoPoint;

use crate::Projection;

#[derive(Debug, Clone, Copy, Default)]
pub struct Equirectangular;

impl Projection for Equirectangular {
    fn project(&self, gcs: GeoPoint) -> (f64, f64) {
        ((gcs.lon + 180.0) / 360.0, (90.0 - gcs.lat) / 360.0 + 0.25)
    }

    fn unproject(&self, x: f64, y: f64) -> GeoPoint {
        GeoPoint::new(x * 360.0 - 180.0, 90.0 - (y - 0.25) * 360.0)
    }
}
