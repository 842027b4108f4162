//! Spherical Web Mercator (EPSG:3857) onto the unit square.

use std::f64::consts::PI;

use heatmap_common::GeoPoint;

use crate::Projection;

/// Latitude limit at which the Web Mercator world becomes square.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn project(&self, gcs: GeoPoint) -> (f64, f64) {
        let lat = gcs.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (gcs.lon + 180.0) / 360.0;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
        (x, y)
    }

    fn unproject(&self, x: f64, y: f64) -> GeoPoint {
        let lon = x * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
        GeoPoint::new(lon, lat)
    }
}
