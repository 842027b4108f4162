//! Map views: geographic ⇄ display pixel transforms.
//!
//! The heatmap renderer only needs a narrow view of the map camera, expressed
//! by the [`MapView`] trait. [`MapCamera`] implements it on top of any
//! [`Projection`] of the globe onto the unit square.

pub mod camera;
pub mod equirectangular;
pub mod mercator;

pub use camera::{MapCamera, TILE_SIZE};
pub use equirectangular::Equirectangular;
pub use mercator::WebMercator;

use heatmap_common::{GeoPoint, ScreenPoint};

/// The camera interface consumed by the heatmap renderer.
pub trait MapView {
    /// Project a geographic position to display pixels.
    fn gcs_to_display(&self, gcs: GeoPoint) -> ScreenPoint;

    /// Inverse of [`MapView::gcs_to_display`].
    fn display_to_gcs(&self, display: ScreenPoint) -> GeoPoint;

    /// Zoom level; each whole step doubles the scale.
    fn zoom(&self) -> f64;

    /// Clockwise rotation of the view in radians.
    fn rotation(&self) -> f64;

    /// Viewport size in pixels (width, height).
    fn viewport(&self) -> (u32, u32);
}

impl<V: MapView + ?Sized> MapView for &V {
    fn gcs_to_display(&self, gcs: GeoPoint) -> ScreenPoint {
        (**self).gcs_to_display(gcs)
    }

    fn display_to_gcs(&self, display: ScreenPoint) -> GeoPoint {
        (**self).display_to_gcs(display)
    }

    fn zoom(&self) -> f64 {
        (**self).zoom()
    }

    fn rotation(&self) -> f64 {
        (**self).rotation()
    }

    fn viewport(&self) -> (u32, u32) {
        (**self).viewport()
    }
}

/// A projection of the globe onto the unit square.
///
/// `x` grows eastward and `y` grows southward, both nominally within `[0, 1]`.
pub trait Projection {
    fn project(&self, gcs: GeoPoint) -> (f64, f64);

    fn unproject(&self, x: f64, y: f64) -> GeoPoint;
}
