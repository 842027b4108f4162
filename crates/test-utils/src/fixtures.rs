//! Common test fixtures for heatmap tests.

use std::io::Write;

use heatmap_common::{ColorStops, GeoPoint, HeatmapStyle, Rgba, ScreenPoint};
use projection::MapView;
use tempfile::NamedTempFile;

/// Two-stop gradient from opaque blue (0) to opaque red (1).
pub fn blue_red_stops() -> ColorStops {
    ColorStops::from_pairs([
        (0.0, Rgba::opaque(0.0, 0.0, 1.0)),
        (1.0, Rgba::opaque(1.0, 0.0, 0.0)),
    ])
}

/// Style with the blue to red gradient and the given stamp sizes.
pub fn blue_red_style(radius: f64, blur: f64) -> HeatmapStyle {
    HeatmapStyle::default()
        .with_radius(radius)
        .with_blur_radius(blur)
        .with_color(blue_red_stops())
}

/// Sample style collection in JSON form.
pub const STYLE_CONFIG_JSON: &str = r##"{
    "version": "1.0",
    "styles": {
        "default": {},
        "blue-red": {
            "radius": 20,
            "blur_radius": 10,
            "color": [
                {"position": 0.0, "color": "#0000FF"},
                {"position": 1.0, "color": "#FF0000"}
            ]
        },
        "fast": {"radius": 5, "blur_radius": 5, "update_delay_ms": 50}
    }
}"##;

/// Write `contents` to a temporary file that lives as long as the returned
/// handle.
pub fn temp_json_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

/// A planar map view with exact dyadic arithmetic.
///
/// One degree spans `2^zoom` display pixels in both directions, north is up
/// and the viewport center shows `center`. With integral zoom, an even
/// viewport and dyadic coordinates, conversions in both directions are
/// exact, so a round trip reproduces its input bit for bit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearView {
    pub center: GeoPoint,
    pub zoom: f64,
    /// Clockwise, radians
    pub rotation: f64,
    pub width: u32,
    pub height: u32,
}

impl LinearView {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            center: GeoPoint::new(0.0, 0.0),
            zoom: 0.0,
            rotation: 0.0,
            width,
            height,
        }
    }

    pub fn with_center(mut self, lon: f64, lat: f64) -> Self {
        self.center = GeoPoint::new(lon, lat);
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

    /// Shift the content by `(dx, dy)` display pixels (no rotation assumed).
    pub fn panned(mut self, dx: f64, dy: f64) -> Self {
        let scale = self.scale();
        self.center = GeoPoint::new(self.center.lon - dx / scale, self.center.lat + dy / scale);
        self
    }

    fn scale(&self) -> f64 {
        2f64.powf(self.zoom)
    }

    fn half(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }
}

impl MapView for LinearView {
    fn gcs_to_display(&self, gcs: GeoPoint) -> ScreenPoint {
        let s = self.scale();
        let dx = (gcs.lon - self.center.lon) * s;
        let dy = (self.center.lat - gcs.lat) * s;
        let (hx, hy) = self.half();
        if self.rotation == 0.0 {
            return ScreenPoint::new(dx + hx, dy + hy);
        }
        let (sin, cos) = self.rotation.sin_cos();
        ScreenPoint::new(cos * dx - sin * dy + hx, sin * dx + cos * dy + hy)
    }

    fn display_to_gcs(&self, display: ScreenPoint) -> GeoPoint {
        let (hx, hy) = self.half();
        let (mut dx, mut dy) = (display.x - hx, display.y - hy);
        if self.rotation != 0.0 {
            let (sin, cos) = self.rotation.sin_cos();
            (dx, dy) = (cos * dx + sin * dy, -sin * dx + cos * dy);
        }
        let s = self.scale();
        GeoPoint::new(self.center.lon + dx / s, self.center.lat - dy / s)
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
