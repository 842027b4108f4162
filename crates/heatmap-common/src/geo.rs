//! Geographic and screen-space coordinates.

use serde::{Deserialize, Serialize};

/// A geographic position in degrees (WGS84 longitude/latitude).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// A position in display pixels, origin at the top-left corner, y down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const ORIGIN: ScreenPoint = ScreenPoint { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A ready-made data record: a position with a weight.
///
/// Accepts either an object (`{"lon": .., "lat": .., "weight": ..}`) or a
/// compact array (`[lon, lat]` / `[lon, lat, weight]`) when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointRepr")]
pub struct WeightedPoint {
    pub lon: f64,
    pub lat: f64,
    pub weight: f64,
}

impl WeightedPoint {
    pub const fn new(lon: f64, lat: f64, weight: f64) -> Self {
        Self { lon, lat, weight }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lon, self.lat)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Object {
        lon: f64,
        lat: f64,
        #[serde(default = "default_weight")]
        weight: f64,
    },
    Pair(f64, f64),
    Triple(f64, f64, f64),
}

fn default_weight() -> f64 {
    1.0
}

impl From<PointRepr> for WeightedPoint {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Object { lon, lat, weight } => WeightedPoint::new(lon, lat, weight),
            PointRepr::Pair(lon, lat) => WeightedPoint::new(lon, lat, default_weight()),
            PointRepr::Triple(lon, lat, weight) => WeightedPoint::new(lon, lat, weight),
        }
    }
}
