//! Common types shared across the heatmap workspace.

pub mod error;
pub mod geo;
pub mod style;

pub use error::{HeatmapError, HeatmapResult};
pub use geo::{GeoPoint, ScreenPoint, WeightedPoint};
pub use style::{ColorStop, ColorStops, HeatmapStyle, Rgba, StyleConfig, MAX_STAMP_SIDE};
