//! Point file loading.

use std::path::Path;

use anyhow::{Context, Result};
use heatmap_common::WeightedPoint;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Deserialize)]
#[serde(untagged)]
enum PointFile {
    Bare(Vec<WeightedPoint>),
    Wrapped { points: Vec<WeightedPoint> },
}

/// Load weighted points from a JSON file.
///
/// Accepts either a bare array or an object with a `points` array. Each
/// point is `{"lon", "lat", "weight"?}`, `[lon, lat]` or `[lon, lat, weight]`.
pub fn load_points(path: &Path) -> Result<Vec<WeightedPoint>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read point file: {:?}", path))?;
    let points = parse_points(&content)
        .with_context(|| format!("Failed to parse point file: {:?}", path))?;

    let unusable = points
        .iter()
        .filter(|p| !p.position().is_finite() || !p.weight.is_finite())
        .count();
    if unusable > 0 {
        warn!(path = ?path, unusable, "Point file has non-finite values; they will not render");
    }
    debug!(path = ?path, count = points.len(), "Loaded points");
    Ok(points)
}

pub fn parse_points(json: &str) -> Result<Vec<WeightedPoint>> {
    let file: PointFile = serde_json::from_str(json)?;
    Ok(match file {
        PointFile::Bare(points) => points,
        PointFile::Wrapped { points } => points,
    })
}
