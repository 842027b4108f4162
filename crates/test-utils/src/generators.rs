//! Test data generators for synthetic point sets and rasters.
//!
//! Every generator is deterministic so failures reproduce exactly.

use heatmap_common::WeightedPoint;

/// Creates a regular `cols x rows` grid of points spanning the given
/// bounding box, with weights `col + row`.
///
/// # Example
///
/// ```
/// use test_utils::create_point_grid;
///
/// let points = create_point_grid(3, 2, (-10.0, -5.0, 10.0, 5.0));
/// assert_eq!(points.len(), 6);
/// assert_eq!(points[0].lon, -10.0);
/// assert_eq!(points[0].lat, 5.0);
/// assert_eq!(points[5].weight, 3.0);
/// ```
pub fn create_point_grid(
    cols: usize,
    rows: usize,
    bbox: (f64, f64, f64, f64),
) -> Vec<WeightedPoint> {
    let (min_lon, min_lat, max_lon, max_lat) = bbox;
    let step = |min: f64, max: f64, n: usize| {
        if n > 1 {
            (max - min) / (n - 1) as f64
        } else {
            0.0
        }
    };
    let dx = step(min_lon, max_lon, cols);
    let dy = step(min_lat, max_lat, rows);

    let mut points = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            points.push(WeightedPoint::new(
                min_lon + col as f64 * dx,
                max_lat - row as f64 * dy,
                (col + row) as f64,
            ));
        }
    }
    points
}

/// Creates `count` points scattered over the bounding box with weights in
/// `[0, max_weight)`.
///
/// # Arguments
///
/// * `count` - Number of points
/// * `bbox` - (min_lon, min_lat, max_lon, max_lat)
/// * `max_weight` - Exclusive upper bound of the weights
/// * `seed` - Seed value for deterministic generation
pub fn create_scattered_points(
    count: usize,
    bbox: (f64, f64, f64, f64),
    max_weight: f64,
    seed: u32,
) -> Vec<WeightedPoint> {
    let (min_lon, min_lat, max_lon, max_lat) = bbox;
    (0..count as u32)
        .map(|i| {
            let u = unit(simple_hash(i, 0, seed));
            let v = unit(simple_hash(i, 1, seed));
            let w = unit(simple_hash(i, 2, seed));
            WeightedPoint::new(
                min_lon + u * (max_lon - min_lon),
                min_lat + v * (max_lat - min_lat),
                w * max_weight,
            )
        })
        .collect()
}

/// Creates a tight cluster of `count` points around `(lon, lat)`, all with
/// the same weight. Useful for saturating the accumulator.
pub fn create_cluster(lon: f64, lat: f64, spread: f64, count: usize, weight: f64) -> Vec<WeightedPoint> {
    (0..count as u32)
        .map(|i| {
            let du = unit(simple_hash(i, 0, 7)) - 0.5;
            let dv = unit(simple_hash(i, 1, 7)) - 0.5;
            WeightedPoint::new(lon + du * spread, lat + dv * spread, weight)
        })
        .collect()
}

/// Map a hash to `[0, 1)`.
fn unit(h: u32) -> f64 {
    h as f64 / (u32::MAX as f64 + 1.0)
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates RGBA pixels whose alpha ramps from 0 to 255 across each row, with
/// black color channels, like an accumulated intensity raster.
pub fn create_alpha_ramp_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for _ in 0..height {
        for x in 0..width {
            let a = if width > 1 {
                (x * 255 / (width - 1)) as u8
            } else {
                255
            };
            pixels.extend_from_slice(&[0, 0, 0, a]);
        }
    }
    pixels
}

/// Creates RGBA pixels where almost every pixel has a distinct color, so
/// palette extraction must fail.
pub fn create_noise_pixels(width: usize, height: usize, seed: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height as u32 {
        for x in 0..width as u32 {
            let h = simple_hash(x, y, seed).to_le_bytes();
            pixels.extend_from_slice(&[h[0], h[1], h[2], 255]);
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scattered_points_stay_in_bbox() {
        let bbox = (-20.0, -10.0, 20.0, 10.0);
        let points = create_scattered_points(500, bbox, 5.0, 42);
        assert_eq!(points.len(), 500);
        for p in &points {
            assert!(p.lon >= -20.0 && p.lon < 20.0);
            assert!(p.lat >= -10.0 && p.lat < 10.0);
            assert!(p.weight >= 0.0 && p.weight < 5.0);
        }
    }

    #[test]
    fn test_scattered_points_are_deterministic() {
        let bbox = (0.0, 0.0, 1.0, 1.0);
        assert_eq!(
            create_scattered_points(10, bbox, 1.0, 3),
            create_scattered_points(10, bbox, 1.0, 3)
        );
        assert_ne!(
            create_scattered_points(10, bbox, 1.0, 3),
            create_scattered_points(10, bbox, 1.0, 4)
        );
    }

    #[test]
    fn test_cluster() {
        let points = create_cluster(5.0, 5.0, 1.0, 20, 2.0);
        assert_eq!(points.len(), 20);
        assert!(points.iter().all(|p| (p.lon - 5.0).abs() <= 0.5 && p.weight == 2.0));
    }

    #[test]
    fn test_alpha_ramp() {
        let pixels = create_alpha_ramp_pixels(256, 1);
        assert_eq!(pixels[3], 0);
        assert_eq!(pixels[255 * 4 + 3], 255);
    }
}
