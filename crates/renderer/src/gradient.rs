//! Gradient lookup table for heatmap colorization.
//!
//! The accumulated intensity of a pixel is an 8-bit alpha value, so the
//! whole gradient can be evaluated once into a 256-entry table and looked
//! up per pixel. The table samples a linear gradient laid over a 256 pixel
//! strip: entry `i` is the gradient color at `t = (i + 0.5) / 256`.

use heatmap_common::{ColorStop, ColorStops, Rgba};
use tracing::debug;

/// Number of entries in a gradient table (one per alpha level).
pub const TABLE_SIZE: usize = 256;

/// 256 RGBA8 colors indexed by accumulated alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientTable {
    entries: [[u8; 4]; TABLE_SIZE],
}

impl GradientTable {
    /// Evaluate `stops` into a lookup table.
    ///
    /// A single stop gives a constant table; no stops give a fully
    /// transparent one.
    pub fn build(stops: &ColorStops) -> Self {
        let sorted = stops.sorted();
        let mut entries = [[0u8; 4]; TABLE_SIZE];

        for (i, entry) in entries.iter_mut().enumerate() {
            let t = (i as f64 + 0.5) / TABLE_SIZE as f64;
            *entry = sample(&sorted, t).to_rgba8();
        }

        Self { entries }
    }

    /// Color for an accumulated alpha value.
    #[inline]
    pub fn entry(&self, alpha: u8) -> [u8; 4] {
        self.entries[alpha as usize]
    }

    pub fn entries(&self) -> &[[u8; 4]] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        TABLE_SIZE
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Evaluate a gradient at `t`. `stops` must be ordered by position.
///
/// Before the first stop the first color is used, after the last stop the
/// last color. Between stops the unpremultiplied components are
/// interpolated linearly.
pub fn sample(stops: &[ColorStop], t: f64) -> Rgba {
    let (first, last) = match stops {
        [] => return Rgba::TRANSPARENT,
        [only] => return only.color,
        [first, .., last] => (first, last),
    };

    if t <= first.position {
        return first.color;
    }
    if t >= last.position {
        return last.color;
    }

    for pair in stops.windows(2) {
        let (low, high) = (&pair[0], &pair[1]);
        if t < high.position {
            let span = high.position - low.position;
            if span <= 0.0 {
                return high.color;
            }
            return low.color.lerp(&high.color, (t - low.position) / span);
        }
    }

    last.color
}

/// Memoizes the gradient table for the most recent stop set.
#[derive(Debug, Default)]
pub struct GradientCache {
    cached: Option<(ColorStops, GradientTable)>,
    builds: usize,
}

impl GradientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table for `stops`, recomputed only when the stops differ from the
    /// previous call.
    pub fn get(&mut self, stops: &ColorStops) -> &GradientTable {
        let entry = match self.cached.take() {
            Some(entry) if entry.0 == *stops => entry,
            _ => {
                self.builds += 1;
                debug!(stops = stops.len(), builds = self.builds, "Building gradient table");
                (stops.clone(), GradientTable::build(stops))
            }
        };
        &self.cached.insert(entry).1
    }

    /// The last built table, if any.
    pub fn current(&self) -> Option<&GradientTable> {
        self.cached.as_ref().map(|(_, table)| table)
    }

    /// How many times a table has been computed.
    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn clear(&mut self) {
        self.cached = None;
    }
}
