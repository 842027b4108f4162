//! Intensity accumulation.
//!
//! Every point is splatted as a [`StampKernel`] whose opacity is the point's
//! normalized weight. Source-over compositing of those stamps leaves the
//! surface's alpha channel holding an 8-bit approximation of the summed
//! intensity, which the colorizer later maps through the gradient table.

use heatmap_common::{ColorStops, GeoPoint, HeatmapResult, HeatmapStyle};
use projection::MapView;
use tracing::{debug, trace};

use crate::gradient::{GradientCache, GradientTable};
use crate::render_state::RenderState;
use crate::stamp::{StampCache, StampKernel};
use crate::surface::RenderSurface;

/// Smallest opacity a visible point is drawn with. An 8-bit alpha channel
/// cannot reliably accumulate anything fainter.
pub const MIN_OPACITY: f64 = 0.01;

/// Weight range used to normalize point intensities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for IntensityBounds {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl IntensityBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Derive bounds from `weights`, letting `fixed_min` and `fixed_max`
    /// override either end.
    ///
    /// NaN weights are ignored. When both ends are derived and coincide the
    /// minimum is lowered by one so that a uniform data set renders at full
    /// intensity instead of vanishing. No weights at all yield `[0, 1]`.
    pub fn from_weights<I>(weights: I, fixed_min: Option<f64>, fixed_max: Option<f64>) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
        for w in weights.into_iter().filter(|w| !w.is_nan()) {
            lo = lo.min(w);
            hi = hi.max(w);
        }
        if lo > hi {
            (lo, hi) = (0.0, 1.0);
        }

        let mut bounds = Self {
            min: fixed_min.unwrap_or(lo),
            max: fixed_max.unwrap_or(hi),
        };
        if fixed_min.is_none() && fixed_max.is_none() && bounds.min == bounds.max {
            bounds.min = bounds.max - 1.0;
        }
        bounds
    }

    /// `max - min`, but never less than one.
    pub fn range(&self) -> f64 {
        (self.max - self.min).max(1.0)
    }

    pub fn normalize(&self, weight: f64) -> f64 {
        (weight - self.min) / self.range()
    }
}

/// Counts from one rasterization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterStats {
    pub drawn: usize,
    pub skipped: usize,
}

/// Owns the stamp and gradient caches and splats points onto a surface.
#[derive(Debug, Default)]
pub struct IntensityRasterizer {
    gradient: GradientCache,
    stamp: StampCache,
    state: RenderState,
}

impl IntensityRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the gradient table and stamp up to date with `style`.
    pub fn prepare(&mut self, style: &HeatmapStyle) -> HeatmapResult<()> {
        self.gradient.get(&style.color);
        self.stamp.get(style.radius, style.blur_radius)?;
        Ok(())
    }

    /// Gradient table for `stops`, rebuilt only if they changed.
    pub fn gradient_table(&mut self, stops: &ColorStops) -> &GradientTable {
        self.gradient.get(stops)
    }

    /// Stamp for the given sizes, rebuilt only if they changed.
    pub fn stamp(&mut self, radius: f64, blur: f64) -> HeatmapResult<&StampKernel> {
        self.stamp.get(radius, blur)
    }

    pub fn gradient_cache(&self) -> &GradientCache {
        &self.gradient
    }

    pub fn stamp_cache(&self) -> &StampCache {
        &self.stamp
    }

    pub fn render_state(&self) -> &RenderState {
        &self.state
    }

    /// Reset the display transform, clear `surface` and accumulate `points`
    /// into its alpha channel. The surface is left untouched when the stamp
    /// cannot be built.
    ///
    /// Points are drawn last to first, so earlier points end up on top.
    /// A point is skipped when its screen position is not finite or its
    /// normalized weight is not positive.
    pub fn render<S, V, I>(
        &mut self,
        surface: &mut S,
        view: &V,
        style: &HeatmapStyle,
        points: I,
        bounds: IntensityBounds,
    ) -> HeatmapResult<RasterStats>
    where
        S: RenderSurface + ?Sized,
        V: MapView + ?Sized,
        I: IntoIterator<Item = (GeoPoint, f64)>,
        I::IntoIter: DoubleEndedIterator,
    {
        let kernel = self.stamp.get(style.radius, style.blur_radius)?;
        surface.set_display_transform(None);
        surface.clear();
        self.state.reset();

        let extent = kernel.extent();
        let mut stats = RasterStats::default();

        for (position, weight) in points.into_iter().rev() {
            let screen = view.gcs_to_display(position);
            if !screen.is_finite() {
                trace!(lon = position.lon, lat = position.lat, "Skipping unprojectable point");
                stats.skipped += 1;
                continue;
            }

            let n = bounds.normalize(weight);
            if n.is_nan() || n <= 0.0 {
                stats.skipped += 1;
                continue;
            }

            let opacity = n.clamp(MIN_OPACITY, 1.0) as f32;
            self.state.set_global_alpha(surface, opacity);

            let x = (screen.x - extent).round() as i32;
            let y = (screen.y - extent).round() as i32;
            surface.draw_glyph(kernel, x, y);
            stats.drawn += 1;
        }

        debug!(
            drawn = stats.drawn,
            skipped = stats.skipped,
            min = bounds.min,
            max = bounds.max,
            "Accumulated intensity"
        );
        Ok(stats)
    }

    /// Drop the cached gradient table and stamp.
    pub fn release(&mut self) {
        self.gradient.clear();
        self.stamp.clear();
        self.state.reset();
    }
}
