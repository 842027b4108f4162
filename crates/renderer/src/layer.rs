//! The heatmap feature: data, style, and the build/render cycle.
//!
//! A [`HeatmapLayer`] keeps a small modification clock. Changing data or
//! configuration stamps the change with the next tick; a build recomputes
//! the intensity bounds and a render redraws the raster whenever the build
//! is newer than the last render. Between renders, camera movement is
//! absorbed by the [`ViewportTracker`] and a debounced rebuild is requested
//! through [`HeatmapLayer::poll`].

use std::fmt;
use std::time::Instant;

use heatmap_common::{GeoPoint, HeatmapResult, HeatmapStyle, WeightedPoint};
use projection::MapView;
use tracing::{debug, info};

use crate::colorize::Colorizer;
use crate::rasterize::{IntensityBounds, IntensityRasterizer, RasterStats};
use crate::surface::RenderSurface;
use crate::viewport::{PanOutcome, ViewportTracker};

type PositionFn<T> = Box<dyn Fn(&T) -> GeoPoint>;
type IntensityFn<T> = Box<dyn Fn(&T) -> f64>;

/// Result of [`HeatmapLayer::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The raster was rebuilt.
    Rendered,
    /// Nothing changed since the last render.
    UpToDate,
    /// The surface has no area yet; try again next frame.
    Delayed,
    /// The layer has been shut down with [`HeatmapLayer::exit`].
    NotReady,
}

pub struct HeatmapLayer<T> {
    data: Vec<T>,
    position: PositionFn<T>,
    intensity: IntensityFn<T>,
    style: HeatmapStyle,
    fixed_min: Option<f64>,
    fixed_max: Option<f64>,
    bounds: IntensityBounds,

    rasterizer: IntensityRasterizer,
    colorizer: Colorizer,
    tracker: ViewportTracker,

    clock: u64,
    data_time: u64,
    config_time: u64,
    build_time: u64,
    render_time: u64,
    ready: bool,
    last_stats: Option<RasterStats>,
}

impl<T> HeatmapLayer<T> {
    /// Create a ready layer with no data. Every point weighs `1.0` until
    /// [`HeatmapLayer::with_intensity`] says otherwise.
    pub fn new(style: HeatmapStyle, position: impl Fn(&T) -> GeoPoint + 'static) -> Self {
        let tracker = ViewportTracker::new(style.update_delay());
        Self {
            data: Vec::new(),
            position: Box::new(position),
            intensity: Box::new(|_| 1.0),
            style,
            fixed_min: None,
            fixed_max: None,
            bounds: IntensityBounds::default(),
            rasterizer: IntensityRasterizer::new(),
            colorizer: Colorizer::new(),
            tracker,
            clock: 0,
            data_time: 0,
            config_time: 0,
            build_time: 0,
            render_time: 0,
            ready: true,
            last_stats: None,
        }
    }

    pub fn with_intensity(mut self, intensity: impl Fn(&T) -> f64 + 'static) -> Self {
        self.set_intensity(intensity);
        self
    }

    pub fn with_data(mut self, data: Vec<T>) -> Self {
        self.set_data(data);
        self
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    pub fn set_intensity(&mut self, intensity: impl Fn(&T) -> f64 + 'static) {
        self.intensity = Box::new(intensity);
        self.config_time = self.tick();
    }

    pub fn set_data(&mut self, data: Vec<T>) {
        self.data = data;
        self.data_time = self.tick();
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn style(&self) -> &HeatmapStyle {
        &self.style
    }

    /// Replace the style. Invalid styles are rejected and the current one
    /// is kept.
    pub fn set_style(&mut self, style: HeatmapStyle) -> HeatmapResult<()> {
        style.validate()?;
        self.tracker.set_update_delay(style.update_delay());
        self.style = style;
        self.config_time = self.tick();
        Ok(())
    }

    /// Pin the low end of the intensity range, or derive it again with `None`.
    pub fn set_min_intensity(&mut self, min: Option<f64>) {
        self.fixed_min = min;
        self.config_time = self.tick();
    }

    /// Pin the high end of the intensity range, or derive it again with `None`.
    pub fn set_max_intensity(&mut self, max: Option<f64>) {
        self.fixed_max = max;
        self.config_time = self.tick();
    }

    /// Lower intensity bound as of the last build.
    pub fn min_intensity(&self) -> f64 {
        self.bounds.min
    }

    /// Upper intensity bound as of the last build.
    pub fn max_intensity(&self) -> f64 {
        self.bounds.max
    }

    pub fn bounds(&self) -> IntensityBounds {
        self.bounds
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Make the layer renderable and force the next render to rebuild.
    pub fn init(&mut self) {
        self.ready = true;
        self.build_time = self.tick();
    }

    /// Release cached tables and the working buffer and cancel any pending
    /// rebuild. The layer stays inert until [`HeatmapLayer::init`].
    pub fn exit(&mut self) {
        self.ready = false;
        self.rasterizer.release();
        self.colorizer.release();
        self.tracker.reset();
        debug!("Heatmap layer released");
    }

    fn needs_build(&self) -> bool {
        self.build_time <= self.data_time || self.build_time < self.config_time
    }

    /// Recompute the intensity bounds if data or configuration changed since
    /// the last build. Returns whether a build happened.
    pub fn update(&mut self) -> bool {
        if !self.needs_build() {
            return false;
        }
        let intensity = &self.intensity;
        self.bounds = IntensityBounds::from_weights(
            self.data.iter().map(|d| intensity(d)),
            self.fixed_min,
            self.fixed_max,
        );
        self.build_time = self.tick();
        debug!(
            points = self.data.len(),
            min = self.bounds.min,
            max = self.bounds.max,
            "Heatmap build"
        );
        true
    }

    /// Redraw the raster onto `surface` if anything changed since the last
    /// render.
    pub fn render<S, V>(&mut self, surface: &mut S, view: &V) -> HeatmapResult<RenderOutcome>
    where
        S: RenderSurface + ?Sized,
        V: MapView + ?Sized,
    {
        if !self.ready {
            return Ok(RenderOutcome::NotReady);
        }
        if surface.width() == 0 || surface.height() == 0 {
            return Ok(RenderOutcome::Delayed);
        }

        self.update();
        if self.render_time >= self.build_time {
            return Ok(RenderOutcome::UpToDate);
        }

        let start = Instant::now();
        self.rasterizer.prepare(&self.style)?;

        let (position, intensity) = (&self.position, &self.intensity);
        let points = self.data.iter().map(|d| (position(d), intensity(d)));
        let stats = self
            .rasterizer
            .render(surface, view, &self.style, points, self.bounds)?;

        let table = self.rasterizer.gradient_table(&self.style.color);
        if let Err(e) = self.colorizer.colorize_surface(surface, table) {
            // The raster no longer shows the last pose.
            self.tracker.reset();
            return Err(e);
        }

        self.tracker.snapshot(view);
        self.render_time = self.tick();
        self.last_stats = Some(stats);

        info!(
            drawn = stats.drawn,
            skipped = stats.skipped,
            width = surface.width(),
            height = surface.height(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Rendered heatmap"
        );
        Ok(RenderOutcome::Rendered)
    }

    /// Mark the raster stale so the next render rebuilds it.
    pub fn rebuild(&mut self) {
        self.build_time = self.tick();
    }

    /// Follow a camera change by transforming the existing raster.
    pub fn on_pan<S, V>(&mut self, surface: &mut S, view: &V, now: Instant) -> PanOutcome
    where
        S: RenderSurface + ?Sized,
        V: MapView + ?Sized,
    {
        if !self.ready {
            return PanOutcome::NotBuilt;
        }
        self.tracker.on_pan(view, surface, now)
    }

    /// Fire a due rebuild. Returns `true` when the host should render again.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.tracker.poll(now) {
            self.rebuild();
            true
        } else {
            false
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tracker.next_deadline()
    }

    pub fn tracker(&self) -> &ViewportTracker {
        &self.tracker
    }

    pub fn rasterizer(&self) -> &IntensityRasterizer {
        &self.rasterizer
    }

    pub fn last_stats(&self) -> Option<RasterStats> {
        self.last_stats
    }
}

impl HeatmapLayer<WeightedPoint> {
    /// A layer over [`WeightedPoint`]s, weighted by their `weight` field.
    pub fn weighted(style: HeatmapStyle) -> Self {
        Self::new(style, WeightedPoint::position).with_intensity(|p| p.weight)
    }
}

impl<T> fmt::Debug for HeatmapLayer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeatmapLayer")
            .field("points", &self.data.len())
            .field("style", &self.style)
            .field("bounds", &self.bounds)
            .field("ready", &self.ready)
            .field("clock", &self.clock)
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}
