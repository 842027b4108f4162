//! Density heatmap rendering.
//!
//! Weighted geographic points are splatted as soft stamps onto a raster whose
//! alpha channel accumulates intensity, then recolored through a gradient
//! lookup table:
//!
//! - [`stamp`]: the soft circular glyph drawn for each point
//! - [`rasterize`]: intensity accumulation and normalization
//! - [`gradient`]: the 256-entry color table
//! - [`colorize`]: alpha to color lookup
//! - [`viewport`]: reuse of the last raster while the camera moves
//! - [`layer`]: the feature object driving the build/render cycle
//! - [`png`]: PNG export

pub mod colorize;
pub mod debounce;
pub mod gradient;
pub mod layer;
pub mod png;
pub mod rasterize;
pub mod render_state;
pub mod stamp;
pub mod surface;
pub mod viewport;

pub use colorize::Colorizer;
pub use gradient::{GradientCache, GradientTable};
pub use layer::{HeatmapLayer, RenderOutcome};
pub use rasterize::{IntensityBounds, IntensityRasterizer, RasterStats};
pub use stamp::{StampCache, StampKernel};
pub use surface::{PixmapSurface, RenderSurface, ViewTransform};
pub use viewport::{PanOutcome, TrackerState, ViewportTracker};
