//! Command-line view and style configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use heatmap_common::{GeoPoint, HeatmapStyle, ScreenPoint, StyleConfig};
use projection::{Equirectangular, MapCamera, MapView, WebMercator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProjectionKind {
    Mercator,
    Equirect,
}

/// Camera placement.
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Output width in pixels
    #[arg(long, default_value_t = 800, env = "HEATMAP_WIDTH")]
    pub width: u32,

    /// Output height in pixels
    #[arg(long, default_value_t = 600, env = "HEATMAP_HEIGHT")]
    pub height: u32,

    /// Longitude of the viewport center
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub lon: f64,

    /// Latitude of the viewport center
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub lat: f64,

    #[arg(long, default_value_t = 2.0)]
    pub zoom: f64,

    /// Clockwise rotation in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub rotation: f64,

    #[arg(long, value_enum, default_value_t = ProjectionKind::Mercator)]
    pub projection: ProjectionKind,
}

impl ViewArgs {
    pub fn camera(&self) -> Camera {
        let center = GeoPoint::new(self.lon, self.lat);
        let rotation = self.rotation.to_radians();
        match self.projection {
            ProjectionKind::Mercator => Camera::Mercator(
                MapCamera::new(WebMercator, self.width, self.height)
                    .with_center(center)
                    .with_zoom(self.zoom)
                    .with_rotation(rotation),
            ),
            ProjectionKind::Equirect => Camera::Equirect(
                MapCamera::new(Equirectangular, self.width, self.height)
                    .with_center(center)
                    .with_zoom(self.zoom)
                    .with_rotation(rotation),
            ),
        }
    }
}

/// A map camera over whichever projection was selected.
#[derive(Debug, Clone)]
pub enum Camera {
    Mercator(MapCamera<WebMercator>),
    Equirect(MapCamera<Equirectangular>),
}

macro_rules! with_camera {
    ($self:expr, $cam:ident => $body:expr) => {
        match $self {
            Camera::Mercator($cam) => $body,
            Camera::Equirect($cam) => $body,
        }
    };
}

impl Camera {
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        with_camera!(self, cam => cam.pan_by(dx, dy))
    }

    pub fn zoom_by(&mut self, delta: f64) {
        with_camera!(self, cam => {
            let zoom = cam.zoom() + delta;
            cam.set_zoom(zoom)
        })
    }

    /// Rotate by `degrees` clockwise.
    pub fn rotate_by(&mut self, degrees: f64) {
        with_camera!(self, cam => {
            let rotation = cam.rotation() + degrees.to_radians();
            cam.set_rotation(rotation)
        })
    }
}

impl MapView for Camera {
    fn gcs_to_display(&self, gcs: GeoPoint) -> ScreenPoint {
        with_camera!(self, cam => cam.gcs_to_display(gcs))
    }

    fn display_to_gcs(&self, display: ScreenPoint) -> GeoPoint {
        with_camera!(self, cam => cam.display_to_gcs(display))
    }

    fn zoom(&self) -> f64 {
        with_camera!(self, cam => cam.zoom())
    }

    fn rotation(&self) -> f64 {
        with_camera!(self, cam => cam.rotation())
    }

    fn viewport(&self) -> (u32, u32) {
        with_camera!(self, cam => cam.viewport())
    }
}

/// Style selection and per-run overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct StyleArgs {
    /// JSON file with named styles
    #[arg(long, env = "HEATMAP_STYLE_FILE")]
    pub style_file: Option<PathBuf>,

    /// Style name to use from the style file
    #[arg(long, default_value = "default", env = "HEATMAP_STYLE")]
    pub style: String,

    /// Override the opaque core radius, in pixels
    #[arg(long)]
    pub radius: Option<f64>,

    /// Override the soft edge width, in pixels
    #[arg(long)]
    pub blur_radius: Option<f64>,

    /// Override the rebuild debounce delay
    #[arg(long, env = "HEATMAP_UPDATE_DELAY_MS")]
    pub update_delay_ms: Option<u64>,

    /// Fixed lower intensity bound
    #[arg(long, allow_negative_numbers = true)]
    pub min_intensity: Option<f64>,

    /// Fixed upper intensity bound
    #[arg(long, allow_negative_numbers = true)]
    pub max_intensity: Option<f64>,
}

impl StyleArgs {
    /// Load the selected style and apply overrides.
    ///
    /// Without a style file the built-in default style is the base.
    pub fn resolve_style(&self) -> Result<HeatmapStyle> {
        let mut style = match &self.style_file {
            Some(path) => {
                let config = StyleConfig::from_file(path)
                    .with_context(|| format!("Failed to load style file: {:?}", path))?;
                config
                    .get(&self.style)
                    .with_context(|| format!("In style file {:?}", path))?
                    .clone()
            }
            None => HeatmapStyle::default(),
        };

        if let Some(radius) = self.radius {
            style.radius = radius;
        }
        if let Some(blur) = self.blur_radius {
            style.blur_radius = blur;
        }
        if let Some(delay) = self.update_delay_ms {
            style.update_delay_ms = delay;
        }

        style
            .validate()
            .with_context(|| format!("Style '{}' is invalid", self.style))?;
        Ok(style)
    }
}
