//! Style configuration for heatmap rendering.
//!
//! A [`HeatmapStyle`] holds the four user-facing knobs of a heatmap layer:
//! the stamp radius, the blur width, the color gradient and the debounce
//! interval used when the view drifts away from the last rendered pose.
//! Styles can be loaded from JSON, either individually or as a named
//! collection in a [`StyleConfig`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{HeatmapError, HeatmapResult};

/// Largest stamp side, in pixels, that a style may ask for.
pub const MAX_STAMP_SIDE: u32 = 4096;

/// RGBA color with floating point components in `[0, 1]`.
///
/// Deserializes from `{"r": .., "g": .., "b": .., "a": ..}` (alpha optional),
/// from a hex string (`"#RRGGBB"` / `"#RRGGBBAA"`), or from a color name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr")]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Build from 8-bit channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f64 / 255.0,
            g as f64 / 255.0,
            b as f64 / 255.0,
            a as f64 / 255.0,
        )
    }

    /// Parse `#RRGGBB`, `#RRGGBBAA` or a known color name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            return parse_hex_color(s);
        }
        named_color(s)
    }

    /// Quantize to 8-bit channels, clamping out-of-range components.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f64| -> u8 {
            if c.is_nan() {
                0
            } else {
                (c.clamp(0.0, 1.0) * 255.0).round() as u8
            }
        };
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Linear interpolation of unpremultiplied components.
    pub fn lerp(&self, other: &Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f64, b: f64| a * (1.0 - t) + b * t;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    fn is_valid(&self) -> bool {
        [self.r, self.g, self.b, self.a]
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Components {
        r: f64,
        g: f64,
        b: f64,
        #[serde(default = "default_alpha")]
        a: f64,
    },
    Text(String),
}

fn default_alpha() -> f64 {
    1.0
}

impl TryFrom<ColorRepr> for Rgba {
    type Error = String;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Components { r, g, b, a } => Ok(Rgba::new(r, g, b, a)),
            ColorRepr::Text(s) => Rgba::parse(&s).ok_or_else(|| format!("unknown color '{}'", s)),
        }
    }
}

fn parse_hex_color(s: &str) -> Option<Rgba> {
    let s = s.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(s.get(range)?, 16).ok();

    match s.len() {
        6 => Some(Rgba::from_rgba8(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
        8 => Some(Rgba::from_rgba8(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        )),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Rgba> {
    let (r, g, b, a) = match name.to_lowercase().as_str() {
        "transparent" => (0, 0, 0, 0),
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "green" => (0, 255, 0, 255),
        "blue" => (0, 0, 255, 255),
        "yellow" => (255, 255, 0, 255),
        "cyan" => (0, 255, 255, 255),
        "magenta" => (255, 0, 255, 255),
        "orange" => (255, 165, 0, 255),
        "purple" => (128, 0, 128, 255),
        "gray" | "grey" => (128, 128, 128, 255),
        _ => return None,
    };
    Some(Rgba::from_rgba8(r, g, b, a))
}

/// A color stop in a heatmap gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Normalized intensity at this stop, in `[0, 1]`
    pub position: f64,

    /// The color at this stop
    pub color: Rgba,
}

impl ColorStop {
    pub const fn new(position: f64, color: Rgba) -> Self {
        Self { position, color }
    }
}

/// Ordered color stops describing the heatmap gradient.
///
/// Equality is by value, which is what the gradient cache keys on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorStops(Vec<ColorStop>);

impl ColorStops {
    pub fn new(stops: Vec<ColorStop>) -> Self {
        Self(stops)
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, Rgba)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(position, color)| ColorStop::new(position, color))
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[ColorStop] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorStop> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stops ordered by position. The sort is stable, so stops sharing a
    /// position keep their insertion order and produce a hard edge.
    pub fn sorted(&self) -> Vec<ColorStop> {
        let mut stops = self.0.clone();
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        stops
    }

    pub fn validate(&self) -> HeatmapResult<()> {
        for (i, stop) in self.0.iter().enumerate() {
            if !stop.position.is_finite() || !(0.0..=1.0).contains(&stop.position) {
                return Err(HeatmapError::invalid_style(
                    format!("color[{}].position", i),
                    format!("{} is outside [0, 1]", stop.position),
                ));
            }
            if !stop.color.is_valid() {
                return Err(HeatmapError::invalid_style(
                    format!("color[{}].color", i),
                    "components must be within [0, 1]",
                ));
            }
        }
        Ok(())
    }
}

impl Default for ColorStops {
    fn default() -> Self {
        Self::from_pairs([
            (0.0, Rgba::new(0.0, 0.0, 0.0, 0.0)),
            (0.25, Rgba::new(0.0, 0.0, 1.0, 0.5)),
            (0.5, Rgba::new(0.0, 1.0, 1.0, 0.6)),
            (0.75, Rgba::new(1.0, 1.0, 0.0, 0.7)),
            (1.0, Rgba::new(1.0, 0.0, 0.0, 0.8)),
        ])
    }
}

impl FromIterator<ColorStop> for ColorStops {
    fn from_iter<I: IntoIterator<Item = ColorStop>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Rendering style of a heatmap layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapStyle {
    /// Radius of the opaque core of each point, in pixels
    pub radius: f64,

    /// Width of the soft edge around the core, in pixels
    pub blur_radius: f64,

    /// Gradient applied to the accumulated intensity
    pub color: ColorStops,

    /// Delay before a drifted view triggers a full rebuild, in milliseconds
    pub update_delay_ms: u64,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self {
            radius: 10.0,
            blur_radius: 10.0,
            color: ColorStops::default(),
            update_delay_ms: 1000,
        }
    }
}

impl HeatmapStyle {
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_blur_radius(mut self, blur_radius: f64) -> Self {
        self.blur_radius = blur_radius;
        self
    }

    pub fn with_color(mut self, color: ColorStops) -> Self {
        self.color = color;
        self
    }

    pub fn with_update_delay(mut self, delay: Duration) -> Self {
        self.update_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }

    /// Parse a single style from a JSON string.
    pub fn from_json(json: &str) -> HeatmapResult<Self> {
        let style: HeatmapStyle = serde_json::from_str(json)?;
        style.validate()?;
        Ok(style)
    }

    pub fn validate(&self) -> HeatmapResult<()> {
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(HeatmapError::invalid_style(
                "radius",
                format!("{} is not a non-negative number", self.radius),
            ));
        }
        if !self.blur_radius.is_finite() || self.blur_radius < 0.0 {
            return Err(HeatmapError::invalid_style(
                "blur_radius",
                format!("{} is not a non-negative number", self.blur_radius),
            ));
        }
        let side = 2.0 * (self.radius + self.blur_radius);
        if side > MAX_STAMP_SIDE as f64 {
            return Err(HeatmapError::invalid_style(
                "radius",
                format!(
                    "stamp side 2 * ({} + {}) exceeds {} px",
                    self.radius, self.blur_radius, MAX_STAMP_SIDE
                ),
            ));
        }
        self.color.validate()
    }
}

/// Root style configuration: a collection of named heatmap styles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Version of the style schema
    #[serde(default = "default_version")]
    pub version: String,

    /// Named style definitions
    pub styles: HashMap<String, HeatmapStyle>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl StyleConfig {
    /// Load and validate style configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> HeatmapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate style configuration from a JSON string.
    pub fn from_json(json: &str) -> HeatmapResult<Self> {
        let config: StyleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Get a style by name.
    pub fn get(&self, name: &str) -> HeatmapResult<&HeatmapStyle> {
        self.styles
            .get(name)
            .ok_or_else(|| HeatmapError::StyleNotFound(name.to_string()))
    }

    /// Validate all styles in the configuration.
    pub fn validate(&self) -> HeatmapResult<()> {
        for (name, style) in &self.styles {
            style.validate().map_err(|e| match e {
                HeatmapError::InvalidStyle { field, message } => HeatmapError::InvalidStyle {
                    field: format!("{}.{}", name, field),
                    message,
                },
                other => other,
            })?;
        }
        Ok(())
    }
}
