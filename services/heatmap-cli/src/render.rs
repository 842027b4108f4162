//! Single-frame rendering.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use heatmap_common::{HeatmapStyle, WeightedPoint};
use renderer::{png, HeatmapLayer, PixmapSurface, RenderOutcome, RenderSurface};
use tracing::info;

use crate::config::{StyleArgs, ViewArgs};
use crate::data::load_points;

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// JSON file with weighted points
    #[arg(short, long)]
    pub points: PathBuf,

    /// Output PNG path
    #[arg(short, long, default_value = "heatmap.png")]
    pub output: PathBuf,

    #[command(flatten)]
    pub view: ViewArgs,

    #[command(flatten)]
    pub style: StyleArgs,
}

/// Build a layer for `points` with the fixed bounds from `style_args`.
pub fn build_layer(
    style: HeatmapStyle,
    style_args: &StyleArgs,
    points: Vec<WeightedPoint>,
) -> HeatmapLayer<WeightedPoint> {
    let mut layer = HeatmapLayer::weighted(style).with_data(points);
    layer.set_min_intensity(style_args.min_intensity);
    layer.set_max_intensity(style_args.max_intensity);
    layer
}

pub fn write_png(surface: &PixmapSurface, path: &Path) -> Result<usize> {
    let bytes = png::encode_surface(surface).context("Failed to encode PNG")?;
    std::fs::write(path, &bytes).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(bytes.len())
}

pub fn run(args: &RenderArgs) -> Result<()> {
    let style = args.style.resolve_style()?;
    let points = load_points(&args.points)?;
    let mut layer = build_layer(style, &args.style, points);

    let camera = args.view.camera();
    let mut surface = PixmapSurface::new(args.view.width, args.view.height)?;

    let outcome = layer.render(&mut surface, &camera)?;
    if outcome != RenderOutcome::Rendered {
        anyhow::bail!("Heatmap was not rendered: {:?}", outcome);
    }

    let size = write_png(&surface, &args.output)?;
    let bounds = layer.bounds();
    info!(
        output = ?args.output,
        bytes = size,
        width = surface.width(),
        height = surface.height(),
        min = bounds.min,
        max = bounds.max,
        "Wrote heatmap"
    );
    Ok(())
}
