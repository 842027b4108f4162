//! Replay a camera motion against the viewport cache.
//!
//! The first frame is a full render. Each step then moves the camera and
//! lets the layer follow by transforming the cached raster, so the written
//! frames show what a compositor would display. Once the motion stops the
//! debounced rebuild fires and a final, freshly rendered frame is written.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use renderer::{PanOutcome, PixmapSurface, RenderOutcome};
use tracing::{debug, info};

use crate::config::{StyleArgs, ViewArgs};
use crate::data::load_points;
use crate::render::{build_layer, write_png};

#[derive(Args, Debug, Clone)]
pub struct AnimateArgs {
    /// JSON file with weighted points
    #[arg(short, long)]
    pub points: PathBuf,

    /// Directory for the frame PNGs
    #[arg(short, long, default_value = "frames")]
    pub output_dir: PathBuf,

    /// Number of camera steps
    #[arg(long, default_value_t = 10)]
    pub steps: u32,

    /// Time between steps in milliseconds
    #[arg(long, default_value_t = 50)]
    pub interval_ms: u64,

    /// Horizontal pan per step, in pixels
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub pan_x: f64,

    /// Vertical pan per step, in pixels
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub pan_y: f64,

    /// Zoom change per step
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub zoom_step: f64,

    /// Clockwise rotation per step, in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub rotate_step: f64,

    #[command(flatten)]
    pub view: ViewArgs,

    #[command(flatten)]
    pub style: StyleArgs,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationSummary {
    pub frames: usize,
    pub transformed: usize,
    pub rebuilds: usize,
}

fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{:04}.png", index))
}

fn write_frame(surface: &PixmapSurface, dir: &Path, index: usize) -> Result<()> {
    let frame = surface.composited()?;
    let path = frame_path(dir, index);
    write_png(&frame, &path)?;
    debug!(path = ?path, "Wrote frame");
    Ok(())
}

pub async fn run(args: &AnimateArgs) -> Result<AnimationSummary> {
    let style = args.style.resolve_style()?;
    let points = load_points(&args.points)?;
    let mut layer = build_layer(style, &args.style, points);

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create {:?}", args.output_dir))?;

    let mut camera = args.view.camera();
    let mut surface = PixmapSurface::new(args.view.width, args.view.height)?;
    let mut summary = AnimationSummary::default();

    layer.render(&mut surface, &camera)?;
    write_frame(&surface, &args.output_dir, summary.frames)?;
    summary.frames += 1;

    let interval = Duration::from_millis(args.interval_ms);
    for _ in 0..args.steps {
        tokio::time::sleep(interval).await;

        camera.zoom_by(args.zoom_step);
        camera.pan_by(args.pan_x, args.pan_y);
        camera.rotate_by(args.rotate_step);

        let now = Instant::now();
        if let PanOutcome::Transformed { .. } = layer.on_pan(&mut surface, &camera, now) {
            summary.transformed += 1;
        }
        if layer.poll(now) && layer.render(&mut surface, &camera)? == RenderOutcome::Rendered {
            summary.rebuilds += 1;
        }

        write_frame(&surface, &args.output_dir, summary.frames)?;
        summary.frames += 1;
    }

    if let Some(deadline) = layer.next_deadline() {
        debug!(
            wait_ms = deadline.saturating_duration_since(Instant::now()).as_millis() as u64,
            "Waiting for rebuild"
        );
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;

        let fired = layer.poll(Instant::now());
        if fired && layer.render(&mut surface, &camera)? == RenderOutcome::Rendered {
            summary.rebuilds += 1;
            write_frame(&surface, &args.output_dir, summary.frames)?;
            summary.frames += 1;
        }
    }

    info!(
        frames = summary.frames,
        transformed = summary.transformed,
        rebuilds = summary.rebuilds,
        output_dir = ?args.output_dir,
        "Animation complete"
    );
    Ok(summary)
}
