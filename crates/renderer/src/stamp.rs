//! Soft circular stamp used to splat each data point.
//!
//! The stamp is an alpha-only glyph: an opaque disk of `radius` pixels whose
//! edge falls off along a Gaussian over another `blur` pixels. Only the
//! alpha channel is consumed downstream; color channels stay black.

use heatmap_common::{HeatmapError, HeatmapResult, MAX_STAMP_SIDE};
use tiny_skia::{Pixmap, PremultipliedColorU8};
use tracing::debug;

/// Width of the falloff, in standard deviations, covered by the blur band.
const FALLOFF_SIGMAS: f64 = 3.0;

#[derive(Debug, Clone)]
pub struct StampKernel {
    radius: f64,
    blur: f64,
    pixmap: Pixmap,
}

impl StampKernel {
    /// Render the glyph into a square of side `ceil(2 * (radius + blur))`.
    ///
    /// Negative or non-finite sizes are treated as zero. A zero-sized stamp
    /// still gets a single transparent pixel, since a pixmap cannot be
    /// empty. Sides above [`MAX_STAMP_SIDE`] are refused without allocating.
    pub fn build(radius: f64, blur: f64) -> HeatmapResult<Self> {
        let radius = sanitize(radius);
        let blur = sanitize(blur);
        let side = (2.0 * (radius + blur)).ceil().max(1.0);
        if side > MAX_STAMP_SIDE as f64 {
            let side = side.min(u32::MAX as f64) as u32;
            return Err(HeatmapError::SurfaceAllocation {
                width: side,
                height: side,
            });
        }
        let side = side as u32;

        let mut pixmap = Pixmap::new(side, side).ok_or(HeatmapError::SurfaceAllocation {
            width: side,
            height: side,
        })?;

        let center = side as f64 / 2.0;
        let pixels = pixmap.pixels_mut();
        for y in 0..side {
            for x in 0..side {
                let dx = x as f64 + 0.5 - center;
                let dy = y as f64 + 0.5 - center;
                let alpha = falloff(dx.hypot(dy), radius, blur);
                let a = (alpha * 255.0).round() as u8;
                if let Some(color) = PremultipliedColorU8::from_rgba(0, 0, 0, a) {
                    pixels[(y * side + x) as usize] = color;
                }
            }
        }

        debug!(radius, blur, side, "Built stamp kernel");
        Ok(Self {
            radius,
            blur,
            pixmap,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn blur(&self) -> f64 {
        self.blur
    }

    /// Side length of the square glyph, in pixels.
    pub fn side(&self) -> u32 {
        self.pixmap.width()
    }

    /// Distance from the glyph's top-left corner to its center.
    ///
    /// Glyphs are placed on whole pixels, so with an odd side the drawn
    /// center lands half a pixel off the point.
    pub fn extent(&self) -> f64 {
        self.side() as f64 / 2.0
    }

    /// Alpha of the glyph at pixel `(x, y)`; zero outside the glyph.
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.pixmap
            .pixel(x, y)
            .map(|p| p.alpha())
            .unwrap_or(0)
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    fn matches(&self, radius: f64, blur: f64) -> bool {
        self.radius == sanitize(radius) && self.blur == sanitize(blur)
    }
}

fn sanitize(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        0.0
    }
}

/// Alpha in `[0, 1]` at distance `d` from the center.
fn falloff(d: f64, radius: f64, blur: f64) -> f64 {
    if d <= radius {
        return 1.0;
    }
    if blur <= 0.0 || d >= radius + blur {
        return 0.0;
    }
    let sigma = blur / FALLOFF_SIGMAS;
    let z = (d - radius) / sigma;
    (-0.5 * z * z).exp()
}

/// Memoizes the stamp for the most recent (radius, blur) pair.
#[derive(Debug, Default)]
pub struct StampCache {
    kernel: Option<StampKernel>,
    builds: usize,
}

impl StampCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp for `(radius, blur)`, rebuilt only when either changed.
    pub fn get(&mut self, radius: f64, blur: f64) -> HeatmapResult<&StampKernel> {
        let kernel = match self.kernel.take() {
            Some(kernel) if kernel.matches(radius, blur) => kernel,
            _ => {
                let kernel = StampKernel::build(radius, blur)?;
                self.builds += 1;
                kernel
            }
        };
        Ok(self.kernel.insert(kernel))
    }

    pub fn current(&self) -> Option<&StampKernel> {
        self.kernel.as_ref()
    }

    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn clear(&mut self) {
        self.kernel = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_falloff_profile() {
        assert_eq!(falloff(0.0, 5.0, 3.0), 1.0);
        assert_eq!(falloff(5.0, 5.0, 3.0), 1.0);
        assert_eq!(falloff(8.0, 5.0, 3.0), 0.0);
        let mid = falloff(6.5, 5.0, 3.0);
        assert!(mid > 0.0 && mid < 1.0);
        assert!(falloff(6.0, 5.0, 3.0) > falloff(7.0, 5.0, 3.0));
    }

    #[test]
    fn test_hard_disk_without_blur() {
        let kernel = StampKernel::build(4.0, 0.0).unwrap();
        assert_eq!(kernel.side(), 8);
        assert_eq!(kernel.alpha_at(4, 4), 255);
        assert_eq!(kernel.alpha_at(0, 0), 0);
    }

    #[test]
    fn test_degenerate_sizes() {
        let kernel = StampKernel::build(-3.0, f64::NAN).unwrap();
        assert_eq!(kernel.side(), 1);
        assert_eq!(kernel.radius(), 0.0);
        assert_eq!(kernel.blur(), 0.0);
    }
}
