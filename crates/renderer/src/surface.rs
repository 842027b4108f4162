//! Render targets for the heatmap raster.
//!
//! [`RenderSurface`] is the narrow drawing interface the rasterizer needs:
//! clear, composite a glyph with a global opacity, read and write raw RGBA
//! pixels, and carry a display transform that a compositor applies when
//! showing the raster. [`PixmapSurface`] implements it on a `tiny_skia`
//! pixmap.

use heatmap_common::{HeatmapError, HeatmapResult, ScreenPoint};
use tiny_skia::{
    BlendMode, Color, ColorU8, FilterQuality, Pixmap, PixmapPaint, Transform,
};

use crate::stamp::StampKernel;

/// Affine transform applied to an already rendered raster:
/// `translate(origin) · scale(scale) · rotate(rotation)` about the raster's
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Where the raster's top-left corner lands, in display pixels
    pub origin: ScreenPoint,
    /// Uniform scale factor
    pub scale: f64,
    /// Clockwise rotation in radians
    pub rotation: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        origin: ScreenPoint::ORIGIN,
        scale: 1.0,
        rotation: 0.0,
    };

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.to_degrees()
    }

    /// CSS `transform` value for this transform (with `transform-origin: 0 0`).
    pub fn to_css(&self) -> String {
        format!(
            "translate({}px,{}px) scale({}) rotate({}deg)",
            self.origin.x,
            self.origin.y,
            self.scale,
            self.rotation_degrees()
        )
    }

    /// Map a raster pixel position to display space.
    pub fn apply(&self, p: ScreenPoint) -> ScreenPoint {
        let (sin, cos) = self.rotation.sin_cos();
        ScreenPoint::new(
            self.origin.x + self.scale * (cos * p.x - sin * p.y),
            self.origin.y + self.scale * (sin * p.x + cos * p.y),
        )
    }

    pub fn to_affine(&self) -> Transform {
        let (sin, cos) = self.rotation.sin_cos();
        let s = self.scale;
        Transform::from_row(
            (s * cos) as f32,
            (s * sin) as f32,
            (-s * sin) as f32,
            (s * cos) as f32,
            self.origin.x as f32,
            self.origin.y as f32,
        )
    }
}

/// A clearable, drawable RGBA raster.
pub trait RenderSurface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Reset drawing state and make every pixel transparent.
    fn clear(&mut self);

    /// Opacity applied to subsequent [`RenderSurface::draw_glyph`] calls.
    fn set_global_alpha(&mut self, alpha: f32);

    /// Composite `glyph` with its top-left corner at `(x, y)` using
    /// source-over blending.
    fn draw_glyph(&mut self, glyph: &StampKernel, x: i32, y: i32);

    /// Copy the raster as unpremultiplied RGBA into `out`, which must hold
    /// exactly `width * height * 4` bytes.
    fn read_pixels(&self, out: &mut [u8]) -> HeatmapResult<()>;

    /// Replace the raster with unpremultiplied RGBA `pixels`.
    fn write_pixels(&mut self, pixels: &[u8]) -> HeatmapResult<()>;

    /// Set or clear the transform used when displaying the raster.
    fn set_display_transform(&mut self, transform: Option<ViewTransform>);

    fn display_transform(&self) -> Option<ViewTransform>;

    fn byte_len(&self) -> usize {
        self.width() as usize * self.height() as usize * 4
    }
}

/// A [`RenderSurface`] backed by a premultiplied `tiny_skia` pixmap.
#[derive(Debug, Clone)]
pub struct PixmapSurface {
    pixmap: Pixmap,
    global_alpha: f32,
    display_transform: Option<ViewTransform>,
}

impl PixmapSurface {
    pub fn new(width: u32, height: u32) -> HeatmapResult<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(HeatmapError::SurfaceAllocation { width, height })?;
        Ok(Self {
            pixmap,
            global_alpha: 1.0,
            display_transform: None,
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Unpremultiplied RGBA at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    /// The whole raster as unpremultiplied RGBA.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.byte_len()];
        for (dst, p) in out.chunks_exact_mut(4).zip(self.pixmap.pixels()) {
            let c = p.demultiply();
            dst.copy_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Draw the raster onto `target` the way a compositor would show it:
    /// through the current display transform, bilinearly resampled.
    pub fn composite_onto(&self, target: &mut Pixmap) {
        let transform = self
            .display_transform
            .map(|t| t.to_affine())
            .unwrap_or_default();
        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Bilinear,
        };
        target.draw_pixmap(0, 0, self.pixmap.as_ref(), &paint, transform, None);
    }

    /// A new surface of the same size holding what a compositor would show
    /// right now.
    pub fn composited(&self) -> HeatmapResult<PixmapSurface> {
        let mut frame = PixmapSurface::new(self.width(), self.height())?;
        self.composite_onto(&mut frame.pixmap);
        Ok(frame)
    }
}

impl RenderSurface for PixmapSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
        self.global_alpha = 1.0;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    fn draw_glyph(&mut self, glyph: &StampKernel, x: i32, y: i32) {
        let paint = PixmapPaint {
            opacity: self.global_alpha,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Nearest,
        };
        self.pixmap
            .draw_pixmap(x, y, glyph.pixmap().as_ref(), &paint, Transform::identity(), None);
    }

    fn read_pixels(&self, out: &mut [u8]) -> HeatmapResult<()> {
        if out.len() != self.byte_len() {
            return Err(HeatmapError::SurfaceSizeMismatch {
                expected: self.byte_len(),
                actual: out.len(),
            });
        }
        for (dst, p) in out.chunks_exact_mut(4).zip(self.pixmap.pixels()) {
            let c = p.demultiply();
            dst.copy_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Ok(())
    }

    fn write_pixels(&mut self, pixels: &[u8]) -> HeatmapResult<()> {
        if pixels.len() != self.byte_len() {
            return Err(HeatmapError::SurfaceSizeMismatch {
                expected: self.byte_len(),
                actual: pixels.len(),
            });
        }
        for (dst, src) in self.pixmap.pixels_mut().iter_mut().zip(pixels.chunks_exact(4)) {
            *dst = ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
        }
        Ok(())
    }

    fn set_display_transform(&mut self, transform: Option<ViewTransform>) {
        self.display_transform = transform;
    }

    fn display_transform(&self) -> Option<ViewTransform> {
        self.display_transform
    }
}
