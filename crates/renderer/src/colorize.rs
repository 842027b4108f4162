//! Maps accumulated alpha to gradient colors.

use heatmap_common::HeatmapResult;

use crate::gradient::GradientTable;
use crate::surface::RenderSurface;

/// Recolors a raster in place through a [`GradientTable`].
#[derive(Debug, Default)]
pub struct Colorizer {
    buffer: Vec<u8>,
}

impl Colorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every non-transparent RGBA pixel with `table[alpha]`.
    ///
    /// Pixels with zero alpha are left untouched. A trailing partial pixel
    /// is ignored.
    pub fn colorize(pixels: &mut [u8], table: &GradientTable) {
        for px in pixels.chunks_exact_mut(4) {
            let a = px[3];
            if a == 0 {
                continue;
            }
            px.copy_from_slice(&table.entry(a));
        }
    }

    /// Read `surface`, colorize it, and write the result back.
    pub fn colorize_surface<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        table: &GradientTable,
    ) -> HeatmapResult<()> {
        let len = surface.byte_len();
        if self.buffer.len() != len {
            self.buffer = vec![0; len];
        }
        surface.read_pixels(&mut self.buffer)?;
        Self::colorize(&mut self.buffer, table);
        surface.write_pixels(&self.buffer)
    }

    /// Capacity of the working buffer, in bytes.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn release(&mut self) {
        self.buffer = Vec::new();
    }
}
