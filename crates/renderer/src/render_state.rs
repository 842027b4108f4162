//! Last-applied drawing state, used to skip redundant surface writes.

use crate::surface::RenderSurface;

#[derive(Debug, Default, Clone)]
pub struct RenderState {
    global_alpha: Option<f32>,
    writes: usize,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; the next write of each property goes through.
    pub fn reset(&mut self) {
        self.global_alpha = None;
    }

    /// Set the surface's global alpha unless it already holds `alpha`.
    pub fn set_global_alpha<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, alpha: f32) {
        if self.global_alpha == Some(alpha) {
            return;
        }
        surface.set_global_alpha(alpha);
        self.global_alpha = Some(alpha);
        self.writes += 1;
    }

    /// Number of writes that actually reached a surface.
    pub fn writes(&self) -> usize {
        self.writes
    }
}
