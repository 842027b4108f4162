//! Error types for the heatmap workspace.

use thiserror::Error;

/// Result type alias using HeatmapError.
pub type HeatmapResult<T> = Result<T, HeatmapError>;

/// Primary error type for heatmap configuration, rendering and export.
#[derive(Debug, Error)]
pub enum HeatmapError {
    // === Configuration Errors ===
    #[error("Invalid style value for '{field}': {message}")]
    InvalidStyle { field: String, message: String },

    #[error("Style not found: {0}")]
    StyleNotFound(String),

    #[error("Failed to parse input: {0}")]
    Parse(String),

    // === Rendering Errors ===
    #[error("Surface size mismatch: expected {expected} bytes, got {actual}")]
    SurfaceSizeMismatch { expected: usize, actual: usize },

    #[error("Cannot allocate a {width}x{height} surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    Io(String),
}

impl HeatmapError {
    /// Shorthand for an [`HeatmapError::InvalidStyle`] error.
    pub fn invalid_style(field: impl Into<String>, message: impl Into<String>) -> Self {
        HeatmapError::InvalidStyle {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by user-supplied input rather than
    /// by the renderer or the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            HeatmapError::InvalidStyle { .. }
                | HeatmapError::StyleNotFound(_)
                | HeatmapError::Parse(_)
        )
    }
}

impl From<std::io::Error> for HeatmapError {
    fn from(err: std::io::Error) -> Self {
        HeatmapError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for HeatmapError {
    fn from(err: serde_json::Error) -> Self {
        HeatmapError::Parse(format!("JSON error: {}", err))
    }
}
