//! Error types for the det-analysis library.

use thiserror::Error;

use crate::types::CategoryId;

/// Result type for det-analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error types that can occur while loading, matching or rendering.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error while decoding or encoding an image.
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    /// Invalid annotation or detection record.
    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    /// Bounding box that cannot be normalized into a rectangle.
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Class id that is not part of the ground-truth taxonomy.
    #[error("Unknown category {id}: {context}")]
    UnknownCategory { id: CategoryId, context: String },

    /// Empty dataset provided.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// Threshold outside of [0.0, 1.0].
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Font file that ab_glyph cannot parse.
    #[error("Invalid font: {0}")]
    FontError(String),
}
