//! Error types surfaced by the public drawing API.

use crate::scene::EntityId;
use crate::SurfaceId;
use thiserror::Error;

/// Errors returned synchronously to callers of the drawing API.
///
/// Pointer events that miss the globe, node calls with an unresolvable index
/// and similar absence-of-state conditions are not errors; they are absorbed
/// and show up only as a missing side effect.
#[derive(Debug, Error)]
pub enum DrawError {
    #[error("geometry type is required")]
    MissingKind,
    #[error("unsupported geometry type: {0}")]
    UnsupportedKind(String),
    #[error("invalid draw options: {0}")]
    InvalidOptions(String),
    #[error("invalid surface configuration: {0}")]
    InvalidConfig(String),
    #[error("entity {0} was not created by this drawer and does not support editing")]
    NotOwned(EntityId),
    #[error("geometry {0} is still being drawn")]
    StillDrawing(EntityId),
    #[error("unknown surface: {0}")]
    UnknownSurface(SurfaceId),
}

/// Result type for drawing operations.
pub type DrawResult<T> = Result<T, DrawError>;
