use crate::{
    op::Operation,
    types::{Extent, MediaInfo, MediaKind},
};

use super::BackendError;

/// Outcome of applying one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// The media changed.
    Applied,
    /// The operation was an identity for the current media and nothing changed.
    Skipped,
}

/// Live media an operation log can be rendered onto.
///
/// `apply` is called once per logged operation, in log order. Implementations
/// detect identity operations themselves and answer [`Effect::Skipped`].
pub trait Backend {
    /// Which half of the catalog this backend accepts.
    const MEDIA: MediaKind;

    /// Current pixel (or canvas) size.
    fn extent(&self) -> Extent;

    /// Size plus whatever source metadata the backend tracks.
    fn info(&self) -> MediaInfo;

    /// Applies `op` to the media.
    fn apply(&mut self, op: &Operation) -> Result<Effect, BackendError>;
}

/// Backends accepting the raster commands.
pub trait RasterBackend: Backend {}

/// Backends accepting the vector commands.
pub trait VectorBackend: Backend {}
