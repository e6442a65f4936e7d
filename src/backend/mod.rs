//! Media backends and the in-order renderer that drives them.

mod effects;
pub mod raster;
/// In-order log walk with abort at the first failure.
pub mod render;
/// Backend contract and media marker traits.
pub mod traits;
pub mod vector;

use crate::{
    color::ColorError,
    command::CommandId,
    op::ArgError,
    types::MediaKind,
};

pub use render::{RenderError, RenderOptions, RenderReport, Renderer};
pub use traits::{Backend, Effect, RasterBackend, VectorBackend};

/// Failure applying one operation to live media.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend has no effect implementation for this command.
    #[error("{command} is not supported by the {media} backend")]
    Unsupported {
        /// Command requested.
        command: CommandId,
        /// Backend media kind.
        media: MediaKind,
    },
    /// An argument could not be read back out of the operation.
    #[error(transparent)]
    Argument(#[from] ArgError),
    /// A colour argument did not parse.
    #[error(transparent)]
    Color(#[from] ColorError),
    /// The effect itself refused the current media state.
    #[error("{command}: {reason}")]
    Effect {
        /// Command being applied.
        command: CommandId,
        /// What went wrong.
        reason: String,
    },
    /// Decoding or encoding failure.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    /// File system failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BackendError {
    pub(crate) fn effect(command: CommandId, reason: impl Into<String>) -> Self {
        Self::Effect {
            command,
            reason: reason.into(),
        }
    }
}
