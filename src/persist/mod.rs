//! Journaling of recorded operations.

pub mod sqlite;

use serde::{Deserialize, Serialize};

use crate::{op::Operation, types::OpIndex, wire::WireError};

/// Version number for serialized [`OpEnvelope`] payloads.
pub const OP_FORMAT_VERSION: u16 = 1;

/// Journal failures.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Database failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Envelope encoding failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A stored operation did not decode back into the catalog.
    #[error("stored operation rejected: {0}")]
    Wire(#[from] WireError),
    /// Journal contents or call order that cannot be honoured.
    #[error("{0}")]
    Message(String),
}

/// Result alias for journal operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Versioned wrapper around one stored operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpEnvelope {
    /// Payload format version.
    pub format_version: u16,
    /// The operation in its wire shape (`{"name", "args"}`).
    pub op: serde_json::Value,
}

impl OpEnvelope {
    /// Wraps `op` using [`OP_FORMAT_VERSION`].
    pub fn new(op: &Operation) -> PersistResult<Self> {
        Ok(Self {
            format_version: OP_FORMAT_VERSION,
            op: crate::wire::operation_to_value(op)?,
        })
    }

    /// Decodes the wrapped operation, checking the format version.
    pub fn into_operation(self) -> PersistResult<Operation> {
        if self.format_version != OP_FORMAT_VERSION {
            return Err(PersistError::Message(format!(
                "unsupported op format version: {}",
                self.format_version
            )));
        }
        Ok(crate::wire::operation_from_value(self.op)?)
    }
}

/// Destination for operations appended to a document's log.
///
/// `start` is the log index of `ops[0]`; sinks reject non-contiguous appends.
pub trait LogSink {
    /// Persists `ops` for `doc`, returning the index after the last one.
    fn append_ops(&mut self, doc: &str, start: OpIndex, ops: &[Operation]) -> PersistResult<OpIndex>;

    /// Forces buffered writes out.
    fn flush(&mut self) -> PersistResult<()> {
        Ok(())
    }
}
