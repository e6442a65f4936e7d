//! A document: one backend plus the operation log recorded against it.
//!
//! Recording validates an operation against the catalog schema, its argument
//! domain, and the document's projected extent, then appends it. Nothing
//! touches the backend until [`Document::render`].

mod intent;
pub mod validate;

use tracing::{debug, warn};

use crate::{
    backend::{
        Backend, RenderError, RenderOptions, RenderReport, Renderer,
        raster::RasterImage, vector::VectorCanvas,
    },
    command::CommandId,
    config::{ConfigError, DocumentConfig},
    core::log::{LogError, OperationLog},
    op::{Arg, OpError, Operation, SchemaError},
    persist::{LogSink, PersistResult},
    types::{Extent, MediaInfo, MediaKind, OpIndex},
    wire::{self, WireError},
};

pub use self::intent::DEFAULT_ROTATE_BACKGROUND;

use self::validate::{Reason, check_domain, check_state};

/// Document over a decoded image.
pub type RasterDocument = Document<RasterImage>;
/// Document over a drawing canvas.
pub type VectorDocument = Document<VectorCanvas>;

/// Why an operation was not recorded. The document is unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    /// The command belongs to the other media kind.
    #[error("{command} cannot be recorded on a {media} document")]
    WrongMedia {
        /// Rejected command.
        command: CommandId,
        /// Media of the document.
        media: MediaKind,
    },
    /// Argument count or kinds differ from the catalog schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// An argument is outside its permitted range or format.
    #[error("{command}: {reason}")]
    Domain {
        /// Rejected command.
        command: CommandId,
        /// Violated rule.
        reason: Reason,
    },
    /// Valid arguments that do not fit the document's current extent.
    #[error("{command}: {reason}")]
    State {
        /// Rejected command.
        command: CommandId,
        /// Violated rule.
        reason: Reason,
    },
    /// The log is full.
    #[error("{command}: operation log is full ({capacity} operations)")]
    Capacity {
        /// Rejected command.
        command: CommandId,
        /// Log capacity.
        capacity: usize,
    },
    /// More arguments than an operation can carry.
    #[error("{command}: more than {max} arguments")]
    TooManyArgs {
        /// Rejected command.
        command: CommandId,
        /// Argument limit.
        max: usize,
    },
    /// Storage for the operation could not be reserved.
    #[error("{command}: allocation failed")]
    Allocation {
        /// Rejected command.
        command: CommandId,
    },
}

impl RecordError {
    fn from_log(command: CommandId, err: LogError) -> Self {
        match err {
            LogError::Full { capacity } => Self::Capacity { command, capacity },
            LogError::Allocation => Self::Allocation { command },
        }
    }
}

impl From<OpError> for RecordError {
    fn from(value: OpError) -> Self {
        match value {
            OpError::Allocation { command } => Self::Allocation { command },
            OpError::TooManyArgs { command, max } => Self::TooManyArgs { command, max },
        }
    }
}

/// A replayed log was rejected; nothing from it was recorded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("replay rejected at operation {index}: {source}")]
pub struct ReplayError {
    /// Position in the replayed log.
    pub index: OpIndex,
    /// Why that operation was rejected.
    #[source]
    pub source: RecordError,
}

/// One piece of media and its pending edits.
#[derive(Debug)]
pub struct Document<B: Backend> {
    backend: B,
    log: OperationLog,
    extent: Extent,
    journaled: usize,
    config: DocumentConfig,
}

impl<B: Backend> Document<B> {
    /// Wraps `backend` with the default configuration.
    pub fn new(backend: B) -> Self {
        Self::build(backend, DocumentConfig::default())
    }

    /// Wraps `backend` with `config`, rejecting invalid settings.
    pub fn with_config(backend: B, config: DocumentConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(backend, config))
    }

    fn build(backend: B, config: DocumentConfig) -> Self {
        let extent = backend.extent();
        Self {
            backend,
            log: OperationLog::with_capacity(config.log_capacity),
            extent,
            journaled: 0,
            config,
        }
    }

    /// Validates `op` and appends it to the log.
    pub fn record(&mut self, op: Operation) -> Result<OpIndex, RecordError> {
        let command = op.command();
        let next = match self.admit(&op, self.extent) {
            Ok(next) => next,
            Err(err) => {
                warn!(%command, error = %err, "operation rejected");
                return Err(err);
            }
        };

        let index = self
            .log
            .append(op)
            .map_err(|err| RecordError::from_log(command, err))
            .inspect_err(|err| warn!(%command, error = %err, "operation rejected"))?;
        self.extent = next;
        debug!(%command, index, extent = %next, "recorded operation");
        Ok(index)
    }

    fn record_args<const N: usize>(
        &mut self,
        command: CommandId,
        args: [Arg; N],
    ) -> Result<OpIndex, RecordError> {
        let op = Operation::with_args(command, args)?;
        self.record(op)
    }

    /// Runs every check against `extent` and returns the projected extent.
    fn admit(&self, op: &Operation, extent: Extent) -> Result<Extent, RecordError> {
        let command = op.command();
        if command.media() != B::MEDIA {
            return Err(RecordError::WrongMedia {
                command,
                media: B::MEDIA,
            });
        }
        op.check_schema()?;
        check_domain(op).map_err(|reason| RecordError::Domain { command, reason })?;
        check_state(op, extent).map_err(|reason| RecordError::State { command, reason })
    }

    /// Records every operation of `log`, or none of them.
    #[tracing::instrument(skip_all, fields(media = %B::MEDIA, ops = log.len()))]
    pub fn replay(&mut self, log: &OperationLog) -> Result<usize, ReplayError> {
        let mut extent = self.extent;
        for (index, op) in log.iter().enumerate() {
            extent = self
                .admit(op, extent)
                .map_err(|source| ReplayError { index, source })?;
        }

        let room = self.log.remaining();
        if let Some(overflow) = log.get(room) {
            return Err(ReplayError {
                index: room,
                source: RecordError::Capacity {
                    command: overflow.command(),
                    capacity: self.log.capacity(),
                },
            });
        }

        if let Some(first) = log.get(0) {
            let command = first.command();
            self.log.reserve(log.len()).map_err(|err| ReplayError {
                index: 0,
                source: RecordError::from_log(command, err),
            })?;
        }

        for (index, op) in log.iter().enumerate() {
            let command = op.command();
            self.log
                .append(op.clone())
                .map_err(|err| ReplayError {
                    index,
                    source: RecordError::from_log(command, err),
                })?;
        }
        self.extent = extent;
        debug!(count = log.len(), extent = %extent, "replayed log");
        Ok(log.len())
    }

    /// Applies the log to the backend in order, stopping at the first failure.
    #[tracing::instrument(skip_all, fields(media = %B::MEDIA, ops = self.log.len()))]
    pub fn render(&mut self) -> Result<RenderReport, RenderError> {
        let renderer = Renderer::new(RenderOptions {
            verbose: self.config.verbose_render,
        });
        renderer.render(&self.log, &mut self.backend)
    }

    /// The log as a compact JSON array.
    pub fn serialize(&self) -> Result<String, WireError> {
        wire::to_json(&self.log)
    }

    /// Live backend metadata. Does not record anything.
    pub fn info(&self) -> MediaInfo {
        self.backend.info()
    }

    /// Extent after every recorded operation, rendered or not.
    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Recorded operations.
    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    /// The backend, in whatever state the last render left it.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Settings this document was created with.
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Journals operations appended since the last flush under `doc`.
    pub fn flush_to<S: LogSink + ?Sized>(&mut self, sink: &mut S, doc: &str) -> PersistResult<usize> {
        let pending = self.log.since(self.journaled);
        if pending.is_empty() {
            return Ok(0);
        }
        let count = pending.len();
        sink.append_ops(doc, self.journaled, pending)?;
        self.journaled += count;
        debug!(doc, count, journaled = self.journaled, "flushed operations");
        Ok(count)
    }

    /// Releases the log and hands back the backend.
    pub fn close(self) -> B {
        let Self { backend, log, .. } = self;
        drop(log);
        backend
    }
}

impl RasterDocument {
    /// Opens the image at `path` with the default configuration.
    pub fn open_raster(path: impl AsRef<std::path::Path>) -> Result<Self, crate::backend::BackendError> {
        Ok(Self::new(RasterImage::open(path)?))
    }
}

impl VectorDocument {
    /// Empty `width` x `height` drawing with the default configuration.
    pub fn new_vector(width: u32, height: u32) -> Self {
        Self::new(VectorCanvas::new(width, height))
    }
}
