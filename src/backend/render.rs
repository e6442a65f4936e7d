use tracing::{info, trace, warn};

use crate::{
    command::CommandId,
    core::log::OperationLog,
    types::OpIndex,
    wire,
};

use super::{Backend, BackendError, Effect};

/// Rendering knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Log every operation's JSON at `info` instead of `trace`.
    pub verbose: bool,
}

/// Counts from a completed render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Operations that changed the media.
    pub applied: usize,
    /// Operations the backend recognised as identities.
    pub skipped: usize,
}

impl RenderReport {
    /// Total operations the backend was asked to apply.
    pub fn total(&self) -> usize {
        self.applied + self.skipped
    }
}

/// Render stopped at the first failing operation.
///
/// Operations before `index` have already been applied to the media; nothing
/// at or after it has.
#[derive(Debug, thiserror::Error)]
#[error("render failed at operation {index} ({command}): {source}")]
pub struct RenderError {
    /// Position of the failing operation in the log.
    pub index: OpIndex,
    /// Its command.
    pub command: CommandId,
    /// Backend failure.
    #[source]
    pub source: BackendError,
}

/// Walks a log front to back, applying each operation to a backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    /// Renderer using `options`.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Options in effect.
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Applies every operation in `log` to `backend`, stopping at the first failure.
    pub fn render<B: Backend>(
        &self,
        log: &OperationLog,
        backend: &mut B,
    ) -> Result<RenderReport, RenderError> {
        let mut report = RenderReport::default();

        for (index, op) in log.iter().enumerate() {
            if self.options.verbose {
                match wire::operation_to_json(op) {
                    Ok(json) => info!(index, op = %json, "rendering operation"),
                    Err(err) => info!(index, command = %op.command(), error = %err, "rendering operation"),
                }
            } else {
                trace!(index, command = %op.command(), "rendering operation");
            }

            match backend.apply(op) {
                Ok(Effect::Applied) => report.applied += 1,
                Ok(Effect::Skipped) => {
                    trace!(index, command = %op.command(), "identity operation skipped");
                    report.skipped += 1;
                }
                Err(source) => {
                    warn!(index, command = %op.command(), error = %source, "render aborted");
                    return Err(RenderError {
                        index,
                        command: op.command(),
                        source,
                    });
                }
            }
        }

        info!(
            applied = report.applied,
            skipped = report.skipped,
            extent = %backend.extent(),
            "render complete"
        );
        Ok(report)
    }
}
