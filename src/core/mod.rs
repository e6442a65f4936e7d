//! Bounded, append-only operation log.

/// Operation log and capacity errors.
pub mod log;
