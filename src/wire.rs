//! JSON encoding of operation logs.
//!
//! A log is a JSON array, one object per operation, in log order:
//!
//! ```json
//! [{"name":"crop","args":[100,100,523,750]},{"name":"negate","args":[]}]
//! ```
//!
//! Decoding resolves every `name` through the command catalog and rebuilds the
//! arguments with the kinds the catalog schema prescribes. Any failure rejects
//! the whole document; no partial log is produced.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    command::{ArgKind, CommandId},
    core::log::{LogError, OperationLog},
    op::{Arg, OpError, Operation},
};

/// Encode/decode failures.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Malformed JSON or a shape other than `[{"name", "args"}]`.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// `name` is not in the catalog.
    #[error("operation {index}: unknown command \"{name}\"")]
    UnknownCommand {
        /// Position in the array.
        index: usize,
        /// Name as found.
        name: String,
    },
    /// Argument count differs from the command schema.
    #[error("operation {index} ({command}): expected {expected} arguments, found {found}")]
    Arity {
        /// Position in the array.
        index: usize,
        /// Resolved command.
        command: CommandId,
        /// Schema length.
        expected: usize,
        /// Arguments present.
        found: usize,
    },
    /// An argument cannot be read as the schema kind.
    #[error("operation {index} ({command}): argument {arg} is not a valid {expected}")]
    ArgKind {
        /// Position in the array.
        index: usize,
        /// Resolved command.
        command: CommandId,
        /// Argument position.
        arg: usize,
        /// Schema kind.
        expected: ArgKind,
    },
    /// NaN or infinity in a double argument.
    #[error("operation {index} ({command}): argument {arg} is not finite")]
    NonFinite {
        /// Position in the log.
        index: usize,
        /// Command holding the value.
        command: CommandId,
        /// Argument position.
        arg: usize,
    },
    /// More operations than the target log can hold.
    #[error("log capacity exceeded: {0}")]
    Capacity(#[from] LogError),
    /// Argument list longer than an operation can hold.
    #[error("{0}")]
    Op(#[from] OpError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireOp {
    name: String,
    args: Vec<Value>,
}

/// Serializes `log` as a compact JSON array.
pub fn to_json(log: &OperationLog) -> Result<String, WireError> {
    check_finite(log)?;
    Ok(serde_json::to_string(log)?)
}

/// Serializes `log` as an indented JSON array.
pub fn to_json_pretty(log: &OperationLog) -> Result<String, WireError> {
    check_finite(log)?;
    Ok(serde_json::to_string_pretty(log)?)
}

/// Serializes `log` into a [`serde_json::Value`].
pub fn to_value(log: &OperationLog) -> Result<Value, WireError> {
    check_finite(log)?;
    Ok(serde_json::to_value(log)?)
}

/// Parses a JSON array into a fresh log holding at most `capacity` operations.
pub fn from_json(json: &str, capacity: usize) -> Result<OperationLog, WireError> {
    let wire: Vec<WireOp> = serde_json::from_str(json)?;
    build_log(wire, capacity)
}

/// Like [`from_json`], starting from an already parsed value.
pub fn from_value(value: Value, capacity: usize) -> Result<OperationLog, WireError> {
    let wire: Vec<WireOp> = serde_json::from_value(value)?;
    build_log(wire, capacity)
}

/// Serializes a single operation as `{"name": ..., "args": [...]}`.
pub fn operation_to_json(op: &Operation) -> Result<String, WireError> {
    check_op_finite(0, op)?;
    Ok(serde_json::to_string(op)?)
}

/// Parses a single `{"name": ..., "args": [...]}` object.
pub fn operation_from_json(json: &str) -> Result<Operation, WireError> {
    let wire: WireOp = serde_json::from_str(json)?;
    decode_op(0, wire)
}

/// Serializes a single operation into a [`serde_json::Value`].
pub fn operation_to_value(op: &Operation) -> Result<Value, WireError> {
    check_op_finite(0, op)?;
    Ok(serde_json::to_value(op)?)
}

/// Like [`operation_from_json`], starting from an already parsed value.
pub fn operation_from_value(value: Value) -> Result<Operation, WireError> {
    let wire: WireOp = serde_json::from_value(value)?;
    decode_op(0, wire)
}

fn build_log(wire: Vec<WireOp>, capacity: usize) -> Result<OperationLog, WireError> {
    let mut log = OperationLog::with_capacity(capacity);
    for (index, entry) in wire.into_iter().enumerate() {
        let op = decode_op(index, entry)?;
        log.append(op)?;
    }
    Ok(log)
}

fn decode_op(index: usize, wire: WireOp) -> Result<Operation, WireError> {
    let Some(command) = CommandId::from_name(&wire.name) else {
        return Err(WireError::UnknownCommand {
            index,
            name: wire.name,
        });
    };

    let schema = command.schema();
    if schema.len() != wire.args.len() {
        return Err(WireError::Arity {
            index,
            command,
            expected: schema.len(),
            found: wire.args.len(),
        });
    }

    let mut op = Operation::new(command);
    for (arg, (kind, value)) in schema.iter().zip(wire.args).enumerate() {
        let decoded = decode_arg(*kind, value).ok_or(WireError::ArgKind {
            index,
            command,
            arg,
            expected: *kind,
        })?;
        op.push_arg(decoded)?;
    }
    Ok(op)
}

fn decode_arg(kind: ArgKind, value: Value) -> Option<Arg> {
    match (kind, value) {
        (ArgKind::Text, Value::String(s)) => Some(Arg::Text(s)),
        (ArgKind::Double, Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).map(Arg::Double),
        (ArgKind::Uint, Value::Number(n)) => integral(&n)
            .and_then(|v| u32::try_from(v).ok())
            .map(Arg::Uint),
        (ArgKind::Int, Value::Number(n)) => integral(&n)
            .and_then(|v| i32::try_from(v).ok())
            .map(Arg::Int),
        _ => None,
    }
}

/// Integer value of `n`, accepting floats with no fractional part.
fn integral(n: &serde_json::Number) -> Option<i64> {
    if let Some(v) = n.as_i64() {
        return Some(v);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn check_finite(log: &OperationLog) -> Result<(), WireError> {
    for (index, op) in log.iter().enumerate() {
        check_op_finite(index, op)?;
    }
    Ok(())
}

fn check_op_finite(index: usize, op: &Operation) -> Result<(), WireError> {
    for (arg, value) in op.args().iter().enumerate() {
        if matches!(value, Arg::Double(v) if !v.is_finite()) {
            return Err(WireError::NonFinite {
                index,
                command: op.command(),
                arg,
            });
        }
    }
    Ok(())
}
