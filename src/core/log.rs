use serde::Serialize;

use crate::{op::Operation, types::OpIndex};

/// Default number of operations one log may hold.
pub const DEFAULT_LOG_CAPACITY: usize = 1024;

/// Append failures. The log is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    /// The log already holds `capacity` operations.
    #[error("operation log is full ({capacity} operations)")]
    Full {
        /// Configured capacity.
        capacity: usize,
    },
    /// Storage for the new slot could not be reserved.
    #[error("operation log allocation failed")]
    Allocation,
}

/// Ordered, append-only ledger of operations with a fixed capacity.
///
/// Equality compares the recorded operations only, not the capacity.
#[derive(Debug, Clone)]
pub struct OperationLog {
    ops: Vec<Operation>,
    capacity: usize,
}

impl Default for OperationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationLog {
    /// Empty log with [`DEFAULT_LOG_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// Empty log holding at most `capacity` operations.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ops: Vec::new(),
            capacity,
        }
    }

    /// Appends `op` and returns its index. A full log is left untouched.
    pub fn append(&mut self, op: Operation) -> Result<OpIndex, LogError> {
        if self.ops.len() >= self.capacity {
            return Err(LogError::Full {
                capacity: self.capacity,
            });
        }
        self.ops.try_reserve(1).map_err(|_| LogError::Allocation)?;
        let index = self.ops.len();
        self.ops.push(op);
        Ok(index)
    }

    /// Reserves room for `additional` more operations without appending any.
    pub fn reserve(&mut self, additional: usize) -> Result<(), LogError> {
        if additional > self.remaining() {
            return Err(LogError::Full {
                capacity: self.capacity,
            });
        }
        self.ops
            .try_reserve(additional)
            .map_err(|_| LogError::Allocation)
    }

    /// Operation at `index`.
    pub fn get(&self, index: OpIndex) -> Option<&Operation> {
        self.ops.get(index)
    }

    /// Operations in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.ops.iter()
    }

    /// All operations as a slice.
    pub fn as_slice(&self) -> &[Operation] {
        &self.ops
    }

    /// Operations appended at or after `index`.
    pub fn since(&self, index: OpIndex) -> &[Operation] {
        let start = index.min(self.ops.len());
        &self.ops[start..]
    }

    /// Number of recorded operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Maximum number of operations.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free slots left.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.ops.len())
    }

    /// True when the next append would fail.
    pub fn is_full(&self) -> bool {
        self.ops.len() >= self.capacity
    }
}

impl PartialEq for OperationLog {
    fn eq(&self, other: &Self) -> bool {
        self.ops == other.ops
    }
}

impl<'a> IntoIterator for &'a OperationLog {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

impl Serialize for OperationLog {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.ops.serialize(serializer)
    }
}
