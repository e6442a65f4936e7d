//! Argument values and the recorded operation type.

use serde::{Serialize, ser::Error as _};

use crate::command::{ArgKind, CommandId};

/// Most arguments one operation may carry.
pub const MAX_ARGS: usize = 16;

/// One positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// Unsigned integer.
    Uint(u32),
    /// Signed integer.
    Int(i32),
    /// Double; must be finite to serialize.
    Double(f64),
    /// Text.
    Text(String),
}

impl Arg {
    /// Kind tag of this value.
    pub fn kind(&self) -> ArgKind {
        match self {
            Self::Uint(_) => ArgKind::Uint,
            Self::Int(_) => ArgKind::Int,
            Self::Double(_) => ArgKind::Double,
            Self::Text(_) => ArgKind::Text,
        }
    }
}

impl From<u32> for Arg {
    fn from(value: u32) -> Self {
        Self::Uint(value)
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl Serialize for Arg {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Uint(v) => serializer.serialize_u32(*v),
            Self::Int(v) => serializer.serialize_i32(*v),
            Self::Double(v) if v.is_finite() => serializer.serialize_f64(*v),
            Self::Double(v) => Err(S::Error::custom(format!("non-finite argument {v}"))),
            Self::Text(v) => serializer.serialize_str(v),
        }
    }
}

/// Failure reading a typed argument back out of an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    /// No argument at that position.
    #[error("{command}: missing argument {index}")]
    Missing {
        /// Owning command.
        command: CommandId,
        /// Requested position.
        index: usize,
    },
    /// The argument exists but has another kind.
    #[error("{command}: argument {index} is {found}, expected {expected}")]
    Kind {
        /// Owning command.
        command: CommandId,
        /// Requested position.
        index: usize,
        /// Kind the caller asked for.
        expected: ArgKind,
        /// Kind actually stored.
        found: ArgKind,
    },
}

/// Failure building an operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpError {
    /// Already holding [`MAX_ARGS`] arguments.
    #[error("{command}: cannot hold more than {max} arguments")]
    TooManyArgs {
        /// Owning command.
        command: CommandId,
        /// Argument limit.
        max: usize,
    },
    /// Argument storage could not be grown.
    #[error("{command}: argument allocation failed")]
    Allocation {
        /// Owning command.
        command: CommandId,
    },
}

/// Argument list that does not fit the command's catalog schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Wrong number of arguments.
    #[error("{command}: expected {expected} arguments, found {found}")]
    Arity {
        /// Command checked.
        command: CommandId,
        /// Schema length.
        expected: usize,
        /// Arguments present.
        found: usize,
    },
    /// Right count, wrong kind at one position.
    #[error("{command}: argument {index} is {found}, expected {expected}")]
    Kind {
        /// Command checked.
        command: CommandId,
        /// Offending position.
        index: usize,
        /// Schema kind.
        expected: ArgKind,
        /// Kind present.
        found: ArgKind,
    },
}

/// One recorded command with its ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    command: CommandId,
    args: Vec<Arg>,
}

impl Operation {
    /// Creates an operation with no arguments.
    pub fn new(command: CommandId) -> Self {
        Self {
            command,
            args: Vec::new(),
        }
    }

    /// Creates an operation and pushes `args` in order.
    pub fn with_args<I>(command: CommandId, args: I) -> Result<Self, OpError>
    where
        I: IntoIterator<Item = Arg>,
    {
        let mut op = Self::new(command);
        for arg in args {
            op.push_arg(arg)?;
        }
        Ok(op)
    }

    /// Appends one argument; the operation is unchanged on error.
    pub fn push_arg(&mut self, arg: Arg) -> Result<(), OpError> {
        if self.args.len() >= MAX_ARGS {
            return Err(OpError::TooManyArgs {
                command: self.command,
                max: MAX_ARGS,
            });
        }
        self.args
            .try_reserve(1)
            .map_err(|_| OpError::Allocation {
                command: self.command,
            })?;
        self.args.push(arg);
        Ok(())
    }

    /// Catalog identifier.
    pub fn command(&self) -> CommandId {
        self.command
    }

    /// Arguments in positional order.
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Checks arity and kinds against [`CommandId::schema`].
    pub fn check_schema(&self) -> Result<(), SchemaError> {
        let schema = self.command.schema();
        if schema.len() != self.args.len() {
            return Err(SchemaError::Arity {
                command: self.command,
                expected: schema.len(),
                found: self.args.len(),
            });
        }
        for (index, (expected, arg)) in schema.iter().zip(&self.args).enumerate() {
            if *expected != arg.kind() {
                return Err(SchemaError::Kind {
                    command: self.command,
                    index,
                    expected: *expected,
                    found: arg.kind(),
                });
            }
        }
        Ok(())
    }

    /// Unsigned argument at `index`.
    pub fn uint(&self, index: usize) -> Result<u32, ArgError> {
        match self.arg(index)? {
            Arg::Uint(v) => Ok(*v),
            other => Err(self.kind_error(index, ArgKind::Uint, other)),
        }
    }

    /// Signed argument at `index`.
    pub fn int(&self, index: usize) -> Result<i32, ArgError> {
        match self.arg(index)? {
            Arg::Int(v) => Ok(*v),
            other => Err(self.kind_error(index, ArgKind::Int, other)),
        }
    }

    /// Double argument at `index`.
    pub fn double(&self, index: usize) -> Result<f64, ArgError> {
        match self.arg(index)? {
            Arg::Double(v) => Ok(*v),
            other => Err(self.kind_error(index, ArgKind::Double, other)),
        }
    }

    /// Text argument at `index`.
    pub fn text(&self, index: usize) -> Result<&str, ArgError> {
        match self.arg(index)? {
            Arg::Text(v) => Ok(v.as_str()),
            other => Err(self.kind_error(index, ArgKind::Text, other)),
        }
    }

    fn arg(&self, index: usize) -> Result<&Arg, ArgError> {
        self.args.get(index).ok_or(ArgError::Missing {
            command: self.command,
            index,
        })
    }

    fn kind_error(&self, index: usize, expected: ArgKind, found: &Arg) -> ArgError {
        ArgError::Kind {
            command: self.command,
            index,
            expected,
            found: found.kind(),
        }
    }
}

/// Wire shape: `{"name": ..., "args": [...]}`.
impl Serialize for Operation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            name: &'static str,
            args: &'a [Arg],
        }

        Wire {
            name: self.command.name(),
            args: &self.args,
        }
        .serialize(serializer)
    }
}
