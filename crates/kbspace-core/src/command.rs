//! Commands (verbs) and their attachment to functions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{CommandId, FunctionId};
use crate::validation::{validate_code, validate_command_code, validate_text, MAX_NAME_LEN};

/// A verb applicable to functions. Commands are resource-agnostic: the same
/// id is reused across every function it is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,
    pub name: String,
}

impl Command {
    /// Create a command.
    pub fn new(id: impl Into<CommandId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Validate the command fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_command_code(self.id.as_str())?;
        validate_text("name", &self.name, MAX_NAME_LEN)
    }
}

/// Declares that a command is legal for a function.
///
/// Identity is the `(command_id, function_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommandInFunction {
    pub command_id: CommandId,
    pub function_id: FunctionId,
}

impl CommandInFunction {
    /// Attach `command` to `function`.
    pub fn new(command: impl Into<CommandId>, function: impl Into<FunctionId>) -> Self {
        Self {
            command_id: command.into(),
            function_id: function.into(),
        }
    }

    /// Validate both halves of the pair.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_command_code(self.command_id.as_str())?;
        validate_code("function id", self.function_id.as_str())
    }
}

impl fmt::Display for CommandInFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.command_id, self.function_id)
    }
}
