//! Roles and the permission grants they own.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::claim::Claim;
use crate::error::ValidationError;
use crate::types::{CommandId, FunctionId, RoleId};
use crate::validation::{validate_code, validate_command_code, validate_text, MAX_NAME_LEN};

/// A role known to the grant store. Roles are issued by the identity
/// provider; the store only keeps enough to reject grants to unknown roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

impl Role {
    pub fn new(id: impl Into<RoleId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_code("role id", self.id.as_str())?;
        validate_text("name", &self.name, MAX_NAME_LEN)
    }
}

/// A `(role, function, command)` allow entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Grant {
    pub role_id: RoleId,
    pub function_id: FunctionId,
    pub command_id: CommandId,
}

impl Grant {
    pub fn new(
        role: impl Into<RoleId>,
        function: impl Into<FunctionId>,
        command: impl Into<CommandId>,
    ) -> Self {
        Self {
            role_id: role.into(),
            function_id: function.into(),
            command_id: command.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_code("role id", self.role_id.as_str())?;
        validate_code("function id", self.function_id.as_str())?;
        validate_command_code(self.command_id.as_str())
    }

    /// The claim this grant materializes into.
    pub fn claim(&self) -> Claim {
        Claim::new(self.function_id.clone(), self.command_id.clone())
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} on {}", self.role_id, self.command_id, self.function_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_claim() {
        let grant = Grant::new("Editor", "content.kb", "CREATE");
        assert_eq!(grant.claim().to_string(), "Permission.content.kb.CREATE");
        assert_eq!(grant.to_string(), "Editor CREATE on content.kb");
    }

    #[test]
    fn test_grant_rejects_dotted_command() {
        assert!(Grant::new("Editor", "content.kb", "A.B").validate().is_err());
    }
}
