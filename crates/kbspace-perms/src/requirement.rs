//! Declared requirements of protected operations.
//!
//! Every protected operation names exactly one `(function, command)` pair it
//! needs, or is open to any authenticated caller. Operations are looked up by
//! name; an operation with no entry has no requirement and the gate denies it.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use kbspace_core::{command_code, function_code, CommandId, FunctionId};

/// What a protected operation needs from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    /// The caller's claims must include `Permission.<function>.<command>`.
    Permission {
        function: FunctionId,
        command: CommandId,
    },
    /// Any authenticated caller may proceed.
    AuthenticatedOnly,
}

impl Requirement {
    pub fn permission(function: impl Into<FunctionId>, command: impl Into<CommandId>) -> Self {
        Requirement::Permission {
            function: function.into(),
            command: command.into(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Permission { function, command } => write!(f, "{} on {}", command, function),
            Requirement::AuthenticatedOnly => f.write_str("authenticated"),
        }
    }
}

/// Names of the protected operations of the administration surface.
pub mod operation {
    pub const FUNCTIONS_CREATE: &str = "functions.create";
    pub const FUNCTIONS_LIST: &str = "functions.list";
    pub const FUNCTIONS_PAGE: &str = "functions.page";
    pub const FUNCTIONS_GET: &str = "functions.get";
    pub const FUNCTIONS_UPDATE: &str = "functions.update";
    pub const FUNCTIONS_DELETE: &str = "functions.delete";
    pub const FUNCTIONS_COMMANDS: &str = "functions.commands";
    pub const FUNCTIONS_COMMANDS_NOT_IN: &str = "functions.commands_not_in";
    pub const FUNCTIONS_ADD_COMMAND: &str = "functions.add_command";
    pub const FUNCTIONS_REMOVE_COMMAND: &str = "functions.remove_command";

    pub const COMMANDS_LIST: &str = "commands.list";

    pub const CATEGORIES_CREATE: &str = "categories.create";
    pub const CATEGORIES_LIST: &str = "categories.list";
    pub const CATEGORIES_PAGE: &str = "categories.page";
    pub const CATEGORIES_GET: &str = "categories.get";
    pub const CATEGORIES_UPDATE: &str = "categories.update";
    pub const CATEGORIES_DELETE: &str = "categories.delete";

    pub const KNOWLEDGE_BASES_CREATE: &str = "knowledge_bases.create";
    pub const KNOWLEDGE_BASES_LIST: &str = "knowledge_bases.list";
    pub const KNOWLEDGE_BASES_PAGE: &str = "knowledge_bases.page";
    pub const KNOWLEDGE_BASES_GET: &str = "knowledge_bases.get";
    pub const KNOWLEDGE_BASES_UPDATE: &str = "knowledge_bases.update";
    pub const KNOWLEDGE_BASES_DELETE: &str = "knowledge_bases.delete";

    pub const COMMENTS_LIST: &str = "comments.list";
    pub const COMMENTS_PAGE: &str = "comments.page";
    pub const COMMENTS_GET: &str = "comments.get";
    pub const COMMENTS_CREATE: &str = "comments.create";
    pub const COMMENTS_UPDATE: &str = "comments.update";
    pub const COMMENTS_DELETE: &str = "comments.delete";

    pub const REPORTS_LIST: &str = "reports.list";
    pub const REPORTS_PAGE: &str = "reports.page";
    pub const REPORTS_GET: &str = "reports.get";
    pub const REPORTS_CREATE: &str = "reports.create";
    pub const REPORTS_UPDATE: &str = "reports.update";
    pub const REPORTS_DELETE: &str = "reports.delete";

    pub const ROLES_LIST: &str = "roles.list";
    pub const ROLES_CREATE: &str = "roles.create";
    pub const ROLES_DELETE: &str = "roles.delete";
    pub const PERMISSIONS_LIST: &str = "permissions.list";
    pub const PERMISSIONS_UPDATE: &str = "permissions.update";
}

/// Operation name to requirement.
#[derive(Debug, Clone, Default)]
pub struct RequirementTable {
    entries: HashMap<String, Requirement>,
}

impl RequirementTable {
    /// An empty table. Every lookup misses, so the gate denies everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// The requirements of the standard administration surface.
    pub fn standard() -> Self {
        use command_code::{CREATE, DELETE, UPDATE, VIEW};
        use function_code::*;
        use operation::*;

        let mut table = Self::new();

        for (op, command) in [
            (FUNCTIONS_CREATE, CREATE),
            (FUNCTIONS_LIST, VIEW),
            (FUNCTIONS_PAGE, VIEW),
            (FUNCTIONS_GET, VIEW),
            (FUNCTIONS_UPDATE, UPDATE),
            (FUNCTIONS_DELETE, DELETE),
            (FUNCTIONS_COMMANDS, VIEW),
            (FUNCTIONS_COMMANDS_NOT_IN, VIEW),
            (FUNCTIONS_ADD_COMMAND, CREATE),
            (FUNCTIONS_REMOVE_COMMAND, DELETE),
        ] {
            table.declare(op, Requirement::permission(SYSTEM_FUNCTION, command));
        }

        let crud = |list, page, get, create, update, delete| {
            [
                (list, VIEW),
                (page, VIEW),
                (get, VIEW),
                (create, CREATE),
                (update, UPDATE),
                (delete, DELETE),
            ]
        };
        for (function, ops) in [
            (
                CONTENT_CATEGORY,
                crud(
                    CATEGORIES_LIST,
                    CATEGORIES_PAGE,
                    CATEGORIES_GET,
                    CATEGORIES_CREATE,
                    CATEGORIES_UPDATE,
                    CATEGORIES_DELETE,
                ),
            ),
            (
                CONTENT_KNOWLEDGEBASE,
                crud(
                    KNOWLEDGE_BASES_LIST,
                    KNOWLEDGE_BASES_PAGE,
                    KNOWLEDGE_BASES_GET,
                    KNOWLEDGE_BASES_CREATE,
                    KNOWLEDGE_BASES_UPDATE,
                    KNOWLEDGE_BASES_DELETE,
                ),
            ),
            (
                CONTENT_COMMENT,
                crud(
                    COMMENTS_LIST,
                    COMMENTS_PAGE,
                    COMMENTS_GET,
                    COMMENTS_CREATE,
                    COMMENTS_UPDATE,
                    COMMENTS_DELETE,
                ),
            ),
            (
                CONTENT_REPORT,
                crud(
                    REPORTS_LIST,
                    REPORTS_PAGE,
                    REPORTS_GET,
                    REPORTS_CREATE,
                    REPORTS_UPDATE,
                    REPORTS_DELETE,
                ),
            ),
        ] {
            for (op, command) in ops {
                table.declare(op, Requirement::permission(function, command));
            }
        }

        table.declare(ROLES_LIST, Requirement::permission(SYSTEM_ROLE, VIEW));
        table.declare(ROLES_CREATE, Requirement::permission(SYSTEM_ROLE, CREATE));
        table.declare(ROLES_DELETE, Requirement::permission(SYSTEM_ROLE, DELETE));
        table.declare(PERMISSIONS_LIST, Requirement::permission(SYSTEM_PERMISSION, VIEW));
        table.declare(PERMISSIONS_UPDATE, Requirement::permission(SYSTEM_PERMISSION, UPDATE));

        table.declare(COMMANDS_LIST, Requirement::AuthenticatedOnly);

        table
    }

    /// Declare (or replace) the requirement of an operation.
    pub fn declare(&mut self, operation: impl Into<String>, requirement: Requirement) {
        self.entries.insert(operation.into(), requirement);
    }

    pub fn get(&self, operation: &str) -> Option<&Requirement> {
        self.entries.get(operation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
