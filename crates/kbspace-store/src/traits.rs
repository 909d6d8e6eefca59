//! Store trait: the abstract interface for registry, grant and sequence
//! persistence.
//!
//! This trait allows the access layer to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use kbspace_core::{
    standard_commands, standard_functions, Command, CommandId, CommandInFunction, Function,
    FunctionId, Grant, Page, PageRequest, Role, RoleId, SequenceName,
};

use crate::error::{Result, StoreError};

/// What to do with the children of a function being deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// Refuse if the function has children.
    #[default]
    Restrict,
    /// Delete the whole subtree.
    Cascade,
    /// Move the children up to the deleted function's parent.
    Reparent,
}

/// Tunables shared by both backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// First value of a sequence that does not exist yet.
    pub sequence_base: i64,
    /// How long SQLite waits on a locked database before failing.
    pub busy_timeout: std::time::Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            sequence_base: kbspace_core::DEFAULT_BASE,
            busy_timeout: std::time::Duration::from_millis(5000),
        }
    }
}

/// The Store trait: async interface for the resource registry, the grant
/// store and the sequence allocator.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - **Strict creates**: creating a row that exists returns `Conflict`.
/// - **Referential checks**: writes naming a missing function, command, role
///   or pair return `NotFound`.
/// - **Acyclic tree**: a parent assignment that would loop returns `Invalid`.
/// - **Allocate-then-commit**: `next_value` returns only committed values.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Function Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new function. Its parent, if any, must exist.
    async fn create_function(&self, function: &Function) -> Result<()>;

    /// Get a function by id.
    async fn get_function(&self, id: &FunctionId) -> Result<Option<Function>>;

    /// All functions, ordered by `(sort_order, id)`.
    async fn list_functions(&self) -> Result<Vec<Function>>;

    /// Functions whose id, name or url contains the filter, paginated.
    async fn page_functions(&self, request: &PageRequest) -> Result<Page<Function>>;

    /// Replace the fields of an existing function.
    async fn update_function(&self, function: &Function) -> Result<()>;

    /// Delete a function, its command attachments and grants.
    ///
    /// Returns the ids removed, deepest first.
    async fn delete_function(&self, id: &FunctionId, mode: DeleteMode) -> Result<Vec<FunctionId>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Command Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new command.
    async fn create_command(&self, command: &Command) -> Result<()>;

    /// All commands, ordered by id.
    async fn list_commands(&self) -> Result<Vec<Command>>;

    /// Attach a command to a function.
    async fn add_command_to_function(&self, pair: &CommandInFunction) -> Result<()>;

    /// Detach a command from a function, clearing grants for the pair.
    async fn remove_command_from_function(&self, pair: &CommandInFunction) -> Result<()>;

    /// Commands attached to a function, ordered by id.
    async fn list_commands_in_function(&self, function: &FunctionId) -> Result<Vec<Command>>;

    /// Commands not attached to a function, ordered by id.
    async fn list_commands_not_in_function(&self, function: &FunctionId) -> Result<Vec<Command>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Role & Grant Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a role.
    async fn create_role(&self, role: &Role) -> Result<()>;

    /// Get a role by id.
    async fn get_role(&self, id: &RoleId) -> Result<Option<Role>>;

    /// All roles, ordered by id.
    async fn list_roles(&self) -> Result<Vec<Role>>;

    /// Delete a role and its grants.
    async fn delete_role(&self, id: &RoleId) -> Result<()>;

    /// Grant `(function, command)` to a role. The pair must be attached.
    async fn set_grant(&self, grant: &Grant) -> Result<()>;

    /// Remove a grant.
    async fn clear_grant(&self, grant: &Grant) -> Result<()>;

    /// Grants owned by a role, ordered by `(function, command)`.
    ///
    /// Returns `NotFound` for an unknown role.
    async fn list_grants_for_role(&self, role: &RoleId) -> Result<Vec<Grant>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Sequence Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Allocate the next value of a sequence, creating it at the base value
    /// on first use. The increment is durable before the value is returned.
    async fn next_value(&self, name: &SequenceName) -> Result<i64>;

    /// The last value handed out, if the sequence exists.
    async fn current_value(&self, name: &SequenceName) -> Result<Option<i64>>;

    /// The options this store was opened with.
    fn options(&self) -> &StoreOptions;
}

/// Extension trait for common store patterns.
pub trait StoreExt: Store {
    /// Seed the standard commands and resource tree, attaching every standard
    /// command to every standard function. Rows that exist are left alone.
    fn seed_catalog(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Grant every command attached to `function` to `role`, skipping grants
    /// the role already holds.
    fn grant_all_commands(
        &self,
        role: &RoleId,
        function: &FunctionId,
    ) -> impl std::future::Future<Output = Result<Vec<CommandId>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn seed_catalog(&self) -> Result<()> {
        let commands = standard_commands();
        for command in &commands {
            ignore_conflict(self.create_command(command).await)?;
        }
        for function in standard_functions() {
            ignore_conflict(self.create_function(&function).await)?;
            for command in &commands {
                let pair = CommandInFunction::new(command.id.clone(), function.id.clone());
                ignore_conflict(self.add_command_to_function(&pair).await)?;
            }
        }
        tracing::debug!("standard catalog seeded");
        Ok(())
    }

    async fn grant_all_commands(&self, role: &RoleId, function: &FunctionId) -> Result<Vec<CommandId>> {
        let mut granted = Vec::new();
        for command in self.list_commands_in_function(function).await? {
            let grant = Grant::new(role.clone(), function.clone(), command.id.clone());
            match self.set_grant(&grant).await {
                Ok(()) => granted.push(command.id),
                Err(StoreError::Conflict { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(granted)
    }
}

fn ignore_conflict(result: Result<()>) -> Result<()> {
    match result {
        Err(StoreError::Conflict { .. }) => Ok(()),
        other => other,
    }
}
