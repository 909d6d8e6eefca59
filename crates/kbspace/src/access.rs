//! AccessControl: the gated administration and issuance API.
//!
//! Every administrative operation is checked by the gate against the
//! requirement declared for it before the store is touched.

use std::sync::Arc;

use kbspace_core::{
    Command, CommandId, CommandInFunction, Function, FunctionForest, FunctionId, FunctionNode,
    Grant, Page, PageRequest, Role, RoleId, SequenceName,
};
use kbspace_perms::{
    now_millis, operation, ClaimMaterializer, Credential, Decision, Gate, RequirementTable,
};
use kbspace_store::{DeleteMode, SqliteStore, Store, StoreError, StoreExt};

use crate::config::AccessConfig;
use crate::error::{AccessError, Result};
use crate::knowledge_base::{KnowledgeBase, KnowledgeBaseDraft, KnowledgeBaseSink};

/// The access-control service.
///
/// Owns the store, the claim materializer and the gate. Cheap to share
/// behind an `Arc`; all methods take `&self`.
pub struct AccessControl<S: Store> {
    store: Arc<S>,
    materializer: ClaimMaterializer<S>,
    gate: Gate,
    config: AccessConfig,
}

impl AccessControl<SqliteStore> {
    /// Open the SQLite store described by `config`.
    pub async fn open(config: AccessConfig) -> Result<Self> {
        let options = config.store_options();
        let store = match &config.database.path {
            Some(path) => SqliteStore::open_with(path, options)?,
            None => SqliteStore::open_memory_with(options)?,
        };
        Self::new(store, config).await
    }
}

impl<S: Store> AccessControl<S> {
    /// Wrap a store, seeding the standard catalog if configured to.
    ///
    /// The store keeps the options it was opened with. A `sequence_base`
    /// that disagrees with them is rejected, since sequences would silently
    /// start elsewhere. A differing busy timeout is only logged.
    pub async fn new(store: S, config: AccessConfig) -> Result<Self> {
        let wanted = config.store_options();
        let actual = store.options();
        if wanted.sequence_base != actual.sequence_base {
            return Err(AccessError::Config(format!(
                "sequence_base is {} but the store was opened with {}",
                wanted.sequence_base, actual.sequence_base
            )));
        }
        if wanted.busy_timeout != actual.busy_timeout {
            tracing::warn!(
                configured_ms = config.database.busy_timeout_ms,
                store_ms = actual.busy_timeout.as_millis() as u64,
                "busy timeout differs from the store's; the store's applies"
            );
        }

        let store = Arc::new(store);
        if config.seed_defaults {
            store.seed_catalog().await?;
        }
        Ok(Self {
            materializer: ClaimMaterializer::new(Arc::clone(&store)),
            store,
            gate: Gate::new(RequirementTable::standard()),
            config,
        })
    }

    /// Replace the requirement table.
    pub fn with_requirements(mut self, requirements: RequirementTable) -> Self {
        self.gate = Gate::new(requirements);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Issuance & Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a credential for an authenticated principal.
    ///
    /// Claims are resolved now and never refreshed.
    pub async fn issue_credential(&self, subject: &str, roles: &[RoleId]) -> Result<Credential> {
        let credential = self
            .materializer
            .issue(subject, roles, now_millis(), self.config.credential_ttl_millis())
            .await?;
        Ok(credential)
    }

    /// Check `credential` against the requirement of `operation`.
    pub fn authorize(&self, operation: &str, credential: Option<&Credential>) -> Result<()> {
        self.authorize_at(operation, credential, now_millis())
    }

    /// [`authorize`](Self::authorize) at an explicit time.
    pub fn authorize_at(&self, operation: &str, credential: Option<&Credential>, now: i64) -> Result<()> {
        self.decide(operation, credential, now).into_result()?;
        Ok(())
    }

    /// The raw gate decision for `operation`.
    pub fn decide(&self, operation: &str, credential: Option<&Credential>, now: i64) -> Decision {
        self.gate.check(operation, credential, now)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Functions
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_function(&self, caller: Option<&Credential>, function: &Function) -> Result<()> {
        self.authorize(operation::FUNCTIONS_CREATE, caller)?;
        self.store.create_function(function).await?;
        tracing::info!(function = %function.id, "function created");
        Ok(())
    }

    pub async fn list_functions(&self, caller: Option<&Credential>) -> Result<Vec<Function>> {
        self.authorize(operation::FUNCTIONS_LIST, caller)?;
        Ok(self.store.list_functions().await?)
    }

    pub async fn page_functions(
        &self,
        caller: Option<&Credential>,
        request: &PageRequest,
    ) -> Result<Page<Function>> {
        self.authorize(operation::FUNCTIONS_PAGE, caller)?;
        Ok(self.store.page_functions(request).await?)
    }

    /// The function tree, children ordered by sort order then id.
    pub async fn function_tree(&self, caller: Option<&Credential>) -> Result<Vec<FunctionNode>> {
        self.authorize(operation::FUNCTIONS_LIST, caller)?;
        let functions = self.store.list_functions().await?;
        Ok(FunctionForest::from_functions(functions).to_tree())
    }

    pub async fn get_function(&self, caller: Option<&Credential>, id: &FunctionId) -> Result<Function> {
        self.authorize(operation::FUNCTIONS_GET, caller)?;
        self.store
            .get_function(id)
            .await?
            .ok_or_else(|| {
                StoreError::NotFound {
                    kind: "function",
                    id: id.to_string(),
                }
                .into()
            })
    }

    pub async fn update_function(&self, caller: Option<&Credential>, function: &Function) -> Result<()> {
        self.authorize(operation::FUNCTIONS_UPDATE, caller)?;
        self.store.update_function(function).await?;
        tracing::info!(function = %function.id, "function updated");
        Ok(())
    }

    /// Delete a function. Returns the removed ids, deepest first.
    pub async fn delete_function(
        &self,
        caller: Option<&Credential>,
        id: &FunctionId,
        mode: DeleteMode,
    ) -> Result<Vec<FunctionId>> {
        self.authorize(operation::FUNCTIONS_DELETE, caller)?;
        let removed = self.store.delete_function(id, mode).await?;
        tracing::info!(function = %id, ?mode, removed = removed.len(), "function deleted");
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// All commands. Open to any authenticated caller.
    pub async fn list_commands(&self, caller: Option<&Credential>) -> Result<Vec<Command>> {
        self.authorize(operation::COMMANDS_LIST, caller)?;
        Ok(self.store.list_commands().await?)
    }

    pub async fn commands_in_function(
        &self,
        caller: Option<&Credential>,
        function: &FunctionId,
    ) -> Result<Vec<Command>> {
        self.authorize(operation::FUNCTIONS_COMMANDS, caller)?;
        Ok(self.store.list_commands_in_function(function).await?)
    }

    pub async fn commands_not_in_function(
        &self,
        caller: Option<&Credential>,
        function: &FunctionId,
    ) -> Result<Vec<Command>> {
        self.authorize(operation::FUNCTIONS_COMMANDS_NOT_IN, caller)?;
        Ok(self.store.list_commands_not_in_function(function).await?)
    }

    pub async fn add_command_to_function(
        &self,
        caller: Option<&Credential>,
        pair: &CommandInFunction,
    ) -> Result<()> {
        self.authorize(operation::FUNCTIONS_ADD_COMMAND, caller)?;
        self.store.add_command_to_function(pair).await?;
        tracing::info!(%pair, "command attached");
        Ok(())
    }

    /// Detach a command. Grants of the pair are cleared with it.
    pub async fn remove_command_from_function(
        &self,
        caller: Option<&Credential>,
        pair: &CommandInFunction,
    ) -> Result<()> {
        self.authorize(operation::FUNCTIONS_REMOVE_COMMAND, caller)?;
        self.store.remove_command_from_function(pair).await?;
        tracing::info!(%pair, "command detached");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Roles & Grants
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_role(&self, caller: Option<&Credential>, role: &Role) -> Result<()> {
        self.authorize(operation::ROLES_CREATE, caller)?;
        self.store.create_role(role).await?;
        tracing::info!(role = %role.id, "role created");
        Ok(())
    }

    pub async fn list_roles(&self, caller: Option<&Credential>) -> Result<Vec<Role>> {
        self.authorize(operation::ROLES_LIST, caller)?;
        Ok(self.store.list_roles().await?)
    }

    pub async fn delete_role(&self, caller: Option<&Credential>, id: &RoleId) -> Result<()> {
        self.authorize(operation::ROLES_DELETE, caller)?;
        self.store.delete_role(id).await?;
        tracing::info!(role = %id, "role deleted");
        Ok(())
    }

    pub async fn grants_for_role(&self, caller: Option<&Credential>, role: &RoleId) -> Result<Vec<Grant>> {
        self.authorize(operation::PERMISSIONS_LIST, caller)?;
        Ok(self.store.list_grants_for_role(role).await?)
    }

    /// Grant a pair to a role. Credentials already issued are unaffected.
    pub async fn set_grant(&self, caller: Option<&Credential>, grant: &Grant) -> Result<()> {
        self.authorize(operation::PERMISSIONS_UPDATE, caller)?;
        self.store.set_grant(grant).await?;
        tracing::info!(%grant, "grant set");
        Ok(())
    }

    /// Revoke a grant. Takes effect at the next issuance.
    pub async fn clear_grant(&self, caller: Option<&Credential>, grant: &Grant) -> Result<()> {
        self.authorize(operation::PERMISSIONS_UPDATE, caller)?;
        self.store.clear_grant(grant).await?;
        tracing::info!(%grant, "grant cleared");
        Ok(())
    }

    /// Grant every command attached to `function` to `role`.
    pub async fn grant_all_commands(
        &self,
        caller: Option<&Credential>,
        role: &RoleId,
        function: &FunctionId,
    ) -> Result<Vec<CommandId>> {
        self.authorize(operation::PERMISSIONS_UPDATE, caller)?;
        let granted = self.store.grant_all_commands(role, function).await?;
        tracing::info!(role = %role, function = %function, granted = granted.len(), "grants set");
        Ok(granted)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sequences & Knowledge Bases
    // ─────────────────────────────────────────────────────────────────────────

    /// Allocate the next value of a sequence.
    ///
    /// Internal service call: not gated. On failure nothing was handed out
    /// and the error is retryable.
    pub async fn next_sequence(&self, name: &SequenceName) -> Result<i64> {
        Ok(self.store.next_value(name).await?)
    }

    /// Create a knowledge-base article.
    ///
    /// Gate first, then allocate the id, then persist. If allocation fails
    /// the sink is never called.
    pub async fn create_knowledge_base<K>(
        &self,
        caller: Option<&Credential>,
        draft: KnowledgeBaseDraft,
        sink: &K,
    ) -> Result<KnowledgeBase>
    where
        K: KnowledgeBaseSink + ?Sized,
    {
        self.authorize(operation::KNOWLEDGE_BASES_CREATE, caller)?;
        let owner = caller
            .map(|c| c.subject.clone())
            .ok_or(AccessError::Unauthenticated)?;
        draft.validate().map_err(StoreError::from)?;

        let id = self.next_sequence(&SequenceName::knowledge_base()).await?;
        let article = KnowledgeBase { id, owner, draft };

        sink.persist(&article).await.map_err(|e| {
            tracing::warn!(id, error = %e, "knowledge base sink failed");
            AccessError::Sink(format!("{:#}", e))
        })?;

        tracing::info!(id, owner = %article.owner, "knowledge base created");
        Ok(article)
    }
}
