//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use kbspace_core::{
    Command, CommandId, CommandInFunction, Function, FunctionForest, FunctionId, Grant, Page,
    PageRequest, Role, RoleId, SequenceName,
};

use crate::error::{Result, StoreError};
use crate::traits::{DeleteMode, Store, StoreOptions};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
/// Sequences live outside the registry lock, one atomic counter per name,
/// so allocations on different sequences never contend.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
    sequences: RwLock<HashMap<SequenceName, Arc<AtomicI64>>>,
    options: StoreOptions,
}

#[derive(Default)]
struct MemoryStoreInner {
    functions: HashMap<FunctionId, Function>,
    commands: BTreeMap<CommandId, Command>,
    /// Attached `(command, function)` pairs.
    pairs: BTreeSet<(CommandId, FunctionId)>,
    roles: BTreeMap<RoleId, Role>,
    grants: BTreeSet<Grant>,
}

impl MemoryStoreInner {
    fn forest(&self) -> FunctionForest {
        FunctionForest::from_functions(self.functions.values().cloned())
    }

    fn sorted_functions(&self) -> Vec<Function> {
        let mut functions: Vec<Function> = self.functions.values().cloned().collect();
        functions.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
        functions
    }

    fn check_parent_exists(&self, function: &Function) -> Result<()> {
        if let Some(parent) = &function.parent_id {
            if parent != &function.id && !self.functions.contains_key(parent) {
                return Err(StoreError::not_found("function", parent));
            }
        }
        Ok(())
    }

    /// Drop a function along with its attachments and their grants.
    fn remove_function(&mut self, id: &FunctionId) {
        self.functions.remove(id);
        self.pairs.retain(|(_, function)| function != id);
        self.grants.retain(|grant| &grant.function_id != id);
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Create a new empty in-memory store with explicit options.
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
            sequences: RwLock::new(HashMap::new()),
            options,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner.write().map_err(poisoned)
    }

    fn counter(&self, name: &SequenceName) -> Result<Arc<AtomicI64>> {
        if let Some(counter) = self.sequences.read().map_err(poisoned)?.get(name) {
            return Ok(Arc::clone(counter));
        }
        let mut sequences = self.sequences.write().map_err(poisoned)?;
        let base = self.options.sequence_base;
        // Holds the value handed out last; the first allocation yields `base`.
        let counter = sequences
            .entry(name.clone())
            .or_insert_with(|| Arc::new(AtomicI64::new(base.saturating_sub(1))));
        Ok(Arc::clone(counter))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: PoisonError<T>) -> StoreError {
    StoreError::Task(format!("lock poisoned: {}", e))
}

fn matches_filter(function: &Function, filter: &str) -> bool {
    function.id.as_str().contains(filter)
        || function.name.contains(filter)
        || function.url.contains(filter)
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_function(&self, function: &Function) -> Result<()> {
        function.validate()?;
        let mut inner = self.write()?;

        if inner.functions.contains_key(&function.id) {
            return Err(StoreError::conflict("function", &function.id));
        }
        inner.check_parent_exists(function)?;
        inner
            .forest()
            .check_parent(&function.id, function.parent_id.as_ref())?;

        inner.functions.insert(function.id.clone(), function.clone());
        Ok(())
    }

    async fn get_function(&self, id: &FunctionId) -> Result<Option<Function>> {
        Ok(self.read()?.functions.get(id).cloned())
    }

    async fn list_functions(&self) -> Result<Vec<Function>> {
        Ok(self.read()?.sorted_functions())
    }

    async fn page_functions(&self, request: &PageRequest) -> Result<Page<Function>> {
        request.validate()?;
        let rows: Vec<Function> = self
            .read()?
            .sorted_functions()
            .into_iter()
            .filter(|f| request.filter().map_or(true, |filter| matches_filter(f, filter)))
            .collect();
        Ok(request.paginate(rows))
    }

    async fn update_function(&self, function: &Function) -> Result<()> {
        function.validate()?;
        let mut inner = self.write()?;

        if !inner.functions.contains_key(&function.id) {
            return Err(StoreError::not_found("function", &function.id));
        }
        inner.check_parent_exists(function)?;
        inner
            .forest()
            .check_parent(&function.id, function.parent_id.as_ref())?;

        inner.functions.insert(function.id.clone(), function.clone());
        Ok(())
    }

    async fn delete_function(&self, id: &FunctionId, mode: DeleteMode) -> Result<Vec<FunctionId>> {
        let mut inner = self.write()?;
        let forest = inner.forest();

        if forest.get(id).is_none() {
            return Err(StoreError::not_found("function", id));
        }

        let removed = match mode {
            DeleteMode::Restrict => {
                if forest.has_children(id) {
                    return Err(StoreError::HasChildren(id.clone()));
                }
                vec![id.clone()]
            }
            DeleteMode::Cascade => forest.subtree_post_order(id),
            DeleteMode::Reparent => {
                let grandparent = forest.parent_of(id);
                for child in forest.children(id) {
                    if let Some(function) = inner.functions.get_mut(child) {
                        function.parent_id = grandparent.clone();
                    }
                }
                vec![id.clone()]
            }
        };

        for function_id in &removed {
            inner.remove_function(function_id);
        }
        Ok(removed)
    }

    async fn create_command(&self, command: &Command) -> Result<()> {
        command.validate()?;
        let mut inner = self.write()?;

        if inner.commands.contains_key(&command.id) {
            return Err(StoreError::conflict("command", &command.id));
        }
        inner.commands.insert(command.id.clone(), command.clone());
        Ok(())
    }

    async fn list_commands(&self) -> Result<Vec<Command>> {
        Ok(self.read()?.commands.values().cloned().collect())
    }

    async fn add_command_to_function(&self, pair: &CommandInFunction) -> Result<()> {
        pair.validate()?;
        let mut inner = self.write()?;

        if !inner.functions.contains_key(&pair.function_id) {
            return Err(StoreError::not_found("function", &pair.function_id));
        }
        if !inner.commands.contains_key(&pair.command_id) {
            return Err(StoreError::not_found("command", &pair.command_id));
        }
        if !inner
            .pairs
            .insert((pair.command_id.clone(), pair.function_id.clone()))
        {
            return Err(StoreError::conflict("command in function", pair));
        }
        Ok(())
    }

    async fn remove_command_from_function(&self, pair: &CommandInFunction) -> Result<()> {
        let mut inner = self.write()?;

        if !inner
            .pairs
            .remove(&(pair.command_id.clone(), pair.function_id.clone()))
        {
            return Err(StoreError::not_found("command in function", pair));
        }
        inner.grants.retain(|grant| {
            grant.command_id != pair.command_id || grant.function_id != pair.function_id
        });
        Ok(())
    }

    async fn list_commands_in_function(&self, function: &FunctionId) -> Result<Vec<Command>> {
        let inner = self.read()?;

        if !inner.functions.contains_key(function) {
            return Err(StoreError::not_found("function", function));
        }
        Ok(inner
            .commands
            .values()
            .filter(|c| inner.pairs.contains(&(c.id.clone(), function.clone())))
            .cloned()
            .collect())
    }

    async fn list_commands_not_in_function(&self, function: &FunctionId) -> Result<Vec<Command>> {
        let inner = self.read()?;

        if !inner.functions.contains_key(function) {
            return Err(StoreError::not_found("function", function));
        }
        Ok(inner
            .commands
            .values()
            .filter(|c| !inner.pairs.contains(&(c.id.clone(), function.clone())))
            .cloned()
            .collect())
    }

    async fn create_role(&self, role: &Role) -> Result<()> {
        role.validate()?;
        let mut inner = self.write()?;

        if inner.roles.contains_key(&role.id) {
            return Err(StoreError::conflict("role", &role.id));
        }
        inner.roles.insert(role.id.clone(), role.clone());
        Ok(())
    }

    async fn get_role(&self, id: &RoleId) -> Result<Option<Role>> {
        Ok(self.read()?.roles.get(id).cloned())
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        Ok(self.read()?.roles.values().cloned().collect())
    }

    async fn delete_role(&self, id: &RoleId) -> Result<()> {
        let mut inner = self.write()?;

        if inner.roles.remove(id).is_none() {
            return Err(StoreError::not_found("role", id));
        }
        inner.grants.retain(|grant| &grant.role_id != id);
        Ok(())
    }

    async fn set_grant(&self, grant: &Grant) -> Result<()> {
        grant.validate()?;
        let mut inner = self.write()?;

        if !inner.roles.contains_key(&grant.role_id) {
            return Err(StoreError::not_found("role", &grant.role_id));
        }
        if !inner.functions.contains_key(&grant.function_id) {
            return Err(StoreError::not_found("function", &grant.function_id));
        }
        if !inner.commands.contains_key(&grant.command_id) {
            return Err(StoreError::not_found("command", &grant.command_id));
        }
        if !inner
            .pairs
            .contains(&(grant.command_id.clone(), grant.function_id.clone()))
        {
            return Err(StoreError::not_found(
                "command in function",
                CommandInFunction::new(grant.command_id.clone(), grant.function_id.clone()),
            ));
        }
        if !inner.grants.insert(grant.clone()) {
            return Err(StoreError::conflict("grant", grant));
        }
        Ok(())
    }

    async fn clear_grant(&self, grant: &Grant) -> Result<()> {
        if !self.write()?.grants.remove(grant) {
            return Err(StoreError::not_found("grant", grant));
        }
        Ok(())
    }

    async fn list_grants_for_role(&self, role: &RoleId) -> Result<Vec<Grant>> {
        let inner = self.read()?;

        if !inner.roles.contains_key(role) {
            return Err(StoreError::not_found("role", role));
        }
        // BTreeSet order is (role, function, command).
        Ok(inner
            .grants
            .iter()
            .filter(|grant| &grant.role_id == role)
            .cloned()
            .collect())
    }

    async fn next_value(&self, name: &SequenceName) -> Result<i64> {
        let counter = self
            .counter(name)
            .map_err(|e| StoreError::AllocationFailed {
                name: name.clone(),
                reason: e.to_string(),
                retryable: false,
            })?;
        let last = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| last.checked_add(1))
            .map_err(|_| {
                tracing::warn!(sequence = %name, "sequence exhausted");
                StoreError::SequenceExhausted(name.clone())
            })?;
        let value = last + 1;
        tracing::debug!(sequence = %name, value, "sequence value allocated");
        Ok(value)
    }

    async fn current_value(&self, name: &SequenceName) -> Result<Option<i64>> {
        Ok(self
            .sequences
            .read()
            .map_err(poisoned)?
            .get(name)
            .map(|counter| counter.load(Ordering::SeqCst)))
    }

    fn options(&self) -> &StoreOptions {
        &self.options
    }
}
