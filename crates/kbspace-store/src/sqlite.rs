//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use kbspace_core::{
    Command, CommandId, CommandInFunction, Function, FunctionForest, FunctionId, Grant, Page,
    PageRequest, Role, RoleId, SequenceName,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{DeleteMode, Store, StoreOptions};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
///
/// The single connection serializes every operation, so allocations on
/// unrelated sequences queue behind each other and behind registry reads.
/// SQLite takes one write lock per database file in any case, so a
/// connection pool would only let reads overlap. Use [`MemoryStore`] when
/// independent sequences must not contend.
///
/// [`MemoryStore`]: crate::MemoryStore
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
    options: StoreOptions,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open a SQLite database at the given path with explicit options.
    pub fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn, options)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::open_memory_with(StoreOptions::default())
    }

    /// Open an in-memory SQLite database with explicit options.
    pub fn open_memory_with(options: StoreOptions) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, options)
    }

    fn init(mut conn: Connection, options: StoreOptions) -> Result<Self> {
        conn.busy_timeout(options.busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            options,
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = lock(&conn)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| StoreError::Task(format!("mutex poisoned: {}", e)))
}

// Helper to convert a row to Function
fn row_to_function(row: &rusqlite::Row<'_>) -> rusqlite::Result<Function> {
    Ok(Function {
        id: FunctionId::new(row.get::<_, String>("id")?),
        name: row.get("name")?,
        url: row.get("url")?,
        sort_order: row.get("sort_order")?,
        parent_id: row.get::<_, Option<String>>("parent_id")?.map(FunctionId::new),
    })
}

fn row_to_command(row: &rusqlite::Row<'_>) -> rusqlite::Result<Command> {
    Ok(Command {
        id: CommandId::new(row.get::<_, String>("id")?),
        name: row.get("name")?,
    })
}

fn row_to_role(row: &rusqlite::Row<'_>) -> rusqlite::Result<Role> {
    Ok(Role {
        id: RoleId::new(row.get::<_, String>("id")?),
        name: row.get("name")?,
    })
}

fn row_to_grant(row: &rusqlite::Row<'_>) -> rusqlite::Result<Grant> {
    Ok(Grant::new(
        row.get::<_, String>("role_id")?,
        row.get::<_, String>("function_id")?,
        row.get::<_, String>("command_id")?,
    ))
}

const FUNCTION_COLUMNS: &str = "id, name, url, sort_order, parent_id";

const FUNCTION_FILTER: &str = "(?1 IS NULL OR instr(id, ?1) > 0 OR instr(name, ?1) > 0 OR instr(url, ?1) > 0)";

fn function_exists(conn: &Connection, id: &FunctionId) -> Result<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM functions WHERE id = ?1", params![id.as_str()], |_| Ok(()))
        .optional()?
        .is_some())
}

fn command_exists(conn: &Connection, id: &CommandId) -> Result<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM commands WHERE id = ?1", params![id.as_str()], |_| Ok(()))
        .optional()?
        .is_some())
}

fn role_exists(conn: &Connection, id: &RoleId) -> Result<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM roles WHERE id = ?1", params![id.as_str()], |_| Ok(()))
        .optional()?
        .is_some())
}

fn pair_exists(conn: &Connection, command: &CommandId, function: &FunctionId) -> Result<bool> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM command_in_functions WHERE command_id = ?1 AND function_id = ?2",
            params![command.as_str(), function.as_str()],
            |_| Ok(()),
        )
        .optional()?
        .is_some())
}

fn load_forest(conn: &Connection) -> Result<FunctionForest> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM functions", FUNCTION_COLUMNS))?;
    let functions = stmt
        .query_map([], row_to_function)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(FunctionForest::from_functions(functions))
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_function(&self, function: &Function) -> Result<()> {
        function.validate()?;
        let function = function.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            if function_exists(&tx, &function.id)? {
                return Err(StoreError::conflict("function", &function.id));
            }
            if let Some(parent) = &function.parent_id {
                if parent != &function.id && !function_exists(&tx, parent)? {
                    return Err(StoreError::not_found("function", parent));
                }
            }
            load_forest(&tx)?.check_parent(&function.id, function.parent_id.as_ref())?;

            tx.execute(
                "INSERT INTO functions (id, name, url, sort_order, parent_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    function.id.as_str(),
                    function.name,
                    function.url,
                    function.sort_order,
                    function.parent_id.as_ref().map(FunctionId::as_str),
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn get_function(&self, id: &FunctionId) -> Result<Option<Function>> {
        let id = id.clone();
        self.run(move |conn| {
            conn.query_row(
                &format!("SELECT {} FROM functions WHERE id = ?1", FUNCTION_COLUMNS),
                params![id.as_str()],
                row_to_function,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_functions(&self) -> Result<Vec<Function>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM functions ORDER BY sort_order, id",
                FUNCTION_COLUMNS
            ))?;
            let functions = stmt
                .query_map([], row_to_function)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(functions)
        })
        .await
    }

    async fn page_functions(&self, request: &PageRequest) -> Result<Page<Function>> {
        request.validate()?;
        let filter = request.filter().map(str::to_string);
        let limit = i64::from(request.page_size);
        let offset = request.offset() as i64;

        self.run(move |conn| {
            let total_records: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM functions WHERE {}", FUNCTION_FILTER),
                params![filter],
                |row| row.get(0),
            )?;

            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM functions WHERE {} ORDER BY sort_order, id LIMIT ?2 OFFSET ?3",
                FUNCTION_COLUMNS, FUNCTION_FILTER
            ))?;
            let items = stmt
                .query_map(params![filter, limit, offset], row_to_function)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(Page {
                items,
                total_records: total_records as u64,
            })
        })
        .await
    }

    async fn update_function(&self, function: &Function) -> Result<()> {
        function.validate()?;
        let function = function.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            if !function_exists(&tx, &function.id)? {
                return Err(StoreError::not_found("function", &function.id));
            }
            if let Some(parent) = &function.parent_id {
                if parent != &function.id && !function_exists(&tx, parent)? {
                    return Err(StoreError::not_found("function", parent));
                }
            }
            load_forest(&tx)?.check_parent(&function.id, function.parent_id.as_ref())?;

            tx.execute(
                "UPDATE functions SET name = ?2, url = ?3, sort_order = ?4, parent_id = ?5
                 WHERE id = ?1",
                params![
                    function.id.as_str(),
                    function.name,
                    function.url,
                    function.sort_order,
                    function.parent_id.as_ref().map(FunctionId::as_str),
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn delete_function(&self, id: &FunctionId, mode: DeleteMode) -> Result<Vec<FunctionId>> {
        let id = id.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;
            let forest = load_forest(&tx)?;

            if forest.get(&id).is_none() {
                return Err(StoreError::not_found("function", &id));
            }

            let removed = match mode {
                DeleteMode::Restrict => {
                    if forest.has_children(&id) {
                        return Err(StoreError::HasChildren(id));
                    }
                    vec![id.clone()]
                }
                DeleteMode::Cascade => forest.subtree_post_order(&id),
                DeleteMode::Reparent => {
                    let grandparent = forest.parent_of(&id);
                    tx.execute(
                        "UPDATE functions SET parent_id = ?1 WHERE parent_id = ?2",
                        params![grandparent.as_ref().map(FunctionId::as_str), id.as_str()],
                    )?;
                    vec![id.clone()]
                }
            };

            for function_id in &removed {
                tx.execute(
                    "DELETE FROM functions WHERE id = ?1",
                    params![function_id.as_str()],
                )?;
            }
            tx.commit()?;
            Ok(removed)
        })
        .await
    }

    async fn create_command(&self, command: &Command) -> Result<()> {
        command.validate()?;
        let command = command.clone();

        self.run(move |conn| {
            if command_exists(conn, &command.id)? {
                return Err(StoreError::conflict("command", &command.id));
            }
            conn.execute(
                "INSERT INTO commands (id, name) VALUES (?1, ?2)",
                params![command.id.as_str(), command.name],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_commands(&self) -> Result<Vec<Command>> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM commands ORDER BY id")?;
            let commands = stmt
                .query_map([], row_to_command)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(commands)
        })
        .await
    }

    async fn add_command_to_function(&self, pair: &CommandInFunction) -> Result<()> {
        pair.validate()?;
        let pair = pair.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            if !function_exists(&tx, &pair.function_id)? {
                return Err(StoreError::not_found("function", &pair.function_id));
            }
            if !command_exists(&tx, &pair.command_id)? {
                return Err(StoreError::not_found("command", &pair.command_id));
            }
            if pair_exists(&tx, &pair.command_id, &pair.function_id)? {
                return Err(StoreError::conflict("command in function", &pair));
            }

            tx.execute(
                "INSERT INTO command_in_functions (command_id, function_id) VALUES (?1, ?2)",
                params![pair.command_id.as_str(), pair.function_id.as_str()],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn remove_command_from_function(&self, pair: &CommandInFunction) -> Result<()> {
        let pair = pair.clone();

        self.run(move |conn| {
            let removed = conn.execute(
                "DELETE FROM command_in_functions WHERE command_id = ?1 AND function_id = ?2",
                params![pair.command_id.as_str(), pair.function_id.as_str()],
            )?;
            if removed == 0 {
                return Err(StoreError::not_found("command in function", &pair));
            }
            Ok(())
        })
        .await
    }

    async fn list_commands_in_function(&self, function: &FunctionId) -> Result<Vec<Command>> {
        let function = function.clone();

        self.run(move |conn| {
            if !function_exists(conn, &function)? {
                return Err(StoreError::not_found("function", &function));
            }
            let mut stmt = conn.prepare(
                "SELECT c.id, c.name FROM commands c
                 JOIN command_in_functions cif ON cif.command_id = c.id
                 WHERE cif.function_id = ?1
                 ORDER BY c.id",
            )?;
            let commands = stmt
                .query_map(params![function.as_str()], row_to_command)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(commands)
        })
        .await
    }

    async fn list_commands_not_in_function(&self, function: &FunctionId) -> Result<Vec<Command>> {
        let function = function.clone();

        self.run(move |conn| {
            if !function_exists(conn, &function)? {
                return Err(StoreError::not_found("function", &function));
            }
            let mut stmt = conn.prepare(
                "SELECT id, name FROM commands
                 WHERE id NOT IN (
                     SELECT command_id FROM command_in_functions WHERE function_id = ?1
                 )
                 ORDER BY id",
            )?;
            let commands = stmt
                .query_map(params![function.as_str()], row_to_command)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(commands)
        })
        .await
    }

    async fn create_role(&self, role: &Role) -> Result<()> {
        role.validate()?;
        let role = role.clone();

        self.run(move |conn| {
            if role_exists(conn, &role.id)? {
                return Err(StoreError::conflict("role", &role.id));
            }
            conn.execute(
                "INSERT INTO roles (id, name) VALUES (?1, ?2)",
                params![role.id.as_str(), role.name],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_role(&self, id: &RoleId) -> Result<Option<Role>> {
        let id = id.clone();
        self.run(move |conn| {
            conn.query_row(
                "SELECT id, name FROM roles WHERE id = ?1",
                params![id.as_str()],
                row_to_role,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_roles(&self) -> Result<Vec<Role>> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM roles ORDER BY id")?;
            let roles = stmt
                .query_map([], row_to_role)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(roles)
        })
        .await
    }

    async fn delete_role(&self, id: &RoleId) -> Result<()> {
        let id = id.clone();
        self.run(move |conn| {
            let removed = conn.execute("DELETE FROM roles WHERE id = ?1", params![id.as_str()])?;
            if removed == 0 {
                return Err(StoreError::not_found("role", &id));
            }
            Ok(())
        })
        .await
    }

    async fn set_grant(&self, grant: &Grant) -> Result<()> {
        grant.validate()?;
        let grant = grant.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            if !role_exists(&tx, &grant.role_id)? {
                return Err(StoreError::not_found("role", &grant.role_id));
            }
            if !function_exists(&tx, &grant.function_id)? {
                return Err(StoreError::not_found("function", &grant.function_id));
            }
            if !command_exists(&tx, &grant.command_id)? {
                return Err(StoreError::not_found("command", &grant.command_id));
            }
            if !pair_exists(&tx, &grant.command_id, &grant.function_id)? {
                return Err(StoreError::not_found(
                    "command in function",
                    CommandInFunction::new(grant.command_id.clone(), grant.function_id.clone()),
                ));
            }

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO permissions (role_id, function_id, command_id)
                 VALUES (?1, ?2, ?3)",
                params![
                    grant.role_id.as_str(),
                    grant.function_id.as_str(),
                    grant.command_id.as_str(),
                ],
            )?;
            if inserted == 0 {
                return Err(StoreError::conflict("grant", &grant));
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn clear_grant(&self, grant: &Grant) -> Result<()> {
        let grant = grant.clone();

        self.run(move |conn| {
            let removed = conn.execute(
                "DELETE FROM permissions WHERE role_id = ?1 AND function_id = ?2 AND command_id = ?3",
                params![
                    grant.role_id.as_str(),
                    grant.function_id.as_str(),
                    grant.command_id.as_str(),
                ],
            )?;
            if removed == 0 {
                return Err(StoreError::not_found("grant", &grant));
            }
            Ok(())
        })
        .await
    }

    async fn list_grants_for_role(&self, role: &RoleId) -> Result<Vec<Grant>> {
        let role = role.clone();

        self.run(move |conn| {
            if !role_exists(conn, &role)? {
                return Err(StoreError::not_found("role", &role));
            }
            let mut stmt = conn.prepare(
                "SELECT role_id, function_id, command_id FROM permissions
                 WHERE role_id = ?1
                 ORDER BY function_id, command_id",
            )?;
            let grants = stmt
                .query_map(params![role.as_str()], row_to_grant)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(grants)
        })
        .await
    }

    async fn next_value(&self, name: &SequenceName) -> Result<i64> {
        let base = self.options.sequence_base;
        let seq = name.clone();

        let result = self
            .run(move |conn| {
                // IMMEDIATE takes the write lock up front, so the upsert and
                // the commit are a single critical section.
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                // At i64::MAX the update is skipped and RETURNING yields no row.
                let value: Option<i64> = tx
                    .query_row(
                        "INSERT INTO sequences (name, current_value) VALUES (?1, ?2)
                         ON CONFLICT(name) DO UPDATE SET current_value = current_value + 1
                         WHERE current_value < 9223372036854775807
                         RETURNING current_value",
                        params![seq.as_str(), base],
                        |row| row.get(0),
                    )
                    .optional()?;
                let Some(value) = value else {
                    return Err(StoreError::SequenceExhausted(seq));
                };
                tx.commit()?;
                Ok(value)
            })
            .await;

        match result {
            Ok(value) => {
                tracing::debug!(sequence = %name, value, "sequence value allocated");
                Ok(value)
            }
            Err(e @ StoreError::SequenceExhausted(_)) => {
                tracing::warn!(sequence = %name, "sequence exhausted");
                Err(e)
            }
            Err(e) => {
                tracing::warn!(sequence = %name, error = %e, "sequence allocation failed");
                Err(StoreError::AllocationFailed {
                    name: name.clone(),
                    reason: e.to_string(),
                    retryable: e.is_retryable(),
                })
            }
        }
    }

    async fn current_value(&self, name: &SequenceName) -> Result<Option<i64>> {
        let name = name.clone();
        self.run(move |conn| {
            conn.query_row(
                "SELECT current_value FROM sequences WHERE name = ?1",
                params![name.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    fn options(&self) -> &StoreOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StoreExt;
    use kbspace_core::CoreError;

    async fn seeded() -> SqliteStore {
        let store = SqliteStore::open_memory().unwrap();
        store.seed_catalog().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_create_and_get_function() {
        let store = SqliteStore::open_memory().unwrap();
        let function = Function::new("content", "Content", "/content", 1);

        store.create_function(&function).await.unwrap();

        let retrieved = store
            .get_function(&"content".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved, function);
    }

    #[tokio::test]
    async fn test_duplicate_function_conflicts() {
        let store = SqliteStore::open_memory().unwrap();
        let function = Function::new("content", "Content", "/content", 1);
        store.create_function(&function).await.unwrap();

        let err = store.create_function(&function).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { kind: "function", .. }));
    }

    #[tokio::test]
    async fn test_missing_parent_not_found() {
        let store = SqliteStore::open_memory().unwrap();
        let function = Function::new("a.b", "B", "/b", 1).with_parent("a");

        let err = store.create_function(&function).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "function", .. }));
    }

    #[tokio::test]
    async fn test_update_rejects_cycle() {
        let store = seeded().await;
        let mut content = store
            .get_function(&"content".into())
            .await
            .unwrap()
            .unwrap();
        content.parent_id = Some("content.kb".into());

        let err = store.update_function(&content).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(CoreError::Cycle { .. })));
    }

    #[tokio::test]
    async fn test_delete_restrict_and_cascade() {
        let store = seeded().await;

        let err = store
            .delete_function(&"content".into(), DeleteMode::Restrict)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::HasChildren(_)));

        let removed = store
            .delete_function(&"content".into(), DeleteMode::Cascade)
            .await
            .unwrap();
        assert_eq!(removed.len(), 5);
        assert_eq!(removed.last().map(FunctionId::as_str), Some("content"));
        assert!(store
            .get_function(&"content.kb".into())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_reparent() {
        let store = seeded().await;
        store
            .create_function(&Function::new("content.kb.draft", "Drafts", "/kb/draft", 1).with_parent("content.kb"))
            .await
            .unwrap();

        store
            .delete_function(&"content.kb".into(), DeleteMode::Reparent)
            .await
            .unwrap();

        let draft = store
            .get_function(&"content.kb.draft".into())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(draft.parent_id.as_ref().map(FunctionId::as_str), Some("content"));
    }

    #[tokio::test]
    async fn test_grant_requires_attached_pair() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .create_function(&Function::new("content.kb", "KB", "/kb", 1))
            .await
            .unwrap();
        store.create_command(&Command::new("VIEW", "View")).await.unwrap();
        store.create_role(&Role::new("Editor", "Editor")).await.unwrap();

        let grant = Grant::new("Editor", "content.kb", "VIEW");
        let err = store.set_grant(&grant).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "command in function", .. }));

        store
            .add_command_to_function(&CommandInFunction::new("VIEW", "content.kb"))
            .await
            .unwrap();
        store.set_grant(&grant).await.unwrap();

        let err = store.set_grant(&grant).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { kind: "grant", .. }));
    }

    #[tokio::test]
    async fn test_detaching_command_clears_grants() {
        let store = seeded().await;
        store.create_role(&Role::new("Editor", "Editor")).await.unwrap();
        store
            .set_grant(&Grant::new("Editor", "content.kb", "DELETE"))
            .await
            .unwrap();

        store
            .remove_command_from_function(&CommandInFunction::new("DELETE", "content.kb"))
            .await
            .unwrap();

        let grants = store.list_grants_for_role(&"Editor".into()).await.unwrap();
        assert!(grants.is_empty());
    }

    #[tokio::test]
    async fn test_commands_in_and_not_in_function() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .create_function(&Function::new("content.kb", "KB", "/kb", 1))
            .await
            .unwrap();
        for (id, name) in [("CREATE", "Create"), ("VIEW", "View")] {
            store.create_command(&Command::new(id, name)).await.unwrap();
        }
        store
            .add_command_to_function(&CommandInFunction::new("VIEW", "content.kb"))
            .await
            .unwrap();

        let attached = store.list_commands_in_function(&"content.kb".into()).await.unwrap();
        let detached = store
            .list_commands_not_in_function(&"content.kb".into())
            .await
            .unwrap();
        assert_eq!(attached, vec![Command::new("VIEW", "View")]);
        assert_eq!(detached, vec![Command::new("CREATE", "Create")]);
    }

    #[tokio::test]
    async fn test_page_functions_filters_and_counts() {
        let store = seeded().await;

        let page = store
            .page_functions(&PageRequest::new(1, 2).with_filter("content."))
            .await
            .unwrap();
        assert_eq!(page.total_records, 4);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id.as_str(), "content.category");

        let page = store
            .page_functions(&PageRequest::new(2, 10).with_filter("content."))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_records, 4);
    }

    #[tokio::test]
    async fn test_sequence_starts_at_base() {
        let store = SqliteStore::open_memory().unwrap();
        let name = SequenceName::knowledge_base();

        assert_eq!(store.current_value(&name).await.unwrap(), None);
        assert_eq!(store.next_value(&name).await.unwrap(), 1);
        assert_eq!(store.next_value(&name).await.unwrap(), 2);
        assert_eq!(store.current_value(&name).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_sequences_are_independent() {
        let store = SqliteStore::open_memory_with(StoreOptions {
            sequence_base: 100,
            ..StoreOptions::default()
        })
        .unwrap();

        assert_eq!(store.next_value(&"a".into()).await.unwrap(), 100);
        assert_eq!(store.next_value(&"b".into()).await.unwrap(), 100);
        assert_eq!(store.next_value(&"a".into()).await.unwrap(), 101);
    }
}
