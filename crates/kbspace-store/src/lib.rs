//! # Knowledge Space Store
//!
//! Storage abstraction for Knowledge Space access control. Provides a
//! trait-based interface for the resource registry, the grant store and the
//! sequence allocator, with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`StoreExt`] - Catalog seeding and bulk grant helpers
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`DeleteMode`] - What happens to the children of a deleted function
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kbspace_core::{Function, SequenceName};
//! use kbspace_store::{SqliteStore, Store, StoreExt};
//!
//! async fn example() -> kbspace_store::Result<()> {
//!     let store = SqliteStore::open("access.db")?;
//!     store.seed_catalog().await?;
//!
//!     store
//!         .create_function(&Function::new("content.tags", "Tags", "/content/tags", 5).with_parent("content"))
//!         .await?;
//!
//!     let id = store.next_value(&SequenceName::knowledge_base()).await?;
//!     println!("next article id: {}", id);
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Strict creates**: creating an existing row returns `Conflict`
//! - **Acyclic tree**: parent assignments are checked against the stored tree
//! - **Attached grants**: a grant needs its `(command, function)` pair attached,
//!   and detaching the pair clears the grants that used it
//! - **Durable sequences**: `next_value` commits before returning; a failed
//!   commit hands out nothing

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{DeleteMode, Store, StoreExt, StoreOptions};
