//! # Knowledge Space Access Control
//!
//! Role-based access control for the Knowledge Space administration API:
//! a tree of protected resources, role grants, claims baked into credentials
//! at issuance, a fail-closed authorization gate, and durable sequences for
//! numbering knowledge-base articles.
//!
//! ## Overview
//!
//! - **Functions** are the protected resources, arranged in a tree
//! - **Commands** are the verbs (`VIEW`, `CREATE`, ...) attached to functions
//! - **Grants** give a role one `(function, command)` pair
//! - **Claims** (`Permission.<function>.<command>`) are the grants of a
//!   principal's roles, resolved once when its credential is issued
//! - **The gate** checks a credential's claims against the requirement each
//!   operation declares, without touching storage
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kbspace::{AccessConfig, AccessControl};
//! use kbspace::core::{Grant, Role};
//! use kbspace::perms::operation;
//! use kbspace::store::Store;
//!
//! async fn example() -> kbspace::Result<()> {
//!     kbspace::init_tracing("info");
//!
//!     let config = AccessConfig::from_file("kbspace.json")?;
//!     let access = AccessControl::open(config).await?;
//!
//!     access.store().create_role(&Role::new("Editor", "Editor")).await?;
//!     access.store().set_grant(&Grant::new("Editor", "content.kb", "CREATE")).await?;
//!
//!     let credential = access.issue_credential("alice", &["Editor".into()]).await?;
//!     access.authorize(operation::KNOWLEDGE_BASES_CREATE, Some(&credential))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `kbspace::core` - Ids, functions, commands, grants, claims
//! - `kbspace::store` - Storage abstraction and SQLite
//! - `kbspace::perms` - Materializer, credentials, gate

pub mod access;
pub mod config;
pub mod error;
pub mod knowledge_base;
pub mod logging;

// Re-export component crates
pub use kbspace_core as core;
pub use kbspace_perms as perms;
pub use kbspace_store as store;

pub use access::AccessControl;
pub use config::{AccessConfig, DatabaseConfig};
pub use error::{AccessError, Result};
pub use knowledge_base::{KnowledgeBase, KnowledgeBaseDraft, KnowledgeBaseSink};
pub use logging::init_tracing;

// Commonly used types
pub use kbspace_core::{
    Claim, ClaimSet, Command, CommandId, CommandInFunction, Function, FunctionId, Grant, Role,
    RoleId, SequenceName,
};
pub use kbspace_perms::{Credential, Decision};
pub use kbspace_store::DeleteMode;
