//! # Knowledge Space Core
//!
//! Pure primitives for Knowledge Space access control: the protected-resource
//! tree, verbs, role grants, and the permission claims they materialize into.
//!
//! This crate contains no I/O and no storage.
//!
//! ## Key Types
//!
//! - [`Function`] - A node in the protected-resource tree
//! - [`Command`] - A verb such as `VIEW` or `CREATE`
//! - [`CommandInFunction`] - Declares a verb legal for a function
//! - [`Grant`] - A `(role, function, command)` allow entry
//! - [`Claim`] / [`ClaimSet`] - The credential-embedded form of grants
//!
//! ## Claims
//!
//! Claims are encoded as `Permission.<FunctionId>.<CommandId>`. See [`claim`].

pub mod catalog;
pub mod claim;
pub mod command;
pub mod error;
pub mod function;
pub mod grant;
pub mod paging;
pub mod sequence;
pub mod types;
pub mod validation;

pub use catalog::{command_code, function_code, standard_commands, standard_functions};
pub use claim::{Claim, ClaimSet, PERMISSION_PREFIX};
pub use command::{Command, CommandInFunction};
pub use error::{CoreError, ValidationError};
pub use function::{check_parent, Function, FunctionForest, FunctionNode};
pub use grant::{Grant, Role};
pub use paging::{Page, PageRequest};
pub use sequence::{DEFAULT_BASE, KNOWLEDGE_BASE};
pub use types::{CommandId, FunctionId, RoleId, SequenceName};
