//! # Knowledge Space Permissions
//!
//! Turns role grants into credential claims, and checks those claims in front
//! of protected operations.
//!
//! ## Overview
//!
//! Authorization is split in two phases that never meet at runtime:
//!
//! 1. **Issuance**: [`ClaimMaterializer`] resolves a principal's roles against
//!    the grant store and bakes the result into a [`Credential`].
//! 2. **Checking**: the [`Gate`] compares the credential's claims with the
//!    [`Requirement`] declared for an operation. No storage is touched.
//!
//! Grant changes therefore take effect on the next issuance, not on
//! credentials already handed out.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kbspace_perms::{operation, ClaimMaterializer, Gate};
//! use kbspace_store::MemoryStore;
//!
//! async fn example(store: Arc<MemoryStore>) -> kbspace_perms::Result<()> {
//!     let materializer = ClaimMaterializer::new(store);
//!     let credential = materializer.issue("alice", &["Editor".into()], 0, None).await?;
//!
//!     let gate = Gate::default();
//!     gate.check(operation::KNOWLEDGE_BASES_CREATE, Some(&credential), 0)
//!         .into_result()?;
//!     Ok(())
//! }
//! ```

pub mod credential;
pub mod error;
pub mod gate;
pub mod materializer;
pub mod requirement;

pub use credential::{now_millis, Credential};
pub use error::{PermsError, Result};
pub use gate::{check, AuthState, Decision, Gate};
pub use materializer::{materialize_claims, ClaimMaterializer};
pub use requirement::{operation, Requirement, RequirementTable};
