//! # Knowledge Space Testkit
//!
//! Testing utilities for Knowledge Space access control.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: seeded stores, roles with grants, issued credentials, and
//!   a recording knowledge-base sink
//! - **Generators**: Proptest strategies for codes, claims, grants and
//!   function trees
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use kbspace_perms::materialize_claims;
//! use kbspace_testkit::GrantScenario;
//!
//! proptest! {
//!     #[test]
//!     fn claims_match_grants(scenario: GrantScenario) {
//!         let held: Vec<_> = scenario.grants.iter()
//!             .filter(|g| scenario.roles.contains(&g.role_id))
//!             .collect();
//!         prop_assert_eq!(materialize_claims(held), scenario.expected_claims());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use kbspace_testkit::TestFixture;
//!
//! let fixture = TestFixture::seeded().await?;
//! fixture.role_with_grants("Editor", &[("content.kb", "CREATE")]).await?;
//! let credential = fixture.credential("alice", &["Editor"]).await?;
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{credential_with_claims, RecordingSink, TestFixture};
pub use generators::GrantScenario;
