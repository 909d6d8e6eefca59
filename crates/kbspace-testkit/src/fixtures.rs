//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use kbspace::{KnowledgeBase, KnowledgeBaseSink};
use kbspace_core::{Claim, ClaimSet, Grant, Role, RoleId};
use kbspace_perms::{ClaimMaterializer, Credential};
use kbspace_store::{MemoryStore, Result, Store, StoreExt};

/// A memory store seeded with the standard catalog.
pub struct TestFixture {
    pub store: Arc<MemoryStore>,
}

impl TestFixture {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// A store with the standard commands and function tree.
    pub async fn seeded() -> Result<Self> {
        let fixture = Self::new();
        fixture.store.seed_catalog().await?;
        Ok(fixture)
    }

    /// Create `role` and grant it each `(function, command)` pair.
    pub async fn role_with_grants(&self, role: &str, grants: &[(&str, &str)]) -> Result<Role> {
        let role = Role::new(role, role);
        self.store.create_role(&role).await?;
        for (function, command) in grants {
            self.store
                .set_grant(&Grant::new(role.id.clone(), *function, *command))
                .await?;
        }
        Ok(role)
    }

    /// Issue a non-expiring credential through the claim materializer.
    pub async fn credential(&self, subject: &str, roles: &[&str]) -> kbspace_perms::Result<Credential> {
        let roles: Vec<RoleId> = roles.iter().map(|r| RoleId::from(*r)).collect();
        ClaimMaterializer::new(Arc::clone(&self.store))
            .issue(subject, &roles, 0, None)
            .await
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A credential holding exactly the given claims, bypassing any store.
pub fn credential_with_claims(subject: &str, claims: &[(&str, &str)]) -> Credential {
    let claims: ClaimSet = claims
        .iter()
        .map(|(function, command)| Claim::new(*function, *command))
        .collect();
    Credential::new(subject, Vec::new(), claims, 0)
}

/// A sink that keeps every article it receives.
#[derive(Default)]
pub struct RecordingSink {
    articles: Mutex<Vec<KnowledgeBase>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Articles persisted so far, in arrival order.
    pub fn articles(&self) -> Vec<KnowledgeBase> {
        self.articles
            .lock()
            .map(|articles| articles.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl KnowledgeBaseSink for RecordingSink {
    async fn persist(&self, article: &KnowledgeBase) -> anyhow::Result<()> {
        self.articles
            .lock()
            .map_err(|e| anyhow::anyhow!("sink poisoned: {}", e))?
            .push(article.clone());
        Ok(())
    }
}
