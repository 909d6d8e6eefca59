//! Claim materialization.
//!
//! Resolves the roles of an authenticated principal into the claim set that
//! is embedded in its credential. This runs once per issuance; the gate never
//! goes back to storage.

use std::sync::Arc;

use kbspace_core::{ClaimSet, Grant, RoleId};
use kbspace_store::{Store, StoreError};

use crate::credential::Credential;
use crate::error::Result;

/// Union the grants into a claim set, one claim per `(function, command)`.
pub fn materialize_claims<'a>(grants: impl IntoIterator<Item = &'a Grant>) -> ClaimSet {
    grants.into_iter().map(Grant::claim).collect()
}

/// Resolves roles to claims against a grant store.
pub struct ClaimMaterializer<S: Store> {
    store: Arc<S>,
}

impl<S: Store> ClaimMaterializer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The claim set for a principal holding `roles`.
    ///
    /// A role the store does not know contributes nothing.
    pub async fn claims_for_roles(&self, roles: &[RoleId]) -> Result<ClaimSet> {
        let mut grants = Vec::new();
        for role in roles {
            match self.store.list_grants_for_role(role).await {
                Ok(role_grants) => grants.extend(role_grants),
                Err(StoreError::NotFound { .. }) => {
                    tracing::warn!(role = %role, "unknown role skipped during claim materialization");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(materialize_claims(&grants))
    }

    /// Issue a credential for `subject` with claims resolved from `roles`.
    pub async fn issue(
        &self,
        subject: &str,
        roles: &[RoleId],
        now: i64,
        ttl_millis: Option<i64>,
    ) -> Result<Credential> {
        let claims = self.claims_for_roles(roles).await?;
        tracing::info!(
            subject,
            roles = roles.len(),
            claims = claims.len(),
            "credential issued"
        );

        let credential = Credential::new(subject, roles.to_vec(), claims, now);
        Ok(match ttl_millis {
            Some(ttl) => credential.with_ttl(ttl),
            None => credential,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbspace_core::{Claim, CommandInFunction, Role};
    use kbspace_store::{MemoryStore, StoreExt};
    use proptest::prelude::*;

    async fn store_with_roles() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.seed_catalog().await.unwrap();
        for id in ["Editor", "Reviewer"] {
            store.create_role(&Role::new(id, id)).await.unwrap();
        }
        store
            .set_grant(&Grant::new("Editor", "content.kb", "CREATE"))
            .await
            .unwrap();
        store
            .set_grant(&Grant::new("Editor", "content.kb", "VIEW"))
            .await
            .unwrap();
        store
            .set_grant(&Grant::new("Reviewer", "content.kb", "VIEW"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_shared_grant_yields_one_claim() {
        let materializer = ClaimMaterializer::new(store_with_roles().await);

        let claims = materializer
            .claims_for_roles(&["Editor".into(), "Reviewer".into()])
            .await
            .unwrap();

        assert_eq!(claims.len(), 2);
        assert!(claims.contains(&Claim::new("content.kb", "VIEW")));
        assert!(claims.contains(&Claim::new("content.kb", "CREATE")));
    }

    #[tokio::test]
    async fn test_unknown_role_contributes_nothing() {
        let materializer = ClaimMaterializer::new(store_with_roles().await);

        let claims = materializer
            .claims_for_roles(&["Ghost".into(), "Reviewer".into()])
            .await
            .unwrap();
        assert_eq!(claims.to_strings(), vec!["Permission.content.kb.VIEW"]);

        let none = materializer.claims_for_roles(&["Ghost".into()]).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_issued_credential_is_a_snapshot() {
        let store = store_with_roles().await;
        let materializer = ClaimMaterializer::new(Arc::clone(&store));

        let before = materializer
            .issue("alice", &["Editor".into()], 0, None)
            .await
            .unwrap();

        store
            .clear_grant(&Grant::new("Editor", "content.kb", "CREATE"))
            .await
            .unwrap();
        store
            .remove_command_from_function(&CommandInFunction::new("VIEW", "content.kb"))
            .await
            .unwrap();

        assert!(before.permits(&"content.kb".into(), &"CREATE".into()));
        assert!(before.permits(&"content.kb".into(), &"VIEW".into()));

        let after = materializer
            .issue("alice", &["Editor".into()], 1, None)
            .await
            .unwrap();
        assert!(after.claims.is_empty());
    }

    #[tokio::test]
    async fn test_issue_stamps_ttl() {
        let materializer = ClaimMaterializer::new(store_with_roles().await);
        let credential = materializer
            .issue("alice", &["Editor".into()], 1_000, Some(250))
            .await
            .unwrap();
        assert_eq!(credential.expires_at, Some(1_250));
        assert_eq!(credential.roles, vec![RoleId::from("Editor")]);
    }

    fn grant_strategy() -> impl Strategy<Value = Grant> {
        (
            prop::sample::select(vec!["Editor", "Reviewer", "Admin"]),
            prop::sample::select(vec!["content.kb", "content.category", "system.function"]),
            prop::sample::select(vec!["VIEW", "CREATE", "DELETE"]),
        )
            .prop_map(|(role, function, command)| Grant::new(role, function, command))
    }

    proptest! {
        #[test]
        fn prop_claims_are_distinct_pairs(grants in prop::collection::vec(grant_strategy(), 0..40)) {
            let claims = materialize_claims(&grants);

            let pairs: std::collections::HashSet<_> = grants
                .iter()
                .map(|g| (g.function_id.clone(), g.command_id.clone()))
                .collect();
            prop_assert_eq!(claims.len(), pairs.len());
            for grant in &grants {
                prop_assert!(claims.permits(&grant.function_id, &grant.command_id));
            }
        }

        #[test]
        fn prop_union_is_order_independent(grants in prop::collection::vec(grant_strategy(), 0..40)) {
            let mut reversed = grants.clone();
            reversed.reverse();
            prop_assert_eq!(materialize_claims(&grants), materialize_claims(&reversed));
        }
    }
}
