//! Property tests for the authorization gate.

use kbspace_core::{Claim, ClaimSet};
use kbspace_perms::{check, Credential, Decision, Requirement};
use proptest::prelude::*;

const FUNCTIONS: &[&str] = &["content.kb", "content.category", "system.function", "statistic"];
const COMMANDS: &[&str] = &["VIEW", "CREATE", "UPDATE", "DELETE", "APPROVE"];

fn claim_strategy() -> impl Strategy<Value = Claim> {
    (
        prop::sample::select(FUNCTIONS.to_vec()),
        prop::sample::select(COMMANDS.to_vec()),
    )
        .prop_map(|(f, c)| Claim::new(f, c))
}

fn requirement_strategy() -> impl Strategy<Value = Option<Requirement>> {
    prop_oneof![
        1 => Just(None),
        1 => Just(Some(Requirement::AuthenticatedOnly)),
        6 => claim_strategy().prop_map(|claim| Some(Requirement::permission(
            claim.function_id().clone(),
            claim.command_id().clone(),
        ))),
    ]
}

proptest! {
    #[test]
    fn prop_authorized_iff_claim_present(
        claims in prop::collection::vec(claim_strategy(), 0..12),
        requirement in requirement_strategy(),
    ) {
        let claims: ClaimSet = claims.into_iter().collect();
        let credential = Credential::new("p", vec![], claims.clone(), 0);

        let decision = check(requirement.as_ref(), Some(&credential), 0);
        let expected = match &requirement {
            None => false,
            Some(Requirement::AuthenticatedOnly) => true,
            Some(Requirement::Permission { function, command }) => claims.permits(function, command),
        };

        prop_assert_eq!(decision.is_authorized(), expected);
        if !expected {
            let is_forbidden = matches!(decision, Decision::Forbidden { .. });
            prop_assert!(is_forbidden);
        }
    }

    #[test]
    fn prop_anonymous_never_authorized(requirement in requirement_strategy()) {
        prop_assert_eq!(check(requirement.as_ref(), None, 0), Decision::Unauthenticated);
    }
}
