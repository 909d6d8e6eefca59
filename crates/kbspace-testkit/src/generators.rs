//! Proptest strategies for generating test data.

use proptest::prelude::*;

use kbspace_core::{
    standard_commands, standard_functions, Claim, ClaimSet, CommandId, Function, FunctionId,
    Grant, RoleId,
};

/// One of the standard function ids.
pub fn standard_function_id() -> impl Strategy<Value = FunctionId> {
    let ids: Vec<FunctionId> = standard_functions().into_iter().map(|f| f.id).collect();
    prop::sample::select(ids)
}

/// One of the standard command ids.
pub fn standard_command_id() -> impl Strategy<Value = CommandId> {
    let ids: Vec<CommandId> = standard_commands().into_iter().map(|c| c.id).collect();
    prop::sample::select(ids)
}

/// A role id from a small pool, so that roles collide.
pub fn role_id() -> impl Strategy<Value = RoleId> {
    prop::sample::select(vec!["Admin", "Editor", "Reviewer", "Member"]).prop_map(RoleId::from)
}

/// A well-formed function code: dotted lowercase segments.
pub fn function_code() -> impl Strategy<Value = FunctionId> {
    "[a-z][a-z0-9_]{0,8}(\\.[a-z][a-z0-9_]{0,8}){0,2}".prop_map(FunctionId::from)
}

/// A well-formed command code: uppercase, no dots.
pub fn command_code() -> impl Strategy<Value = CommandId> {
    "[A-Z][A-Z_]{0,11}".prop_map(CommandId::from)
}

/// A claim over arbitrary well-formed codes.
pub fn claim() -> impl Strategy<Value = Claim> {
    (function_code(), command_code()).prop_map(|(f, c)| Claim::new(f, c))
}

/// A claim set of up to `max` claims.
pub fn claim_set(max: usize) -> impl Strategy<Value = ClaimSet> {
    prop::collection::vec(claim(), 0..=max).prop_map(|claims| claims.into_iter().collect())
}

/// A grant over the standard catalog.
pub fn standard_grant() -> impl Strategy<Value = Grant> {
    (role_id(), standard_function_id(), standard_command_id())
        .prop_map(|(role, function, command)| Grant::new(role, function, command))
}

/// A flat list of `n` functions `f0..fn` with arbitrary parent pointers.
///
/// Parents may point forward, backward or at the node itself, so the list
/// is not necessarily a valid tree. Useful for exercising cycle checks.
pub fn parent_assignments(n: usize) -> impl Strategy<Value = Vec<Function>> {
    prop::collection::vec(prop::option::of(0..n), n).prop_map(|parents| {
        parents
            .into_iter()
            .enumerate()
            .map(|(i, parent)| {
                let function = Function::new(format!("f{}", i), format!("F{}", i), format!("/f{}", i), i as i32);
                match parent {
                    Some(p) => function.with_parent(format!("f{}", p)),
                    None => function,
                }
            })
            .collect()
    })
}

/// Parameters for a grant scenario: which grants exist and which roles a
/// principal holds.
#[derive(Debug, Clone)]
pub struct GrantScenario {
    pub grants: Vec<Grant>,
    pub roles: Vec<RoleId>,
}

impl GrantScenario {
    /// The claims the principal should end up with.
    pub fn expected_claims(&self) -> ClaimSet {
        self.grants
            .iter()
            .filter(|g| self.roles.contains(&g.role_id))
            .map(Grant::claim)
            .collect()
    }
}

impl Arbitrary for GrantScenario {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            prop::collection::vec(standard_grant(), 0..30),
            prop::collection::vec(role_id(), 0..4),
        )
            .prop_map(|(grants, roles)| GrantScenario { grants, roles })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbspace_core::ValidationError;

    proptest! {
        #[test]
        fn test_generated_codes_validate(function in function_code(), command in command_code()) {
            let validated: Result<(), ValidationError> =
                kbspace_core::validation::validate_code("function id", function.as_str())
                    .and_then(|_| kbspace_core::validation::validate_command_code(command.as_str()));
            prop_assert!(validated.is_ok());
        }

        #[test]
        fn test_claim_parses_back(claim in claim()) {
            prop_assert_eq!(Claim::parse(&claim.to_string()).unwrap(), claim);
        }

        #[test]
        fn test_expected_claims_subset(scenario: GrantScenario) {
            let expected = scenario.expected_claims();
            prop_assert!(expected.len() <= scenario.grants.len());
        }
    }
}
