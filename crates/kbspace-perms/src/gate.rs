//! The authorization gate.
//!
//! The gate runs in front of every protected operation. It is a pure check of
//! the caller's credential against the operation's declared requirement:
//! no storage access, no locking, and nothing is remembered between calls.
//!
//! ```text
//! Unchecked ──credential──▶ Authenticated ──claim present──▶ Authorized
//!     │                          │
//!     └──missing/expired──▶ Unauthenticated   └──claim missing──▶ Forbidden
//! ```

use std::future::Future;

use crate::credential::Credential;
use crate::error::{PermsError, Result};
use crate::requirement::{Requirement, RequirementTable};

/// Progress of a single authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unchecked,
    Authenticated,
    Unauthenticated,
    Authorized,
    Forbidden { reason: String },
}

impl AuthState {
    /// Whether the check has reached an outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AuthState::Unauthenticated | AuthState::Authorized | AuthState::Forbidden { .. }
        )
    }

    fn authenticate(self, credential: Option<&Credential>, now: i64) -> Self {
        match (self, credential) {
            (AuthState::Unchecked, Some(c)) if c.is_authenticated(now) => AuthState::Authenticated,
            (AuthState::Unchecked, _) => AuthState::Unauthenticated,
            (state, _) => state,
        }
    }

    fn authorize(self, credential: Option<&Credential>, requirement: Option<&Requirement>) -> Self {
        if !matches!(self, AuthState::Authenticated) {
            return self;
        }
        let Some(credential) = credential else {
            return AuthState::Unauthenticated;
        };
        match requirement {
            None => AuthState::Forbidden {
                reason: "operation declares no requirement".to_string(),
            },
            Some(Requirement::AuthenticatedOnly) => AuthState::Authorized,
            Some(Requirement::Permission { function, command }) => {
                if credential.permits(function, command) {
                    AuthState::Authorized
                } else {
                    AuthState::Forbidden {
                        reason: format!("missing permission {} on {}", command, function),
                    }
                }
            }
        }
    }
}

/// Outcome of the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The handler may run.
    Authorized,
    /// 401: no valid credential. Carries no detail.
    Unauthenticated,
    /// 403: authenticated but lacking the required claim.
    Forbidden { reason: String },
}

impl Decision {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Decision::Authorized)
    }

    /// HTTP status equivalent of a denial; 200 when authorized.
    pub fn status_code(&self) -> u16 {
        match self {
            Decision::Authorized => 200,
            Decision::Unauthenticated => 401,
            Decision::Forbidden { .. } => 403,
        }
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Authorized => Ok(()),
            Decision::Unauthenticated => Err(PermsError::Unauthenticated),
            Decision::Forbidden { reason } => Err(PermsError::Forbidden { reason }),
        }
    }
}

/// Run the state machine for one requirement.
pub fn check(requirement: Option<&Requirement>, credential: Option<&Credential>, now: i64) -> Decision {
    let state = AuthState::Unchecked
        .authenticate(credential, now)
        .authorize(credential, requirement);

    match state {
        AuthState::Authorized => Decision::Authorized,
        AuthState::Forbidden { reason } => Decision::Forbidden { reason },
        AuthState::Unauthenticated | AuthState::Unchecked | AuthState::Authenticated => {
            Decision::Unauthenticated
        }
    }
}

/// Gate over a table of operation requirements.
#[derive(Debug, Clone)]
pub struct Gate {
    requirements: RequirementTable,
}

impl Gate {
    pub fn new(requirements: RequirementTable) -> Self {
        Self { requirements }
    }

    pub fn requirements(&self) -> &RequirementTable {
        &self.requirements
    }

    /// Decide whether `credential` may invoke `operation`.
    pub fn check(&self, operation: &str, credential: Option<&Credential>, now: i64) -> Decision {
        let requirement = self.requirements.get(operation);
        let decision = check(requirement, credential, now);

        match &decision {
            Decision::Authorized => {
                tracing::debug!(operation, "authorized");
            }
            Decision::Unauthenticated => {
                tracing::info!(operation, outcome = "unauthenticated", "request denied");
            }
            Decision::Forbidden { reason } => {
                tracing::info!(
                    operation,
                    requirement = ?requirement,
                    subject = credential.map(|c| c.subject.as_str()).unwrap_or_default(),
                    outcome = "forbidden",
                    reason = %reason,
                    "request denied"
                );
            }
        }
        decision
    }

    /// Run `handler` only if the gate authorizes the call.
    pub async fn guard<F, Fut, T>(
        &self,
        operation: &str,
        credential: Option<&Credential>,
        now: i64,
        handler: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.check(operation, credential, now).into_result()?;
        Ok(handler().await)
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new(RequirementTable::standard())
    }
}
