//! Issued credentials.
//!
//! A credential is the envelope the identity provider signs and hands to the
//! client. It carries the principal, its roles, and the claim set resolved at
//! issuance. Claims are never refreshed: grant changes show up only in the
//! next credential issued.

use serde::{Deserialize, Serialize};

use kbspace_core::{ClaimSet, CommandId, FunctionId, RoleId};

use crate::error::{PermsError, Result};

/// A credential with its baked-in claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The authenticated principal.
    pub subject: String,

    /// Role ids the principal held at issuance.
    pub roles: Vec<RoleId>,

    /// Permission claims resolved from those roles.
    pub claims: ClaimSet,

    /// Issuance time (Unix milliseconds).
    pub issued_at: i64,

    /// Expiry (Unix milliseconds); `None` never expires.
    pub expires_at: Option<i64>,
}

impl Credential {
    pub fn new(subject: impl Into<String>, roles: Vec<RoleId>, claims: ClaimSet, issued_at: i64) -> Self {
        Self {
            subject: subject.into(),
            roles,
            claims,
            issued_at,
            expires_at: None,
        }
    }

    /// Stamp an expiry `ttl_millis` after issuance.
    pub fn with_ttl(mut self, ttl_millis: i64) -> Self {
        self.expires_at = Some(self.issued_at.saturating_add(ttl_millis));
        self
    }

    /// Whether the credential names a principal and has not expired at `now`.
    pub fn is_authenticated(&self, now: i64) -> bool {
        if self.subject.is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expires) => now <= expires,
            None => true,
        }
    }

    pub fn permits(&self, function: &FunctionId, command: &CommandId) -> bool {
        self.claims.permits(function, command)
    }

    /// The claim strings, sorted.
    pub fn claim_strings(&self) -> Vec<String> {
        self.claims.to_strings()
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| PermsError::Encoding(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| PermsError::Encoding(e.to_string()))
    }
}

/// Current time in Unix milliseconds.
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbspace_core::Claim;

    fn editor() -> Credential {
        let claims: ClaimSet = [
            Claim::new("content.kb", "CREATE"),
            Claim::new("content.kb", "VIEW"),
        ]
        .into_iter()
        .collect();
        Credential::new("alice", vec!["Editor".into()], claims, 1_000)
    }

    #[test]
    fn test_cbor_roundtrip_keeps_claims() {
        let credential = editor().with_ttl(60_000);
        let decoded = Credential::from_bytes(&credential.to_bytes().unwrap()).unwrap();

        assert_eq!(decoded, credential);
        assert!(decoded.permits(&"content.kb".into(), &"CREATE".into()));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(matches!(
            Credential::from_bytes(&[0xff, 0x00, 0x13]),
            Err(PermsError::Encoding(_))
        ));
    }

    #[test]
    fn test_expiry() {
        let credential = editor().with_ttl(500);
        assert!(credential.is_authenticated(1_000));
        assert!(credential.is_authenticated(1_500));
        assert!(!credential.is_authenticated(1_501));
        assert!(editor().is_authenticated(i64::MAX));
    }

    #[test]
    fn test_empty_subject_is_not_authenticated() {
        let credential = Credential::new("", vec![], ClaimSet::new(), 0);
        assert!(!credential.is_authenticated(0));
    }

    #[test]
    fn test_claim_strings_sorted() {
        assert_eq!(
            editor().claim_strings(),
            vec![
                "Permission.content.kb.CREATE".to_string(),
                "Permission.content.kb.VIEW".to_string(),
            ]
        );
    }
}
