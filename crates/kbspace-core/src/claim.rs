//! Permission claims and claim sets.
//!
//! A claim is the credential-embedded form of one resolved grant, encoded as
//! `Permission.<FunctionId>.<CommandId>`. Function ids may contain dots;
//! command ids may not, so the last `.` always separates the two.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::types::{CommandId, FunctionId};

/// Prefix shared by every permission claim.
pub const PERMISSION_PREFIX: &str = "Permission.";

/// One `(function, command)` permission asserted by a credential.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Claim {
    function_id: FunctionId,
    command_id: CommandId,
}

impl Claim {
    /// Build the claim for a `(function, command)` pair.
    pub fn new(function_id: impl Into<FunctionId>, command_id: impl Into<CommandId>) -> Self {
        Self {
            function_id: function_id.into(),
            command_id: command_id.into(),
        }
    }

    pub fn function_id(&self) -> &FunctionId {
        &self.function_id
    }

    pub fn command_id(&self) -> &CommandId {
        &self.command_id
    }

    /// Parse the wire form `Permission.<F>.<C>`.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let body = s
            .strip_prefix(PERMISSION_PREFIX)
            .ok_or_else(|| CoreError::MalformedClaim(s.to_string()))?;
        let (function, command) = body
            .rsplit_once('.')
            .ok_or_else(|| CoreError::MalformedClaim(s.to_string()))?;
        if function.is_empty() || command.is_empty() {
            return Err(CoreError::MalformedClaim(s.to_string()));
        }
        Ok(Self::new(function, command))
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}.{}", PERMISSION_PREFIX, self.function_id, self.command_id)
    }
}

impl fmt::Debug for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Claim({})", self)
    }
}

impl FromStr for Claim {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Claim {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Claim {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Claim::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A deduplicated set of claims.
///
/// Membership checks are constant time and never touch storage. Iteration
/// and serialization are in sorted order so encoded credentials are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet(HashSet<Claim>);

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a claim; returns `false` if it was already present.
    pub fn insert(&mut self, claim: Claim) -> bool {
        self.0.insert(claim)
    }

    pub fn contains(&self, claim: &Claim) -> bool {
        self.0.contains(claim)
    }

    /// Whether the set holds `Permission.<function>.<command>`.
    pub fn permits(&self, function: &FunctionId, command: &CommandId) -> bool {
        self.0.contains(&Claim::new(function.clone(), command.clone()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Claims in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.sorted().into_iter()
    }

    /// Wire strings, in sorted order.
    pub fn to_strings(&self) -> Vec<String> {
        self.sorted().into_iter().map(Claim::to_string).collect()
    }

    fn sorted(&self) -> Vec<&Claim> {
        let mut claims: Vec<&Claim> = self.0.iter().collect();
        claims.sort();
        claims
    }

    /// Parse wire strings, skipping anything that is not a permission claim.
    ///
    /// Identity providers attach other claims (`sub`, `email`, ...) next to
    /// permission claims; those are not errors.
    pub fn from_strings<'a>(claims: impl IntoIterator<Item = &'a str>) -> Self {
        claims
            .into_iter()
            .filter_map(|s| Claim::parse(s).ok())
            .collect()
    }
}

impl FromIterator<Claim> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = Claim>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Claim> for ClaimSet {
    fn extend<I: IntoIterator<Item = Claim>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl Serialize for ClaimSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.sorted())
    }
}

impl<'de> Deserialize<'de> for ClaimSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let claims = Vec::<Claim>::deserialize(deserializer)?;
        Ok(claims.into_iter().collect())
    }
}
