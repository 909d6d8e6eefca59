//! Strong type definitions for Knowledge Space access control.
//!
//! All identifiers are newtypes over their stable string code so that a
//! function id can never be passed where a command id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw code.
            pub fn new(code: impl Into<String>) -> Self {
                Self(code.into())
            }

            /// Get the raw code.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the id, returning the raw code.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(code: &str) -> Self {
                Self(code.to_string())
            }
        }

        impl From<String> for $name {
            fn from(code: String) -> Self {
                Self(code)
            }
        }
    };
}

string_id!(
    /// Stable code of a protected resource node, e.g. `content.category`.
    FunctionId
);

string_id!(
    /// Stable code of a verb, e.g. `VIEW`. Never contains a `.`.
    CommandId
);

string_id!(
    /// Identifier of a role owned by the identity provider.
    RoleId
);

string_id!(
    /// Name of a monotonic counter, e.g. `KnowledgeBase`.
    SequenceName
);
