//! Named monotonic counters.

use crate::types::SequenceName;

/// Sequence that numbers knowledge-base articles.
pub const KNOWLEDGE_BASE: &str = "KnowledgeBase";

/// First value handed out by a sequence that did not exist yet.
pub const DEFAULT_BASE: i64 = 1;

impl SequenceName {
    /// The knowledge-base article sequence.
    pub fn knowledge_base() -> Self {
        Self::new(KNOWLEDGE_BASE)
    }
}
