//! Knowledge-base article creation.
//!
//! Articles are stored elsewhere; this crate only authorizes the call and
//! numbers the article from the `KnowledgeBase` sequence before handing it to
//! a [`KnowledgeBaseSink`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use kbspace_core::ValidationError;
use kbspace_core::validation::{validate_text, MAX_NAME_LEN};

/// Fields supplied by the author of a new article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseDraft {
    pub category_id: i64,
    pub title: String,
    pub seo_alias: String,
    pub description: Option<String>,
    pub problem: Option<String>,
    pub workaround: Option<String>,
    pub note: Option<String>,
    pub labels: Vec<String>,
}

impl KnowledgeBaseDraft {
    pub fn new(category_id: i64, title: impl Into<String>, seo_alias: impl Into<String>) -> Self {
        Self {
            category_id,
            title: title.into(),
            seo_alias: seo_alias.into(),
            ..Self::default()
        }
    }

    /// Parse a comma-separated label list, trimming and dropping blanks.
    pub fn with_labels(mut self, labels: &str) -> Self {
        self.labels = labels
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_text("title", &self.title, MAX_NAME_LEN)?;
        validate_text("seo alias", &self.seo_alias, MAX_NAME_LEN)
    }
}

/// A numbered article ready to persist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// Allocated from the `KnowledgeBase` sequence.
    pub id: i64,
    /// Subject of the credential that created it.
    pub owner: String,
    #[serde(flatten)]
    pub draft: KnowledgeBaseDraft,
}

/// Destination for newly numbered articles.
#[async_trait]
pub trait KnowledgeBaseSink: Send + Sync {
    async fn persist(&self, article: &KnowledgeBase) -> anyhow::Result<()>;
}
