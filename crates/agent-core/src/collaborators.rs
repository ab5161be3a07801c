use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use supplychain_core_types::{CollaboratorError, Row};

/// Executes read-only SQL against the tabular dataset.
#[async_trait]
pub trait TabularStore: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, CollaboratorError>;
}

/// A retrieved chunk of policy text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub content: String,
    #[serde(default)]
    pub source: String,
}

impl Passage {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }
}

/// Semantic search over indexed policy documents.
#[async_trait]
pub trait PassageRetriever: Send + Sync {
    /// Passages ordered from most to least relevant.
    async fn similarity_search(&self, query: &str) -> Result<Vec<Passage>, CollaboratorError>;
}

/// Free-text generation from a prompt.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError>;
}

/// Blank-line separated content of the first `limit` passages.
pub(crate) fn join_context(passages: &[Passage], limit: usize) -> String {
    passages
        .iter()
        .take(limit)
        .map(|passage| passage.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
