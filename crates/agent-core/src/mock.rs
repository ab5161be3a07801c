//! Deterministic in-process collaborators for tests and offline runs.

use async_trait::async_trait;
use supplychain_core_types::{CollaboratorError, Row};
use tokio::sync::Mutex;

use crate::collaborators::{AnswerGenerator, Passage, PassageRetriever, TabularStore};

/// Returns the same rows for every statement and records what it ran.
#[derive(Debug, Default)]
pub struct StaticStore {
    rows: Vec<Row>,
    failure: Option<String>,
    executed: Mutex<Vec<String>>,
}

impl StaticStore {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub async fn executed(&self) -> Vec<String> {
        self.executed.lock().await.clone()
    }
}

#[async_trait]
impl TabularStore for StaticStore {
    async fn execute(&self, sql: &str) -> Result<Vec<Row>, CollaboratorError> {
        self.executed.lock().await.push(sql.to_string());
        match &self.failure {
            Some(message) => Err(CollaboratorError::storage(message.clone())),
            None => Ok(self.rows.clone()),
        }
    }
}

/// Returns a fixed passage list regardless of the query.
#[derive(Debug, Default)]
pub struct StaticRetriever {
    passages: Vec<Passage>,
    failure: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl StaticRetriever {
    pub fn new(passages: Vec<Passage>) -> Self {
        Self {
            passages,
            ..Self::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub async fn queries(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl PassageRetriever for StaticRetriever {
    async fn similarity_search(&self, query: &str) -> Result<Vec<Passage>, CollaboratorError> {
        self.queries.lock().await.push(query.to_string());
        match &self.failure {
            Some(message) => Err(CollaboratorError::retrieval(message.clone())),
            None => Ok(self.passages.clone()),
        }
    }
}

/// Answers every prompt with the same reply.
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    reply: String,
    failure: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            ..Self::default()
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl AnswerGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError> {
        self.prompts.lock().await.push(prompt.to_string());
        match &self.failure {
            Some(message) => Err(CollaboratorError::generation(message.clone())),
            None => Ok(self.reply.clone()),
        }
    }
}
