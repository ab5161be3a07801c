//! Shared application components assembled from configuration.

use std::sync::Arc;

use agent_core::{AnswerGenerator, Dispatcher, Passage, PassageRetriever, TabularStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use intent_router::RouterConfig;
use supplychain_core_types::{Collaborator, CollaboratorError, Row};
use supplychain_policy_center::{
    load_snapshot_with_options, LoadOptions, PolicyCenter, PolicySnapshot,
};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::llm::{GatewayClient, GatewayEmbedder};
use crate::retrieval::{VectorIndex, VectorRetriever};
use crate::storage::SqliteStore;

pub struct AppContext {
    config: Arc<AppConfig>,
    policies: Arc<PolicyCenter>,
    dispatcher: Arc<Dispatcher>,
}

impl AppContext {
    /// Connects the real collaborators. A collaborator that cannot be set up
    /// is replaced by one that reports the setup error on every call, so the
    /// remaining branches keep working.
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let store: Arc<dyn TabularStore> = match SqliteStore::open(&config.storage.db_uri).await {
            Ok(store) => Arc::new(store),
            Err(err) => {
                warn!(uri = %config.storage.db_uri, %err, "tabular store unavailable");
                Arc::new(Unavailable::new(Collaborator::Storage, err.message))
            }
        };
        let generator: Arc<dyn AnswerGenerator> = match GatewayClient::new(config.gateway.clone())
        {
            Ok(client) => Arc::new(client),
            Err(err) => {
                warn!(%err, "answer generator unavailable");
                Arc::new(Unavailable::new(Collaborator::Generation, err.message))
            }
        };
        let retriever = build_retriever(&config);
        Self::with_collaborators(config, store, retriever, generator)
    }

    pub fn with_collaborators(
        config: AppConfig,
        store: Arc<dyn TabularStore>,
        retriever: Arc<dyn PassageRetriever>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Result<Self> {
        let policies = Arc::new(load_policies(&config)?);
        let router = load_router(&config)?;
        let dispatcher = Dispatcher::builder(store, retriever, generator)
            .policies(Arc::clone(&policies))
            .router(router)
            .context_passages(config.documents.context_passages)
            .format_answers(config.documents.format_answers)
            .build();
        Ok(Self {
            config: Arc::new(config),
            policies,
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn config(&self) -> &Arc<AppConfig> {
        &self.config
    }

    pub fn policies(&self) -> &Arc<PolicyCenter> {
        &self.policies
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Re-reads the policy sources and swaps the new snapshot in. On error the
    /// installed snapshot stays in place.
    pub fn reload_policies(&self) -> Result<Arc<PolicySnapshot>> {
        let snapshot = self
            .policies
            .reload(&policy_load_options(&self.config))
            .context("Failed to reload access policy")?;
        info!(
            rev = snapshot.rev,
            source = ?snapshot.source,
            "access policy reloaded"
        );
        Ok(snapshot)
    }
}

fn policy_load_options(config: &AppConfig) -> LoadOptions {
    LoadOptions {
        paths: config.policy.path.iter().cloned().collect(),
        include_env: true,
    }
}

pub fn load_policies(config: &AppConfig) -> Result<PolicyCenter> {
    let snapshot = load_snapshot_with_options(&policy_load_options(config))
        .context("Failed to load access policy")?;
    info!(
        source = ?snapshot.source,
        roles = snapshot.access.roles().count(),
        geo_rules = snapshot.geo.len(),
        "access policy installed"
    );
    Ok(PolicyCenter::new(snapshot))
}

pub fn load_router(config: &AppConfig) -> Result<RouterConfig> {
    match &config.router.rules_path {
        Some(path) => RouterConfig::from_path(path)
            .with_context(|| format!("Failed to load router rules from {}", path.display())),
        None => Ok(RouterConfig::default()),
    }
}

fn build_retriever(config: &AppConfig) -> Arc<dyn PassageRetriever> {
    let index = match VectorIndex::load(&config.retrieval.index_path) {
        Ok(index) => index,
        Err(err) => {
            warn!(%err, "vector index unavailable");
            return Arc::new(Unavailable::new(Collaborator::Retrieval, err.to_string()));
        }
    };
    match GatewayEmbedder::new(config.gateway.clone()) {
        Ok(embedder) => Arc::new(
            VectorRetriever::new(Arc::new(index), Arc::new(embedder))
                .with_top_k(config.retrieval.top_k),
        ),
        Err(err) => {
            warn!(%err, "query embedder unavailable");
            Arc::new(Unavailable::new(Collaborator::Retrieval, err.message))
        }
    }
}

/// Stands in for a collaborator whose setup failed.
struct Unavailable {
    error: CollaboratorError,
}

impl Unavailable {
    fn new(collaborator: Collaborator, reason: String) -> Self {
        Self {
            error: CollaboratorError {
                collaborator,
                message: format!("not available: {reason}"),
            },
        }
    }
}

#[async_trait]
impl TabularStore for Unavailable {
    async fn execute(&self, _sql: &str) -> Result<Vec<Row>, CollaboratorError> {
        Err(self.error.clone())
    }
}

#[async_trait]
impl PassageRetriever for Unavailable {
    async fn similarity_search(&self, _query: &str) -> Result<Vec<Passage>, CollaboratorError> {
        Err(self.error.clone())
    }
}

#[async_trait]
impl AnswerGenerator for Unavailable {
    async fn generate(&self, _prompt: &str) -> Result<String, CollaboratorError> {
        Err(self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::mock::{ScriptedGenerator, StaticRetriever, StaticStore};
    use supplychain_core_types::{QueryRequest, ResponseEnvelope};

    #[tokio::test]
    async fn reloaded_policy_applies_to_next_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let policy_path = dir.path().join("policy.yaml");
        std::fs::write(&policy_path, "roles:\n  finance: [sales]\n").unwrap();

        let mut config = AppConfig::default();
        config.policy.path = Some(policy_path.clone());
        let context = AppContext::with_collaborators(
            config,
            Arc::new(StaticStore::new(vec![Row::new()])),
            Arc::new(StaticRetriever::default()),
            Arc::new(ScriptedGenerator::default()),
        )
        .unwrap();
        let request = QueryRequest::new("What is the total sales?", "finance", "India");
        assert_eq!(context.dispatcher().handle(&request).await.kind(), "data");

        std::fs::write(&policy_path, "roles:\n  finance: [profit]\n").unwrap();
        let snapshot = context.reload_policies().unwrap();
        assert_eq!(snapshot.rev, 2);
        assert_eq!(
            context.dispatcher().handle(&request).await,
            ResponseEnvelope::Error {
                message: "Access denied: Your role is not authorized for this data.".into()
            }
        );

        std::fs::write(&policy_path, "geo:\n  Southwest: ''\n").unwrap();
        assert!(context.reload_policies().is_err());
        assert_eq!(context.policies().revision(), 2);
    }
}
