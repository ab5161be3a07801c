use std::sync::Arc;

use access_gate::AccessGate;
use intent_router::{SqlTemplateBuilder, ThresholdTable};
use supplychain_core_types::{DispatchError, ResponseEnvelope, Role};
use tracing::{debug, info};

use crate::collaborators::{join_context, AnswerGenerator, PassageRetriever, TabularStore};

/// Retrieval query used to look up the movement-classification definition.
pub const DEFINITION_TOPIC: &str = "inventory classification policy";

/// Resolves a policy definition from documents, then runs the query variant
/// that definition selects.
#[derive(Clone)]
pub struct HybridResolver {
    retriever: Arc<dyn PassageRetriever>,
    generator: Arc<dyn AnswerGenerator>,
    store: Arc<dyn TabularStore>,
    gate: AccessGate,
    builder: SqlTemplateBuilder,
    thresholds: ThresholdTable,
    context_passages: usize,
}

impl HybridResolver {
    pub fn new(
        retriever: Arc<dyn PassageRetriever>,
        generator: Arc<dyn AnswerGenerator>,
        store: Arc<dyn TabularStore>,
        gate: AccessGate,
        thresholds: ThresholdTable,
    ) -> Self {
        Self {
            retriever,
            generator,
            store,
            gate,
            builder: SqlTemplateBuilder::new(),
            thresholds,
            context_passages: crate::documents::DEFAULT_CONTEXT_PASSAGES,
        }
    }

    pub fn with_context_passages(mut self, passages: usize) -> Self {
        self.context_passages = passages.max(1);
        self
    }

    pub async fn resolve_definition_then_query(
        &self,
        text: &str,
        region: &str,
        role: Role,
    ) -> Result<ResponseEnvelope, DispatchError> {
        let passages = self.retriever.similarity_search(DEFINITION_TOPIC).await?;
        let context = join_context(&passages, self.context_passages);
        let prompt = format!("Based on the following context:\n{context}\n\n{text}");
        let definition = self.generator.generate(&prompt).await?;

        let class = self.thresholds.select(&definition);
        info!(class = class.as_str(), "movement class selected from definition");
        let query = self.builder.movement(class);
        let query = self.gate.enforce(query, role, region)?;
        debug!(sql = query.sql(), "executing movement query");
        let data = self.store.execute(query.sql()).await?;
        Ok(ResponseEnvelope::Hybrid { definition, data })
    }
}
