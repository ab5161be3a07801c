use std::sync::Arc;

use access_gate::AccessGate;
use intent_router::{IntentClassifier, RouterConfig, SqlTemplateBuilder};
use supplychain_core_types::{
    DispatchError, DispatchId, Intent, IntentRoute, QueryRequest, ResponseEnvelope,
};
use supplychain_policy_center::PolicyCenter;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::collaborators::{AnswerGenerator, PassageRetriever, TabularStore};
use crate::documents::{DocumentPipeline, DEFAULT_CONTEXT_PASSAGES};
use crate::hybrid::HybridResolver;

/// Outcome of one dispatch with the routing facts callers report on.
#[derive(Clone, Debug)]
pub struct DispatchReport {
    pub dispatch_id: DispatchId,
    pub intent: Intent,
    pub envelope: ResponseEnvelope,
}

/// Routes each question to its branch and folds every outcome into one
/// envelope.
#[derive(Clone)]
pub struct Dispatcher {
    classifier: IntentClassifier,
    builder: SqlTemplateBuilder,
    gate: AccessGate,
    store: Arc<dyn TabularStore>,
    documents: DocumentPipeline,
    hybrid: HybridResolver,
}

impl Dispatcher {
    pub fn builder(
        store: Arc<dyn TabularStore>,
        retriever: Arc<dyn PassageRetriever>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> DispatcherBuilder {
        DispatcherBuilder {
            store,
            retriever,
            generator,
            policies: None,
            router: RouterConfig::default(),
            context_passages: DEFAULT_CONTEXT_PASSAGES,
            format_answers: false,
        }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Never fails; failures come back as an error envelope.
    pub async fn handle(&self, request: &QueryRequest) -> ResponseEnvelope {
        self.dispatch(request).await.envelope
    }

    pub async fn dispatch(&self, request: &QueryRequest) -> DispatchReport {
        let dispatch_id = DispatchId::new();
        let intent = self.classifier.classify(&request.text);
        let span = info_span!(
            "dispatch",
            dispatch_id = %dispatch_id,
            role = %request.role,
            intent = %intent,
        );
        let envelope = async {
            match self.route(intent, request).await {
                Ok(envelope) => {
                    info!(outcome = envelope.kind(), "dispatch finished");
                    envelope
                }
                Err(err) => {
                    match &err {
                        DispatchError::AccessDenied(kind) => {
                            warn!(outcome = "error", denial = ?kind, "dispatch denied")
                        }
                        DispatchError::Collaborator(failure) => warn!(
                            outcome = "error",
                            collaborator = %failure.collaborator,
                            error = %failure.message,
                            "dispatch failed"
                        ),
                    }
                    ResponseEnvelope::from(err)
                }
            }
        }
        .instrument(span)
        .await;
        DispatchReport {
            dispatch_id,
            intent,
            envelope,
        }
    }

    async fn route(
        &self,
        intent: Intent,
        request: &QueryRequest,
    ) -> Result<ResponseEnvelope, DispatchError> {
        match intent.route() {
            IntentRoute::Structured => match self.builder.build(intent, &request.text) {
                Some(query) => {
                    let query = self.gate.enforce(query, request.role, &request.region)?;
                    debug!(sql = query.sql(), "executing structured query");
                    let data = self.store.execute(query.sql()).await?;
                    Ok(ResponseEnvelope::Data { data })
                }
                None => self.answer_from_documents(&request.text).await,
            },
            IntentRoute::Hybrid => {
                self.hybrid
                    .resolve_definition_then_query(&request.text, &request.region, request.role)
                    .await
            }
            IntentRoute::Document => self.answer_from_documents(&request.text).await,
        }
    }

    async fn answer_from_documents(&self, text: &str) -> Result<ResponseEnvelope, DispatchError> {
        let answer = self.documents.answer(text).await?;
        Ok(ResponseEnvelope::Doc { answer })
    }
}

/// Wires collaborators, policy and routing tables into a [`Dispatcher`].
pub struct DispatcherBuilder {
    store: Arc<dyn TabularStore>,
    retriever: Arc<dyn PassageRetriever>,
    generator: Arc<dyn AnswerGenerator>,
    policies: Option<Arc<PolicyCenter>>,
    router: RouterConfig,
    context_passages: usize,
    format_answers: bool,
}

impl DispatcherBuilder {
    pub fn policies(mut self, policies: Arc<PolicyCenter>) -> Self {
        self.policies = Some(policies);
        self
    }

    pub fn router(mut self, router: RouterConfig) -> Self {
        self.router = router;
        self
    }

    pub fn context_passages(mut self, passages: usize) -> Self {
        self.context_passages = passages;
        self
    }

    pub fn format_answers(mut self, enabled: bool) -> Self {
        self.format_answers = enabled;
        self
    }

    pub fn build(self) -> Dispatcher {
        let policies = self.policies.unwrap_or_default();
        let gate = AccessGate::new(policies);
        let documents = DocumentPipeline::new(self.retriever.clone(), self.generator.clone())
            .with_context_passages(self.context_passages)
            .with_formatting(self.format_answers);
        let hybrid = HybridResolver::new(
            self.retriever,
            self.generator,
            self.store.clone(),
            gate.clone(),
            self.router.thresholds,
        )
        .with_context_passages(self.context_passages);
        Dispatcher {
            classifier: self.router.classifier,
            builder: SqlTemplateBuilder::new(),
            gate,
            store: self.store,
            documents,
            hybrid,
        }
    }
}
