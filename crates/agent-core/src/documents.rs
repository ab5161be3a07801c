use std::sync::Arc;

use supplychain_core_types::CollaboratorError;
use tracing::debug;

use crate::collaborators::{join_context, AnswerGenerator, PassageRetriever};
use crate::format::format_answer;

pub const DEFAULT_CONTEXT_PASSAGES: usize = 2;

/// Retrieve-then-generate answers for questions with no structured form.
#[derive(Clone)]
pub struct DocumentPipeline {
    retriever: Arc<dyn PassageRetriever>,
    generator: Arc<dyn AnswerGenerator>,
    context_passages: usize,
    format_answers: bool,
}

impl DocumentPipeline {
    pub fn new(retriever: Arc<dyn PassageRetriever>, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self {
            retriever,
            generator,
            context_passages: DEFAULT_CONTEXT_PASSAGES,
            format_answers: false,
        }
    }

    pub fn with_context_passages(mut self, passages: usize) -> Self {
        self.context_passages = passages.max(1);
        self
    }

    pub fn with_formatting(mut self, enabled: bool) -> Self {
        self.format_answers = enabled;
        self
    }

    pub async fn answer(&self, text: &str) -> Result<String, CollaboratorError> {
        let passages = self.retriever.similarity_search(text).await?;
        debug!(
            retrieved = passages.len(),
            used = passages.len().min(self.context_passages),
            "document context assembled"
        );
        let context = join_context(&passages, self.context_passages);
        let prompt = format!(
            "Use the context below to answer the question:\n{context}\n\nQuestion: {text}"
        );
        let answer = self.generator.generate(&prompt).await?;
        if self.format_answers {
            Ok(format_answer(&answer))
        } else {
            Ok(answer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::Passage;
    use crate::mock::{ScriptedGenerator, StaticRetriever};

    #[tokio::test]
    async fn prompt_uses_top_two_passages() {
        let retriever = Arc::new(StaticRetriever::new(vec![
            Passage::new("Store drums upright.", "hazmat.pdf"),
            Passage::new("Keep away from heat.", "hazmat.pdf"),
            Passage::new("Unrelated travel policy.", "travel.pdf"),
        ]));
        let generator = Arc::new(ScriptedGenerator::new("Store upright, away from heat."));
        let pipeline = DocumentPipeline::new(retriever.clone(), generator.clone());

        let answer = pipeline.answer("How do we store hazardous materials?").await.unwrap();
        assert_eq!(answer, "Store upright, away from heat.");
        assert_eq!(
            generator.prompts().await,
            vec![
                "Use the context below to answer the question:\nStore drums upright.\n\nKeep away from heat.\n\nQuestion: How do we store hazardous materials?"
                    .to_string()
            ]
        );
        assert_eq!(
            retriever.queries().await,
            vec!["How do we store hazardous materials?".to_string()]
        );
    }

    #[tokio::test]
    async fn retrieval_failure_propagates() {
        let pipeline = DocumentPipeline::new(
            Arc::new(StaticRetriever::failing("index unavailable")),
            Arc::new(ScriptedGenerator::new("unused")),
        );
        let err = pipeline.answer("anything").await.unwrap_err();
        assert_eq!(err, CollaboratorError::retrieval("index unavailable"));
    }

    #[tokio::test]
    async fn formatting_is_optional() {
        let pipeline = DocumentPipeline::new(
            Arc::new(StaticRetriever::default()),
            Arc::new(ScriptedGenerator::new("1. Inspect\nOwner: QA")),
        )
        .with_formatting(true);
        assert_eq!(
            pipeline.answer("returns?").await.unwrap(),
            "**1.** Inspect\n**Owner:** QA"
        );
    }
}
