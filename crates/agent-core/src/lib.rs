//! Question dispatch.
//!
//! Turns a `QueryRequest` into exactly one `ResponseEnvelope` by routing it
//! through the structured, hybrid or document branch. Storage, retrieval and
//! generation backends are reached only through the traits in
//! [`collaborators`].

pub mod collaborators;
pub mod dispatcher;
pub mod documents;
pub mod format;
pub mod hybrid;
pub mod mock;

pub use collaborators::{AnswerGenerator, Passage, PassageRetriever, TabularStore};
pub use dispatcher::{DispatchReport, Dispatcher, DispatcherBuilder};
pub use documents::{DocumentPipeline, DEFAULT_CONTEXT_PASSAGES};
pub use format::format_answer;
pub use hybrid::{HybridResolver, DEFINITION_TOPIC};
