//! Shared primitives for the supply-chain assistant.
//!
//! Every crate in the workspace speaks in terms of these types: the inbound
//! [`QueryRequest`], the classified [`Intent`], the [`CandidateQuery`] that must
//! clear the access chain, and the [`ResponseEnvelope`] handed back to callers.

pub mod envelope;
pub mod errors;
pub mod intent;
pub mod query;
pub mod request;

pub use envelope::{ResponseEnvelope, Row};
pub use errors::{Collaborator, CollaboratorError, DenialKind, DispatchError};
pub use intent::{DocumentTopic, Intent, IntentRoute};
pub use query::CandidateQuery;
pub use request::{DispatchId, QueryRequest, Role};
