use std::fmt;

use thiserror::Error;

/// Which access filter refused the query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DenialKind {
    Geo,
    Role,
}

/// External services the core talks to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Collaborator {
    Storage,
    Retrieval,
    Generation,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Collaborator::Storage => "storage",
            Collaborator::Retrieval => "retrieval",
            Collaborator::Generation => "generation",
        })
    }
}

/// Failure reported by a storage, retrieval or generation backend.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{collaborator} failure: {message}")]
pub struct CollaboratorError {
    pub collaborator: Collaborator,
    pub message: String,
}

impl CollaboratorError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self {
            collaborator: Collaborator::Storage,
            message: message.into(),
        }
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self {
            collaborator: Collaborator::Retrieval,
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        Self {
            collaborator: Collaborator::Generation,
            message: message.into(),
        }
    }
}

/// Everything that can end a dispatch early. Converted to an error envelope
/// at the dispatcher boundary.
///
/// Access denials carry only the filter kind; their messages are fixed so the
/// caller never learns which phrase or table tripped the filter.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("{}", denial_message(.0))]
    AccessDenied(DenialKind),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

fn denial_message(kind: &DenialKind) -> &'static str {
    match kind {
        DenialKind::Geo => "Restricted by geographic access.",
        DenialKind::Role => "Access denied: Your role is not authorized for this data.",
    }
}
