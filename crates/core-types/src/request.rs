use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Caller role. Anything outside the closed set collapses to `Unrecognized`,
/// which never carries permissions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Finance,
    #[serde(alias = "planner")]
    Planning,
    #[serde(alias = "operations", alias = "manager")]
    OperationsManager,
    Unrecognized,
}

impl Role {
    pub const KNOWN: [Role; 3] = [Role::Finance, Role::Planning, Role::OperationsManager];

    /// Parse the free-form role label supplied by the transport layer.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ");
        match normalized.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "finance" => Role::Finance,
            "planning" | "planner" => Role::Planning,
            "operations manager" | "operations" | "manager" => Role::OperationsManager,
            _ => Role::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Finance => "finance",
            Role::Planning => "planning",
            Role::OperationsManager => "operations_manager",
            Role::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analytics question, immutable for the duration of a dispatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub text: String,
    pub role: Role,
    pub region: String,
}

impl QueryRequest {
    pub fn new(text: impl Into<String>, role: &str, region: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: Role::parse(role),
            region: region.into(),
        }
    }
}

/// Correlation id attached to every dispatch span.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DispatchId(pub String);

impl DispatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
