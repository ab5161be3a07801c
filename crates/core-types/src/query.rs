use serde::{Deserialize, Serialize};

use crate::intent::Intent;

/// Generated SQL that has not yet cleared the access chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateQuery {
    pub sql: String,
    pub intent: Intent,
}

impl CandidateQuery {
    pub fn new(sql: impl Into<String>, intent: Intent) -> Self {
        Self {
            sql: sql.into(),
            intent,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}
