use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DispatchError;

/// One result row keyed by column name, in SELECT order.
pub type Row = Map<String, Value>;

/// The single outcome of a dispatch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponseEnvelope {
    Data { data: Vec<Row> },
    Doc { answer: String },
    Hybrid { definition: String, data: Vec<Row> },
    Error { message: String },
}

impl ResponseEnvelope {
    pub fn kind(&self) -> &'static str {
        match self {
            ResponseEnvelope::Data { .. } => "data",
            ResponseEnvelope::Doc { .. } => "doc",
            ResponseEnvelope::Hybrid { .. } => "hybrid",
            ResponseEnvelope::Error { .. } => "error",
        }
    }
}

impl From<DispatchError> for ResponseEnvelope {
    fn from(err: DispatchError) -> Self {
        ResponseEnvelope::Error {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DenialKind;
    use serde_json::json;

    #[test]
    fn serializes_with_type_tag() {
        let mut row = Row::new();
        row.insert("total_sales".into(), json!(42.5));
        let envelope = ResponseEnvelope::Hybrid {
            definition: "No-movers: 180 days".into(),
            data: vec![row],
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["type"], "hybrid");
        assert_eq!(value["definition"], "No-movers: 180 days");
        assert_eq!(value["data"][0]["total_sales"], 42.5);
    }

    #[test]
    fn error_envelope_uses_display_message() {
        let envelope: ResponseEnvelope = DispatchError::AccessDenied(DenialKind::Geo).into();
        assert_eq!(envelope.kind(), "error");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["message"], "Restricted by geographic access.");
    }
}
