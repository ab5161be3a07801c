use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::errors::RouterConfigError;
use crate::rules::{IntentClassifier, IntentRuleSpec};
use crate::thresholds::ThresholdTable;

/// Routing tables: intent rules and movement thresholds.
#[derive(Debug, Clone, Default)]
pub struct RouterConfig {
    pub classifier: IntentClassifier,
    pub thresholds: ThresholdTable,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RouterConfigFile {
    #[serde(default)]
    intents: Option<Vec<IntentRuleSpec>>,
    #[serde(default)]
    thresholds: Option<ThresholdTable>,
}

impl RouterConfig {
    /// Sections left out of the document keep their built-in tables.
    pub fn from_yaml(raw: &str) -> Result<Self, RouterConfigError> {
        let file: RouterConfigFile =
            serde_yaml::from_str(raw).map_err(|err| RouterConfigError::Parse(err.to_string()))?;
        let classifier = match file.intents {
            Some(specs) => IntentClassifier::from_specs(specs)?,
            None => IntentClassifier::default(),
        };
        Ok(Self {
            classifier,
            thresholds: file.thresholds.unwrap_or_default(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, RouterConfigError> {
        let raw = fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)?;
        debug!(
            path = %path.display(),
            rules = config.classifier.rules().len(),
            markers = config.thresholds.markers.len(),
            "loaded router config"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::MovementClass;
    use supplychain_core_types::Intent;

    #[test]
    fn yaml_replaces_rule_table() {
        let config = RouterConfig::from_yaml(
            r#"
intents:
  - intent: delivery-performance
    any: ["late shipments"]
  - intent: sales-aggregation
    all: ["revenue", "overall"]
"#,
        )
        .unwrap();
        assert_eq!(
            config.classifier.classify("Which mode has late shipments?"),
            Intent::DeliveryPerformance
        );
        assert_eq!(
            config.classifier.classify("overall revenue"),
            Intent::SalesAggregation
        );
        assert_eq!(config.classifier.classify("total sales"), Intent::Unclassified);
        assert_eq!(config.thresholds, ThresholdTable::default());
    }

    #[test]
    fn yaml_overrides_thresholds_only() {
        let config = RouterConfig::from_yaml(
            r#"
thresholds:
  default: no-mover
  markers:
    - marker: "90 days"
      class: slow-moving
"#,
        )
        .unwrap();
        assert_eq!(config.thresholds.select("idle for 90 days"), MovementClass::SlowMoving);
        assert_eq!(config.thresholds.select("unspecified"), MovementClass::NoMover);
        assert_eq!(config.classifier.classify("total sales"), Intent::SalesAggregation);
    }

    #[test]
    fn rejects_ambiguous_rules() {
        let err = RouterConfig::from_yaml(
            r#"
intents:
  - intent: profit-margin
    any: ["margin"]
    all: ["profit"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, RouterConfigError::InvalidRule { index: 0, .. }));

        let err = RouterConfig::from_yaml("intents:\n  - intent: weather\n    any: [rain]\n")
            .unwrap_err();
        assert!(matches!(err, RouterConfigError::InvalidRule { .. }));
    }
}
