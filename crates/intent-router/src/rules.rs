use serde::Deserialize;
use supplychain_core_types::{DocumentTopic, Intent};
use tracing::trace;

use crate::errors::RouterConfigError;

/// Phrases a question must contain for a rule to fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhraseSet {
    Any(Vec<String>),
    All(Vec<String>),
}

impl PhraseSet {
    pub fn any<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Any(normalize_all(phrases))
    }

    pub fn all<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::All(normalize_all(phrases))
    }

    /// `haystack` must already be lower-cased.
    fn matches(&self, haystack: &str) -> bool {
        match self {
            Self::Any(phrases) => phrases.iter().any(|phrase| haystack.contains(phrase.as_str())),
            Self::All(phrases) => {
                !phrases.is_empty() && phrases.iter().all(|phrase| haystack.contains(phrase.as_str()))
            }
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Any(phrases) | Self::All(phrases) => phrases.is_empty(),
        }
    }
}

fn normalize_all<I, S>(phrases: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    phrases
        .into_iter()
        .map(|phrase| phrase.as_ref().trim().to_lowercase())
        .filter(|phrase| !phrase.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRule {
    pub phrases: PhraseSet,
    pub intent: Intent,
}

impl IntentRule {
    pub fn new(phrases: PhraseSet, intent: Intent) -> Self {
        Self { phrases, intent }
    }
}

/// Ordered phrase rules; the first satisfied rule decides the intent.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl IntentClassifier {
    pub fn new(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    pub fn classify(&self, text: &str) -> Intent {
        let haystack = text.to_lowercase();
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.phrases.matches(&haystack) {
                trace!(rule = index, intent = %rule.intent, "intent rule matched");
                return rule.intent;
            }
        }
        Intent::Unclassified
    }

    pub(crate) fn from_specs(specs: Vec<IntentRuleSpec>) -> Result<Self, RouterConfigError> {
        let rules = specs
            .into_iter()
            .enumerate()
            .map(|(index, spec)| spec.into_rule(index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        use DocumentTopic::*;
        Self::new(vec![
            IntentRule::new(
                PhraseSet::any(["total sales", "sales amount"]),
                Intent::SalesAggregation,
            ),
            IntentRule::new(
                PhraseSet::all(["distribution of orders", "segment"]),
                Intent::OrderDistribution,
            ),
            IntentRule::new(PhraseSet::any(["top 10 customers"]), Intent::CustomerRanking),
            IntentRule::new(PhraseSet::any(["highest profit margin"]), Intent::ProfitMargin),
            IntentRule::new(
                PhraseSet::any(["slow-moving", "no-mover"]),
                Intent::InventoryMovement,
            ),
            IntentRule::new(
                PhraseSet::all(["average time", "shipping date"]),
                Intent::AverageShippingDelay,
            ),
            IntentRule::new(PhraseSet::any(["declining sales"]), Intent::DecliningSales),
            IntentRule::new(PhraseSet::any(["on-time deliveries"]), Intent::DeliveryPerformance),
            IntentRule::new(
                PhraseSet::any(["quality-related returns"]),
                Intent::DocumentTopic(QualityReturns),
            ),
            IntentRule::new(
                PhraseSet::any(["supplier", "ethical", "code of conduct", "kpi"]),
                Intent::DocumentTopic(SupplierCompliance),
            ),
            IntentRule::new(
                PhraseSet::any(["logistics", "sustainability", "returns"]),
                Intent::DocumentTopic(LogisticsSustainability),
            ),
            IntentRule::new(
                PhraseSet::any(["hazardous materials"]),
                Intent::DocumentTopic(HazardousMaterials),
            ),
            IntentRule::new(
                PhraseSet::any(["risk tolerance", "risk management"]),
                Intent::DocumentTopic(RiskManagement),
            ),
        ])
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct IntentRuleSpec {
    intent: String,
    #[serde(default)]
    any: Vec<String>,
    #[serde(default)]
    all: Vec<String>,
}

impl IntentRuleSpec {
    fn into_rule(self, index: usize) -> Result<IntentRule, RouterConfigError> {
        let intent: Intent = self
            .intent
            .parse()
            .map_err(|reason| RouterConfigError::InvalidRule { index, reason })?;
        let phrases = match (self.any.is_empty(), self.all.is_empty()) {
            (false, true) => PhraseSet::any(self.any),
            (true, false) => PhraseSet::all(self.all),
            (false, false) => {
                return Err(RouterConfigError::InvalidRule {
                    index,
                    reason: "use either `any` or `all`, not both".into(),
                })
            }
            (true, true) => {
                return Err(RouterConfigError::InvalidRule {
                    index,
                    reason: "rule has no phrases".into(),
                })
            }
        };
        if phrases.is_empty() {
            return Err(RouterConfigError::InvalidRule {
                index,
                reason: "phrases are blank".into(),
            });
        }
        Ok(IntentRule::new(phrases, intent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_follows_priority() {
        let classifier = IntentClassifier::default();
        let cases = [
            ("What is the total sales southwest?", Intent::SalesAggregation),
            (
                "Show the distribution of orders by customer segment",
                Intent::OrderDistribution,
            ),
            ("Show top 10 customers by total order value", Intent::CustomerRanking),
            ("Which products have the highest profit margin?", Intent::ProfitMargin),
            ("Classify no-mover inventory", Intent::InventoryMovement),
            (
                "What is the average time between order date and shipping date?",
                Intent::AverageShippingDelay,
            ),
            ("Which categories show declining sales?", Intent::DecliningSales),
            ("Which mode has the fewest on-time deliveries?", Intent::DeliveryPerformance),
            (
                "How are quality-related returns handled?",
                Intent::DocumentTopic(DocumentTopic::QualityReturns),
            ),
            (
                "What is our supplier code of conduct?",
                Intent::DocumentTopic(DocumentTopic::SupplierCompliance),
            ),
            (
                "Describe the policy on hazardous materials storage",
                Intent::DocumentTopic(DocumentTopic::HazardousMaterials),
            ),
            (
                "What is our risk tolerance?",
                Intent::DocumentTopic(DocumentTopic::RiskManagement),
            ),
            ("Tell me a joke", Intent::Unclassified),
        ];
        for (text, expected) in cases {
            assert_eq!(classifier.classify(text), expected, "{text}");
        }
    }

    #[test]
    fn earlier_rule_wins_on_overlap() {
        let classifier = IntentClassifier::default();
        // matches both sales-aggregation and the supplier topic
        assert_eq!(
            classifier.classify("total sales per supplier"),
            Intent::SalesAggregation
        );
        // quality-related returns precedes the generic returns rule
        assert_eq!(
            classifier.classify("QUALITY-RELATED RETURNS process"),
            Intent::DocumentTopic(DocumentTopic::QualityReturns)
        );
    }

    #[test]
    fn all_of_requires_every_phrase() {
        let classifier = IntentClassifier::default();
        assert_eq!(
            classifier.classify("What is the average time to ship?"),
            Intent::Unclassified
        );
    }

    #[test]
    fn empty_all_set_never_matches() {
        assert!(!PhraseSet::All(Vec::new()).matches("anything"));
    }
}
