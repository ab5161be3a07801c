use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Policy-document sub-topics answered from retrieved passages.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DocumentTopic {
    QualityReturns,
    SupplierCompliance,
    LogisticsSustainability,
    HazardousMaterials,
    RiskManagement,
}

impl DocumentTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentTopic::QualityReturns => "quality-returns",
            DocumentTopic::SupplierCompliance => "supplier-compliance",
            DocumentTopic::LogisticsSustainability => "logistics-sustainability",
            DocumentTopic::HazardousMaterials => "hazardous-materials",
            DocumentTopic::RiskManagement => "risk-management",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "quality-returns" => DocumentTopic::QualityReturns,
            "supplier-compliance" => DocumentTopic::SupplierCompliance,
            "logistics-sustainability" => DocumentTopic::LogisticsSustainability,
            "hazardous-materials" => DocumentTopic::HazardousMaterials,
            "risk-management" => DocumentTopic::RiskManagement,
            _ => return None,
        })
    }
}

/// Classified intent of a question.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Intent {
    SalesAggregation,
    OrderDistribution,
    CustomerRanking,
    ProfitMargin,
    InventoryMovement,
    AverageShippingDelay,
    DecliningSales,
    DeliveryPerformance,
    DocumentTopic(DocumentTopic),
    Unclassified,
}

/// Which branch of the dispatcher an intent travels.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IntentRoute {
    Structured,
    Hybrid,
    Document,
}

impl IntentRoute {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentRoute::Structured => "structured",
            IntentRoute::Hybrid => "hybrid",
            IntentRoute::Document => "document",
        }
    }
}

impl Intent {
    pub fn route(&self) -> IntentRoute {
        match self {
            Intent::InventoryMovement => IntentRoute::Hybrid,
            Intent::DocumentTopic(_) | Intent::Unclassified => IntentRoute::Document,
            _ => IntentRoute::Structured,
        }
    }

    pub fn tag(&self) -> String {
        match self {
            Intent::SalesAggregation => "sales-aggregation".into(),
            Intent::OrderDistribution => "order-distribution".into(),
            Intent::CustomerRanking => "customer-ranking".into(),
            Intent::ProfitMargin => "profit-margin".into(),
            Intent::InventoryMovement => "inventory-movement-classification".into(),
            Intent::AverageShippingDelay => "average-shipping-delay".into(),
            Intent::DecliningSales => "declining-sales".into(),
            Intent::DeliveryPerformance => "delivery-performance".into(),
            Intent::DocumentTopic(topic) => format!("document-topic:{}", topic.as_str()),
            Intent::Unclassified => "unclassified".into(),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let tag = raw.trim().to_ascii_lowercase();
        if let Some(topic) = tag.strip_prefix("document-topic:") {
            return DocumentTopic::from_tag(topic)
                .map(Intent::DocumentTopic)
                .ok_or_else(|| format!("unknown document topic: {topic}"));
        }
        Ok(match tag.as_str() {
            "sales-aggregation" => Intent::SalesAggregation,
            "order-distribution" => Intent::OrderDistribution,
            "customer-ranking" => Intent::CustomerRanking,
            "profit-margin" => Intent::ProfitMargin,
            "inventory-movement-classification" | "inventory-movement" => {
                Intent::InventoryMovement
            }
            "average-shipping-delay" => Intent::AverageShippingDelay,
            "declining-sales" => Intent::DecliningSales,
            "delivery-performance" => Intent::DeliveryPerformance,
            "unclassified" => Intent::Unclassified,
            other => return Err(format!("unknown intent: {other}")),
        })
    }
}

impl TryFrom<String> for Intent {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Intent> for String {
    fn from(value: Intent) -> Self {
        value.tag()
    }
}
