use serde::{Deserialize, Serialize};

/// Inventory movement bucket a definition maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementClass {
    NoMover,
    SlowMoving,
}

impl MovementClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementClass::NoMover => "no-mover",
            MovementClass::SlowMoving => "slow-moving",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub marker: String,
    pub class: MovementClass,
}

/// Literal marker lookup over a retrieved definition, with one fallback class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdTable {
    #[serde(default)]
    pub markers: Vec<ThresholdRule>,
    #[serde(default = "default_class")]
    pub default: MovementClass,
}

fn default_class() -> MovementClass {
    MovementClass::SlowMoving
}

impl ThresholdTable {
    /// First marker found in `definition` (case-insensitive), else the default.
    ///
    /// The whole definition is scanned and the question plays no part, so a
    /// definition that lists both buckets always yields the first table entry
    /// it mentions.
    pub fn select(&self, definition: &str) -> MovementClass {
        let haystack = definition.to_lowercase();
        self.markers
            .iter()
            .find(|rule| {
                let marker = rule.marker.trim().to_lowercase();
                !marker.is_empty() && haystack.contains(&marker)
            })
            .map(|rule| rule.class)
            .unwrap_or(self.default)
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            markers: vec![ThresholdRule {
                marker: "180 days".into(),
                class: MovementClass::NoMover,
            }],
            default: default_class(),
        }
    }
}
