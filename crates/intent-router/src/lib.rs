//! Question routing: which intent a question carries, and which fixed query
//! template answers it.

pub mod builder;
pub mod config;
pub mod errors;
pub mod modifiers;
pub mod rules;
pub mod thresholds;

pub use builder::SqlTemplateBuilder;
pub use config::RouterConfig;
pub use errors::RouterConfigError;
pub use modifiers::RegionLiteral;
pub use rules::{IntentClassifier, IntentRule, PhraseSet};
pub use thresholds::{MovementClass, ThresholdRule, ThresholdTable};
