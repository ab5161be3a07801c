pub mod api;
pub mod defaults;
pub mod errors;
pub mod loader;
pub mod model;

pub use api::PolicyCenter;
pub use defaults::default_snapshot;
pub use errors::PolicyError;
pub use loader::{load_snapshot_with_options, parse_policy_str, LoadOptions};
pub use model::{AccessPolicy, GeoPolicy, PolicyDocument, PolicySnapshot, PolicySource};

#[cfg(test)]
mod tests;
