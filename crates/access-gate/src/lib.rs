//! Access control chain for generated queries.
//!
//! Two independent, fail-closed filters run over the query text:
//! - geo-fence: restricted phrases may only be queried from their region
//! - role: the query must touch at least one domain the role is granted
//!
//! Both filters return the query unchanged when it passes.

pub mod chain;
pub mod errors;
pub mod filters;

pub use chain::AccessGate;
pub use errors::AccessDenied;
pub use filters::{enforce_geo, enforce_rbac};
