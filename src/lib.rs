//! Supply-chain analytics assistant.
//!
//! Exposes the runtime pieces (configuration, collaborators, HTTP router) for
//! the binary and for integration tests.

pub mod app_context;
pub mod config;
pub mod llm;
pub mod loader;
pub mod metrics;
pub mod retrieval;
pub mod server;
pub mod storage;

pub use app_context::AppContext;
pub use config::AppConfig;
