pub mod app;
pub mod ask;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod load_data;
pub mod output;
pub mod policy;
pub mod runtime;
pub mod serve;
