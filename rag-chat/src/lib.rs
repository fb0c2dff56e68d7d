pub mod agents;
pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod openai;
pub mod pipeline;
