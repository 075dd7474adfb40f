//! Standalone evaluation of a [`Policy`](crate::Policy).
mod base;
mod config;
pub use base::Evaluator;
pub use config::EvaluatorConfig;
