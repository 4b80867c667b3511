//! SemanticFlow - table semantic classification engine
//!
//! Decides, per table, whether it is a business object worth modeling and
//! how confident that decision is. Each table goes through a gatekeeper, a
//! field role classifier, a structural rule scorer and an external semantic
//! estimator; the scores are fused and the fields summarized into review
//! statistics. Batches fan out over a bounded worker pool.

pub mod batch;
pub mod config;
pub mod error;
pub mod estimator;
pub mod models;
pub mod profiling;
pub mod routes;
pub mod semantic;
pub mod state;

pub use batch::{BatchRunner, BatchSnapshot};
pub use estimator::{EstimatorError, SemanticEstimator};
pub use semantic::{SemanticAnalyzer, TableInput, TableSemanticProfile};
