//! Semantic Engine
//!
//! Classifies tables and their columns into business-semantic categories and
//! produces one fitness score per table. Data flows strictly top-down:
//!
//! 1. **Normalizer**: heterogeneous field records into [`FieldRecord`]
//! 2. **Gatekeeper**: PASS / REVIEW / REJECT eligibility with remediations
//! 3. **Classifier**: one role, confidence and sensitivity tier per field
//! 4. **Rule Scorer**: structural naming/behavior/comment score
//! 5. **Fusion**: rule + field + estimator into the final score
//! 6. **Statistics**: mutually exclusive buckets and review dimensions
//!
//! Everything except the estimator call in [`analyzer`] is pure.

pub mod analyzer;
pub mod classifier;
pub mod fusion;
pub mod gatekeeper;
pub mod normalizer;
pub mod rule_scorer;
pub mod statistics;
pub mod types;

pub use analyzer::{OverrideError, SemanticAnalyzer, TableInput};
pub use classifier::RoleClassifier;
pub use gatekeeper::Gatekeeper;
pub use normalizer::normalize_fields;
pub use rule_scorer::RuleScorer;
pub use statistics::{aggregate, AggregationContext};
pub use types::*;
