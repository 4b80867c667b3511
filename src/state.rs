//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::batch::{BatchRunner, BatchStore};
use crate::config::Settings;
use crate::estimator::{RuleBasedEstimator, SemanticEstimator};
use crate::profiling::ProfilingCache;
use crate::semantic::SemanticAnalyzer;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// One-table analysis pipeline (gate, classify, score, estimate, fuse)
    pub analyzer: Arc<SemanticAnalyzer>,

    /// Bounded worker pool for multi-table batches
    pub runner: BatchRunner,

    /// Batches started over the API
    pub batches: BatchStore,

    /// Profiling signals, shared with the analyzer
    pub profiling: ProfilingCache,

    pub settings: Settings,
}

impl AppState {
    /// Create state around an arbitrary estimator
    pub fn new(settings: Settings, estimator: Arc<dyn SemanticEstimator>) -> Self {
        let profiling = ProfilingCache::new();
        let analyzer = Arc::new(
            SemanticAnalyzer::new(estimator)
                .with_profiling(profiling.clone())
                .with_estimator_timeout(settings.analysis.estimator_timeout()),
        );
        let runner = BatchRunner::new(analyzer.clone(), settings.analysis.batch_concurrency);

        Self {
            analyzer,
            runner,
            batches: BatchStore::with_retention(settings.analysis.batch_retention),
            profiling,
            settings,
        }
    }

    /// Create state backed by the built-in rule-based estimator
    pub fn with_rule_based_estimator(settings: Settings) -> Self {
        let estimator =
            RuleBasedEstimator::new().with_latency(settings.analysis.estimator_latency());
        Self::new(settings, Arc::new(estimator))
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
