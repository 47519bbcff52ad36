//! Text-label classification learning and evaluation toolkit
//!
//! Trains pluggable text classifiers that map short labels to categories
//! and evaluates them rigorously: a multi-class confusion matrix with
//! micro/macro/weighted statistics, deterministic dataset splitting,
//! k-fold cross-validation and reproducible model persistence.

pub mod api;
pub mod core;
pub mod crossval;
pub mod dataset;
pub mod extract;
pub mod matrix;
pub mod memorize;
pub mod persistence;
pub mod report;
pub mod split;

// Re-export main types for convenience
pub use crate::api::{CategoryPartition, Learner, LearnerBuilder, LearnerOverview};
pub use crate::core::error::{LearnError, Result};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::crossval::{cross_validate, AggregateStats, CrossValidationReport};
pub use crate::dataset::InMemoryDataset;
pub use crate::extract::WordExtractor;
pub use crate::matrix::{ClassRegistry, ConfusionMatrix, Metric};
pub use crate::memorize::MemorizingClassifier;
pub use crate::persistence::{
    BuilderDescriptor, ClassifierRegistry, ModelMetadata, PersistedModel,
};
pub use crate::report::{render, short_stats, stats, AverageKind, RenderOptions, StatsReport};
pub use crate::split::{split, TvtSplit};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
