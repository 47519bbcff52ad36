//! High-level learner API
//!
//! Ties the engine together: deterministic dataset splitting, training an
//! external classifier capability, held-out evaluation into a confusion
//! matrix, k-fold cross-validation and model persistence.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use labelearn::api::Learner;
//! use labelearn::Sample;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = vec![
//!     Sample::new("browser bug", "bug"),
//!     Sample::new("breaking change", "code"),
//!     // ...
//! ];
//! let mut learner = Learner::builder().dataset(dataset).build()?;
//! learner.train();
//! let stats = learner.evaluate()?;
//! println!("accuracy: {:?}", stats.micro_avg.accuracy);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::core::{
    Classifier, DatasetSource, LearnError, ProgressEvent, ProgressHandler, Result, Sample,
    NO_GUESS,
};
use crate::crossval::{self, AggregateStats, CrossValidationReport};
use crate::matrix::ConfusionMatrix;
use crate::persistence::{self, BuilderDescriptor, ClassifierRegistry, PersistedModel};
use crate::report::{self, StatsReport};
use crate::split;

/// Per-category sample counts across the dataset partitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryPartition {
    pub overall: usize,
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

/// Snapshot of a cross-validated learner: aggregate quality plus partition
/// bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerOverview {
    pub micro_avg: AggregateStats,
    pub total_count: usize,
    pub train_count: usize,
    pub validation_count: usize,
    pub test_count: usize,
    pub category_partition: BTreeMap<String, CategoryPartition>,
}

/// Builder for [`Learner`]
pub struct LearnerBuilder {
    dataset: Vec<Sample>,
    splits: (f64, f64),
    classes: Option<Vec<String>>,
    descriptor: BuilderDescriptor,
    registry: Option<ClassifierRegistry>,
    progress: Option<ProgressHandler>,
}

impl Default for LearnerBuilder {
    fn default() -> Self {
        Self {
            dataset: Vec::new(),
            splits: (0.7, 0.15),
            classes: None,
            descriptor: BuilderDescriptor::default(),
            registry: None,
            progress: None,
        }
    }
}

impl LearnerBuilder {
    /// Use an owned dataset
    pub fn dataset(mut self, dataset: Vec<Sample>) -> Self {
        self.dataset = dataset;
        self
    }

    /// Pull both samples and the closed class list from a source
    pub fn source(mut self, source: &dyn DatasetSource) -> Self {
        self.dataset = source.samples();
        self.classes = Some(source.classes());
        self
    }

    /// Train/validation split ratios (test is the remainder)
    pub fn splits(mut self, train_ratio: f64, validation_ratio: f64) -> Self {
        self.splits = (train_ratio, validation_ratio);
        self
    }

    /// Closed category list; derived from the dataset when omitted
    pub fn classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = Some(classes.into_iter().map(Into::into).collect());
        self
    }

    /// Classifier recipe (defaults to the built-in replay classifier)
    pub fn descriptor(mut self, descriptor: BuilderDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Registry used to resolve the descriptor, now and on model load
    pub fn registry(mut self, registry: ClassifierRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Observability hook for evaluation/cross-validation checkpoints
    pub fn on_progress(mut self, handler: ProgressHandler) -> Self {
        self.progress = Some(handler);
        self
    }

    /// Split the dataset and construct the classifier
    pub fn build(self) -> Result<Learner> {
        let (train_ratio, validation_ratio) = self.splits;
        let parts = split::split(&self.dataset, train_ratio, validation_ratio)?;
        let classes = self.classes.unwrap_or_else(|| {
            let mut derived: Vec<String> = Vec::new();
            for sample in &self.dataset {
                if !sample.output.is_empty() && !derived.iter().any(|c| c == &sample.output) {
                    derived.push(sample.output.clone());
                }
            }
            derived
        });
        let registry = self.registry.unwrap_or_default();
        let classifier = registry.build(&self.descriptor)?;
        Ok(Learner {
            dataset: self.dataset,
            splits: self.splits,
            train_set: parts.train,
            validation_set: parts.validation,
            test_set: parts.test,
            classes,
            descriptor: self.descriptor,
            registry,
            classifier,
            confusion: None,
            cross_validation: None,
            progress: self.progress,
        })
    }
}

/// Classification-based learner over a fixed dataset
pub struct Learner {
    dataset: Vec<Sample>,
    splits: (f64, f64),
    train_set: Vec<Sample>,
    validation_set: Vec<Sample>,
    test_set: Vec<Sample>,
    classes: Vec<String>,
    descriptor: BuilderDescriptor,
    registry: ClassifierRegistry,
    classifier: Box<dyn Classifier>,
    confusion: Option<ConfusionMatrix>,
    cross_validation: Option<CrossValidationReport>,
    progress: Option<ProgressHandler>,
}

impl Learner {
    pub fn builder() -> LearnerBuilder {
        LearnerBuilder::default()
    }

    /// Train the classifier on the learner's training set
    pub fn train(&mut self) {
        self.classifier.train(&self.train_set);
    }

    /// Train the classifier on an arbitrary batch
    pub fn train_on(&mut self, batch: &[Sample]) {
        self.classifier.train(batch);
    }

    pub fn classify(&self, input: &str) -> Vec<String> {
        self.classifier.classify(input)
    }

    pub fn back_classify(&self, category: &str) -> Vec<String> {
        self.classifier.back_classify(category)
    }

    /// Evaluate the classifier over the held-out test set.
    ///
    /// Each instance contributes its first guess (or the no-guess
    /// placeholder) to a fresh confusion matrix over the learner's classes.
    /// The matrix is kept for later rendering; the long-stats report is
    /// returned.
    pub fn evaluate(&mut self) -> Result<StatsReport> {
        let total = self.test_set.len();
        let mut actual = Vec::with_capacity(total);
        let mut predicted = Vec::with_capacity(total);
        for (idx, sample) in self.test_set.iter().enumerate() {
            let predictions = self.classifier.classify(&sample.input);
            let guess = predictions
                .into_iter()
                .next()
                .unwrap_or_else(|| NO_GUESS.to_string());
            actual.push(sample.output.clone());
            predicted.push(guess);
            if let Some(handler) = self.progress.as_mut() {
                handler(ProgressEvent::Evaluated {
                    completed: idx + 1,
                    total,
                });
            }
        }
        let matrix = ConfusionMatrix::from_data(&actual, &predicted, &self.classes)?;
        let stats = report::stats(&matrix);
        self.confusion = Some(matrix);
        Ok(stats)
    }

    /// K-fold cross-validation over train + validation data.
    ///
    /// The held-out test set is never touched; every fold gets a fresh
    /// classifier built from the learner's descriptor.
    pub fn cross_validate(&mut self, folds: usize) -> Result<CrossValidationReport> {
        let mut pool = Vec::with_capacity(self.train_set.len() + self.validation_set.len());
        pool.extend_from_slice(&self.train_set);
        pool.extend_from_slice(&self.validation_set);

        let registry = &self.registry;
        let descriptor = &self.descriptor;
        let factory = || registry.build(descriptor);
        let progress = self
            .progress
            .as_mut()
            .map(|handler| handler.as_mut() as &mut dyn FnMut(ProgressEvent));
        let result = crossval::cross_validate(&pool, folds, factory, &self.classes, progress)?;
        self.cross_validation = Some(result.clone());
        Ok(result)
    }

    /// Per-category overall/train/validation/test counts
    pub fn category_partition(&self) -> BTreeMap<String, CategoryPartition> {
        let mut partition: BTreeMap<String, CategoryPartition> = self
            .classes
            .iter()
            .map(|class| (class.clone(), CategoryPartition::default()))
            .collect();
        let subsets: [(&[Sample], fn(&mut CategoryPartition) -> &mut usize); 4] = [
            (&self.dataset, |p| &mut p.overall),
            (&self.train_set, |p| &mut p.train),
            (&self.validation_set, |p| &mut p.validation),
            (&self.test_set, |p| &mut p.test),
        ];
        for (samples, field) in subsets {
            for sample in samples {
                *field(partition.entry(sample.output.clone()).or_default()) += 1;
            }
        }
        partition
    }

    /// Write the category partition as pretty-printed JSON
    pub fn save_category_partition<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref()).map_err(LearnError::IoError)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.category_partition())
            .map_err(|e| LearnError::SerializationError(e.to_string()))?;
        writer.flush().map_err(LearnError::IoError)?;
        Ok(())
    }

    /// Aggregate quality + partition snapshot; available once
    /// [`cross_validate`](Self::cross_validate) has run
    pub fn overview(&self) -> Option<LearnerOverview> {
        let cross_validation = self.cross_validation.as_ref()?;
        Some(LearnerOverview {
            micro_avg: cross_validation.micro_avg,
            total_count: self.dataset.len(),
            train_count: self.train_set.len(),
            validation_count: self.validation_set.len(),
            test_count: self.test_set.len(),
            category_partition: self.category_partition(),
        })
    }

    /// Persist the classifier (recipe + trained state) to `path`
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::serialize(self.classifier.as_ref(), &self.descriptor).save_to_file(path)
    }

    /// Replace the classifier with one loaded from `path`
    pub fn load_model<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let model = PersistedModel::load_from_file(path)?;
        self.classifier = persistence::deserialize(&model, &self.registry)?;
        self.descriptor = model.builder;
        Ok(())
    }

    pub fn dataset(&self) -> &[Sample] {
        &self.dataset
    }

    pub fn splits(&self) -> (f64, f64) {
        self.splits
    }

    pub fn train_set(&self) -> &[Sample] {
        &self.train_set
    }

    pub fn validation_set(&self) -> &[Sample] {
        &self.validation_set
    }

    pub fn test_set(&self) -> &[Sample] {
        &self.test_set
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Matrix from the most recent [`evaluate`](Self::evaluate) run
    pub fn confusion_matrix(&self) -> Option<&ConfusionMatrix> {
        self.confusion.as_ref()
    }

    /// Report from the most recent [`cross_validate`](Self::cross_validate)
    /// run
    pub fn cross_validation(&self) -> Option<&CrossValidationReport> {
        self.cross_validation.as_ref()
    }
}
