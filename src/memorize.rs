//! Replay-based baseline classifier
//!
//! Memorizes every accepted training sample and classifies by feature
//! fingerprint, so differently punctuated or cased variants of a known
//! input still resolve. Its trained state is exactly its past samples,
//! which makes it the reference implementation of the serializer's
//! round-trip contract. Real learning algorithms plug in through the same
//! [`Classifier`] trait from the outside.

use std::collections::HashMap;

use crate::core::{Classifier, FeatureExtractor, LearnError, Result, Sample, TrainedState};
use crate::extract;
use crate::persistence::BuilderDescriptor;

/// Registered kind name for [`MemorizingClassifier`]
pub const MEMORIZING: &str = "memorizing";

/// Classifier that replays its training history verbatim
pub struct MemorizingClassifier {
    extractor: Box<dyn FeatureExtractor>,
    samples: Vec<Sample>,
    /// Feature fingerprint -> indices into `samples`, in acceptance order
    index: HashMap<String, Vec<usize>>,
}

impl MemorizingClassifier {
    /// Create an untrained classifier
    pub fn new(extractor: Box<dyn FeatureExtractor>) -> Self {
        Self {
            extractor,
            samples: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a classifier pre-trained on past samples
    pub fn with_past_samples(extractor: Box<dyn FeatureExtractor>, samples: &[Sample]) -> Self {
        let mut classifier = Self::new(extractor);
        classifier.train(samples);
        classifier
    }

    /// Build from a descriptor, resolving the feature-extractor kind
    pub fn from_descriptor(descriptor: &BuilderDescriptor) -> Result<Self> {
        let extractor = extract::extractor_for(&descriptor.feature_extractor)?;
        Ok(Self::new(extractor))
    }

    /// Samples accepted so far, in acceptance order
    pub fn past_samples(&self) -> &[Sample] {
        &self.samples
    }

    fn fingerprint(&self, input: &str) -> String {
        let features: Vec<String> = self.extractor.extract(input).into_iter().collect();
        features.join("\u{1f}")
    }
}

impl Classifier for MemorizingClassifier {
    fn train(&mut self, batch: &[Sample]) {
        for sample in batch {
            let key = self.fingerprint(&sample.input);
            self.samples.push(sample.clone());
            self.index
                .entry(key)
                .or_default()
                .push(self.samples.len() - 1);
        }
    }

    fn classify(&self, input: &str) -> Vec<String> {
        let Some(indices) = self.index.get(&self.fingerprint(input)) else {
            return Vec::new();
        };
        let mut categories = Vec::new();
        for &idx in indices {
            let output = &self.samples[idx].output;
            if !categories.contains(output) {
                categories.push(output.clone());
            }
        }
        categories
    }

    fn back_classify(&self, category: &str) -> Vec<String> {
        let mut inputs = Vec::new();
        for sample in &self.samples {
            if sample.output == category && !inputs.contains(&sample.input) {
                inputs.push(sample.input.clone());
            }
        }
        inputs
    }

    fn export_state(&self) -> TrainedState {
        TrainedState::Samples {
            samples: self.samples.clone(),
        }
    }

    fn restore_state(&mut self, state: TrainedState) -> Result<()> {
        match state {
            TrainedState::Samples { samples } => {
                self.samples.clear();
                self.index.clear();
                self.train(&samples);
                Ok(())
            }
            TrainedState::Parameters { .. } => Err(LearnError::CorruptState(
                "replay-based classifier cannot restore learned parameters".to_string(),
            )),
        }
    }
}
