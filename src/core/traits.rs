//! Capability traits consumed by the evaluation core

use std::collections::BTreeSet;

use crate::core::{Result, Sample, TrainedState};

/// A trainable text classifier.
///
/// Learning algorithms themselves live outside the core; anything that can
/// accept training batches and guess categories plugs in through this trait.
pub trait Classifier {
    /// Train on a batch of samples. Training is cumulative: repeated calls
    /// extend what the classifier has seen.
    fn train(&mut self, batch: &[Sample]);

    /// Classify an input, returning 0, 1 or many predicted categories in
    /// preference order.
    fn classify(&self, input: &str) -> Vec<String>;

    /// Inputs historically mapped to `category`, if the classifier tracks
    /// them.
    fn back_classify(&self, _category: &str) -> Vec<String> {
        Vec::new()
    }

    /// Capture the state needed to reconstruct equivalent behavior.
    fn export_state(&self) -> TrainedState;

    /// Restore previously exported state, replacing anything learned so far.
    ///
    /// Fails with `CorruptState` when the state shape doesn't match the
    /// classifier kind.
    fn restore_state(&mut self, state: TrainedState) -> Result<()>;
}

/// Pure text-to-features mapping, opaque to the evaluation core.
pub trait FeatureExtractor {
    /// Extract the set of feature keys present in `text`
    fn extract(&self, text: &str) -> BTreeSet<String>;
}

/// Supplier of an ordered dataset and its closed category list.
pub trait DatasetSource {
    /// All samples, in their original order
    fn samples(&self) -> Vec<Sample>;

    /// The closed list of known categories
    fn classes(&self) -> Vec<String>;

    /// Number of samples
    fn len(&self) -> usize;

    /// Check if the source holds no samples
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
