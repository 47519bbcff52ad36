//! Core type definitions for datasets and evaluation

use serde::{Deserialize, Serialize};

/// Category predicted when a classifier returns no guess at all.
///
/// Single-guess evaluation keeps one predicted label per instance; an empty
/// prediction list maps to this placeholder so the confusion matrix still
/// accounts for the instance.
pub const NO_GUESS: &str = "null";

/// One dataset record: a piece of text and the category it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Raw input text (e.g. an issue label)
    pub input: String,
    /// Category the input maps to
    pub output: String,
}

impl Sample {
    /// Create a new sample
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Replayable classifier state captured by the model serializer.
///
/// Replay-based classifiers persist the samples they accepted; closed-form
/// classifiers persist their learned parameters as an opaque JSON value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TrainedState {
    /// Previously accepted training samples, in acceptance order
    Samples { samples: Vec<Sample> },
    /// Learned parameters for classifiers that cannot replay training
    Parameters { values: serde_json::Value },
}

impl TrainedState {
    /// State of a classifier that has never been trained
    pub fn empty() -> Self {
        Self::Samples {
            samples: Vec::new(),
        }
    }

    /// Number of samples carried by a replay-based state (0 otherwise)
    pub fn sample_count(&self) -> usize {
        match self {
            Self::Samples { samples } => samples.len(),
            Self::Parameters { .. } => 0,
        }
    }
}

/// Checkpoint notifications emitted by long-running operations.
///
/// Purely an observability hook; correctness never depends on a handler
/// being installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A cross-validation fold is about to train
    FoldStarted {
        fold: usize,
        train_size: usize,
        validation_size: usize,
    },
    /// A cross-validation fold finished evaluating
    FoldFinished { fold: usize },
    /// One evaluation instance classified out of `total`
    Evaluated { completed: usize, total: usize },
}

/// Boxed progress callback stored on a [`Learner`](crate::api::Learner)
pub type ProgressHandler = Box<dyn FnMut(ProgressEvent)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_construction() {
        let sample = Sample::new("breaking change", "code");
        assert_eq!(sample.input, "breaking change");
        assert_eq!(sample.output, "code");
    }

    #[test]
    fn test_trained_state_empty() {
        let state = TrainedState::empty();
        assert_eq!(state.sample_count(), 0);
        assert_eq!(
            state,
            TrainedState::Samples {
                samples: Vec::new()
            }
        );
    }

    #[test]
    fn test_trained_state_sample_count() {
        let state = TrainedState::Samples {
            samples: vec![Sample::new("bug", "bug"), Sample::new("docs", "doc")],
        };
        assert_eq!(state.sample_count(), 2);

        let params = TrainedState::Parameters {
            values: serde_json::json!({"weights": [0.5, 1.5]}),
        };
        assert_eq!(params.sample_count(), 0);
    }

    #[test]
    fn test_trained_state_json_tag() {
        let state = TrainedState::empty();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["kind"], "samples");
    }
}
