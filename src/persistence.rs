//! Model serialization and persistence
//!
//! A persisted model is a reproducible recipe, never code: a builder
//! descriptor naming the classifier and feature-extractor kinds (plus
//! hyperparameters), and the trained state needed to reconstruct
//! equivalent behavior. Descriptors resolve through a registry of builder
//! functions at load time.

use std::collections::{BTreeMap, HashMap};
use std::fs::{rename, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Classifier, LearnError, Result, TrainedState};
use crate::extract::WORD_EXTRACTOR;
use crate::memorize::{MemorizingClassifier, MEMORIZING};

/// Reproducible recipe for constructing a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderDescriptor {
    /// Registered classifier kind
    pub classifier: String,
    /// Registered feature-extractor kind
    pub feature_extractor: String,
    /// Kind-specific knobs (e.g. retrain counts, regularization constants)
    #[serde(default)]
    pub hyperparameters: BTreeMap<String, serde_json::Value>,
}

impl BuilderDescriptor {
    pub fn new(classifier: impl Into<String>, feature_extractor: impl Into<String>) -> Self {
        Self {
            classifier: classifier.into(),
            feature_extractor: feature_extractor.into(),
            hyperparameters: BTreeMap::new(),
        }
    }
}

impl Default for BuilderDescriptor {
    fn default() -> Self {
        Self::new(MEMORIZING, WORD_EXTRACTOR)
    }
}

/// Model metadata for tracking and validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Number of samples carried by the trained state
    pub sample_count: usize,
}

/// On-disk representation of a trained classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedModel {
    /// Which classifier/feature-extractor configuration produced the model
    #[serde(rename = "constructorDescription")]
    pub builder: BuilderDescriptor,
    /// Replayable samples or learned parameters
    pub trained_state: TrainedState,
    pub metadata: ModelMetadata,
}

impl PersistedModel {
    /// Save as pretty-printed JSON.
    ///
    /// The document is written to a sibling temp file and renamed into
    /// place, so a concurrent reader never observes a half-written model.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let staging = path.with_extension("tmp");
        {
            let file = File::create(&staging).map_err(LearnError::IoError)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, self)
                .map_err(|e| LearnError::SerializationError(e.to_string()))?;
            writer.flush().map_err(LearnError::IoError)?;
        }
        rename(&staging, path).map_err(LearnError::IoError)?;
        log::debug!("saved model to {}", path.display());
        Ok(())
    }

    /// Load a previously saved model
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(LearnError::IoError)?;
        let reader = BufReader::new(file);
        let model =
            serde_json::from_reader(reader).map_err(|e| LearnError::CorruptState(e.to_string()))?;
        Ok(model)
    }
}

/// Capture a classifier's state alongside its construction recipe
pub fn serialize(classifier: &dyn Classifier, builder: &BuilderDescriptor) -> PersistedModel {
    let trained_state = classifier.export_state();
    PersistedModel {
        metadata: ModelMetadata {
            library_version: crate::VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            sample_count: trained_state.sample_count(),
        },
        builder: builder.clone(),
        trained_state,
    }
}

/// Rebuild a classifier from a persisted model via `registry`
pub fn deserialize(
    model: &PersistedModel,
    registry: &ClassifierRegistry,
) -> Result<Box<dyn Classifier>> {
    let mut classifier = registry.build(&model.builder)?;
    classifier.restore_state(model.trained_state.clone())?;
    Ok(classifier)
}

/// Builder function resolved from a descriptor's classifier kind
pub type BuilderFn = Box<dyn Fn(&BuilderDescriptor) -> Result<Box<dyn Classifier>> + Send + Sync>;

/// Registry mapping classifier kind names to builder functions.
///
/// The default registry knows the built-in replay-based classifier;
/// external learners register their own kinds.
pub struct ClassifierRegistry {
    builders: HashMap<String, BuilderFn>,
}

impl ClassifierRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Register (or replace) a builder for `kind`
    pub fn register(&mut self, kind: impl Into<String>, builder: BuilderFn) {
        self.builders.insert(kind.into(), builder);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    /// Construct a fresh, untrained classifier for `descriptor`
    pub fn build(&self, descriptor: &BuilderDescriptor) -> Result<Box<dyn Classifier>> {
        let builder = self
            .builders
            .get(&descriptor.classifier)
            .ok_or_else(|| LearnError::MissingBuilder(descriptor.classifier.clone()))?;
        builder(descriptor)
    }
}

impl Default for ClassifierRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(
            MEMORIZING,
            Box::new(|descriptor: &BuilderDescriptor| {
                Ok(Box::new(MemorizingClassifier::from_descriptor(descriptor)?)
                    as Box<dyn Classifier>)
            }),
        );
        registry
    }
}
