//! In-memory dataset store
//!
//! Owns an ordered list of samples and derives the closed category list
//! from them. Order is preserved everywhere; nothing here ever shuffles.

use crate::core::{DatasetSource, Sample};

/// Dataset held fully in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryDataset {
    samples: Vec<Sample>,
}

impl InMemoryDataset {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Build from (input, output) pairs
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(input, output)| Sample::new(input, output))
                .collect(),
        )
    }

    /// All inputs, in dataset order
    pub fn inputs(&self) -> Vec<&str> {
        self.samples.iter().map(|s| s.input.as_str()).collect()
    }

    /// All outputs, in dataset order (duplicates included)
    pub fn outputs(&self) -> Vec<&str> {
        self.samples.iter().map(|s| s.output.as_str()).collect()
    }

    /// Distinct categories in first-seen order; empty categories are skipped
    pub fn distinct_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for sample in &self.samples {
            if !sample.output.is_empty() && !categories.iter().any(|c| c == &sample.output) {
                categories.push(sample.output.clone());
            }
        }
        categories
    }

    /// Samples belonging to `category`, in dataset order
    pub fn samples_for_category(&self, category: &str) -> Vec<&Sample> {
        self.samples
            .iter()
            .filter(|s| s.output == category)
            .collect()
    }

    /// Records with no category at all
    pub fn uncategorised(&self) -> Vec<&Sample> {
        self.samples.iter().filter(|s| s.output.is_empty()).collect()
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }
}

impl DatasetSource for InMemoryDataset {
    fn samples(&self) -> Vec<Sample> {
        self.samples.clone()
    }

    fn classes(&self) -> Vec<String> {
        self.distinct_categories()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
