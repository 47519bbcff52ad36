//! Deterministic train/validation/test dataset partitioning
//!
//! Reproducibility takes precedence over statistical balance: slices are
//! contiguous and order-preserving, and nothing is ever shuffled. Callers
//! wanting randomized or stratified splits shuffle the dataset first.

use crate::core::{LearnError, Result};

/// Result of a train/validation/test split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TvtSplit<T> {
    pub train: Vec<T>,
    pub validation: Vec<T>,
    pub test: Vec<T>,
}

impl<T> TvtSplit<T> {
    /// Total number of elements across the three subsets
    pub fn len(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `dataset` into contiguous train/validation/test slices.
///
/// Train and validation counts are rounded from their ratios; the test set
/// is the remainder, so the three counts always sum to the dataset length
/// exactly.
pub fn split<T: Clone>(
    dataset: &[T],
    train_ratio: f64,
    validation_ratio: f64,
) -> Result<TvtSplit<T>> {
    for (name, ratio) in [("train", train_ratio), ("validation", validation_ratio)] {
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(LearnError::InvalidParameter(format!(
                "{name} ratio must be a non-negative number, got: {ratio}"
            )));
        }
    }

    let n = dataset.len();
    let train_count = (n as f64 * train_ratio).round() as usize;
    let validation_count = (n as f64 * validation_ratio).round() as usize;
    if train_count + validation_count > n {
        return Err(LearnError::InvalidParameter(format!(
            "split ratios [{train_ratio}, {validation_ratio}] exceed the dataset ({n} samples)"
        )));
    }

    Ok(TvtSplit {
        train: dataset[..train_count].to_vec(),
        validation: dataset[train_count..train_count + validation_count].to_vec(),
        test: dataset[train_count + validation_count..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_ratios() {
        let dataset: Vec<usize> = (0..60).collect();
        let split = split(&dataset, 0.7, 0.15).unwrap();
        assert_eq!(split.train.len(), 42);
        assert_eq!(split.validation.len(), 9);
        assert_eq!(split.test.len(), 9);
    }

    #[test]
    fn test_no_validation_set() {
        let dataset: Vec<usize> = (0..60).collect();
        let split = split(&dataset, 0.8, 0.0).unwrap();
        assert_eq!(split.train.len(), 48);
        assert_eq!(split.validation.len(), 0);
        assert_eq!(split.test.len(), 12);
    }

    #[test]
    fn test_counts_always_sum_to_len() {
        for n in [0usize, 1, 2, 7, 13, 59, 100] {
            let dataset: Vec<usize> = (0..n).collect();
            let split = split(&dataset, 0.7, 0.15).unwrap();
            assert_eq!(split.len(), n, "partition must cover all {n} elements");
        }
    }

    #[test]
    fn test_order_preserved_and_contiguous() {
        let dataset: Vec<usize> = (0..20).collect();
        let split = split(&dataset, 0.5, 0.25).unwrap();
        assert_eq!(split.train, (0..10).collect::<Vec<_>>());
        assert_eq!(split.validation, (10..15).collect::<Vec<_>>());
        assert_eq!(split.test, (15..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_dataset() {
        let split = split(&[] as &[usize], 0.7, 0.15).unwrap();
        assert!(split.is_empty());
    }

    #[test]
    fn test_negative_ratio_rejected() {
        let dataset = vec![1, 2, 3];
        assert!(matches!(
            split(&dataset, -0.1, 0.0),
            Err(LearnError::InvalidParameter(_))
        ));
        assert!(matches!(
            split(&dataset, 0.5, f64::NAN),
            Err(LearnError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_oversized_ratios_rejected() {
        let dataset = vec![1, 2, 3, 4];
        assert!(matches!(
            split(&dataset, 0.75, 0.75),
            Err(LearnError::InvalidParameter(_))
        ));
    }
}
