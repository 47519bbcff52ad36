//! K-fold cross-validation orchestrator
//!
//! Partitions a pool (train + validation data; never the held-out test set)
//! into near-equal contiguous folds, trains a fresh classifier per fold and
//! aggregates single-guess evaluation results into micro and macro
//! averages. Folds run strictly sequentially: training mutates classifier
//! state, so no instance is ever shared between folds.

use serde::Serialize;

use crate::core::{Classifier, LearnError, ProgressEvent, Result, Sample, NO_GUESS};
use crate::matrix::{ConfusionMatrix, Metric, PooledCounts};

/// Pooled counts plus the full aggregate metric set.
///
/// In the micro average the metrics are ratios of the pooled counts; in the
/// macro average they are per-fold values averaged over the folds while the
/// counts stay pooled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub tp: f64,
    pub fp: f64,
    #[serde(rename = "fn")]
    pub fn_: f64,
    pub tn: f64,
    /// Number of evaluated instances
    pub count: f64,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub miss_rate: f64,
    pub fall_out: f64,
    pub specificity: f64,
    pub prevalence: f64,
}

/// Micro and macro averages over all cross-validation folds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossValidationReport {
    /// Preferable under class imbalance: counts pooled first, ratios once
    pub micro_avg: AggregateStats,
    /// Preferable in balanced settings: per-fold values averaged over folds
    pub macro_avg: AggregateStats,
}

/// Contiguous fold boundaries; sizes differ by at most one
fn fold_bounds(pool_size: usize, folds: usize) -> Vec<(usize, usize)> {
    let base = pool_size / folds;
    let remainder = pool_size % folds;
    let mut bounds = Vec::with_capacity(folds);
    let mut start = 0;
    for fold in 0..folds {
        let size = base + usize::from(fold < remainder);
        bounds.push((start, start + size));
        start += size;
    }
    bounds
}

/// Single-guess evaluation of one fold into a fresh confusion matrix
fn evaluate_fold(
    classifier: &dyn Classifier,
    fold: &[Sample],
    classes: &[String],
) -> ConfusionMatrix {
    let mut matrix = ConfusionMatrix::new(classes);
    for sample in fold {
        let predictions = classifier.classify(&sample.input);
        let guess = predictions
            .into_iter()
            .next()
            .unwrap_or_else(|| NO_GUESS.to_string());
        matrix.add_entry(&sample.output, &guess);
    }
    matrix
}

/// Fold-level stats: pooled counts of the fold matrix with the ratios
/// applied once.
fn snapshot(matrix: &ConfusionMatrix) -> AggregateStats {
    let pooled = matrix.pooled();
    AggregateStats {
        tp: pooled.tp as f64,
        fp: pooled.fp as f64,
        fn_: pooled.fn_ as f64,
        tn: pooled.tn as f64,
        count: pooled.total as f64,
        accuracy: matrix.micro_average(Metric::Accuracy),
        precision: matrix.micro_average(Metric::Precision),
        recall: matrix.micro_average(Metric::Recall),
        f1: matrix.micro_average(Metric::F1),
        miss_rate: matrix.micro_average(Metric::MissRate),
        fall_out: matrix.micro_average(Metric::FallOut),
        specificity: matrix.micro_average(Metric::Specificity),
        prevalence: matrix.micro_average(Metric::Prevalence),
    }
}

fn finalize_micro(pooled: PooledCounts) -> AggregateStats {
    let tp = pooled.tp as f64;
    let fp = pooled.fp as f64;
    let fn_ = pooled.fn_ as f64;
    let tn = pooled.tn as f64;
    AggregateStats {
        tp,
        fp,
        fn_,
        tn,
        count: pooled.total as f64,
        // pooled TP is the diagonal sum, so this is the overall accuracy
        accuracy: tp / pooled.total as f64,
        precision: tp / (tp + fp),
        recall: tp / (tp + fn_),
        f1: (2.0 * tp) / (2.0 * tp + fn_ + fp),
        miss_rate: fn_ / (tp + fn_),
        fall_out: fp / (fp + tn),
        specificity: tn / (fp + tn),
        prevalence: pooled.positive as f64 / (pooled.positive + pooled.negative) as f64,
    }
}

fn finalize_macro(pooled: PooledCounts, fold_stats: &[AggregateStats]) -> AggregateStats {
    let k = fold_stats.len() as f64;
    let mean = |pick: fn(&AggregateStats) -> f64| fold_stats.iter().map(pick).sum::<f64>() / k;
    AggregateStats {
        tp: pooled.tp as f64,
        fp: pooled.fp as f64,
        fn_: pooled.fn_ as f64,
        tn: pooled.tn as f64,
        count: pooled.total as f64,
        accuracy: mean(|s| s.accuracy),
        precision: mean(|s| s.precision),
        recall: mean(|s| s.recall),
        f1: mean(|s| s.f1),
        miss_rate: mean(|s| s.miss_rate),
        fall_out: mean(|s| s.fall_out),
        specificity: mean(|s| s.specificity),
        prevalence: mean(|s| s.prevalence),
    }
}

/// Run k-fold cross-validation over `pool`.
///
/// `factory` must produce a fresh, untrained classifier; it is invoked once
/// per fold. Fails with `InvalidFoldCount` unless `1 <= folds <= pool.len()`.
pub fn cross_validate<F>(
    pool: &[Sample],
    folds: usize,
    mut factory: F,
    classes: &[String],
    mut progress: Option<&mut dyn FnMut(ProgressEvent)>,
) -> Result<CrossValidationReport>
where
    F: FnMut() -> Result<Box<dyn Classifier>>,
{
    if folds == 0 || folds > pool.len() {
        return Err(LearnError::InvalidFoldCount {
            folds,
            pool_size: pool.len(),
        });
    }

    let mut pooled = PooledCounts::default();
    let mut fold_stats = Vec::with_capacity(folds);

    for (fold, (start, end)) in fold_bounds(pool.len(), folds).into_iter().enumerate() {
        let validation = &pool[start..end];
        let mut train_set = Vec::with_capacity(pool.len() - validation.len());
        train_set.extend_from_slice(&pool[..start]);
        train_set.extend_from_slice(&pool[end..]);

        log::debug!(
            "fold #{fold}: training on {} samples, testing {}",
            train_set.len(),
            validation.len()
        );
        if let Some(handler) = progress.as_mut() {
            handler(ProgressEvent::FoldStarted {
                fold,
                train_size: train_set.len(),
                validation_size: validation.len(),
            });
        }

        let mut classifier = factory()?;
        classifier.train(&train_set);
        let matrix = evaluate_fold(classifier.as_ref(), validation, classes);

        let fold_pool = matrix.pooled();
        pooled.tp += fold_pool.tp;
        pooled.fp += fold_pool.fp;
        pooled.fn_ += fold_pool.fn_;
        pooled.tn += fold_pool.tn;
        pooled.positive += fold_pool.positive;
        pooled.negative += fold_pool.negative;
        pooled.total += fold_pool.total;
        fold_stats.push(snapshot(&matrix));

        if let Some(handler) = progress.as_mut() {
            handler(ProgressEvent::FoldFinished { fold });
        }
    }

    Ok(CrossValidationReport {
        micro_avg: finalize_micro(pooled),
        macro_avg: finalize_macro(pooled, &fold_stats),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::WordExtractor;
    use crate::memorize::MemorizingClassifier;
    use approx::assert_relative_eq;

    fn pool_of_repeats(repeats: usize) -> Vec<Sample> {
        let pairs = [("fix crash", "bug"), ("refactor", "code"), ("readme", "doc")];
        let mut pool = Vec::new();
        for _ in 0..repeats {
            for (input, output) in pairs {
                pool.push(Sample::new(input, output));
            }
        }
        pool
    }

    fn classes() -> Vec<String> {
        vec!["bug".into(), "code".into(), "doc".into()]
    }

    fn memorizer() -> Result<Box<dyn Classifier>> {
        Ok(Box::new(MemorizingClassifier::new(Box::new(WordExtractor))))
    }

    #[test]
    fn test_fold_bounds_near_equal() {
        let bounds = fold_bounds(10, 4);
        let sizes: Vec<usize> = bounds.iter().map(|(s, e)| e - s).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2]);
        assert_eq!(bounds.last().unwrap().1, 10);

        let sizes: Vec<usize> = fold_bounds(12, 4).iter().map(|(s, e)| e - s).collect();
        assert_eq!(sizes, vec![3, 3, 3, 3]);

        for (pool, folds) in [(11, 3), (7, 7), (100, 9)] {
            let sizes: Vec<usize> = fold_bounds(pool, folds).iter().map(|(s, e)| e - s).collect();
            let min = sizes.iter().min().unwrap();
            let max = sizes.iter().max().unwrap();
            assert!(max - min <= 1);
            assert_eq!(sizes.iter().sum::<usize>(), pool);
        }
    }

    #[test]
    fn test_invalid_fold_count() {
        let pool = pool_of_repeats(2);
        let classes = classes();
        for folds in [0, pool.len() + 1] {
            let result = cross_validate(&pool, folds, memorizer, &classes, None);
            assert!(matches!(
                result,
                Err(LearnError::InvalidFoldCount { .. })
            ));
        }
    }

    #[test]
    fn test_perfect_memorization() {
        // every fold's inputs also occur in its training complement
        let pool = pool_of_repeats(4);
        let report = cross_validate(&pool, 4, memorizer, &classes(), None).unwrap();

        assert_relative_eq!(report.micro_avg.accuracy, 1.0);
        assert_relative_eq!(report.micro_avg.precision, 1.0);
        assert_relative_eq!(report.micro_avg.recall, 1.0);
        assert_relative_eq!(report.micro_avg.f1, 1.0);
        assert_relative_eq!(report.micro_avg.count, 12.0);
        assert_relative_eq!(report.micro_avg.tp, 12.0);
        assert_relative_eq!(report.micro_avg.fp, 0.0);
        assert_relative_eq!(report.micro_avg.tn, 24.0);

        assert_relative_eq!(report.macro_avg.accuracy, 1.0);
        assert_relative_eq!(report.macro_avg.f1, 1.0);
    }

    #[test]
    fn test_macro_accuracy_diverges_from_naive_recomputation() {
        let pool = pool_of_repeats(4);
        let report = cross_validate(&pool, 4, memorizer, &classes(), None).unwrap();
        let macro_avg = &report.macro_avg;
        let naive = (macro_avg.tp + macro_avg.tn) / macro_avg.count;
        assert_ne!(macro_avg.accuracy, naive);
    }

    #[test]
    fn test_fresh_classifier_per_fold() {
        let pool = pool_of_repeats(3);
        let mut built = 0;
        let factory = || {
            built += 1;
            memorizer()
        };
        cross_validate(&pool, 3, factory, &classes(), None).unwrap();
        assert_eq!(built, 3);
    }

    #[test]
    fn test_progress_events() {
        let pool = pool_of_repeats(2);
        let mut events = Vec::new();
        let mut handler = |event: ProgressEvent| events.push(event);
        cross_validate(&pool, 2, memorizer, &classes(), Some(&mut handler)).unwrap();
        assert_eq!(
            events,
            vec![
                ProgressEvent::FoldStarted {
                    fold: 0,
                    train_size: 3,
                    validation_size: 3
                },
                ProgressEvent::FoldFinished { fold: 0 },
                ProgressEvent::FoldStarted {
                    fold: 1,
                    train_size: 3,
                    validation_size: 3
                },
                ProgressEvent::FoldFinished { fold: 1 },
            ]
        );
    }

    #[test]
    fn test_untrained_guess_falls_back_to_null() {
        // a single fold trained on nothing it can reuse still yields counts
        let pool = vec![
            Sample::new("alpha", "bug"),
            Sample::new("beta", "code"),
        ];
        let report = cross_validate(&pool, 2, memorizer, &classes(), None).unwrap();
        // no guess ever matches, every instance is a miss
        assert_relative_eq!(report.micro_avg.accuracy, 0.0);
        assert_relative_eq!(report.micro_avg.count, 2.0);
    }
}
