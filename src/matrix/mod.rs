//! Multi-class confusion matrix with derived statistics
//!
//! Outcome counts are stored per (actual, predicted) class pair in a 2D
//! array backed by an insertion-ordered class registry. All statistics are
//! pure functions of the current counts; division by a zero denominator
//! propagates as NaN rather than being special-cased.

pub mod registry;

pub use self::registry::ClassRegistry;

use crate::core::{LearnError, Result};

/// Per-class prediction quality metrics.
///
/// Each metric exists at per-class, micro, macro and weighted granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Accuracy,
    F1,
    FallOut,
    MissRate,
    Precision,
    Prevalence,
    Recall,
    Specificity,
}

impl Metric {
    /// Every metric, in reporting order
    pub const ALL: [Metric; 8] = [
        Metric::Accuracy,
        Metric::F1,
        Metric::FallOut,
        Metric::MissRate,
        Metric::Precision,
        Metric::Prevalence,
        Metric::Recall,
        Metric::Specificity,
    ];
}

/// TP/FP/FN/TN totals pooled over all declared classes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PooledCounts {
    pub tp: u64,
    pub fp: u64,
    pub fn_: u64,
    pub tn: u64,
    pub positive: u64,
    pub negative: u64,
    pub total: u64,
}

/// Multi-class focused confusion matrix.
///
/// Rows are actual classes, columns are predicted classes. The declared
/// class list is closed for statistics purposes, but predicted labels
/// outside it are admitted as extra columns: they count toward row sums and
/// the grand total, and are never cleaned up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    /// Declared classes; the iteration set for all statistics
    classes: ClassRegistry,
    /// Column identities: declared classes first, ad-hoc predicted labels after
    columns: ClassRegistry,
    /// Counts, indexed `[class][column]`; rows widen lazily
    rows: Vec<Vec<u64>>,
}

impl ConfusionMatrix {
    /// Create a zeroed matrix over `classes` (deduped, first occurrence wins)
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes = ClassRegistry::from_names(classes);
        let n = classes.len();
        Self {
            columns: classes.clone(),
            rows: vec![vec![0; n]; n],
            classes,
        }
    }

    /// Create a matrix from an existing square count table.
    ///
    /// `counts` must hold one row per deduped class, each as wide as the
    /// class list.
    pub fn with_counts<I, S>(classes: I, counts: Vec<Vec<u64>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes = ClassRegistry::from_names(classes);
        let n = classes.len();
        if counts.len() != n || counts.iter().any(|row| row.len() != n) {
            return Err(LearnError::InvalidParameter(format!(
                "count table must be {n}x{n} to match the class list"
            )));
        }
        Ok(Self {
            columns: classes.clone(),
            rows: counts,
            classes,
        })
    }

    /// Build a matrix from parallel actual/predicted sequences.
    ///
    /// When `classes` is empty, the class list is derived as the union of
    /// `actual` and `predicted` in first-seen order.
    pub fn from_data<A, P, C>(actual: &[A], predicted: &[P], classes: &[C]) -> Result<Self>
    where
        A: AsRef<str>,
        P: AsRef<str>,
        C: AsRef<str>,
    {
        if actual.len() != predicted.len() {
            return Err(LearnError::LengthMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }
        let mut matrix = if classes.is_empty() {
            let derived = actual
                .iter()
                .map(AsRef::as_ref)
                .chain(predicted.iter().map(AsRef::as_ref));
            Self::new(derived)
        } else {
            Self::new(classes.iter().map(AsRef::as_ref))
        };
        for (act, pred) in actual.iter().zip(predicted) {
            matrix.add_entry(act.as_ref(), pred.as_ref());
        }
        Ok(matrix)
    }

    /// Declared classes, in declaration order
    pub fn classes(&self) -> &[String] {
        self.classes.names()
    }

    fn ensure_class(&mut self, name: &str) -> usize {
        if let Some(idx) = self.classes.get(name) {
            return idx;
        }
        let idx = self.classes.get_or_insert(name);
        self.columns.get_or_insert(name);
        self.rows.push(Vec::new());
        idx
    }

    fn cell(&self, row: usize, col: usize) -> u64 {
        self.rows[row].get(col).copied().unwrap_or(0)
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> &mut u64 {
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, 0);
        }
        &mut cells[col]
    }

    /// Increment the (actual, predicted) cell, returning the new count.
    ///
    /// Labels never seen before are registered on first sight: a new actual
    /// becomes a declared class, a new predicted becomes an extra column.
    pub fn add_entry(&mut self, actual: &str, predicted: &str) -> u64 {
        let row = self.ensure_class(actual);
        let col = self.columns.get_or_insert(predicted);
        let cell = self.cell_mut(row, col);
        *cell += 1;
        *cell
    }

    /// Overwrite the (actual, predicted) cell
    pub fn set_entry(&mut self, actual: &str, predicted: &str, count: u64) {
        let row = self.ensure_class(actual);
        let col = self.columns.get_or_insert(predicted);
        *self.cell_mut(row, col) = count;
    }

    /// Read the (actual, predicted) cell; never-seen pairs read as 0
    pub fn get_entry(&self, actual: &str, predicted: &str) -> u64 {
        match (self.classes.get(actual), self.columns.get(predicted)) {
            (Some(row), Some(col)) => self.cell(row, col),
            _ => 0,
        }
    }

    fn row_sum(&self, row: usize) -> u64 {
        self.rows[row].iter().sum()
    }

    fn column_sum(&self, col: usize) -> u64 {
        self.rows
            .iter()
            .map(|cells| cells.get(col).copied().unwrap_or(0))
            .sum()
    }

    /// Total count of **all** entries, extra columns included
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|cells| cells.iter().sum::<u64>()).sum()
    }

    /// Counts in the actual == predicted diagonal, in class order
    pub fn diagonal(&self) -> Vec<u64> {
        (0..self.classes.len()).map(|i| self.cell(i, i)).collect()
    }

    /// Number of correct predictions (diagonal sum)
    pub fn correct(&self) -> u64 {
        self.diagonal().iter().sum()
    }

    /// Number of incorrect predictions
    pub fn incorrect(&self) -> u64 {
        self.total() - self.correct()
    }

    /// Elements of `class` correctly predicted as such
    pub fn true_positives(&self, class: &str) -> u64 {
        self.classes
            .get(class)
            .map_or(0, |idx| self.cell(idx, idx))
    }

    /// Elements outside `class` predicted as belonging to it
    pub fn false_positives(&self, class: &str) -> u64 {
        match self.columns.get(class) {
            Some(col) => self.column_sum(col) - self.true_positives(class),
            None => 0,
        }
    }

    /// Elements of `class` predicted as something else
    pub fn false_negatives(&self, class: &str) -> u64 {
        match self.classes.get(class) {
            Some(row) => self.row_sum(row) - self.cell(row, row),
            None => 0,
        }
    }

    /// Elements outside `class` correctly predicted as outside it
    pub fn true_negatives(&self, class: &str) -> u64 {
        let row_total = self.classes.get(class).map_or(0, |row| self.row_sum(row));
        self.total() - self.false_positives(class) - row_total
    }

    /// Actual members of `class`: TP + FN
    pub fn positives(&self, class: &str) -> u64 {
        self.true_positives(class) + self.false_negatives(class)
    }

    /// Actual non-members of `class`: TN + FP
    pub fn negatives(&self, class: &str) -> u64 {
        self.true_negatives(class) + self.false_positives(class)
    }

    /// Elements guessed as belonging to `class`: TP + FP
    pub fn predicted_positives(&self, class: &str) -> u64 {
        self.true_positives(class) + self.false_positives(class)
    }

    /// Elements guessed as not belonging to `class`: TN + FN
    pub fn predicted_negatives(&self, class: &str) -> u64 {
        self.true_negatives(class) + self.false_negatives(class)
    }

    /// Actual instances of `class` (row sum)
    pub fn support(&self, class: &str) -> u64 {
        self.classes.get(class).map_or(0, |row| self.row_sum(row))
    }

    /// A single per-class metric value.
    ///
    /// Zero denominators yield NaN by design; callers that want masking must
    /// do it themselves.
    pub fn metric(&self, metric: Metric, class: &str) -> f64 {
        let tp = self.true_positives(class) as f64;
        match metric {
            // (TP + TN) / total
            Metric::Accuracy => {
                (tp + self.true_negatives(class) as f64) / self.total() as f64
            }
            // 2 * (Pr * R) / (Pr + R)
            Metric::F1 => {
                let pr = self.metric(Metric::Precision, class);
                let r = self.metric(Metric::Recall, class);
                (2.0 * pr * r) / (pr + r)
            }
            // FP / (FP + TN)
            Metric::FallOut => {
                self.false_positives(class) as f64 / self.negatives(class) as f64
            }
            // FN / (TP + FN)
            Metric::MissRate => {
                self.false_negatives(class) as f64 / self.positives(class) as f64
            }
            // TP / (TP + FP)
            Metric::Precision => tp / self.predicted_positives(class) as f64,
            // (TP + FN) / total
            Metric::Prevalence => self.positives(class) as f64 / self.total() as f64,
            // TP / (TP + FN)
            Metric::Recall => tp / self.positives(class) as f64,
            // TN / (FP + TN)
            Metric::Specificity => {
                self.true_negatives(class) as f64 / self.negatives(class) as f64
            }
        }
    }

    /// Prediction accuracy for `class`: (TP + TN) / total
    pub fn accuracy(&self, class: &str) -> f64 {
        self.metric(Metric::Accuracy, class)
    }

    /// Precision for `class`: TP / (TP + FP)
    pub fn precision(&self, class: &str) -> f64 {
        self.metric(Metric::Precision, class)
    }

    /// Recall for `class`: TP / (TP + FN)
    pub fn recall(&self, class: &str) -> f64 {
        self.metric(Metric::Recall, class)
    }

    /// F1 score for `class`: 2 * (Pr * R) / (Pr + R)
    pub fn f1(&self, class: &str) -> f64 {
        self.metric(Metric::F1, class)
    }

    /// Miss rate for `class`: FN / (TP + FN)
    pub fn miss_rate(&self, class: &str) -> f64 {
        self.metric(Metric::MissRate, class)
    }

    /// Fall out (false alarm rate) for `class`: FP / (FP + TN)
    pub fn fall_out(&self, class: &str) -> f64 {
        self.metric(Metric::FallOut, class)
    }

    /// Specificity for `class`: TN / (FP + TN)
    pub fn specificity(&self, class: &str) -> f64 {
        self.metric(Metric::Specificity, class)
    }

    /// Prevalence of `class`: (TP + FN) / total
    pub fn prevalence(&self, class: &str) -> f64 {
        self.metric(Metric::Prevalence, class)
    }

    pub(crate) fn pooled(&self) -> PooledCounts {
        let mut pooled = PooledCounts {
            total: self.total(),
            ..PooledCounts::default()
        };
        for class in self.classes.names() {
            pooled.tp += self.true_positives(class);
            pooled.fp += self.false_positives(class);
            pooled.fn_ += self.false_negatives(class);
            pooled.tn += self.true_negatives(class);
            pooled.positive += self.positives(class);
            pooled.negative += self.negatives(class);
        }
        pooled
    }

    /// Micro-average: pool TP/FP/FN/TN over all classes, then apply the
    /// ratio once.
    ///
    /// For single-guess multi-class evaluation this makes accuracy,
    /// precision, recall and F1 all collapse to the overall accuracy.
    pub fn micro_average(&self, metric: Metric) -> f64 {
        let pooled = self.pooled();
        let tp = pooled.tp as f64;
        let fp = pooled.fp as f64;
        let fn_ = pooled.fn_ as f64;
        let tn = pooled.tn as f64;
        match metric {
            Metric::Accuracy => self.correct() as f64 / self.total() as f64,
            Metric::F1 => (2.0 * tp) / (2.0 * tp + fn_ + fp),
            Metric::FallOut => fp / (fp + tn),
            Metric::MissRate => fn_ / (tp + fn_),
            Metric::Precision => tp / (tp + fp),
            Metric::Prevalence => {
                pooled.positive as f64 / (pooled.positive + pooled.negative) as f64
            }
            Metric::Recall => tp / (tp + fn_),
            Metric::Specificity => tn / (fp + tn),
        }
    }

    /// Macro-average: unweighted mean of the per-class values.
    ///
    /// NaN per-class values (zero denominators) stay in the mean unmasked;
    /// the result intentionally diverges from recomputing the formula over
    /// pooled counts.
    pub fn macro_average(&self, metric: Metric) -> f64 {
        let sum: f64 = self
            .classes
            .names()
            .iter()
            .map(|class| self.metric(metric, class))
            .sum();
        sum / self.classes.len() as f64
    }

    /// Support-weighted mean of the per-class values:
    /// sum(metric(c) * support(c)) / total
    pub fn weighted_average(&self, metric: Metric) -> f64 {
        let sum: f64 = self
            .classes
            .names()
            .iter()
            .map(|class| self.metric(metric, class) * self.support(class) as f64)
            .sum();
        sum / self.total() as f64
    }
}
