//! Confusion-matrix reporting: tabular text, short stats and the full
//! structured report
//!
//! Everything here is a pure, deterministic function of the matrix state.
//! Cells print with two decimal places so fixture-based tests stay byte
//! stable.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::matrix::{ConfusionMatrix, Metric};

/// Which aggregate family feeds an averaged report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AverageKind {
    Micro,
    Macro,
    Weighted,
}

/// Options for [`render`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Split the class list in half and print two tables (for wide matrices)
    pub split: bool,
    /// Drop classes whose row and column are both all zero
    pub clean: bool,
}

/// One aggregate metric snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageReport {
    pub accuracy: f64,
    pub f1: f64,
    pub fall_out: f64,
    pub miss_rate: f64,
    pub precision: f64,
    pub prevalence: f64,
    pub recall: f64,
    pub specificity: f64,
}

/// Per-class breakdown inside a [`StatsReport`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassResult {
    /// Actual instances of the class (its support)
    pub total: u64,
    /// Share of the evaluated instances belonging to the class
    pub sample_portion: f64,
    pub tp: u64,
    pub fp: u64,
    #[serde(rename = "fn")]
    pub fn_: u64,
    pub tn: u64,
    pub accuracy: f64,
    pub f1: f64,
    pub fall_out: f64,
    pub miss_rate: f64,
    pub precision: f64,
    pub prevalence: f64,
    pub recall: f64,
    pub specificity: f64,
    /// 2x2 sub-matrix `[[TP, FP], [FN, TN]]`
    pub confusion_matrix: [[u64; 2]; 2],
}

/// Long statistics over a whole confusion matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub total: u64,
    pub correct_predictions: u64,
    pub incorrect_predictions: u64,
    pub classes: Vec<String>,
    pub micro_avg: AverageReport,
    pub macro_avg: AverageReport,
    pub weighted_avg: AverageReport,
    pub results: BTreeMap<String, ClassResult>,
}

fn average_report(matrix: &ConfusionMatrix, kind: AverageKind) -> AverageReport {
    let avg = |metric| match kind {
        AverageKind::Micro => matrix.micro_average(metric),
        AverageKind::Macro => matrix.macro_average(metric),
        AverageKind::Weighted => matrix.weighted_average(metric),
    };
    AverageReport {
        accuracy: avg(Metric::Accuracy),
        f1: avg(Metric::F1),
        fall_out: avg(Metric::FallOut),
        miss_rate: avg(Metric::MissRate),
        precision: avg(Metric::Precision),
        prevalence: avg(Metric::Prevalence),
        recall: avg(Metric::Recall),
        specificity: avg(Metric::Specificity),
    }
}

fn class_result(matrix: &ConfusionMatrix, class: &str) -> ClassResult {
    let tp = matrix.true_positives(class);
    let fp = matrix.false_positives(class);
    let fn_ = matrix.false_negatives(class);
    let tn = matrix.true_negatives(class);
    let total = matrix.positives(class);
    ClassResult {
        total,
        sample_portion: total as f64 / matrix.total() as f64,
        tp,
        fp,
        fn_,
        tn,
        accuracy: matrix.accuracy(class),
        f1: matrix.f1(class),
        fall_out: matrix.fall_out(class),
        miss_rate: matrix.miss_rate(class),
        precision: matrix.precision(class),
        prevalence: matrix.prevalence(class),
        recall: matrix.recall(class),
        specificity: matrix.specificity(class),
        confusion_matrix: [[tp, fp], [fn_, tn]],
    }
}

/// Full structured statistics for `matrix`
pub fn stats(matrix: &ConfusionMatrix) -> StatsReport {
    let results = matrix
        .classes()
        .iter()
        .map(|class| (class.clone(), class_result(matrix, class)))
        .collect();
    StatsReport {
        total: matrix.total(),
        correct_predictions: matrix.correct(),
        incorrect_predictions: matrix.incorrect(),
        classes: matrix.classes().to_vec(),
        micro_avg: average_report(matrix, AverageKind::Micro),
        macro_avg: average_report(matrix, AverageKind::Macro),
        weighted_avg: average_report(matrix, AverageKind::Weighted),
        results,
    }
}

fn percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Short multi-line statistics: totals plus one aggregate family
pub fn short_stats(matrix: &ConfusionMatrix, kind: AverageKind) -> String {
    let avg = |metric| match kind {
        AverageKind::Micro => matrix.micro_average(metric),
        AverageKind::Macro => matrix.macro_average(metric),
        AverageKind::Weighted => matrix.weighted_average(metric),
    };
    format!(
        "Total: {}\nTrue: {}\nFalse: {}\nAccuracy: {}\nPrecision: {}\nRecall: {}\nF1: {}",
        matrix.total(),
        matrix.correct(),
        matrix.incorrect(),
        percentage(avg(Metric::Accuracy)),
        percentage(avg(Metric::Precision)),
        percentage(avg(Metric::Recall)),
        percentage(avg(Metric::F1)),
    )
}

/// Classes that never occur, neither as a row nor as a predicted column
fn non_empty_classes(matrix: &ConfusionMatrix) -> Vec<String> {
    matrix
        .classes()
        .iter()
        .filter(|class| matrix.support(class) > 0 || matrix.predicted_positives(class) > 0)
        .cloned()
        .collect()
}

fn table(
    matrix: &ConfusionMatrix,
    title: &str,
    rows: &[String],
    columns: &[String],
) -> String {
    let cell = |row: &str, col: &str| format!("{:.2}", matrix.get_entry(row, col) as f64);

    let label_width = rows
        .iter()
        .map(|row| row.len() + 3)
        .chain([title.len()])
        .max()
        .unwrap_or(0);
    let widths: Vec<usize> = columns
        .iter()
        .map(|col| {
            rows.iter()
                .map(|row| cell(row, col).len())
                .chain([col.len()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let mut header = format!("{title:<label_width$}");
    for (col, &width) in columns.iter().zip(&widths) {
        header.push_str("  ");
        header.push_str(&format!("{col:<width$}"));
    }
    lines.push(header.trim_end().to_string());

    let mut separator = "-".repeat(label_width);
    for width in &widths {
        separator.push_str("  ");
        separator.push_str(&"-".repeat(*width));
    }
    lines.push(separator);

    for row in rows {
        let mut line = format!("{:<label_width$}", format!("   {row}"));
        for (col, &width) in columns.iter().zip(&widths) {
            line.push_str("  ");
            line.push_str(&format!("{:>width$}", cell(row, col)));
        }
        lines.push(line.trim_end().to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Render the matrix as aligned text, actual classes as rows and predicted
/// classes as columns.
pub fn render(matrix: &ConfusionMatrix, options: &RenderOptions) -> String {
    let classes = if options.clean {
        non_empty_classes(matrix)
    } else {
        matrix.classes().to_vec()
    };

    if options.split {
        let half = classes.len().div_ceil(2);
        let head = table(matrix, "1/2 Actual \\ Predicted", &classes, &classes[..half]);
        let tail = table(matrix, "2/2 Actual \\ Predicted", &classes, &classes[half..]);
        return format!("{head}\n{tail}");
    }
    table(matrix, "Actual \\ Predicted", &classes, &classes)
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self, &RenderOptions::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CATEGORIES: [&str; 3] = ["bug", "code", "other"];

    fn m0() -> ConfusionMatrix {
        ConfusionMatrix::with_counts(
            CATEGORIES,
            vec![vec![5, 0, 1], vec![1, 2, 0], vec![0, 3, 8]],
        )
        .unwrap()
    }

    #[test]
    fn test_render_fixture() {
        let expected = "\
Actual \\ Predicted  bug   code  other
------------------  ----  ----  -----
   bug              5.00  0.00   1.00
   code             1.00  2.00   0.00
   other            0.00  3.00   8.00\n";
        assert_eq!(render(&m0(), &RenderOptions::default()), expected);
        assert_eq!(m0().to_string(), expected);
    }

    #[test]
    fn test_render_split_halves_columns() {
        let out = render(
            &m0(),
            &RenderOptions {
                split: true,
                clean: false,
            },
        );
        assert!(out.contains("1/2 Actual \\ Predicted"));
        assert!(out.contains("2/2 Actual \\ Predicted"));
        // first half carries two classes, second half the remaining one
        let head = out.split("2/2").next().unwrap();
        assert!(head.contains("bug") && head.contains("code"));
        // every actual class still shows up as a row in both tables
        assert_eq!(out.matches("   other").count(), 2);
    }

    #[test]
    fn test_render_clean_drops_empty_classes() {
        let mut matrix = ConfusionMatrix::new(["bug", "code", "ghost"]);
        matrix.add_entry("bug", "bug");
        matrix.add_entry("code", "bug");
        let out = render(
            &matrix,
            &RenderOptions {
                split: false,
                clean: true,
            },
        );
        assert!(!out.contains("ghost"));
        assert!(out.contains("bug"));
        assert!(out.contains("code"));
    }

    #[test]
    fn test_short_stats_micro() {
        let expected = "Total: 20\nTrue: 15\nFalse: 5\n\
Accuracy: 75.00%\nPrecision: 75.00%\nRecall: 75.00%\nF1: 75.00%";
        assert_eq!(short_stats(&m0(), AverageKind::Micro), expected);
    }

    #[test]
    fn test_short_stats_macro() {
        let expected = "Total: 20\nTrue: 15\nFalse: 5\n\
Accuracy: 83.33%\nPrecision: 70.74%\nRecall: 74.24%\nF1: 71.11%";
        assert_eq!(short_stats(&m0(), AverageKind::Macro), expected);
    }

    #[test]
    fn test_short_stats_weighted() {
        let expected = "Total: 20\nTrue: 15\nFalse: 5\n\
Accuracy: 83.00%\nPrecision: 79.89%\nRecall: 75.00%\nF1: 76.50%";
        assert_eq!(short_stats(&m0(), AverageKind::Weighted), expected);
    }

    #[test]
    fn test_stats_totals_and_classes() {
        let report = stats(&m0());
        assert_eq!(report.total, 20);
        assert_eq!(report.correct_predictions, 15);
        assert_eq!(report.incorrect_predictions, 5);
        assert_eq!(report.classes, vec!["bug", "code", "other"]);
        assert_eq!(report.results.len(), 3);
    }

    #[test]
    fn test_stats_per_class_results() {
        let report = stats(&m0());
        let bug = &report.results["bug"];
        assert_eq!(bug.total, 6);
        assert_relative_eq!(bug.sample_portion, 0.3);
        assert_eq!(bug.tp, 5);
        assert_eq!(bug.fp, 1);
        assert_eq!(bug.fn_, 1);
        assert_eq!(bug.tn, 13);
        assert_eq!(bug.confusion_matrix, [[5, 1], [1, 13]]);
        assert_relative_eq!(bug.accuracy, 0.9);
        assert_relative_eq!(bug.f1, 5.0 / 6.0, max_relative = 1e-12);

        let code = &report.results["code"];
        assert_relative_eq!(code.precision, 0.4);
        assert_relative_eq!(code.recall, 2.0 / 3.0);
    }

    #[test]
    fn test_stats_averages_differ() {
        let report = stats(&m0());
        assert_relative_eq!(report.micro_avg.accuracy, 0.75);
        assert_relative_eq!(report.macro_avg.accuracy, 5.0 / 6.0, max_relative = 1e-12);
        assert_relative_eq!(report.weighted_avg.accuracy, 0.83, max_relative = 1e-12);
        assert_ne!(report.micro_avg.precision, report.macro_avg.precision);
    }

    #[test]
    fn test_stats_serialize_shape() {
        let json = serde_json::to_value(stats(&m0())).unwrap();
        assert_eq!(json["total"], 20);
        assert_eq!(json["correctPredictions"], 15);
        assert!(json["microAvg"]["fallOut"].is_number());
        assert!(json["macroAvg"]["missRate"].is_number());
        assert!(json["weightedAvg"]["accuracy"].is_number());
        let bug = &json["results"]["bug"];
        assert_eq!(bug["fn"], 1);
        assert_eq!(bug["samplePortion"], 0.3);
        assert_eq!(bug["confusionMatrix"][0][0], 5);
    }

    #[test]
    fn test_nan_metrics_serialize_as_null() {
        let empty = ConfusionMatrix::new(["a", "b"]);
        let json = serde_json::to_value(stats(&empty)).unwrap();
        assert!(json["microAvg"]["accuracy"].is_null());
        assert!(json["results"]["a"]["recall"].is_null());
    }
}
