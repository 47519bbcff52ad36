use criterion::{black_box, criterion_group, criterion_main, Criterion};
use labelearn::{stats, ConfusionMatrix, Metric};

/// Wide matrix in the spirit of a full label taxonomy
fn wide_matrix(classes: usize) -> ConfusionMatrix {
    let names: Vec<String> = (0..classes).map(|i| format!("cat{i:02}")).collect();
    let mut matrix = ConfusionMatrix::new(&names);
    for (i, actual) in names.iter().enumerate() {
        for (j, predicted) in names.iter().enumerate() {
            // diagonal-heavy counts, deterministic
            let count = if i == j { 50 } else { (i * 7 + j * 3) as u64 % 5 };
            matrix.set_entry(actual, predicted, count);
        }
    }
    matrix
}

fn bench_stats(c: &mut Criterion) {
    let matrix = wide_matrix(27);

    c.bench_function("long_stats_27_classes", |b| {
        b.iter(|| stats(black_box(&matrix)))
    });

    c.bench_function("macro_f1_27_classes", |b| {
        b.iter(|| black_box(&matrix).macro_average(Metric::F1))
    });

    c.bench_function("render_27_classes", |b| {
        b.iter(|| black_box(&matrix).to_string())
    });
}

criterion_group!(benches, bench_stats);
criterion_main!(benches);
