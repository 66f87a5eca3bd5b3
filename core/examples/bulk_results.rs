//! Reconciles large result lists to gauge diff performance.
//!
//! Run with: `cargo run -q --release --example bulk_results -p dash_core`

use dash_core::ResultsModel;
use dash_core::types::{Category, CategoryId, ScopeResult};
use std::sync::Arc;
use std::time::Instant;

const RESULT_COUNT: usize = 5000;

fn main() {
    let category = Arc::new(Category::new(
        CategoryId::try_from("bulk").expect("Invalid category id"),
        "Bulk",
        "{}",
    ));
    let make = |i: usize| {
        Arc::new(
            ScopeResult::new(Arc::clone(&category), format!("bulk://result-{i:05}"))
                .with_field("title", format!("Result {i}")),
        )
    };

    let mut model = ResultsModel::new();
    let initial: Vec<_> = (0..RESULT_COUNT).map(make).collect();

    run("initial fill", &mut model, initial.clone());
    run("identical", &mut model, initial.clone());

    let mut reversed = initial.clone();
    reversed.reverse();
    run("reversed", &mut model, reversed);

    let shifted: Vec<_> = (RESULT_COUNT / 2..RESULT_COUNT + RESULT_COUNT / 2)
        .map(make)
        .collect();
    run("half replaced", &mut model, shifted);

    let duplicated: Vec<_> = (0..RESULT_COUNT).map(|_| make(0)).collect();
    run("all duplicates", &mut model, duplicated);
}

fn run(label: &str, model: &mut ResultsModel, batch: Vec<Arc<ScopeResult>>) {
    let start = Instant::now();
    let stats = model.add_update_results(batch);
    let changes = model.take_changes().len();
    println!(
        "{label:>16}: {:>8.2?}  rows={:<5} removed={:<5} inserted={:<5} moved={:<5} changes={changes}",
        start.elapsed(),
        model.count(),
        stats.removed,
        stats.inserted,
        stats.moved,
    );
}
