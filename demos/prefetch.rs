//! Cluster a handful of synthetic browsing profiles and score prefetching.

use prefetch::{Evaluator, Kmeans};

fn main() {
    // Eight clients over six resources. The first four mostly read the news
    // pages (0..3), the last four the sports pages (3..6).
    let train: Vec<Vec<f32>> = vec![
        vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
        vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0],
        vec![1.0, 0.0, 1.0, 0.0, 0.0, 0.0],
        vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0],
        vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0],
        vec![0.0, 1.0, 0.0, 1.0, 1.0, 1.0],
    ];

    // Held-out week for the same clients, in the same order.
    let test: Vec<Vec<f32>> = vec![
        vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0],
        vec![1.0, 0.0, 1.0, 0.0, 0.0, 0.0],
        vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
        vec![1.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0],
        vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0],
        vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
    ];

    let fit = Kmeans::new(2).with_seed(42).fit(&train).unwrap();
    println!(
        "converged={} after {} iteration(s)",
        fit.converged(),
        fit.iterations()
    );

    for j in 0..fit.store().k() {
        let mut members: Vec<usize> = fit.store().members(j).iter().copied().collect();
        members.sort_unstable();
        println!("\ncluster[{j}] members: {members:?}");
        print!("cluster[{j}] prototype:");
        for p in fit.store().prototype(j) {
            print!(" {p:.3}");
        }
        println!();
    }

    for threshold in [0.3, 0.5, 0.7] {
        let scores = Evaluator::new()
            .with_threshold(threshold)
            .evaluate(&test, &fit)
            .unwrap();
        println!("\n{scores}");
        println!(
            "  hits={} requests={} prefetches={}",
            scores.hits(),
            scores.requests(),
            scores.prefetches()
        );
    }
}
