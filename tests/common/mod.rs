//! Shared dataset builders for the end-to-end tests.

#![allow(dead_code)]

use canopy::{Dataset, DenseMatrix};
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Six samples split cleanly at 3.0: class 0.0 below, 1.0 above.
pub fn separable_line() -> Dataset {
    let matrix = DenseMatrix::from_rows(&[
        vec![1.0, 0.0],
        vec![2.0, 0.0],
        vec![3.0, 0.0],
        vec![4.0, 1.0],
        vec![5.0, 1.0],
        vec![6.0, 1.0],
    ]);
    Dataset::new(matrix, 1).expect("valid dataset")
}

/// Every response equals 7.0.
pub fn constant_response(num_samples: usize) -> Dataset {
    let rows: Vec<Vec<f64>> = (0..num_samples).map(|i| vec![i as f64, 7.0]).collect();
    Dataset::new(DenseMatrix::from_rows(&rows), 1).expect("valid dataset")
}

/// The two-feature XOR truth table; not separable by a single split.
pub fn xor() -> Dataset {
    let matrix = DenseMatrix::from_rows(&[
        vec![0.0, 0.0, 0.0],
        vec![0.0, 1.0, 1.0],
        vec![1.0, 0.0, 1.0],
        vec![1.0, 1.0, 0.0],
    ]);
    Dataset::new(matrix, 2).expect("valid dataset")
}

/// `y = 1 if x1 + x2 > 1 else 0` with every 20th label flipped (5% noise).
///
/// Points are kept away from the decision boundary so the only label noise
/// is the deliberate flips.
pub fn noisy_linear(num_samples: usize, seed: u64) -> Dataset {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        let (x1, x2) = loop {
            let x1: f64 = rng.gen();
            let x2: f64 = rng.gen();
            if (x1 + x2 - 1.0).abs() > 0.1 {
                break (x1, x2);
            }
        };
        let mut label = if x1 + x2 > 1.0 { 1.0 } else { 0.0 };
        if i % 20 == 0 {
            label = 1.0 - label;
        }
        rows.push(vec![x1, x2, label]);
    }
    Dataset::new(DenseMatrix::from_rows(&rows), 2).expect("valid dataset")
}

/// `y = sign(x0)` plus nine pure-noise features.
pub fn signal_and_noise(num_samples: usize, seed: u64) -> Dataset {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(num_samples);
    for _ in 0..num_samples {
        let x0: f64 = rng.gen_range(-1.0..1.0);
        let mut row = vec![x0];
        for _ in 0..9 {
            row.push(rng.gen_range(-1.0..1.0));
        }
        row.push(if x0 > 0.0 { 1.0 } else { 0.0 });
        rows.push(row);
    }
    Dataset::new(DenseMatrix::from_rows(&rows), 10).expect("valid dataset")
}

/// Three well-separated Gaussian-ish clusters, 50 samples each.
pub fn three_clusters(seed: u64) -> Dataset {
    let centers = [(0.0, 0.0), (3.0, 3.0), (6.0, 0.0)];
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(150);
    for (label, &(cx, cy)) in centers.iter().enumerate() {
        for _ in 0..50 {
            let x = cx + rng.gen_range(-0.5..0.5);
            let y = cy + rng.gen_range(-0.5..0.5);
            rows.push(vec![x, y, label as f64]);
        }
    }
    Dataset::new(DenseMatrix::from_rows(&rows), 2).expect("valid dataset")
}

/// The training labels of `dataset`, in row order.
pub fn labels(dataset: &Dataset) -> Vec<f64> {
    (0..dataset.num_samples())
        .map(|row| dataset.get(row, dataset.dependent_var_id()))
        .collect()
}
