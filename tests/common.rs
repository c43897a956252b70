//! Common test utilities for the macid test suite.

#![allow(dead_code)]

use macid::{Macid, catalog};
use rand::{SeedableRng, rngs::StdRng};

/// Tolerance for comparing exact-inference results.
pub const EPS: f64 = 1e-9;

/// Assert two floats agree within [`EPS`].
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {expected}, got {actual}"
    );
}

/// Load a catalog model, panicking with its name on failure.
pub fn model(name: &str) -> Macid {
    catalog::by_name(name).unwrap_or_else(|err| panic!("catalog model {name}: {err}"))
}

/// Deterministic RNG for reproducible random models.
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Sorted expected utilities with near-equal values collapsed.
pub fn distinct_values(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().collect();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup_by(|later, earlier| (*later - *earlier).abs() < EPS);
    sorted
}

/// Assert two float sequences agree element-wise within [`EPS`].
#[track_caller]
pub fn assert_all_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < EPS, "{actual:?} vs {expected:?}");
    }
}
