#![allow(dead_code)]

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// `(train, val)` with both in (0, 1) and `train + val < 1`.
pub fn arb_valid_ratios() -> impl Strategy<Value = (f64, f64)> {
    (0.01f64..0.97).prop_flat_map(|train| {
        let max_val = (0.99 - train).max(0.011);
        (Just(train), 0.01f64..max_val)
    })
}

/// `(train, val)` whose sum reaches or exceeds 1.
pub fn arb_overflowing_ratios() -> impl Strategy<Value = (f64, f64)> {
    (0.01f64..0.99).prop_flat_map(|train| (Just(train), (1.0 - train + 1e-9)..0.999))
}

/// Distinct item identities, in arbitrary order.
pub fn arb_items(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::btree_set(any::<u32>(), 0..max_len)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}
