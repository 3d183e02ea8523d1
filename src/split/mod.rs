//! Deterministic train/val/test partitioning.
//!
//! Items are shuffled with the pinned procedure in [`shuffle`] and cut into
//! three consecutive runs. Subset sizes use round-half-away-from-zero:
//!
//! ```text
//! n_train = round(n * train)
//! n_val   = round((n - n_train) * val / (1 - train))
//! n_test  = n - n_train - n_val
//! ```
//!
//! Small inputs may produce empty subsets; that is not an error.

pub mod shuffle;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PrepError;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Validated train/val ratios. The test ratio is derived.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SplitRatios {
    train: f64,
    val: f64,
}

impl SplitRatios {
    /// # Errors
    /// Returns [`PrepError::InvalidRatio`] unless `0 < train < 1`,
    /// `0 < val < 1` and `train + val < 1`.
    pub fn new(train: f64, val: f64) -> Result<Self, PrepError> {
        let in_unit = |r: f64| r > 0.0 && r < 1.0;
        if !(in_unit(train) && in_unit(val) && train + val < 1.0) {
            return Err(PrepError::InvalidRatio { train, val });
        }
        Ok(Self { train, val })
    }

    pub fn train(&self) -> f64 {
        self.train
    }

    pub fn val(&self) -> f64 {
        self.val
    }

    pub fn test(&self) -> f64 {
        1.0 - self.train - self.val
    }

    /// `(n_train, n_val, n_test)` for `total` items.
    pub fn counts(&self, total: usize) -> (usize, usize, usize) {
        let n_train = ((total as f64 * self.train).round() as usize).min(total);
        let rest = total - n_train;
        let val_of_rest = self.val / (1.0 - self.train);
        let n_val = ((rest as f64 * val_of_rest).round() as usize).min(rest);
        (n_train, n_val, rest - n_val)
    }
}

/// One of the three dataset subsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitName {
    Train,
    Val,
    Test,
}

impl SplitName {
    pub const ALL: [SplitName; 3] = [SplitName::Train, SplitName::Val, SplitName::Test];

    /// Directory name under the images/labels roots.
    pub fn as_str(self) -> &'static str {
        match self {
            SplitName::Train => "train",
            SplitName::Val => "val",
            SplitName::Test => "test",
        }
    }
}

impl fmt::Display for SplitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Three disjoint subsets whose union is the split input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition<T> {
    pub train: Vec<T>,
    pub val: Vec<T>,
    pub test: Vec<T>,
}

impl<T> Partition<T> {
    pub fn get(&self, split: SplitName) -> &[T] {
        match split {
            SplitName::Train => &self.train,
            SplitName::Val => &self.val,
            SplitName::Test => &self.test,
        }
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Subsets in train, val, test order.
    pub fn iter(&self) -> impl Iterator<Item = (SplitName, &[T])> {
        SplitName::ALL.into_iter().map(move |split| (split, self.get(split)))
    }
}

/// Capability to partition an ordered collection.
pub trait DatasetSplitter {
    /// # Errors
    /// Returns [`PrepError::InvalidRatio`] when the ratios are out of domain.
    fn split<T>(&self, items: Vec<T>, train_ratio: f64, val_ratio: f64) -> Result<Partition<T>, PrepError>;

    /// Seed driving the shuffle, as recorded in reports.
    fn seed(&self) -> u64;
}

/// Shuffle-then-cut splitter with a fixed seed.
#[derive(Clone, Copy, Debug)]
pub struct SeededSplitter {
    seed: u64,
}

impl SeededSplitter {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for SeededSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl DatasetSplitter for SeededSplitter {
    fn split<T>(&self, mut items: Vec<T>, train_ratio: f64, val_ratio: f64) -> Result<Partition<T>, PrepError> {
        let ratios = SplitRatios::new(train_ratio, val_ratio)?;
        let (n_train, n_val, _) = ratios.counts(items.len());

        shuffle::fisher_yates(&mut items, self.seed);

        let mut val = items.split_off(n_train);
        let test = val.split_off(n_val);
        Ok(Partition {
            train: items,
            val,
            test,
        })
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratios_reject_out_of_domain_values() {
        for (train, val) in [
            (0.9, 0.2),
            (0.7, 0.3),
            (0.0, 0.2),
            (1.0, 0.0),
            (0.5, 0.0),
            (-0.1, 0.2),
            (f64::NAN, 0.1),
        ] {
            assert!(
                matches!(SplitRatios::new(train, val), Err(PrepError::InvalidRatio { .. })),
                "({}, {}) should be rejected",
                train,
                val
            );
        }
    }

    #[test]
    fn test_ratio_is_derived() {
        let ratios = SplitRatios::new(0.7, 0.2).unwrap();
        assert!((ratios.test() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn counts_follow_rounding_rule() {
        let ratios = SplitRatios::new(0.7, 0.2).unwrap();
        assert_eq!(ratios.counts(10), (7, 2, 1));
        assert_eq!(ratios.counts(9), (6, 2, 1));
        assert_eq!(ratios.counts(3), (2, 1, 0));
        assert_eq!(ratios.counts(1), (1, 0, 0));
        assert_eq!(ratios.counts(0), (0, 0, 0));

        let even = SplitRatios::new(0.8, 0.1).unwrap();
        assert_eq!(even.counts(100), (80, 10, 10));
    }

    #[test]
    fn split_is_pinned_for_default_seed() {
        let items: Vec<u32> = (0..10).collect();
        let partition = SeededSplitter::default().split(items, 0.7, 0.2).unwrap();

        assert_eq!(partition.train, vec![1, 8, 7, 9, 0, 6, 4]);
        assert_eq!(partition.val, vec![3, 2]);
        assert_eq!(partition.test, vec![5]);
    }

    #[test]
    fn split_rejects_ratios_summing_past_one() {
        let err = SeededSplitter::default()
            .split(vec![1, 2, 3], 0.9, 0.2)
            .unwrap_err();
        assert!(matches!(err, PrepError::InvalidRatio { .. }));
    }

    #[test]
    fn empty_input_gives_empty_partition() {
        let partition = SeededSplitter::default()
            .split(Vec::<u8>::new(), 0.7, 0.2)
            .unwrap();
        assert!(partition.is_empty());
    }

    #[test]
    fn iter_visits_splits_in_order() {
        let partition = SeededSplitter::new(1).split(vec!['a', 'b', 'c', 'd'], 0.5, 0.25).unwrap();
        let names: Vec<SplitName> = partition.iter().map(|(name, _)| name).collect();
        assert_eq!(names, SplitName::ALL.to_vec());
        assert_eq!(partition.len(), 4);
    }
}
