//! Pinned, portable shuffle used by the dataset splitter.
//!
//! The permutation is part of the splitter's contract: re-running a
//! preparation must reproduce the same split, and other implementations must
//! be able to reproduce it bit for bit. The algorithm is therefore fixed here
//! rather than delegated to a general-purpose RNG whose stream may change
//! between releases.
//!
//! # Algorithm
//!
//! - Generator: 64-bit linear congruential generator with Knuth's MMIX
//!   constants, `state = state * 6364136223846793005 + 1442695040888963407`
//!   (wrapping). The initial state is the seed. Every draw advances the state
//!   once and yields its upper 32 bits.
//! - Shuffle: Durstenfeld Fisher–Yates. For `i` from `len - 1` down to `1`,
//!   `j = (draw * (i + 1)) >> 32` and items `i` and `j` are swapped.

const MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const INCREMENT: u64 = 1_442_695_040_888_963_407;

/// 64-bit LCG producing 32-bit draws.
#[derive(Clone, Debug)]
pub struct Lcg64 {
    state: u64,
}

impl Lcg64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT);
        (self.state >> 32) as u32
    }

    /// Index in `0..bound` by multiply-shift reduction. `bound` must be in
    /// `1..=u32::MAX as usize + 1`.
    fn next_index(&mut self, bound: usize) -> usize {
        ((u64::from(self.next_u32()) * bound as u64) >> 32) as usize
    }
}

/// Shuffle `items` in place with the pinned Fisher–Yates procedure.
pub fn fisher_yates<T>(items: &mut [T], seed: u64) {
    let mut rng = Lcg64::new(seed);
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}
