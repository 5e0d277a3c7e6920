//! Workload generators and reference models for mpool development.
//!
//! Provides an [`Op`] workload vocabulary, proptest strategies that produce
//! op sequences, a [`ShadowModel`] that tracks what a pool should contain,
//! and a seeded [`Churn`] generator for benchmarks and soak tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use mpool_arena::{Address, Pool, PoolError};
use proptest::prelude::*;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One step of an allocator workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Allocate this many bytes.
    Alloc(usize),
    /// Free a live allocation, chosen as `index % live_count`.
    Free(usize),
}

/// Request sizes biased toward the small alignment tiers.
pub fn arb_size(max: usize) -> impl Strategy<Value = usize> {
    let max = max.max(1);
    prop_oneof![
        3 => 1usize..=max.min(8),
        2 => 1usize..=max.min(32),
        1 => 1usize..=max,
    ]
}

/// A single op; allocations outnumber frees roughly two to one.
pub fn arb_op(max_size: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => arb_size(max_size).prop_map(Op::Alloc),
        1 => any::<usize>().prop_map(Op::Free),
    ]
}

/// A sequence of up to `max_len` ops.
pub fn arb_ops(max_size: usize, max_len: usize) -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(arb_op(max_size), 1..max_len.max(2))
}

/// What the caller believes is live in a pool.
#[derive(Clone, Debug, Default)]
pub struct ShadowModel {
    live: Vec<(Address, usize)>,
}

impl ShadowModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live allocations.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Live `(address, requested size)` pairs in allocation order.
    pub fn live(&self) -> &[(Address, usize)] {
        &self.live
    }

    /// Sum of requested sizes.
    pub fn requested_bytes(&self) -> usize {
        self.live.iter().map(|&(_, size)| size).sum()
    }

    pub fn record_alloc(&mut self, address: Address, size: usize) {
        self.live.push((address, size));
    }

    /// Forget the allocation picked by `index % len`.
    pub fn take(&mut self, index: usize) -> Option<(Address, usize)> {
        if self.live.is_empty() {
            return None;
        }
        let pos = index % self.live.len();
        Some(self.live.swap_remove(pos))
    }

    /// First pair of live allocations whose requested bytes overlap.
    pub fn find_overlap(&self) -> Option<((Address, usize), (Address, usize))> {
        let mut sorted = self.live.clone();
        sorted.sort_unstable_by_key(|&(addr, _)| addr);
        sorted
            .windows(2)
            .find(|w| w[0].0.get() + w[0].1 > w[1].0.get())
            .map(|w| (w[0], w[1]))
    }
}

/// Outcome of [`apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Allocated(Address, usize),
    Freed(Address),
    OutOfMemory,
    /// A `Free` with nothing live.
    Skipped,
}

/// Run one op against `pool`, keeping `model` in step.
///
/// Out-of-memory is an expected outcome; any other error is returned.
pub fn apply(pool: &mut Pool, model: &mut ShadowModel, op: Op) -> Result<Applied, PoolError> {
    match op {
        Op::Alloc(size) => match pool.alloc(size) {
            Ok(addr) => {
                model.record_alloc(addr, size);
                Ok(Applied::Allocated(addr, size))
            }
            Err(PoolError::OutOfMemory { .. }) => Ok(Applied::OutOfMemory),
            Err(err) => Err(err),
        },
        Op::Free(index) => match model.take(index) {
            Some((addr, _)) => {
                pool.free(addr)?;
                Ok(Applied::Freed(addr))
            }
            None => Ok(Applied::Skipped),
        },
    }
}

/// Free everything the model still holds.
pub fn drain(pool: &mut Pool, model: &mut ShadowModel) -> Result<(), PoolError> {
    while let Some((addr, _)) = model.take(0) {
        pool.free(addr)?;
    }
    Ok(())
}

/// Sizes `1, 2, 4, ..., 2^(n-1)`, which sum to `2^n - 1` and fill a pool
/// of that size exactly under high-end carving.
pub fn doubling_sizes(n: u32) -> Vec<usize> {
    (0..n).map(|i| 1usize << i).collect()
}

/// Deterministic alloc/free churn driven by a seeded ChaCha8 stream.
///
/// Each op is a `Free` with probability `free_percent / 100` and otherwise
/// an `Alloc` of `1..=max_size` bytes.
pub struct Churn {
    rng: ChaCha8Rng,
    max_size: usize,
    free_percent: u64,
}

impl Churn {
    pub fn new(seed: u64, max_size: usize, free_percent: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_size: max_size.max(1),
            free_percent: free_percent.min(100),
        }
    }

    /// Next op of the workload.
    pub fn next_op(&mut self) -> Op {
        if self.rng.next_u64() % 100 < self.free_percent {
            Op::Free(self.rng.next_u64() as usize)
        } else {
            let size = 1 + (self.rng.next_u64() % self.max_size as u64) as usize;
            Op::Alloc(size)
        }
    }
}

impl Iterator for Churn {
    type Item = Op;

    fn next(&mut self) -> Option<Op> {
        Some(self.next_op())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn churn_is_deterministic() {
        let a: Vec<_> = Churn::new(7, 64, 40).take(100).collect();
        let b: Vec<_> = Churn::new(7, 64, 40).take(100).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn churn_sizes_within_bounds() {
        for op in Churn::new(1, 10, 0).take(500) {
            match op {
                Op::Alloc(size) => assert!((1..=10).contains(&size)),
                Op::Free(_) => panic!("free_percent 0 never frees"),
            }
        }
    }

    #[test]
    fn doubling_sizes_sum() {
        let sizes = doubling_sizes(10);
        assert_eq!(sizes.len(), 10);
        assert_eq!(sizes.iter().sum::<usize>(), 1023);
    }

    #[test]
    fn shadow_model_detects_overlap() {
        let mut model = ShadowModel::new();
        model.record_alloc(Address::from(100), 10);
        model.record_alloc(Address::from(110), 10);
        assert!(model.find_overlap().is_none());
        model.record_alloc(Address::from(105), 2);
        assert!(model.find_overlap().is_some());
    }

    #[test]
    fn apply_and_drain_round_trip() {
        let mut pool = Pool::create(256).unwrap();
        let mut model = ShadowModel::new();
        for op in [Op::Alloc(10), Op::Alloc(20), Op::Free(0), Op::Alloc(300)] {
            apply(&mut pool, &mut model, op).unwrap();
        }
        assert_eq!(model.len(), 1);
        drain(&mut pool, &mut model).unwrap();
        assert!(model.is_empty());
        assert_eq!(pool.stats().live_allocations, 0);
        pool.destroy().unwrap();
    }
}
