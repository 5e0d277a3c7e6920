//! Benchmark workloads for the mpool allocator.
//!
//! - [`churn_profile`]: seeded mixed-size alloc/free stream
//! - [`fragmented_pool`]: a pool left with many small free holes
//! - [`run_ops`]: drive a pool through a prepared op list

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use mpool_arena::{Address, Pool, PoolConfig, PoolError};
use mpool_test_utils::{apply, Applied, Churn, Op, ShadowModel};

/// Pool size shared by the churn benchmarks.
pub const CHURN_POOL_SIZE: usize = 64 * 1024;

/// Build a pool for benchmarking: per-op invariant checks off.
pub fn bench_pool(size: usize) -> Result<Pool, PoolError> {
    Pool::with_config(PoolConfig::new(size).with_verify_invariants(false))
}

/// `steps` ops of seeded churn: sizes `1..=256`, 40% frees.
pub fn churn_profile(seed: u64, steps: usize) -> Vec<Op> {
    Churn::new(seed, 256, 40).take(steps).collect()
}

/// Run `ops` against `pool`, returning how many allocations failed.
pub fn run_ops(pool: &mut Pool, model: &mut ShadowModel, ops: &[Op]) -> Result<usize, PoolError> {
    let mut failures = 0;
    for &op in ops {
        if let Applied::OutOfMemory = apply(pool, model, op)? {
            failures += 1;
        }
    }
    Ok(failures)
}

/// Fill `size` bytes with `block`-byte allocations and free every other one.
///
/// Returns the pool and the allocations still live. The free list ends up
/// with roughly `size / (2 * block)` non-adjacent ranges, which is the
/// worst case for a first-fit scan.
pub fn fragmented_pool(size: usize, block: usize) -> Result<(Pool, Vec<Address>), PoolError> {
    let mut pool = bench_pool(size)?;
    let mut live = Vec::new();
    loop {
        match pool.alloc(block) {
            Ok(addr) => live.push(addr),
            Err(PoolError::OutOfMemory { .. }) => break,
            Err(err) => return Err(err),
        }
    }
    let mut kept = Vec::with_capacity(live.len() / 2 + 1);
    for (i, addr) in live.into_iter().enumerate() {
        if i % 2 == 0 {
            pool.free(addr)?;
        } else {
            kept.push(addr);
        }
    }
    Ok((pool, kept))
}
