//! Pool smoke test host.
//!
//! Runs a create/destroy check at the requested pool size and an alloc/free
//! cycle of doubling sizes on a 1024-byte pool. Each check prints a
//! `PASS:` or `FAIL:` line to stderr (and to `$TH_RESULTS_FILE` when set);
//! the run stops at the first failing group and exits non-zero.
//!
//! ```text
//! cargo run -p mpool --example pool_host [poolsize]
//! ```

use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;

use log::info;
use mpool::prelude::*;

const DEFAULT_POOL_SIZE: usize = 1024;
const CYCLE_SIZES: [usize; 10] = [1, 2, 4, 8, 16, 32, 64, 128, 256, 512];

/// PASS/FAIL reporter.
struct Checker {
    results: Option<File>,
}

impl Checker {
    fn from_env() -> io::Result<Self> {
        let results = match std::env::var_os("TH_RESULTS_FILE") {
            Some(path) => Some(File::create(path)?),
            None => None,
        };
        Ok(Self { results })
    }

    fn check(&mut self, ok: bool, message: impl AsRef<str>) -> bool {
        let line = format!("{}: {}", if ok { "PASS" } else { "FAIL" }, message.as_ref());
        eprintln!("{line}");
        if let Some(file) = self.results.as_mut() {
            let _ = writeln!(file, "{line}").and_then(|()| file.flush());
        }
        ok
    }
}

fn parse_pool_size(arg: Option<String>) -> usize {
    arg.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_POOL_SIZE)
}

fn test_create_destroy(th: &mut Checker, pool_size: usize) -> bool {
    let pool = match Pool::create(pool_size) {
        Ok(pool) => pool,
        Err(err) => return th.check(false, format!("Pool::create({pool_size}) failed: {err}")),
    };
    th.check(true, format!("Pool::create({pool_size}) succeeded at {}", pool.base()));

    let mut ok = th.check(
        pool.size() >= pool_size,
        format!("pool size ({}) is >= requested ({pool_size})", pool.size()),
    );
    ok &= th.check(
        pool.allocations().next().is_none(),
        "alloc list is empty",
    );

    let free: Vec<Range> = pool.free_ranges().collect();
    ok &= th.check(!free.is_empty(), "free list is not empty");
    if let Some(first) = free.first() {
        ok &= th.check(
            first.offset == 0,
            format!("free list first entry offset is zero ({})", first.offset),
        );
        ok &= th.check(
            first.length == pool.size(),
            format!("free list first entry covers the pool ({})", first.length),
        );
    }

    match pool.destroy() {
        Ok(()) => ok & th.check(true, "destroy of empty pool succeeded"),
        Err(err) => th.check(false, format!("destroy of empty pool failed: {err}")),
    }
}

fn test_alloc_free(th: &mut Checker) -> bool {
    let config = PoolConfig::new(DEFAULT_POOL_SIZE).with_destroy_policy(DestroyPolicy::ForceRelease);
    let mut pool = match Pool::with_config(config) {
        Ok(pool) => pool,
        Err(err) => return th.check(false, format!("Pool::with_config failed: {err}")),
    };

    let mut live: Vec<(Address, usize)> = Vec::with_capacity(CYCLE_SIZES.len());
    let mut ok = true;
    for &size in &CYCLE_SIZES {
        let addr = match pool.alloc(size) {
            Ok(addr) => addr,
            Err(err) => {
                ok = th.check(false, format!("alloc for size {size} failed: {err}"));
                break;
            }
        };
        th.check(true, format!("alloc ({addr}) for size {size} succeeded"));

        let offset = addr.offset_from(pool.base()).unwrap_or(usize::MAX);
        ok = th.check(
            offset.checked_add(size).is_some_and(|end| end <= pool.size()),
            format!("alloc ({addr}) for size {size} is inside pool"),
        );
        if !ok {
            break;
        }

        let align = size.min(16);
        ok = th.check(
            offset % align == 0,
            format!("alloc ({addr}) is aligned to {align} for size {size}"),
        );

        for &(other, other_size) in &live {
            ok &= th.check(
                other.get() + other_size <= addr.get() || addr.get() + size <= other.get(),
                format!("alloc ({addr}) does not overlap {other}"),
            );
        }
        if !ok {
            break;
        }
        live.push((addr, size));
    }

    for (addr, _) in live.drain(..) {
        if let Err(err) = pool.free(addr) {
            ok = th.check(false, format!("free ({addr}) failed: {err}"));
        }
    }

    if ok {
        match pool.alloc(DEFAULT_POOL_SIZE) {
            Ok(addr) => {
                ok = th.check(
                    true,
                    format!("alloc ({addr}) for size {DEFAULT_POOL_SIZE} after freeing everything succeeded"),
                );
                let offset = addr.offset_from(pool.base()).unwrap_or(usize::MAX);
                ok &= th.check(
                    offset.checked_add(DEFAULT_POOL_SIZE).is_some_and(|end| end <= pool.size()),
                    format!("alloc ({addr}) for size {DEFAULT_POOL_SIZE} is inside pool"),
                );
                if let Err(err) = pool.free(addr) {
                    ok = th.check(false, format!("free ({addr}) failed: {err}"));
                }
            }
            Err(err) => {
                ok = th.check(
                    false,
                    format!("alloc for size {DEFAULT_POOL_SIZE} after freeing everything failed: {err}"),
                );
            }
        }
    }

    let stats = pool.stats();
    info!(
        "cycle done: {} allocs, {} frees, {} coalesces",
        stats.total_allocs, stats.total_frees, stats.coalesces
    );

    if let Err(err) = pool.destroy() {
        ok = th.check(false, format!("destroy failed: {err}"));
    }
    ok
}

fn main() -> ExitCode {
    env_logger::init();

    let pool_size = parse_pool_size(std::env::args().nth(1));
    let mut th = match Checker::from_env() {
        Ok(th) => th,
        Err(err) => {
            eprintln!("ERROR: cannot open results file: {err}");
            return ExitCode::FAILURE;
        }
    };

    if !test_create_destroy(&mut th, pool_size) {
        return ExitCode::FAILURE;
    }
    if !test_alloc_free(&mut th) {
        return ExitCode::FAILURE;
    }

    println!("ALL DONE");
    ExitCode::SUCCESS
}
