//! First-fit pool allocator over a fixed arena.
//!
//! A [`Pool`] partitions its arena into ranges that are either allocated or
//! free. Allocated ranges live in the alloc list (allocation order) and are
//! indexed by offset; free ranges live in the free list in ascending offset
//! order with no two adjacent.
//!
//! ```text
//! offset 0                                                     size
//! ├── free ──┤├──── alloc ────┤├─ free ─┤├── alloc ──┤├── alloc ──┤
//!
//! alloc(n): first free range that fits, carve from its high end
//! free(a):  ordered insert into the free list, merge with neighbours
//! ```

use std::fmt;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use mpool_list::{List, ListError, NodeId};

use crate::align::{align_down, alignment_for};
use crate::arena::Arena;
use crate::audit::{self, InvariantViolation};
use crate::config::{DestroyPolicy, PoolConfig};
use crate::error::{DestroyError, PoolError};
use crate::range::{Address, Range};
use crate::stats::{Counters, PoolStats};

/// A memory pool handing out aligned sub-ranges of one arena.
///
/// Single-threaded: `alloc` and `free` take `&mut self`. Independent pools
/// share no state and can be used side by side.
pub struct Pool {
    config: PoolConfig,
    arena: Arena,
    /// Live allocations in allocation order.
    alloc_list: List<Range>,
    /// Free ranges in ascending offset order, never adjacent.
    free_list: List<Range>,
    /// Offset of each live allocation → its alloc-list node.
    live: IndexMap<usize, NodeId>,
    counters: Counters,
}

impl Pool {
    /// Create a pool of `size` bytes with the default config.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] for `size == 0`,
    /// [`PoolError::AllocationFailure`] if the arena cannot be reserved.
    pub fn create(size: usize) -> Result<Self, PoolError> {
        Self::with_config(PoolConfig::new(size))
    }

    /// Create a pool from an explicit config.
    pub fn with_config(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let arena = Arena::new(config.size)?;
        let mut free_list = List::new();
        free_list.append(Range::free(0, config.size))?;

        debug!(
            "created pool of {} bytes at {}",
            config.size,
            arena.base()
        );

        let pool = Self {
            config,
            arena,
            alloc_list: List::new(),
            free_list,
            live: IndexMap::new(),
            counters: Counters::default(),
        };
        pool.verify();
        Ok(pool)
    }

    /// Allocate `requested` bytes.
    ///
    /// The returned address is aligned (relative to [`base`](Self::base))
    /// according to [`alignment_for`]. The search is first-fit over the
    /// free list in ascending offset order; the allocation is carved from
    /// the high end of the chosen range, so alignment padding stays in the
    /// free remainder below it.
    ///
    /// # Errors
    ///
    /// - [`PoolError::ZeroSizedRequest`] for `requested == 0`.
    /// - [`PoolError::OutOfMemory`] if no free range fits; nothing changes.
    /// - [`PoolError::AllocationFailure`] if a list node cannot be created.
    pub fn alloc(&mut self, requested: usize) -> Result<Address, PoolError> {
        if requested == 0 {
            self.counters.failed_allocs += 1;
            return Err(PoolError::ZeroSizedRequest);
        }
        let alignment = alignment_for(requested);

        let Some((free_node, free, start)) = self.find_fit(requested, alignment) else {
            self.counters.failed_allocs += 1;
            let largest_free = self.largest_free();
            trace!(
                "alloc {requested} (align {alignment}) failed, largest free {largest_free}"
            );
            return Err(PoolError::OutOfMemory {
                requested,
                alignment,
                largest_free,
            });
        };

        let allocation = Range {
            offset: start,
            length: free.end() - start,
            requested_length: requested,
        };

        // Fallible steps first so a failure leaves both lists untouched.
        self.live
            .try_reserve(1)
            .map_err(|_| PoolError::AllocationFailure)?;
        let alloc_node = self.alloc_list.append(allocation)?;

        if start == free.offset {
            self.free_list.remove(free_node)?;
        } else if let Some(remainder) = self.free_list.get_mut(free_node) {
            *remainder = Range::free(free.offset, start - free.offset);
        }
        self.live.insert(allocation.offset, alloc_node);
        self.counters.allocs += 1;

        trace!("alloc {requested} (align {alignment}) -> {allocation} from free {free}");
        self.verify();
        Ok(self.address_of(allocation.offset))
    }

    /// Return the allocation starting at `address` to the free list.
    ///
    /// The range is inserted in offset order and merged with a contiguous
    /// predecessor and/or successor.
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidAddress`] if `address` is not the start of a
    ///   live allocation (double free, interior or foreign pointer). Nothing
    ///   changes.
    /// - [`PoolError::AllocationFailure`] if the free-list node cannot be
    ///   created. Nothing changes.
    pub fn free(&mut self, address: Address) -> Result<(), PoolError> {
        let Some((offset, alloc_node)) = self.lookup(address) else {
            self.counters.invalid_frees += 1;
            trace!("free {address} rejected: not a live allocation");
            return Err(PoolError::InvalidAddress { address });
        };
        let allocation = self.alloc_range(alloc_node)?;
        let released = Range::free(allocation.offset, allocation.length);

        let successor = self
            .free_list
            .iter()
            .find(|(_, r)| r.offset > released.offset)
            .map(|(node, _)| node);
        let node = match successor {
            Some(next) => self.free_list.insert_before(Some(next), released)?,
            None => self.free_list.append(released)?,
        };

        self.alloc_list.remove(alloc_node)?;
        self.live.swap_remove(&offset);
        let merges = self.coalesce(node)?;
        self.counters.frees += 1;
        self.counters.coalesces += merges;

        trace!("free {address} -> {released}, {merges} merges");
        self.verify();
        Ok(())
    }

    /// Tear the pool down.
    ///
    /// With outstanding allocations the outcome follows
    /// [`PoolConfig::destroy_policy`]: [`DestroyPolicy::Refuse`] hands the
    /// pool back inside the error, [`DestroyPolicy::ForceRelease`] logs a
    /// warning and releases everything anyway.
    pub fn destroy(mut self) -> Result<(), DestroyError> {
        let count = self.alloc_list.len();
        if count > 0 {
            let bytes = self.allocated_bytes();
            let policy = self.config.destroy_policy;
            match policy {
                DestroyPolicy::Refuse => {
                    return Err(DestroyError::new(
                        self,
                        PoolError::OutstandingAllocations { count, bytes },
                    ));
                }
                DestroyPolicy::ForceRelease => {
                    warn!(
                        "destroying pool at {} with {count} outstanding allocations ({bytes} bytes)",
                        self.base()
                    );
                    self.alloc_list.clear();
                    self.live.clear();
                }
            }
        }
        debug!("destroyed pool of {} bytes at {}", self.size(), self.base());
        Ok(())
    }

    /// Address of arena byte zero.
    pub fn base(&self) -> Address {
        self.arena.base()
    }

    /// Arena capacity in bytes.
    pub fn size(&self) -> usize {
        self.arena.capacity()
    }

    /// The config this pool was created with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Whether `address` is the start of a live allocation.
    pub fn contains(&self, address: Address) -> bool {
        self.lookup(address).is_some()
    }

    /// The live allocation starting at `address`.
    pub fn allocation(&self, address: Address) -> Option<Range> {
        let (_, node) = self.lookup(address)?;
        self.alloc_list.get(node).copied()
    }

    /// The requested bytes of the allocation at `address`.
    pub fn bytes(&self, address: Address) -> Result<&[u8], PoolError> {
        let range = self
            .allocation(address)
            .ok_or(PoolError::InvalidAddress { address })?;
        Ok(self.arena.slice(range.offset, range.requested_length))
    }

    /// Mutable view of the requested bytes of the allocation at `address`.
    pub fn bytes_mut(&mut self, address: Address) -> Result<&mut [u8], PoolError> {
        let range = self
            .allocation(address)
            .ok_or(PoolError::InvalidAddress { address })?;
        Ok(self.arena.slice_mut(range.offset, range.requested_length))
    }

    /// Free ranges in ascending offset order.
    pub fn free_ranges(&self) -> impl DoubleEndedIterator<Item = Range> + '_ {
        self.free_list.iter().map(|(_, r)| *r)
    }

    /// Live allocations in allocation order.
    pub fn allocations(&self) -> impl DoubleEndedIterator<Item = (Address, Range)> + '_ {
        self.alloc_list
            .iter()
            .map(|(_, r)| (self.address_of(r.offset), *r))
    }

    /// Current occupancy and cumulative counters.
    pub fn stats(&self) -> PoolStats {
        let (allocated_bytes, requested_bytes) = self
            .alloc_list
            .iter()
            .fold((0, 0), |(len, req), (_, r)| {
                (len + r.length, req + r.requested_length)
            });
        PoolStats {
            size: self.size(),
            allocated_bytes,
            requested_bytes,
            free_bytes: self.free_ranges().map(|r| r.length).sum(),
            live_allocations: self.alloc_list.len(),
            free_ranges: self.free_list.len(),
            largest_free: self.largest_free(),
            total_allocs: self.counters.allocs,
            total_frees: self.counters.frees,
            failed_allocs: self.counters.failed_allocs,
            invalid_frees: self.counters.invalid_frees,
            coalesces: self.counters.coalesces,
        }
    }

    /// Audit every structural invariant.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        audit::audit(self)
    }

    pub(crate) fn live_index_len(&self) -> usize {
        self.live.len()
    }

    pub(crate) fn is_indexed(&self, offset: usize) -> bool {
        self.live
            .get(&offset)
            .and_then(|&node| self.alloc_list.get(node))
            .is_some_and(|r| r.offset == offset)
    }

    /// First free range (ascending offset) with an aligned start that fits.
    ///
    /// Returns the node, a copy of the range, and the aligned start of the
    /// carve, which is the highest aligned offset that still leaves room
    /// for `requested` bytes before the range end.
    fn find_fit(&self, requested: usize, alignment: usize) -> Option<(NodeId, Range, usize)> {
        self.free_list.iter().find_map(|(node, free)| {
            let latest = free.end().checked_sub(requested)?;
            let start = align_down(latest, alignment);
            (start >= free.offset).then_some((node, *free, start))
        })
    }

    /// Merge the free range at `node` with contiguous neighbours.
    ///
    /// The free list had no adjacent pairs before `node` went in, so at most
    /// one merge per side is possible.
    fn coalesce(&mut self, node: NodeId) -> Result<u64, PoolError> {
        let mut merges = 0;
        let mut current = node;

        if let Some(prev) = self.free_list.prev(current) {
            let lower = self.free_range(prev)?;
            let this = self.free_range(current)?;
            if lower.touches(&this) {
                self.free_list.remove(current)?;
                self.grow_free(prev, this.length)?;
                current = prev;
                merges += 1;
            }
        }

        if let Some(next) = self.free_list.next(current) {
            let this = self.free_range(current)?;
            let upper = self.free_range(next)?;
            if this.touches(&upper) {
                self.free_list.remove(next)?;
                self.grow_free(current, upper.length)?;
                merges += 1;
            }
        }

        Ok(merges)
    }

    fn grow_free(&mut self, node: NodeId, by: usize) -> Result<(), PoolError> {
        let range = self
            .free_list
            .get_mut(node)
            .ok_or(PoolError::Corrupted {
                detail: ListError::StaleNode { node },
            })?;
        range.length += by;
        range.requested_length = range.length;
        Ok(())
    }

    fn free_range(&self, node: NodeId) -> Result<Range, PoolError> {
        self.free_list.get(node).copied().ok_or(PoolError::Corrupted {
            detail: ListError::StaleNode { node },
        })
    }

    fn alloc_range(&self, node: NodeId) -> Result<Range, PoolError> {
        self.alloc_list.get(node).copied().ok_or(PoolError::Corrupted {
            detail: ListError::StaleNode { node },
        })
    }

    fn lookup(&self, address: Address) -> Option<(usize, NodeId)> {
        let offset = address.offset_from(self.base())?;
        let &node = self.live.get(&offset)?;
        Some((offset, node))
    }

    fn address_of(&self, offset: usize) -> Address {
        Address::from(self.base().get() + offset)
    }

    fn largest_free(&self) -> usize {
        self.free_ranges().map(|r| r.length).max().unwrap_or(0)
    }

    fn allocated_bytes(&self) -> usize {
        self.alloc_list.iter().map(|(_, r)| r.length).sum()
    }

    fn verify(&self) {
        if !self.config.verify_invariants {
            return;
        }
        if let Err(violation) = self.check_invariants() {
            panic!("mpool: pool invariant violated: {violation}");
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        if !self.alloc_list.is_empty() {
            warn!(
                "dropping pool at {} with {} outstanding allocations ({} bytes)",
                self.base(),
                self.alloc_list.len(),
                self.allocated_bytes()
            );
        }
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("base", &self.base())
            .field("size", &self.size())
            .field("allocations", &self.alloc_list)
            .field("free", &self.free_list)
            .finish()
    }
}
