//! Structural invariant checks for a [`Pool`].
//!
//! The audit walks both lists and the offset index and reports the first
//! broken invariant. It allocates scratch vectors, so it is meant for tests
//! and for the optional per-operation check, not for hot paths.

use std::error::Error;
use std::fmt;

use crate::align::alignment_for;
use crate::pool::Pool;
use crate::range::Range;

/// A broken pool invariant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A range with zero length.
    EmptyRange {
        /// The offending range.
        range: Range,
    },
    /// A range reaching past the end of the arena.
    OutOfBounds {
        /// The offending range.
        range: Range,
        /// Arena size.
        size: usize,
    },
    /// Free ranges out of ascending offset order.
    UnsortedFreeList {
        /// The earlier list entry.
        prev: Range,
        /// The later list entry.
        next: Range,
    },
    /// Two adjacent free ranges that should have been merged.
    Uncoalesced {
        /// The lower range.
        prev: Range,
        /// The range starting at `prev.end()`.
        next: Range,
    },
    /// Two ranges sharing bytes.
    Overlap {
        /// One range.
        a: Range,
        /// The other range.
        b: Range,
    },
    /// Bytes that belong to no range.
    Gap {
        /// First uncovered offset.
        offset: usize,
    },
    /// Free and allocated lengths do not add up to the arena size.
    SizeMismatch {
        /// Sum of all range lengths.
        accounted: usize,
        /// Arena size.
        size: usize,
    },
    /// An allocation whose requested length is zero or exceeds its length.
    BadRequestLength {
        /// The offending range.
        range: Range,
    },
    /// An allocation not aligned for its requested length.
    Misaligned {
        /// The offending range.
        range: Range,
        /// Alignment it needed.
        alignment: usize,
    },
    /// The offset index and the alloc list disagree.
    IndexMismatch {
        /// An offset present in one but not the other.
        offset: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRange { range } => write!(f, "empty range at offset {}", range.offset),
            Self::OutOfBounds { range, size } => {
                write!(f, "range {range} exceeds arena size {size}")
            }
            Self::UnsortedFreeList { prev, next } => {
                write!(f, "free list out of order: {prev} before {next}")
            }
            Self::Uncoalesced { prev, next } => {
                write!(f, "adjacent free ranges {prev} and {next} not merged")
            }
            Self::Overlap { a, b } => write!(f, "ranges {a} and {b} overlap"),
            Self::Gap { offset } => write!(f, "offset {offset} is neither free nor allocated"),
            Self::SizeMismatch { accounted, size } => {
                write!(f, "ranges cover {accounted} bytes, arena has {size}")
            }
            Self::BadRequestLength { range } => write!(
                f,
                "allocation {range} has requested length {}",
                range.requested_length
            ),
            Self::Misaligned { range, alignment } => {
                write!(f, "allocation {range} not aligned to {alignment}")
            }
            Self::IndexMismatch { offset } => {
                write!(f, "offset index and alloc list disagree at offset {offset}")
            }
        }
    }
}

impl Error for InvariantViolation {}

/// Check every pool invariant.
pub(crate) fn audit(pool: &Pool) -> Result<(), InvariantViolation> {
    let size = pool.size();
    let free: Vec<Range> = pool.free_ranges().collect();
    let allocated: Vec<Range> = pool.allocations().map(|(_, r)| r).collect();

    for range in free.iter().chain(&allocated) {
        if range.length == 0 {
            return Err(InvariantViolation::EmptyRange { range: *range });
        }
        if range.offset.checked_add(range.length).is_none_or(|end| end > size) {
            return Err(InvariantViolation::OutOfBounds {
                range: *range,
                size,
            });
        }
    }

    for pair in free.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev.offset >= next.offset {
            return Err(InvariantViolation::UnsortedFreeList { prev, next });
        }
        if prev.touches(&next) {
            return Err(InvariantViolation::Uncoalesced { prev, next });
        }
    }

    for range in &allocated {
        if range.requested_length == 0 || range.requested_length > range.length {
            return Err(InvariantViolation::BadRequestLength { range: *range });
        }
        let alignment = alignment_for(range.requested_length);
        if range.offset % alignment != 0 {
            return Err(InvariantViolation::Misaligned {
                range: *range,
                alignment,
            });
        }
    }

    let accounted: usize = free.iter().chain(&allocated).map(|r| r.length).sum();
    if accounted != size {
        return Err(InvariantViolation::SizeMismatch { accounted, size });
    }

    let mut all: Vec<Range> = free.iter().chain(&allocated).copied().collect();
    all.sort_unstable_by_key(|r| r.offset);
    let mut cursor = 0;
    let mut prev: Option<Range> = None;
    for range in all {
        if range.offset < cursor {
            if let Some(p) = prev {
                return Err(InvariantViolation::Overlap { a: p, b: range });
            }
        }
        if range.offset > cursor {
            return Err(InvariantViolation::Gap { offset: cursor });
        }
        cursor = range.end();
        prev = Some(range);
    }
    if cursor != size {
        return Err(InvariantViolation::Gap { offset: cursor });
    }

    if pool.live_index_len() != allocated.len() {
        let offset = allocated
            .iter()
            .map(|r| r.offset)
            .find(|&off| !pool.is_indexed(off))
            .unwrap_or(0);
        return Err(InvariantViolation::IndexMismatch { offset });
    }
    for range in &allocated {
        if !pool.is_indexed(range.offset) {
            return Err(InvariantViolation::IndexMismatch {
                offset: range.offset,
            });
        }
    }

    Ok(())
}
