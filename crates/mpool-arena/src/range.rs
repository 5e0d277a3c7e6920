//! Byte ranges and user-visible addresses.

use std::fmt;

/// Numeric address of an allocation: `arena_base + offset`.
///
/// The pool never dereferences an `Address`; byte access goes through
/// [`Pool::bytes`](crate::Pool::bytes) and
/// [`Pool::bytes_mut`](crate::Pool::bytes_mut).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(usize);

impl Address {
    /// The raw numeric address.
    pub fn get(self) -> usize {
        self.0
    }

    /// Distance from `base` to this address, or `None` if it lies below.
    pub fn offset_from(self, base: Address) -> Option<usize> {
        self.0.checked_sub(base.0)
    }
}

impl From<usize> for Address {
    fn from(raw: usize) -> Self {
        Self(raw)
    }
}

impl From<Address> for usize {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A half-open byte interval `[offset, offset + length)` inside the arena.
///
/// For allocated ranges `requested_length` is what the caller asked for;
/// `length` may be larger by up to `alignment - 1` bytes of slack. For free
/// ranges the two are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    /// Start of the range, relative to the arena base.
    pub offset: usize,
    /// Bytes covered by the range. Never zero.
    pub length: usize,
    /// Bytes the caller requested.
    pub requested_length: usize,
}

impl Range {
    pub(crate) fn free(offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            requested_length: length,
        }
    }

    /// One past the last byte of the range.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Bytes covered beyond the requested length.
    pub fn slack(&self) -> usize {
        self.length - self.requested_length
    }

    /// Whether `offset` lies inside the range.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.offset && offset < self.end()
    }

    /// Whether `next` starts exactly where this range ends.
    pub fn touches(&self, next: &Range) -> bool {
        self.end() == next.offset
    }

    /// Whether the two ranges share at least one byte.
    pub fn overlaps(&self, other: &Range) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.offset, self.end())
    }
}
