//! Size-tiered alignment policy and alignment arithmetic.
//!
//! Alignment is measured relative to the arena base, so an offset is
//! aligned when `offset % alignment == 0`.

/// Largest alignment the pool ever applies.
pub const MAX_ALIGNMENT: usize = 16;

/// Alignment for a request of `size` bytes.
///
/// | size   | alignment |
/// |--------|-----------|
/// | 1      | 1         |
/// | 2      | 2         |
/// | 3..=4  | 4         |
/// | 5..=8  | 8         |
/// | > 8    | 16        |
///
/// A zero-sized request is given alignment 1; the pool rejects it before
/// alignment matters.
pub const fn alignment_for(size: usize) -> usize {
    match size {
        0 | 1 => 1,
        2 => 2,
        3..=4 => 4,
        5..=8 => 8,
        _ => MAX_ALIGNMENT,
    }
}

/// Round `value` down to a multiple of `alignment` (a power of two).
pub const fn align_down(value: usize, alignment: usize) -> usize {
    value & !(alignment - 1)
}

/// Round `value` up to a multiple of `alignment` (a power of two).
///
/// Returns `None` on overflow.
pub const fn align_up(value: usize, alignment: usize) -> Option<usize> {
    match value.checked_add(alignment - 1) {
        Some(v) => Some(align_down(v, alignment)),
        None => None,
    }
}
