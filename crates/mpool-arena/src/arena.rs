//! Fixed-capacity backing store.
//!
//! An [`Arena`] is a single zero-initialised `Vec<u8>` reserved once at
//! pool creation. It never grows, shrinks, or moves, so the base address is
//! stable for the arena's whole lifetime.

use crate::error::PoolError;
use crate::range::Address;

/// Contiguous backing memory for one pool.
pub struct Arena {
    data: Vec<u8>,
}

impl Arena {
    /// Reserve and zero `size` bytes.
    ///
    /// Uses `try_reserve_exact`, so exhaustion surfaces as
    /// [`PoolError::AllocationFailure`] instead of aborting.
    pub fn new(size: usize) -> Result<Self, PoolError> {
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| PoolError::AllocationFailure)?;
        data.resize(size, 0);
        Ok(Self { data })
    }

    /// Address of byte zero.
    pub fn base(&self) -> Address {
        Address::from(self.data.as_ptr() as usize)
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Shared view of `len` bytes at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the capacity.
    pub fn slice(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Mutable view of `len` bytes at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the capacity.
    pub fn slice_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.data[offset..offset + len]
    }
}
