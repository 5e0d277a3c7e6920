//! Pool-specific error types.

use std::error::Error;
use std::fmt;

use mpool_list::ListError;

use crate::pool::Pool;
use crate::range::Address;

/// Errors that can occur during pool operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolError {
    /// The system allocator could not supply the arena or a list node.
    AllocationFailure,
    /// No free range can hold the request at its alignment.
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
        /// Alignment the request needed.
        alignment: usize,
        /// Length of the largest free range at the time of the request.
        largest_free: usize,
    },
    /// `free` (or a lookup) was given an address that is not the start of a
    /// live allocation in this pool.
    InvalidAddress {
        /// The rejected address.
        address: Address,
    },
    /// `destroy` was called while allocations were still live.
    OutstandingAllocations {
        /// Number of live allocations.
        count: usize,
        /// Bytes they cover (including alignment slack).
        bytes: usize,
    },
    /// A request for zero bytes. Ranges are never empty.
    ZeroSizedRequest,
    /// The pool configuration failed validation.
    InvalidConfig {
        /// What was wrong.
        reason: &'static str,
    },
    /// The pool's own bookkeeping handed the list a handle it rejected.
    /// Only an internal bug can produce this.
    Corrupted {
        /// The underlying list error.
        detail: ListError,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailure => write!(f, "backing memory allocation failed"),
            Self::OutOfMemory {
                requested,
                alignment,
                largest_free,
            } => {
                write!(
                    f,
                    "out of pool memory: requested {requested} bytes (align {alignment}), largest free range {largest_free} bytes"
                )
            }
            Self::InvalidAddress { address } => {
                write!(f, "address {address} is not a live allocation")
            }
            Self::OutstandingAllocations { count, bytes } => {
                write!(
                    f,
                    "pool still has {count} outstanding allocations ({bytes} bytes)"
                )
            }
            Self::ZeroSizedRequest => write!(f, "zero-sized allocation request"),
            Self::InvalidConfig { reason } => write!(f, "invalid pool config: {reason}"),
            Self::Corrupted { detail } => write!(f, "pool bookkeeping corrupted: {detail}"),
        }
    }
}

impl Error for PoolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Corrupted { detail } => Some(detail),
            _ => None,
        }
    }
}

impl From<ListError> for PoolError {
    fn from(err: ListError) -> Self {
        match err {
            ListError::AllocationFailure => Self::AllocationFailure,
            detail => Self::Corrupted { detail },
        }
    }
}

/// A refused [`Pool::destroy`](crate::Pool::destroy).
///
/// Carries the pool back to the caller untouched, so outstanding
/// allocations can still be freed before trying again.
pub struct DestroyError {
    pool: Box<Pool>,
    error: PoolError,
}

impl DestroyError {
    pub(crate) fn new(pool: Pool, error: PoolError) -> Self {
        Self {
            pool: Box::new(pool),
            error,
        }
    }

    /// Why the destroy was refused.
    pub fn error(&self) -> &PoolError {
        &self.error
    }

    /// Recover the still-live pool.
    pub fn into_pool(self) -> Pool {
        *self.pool
    }
}

impl fmt::Debug for DestroyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestroyError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for DestroyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool destroy refused: {}", self.error)
    }
}

impl Error for DestroyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_allocation_failure_maps_to_allocation_failure() {
        assert_eq!(
            PoolError::from(ListError::AllocationFailure),
            PoolError::AllocationFailure
        );
    }

    #[test]
    fn out_of_memory_message_names_request() {
        let err = PoolError::OutOfMemory {
            requested: 64,
            alignment: 16,
            largest_free: 32,
        };
        let msg = err.to_string();
        assert!(msg.contains("64"));
        assert!(msg.contains("32"));
    }

    #[test]
    fn invalid_address_message_is_hex() {
        let err = PoolError::InvalidAddress {
            address: Address::from(0x1000),
        };
        assert!(err.to_string().contains("0x1000"));
    }
}
