//! Pool configuration parameters.

use crate::error::PoolError;

/// What [`Pool::destroy`](crate::Pool::destroy) does when allocations are
/// still outstanding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DestroyPolicy {
    /// Refuse: return the pool to the caller inside a
    /// [`DestroyError`](crate::DestroyError) and release nothing.
    #[default]
    Refuse,
    /// Log a warning naming the leaked allocations, then release everything.
    ForceRelease,
}

/// Configuration for a [`Pool`](crate::Pool).
///
/// Validated at construction; immutable once the pool exists.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Arena capacity in bytes. Must be non-zero.
    pub size: usize,

    /// Behaviour of `destroy` with outstanding allocations.
    ///
    /// Default: [`DestroyPolicy::Refuse`].
    pub destroy_policy: DestroyPolicy,

    /// Audit every invariant after each mutating operation and panic on a
    /// violation.
    ///
    /// Default: on in debug builds, off in release builds.
    pub verify_invariants: bool,
}

impl PoolConfig {
    /// Default arena capacity used by [`Default`].
    pub const DEFAULT_SIZE: usize = 1024;

    /// Create a config for an arena of `size` bytes with default policies.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            destroy_policy: DestroyPolicy::default(),
            verify_invariants: cfg!(debug_assertions),
        }
    }

    /// Set the destroy policy.
    pub fn with_destroy_policy(mut self, policy: DestroyPolicy) -> Self {
        self.destroy_policy = policy;
        self
    }

    /// Enable or disable the per-operation invariant audit.
    pub fn with_verify_invariants(mut self, verify: bool) -> Self {
        self.verify_invariants = verify;
        self
    }

    /// Check structural requirements.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if `size` is zero or would put
    /// the arena end past `isize::MAX`.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.size == 0 {
            return Err(PoolError::InvalidConfig {
                reason: "pool size must be non-zero",
            });
        }
        if self.size > isize::MAX as usize {
            return Err(PoolError::InvalidConfig {
                reason: "pool size exceeds isize::MAX",
            });
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_size_is_1k() {
        let config = PoolConfig::default();
        assert_eq!(config.size, 1024);
        assert_eq!(config.destroy_policy, DestroyPolicy::Refuse);
    }

    #[test]
    fn builder_methods_override_defaults() {
        let config = PoolConfig::new(64)
            .with_destroy_policy(DestroyPolicy::ForceRelease)
            .with_verify_invariants(false);
        assert_eq!(config.size, 64);
        assert_eq!(config.destroy_policy, DestroyPolicy::ForceRelease);
        assert!(!config.verify_invariants);
    }

    #[test]
    fn zero_size_rejected() {
        assert!(matches!(
            PoolConfig::new(0).validate(),
            Err(PoolError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn oversized_rejected() {
        assert!(matches!(
            PoolConfig::new(usize::MAX).validate(),
            Err(PoolError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn one_byte_pool_is_valid() {
        assert!(PoolConfig::new(1).validate().is_ok());
    }
}
