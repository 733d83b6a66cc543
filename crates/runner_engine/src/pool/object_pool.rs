//! Fixed-capacity object pool
//!
//! Lends pre-created handles and takes them back. The pool never creates or
//! destroys instances after construction; it only moves handles between its
//! inactive queue and its lent set.

use super::PoolError;
use std::collections::{HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

/// Statistics for a single pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Successful acquisitions since creation
    pub acquired: u64,
    /// Successful releases since creation
    pub released: u64,
    /// Acquisitions refused because nothing was inactive
    pub exhaustions: u64,
    /// Releases refused because the handle was not lent
    pub rejected_releases: u64,
    /// Highest number of simultaneously lent handles
    pub peak_lent: usize,
}

/// Pool of reusable handles
///
/// # Invariants
///
/// - Every handle in `members` is in exactly one of `inactive` or `lent`
/// - `inactive.len() + lent.len() == capacity()`
#[derive(Debug)]
pub struct ObjectPool<H> {
    /// Pool name, used for diagnostics
    key: String,
    /// Every handle this pool owns
    members: HashSet<H>,
    /// Handles available for lending, oldest-returned first
    inactive: VecDeque<H>,
    /// Handles currently lent out
    lent: HashSet<H>,
    /// Statistics for monitoring
    stats: PoolStats,
}

impl<H: Copy + Eq + Hash + Debug> ObjectPool<H> {
    /// Create a pool that owns `handles`, all initially inactive
    pub fn new(key: impl Into<String>, handles: impl IntoIterator<Item = H>) -> Self {
        let inactive: VecDeque<H> = handles.into_iter().collect();
        let members: HashSet<H> = inactive.iter().copied().collect();
        Self {
            key: key.into(),
            lent: HashSet::with_capacity(members.len()),
            members,
            inactive,
            stats: PoolStats::default(),
        }
    }

    /// Lend an inactive handle
    pub fn acquire(&mut self) -> Result<H, PoolError> {
        if let Some(handle) = self.inactive.pop_front() {
            self.lent.insert(handle);
            self.stats.acquired += 1;
            self.stats.peak_lent = self.stats.peak_lent.max(self.lent.len());
            Ok(handle)
        } else {
            self.stats.exhaustions += 1;
            Err(PoolError::Exhausted {
                key: self.key.clone(),
                capacity: self.capacity(),
            })
        }
    }

    /// Take back a lent handle
    ///
    /// Releasing a handle that is already inactive is rejected and leaves the
    /// inactive queue untouched.
    pub fn release(&mut self, handle: H) -> Result<(), PoolError> {
        if !self.members.contains(&handle) {
            self.stats.rejected_releases += 1;
            return Err(PoolError::ForeignHandle {
                key: self.key.clone(),
                handle: format!("{handle:?}"),
            });
        }
        if !self.lent.remove(&handle) {
            self.stats.rejected_releases += 1;
            return Err(PoolError::AlreadyReleased {
                key: self.key.clone(),
                handle: format!("{handle:?}"),
            });
        }
        self.inactive.push_back(handle);
        self.stats.released += 1;
        Ok(())
    }

    /// Whether `handle` is currently lent out
    pub fn is_lent(&self, handle: H) -> bool {
        self.lent.contains(&handle)
    }

    /// Handles currently lent out
    pub fn lent_handles(&self) -> impl Iterator<Item = H> + '_ {
        self.lent.iter().copied()
    }

    /// Number of inactive handles
    pub fn available_count(&self) -> usize {
        self.inactive.len()
    }

    /// Number of lent handles
    pub fn lent_count(&self) -> usize {
        self.lent.len()
    }

    /// Total capacity
    pub fn capacity(&self) -> usize {
        self.members.len()
    }

    /// Get statistics
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_pool_allocation() {
        let mut pool = ObjectPool::new("test", 0..10u32);

        let first = pool.acquire().expect("Should allocate");
        let second = pool.acquire().expect("Should allocate");

        assert_ne!(first, second);
        assert_eq!(pool.available_count(), 8);
        assert_eq!(pool.lent_count(), 2);
        assert_eq!(pool.stats().peak_lent, 2);
    }

    #[test]
    fn test_exhaustion_then_round_trip() {
        let mut pool = ObjectPool::new("test", 0..3u32);
        let lent: Vec<u32> = (0..3).map(|_| pool.acquire().expect("Should allocate")).collect();

        assert!(matches!(pool.acquire(), Err(PoolError::Exhausted { capacity: 3, .. })));
        assert!(matches!(pool.acquire(), Err(PoolError::Exhausted { .. })));
        assert_eq!(pool.stats().exhaustions, 2);

        for handle in &lent[..2] {
            pool.release(*handle).expect("Should release");
        }
        assert!(pool.acquire().is_ok());
        assert!(pool.acquire().is_ok());
        assert!(pool.acquire().is_err());
    }

    #[test]
    fn test_double_release_is_rejected() {
        let mut pool = ObjectPool::new("test", 0..2u32);
        let handle = pool.acquire().expect("Should allocate");

        pool.release(handle).expect("Should release");
        assert!(matches!(pool.release(handle), Err(PoolError::AlreadyReleased { .. })));

        // Inactive queue must not hold the handle twice
        assert_eq!(pool.available_count(), 2);
        assert_eq!(pool.lent_count(), 0);
        assert_eq!(pool.stats().rejected_releases, 1);
    }

    #[test]
    fn test_foreign_handle_is_rejected() {
        let mut pool = ObjectPool::new("test", 0..2u32);
        assert!(matches!(pool.release(99), Err(PoolError::ForeignHandle { .. })));
        assert_eq!(pool.available_count(), 2);
    }
}
