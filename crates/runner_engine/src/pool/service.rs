//! Keyed pool service
//!
//! Coordinates one [`ObjectPool`] per key. Each key is a distinct namespace
//! (chunk, each obstacle variant, pickup, goal) whose instances are created
//! once in the [`World`] and then only ever lent and reclaimed.
//!
//! # Usage
//!
//! ```rust
//! use runner_engine::ecs::{EntityTag, World};
//! use runner_engine::pool::PoolService;
//!
//! let mut world = World::new();
//! let mut pools = PoolService::new();
//! pools.init_pool(&mut world, "Rock", 4, |world, i| {
//!     world.create_entity(format!("Rock_{i}"), EntityTag::OBSTACLE)
//! });
//!
//! let rock = pools.acquire("Rock").expect("pool has capacity");
//! world.set_active(rock, true);
//! pools.release(&mut world, "Rock", rock).expect("rock was lent");
//! assert!(!world.is_active(rock));
//! ```

use super::{ObjectPool, PoolError, PoolStats};
use crate::ecs::{Entity, World};
use std::collections::HashMap;

/// Manager for every keyed entity pool
pub struct PoolService {
    pools: HashMap<String, ObjectPool<Entity>>,
}

impl PoolService {
    /// Create an empty pool service
    pub fn new() -> Self {
        Self {
            pools: HashMap::new(),
        }
    }

    /// Create `capacity` inactive instances under `key`
    ///
    /// Idempotent per key: a second call for an existing key is ignored and
    /// returns `false`. `factory` receives the world and the instance index and
    /// must return a freshly created entity.
    pub fn init_pool<F>(&mut self, world: &mut World, key: &str, capacity: usize, mut factory: F) -> bool
    where
        F: FnMut(&mut World, usize) -> Entity,
    {
        if let Some(existing) = self.pools.get(key) {
            log::debug!(
                "Pool '{}' already initialized with capacity {}; ignoring request for {}",
                key,
                existing.capacity(),
                capacity
            );
            return false;
        }

        let mut handles = Vec::with_capacity(capacity);
        for index in 0..capacity {
            let entity = factory(world, index);
            if let Some(record) = world.record_mut(entity) {
                record.active = false;
                record.pool_key = Some(key.to_string());
            }
            handles.push(entity);
        }

        self.pools.insert(key.to_string(), ObjectPool::new(key, handles));
        log::info!("Created pool '{}' with capacity {}", key, capacity);
        true
    }

    /// Lend an instance from `key`
    ///
    /// The instance comes back exactly as it was last left; callers reset
    /// position, active flag and child lists themselves.
    pub fn acquire(&mut self, key: &str) -> Result<Entity, PoolError> {
        let pool = self.pool_mut(key)?;
        let entity = pool.acquire()?;
        log::trace!("Acquired {:?} from '{}'", entity, key);
        Ok(entity)
    }

    /// Return a lent instance to `key` and deactivate it
    pub fn release(&mut self, world: &mut World, key: &str, entity: Entity) -> Result<(), PoolError> {
        let pool = self.pool_mut(key)?;
        pool.release(entity)?;
        world.set_active(entity, false);
        log::trace!("Released {:?} to '{}'", entity, key);
        Ok(())
    }

    /// Return a lent instance to whichever pool created it
    pub fn release_entity(&mut self, world: &mut World, entity: Entity) -> Result<(), PoolError> {
        let key = world
            .pool_key(entity)
            .map(str::to_string)
            .ok_or_else(|| PoolError::Unpooled(format!("{entity:?}")))?;
        self.release(world, &key, entity)
    }

    /// Whether `entity` is currently lent from `key`
    pub fn is_lent(&self, key: &str, entity: Entity) -> bool {
        self.pools.get(key).is_some_and(|pool| pool.is_lent(entity))
    }

    /// Capacity of `key`
    pub fn capacity(&self, key: &str) -> Option<usize> {
        self.pools.get(key).map(ObjectPool::capacity)
    }

    /// Inactive instances under `key`
    pub fn available(&self, key: &str) -> Option<usize> {
        self.pools.get(key).map(ObjectPool::available_count)
    }

    /// Lent instances under `key`
    pub fn lent(&self, key: &str) -> Option<usize> {
        self.pools.get(key).map(ObjectPool::lent_count)
    }

    /// Lent handles under `key`
    pub fn lent_handles(&self, key: &str) -> Vec<Entity> {
        self.pools
            .get(key)
            .map(|pool| pool.lent_handles().collect())
            .unwrap_or_default()
    }

    /// Statistics for `key`
    pub fn stats(&self, key: &str) -> Option<&PoolStats> {
        self.pools.get(key).map(ObjectPool::stats)
    }

    fn pool_mut(&mut self, key: &str) -> Result<&mut ObjectPool<Entity>, PoolError> {
        self.pools
            .get_mut(key)
            .ok_or_else(|| PoolError::UnknownPool(key.to_string()))
    }
}

impl Default for PoolService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityTag;

    fn pickup_pool(world: &mut World, capacity: usize) -> PoolService {
        let mut pools = PoolService::new();
        pools.init_pool(world, "HotPickup", capacity, |world, i| {
            world.create_entity(format!("HotPickup_{i}"), EntityTag::PICKUP)
        });
        pools
    }

    #[test]
    fn test_init_pool_is_idempotent() {
        let mut world = World::new();
        let mut pools = pickup_pool(&mut world, 3);

        let created_again = pools.init_pool(&mut world, "HotPickup", 10, |world, i| {
            world.create_entity(format!("Extra_{i}"), EntityTag::PICKUP)
        });

        assert!(!created_again);
        assert_eq!(pools.capacity("HotPickup"), Some(3));
        assert_eq!(world.len(), 3);
    }

    #[test]
    fn test_round_trip_lending_law() {
        let mut world = World::new();
        let mut pools = pickup_pool(&mut world, 2);

        let first = pools.acquire("HotPickup").expect("Should acquire");
        let second = pools.acquire("HotPickup").expect("Should acquire");
        assert!(matches!(pools.acquire("HotPickup"), Err(PoolError::Exhausted { .. })));

        pools.release(&mut world, "HotPickup", first).expect("Should release");
        pools.release(&mut world, "HotPickup", second).expect("Should release");
        assert!(pools.acquire("HotPickup").is_ok());
        assert!(pools.acquire("HotPickup").is_ok());
    }

    #[test]
    fn test_release_deactivates_and_rejects_double() {
        let mut world = World::new();
        let mut pools = pickup_pool(&mut world, 1);

        let pickup = pools.acquire("HotPickup").expect("Should acquire");
        world.set_active(pickup, true);
        pools.release_entity(&mut world, pickup).expect("Should release");

        assert!(!world.is_active(pickup));
        assert!(matches!(
            pools.release(&mut world, "HotPickup", pickup),
            Err(PoolError::AlreadyReleased { .. })
        ));
        assert_eq!(pools.available("HotPickup"), Some(1));
    }

    #[test]
    fn test_unknown_pool() {
        let mut pools = PoolService::new();
        assert!(matches!(pools.acquire("Goal"), Err(PoolError::UnknownPool(_))));
    }
}
