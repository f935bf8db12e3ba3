//! Instance pools.
//!
//! Each generated record gets a pool alias, `FooPool = InstancePool<Foo>`.
//! A pool hands out recycled instances so hot decode loops avoid
//! re-allocating variable-length arrays on every message.
//!
//! Pooled instances are not cleared on release. That is sound because
//! decoding overwrites every field and reallocates every variable-length
//! array to the decoded length, so nothing from a previous use survives an
//! `unmarshal_from` into an acquired instance.

use std::fmt;

use parking_lot::Mutex;

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// A mutex-guarded LIFO free list of `T`.
pub struct InstancePool<T> {
    free: Mutex<Vec<T>>,
    fresh: Factory<T>,
}

impl<T: Default + 'static> InstancePool<T> {
    /// Create an empty pool that builds zero values on demand.
    pub fn new() -> Self {
        Self::with_factory(T::default)
    }
}

impl<T: Default + 'static> Default for InstancePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InstancePool<T> {
    /// Create an empty pool with a custom constructor for fresh instances.
    pub fn with_factory<F>(fresh: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        InstancePool {
            free: Mutex::new(Vec::new()),
            fresh: Box::new(fresh),
        }
    }

    /// Take the most recently released instance, or build a fresh one.
    pub fn acquire(&self) -> T {
        let recycled = self.free.lock().pop();
        match recycled {
            Some(value) => value,
            None => (self.fresh)(),
        }
    }

    /// Return an instance to the pool.
    pub fn release(&self, value: T) {
        self.free.lock().push(value);
    }

    /// Number of instances waiting to be reused.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

impl<T> fmt::Debug for InstancePool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstancePool")
            .field("idle", &self.idle())
            .finish_non_exhaustive()
    }
}
