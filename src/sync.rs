//! Poison-recovering lock helpers.
//!
//! A logging facade must keep emitting after an unrelated thread panics while
//! holding one of its locks. All shared logger state (echo writer, fatal
//! counters, the registry slot, target buffers) is therefore locked through
//! these helpers, which recover the inner data from a poisoned lock instead
//! of propagating the poison. The guarded state is a counter map, buffered
//! lines, and a threshold value; stale-but-consistent data is acceptable for
//! all of them. Test code locks with `.unwrap()` to fail fast instead.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock a mutex, recovering from poison if necessary. Never panics.
#[inline]
pub(crate) fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Acquire a read lock, recovering from poison if necessary.
#[inline]
pub(crate) fn read_recover<T>(rwlock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    rwlock.read().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Acquire a write lock, recovering from poison if necessary.
#[inline]
pub(crate) fn write_recover<T>(rwlock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    rwlock.write().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn test_lock_recover_after_poison() {
        let mutex = Mutex::new(42);

        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = mutex.lock().unwrap();
            panic!("poison the lock");
        }));
        assert!(mutex.lock().is_err(), "mutex should be poisoned");

        let guard = lock_recover(&mutex);
        assert_eq!(*guard, 42);
    }

    #[test]
    fn test_read_recover_after_write_poison() {
        let rwlock = RwLock::new(7);

        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = rwlock.write().unwrap();
            panic!("poison the lock");
        }));

        assert_eq!(*read_recover(&rwlock), 7);
    }

    #[test]
    fn test_write_recover_can_mutate_after_poison() {
        let rwlock = RwLock::new(0);

        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = rwlock.write().unwrap();
            panic!("poison the lock");
        }));

        *write_recover(&rwlock) = 5;
        assert_eq!(*read_recover(&rwlock), 5);
    }
}
