use parking_lot::{Mutex, ReentrantMutex};
use std::any::{Any, TypeId, type_name};
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

type Instance = &'static (dyn Any + Send + Sync);

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Serialises construction of one settings type. Reentrant so that a
/// construction that asks for its own type again panics instead of hanging.
#[derive(Default)]
struct Slot {
    constructing: Cell<bool>,
}

/// Clears the constructing flag even if `init` panics
struct Constructing<'a>(&'a Cell<bool>);

impl Drop for Constructing<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Process-wide cache of constructed settings, one instance per type
///
/// Instances are leaked on insertion and live until process exit, so every
/// lookup hands out the same `&'static` reference.
#[derive(Default)]
pub struct Registry {
    instances: Mutex<HashMap<TypeId, Instance>>,
    slots: Mutex<HashMap<TypeId, Arc<ReentrantMutex<Slot>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry used by [`Settings::instance`](crate::Settings::instance)
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Return the cached instance of `T`, constructing it with `init` first
    /// if there is none.
    ///
    /// Concurrent first calls for the same type construct exactly once; other
    /// types are not blocked, so `init` may construct different settings
    /// types from this registry. A failed `init` caches nothing and may be
    /// retried.
    ///
    /// # Panics
    ///
    /// If `init` asks this registry for `T` again, since that instance could
    /// never be finished.
    pub fn get_or_try_init<T, E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<&'static T, E>
    where
        T: Any + Send + Sync,
    {
        if let Some(instance) = self.get::<T>() {
            return Ok(instance);
        }

        let cell = self.slot::<T>();
        let slot = cell.lock();

        // Another thread may have finished while we waited for the slot
        if let Some(instance) = self.get::<T>() {
            return Ok(instance);
        }

        if slot.constructing.replace(true) {
            panic!(
                "{} was requested while it was being constructed, a default depends on its own settings type",
                type_name::<T>()
            );
        }
        let value = {
            let _constructing = Constructing(&slot.constructing);
            init()?
        };

        let instance: &'static T = Box::leak(Box::new(value));
        self.instances.lock().insert(TypeId::of::<T>(), instance);
        tracing::debug!(settings = type_name::<T>(), "cached settings instance");

        Ok(instance)
    }

    fn slot<T: Any>(&self) -> Arc<ReentrantMutex<Slot>> {
        Arc::clone(self.slots.lock().entry(TypeId::of::<T>()).or_default())
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&'static T> {
        self.instances
            .lock()
            .get(&TypeId::of::<T>())
            .copied()
            .and_then(|existing| existing.downcast_ref::<T>())
    }

    pub fn contains<T: Any>(&self) -> bool {
        self.instances.lock().contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.instances.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct Counter(usize);

    #[derive(Debug, PartialEq)]
    struct Other(&'static str);

    #[test]
    fn test_returns_same_reference() {
        let registry = Registry::new();

        let a = registry.get_or_try_init(|| Ok::<_, ()>(Counter(1))).unwrap();
        let b = registry.get_or_try_init(|| Ok::<_, ()>(Counter(2))).unwrap();

        assert!(std::ptr::eq(a, b));
        assert_eq!(b, &Counter(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_types_are_independent() {
        let registry = Registry::new();

        registry.get_or_try_init(|| Ok::<_, ()>(Counter(1))).unwrap();
        let other = registry.get_or_try_init(|| Ok::<_, ()>(Other("x"))).unwrap();

        assert_eq!(other, &Other("x"));
        assert!(registry.contains::<Counter>());
        assert!(registry.contains::<Other>());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_failure_is_not_cached() {
        let registry = Registry::new();

        let err = registry.get_or_try_init::<Counter, _>(|| Err("missing"));
        assert_eq!(err, Err("missing"));
        assert!(!registry.contains::<Counter>());
        assert!(registry.get::<Counter>().is_none());
        assert!(registry.is_empty());

        let ok = registry.get_or_try_init(|| Ok::<_, &str>(Counter(7))).unwrap();
        assert_eq!(ok, &Counter(7));
        assert!(std::ptr::eq(registry.get::<Counter>().unwrap(), ok));
    }

    #[test]
    fn test_init_may_construct_another_type() {
        let registry = Registry::new();

        let outer = registry
            .get_or_try_init(|| {
                let inner = registry.get_or_try_init(|| Ok::<_, ()>(Other("inner")))?;
                Ok::<_, ()>(Counter(inner.0.len()))
            })
            .unwrap();

        assert_eq!(outer, &Counter(5));
        assert_eq!(registry.get::<Other>(), Some(&Other("inner")));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    #[should_panic(expected = "was requested while it was being constructed")]
    fn test_init_asking_for_its_own_type_panics() {
        let registry = Registry::new();

        let _ = registry.get_or_try_init(|| {
            let again = registry.get_or_try_init(|| Ok::<_, ()>(Counter(2)))?;
            Ok::<_, ()>(Counter(again.0))
        });
    }

    #[test]
    fn test_panicking_init_can_be_retried() {
        let registry = Registry::new();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = registry.get_or_try_init::<Counter, ()>(|| panic!("boom"));
        }));
        assert!(result.is_err());

        let ok = registry.get_or_try_init(|| Ok::<_, ()>(Counter(3))).unwrap();
        assert_eq!(ok, &Counter(3));
    }

    #[test]
    fn test_concurrent_first_construction_runs_once() {
        let registry = Arc::new(Registry::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    let instance = registry
                        .get_or_try_init(|| {
                            let n = calls.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, ()>(Counter(n))
                        })
                        .unwrap();
                    instance as *const Counter as usize
                })
            })
            .collect();

        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }
}
