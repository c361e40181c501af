use core::cell::RefCell;
use parking_lot::ReentrantMutex;
use tracing::{debug, error};

use crate::{
    any::Instance,
    errors::{DependencyCycle, ResolveErrorKind},
    source::ComponentDeclaration,
};

enum CacheState {
    Uncomputed,
    Computing,
    Computed(Instance),
}

/// Instance slot of a source.
///
/// Singletons move `Uncomputed -> Computing -> Computed` once and stay computed.
/// The lock is reentrant, so a recipe that asks for its own source on the same thread
/// gets a [`DependencyCycle`] instead of a deadlock, while other threads wait for the first computation.
/// Prototypes bypass the cache.
pub(crate) struct InstanceCache {
    state: ReentrantMutex<RefCell<CacheState>>,
}

impl InstanceCache {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(CacheState::Uncomputed)),
        }
    }

    pub(crate) fn get_or_compute<F>(&self, declaration: &ComponentDeclaration, compute: F) -> Result<Instance, ResolveErrorKind>
    where
        F: FnOnce() -> Result<Instance, ResolveErrorKind>,
    {
        if !declaration.scope.is_cached() {
            return compute();
        }

        let guard = self.state.lock();
        match &*guard.borrow() {
            CacheState::Computed(instance) => {
                debug!("Found in cache");
                return Ok(instance.clone());
            }
            CacheState::Computing => {
                let err = DependencyCycle::new([declaration.type_info, declaration.type_info]);
                error!("{}", err);
                return Err(err.into());
            }
            CacheState::Uncomputed => {}
        }
        debug!("Not found in cache");

        guard.replace(CacheState::Computing);
        let result = compute();
        match &result {
            Ok(instance) => {
                guard.replace(CacheState::Computed(instance.clone()));
                debug!("Cached");
            }
            Err(_) => {
                guard.replace(CacheState::Uncomputed);
            }
        }
        result
    }

    #[inline]
    #[must_use]
    pub(crate) fn is_computed(&self) -> bool {
        matches!(&*self.state.lock().borrow(), CacheState::Computed(_))
    }
}
