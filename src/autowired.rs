use alloc::{boxed::Box, sync::Arc};
use core::{
    any::Any,
    fmt::{self, Debug, Formatter},
    ops::Deref,
};
use once_cell::race::OnceBox;
use parking_lot::Mutex;
use tracing::debug;

use crate::{
    any::{Erased, TypeInfo},
    errors::ResolveErrorKind,
};

/// Type-erased view of an [`Autowired`] field.
pub trait InjectionSlot: Send + Sync {
    #[must_use]
    fn is_resolved(&self) -> bool;

    /// Assigns the value produced by `provide`, unless the slot already holds one.
    ///
    /// `provide` is called at most once per slot, also under concurrent calls.
    /// Returns `true` if this call assigned the slot.
    ///
    /// # Errors
    /// Returns the error of `provide`, or [`ResolveErrorKind::IncorrectType`] if it provided another type.
    fn resolve_with(&self, provide: &mut dyn FnMut() -> Result<Erased, ResolveErrorKind>) -> Result<bool, ResolveErrorKind>;
}

pub(crate) type SlotAccessor = Arc<dyn Fn(&dyn Any) -> Option<&dyn InjectionSlot> + Send + Sync>;

#[inline]
pub(crate) fn slot_accessor<F>(accessor: F) -> SlotAccessor
where
    F: for<'a> Fn(&'a dyn Any) -> Option<&'a dyn InjectionSlot> + Send + Sync + 'static,
{
    Arc::new(accessor)
}

/// An injection point: a field that receives a resolved `Arc<T>`.
///
/// `T` may be a trait object, e.g. `Autowired<dyn Repo>`, in which case the field is
/// resolved through the single concrete implementation or through a qualifier.
pub struct Autowired<T: ?Sized> {
    value: OnceBox<Arc<T>>,
    lock: Mutex<()>,
}

impl<T: ?Sized> Autowired<T> {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            value: OnceBox::new(),
            lock: Mutex::new(()),
        }
    }

    /// Creates an already resolved slot, e.g. for tests that wire objects by hand.
    #[must_use]
    pub fn with_value(value: Arc<T>) -> Self {
        let slot = Self::new();
        let _ = slot.value.set(Box::new(value));
        slot
    }

    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&Arc<T>> {
        self.value.get()
    }

    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T: ?Sized> Default for Autowired<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Deref for Autowired<T> {
    type Target = T;

    /// # Panics
    /// Panics if the field wasn't injected yet.
    fn deref(&self) -> &Self::Target {
        match self.value.get() {
            Some(value) => &**value,
            None => panic!("field of type `{}` is not injected", core::any::type_name::<T>()),
        }
    }
}

impl<T: ?Sized> Debug for Autowired<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Autowired")
            .field("type", &core::any::type_name::<T>())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl<T> InjectionSlot for Autowired<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    #[inline]
    fn is_resolved(&self) -> bool {
        Autowired::is_resolved(self)
    }

    fn resolve_with(&self, provide: &mut dyn FnMut() -> Result<Erased, ResolveErrorKind>) -> Result<bool, ResolveErrorKind> {
        if self.value.get().is_some() {
            debug!("Already injected");
            return Ok(false);
        }

        let _guard = self.lock.lock();
        if self.value.get().is_some() {
            debug!("Injected concurrently");
            return Ok(false);
        }

        let erased = provide()?;
        let actual = (*erased).type_id();
        let Ok(value) = erased.downcast::<Arc<T>>() else {
            return Err(ResolveErrorKind::IncorrectType {
                expected: TypeInfo::of::<T>(),
                actual: TypeInfo { name: "unknown", id: actual },
            });
        };
        // Only writer, `lock` is held.
        let _ = self.value.set(value);

        Ok(true)
    }
}
