use core::{
    any::Any,
    fmt::{self, Debug, Formatter},
};

use crate::{
    any::TypeInfo,
    autowired::{InjectionSlot, SlotAccessor},
};

/// A declared dependency: the type an injection point asks for, optionally narrowed by a qualifier tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Dependency {
    pub type_info: TypeInfo,
    pub qualifier: Option<&'static str>,
}

impl Dependency {
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            qualifier: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn qualified<T: ?Sized + 'static>(qualifier: &'static str) -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            qualifier: Some(qualifier),
        }
    }
}

/// A field marked for injection.
///
/// `owner` is the type that declares the field (an ancestor for inherited points),
/// so `(owner, field)` identifies the point system-wide.
#[derive(Clone)]
pub struct InjectionPoint {
    pub owner: TypeInfo,
    pub field: &'static str,
    pub dependency: Dependency,
    pub(crate) accessor: SlotAccessor,
}

impl InjectionPoint {
    /// Returns the slot of this point inside `owner`, or `None` if `owner` isn't of the expected type.
    #[inline]
    #[must_use]
    pub fn slot<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn InjectionSlot> {
        (self.accessor)(owner)
    }

    #[inline]
    pub(crate) fn with_accessor(&self, accessor: SlotAccessor) -> Self {
        Self {
            owner: self.owner,
            field: self.field,
            dependency: self.dependency,
            accessor,
        }
    }
}

impl Debug for InjectionPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionPoint")
            .field("owner", &self.owner.name)
            .field("field", &self.field)
            .field("dependency", &self.dependency)
            .finish_non_exhaustive()
    }
}

