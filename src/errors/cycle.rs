use alloc::boxed::Box;
use core::fmt::{self, Display, Formatter};

use crate::any::TypeInfo;

/// A path through the declared-dependency graph that starts and ends at the same type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub struct DependencyCycle {
    pub path: Box<[TypeInfo]>,
}

impl DependencyCycle {
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<Box<[TypeInfo]>>) -> Self {
        Self { path: path.into() }
    }
}

impl Display for DependencyCycle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dependency cycle detected: ")?;
        let mut iter = self.path.iter();
        if let Some(type_info) = iter.next() {
            write!(f, "{}", type_info.short_name())?;
        }
        for type_info in iter {
            write!(f, " -> {}", type_info.short_name())?;
        }
        Ok(())
    }
}
