use alloc::boxed::Box;
use core::fmt::{self, Display, Formatter};

use super::{cycle::DependencyCycle, instantiate::InstantiateErrorKind};
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error(
        "Expected exactly one implementation of {type_info}, found {}: [{}]",
        candidates.len(), TypeNames(candidates),
    )]
    UnexpectedImplementationCount {
        type_info: TypeInfo,
        candidates: Box<[TypeInfo]>,
    },
    #[error("No type carries the qualifier \"{qualifier}\"")]
    NoSuchQualifier { qualifier: &'static str },
    #[error("Incorrect provided type. Actual: {actual}, expected: {expected}")]
    IncorrectType { expected: TypeInfo, actual: TypeInfo },
    #[error(transparent)]
    DependencyCycle(#[from] DependencyCycle),
    #[error(transparent)]
    Instantiate(#[from] InstantiateErrorKind),
}

impl ResolveErrorKind {
    /// Number of eligible candidates, if this is an implementation count error.
    #[inline]
    #[must_use]
    pub fn candidate_count(&self) -> Option<usize> {
        match self {
            ResolveErrorKind::UnexpectedImplementationCount { candidates, .. } => Some(candidates.len()),
            _ => None,
        }
    }
}

struct TypeNames<'a>(&'a [TypeInfo]);

impl Display for TypeNames<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (index, type_info) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(type_info.short_name())?;
        }
        Ok(())
    }
}
