mod abstract_type;
mod exact;
mod qualifier;

pub use abstract_type::AbstractTypeResolver;
pub use exact::ExactTypeResolver;
pub use qualifier::QualifierResolver;

use alloc::{boxed::Box, sync::Arc, vec, vec::Vec};

use crate::{
    catalog::TypeCatalog,
    dependency::Dependency,
    errors::{RegisterErrorKind, ResolveErrorKind},
    source::Source,
};

/// A strategy matching a declared dependency to a registered [`Source`].
///
/// `resolve` returns `Ok(None)` when the strategy doesn't apply to the dependency.
/// A dependency the strategy applies to but can't satisfy unambiguously is an error.
pub trait Resolver: Send + Sync {
    #[must_use]
    fn name(&self) -> &'static str;

    /// Adds `source` to the index of this resolver.
    ///
    /// # Errors
    /// Returns an error if the source conflicts with an already registered one.
    fn register(&mut self, source: &Arc<dyn Source>) -> Result<(), RegisterErrorKind>;

    /// Removes `source` from the index, a source that isn't indexed is ignored.
    fn unregister(&mut self, source: &Arc<dyn Source>);

    /// # Errors
    /// Returns an error if the dependency matched, but not exactly one valid source.
    fn resolve(&self, dependency: &Dependency) -> Result<Option<Arc<dyn Source>>, ResolveErrorKind>;
}

/// Qualifier, exact type, abstract type. A qualifier overrides the type-based match.
#[must_use]
pub fn default_chain(catalog: &Arc<dyn TypeCatalog>) -> Vec<Box<dyn Resolver>> {
    vec![
        Box::new(QualifierResolver::new(catalog.clone())),
        Box::new(ExactTypeResolver::new()),
        Box::new(AbstractTypeResolver::new(catalog.clone())),
    ]
}
