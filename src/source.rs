mod method_source;
mod type_source;

pub use method_source::MethodSource;
pub use type_source::TypeSource;

use crate::{any::Instance, any::TypeInfo, errors::ResolveErrorKind, scope::Scope, Container};

/// A type or factory method marked as a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentDeclaration {
    pub type_info: TypeInfo,
    pub scope: Scope,
    pub qualifier: Option<&'static str>,
}

/// A recipe producing instances of one declared concrete type.
///
/// Singleton sources compute their instance once and return the cached value afterwards,
/// prototype sources run the recipe on every call.
/// The produced instance has its own injection points resolved before it is returned.
pub trait Source: Send + Sync {
    #[must_use]
    fn declaration(&self) -> &ComponentDeclaration;

    /// # Errors
    /// Returns the first error raised by the recipe or by the nested resolution it triggers.
    fn get_instance(&self, container: &Container) -> Result<Instance, ResolveErrorKind>;

    /// Returns `true` if a singleton instance is already cached.
    #[must_use]
    fn is_computed(&self) -> bool;
}
