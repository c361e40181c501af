use super::TypeDescriptor;

pub use linkme::{self, distributed_slice};

/// Descriptors registered at link time, collected by [`super::Catalog::registered`].
///
/// ```rust,ignore
/// use autowire::{distributed_slice, TypeDescriptor, COMPONENTS};
///
/// #[distributed_slice(COMPONENTS)]
/// static CLOCK: fn() -> TypeDescriptor = || TypeDescriptor::component::<Clock>().default_constructor().build();
/// ```
#[distributed_slice]
pub static COMPONENTS: [fn() -> TypeDescriptor];
