mod container;
mod cycle;
mod instantiate;
mod register;
mod resolve;

pub use container::ContainerErrorKind;
pub use cycle::DependencyCycle;
pub use instantiate::InstantiateErrorKind;
pub use register::RegisterErrorKind;
pub use resolve::ResolveErrorKind;
