#![no_std]

extern crate alloc;

pub(crate) mod any;
pub(crate) mod autowired;
pub(crate) mod cache;
pub(crate) mod catalog;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod dependency;
pub(crate) mod errors;
pub(crate) mod registrar;
pub(crate) mod resolver;
pub(crate) mod scope;
pub(crate) mod source;

pub use any::{Erased, Instance, TypeInfo};
pub use autowired::{Autowired, InjectionSlot};
pub use catalog::{
    distributed_slice, linkme, Catalog, CatalogBuilder, DescriptorBuilder, FactoryDescriptor, Marker, TypeCatalog, TypeDescriptor,
    TypeKind, COMPONENTS,
};
pub use config::Config;
pub use container::Container;
pub use dependency::{Dependency, InjectionPoint};
pub use errors::{ContainerErrorKind, DependencyCycle, InstantiateErrorKind, RegisterErrorKind, ResolveErrorKind};
pub use registrar::Registrar;
pub use resolver::{default_chain, AbstractTypeResolver, ExactTypeResolver, QualifierResolver, Resolver};
pub use scope::Scope;
pub use source::{ComponentDeclaration, MethodSource, Source, TypeSource};
