use super::cycle::DependencyCycle;
use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum RegisterErrorKind {
    #[error("Component type {type_info} is abstract, a concrete type is required")]
    NonConcreteComponentClass { type_info: TypeInfo },
    #[error("Type {type_info} is not declared in the catalog")]
    UnknownType { type_info: TypeInfo },
    #[error("Qualifier \"{qualifier}\" is carried by both {first} and {second}")]
    DuplicateQualifier {
        qualifier: &'static str,
        first: TypeInfo,
        second: TypeInfo,
    },
    #[error(transparent)]
    DependencyCycle(#[from] DependencyCycle),
}
