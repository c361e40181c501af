use crate::any::TypeInfo;

#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error("Type {type_info} has no zero-argument constructor")]
    NoZeroArgumentConstructor { type_info: TypeInfo },
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}
