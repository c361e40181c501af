use super::{register::RegisterErrorKind, resolve::ResolveErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum ContainerErrorKind {
    #[error(transparent)]
    Register(#[from] RegisterErrorKind),
    #[error(transparent)]
    Resolve(#[from] ResolveErrorKind),
}
