use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use tracing::{debug, error};

use super::Resolver;
use crate::{
    any::TypeInfo,
    dependency::Dependency,
    errors::{RegisterErrorKind, ResolveErrorKind},
    source::Source,
};

/// Resolves an unqualified dependency to the source of exactly the declared type.
#[derive(Default)]
pub struct ExactTypeResolver {
    by_type: BTreeMap<TypeInfo, Vec<Arc<dyn Source>>>,
}

impl ExactTypeResolver {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { by_type: BTreeMap::new() }
    }
}

impl Resolver for ExactTypeResolver {
    #[inline]
    fn name(&self) -> &'static str {
        "exact"
    }

    fn register(&mut self, source: &Arc<dyn Source>) -> Result<(), RegisterErrorKind> {
        self.by_type
            .entry(source.declaration().type_info)
            .or_default()
            .push(source.clone());
        Ok(())
    }

    fn unregister(&mut self, source: &Arc<dyn Source>) {
        if let Some(sources) = self.by_type.get_mut(&source.declaration().type_info) {
            sources.retain(|indexed| !Arc::ptr_eq(indexed, source));
        }
    }

    fn resolve(&self, dependency: &Dependency) -> Result<Option<Arc<dyn Source>>, ResolveErrorKind> {
        if dependency.qualifier.is_some() {
            return Ok(None);
        }

        match self.by_type.get(&dependency.type_info).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([source]) => {
                debug!(component = dependency.type_info.name, "Resolved by exact type");
                Ok(Some(source.clone()))
            }
            Some(sources) => {
                let err = ResolveErrorKind::UnexpectedImplementationCount {
                    type_info: dependency.type_info,
                    candidates: sources.iter().map(|source| source.declaration().type_info).collect(),
                };
                error!("{}", err);
                Err(err)
            }
        }
    }
}
