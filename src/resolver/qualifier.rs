use alloc::{collections::BTreeMap, sync::Arc};
use tracing::{debug, error};

use super::Resolver;
use crate::{
    catalog::TypeCatalog,
    dependency::Dependency,
    errors::{RegisterErrorKind, ResolveErrorKind},
    source::Source,
};

/// Resolves dependencies carrying a qualifier tag to the single source registered with that tag.
pub struct QualifierResolver {
    catalog: Arc<dyn TypeCatalog>,
    by_qualifier: BTreeMap<&'static str, Arc<dyn Source>>,
}

impl QualifierResolver {
    #[inline]
    #[must_use]
    pub fn new(catalog: Arc<dyn TypeCatalog>) -> Self {
        Self {
            catalog,
            by_qualifier: BTreeMap::new(),
        }
    }
}

impl Resolver for QualifierResolver {
    #[inline]
    fn name(&self) -> &'static str {
        "qualifier"
    }

    fn register(&mut self, source: &Arc<dyn Source>) -> Result<(), RegisterErrorKind> {
        let declaration = source.declaration();
        let Some(qualifier) = declaration.qualifier else {
            return Ok(());
        };

        if let Some(first) = self.by_qualifier.get(qualifier) {
            let err = RegisterErrorKind::DuplicateQualifier {
                qualifier,
                first: first.declaration().type_info,
                second: declaration.type_info,
            };
            error!("{}", err);
            return Err(err);
        }
        self.by_qualifier.insert(qualifier, source.clone());
        Ok(())
    }

    fn unregister(&mut self, source: &Arc<dyn Source>) {
        if let Some(qualifier) = source.declaration().qualifier {
            if self.by_qualifier.get(qualifier).is_some_and(|indexed| Arc::ptr_eq(indexed, source)) {
                self.by_qualifier.remove(qualifier);
            }
        }
    }

    fn resolve(&self, dependency: &Dependency) -> Result<Option<Arc<dyn Source>>, ResolveErrorKind> {
        let Some(qualifier) = dependency.qualifier else {
            return Ok(None);
        };

        let Some(source) = self.by_qualifier.get(qualifier) else {
            let err = ResolveErrorKind::NoSuchQualifier { qualifier };
            error!("{}", err);
            return Err(err);
        };

        let actual = source.declaration().type_info;
        if !self.catalog.can_cast(&actual, &dependency.type_info) {
            let err = ResolveErrorKind::IncorrectType {
                expected: dependency.type_info,
                actual,
            };
            error!("{}", err);
            return Err(err);
        }

        debug!(qualifier, component = actual.name, "Resolved by qualifier");
        Ok(Some(source.clone()))
    }
}
