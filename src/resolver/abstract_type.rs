use alloc::{collections::BTreeMap, sync::Arc, vec::Vec};
use parking_lot::RwLock;
use tracing::{debug, error};

use super::Resolver;
use crate::{
    any::TypeInfo,
    catalog::TypeCatalog,
    dependency::Dependency,
    errors::{RegisterErrorKind, ResolveErrorKind},
    source::Source,
};

/// Resolves an unqualified abstract dependency to the single registered concrete subtype.
///
/// The first successful resolution of an abstract type is memoized and never replaced.
pub struct AbstractTypeResolver {
    catalog: Arc<dyn TypeCatalog>,
    by_type: BTreeMap<TypeInfo, Vec<Arc<dyn Source>>>,
    resolved: RwLock<BTreeMap<TypeInfo, Arc<dyn Source>>>,
}

impl AbstractTypeResolver {
    #[inline]
    #[must_use]
    pub fn new(catalog: Arc<dyn TypeCatalog>) -> Self {
        Self {
            catalog,
            by_type: BTreeMap::new(),
            resolved: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the memoized implementation of `abstract_type`, if it was resolved already.
    #[must_use]
    pub fn resolved(&self, abstract_type: &TypeInfo) -> Option<TypeInfo> {
        self.resolved
            .read()
            .get(abstract_type)
            .map(|source| source.declaration().type_info)
    }
}

impl Resolver for AbstractTypeResolver {
    #[inline]
    fn name(&self) -> &'static str {
        "abstract"
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
        if dependency.qualifier.is_some() || !self.catalog.is_abstract(&dependency.type_info) {
            return Ok(None);
        }

        if let Some(source) = self.resolved.read().get(&dependency.type_info) {
            debug!(component = source.declaration().type_info.name, "Found memoized implementation");
            return Ok(Some(source.clone()));
        }

        let candidates: Vec<&Arc<dyn Source>> = self
            .catalog
            .concrete_subtypes(&dependency.type_info)
            .iter()
            .filter_map(|subtype| self.by_type.get(subtype))
            .flatten()
            .collect();

        let [source] = candidates.as_slice() else {
            let err = ResolveErrorKind::UnexpectedImplementationCount {
                type_info: dependency.type_info,
                candidates: candidates.iter().map(|source| source.declaration().type_info).collect(),
            };
            error!("{}", err);
            return Err(err);
        };

        let source = self
            .resolved
            .write()
            .entry(dependency.type_info)
            .or_insert_with(|| (*source).clone())
            .clone();
        debug!(component = source.declaration().type_info.name, "Memoized implementation");

        Ok(Some(source))
    }
}
