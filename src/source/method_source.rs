use alloc::sync::Arc;
use tracing::{debug, error, info_span};

use super::{ComponentDeclaration, Source};
use crate::{
    any::Instance,
    cache::InstanceCache,
    catalog::{FactoryDescriptor, FactoryFn, TypeCatalog},
    errors::{RegisterErrorKind, ResolveErrorKind},
    Container,
};

/// Produces instances by calling a factory method on the instance of its declaring source.
///
/// The declaring instance is requested lazily, on the first call.
pub struct MethodSource {
    declaration: ComponentDeclaration,
    name: &'static str,
    declarer: Arc<dyn Source>,
    invoke: FactoryFn,
    cache: InstanceCache,
}

impl MethodSource {
    /// # Errors
    /// Returns [`RegisterErrorKind::NonConcreteComponentClass`] if the factory's return type is declared abstract.
    pub fn new(declarer: Arc<dyn Source>, factory: &FactoryDescriptor, catalog: &dyn TypeCatalog) -> Result<Self, RegisterErrorKind> {
        if catalog.is_abstract(&factory.declaration.type_info) {
            let err = RegisterErrorKind::NonConcreteComponentClass {
                type_info: factory.declaration.type_info,
            };
            error!("{}", err);
            return Err(err);
        }

        Ok(Self {
            declaration: factory.declaration,
            name: factory.name,
            declarer,
            invoke: factory.invoke.clone(),
            cache: InstanceCache::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub fn declarer(&self) -> &ComponentDeclaration {
        self.declarer.declaration()
    }
}

impl Source for MethodSource {
    #[inline]
    fn declaration(&self) -> &ComponentDeclaration {
        &self.declaration
    }

    fn get_instance(&self, container: &Container) -> Result<Instance, ResolveErrorKind> {
        let span = info_span!(
            "method_source",
            component = self.declaration.type_info.name,
            factory = self.name,
            scope = self.declaration.scope.name()
        );
        let _guard = span.enter();

        self.cache.get_or_compute(&self.declaration, || {
            let declarer = self.declarer.get_instance(container)?;
            let instance = (self.invoke)(&declarer).map_err(|err| {
                error!("{}", err);
                ResolveErrorKind::from(err)
            })?;
            debug!("Instantiated");

            container.inject_instance(&instance, &self.declaration.type_info)?;
            Ok(instance)
        })
    }

    #[inline]
    fn is_computed(&self) -> bool {
        self.cache.is_computed()
    }
}
