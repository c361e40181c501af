use tracing::{debug, error, info_span};

use super::{ComponentDeclaration, Source};
use crate::{
    any::Instance,
    cache::InstanceCache,
    catalog::{Constructor, TypeDescriptor},
    errors::{InstantiateErrorKind, RegisterErrorKind, ResolveErrorKind},
    Container,
};

/// Produces instances through the zero-argument constructor of a concrete type.
pub struct TypeSource {
    declaration: ComponentDeclaration,
    constructor: Option<Constructor>,
    cache: InstanceCache,
}

impl TypeSource {
    /// # Errors
    /// Returns [`RegisterErrorKind::NonConcreteComponentClass`] if the described type is abstract.
    pub fn new(descriptor: &TypeDescriptor) -> Result<Self, RegisterErrorKind> {
        if descriptor.is_abstract() {
            let err = RegisterErrorKind::NonConcreteComponentClass {
                type_info: descriptor.type_info(),
            };
            error!("{}", err);
            return Err(err);
        }

        Ok(Self {
            declaration: descriptor.declaration(),
            constructor: descriptor.constructor.clone(),
            cache: InstanceCache::new(),
        })
    }
}

impl Source for TypeSource {
    #[inline]
    fn declaration(&self) -> &ComponentDeclaration {
        &self.declaration
    }

    fn get_instance(&self, container: &Container) -> Result<Instance, ResolveErrorKind> {
        let span = info_span!(
            "type_source",
            component = self.declaration.type_info.name,
            scope = self.declaration.scope.name()
        );
        let _guard = span.enter();

        self.cache.get_or_compute(&self.declaration, || {
            let Some(constructor) = &self.constructor else {
                let err = InstantiateErrorKind::NoZeroArgumentConstructor {
                    type_info: self.declaration.type_info,
                };
                error!("{}", err);
                return Err(err.into());
            };
            let instance = constructor().map_err(|err| {
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
