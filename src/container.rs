use alloc::{collections::BTreeSet, sync::Arc};
use core::any::{type_name, Any};
use tracing::{debug, error, info_span};

use crate::{
    any::{Erased, Instance, TypeInfo},
    catalog::{Marker, TypeCatalog},
    config::Config,
    dependency::Dependency,
    errors::{ContainerErrorKind, InstantiateErrorKind, ResolveErrorKind},
    registrar::Registrar,
    scope::Scope,
};

/// Entry point of the library: resolves dependencies and injects them into objects.
///
/// Cloning is cheap, clones share the registered sources and the singleton instances.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    registrar: Registrar,
    catalog: Arc<dyn TypeCatalog>,
    config: Config,
}

impl Container {
    /// Creates a container registering every type marked as a component or carrying a qualifier.
    ///
    /// # Errors
    /// Returns the first registration error, see [`Registrar::register`].
    #[inline]
    pub fn new(catalog: impl TypeCatalog + 'static) -> Result<Self, ContainerErrorKind> {
        Self::new_with_config(catalog, Config::default())
    }

    /// # Errors
    /// - Returns the first registration error, see [`Registrar::register`]
    /// - Returns the first instantiation error if [`Config::eager_singletons`] is set
    pub fn new_with_config(catalog: impl TypeCatalog + 'static, config: Config) -> Result<Self, ContainerErrorKind> {
        let catalog: Arc<dyn TypeCatalog> = Arc::new(catalog);
        let mut registrar = Registrar::new(catalog.clone());

        let types: BTreeSet<TypeInfo> = catalog
            .marked(Marker::Component)
            .into_iter()
            .chain(catalog.marked(Marker::Qualifier))
            .collect();
        for type_info in &types {
            registrar.register(type_info)?;
        }

        Self::from_registrar(registrar, config)
    }

    /// Creates a container from an already filled registrar, e.g. one with a custom resolver chain.
    ///
    /// # Errors
    /// Returns the first instantiation error if [`Config::eager_singletons`] is set.
    pub fn from_registrar(registrar: Registrar, config: Config) -> Result<Self, ContainerErrorKind> {
        let catalog = registrar.catalog().clone();
        let container = Self {
            inner: Arc::new(ContainerInner {
                registrar,
                catalog,
                config,
            }),
        };

        if config.eager_singletons {
            let span = info_span!("eager_singletons");
            let _guard = span.enter();

            for source in container.inner.registrar.sources() {
                if source.declaration().scope == Scope::Singleton {
                    source.get_instance(&container)?;
                }
            }
            debug!("Singletons instantiated");
        }

        Ok(container)
    }

    #[inline]
    #[must_use]
    pub fn registrar(&self) -> &Registrar {
        &self.inner.registrar
    }

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &dyn TypeCatalog {
        &*self.inner.catalog
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> Config {
        self.inner.config
    }

    /// Resolves an unqualified dependency of type `T`, which may be a trait object.
    ///
    /// # Errors
    /// Returns the resolution error, or the first error raised while producing the instance.
    pub fn get<T>(&self) -> Result<Arc<T>, ResolveErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let span = info_span!("get", dependency = type_name::<T>());
        let _guard = span.enter();

        downcast(self.provide(&Dependency::of::<T>())?)
    }

    /// Resolves a dependency of type `T` narrowed by `qualifier`.
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::NoSuchQualifier`] if no registered type carries the qualifier.
    pub fn get_qualified<T>(&self, qualifier: &'static str) -> Result<Arc<T>, ResolveErrorKind>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let span = info_span!("get", dependency = type_name::<T>(), qualifier);
        let _guard = span.enter();

        downcast(self.provide(&Dependency::qualified::<T>(qualifier))?)
    }

    /// Creates `T` with its catalog constructor and injects it.
    /// `T` doesn't need to be registered, it isn't cached.
    ///
    /// # Errors
    /// - Returns [`InstantiateErrorKind::NoZeroArgumentConstructor`] if the catalog has no constructor of `T`
    /// - Returns the first error raised while injecting the new instance
    pub fn construct<T>(&self) -> Result<Arc<T>, ResolveErrorKind>
    where
        T: Send + Sync + 'static,
    {
        let span = info_span!("construct", component = type_name::<T>());
        let _guard = span.enter();

        let type_info = TypeInfo::of::<T>();
        let Some(constructor) = self
            .inner
            .catalog
            .descriptor(&type_info)
            .and_then(|descriptor| descriptor.constructor.clone())
        else {
            let err = InstantiateErrorKind::NoZeroArgumentConstructor { type_info };
            error!("{}", err);
            return Err(err.into());
        };

        let instance = constructor()?;
        self.inject_instance(&instance, &type_info)?;

        instance.downcast::<T>().map_err(|_| {
            let err = ResolveErrorKind::IncorrectType {
                expected: type_info,
                actual: type_info,
            };
            error!("{}", err);
            err
        })
    }

    /// Resolves and assigns every unresolved injection point of `owner`, inherited ones included.
    /// Points that are already resolved are left as they are.
    ///
    /// Returns the number of assigned points.
    ///
    /// # Errors
    /// Returns the first error, points resolved before it stay assigned.
    pub fn inject<T: Any>(&self, owner: &T) -> Result<usize, ResolveErrorKind> {
        self.inject_points(owner, &TypeInfo::of::<T>())
    }

    pub(crate) fn inject_instance(&self, instance: &Instance, type_info: &TypeInfo) -> Result<usize, ResolveErrorKind> {
        self.inject_points(&**instance, type_info)
    }

    fn inject_points(&self, owner: &dyn Any, type_info: &TypeInfo) -> Result<usize, ResolveErrorKind> {
        let span = info_span!("inject", owner = type_info.name);
        let _guard = span.enter();

        let mut assigned = 0;
        for point in self.inner.catalog.injection_points(type_info) {
            let Some(slot) = point.slot(owner) else {
                let err = ResolveErrorKind::IncorrectType {
                    expected: point.owner,
                    actual: *type_info,
                };
                error!("{}", err);
                return Err(err);
            };

            if slot.resolve_with(&mut || self.provide(&point.dependency))? {
                debug!(field = point.field, declared_by = point.owner.name, "Injected");
                assigned += 1;
            }
        }
        Ok(assigned)
    }

    /// Resolves `dependency` and converts the instance to the declared type.
    fn provide(&self, dependency: &Dependency) -> Result<Erased, ResolveErrorKind> {
        let source = self.inner.registrar.resolve(dependency)?;
        let instance = source.get_instance(self)?;

        let actual = source.declaration().type_info;
        self.inner
            .catalog
            .cast(&actual, &dependency.type_info, instance)
            .ok_or_else(|| {
                let err = ResolveErrorKind::IncorrectType {
                    expected: dependency.type_info,
                    actual,
                };
                error!("{}", err);
                err
            })
    }
}

fn downcast<T: ?Sized + 'static>(erased: Erased) -> Result<Arc<T>, ResolveErrorKind> {
    let actual = (*erased).type_id();
    erased.downcast::<Arc<T>>().map(|value| *value).map_err(|_| {
        let err = ResolveErrorKind::IncorrectType {
            expected: TypeInfo::of::<T>(),
            actual: TypeInfo { name: "unknown", id: actual },
        };
        error!("{}", err);
        err
    })
}
