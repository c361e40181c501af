use alloc::{boxed::Box, collections::BTreeSet, sync::Arc, vec, vec::Vec};
use tracing::{debug, error, info_span, warn};

use crate::{
    any::TypeInfo,
    catalog::TypeCatalog,
    dependency::Dependency,
    errors::{DependencyCycle, RegisterErrorKind, ResolveErrorKind},
    resolver::{default_chain, Resolver},
    source::{MethodSource, Source, TypeSource},
};

/// Owns every registered [`Source`] and the resolver chain they are indexed by.
///
/// Registration mutates the registrar, resolution only reads it.
pub struct Registrar {
    catalog: Arc<dyn TypeCatalog>,
    resolvers: Vec<Box<dyn Resolver>>,
    sources: Vec<Arc<dyn Source>>,
    registered: BTreeSet<TypeInfo>,
}

impl Registrar {
    /// Creates a registrar with the default resolver chain, see [`default_chain`].
    #[inline]
    #[must_use]
    pub fn new(catalog: Arc<dyn TypeCatalog>) -> Self {
        let resolvers = default_chain(&catalog);
        Self::with_resolvers(catalog, resolvers)
    }

    /// Creates a registrar trying `resolvers` in the given order.
    #[inline]
    #[must_use]
    pub fn with_resolvers(catalog: Arc<dyn TypeCatalog>, resolvers: Vec<Box<dyn Resolver>>) -> Self {
        Self {
            catalog,
            resolvers,
            sources: Vec::new(),
            registered: BTreeSet::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn TypeCatalog> {
        &self.catalog
    }

    #[inline]
    #[must_use]
    pub fn sources(&self) -> &[Arc<dyn Source>] {
        &self.sources
    }

    #[inline]
    #[must_use]
    pub fn is_registered(&self, type_info: &TypeInfo) -> bool {
        self.registered.contains(type_info)
    }

    /// Registers a type source for `type_info` and a method source for each of its factories,
    /// then checks the declared-dependency graph reachable from `type_info` for cycles.
    ///
    /// Registering the same type twice is a no-op.
    ///
    /// # Errors
    /// - [`RegisterErrorKind::UnknownType`] if the catalog doesn't describe the type
    /// - [`RegisterErrorKind::NonConcreteComponentClass`] if the type or a factory product is abstract
    /// - [`RegisterErrorKind::DuplicateQualifier`] if a qualifier tag is already taken
    /// - [`RegisterErrorKind::DependencyCycle`] if the type is part of a dependency cycle
    pub fn register(&mut self, type_info: &TypeInfo) -> Result<(), RegisterErrorKind> {
        let span = info_span!("register", component = type_info.name);
        let _guard = span.enter();

        if self.registered.contains(type_info) {
            warn!("Type already registered, skipping");
            return Ok(());
        }

        let catalog = self.catalog.clone();
        let Some(descriptor) = catalog.descriptor(type_info) else {
            let err = RegisterErrorKind::UnknownType { type_info: *type_info };
            error!("{}", err);
            return Err(err);
        };

        let type_source: Arc<dyn Source> = Arc::new(TypeSource::new(descriptor)?);
        let mut sources = vec![type_source.clone()];
        for factory in descriptor.factories() {
            sources.push(Arc::new(MethodSource::new(type_source.clone(), factory, &*catalog)?));
            debug!(factory = factory.name, product = factory.declaration.type_info.name, "Factory source created");
        }

        self.check_for_cycles(type_info).map_err(|err| {
            error!("{}", err);
            RegisterErrorKind::from(err)
        })?;

        self.commit(&sources)?;
        self.registered.insert(*type_info);
        debug!("Registered");
        Ok(())
    }

    /// Asks each resolver in order and returns the first match.
    ///
    /// # Errors
    /// Returns the error of the first failing resolver,
    /// or [`ResolveErrorKind::UnexpectedImplementationCount`] with no candidates if nothing matched.
    pub fn resolve(&self, dependency: &Dependency) -> Result<Arc<dyn Source>, ResolveErrorKind> {
        for resolver in &self.resolvers {
            if let Some(source) = resolver.resolve(dependency)? {
                debug!(
                    resolver = resolver.name(),
                    dependency = dependency.type_info.name,
                    source = source.declaration().type_info.name,
                    "Dependency resolved"
                );
                return Ok(source);
            }
        }

        let err = ResolveErrorKind::UnexpectedImplementationCount {
            type_info: dependency.type_info,
            candidates: Box::new([]),
        };
        error!("{}", err);
        Err(err)
    }

    /// Depth-first walk of the declared-dependency graph from `root`.
    ///
    /// A node depends on the declared types of its injection points (inherited ones included),
    /// on the types carrying the qualifier of a qualified point, on the concrete subtypes of an
    /// abstract node that have a source and on the declaring types of the factories producing it.
    ///
    /// # Errors
    /// Returns the path of the first cycle found, e.g. `A -> B -> A`.
    pub fn check_for_cycles(&self, root: &TypeInfo) -> Result<(), DependencyCycle> {
        let mut path = Vec::new();
        let mut finished = BTreeSet::new();
        self.visit(*root, &mut path, &mut finished)
    }

    fn visit(&self, node: TypeInfo, path: &mut Vec<TypeInfo>, finished: &mut BTreeSet<TypeInfo>) -> Result<(), DependencyCycle> {
        if let Some(start) = path.iter().position(|type_info| *type_info == node) {
            let mut cycle = path[start..].to_vec();
            cycle.push(node);
            return Err(DependencyCycle::new(cycle));
        }
        if finished.contains(&node) {
            return Ok(());
        }

        path.push(node);
        for next in self.dependencies_of(&node) {
            self.visit(next, path, finished)?;
        }
        path.pop();

        finished.insert(node);
        Ok(())
    }

    fn dependencies_of(&self, node: &TypeInfo) -> Vec<TypeInfo> {
        let mut dependencies = Vec::new();
        for point in self.catalog.injection_points(node) {
            match point.dependency.qualifier {
                Some(qualifier) => dependencies.extend(self.catalog.qualified(qualifier)),
                None => dependencies.push(point.dependency.type_info),
            }
        }
        if self.catalog.is_abstract(node) {
            dependencies.extend(
                self.catalog
                    .concrete_subtypes(node)
                    .into_iter()
                    .filter(|subtype| self.is_sourced(subtype)),
            );
        }
        dependencies.extend(self.catalog.factory_declarers(node));
        dependencies
    }

    /// Returns `true` if the type has, or gets on registration, a source:
    /// it's registered or marked, or a registered or marked type declares a factory producing it.
    fn is_sourced(&self, type_info: &TypeInfo) -> bool {
        self.is_registrable(type_info)
            || self
                .catalog
                .factory_declarers(type_info)
                .iter()
                .any(|declarer| self.is_registrable(declarer))
    }

    fn is_registrable(&self, type_info: &TypeInfo) -> bool {
        self.registered.contains(type_info)
            || self
                .catalog
                .descriptor(type_info)
                .is_some_and(|descriptor| descriptor.component_scope().is_some() || descriptor.qualifier().is_some())
    }

    /// Adds `sources` to every resolver, all of them or none.
    fn commit(&mut self, sources: &[Arc<dyn Source>]) -> Result<(), RegisterErrorKind> {
        for (index, source) in sources.iter().enumerate() {
            let result = self.resolvers.iter_mut().try_for_each(|resolver| resolver.register(source));
            if let Err(err) = result {
                for resolver in &mut self.resolvers {
                    for added in &sources[..=index] {
                        resolver.unregister(added);
                    }
                }
                debug!("Registration rolled back");
                return Err(err);
            }
        }
        self.sources.extend(sources.iter().cloned());
        Ok(())
    }
}
