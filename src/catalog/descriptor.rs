use alloc::{boxed::Box, collections::BTreeMap, sync::Arc, vec::Vec};
use core::{
    any::{type_name, Any},
    fmt::{self, Debug, Formatter},
    marker::PhantomData,
};

use crate::{
    any::{Erased, Instance, TypeInfo},
    autowired::{slot_accessor, Autowired, InjectionSlot},
    dependency::{Dependency, InjectionPoint},
    errors::InstantiateErrorKind,
    scope::Scope,
    source::ComponentDeclaration,
};

pub(crate) type Constructor = Arc<dyn Fn() -> Result<Instance, InstantiateErrorKind> + Send + Sync>;
pub(crate) type Caster = Arc<dyn Fn(Instance) -> Option<Erased> + Send + Sync>;
pub(crate) type FactoryFn = Arc<dyn Fn(&Instance) -> Result<Instance, InstantiateErrorKind> + Send + Sync>;
pub(crate) type Projection = Arc<dyn Fn(&dyn Any) -> Option<&dyn Any> + Send + Sync>;

#[inline]
fn projection<F>(project: F) -> Projection
where
    F: for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync + 'static,
{
    Arc::new(project)
}

#[inline]
fn identity<C: Send + Sync + 'static>() -> Caster {
    Arc::new(|instance: Instance| instance.downcast::<C>().ok().map(|value| Box::new(value) as Erased))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Concrete,
    /// A trait object type, it can't be produced, only resolved to a concrete implementation.
    Abstract,
}

/// A factory method: produces an instance of `declaration.type_info` from an instance of the declaring type.
#[derive(Clone)]
pub struct FactoryDescriptor {
    pub name: &'static str,
    pub declaration: ComponentDeclaration,
    pub(crate) invoke: FactoryFn,
    pub(crate) identity: Caster,
}

impl Debug for FactoryDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryDescriptor")
            .field("name", &self.name)
            .field("declaration", &self.declaration)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub(crate) struct ParentDescriptor {
    pub(crate) type_info: TypeInfo,
    pub(crate) project: Projection,
}

/// Everything the container knows about one type: markers, constructor, injection points,
/// parent type, factory methods and the abstract types it can be viewed as.
#[derive(Clone)]
pub struct TypeDescriptor {
    pub(crate) type_info: TypeInfo,
    pub(crate) kind: TypeKind,
    pub(crate) component: Option<Scope>,
    pub(crate) qualifier: Option<&'static str>,
    pub(crate) constructor: Option<Constructor>,
    pub(crate) fields: Vec<InjectionPoint>,
    pub(crate) parent: Option<ParentDescriptor>,
    pub(crate) factories: Vec<FactoryDescriptor>,
    pub(crate) casts: BTreeMap<TypeInfo, Caster>,
}

impl TypeDescriptor {
    /// Starts a declaration of a concrete type without the component marker.
    #[inline]
    #[must_use]
    pub fn concrete<C: Send + Sync + 'static>() -> DescriptorBuilder<C> {
        let type_info = TypeInfo::of::<C>();
        DescriptorBuilder {
            descriptor: Self::bare(type_info, identity::<C>()),
            _marker: PhantomData,
        }
    }

    /// Starts a declaration of a concrete type marked as a singleton component.
    #[inline]
    #[must_use]
    pub fn component<C: Send + Sync + 'static>() -> DescriptorBuilder<C> {
        Self::concrete::<C>().scope(Scope::Singleton)
    }

    /// Declares an abstract type, usually a trait object such as `dyn Repo + Send + Sync`.
    #[inline]
    #[must_use]
    pub fn abstract_type<T: ?Sized + 'static>() -> Self {
        Self {
            type_info: TypeInfo::of::<T>(),
            kind: TypeKind::Abstract,
            component: None,
            qualifier: None,
            constructor: None,
            fields: Vec::new(),
            parent: None,
            factories: Vec::new(),
            casts: BTreeMap::new(),
        }
    }

    pub(crate) fn bare(type_info: TypeInfo, identity: Caster) -> Self {
        Self {
            type_info,
            kind: TypeKind::Concrete,
            component: None,
            qualifier: None,
            constructor: None,
            fields: Vec::new(),
            parent: None,
            factories: Vec::new(),
            casts: BTreeMap::from([(type_info, identity)]),
        }
    }

    #[inline]
    #[must_use]
    pub fn type_info(&self) -> TypeInfo {
        self.type_info
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.kind == TypeKind::Abstract
    }

    /// Scope of the component marker, `None` if the type isn't marked as a component.
    #[inline]
    #[must_use]
    pub fn component_scope(&self) -> Option<Scope> {
        self.component
    }

    #[inline]
    #[must_use]
    pub fn qualifier(&self) -> Option<&'static str> {
        self.qualifier
    }

    #[inline]
    #[must_use]
    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// Injection points declared directly on this type, inherited ones excluded.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[InjectionPoint] {
        &self.fields
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<TypeInfo> {
        self.parent.as_ref().map(|parent| parent.type_info)
    }

    #[inline]
    #[must_use]
    pub fn factories(&self) -> &[FactoryDescriptor] {
        &self.factories
    }

    /// Declaration used when this type is registered directly, unmarked types default to singleton.
    #[inline]
    #[must_use]
    pub fn declaration(&self) -> ComponentDeclaration {
        ComponentDeclaration {
            type_info: self.type_info,
            scope: self.component.unwrap_or_default(),
            qualifier: self.qualifier,
        }
    }

    /// Returns `true` if instances of this type can be viewed as `target`.
    #[inline]
    #[must_use]
    pub fn can_cast_to(&self, target: &TypeInfo) -> bool {
        self.casts.contains_key(target)
    }
}

impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_info", &self.type_info.name)
            .field("kind", &self.kind)
            .field("component", &self.component)
            .field("qualifier", &self.qualifier)
            .field("fields", &self.fields)
            .field("parent", &self.parent())
            .field("factories", &self.factories)
            .finish_non_exhaustive()
    }
}

pub struct DescriptorBuilder<C> {
    descriptor: TypeDescriptor,
    _marker: PhantomData<fn() -> C>,
}

impl<C> DescriptorBuilder<C>
where
    C: Send + Sync + 'static,
{
    /// Marks the type as a component with the given scope.
    #[inline]
    #[must_use]
    pub fn scope(mut self, scope: Scope) -> Self {
        self.descriptor.component = Some(scope);
        self
    }

    #[inline]
    #[must_use]
    pub fn qualifier(mut self, qualifier: &'static str) -> Self {
        self.descriptor.qualifier = Some(qualifier);
        self
    }

    /// Sets the zero-argument constructor.
    #[inline]
    #[must_use]
    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn() -> Result<C, InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.descriptor.constructor = Some(Arc::new(move || constructor().map(|value| Arc::new(value) as Instance)));
        self
    }

    #[inline]
    #[must_use]
    pub fn default_constructor(self) -> Self
    where
        C: Default,
    {
        self.constructor(|| Ok(C::default()))
    }

    #[inline]
    #[must_use]
    pub fn field<D>(self, name: &'static str, accessor: fn(&C) -> &Autowired<D>) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.add_field(name, Dependency::of::<D>(), accessor)
    }

    #[inline]
    #[must_use]
    pub fn qualified_field<D>(self, name: &'static str, qualifier: &'static str, accessor: fn(&C) -> &Autowired<D>) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.add_field(name, Dependency::qualified::<D>(qualifier), accessor)
    }

    /// Declares `P` as the parent type, its injection points are inherited through `project`.
    #[inline]
    #[must_use]
    pub fn extends<P: Any>(mut self, project: fn(&C) -> &P) -> Self {
        self.descriptor.parent = Some(ParentDescriptor {
            type_info: TypeInfo::of::<P>(),
            project: projection(move |owner| owner.downcast_ref::<C>().map(|value| project(value) as &dyn Any)),
        });
        self
    }

    /// Declares `C` as a subtype of the abstract type `T`, `cast` is usually `|value| value`.
    #[inline]
    #[must_use]
    pub fn implements<T>(mut self, cast: fn(Arc<C>) -> Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let caster: Caster = Arc::new(move |instance: Instance| {
            instance
                .downcast::<C>()
                .ok()
                .map(|value| Box::new(cast(value)) as Erased)
        });
        self.descriptor.casts.insert(TypeInfo::of::<T>(), caster);
        self
    }

    /// Declares a factory method producing an unqualified `R` from an instance of `C`.
    #[inline]
    #[must_use]
    pub fn factory<R, F>(self, name: &'static str, scope: Scope, factory: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&C) -> Result<R, InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.add_factory(name, scope, None, factory)
    }

    #[inline]
    #[must_use]
    pub fn qualified_factory<R, F>(self, name: &'static str, scope: Scope, qualifier: &'static str, factory: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&C) -> Result<R, InstantiateErrorKind> + Send + Sync + 'static,
    {
        self.add_factory(name, scope, Some(qualifier), factory)
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

impl<C> DescriptorBuilder<C>
where
    C: Send + Sync + 'static,
{
    fn add_field<D>(mut self, name: &'static str, dependency: Dependency, accessor: fn(&C) -> &Autowired<D>) -> Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        self.descriptor.fields.push(InjectionPoint {
            owner: self.descriptor.type_info,
            field: name,
            dependency,
            accessor: slot_accessor(move |owner| owner.downcast_ref::<C>().map(|value| accessor(value) as &dyn InjectionSlot)),
        });
        self
    }

    fn add_factory<R, F>(mut self, name: &'static str, scope: Scope, qualifier: Option<&'static str>, factory: F) -> Self
    where
        R: Send + Sync + 'static,
        F: Fn(&C) -> Result<R, InstantiateErrorKind> + Send + Sync + 'static,
    {
        let invoke: FactoryFn = Arc::new(move |declarer: &Instance| {
            let Some(declarer) = declarer.downcast_ref::<C>() else {
                return Err(anyhow::anyhow!("declaring instance of factory is not a `{}`", type_name::<C>()).into());
            };
            factory(declarer).map(|value| Arc::new(value) as Instance)
        });
        self.descriptor.factories.push(FactoryDescriptor {
            name,
            declaration: ComponentDeclaration {
                type_info: TypeInfo::of::<R>(),
                scope,
                qualifier,
            },
            invoke,
            identity: identity::<R>(),
        });
        self
    }
}

impl<C> From<DescriptorBuilder<C>> for TypeDescriptor
where
    C: Send + Sync + 'static,
{
    #[inline]
    fn from(builder: DescriptorBuilder<C>) -> Self {
        builder.build()
    }
}
