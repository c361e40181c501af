mod descriptor;
mod entries;

pub use descriptor::{DescriptorBuilder, FactoryDescriptor, TypeDescriptor, TypeKind};
pub(crate) use descriptor::{Constructor, FactoryFn};
pub use entries::{distributed_slice, linkme, COMPONENTS};

use alloc::{collections::BTreeMap, vec::Vec};
use tracing::{debug, warn};

use crate::{
    any::{Erased, Instance, TypeInfo},
    autowired::slot_accessor,
    dependency::InjectionPoint,
};

/// Declaration markers a type can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Component,
    Qualifier,
}

/// Query-only view of every type known to the program.
///
/// The container never mutates a catalog, it only asks:
/// - which types carry a marker ([`TypeCatalog::marked`])
/// - which concrete types are subtypes of an abstract type ([`TypeCatalog::concrete_subtypes`])
/// - which injection points a type has, inherited ones included ([`TypeCatalog::injection_points`])
pub trait TypeCatalog: Send + Sync {
    #[must_use]
    fn descriptor(&self, type_info: &TypeInfo) -> Option<&TypeDescriptor>;

    #[must_use]
    fn marked(&self, marker: Marker) -> Vec<TypeInfo>;

    #[must_use]
    fn concrete_subtypes(&self, type_info: &TypeInfo) -> Vec<TypeInfo>;

    /// Injection points of the type and all of its ancestors, ancestors first.
    #[must_use]
    fn injection_points(&self, type_info: &TypeInfo) -> &[InjectionPoint];

    /// Types and factory products tagged with `qualifier`.
    #[must_use]
    fn qualified(&self, qualifier: &str) -> Vec<TypeInfo>;

    /// Types declaring a factory method that produces `produced`.
    #[must_use]
    fn factory_declarers(&self, produced: &TypeInfo) -> Vec<TypeInfo>;

    #[inline]
    #[must_use]
    fn is_abstract(&self, type_info: &TypeInfo) -> bool {
        self.descriptor(type_info).is_some_and(TypeDescriptor::is_abstract)
    }

    #[inline]
    #[must_use]
    fn can_cast(&self, concrete: &TypeInfo, target: &TypeInfo) -> bool {
        self.descriptor(concrete)
            .is_some_and(|descriptor| descriptor.can_cast_to(target))
    }

    /// Converts an instance of `concrete` into a boxed `Arc<target>`.
    #[must_use]
    fn cast(&self, concrete: &TypeInfo, target: &TypeInfo, instance: Instance) -> Option<Erased> {
        let caster = self.descriptor(concrete)?.casts.get(target)?;
        caster(instance)
    }
}

/// In-memory [`TypeCatalog`] built once from type descriptors.
pub struct Catalog {
    descriptors: BTreeMap<TypeInfo, TypeDescriptor>,
    injection_points: BTreeMap<TypeInfo, Vec<InjectionPoint>>,
    subtypes: BTreeMap<TypeInfo, Vec<TypeInfo>>,
    declarers: BTreeMap<TypeInfo, Vec<TypeInfo>>,
}

impl Catalog {
    #[inline]
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Builds a catalog from every descriptor registered in [`COMPONENTS`].
    #[inline]
    #[must_use]
    pub fn registered() -> Self {
        CatalogBuilder::new().declare_registered().build()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl TypeCatalog for Catalog {
    #[inline]
    fn descriptor(&self, type_info: &TypeInfo) -> Option<&TypeDescriptor> {
        self.descriptors.get(type_info)
    }

    fn marked(&self, marker: Marker) -> Vec<TypeInfo> {
        self.descriptors
            .values()
            .filter(|descriptor| match marker {
                Marker::Component => descriptor.component.is_some(),
                Marker::Qualifier => descriptor.qualifier.is_some(),
            })
            .map(|descriptor| descriptor.type_info)
            .collect()
    }

    #[inline]
    fn concrete_subtypes(&self, type_info: &TypeInfo) -> Vec<TypeInfo> {
        self.subtypes.get(type_info).cloned().unwrap_or_default()
    }

    #[inline]
    fn injection_points(&self, type_info: &TypeInfo) -> &[InjectionPoint] {
        self.injection_points.get(type_info).map(Vec::as_slice).unwrap_or_default()
    }

    fn qualified(&self, qualifier: &str) -> Vec<TypeInfo> {
        let mut types = Vec::new();
        for descriptor in self.descriptors.values() {
            if descriptor.qualifier == Some(qualifier) {
                types.push(descriptor.type_info);
            }
            for factory in &descriptor.factories {
                if factory.declaration.qualifier == Some(qualifier) {
                    types.push(factory.declaration.type_info);
                }
            }
        }
        types
    }

    #[inline]
    fn factory_declarers(&self, produced: &TypeInfo) -> Vec<TypeInfo> {
        self.declarers.get(produced).cloned().unwrap_or_default()
    }
}

#[derive(Default)]
pub struct CatalogBuilder {
    descriptors: BTreeMap<TypeInfo, TypeDescriptor>,
}

impl CatalogBuilder {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptors: BTreeMap::new(),
        }
    }

    /// Adds a descriptor. A later declaration of the same type replaces the earlier one.
    #[inline]
    #[must_use]
    pub fn declare(mut self, descriptor: impl Into<TypeDescriptor>) -> Self {
        let descriptor = descriptor.into();
        if let Some(replaced) = self.descriptors.insert(descriptor.type_info, descriptor) {
            warn!(type_name = replaced.type_info.name, "Type declared twice, the last declaration is used");
        }
        self
    }

    /// Adds every descriptor registered in [`COMPONENTS`].
    #[inline]
    #[must_use]
    pub fn declare_registered(self) -> Self {
        COMPONENTS.iter().fold(self, |builder, getter| builder.declare(getter()))
    }

    #[must_use]
    pub fn build(mut self) -> Catalog {
        let products: Vec<TypeDescriptor> = self
            .descriptors
            .values()
            .flat_map(|descriptor| &descriptor.factories)
            .filter(|factory| !self.descriptors.contains_key(&factory.declaration.type_info))
            .map(|factory| TypeDescriptor::bare(factory.declaration.type_info, factory.identity.clone()))
            .collect();
        for product in products {
            debug!(type_name = product.type_info.name, "Implicitly declared factory product");
            self.descriptors.entry(product.type_info).or_insert(product);
        }

        let mut subtypes: BTreeMap<TypeInfo, Vec<TypeInfo>> = BTreeMap::new();
        let mut declarers: BTreeMap<TypeInfo, Vec<TypeInfo>> = BTreeMap::new();
        for descriptor in self.descriptors.values() {
            if !descriptor.is_abstract() {
                for target in descriptor.casts.keys().filter(|target| **target != descriptor.type_info) {
                    subtypes.entry(*target).or_default().push(descriptor.type_info);
                }
            }
            for factory in &descriptor.factories {
                declarers
                    .entry(factory.declaration.type_info)
                    .or_default()
                    .push(descriptor.type_info);
            }
        }

        let mut injection_points = BTreeMap::new();
        for type_info in self.descriptors.keys() {
            let points = collect_points(&self.descriptors, type_info, &mut Vec::new());
            if !points.is_empty() {
                injection_points.insert(*type_info, points);
            }
        }

        Catalog {
            descriptors: self.descriptors,
            injection_points,
            subtypes,
            declarers,
        }
    }
}

fn collect_points(descriptors: &BTreeMap<TypeInfo, TypeDescriptor>, type_info: &TypeInfo, lineage: &mut Vec<TypeInfo>) -> Vec<InjectionPoint> {
    let Some(descriptor) = descriptors.get(type_info) else {
        return Vec::new();
    };
    if lineage.contains(type_info) {
        warn!(type_name = type_info.name, "Type extends itself, inherited injection points are cut");
        return Vec::new();
    }
    lineage.push(*type_info);

    let mut points = Vec::new();
    if let Some(parent) = &descriptor.parent {
        if !descriptors.contains_key(&parent.type_info) {
            warn!(type_name = type_info.name, parent = parent.type_info.name, "Parent type isn't declared");
        }
        for point in collect_points(descriptors, &parent.type_info, lineage) {
            let project = parent.project.clone();
            let inner = point.accessor.clone();
            points.push(point.with_accessor(slot_accessor(move |owner| project(owner).and_then(|base| inner(base)))));
        }
    }
    points.extend(descriptor.fields.iter().cloned());

    lineage.pop();
    points
}
