//! Dependency Injection container and tools

use crate::{
    error::Error,
    registration::{ArcService, ResolverFn, TypeInfo},
    resolver::Resolver,
};
use self::construction::{Constructions, Entered};
use std::{
    any::TypeId,
    collections::HashMap,
    fmt::{Debug, Display, Formatter},
    hash::{BuildHasherDefault, Hasher},
    sync::{Arc, OnceLock},
};

pub use self::{
    builder::ContainerBuilder,
    factory::GenericFactory,
    from_resolver::FromResolver,
};

pub mod builder;
mod construction;
pub mod factory;
pub mod from_resolver;

/// Identifies a binding slot: a capability and an optional name
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub(crate) struct BindingKey {
    pub(crate) info: TypeInfo,
    pub(crate) name: Option<Arc<str>>,
}

impl BindingKey {
    #[inline]
    pub(crate) fn new(info: TypeInfo, name: Option<Arc<str>>) -> Self {
        Self { info, name }
    }
}

impl Display for BindingKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} (named '{name}')", self.info.type_name),
            None => f.write_str(self.info.type_name),
        }
    }
}

/// Lazily constructed singleton.
///
/// The value is published through a [`OnceLock`] while [`Constructions`]
/// serializes construction, so a failed construction leaves the cell empty.
pub(crate) struct LazyService {
    cell: OnceLock<ArcService>,
    resolver_fn: ResolverFn,
}

impl LazyService {
    #[inline]
    pub(crate) fn new(resolver_fn: ResolverFn) -> Self {
        Self {
            cell: OnceLock::new(),
            resolver_fn,
        }
    }

    #[inline]
    fn get(&self) -> Option<&ArcService> {
        self.cell.get()
    }

    fn get_or_try_init(
        &self,
        key: &BindingKey,
        constructions: &Constructions,
        resolver: &Resolver
    ) -> Result<&ArcService, Error> {
        let Some(_claim) = constructions.claim(key, || self.cell.get().is_some())? else {
            // Published by the thread that held the claim
            return self.cell
                .get()
                .ok_or(Error::ResolveFailed(key.info.type_name));
        };

        let service = (self.resolver_fn)(resolver)?;

        #[cfg(feature = "tracing")]
        tracing::trace!("materialized {key}");

        Ok(self.cell.get_or_init(|| service))
    }
}

/// Resolution strategy of a binding
pub(crate) enum Strategy {
    Instance(ArcService),
    Singleton(LazyService),
    Transient(ResolverFn),
}

/// Installed form of a [`Registration`](crate::Registration)
pub(crate) struct Binding {
    pub(crate) key: BindingKey,
    pub(crate) kind: &'static str,
    pub(crate) strategy: Strategy,
}

impl Debug for Binding {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Binding({}, {})", self.key, self.kind)
    }
}

#[derive(Default)]
struct TypeIdHasher(u64);

impl Hasher for TypeIdHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[cold]
    fn write(&mut self, _: &[u8]) {
        unreachable!("TypeId calls write_u64");
    }

    #[inline]
    fn write_u64(&mut self, id: u64) {
        self.0 = id;
    }
}

type TypeIdMap<V> = HashMap<
    TypeId,
    V,
    BuildHasherDefault<TypeIdHasher>
>;

/// Bindings of a container, unnamed and named ones live in separate slots
#[derive(Default)]
pub(crate) struct ServiceMap {
    unnamed: TypeIdMap<Binding>,
    named: TypeIdMap<HashMap<Arc<str>, Binding>>,
}

impl Debug for ServiceMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter())
            .finish()
    }
}

impl ServiceMap {
    #[inline]
    pub(crate) fn get(&self, type_id: TypeId, name: Option<&str>) -> Option<&Binding> {
        match name {
            None => self.unnamed.get(&type_id),
            Some(name) => self.named
                .get(&type_id)
                .and_then(|bindings| bindings.get(name)),
        }
    }

    #[inline]
    pub(crate) fn contains(&self, type_id: TypeId, name: Option<&str>) -> bool {
        self.get(type_id, name).is_some()
    }

    /// Installs a binding and returns the one it replaced, if any
    pub(crate) fn insert(&mut self, binding: Binding) -> Option<Binding> {
        let type_id = binding.key.info.type_id;
        match binding.key.name.clone() {
            None => self.unnamed.insert(type_id, binding),
            Some(name) => self.named
                .entry(type_id)
                .or_default()
                .insert(name, binding),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.unnamed.len() + self.named_len()
    }

    #[inline]
    pub(crate) fn named_len(&self) -> usize {
        self.named.values().map(HashMap::len).sum()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.unnamed
            .values()
            .chain(self.named.values().flat_map(HashMap::values))
    }
}

/// Represents a DI container, that is able to resolve generic dependencies.
///
/// A container is immutable once built and cheap to clone: all clones share
/// the same bindings and the same singleton instances.
#[derive(Clone)]
pub struct Container {
    /// Read-only bindings
    services: Arc<ServiceMap>,
    /// Singletons under construction
    constructions: Arc<Constructions>,
}

impl Debug for Container {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("services", &self.services)
            .finish()
    }
}

impl Container {
    #[inline]
    pub(crate) fn new(services: ServiceMap) -> Self {
        Self {
            services: Arc::new(services),
            constructions: Arc::default(),
        }
    }

    /// Resolves a service and returns a cloned instance.
    /// `T` must implement [`Clone`] otherwise use [`resolve_shared`](Self::resolve_shared)
    /// method that returns a shared pointer.
    #[inline]
    pub fn resolve<T: Send + Sync + Clone + 'static>(&self) -> Result<T, Error> {
        self.resolve_shared::<T>()
            .map(|s| s.as_ref().clone())
    }

    /// Resolves a service and returns a shared pointer
    #[inline]
    pub fn resolve_shared<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.resolve_with::<T>(None)
    }

    /// Resolves a named service and returns a cloned instance
    #[inline]
    pub fn resolve_named<T: Send + Sync + Clone + 'static>(&self, name: &str) -> Result<T, Error> {
        self.resolve_named_shared::<T>(name)
            .map(|s| s.as_ref().clone())
    }

    /// Resolves a named service and returns a shared pointer
    #[inline]
    pub fn resolve_named_shared<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, Error> {
        self.resolve_with::<T>(Some(name))
    }

    /// Resolves a service by its type and an optional name.
    ///
    /// An unnamed and a named binding of the same type are different slots.
    #[inline]
    pub fn resolve_keyed<T: ?Sized + Send + Sync + 'static>(&self, name: Option<&str>) -> Result<Arc<T>, Error> {
        self.resolve_with::<T>(name)
    }

    /// Resolves a service if it is registered.
    ///
    /// Returns `Ok(None)` only when there is no binding for `T` itself.
    #[inline]
    pub fn try_resolve_shared<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, Error> {
        if !self.contains::<T>() {
            return Ok(None);
        }
        self.resolve_shared::<T>().map(Some)
    }

    /// Returns `true` if there is an unnamed binding for `T`
    #[inline]
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.services.contains(TypeId::of::<T>(), None)
    }

    /// Returns `true` if there is a binding for `T` with the given name
    #[inline]
    pub fn contains_named<T: ?Sized + 'static>(&self, name: &str) -> bool {
        self.services.contains(TypeId::of::<T>(), Some(name))
    }

    /// Returns the number of bindings, named ones included
    #[inline]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if the container has no bindings
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves `(T, name)`, constructing it if needed
    pub(crate) fn resolve_with<T: ?Sized + Send + Sync + 'static>(&self, name: Option<&str>) -> Result<Arc<T>, Error> {
        let binding = self.services
            .get(TypeId::of::<T>(), name)
            .ok_or_else(|| Error::not_registered(std::any::type_name::<T>(), name))?;

        match &binding.strategy {
            Strategy::Instance(instance) => Self::resolve_internal(instance),
            Strategy::Singleton(lazy) => self.resolve_singleton(binding, lazy),
            Strategy::Transient(resolver_fn) => {
                let _entered = self.enter(binding)?;
                resolver_fn(&Resolver::new(self.clone())).and_then(|s| Self::resolve_internal(&s))
            }
        }
    }

    #[inline]
    fn resolve_singleton<T: ?Sized + Send + Sync + 'static>(
        &self,
        binding: &Binding,
        lazy: &LazyService
    ) -> Result<Arc<T>, Error> {
        if let Some(service) = lazy.get() {
            return Self::resolve_internal(service);
        }

        let _entered = self.enter(binding)?;
        let resolver = Resolver::new(self.clone());
        let service = lazy.get_or_try_init(&binding.key, &self.constructions, &resolver)?;

        Self::resolve_internal(service)
    }

    /// Marks `binding` as being constructed on the current thread,
    /// or fails if it already is
    #[inline]
    fn enter(&self, binding: &Binding) -> Result<Entered, Error> {
        let id = Arc::as_ptr(&self.services) as usize;
        construction::enter(id, &binding.key)
    }

    #[inline]
    fn resolve_internal<T: ?Sized + Send + Sync + 'static>(service: &ArcService) -> Result<Arc<T>, Error> {
        service
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(Error::ResolveFailed(std::any::type_name::<T>()))
    }
}
