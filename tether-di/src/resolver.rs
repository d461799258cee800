//! Lookup capability handed to factories while they construct a dependency

use crate::{container::Container, error::Error};
use std::{fmt::Debug, sync::Arc};

/// A read-only view onto a [`Container`] that is passed into factories and
/// [`Inject`](crate::Inject) implementations.
///
/// It resolves any binding of the container, including ones that are not
/// materialized yet. Resolving through the resolver, its [`Container`] or a
/// clone of either is equivalent: cycles fail with [`Error::CyclicDependency`]
/// whichever way a nested resolution is reached.
#[derive(Clone)]
pub struct Resolver {
    container: Container,
}

impl Debug for Resolver {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("container", &self.container)
            .finish()
    }
}

impl Resolver {
    #[inline]
    pub(crate) fn new(container: Container) -> Self {
        Self { container }
    }

    /// Returns the container this resolver delegates to
    #[inline]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Resolves a service and returns a cloned instance
    #[inline]
    pub fn resolve<T: Send + Sync + Clone + 'static>(&self) -> Result<T, Error> {
        self.resolve_shared::<T>()
            .map(|s| s.as_ref().clone())
    }

    /// Resolves a service and returns a shared pointer
    #[inline]
    pub fn resolve_shared<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.resolve_keyed::<T>(None)
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
        self.resolve_keyed::<T>(Some(name))
    }

    /// Resolves a service by its type and an optional name
    #[inline]
    pub fn resolve_keyed<T: ?Sized + Send + Sync + 'static>(&self, name: Option<&str>) -> Result<Arc<T>, Error> {
        self.container.resolve_with::<T>(name)
    }

    /// Resolves a service if it is registered.
    ///
    /// Returns `Ok(None)` only when there is no binding for `T` itself,
    /// failures while constructing it are still reported.
    #[inline]
    pub fn try_resolve_shared<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>, Error> {
        if !self.container.contains::<T>() {
            return Ok(None);
        }
        self.resolve_shared::<T>().map(Some)
    }
}
