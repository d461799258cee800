//! Builder that turns registrations into a [`Container`]

use super::{Binding, BindingKey, Container, LazyService, ServiceMap, Strategy};
use crate::{
    error::Error,
    registration::{Lifetime, Registration, Source, TypeInfo},
};
use std::{fmt::Debug, sync::Arc};

/// Represents a DI container builder.
///
/// Registrations are installed in the order they are given, the last
/// registration for a `(type, name)` key wins. Nothing is constructed
/// until the first resolution.
///
/// # Example
/// ```
/// use tether_di::{ContainerBuilder, Registration};
///
/// let mut builder = ContainerBuilder::new();
/// builder
///     .register(Registration::value(String::from("mongodb://localhost")))
///     .register_named(Registration::value(String::from("identityserver")), "database")
///     .require::<String>();
///
/// let container = builder.build().unwrap();
///
/// assert_eq!(container.resolve_named::<String>("database").unwrap(), "identityserver");
/// ```
pub struct ContainerBuilder {
    /// Bindings installed so far
    services: ServiceMap,
    /// Keys that must be bound when the container is built
    required: Vec<BindingKey>,
}

impl Debug for ContainerBuilder {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("services", &self.services)
            .field("required", &self.required)
            .finish()
    }
}

impl Default for ContainerBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<Registration> for ContainerBuilder {
    #[inline]
    fn extend<I: IntoIterator<Item = Registration>>(&mut self, iter: I) {
        for registration in iter {
            self.install(registration, None);
        }
    }
}

impl ContainerBuilder {
    /// Creates a new DI container builder
    #[inline]
    pub fn new() -> Self {
        Self {
            services: ServiceMap::default(),
            required: Vec::new(),
        }
    }

    /// Installs an unnamed binding for the registration
    #[inline]
    pub fn register(&mut self, registration: Registration) -> &mut Self {
        self.install(registration, None);
        self
    }

    /// Installs a binding for the registration that is resolvable only by `name`
    #[inline]
    pub fn register_named(&mut self, registration: Registration, name: impl Into<Arc<str>>) -> &mut Self {
        self.install(registration, Some(name.into()));
        self
    }

    /// Declares that `T` must be registered by the time the container is built
    #[inline]
    pub fn require<T: ?Sized + 'static>(&mut self) -> &mut Self {
        self.required.push(BindingKey::new(TypeInfo::of::<T>(), None));
        self
    }

    /// Declares that `T` must be registered under `name` by the time the container is built
    #[inline]
    pub fn require_named<T: ?Sized + 'static>(&mut self, name: impl Into<Arc<str>>) -> &mut Self {
        self.required.push(BindingKey::new(TypeInfo::of::<T>(), Some(name.into())));
        self
    }

    /// Builds a DI container.
    ///
    /// Fails with [`Error::Configuration`] if a required capability was
    /// declared but no registration provides it.
    pub fn build(self) -> Result<Container, Error> {
        let missing = self.required
            .iter()
            .find(|key| !self.services.contains(key.info.type_id, key.name.as_deref()));

        if let Some(key) = missing {
            #[cfg(feature = "tracing")]
            tracing::error!("no instance, type or factory found on registration for {key}");

            return Err(Error::configuration(key.info.type_name, key.name.as_deref()));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "container built with {} bindings ({} named)",
            self.services.len(),
            self.services.named_len()
        );

        Ok(Container::new(self.services))
    }

    fn install(&mut self, registration: Registration, name: Option<Arc<str>>) {
        let (dependency, source, lifetime) = registration.into_parts();
        let kind = source.kind();

        let strategy = match (source, lifetime) {
            (Source::Instance(instance), _) => Strategy::Instance(instance),
            (Source::Type(resolver_fn) | Source::Factory(resolver_fn), Lifetime::Singleton) => {
                Strategy::Singleton(LazyService::new(resolver_fn))
            }
            (Source::Type(resolver_fn) | Source::Factory(resolver_fn), Lifetime::Transient) => {
                Strategy::Transient(resolver_fn)
            }
        };

        let binding = Binding {
            key: BindingKey::new(dependency, name),
            kind,
            strategy,
        };

        if let Some(_replaced) = self.services.insert(binding) {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                "{} binding of {} replaced by a later {kind} registration",
                _replaced.kind,
                _replaced.key
            );
        }
    }
}
