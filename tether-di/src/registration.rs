//! Declarative descriptions of how to obtain a dependency

use crate::{
    container::{FromResolver, GenericFactory},
    error::Error,
    inject::Inject,
    resolver::Resolver,
};
use std::{
    any::{Any, TypeId},
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};

/// Type-erased shared service.
///
/// The concrete type behind the [`Any`] is always `Arc<T>` where `T` is the
/// registered capability, so unsized capabilities like `dyn Trait` can be stored too.
pub(crate) type ArcService = Arc<
    dyn Any
    + Send
    + Sync
>;

pub(crate) type ResolverFn = Arc<
    dyn Fn(&Resolver) -> Result<ArcService, Error>
    + Send
    + Sync
>;

#[inline]
pub(crate) fn erase<T: ?Sized + Send + Sync + 'static>(service: Arc<T>) -> ArcService {
    Arc::new(service)
}

/// Type name and [`TypeId`] of a capability
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    /// Human-readable type name
    pub type_name: &'static str,
    /// Unique type identifier
    pub type_id: TypeId,
}

impl TypeInfo {
    /// Returns the [`TypeInfo`] of `T`
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

impl Display for TypeInfo {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Declares that `Self` can be exposed as the capability `T`.
///
/// Every type implements the capability of itself. Use the [`implements!`](crate::implements)
/// macro to bind a concrete type to a trait object capability.
pub trait Implements<T: ?Sized>: Send + Sync + 'static {
    /// Converts a shared instance into the capability
    fn upcast(self: Arc<Self>) -> Arc<T>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    #[inline]
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Implements [`Implements`] for one or more `Type => Capability` pairs.
///
/// # Example
/// ```
/// use tether_di::implements;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// #[derive(Default)]
/// struct SystemClock;
///
/// impl Clock for SystemClock {
///     fn now(&self) -> u64 { 0 }
/// }
///
/// implements! {
///     SystemClock => dyn Clock
/// }
/// ```
#[macro_export]
macro_rules! implements {
    ($($ty:ty => $cap:ty),* $(,)?) => {
        $(impl $crate::Implements<$cap> for $ty {
            #[inline]
            fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$cap> {
                self
            }
        })*
    };
}

/// How often a type or factory backed binding is constructed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Constructed on first resolution and shared for the lifetime of the container
    #[default]
    Singleton,
    /// Constructed on every resolution
    Transient,
}

/// The single source a [`Registration`] obtains its instance from
pub(crate) enum Source {
    Instance(ArcService),
    Type(ResolverFn),
    Factory(ResolverFn),
}

impl Source {
    #[inline]
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Source::Instance(_) => "instance",
            Source::Type(_) => "type",
            Source::Factory(_) => "factory",
        }
    }
}

/// An immutable description of one bindable dependency.
///
/// Every registration targets a capability `T` and carries exactly one source:
/// a pre-built instance, a constructible type or a factory of a [`Resolver`].
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tether_di::{ContainerBuilder, Registration, Resolver};
///
/// #[derive(Default)]
/// struct Clock;
///
/// struct Repo {
///     clock: Arc<Clock>,
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder
///     .register(Registration::constructed::<Clock>())
///     .register(Registration::factory(|r: Resolver| {
///         Ok(Repo { clock: r.resolve_shared()? })
///     }));
///
/// let container = builder.build().unwrap();
/// let repo = container.resolve_shared::<Repo>().unwrap();
/// let clock = container.resolve_shared::<Clock>().unwrap();
///
/// assert!(Arc::ptr_eq(&repo.clock, &clock));
/// ```
pub struct Registration {
    dependency: TypeInfo,
    source: Source,
    lifetime: Lifetime,
}

impl Debug for Registration {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("dependency", &self.dependency.type_name)
            .field("source", &self.source.kind())
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl Registration {
    /// Binds the capability `T` to an already created instance
    #[inline]
    pub fn instance<T>(instance: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static
    {
        Self {
            dependency: TypeInfo::of::<T>(),
            source: Source::Instance(erase(instance)),
            lifetime: Lifetime::Singleton,
        }
    }

    /// Binds `T` to the given value
    #[inline]
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Self::instance(Arc::new(value))
    }

    /// Binds the capability `T` to the type `C`, constructed through its [`Inject`] implementation
    pub fn of_type<T, C>() -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        C: Inject + Implements<T>
    {
        let resolver_fn: ResolverFn = Arc::new(|resolver: &Resolver| {
            C::inject(resolver).map(|instance| erase::<T>(Arc::new(instance).upcast()))
        });
        Self {
            dependency: TypeInfo::of::<T>(),
            source: Source::Type(resolver_fn),
            lifetime: Lifetime::Singleton,
        }
    }

    /// Binds `C` to itself, constructed through its [`Inject`] implementation
    #[inline]
    pub fn constructed<C: Inject + 'static>() -> Self {
        Self::of_type::<C, C>()
    }

    /// Binds the factory output type to a factory function.
    ///
    /// The factory arguments are extracted with [`FromResolver`], so a factory
    /// may take a [`Resolver`], `Arc<T>` dependencies or a tuple of them.
    #[inline]
    pub fn factory<T, F, Args>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: GenericFactory<Args, Output = T>,
        Args: FromResolver
    {
        Self::factory_as::<T, F, Args>(factory)
    }

    /// Binds the capability `T` to a factory function whose output implements `T`
    pub fn factory_as<T, F, Args>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: GenericFactory<Args>,
        F::Output: Implements<T>,
        Args: FromResolver
    {
        let resolver_fn: ResolverFn = Arc::new(move |resolver: &Resolver| {
            let args = Args::from_resolver(resolver)?;
            factory
                .call(args)
                .map(|instance| erase::<T>(Arc::new(instance).upcast()))
        });
        Self {
            dependency: TypeInfo::of::<T>(),
            source: Source::Factory(resolver_fn),
            lifetime: Lifetime::Singleton,
        }
    }

    /// Binds the capability `T` to a factory that produces a shared pointer itself
    pub fn shared_factory<T, F>(factory: F) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Resolver) -> Result<Arc<T>, Error> + Send + Sync + 'static
    {
        let resolver_fn: ResolverFn = Arc::new(move |resolver: &Resolver| {
            factory(resolver).map(erase)
        });
        Self {
            dependency: TypeInfo::of::<T>(),
            source: Source::Factory(resolver_fn),
            lifetime: Lifetime::Singleton,
        }
    }

    /// Constructs a new instance on every resolution.
    ///
    /// Has no effect on instance registrations, which are always shared.
    #[inline]
    pub fn transient(mut self) -> Self {
        if !matches!(self.source, Source::Instance(_)) {
            self.lifetime = Lifetime::Transient;
        }
        self
    }

    /// Returns the capability this registration binds
    #[inline]
    pub fn dependency(&self) -> TypeInfo {
        self.dependency
    }

    /// Returns the lifetime of the instances this registration produces
    #[inline]
    pub fn lifetime(&self) -> Lifetime {
        self.lifetime
    }

    #[inline]
    pub(crate) fn into_parts(self) -> (TypeInfo, Source, Lifetime) {
        (self.dependency, self.source, self.lifetime)
    }
}
