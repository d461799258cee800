//! Construction rules for type-backed registrations

use crate::{error::Error, resolver::Resolver};

/// A trait that describes how a type is constructed when it is registered
/// with [`Registration::of_type`](crate::Registration::of_type).
///
/// Types implementing [`Default`] construct themselves without dependencies.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tether_di::{ContainerBuilder, Inject, Registration, Resolver, error::Error};
///
/// #[derive(Default)]
/// struct SystemClock;
///
/// struct TokenService {
///     clock: Arc<SystemClock>,
/// }
///
/// impl Inject for TokenService {
///     fn inject(resolver: &Resolver) -> Result<Self, Error> {
///         let clock = resolver.resolve_shared::<SystemClock>()?;
///         Ok(Self { clock })
///     }
/// }
///
/// let mut builder = ContainerBuilder::new();
/// builder
///     .register(Registration::constructed::<SystemClock>())
///     .register(Registration::constructed::<TokenService>());
///
/// let container = builder.build().unwrap();
/// let service = container.resolve_shared::<TokenService>().unwrap();
///
/// assert!(Arc::ptr_eq(&service.clock, &container.resolve_shared().unwrap()));
/// ```
pub trait Inject: Sized + Send + Sync {
    /// Constructs `Self`, resolving its dependencies through the `resolver`
    fn inject(resolver: &Resolver) -> Result<Self, Error>;
}

impl<T: Default + Send + Sync> Inject for T {
    #[inline]
    fn inject(_: &Resolver) -> Result<Self, Error> {
        Ok(Self::default())
    }
}
