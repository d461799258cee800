//! Extractors for fetching factory arguments from a [`Resolver`]

use super::{Container, Error};
use crate::resolver::Resolver;
use std::sync::Arc;

/// A trait that defines how to extract `Self` from a [`Resolver`]
pub trait FromResolver: Sized + Send + Sync {
    /// Extracts `Self` from a resolver
    fn from_resolver(resolver: &Resolver) -> Result<Self, Error>;
}

impl FromResolver for Resolver {
    #[inline]
    fn from_resolver(resolver: &Resolver) -> Result<Self, Error> {
        Ok(resolver.clone())
    }
}

impl FromResolver for Container {
    #[inline]
    fn from_resolver(resolver: &Resolver) -> Result<Self, Error> {
        Ok(resolver.container().clone())
    }
}

impl FromResolver for () {
    #[inline]
    fn from_resolver(_: &Resolver) -> Result<Self, Error> {
        Ok(())
    }
}

impl<T: ?Sized + Send + Sync + 'static> FromResolver for Arc<T> {
    #[inline]
    fn from_resolver(resolver: &Resolver) -> Result<Self, Error> {
        resolver.resolve_shared::<T>()
    }
}

impl<T: ?Sized + Send + Sync + 'static> FromResolver for Option<Arc<T>> {
    #[inline]
    fn from_resolver(resolver: &Resolver) -> Result<Self, Error> {
        resolver.try_resolve_shared::<T>()
    }
}

macro_rules! define_generic_from_resolver {
    ($($T: ident),*) => {
        impl<$($T: FromResolver),+> FromResolver for ($($T,)+) {
            #[inline]
            #[allow(non_snake_case)]
            fn from_resolver(resolver: &Resolver) -> Result<Self, Error> {
                let tuple = (
                    $(
                    $T::from_resolver(resolver)?,
                    )*
                );
                Ok(tuple)
            }
        }
    }
}

define_generic_from_resolver! { T1 }
define_generic_from_resolver! { T1, T2 }
define_generic_from_resolver! { T1, T2, T3 }
define_generic_from_resolver! { T1, T2, T3, T4 }
define_generic_from_resolver! { T1, T2, T3, T4, T5 }

#[cfg(test)]
mod tests {
    use crate::{ContainerBuilder, Registration};
    use super::*;

    #[derive(Debug, Clone, Copy)]
    struct Dependency {
        x: i32
    }

    #[derive(Debug)]
    struct Settings;

    struct Consumer {
        dependency: Arc<Dependency>,
        settings: Option<Arc<Settings>>,
    }

    #[test]
    fn it_extracts_shared_dependency() {
        let mut builder = ContainerBuilder::new();
        builder.register(Registration::factory(|| Dependency { x: 1 }));

        let container = builder.build().unwrap();
        let resolver = Resolver::new(container);

        let dependency = Arc::<Dependency>::from_resolver(&resolver).unwrap();

        assert_eq!(dependency.x, 1);
    }

    #[test]
    fn it_extracts_optional_dependency() {
        let mut builder = ContainerBuilder::new();
        builder
            .register(Registration::value(Dependency { x: 7 }))
            .register(Registration::factory(|dependency: Arc<Dependency>, settings: Option<Arc<Settings>>| {
                Ok(Consumer { dependency, settings })
            }));

        let container = builder.build().unwrap();

        let consumer = container.resolve_shared::<Consumer>().unwrap();

        assert_eq!(consumer.dependency.x, 7);
        assert!(consumer.settings.is_none());
    }

    #[test]
    fn it_extracts_with_error() {
        let container = ContainerBuilder::new().build().unwrap();
        let resolver = Resolver::new(container);

        let err = Arc::<Dependency>::from_resolver(&resolver).unwrap_err();

        assert_eq!(err.to_string(), "Services Error: service not registered: tether_di::container::from_resolver::tests::Dependency");
    }
}
