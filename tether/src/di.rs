//! Tools for Dependency Injection

pub use tether_di::{
    Container,
    ContainerBuilder,
    FromResolver,
    GenericFactory,
    Implements,
    Inject,
    Lifetime,
    Registration,
    Resolver,
    TypeInfo,
    implements,
};

#[cfg(feature = "macros")]
pub use tether_macros::Inject;

/// Dependency resolution errors
pub mod error {
    pub use tether_di::error::Error;
}
