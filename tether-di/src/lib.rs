//! Registration-driven dependency injection
//!
//! A [`ContainerBuilder`] consumes an ordered sequence of [`Registration`]s,
//! each describing one capability and exactly one way to obtain it: a fixed
//! instance, a constructible type or a factory of a [`Resolver`]. The built
//! [`Container`] is immutable and resolves capabilities by type, optionally
//! qualified by a name. Type and factory backed singletons are constructed
//! lazily, at most once, even under concurrent first access.

pub use crate::{
    container::{Container, ContainerBuilder, FromResolver, GenericFactory},
    inject::Inject,
    registration::{Implements, Lifetime, Registration, TypeInfo},
    resolver::Resolver,
};

pub mod error;
pub mod container;
pub mod inject;
pub mod registration;
pub mod resolver;
