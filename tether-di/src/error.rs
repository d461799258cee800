//! Describes dependency injection errors

use std::{
    borrow::Cow,
    fmt::{Display, Formatter},
};

/// Errors produced while building a [`Container`](crate::Container) or resolving from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required capability has no registration that provides an instance, a type or a factory.
    ///
    /// Raised by [`ContainerBuilder::build`](crate::ContainerBuilder::build).
    Configuration {
        /// Declared capability
        type_name: &'static str,
        /// Binding name, if the requirement was named
        name: Option<String>,
    },

    /// There is no binding for the requested `(type, name)` pair
    NotRegistered {
        /// Requested capability
        type_name: &'static str,
        /// Requested binding name
        name: Option<String>,
    },

    /// A factory chain resolved back into a binding that is still under construction.
    ///
    /// `chain` starts with the first binding on the resolution path and ends
    /// with the binding that was requested again.
    CyclicDependency {
        /// Bindings on the resolution path
        chain: Vec<String>,
    },

    /// A stored service could not be cast to the requested type
    ResolveFailed(&'static str),

    /// Error reported by a factory or an [`Inject`](crate::Inject) implementation
    Other(Cow<'static, str>),
}

impl Error {
    /// Creates an [`Error::Other`] with a custom message
    #[inline]
    pub fn other(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Other(msg.into())
    }

    #[inline]
    pub(crate) fn not_registered(type_name: &'static str, name: Option<&str>) -> Self {
        Self::NotRegistered {
            type_name,
            name: name.map(str::to_owned),
        }
    }

    #[inline]
    pub(crate) fn configuration(type_name: &'static str, name: Option<&str>) -> Self {
        Self::Configuration {
            type_name,
            name: name.map(str::to_owned),
        }
    }

    /// Returns `true` if this is a [`Error::CyclicDependency`]
    #[inline]
    pub fn is_cyclic(&self) -> bool {
        matches!(self, Self::CyclicDependency { .. })
    }

    /// Returns `true` if this is a [`Error::NotRegistered`]
    #[inline]
    pub fn is_not_registered(&self) -> bool {
        matches!(self, Self::NotRegistered { .. })
    }
}

struct Named<'a>(&'a Option<String>);

impl Display for Named<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(name) => write!(f, " (named '{name}')"),
            None => Ok(()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Configuration { type_name, name } => write!(
                f,
                "Services Error: no instance, type or factory found on registration for {type_name}{}",
                Named(name)
            ),
            Error::NotRegistered { type_name, name } => write!(
                f,
                "Services Error: service not registered: {type_name}{}",
                Named(name)
            ),
            Error::CyclicDependency { chain } => write!(
                f,
                "Services Error: cyclic dependency detected: {}",
                chain.join(" -> ")
            ),
            Error::ResolveFailed(type_name) => write!(
                f,
                "Services Error: unable to resolve the service: {type_name}"
            ),
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}
