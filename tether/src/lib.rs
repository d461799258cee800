//! # Tether
//!
//! > Registration-driven inversion of control for Rust services.
//!
//! ## Features
//! * Instance, type and factory registrations
//! * Named bindings and last-wins overrides
//! * Lazy, thread-safe singletons constructed at most once
//! * Cyclic dependency detection with the full dependency chain
//! * Store settings loaded from JSON or environment variables
//! * Optional `#[derive(Inject)]`
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//! use tether::{Services, StoreSettings, di::{Registration, Resolver, implements}};
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! #[derive(Default)]
//! struct SystemClock;
//!
//! impl Clock for SystemClock {
//!     fn now(&self) -> u64 { 42 }
//! }
//!
//! implements! {
//!     SystemClock => dyn Clock
//! }
//!
//! struct Repo {
//!     clock: Arc<dyn Clock>,
//!     database: String,
//! }
//!
//! let mut services = Services::new(StoreSettings::default());
//! services
//!     .add(Registration::of_type::<dyn Clock, SystemClock>())
//!     .add(Registration::factory(|r: Resolver| {
//!         let settings = r.resolve_shared::<StoreSettings>()?;
//!         Ok(Repo {
//!             clock: r.resolve_shared()?,
//!             database: settings.database().to_owned(),
//!         })
//!     }));
//!
//! let factory = services.build().unwrap();
//! let repo = factory.resolve_shared::<Repo>().unwrap();
//!
//! assert_eq!(repo.clock.now(), 42);
//! assert_eq!(repo.database, "identityserver");
//! ```

pub mod di;
pub mod services;
pub mod settings;

pub use crate::{
    services::{Factory, Services},
    settings::{SettingsError, StoreSettings},
};
