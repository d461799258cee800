//! Service registrations and the factory that resolves them

use crate::{
    di::{
        Container,
        ContainerBuilder,
        FromResolver,
        GenericFactory,
        Implements,
        Inject,
        Registration,
        error::Error,
    },
    settings::StoreSettings,
};
use std::sync::Arc;

/// An ordered set of registrations together with the store settings they are built for.
///
/// The settings are registered as an instance, so factories and [`Inject`]
/// implementations resolve them as `Arc<StoreSettings>`.
///
/// # Example
/// ```
/// use tether::{Services, StoreSettings};
///
/// #[derive(Default)]
/// struct Cache;
///
/// let mut services = Services::new(StoreSettings::new().with_database("tests"));
/// services.add_type::<Cache, Cache>();
///
/// let factory = services.build().unwrap();
///
/// assert_eq!(factory.resolve_shared::<StoreSettings>().unwrap().database(), "tests");
/// assert!(factory.resolve_shared::<Cache>().is_ok());
/// ```
#[derive(Debug)]
pub struct Services {
    settings: Arc<StoreSettings>,
    builder: ContainerBuilder,
}

impl Default for Services {
    #[inline]
    fn default() -> Self {
        Self::new(StoreSettings::default())
    }
}

impl Extend<Registration> for Services {
    #[inline]
    fn extend<I: IntoIterator<Item = Registration>>(&mut self, iter: I) {
        self.builder.extend(iter);
    }
}

impl Services {
    /// Creates a new set of services for the given settings
    pub fn new(settings: StoreSettings) -> Self {
        let settings = Arc::new(settings);
        let mut builder = ContainerBuilder::new();
        builder.register(Registration::instance(settings.clone()));
        Self { settings, builder }
    }

    /// Returns the store settings
    #[inline]
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Adds a registration, replacing an earlier one for the same capability
    pub fn add(&mut self, registration: Registration) -> &mut Self {
        self.builder.register(registration);
        self
    }

    /// Adds a registration bound under `name`
    pub fn add_named(&mut self, registration: Registration, name: impl Into<Arc<str>>) -> &mut Self {
        self.builder.register_named(registration, name);
        self
    }

    /// Registers a singleton instance
    ///
    /// # Example
    /// ```
    /// use tether::Services;
    ///
    /// #[derive(Default)]
    /// struct Singleton;
    ///
    /// let mut services = Services::default();
    /// services.add_singleton(Singleton);
    /// ```
    pub fn add_singleton<T: Send + Sync + 'static>(&mut self, instance: T) -> &mut Self {
        self.add(Registration::value(instance))
    }

    /// Registers the capability `T` backed by the type `C`,
    /// constructed once on first resolution
    pub fn add_type<T, C>(&mut self) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        C: Inject + Implements<T>
    {
        self.add(Registration::of_type::<T, C>())
    }

    /// Registers the capability `T` backed by the type `C`,
    /// constructed on every resolution
    pub fn add_transient<T, C>(&mut self) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
        C: Inject + Implements<T>
    {
        self.add(Registration::of_type::<T, C>().transient())
    }

    /// Registers a factory whose output is constructed once on first resolution
    pub fn add_factory<T, F, Args>(&mut self, factory: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: GenericFactory<Args, Output = T>,
        Args: FromResolver
    {
        self.add(Registration::factory(factory))
    }

    /// Declares that the capability `T` must be registered before the services are built
    pub fn require<T: ?Sized + 'static>(&mut self) -> &mut Self {
        self.builder.require::<T>();
        self
    }

    /// Declares that the capability `T` must be registered under `name`
    pub fn require_named<T: ?Sized + 'static>(&mut self, name: impl Into<Arc<str>>) -> &mut Self {
        self.builder.require_named::<T>(name);
        self
    }

    /// Builds a [`Factory`] out of the registered services
    #[inline]
    pub fn build(self) -> Result<Factory, Error> {
        Factory::new(self)
    }
}

/// Resolves the services a [`Services`] set was built from
#[derive(Debug, Clone)]
pub struct Factory {
    settings: Arc<StoreSettings>,
    container: Container,
}

impl TryFrom<Services> for Factory {
    type Error = Error;

    #[inline]
    fn try_from(services: Services) -> Result<Self, Self::Error> {
        Self::new(services)
    }
}

impl Factory {
    /// Builds the container out of `services`.
    ///
    /// Fails with [`Error::Configuration`] if a required capability is missing.
    pub fn new(services: Services) -> Result<Self, Error> {
        let Services { settings, builder } = services;

        #[cfg(feature = "tracing")]
        tracing::debug!("building services for database {}", settings.database());

        let container = builder.build()?;
        Ok(Self { settings, container })
    }

    /// Returns the store settings
    #[inline]
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Returns the underlying container
    #[inline]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Resolves a clone of `T`
    #[inline]
    pub fn resolve<T: Send + Sync + Clone + 'static>(&self) -> Result<T, Error> {
        self.container.resolve::<T>()
    }

    /// Resolves the shared instance of the capability `T`
    #[inline]
    pub fn resolve_shared<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        self.container.resolve_shared::<T>()
    }

    /// Resolves the shared instance of the capability `T` bound under `name`
    #[inline]
    pub fn resolve_named_shared<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, Error> {
        self.container.resolve_named_shared::<T>(name)
    }

    /// Resolves the capability `T`, bound under `name` if one is given
    #[inline]
    pub fn resolve_keyed<T: ?Sized + Send + Sync + 'static>(&self, name: Option<&str>) -> Result<Arc<T>, Error> {
        self.container.resolve_keyed::<T>(name)
    }
}

#[cfg(test)]
mod tests {
    use super::{Factory, Services};
    use crate::{
        di::{Registration, Resolver, error::Error, implements},
        settings::StoreSettings,
    };
    use std::sync::Arc;

    trait ClientStore: Send + Sync {
        fn collection(&self) -> &str;
    }

    struct MemoryClientStore {
        collection: String,
    }

    impl ClientStore for MemoryClientStore {
        fn collection(&self) -> &str {
            &self.collection
        }
    }

    implements! {
        MemoryClientStore => dyn ClientStore
    }

    #[derive(Default)]
    struct Counter;

    #[test]
    fn it_registers_settings() {
        let services = Services::new(StoreSettings::new().with_database("testidentityserver"));
        let factory = services.build().unwrap();

        let settings = factory.resolve_shared::<StoreSettings>().unwrap();

        assert_eq!(settings.database(), "testidentityserver");
        assert_eq!(factory.settings(), settings.as_ref());
    }

    #[test]
    fn it_passes_settings_to_factories() {
        let mut services = Services::default();
        services.add(Registration::factory_as::<dyn ClientStore, _, _>(|r: Resolver| {
            let settings = r.resolve_shared::<StoreSettings>()?;
            Ok(MemoryClientStore { collection: settings.client_collection().into() })
        }));

        let factory = services.build().unwrap();
        let store = factory.resolve_shared::<dyn ClientStore>().unwrap();

        assert_eq!(store.collection(), "clients");
    }

    #[test]
    fn it_adds_singleton() {
        let mut services = Services::default();
        services.add_singleton(Counter);

        let factory = services.build().unwrap();

        assert!(factory.resolve_shared::<Counter>().is_ok());
    }

    #[test]
    fn it_adds_type() {
        let mut services = Services::default();
        services.add_type::<Counter, Counter>();

        let factory = services.build().unwrap();
        let first = factory.resolve_shared::<Counter>().unwrap();
        let second = factory.resolve_shared::<Counter>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn it_adds_transient() {
        let mut services = Services::default();
        services.add_transient::<Counter, Counter>();

        let factory = services.build().unwrap();

        assert!(factory.resolve_shared::<Counter>().is_ok());
        assert!(factory.resolve_shared::<Counter>().is_ok());
    }

    #[test]
    fn it_adds_factory() {
        let mut services = Services::default();
        services.add_factory(|| String::from("tokens"));

        let factory = services.build().unwrap();

        assert_eq!(factory.resolve::<String>().unwrap(), "tokens");
    }

    #[test]
    fn it_adds_named() {
        let mut services = Services::default();
        services
            .add(Registration::value(1u8))
            .add_named(Registration::value(2u8), "second");

        let factory = services.build().unwrap();

        assert_eq!(*factory.resolve_keyed::<u8>(None).unwrap(), 1);
        assert_eq!(*factory.resolve_keyed::<u8>(Some("second")).unwrap(), 2);
        assert_eq!(*factory.resolve_named_shared::<u8>("second").unwrap(), 2);
    }

    #[test]
    fn it_fails_on_missing_required_service() {
        let mut services = Services::default();
        services.require::<dyn ClientStore>();

        let err = Factory::try_from(services).unwrap_err();

        assert!(matches!(err, Error::Configuration { name: None, .. }));
    }

    #[test]
    fn it_fails_on_missing_required_named_service() {
        let mut services = Services::default();
        services
            .add(Registration::value(1u8))
            .require_named::<u8>("primary");

        let err = services.build().unwrap_err();

        assert_eq!(err, Error::Configuration {
            type_name: "u8",
            name: Some("primary".into()),
        });
    }

    #[test]
    fn it_extends_with_registrations() {
        let mut services = Services::default();
        services.extend([
            Registration::value(1u16),
            Registration::value(2u16),
        ]);

        let factory = services.build().unwrap();

        assert_eq!(factory.resolve::<u16>().unwrap(), 2);
        assert_eq!(factory.container().len(), 2);
    }
}
