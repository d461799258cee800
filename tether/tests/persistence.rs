#![allow(missing_docs)]

use std::sync::{Arc, Mutex};
use tether::{
    Factory, Services, StoreSettings,
    di::{Registration, Resolver, error::Error, implements},
};

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

trait Logger: Send + Sync {
    fn log(&self, message: &str);
    fn lines(&self) -> Vec<String>;
}

trait ClientStore: Send + Sync {
    fn find(&self, id: &str) -> Option<String>;
}

trait TokenHandleStore: Send + Sync {
    fn collection(&self) -> &str;
    fn issued_at(&self) -> u64;
}

struct FixedClock(u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

#[derive(Default)]
struct MemoryLogger {
    lines: Mutex<Vec<String>>,
}

impl Logger for MemoryLogger {
    fn log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.into());
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

struct MemoryClientStore {
    database: String,
    logger: Arc<dyn Logger>,
}

impl ClientStore for MemoryClientStore {
    fn find(&self, id: &str) -> Option<String> {
        self.logger.log(&format!("find {id} in {}", self.database));
        (id == "codeclient").then(|| "Code Client".to_string())
    }
}

struct MemoryTokenHandleStore {
    collection: String,
    clock: Arc<dyn Clock>,
}

impl TokenHandleStore for MemoryTokenHandleStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    fn issued_at(&self) -> u64 {
        self.clock.now()
    }
}

implements! {
    FixedClock => dyn Clock,
    MemoryLogger => dyn Logger,
    MemoryClientStore => dyn ClientStore,
    MemoryTokenHandleStore => dyn TokenHandleStore
}

struct Fixture {
    settings: StoreSettings,
    logger: Arc<MemoryLogger>,
    factory: Factory,
}

impl Fixture {
    fn new() -> Self {
        let settings = StoreSettings::new().with_database("testidentityserver");
        let logger = Arc::new(MemoryLogger::default());

        let mut services = Services::new(settings.clone());
        services
            .require::<dyn ClientStore>()
            .require::<dyn TokenHandleStore>()
            .add(Registration::instance::<dyn Logger>(logger.clone()))
            .add(Registration::instance::<dyn Clock>(Arc::new(FixedClock(1_000))))
            .add(Registration::factory_as::<dyn ClientStore, _, _>(|r: Resolver| {
                let settings = r.resolve_shared::<StoreSettings>()?;
                Ok(MemoryClientStore {
                    database: settings.database().into(),
                    logger: r.resolve_shared()?,
                })
            }))
            .add(Registration::factory_as::<dyn TokenHandleStore, _, _>(
                |settings: Arc<StoreSettings>, clock: Arc<dyn Clock>| {
                    Ok(MemoryTokenHandleStore {
                        collection: settings.token_handle_collection().into(),
                        clock,
                    })
                },
            ));

        let factory = services.build().unwrap();
        Self { settings, logger, factory }
    }
}

#[test]
fn it_resolves_stores_with_settings() {
    let fixture = Fixture::new();

    let clients = fixture.factory.resolve_shared::<dyn ClientStore>().unwrap();
    let handles = fixture.factory.resolve_shared::<dyn TokenHandleStore>().unwrap();

    assert_eq!(clients.find("codeclient").as_deref(), Some("Code Client"));
    assert_eq!(handles.collection(), fixture.settings.token_handle_collection());
    assert_eq!(fixture.logger.lines(), vec!["find codeclient in testidentityserver"]);
}

#[test]
fn it_shares_instances_between_stores() {
    let fixture = Fixture::new();

    let clock = fixture.factory.resolve_shared::<dyn Clock>().unwrap();
    let handles = fixture.factory.resolve_shared::<dyn TokenHandleStore>().unwrap();
    let again = fixture.factory.resolve_shared::<dyn TokenHandleStore>().unwrap();

    assert!(Arc::ptr_eq(&handles, &again));
    assert_eq!(clock.now(), handles.issued_at());

    let logger = fixture.factory.resolve_shared::<dyn Logger>().unwrap();
    logger.log("shared");
    assert_eq!(fixture.logger.lines(), vec!["shared"]);
}

#[test]
fn it_fails_when_store_slot_is_empty() {
    let mut services = Services::new(StoreSettings::default());
    services
        .require::<dyn ClientStore>()
        .add(Registration::instance::<dyn Clock>(Arc::new(FixedClock(0))));

    let err = services.build().unwrap_err();

    assert_eq!(err, Error::Configuration {
        type_name: std::any::type_name::<dyn ClientStore>(),
        name: None,
    });
    assert!(err.to_string().contains("no instance, type or factory found on registration"));
}

#[test]
fn it_resolves_named_stores_independently() {
    let mut services = Services::default();
    services
        .add_named(Registration::instance::<dyn Clock>(Arc::new(FixedClock(1))), "primary")
        .add_named(Registration::instance::<dyn Clock>(Arc::new(FixedClock(2))), "secondary");

    let factory = services.build().unwrap();

    assert_eq!(factory.resolve_named_shared::<dyn Clock>("primary").unwrap().now(), 1);
    assert_eq!(factory.resolve_named_shared::<dyn Clock>("secondary").unwrap().now(), 2);

    let Err(err) = factory.resolve_shared::<dyn Clock>() else {
        panic!("Expected the unnamed clock to be missing");
    };
    assert!(err.is_not_registered());
}

#[test]
fn it_detects_cycles_between_stores() {
    #[derive(Debug)]
    struct Orders(#[allow(dead_code)] Arc<Customers>);
    #[derive(Debug)]
    struct Customers(#[allow(dead_code)] Arc<Orders>);

    let mut services = Services::default();
    services
        .add_factory(|orders: Arc<Customers>| Ok(Orders(orders)))
        .add_factory(|customers: Arc<Orders>| Ok(Customers(customers)));

    let factory = services.build().unwrap();

    match factory.resolve_shared::<Orders>().unwrap_err() {
        Error::CyclicDependency { chain } => {
            assert_eq!(chain.len(), 3);
            assert_eq!(chain.first(), chain.last());
            assert!(chain[0].ends_with("Orders"));
            assert!(chain[1].ends_with("Customers"));
        }
        other => panic!("Expected cyclic dependency, got {other:?}"),
    }
}
