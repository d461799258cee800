#![allow(missing_docs)]
#![cfg(feature = "tracing")]

use std::{
    fmt::Debug,
    sync::{
        Arc, Barrier,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tether::{Services, di::Registration};
use tracing::{Dispatch, Event, Subscriber, field::{Field, Visit}};
use tracing_subscriber::{EnvFilter, fmt, layer::Context, prelude::*, registry::Registry, Layer};

/// Counts events whose message starts with a prefix
struct CountingLayer {
    prefix: &'static str,
    count: Arc<AtomicUsize>,
}

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for CountingLayer {
    fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if visitor.0.is_some_and(|message| message.starts_with(self.prefix)) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn it_resolves_with_subscriber_installed() {
    let _guard = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::new("trace"))
        .set_default();

    let mut services = Services::default();
    services
        .add(Registration::value(1u32))
        .add(Registration::value(2u32))
        .add(Registration::factory(|| String::from("lazy")));

    let factory = services.build().unwrap();

    assert_eq!(factory.resolve::<u32>().unwrap(), 2);
    assert_eq!(factory.resolve::<String>().unwrap(), "lazy");
}

#[test]
fn it_reports_configuration_errors_with_subscriber_installed() {
    let _guard = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::new("debug"))
        .set_default();

    let mut services = Services::default();
    services.require_named::<u32>("port");

    assert!(services.build().is_err());
}

#[test]
fn it_logs_materialization_once_under_concurrent_first_access() {
    const CALLERS: usize = 8;

    let materialized = Arc::new(AtomicUsize::new(0));
    let dispatch = Dispatch::new(Registry::default().with(CountingLayer {
        prefix: "materialized",
        count: materialized.clone(),
    }));

    let mut services = Services::default();
    services.add(Registration::factory(|| {
        std::thread::sleep(Duration::from_millis(20));
        String::from("slow")
    }));

    let factory = services.build().unwrap();
    let barrier = Barrier::new(CALLERS);

    std::thread::scope(|scope| {
        for _ in 0..CALLERS {
            scope.spawn(|| {
                let _guard = tracing::dispatcher::set_default(&dispatch);
                barrier.wait();
                assert_eq!(factory.resolve::<String>().unwrap(), "slow");
            });
        }
    });

    assert_eq!(materialized.load(Ordering::SeqCst), 1);
}
