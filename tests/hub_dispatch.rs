// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event dispatch semantics: drop vs. transform, per-module chaining,
//! fan-out and counters.

use eventhub_rust::{
    Event, EventHub, EventModule, EventProcessor, HubConfig, ModuleHooks, ProcessorHandle,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

const WAIT: Duration = Duration::from_secs(5);

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

struct PlainHooks(&'static str);

impl ModuleHooks for PlainHooks {
    fn name(&self) -> &str {
        self.0
    }
}

/// Drops even-valued events, doubles odd-valued ones.
struct ParityDoubler;

impl EventProcessor for ParityDoubler {
    fn name(&self) -> &str {
        "parity-doubler"
    }
    fn process(&self, _handle: &ProcessorHandle, event: &Event) -> Option<Event> {
        let value = event.data.as_i64()?;
        if value % 2 == 0 {
            None
        } else {
            Some(event.transformed(json!(value * 2)))
        }
    }
}

/// Records every event that reaches it.
struct Capture {
    seen: Arc<Mutex<Vec<Event>>>,
}

impl EventProcessor for Capture {
    fn name(&self) -> &str {
        "capture"
    }
    fn process(&self, _handle: &ProcessorHandle, event: &Event) -> Option<Event> {
        self.seen.lock().unwrap().push(event.clone());
        Some(event.clone())
    }
}

#[test]
fn even_events_dropped_odd_events_transformed() {
    init_logs();
    let hub = EventHub::with_defaults().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    hub.register_module(Box::new(PlainHooks("numbers"))).unwrap();
    hub.attach_processor("numbers", Box::new(ParityDoubler)).unwrap();
    let capture = hub
        .attach_processor(
            "numbers",
            Box::new(Capture {
                seen: Arc::clone(&seen),
            }),
        )
        .unwrap();
    assert!(wait_until(WAIT, || capture.is_fully_registered()));

    hub.dispatch(Event::new("num").with_data(json!(2))).unwrap();
    hub.dispatch(Event::new("num").with_data(json!(3))).unwrap();

    assert!(wait_until(WAIT, || hub.stats().events_dispatched == 2));
    assert!(wait_until(WAIT, || seen.lock().unwrap().len() == 1));

    let captured = seen.lock().unwrap();
    assert_eq!(captured[0].data, json!(6));
    drop(captured);

    assert_eq!(hub.stats().events_dropped, 1);
    hub.shutdown();
}

#[test]
fn dispatch_fans_out_to_all_modules() {
    init_logs();
    let hub = EventHub::with_defaults().unwrap();
    let seen_a = Arc::new(Mutex::new(Vec::new()));
    let seen_b = Arc::new(Mutex::new(Vec::new()));

    hub.register_module(Box::new(PlainHooks("a"))).unwrap();
    hub.register_module(Box::new(PlainHooks("b"))).unwrap();
    let ca = hub
        .attach_processor(
            "a",
            Box::new(Capture {
                seen: Arc::clone(&seen_a),
            }),
        )
        .unwrap();
    let cb = hub
        .attach_processor(
            "b",
            Box::new(Capture {
                seen: Arc::clone(&seen_b),
            }),
        )
        .unwrap();
    assert!(wait_until(WAIT, || {
        ca.is_fully_registered() && cb.is_fully_registered()
    }));

    let event = Event::new("broadcast").with_data(json!("hello"));
    hub.dispatch(event.clone()).unwrap();

    assert!(wait_until(WAIT, || {
        seen_a.lock().unwrap().len() == 1 && seen_b.lock().unwrap().len() == 1
    }));
    assert_eq!(seen_a.lock().unwrap()[0].id, event.id);
    assert_eq!(seen_b.lock().unwrap()[0].id, event.id);

    hub.shutdown();
}

#[test]
fn shutdown_deactivates_remaining_modules() {
    init_logs();
    struct CountingHooks {
        label: &'static str,
        unregistered: Arc<AtomicUsize>,
    }
    impl ModuleHooks for CountingHooks {
        fn name(&self) -> &str {
            self.label
        }
        fn on_unregistered(&self, _module: &EventModule) {
            self.unregistered.fetch_add(1, Ordering::SeqCst);
        }
    }

    let hub = EventHub::with_defaults().unwrap();
    let count = Arc::new(AtomicUsize::new(0));

    for label in ["a", "b"] {
        hub.register_module(Box::new(CountingHooks {
            label,
            unregistered: Arc::clone(&count),
        }))
        .unwrap();
    }

    hub.shutdown();
    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert!(hub.module("a").is_none());
}

#[test]
fn bounded_hub_from_toml_config() {
    init_logs();
    let config = HubConfig::from_toml_str(
        r#"
        name = "bounded"
        channel_capacity = 8
        "#,
    )
    .unwrap();
    let hub = EventHub::new(config).unwrap();
    assert_eq!(hub.name(), "bounded");

    let seen = Arc::new(Mutex::new(Vec::new()));
    hub.register_module(Box::new(PlainHooks("m"))).unwrap();
    let capture = hub
        .attach_processor(
            "m",
            Box::new(Capture {
                seen: Arc::clone(&seen),
            }),
        )
        .unwrap();
    assert!(wait_until(WAIT, || capture.is_fully_registered()));

    for i in 0..20 {
        hub.dispatch(Event::new("n").with_data(json!(i))).unwrap();
    }
    assert!(wait_until(WAIT, || seen.lock().unwrap().len() == 20));
    assert_eq!(hub.stats().events_dispatched, 20);
    assert_eq!(hub.stats().events_dropped, 0);

    hub.shutdown();
}
