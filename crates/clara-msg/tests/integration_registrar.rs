// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end registrar scenarios: registration, lookup asymmetry and
//! concurrent writers against a live registrar service.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use clara_msg::address::{ProxyAddress, RegAddress};
use clara_msg::registrar::service::{self, RegDataSet};
use clara_msg::registrar::OwnerType;
use clara_msg::topic::Topic;
use clara_msg::Actor;
use parking_lot::Mutex as PLMutex;

static NEXT_PORT: AtomicU16 = AtomicU16::new(19_000);

fn alloc_addresses() -> (ProxyAddress, RegAddress) {
    let base = NEXT_PORT.fetch_add(10, Ordering::SeqCst);
    let proxy = ProxyAddress::with_port("127.0.0.1", base).unwrap();
    let registrar = RegAddress::with_port("127.0.0.1", base + 5).unwrap();
    (proxy, registrar)
}

struct RunningRegistrar {
    alive: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RunningRegistrar {
    fn start(addr: RegAddress) -> RunningRegistrar {
        let ctx = clara_msg::context::create();
        let store = Arc::new(PLMutex::new(RegDataSet::new()));
        let alive = Arc::new(AtomicBool::new(true));
        let worker_alive = alive.clone();
        let handle = std::thread::spawn(move || {
            service::run(&ctx, &addr, store, worker_alive).expect("registrar loop failed");
        });
        // Give the REP socket a moment to bind before the first request.
        std::thread::sleep(Duration::from_millis(50));
        RunningRegistrar {
            alive,
            handle: Some(handle),
        }
    }
}

impl Drop for RunningRegistrar {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

#[test]
fn find_matches_spec_scenario_asimov_bradbury() {
    let (proxy_addr, reg_addr) = alloc_addresses();
    let _registrar = RunningRegistrar::start(reg_addr.clone());

    let asimov = Actor::with_registrar("asimov", proxy_addr.clone(), reg_addr.clone());
    asimov
        .register_as_publisher(Topic::raw("writer:scifi:books"), "")
        .unwrap();

    let bradbury = Actor::with_registrar("bradbury", proxy_addr.clone(), reg_addr.clone());
    bradbury
        .register_as_subscriber(Topic::raw("writer:scifi"), "")
        .unwrap();

    let finder = Actor::with_registrar("finder", proxy_addr, reg_addr);

    let pubs = finder.find_publishers(Topic::raw("writer:scifi")).unwrap();
    assert_eq!(pubs.len(), 1);
    assert_eq!(pubs[0].name, "asimov");

    let subs = finder
        .find_subscribers(Topic::raw("writer:scifi:books"))
        .unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].name, "bradbury");
}

#[test]
fn deregister_removes_from_find_results() {
    let (proxy_addr, reg_addr) = alloc_addresses();
    let _registrar = RunningRegistrar::start(reg_addr.clone());

    let actor = Actor::with_registrar("asimov", proxy_addr.clone(), reg_addr.clone());
    let topic = Topic::raw("writer:scifi:books");
    actor.register_as_publisher(topic.clone(), "").unwrap();

    let before = actor.find_publishers(Topic::raw("writer:scifi")).unwrap();
    assert_eq!(before.len(), 1);

    actor.deregister_as_publisher(topic).unwrap();
    let after = actor.find_publishers(Topic::raw("writer:scifi")).unwrap();
    assert!(after.is_empty());
}

#[test]
fn concurrent_registrations_all_land() {
    let (proxy_addr, reg_addr) = alloc_addresses();
    let _registrar = RunningRegistrar::start(reg_addr.clone());

    let names: Vec<&str> = vec!["a", "b", "c", "d", "e", "f", "g", "h"];
    let errors = Arc::new(Mutex::new(Vec::new()));

    std::thread::scope(|scope| {
        for name in &names {
            let proxy_addr = proxy_addr.clone();
            let reg_addr = reg_addr.clone();
            let errors = errors.clone();
            scope.spawn(move || {
                let actor = Actor::with_registrar(*name, proxy_addr, reg_addr);
                if let Err(e) = actor.register_as_publisher(Topic::raw("fleet:unit"), "") {
                    errors.lock().unwrap().push(e.to_string());
                }
            });
        }
    });

    assert!(errors.lock().unwrap().is_empty(), "{:?}", errors.lock().unwrap());

    let finder = Actor::with_registrar("finder", proxy_addr, reg_addr);
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut found = Vec::new();
    while Instant::now() < deadline {
        found = finder.find_publishers(Topic::raw("fleet:unit")).unwrap();
        if found.len() == names.len() {
            break;
        }
    }
    assert_eq!(found.len(), names.len());
}

#[test]
fn remove_all_registration_clears_every_topic_for_host() {
    let (proxy_addr, reg_addr) = alloc_addresses();
    let _registrar = RunningRegistrar::start(reg_addr.clone());

    let actor = Actor::with_registrar("asimov", proxy_addr.clone(), reg_addr.clone());
    actor
        .register_as_publisher(Topic::raw("writer:scifi:books"), "")
        .unwrap();
    actor
        .register_as_publisher(Topic::raw("writer:fantasy"), "")
        .unwrap();

    let before = actor.find_publishers(Topic::raw("writer")).unwrap();
    assert_eq!(before.len(), 2);

    let driver = clara_msg::pool::thread_local_pool()
        .get_registrar(reg_addr)
        .unwrap();
    driver
        .remove_all("asimov", proxy_addr.host(), OwnerType::Publisher, 3000)
        .unwrap();

    let after = actor.find_publishers(Topic::raw("writer")).unwrap();
    assert!(after.is_empty());
}
