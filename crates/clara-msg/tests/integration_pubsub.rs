// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end proxy + pub/sub scenarios: delivery, mimetypes, sync-publish
//! correlation and timeout, and subscription/connection lifecycle.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use clara_msg::address::ProxyAddress;
use clara_msg::proxy::Proxy;
use clara_msg::topic::Topic;
use clara_msg::{make_message, parse_message, Actor};

/// Each test gets its own (pub, sub, control) port triple so parallel test
/// threads never collide on a bind address.
static NEXT_PORT: AtomicU16 = AtomicU16::new(18_000);

fn alloc_proxy_address() -> ProxyAddress {
    let port = NEXT_PORT.fetch_add(10, Ordering::SeqCst);
    ProxyAddress::with_port("127.0.0.1", port).unwrap()
}

/// Each test's proxy gets its own private transport context rather than the
/// process-wide shared one: `Proxy::stop` tears its context down, and
/// several of these tests' proxies coexist in the same test binary process.
fn start_proxy(addr: ProxyAddress) -> Proxy {
    let mut proxy = Proxy::with_context(addr, clara_msg::context::create());
    proxy.start().expect("proxy failed to start");
    proxy
}

fn wait_until(deadline: Instant, mut done: impl FnMut() -> bool) {
    while !done() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn delivery_scenario_sums_and_counts_match() {
    let addr = alloc_proxy_address();
    let _proxy = start_proxy(addr.clone());

    let publisher = Actor::new("publisher", addr.clone()).unwrap();
    let subscriber = Actor::new("subscriber", addr).unwrap();
    let topic = Topic::raw("test_topic");

    let received: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
    let received_cb = received.clone();

    let sub_conn = subscriber.connect().unwrap();
    let sub = subscriber
        .subscribe(
            topic.clone(),
            sub_conn,
            Box::new(move |msg| {
                if let Ok(v) = parse_message::<i32>(&msg) {
                    received_cb.lock().unwrap().push(v);
                }
            }),
        )
        .unwrap();

    let pub_conn = publisher.connect().unwrap();
    const N: i32 = 50;
    for i in 0..N {
        publisher
            .publish(&pub_conn, &make_message(topic.clone(), &i))
            .unwrap();
    }

    wait_until(Instant::now() + Duration::from_secs(5), || {
        received.lock().unwrap().len() as i32 == N
    });

    let values = received.lock().unwrap().clone();
    assert_eq!(values.len() as i32, N, "expected all {N} messages to arrive");
    let sum: i32 = values.iter().sum();
    assert_eq!(sum, N * (N - 1) / 2);

    subscriber.unsubscribe(sub);
}

#[test]
fn single_message_carries_expected_mimetype() {
    let addr = alloc_proxy_address();
    let _proxy = start_proxy(addr.clone());

    let publisher = Actor::new("publisher", addr.clone()).unwrap();
    let subscriber = Actor::new("subscriber", addr).unwrap();
    let topic = Topic::raw("test_topic");

    let received: Arc<Mutex<Option<(String, i32)>>> = Arc::new(Mutex::new(None));
    let received_cb = received.clone();

    let sub_conn = subscriber.connect().unwrap();
    let sub = subscriber
        .subscribe(
            topic.clone(),
            sub_conn,
            Box::new(move |msg| {
                let datatype = msg.meta().datatype.clone();
                if let Ok(v) = parse_message::<i32>(&msg) {
                    *received_cb.lock().unwrap() = Some((datatype, v));
                }
            }),
        )
        .unwrap();

    let pub_conn = publisher.connect().unwrap();
    publisher
        .publish(&pub_conn, &make_message(topic, &42i32))
        .unwrap();

    wait_until(Instant::now() + Duration::from_secs(2), || {
        received.lock().unwrap().is_some()
    });

    let (datatype, value) = received.lock().unwrap().clone().expect("message not received");
    assert_eq!(datatype, "binary/sfixed32");
    assert_eq!(value, 42);

    subscriber.unsubscribe(sub);
}

/// Spawns a responder that echoes back the int payload of every message it
/// receives on `topic`, addressed to the sender's `replyto`.
fn spawn_echo_responder(addr: ProxyAddress, topic: Topic) -> (Actor, clara_msg::Subscription) {
    let responder = Actor::new("responder", addr).unwrap();
    let reply_actor = Actor::new("responder", responder.default_proxy().clone()).unwrap();
    let conn = responder.connect().unwrap();
    let sub = responder
        .subscribe(
            topic,
            conn,
            Box::new(move |msg| {
                let Some(replyto) = msg.meta().replyto.clone() else {
                    return;
                };
                let Ok(value) = parse_message::<i32>(&msg) else {
                    return;
                };
                if let Ok(reply_conn) = reply_actor.connect() {
                    let reply = make_message(Topic::raw(replyto), &value);
                    let _ = reply_actor.publish(&reply_conn, &reply);
                }
            }),
        )
        .unwrap();
    (responder, sub)
}

#[test]
fn sync_publish_correlates_echoed_payload() {
    let addr = alloc_proxy_address();
    let _proxy = start_proxy(addr.clone());
    let topic = Topic::raw("test_topic");

    let (responder, sub) = spawn_echo_responder(addr.clone(), topic.clone());

    let requester = Actor::new("requester", addr).unwrap();
    let req_conn = requester.connect().unwrap();
    for i in 0..5i32 {
        let reply = requester
            .sync_publish(&req_conn, make_message(topic.clone(), &i), 1000)
            .expect("sync publish should get a reply");
        let value: i32 = parse_message(&reply).unwrap();
        assert_eq!(value, i);
    }

    responder.unsubscribe(sub);
}

#[test]
fn sync_publish_times_out_with_no_responder() {
    let addr = alloc_proxy_address();
    let _proxy = start_proxy(addr.clone());

    let requester = Actor::new("requester", addr).unwrap();
    let topic = Topic::raw("test_topic");
    let conn = requester.connect().unwrap();

    let start = Instant::now();
    let result = requester.sync_publish(&conn, make_message(topic, &7i32), 200);
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(clara_msg::ClaraMsgError::Timeout(_))));
    assert!(elapsed >= Duration::from_millis(190));
    assert!(elapsed <= Duration::from_millis(500));
}

#[test]
fn subscription_unsubscribe_joins_promptly() {
    let addr = alloc_proxy_address();
    let _proxy = start_proxy(addr.clone());

    let actor = Actor::new("watcher", addr).unwrap();
    let topic = Topic::raw("test_topic");
    let conn = actor.connect().unwrap();
    let sub = actor.subscribe(topic, conn, Box::new(|_msg| {})).unwrap();

    let start = Instant::now();
    actor.unsubscribe(sub);
    let elapsed = start.elapsed();

    assert!(
        elapsed <= Duration::from_millis(250),
        "unsubscribe took {elapsed:?}, expected <= 250ms"
    );
}

#[test]
fn connection_pool_reuses_same_connection_per_address() {
    let addr_a = alloc_proxy_address();
    let addr_b = alloc_proxy_address();
    let _proxy_a = start_proxy(addr_a.clone());
    let _proxy_b = start_proxy(addr_b.clone());

    let actor = Actor::new("reuser", addr_a.clone()).unwrap();

    let first_id = actor.connect().unwrap().local_id().to_string();
    let second_id = actor.connect().unwrap().local_id().to_string();
    assert_eq!(first_id, second_id, "releasing then reacquiring the same address should reuse the connection");

    let other_conn = actor.connect_to(addr_b).unwrap();
    assert_ne!(
        first_id,
        other_conn.local_id(),
        "a distinct address must yield a distinct connection"
    );
}
