// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Background receiver loop bound to one topic and one connection,
//! dispatching matching messages to a user callback (§4.6).

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::connection::Connection;
use crate::error::Result;
use crate::message::Message;
use crate::topic::Topic;

/// Poll tick used by the worker loop; bounds cancellation latency.
const POLL_TICK_MS: i64 = 100;

pub type Callback = Box<dyn FnMut(Message) + Send>;

/// Best-effort extraction of a human-readable message from a caught panic
/// payload, for logging only.
fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A running (or just-stopped) subscription. Exactly one worker thread per
/// instance; the callback runs on that worker only.
pub struct Subscription {
    topic: Topic,
    alive: Arc<AtomicBool>,
    worker: Option<JoinHandle<Connection>>,
}

impl Subscription {
    /// Runs the subscribe handshake on `conn`, then spawns the worker loop.
    /// Takes ownership of `conn` for the subscription's lifetime; it is
    /// returned by [`Subscription::stop`] for the caller to release back to
    /// its pool.
    pub fn start(conn: Connection, topic: Topic, mut callback: Callback) -> Result<Subscription> {
        conn.subscribe(&topic)?;

        let alive = Arc::new(AtomicBool::new(true));
        let worker_alive = alive.clone();
        let worker_topic = topic.clone();

        let worker = std::thread::Builder::new()
            .name(format!("clara-msg-sub-{worker_topic}"))
            .spawn(move || {
                while worker_alive.load(Ordering::Relaxed) {
                    match conn.poll_recv(POLL_TICK_MS) {
                        Ok(Some(msg)) => {
                            if let Err(panic) =
                                panic::catch_unwind(AssertUnwindSafe(|| callback(msg)))
                            {
                                tracing::warn!(
                                    topic = %worker_topic,
                                    panic = %panic_message(&panic),
                                    "subscription callback panicked"
                                );
                            }
                        }
                        Ok(None) => {}
                        Err(e) if e.is_shutdown() => break,
                        Err(e) => {
                            tracing::warn!(error = %e, topic = %worker_topic, "subscription recv error");
                        }
                    }
                }
                conn
            })
            .expect("failed to spawn subscription worker thread");

        Ok(Subscription {
            topic,
            alive,
            worker: Some(worker),
        })
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn is_alive(&self) -> bool {
        self.worker.is_some() && self.alive.load(Ordering::Relaxed)
    }

    /// Signals the worker to stop, joins it, runs the unsubscribe
    /// handshake, and hands the connection back to the caller to return to
    /// its pool. Idempotent: a second call is a no-op returning `None`.
    pub fn stop(&mut self) -> Option<Connection> {
        self.alive.store(false, Ordering::Relaxed);
        let handle = self.worker.take()?;
        let conn = handle.join().expect("subscription worker panicked");
        if let Err(e) = conn.unsubscribe(&self.topic) {
            tracing::warn!(error = %e, topic = %self.topic, "unsubscribe handshake failed");
        }
        Some(conn)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_tick_bounds_cancellation_latency() {
        assert!(POLL_TICK_MS <= 100);
    }
}
